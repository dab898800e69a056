//! Bidirectional LSTM demand model
//!
//! Inference-only forward pass over weights exported from the training
//! pipeline as a JSON state dict. The checkpoint on disk comes in two known
//! shapes: a wrapper object carrying a `model_state_dict` key, or the bare
//! state dict itself; anything else is a decode failure.

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;
use std::path::Path;

use super::predictor::SequenceModel;

/// Known on-disk checkpoint shapes, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Checkpoint {
    Wrapped { model_state_dict: StateDict },
    Bare(StateDict),
}

impl Checkpoint {
    fn into_state_dict(self) -> StateDict {
        match self {
            Checkpoint::Wrapped { model_state_dict } => model_state_dict,
            Checkpoint::Bare(state_dict) => state_dict,
        }
    }
}

/// Raw parameter mapping, keyed the way the training framework names them.
#[derive(Debug, Deserialize)]
struct StateDict {
    #[serde(rename = "lstm.weight_ih_l0")]
    weight_ih_l0: Vec<Vec<f64>>,
    #[serde(rename = "lstm.weight_hh_l0")]
    weight_hh_l0: Vec<Vec<f64>>,
    #[serde(rename = "lstm.bias_ih_l0")]
    bias_ih_l0: Vec<f64>,
    #[serde(rename = "lstm.bias_hh_l0")]
    bias_hh_l0: Vec<f64>,
    #[serde(rename = "lstm.weight_ih_l0_reverse")]
    weight_ih_l0_reverse: Vec<Vec<f64>>,
    #[serde(rename = "lstm.weight_hh_l0_reverse")]
    weight_hh_l0_reverse: Vec<Vec<f64>>,
    #[serde(rename = "lstm.bias_ih_l0_reverse")]
    bias_ih_l0_reverse: Vec<f64>,
    #[serde(rename = "lstm.bias_hh_l0_reverse")]
    bias_hh_l0_reverse: Vec<f64>,
    #[serde(rename = "fc.weight")]
    fc_weight: Vec<Vec<f64>>,
    #[serde(rename = "fc.bias")]
    fc_bias: Vec<f64>,
}

/// Gate weights for one LSTM direction.
///
/// `w_ih`/`w_hh` stack the input, forget, cell and output gates along the
/// row axis, `4 * hidden` rows in that order.
#[derive(Debug, Clone)]
struct DirectionWeights {
    w_ih: Array2<f64>,
    w_hh: Array2<f64>,
    b_ih: Array1<f64>,
    b_hh: Array1<f64>,
    hidden_size: usize,
}

impl DirectionWeights {
    fn new(
        w_ih: Vec<Vec<f64>>,
        w_hh: Vec<Vec<f64>>,
        b_ih: Vec<f64>,
        b_hh: Vec<f64>,
    ) -> Result<Self> {
        let w_ih = to_matrix(w_ih).context("input-to-hidden weights")?;
        let w_hh = to_matrix(w_hh).context("hidden-to-hidden weights")?;

        if w_ih.nrows() % 4 != 0 {
            anyhow::bail!(
                "Gate matrix rows must stack 4 gates, got {} rows",
                w_ih.nrows()
            );
        }
        let hidden_size = w_ih.nrows() / 4;

        if w_hh.nrows() != 4 * hidden_size || w_hh.ncols() != hidden_size {
            anyhow::bail!(
                "Hidden weight shape mismatch: expected ({}, {}), got ({}, {})",
                4 * hidden_size,
                hidden_size,
                w_hh.nrows(),
                w_hh.ncols()
            );
        }
        if b_ih.len() != 4 * hidden_size || b_hh.len() != 4 * hidden_size {
            anyhow::bail!(
                "Bias length mismatch: expected {}, got {} and {}",
                4 * hidden_size,
                b_ih.len(),
                b_hh.len()
            );
        }

        Ok(Self {
            w_ih,
            w_hh,
            b_ih: Array1::from(b_ih),
            b_hh: Array1::from(b_hh),
            hidden_size,
        })
    }

    fn input_size(&self) -> usize {
        self.w_ih.ncols()
    }

    /// One recurrence step, updating hidden and cell state in place.
    fn step(&self, x: ArrayView1<'_, f64>, h: &mut Array1<f64>, c: &mut Array1<f64>) {
        let gates = self.w_ih.dot(&x) + &self.b_ih + self.w_hh.dot(h) + &self.b_hh;
        let n = self.hidden_size;

        for j in 0..n {
            let input_gate = sigmoid(gates[j]);
            let forget_gate = sigmoid(gates[n + j]);
            let cell_gate = gates[2 * n + j].tanh();
            let output_gate = sigmoid(gates[3 * n + j]);

            c[j] = forget_gate * c[j] + input_gate * cell_gate;
            h[j] = output_gate * c[j].tanh();
        }
    }
}

/// Pretrained bidirectional LSTM mapped to a single demand scalar
#[derive(Debug, Clone)]
pub struct DemandLstm {
    forward_dir: DirectionWeights,
    reverse_dir: DirectionWeights,
    fc_weight: Array2<f64>,
    fc_bias: f64,
}

impl DemandLstm {
    /// Load and validate weights from a JSON checkpoint.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model checkpoint {}", path.display()))?;
        let checkpoint: Checkpoint = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to decode model checkpoint {}", path.display()))?;
        Self::from_state_dict(checkpoint.into_state_dict())
    }

    fn from_state_dict(sd: StateDict) -> Result<Self> {
        let forward_dir = DirectionWeights::new(
            sd.weight_ih_l0,
            sd.weight_hh_l0,
            sd.bias_ih_l0,
            sd.bias_hh_l0,
        )
        .context("forward direction")?;
        let reverse_dir = DirectionWeights::new(
            sd.weight_ih_l0_reverse,
            sd.weight_hh_l0_reverse,
            sd.bias_ih_l0_reverse,
            sd.bias_hh_l0_reverse,
        )
        .context("reverse direction")?;

        if forward_dir.input_size() != reverse_dir.input_size()
            || forward_dir.hidden_size != reverse_dir.hidden_size
        {
            anyhow::bail!("Forward and reverse directions disagree on layer size");
        }

        let fc_weight = to_matrix(sd.fc_weight).context("output head weights")?;
        if fc_weight.nrows() != 1 || fc_weight.ncols() != 2 * forward_dir.hidden_size {
            anyhow::bail!(
                "Output head shape mismatch: expected (1, {}), got ({}, {})",
                2 * forward_dir.hidden_size,
                fc_weight.nrows(),
                fc_weight.ncols()
            );
        }
        if sd.fc_bias.len() != 1 {
            anyhow::bail!("Output head bias must be a single scalar");
        }
        let fc_bias = sd.fc_bias[0];

        Ok(Self {
            forward_dir,
            reverse_dir,
            fc_weight,
            fc_bias,
        })
    }

    pub fn input_size(&self) -> usize {
        self.forward_dir.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.forward_dir.hidden_size
    }

    /// Forward pass over one sequence of shape (steps, input_size).
    ///
    /// State starts at zero on every call. The head reads the final output
    /// position: the forward state after the whole sequence concatenated
    /// with the reverse state, which at that position has consumed only the
    /// last row.
    pub fn forward(&self, input: &Array2<f64>) -> Result<f64> {
        let (steps, width) = input.dim();
        if steps == 0 {
            anyhow::bail!("Input sequence is empty");
        }
        if width != self.input_size() {
            anyhow::bail!(
                "Input width mismatch: model expects {}, got {}",
                self.input_size(),
                width
            );
        }

        let hidden = self.forward_dir.hidden_size;

        let mut h_fwd = Array1::zeros(hidden);
        let mut c_fwd = Array1::zeros(hidden);
        for row in input.rows() {
            self.forward_dir.step(row, &mut h_fwd, &mut c_fwd);
        }

        let mut h_rev = Array1::zeros(hidden);
        let mut c_rev = Array1::zeros(hidden);
        self.reverse_dir
            .step(input.row(steps - 1), &mut h_rev, &mut c_rev);

        let head = self.fc_weight.row(0);
        let output = h_fwd
            .iter()
            .chain(h_rev.iter())
            .zip(head.iter())
            .map(|(state, weight)| state * weight)
            .sum::<f64>()
            + self.fc_bias;

        Ok(output)
    }
}

impl SequenceModel for DemandLstm {
    fn forward(&self, input: &Array2<f64>) -> Result<f64> {
        DemandLstm::forward(self, input)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn to_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if nrows == 0 || ncols == 0 {
        anyhow::bail!("Weight matrix is empty");
    }

    let mut flat = Vec::with_capacity(nrows * ncols);
    for row in &rows {
        if row.len() != ncols {
            anyhow::bail!(
                "Ragged weight matrix: expected {} columns, found {}",
                ncols,
                row.len()
            );
        }
        flat.extend_from_slice(row);
    }

    Array2::from_shape_vec((nrows, ncols), flat).map_err(Into::into)
}
