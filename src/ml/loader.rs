//! Startup artifact loading
//!
//! Runs once before the HTTP listener binds. A failed load leaves the
//! corresponding artifact absent and the service degraded rather than
//! refusing to boot.

use std::path::Path;
use tracing::{error, info};

use super::lstm::DemandLstm;
use super::predictor::{DemandPredictor, FeatureScaler, SequenceModel};
use super::scaler::StandardScaler;

/// Load the model checkpoint and the fitted scaler into a predictor.
pub fn load_artifacts(weights_path: &Path, scaler_path: &Path) -> DemandPredictor {
    let model: Option<Box<dyn SequenceModel>> = match DemandLstm::from_file(weights_path) {
        Ok(model) => {
            info!(
                path = %weights_path.display(),
                input_size = model.input_size(),
                hidden_size = model.hidden_size(),
                "loaded demand model weights"
            );
            Some(Box::new(model))
        }
        Err(e) => {
            error!(
                path = %weights_path.display(),
                error = %e,
                "failed to load demand model weights"
            );
            None
        }
    };

    let scaler: Option<Box<dyn FeatureScaler>> = match StandardScaler::from_file(scaler_path) {
        Ok(scaler) => {
            info!(
                path = %scaler_path.display(),
                columns = scaler.mean.len(),
                "loaded feature scaler"
            );
            Some(Box::new(scaler))
        }
        Err(e) => {
            error!(
                path = %scaler_path.display(),
                error = %e,
                "failed to load feature scaler"
            );
            None
        }
    };

    DemandPredictor::new(model, scaler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_artifact(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("edp-loader-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn tiny_state_dict() -> String {
        serde_json::json!({
            "lstm.weight_ih_l0": vec![vec![0.0; 3]; 8],
            "lstm.weight_hh_l0": vec![vec![0.0; 2]; 8],
            "lstm.bias_ih_l0": vec![0.0; 8],
            "lstm.bias_hh_l0": vec![0.0; 8],
            "lstm.weight_ih_l0_reverse": vec![vec![0.0; 3]; 8],
            "lstm.weight_hh_l0_reverse": vec![vec![0.0; 2]; 8],
            "lstm.bias_ih_l0_reverse": vec![0.0; 8],
            "lstm.bias_hh_l0_reverse": vec![0.0; 8],
            "fc.weight": [vec![0.0; 4]],
            "fc.bias": [3.0],
        })
        .to_string()
    }

    fn tiny_scaler() -> String {
        serde_json::json!({ "mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0] }).to_string()
    }

    #[test]
    fn loads_both_artifacts() {
        let weights = write_artifact("weights-ok.json", &tiny_state_dict());
        let scaler = write_artifact("scaler-ok.json", &tiny_scaler());

        let predictor = load_artifacts(&weights, &scaler);
        assert!(predictor.has_model());
        assert!(predictor.has_scaler());
        assert!(!predictor.is_degraded());
    }

    #[test]
    fn loads_wrapped_checkpoint() {
        let wrapped = format!(r#"{{"epoch": 3, "model_state_dict": {}}}"#, tiny_state_dict());
        let weights = write_artifact("weights-wrapped.json", &wrapped);
        let scaler = write_artifact("scaler-wrapped.json", &tiny_scaler());

        let predictor = load_artifacts(&weights, &scaler);
        assert!(predictor.has_model());
    }

    #[test]
    fn missing_files_degrade_instead_of_failing() {
        let predictor = load_artifacts(
            Path::new("/nonexistent/weights.json"),
            Path::new("/nonexistent/scaler.json"),
        );
        assert!(!predictor.has_model());
        assert!(!predictor.has_scaler());
        assert!(predictor.is_degraded());
    }

    #[test]
    fn garbage_checkpoint_degrades_model_only() {
        let weights = write_artifact("weights-garbage.json", r#"{"not": "a checkpoint"}"#);
        let scaler = write_artifact("scaler-good.json", &tiny_scaler());

        let predictor = load_artifacts(&weights, &scaler);
        assert!(!predictor.has_model());
        assert!(predictor.has_scaler());
        assert!(predictor.is_degraded());
    }
}
