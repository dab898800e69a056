//! Demand prediction pipeline
//!
//! Scale -> append trailing input -> single-step forward pass -> round.
//! Both collaborators sit behind traits so the pipeline can run against
//! stub artifacts in tests.

use anyhow::Result;
use ndarray::Array2;
use thiserror::Error;

use crate::features::FeatureVector;

/// Constant 30th input the training pipeline appended after scaling; the
/// scaler was never fitted on it.
const TRAILING_INPUT: f64 = 1000.0;

/// Inference-only sequence model
pub trait SequenceModel: Send + Sync {
    /// Run a forward pass over one sequence of shape (steps, input_size).
    fn forward(&self, input: &Array2<f64>) -> Result<f64>;
}

/// Fitted feature scaling transform
pub trait FeatureScaler: Send + Sync {
    /// Map a raw vector to its normalized form.
    fn transform(&self, input: &[f64]) -> Result<Vec<f64>>;
}

/// Why a single prediction could not be produced
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model weights are not loaded")]
    ModelUnavailable,

    #[error("feature scaler is not loaded")]
    ScalerUnavailable,

    #[error("inference failed: {0}")]
    Inference(#[from] anyhow::Error),
}

/// Long-lived prediction pipeline shared across requests.
///
/// Either artifact may be absent after a failed load; the service still
/// runs and every prediction reports a typed failure instead.
pub struct DemandPredictor {
    model: Option<Box<dyn SequenceModel>>,
    scaler: Option<Box<dyn FeatureScaler>>,
}

impl DemandPredictor {
    pub fn new(
        model: Option<Box<dyn SequenceModel>>,
        scaler: Option<Box<dyn FeatureScaler>>,
    ) -> Self {
        Self { model, scaler }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        !self.has_model() || !self.has_scaler()
    }

    /// Predict demand for one feature vector, rounded to 2 decimal places.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let model = self.model.as_deref().ok_or(PredictError::ModelUnavailable)?;
        let scaler = self
            .scaler
            .as_deref()
            .ok_or(PredictError::ScalerUnavailable)?;

        let mut scaled = scaler.transform(features.as_slice())?;
        scaled.push(TRAILING_INPUT);

        let width = scaled.len();
        let input = Array2::from_shape_vec((1, width), scaled).map_err(anyhow::Error::from)?;

        let raw = model.forward(&input)?;
        if !raw.is_finite() {
            return Err(PredictError::Inference(anyhow::anyhow!(
                "model produced a non-finite value"
            )));
        }

        Ok((raw * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::EnergyType;
    use crate::weather::WeatherRecord;

    struct FixedModel(f64);

    impl SequenceModel for FixedModel {
        fn forward(&self, input: &Array2<f64>) -> Result<f64> {
            // The pipeline hands the model exactly one 30-wide step with the
            // trailing input in the last column.
            assert_eq!(input.dim(), (1, 30));
            assert_eq!(input[[0, 29]], 1000.0);
            Ok(self.0)
        }
    }

    struct IdentityScaler;

    impl FeatureScaler for IdentityScaler {
        fn transform(&self, input: &[f64]) -> Result<Vec<f64>> {
            Ok(input.to_vec())
        }
    }

    struct FailingScaler;

    impl FeatureScaler for FailingScaler {
        fn transform(&self, _input: &[f64]) -> Result<Vec<f64>> {
            anyhow::bail!("width mismatch")
        }
    }

    fn sample_features() -> FeatureVector {
        let weather = WeatherRecord {
            temperature: 30.0,
            pressure: 1010.0,
            humidity: 60.0,
            wind_speed: 5.0,
            wind_degree: 180.0,
            precipitation: 0.0,
            cloud_cover: 20.0,
        };
        FeatureVector::for_energy_type(&weather, EnergyType::Solar)
    }

    #[test]
    fn rounds_to_two_decimals() {
        let predictor = DemandPredictor::new(
            Some(Box::new(FixedModel(42.123))),
            Some(Box::new(IdentityScaler)),
        );

        let value = predictor.predict(&sample_features()).unwrap();
        assert_eq!(value, 42.12);
    }

    #[test]
    fn missing_model_is_a_typed_failure() {
        let predictor = DemandPredictor::new(None, Some(Box::new(IdentityScaler)));
        let err = predictor.predict(&sample_features()).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable));
        assert!(predictor.is_degraded());
    }

    #[test]
    fn missing_scaler_is_a_typed_failure() {
        let predictor = DemandPredictor::new(Some(Box::new(FixedModel(1.0))), None);
        let err = predictor.predict(&sample_features()).unwrap_err();
        assert!(matches!(err, PredictError::ScalerUnavailable));
    }

    #[test]
    fn scaler_failure_never_panics() {
        let predictor = DemandPredictor::new(
            Some(Box::new(FixedModel(1.0))),
            Some(Box::new(FailingScaler)),
        );
        let err = predictor.predict(&sample_features()).unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
    }

    #[test]
    fn non_finite_output_is_a_typed_failure() {
        let predictor = DemandPredictor::new(
            Some(Box::new(FixedModel(f64::NAN))),
            Some(Box::new(IdentityScaler)),
        );
        assert!(predictor.predict(&sample_features()).is_err());
    }

    #[test]
    fn prediction_is_deterministic() {
        let predictor = DemandPredictor::new(
            Some(Box::new(FixedModel(13.579))),
            Some(Box::new(IdentityScaler)),
        );
        let features = sample_features();
        assert_eq!(
            predictor.predict(&features).unwrap(),
            predictor.predict(&features).unwrap()
        );
    }
}
