//! Fitted feature scaling transform
//!
//! Standardization with the mean/scale pair exported by the training
//! pipeline. Applied to raw feature vectors before inference so inputs
//! match the distribution the model was trained on.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::predictor::FeatureScaler;

/// Per-column standardization parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load a fitted scaler from its JSON artifact.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler artifact {}", path.display()))?;
        let scaler: StandardScaler = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to decode scaler artifact {}", path.display()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            anyhow::bail!("Scaler artifact has no columns");
        }
        if self.mean.len() != self.scale.len() {
            anyhow::bail!(
                "Scaler parameter count mismatch: {} means, {} scales",
                self.mean.len(),
                self.scale.len()
            );
        }
        Ok(())
    }

    /// Map a raw vector to its standardized form.
    pub fn transform(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.mean.len() {
            anyhow::bail!(
                "Scaler width mismatch: fitted on {} columns, got {}",
                self.mean.len(),
                input.len()
            );
        }

        let standardized = input
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                if scale.abs() < 1e-10 {
                    0.0 // Avoid division by zero
                } else {
                    (value - mean) / scale
                }
            })
            .collect();

        Ok(standardized)
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, input: &[f64]) -> Result<Vec<f64>> {
        StandardScaler::transform(self, input)
    }
}
