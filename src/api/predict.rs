//! Demand prediction endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use crate::{
    api::error::ApiError,
    features::{EnergyType, FeatureVector},
    state::AppState,
};

const PREDICTION_FAILED: &str = "Prediction failed";

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub city: String,
    pub predictions: PredictionSet,
}

/// Per-type outcomes in response order
#[derive(Debug, Serialize)]
pub struct PredictionSet {
    pub solar: PredictionOutcome,
    pub wind: PredictionOutcome,
    pub coal: PredictionOutcome,
    pub hydro: PredictionOutcome,
}

/// A rounded demand estimate, or the fixed failure marker
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Demand(f64),
    Failed,
}

impl Serialize for PredictionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PredictionOutcome::Demand(value) => serializer.serialize_f64(*value),
            PredictionOutcome::Failed => serializer.serialize_str(PREDICTION_FAILED),
        }
    }
}

/// POST /predict - predict demand per energy type for one city.
///
/// Always 200 once the weather observation is in hand, however many of the
/// four per-type predictions individually failed.
pub async fn predict_demand(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let city = match req.city {
        Some(city) if !city.is_empty() => city,
        _ => return Err(ApiError::MissingCity),
    };

    let mut observations = state
        .weather
        .fetch_current(std::slice::from_ref(&city))
        .await;

    let Some(weather) = observations.remove(&city) else {
        return Err(ApiError::WeatherUnavailable(city));
    };

    let predict_for = |energy_type: EnergyType| {
        let features = FeatureVector::for_energy_type(&weather, energy_type);
        match state.predictor.predict(&features) {
            Ok(demand) => PredictionOutcome::Demand(demand),
            Err(e) => {
                warn!(%city, %energy_type, error = %e, "prediction failed");
                PredictionOutcome::Failed
            }
        }
    };

    let predictions = PredictionSet {
        solar: predict_for(EnergyType::Solar),
        wind: predict_for(EnergyType::Wind),
        coal: predict_for(EnergyType::Coal),
        hydro: predict_for(EnergyType::Hydro),
    };

    Ok(Json(PredictResponse { city, predictions }))
}
