//! Feature engineering for the demand model
//!
//! Builds the fixed-order input vector the scaler and the LSTM were fitted
//! on. The column order here must stay bit-for-bit identical to the
//! training pipeline; reordering silently ruins every prediction.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::weather::WeatherRecord;

/// Energy generation types carrying a signal column in the training data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    Biomass,
    Coal,
    Hydro,
    Solar,
    Wind,
}

impl EnergyType {
    /// The types predicted for every request, in response order.
    pub const PREDICTED: [EnergyType; 4] = [
        EnergyType::Solar,
        EnergyType::Wind,
        EnergyType::Coal,
        EnergyType::Hydro,
    ];
}

/// Column order the scaler and model were fitted on.
pub const FEATURE_COLUMNS: [&str; 29] = [
    "generation_biomass",
    "generation_fossil_brown_coal/lignite",
    "generation_fossil_gas",
    "generation_fossil_hard_coal",
    "generation_fossil_oil",
    "generation_hydro_pumped_storage_consumption",
    "generation_hydro_run-of-river_and_poundage",
    "generation_hydro_water_reservoir",
    "generation_nuclear",
    "generation_other",
    "generation_other_renewable",
    "generation_solar",
    "generation_waste",
    "generation_wind_onshore",
    "temp",
    "temp_min",
    "temp_max",
    "pressure",
    "humidity",
    "wind_speed",
    "wind_deg",
    "rain_1h",
    "clouds_all",
    "is_clear",
    "is_clouds",
    "is_drizzle",
    "is_fog",
    "is_mist",
    "is_rain",
];

// Generation signal magnitudes from the training data distribution.
const BIOMASS_SIGNAL: f64 = 450.0;
const BROWN_COAL_SIGNAL: f64 = 329.0;
const OIL_SIGNAL: f64 = 100.0;
const SOLAR_SIGNAL: f64 = 6378.0;
const WIND_SIGNAL: f64 = 6378.0;

// Temperature bounds fixed at training time, independent of the observation.
const TEMP_MIN_K: f64 = 278.0;
const TEMP_MAX_K: f64 = 300.0;

/// Model input vector in [`FEATURE_COLUMNS`] order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build the input vector for one (observation, energy type) pair.
    ///
    /// Pure mapping: exactly one generation column carries the type signal
    /// (coal also sets the oil column); a type with no matching column,
    /// such as hydro, passes through with all generation columns zero. The
    /// six condition flags are fixed at zero.
    pub fn for_energy_type(weather: &WeatherRecord, energy_type: EnergyType) -> Self {
        let mut generation = [0.0_f64; 14];
        match energy_type {
            EnergyType::Biomass => generation[0] = BIOMASS_SIGNAL,
            EnergyType::Coal => {
                generation[1] = BROWN_COAL_SIGNAL;
                generation[4] = OIL_SIGNAL;
            }
            EnergyType::Solar => generation[11] = SOLAR_SIGNAL,
            EnergyType::Wind => generation[13] = WIND_SIGNAL,
            // No generation column in the training data maps to hydro.
            EnergyType::Hydro => {}
        }

        let mut values = Vec::with_capacity(FEATURE_COLUMNS.len());
        values.extend_from_slice(&generation);
        values.extend_from_slice(&[
            weather.temperature,
            TEMP_MIN_K,
            TEMP_MAX_K,
            weather.pressure,
            weather.humidity,
            weather.wind_speed,
            weather.wind_degree,
            weather.precipitation,
            weather.cloud_cover,
        ]);
        // is_clear, is_clouds, is_drizzle, is_fog, is_mist, is_rain
        values.extend_from_slice(&[0.0; 6]);

        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
