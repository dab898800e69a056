use std::sync::Arc;

use crate::config::Config;
use crate::ml::{load_artifacts, DemandPredictor};
use crate::weather::WeatherClient;

/// Process-wide state built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub weather: Arc<WeatherClient>,
    pub predictor: Arc<DemandPredictor>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let weather = Arc::new(WeatherClient::new(&cfg.weather));
        let predictor = Arc::new(load_artifacts(
            &cfg.model.weights_path,
            &cfg.model.scaler_path,
        ));

        Self {
            cfg,
            weather,
            predictor,
        }
    }
}
