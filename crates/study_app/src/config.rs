use std::path::PathBuf;

use anyhow::Result;
use study_core::{Clock, DayId};
use tracing::{info, warn};

const DATA_FILE_NAME: &str = "planner.json";
const DATA_DIR_NAME: &str = ".study_planner";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_path: PathBuf,
    pub(crate) today: Option<DayId>,
}

impl AppConfig {
    /// Reads `STUDY_DATA_PATH` and `STUDY_TODAY`. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("STUDY_DATA_PATH") {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path.trim());
            }
        }
        if let Ok(raw) = std::env::var("STUDY_TODAY") {
            match raw.trim().parse::<DayId>() {
                Ok(day) => config.today = Some(day),
                Err(err) => warn!(%err, "ignoring STUDY_TODAY"),
            }
        }
        Ok(config)
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data_path = path;
        }
        self
    }

    pub fn with_today(mut self, today: Option<DayId>) -> Self {
        if today.is_some() {
            self.today = today;
        }
        self
    }

    pub fn data_path(&self) -> &PathBuf {
        &self.data_path
    }

    pub fn clock(&self) -> Clock {
        match self.today {
            Some(day) => {
                info!(%day, "using fixed day");
                Clock::fixed(day)
            }
            None => Clock::System,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_path = std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(DATA_DIR_NAME).join(DATA_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME));
        Self {
            data_path,
            today: None,
        }
    }
}
