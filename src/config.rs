use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/nutrition.json";
const DEFAULT_WINDOW_DAYS: u32 = 14;
const DEFAULT_PERIOD_DAYS: u32 = 7;

/// Upper bound for any configured day count (about ten years).
pub const MAX_DAYS: u32 = 3660;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// Days plotted, ending today.
    pub window_days: u32,
    /// Length of each period compared by the expenditure estimate.
    pub period_days: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
            data_path: resolve_data_path(),
            window_days: clamp_days(parse_var("NUTRITION_WINDOW_DAYS"), DEFAULT_WINDOW_DAYS),
            period_days: clamp_days(parse_var("NUTRITION_PERIOD_DAYS"), DEFAULT_PERIOD_DAYS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window_days: DEFAULT_WINDOW_DAYS,
            period_days: DEFAULT_PERIOD_DAYS,
        }
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

fn clamp_days(value: Option<u32>, default: u32) -> u32 {
    value.unwrap_or(default).clamp(1, MAX_DAYS)
}
