pub mod app;
pub mod backend;
pub mod chart;
pub mod config;
pub mod decoder;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod synchronizer;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use decoder::decode;
pub use errors::ChartError;
pub use state::AppState;
pub use storage::load_series;
pub use synchronizer::{ChartHandle, UpdateOutcome, build};
