use crate::decoder::{decode, encode, sort_chronologically};
use crate::errors::{AppError, ChartError};
use crate::models::Observation;
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Reads the stored series, sorted by date. A missing or unreadable file
/// yields an empty series.
pub async fn load_series(path: &Path) -> Vec<Observation> {
    let mut series = match fs::read_to_string(path).await {
        Ok(raw) => match decode(Some(&raw)) {
            Ok(series) => series,
            Err(ChartError::MissingPayload) => Vec::new(),
            Err(err) => {
                error!("failed to parse data file: {err}");
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Vec::new()
        }
    };
    sort_chronologically(&mut series);
    series
}

pub async fn persist_series(path: &Path, series: &[Observation]) -> Result<(), AppError> {
    let payload = encode(series)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Replaces the stored day, or inserts it keeping the series sorted.
/// A day with nothing recorded is removed instead.
pub fn upsert(series: &mut Vec<Observation>, observation: Observation) {
    let position = series.binary_search_by_key(&observation.date, |stored| stored.date);
    let recorded = observation.calories.is_some() || observation.weight.is_some();
    match (position, recorded) {
        (Ok(index), true) => series[index] = observation,
        (Ok(index), false) => {
            series.remove(index);
        }
        (Err(index), true) => series.insert(index, observation),
        (Err(_), false) => {}
    }
}
