use crate::backend::ChartSnapshot;
use crate::decoder::{encode, parse_day};
use crate::errors::{AppError, ChartError};
use crate::models::{NutritionUpdate, Observation, UpdateResponse, UpdateStatus};
use crate::state::AppState;
use crate::stats::{EnergyExpenditure, energy_expenditure};
use crate::storage::{persist_series, upsert};
use crate::ui::render_index;
use axum::{Json, body::Bytes, extract::State, response::Html};
use chrono::Local;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let records = state.records.lock().await;
    let snapshot = state.roll(&records, Local::now().date_naive()).await?;
    let payload = encode(&plotted(&snapshot))?;

    let expenditure = energy_expenditure(&records, state.period_days);
    Ok(Html(render_index(&payload, expenditure.as_ref())?))
}

pub async fn get_chart(State(state): State<AppState>) -> Result<Json<ChartSnapshot>, AppError> {
    let records = state.records.lock().await;
    Ok(Json(state.roll(&records, Local::now().date_naive()).await?))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<Option<EnergyExpenditure>> {
    let records = state.records.lock().await;
    Json(energy_expenditure(&records, state.period_days))
}

/// Persists the revised day, then publishes the notification to the chart.
///
/// An empty body or `null` is a notification without detail.
pub async fn update_nutrition(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, AppError> {
    let detail = parse_detail(&body)?;

    // Held until published so notifications are handled one at a time.
    let mut records = state.records.lock().await;
    let before = state.roll(&records, Local::now().date_naive()).await?;

    let Some(detail) = detail else {
        state.publish(None).await?;
        return Err(ChartError::MissingDetail.into());
    };
    let date = parse_day(&detail.date)?;
    let observations = plotted(&before);

    let Some(index) = observations.iter().position(|o| o.date == date) else {
        let snapshot = state.publish(Some(&detail)).await?;
        return Ok(Json(UpdateResponse {
            status: UpdateStatus::Unmatched,
            date,
            index: None,
            revision: snapshot.revision,
        }));
    };

    let mut next = records.clone();
    upsert(&mut next, detail.apply_to(observations[index]));
    persist_series(&state.data_path, &next).await?;

    let snapshot = state.publish(Some(&detail)).await?;
    *records = next;

    info!(%date, revision = snapshot.revision, "nutrition updated");
    Ok(Json(UpdateResponse {
        status: UpdateStatus::Applied,
        date,
        index: Some(index),
        revision: snapshot.revision,
    }))
}

fn plotted(snapshot: &ChartSnapshot) -> Vec<Observation> {
    snapshot
        .config
        .as_ref()
        .map(|config| config.data.observations())
        .unwrap_or_default()
}

fn parse_detail(body: &[u8]) -> Result<Option<NutritionUpdate>, ChartError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map_err(|err| ChartError::MalformedPayload(err.to_string()))
}
