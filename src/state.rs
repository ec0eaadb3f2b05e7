use crate::backend::{ChartSnapshot, SnapshotBackend, Surface};
use crate::config::{AppConfig, MAX_DAYS};
use crate::errors::ChartError;
use crate::events::{EventBus, NUTRITION_UPDATED, SubscriptionId};
use crate::models::{NutritionUpdate, Observation};
use crate::stats::densify;
use crate::synchronizer::build;
use chrono::{Duration, NaiveDate};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, watch};
use tracing::info;

pub const CANVAS_ID: &str = "nutrition-diagram";

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub period_days: u32,
    /// Full stored series, including days outside the plotted window.
    pub records: Arc<Mutex<Vec<Observation>>>,
    session: Arc<Mutex<ChartSession>>,
    pub chart: watch::Receiver<ChartSnapshot>,
}

/// The plotted window and the update channel its chart handle listens on.
///
/// The backend outlives each handle, so revisions keep counting up when the
/// window is rebuilt for a new day.
pub struct ChartSession {
    backend: SnapshotBackend,
    bus: EventBus<NutritionUpdate>,
    subscription: Option<SubscriptionId>,
    window_days: u32,
    last_day: NaiveDate,
}

impl ChartSession {
    fn plot(&mut self, records: &[Observation], today: NaiveDate) -> Result<(), ChartError> {
        let (start, end) = window(today, self.window_days)?;
        let handle = build(&mut self.backend, &Surface::new(CANVAS_ID), &densify(records, start, end))?;

        if let Some(id) = self.subscription.take() {
            self.bus.unsubscribe(id);
        }
        self.subscription = Some(self.bus.subscribe(NUTRITION_UPDATED, handle));
        self.last_day = today;
        Ok(())
    }

    /// Rebuilds the chart when `today` is past the last plotted day.
    pub fn roll_to(&mut self, records: &[Observation], today: NaiveDate) -> Result<bool, ChartError> {
        if today <= self.last_day {
            return Ok(false);
        }
        info!(from = %self.last_day, to = %today, "rolling chart window");
        self.plot(records, today)?;
        Ok(true)
    }

    pub fn publish(&mut self, detail: Option<&NutritionUpdate>) -> Result<usize, ChartError> {
        self.bus.publish(NUTRITION_UPDATED, detail)
    }
}

/// Half-open `[start, end)` covering `days` days through `today`.
fn window(today: NaiveDate, days: u32) -> Result<(NaiveDate, NaiveDate), ChartError> {
    if days == 0 || days > MAX_DAYS {
        return Err(ChartError::WindowOutOfRange(days));
    }
    let start = today.checked_sub_signed(Duration::days(i64::from(days) - 1));
    let end = today.succ_opt();
    start.zip(end).ok_or(ChartError::WindowOutOfRange(days))
}

impl AppState {
    /// Builds the chart over the `window_days` ending at `today` and wires it
    /// to the update channel.
    pub fn new(config: &AppConfig, records: Vec<Observation>, today: NaiveDate) -> Result<Self, ChartError> {
        let (backend, chart) = SnapshotBackend::new();
        let mut session = ChartSession {
            backend,
            bus: EventBus::new(),
            subscription: None,
            window_days: config.window_days,
            last_day: today,
        };
        session.plot(&records, today)?;

        Ok(Self {
            data_path: config.data_path.clone(),
            period_days: config.period_days,
            records: Arc::new(Mutex::new(records)),
            session: Arc::new(Mutex::new(session)),
            chart,
        })
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        self.chart.borrow().clone()
    }

    /// Moves the window forward to `today` if the day has changed.
    pub async fn roll(&self, records: &[Observation], today: NaiveDate) -> Result<ChartSnapshot, ChartError> {
        self.session.lock().await.roll_to(records, today)?;
        Ok(self.snapshot())
    }

    /// Delivers a notification to the chart and returns the snapshot after it.
    pub async fn publish(&self, detail: Option<&NutritionUpdate>) -> Result<ChartSnapshot, ChartError> {
        self.session.lock().await.publish(detail)?;
        Ok(self.snapshot())
    }
}
