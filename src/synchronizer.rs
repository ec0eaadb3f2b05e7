//! Owns the live nutrition chart and patches it as update notifications
//! arrive.
//!
//! The x-domain is fixed when the chart is built: updates for dates outside
//! it are dropped, never appended.

use crate::backend::{ChartBackend, LiveChart, Surface};
use crate::chart::{CALORIES_DATASET, ChartConfig, SeriesKind, WEIGHT_DATASET};
use crate::decoder::parse_day;
use crate::errors::ChartError;
use crate::events::Subscriber;
use crate::models::{NutritionUpdate, Observation};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied { index: usize, date: NaiveDate },
    Unmatched(NaiveDate),
}

/// Live chart plus the date → index mapping built with it.
pub struct ChartHandle<C> {
    chart: C,
    index: HashMap<NaiveDate, usize>,
}

/// Builds the calories/weight chart on `surface` from a non-empty series.
pub fn build<B>(
    backend: &mut B,
    surface: &Surface,
    observations: &[Observation],
) -> Result<ChartHandle<B::Chart>, ChartError>
where
    B: ChartBackend,
{
    if observations.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    backend.register(&[SeriesKind::Bar, SeriesKind::Line]);
    let config = ChartConfig::nutrition(observations);
    let mut chart = backend.construct(surface, config)?;

    let index = observations
        .iter()
        .enumerate()
        .map(|(position, observation)| (observation.date, position))
        .collect();
    chart.update();

    info!(surface = %surface.id, points = observations.len(), "nutrition chart built");
    Ok(ChartHandle { chart, index })
}

impl<C: LiveChart> ChartHandle<C> {
    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.index.get(&date).copied()
    }

    pub fn labels(&self) -> &[NaiveDate] {
        &self.chart.config().data.labels
    }

    pub fn calories(&self) -> &[Option<f64>] {
        self.chart.config().data.calories()
    }

    pub fn weights(&self) -> &[Option<f64>] {
        self.chart.config().data.weights()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.chart.config().data.observations()
    }

    /// Patches one day's values and redraws before returning.
    ///
    /// An update for a date the chart does not plot is logged and dropped.
    pub fn apply_update(&mut self, update: Option<&NutritionUpdate>) -> Result<UpdateOutcome, ChartError> {
        let update = update.ok_or(ChartError::MissingDetail)?;
        let date = parse_day(&update.date)?;

        let Some(index) = self.index_of(date) else {
            warn!("{}", ChartError::UnmatchedDate(date));
            return Ok(UpdateOutcome::Unmatched(date));
        };

        let data = self.chart.data_mut();
        let calories = &mut data.datasets[CALORIES_DATASET].data[index];
        *calories = update.calories.apply(*calories);
        let weight = &mut data.datasets[WEIGHT_DATASET].data[index];
        *weight = update.weight.apply(*weight);

        self.chart.update();
        debug!(%date, index, "nutrition point updated");
        Ok(UpdateOutcome::Applied { index, date })
    }
}

impl<C> Subscriber<NutritionUpdate> for ChartHandle<C>
where
    C: LiveChart + Send,
{
    fn notify(&mut self, detail: Option<&NutritionUpdate>) -> Result<(), ChartError> {
        self.apply_update(detail).map(|_| ())
    }
}
