//! Seam between the synchronizer and whatever actually draws the chart.

use crate::chart::{ChartConfig, ChartData, SeriesKind};
use crate::errors::ChartError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::debug;

/// Rendering target the chart is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub id: String,
}

impl Surface {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A constructed chart whose data arrays can be patched in place.
pub trait LiveChart {
    fn config(&self) -> &ChartConfig;

    fn data_mut(&mut self) -> &mut ChartData;

    /// Redraws from the current data. Synchronous.
    fn update(&mut self);
}

pub trait ChartBackend {
    type Chart: LiveChart;

    fn register(&mut self, kinds: &[SeriesKind]);

    fn construct(&mut self, surface: &Surface, config: ChartConfig) -> Result<Self::Chart, ChartError>;
}

/// Revisioned copy of the chart published on every redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub revision: u64,
    pub surface: String,
    pub config: Option<ChartConfig>,
}

/// In-process backend that publishes each redraw on a watch channel.
pub struct SnapshotBackend {
    registered: HashSet<SeriesKind>,
    sender: watch::Sender<ChartSnapshot>,
}

impl SnapshotBackend {
    pub fn new() -> (Self, watch::Receiver<ChartSnapshot>) {
        let (sender, receiver) = watch::channel(ChartSnapshot {
            revision: 0,
            surface: String::new(),
            config: None,
        });
        let backend = Self {
            registered: HashSet::new(),
            sender,
        };
        (backend, receiver)
    }
}

impl ChartBackend for SnapshotBackend {
    type Chart = SnapshotChart;

    fn register(&mut self, kinds: &[SeriesKind]) {
        self.registered.extend(kinds.iter().copied());
    }

    fn construct(&mut self, surface: &Surface, config: ChartConfig) -> Result<SnapshotChart, ChartError> {
        if surface.id.trim().is_empty() {
            return Err(ChartError::MissingSurface);
        }
        for dataset in &config.data.datasets {
            if !self.registered.contains(&dataset.kind) {
                return Err(ChartError::UnregisteredSeries(format!("{:?}", dataset.kind)));
            }
        }

        debug!(surface = %surface.id, points = config.data.len(), "chart constructed");
        Ok(SnapshotChart {
            surface: surface.id.clone(),
            config,
            revision: self.sender.borrow().revision,
            sender: self.sender.clone(),
        })
    }
}

pub struct SnapshotChart {
    surface: String,
    config: ChartConfig,
    revision: u64,
    sender: watch::Sender<ChartSnapshot>,
}

impl SnapshotChart {
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl LiveChart for SnapshotChart {
    fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn data_mut(&mut self) -> &mut ChartData {
        &mut self.config.data
    }

    fn update(&mut self) {
        self.revision += 1;
        // send_replace keeps the value current even with no receivers left.
        self.sender.send_replace(ChartSnapshot {
            revision: self.revision,
            surface: self.surface.clone(),
            config: Some(self.config.clone()),
        });
    }
}
