//! Chart configuration handed to the rendering backend.
//!
//! Serializes to the option tree a Chart.js-style renderer consumes: calories
//! as bars on a right-hand axis, weight as a line on a left-hand axis, both
//! over a shared day-granular time axis.

use crate::models::Observation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CALORIES_DATASET: usize = 0;
pub const WEIGHT_DATASET: usize = 1;

pub const CALORIES_AXIS: &str = "caloriesAxis";
pub const WEIGHT_AXIS: &str = "weightAxis";

const CALORIES_TITLE: &str = "Calories (kCal)";
const WEIGHT_TITLE: &str = "Weight (kg)";
const CALORIES_STEP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn nutrition(observations: &[Observation]) -> Self {
        Self {
            kind: SeriesKind::Line,
            data: ChartData::nutrition(observations),
            options: ChartOptions::nutrition(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    fn nutrition(observations: &[Observation]) -> Self {
        let calories = Dataset {
            kind: SeriesKind::Bar,
            label: CALORIES_TITLE.to_string(),
            border_color: "rgb(186, 230, 253)".to_string(),
            background_color: "rgba(125, 211, 252, 0.5)".to_string(),
            y_axis_id: CALORIES_AXIS.to_string(),
            data: observations.iter().map(|o| o.calories).collect(),
        };
        let weight = Dataset {
            kind: SeriesKind::Line,
            label: WEIGHT_TITLE.to_string(),
            border_color: "rgba(253, 230, 138)".to_string(),
            background_color: "rgba(252, 211, 77)".to_string(),
            y_axis_id: WEIGHT_AXIS.to_string(),
            data: observations.iter().map(|o| o.weight).collect(),
        };

        Self {
            labels: observations.iter().map(|o| o.date).collect(),
            datasets: vec![calories, weight],
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn calories(&self) -> &[Option<f64>] {
        &self.datasets[CALORIES_DATASET].data
    }

    pub fn weights(&self) -> &[Option<f64>] {
        &self.datasets[WEIGHT_DATASET].data
    }

    /// Projects labels and both data arrays back into a series.
    pub fn observations(&self) -> Vec<Observation> {
        self.labels
            .iter()
            .zip(self.calories())
            .zip(self.weights())
            .map(|((date, calories), weight)| Observation::new(*date, *calories, *weight))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: String,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub interaction: Interaction,
    pub scales: Scales,
}

impl ChartOptions {
    fn nutrition() -> Self {
        Self {
            interaction: Interaction {
                mode: InteractionMode::Index,
                intersect: false,
            },
            scales: Scales {
                x: TimeAxis {
                    kind: "time".to_string(),
                    time: TimeOptions {
                        unit: "day".to_string(),
                    },
                    grid: Grid::hidden(),
                },
                weight_axis: ValueAxis {
                    kind: None,
                    title: AxisTitle::shown(WEIGHT_TITLE),
                    grid: Grid::tinted("rgba(180, 83, 9, 0.2)"),
                    position: AxisPosition::Left,
                    begin_at_zero: None,
                    ticks: None,
                },
                calories_axis: ValueAxis {
                    kind: Some("linear".to_string()),
                    title: AxisTitle::shown(CALORIES_TITLE),
                    grid: Grid::tinted("rgba(3, 105, 161, 0.2)"),
                    position: AxisPosition::Right,
                    begin_at_zero: Some(false),
                    ticks: Some(Ticks {
                        step_size: CALORIES_STEP,
                    }),
                },
            },
        }
    }
}

/// Hovering one x-position reports every series sharing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub mode: InteractionMode,
    pub intersect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    pub x: TimeAxis,
    pub weight_axis: ValueAxis,
    pub calories_axis: ValueAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    #[serde(rename = "type")]
    pub kind: String,
    pub time: TimeOptions,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOptions {
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: AxisTitle,
    pub grid: Grid,
    pub position: AxisPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Ticks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub text: String,
    pub display: bool,
}

impl AxisTitle {
    fn shown(text: &str) -> Self {
        Self {
            text: text.to_string(),
            display: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Grid {
    fn hidden() -> Self {
        Self {
            display: Some(false),
            color: None,
        }
    }

    fn tinted(color: &str) -> Self {
        Self {
            display: None,
            color: Some(color.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub step_size: f64,
}
