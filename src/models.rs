use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One calendar day's recorded values. Either metric may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub calories: Option<f64>,
    pub weight: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, calories: Option<f64>, weight: Option<f64>) -> Self {
        Self {
            date,
            calories,
            weight,
        }
    }

    /// A day with nothing recorded.
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, None, None)
    }
}

/// Wire shape of a payload record before its date is normalized.
#[derive(Debug, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub date: String,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// How an update treats one stored value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldUpdate {
    /// Key absent: stored value is left alone
    #[default]
    Keep,
    /// Explicit `null`: stored value becomes "not recorded"
    Clear,
    Set(f64),
}

impl FieldUpdate {
    pub fn apply(self, current: Option<f64>) -> Option<f64> {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }
}

impl From<Option<f64>> for FieldUpdate {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<'de> Deserialize<'de> for FieldUpdate {
    // Only reached when the key is present; absent keys fall back to `Default`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer).map(FieldUpdate::from)
    }
}

/// A single day's revised values, as carried by an update notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NutritionUpdate {
    pub date: String,
    #[serde(default)]
    pub calories: FieldUpdate,
    #[serde(default)]
    pub weight: FieldUpdate,
}

impl NutritionUpdate {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            calories: FieldUpdate::Keep,
            weight: FieldUpdate::Keep,
        }
    }

    pub fn calories(mut self, calories: impl Into<FieldUpdate>) -> Self {
        self.calories = calories.into();
        self
    }

    pub fn weight(mut self, weight: impl Into<FieldUpdate>) -> Self {
        self.weight = weight.into();
        self
    }

    /// The stored day as it reads once this update is applied.
    pub fn apply_to(&self, observation: Observation) -> Observation {
        Observation::new(
            observation.date,
            self.calories.apply(observation.calories),
            self.weight.apply(observation.weight),
        )
    }
}

impl From<f64> for FieldUpdate {
    fn from(value: f64) -> Self {
        FieldUpdate::Set(value)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Applied,
    Unmatched,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: UpdateStatus,
    pub date: NaiveDate,
    pub index: Option<usize>,
    pub revision: u64,
}
