use crate::models::Observation;
use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

/// Energy stored in one kilogram of body fat, in kCal.
pub const CALORIES_PER_KILOGRAM: f64 = 7700.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageNutrition {
    pub calories: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyExpenditure {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub average_calories: f64,
    pub period_weight_difference: f64,
    pub total_daily_energy_expenditure: f64,
}

/// One observation per day in `[start, end)`; days without a record are
/// "not recorded".
pub fn densify(observations: &[Observation], start: NaiveDate, end: NaiveDate) -> Vec<Observation> {
    let days = (end - start).num_days().max(0) as usize;
    let mut dense = Vec::with_capacity(days);
    let mut day = start;
    while day < end {
        let observation = observations
            .iter()
            .find(|observation| observation.date == day)
            .copied()
            .unwrap_or_else(|| Observation::empty(day));
        dense.push(observation);
        day += Duration::days(1);
    }
    dense
}

/// Mean of the recorded values in `[start, end]`.
pub fn average(observations: &[Observation], start: NaiveDate, end: NaiveDate) -> AverageNutrition {
    let in_range: Vec<&Observation> = observations
        .iter()
        .filter(|observation| observation.date >= start && observation.date <= end)
        .collect();

    AverageNutrition {
        calories: mean(in_range.iter().filter_map(|o| o.calories)),
        weight: mean(in_range.iter().filter_map(|o| o.weight)),
    }
}

pub fn energy_expenditure(observations: &[Observation], period_days: u32) -> Option<EnergyExpenditure> {
    energy_expenditure_at(Local::now().date_naive(), observations, period_days)
}

/// Estimates daily expenditure over the `period_days` ending at `today`.
///
/// The weight trend against the preceding period of the same length is
/// converted to a daily surplus (or deficit) and taken off the average
/// intake. `None` while either period lacks weights or the current one
/// lacks calories, or when the periods reach past the calendar's range.
pub fn energy_expenditure_at(
    today: NaiveDate,
    observations: &[Observation],
    period_days: u32,
) -> Option<EnergyExpenditure> {
    if period_days == 0 {
        return None;
    }

    let length = Duration::days(i64::from(period_days) - 1);
    let end = today;
    let start = end.checked_sub_signed(length)?;
    let previous_end = start.checked_sub_signed(Duration::days(1))?;
    let previous_start = previous_end.checked_sub_signed(length)?;

    let current = average(observations, start, end);
    let previous = average(observations, previous_start, previous_end);

    let average_calories = current.calories?;
    let period_weight_difference = current.weight? - previous.weight?;
    let daily_surplus = period_weight_difference * CALORIES_PER_KILOGRAM / f64::from(period_days);

    Some(EnergyExpenditure {
        start,
        end,
        average_calories,
        period_weight_difference,
        total_daily_energy_expenditure: average_calories - daily_surplus,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}
