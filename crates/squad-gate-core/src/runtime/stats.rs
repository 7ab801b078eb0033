// crates/squad-gate-core/src/runtime/stats.rs
// ============================================================================
// Module: Squad Gate Measurement Statistics
// Description: Average, best, trend, and count over metric value series.
// Purpose: Aggregate raw stored values with direction-aware comparisons.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! Values are stored as text. [`parse_metric_value`] accepts finite numbers
//! only; everything else is skipped without error so malformed history never
//! fails a request. Best values and trend labels follow the metric kind's
//! [`crate::core::BetterDirection`].
//!
//! Trend windows:
//! - four or more values: mean of the first quarter vs mean of the last quarter
//!   (quarter length is `count / 4`);
//! - two or three values: first value vs last value;
//! - fewer than two values: no trend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ExerciseId;
use crate::core::Measurement;
use crate::core::MeasurementQuery;
use crate::core::MetricKind;
use crate::core::PlayerId;
use crate::core::Scope;
use crate::core::TimeRange;
use crate::core::Trend;
use crate::interfaces::MeasurementStore;
use crate::interfaces::StoreError;
use crate::runtime::error::AccessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Aggregate statistics for one metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Metric kind the series was recorded in.
    pub metric: MetricKind,
    /// Arithmetic mean of parsed values.
    pub average: Option<f64>,
    /// Best parsed value per the metric's direction.
    pub best: Option<f64>,
    /// Early-vs-late movement.
    pub trend: Option<Trend>,
    /// Number of parsed values.
    pub count: usize,
}

/// Statistics for every metric of every exercise a player has measurements for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOverview {
    /// Player the overview describes.
    pub player_id: PlayerId,
    /// Per-exercise, per-metric statistics.
    pub exercises: BTreeMap<ExerciseId, BTreeMap<MetricKind, SeriesStats>>,
}

// ============================================================================
// SECTION: Pure Aggregation
// ============================================================================

/// Parses a stored value, accepting finite numbers only.
#[must_use]
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Computes statistics for a time-ordered series of raw values.
///
/// Unparsable values are skipped; an all-unparsable series behaves as empty.
#[must_use]
pub fn compute_series_stats<'a, I>(metric: MetricKind, raw_values: I) -> SeriesStats
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<f64> = raw_values.into_iter().filter_map(parse_metric_value).collect();
    let direction = metric.better_direction();
    let best = values.iter().copied().reduce(|incumbent, candidate| {
        if direction.is_better(candidate, incumbent) { candidate } else { incumbent }
    });
    let trend = trend_windows(&values).map(|(early, late)| direction.trend(early, late));
    SeriesStats {
        metric,
        average: mean(&values),
        best,
        trend,
        count: values.len(),
    }
}

/// Returns the early and late window averages, or `None` below two values.
fn trend_windows(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [] | [_] => None,
        [first, .., last] if values.len() < 4 => Some((*first, *last)),
        _ => {
            let quarter = values.len() / 4;
            let early = mean(&values[.. quarter])?;
            let late = mean(&values[values.len() - quarter ..])?;
            Some((early, late))
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
///
/// Finite inputs give a finite mean: when the plain sum overflows, each
/// value is scaled by the count before summing.
#[allow(clippy::cast_precision_loss, reason = "Series lengths stay far below 2^52.")]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let total: f64 = values.iter().sum();
    if total.is_finite() {
        return Some(total / count);
    }
    Some(values.iter().map(|value| value / count).sum())
}

// ============================================================================
// SECTION: Scoped Operations
// ============================================================================

/// Computes statistics for one player, exercise, and metric.
///
/// Only active measurements are read, oldest first.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] when the scope does not cover the player,
/// [`AccessError::NotFound`] when the exercise does not exist,
/// [`AccessError::Validation`] when the exercise does not declare the metric or
/// the range is inverted, and [`AccessError::Store`] on store failure.
pub fn compute_stats<S>(
    store: &S,
    scope: &Scope,
    player_id: PlayerId,
    exercise_id: ExerciseId,
    metric: MetricKind,
    recorded: TimeRange,
) -> Result<SeriesStats, AccessError>
where
    S: MeasurementStore + ?Sized,
{
    recorded.validate()?;
    if !scope.permits_player(player_id) {
        return Err(AccessError::Forbidden(format!("player {player_id} is outside scope")));
    }
    let exercise = store
        .exercise(exercise_id)?
        .ok_or_else(|| AccessError::NotFound(format!("exercise {exercise_id}")))?;
    if !exercise.declares(metric) {
        return Err(AccessError::Validation(format!(
            "exercise {exercise_id} does not declare metric {metric}"
        )));
    }
    let query = MeasurementQuery {
        player_id: Some(player_id),
        exercise_id: Some(exercise_id),
        recorded,
        ..MeasurementQuery::default()
    };
    let measurements = store.query_measurements(&query)?;
    Ok(series_for(metric, &measurements))
}

/// Computes statistics for every declared metric of every exercise the player
/// has active measurements for in the range.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] when the scope does not cover the player,
/// [`AccessError::Validation`] for an inverted range, and
/// [`AccessError::Store`] on store failure or a dangling exercise reference.
pub fn player_overview<S>(
    store: &S,
    scope: &Scope,
    player_id: PlayerId,
    recorded: TimeRange,
) -> Result<PlayerOverview, AccessError>
where
    S: MeasurementStore + ?Sized,
{
    recorded.validate()?;
    if !scope.permits_player(player_id) {
        return Err(AccessError::Forbidden(format!("player {player_id} is outside scope")));
    }
    let query = MeasurementQuery {
        player_id: Some(player_id),
        recorded,
        ..MeasurementQuery::default()
    };
    let mut by_exercise: BTreeMap<ExerciseId, Vec<Measurement>> = BTreeMap::new();
    for measurement in store.query_measurements(&query)? {
        by_exercise.entry(measurement.exercise_id).or_default().push(measurement);
    }

    let mut exercises = BTreeMap::new();
    for (exercise_id, measurements) in by_exercise {
        let exercise = store.exercise(exercise_id)?.ok_or_else(|| {
            StoreError::Corrupt(format!(
                "measurement references missing exercise {exercise_id}"
            ))
        })?;
        let per_metric = exercise
            .metrics
            .iter()
            .map(|declared| (declared.kind, series_for(declared.kind, &measurements)))
            .collect();
        exercises.insert(exercise_id, per_metric);
    }
    Ok(PlayerOverview {
        player_id,
        exercises,
    })
}

/// Extracts one metric's raw values from ordered measurements and aggregates them.
fn series_for(metric: MetricKind, measurements: &[Measurement]) -> SeriesStats {
    compute_series_stats(
        metric,
        measurements.iter().filter_map(|measurement| measurement.value_for(metric)),
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================
