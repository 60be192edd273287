//! Time-series trend evaluation over fetched record history.
//!
//! Smooths a metric with a scalar Kalman filter, down-weighting
//! anomalous measurements, then evaluates trend direction and strength
//! from the filtered series. Evaluation-time only: nothing here touches
//! the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kalman filter tuning.
#[derive(Debug, Clone, Copy)]
pub struct KalmanConfig {
    /// Process noise variance.
    pub process_noise: f64,
    /// Measurement noise variance.
    pub measurement_noise: f64,
    /// Initial estimate error variance.
    pub initial_error: f64,
    /// Innovation threshold, in standard deviations, above which a
    /// measurement is flagged anomalous.
    pub anomaly_sigma_threshold: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-2,
            measurement_noise: 4e-1,
            initial_error: 1.0,
            anomaly_sigma_threshold: 3.0,
        }
    }
}

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Metric is rising.
    Up,
    /// Metric is falling.
    Down,
    /// No meaningful slope.
    Stable,
}

/// Fitted trend over a filtered series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    /// Trend direction.
    pub direction: TrendDirection,
    /// Least-squares slope, in metric units per hour.
    pub slope: f64,
    /// Confidence in [0, 1], penalized by anomaly density.
    pub confidence: f64,
    /// Number of anomalous measurements in the series.
    pub anomaly_count: usize,
    /// Number of points the fit used.
    pub points_used: usize,
}

/// Full analysis of one metric's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    /// Unix timestamps, ascending.
    pub timestamps: Vec<i64>,
    /// Raw metric values in timestamp order.
    pub raw_values: Vec<f64>,
    /// Kalman-filtered values.
    pub filtered_values: Vec<f64>,
    /// Indices of anomalous measurements.
    pub anomaly_indices: Vec<usize>,
    /// Fitted trend.
    pub trend: TrendResult,
}

/// Run the scalar Kalman filter over a value series.
///
/// Returns the filtered series and the indices of measurements whose
/// innovation exceeded the anomaly threshold. Anomalous measurements
/// still update the estimate, but with their noise inflated 6x so a
/// spike bends the track instead of capturing it.
#[must_use]
pub fn kalman_filter(values: &[f64], cfg: &KalmanConfig) -> (Vec<f64>, Vec<usize>) {
    let Some(&first) = values.first() else {
        return (Vec::new(), Vec::new());
    };

    let mut x = first;
    let mut p = cfg.initial_error;

    let mut filtered = Vec::with_capacity(values.len());
    let mut anomalies = Vec::new();

    for (i, &z) in values.iter().enumerate() {
        // Predict
        let p_pred = p + cfg.process_noise;
        let x_pred = x;

        // Innovation
        let innovation = z - x_pred;
        let innovation_var = p_pred + cfg.measurement_noise;
        let innovation_std = innovation_var.max(1e-9).sqrt();

        let is_anomaly = innovation.abs() > cfg.anomaly_sigma_threshold * innovation_std;
        if is_anomaly {
            anomalies.push(i);
        }

        let r_eff = cfg.measurement_noise * if is_anomaly { 6.0 } else { 1.0 };

        // Update
        let k = p_pred / (p_pred + r_eff);
        x = x_pred + k * innovation;
        p = (1.0 - k) * p_pred;

        filtered.push(x);
    }

    (filtered, anomalies)
}

fn linear_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let num: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let den: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if den == 0.0 {
        return 0.0;
    }
    num / den
}

/// Fit a trend over a filtered series.
///
/// Slope is least-squares over hours-from-start; direction applies a
/// ±0.01 deadband; confidence scales slope strength against the series
/// span and is penalized by the anomaly ratio.
#[must_use]
pub fn evaluate_trend(
    timestamps: &[i64],
    filtered_values: &[f64],
    anomaly_count: usize,
) -> TrendResult {
    let n = timestamps.len().min(filtered_values.len());
    if n < 3 {
        return TrendResult {
            direction: TrendDirection::Stable,
            slope: 0.0,
            confidence: 0.0,
            anomaly_count,
            points_used: n,
        };
    }

    let ts0 = timestamps[0];
    let xs: Vec<f64> = timestamps[..n]
        .iter()
        .map(|&t| ((t - ts0) as f64 / 3600.0).max(0.0))
        .collect();
    let ys = &filtered_values[..n];

    let slope = linear_slope(&xs, ys);

    let y_span = ys.iter().cloned().fold(f64::MIN, f64::max)
        - ys.iter().cloned().fold(f64::MAX, f64::min);
    let x_span = (xs[n - 1] - xs[0]).max(1.0);
    let slope_strength = (slope.abs() / (y_span / x_span).max(0.1)).min(1.0);
    let anomaly_penalty = (anomaly_count as f64 / (n as f64).max(1.0)).min(0.6);
    let confidence = (slope_strength * (1.0 - anomaly_penalty)).clamp(0.0, 1.0);

    let direction = if slope.abs() < 0.01 {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    TrendResult {
        direction,
        slope,
        confidence,
        anomaly_count,
        points_used: n,
    }
}

/// Analyze one metric across a history of stored records.
///
/// Accepts both flattened (`{"ts": .., "temperature": ..}`) and nested
/// (`{"ts": .., "sensor": {"temperature": ..}}`) record shapes; records
/// missing the timestamp or the metric are skipped. History is sorted by
/// timestamp before filtering.
#[must_use]
pub fn analyze_metric_history(
    history: &[Value],
    metric_key: &str,
    cfg: &KalmanConfig,
) -> SeriesAnalysis {
    let mut parsed: Vec<(i64, f64)> = history
        .iter()
        .filter_map(|record| {
            let ts = record.get("ts").and_then(Value::as_i64)?;
            let value = extract_metric(record, metric_key)?;
            Some((ts, value))
        })
        .collect();
    parsed.sort_by_key(|&(ts, _)| ts);

    let timestamps: Vec<i64> = parsed.iter().map(|&(t, _)| t).collect();
    let raw_values: Vec<f64> = parsed.iter().map(|&(_, v)| v).collect();

    let (filtered_values, anomaly_indices) = kalman_filter(&raw_values, cfg);
    let trend = evaluate_trend(&timestamps, &filtered_values, anomaly_indices.len());

    SeriesAnalysis {
        timestamps,
        raw_values,
        filtered_values,
        anomaly_indices,
        trend,
    }
}

fn extract_metric(record: &Value, metric_key: &str) -> Option<f64> {
    if let Some(value) = record.get(metric_key).and_then(Value::as_f64) {
        return Some(value);
    }
    record
        .get("sensor")
        .and_then(|sensor| sensor.get(metric_key))
        .and_then(Value::as_f64)
}
