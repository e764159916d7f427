//! Viewport statistics.
//!
//! Recomputed from scratch on every view-settle event over whatever features
//! the engine currently has rendered. The reducer never fails: an empty
//! viewport, an unselected property, or fully non-numeric data all map to
//! defined absent/empty results.

use scene::{Feature, PropertyPath, PropertyValue, coerce_number, lookup};

/// Descriptive statistics over the numeric sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Median of the sorted sample set.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub sigma: SigmaBand,
}

/// The one-sigma band around the mean.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaBand {
    pub floor: f64,
    pub ceiling: f64,
    /// Samples strictly inside the open interval (floor, ceiling).
    pub count: usize,
    pub outside: usize,
    /// Kept as `100 - count / n` for parity with the figure the UI has
    /// always shown, despite the name.
    pub percent: f64,
}

/// Summary of the selected property across the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySummary {
    /// Number of distinct raw values (including a null bucket when the
    /// path failed to resolve on some features).
    pub distinct_count: usize,
    /// Raw value -> occurrence count, descending by count, ties in
    /// first-seen order. Counts sum to the feature count.
    pub value_counts: Vec<(PropertyValue, usize)>,
    /// Absent when no value coerced to a finite number.
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportSummary {
    pub feature_count: usize,
    /// Absent when no property path is selected.
    pub property: Option<PropertySummary>,
    /// Tag -> occurrence count across all features, descending by count,
    /// ties in first-seen order.
    pub tag_counts: Vec<(String, usize)>,
}

/// Reduces the currently rendered features to a statistics summary for the
/// selected property path.
pub fn reduce_viewport(features: &[Feature], path: Option<&PropertyPath>) -> ViewportSummary {
    let tag_counts = count_tags(features);

    let property = match path {
        Some(path) if !path.is_empty() => Some(summarize_property(features, path)),
        _ => None,
    };

    ViewportSummary {
        feature_count: features.len(),
        property,
        tag_counts,
    }
}

fn summarize_property(features: &[Feature], path: &PropertyPath) -> PropertySummary {
    // Raw resolved values, one per feature; unresolved paths count as null.
    let raw: Vec<PropertyValue> = features
        .iter()
        .map(|f| {
            lookup(&f.properties, path)
                .cloned()
                .unwrap_or(PropertyValue::Null)
        })
        .collect();

    let value_counts = count_values(&raw);

    let samples: Vec<f64> = raw
        .iter()
        .filter_map(coerce_number)
        .filter(|n| n.is_finite())
        .collect();

    PropertySummary {
        distinct_count: value_counts.len(),
        value_counts,
        numeric: summarize_samples(&samples),
    }
}

fn summarize_samples(samples: &[f64]) -> Option<NumericSummary> {
    let (min, max) = min_max(samples)?;
    let mean = mean(samples)?;
    let std_dev = population_std_dev(samples, mean);
    let median = sorted_median(samples)?;

    let floor = mean - std_dev;
    let ceiling = mean + std_dev;
    let count = samples
        .iter()
        .filter(|&&v| v > floor && v < ceiling)
        .count();
    let sigma = SigmaBand {
        floor,
        ceiling,
        count,
        outside: samples.len() - count,
        percent: 100.0 - count as f64 / samples.len() as f64,
    };

    Some(NumericSummary {
        sample_count: samples.len(),
        min,
        max,
        mean,
        median,
        std_dev,
        sigma,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    for &v in values {
        sum += v;
    }
    Some(sum / values.len() as f64)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut min = first;
    let mut max = first;
    for &v in values.iter().skip(1) {
        min = min.min(v);
        max = max.max(v);
    }
    Some((min, max))
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum_sq = 0.0;
    for &v in values {
        let diff = v - mean;
        sum_sq += diff * diff;
    }
    (sum_sq / values.len() as f64).sqrt()
}

fn sorted_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Counts occurrences by structural equality, preserving first-seen order
/// for equal counts. Values are never stringified, so distinct array or
/// object values keep distinct buckets.
fn count_values(values: &[PropertyValue]) -> Vec<(PropertyValue, usize)> {
    let mut counts: Vec<(PropertyValue, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    // Stable sort keeps ties in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn count_tags(features: &[Feature]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for feature in features {
        for tag in feature.tags() {
            match counts.iter_mut().find(|(t, _)| t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.to_string(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
