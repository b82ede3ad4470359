//! Category distribution of global trend counts.
//!
//! Per-day records are summed per category into a single dataset, one
//! colour per category.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiError, TrendRecord, TrendsResponse};

pub const DATASET_LABEL: &str = "Total views";

/// A colour with opacity, as used by chart palettes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Fixed colours for known categories, keyed by lower-cased name.
const CATEGORY_COLORS: [(&str, Rgba); 5] = [
    ("technologie", Rgba::new(174, 196, 211, 0.9)),
    ("finance", Rgba::new(9, 79, 79, 0.9)),
    ("sport", Rgba::new(19, 55, 197, 0.9)),
    ("santé", Rgba::new(11, 217, 123, 0.9)),
    ("autre", Rgba::new(79, 217, 205, 0.9)),
];

/// Shades picked at random for categories without a fixed colour.
pub const FALLBACK_BLUES: [Rgba; 6] = [
    Rgba::new(54, 162, 235, 0.9),
    Rgba::new(30, 144, 255, 0.9),
    Rgba::new(70, 130, 180, 0.9),
    Rgba::new(100, 149, 237, 0.9),
    Rgba::new(65, 105, 225, 0.9),
    Rgba::new(123, 104, 238, 0.9),
];

pub fn category_color(category: &str) -> Option<Rgba> {
    let key = category.to_lowercase();
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| *color)
}

pub fn random_blue() -> Rgba {
    FALLBACK_BLUES[rand::rng().random_range(0..FALLBACK_BLUES.len())]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub colors: Vec<Rgba>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// One category's slice of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share<'a> {
    pub label: &'a str,
    pub value: f64,
    pub percent: f64,
    pub color: Rgba,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.datasets
            .first()
            .map(|d| d.data.iter().sum())
            .unwrap_or(0.0)
    }

    /// Categories with their totals and percentage of the grand total.
    pub fn shares(&self) -> Vec<Share<'_>> {
        let Some(dataset) = self.datasets.first() else {
            return Vec::new();
        };
        let total = self.total();
        self.labels
            .iter()
            .zip(&dataset.data)
            .zip(&dataset.colors)
            .map(|((label, &value), &color)| Share {
                label,
                value,
                percent: if total > 0.0 { value / total * 100.0 } else { 0.0 },
                color,
            })
            .collect()
    }
}

/// Sum counts per trimmed category, using a random blue for unknown categories.
pub fn transform(records: &[TrendRecord]) -> ChartData {
    transform_with(records, random_blue)
}

/// [`transform`] with the fallback colour supplied by the caller.
///
/// Keys compare case-sensitively after trimming. Records whose count is not
/// a finite positive number are dropped and do not create a label.
pub fn transform_with(records: &[TrendRecord], mut fallback: impl FnMut() -> Rgba) -> ChartData {
    let mut labels: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for record in records {
        let Some(count) = record.count_value().filter(|c| c.is_finite() && *c > 0.0) else {
            continue;
        };
        let key = record.category.trim();
        match totals.get_mut(key) {
            Some(total) => *total += count,
            None => {
                labels.push(key.to_string());
                totals.insert(key.to_string(), count);
            }
        }
    }

    let data: Vec<f64> = labels.iter().map(|l| totals[l.as_str()]).collect();
    let colors = labels
        .iter()
        .map(|l| category_color(l).unwrap_or_else(&mut fallback))
        .collect();

    ChartData {
        labels,
        datasets: vec![Dataset {
            label: DATASET_LABEL.to_string(),
            data,
            colors,
        }],
    }
}

/// Why there is no chart to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("No data found for the selected period.")]
    Empty,
    #[error("Invalid or unsuccessful data received.")]
    Invalid,
    #[error("Failed to load global trends.")]
    LoadFailed,
}

/// Turn the outcome of `GET /trends/global` into chart data or the message to show.
pub fn chart_from_response(
    response: Result<TrendsResponse, ApiError>,
    fallback: impl FnMut() -> Rgba,
) -> Result<ChartData, ChartError> {
    let response = match response {
        Ok(r) => r,
        Err(ApiError::Decode(e)) => {
            tracing::warn!(error = %e, "Malformed trends reply");
            return Err(ChartError::Invalid);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Global trends request failed");
            return Err(ChartError::LoadFailed);
        }
    };

    let records = match (response.success, response.data) {
        (true, Some(Value::Array(items))) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<TrendRecord>(item) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed trend record");
                    None
                }
            })
            .collect::<Vec<_>>(),
        _ => return Err(ChartError::Invalid),
    };

    let chart = transform_with(&records, fallback);
    if chart.is_empty() {
        return Err(ChartError::Empty);
    }
    Ok(chart)
}

/// Plain-text table of the distribution, one category per line.
pub fn format_table(chart: &ChartData) -> String {
    let width = chart
        .labels
        .iter()
        .map(|l| crate::util::display_width(l))
        .max()
        .unwrap_or(0)
        .max("Category".len());
    let mut out = format!("{:<width$}  {:>12}  {:>6}\n", "Category", DATASET_LABEL, "Share");
    for share in chart.shares() {
        let pad = width.saturating_sub(crate::util::display_width(share.label));
        out.push_str(&format!(
            "{}{}  {:>12}  {:>5.1}%\n",
            share.label,
            " ".repeat(pad),
            share.value,
            share.percent
        ));
    }
    out.push_str(&format!("{:<width$}  {:>12}\n", "Total", chart.total()));
    out
}
