use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    /// One value per category, aligned by position.
    pub values: Vec<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Value at `category_index`, with missing or non-finite entries read as zero.
    #[must_use]
    pub fn value_at(&self, category_index: usize) -> f64 {
        self.values
            .get(category_index)
            .copied()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }
}

/// Categories and numeric series resolved from a chart's source range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedChartData {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ParsedChartData {
    #[must_use]
    pub fn new(categories: Vec<String>, series: Vec<Series>) -> Self {
        Self { categories, series }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }

    /// Checks that every series carries exactly one value per category.
    pub fn validate(&self) -> ChartResult<()> {
        for series in &self.series {
            if series.values.len() != self.categories.len() {
                return Err(ChartError::InvalidData(format!(
                    "series `{}` has {} values for {} categories",
                    series.name,
                    series.values.len(),
                    self.categories.len()
                )));
            }
        }
        Ok(())
    }

    /// Min/max over all values painted, with missing values read as zero.
    ///
    /// Returns `None` when there is nothing to paint.
    #[must_use]
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for series in &self.series {
            for category_index in 0..self.categories.len() {
                let value = series.value_at(category_index);
                min = min.min(value);
                max = max.max(value);
            }
        }
        Some((min, max))
    }

    /// Character count of the longest category label.
    #[must_use]
    pub fn longest_category_chars(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Character count of the longest series name.
    #[must_use]
    pub fn longest_series_name_chars(&self) -> usize {
        self.series
            .iter()
            .map(|series| series.name.chars().count())
            .max()
            .unwrap_or(0)
    }
}
