use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_TICK_COUNT;
use crate::error::{ChartError, ChartResult};

use super::ChartTheme;

/// Render engine bootstrap configuration.
///
/// Serializable so hosts can persist it next to their workbook settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEngineConfig {
    #[serde(default)]
    pub theme: ChartTheme,
    /// Desired number of value-axis intervals; overrides the theme's value.
    #[serde(default = "default_y_tick_count")]
    pub y_tick_count: usize,
    #[serde(default = "default_placeholder_label")]
    pub placeholder_label: String,
    /// Draw the selection border and resize handles over selected charts.
    #[serde(default = "default_draw_selection")]
    pub draw_selection: bool,
}

impl Default for RenderEngineConfig {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            y_tick_count: default_y_tick_count(),
            placeholder_label: default_placeholder_label(),
            draw_selection: default_draw_selection(),
        }
    }
}

impl RenderEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_y_tick_count(mut self, y_tick_count: usize) -> Self {
        self.y_tick_count = y_tick_count;
        self
    }

    #[must_use]
    pub fn with_placeholder_label(mut self, label: impl Into<String>) -> Self {
        self.placeholder_label = label.into();
        self
    }

    #[must_use]
    pub fn with_draw_selection(mut self, draw_selection: bool) -> Self {
        self.draw_selection = draw_selection;
        self
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|err| ChartError::InvalidData(format!("invalid engine config json: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ChartError::InvalidData(format!("failed to serialize config: {err}")))
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.y_tick_count == 0 {
            return Err(ChartError::InvalidData(
                "y tick count must be > 0".to_owned(),
            ));
        }
        if self.placeholder_label.trim().is_empty() {
            return Err(ChartError::InvalidData(
                "placeholder label must not be empty".to_owned(),
            ));
        }
        self.effective_theme().validate()
    }

    /// Theme with the configured tick density applied.
    #[must_use]
    pub fn effective_theme(&self) -> ChartTheme {
        ChartTheme {
            value_tick_count: self.y_tick_count,
            ..self.theme.clone()
        }
    }
}

fn default_y_tick_count() -> usize {
    DEFAULT_TICK_COUNT
}

fn default_placeholder_label() -> String {
    "Loading …".to_owned()
}

fn default_draw_selection() -> bool {
    true
}
