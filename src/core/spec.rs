use serde::{Deserialize, Serialize};

/// Mark type drawn by a chart. Only bars are painted today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MarkType {
    #[default]
    Bar,
}

/// Whether each series is read from a column or a row of the source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SeriesOrientation {
    #[default]
    Columns,
    Rows,
}

/// Inclusive cell rectangle on a sheet that feeds a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRangeRef {
    pub sheet_index: usize,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl DataRangeRef {
    #[must_use]
    pub const fn new(
        sheet_index: usize,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Self {
        Self {
            sheet_index,
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    #[must_use]
    pub fn row_count(self) -> u32 {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    #[must_use]
    pub fn col_count(self) -> u32 {
        self.end_col.saturating_sub(self.start_col) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDef {
    pub name: String,
    /// Column (or row) offset inside the data range.
    pub source_index: usize,
    #[serde(default)]
    pub color: Option<String>,
}

impl SeriesDef {
    #[must_use]
    pub fn new(name: impl Into<String>, source_index: usize) -> Self {
        Self {
            name: name.into(),
            source_index,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Category label rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LabelAngle {
    #[default]
    Horizontal,
    Diagonal,
    Vertical,
}

impl LabelAngle {
    #[must_use]
    pub const fn degrees(self) -> f64 {
        match self {
            Self::Horizontal => 0.0,
            Self::Diagonal => 45.0,
            Self::Vertical => 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpec {
    #[serde(default)]
    pub title: Option<String>,
    pub grid_lines: bool,
    pub show_labels: bool,
    #[serde(default)]
    pub label_angle: LabelAngle,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            title: None,
            grid_lines: false,
            show_labels: true,
            label_angle: LabelAngle::Horizontal,
            min: None,
            max: None,
        }
    }
}

impl AxisSpec {
    #[must_use]
    pub fn value_axis() -> Self {
        Self {
            grid_lines: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_label_angle(mut self, label_angle: LabelAngle) -> Self {
        self.label_angle = label_angle;
        self
    }

    pub(crate) fn visible_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LegendPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendSpec {
    pub visible: bool,
    #[serde(default)]
    pub position: LegendPosition,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            visible: true,
            position: LegendPosition::Bottom,
        }
    }
}

/// Declarative, user-authored chart description.
///
/// Index validity (`category_index`, each `source_index`) is the data
/// reader's concern; rendering assumes it was checked upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(default)]
    pub mark: MarkType,
    pub data_range: DataRangeRef,
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default)]
    pub series_orientation: SeriesOrientation,
    #[serde(default)]
    pub category_index: usize,
    pub series: Vec<SeriesDef>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_axis: AxisSpec,
    #[serde(default = "AxisSpec::value_axis")]
    pub y_axis: AxisSpec,
    #[serde(default)]
    pub legend: LegendSpec,
    #[serde(default = "default_palette")]
    pub palette: String,
}

fn default_palette() -> String {
    "default".to_owned()
}

impl ChartSpec {
    /// Bar chart over `data_range` with headers, categories in the first
    /// column and no series yet.
    #[must_use]
    pub fn bar(data_range: DataRangeRef) -> Self {
        Self {
            mark: MarkType::Bar,
            data_range,
            has_headers: true,
            series_orientation: SeriesOrientation::Columns,
            category_index: 0,
            series: Vec::new(),
            title: None,
            x_axis: AxisSpec::default(),
            y_axis: AxisSpec::value_axis(),
            legend: LegendSpec::default(),
            palette: default_palette(),
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: SeriesDef) -> Self {
        self.series.push(series);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_x_axis(mut self, axis: AxisSpec) -> Self {
        self.x_axis = axis;
        self
    }

    #[must_use]
    pub fn with_y_axis(mut self, axis: AxisSpec) -> Self {
        self.y_axis = axis;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendSpec) -> Self {
        self.legend = legend;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = palette.into();
        self
    }

    pub(crate) fn visible_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}
