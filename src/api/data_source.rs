use std::cell::RefCell;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ChartSpec, ParsedChartData, Series, SeriesOrientation};
use crate::error::{ChartError, ChartResult};

/// Resolves a chart's declared cell range into categories and series.
///
/// The future is awaited on the UI thread, so it need not be `Send`.
pub trait ChartDataSource {
    fn fetch_chart_data(
        &self,
        spec: &ChartSpec,
    ) -> impl Future<Output = ChartResult<ParsedChartData>>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Numeric reading of the cell; text is parsed leniently.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Number(value) => Some(*value).filter(|value| value.is_finite()),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }

    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{value:.0}")
            }
            Self::Number(value) => value.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_owned())
        }
    }
}

/// Sparse-friendly grid of cells for one sheet; reads outside the stored
/// rows and columns see `CellValue::Empty`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellTable {
    rows: Vec<Vec<CellValue>>,
}

impl CellTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .unwrap_or(EMPTY)
    }

    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        let (row, col) = (row as usize, col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }
}

/// In-memory data source over one `CellTable` per sheet.
///
/// Cells can be edited between fetches; each fetch reads the current values.
#[derive(Debug, Default)]
pub struct TableDataSource {
    sheets: RefCell<Vec<CellTable>>,
}

impl TableDataSource {
    #[must_use]
    pub fn new(sheets: Vec<CellTable>) -> Self {
        Self {
            sheets: RefCell::new(sheets),
        }
    }

    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.borrow().len()
    }

    pub fn set_cell(
        &self,
        sheet_index: usize,
        row: u32,
        col: u32,
        value: CellValue,
    ) -> ChartResult<()> {
        let mut sheets = self.sheets.borrow_mut();
        let sheet = sheets.get_mut(sheet_index).ok_or_else(|| {
            ChartError::InvalidData(format!("sheet index {sheet_index} is out of range"))
        })?;
        sheet.set(row, col, value);
        Ok(())
    }

    /// Reads the chart's data range synchronously.
    pub fn resolve(&self, spec: &ChartSpec) -> ChartResult<ParsedChartData> {
        let sheets = self.sheets.borrow();
        let range = spec.data_range;
        let sheet = sheets.get(range.sheet_index).ok_or_else(|| {
            ChartError::InvalidData(format!("sheet index {} is out of range", range.sheet_index))
        })?;
        if range.end_row < range.start_row || range.end_col < range.start_col {
            return Err(ChartError::InvalidData(
                "data range end must not precede its start".to_owned(),
            ));
        }

        // A "line" is one column (or row) of the range; entries run along it.
        let (line_count, entry_count) = match spec.series_orientation {
            SeriesOrientation::Columns => (range.col_count(), range.row_count()),
            SeriesOrientation::Rows => (range.row_count(), range.col_count()),
        };
        let cell = |line: u32, entry: u32| {
            match spec.series_orientation {
                SeriesOrientation::Columns => {
                    sheet.get(range.start_row + entry, range.start_col + line)
                }
                SeriesOrientation::Rows => {
                    sheet.get(range.start_row + line, range.start_col + entry)
                }
            }
        };
        let line_index = |index: usize, what: &str| -> ChartResult<u32> {
            u32::try_from(index)
                .ok()
                .filter(|line| *line < line_count)
                .ok_or_else(|| {
                    ChartError::InvalidData(format!(
                        "{what} index {index} is outside the {line_count} lines of the range"
                    ))
                })
        };

        let category_line = line_index(spec.category_index, "category")?;
        let first_entry = u32::from(spec.has_headers);

        let categories: Vec<String> = (first_entry..entry_count)
            .map(|entry| cell(category_line, entry).display_text())
            .collect();

        let declared: Vec<(Option<&str>, usize, Option<&str>)> = if spec.series.is_empty() {
            (0..line_count as usize)
                .filter(|index| *index != spec.category_index)
                .map(|index| (None, index, None))
                .collect()
        } else {
            spec.series
                .iter()
                .map(|def| (Some(def.name.as_str()), def.source_index, def.color.as_deref()))
                .collect()
        };

        let mut series = Vec::with_capacity(declared.len());
        for (position, (name, source_index, color)) in declared.into_iter().enumerate() {
            let line = line_index(source_index, "series source")?;
            let header = spec
                .has_headers
                .then(|| cell(line, 0).display_text())
                .filter(|header| !header.is_empty());
            let name = name
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .or(header)
                .unwrap_or_else(|| format!("Series {}", position + 1));

            let values = (first_entry..entry_count)
                .map(|entry| cell(line, entry).as_number().unwrap_or(0.0))
                .collect();

            let mut resolved = Series::new(name, values);
            resolved.color = color.map(str::to_owned);
            series.push(resolved);
        }

        let data = ParsedChartData::new(categories, series);
        data.validate()?;
        debug!(
            categories = data.categories.len(),
            series = data.series.len(),
            "resolved chart data from table"
        );
        Ok(data)
    }
}

impl ChartDataSource for TableDataSource {
    fn fetch_chart_data(
        &self,
        spec: &ChartSpec,
    ) -> impl Future<Output = ChartResult<ParsedChartData>> {
        std::future::ready(self.resolve(spec))
    }
}
