use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Result record of the sum adapter. Parse failures are reported inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SumOutcome {
    Sum { sum: f64 },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: Vec<f64>,
}

/// Numeric table: named columns, row-major cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Frame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, ServiceError> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ServiceError::InvalidInput(format!(
                "row {idx} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Builds a frame from a JSON payload.
    ///
    /// Accepted shapes:
    /// - `[[1, 2], [3, 4]]`: positional rows, columns named `"0"`, `"1"`, ...
    /// - `[{"a": 1, "b": 2}, ...]`: records, columns in order of first appearance
    /// - `{"a": [1, 3], "b": [2, 4]}`: columns of equal length
    pub fn from_json(payload: &Value) -> Result<Self, ServiceError> {
        match payload {
            Value::Array(items) if items.is_empty() => Ok(Frame::default()),
            Value::Array(items) => match &items[0] {
                Value::Array(_) => from_row_arrays(items),
                Value::Object(_) => from_records(items),
                _ => Err(ServiceError::InvalidInput(
                    "rows must be arrays or objects".into(),
                )),
            },
            Value::Object(columns) => from_columns(columns),
            _ => Err(ServiceError::InvalidInput(
                "tabular input must be an array of rows or an object of columns".into(),
            )),
        }
    }
}

fn from_row_arrays(items: &[Value]) -> Result<Frame, ServiceError> {
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let cells = item.as_array().ok_or_else(|| {
            ServiceError::InvalidInput(format!("row {idx} is not an array"))
        })?;
        let row = cells
            .iter()
            .map(|cell| cell_value(cell, idx))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let width = rows.first().map(Vec::len).unwrap_or(0);
    let columns = (0..width).map(|i| i.to_string()).collect();
    Frame::new(columns, rows)
}

fn from_records(items: &[Value]) -> Result<Frame, ServiceError> {
    let mut columns: Vec<String> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let record = item.as_object().ok_or_else(|| {
            ServiceError::InvalidInput(format!("row {idx} is not an object"))
        })?;
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let record = item.as_object().ok_or_else(|| {
            ServiceError::InvalidInput(format!("row {idx} is not an object"))
        })?;
        let row = columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .ok_or_else(|| {
                        ServiceError::InvalidInput(format!(
                            "row {idx} is missing column '{column}'"
                        ))
                    })
                    .and_then(|cell| cell_value(cell, idx))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    Frame::new(columns, rows)
}

fn from_columns(columns: &Map<String, Value>) -> Result<Frame, ServiceError> {
    let mut names = Vec::with_capacity(columns.len());
    let mut values: Vec<&Vec<Value>> = Vec::with_capacity(columns.len());
    for (name, column) in columns {
        let cells = column.as_array().ok_or_else(|| {
            ServiceError::InvalidInput(format!("column '{name}' is not an array"))
        })?;
        names.push(name.clone());
        values.push(cells);
    }

    let len = values.first().map(|c| c.len()).unwrap_or(0);
    if let Some(pos) = values.iter().position(|c| c.len() != len) {
        return Err(ServiceError::InvalidInput(format!(
            "column '{}' has {} values, expected {len}",
            names[pos],
            values[pos].len()
        )));
    }

    let rows = (0..len)
        .map(|idx| {
            values
                .iter()
                .map(|column| cell_value(&column[idx], idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Frame::new(names, rows)
}

fn cell_value(cell: &Value, row: usize) -> Result<f64, ServiceError> {
    match cell {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            ServiceError::InvalidInput(format!("row {row}: number {n} is out of range"))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ServiceError::InvalidInput(format!(
            "row {row}: expected a number, got {other}"
        ))),
    }
}
