//! Partial-update statements for steps.
//!
//! Column names only ever come from [`StepColumn`]; every value travels as a
//! bound parameter. A column is part of the update when its key is present in
//! the request body, whatever the value (`null` and `0` included).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Columns returned by every step query, in `Step` field order.
pub const STEP_RETURNING_COLUMNS: &str = "id, plan_id, title, owner, start_due, end_due, \
     start_real, end_real, pct_planned, pct_real, status, position, created_at";

// `%.f` also matches an absent fraction.
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const ZONED_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Timestamp,
    Numeric,
    Integer,
}

/// The mutable step columns, in the order their assignments are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepColumn {
    Title,
    Owner,
    StartDue,
    EndDue,
    StartReal,
    EndReal,
    PctPlanned,
    PctReal,
    Status,
    Position,
}

impl StepColumn {
    pub const ALL: [StepColumn; 10] = [
        StepColumn::Title,
        StepColumn::Owner,
        StepColumn::StartDue,
        StepColumn::EndDue,
        StepColumn::StartReal,
        StepColumn::EndReal,
        StepColumn::PctPlanned,
        StepColumn::PctReal,
        StepColumn::Status,
        StepColumn::Position,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Owner => "owner",
            Self::StartDue => "start_due",
            Self::EndDue => "end_due",
            Self::StartReal => "start_real",
            Self::EndReal => "end_real",
            Self::PctPlanned => "pct_planned",
            Self::PctReal => "pct_real",
            Self::Status => "status",
            Self::Position => "position",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Self::Title | Self::Owner | Self::Status => ColumnKind::Text,
            Self::StartDue | Self::EndDue | Self::StartReal | Self::EndReal => {
                ColumnKind::Timestamp
            }
            Self::PctPlanned | Self::PctReal => ColumnKind::Numeric,
            Self::Position => ColumnKind::Integer,
        }
    }

    /// Converts a JSON value into the typed parameter for this column.
    pub fn bind(self, value: &Value) -> Result<SqlValue, ApiError> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        let bound = match (self.kind(), value) {
            (ColumnKind::Text, Value::String(text)) => Some(SqlValue::Text(text.clone())),
            (ColumnKind::Timestamp, Value::String(text)) if is_timestamp(text) => {
                Some(SqlValue::Text(text.clone()))
            }
            (ColumnKind::Numeric, Value::Number(number)) => number.as_f64().map(SqlValue::Float),
            (ColumnKind::Integer, Value::Number(number)) => integral(number).map(SqlValue::Integer),
            _ => None,
        };
        bound.ok_or_else(|| ApiError::InvalidField {
            column: self.name(),
            detail: format!("expected {} but got {value}", self.kind().describe()),
        })
    }
}

impl ColumnKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Timestamp => "a date or date-time string",
            Self::Numeric => "a number",
            Self::Integer => "an integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Float(f64),
    Integer(i64),
}

impl SqlValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_float(self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(value),
            Self::Integer(value) => Some(value as f64),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: StepColumn,
    pub value: SqlValue,
}

/// A ready-to-run `UPDATE steps ... RETURNING ...` with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    step_id: i64,
    assignments: Vec<Assignment>,
}

impl UpdateStatement {
    /// Fails with `NoFieldsToUpdate` when the body names none of the mutable
    /// columns. Keys outside the whitelist, `id` included, are ignored.
    pub fn build(step_id: i64, body: &Map<String, Value>) -> Result<Self, ApiError> {
        let mut assignments = Vec::new();
        for column in StepColumn::ALL {
            if let Some(value) = body.get(column.name()) {
                assignments.push(Assignment {
                    column,
                    value: column.bind(value)?,
                });
            }
        }
        if assignments.is_empty() {
            return Err(ApiError::NoFieldsToUpdate);
        }
        Ok(Self {
            step_id,
            assignments,
        })
    }

    pub fn step_id(&self) -> i64 {
        self.step_id
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn columns(&self) -> Vec<StepColumn> {
        self.assignments.iter().map(|a| a.column).collect()
    }

    /// `title = ?1, owner = ?2, ...`
    pub fn set_clause(&self) -> String {
        self.assignments
            .iter()
            .enumerate()
            .map(|(index, assignment)| format!("{} = ?{}", assignment.column.name(), index + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parameters are the assignment values in order, then the step id.
    pub fn sql(&self) -> String {
        format!(
            "UPDATE steps SET {} WHERE id = ?{} RETURNING {}",
            self.set_clause(),
            self.assignments.len() + 1,
            STEP_RETURNING_COLUMNS
        )
    }
}

fn is_timestamp(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
        || NAIVE_TIMESTAMP_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
        || ZONED_TIMESTAMP_FORMATS
            .iter()
            .any(|format| DateTime::parse_from_str(text, format).is_ok())
}

fn integral(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
            .map(|value| value as i64)
    })
}
