// src/cell.rs
//! Typed cell values exchanged with the spreadsheet codec.
//!
//! The table itself stores text; a [`CellValue`] only exists at the
//! read/write boundary. Accessors are checked: asking a `Text` cell for its
//! integer gives `None`, never a coerced number.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// Formula source, kept opaque (no leading '=').
    Formula(String),
    Blank,
    Error(ErrorCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Text,
    Integer,
    Real,
    Boolean,
    Formula,
    Blank,
    Error,
}

impl CellKind {
    pub fn name(self) -> &'static str {
        match self {
            CellKind::Text => "text",
            CellKind::Integer => "integer",
            CellKind::Real => "real",
            CellKind::Boolean => "boolean",
            CellKind::Formula => "formula",
            CellKind::Blank => "blank",
            CellKind::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    NA,
    GettingData,
}

impl ErrorCode {
    pub fn literal(self) -> &'static str {
        match self {
            ErrorCode::Null => "#NULL!",
            ErrorCode::Div0 => "#DIV/0!",
            ErrorCode::Value => "#VALUE!",
            ErrorCode::Ref => "#REF!",
            ErrorCode::Name => "#NAME?",
            ErrorCode::Num => "#NUM!",
            ErrorCode::NA => "#N/A",
            ErrorCode::GettingData => "#GETTING_DATA",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

impl CellValue {
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Text(_) => CellKind::Text,
            CellValue::Integer(_) => CellKind::Integer,
            CellValue::Real(_) => CellKind::Real,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Formula(_) => CellKind::Formula,
            CellValue::Blank => CellKind::Blank,
            CellValue::Error(_) => CellKind::Error,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            CellValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<ErrorCode> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Text form stored in a `TableModel` for a cell read from a workbook.
    /// Whole reals collapse to integer digits, since xlsx keeps every number
    /// as a float.
    pub fn to_table_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(v) => v.to_string(),
            CellValue::Real(v) => real_to_text(*v),
            CellValue::Boolean(true) => s!("TRUE"),
            CellValue::Boolean(false) => s!("FALSE"),
            CellValue::Formula(f) => f.clone(),
            CellValue::Blank => s!(),
            CellValue::Error(e) => s!(e.literal()),
        }
    }
}

fn real_to_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        (v as i64).to_string()
    } else {
        v.to_string()
    }
}
