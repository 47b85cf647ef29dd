use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. Declared construct variables must hold
/// `Integer`; every other column is carried through to the cleaned table as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v:?}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// The integer payload, if this cell holds one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Text written to a CSV field. Null cells become empty fields so a
    /// written table reads back identically.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One row; `cells[i]` belongs to `Dataset::columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub cells: Vec<Cell>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An in-memory table with ordered, named columns.
///
/// Row identity is the position in `records`; reports use it 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column names in source order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { columns, records }
    }

    /// Position of a column by name, ignoring whitespace around the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// A new dataset holding only the rows at `positions` (0-based), in the
    /// given order. The column set is unchanged.
    pub fn subset(&self, positions: &[usize]) -> Dataset {
        let records = positions
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
