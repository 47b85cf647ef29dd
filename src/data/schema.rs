//! Construct schema: named groups of variables, the declared value range,
//! and the binding of a schema to a loaded dataset.

use std::fmt;

use serde::Deserialize;

use super::model::{Cell, Dataset};
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Constructs
// ---------------------------------------------------------------------------

/// Variable names of one construct as written in a schema source: either a
/// comma-separated string (`"a, b, c"`) or an explicit list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VariableList {
    Joined(String),
    Listed(Vec<String>),
}

impl VariableList {
    fn into_names(self) -> Vec<String> {
        match self {
            VariableList::Joined(s) => s.split(',').map(|v| v.trim().to_string()).collect(),
            VariableList::Listed(v) => v.into_iter().map(|s| s.trim().to_string()).collect(),
        }
    }
}

impl From<&str> for VariableList {
    fn from(s: &str) -> Self {
        VariableList::Joined(s.to_string())
    }
}

/// A named group of variables whose values are summarised by their mean.
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub name: String,
    /// Ordered; repeats are kept and each occurrence counts toward the mean.
    pub variables: Vec<String>,
}

/// Constructs in definition order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Constructs {
    items: Vec<Construct>,
}

impl Constructs {
    pub fn iter(&self) -> impl Iterator<Item = &Construct> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Construct> {
        self.items.iter().find(|c| c.name == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Constructs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: [{}]", c.name, c.variables.join(", "))?;
        }
        write!(f, "}}")
    }
}

/// Build constructs from a raw `name → variables` mapping, keeping the
/// mapping's iteration order.
///
/// Fails with [`FilterError::Schema`] when the mapping is empty, a name is
/// blank or repeated, or a construct lists no variables / a blank variable.
pub fn define_constructs<I, K, V>(raw: I) -> Result<Constructs>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<VariableList>,
{
    let mut items: Vec<Construct> = Vec::new();

    for (name, vars) in raw {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(FilterError::Schema("construct name is empty".to_string()));
        }
        if items.iter().any(|c| c.name == name) {
            return Err(FilterError::Schema(format!(
                "construct '{name}' is defined more than once"
            )));
        }

        let variables = vars.into().into_names();
        if variables.iter().all(|v| v.is_empty()) {
            return Err(FilterError::Schema(format!(
                "construct '{name}' must reference at least one variable"
            )));
        }
        if variables.iter().any(|v| v.is_empty()) {
            return Err(FilterError::Schema(format!(
                "construct '{name}' has an empty variable name"
            )));
        }

        items.push(Construct { name, variables });
    }

    if items.is_empty() {
        return Err(FilterError::Schema("no constructs defined".to_string()));
    }
    Ok(Constructs { items })
}

// ---------------------------------------------------------------------------
// Validation rules
// ---------------------------------------------------------------------------

/// Inclusive integer bound every declared variable must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl Default for ValueRange {
    fn default() -> Self {
        // 7-point Likert scale
        Self { min: 1, max: 7 }
    }
}

impl ValueRange {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One `(column, constraint)` pair, built once from the schema source.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub column: String,
    pub range: ValueRange,
}

impl FieldRule {
    /// Check one cell. `row` is 1-based and only used for the error.
    fn check(&self, row: usize, cell: &Cell) -> Result<i64> {
        match cell.as_integer() {
            Some(v) if self.range.contains(v) => Ok(v),
            _ => Err(FilterError::RangeViolation {
                row,
                column: self.column.clone(),
                value: cell.to_field(),
                min: self.range.min,
                max: self.range.max,
            }),
        }
    }
}

/// Constructs plus the static list of field rules derived from them.
#[derive(Debug, Clone)]
pub struct Schema {
    constructs: Constructs,
    rules: Vec<FieldRule>,
    /// `[construct][variable]` → index into `rules`.
    rule_of: Vec<Vec<usize>>,
}

impl Schema {
    /// Every construct variable gets a rule; `extra_fields` (the data model
    /// list) adds rules for columns no construct references. Rules are
    /// deduplicated in first-appearance order.
    pub fn new(constructs: Constructs, range: ValueRange, extra_fields: &[String]) -> Result<Self> {
        if range.min > range.max {
            return Err(FilterError::Schema(format!(
                "value range [{}, {}] is empty",
                range.min, range.max
            )));
        }

        let mut rules: Vec<FieldRule> = Vec::new();
        let mut rule_of = Vec::with_capacity(constructs.len());
        for c in constructs.iter() {
            let idx: Vec<usize> = c
                .variables
                .iter()
                .map(|v| rule_index(&mut rules, v, range))
                .collect();
            rule_of.push(idx);
        }
        for field in extra_fields {
            let field = field.trim();
            if !field.is_empty() {
                rule_index(&mut rules, field, range);
            }
        }

        Ok(Schema {
            constructs,
            rules,
            rule_of,
        })
    }

    pub fn constructs(&self) -> &Constructs {
        &self.constructs
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

// ---------------------------------------------------------------------------
// Survey – schema bound to data
// ---------------------------------------------------------------------------

/// A dataset validated against a schema, with every construct's values
/// pre-extracted per row. Read-only; filter runs borrow it.
#[derive(Debug, Clone)]
pub struct Survey {
    dataset: Dataset,
    constructs: Constructs,
    /// `[row][construct][variable]`
    scores: Vec<Vec<Vec<i64>>>,
}

impl Survey {
    /// Bind `schema` to `dataset`.
    ///
    /// Fails with [`FilterError::MissingColumn`] if a rule's column is absent,
    /// or with [`FilterError::RangeViolation`] at the first offending cell,
    /// scanning rows in order and rules in schema order.
    pub fn bind(dataset: Dataset, schema: Schema) -> Result<Self> {
        let columns = schema
            .rules
            .iter()
            .map(|rule| {
                dataset
                    .column_index(&rule.column)
                    .ok_or_else(|| FilterError::MissingColumn {
                        owner: owner_of(&schema, &rule.column),
                        column: rule.column.clone(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut scores = Vec::with_capacity(dataset.len());
        for (i, record) in dataset.records.iter().enumerate() {
            let values = schema
                .rules
                .iter()
                .zip(&columns)
                .map(|(rule, &col)| rule.check(i + 1, record.cells.get(col).unwrap_or(&Cell::Null)))
                .collect::<Result<Vec<i64>>>()?;

            scores.push(
                schema
                    .rule_of
                    .iter()
                    .map(|idx| idx.iter().map(|&k| values[k]).collect())
                    .collect(),
            );
        }

        log::debug!(
            "Validated {} rows against {} field rules",
            dataset.len(),
            schema.rules.len()
        );

        Ok(Survey {
            dataset,
            constructs: schema.constructs,
            scores,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn constructs(&self) -> &Constructs {
        &self.constructs
    }

    /// Values of construct `construct` (definition index) in row `row`
    /// (0-based), in variable order.
    pub fn values(&self, row: usize, construct: usize) -> &[i64] {
        &self.scores[row][construct]
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

fn rule_index(rules: &mut Vec<FieldRule>, column: &str, range: ValueRange) -> usize {
    match rules.iter().position(|r| r.column == column) {
        Some(i) => i,
        None => {
            rules.push(FieldRule {
                column: column.to_string(),
                range,
            });
            rules.len() - 1
        }
    }
}

fn owner_of(schema: &Schema, column: &str) -> String {
    schema
        .constructs
        .iter()
        .find(|c| c.variables.iter().any(|v| v == column))
        .map(|c| format!("construct '{}'", c.name))
        .unwrap_or_else(|| "the data model".to_string())
}
