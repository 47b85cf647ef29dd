use super::schema::{Constructs, Survey};
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Filter outcome
// ---------------------------------------------------------------------------

/// The partition of all rows produced by one filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// 0-based positions of kept rows, in original order.
    pub kept: Vec<usize>,
    /// 1-based row numbers of discarded rows, in the order encountered.
    pub discarded: Vec<usize>,
    /// Per-row decisions, recorded only when tracing was requested.
    pub trace: Option<Vec<TraceEvent>>,
}

/// One observation made while evaluating a row. Row numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    ConstructChecked {
        row: usize,
        construct: String,
        values: Vec<i64>,
        mean: f64,
        threshold: f64,
    },
    ValueExceeded {
        row: usize,
        value: i64,
    },
    MeansCompared {
        row: usize,
        means: [f64; 2],
        difference: f64,
    },
    DifferenceBelow {
        row: usize,
        difference: f64,
    },
    Passed {
        row: usize,
    },
}

/// Collects the outcome while rows are scanned in order.
struct Partition {
    kept: Vec<usize>,
    discarded: Vec<usize>,
    trace: Option<Vec<TraceEvent>>,
}

impl Partition {
    fn new(rows: usize, trace: bool) -> Self {
        Partition {
            kept: Vec::with_capacity(rows),
            discarded: Vec::new(),
            trace: trace.then(Vec::new),
        }
    }

    fn record(&mut self, event: impl FnOnce() -> TraceEvent) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event());
        }
    }

    fn keep(&mut self, pos: usize) {
        self.kept.push(pos);
        self.record(|| TraceEvent::Passed { row: pos + 1 });
    }

    fn discard(&mut self, pos: usize) {
        self.discarded.push(pos + 1);
    }

    fn finish(self) -> FilterOutcome {
        FilterOutcome {
            kept: self.kept,
            discarded: self.discarded,
            trace: self.trace,
        }
    }
}

/// Arithmetic mean of a construct's values. Constructs always have at least
/// one variable.
pub fn mean(values: &[i64]) -> f64 {
    // Summed in f64: a wide custom range can overflow an i64 total.
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    sum / values.len() as f64
}

// ---------------------------------------------------------------------------
// Mean-threshold filter
// ---------------------------------------------------------------------------

/// Discard rows in which some value strays too far from its construct mean.
///
/// Per row, constructs are checked in definition order with
/// `threshold = factor * mean`. The first value with `|v - mean| > threshold`
/// discards the row and stops evaluation of that row. A deviation exactly at
/// the threshold passes.
pub fn mean_threshold_filter(survey: &Survey, factor: f64, trace: bool) -> Result<FilterOutcome> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(FilterError::InvalidParameter(format!(
            "factor must be a non-negative number, got {factor}"
        )));
    }

    let constructs = survey.constructs();
    let mut out = Partition::new(survey.len(), trace);

    for pos in 0..survey.len() {
        let row = pos + 1;
        let mut discard = false;

        'constructs: for (ci, construct) in constructs.iter().enumerate() {
            let values = survey.values(pos, ci);
            let mean = mean(values);
            let threshold = factor * mean;
            out.record(|| TraceEvent::ConstructChecked {
                row,
                construct: construct.name.clone(),
                values: values.to_vec(),
                mean,
                threshold,
            });

            for &value in values {
                if (value as f64 - mean).abs() > threshold {
                    out.record(|| TraceEvent::ValueExceeded { row, value });
                    discard = true;
                    break 'constructs;
                }
            }
        }

        if discard {
            out.discard(pos);
        } else {
            out.keep(pos);
        }
    }

    let outcome = out.finish();
    log::info!(
        "Mean-threshold filter (factor {factor}): kept {}, discarded {}",
        outcome.kept.len(),
        outcome.discarded.len()
    );
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Overlap filter
// ---------------------------------------------------------------------------

/// The constructs named for an overlap run, parsed from `"C1, C2"`.
///
/// More than two names are accepted; only the first two are compared. The
/// raw text is kept because it identifies the run's output.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPair {
    raw: String,
    names: Vec<String>,
}

impl TargetPair {
    /// Split on `,` and trim. Fails with [`FilterError::Arity`] if fewer
    /// than two non-empty names remain.
    pub fn parse(raw: &str) -> Result<Self> {
        let names: Vec<String> = raw
            .split(',')
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.len() < 2 {
            return Err(FilterError::Arity(names.len()));
        }
        Ok(TargetPair {
            raw: raw.to_string(),
            names,
        })
    }

    /// The text this pair was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Every supplied name, including ignored extras.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn first(&self) -> &str {
        &self.names[0]
    }

    pub fn second(&self) -> &str {
        &self.names[1]
    }

    /// Check every supplied name against `constructs` and return the
    /// definition indices of the two compared constructs.
    pub fn resolve(&self, constructs: &Constructs) -> Result<(usize, usize)> {
        for name in &self.names {
            if constructs.get(name).is_none() {
                return Err(FilterError::UnknownConstruct(name.clone()));
            }
        }
        match (constructs.position(self.first()), constructs.position(self.second())) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(FilterError::UnknownConstruct(self.first().to_string())),
            (_, None) => Err(FilterError::UnknownConstruct(self.second().to_string())),
        }
    }
}

/// Discard rows whose two target constructs have nearly the same mean.
///
/// A row is discarded when `|mean1 - mean2| < threshold`; a difference
/// exactly equal to the threshold passes. `threshold` is used as given.
pub fn overlap_filter(
    survey: &Survey,
    pair: &TargetPair,
    threshold: f64,
    trace: bool,
) -> Result<FilterOutcome> {
    if !threshold.is_finite() {
        return Err(FilterError::InvalidParameter(format!(
            "overlap threshold must be a finite number, got {threshold}"
        )));
    }
    let (first, second) = pair.resolve(survey.constructs())?;
    if pair.names().len() > 2 {
        log::warn!(
            "Only '{}' and '{}' are compared; ignoring {:?}",
            pair.first(),
            pair.second(),
            &pair.names()[2..]
        );
    }

    let mut out = Partition::new(survey.len(), trace);

    for pos in 0..survey.len() {
        let row = pos + 1;
        let means = [mean(survey.values(pos, first)), mean(survey.values(pos, second))];
        let difference = (means[0] - means[1]).abs();
        out.record(|| TraceEvent::MeansCompared {
            row,
            means,
            difference,
        });

        if difference < threshold {
            out.record(|| TraceEvent::DifferenceBelow { row, difference });
            out.discard(pos);
        } else {
            out.keep(pos);
        }
    }

    let outcome = out.finish();
    log::info!(
        "Overlap filter ({} vs {}, threshold {threshold}): kept {}, discarded {}",
        pair.first(),
        pair.second(),
        outcome.kept.len(),
        outcome.discarded.len()
    );
    Ok(outcome)
}
