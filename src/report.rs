//! Human-readable report lines. Purely observational: nothing here affects
//! filter outcomes or written tables.

use std::path::Path;

use crate::data::filter::{FilterOutcome, TraceEvent};
use crate::data::schema::Survey;

/// One line per row with the raw values of every construct:
/// `Row #1: {C1: {a: 1, b: 1, c: 7}, C2: {d: 4}}`.
pub fn list_rows(survey: &Survey) -> Vec<String> {
    (0..survey.len())
        .map(|pos| {
            let constructs: Vec<String> = survey
                .constructs()
                .iter()
                .enumerate()
                .map(|(ci, c)| {
                    let pairs: Vec<String> = c
                        .variables
                        .iter()
                        .zip(survey.values(pos, ci))
                        .map(|(var, v)| format!("{var}: {v}"))
                        .collect();
                    format!("{}: {{{}}}", c.name, pairs.join(", "))
                })
                .collect();
            format!("Row #{}: {{{}}}", pos + 1, constructs.join(", "))
        })
        .collect()
}

/// Render the verbose trace of a run, one line per event.
pub fn render_trace(events: &[TraceEvent]) -> Vec<String> {
    events.iter().map(render_event).collect()
}

fn render_event(event: &TraceEvent) -> String {
    match event {
        TraceEvent::ConstructChecked {
            construct,
            values,
            mean,
            threshold,
            ..
        } => format!(
            "Checking construct '{construct}' with values: {}, mean: {mean:.3}, threshold: {threshold:.3}",
            list(values)
        ),
        TraceEvent::ValueExceeded { row, value } => {
            format!("Row #{row}: Value {value} exceeds threshold. Marking for discard.")
        }
        TraceEvent::MeansCompared {
            row,
            means,
            difference,
        } => format!(
            "Row #{row}: Means = [{:.3}, {:.3}], difference = {difference:.3}",
            means[0], means[1]
        ),
        TraceEvent::DifferenceBelow { row, difference } => format!(
            "Row #{row}: Mean difference {difference:.3} is below threshold. Marking for discard."
        ),
        TraceEvent::Passed { row } => format!("Row #{row}: Passed."),
    }
}

/// `Discarded Rows: [2, 4]`
pub fn discarded_line(discarded: &[usize]) -> String {
    format!("Discarded Rows: {}", list(discarded))
}

/// Closing line of every run.
pub fn summary(run: &str, outcome: &FilterOutcome, destination: &Path) -> String {
    format!(
        "{run}: kept {} rows, discarded {} rows -> {}",
        outcome.kept.len(),
        outcome.discarded.len(),
        destination.display()
    )
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
