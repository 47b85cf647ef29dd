use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;
use crate::data::filter::{mean_threshold_filter, overlap_filter, FilterOutcome, TargetPair};
use crate::data::loader::load_file;
use crate::data::schema::Survey;
use crate::error::FilterError;
use crate::export::{export_cleaned, mean_threshold_file_name, overlap_file_name};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One invocation: the schema and dataset are loaded and validated once,
/// then any number of filter runs read from them.
pub struct Session {
    /// Input path; its stem names the cleaned tables.
    input: PathBuf,

    /// Directory cleaned tables are written to.
    output_dir: PathBuf,

    /// Validated dataset with per-construct values.
    survey: Survey,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub destination: PathBuf,
    pub outcome: FilterOutcome,
}

impl Session {
    /// Build the schema, load the dataset and validate every declared cell.
    pub fn open(config: &Config, input: &Path, output_dir: &Path) -> Result<Self> {
        let schema = config.schema()?;
        let dataset = load_file(input)?;
        let survey = Survey::bind(dataset, schema)?;
        Ok(Session {
            input: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            survey,
        })
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    /// Run the mean-threshold filter and write its cleaned table.
    pub fn run_mean_threshold(&self, factor: f64, trace: bool) -> crate::error::Result<RunReport> {
        log::debug!("Mean-threshold run: factor={factor}");
        let outcome = mean_threshold_filter(&self.survey, factor, trace)?;
        let destination = self
            .output_dir
            .join(mean_threshold_file_name(&self.input, factor));
        self.write(outcome, destination)
    }

    /// Run the overlap filter on `pair` and write its cleaned table.
    pub fn run_overlap(
        &self,
        pair: &TargetPair,
        threshold: f64,
        trace: bool,
    ) -> crate::error::Result<RunReport> {
        log::debug!("Overlap run: targets={:?} threshold={threshold}", pair.names());
        let outcome = overlap_filter(&self.survey, pair, threshold, trace)?;
        let destination = self
            .output_dir
            .join(overlap_file_name(&self.input, pair, threshold));
        self.write(outcome, destination)
    }

    fn write(&self, outcome: FilterOutcome, destination: PathBuf) -> crate::error::Result<RunReport> {
        fs::create_dir_all(&self.output_dir).map_err(|source| FilterError::Write {
            path: self.output_dir.clone(),
            source,
        })?;
        export_cleaned(&self.survey.dataset().subset(&outcome.kept), &destination)?;
        Ok(RunReport {
            destination,
            outcome,
        })
    }
}
