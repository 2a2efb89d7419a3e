use std::path::PathBuf;

use anyhow::Error;

use clap::Parser;

use crate::output::Output;

mod runner;
use runner::Runner;

/// Create observed spectra from classified site records.
///
/// Records are read from a tab-separated table with a header row, containing at least the columns
/// 'mutation_type', 'sample_size', and 'derived_count'. Gzip-compressed input is detected
/// automatically.
#[derive(Debug, Parser)]
pub struct Create {
    /// Input records.
    ///
    /// If no file is provided, stdin will be used.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Annotations to exclude.
    ///
    /// Records flagged as excluded in the 'excluded' column are always skipped. In addition,
    /// records with any of these values in the 'annotation' column will be skipped. Multiple,
    /// comma-separated values can be provided, e.g. 'eij' to skip exon-intron junctions.
    #[arg(
        short = 'x',
        long,
        use_value_delimiter = true,
        value_delimiter = ',',
        value_name = "ANNOTATION,..."
    )]
    exclude_annotation: Vec<String>,

    /// Promote warnings to errors.
    ///
    /// By default, malformed records as well as records with unknown mutation types or invalid
    /// counts will be skipped with a warning. Using this flag will cause an error instead of a
    /// warning if such records are encountered.
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    output: Output,
}

impl Create {
    pub fn run(self) -> Result<(), Error> {
        let catalog = synsfs_core::Catalog::synonymous();

        let runner = Runner::new(&self, &catalog)?;
        let observed = runner.run()?;

        self.output.write(self.output.builder(), &observed)
    }
}
