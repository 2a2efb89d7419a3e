use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::{Args, ValueEnum};
use synsfs_core::io::{self, write::Builder, Spectra};

/// Output options shared between subcommands.
#[derive(Args, Debug)]
pub struct Output {
    /// Output format.
    ///
    /// The JSON format nests spectra by mutation type and sample size. The text format is a
    /// tab-separated table with one spectrum per line.
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Output path.
    ///
    /// If no path is provided, output is written to stdout.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Output {
    pub fn builder(&self) -> Builder {
        Builder::default()
            .set_format(self.format.into())
            .set_pretty(self.pretty)
    }

    pub fn write<S>(&self, builder: Builder, spectra: &S) -> Result<(), Error>
    where
        S: Spectra,
    {
        builder
            .write_to_path_or_stdout(self.output.as_ref(), spectra)
            .with_context(|| match &self.output {
                Some(path) => format!("Failed to write output to '{}'", path.display()),
                None => String::from("Failed to write output to stdout"),
            })
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// JSON format.
    Json,
    /// Plain text format.
    Text,
}

impl From<Format> for io::Format {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => io::Format::Json,
            Format::Text => io::Format::Text,
        }
    }
}
