use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Error;

use clap::{Parser, ValueEnum};
use synsfs_core::aggregate::TargetSizes;

use crate::output::Output;

mod runner;
use runner::Runner;

/// Project observed spectra to target sample sizes and pool them.
///
/// For each mutation type, every observed spectrum with a sample size at least as large as a
/// target sample size is projected down to the target, and the projections are summed.
#[derive(Debug, Parser)]
pub struct Project {
    /// Input observed spectra.
    ///
    /// Observed spectra as created by the 'create' subcommand, in either format. If no file is
    /// provided, stdin will be used.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Target sample sizes.
    ///
    /// Multiple, comma-separated values can be provided.
    #[arg(short = 't', long, required = true, value_name = "INT,...")]
    target_sizes: TargetSizes,

    /// Projection strategy.
    #[arg(short = 's', long, value_enum, default_value_t = Strategy::Hypergeometric)]
    strategy: Strategy,

    /// Random seed.
    ///
    /// Only used for the multinomial strategy. The output is determined by the seed, and does not
    /// depend on the number of threads.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    seed: u64,

    /// Promote warnings to errors.
    ///
    /// By default, a mutation type without any observed sample size at least as large as a target
    /// sample size gives an all-zero spectrum without sources, with a warning. Using this flag will
    /// cause an error instead.
    #[arg(long)]
    strict: bool,

    /// Number of threads to use.
    #[arg(long, default_value_t = NonZeroUsize::new(4).unwrap(), value_name = "INT")]
    threads: NonZeroUsize,

    /// Output precision.
    ///
    /// Only used for the plain text format.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    precision: usize,

    #[command(flatten)]
    output: Output,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Expected spectrum under sampling without replacement.
    Hypergeometric,
    /// Random integer-valued spectrum drawn from the hypergeometric expectation.
    Multinomial,
}

impl Project {
    pub fn run(self) -> Result<(), Error> {
        let catalog = synsfs_core::Catalog::synonymous();

        let aggregated = Runner::new(&self, &catalog)?.run()?;

        let builder = self.output.builder().set_precision(self.precision);
        self.output.write(builder, &aggregated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind as ClapErrorKind;

    use crate::tests::{parse_subcmd, try_parse_subcmd};

    #[test]
    fn test_target_sizes_required() {
        let result = try_parse_subcmd::<Project>("synsfs project observed.json");

        assert_eq!(
            result.unwrap_err().kind(),
            ClapErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_parse_target_sizes() {
        let args = parse_subcmd::<Project>("synsfs project -t 20,10,20 observed.json");

        assert_eq!(args.target_sizes.iter().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(args.strategy, Strategy::Hypergeometric);
        assert_eq!(args.precision, 6);
    }

    #[test]
    fn test_parse_invalid_target_sizes() {
        let result = try_parse_subcmd::<Project>("synsfs project -t 10,x observed.json");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_zero_target_size() {
        let result = try_parse_subcmd::<Project>("synsfs project -t 0,2 observed.json");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_strategy() {
        let args =
            parse_subcmd::<Project>("synsfs project -t 4 --strategy multinomial --seed 3");

        assert_eq!(args.strategy, Strategy::Multinomial);
        assert_eq!(args.seed, 3);
    }

    #[test]
    fn test_zero_threads() {
        let result = try_parse_subcmd::<Project>("synsfs project -t 4 --threads 0");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ValueValidation);
    }
}
