use anyhow::{Context, Error};

use synsfs_core::{
    aggregate::TargetSizes,
    io::read,
    project::{Hypergeometric, Multinomial, Projector},
    Aggregated, Aggregator, Catalog, Input, ObservedSpectra,
};

use super::{Project, Strategy};

pub struct Runner<'a> {
    catalog: &'a Catalog,
    observed: ObservedSpectra,
    target_sizes: TargetSizes,
    strategy: Strategy,
    seed: u64,
    strict: bool,
    pool: rayon::ThreadPool,
}

impl<'a> Runner<'a> {
    pub fn new(args: &Project, catalog: &'a Catalog) -> Result<Self, Error> {
        let input = Input::new(args.input.clone())?;

        let observed = read::Builder::default()
            .set_catalog(catalog)
            .read_from_input(&input)
            .with_context(|| match &args.input {
                Some(path) => format!("Failed to read observed spectra from '{}'", path.display()),
                None => String::from("Failed to read observed spectra from stdin"),
            })?;

        log::debug!(
            "Read observed spectra for {} mutation types with {} sites",
            observed.len(),
            observed.sites()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads.get())
            .build()
            .context("Failed to build thread pool")?;

        Ok(Self {
            catalog,
            observed,
            target_sizes: args.target_sizes.clone(),
            strategy: args.strategy,
            seed: args.seed,
            strict: args.strict,
            pool,
        })
    }

    pub fn run(self) -> Result<Aggregated, Error> {
        match self.strategy {
            Strategy::Hypergeometric => self.run_with(Hypergeometric),
            Strategy::Multinomial => self.run_with(Multinomial::new(self.seed)),
        }
    }

    fn run_with<P>(&self, projector: P) -> Result<Aggregated, Error>
    where
        P: Projector + Sync,
    {
        let aggregator =
            Aggregator::with_projector(self.catalog, projector).set_strict(self.strict);

        let aggregated = self
            .pool
            .install(|| aggregator.aggregate_all(&self.target_sizes, &self.observed))
            .context("Failed to aggregate observed spectra")?;

        let missing = aggregated.missing().collect::<Vec<_>>();
        if let Some((mutation_type, target_size)) = missing.first() {
            log::warn!(
                "Found {} combinations of mutation type and target sample size without any \
                observed sample size at least as large as the target, e.g. '{mutation_type}' at \
                target sample size {target_size}. These have all-zero spectra without sources.",
                missing.len()
            );
        }

        log::info!(
            "Aggregated {} mutation types to {} target sample sizes",
            aggregated.len(),
            self.target_sizes.len()
        );

        Ok(aggregated)
    }
}
