#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Tools for building synonymous site frequency spectra.
//!
//! This serves as the core library implementation for the `synsfs` CLI, but can also be used as a
//! free-standing library.
//!
//! # Overview
//!
//! Sites are classified upstream by their [`MutationType`], the directed codon change at the site,
//! and by how many of the sampled chromosomes carry the derived allele. A [`Store`] accumulates
//! such [`Record`]s into [`ObservedSpectra`], with a separate spectrum for each mutation type and
//! each sample size. Since sample sizes vary between sites, an [`Aggregator`] then projects every
//! spectrum down to common target sample sizes and pools the projections.
//!
//! Only mutation types in the [`Catalog`] are accepted. The standard catalog
//! ([`Catalog::synonymous`]) holds the 134 single-nucleotide synonymous codon changes of the
//! standard genetic code.
//!
//! # Example
//!
//! ```
//! use synsfs_core::{aggregate::TargetSizes, Aggregator, Catalog, Store};
//!
//! let catalog = Catalog::synonymous();
//!
//! // Register sites observed with two and three sampled chromosomes
//! let mut store = Store::new(&catalog);
//! store.register("ATT->ATC", 2, 0)?;
//! store.register("ATT->ATC", 2, 1)?;
//! store.register("ATT->ATC", 3, 3)?;
//!
//! // Project both to two sampled chromosomes and pool
//! let observed = store.snapshot()?;
//! let target_sizes = TargetSizes::new([2])?;
//! let aggregated = Aggregator::new(&catalog).aggregate_all(&target_sizes, &observed)?;
//!
//! let spectrum = &aggregated.get(&"ATT->ATC".parse()?).expect("observed")[&2];
//! assert_eq!(spectrum.as_slice(), &[1.0, 1.0, 1.0]);
//! assert_eq!(spectrum.sources(), &[2, 3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod aggregate;
pub use aggregate::{Aggregated, Aggregator};

pub mod catalog;
pub use catalog::{Catalog, MutationType};

pub mod codon;

pub mod input;
pub use input::Input;

pub mod io;

pub mod project;
pub use project::Projector;

pub mod record;
pub use record::Record;

pub mod spectrum;
pub use spectrum::{ObservedSpectra, ObservedSpectrum, ProjectedSpectrum};

pub mod store;
pub use store::Store;
