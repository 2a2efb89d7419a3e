//! Classified variant records.

use serde::{Deserialize, Serialize};

pub mod reader;
pub use reader::Reader;

/// A classified record for a single site.
///
/// Counts are signed so that malformed input can be represented and rejected on registration,
/// rather than failing when the record is read.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    /// The mutation type, e.g. `ATT->ATC`.
    #[serde(alias = "codon_change")]
    pub mutation_type: String,
    /// The number of sampled chromosomes at the site.
    #[serde(alias = "totalcount")]
    pub sample_size: i64,
    /// The number of sampled chromosomes carrying the derived allele.
    #[serde(alias = "altcount")]
    pub derived_count: i64,
    /// Whether the site has been flagged for exclusion upstream.
    #[serde(default)]
    pub excluded: bool,
    /// Free-form site annotation, e.g. `eij` for exon-intron junctions.
    #[serde(default, alias = "custom_annotation")]
    pub annotation: Option<String>,
}

impl Record {
    /// Creates a new record that is not excluded and has no annotation.
    pub fn new<S>(mutation_type: S, sample_size: i64, derived_count: i64) -> Self
    where
        S: ToString,
    {
        Self {
            mutation_type: mutation_type.to_string(),
            sample_size,
            derived_count,
            ..Default::default()
        }
    }

    /// Returns true if the record carries the provided annotation.
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotation.as_deref() == Some(annotation)
    }

    /// Returns true if the record was flagged for exclusion upstream.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}
