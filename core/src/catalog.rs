//! Catalog of valid mutation types.
//!
//! A mutation type is a directed codon change, written `ANCESTRAL->DERIVED`, for instance
//! `ATT->ATC`. The standard [`Catalog::synonymous`] contains every single-nucleotide change
//! between two sense codons encoding the same amino acid under the standard genetic code.
//!
//! The catalog is constructed once and then passed by reference to whatever needs to validate
//! mutation types, such as the [`Store`](crate::Store) and the
//! [`Aggregator`](crate::Aggregator).

use std::{fmt, str::FromStr};

use indexmap::{set, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codon::{Codon, Nucleotide, ParseCodonError};

const SEPARATOR: &str = "->";

/// A directed codon change.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MutationType {
    ancestral: Codon,
    derived: Codon,
}

impl MutationType {
    /// The ancestral codon.
    pub fn ancestral(&self) -> Codon {
        self.ancestral
    }

    /// The derived codon.
    pub fn derived(&self) -> Codon {
        self.derived
    }

    /// Returns true if the codons differ at exactly one position.
    pub fn is_single_nucleotide(&self) -> bool {
        self.ancestral.differences(&self.derived) == 1
    }

    /// Returns true if both codons are sense codons translating to the same amino acid.
    pub fn is_synonymous(&self) -> bool {
        let (ancestral, derived) = (self.ancestral.translate(), self.derived.translate());
        !ancestral.is_stop() && ancestral == derived
    }

    /// Creates a new mutation type.
    pub fn new(ancestral: Codon, derived: Codon) -> Self {
        Self { ancestral, derived }
    }

    /// Returns the mutation type in the opposite direction.
    pub fn reverse(&self) -> Self {
        Self::new(self.derived, self.ancestral)
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.ancestral, self.derived)
    }
}

impl FromStr for MutationType {
    type Err = ParseMutationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ancestral, derived) = s
            .trim()
            .split_once(SEPARATOR)
            .ok_or_else(|| ParseMutationTypeError::MissingSeparator(s.to_string()))?;

        Ok(Self::new(ancestral.parse()?, derived.parse()?))
    }
}

impl Serialize for MutationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MutationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// An error associated with parsing a mutation type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseMutationTypeError {
    /// The string does not contain the `->` separator.
    MissingSeparator(String),
    /// One of the codons is invalid.
    InvalidCodon(ParseCodonError),
}

impl From<ParseCodonError> for ParseMutationTypeError {
    fn from(error: ParseCodonError) -> Self {
        Self::InvalidCodon(error)
    }
}

impl fmt::Display for ParseMutationTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMutationTypeError::MissingSeparator(s) => write!(
                f,
                "failed to parse '{s}' as mutation type: expected 'CODON{SEPARATOR}CODON'"
            ),
            ParseMutationTypeError::InvalidCodon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseMutationTypeError {}

/// A fixed, ordered set of valid mutation types.
///
/// Membership is closed under reversal: for every `A->B` in the catalog, `B->A` is also present.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Catalog {
    mutation_types: IndexSet<MutationType>,
}

impl Catalog {
    /// Returns true if the mutation type is in the catalog.
    pub fn contains(&self, mutation_type: &MutationType) -> bool {
        self.mutation_types.contains(mutation_type)
    }

    /// Returns the mutation type at the given position in catalog order.
    pub fn get_index(&self, index: usize) -> Option<&MutationType> {
        self.mutation_types.get_index(index)
    }

    /// Returns the position of the mutation type in catalog order.
    pub fn index_of(&self, mutation_type: &MutationType) -> Option<usize> {
        self.mutation_types.get_index_of(mutation_type)
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.mutation_types.is_empty()
    }

    /// Returns an iterator over the mutation types in catalog order.
    pub fn iter(&self) -> set::Iter<'_, MutationType> {
        self.mutation_types.iter()
    }

    /// Returns the number of mutation types in the catalog.
    pub fn len(&self) -> usize {
        self.mutation_types.len()
    }

    /// Creates a new catalog from mutation types.
    ///
    /// # Errors
    ///
    /// If the same mutation type is provided twice, or if the reverse of any provided mutation type
    /// is missing.
    pub fn new<I>(mutation_types: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = MutationType>,
    {
        let mut set = IndexSet::new();

        for mutation_type in mutation_types {
            if !set.insert(mutation_type) {
                return Err(CatalogError::Duplicate(mutation_type));
            }
        }

        if let Some(missing) = set.iter().find(|m| !set.contains(&m.reverse())) {
            return Err(CatalogError::MissingReverse(*missing));
        }

        Ok(Self {
            mutation_types: set,
        })
    }

    /// Parses a mutation type and checks that it is in the catalog.
    pub fn resolve(&self, s: &str) -> Result<MutationType, CatalogError> {
        let mutation_type = s
            .parse::<MutationType>()
            .map_err(|_| CatalogError::Unknown(s.to_string()))?;

        if self.contains(&mutation_type) {
            Ok(mutation_type)
        } else {
            Err(CatalogError::Unknown(mutation_type.to_string()))
        }
    }

    /// Returns the catalog of single-nucleotide synonymous changes under the standard genetic code.
    ///
    /// Changes involving stop codons are not included. The catalog contains 134 mutation types,
    /// ordered by the ancestral codon in genetic code table order, and then by position and
    /// derived nucleotide.
    pub fn synonymous() -> Self {
        let mutation_types = Codon::iter_all()
            .filter(|ancestral| !ancestral.translate().is_stop())
            .flat_map(|ancestral| {
                (0..3).flat_map(move |position| {
                    Nucleotide::TCAG
                        .into_iter()
                        .filter(move |&n| n != ancestral.0[position])
                        .map(move |n| {
                            let mut derived = ancestral;
                            derived.0[position] = n;
                            MutationType::new(ancestral, derived)
                        })
                })
            })
            .filter(MutationType::is_synonymous)
            .collect();

        Self { mutation_types }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a MutationType;
    type IntoIter = set::Iter<'a, MutationType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An error associated with the catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CatalogError {
    /// A mutation type was provided more than once.
    Duplicate(MutationType),
    /// The reverse of a mutation type is missing.
    MissingReverse(MutationType),
    /// The mutation type is not in the catalog.
    Unknown(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Duplicate(m) => write!(f, "duplicate mutation type '{m}' in catalog"),
            CatalogError::MissingReverse(m) => write!(
                f,
                "mutation type '{m}' in catalog without its reverse '{}'",
                m.reverse()
            ),
            CatalogError::Unknown(s) => write!(f, "unknown mutation type '{s}'"),
        }
    }
}

impl std::error::Error for CatalogError {}
