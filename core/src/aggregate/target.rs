use std::{collections::BTreeSet, fmt, str::FromStr};

/// A non-empty set of positive target sample sizes, in ascending order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetSizes(BTreeSet<usize>);

impl TargetSizes {
    /// Returns an iterator over target sample sizes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Returns the largest target sample size.
    pub fn max(&self) -> usize {
        // Construction ensures non-empty
        self.0.last().copied().unwrap_or_default()
    }

    /// Returns the number of distinct target sample sizes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no target sample sizes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Creates a new set of target sample sizes, ignoring duplicates.
    ///
    /// # Errors
    ///
    /// If no target sample sizes are provided, or if any target sample size is zero.
    pub fn new<I>(target_sizes: I) -> Result<Self, InvalidSampleSize>
    where
        I: IntoIterator<Item = usize>,
    {
        let set = target_sizes.into_iter().collect::<BTreeSet<_>>();

        if set.contains(&0) {
            Err(InvalidSampleSize::NotPositive(String::from("0")))
        } else if set.is_empty() {
            Err(InvalidSampleSize::Missing)
        } else {
            Ok(Self(set))
        }
    }
}

impl FromStr for TargetSizes {
    type Err = InvalidSampleSize;

    /// Parses a comma-separated list of positive integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| InvalidSampleSize::NotPositive(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::new)
    }
}

/// An error associated with invalid target sample sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidSampleSize {
    /// No target sample sizes were provided.
    Missing,
    /// A target sample size is not a positive integer.
    NotPositive(String),
}

impl fmt::Display for InvalidSampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSampleSize::Missing => f.write_str("no target sample sizes provided"),
            InvalidSampleSize::NotPositive(s) => write!(
                f,
                "invalid target sample size '{s}': expected a positive integer"
            ),
        }
    }
}

impl std::error::Error for InvalidSampleSize {}
