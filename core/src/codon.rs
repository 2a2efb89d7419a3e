//! Nucleotides, codons and the standard genetic code.

use std::{fmt, str::FromStr};

/// A DNA nucleotide.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Nucleotide {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Thymine.
    T,
}

impl Nucleotide {
    /// All nucleotides, in the conventional `TCAG` order of the genetic code table.
    pub const TCAG: [Nucleotide; 4] = [Nucleotide::T, Nucleotide::C, Nucleotide::A, Nucleotide::G];

    /// Returns the nucleotide corresponding to an ASCII byte, ignoring case.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_uppercase() {
            b'A' => Some(Self::A),
            b'C' => Some(Self::C),
            b'G' => Some(Self::G),
            b'T' => Some(Self::T),
            _ => None,
        }
    }

    /// Returns the upper-case ASCII character for the nucleotide.
    pub fn as_char(&self) -> char {
        match self {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
        }
    }

    fn tcag_index(&self) -> usize {
        match self {
            Nucleotide::T => 0,
            Nucleotide::C => 1,
            Nucleotide::A => 2,
            Nucleotide::G => 3,
        }
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An amino acid, or stop, in one-letter code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AminoAcid(u8);

impl AminoAcid {
    /// Returns true if this is a stop signal rather than an amino acid.
    pub fn is_stop(&self) -> bool {
        self.0 == b'*'
    }

    /// The one-letter code, with `*` for stop.
    pub fn as_char(&self) -> char {
        char::from(self.0)
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The standard genetic code in `TCAG` order of first, second, and third position.
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// A codon of three nucleotides.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Codon(pub [Nucleotide; 3]);

impl Codon {
    /// Returns the number of positions at which the two codons differ.
    pub fn differences(&self, other: &Codon) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Returns an iterator over all 64 codons in the order of the genetic code table.
    pub fn iter_all() -> impl Iterator<Item = Codon> {
        Nucleotide::TCAG.into_iter().flat_map(|first| {
            Nucleotide::TCAG.into_iter().flat_map(move |second| {
                Nucleotide::TCAG
                    .into_iter()
                    .map(move |third| Codon([first, second, third]))
            })
        })
    }

    /// Translates the codon using the standard genetic code.
    pub fn translate(&self) -> AminoAcid {
        let [first, second, third] = self.0.map(|n| n.tcag_index());
        AminoAcid(STANDARD_CODE[16 * first + 4 * second + third])
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|n| write!(f, "{n}"))
    }
}

impl FromStr for Codon {
    type Err = ParseCodonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let &[first, second, third] = s.as_bytes() {
            if let (Some(first), Some(second), Some(third)) = (
                Nucleotide::from_byte(first),
                Nucleotide::from_byte(second),
                Nucleotide::from_byte(third),
            ) {
                return Ok(Codon([first, second, third]));
            }
        }

        Err(ParseCodonError(s.to_string()))
    }
}

/// An error associated with parsing a codon.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseCodonError(String);

impl fmt::Display for ParseCodonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse '{}' as codon", self.0)
    }
}

impl std::error::Error for ParseCodonError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_codon() {
        assert_eq!(
            codon("AtG"),
            Codon([Nucleotide::A, Nucleotide::T, Nucleotide::G])
        );
        assert!("AT".parse::<Codon>().is_err());
        assert!("ATGC".parse::<Codon>().is_err());
        assert!("ATN".parse::<Codon>().is_err());
    }

    #[test]
    fn test_display_codon() {
        assert_eq!(codon("gca").to_string(), "GCA");
    }

    #[test]
    fn test_translate() {
        assert_eq!(codon("ATG").translate().as_char(), 'M');
        assert_eq!(codon("TTT").translate().as_char(), 'F');
        assert_eq!(codon("AGA").translate().as_char(), 'R');
        assert_eq!(codon("GGG").translate().as_char(), 'G');
        assert!(codon("TAA").translate().is_stop());
        assert!(codon("TAG").translate().is_stop());
        assert!(codon("TGA").translate().is_stop());
        assert!(!codon("TGG").translate().is_stop());
    }

    #[test]
    fn test_iter_all() {
        let all = Codon::iter_all().collect::<Vec<_>>();

        assert_eq!(all.len(), 64);
        assert_eq!(all[0], codon("TTT"));
        assert_eq!(all[63], codon("GGG"));
        assert_eq!(Codon::iter_all().filter(|c| c.translate().is_stop()).count(), 3);
    }

    #[test]
    fn test_differences() {
        assert_eq!(codon("ATT").differences(&codon("ATT")), 0);
        assert_eq!(codon("ATT").differences(&codon("ATC")), 1);
        assert_eq!(codon("CGA").differences(&codon("AGG")), 2);
    }
}
