//! Reading and writing for the plain text format.
//!
//! The plain text format is a tab-separated table with a header line starting with `#`. Each
//! following line holds a single spectrum. For observed spectra, the columns are mutation type,
//! sample size, and the site counts separated by a single space:
//!
//! ```text
//! #mutation_type	sample_size	spectrum
//! ATT->ATC	2	2 3 5
//! ```
//!
//! For aggregation results, the columns are mutation type, target sample size, the
//! comma-separated native sample sizes that contributed (or `.` if none), and the expected
//! site counts:
//!
//! ```text
//! #mutation_type	target_size	sources	spectrum
//! ATT->ATC	1	2	3.500000 6.500000
//! ```

use std::{
    fmt::{Display, Write as _},
    io,
    str::FromStr,
};

use crate::{Aggregated, MutationType, ObservedSpectra, ObservedSpectrum};

/// The text format start byte.
pub(crate) const START: u8 = b'#';

const OBSERVED_HEADER: &str = "#mutation_type\tsample_size\tspectrum";
const AGGREGATED_HEADER: &str = "#mutation_type\ttarget_size\tsources\tspectrum";
const MISSING: &str = ".";

fn join<I, F>(iter: I, sep: &str, mut f: F) -> String
where
    I: IntoIterator,
    F: FnMut(&mut String, I::Item) -> std::fmt::Result,
{
    let mut s = String::new();

    for (i, x) in iter.into_iter().enumerate() {
        if i > 0 {
            s.push_str(sep);
        }
        // Writing to a string cannot fail
        let _ = f(&mut s, x);
    }

    s
}

fn format_values<T>(values: &[T], precision: Option<usize>) -> String
where
    T: Display,
{
    match precision {
        Some(precision) => join(values, " ", |s, x| write!(s, "{x:.precision$}")),
        None => join(values, " ", |s, x| write!(s, "{x}")),
    }
}

/// Writes observed spectra in text format to a writer.
pub fn write_observed<W>(writer: &mut W, spectra: &ObservedSpectra) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(writer, "{OBSERVED_HEADER}")?;

    for (mutation_type, sample_size, spectrum) in spectra.iter_spectra() {
        writeln!(
            writer,
            "{mutation_type}\t{sample_size}\t{}",
            format_values(spectrum.as_slice(), None)
        )?;
    }

    Ok(())
}

/// Writes aggregation results in text format to a writer.
pub fn write_aggregated<W>(
    writer: &mut W,
    aggregated: &Aggregated,
    precision: usize,
) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(writer, "{AGGREGATED_HEADER}")?;

    for (mutation_type, target_size, spectrum) in aggregated.iter_spectra() {
        let sources = if spectrum.has_data() {
            join(spectrum.sources(), ",", |s, x| write!(s, "{x}"))
        } else {
            String::from(MISSING)
        };

        writeln!(
            writer,
            "{mutation_type}\t{target_size}\t{sources}\t{}",
            format_values(spectrum.as_slice(), Some(precision))
        )?;
    }

    Ok(())
}

/// Reads observed spectra in text format from a reader.
///
/// Lines starting with `#` and empty lines are skipped. Spectra given more than once for the same
/// mutation type and sample size are summed.
pub fn read_observed<R>(reader: R) -> io::Result<ObservedSpectra>
where
    R: io::BufRead,
{
    let mut spectra = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;

        if line.starts_with(START as char) || line.trim().is_empty() {
            continue;
        }

        let entry = parse_observed_line(&line).map_err(|reason| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse line {}: {reason}", i + 1),
            )
        })?;

        spectra.push(entry);
    }

    Ok(spectra.into_iter().collect())
}

fn parse_observed_line(line: &str) -> Result<(MutationType, usize, ObservedSpectrum), String> {
    let mut fields = line.split('\t');

    let (Some(mutation_type), Some(sample_size), Some(spectrum), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(String::from("expected three tab-separated fields"));
    };

    let mutation_type = mutation_type.parse::<MutationType>().map_err(|e| e.to_string())?;
    let sample_size = sample_size
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid sample size '{sample_size}'"))?;
    let spectrum = spectrum
        .split_ascii_whitespace()
        .map(u64::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid site counts '{spectrum}'"))?;

    Ok((mutation_type, sample_size, ObservedSpectrum::from(spectrum)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{aggregate::TargetSizes, Aggregator, Catalog};

    fn observed() -> ObservedSpectra {
        ObservedSpectra::from_iter([
            (
                "ATT->ATC".parse().unwrap(),
                2,
                ObservedSpectrum::from([2, 3, 5]),
            ),
            (
                "GGG->GGA".parse().unwrap(),
                1,
                ObservedSpectrum::from([0, 4]),
            ),
        ])
    }

    #[test]
    fn test_write_observed() {
        let mut dest = Vec::new();
        write_observed(&mut dest, &observed()).unwrap();

        let expected = "#mutation_type\tsample_size\tspectrum\n\
                        ATT->ATC\t2\t2 3 5\n\
                        GGG->GGA\t1\t0 4\n";
        assert_eq!(String::from_utf8(dest).unwrap(), expected);
    }

    #[test]
    fn test_write_aggregated() {
        let catalog = Catalog::synonymous();
        let aggregated = Aggregator::new(&catalog)
            .aggregate_all(&TargetSizes::new([1, 2]).unwrap(), &observed())
            .unwrap();

        let mut dest = Vec::new();
        write_aggregated(&mut dest, &aggregated, 2).unwrap();

        let expected = "#mutation_type\ttarget_size\tsources\tspectrum\n\
                        ATT->ATC\t1\t2\t3.50 6.50\n\
                        ATT->ATC\t2\t2\t2.00 3.00 5.00\n\
                        GGG->GGA\t1\t1\t0.00 4.00\n\
                        GGG->GGA\t2\t.\t0.00 0.00 0.00\n";
        assert_eq!(String::from_utf8(dest).unwrap(), expected);
    }

    #[test]
    fn test_read_observed() {
        let src = b"#mutation_type\tsample_size\tspectrum\n\
                    ATT->ATC\t2\t2 3 5\n\
                    \n\
                    GGG->GGA\t1\t0 4\n\
                    ATT->ATC\t2\t1 0 0\n";

        let spectra = read_observed(&src[..]).unwrap();

        let m = "ATT->ATC".parse().unwrap();
        assert_eq!(spectra.get(&m).unwrap()[&2], ObservedSpectrum::from([3, 3, 5]));
        assert_eq!(spectra.sites(), 15);
    }

    #[test]
    fn test_read_observed_invalid() {
        for src in [
            &b"ATT->ATC\t2\n"[..],
            &b"ATT->ATC\tx\t1 2 3\n"[..],
            &b"ATT->ATC\t2\t1 -2 3\n"[..],
            &b"ATTATC\t2\t1 2 3\n"[..],
        ] {
            let result = read_observed(&src[..]);
            assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
        }
    }
}
