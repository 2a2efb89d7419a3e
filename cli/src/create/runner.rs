use anyhow::{Context, Error};

use synsfs_core::{
    record::{
        self,
        reader::{DynReader, ReadStatus},
    },
    store::{InvalidRecordKind, Registration},
    Catalog, Input, ObservedSpectra, Store,
};

use super::Create;

pub struct Runner<'a> {
    reader: DynReader,
    store: Store<'a>,
    warnings: Warnings,
    strict: bool,
}

impl<'a> Runner<'a> {
    pub fn new(args: &Create, catalog: &'a Catalog) -> Result<Self, Error> {
        let input = Input::new(args.input.clone())?;

        let reader = record::reader::Builder::default()
            .set_input(input)
            .build()
            .with_context(|| match &args.input {
                Some(path) => format!("Failed to read records from '{}'", path.display()),
                None => String::from("Failed to read records from stdin"),
            })?;

        let exclude_annotation = args.exclude_annotation.clone();
        let store = Store::with_exclusion(catalog, move |record| {
            record.is_excluded()
                || exclude_annotation
                    .iter()
                    .any(|annotation| record.has_annotation(annotation))
        });

        Ok(Self {
            reader,
            store,
            warnings: Warnings::default(),
            strict: args.strict,
        })
    }

    pub fn run(mut self) -> Result<ObservedSpectra, Error> {
        loop {
            match self.reader.read_record() {
                ReadStatus::Read(record) => match self.store.register_record(&record) {
                    Ok(Registration::Registered) => (),
                    Ok(Registration::Excluded) => {
                        log::trace!("Excluded record on line {}", self.reader.line())
                    }
                    Err(error) => {
                        let line = self.reader.line();

                        if self.strict {
                            Err(error).with_context(|| format!("Invalid record on line {line}"))?
                        } else {
                            self.warnings.warn_once(line, Skip::Invalid(error.kind()));
                        }
                    }
                },
                ReadStatus::Malformed(error) => {
                    if self.strict {
                        Err(error)?
                    } else {
                        self.warnings.warn_once(error.line(), Skip::Malformed);
                    }
                }
                ReadStatus::Error(error) => Err(error).context("Failed to read records")?,
                ReadStatus::Done => break,
            }
        }

        self.warnings.summarize();

        let tally = self.store.tally();
        log::info!(
            "Registered {} records, excluded {}, skipped {}",
            tally.registered,
            tally.excluded,
            tally.rejected + self.warnings.count(Skip::Malformed) as u64,
        );

        self.store
            .snapshot()
            .context("Failed to create observed spectra")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Skip {
    Malformed,
    Invalid(InvalidRecordKind),
}

impl Skip {
    const N: usize = InvalidRecordKind::N + 1;

    fn variants() -> impl Iterator<Item = Self> {
        std::iter::once(Skip::Malformed).chain(InvalidRecordKind::VARIANTS.map(Skip::Invalid))
    }

    fn index(&self) -> usize {
        match self {
            Skip::Malformed => 0,
            Skip::Invalid(kind) => 1 + *kind as u8 as usize,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Skip::Malformed => "malformed line",
            Skip::Invalid(kind) => kind.reason(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Warnings {
    counts: [usize; Skip::N],
}

impl Warnings {
    pub fn count(&self, skip: Skip) -> usize {
        self.counts[skip.index()]
    }

    pub fn count_mut(&mut self, skip: Skip) -> &mut usize {
        &mut self.counts[skip.index()]
    }

    pub fn warn_once(&mut self, line: u64, skip: Skip) {
        if self.count(skip) == 0 {
            let reason = skip.reason();

            log::warn!(
                "Skipping record on line {line} due to {reason}. \
                This warning will be shown only once, with a summary at the end."
            );
        }

        *self.count_mut(skip) += 1;
    }

    pub fn summarize(&self) {
        for skip in Skip::variants() {
            let count = self.count(skip);

            if count > 0 {
                let reason = skip.reason();

                log::warn!("Skipped {count} records due to {reason}.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_indices_distinct() {
        let mut indices = Skip::variants().map(|skip| skip.index()).collect::<Vec<_>>();
        indices.sort_unstable();

        assert_eq!(indices, (0..Skip::N).collect::<Vec<_>>());
    }

    #[test]
    fn test_warnings_count() {
        let mut warnings = Warnings::default();

        warnings.warn_once(2, Skip::Malformed);
        warnings.warn_once(5, Skip::Malformed);
        warnings.warn_once(
            7,
            Skip::Invalid(InvalidRecordKind::DerivedCountExceedsSampleSize),
        );

        assert_eq!(warnings.count(Skip::Malformed), 2);
        assert_eq!(
            warnings.count(Skip::Invalid(InvalidRecordKind::DerivedCountExceedsSampleSize)),
            1
        );
        assert_eq!(
            warnings.count(Skip::Invalid(InvalidRecordKind::UnknownMutationType)),
            0
        );
    }
}
