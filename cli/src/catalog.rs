use std::io::{self, Write};

use anyhow::Error;

use clap::Parser;

/// Print the catalog of synonymous mutation types.
///
/// One mutation type is printed per line, ordered by ancestral codon in genetic code table order.
#[derive(Debug, Parser)]
pub struct Catalog {}

impl Catalog {
    pub fn run(self) -> Result<(), Error> {
        let catalog = synsfs_core::Catalog::synonymous();

        let mut writer = io::BufWriter::new(io::stdout().lock());
        for mutation_type in catalog.iter() {
            writeln!(writer, "{mutation_type}")?;
        }
        writer.flush()?;

        log::info!("Printed {} mutation types", catalog.len());

        Ok(())
    }
}
