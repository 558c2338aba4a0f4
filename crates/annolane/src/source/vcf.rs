use crate::{
    error::{Error, Result},
    variant::{Chromosome, Variant, VcfVariant},
};
use std::io::BufRead;

const CHROM: usize = 0;
const POS: usize = 1;
const ID: usize = 2;
const REF: usize = 3;
const ALT: usize = 4;

/// Reads VCF data lines as [`Variant::Vcf`] records.
///
/// Only the fixed `CHROM POS ID REF ALT` columns are interpreted. Header lines
/// are skipped, and so are records on contigs that are not supported
/// chromosomes.
pub struct VcfReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    origin: String,
}

impl<R: BufRead> VcfReader<R> {
    /// `origin` names the input in error messages.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            origin: origin.into(),
        }
    }

    fn invalid(&self, what: &str) -> Error {
        Error::Input {
            context: format!("{}:{}: {what}", self.origin, self.line_no),
        }
    }

    fn parse(&self, line: &str) -> Result<Option<Variant>> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= ALT {
            return Err(self.invalid("expected at least 5 tab-separated columns"));
        }

        let Some(chromosome) = Chromosome::parse(fields[CHROM]).filter(Chromosome::is_supported)
        else {
            return Ok(None);
        };
        let pos = fields[POS]
            .parse::<u64>()
            .map_err(|_| self.invalid("POS is not a positive integer"))?;

        let variant = VcfVariant::new(
            chromosome,
            pos,
            Some(fields[ID].to_owned()),
            fields[REF].to_owned(),
            fields[ALT].split(',').map(str::to_owned).collect(),
        );
        Ok(Some(variant.into()))
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<Variant>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.parse(&line) {
                Ok(Some(variant)) => return Some(Ok(variant)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
