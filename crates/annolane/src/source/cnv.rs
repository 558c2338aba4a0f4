use crate::{
    error::{Error, Result},
    variant::{Chromosome, CnvVariant, Locus, Variant},
};
use std::{collections::HashMap, io::BufRead};

const REQUIRED: [&str; 5] = ["CHROM", "START", "END", "EXON_NUM", "TRANSCRIPT"];

struct Row {
    locus: Locus,
    exon: String,
    transcript: String,
}

/// Reads a whitespace-separated CNV table as [`Variant::Cnv`] records.
///
/// The column layout comes from the `#CHROM …` header line. Consecutive rows
/// with the same locus describe the same event over several exons and are
/// merged into one record that lists each distinct exon number and transcript
/// in order of appearance. Rows on patch contigs are skipped.
pub struct CnvReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    origin: String,
    columns: HashMap<String, usize>,
    pending: Option<Row>,
}

impl<R: BufRead> CnvReader<R> {
    /// `origin` names the input in error messages.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            origin: origin.into(),
            columns: HashMap::new(),
            pending: None,
        }
    }

    fn invalid(&self, what: impl core::fmt::Display) -> Error {
        Error::Input {
            context: format!("{}:{}: {what}", self.origin, self.line_no),
        }
    }

    fn read_header(&mut self, line: &str) {
        let header = line.trim_start_matches('#').trim();
        if !header.to_ascii_uppercase().starts_with("CHROM") {
            return;
        }
        self.columns = header
            .split_whitespace()
            .enumerate()
            .map(|(i, name)| (name.to_ascii_uppercase(), i))
            .collect();
    }

    fn column<'a>(&self, values: &[&'a str], name: &str) -> Result<&'a str> {
        let idx = *self
            .columns
            .get(name)
            .ok_or_else(|| self.invalid(format!("header has no {name} column")))?;
        values
            .get(idx)
            .copied()
            .ok_or_else(|| self.invalid(format!("row has no value for {name}")))
    }

    /// Reads the next data row, or `None` at end of input.
    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            self.line_no += 1;

            if line.starts_with('#') {
                self.read_header(&line);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            if REQUIRED.iter().any(|c| !self.columns.contains_key(*c)) {
                return Err(self.invalid("data row before a complete #CHROM header"));
            }

            let values: Vec<&str> = line.split_whitespace().collect();
            let raw_chrom = self.column(&values, "CHROM")?;
            let chromosome = Chromosome::parse(raw_chrom)
                .ok_or_else(|| self.invalid(format!("unknown chromosome {raw_chrom}")))?;
            if !chromosome.is_supported() {
                continue;
            }
            let start = self
                .column(&values, "START")?
                .parse::<u64>()
                .map_err(|_| self.invalid("START is not a positive integer"))?;
            let end = self
                .column(&values, "END")?
                .parse::<u64>()
                .map_err(|_| self.invalid("END is not a positive integer"))?;

            return Ok(Some(Row {
                locus: Locus::new(chromosome, start, end),
                exon: self.column(&values, "EXON_NUM")?.to_owned(),
                transcript: self.column(&values, "TRANSCRIPT")?.to_owned(),
            }));
        }
    }

    fn read_variant(&mut self) -> Result<Option<Variant>> {
        let first = match self.pending.take() {
            Some(row) => row,
            None => match self.next_row()? {
                Some(row) => row,
                None => return Ok(None),
            },
        };

        let mut exons = vec![first.exon];
        let mut transcripts = vec![first.transcript];
        while let Some(row) = self.next_row()? {
            if row.locus != first.locus {
                self.pending = Some(row);
                break;
            }
            if !exons.contains(&row.exon) {
                exons.push(row.exon);
            }
            if !transcripts.contains(&row.transcript) {
                transcripts.push(row.transcript);
            }
        }

        Ok(Some(
            CnvVariant {
                locus: first.locus,
                exons,
                transcripts,
            }
            .into(),
        ))
    }
}

impl<R: BufRead> Iterator for CnvReader<R> {
    type Item = Result<Variant>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_variant().transpose()
    }
}
