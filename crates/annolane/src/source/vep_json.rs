use crate::{
    error::{Error, Result},
    variant::{Chromosome, Prediction},
};
use serde_json::Value;
use std::io::BufRead;

/// Column of the echoed VCF line that holds the record id.
const INPUT_ID_COLUMN: usize = 2;

/// Reads predictor output stored as one JSON object per line.
///
/// Each object must carry `seq_region_name`, `start` and `end`, and may carry
/// `input`, the tab-separated VCF line the prediction was computed for, from
/// which the record id is taken. Objects on unsupported contigs are skipped,
/// mirroring [`VcfReader`](super::VcfReader).
pub struct VepJsonReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    origin: String,
}

impl<R: BufRead> VepJsonReader<R> {
    /// `origin` names the input in error messages.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            origin: origin.into(),
        }
    }

    fn invalid(&self, what: impl core::fmt::Display) -> Error {
        Error::Input {
            context: format!("{}:{}: {what}", self.origin, self.line_no),
        }
    }

    fn parse(&self, line: &str) -> Result<Option<Prediction>> {
        let body: Value = serde_json::from_str(line).map_err(|e| self.invalid(e))?;

        let region = body
            .get("seq_region_name")
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid("missing seq_region_name"))?;
        let Some(chromosome) = Chromosome::parse(region).filter(Chromosome::is_supported) else {
            return Ok(None);
        };
        let start = body
            .get("start")
            .and_then(Value::as_u64)
            .ok_or_else(|| self.invalid("missing or invalid start"))?;
        let end = body
            .get("end")
            .and_then(Value::as_u64)
            .ok_or_else(|| self.invalid("missing or invalid end"))?;
        let id = body
            .get("input")
            .and_then(Value::as_str)
            .and_then(|input| input.split('\t').nth(INPUT_ID_COLUMN))
            .filter(|id| *id != ".")
            .map(str::to_owned);

        Ok(Some(Prediction {
            chromosome,
            id,
            start,
            end,
            body,
        }))
    }
}

impl<R: BufRead> Iterator for VepJsonReader<R> {
    type Item = Result<Prediction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            match self.parse(&line) {
                Ok(Some(prediction)) => return Some(Ok(prediction)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
