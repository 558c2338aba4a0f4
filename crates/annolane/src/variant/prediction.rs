use super::{Chromosome, Locus};

/// A variant-effect prediction for one record.
///
/// Predictions come either pre-computed from the secondary input, in which
/// case their identity fields are checked against the primary record, or
/// from the external predictor on demand. The `body` is opaque to the engine
/// and is handed to the resolver untouched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prediction {
    pub chromosome: Chromosome,
    pub id: Option<String>,
    pub start: u64,
    pub end: u64,
    pub body: serde_json::Value,
}

impl Prediction {
    pub fn new(locus: Locus, id: Option<String>, body: serde_json::Value) -> Self {
        Self {
            chromosome: locus.chromosome,
            id,
            start: locus.start,
            end: locus.end,
            body,
        }
    }

    pub fn locus(&self) -> Locus {
        Locus::new(self.chromosome.clone(), self.start, self.end)
    }
}
