//! Pairing of primary records with their pre-annotated counterparts.

use crate::{
    error::{Error, ResolveError, Result},
    variant::{Locus, Prediction, Variant},
};

/// A primary [`Variant`] together with the prediction it is annotated with.
///
/// A record built with [`PairedRecord::pair`] has had its identity checked
/// against the secondary record. A record built with
/// [`PairedRecord::unpaired`] receives its prediction later, exactly once,
/// through [`PairedRecord::attach`].
#[derive(Clone, Debug, PartialEq)]
pub struct PairedRecord {
    variant: Variant,
    prediction: Option<Prediction>,
}

impl PairedRecord {
    /// Pairs `variant` with the secondary record read alongside it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PairMismatch`] naming the first of chromosome, id,
    /// start or end on which the two records disagree.
    pub fn pair(position: u64, variant: Variant, prediction: Prediction) -> Result<Self> {
        validate_pair(position, &variant, &prediction)?;
        Ok(Self {
            variant,
            prediction: Some(prediction),
        })
    }

    pub const fn unpaired(variant: Variant) -> Self {
        Self {
            variant,
            prediction: None,
        }
    }

    /// Attaches a prediction obtained after the record was read.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::AlreadyAttached`] if the record already
    /// carries a prediction.
    pub fn attach(&mut self, prediction: Prediction) -> Result<(), ResolveError> {
        if self.prediction.is_some() {
            return Err(ResolveError::AlreadyAttached {
                locus: self.variant.locus().to_string(),
            });
        }
        self.prediction = Some(prediction);
        Ok(())
    }

    pub const fn variant(&self) -> &Variant {
        &self.variant
    }

    pub const fn locus(&self) -> &Locus {
        self.variant.locus()
    }

    pub const fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn into_parts(self) -> (Variant, Option<Prediction>) {
        (self.variant, self.prediction)
    }
}

/// Checks that `variant` and `prediction` describe the same locus.
///
/// # Errors
///
/// Returns [`Error::PairMismatch`] for the first disagreeing field.
pub fn validate_pair(position: u64, variant: &Variant, prediction: &Prediction) -> Result<()> {
    let locus = variant.locus();
    let mismatch = |field, primary: String, secondary: String| Error::PairMismatch {
        position,
        field,
        primary,
        secondary,
    };

    if locus.chromosome != prediction.chromosome {
        return Err(mismatch(
            "chromosome",
            locus.chromosome.to_string(),
            prediction.chromosome.to_string(),
        ));
    }
    if variant.id() != prediction.id.as_deref() {
        return Err(mismatch(
            "id",
            variant.id().unwrap_or(".").to_owned(),
            prediction.id.as_deref().unwrap_or(".").to_owned(),
        ));
    }
    if locus.start != prediction.start {
        return Err(mismatch(
            "start",
            locus.start.to_string(),
            prediction.start.to_string(),
        ));
    }
    if locus.end != prediction.end {
        return Err(mismatch(
            "end",
            locus.end.to_string(),
            prediction.end.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Chromosome, VcfVariant};
    use serde_json::json;

    fn variant() -> Variant {
        VcfVariant::new(
            Chromosome::Numbered(3),
            1_000,
            Some("rs42".to_owned()),
            "C".to_owned(),
            vec!["T".to_owned()],
        )
        .into()
    }

    fn prediction(chromosome: Chromosome, id: Option<&str>, start: u64, end: u64) -> Prediction {
        Prediction {
            chromosome,
            id: id.map(str::to_owned),
            start,
            end,
            body: json!({"most_severe_consequence": "missense_variant"}),
        }
    }

    #[test]
    fn matching_pair_is_accepted() {
        let record = PairedRecord::pair(
            0,
            variant(),
            prediction(Chromosome::Numbered(3), Some("rs42"), 1_000, 1_000),
        )
        .unwrap();
        assert!(record.prediction().is_some());
    }

    #[test]
    fn each_identity_field_is_checked() {
        let cases = [
            (
                prediction(Chromosome::Numbered(4), Some("rs42"), 1_000, 1_000),
                "chromosome",
            ),
            (
                prediction(Chromosome::Numbered(3), Some("rs43"), 1_000, 1_000),
                "id",
            ),
            (
                prediction(Chromosome::Numbered(3), Some("rs42"), 999, 1_000),
                "start",
            ),
            (
                prediction(Chromosome::Numbered(3), Some("rs42"), 1_000, 1_001),
                "end",
            ),
        ];

        for (secondary, expected) in cases {
            match PairedRecord::pair(7, variant(), secondary) {
                Err(Error::PairMismatch {
                    position, field, ..
                }) => {
                    assert_eq!(position, 7);
                    assert_eq!(field, expected);
                }
                other => panic!("expected {expected} mismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn mismatch_names_both_values() {
        let err = PairedRecord::pair(
            2,
            variant(),
            prediction(Chromosome::Numbered(3), Some("rs42"), 1_000, 1_005),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1000"), "{msg}");
        assert!(msg.contains("1005"), "{msg}");
    }

    #[test]
    fn attach_only_once() {
        let mut record = PairedRecord::unpaired(variant());
        let p = prediction(Chromosome::Numbered(3), Some("rs42"), 1_000, 1_000);
        record.attach(p.clone()).unwrap();
        assert!(matches!(
            record.attach(p),
            Err(ResolveError::AlreadyAttached { .. })
        ));
    }
}
