//! Variant records and the loci they describe.
//!
//! [`Variant`] is a closed union over the three record kinds the engine
//! understands. Everything the engine needs from a record (its [`Locus`],
//! whether it pairs with a secondary record, the allele handed to the
//! predictor) is reachable through the common accessors, so code that
//! branches on the kind is checked for exhaustiveness by the compiler.

mod chromosome;
mod prediction;

pub use chromosome::Chromosome;
pub use prediction::Prediction;

use core::fmt;

/// Allele reported for records that have no nucleotide alternate.
pub const SYMBOLIC_ALLELE: &str = "-";

/// A genomic interval on one chromosome, 1-based and inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locus {
    pub chromosome: Chromosome,
    pub start: u64,
    pub end: u64,
}

impl Locus {
    pub const fn new(chromosome: Chromosome, start: u64, end: u64) -> Self {
        Self {
            chromosome,
            start,
            end,
        }
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// The kind tag of a [`Variant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VariantKind {
    Vcf,
    Cnv,
    Custom,
}

impl VariantKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vcf => "vcf",
            Self::Cnv => "cnv",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate variant read from the primary input.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Variant {
    Vcf(VcfVariant),
    Cnv(CnvVariant),
    Custom(CustomVariant),
}

impl Variant {
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::Vcf(_) => VariantKind::Vcf,
            Self::Cnv(_) => VariantKind::Cnv,
            Self::Custom(_) => VariantKind::Custom,
        }
    }

    pub const fn locus(&self) -> &Locus {
        match self {
            Self::Vcf(v) => &v.locus,
            Self::Cnv(v) => &v.locus,
            Self::Custom(v) => &v.locus,
        }
    }

    /// The record identifier, if the input format carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Vcf(v) => v.id.as_deref(),
            Self::Cnv(_) | Self::Custom(_) => None,
        }
    }

    /// Whether a secondary (pre-annotated) record is paired with this one
    /// when a secondary input is present.
    ///
    /// Only VCF-derived records have a counterpart in the secondary input.
    /// Every other kind is resolved through the predictor.
    pub const fn expects_secondary(&self) -> bool {
        matches!(self, Self::Vcf(_))
    }

    /// The allele submitted to the predictor for this record.
    pub fn allele(&self) -> &str {
        match self {
            Self::Vcf(v) => v.primary_alternate().unwrap_or(SYMBOLIC_ALLELE),
            Self::Cnv(_) => SYMBOLIC_ALLELE,
            Self::Custom(v) => &v.alternate,
        }
    }
}

impl From<VcfVariant> for Variant {
    fn from(v: VcfVariant) -> Self {
        Self::Vcf(v)
    }
}

impl From<CnvVariant> for Variant {
    fn from(v: CnvVariant) -> Self {
        Self::Cnv(v)
    }
}

impl From<CustomVariant> for Variant {
    fn from(v: CustomVariant) -> Self {
        Self::Custom(v)
    }
}

/// A record from a VCF file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VcfVariant {
    pub locus: Locus,
    pub id: Option<String>,
    pub reference: String,
    pub alternates: Vec<String>,
}

impl VcfVariant {
    /// Builds a VCF record from its `POS`, `ID`, `REF` and `ALT` columns.
    ///
    /// The locus uses the predictor's coordinate convention so that it can be
    /// compared against pre-annotated records: when no alternate has the
    /// reference's length and an alternate shares the reference's anchor
    /// base, the anchor is not part of the variant and the start moves one
    /// base right. The end always covers the full reference allele.
    pub fn new(
        chromosome: Chromosome,
        pos: u64,
        id: Option<String>,
        reference: String,
        alternates: Vec<String>,
    ) -> Self {
        let same_length = alternates.iter().any(|alt| alt.len() == reference.len());
        let anchored = reference.as_bytes().first().is_some_and(|anchor| {
            alternates
                .iter()
                .any(|alt| alt.as_bytes().first() == Some(anchor))
        });
        let start = if !same_length && anchored { pos + 1 } else { pos };
        let end = pos + (reference.len() as u64).saturating_sub(1);

        Self {
            locus: Locus::new(chromosome, start, end),
            id: id.filter(|id| id != "."),
            reference,
            alternates,
        }
    }

    /// The first alternate that is not the spanning-deletion placeholder.
    pub fn primary_alternate(&self) -> Option<&str> {
        self.alternates
            .iter()
            .map(String::as_str)
            .find(|alt| *alt != "*")
    }
}

/// A copy-number variant merged from one or more rows of a CNV table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CnvVariant {
    pub locus: Locus,
    pub exons: Vec<String>,
    pub transcripts: Vec<String>,
}

/// A variant supplied directly by a caller rather than read from a file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomVariant {
    pub locus: Locus,
    pub reference: String,
    pub alternate: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vcf(pos: u64, reference: &str, alternates: &[&str]) -> VcfVariant {
        VcfVariant::new(
            Chromosome::Numbered(1),
            pos,
            Some("rs1".to_owned()),
            reference.to_owned(),
            alternates.iter().map(|a| (*a).to_owned()).collect(),
        )
    }

    #[test]
    fn snv_locus_spans_one_base() {
        let v = vcf(100, "A", &["G"]);
        assert_eq!(v.locus.start, 100);
        assert_eq!(v.locus.end, 100);
    }

    #[test]
    fn anchored_deletion_skips_anchor_base() {
        let v = vcf(100, "ACT", &["A"]);
        assert_eq!(v.locus.start, 101);
        assert_eq!(v.locus.end, 102);
    }

    #[test]
    fn anchored_insertion_ends_before_start() {
        let v = vcf(100, "A", &["ACT"]);
        assert_eq!(v.locus.start, 101);
        assert_eq!(v.locus.end, 100);
    }

    #[test]
    fn unanchored_mnv_keeps_position() {
        let v = vcf(100, "AC", &["GT", "G"]);
        assert_eq!(v.locus.start, 100);
        assert_eq!(v.locus.end, 101);
    }

    #[test]
    fn dot_id_is_absent() {
        let v = VcfVariant::new(
            Chromosome::X,
            5,
            Some(".".to_owned()),
            "A".to_owned(),
            vec!["T".to_owned()],
        );
        assert_eq!(Variant::from(v).id(), None);
    }

    #[test]
    fn allele_skips_spanning_deletion() {
        let v = Variant::from(vcf(100, "A", &["*", "T"]));
        assert_eq!(v.allele(), "T");

        let cnv = Variant::from(CnvVariant {
            locus: Locus::new(Chromosome::Numbered(2), 10, 500),
            exons: vec![],
            transcripts: vec![],
        });
        assert_eq!(cnv.allele(), SYMBOLIC_ALLELE);
        assert!(!cnv.expects_secondary());
    }
}
