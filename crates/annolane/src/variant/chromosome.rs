use core::fmt;

/// Autosomes plus the numbered 23rd contig used by some assemblies.
const NUMBERED: u8 = 23;

/// A normalised chromosome name.
///
/// Parsing is case-insensitive and accepts an optional `chr` prefix, so
/// `chr7`, `CHR7` and `7` all name the same chromosome. Unplaced `PATCH_*`
/// contigs parse but are not [supported](Chromosome::is_supported); input
/// readers skip records on them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Chromosome {
    Numbered(u8),
    X,
    Y,
    Patch(String),
}

impl Chromosome {
    /// Parses a contig name, returning `None` for anything that is not a
    /// chromosome or a patch contig.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        let value = upper.strip_prefix("CHR").unwrap_or(&upper);
        match value {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            v if v.starts_with("PATCH_") => Some(Self::Patch(v.to_owned())),
            v => match v.parse::<u8>() {
                Ok(n) if (1..=NUMBERED).contains(&n) => Some(Self::Numbered(n)),
                _ => None,
            },
        }
    }

    /// Whether records on this chromosome are annotated.
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Patch(_))
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => write!(f, "chr{n}"),
            Self::X => f.write_str("chrX"),
            Self::Y => f.write_str("chrY"),
            Self::Patch(name) => write!(f, "chr{name}"),
        }
    }
}
