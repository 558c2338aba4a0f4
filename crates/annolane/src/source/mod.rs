//! Where lanes read their records from.
//!
//! Every lane owns a private, forward-only pair of streams over the whole
//! input and skips the records that belong to other lanes. A
//! [`VariantSource`] is therefore a factory: each call to
//! [`VariantSource::open`] must return streams positioned at the first
//! record, independent of every stream opened before.

mod cnv;
mod files;
mod memory;
mod vcf;
mod vep_json;

pub use cnv::CnvReader;
pub use files::{FileInputs, FileSource};
pub use memory::MemorySource;
pub use vcf::VcfReader;
pub use vep_json::VepJsonReader;

use crate::{
    error::Result,
    variant::{Prediction, Variant},
};

/// Lazily produced primary records.
pub type PrimaryStream = Box<dyn Iterator<Item = Result<Variant>> + Send>;

/// Lazily produced pre-annotated records, paired one-to-one with the primary
/// records that [expect one](Variant::expects_secondary).
pub type SecondaryStream = Box<dyn Iterator<Item = Result<Prediction>> + Send>;

/// One lane's private view of the input.
pub struct Streams {
    pub primary: PrimaryStream,
    pub secondary: Option<SecondaryStream>,
}

impl core::fmt::Debug for Streams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Streams")
            .field("secondary", &self.secondary.is_some())
            .finish_non_exhaustive()
    }
}

/// Opens independent streams over the same input.
pub trait VariantSource: Send + Sync {
    /// Opens a fresh pair of streams positioned at the first record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be opened. Errors are
    /// raised before any lane starts.
    fn open(&self) -> Result<Streams>;
}
