use super::{Streams, VariantSource};
use crate::{
    error::Result,
    variant::{Prediction, Variant},
};
use std::sync::Arc;

/// A source over records already held in memory.
///
/// Useful for callers that build [`Custom`](Variant::Custom) records
/// themselves, and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    primary: Arc<[Variant]>,
    secondary: Option<Arc<[Prediction]>>,
}

impl MemorySource {
    pub fn new(primary: impl Into<Arc<[Variant]>>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: impl Into<Arc<[Prediction]>>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}

impl VariantSource for MemorySource {
    fn open(&self) -> Result<Streams> {
        let primary = Arc::clone(&self.primary);
        let secondary = self.secondary.clone().map(|records| {
            Box::new((0..records.len()).map(move |i| Ok(records[i].clone()))) as super::SecondaryStream
        });
        Ok(Streams {
            primary: Box::new((0..primary.len()).map(move |i| Ok(primary[i].clone()))),
            secondary,
        })
    }
}
