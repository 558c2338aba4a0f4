use crate::error::{Error, Result};

/// Number of lanes used when none is configured: four per logical CPU.
///
/// Lanes spend most of their time waiting on the predictor, so the pool is
/// sized well past the core count. The value is not capped.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_mul(4).max(1)
}

/// Tuning for one annotation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnotatorConfig {
    /// Number of lanes, and therefore lane threads. Must be at least 1.
    pub workers: usize,
    /// Global position of the first emitted record. Records before it are
    /// read and discarded.
    pub start_position: u64,
}

impl AnnotatorConfig {
    pub const fn new(workers: usize) -> Self {
        Self {
            workers,
            start_position: 0,
        }
    }

    #[must_use]
    pub const fn with_start_position(mut self, start_position: u64) -> Self {
        self.start_position = start_position;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `workers` is zero, or if
    /// `start_position` is so large that the positions of the first two
    /// rounds of lanes do not fit in a `u64`.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "workers must be at least 1".to_owned(),
            });
        }
        let span = u64::try_from(self.workers)
            .ok()
            .and_then(|workers| workers.checked_mul(2));
        if span
            .and_then(|span| self.start_position.checked_add(span))
            .is_none()
        {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "start_position {} is out of range for {} workers",
                    self.start_position, self.workers
                ),
            });
        }
        Ok(())
    }
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self::new(default_workers())
    }
}
