//! The two external collaborators a lane calls out to.
//!
//! A [`Resolver`] turns a paired record into the caller's annotation type and
//! is invoked synchronously, either on the lane thread or through
//! [`Spawner::spawn_blocking`](crate::Spawner::spawn_blocking). A
//! [`Predictor`] supplies predictions for records that have no pre-annotated
//! counterpart; its answer is a future so that lanes can hand the wait to an
//! async runtime instead of parking (see [`Spawner`](crate::Spawner)).

use crate::{
    error::ResolveError,
    pairing::PairedRecord,
    variant::{Locus, Prediction},
};
use core::marker::PhantomData;
use futures::future::BoxFuture;

/// Builds the annotation for one record.
///
/// Implementations are shared by every lane and must be thread-safe. They may
/// block, for example on database lookups.
pub trait Resolver: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Annotates `record`.
    ///
    /// # Errors
    ///
    /// Any error is recorded against this record only; the run continues.
    fn resolve(&self, record: &PairedRecord) -> Result<Self::Output, ResolveError>;
}

/// A [`Resolver`] backed by a closure. Built with [`resolver_fn`].
pub struct FnResolver<F, R> {
    f: F,
    _output: PhantomData<fn() -> R>,
}

/// Wraps a closure as a [`Resolver`].
pub const fn resolver_fn<F, R>(f: F) -> FnResolver<F, R>
where
    F: Fn(&PairedRecord) -> Result<R, ResolveError> + Send + Sync + 'static,
    R: Send + 'static,
{
    FnResolver {
        f,
        _output: PhantomData,
    }
}

impl<F, R> Resolver for FnResolver<F, R>
where
    F: Fn(&PairedRecord) -> Result<R, ResolveError> + Send + Sync + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn resolve(&self, record: &PairedRecord) -> Result<R, ResolveError> {
        (self.f)(record)
    }
}

/// Fetches a prediction for a locus from an external service.
pub trait Predictor: Send + Sync + 'static {
    /// Requests a prediction for `allele` at `locus`.
    ///
    /// Timeouts and retries are the predictor's concern: the engine waits for
    /// the returned future for as long as it takes.
    fn fetch_payload(
        &self,
        locus: &Locus,
        allele: &str,
    ) -> BoxFuture<'static, Result<Prediction, ResolveError>>;
}
