mod config;
mod engine;
mod error;
mod pairing;
mod resolve;
mod runtime;
mod source;
mod variant;

pub use crate::config::*;
pub use crate::engine::*;
pub use crate::error::*;
pub use crate::pairing::*;
pub use crate::resolve::*;
pub use crate::runtime::*;
pub use crate::source::*;
pub use crate::variant::*;
