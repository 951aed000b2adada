//! Compile-time constant values for a constant folder.
//!
//! `store` holds the arena, the tagged [`Value`] handle and the memory objects
//! values live in while folding proceeds. `diag` carries the provenance of
//! values that could not be folded and turns it into structured notes.

pub mod util;
pub mod store;
pub mod diag;

pub use util::error::{Error, ErrorKind, Result};
pub use store::{Arena, Value, Kind, MemoryObject};
pub use diag::{UnknownReason, SourceLoc};
