//! Path resolvers for the trellis builder.
//!
//! This crate provides filesystem implementations of the
//! `PathResolver` trait from trellis-traits.
//!
//! ## Available Resolvers
//!
//! - [`WorkingDirResolver`]: Resolves relative paths against the process working directory
//! - [`BaseDirResolver`]: Resolves relative paths against a caller-supplied base directory
//!
//! ## Re-exports
//!
//! For convenience, we also re-export the in-memory resolver from trellis-traits:
//! - [`MappedPathResolver`]: Fixed in-memory mapping

mod filesystem;

pub use filesystem::{BaseDirResolver, WorkingDirResolver};

pub use trellis_traits::MappedPathResolver;
