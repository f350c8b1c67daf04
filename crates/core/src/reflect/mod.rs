//! Explicit capability tables standing in for runtime method introspection.
//!
//! - [`class`]: the per-type operation table declared through [`Configurable`].
//! - [`object`]: type-erased shared handles to live objects.
//! - [`descriptor`]: the per-object lookup cache used by the builder.

mod class;
mod descriptor;
mod object;

pub(crate) use class::construct;
pub use class::{Class, Configurable, InvokeError, Operation, Operations, ParamClass};
pub use descriptor::Descriptor;
pub use object::{ObjectRef, Shared, TypeKey, shared};
