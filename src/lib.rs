//! # trellis
//!
//! Builds plain Rust object graphs from structural events, with reusable
//! macro templates.
//!
//! The workspace is split the same way the builder is layered:
//!
//! - [`traits`]: collaborator contracts (`PathResolver`)
//! - [`resource`]: filesystem path resolvers
//! - [`builder`]: the [`Configurator`] and everything it drives
//! - [`events`]: JSON event scripts replayed against a `Configurator`

pub use trellis_core as builder;
pub use trellis_resource as resource;
pub use trellis_traits as traits;

pub mod events;

pub use events::{Event, ScriptError, apply_events, parse_script, run_script};
pub use trellis_core::{
    AttributeMap, AttributeType, Configurable, Configurator, ConfiguratorConfig, ConfigureError,
    ErrorKind, MacroDef, ObjectRef, Operations, Shared, TypeDef, TypeRef, parsed_attribute,
    shared,
};
