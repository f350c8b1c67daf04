//! # trellis-core
//!
//! Builds and populates plain Rust objects from a flat sequence of structural
//! events ("begin child", "set attribute", "add text", "end child").
//!
//! - **reflect**: per-type operation tables and the per-object descriptor
//! - **coerce**: string to typed-value conversion for `set*` operations
//! - **registry**: name to type bindings ("typedefs")
//! - **macros**: record-and-replay templates with attribute and element slots
//! - **builder**: the [`Configurator`] facade driving all of the above
//! - **error**: the unified [`ConfigureError`]
//!
//! Host types opt in by implementing [`Configurable`]:
//!
//! ```ignore
//! #[derive(Default)]
//! struct Resolver { name: String }
//!
//! impl Configurable for Resolver {
//!     fn describe(ops: &mut Operations<Self>) {
//!         ops.takes_value("setName", |this, name: String| this.name = name);
//!     }
//! }
//! ```

pub mod attribute_map;
pub mod builder;
pub mod coerce;
pub mod config;
pub mod error;
pub mod macros;
pub mod reflect;
pub mod registry;

pub use attribute_map::AttributeMap;
pub use builder::Configurator;
pub use coerce::{AttributeType, AttributeValue, CoercionError, ValueKind};
pub use config::ConfiguratorConfig;
pub use error::{ConfigureError, ErrorKind};
pub use macros::{MacroAttribute, MacroDef, MacroElement, MacroInstance, MacroRecord};
pub use reflect::{
    Class, Configurable, Descriptor, InvokeError, ObjectRef, Operation, Operations, ParamClass,
    Shared, TypeKey, shared,
};
pub use registry::{TypeDef, TypeRef, TypeRegistry};

pub use trellis_traits::{PathError, PathResolver};
