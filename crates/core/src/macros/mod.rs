//! Record-and-replay templates.
//!
//! A [`MacroDef`] owns one recorded [`MacroRecord`] tree. Each use of the macro
//! becomes a [`MacroInstance`] that collects attribute values and element-slot
//! contents, then replays the template into the builder when it ends.

mod definition;
mod instance;
mod placeholder;
mod record;

pub use definition::{MacroAttribute, MacroDef, MacroElement};
pub use instance::MacroInstance;
pub use placeholder::{placeholder_names, substitute_params};
pub use record::MacroRecord;
