pub mod path;

pub use path::{MappedPathResolver, PathError, PathResolver};
