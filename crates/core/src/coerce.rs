//! String-to-value conversion for `set*` operations.
//!
//! Recognized parameter types, in precedence order:
//!
//! 1. `String`, passed through.
//! 2. `bool`: `true`, `yes` and `on` are true (case-sensitive), anything else is false.
//! 3. `char`: the first character, or a space for the empty string.
//! 4. `i16`, `i32`, `i64`: standard integer literals.
//! 5. [`TypeRef`]: a name looked up in the session's [`TypeRegistry`].
//! 6. `PathBuf`: resolved through the session's [`PathResolver`].
//! 7. Any type with a string constructor (`FromStr`). Types local to the
//!    host crate can use [`parsed_attribute!`](crate::parsed_attribute);
//!    foreign types are registered with `Operations::takes_parsed`.

use crate::registry::{TypeRef, TypeRegistry};
use std::any::Any;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use trellis_traits::{PathError, PathResolver};

/// Tokens coerced to `true`.
pub const TRUE_VALUES: [&str; 3] = ["true", "yes", "on"];

pub type ParseFn = fn(&str) -> Result<Box<dyn Any>, String>;

/// The declared parameter type of a value-accepting operation.
#[derive(Clone, Copy)]
pub enum ValueKind {
    Str,
    Bool,
    Char,
    Short,
    Int,
    Long,
    TypeRef,
    Path,
    /// Built from the string by a type-specific constructor.
    Parsed {
        type_name: &'static str,
        parse: ParseFn,
    },
    /// No string constructor: coercion always fails.
    Opaque(&'static str),
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Str => "String",
            ValueKind::Bool => "bool",
            ValueKind::Char => "char",
            ValueKind::Short => "i16",
            ValueKind::Int => "i32",
            ValueKind::Long => "i64",
            ValueKind::TypeRef => "TypeRef",
            ValueKind::Path => "PathBuf",
            ValueKind::Parsed { type_name, .. } => *type_name,
            ValueKind::Opaque(type_name) => *type_name,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ValueKind::Str)
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A coerced value on its way to a `set*` operation.
#[derive(Debug)]
pub enum AttributeValue {
    Str(String),
    Bool(bool),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    TypeRef(TypeRef),
    Path(PathBuf),
    Parsed(Box<dyn Any>),
}

impl AttributeValue {
    pub fn type_label(&self) -> &str {
        match self {
            AttributeValue::Str(_) => "String",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Char(_) => "char",
            AttributeValue::Short(_) => "i16",
            AttributeValue::Int(_) => "i32",
            AttributeValue::Long(_) => "i64",
            AttributeValue::TypeRef(_) => "TypeRef",
            AttributeValue::Path(_) => "PathBuf",
            AttributeValue::Parsed(_) => "parsed value",
        }
    }
}

/// A Rust type usable as the parameter of a `set*` operation.
pub trait AttributeType: Sized + 'static {
    fn kind() -> ValueKind;

    /// Unwraps a value produced by [`coerce`] for [`AttributeType::kind`].
    fn from_value(value: AttributeValue) -> Option<Self>;
}

macro_rules! builtin_attribute {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AttributeType for $ty {
                fn kind() -> ValueKind {
                    ValueKind::$variant
                }

                fn from_value(value: AttributeValue) -> Option<Self> {
                    match value {
                        AttributeValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

builtin_attribute!(
    String => Str,
    bool => Bool,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    TypeRef => TypeRef,
    PathBuf => Path,
);

/// Parses `raw` into a boxed `T`; the [`ParseFn`] behind [`parsed_attribute!`](crate::parsed_attribute).
pub fn parse_boxed<T>(raw: &str) -> Result<Box<dyn Any>, String>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map(|v| Box::new(v) as Box<dyn Any>)
        .map_err(|e| e.to_string())
}

/// Makes `FromStr` types usable as `takes_value` parameters.
///
/// The orphan rule limits this to types defined in the invoking crate. For
/// foreign types such as `std::net::IpAddr`, register the operation with
/// `Operations::takes_parsed` instead.
///
/// ```ignore
/// #[derive(Debug)]
/// pub struct Revision(u32);
///
/// impl std::str::FromStr for Revision { /* ... */ }
///
/// trellis_core::parsed_attribute!(Revision);
/// ```
#[macro_export]
macro_rules! parsed_attribute {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::coerce::AttributeType for $ty {
                fn kind() -> $crate::coerce::ValueKind {
                    $crate::coerce::ValueKind::Parsed {
                        type_name: ::std::any::type_name::<$ty>(),
                        parse: $crate::coerce::parse_boxed::<$ty>,
                    }
                }

                fn from_value(value: $crate::coerce::AttributeValue) -> Option<Self> {
                    match value {
                        $crate::coerce::AttributeValue::Parsed(boxed) => {
                            boxed.downcast::<$ty>().ok().map(|v| *v)
                        }
                        _ => None,
                    }
                }
            }
        )*
    };
}

crate::parsed_attribute!(u8, u16, u32, u64, usize, i8, isize, f32, f64);

/// Why a string could not be converted.
#[derive(Error, Debug)]
pub enum CoercionError {
    #[error(transparent)]
    Number(#[from] ParseIntError),

    #[error("no registered type named {0}")]
    UnknownType(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("{0}")]
    Parse(String),

    #[error("{0} has no string constructor")]
    NoStringConstructor(&'static str),
}

/// Session collaborators consulted during coercion.
pub struct CoercionContext<'a> {
    pub types: &'a TypeRegistry,
    pub paths: &'a dyn PathResolver,
    /// `objName.attribute`, passed to the path resolver for diagnostics.
    pub label: &'a str,
}

/// Converts `raw` into a value of the declared `kind`.
pub fn coerce(
    kind: &ValueKind,
    raw: &str,
    ctx: &CoercionContext<'_>,
) -> Result<AttributeValue, CoercionError> {
    let value = match kind {
        ValueKind::Str => AttributeValue::Str(raw.to_string()),
        ValueKind::Bool => AttributeValue::Bool(TRUE_VALUES.contains(&raw)),
        ValueKind::Char => AttributeValue::Char(raw.chars().next().unwrap_or(' ')),
        ValueKind::Short => AttributeValue::Short(raw.parse()?),
        ValueKind::Int => AttributeValue::Int(raw.parse()?),
        ValueKind::Long => AttributeValue::Long(raw.parse()?),
        ValueKind::TypeRef => AttributeValue::TypeRef(
            ctx.types
                .resolve_type_ref(raw)
                .ok_or_else(|| CoercionError::UnknownType(raw.to_string()))?,
        ),
        ValueKind::Path => AttributeValue::Path(ctx.paths.resolve(raw, ctx.label)?),
        ValueKind::Parsed { parse, .. } => {
            AttributeValue::Parsed(parse(raw).map_err(CoercionError::Parse)?)
        }
        ValueKind::Opaque(name) => return Err(CoercionError::NoStringConstructor(*name)),
    };
    log::trace!("coerced '{}' to {} for {}", raw, kind.type_name(), ctx.label);
    Ok(value)
}
