//! Defines the unified error type for all construction-session operations.

use crate::coerce::CoercionError;
use crate::reflect::InvokeError;
use thiserror::Error;

/// Coarse classification of a [`ConfigureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An event was issued in the wrong state.
    Protocol,
    /// No matching create/add/add-configured/set/text operation.
    Resolution,
    /// A string could not be converted to the declared parameter type.
    Coercion,
    /// A macro definition or use-site broke its contract.
    MacroContract,
    /// A type could not be instantiated, or an operation failed while running.
    Construction,
}

/// The single failure category of a construction session.
///
/// Every variant carries enough context to name the child or attribute being
/// configured and the type that owns it. Nothing here is recoverable: the
/// caller is expected to discard the builder.
#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error("set root before {0}")]
    NoRoot(&'static str),

    #[error("cannot end root")]
    CannotEndRoot,

    #[error("no macro definition is being recorded (current top is {found})")]
    NotInMacroDefinition { found: String },

    #[error("no appropriate method found for adding {child} on {parent}")]
    NoAddMethod { child: String, parent: String },

    #[error("no set method found for {attribute} on {owner}")]
    NoSetMethod { attribute: String, owner: String },

    #[error("impossible to add text on {owner}: no addText operation")]
    NoTextMethod { owner: String },

    #[error("impossible to convert {value} to {target} for setting {attribute} on {owner}: {source}")]
    Coercion {
        value: String,
        target: String,
        attribute: String,
        owner: String,
        #[source]
        source: CoercionError,
    },

    #[error("undeclared attribute {attribute} on macro {macro_name}")]
    UndeclaredAttribute {
        attribute: String,
        macro_name: String,
    },

    #[error("attribute {attribute} is required in {macro_name}")]
    MissingAttribute {
        attribute: String,
        macro_name: String,
    },

    #[error("non optional element is not specified: {element} in macro {macro_name}")]
    MissingElement { element: String, macro_name: String },

    #[error("macro {macro_name} has no recorded template")]
    EmptyMacro { macro_name: String },

    #[error("no default constructor on {type_name} for adding {child} on {parent}")]
    NoConstructor {
        type_name: String,
        child: String,
        parent: String,
    },

    #[error("bad method found for {child} on {parent}")]
    BadMethod {
        child: String,
        parent: String,
        #[source]
        source: InvokeError,
    },

    #[error("impossible to set {attribute} to {value} on {owner}")]
    Assignment {
        attribute: String,
        value: String,
        owner: String,
        #[source]
        source: InvokeError,
    },

    #[error("impossible to add text on {owner}")]
    Text {
        owner: String,
        #[source]
        source: InvokeError,
    },

    #[error("impossible to add configured child for {child} on {parent}")]
    AddConfigured {
        child: String,
        parent: String,
        #[source]
        source: InvokeError,
    },
}

impl ConfigureError {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigureError::NoRoot(_)
            | ConfigureError::CannotEndRoot
            | ConfigureError::NotInMacroDefinition { .. } => ErrorKind::Protocol,
            ConfigureError::NoAddMethod { .. }
            | ConfigureError::NoSetMethod { .. }
            | ConfigureError::NoTextMethod { .. } => ErrorKind::Resolution,
            ConfigureError::Coercion { .. } => ErrorKind::Coercion,
            ConfigureError::UndeclaredAttribute { .. }
            | ConfigureError::MissingAttribute { .. }
            | ConfigureError::MissingElement { .. }
            | ConfigureError::EmptyMacro { .. } => ErrorKind::MacroContract,
            ConfigureError::NoConstructor { .. }
            | ConfigureError::BadMethod { .. }
            | ConfigureError::Assignment { .. }
            | ConfigureError::Text { .. }
            | ConfigureError::AddConfigured { .. } => ErrorKind::Construction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_no_add_method_names_child_and_parent() {
        let err = ConfigureError::NoAddMethod {
            child: "buildpath".to_string(),
            parent: "app::Project".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.to_string().contains("buildpath"));
        assert!(err.to_string().contains("app::Project"));
    }

    #[test]
    fn test_coercion_message_names_everything() {
        let err = ConfigureError::Coercion {
            value: "abc".to_string(),
            target: "i32".to_string(),
            attribute: "count".to_string(),
            owner: "app::XInterface".to_string(),
            source: CoercionError::UnknownType("abc".to_string()),
        };
        let msg = err.to_string();
        for part in ["abc", "i32", "count", "app::XInterface", "no registered type"] {
            assert!(msg.contains(part), "missing {part} in {msg}");
        }
        assert_eq!(err.kind(), ErrorKind::Coercion);
    }

    #[test]
    fn test_invocation_cause_is_exposed_as_source() {
        let err = ConfigureError::BadMethod {
            child: "fileset".to_string(),
            parent: "app::Project".to_string(),
            source: InvokeError::Busy {
                type_name: "app::Project",
            },
        };
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_macro_errors_are_contract_errors() {
        let err = ConfigureError::MissingAttribute {
            attribute: "x".to_string(),
            macro_name: "compile".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::MacroContract);
        assert_eq!(err.to_string(), "attribute x is required in compile");
        assert_eq!(ConfigureError::CannotEndRoot.kind(), ErrorKind::Protocol);
    }
}
