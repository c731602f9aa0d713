//! Configuration errors raised while declaring and composing types.
//!
//! Every variant is a programmer error detected synchronously at the call
//! that caused it. Nothing here is retried; callers get the error back from
//! the declaring call and the registry is left as it was before that call.

use thiserror::Error;

use crate::TypeId;

/// Errors raised by type declaration, definition and inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A type id that was not issued by this registry.
    #[error("unknown type {id}")]
    UnknownType { id: TypeId },

    /// Something other than a module was passed to an inclusion.
    #[error("'{name}' is a {kind}, only modules can be included")]
    NotAModule { name: String, kind: &'static str },

    /// A type tried to include itself.
    #[error("'{name}' cannot include itself")]
    SelfInclusion { name: String },

    /// Including the module would make the inclusion graph cyclic.
    #[error("including '{module}' into '{target}' would create an inclusion cycle")]
    CyclicInclusion { module: String, target: String },

    /// A class was asked to adopt a template not descended from the root template.
    #[error("template of '{found}' does not descend from '{expected}'")]
    TemplateMismatch { expected: String, found: String },

    /// Instances were requested from a type that has no instance template.
    #[error("'{name}' is a {kind} and cannot be instantiated")]
    NotInstantiable { name: String, kind: &'static str },

    /// A reserved definition key carried a value of the wrong shape.
    #[error("reserved key '{key}' expects {expected}")]
    InvalidReservedKey { key: String, expected: &'static str },

    /// A handle from another runtime was used where this runtime's types are expected.
    #[error("'{name}' belongs to a different runtime")]
    ForeignType { name: String },
}

impl ConfigurationError {
    /// Shorthand for a reserved key carrying the wrong value shape.
    pub fn invalid_reserved_key(key: impl Into<String>, expected: &'static str) -> Self {
        ConfigurationError::InvalidReservedKey {
            key: key.into(),
            expected,
        }
    }
}
