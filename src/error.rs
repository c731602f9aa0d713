//! Error types for lineage.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LineageError (top-level wrapper)
//! ├── ConfigurationError - declaring, defining, including, instantiating
//! └── DispatchError      - resolving and invoking members
//!     └── ConversionError - typed argument extraction
//! ```
//!
//! Configuration errors are programmer errors raised synchronously by the
//! call that caused them. Dispatch errors are ordinary failures of one call;
//! a member that resolves to nothing is reported, never silently ignored.

use thiserror::Error;

pub use lineage_core::ConfigurationError;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Failure converting a [`Value`](crate::Value) into a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value holds a different variant than requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer did not fit the requested width.
    #[error("integer {value} does not fit in {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },
}

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Errors raised while resolving or invoking a member.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Nothing in the linearization declares the member.
    #[error("'{type_name}' has no member '{member}'")]
    MemberNotFound { type_name: String, member: String },

    /// The member resolved to plain data.
    #[error("member '{member}' of '{type_name}' is not callable")]
    NotCallable { type_name: String, member: String },

    /// `call_next` was used by a member invoked without a dispatch chain.
    #[error("no active dispatch chain for call_next")]
    NoActiveChain,

    /// An instance was required but the receiver is a type object.
    #[error("receiver '{type_name}' is a type, not an instance")]
    ReceiverNotInstance { type_name: String },

    /// A member body asked for an argument that was not passed.
    #[error("argument index {index} out of bounds (count: {count})")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// Typed argument extraction failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Resolution hit a configuration problem.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Error raised by a member body.
    #[error("{0}")]
    Custom(String),
}

impl DispatchError {
    /// Create an error from a member body.
    pub fn custom(message: impl Into<String>) -> Self {
        DispatchError::Custom(message.into())
    }

    pub fn is_member_not_found(&self) -> bool {
        matches!(self, DispatchError::MemberNotFound { .. })
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Unified error type for callers that do not care which phase failed.
///
/// ```
/// use lineage::{Composable, Definition, LineageError, Method, Runtime, Value};
///
/// fn greet(rt: &Runtime) -> Result<Value, LineageError> {
///     let class = rt
///         .class("Greeter")
///         .definition(Definition::new().method(
///             "greet",
///             Method::new(|_| Ok(Value::from("hello"))),
///         ))
///         .build()?;
///     let instance = class.create(vec![])?;
///     Ok(instance.call("greet", vec![])?)
/// }
///
/// assert_eq!(greet(&Runtime::new()).unwrap(), Value::from("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineageError {
    /// A configuration error.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A dispatch error.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl LineageError {
    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LineageError::Configuration(_) | LineageError::Dispatch(DispatchError::Configuration(_))
        )
    }

    /// Check if this is a dispatch error.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, LineageError::Dispatch(_))
    }
}
