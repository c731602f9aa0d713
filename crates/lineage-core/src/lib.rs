//! Core types shared by the lineage registry and runtime.
//!
//! This crate holds the pieces every layer agrees on: type identifiers,
//! type kinds, member naming conventions and configuration errors.

mod error;
mod ids;
mod kind;
mod member;

pub use error::ConfigurationError;
pub use ids::TypeId;
pub use kind::TypeKind;
pub use member::{
    INCLUDES_KEY, MemberValue, STATICS_KEY, display_label, is_private_name, is_reserved_key,
};
