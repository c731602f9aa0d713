//! Type registry for lineage.
//!
//! Holds the member tables of every class, singleton and module in one
//! hierarchy, computes linearizations and resolution stacks, and keeps their
//! caches coherent through a dependents graph.

mod dependents;
mod entry;
mod registry;
mod template;

pub use dependents::{Dependency, DependentsGraph};
pub use entry::{TypeEntry, UnresolvedDelta};
pub use registry::{DEFAULT_PRIVATE_PREFIX, TypeRegistry};
pub use template::Template;

// Re-export the core types every registry user needs.
pub use lineage_core::{ConfigurationError, MemberValue, TypeId, TypeKind};
