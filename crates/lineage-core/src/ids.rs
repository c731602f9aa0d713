//! Identifier types for registered classes and modules.
//!
//! Types are addressed by opaque handles rather than by reference, so the
//! class tree and the module inclusion graph can be stored as plain edges
//! between indices.

use std::fmt;

/// Identifies a class, singleton or module inside one type registry.
///
/// The wrapped value is the registration index; ids are never reused while
/// the registry that issued them is alive.
///
/// # Example
///
/// ```
/// use lineage_core::TypeId;
///
/// let id = TypeId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a type id from a registration index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Get the underlying index as a `usize` for slice access.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

impl From<u32> for TypeId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<TypeId> for u32 {
    fn from(id: TypeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_creation() {
        let id = TypeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.as_usize(), 42);
    }

    #[test]
    fn type_id_display() {
        assert_eq!(format!("{}", TypeId::new(5)), "type_5");
    }

    #[test]
    fn type_id_round_trips_through_u32() {
        let id: TypeId = 10.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 10);
    }
}
