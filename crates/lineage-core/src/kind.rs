//! Kinds of registered types.

use std::fmt;

/// What a registered type can do.
///
/// Classes and singletons have a superclass and an instance template;
/// modules only carry members and further inclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An instantiable class.
    Class,
    /// A class whose factory always hands back the same instance.
    Singleton,
    /// A mixin: members and inclusions, no instances.
    Module,
}

impl TypeKind {
    /// Check if instances can be created from this kind.
    #[inline]
    pub fn is_instantiable(self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Singleton)
    }

    /// Check if this kind is a module.
    #[inline]
    pub fn is_module(self) -> bool {
        matches!(self, TypeKind::Module)
    }

    /// Keyword used when displaying a type of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Singleton => "singleton",
            TypeKind::Module => "module",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiable_kinds() {
        assert!(TypeKind::Class.is_instantiable());
        assert!(TypeKind::Singleton.is_instantiable());
        assert!(!TypeKind::Module.is_instantiable());
        assert!(TypeKind::Module.is_module());
    }

    #[test]
    fn keywords() {
        assert_eq!(TypeKind::Class.to_string(), "class");
        assert_eq!(TypeKind::Singleton.to_string(), "singleton");
        assert_eq!(TypeKind::Module.to_string(), "module");
    }
}
