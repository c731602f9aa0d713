//! Class and singleton handles.

use std::fmt;

use lineage_core::{TypeId, TypeKind};

use crate::composable::Composable;
use crate::error::DispatchError;
use crate::instance::Instance;
use crate::runtime::Runtime;
use crate::value::Value;

/// Handle to a class (or to a singleton's class).
#[derive(Clone)]
pub struct Class {
    runtime: Runtime,
    id: TypeId,
    kind: TypeKind,
}

impl Class {
    pub(crate) fn new(runtime: Runtime, id: TypeId, kind: TypeKind) -> Self {
        Self { runtime, id, kind }
    }

    /// Parent class; `None` only for the root.
    pub fn superclass(&self) -> Option<Class> {
        let parent = self.runtime.read(|r| r.superclass(self.id)).ok().flatten()?;
        self.runtime.class_handle(parent).ok()
    }

    /// Direct subclasses, oldest first.
    pub fn children(&self) -> Vec<Class> {
        self.runtime
            .read(|r| r.children(self.id))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.runtime.class_handle(id).ok())
            .collect()
    }

    /// Create an instance, running the initializer with `args`.
    pub fn create(&self, args: Vec<Value>) -> Result<Instance, DispatchError> {
        self.runtime.create(self.id, args)
    }

    pub fn is_root(&self) -> bool {
        self.id == self.runtime.read(|r| r.root())
    }
}

impl Composable for Class {
    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn id(&self) -> TypeId {
        self.id
    }

    fn kind(&self) -> TypeKind {
        self.kind
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.runtime.ptr_eq(&other.runtime)
    }
}

impl Eq for Class {}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("kind", &self.kind)
            .finish()
    }
}

// ============================================================================
// Singleton
// ============================================================================

/// Handle to a class with exactly one instance.
///
/// The first `create` builds the instance and runs its initializer; later
/// calls return that same instance and ignore their arguments.
#[derive(Clone, PartialEq, Eq)]
pub struct Singleton {
    class: Class,
}

impl Singleton {
    pub(crate) fn new(class: Class) -> Self {
        Self { class }
    }

    pub fn create(&self, args: Vec<Value>) -> Result<Instance, DispatchError> {
        self.class.create(args)
    }

    /// The instance, created without arguments if needed.
    pub fn instance(&self) -> Result<Instance, DispatchError> {
        self.create(Vec::new())
    }

    pub fn as_class(&self) -> &Class {
        &self.class
    }
}

impl Composable for Singleton {
    fn runtime(&self) -> &Runtime {
        &self.class.runtime
    }

    fn id(&self) -> TypeId {
        self.class.id
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Singleton
    }
}

impl fmt::Display for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Singleton").field(&self.class).finish()
    }
}
