//! Module handles.
//!
//! A module is a named bag of members and nested modules. It has no
//! superclass, no subclasses and no instances; it only takes part in the
//! linearization of the types that include it.

use std::fmt;

use lineage_core::{TypeId, TypeKind};

use crate::class::Class;
use crate::composable::Composable;
use crate::runtime::Runtime;

/// Handle to a module.
#[derive(Clone)]
pub struct Module {
    runtime: Runtime,
    id: TypeId,
}

impl Module {
    pub(crate) fn new(runtime: Runtime, id: TypeId) -> Self {
        Self { runtime, id }
    }

    /// Classes and modules this module was inserted into, oldest first.
    ///
    /// Types that received it only through a nested inclusion are listed too.
    pub fn includers(&self) -> Vec<TypeId> {
        self.runtime.read(|r| r.includers(self.id)).unwrap_or_default()
    }

    /// Classes among the includers.
    pub fn including_classes(&self) -> Vec<Class> {
        self.includers()
            .into_iter()
            .filter_map(|id| self.runtime.class_handle(id).ok())
            .collect()
    }
}

impl Composable for Module {
    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn id(&self) -> TypeId {
        self.id
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Module
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.runtime.ptr_eq(&other.runtime)
    }
}

impl Eq for Module {}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
