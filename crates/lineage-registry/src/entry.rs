//! Registry entries: one member table per class, singleton or module.

use std::sync::Arc;

use lineage_core::{TypeId, TypeKind};
use rustc_hash::FxHashMap;

use crate::template::Template;

/// Members and modules recorded since the type was last resolved.
///
/// Draining this is part of `TypeRegistry::resolve`; the drained delta is
/// handed back to the caller so it can report what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedDelta {
    /// Member names defined since the last resolve, in definition order.
    pub members: Vec<String>,
    /// Modules included since the last resolve, in inclusion order.
    pub modules: Vec<TypeId>,
}

impl UnresolvedDelta {
    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.modules.is_empty()
    }

    pub(crate) fn record_member(&mut self, name: &str) {
        if !self.members.iter().any(|m| m == name) {
            self.members.push(name.to_string());
        }
    }
}

/// Memoized linearization and resolution stacks.
///
/// Both are published as immutable snapshots. Invalidation swaps them out;
/// nothing ever mutates a published snapshot in place.
#[derive(Debug)]
pub(crate) struct TypeCache<M> {
    pub(crate) types: Option<Arc<[TypeId]>>,
    pub(crate) stacks: FxHashMap<String, Arc<[M]>>,
}

impl<M> Default for TypeCache<M> {
    fn default() -> Self {
        Self {
            types: None,
            stacks: FxHashMap::default(),
        }
    }
}

impl<M> TypeCache<M> {
    pub(crate) fn clear(&mut self) {
        self.types = None;
        self.stacks.clear();
    }
}

/// Registry entry for a class, singleton or module.
#[derive(Debug)]
pub struct TypeEntry<M> {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    /// Parent class; `None` for the root and for modules.
    pub(crate) superclass: Option<TypeId>,
    /// Directly declared members.
    pub(crate) members: FxHashMap<String, M>,
    /// Entries installed on the type object itself.
    pub(crate) statics: FxHashMap<String, M>,
    /// Included modules, most recently included first.
    pub(crate) modules: Vec<TypeId>,
    /// Instance template; `None` for modules.
    pub(crate) template: Option<Template>,
    pub(crate) unresolved: UnresolvedDelta,
    pub(crate) cache: TypeCache<M>,
}

impl<M> TypeEntry<M> {
    pub(crate) fn new(
        id: TypeId,
        name: impl Into<String>,
        kind: TypeKind,
        superclass: Option<TypeId>,
        template: Option<Template>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            superclass,
            members: FxHashMap::default(),
            statics: FxHashMap::default(),
            modules: Vec::new(),
            template,
            unresolved: UnresolvedDelta::default(),
            cache: TypeCache::default(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn superclass(&self) -> Option<TypeId> {
        self.superclass
    }

    /// Included modules, most recently included first.
    pub fn modules(&self) -> &[TypeId] {
        &self.modules
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// Look up a directly declared member.
    pub fn member(&self, name: &str) -> Option<&M> {
        self.members.get(name)
    }

    /// Iterate over directly declared members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &M)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn static_member(&self, name: &str) -> Option<&M> {
        self.statics.get(name)
    }

    pub fn statics(&self) -> impl Iterator<Item = (&str, &M)> {
        self.statics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pending changes not yet resolved.
    pub fn unresolved(&self) -> &UnresolvedDelta {
        &self.unresolved
    }

    /// Check if the linearization is currently memoized.
    pub fn is_linearized(&self) -> bool {
        self.cache.types.is_some()
    }
}
