//! Instance templates.
//!
//! Every class owns a template derived from its superclass's template. The
//! template records the superclass chain from the root down to the owner,
//! which is what instantiation checks before adopting it.

use std::sync::Arc;

use lineage_core::TypeId;

/// Shared instance layout for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    owner: TypeId,
    /// Superclass chain, root first, owner last.
    lineage: Arc<[TypeId]>,
}

impl Template {
    /// Template of the root class.
    pub(crate) fn root(owner: TypeId) -> Self {
        Self {
            owner,
            lineage: Arc::from([owner]),
        }
    }

    /// Derive a template for `owner` from its superclass's template.
    pub(crate) fn derive(base: &Template, owner: TypeId) -> Self {
        let mut lineage = base.lineage.to_vec();
        lineage.push(owner);
        Self {
            owner,
            lineage: lineage.into(),
        }
    }

    /// Class that owns this template.
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    /// Superclass chain, root first.
    pub fn lineage(&self) -> &[TypeId] {
        &self.lineage
    }

    /// True if this template was derived (transitively) from `base`'s template.
    pub fn descends_from(&self, base: TypeId) -> bool {
        self.lineage.contains(&base)
    }
}
