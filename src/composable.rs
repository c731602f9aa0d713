//! Operations shared by classes, singletons and modules.

use std::collections::BTreeMap;

use lineage_core::{ConfigurationError, TypeId, TypeKind};
use lineage_registry::UnresolvedDelta;

use crate::definition::Definition;
use crate::error::DispatchError;
use crate::method::{Member, Method};
use crate::module::Module;
use crate::runtime::Runtime;
use crate::value::Value;

/// A type that can be defined on, composed with modules, and inspected.
pub trait Composable {
    fn runtime(&self) -> &Runtime;

    fn id(&self) -> TypeId;

    fn kind(&self) -> TypeKind;

    /// Display identifier; not unique.
    fn name(&self) -> String {
        self.runtime()
            .type_name(self.id())
            .unwrap_or_else(|_| self.id().to_string())
    }

    /// Linearization, most general first, this type last.
    fn types(&self) -> Result<Vec<TypeId>, ConfigurationError> {
        Ok(self.runtime().linearization(self.id())?.to_vec())
    }

    /// True if `candidate` is this type or appears in its linearization.
    fn has_type(&self, candidate: TypeId) -> Result<bool, ConfigurationError> {
        if candidate == self.id() {
            return Ok(true);
        }
        Ok(self.runtime().linearization(self.id())?.contains(&candidate))
    }

    /// Public methods across the linearization, most specific wins.
    fn methods(&self) -> Result<BTreeMap<String, Method>, ConfigurationError> {
        let members = self.runtime().write(|r| r.methods(self.id()))?;
        Ok(only_methods(members))
    }

    /// Methods declared directly on this type, private ones included.
    fn declared_methods(&self) -> Result<BTreeMap<String, Method>, ConfigurationError> {
        let members = self.runtime().read(|r| r.declared_methods(self.id()))?;
        Ok(only_methods(members))
    }

    /// Apply a definition and resolve.
    fn define(&self, definition: Definition) -> Result<UnresolvedDelta, ConfigurationError> {
        self.runtime().define(self.id(), definition)
    }

    /// Include one module and resolve.
    fn include(&self, module: &Module) -> Result<UnresolvedDelta, ConfigurationError> {
        self.runtime().check_owned(module)?;
        self.runtime().include(self.id(), &[module.id()])
    }

    /// Include several modules in order and resolve. Later modules take
    /// precedence over earlier ones.
    fn include_all(&self, modules: &[Module]) -> Result<UnresolvedDelta, ConfigurationError> {
        let ids = modules
            .iter()
            .map(|m| self.runtime().check_owned(m).map(|()| m.id()))
            .collect::<Result<Vec<TypeId>, _>>()?;
        self.runtime().include(self.id(), &ids)
    }

    /// Read an entry installed on the type object.
    fn static_value(&self, name: &str) -> Result<Option<Value>, ConfigurationError> {
        let member = self.runtime().read(|r| r.static_member(self.id(), name))?;
        Ok(member.map(|m| m.to_value()))
    }

    /// Call a static method with the type as receiver.
    fn call_static(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        self.runtime().call_static(self.id(), name, args)
    }

    /// Display string, e.g. `class Player`.
    fn describe(&self) -> String {
        format!("{} {}", self.kind().keyword(), self.name())
    }
}

fn only_methods(members: BTreeMap<String, Member>) -> BTreeMap<String, Method> {
    members
        .into_iter()
        .filter_map(|(name, member)| match member {
            Member::Method(method) => Some((name, method)),
            Member::Data(_) => None,
        })
        .collect()
}
