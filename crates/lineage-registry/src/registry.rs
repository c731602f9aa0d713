//! TypeRegistry - member tables, linearization and resolution for one hierarchy.
//!
//! This module provides [`TypeRegistry`], the storage behind every class,
//! singleton and module of one runtime. Types are identified by [`TypeId`],
//! a dense index into the registry, so handles stay `Copy` and lookups are a
//! bounds-checked slice access.
//!
//! # Storage Model
//!
//! - **Entries**: one [`TypeEntry`] per type, in registration order. The root
//!   class is always entry zero.
//! - **Dependents**: a [`DependentsGraph`] with an edge from every superclass to
//!   its subclasses and from every module to the types it was inserted into.
//!   It owns nothing; it only tells invalidation where to go next.
//! - **Caches**: linearizations and per-name resolution stacks are memoized on
//!   the entry as `Arc` snapshots and cleared through the dependents graph
//!   whenever a definition or inclusion changes.
//!
//! # Thread Safety
//!
//! `TypeRegistry` is **not thread-safe** by itself. Reads that may fill a
//! cache take `&mut self`; the read-only `cached_*` accessors let a caller
//! holding a shared lock serve hits without upgrading. The runtime wraps the
//! registry in a reader/writer lock and never holds it while member bodies
//! run.
//!
//! # Example
//!
//! ```
//! use lineage_core::{MemberValue, TypeId};
//! use lineage_registry::TypeRegistry;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Label(&'static str);
//!
//! impl MemberValue for Label {
//!     fn is_callable(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let mut registry: TypeRegistry<Label> = TypeRegistry::new("Object");
//! let greeter = registry.register_module("Greeter");
//! let person = registry.register_class("Person", None).unwrap();
//!
//! registry.define_member(greeter, "greet", Label("hello")).unwrap();
//! registry.include(person, greeter).unwrap();
//! registry.resolve(person).unwrap();
//!
//! assert_eq!(
//!     registry.linearize(person).unwrap().as_ref(),
//!     &[TypeId::new(0), greeter, person]
//! );
//! assert_eq!(registry.resolve_member(person, "greet").unwrap(), Some(Label("hello")));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lineage_core::{ConfigurationError, MemberValue, TypeId, TypeKind, is_private_name};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::dependents::{Dependency, DependentsGraph};
use crate::entry::{TypeEntry, UnresolvedDelta};
use crate::template::Template;

/// Default prefix marking members as private.
pub const DEFAULT_PRIVATE_PREFIX: char = '_';

/// Registry for all types of one hierarchy.
pub struct TypeRegistry<M> {
    /// All entries, indexed by `TypeId`.
    entries: Vec<TypeEntry<M>>,

    /// Reverse edges used by invalidation and cycle detection.
    dependents: DependentsGraph,

    /// Prefix excluding members from public method listings.
    private_prefix: char,
}

impl<M: MemberValue> TypeRegistry<M> {
    /// Create a registry holding only the root class.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            dependents: DependentsGraph::new(),
            private_prefix: DEFAULT_PRIVATE_PREFIX,
        };
        let root = registry.next_id();
        registry.push(TypeEntry::new(
            root,
            root_name,
            TypeKind::Class,
            None,
            Some(Template::root(root)),
        ));
        registry
    }

    /// Use a different private-name prefix for `methods()`.
    pub fn with_private_prefix(mut self, prefix: char) -> Self {
        self.private_prefix = prefix;
        self
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// The root class. Every class and singleton descends from it.
    #[inline]
    pub fn root(&self) -> TypeId {
        TypeId::new(0)
    }

    pub fn private_prefix(&self) -> char {
        self.private_prefix
    }

    /// Get an entry by id.
    pub fn get(&self, id: TypeId) -> Option<&TypeEntry<M>> {
        self.entries.get(id.as_usize())
    }

    /// Get an entry by id or fail with `UnknownType`.
    pub fn entry(&self, id: TypeId) -> Result<&TypeEntry<M>, ConfigurationError> {
        self.entries
            .get(id.as_usize())
            .ok_or(ConfigurationError::UnknownType { id })
    }

    fn entry_mut(&mut self, id: TypeId) -> Result<&mut TypeEntry<M>, ConfigurationError> {
        self.entries
            .get_mut(id.as_usize())
            .ok_or(ConfigurationError::UnknownType { id })
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.as_usize() < self.entries.len()
    }

    pub fn name(&self, id: TypeId) -> Result<&str, ConfigurationError> {
        self.entry(id).map(TypeEntry::name)
    }

    pub fn kind(&self, id: TypeId) -> Result<TypeKind, ConfigurationError> {
        self.entry(id).map(TypeEntry::kind)
    }

    pub fn superclass(&self, id: TypeId) -> Result<Option<TypeId>, ConfigurationError> {
        self.entry(id).map(TypeEntry::superclass)
    }

    /// Direct subclasses of a class, oldest first.
    pub fn children(&self, id: TypeId) -> Result<Vec<TypeId>, ConfigurationError> {
        self.entry(id)?;
        Ok(self.dependents.direct(id, Dependency::Subclass))
    }

    /// Types a module was inserted into, oldest first.
    pub fn includers(&self, id: TypeId) -> Result<Vec<TypeId>, ConfigurationError> {
        self.entry(id)?;
        Ok(self.dependents.direct(id, Dependency::Inclusion))
    }

    /// Template a new instance of `id` adopts.
    ///
    /// Fails for modules, which have no template, and for any template that
    /// was not derived from the root's.
    pub fn template(&self, id: TypeId) -> Result<&Template, ConfigurationError> {
        let entry = self.entry(id)?;
        let template = entry
            .template
            .as_ref()
            .ok_or_else(|| ConfigurationError::NotInstantiable {
                name: entry.name.clone(),
                kind: entry.kind.keyword(),
            })?;
        if !template.descends_from(self.root()) {
            return Err(self.template_mismatch(id));
        }
        Ok(template)
    }

    /// Iterate over all entries in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry<M>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the root is registered on construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    fn next_id(&self) -> TypeId {
        TypeId::new(self.entries.len() as u32)
    }

    fn push(&mut self, entry: TypeEntry<M>) -> TypeId {
        let id = entry.id;
        self.dependents.add_type(id);
        self.entries.push(entry);
        id
    }

    fn template_mismatch(&self, found: TypeId) -> ConfigurationError {
        ConfigurationError::TemplateMismatch {
            expected: self.entries[self.root().as_usize()].name.clone(),
            found: self
                .get(found)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| found.to_string()),
        }
    }

    /// Register a class. A missing superclass defaults to the root.
    pub fn register_class(
        &mut self,
        name: impl Into<String>,
        superclass: Option<TypeId>,
    ) -> Result<TypeId, ConfigurationError> {
        self.register_instantiable(name.into(), superclass, TypeKind::Class)
    }

    /// Register a singleton class. A missing superclass defaults to the root.
    pub fn register_singleton(
        &mut self,
        name: impl Into<String>,
        superclass: Option<TypeId>,
    ) -> Result<TypeId, ConfigurationError> {
        self.register_instantiable(name.into(), superclass, TypeKind::Singleton)
    }

    fn register_instantiable(
        &mut self,
        name: String,
        superclass: Option<TypeId>,
        kind: TypeKind,
    ) -> Result<TypeId, ConfigurationError> {
        let superclass = superclass.unwrap_or(self.root());
        let parent = self.entry(superclass)?;
        let base = match &parent.template {
            Some(template) if template.descends_from(self.root()) => template.clone(),
            _ => return Err(self.template_mismatch(superclass)),
        };

        let id = self.next_id();
        let template = Template::derive(&base, id);
        self.push(TypeEntry::new(
            id,
            name,
            kind,
            Some(superclass),
            Some(template),
        ));
        self.dependents.add_subclass(superclass, id);

        debug!(
            type_id = %id,
            name = %self.entries[id.as_usize()].name,
            kind = %kind,
            superclass = %superclass,
            "registered type"
        );
        Ok(id)
    }

    /// Register a module.
    pub fn register_module(&mut self, name: impl Into<String>) -> TypeId {
        let id = self.next_id();
        self.push(TypeEntry::new(id, name, TypeKind::Module, None, None));
        debug!(type_id = %id, name = %self.entries[id.as_usize()].name, "registered module");
        id
    }

    // ==========================================================================
    // Definition & inclusion
    // ==========================================================================

    /// Declare (or redeclare) a member directly on a type.
    ///
    /// Caches are not touched until [`resolve`](Self::resolve) is called; the
    /// member is queued as unresolved.
    pub fn define_member(
        &mut self,
        id: TypeId,
        name: impl Into<String>,
        value: M,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        let entry = self.entry_mut(id)?;
        entry.unresolved.record_member(&name);
        entry.members.insert(name, value);
        Ok(())
    }

    /// Install an entry on the type object itself.
    pub fn define_static(
        &mut self,
        id: TypeId,
        name: impl Into<String>,
        value: M,
    ) -> Result<(), ConfigurationError> {
        self.entry_mut(id)?.statics.insert(name.into(), value);
        Ok(())
    }

    /// Look up an entry installed on the type object.
    pub fn static_member(&self, id: TypeId, name: &str) -> Result<Option<M>, ConfigurationError> {
        Ok(self.entry(id)?.statics.get(name).cloned())
    }

    /// Check that `module` could be included into `target` without changing
    /// anything.
    ///
    /// Every edge in the dependents graph points from a type to one whose
    /// linearization contains it, so a path from `target` to `module` means
    /// the inclusion would close a cycle.
    pub fn check_inclusion(&self, target: TypeId, module: TypeId) -> Result<(), ConfigurationError> {
        let module_entry = self.entry(module)?;
        if !module_entry.kind.is_module() {
            return Err(ConfigurationError::NotAModule {
                name: module_entry.name.clone(),
                kind: module_entry.kind.keyword(),
            });
        }
        let target_entry = self.entry(target)?;
        if module == target {
            return Err(ConfigurationError::SelfInclusion {
                name: target_entry.name.clone(),
            });
        }
        if self.dependents.reaches(target, module) {
            return Err(ConfigurationError::CyclicInclusion {
                module: module_entry.name.clone(),
                target: target_entry.name.clone(),
            });
        }
        Ok(())
    }

    /// Include a module into a type.
    ///
    /// Modules already present in the target's linearization are skipped and
    /// `Ok(false)` is returned. Otherwise the module's own modules are
    /// included first, oldest first, then the module is prepended to the
    /// target's module list.
    pub fn include(&mut self, target: TypeId, module: TypeId) -> Result<bool, ConfigurationError> {
        self.check_inclusion(target, module)?;
        if self.has_type(target, module)? {
            trace!(target = %target, module = %module, "module already present, skipping");
            return Ok(false);
        }

        let nested: Vec<TypeId> = self.entries[module.as_usize()]
            .modules
            .iter()
            .rev()
            .copied()
            .collect();
        for inner in nested {
            self.include(target, inner)?;
        }

        let entry = self.entry_mut(target)?;
        entry.modules.insert(0, module);
        entry.unresolved.modules.push(module);
        self.dependents.add_inclusion(module, target);
        // Linearization changed even before resolve; never serve a stale snapshot.
        self.invalidate(target);

        debug!(
            target = %target,
            module = %module,
            "included module"
        );
        Ok(true)
    }

    /// Clear the caches of `id` and every type depending on it, then drain
    /// and return its unresolved delta.
    pub fn resolve(&mut self, id: TypeId) -> Result<UnresolvedDelta, ConfigurationError> {
        self.entry(id)?;
        let cleared = self.invalidate(id);
        let delta = std::mem::take(&mut self.entry_mut(id)?.unresolved);
        debug!(
            type_id = %id,
            members = ?delta.members,
            modules = delta.modules.len(),
            cleared,
            "resolved type"
        );
        Ok(delta)
    }

    /// Clear the caches of `id` and everything that transitively depends on
    /// it. Returns the number of entries cleared.
    pub fn invalidate(&mut self, id: TypeId) -> usize {
        let affected = self.dependents.transitive(id);
        for dependent in &affected {
            if let Some(entry) = self.entries.get_mut(dependent.as_usize()) {
                entry.cache.clear();
            }
        }
        trace!(type_id = %id, cleared = affected.len(), "invalidated caches");
        affected.len()
    }

    // ==========================================================================
    // Linearization & resolution
    // ==========================================================================

    /// Memoized linearization, if one is published.
    pub fn cached_linearization(&self, id: TypeId) -> Option<Arc<[TypeId]>> {
        self.get(id).and_then(|e| e.cache.types.clone())
    }

    /// Memoized resolution stack, if one is published.
    pub fn cached_stack(&self, id: TypeId, name: &str) -> Option<Arc<[M]>> {
        self.get(id).and_then(|e| e.cache.stacks.get(name).cloned())
    }

    /// Ordered ancestor list of a type, most general first, the type itself last.
    ///
    /// Starts from the superclass's linearization, then walks the included
    /// modules oldest first, expanding each module's own linearization and
    /// keeping every type at the earliest position it appears.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn linearize(&mut self, id: TypeId) -> Result<Arc<[TypeId]>, ConfigurationError> {
        if let Some(types) = self.cached_linearization(id) {
            return Ok(types);
        }

        let (superclass, modules) = {
            let entry = self.entry(id)?;
            (entry.superclass, entry.modules.clone())
        };

        let mut types: Vec<TypeId> = match superclass {
            Some(parent) => self.linearize(parent)?.to_vec(),
            None => Vec::new(),
        };
        let mut seen: FxHashSet<TypeId> = types.iter().copied().collect();

        for &module in modules.iter().rev() {
            let expanded = self.linearize(module)?;
            for &ty in expanded.iter() {
                if seen.insert(ty) {
                    types.push(ty);
                }
            }
        }
        if seen.insert(id) {
            types.push(id);
        }

        let types: Arc<[TypeId]> = types.into();
        trace!(type_id = %id, types = ?types, "linearized");
        self.entry_mut(id)?.cache.types = Some(Arc::clone(&types));
        Ok(types)
    }

    /// Every declaration of `name` across the linearization, most specific last.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_stack(&mut self, id: TypeId, name: &str) -> Result<Arc<[M]>, ConfigurationError> {
        if let Some(stack) = self.cached_stack(id, name) {
            return Ok(stack);
        }

        let types = self.linearize(id)?;
        let stack: Arc<[M]> = types
            .iter()
            .filter_map(|ty| self.entries[ty.as_usize()].members.get(name).cloned())
            .collect();

        trace!(type_id = %id, member = name, depth = stack.len(), "resolved stack");
        self.entry_mut(id)?
            .cache
            .stacks
            .insert(name.to_string(), Arc::clone(&stack));
        Ok(stack)
    }

    /// The winning declaration of `name`, if any.
    pub fn resolve_member(&mut self, id: TypeId, name: &str) -> Result<Option<M>, ConfigurationError> {
        Ok(self.resolve_stack(id, name)?.last().cloned())
    }

    /// True if `candidate` is `id` itself or appears in its linearization.
    pub fn has_type(&mut self, id: TypeId, candidate: TypeId) -> Result<bool, ConfigurationError> {
        if id == candidate {
            return Ok(true);
        }
        Ok(self.linearize(id)?.contains(&candidate))
    }

    /// Public callable members across the linearization, most specific wins.
    pub fn methods(&mut self, id: TypeId) -> Result<BTreeMap<String, M>, ConfigurationError> {
        let types = self.linearize(id)?;
        let prefix = self.private_prefix;
        let mut out = BTreeMap::new();
        for ty in types.iter() {
            for (name, member) in &self.entries[ty.as_usize()].members {
                if member.is_callable() && !is_private_name(name, prefix) {
                    out.insert(name.clone(), member.clone());
                }
            }
        }
        Ok(out)
    }

    /// Callable members declared directly on the type, private ones included.
    pub fn declared_methods(&self, id: TypeId) -> Result<BTreeMap<String, M>, ConfigurationError> {
        Ok(self
            .entry(id)?
            .members
            .iter()
            .filter(|(_, member)| member.is_callable())
            .map(|(name, member)| (name.clone(), member.clone()))
            .collect())
    }
}

impl<M> fmt::Debug for TypeRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.entries.len())
            .field("private_prefix", &self.private_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestMember {
        Method(&'static str),
        Data(i32),
    }

    impl MemberValue for TestMember {
        fn is_callable(&self) -> bool {
            matches!(self, TestMember::Method(_))
        }
    }

    fn registry() -> TypeRegistry<TestMember> {
        TypeRegistry::new("Object")
    }

    fn lin(reg: &mut TypeRegistry<TestMember>, id: TypeId) -> Vec<TypeId> {
        reg.linearize(id).unwrap().to_vec()
    }

    #[test]
    fn root_linearizes_to_itself() {
        let mut reg = registry();
        let root = reg.root();
        assert_eq!(lin(&mut reg, root), vec![root]);
        assert_eq!(reg.name(root).unwrap(), "Object");
    }

    #[test]
    fn bare_module_linearizes_to_itself() {
        let mut reg = registry();
        let m = reg.register_module("M");
        assert_eq!(lin(&mut reg, m), vec![m]);
    }

    #[test]
    fn classes_start_with_root_and_end_with_self() {
        let mut reg = registry();
        let a = reg.register_class("A", None).unwrap();
        let b = reg.register_class("B", Some(a)).unwrap();
        assert_eq!(lin(&mut reg, b), vec![reg.root(), a, b]);
        assert_eq!(reg.superclass(b).unwrap(), Some(a));
        assert_eq!(reg.children(a).unwrap(), vec![b]);
    }

    #[test]
    fn later_modules_come_after_earlier_ones() {
        let mut reg = registry();
        let m1 = reg.register_module("M1");
        let m2 = reg.register_module("M2");
        let c = reg.register_class("C", None).unwrap();
        reg.include(c, m1).unwrap();
        reg.include(c, m2).unwrap();

        assert_eq!(reg.entry(c).unwrap().modules(), &[m2, m1]);
        assert_eq!(lin(&mut reg, c), vec![reg.root(), m1, m2, c]);
    }

    #[test]
    fn nested_modules_expand_before_their_includer() {
        let mut reg = registry();
        let a1 = reg.register_module("A1");
        let a2 = reg.register_module("A2");
        let b = reg.register_module("B");
        reg.include(b, a1).unwrap();
        reg.include(b, a2).unwrap();
        let c = reg.register_class("C", None).unwrap();
        reg.include(c, b).unwrap();

        assert_eq!(lin(&mut reg, b), vec![a1, a2, b]);
        assert_eq!(lin(&mut reg, c), vec![reg.root(), a1, a2, b, c]);
    }

    #[test]
    fn repeated_module_keeps_earliest_position() {
        // B includes A, D includes A, C includes [B, D]
        let mut reg = registry();
        let a = reg.register_module("A");
        let b = reg.register_module("B");
        let d = reg.register_module("D");
        reg.include(b, a).unwrap();
        reg.include(d, a).unwrap();
        let c = reg.register_class("C", None).unwrap();
        reg.include(c, b).unwrap();
        reg.include(c, d).unwrap();

        assert_eq!(lin(&mut reg, c), vec![reg.root(), a, b, d, c]);
    }

    #[test]
    fn module_already_inherited_is_skipped() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let parent = reg.register_class("Parent", None).unwrap();
        reg.include(parent, m).unwrap();
        let child = reg.register_class("Child", Some(parent)).unwrap();

        assert!(!reg.include(child, m).unwrap());
        assert!(reg.entry(child).unwrap().modules().is_empty());
        assert_eq!(lin(&mut reg, child), vec![reg.root(), m, parent, child]);
    }

    #[test]
    fn self_inclusion_is_rejected() {
        let mut reg = registry();
        let m = reg.register_module("M");
        assert_eq!(
            reg.include(m, m),
            Err(ConfigurationError::SelfInclusion {
                name: "M".to_string()
            })
        );
    }

    #[test]
    fn cyclic_inclusion_is_rejected() {
        let mut reg = registry();
        let outer = reg.register_module("Outer");
        let inner = reg.register_module("Inner");
        reg.include(outer, inner).unwrap();

        let err = reg.include(inner, outer).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CyclicInclusion {
                module: "Outer".to_string(),
                target: "Inner".to_string(),
            }
        );
        assert!(reg.entry(inner).unwrap().modules().is_empty());
    }

    #[test]
    fn including_a_class_is_rejected() {
        let mut reg = registry();
        let a = reg.register_class("A", None).unwrap();
        let b = reg.register_class("B", None).unwrap();
        assert!(matches!(
            reg.include(b, a),
            Err(ConfigurationError::NotAModule { kind: "class", .. })
        ));
    }

    #[test]
    fn module_cannot_be_a_superclass() {
        let mut reg = registry();
        let m = reg.register_module("M");
        assert_eq!(
            reg.register_class("C", Some(m)),
            Err(ConfigurationError::TemplateMismatch {
                expected: "Object".to_string(),
                found: "M".to_string(),
            })
        );
    }

    #[test]
    fn modules_have_no_template() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let c = reg.register_class("C", None).unwrap();

        assert!(matches!(
            reg.template(m),
            Err(ConfigurationError::NotInstantiable { kind: "module", .. })
        ));
        assert_eq!(reg.template(c).unwrap().lineage(), &[reg.root(), c]);
    }

    #[test]
    fn unknown_type_is_reported() {
        let mut reg = registry();
        let bogus = TypeId::new(99);
        assert_eq!(
            reg.linearize(bogus),
            Err(ConfigurationError::UnknownType { id: bogus })
        );
    }

    #[test]
    fn stack_orders_most_specific_last() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let a = reg.register_class("A", None).unwrap();
        let b = reg.register_class("B", Some(a)).unwrap();
        reg.define_member(a, "run", TestMember::Method("a")).unwrap();
        reg.define_member(m, "run", TestMember::Method("m")).unwrap();
        reg.define_member(b, "run", TestMember::Method("b")).unwrap();
        reg.include(b, m).unwrap();

        let stack = reg.resolve_stack(b, "run").unwrap();
        assert_eq!(
            stack.as_ref(),
            &[
                TestMember::Method("a"),
                TestMember::Method("m"),
                TestMember::Method("b")
            ]
        );
        assert_eq!(
            reg.resolve_member(b, "run").unwrap(),
            Some(TestMember::Method("b"))
        );
        assert!(reg.resolve_stack(b, "missing").unwrap().is_empty());
    }

    #[test]
    fn superclass_definition_reaches_existing_descendants() {
        let mut reg = registry();
        let a = reg.register_class("A", None).unwrap();
        let b = reg.register_class("B", Some(a)).unwrap();
        let c = reg.register_class("C", Some(b)).unwrap();

        assert!(reg.resolve_member(c, "late").unwrap().is_none());
        assert!(reg.cached_stack(c, "late").is_some());

        reg.define_member(a, "late", TestMember::Method("late")).unwrap();
        let delta = reg.resolve(a).unwrap();

        assert_eq!(delta.members, vec!["late".to_string()]);
        assert!(reg.cached_stack(c, "late").is_none());
        assert_eq!(
            reg.resolve_member(c, "late").unwrap(),
            Some(TestMember::Method("late"))
        );
    }

    #[test]
    fn module_definition_reaches_includers_and_their_subclasses() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let a = reg.register_class("A", None).unwrap();
        reg.include(a, m).unwrap();
        let b = reg.register_class("B", Some(a)).unwrap();

        assert!(reg.methods(b).unwrap().is_empty());

        reg.define_member(m, "mixed", TestMember::Method("m")).unwrap();
        assert_eq!(reg.resolve(m).unwrap().members, vec!["mixed".to_string()]);

        assert_eq!(
            reg.methods(b).unwrap().get("mixed"),
            Some(&TestMember::Method("m"))
        );
    }

    #[test]
    fn nested_inclusion_reaches_outer_includers() {
        let mut reg = registry();
        let inner = reg.register_module("Inner");
        let outer = reg.register_module("Outer");
        let c = reg.register_class("C", None).unwrap();
        reg.include(c, outer).unwrap();
        assert_eq!(lin(&mut reg, c), vec![reg.root(), outer, c]);

        reg.include(outer, inner).unwrap();
        reg.resolve(outer).unwrap();

        assert_eq!(lin(&mut reg, c), vec![reg.root(), inner, outer, c]);
        assert!(reg.has_type(c, inner).unwrap());
    }

    #[test]
    fn resolve_drains_delta() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let c = reg.register_class("C", None).unwrap();
        reg.define_member(c, "x", TestMember::Data(1)).unwrap();
        reg.include(c, m).unwrap();

        assert_eq!(reg.entry(c).unwrap().unresolved().modules, vec![m]);
        let delta = reg.resolve(c).unwrap();
        assert_eq!(delta.members, vec!["x".to_string()]);
        assert_eq!(delta.modules, vec![m]);
        assert!(reg.entry(c).unwrap().unresolved().is_empty());
    }

    #[test]
    fn methods_merge_and_filter() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let a = reg.register_class("A", None).unwrap();
        reg.define_member(m, "shared", TestMember::Method("m")).unwrap();
        reg.define_member(m, "only_m", TestMember::Method("m")).unwrap();
        reg.define_member(a, "shared", TestMember::Method("a")).unwrap();
        reg.define_member(a, "_hidden", TestMember::Method("a")).unwrap();
        reg.define_member(a, "field", TestMember::Data(3)).unwrap();
        reg.include(a, m).unwrap();

        let methods = reg.methods(a).unwrap();
        assert_eq!(methods.get("shared"), Some(&TestMember::Method("a")));
        assert_eq!(methods.get("only_m"), Some(&TestMember::Method("m")));
        assert!(!methods.contains_key("_hidden"));
        assert!(!methods.contains_key("field"));

        let declared = reg.declared_methods(a).unwrap();
        assert_eq!(declared.len(), 2);
        assert!(declared.contains_key("_hidden"));
    }

    #[test]
    fn custom_private_prefix() {
        let mut reg: TypeRegistry<TestMember> =
            TypeRegistry::new("Object").with_private_prefix('#');
        let a = reg.register_class("A", None).unwrap();
        reg.define_member(a, "#secret", TestMember::Method("s")).unwrap();
        reg.define_member(a, "_visible", TestMember::Method("v")).unwrap();

        let methods = reg.methods(a).unwrap();
        assert!(methods.contains_key("_visible"));
        assert!(!methods.contains_key("#secret"));
    }

    #[test]
    fn statics_do_not_enter_resolution() {
        let mut reg = registry();
        let a = reg.register_class("A", None).unwrap();
        reg.define_static(a, "VERSION", TestMember::Data(2)).unwrap();

        assert_eq!(
            reg.static_member(a, "VERSION").unwrap(),
            Some(TestMember::Data(2))
        );
        assert!(reg.resolve_member(a, "VERSION").unwrap().is_none());
    }

    #[test]
    fn includers_are_tracked() {
        let mut reg = registry();
        let m = reg.register_module("M");
        let a = reg.register_class("A", None).unwrap();
        let b = reg.register_class("B", None).unwrap();
        reg.include(a, m).unwrap();
        reg.include(b, m).unwrap();
        assert_eq!(reg.includers(m).unwrap(), vec![a, b]);
    }

    #[test]
    fn singleton_linearizes_under_root() {
        let mut reg = registry();
        let s = reg.register_singleton("Config", None).unwrap();
        assert_eq!(reg.kind(s).unwrap(), TypeKind::Singleton);
        assert_eq!(lin(&mut reg, s), vec![reg.root(), s]);
    }
}
