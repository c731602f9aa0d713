//! Runtime: the owner of one class hierarchy.
//!
//! A `Runtime` owns the type registry for one root class and everything
//! needed to declare, compose and dispatch on it.
//!
//! # Thread Safety
//!
//! The registry sits behind one reader/writer lock. Cache hits are served
//! under the read lock from published `Arc` snapshots; misses take the write
//! lock to compute and publish. No lock is held while a member body runs, so
//! bodies may define, include or dispatch re-entrantly.
//!
//! # Example
//!
//! ```
//! use lineage::{Composable, Definition, Method, Runtime, Value};
//!
//! let rt = Runtime::new();
//! let counter = rt
//!     .class("Counter")
//!     .definition(
//!         Definition::new()
//!             .method("initialize", Method::new(|ctx| {
//!                 let start: i64 = ctx.arg(0)?;
//!                 ctx.this()?.set("count", start);
//!                 Ok(Value::Void)
//!             }))
//!             .method("count", Method::new(|ctx| {
//!                 Ok(ctx.this()?.field("count").unwrap_or_default())
//!             })),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let c = counter.create(vec![Value::from(5)]).unwrap();
//! assert_eq!(c.call("count", vec![]).unwrap(), Value::Int(5));
//! assert_eq!(counter.to_string(), "class Counter");
//! ```

use std::fmt;
use std::sync::Arc;

use lineage_core::{
    ConfigurationError, INCLUDES_KEY, TypeId, TypeKind, display_label, is_reserved_key,
};
use lineage_registry::{TypeRegistry, UnresolvedDelta};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::builder::{ClassBuilder, ModuleBuilder, SingletonBuilder};
use crate::class::Class;
use crate::composable::Composable;
use crate::config::RuntimeConfig;
use crate::definition::Definition;
use crate::dispatch::{CallContext, CompiledMember, Receiver};
use crate::error::DispatchError;
use crate::instance::Instance;
use crate::method::Member;
use crate::module::Module;
use crate::root;
use crate::value::Value;

struct RuntimeInner {
    config: RuntimeConfig,
    registry: RwLock<TypeRegistry<Member>>,
    /// First instance of each singleton class. Memoized instances keep the
    /// runtime alive, so a runtime that has created a singleton is never freed.
    singletons: Mutex<FxHashMap<TypeId, Instance>>,
}

/// Owner of one class hierarchy.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// One validated entry of a definition.
enum DefinitionStep {
    Include(Vec<TypeId>),
    Statics(Vec<(String, Value)>),
    Member(String, Member),
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with a custom configuration.
    ///
    /// Installing the root members only touches the fresh root and does not
    /// fail in practice. A failure panics in debug builds and is logged in
    /// release builds. Use [`try_with_config`](Self::try_with_config) to get
    /// the error instead.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let (runtime, installed) = Self::assemble(config);
        if let Err(err) = &installed {
            error!(%err, "root members were not installed");
        }
        debug_assert!(installed.is_ok(), "root members were not installed: {installed:?}");
        runtime
    }

    /// Create a runtime with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the error raised while installing the root members.
    pub fn try_with_config(config: RuntimeConfig) -> Result<Self, ConfigurationError> {
        let (runtime, installed) = Self::assemble(config);
        installed.map(|()| runtime)
    }

    fn assemble(config: RuntimeConfig) -> (Self, Result<(), ConfigurationError>) {
        let mut registry =
            TypeRegistry::new(config.root_name.clone()).with_private_prefix(config.private_prefix);
        let installed = root::install(&mut registry);
        debug!(root = %config.root_name, "created runtime");

        let runtime = Self {
            inner: Arc::new(RuntimeInner {
                config,
                registry: RwLock::new(registry),
                singletons: Mutex::new(FxHashMap::default()),
            }),
        };
        (runtime, installed)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// True if both handles refer to the same runtime.
    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reject a handle declared on another runtime; its id means nothing here.
    pub(crate) fn check_owned<T: Composable + ?Sized>(
        &self,
        handle: &T,
    ) -> Result<(), ConfigurationError> {
        if self.ptr_eq(handle.runtime()) {
            return Ok(());
        }
        Err(ConfigurationError::ForeignType {
            name: handle.name(),
        })
    }

    // ==========================================================================
    // Factories
    // ==========================================================================

    /// The root class.
    pub fn root(&self) -> Class {
        let id = self.read(|r| r.root());
        Class::new(self.clone(), id, TypeKind::Class)
    }

    /// Start declaring a named class.
    pub fn class(&self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder::new(self, Some(name.into()))
    }

    /// Start declaring a class named after the configured anonymous name.
    pub fn anonymous_class(&self) -> ClassBuilder<'_> {
        ClassBuilder::new(self, None)
    }

    pub fn module(&self, name: impl Into<String>) -> ModuleBuilder<'_> {
        ModuleBuilder::new(self, Some(name.into()))
    }

    pub fn anonymous_module(&self) -> ModuleBuilder<'_> {
        ModuleBuilder::new(self, None)
    }

    pub fn singleton(&self, name: impl Into<String>) -> SingletonBuilder<'_> {
        SingletonBuilder::new(self, Some(name.into()))
    }

    /// Create an instance of any instantiable type.
    ///
    /// Runs the initializer with `args` when one resolves. Singletons return
    /// their first instance; modules fail with `NotInstantiable`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn create(&self, id: TypeId, args: Vec<Value>) -> Result<Instance, DispatchError> {
        let kind = self.read(|r| {
            r.template(id)?;
            r.kind(id)
        })?;
        if kind == TypeKind::Singleton {
            return self.singleton_instance(id, args);
        }
        self.instantiate(id, args)
    }

    fn instantiate(&self, id: TypeId, args: Vec<Value>) -> Result<Instance, DispatchError> {
        let instance = Instance::new(id, self.clone());
        let initializer = self.inner.config.initializer.as_str();
        if let Some(Member::Method(_)) = self.resolve_member(id, initializer)? {
            self.dispatch(&Receiver::Instance(instance.clone()), initializer, args)?;
        }
        trace!(class = %id, "created instance");
        Ok(instance)
    }

    fn singleton_instance(&self, id: TypeId, args: Vec<Value>) -> Result<Instance, DispatchError> {
        if let Some(existing) = self.inner.singletons.lock().get(&id) {
            return Ok(existing.clone());
        }
        // The initializer may itself reach for the singleton; never hold the
        // memo lock across it.
        let created = self.instantiate(id, args)?;
        let mut memo = self.inner.singletons.lock();
        Ok(memo.entry(id).or_insert(created).clone())
    }

    // ==========================================================================
    // Type queries
    // ==========================================================================

    pub fn type_name(&self, id: TypeId) -> Result<String, ConfigurationError> {
        self.read(|r| r.name(id).map(str::to_string))
    }

    pub fn type_kind(&self, id: TypeId) -> Result<TypeKind, ConfigurationError> {
        self.read(|r| r.kind(id))
    }

    /// Display string of a type, e.g. `module Walker`.
    pub fn describe(&self, id: TypeId) -> Result<String, ConfigurationError> {
        self.read(|r| Ok(format!("{} {}", r.kind(id)?.keyword(), r.name(id)?)))
    }

    /// Handle for a class or singleton class.
    pub fn class_handle(&self, id: TypeId) -> Result<Class, ConfigurationError> {
        let kind = self.type_kind(id)?;
        if kind.is_module() {
            return Err(ConfigurationError::NotInstantiable {
                name: self.type_name(id)?,
                kind: kind.keyword(),
            });
        }
        Ok(Class::new(self.clone(), id, kind))
    }

    /// Handle for a module.
    pub fn module_handle(&self, id: TypeId) -> Result<Module, ConfigurationError> {
        let kind = self.type_kind(id)?;
        if !kind.is_module() {
            return Err(ConfigurationError::NotAModule {
                name: self.type_name(id)?,
                kind: kind.keyword(),
            });
        }
        Ok(Module::new(self.clone(), id))
    }

    /// Linearization of a type, most general first, the type itself last.
    pub fn linearization(&self, id: TypeId) -> Result<Arc<[TypeId]>, ConfigurationError> {
        if let Some(types) = self.read(|r| r.cached_linearization(id)) {
            return Ok(types);
        }
        self.write(|r| r.linearize(id))
    }

    /// Every declaration of `name` across the linearization, most specific last.
    pub fn resolution_stack(
        &self,
        id: TypeId,
        name: &str,
    ) -> Result<Arc<[Member]>, ConfigurationError> {
        if let Some(stack) = self.read(|r| r.cached_stack(id, name)) {
            return Ok(stack);
        }
        self.write(|r| r.resolve_stack(id, name))
    }

    /// The winning declaration of `name`.
    pub fn resolve_member(&self, id: TypeId, name: &str) -> Result<Option<Member>, ConfigurationError> {
        Ok(self.resolution_stack(id, name)?.last().cloned())
    }

    // ==========================================================================
    // Registry access
    // ==========================================================================

    pub(crate) fn read<R>(&self, f: impl FnOnce(&TypeRegistry<Member>) -> R) -> R {
        f(&self.inner.registry.read())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut TypeRegistry<Member>) -> R) -> R {
        f(&mut self.inner.registry.write())
    }

    pub(crate) fn register(
        &self,
        name: Option<String>,
        kind: TypeKind,
        superclass: Option<TypeId>,
    ) -> Result<TypeId, ConfigurationError> {
        let config = &self.inner.config;
        match kind {
            TypeKind::Module => {
                let name = name.unwrap_or_else(|| config.anonymous_module_name.clone());
                Ok(self.write(|r| r.register_module(name)))
            }
            TypeKind::Class => {
                let name = name.unwrap_or_else(|| config.anonymous_class_name.clone());
                self.write(|r| r.register_class(name, superclass))
            }
            TypeKind::Singleton => {
                let name = name.unwrap_or_else(|| config.anonymous_class_name.clone());
                self.write(|r| r.register_singleton(name, superclass))
            }
        }
    }

    /// Apply a definition to a type and resolve it.
    ///
    /// Reserved keys and inclusions are validated before anything changes.
    pub(crate) fn define(
        &self,
        id: TypeId,
        definition: Definition,
    ) -> Result<UnresolvedDelta, ConfigurationError> {
        let (entries, modules) = definition.into_parts();
        for module in &modules {
            self.check_owned(module)?;
        }

        let mut registry = self.inner.registry.write();
        let type_name = registry.name(id)?.to_string();

        let mut steps = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let step = if !is_reserved_key(&key) {
                DefinitionStep::Member(key, Member::from(value))
            } else if key == INCLUDES_KEY {
                let modules = reserved_modules(&key, value)?;
                for &module in &modules {
                    registry.check_inclusion(id, module)?;
                }
                DefinitionStep::Include(modules)
            } else {
                match value {
                    Value::Map(statics) => DefinitionStep::Statics(statics.into_iter().collect()),
                    _ => {
                        return Err(ConfigurationError::invalid_reserved_key(key, "a map"));
                    }
                }
            };
            steps.push(step);
        }

        for step in steps {
            match step {
                DefinitionStep::Include(modules) => {
                    for module in modules {
                        registry.include(id, module)?;
                    }
                }
                DefinitionStep::Statics(statics) => {
                    for (name, value) in statics {
                        registry.define_static(id, name, Member::from(value))?;
                    }
                }
                DefinitionStep::Member(name, member) => {
                    if let Member::Method(method) = &member {
                        method.set_label(display_label(&type_name, &name));
                    }
                    registry.define_member(id, name, member)?;
                }
            }
        }

        let delta = registry.resolve(id)?;
        drop(registry);
        debug!(
            type_name = %type_name,
            members = ?delta.members,
            modules = delta.modules.len(),
            "defined"
        );
        Ok(delta)
    }

    /// Include modules in order and resolve the type.
    pub(crate) fn include(
        &self,
        id: TypeId,
        modules: &[TypeId],
    ) -> Result<UnresolvedDelta, ConfigurationError> {
        let mut registry = self.inner.registry.write();
        for &module in modules {
            registry.check_inclusion(id, module)?;
        }
        for &module in modules {
            registry.include(id, module)?;
        }
        registry.resolve(id)
    }

    // ==========================================================================
    // Dispatch
    // ==========================================================================

    /// Compile the member `name` resolves to for `instance`.
    ///
    /// A method stored on the instance itself wins over the class.
    pub(crate) fn compile(
        &self,
        instance: &Instance,
        name: &str,
    ) -> Result<CompiledMember, DispatchError> {
        let class = instance.class_id();
        if let Some(value) = instance.field(name) {
            return match value {
                Value::Method(method) => Ok(CompiledMember::instance_override(self, class, name, method)),
                _ => Err(self.not_callable(class, name)),
            };
        }
        match self.resolve_member(class, name)? {
            Some(Member::Method(method)) => Ok(CompiledMember::new(self, class, name, method)),
            Some(Member::Data(_)) => Err(self.not_callable(class, name)),
            None => Err(DispatchError::MemberNotFound {
                type_name: self.type_name(class)?,
                member: name.to_string(),
            }),
        }
    }

    /// Dispatch `name` on a receiver with a fresh chain.
    pub(crate) fn dispatch(
        &self,
        receiver: &Receiver,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, DispatchError> {
        match receiver {
            Receiver::Instance(instance) => {
                let compiled = self.compile(instance, name)?;
                compiled.invoke(self, receiver.clone(), args)
            }
            Receiver::Type(id) => self.call_static(*id, name, args),
        }
    }

    /// Call an entry installed on a type object.
    pub(crate) fn call_static(
        &self,
        id: TypeId,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, DispatchError> {
        match self.read(|r| r.static_member(id, name))? {
            Some(Member::Method(method)) => {
                let mut ctx = CallContext::new(self, Receiver::Type(id), args, None);
                method.call_raw(&mut ctx)
            }
            Some(Member::Data(_)) => Err(self.not_callable(id, name)),
            None => Err(DispatchError::MemberNotFound {
                type_name: self.type_name(id)?,
                member: name.to_string(),
            }),
        }
    }

    fn not_callable(&self, id: TypeId, name: &str) -> DispatchError {
        DispatchError::NotCallable {
            type_name: self.type_name(id).unwrap_or_else(|_| id.to_string()),
            member: name.to_string(),
        }
    }
}

/// Modules named by an `includes` entry: one type or a list of types.
fn reserved_modules(key: &str, value: Value) -> Result<Vec<TypeId>, ConfigurationError> {
    const EXPECTED: &str = "a module or a list of modules";
    match value {
        Value::Type(id) => Ok(vec![id]),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Type(id) => Ok(id),
                _ => Err(ConfigurationError::invalid_reserved_key(key, EXPECTED)),
            })
            .collect(),
        _ => Err(ConfigurationError::invalid_reserved_key(key, EXPECTED)),
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("registry", &*self.inner.registry.read())
            .finish()
    }
}
