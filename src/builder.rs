//! Fluent builders for classes, singletons and modules.
//!
//! # Example
//!
//! ```
//! use lineage::{Composable, Definition, Method, Runtime, Value};
//!
//! let rt = Runtime::new();
//! let named = rt
//!     .module("Named")
//!     .definition(Definition::new().method("name", Method::new(|_| Ok("named".into()))))
//!     .build()
//!     .unwrap();
//!
//! let base = rt.class("Base").definition(Definition::new().include(&named)).build().unwrap();
//! let derived = rt.class("Derived").extends(&base).build().unwrap();
//! let config = rt.singleton("Config").build().unwrap();
//!
//! assert_eq!(derived.superclass(), Some(base.clone()));
//! assert_eq!(base.children(), vec![derived.clone()]);
//! assert!(config.create(vec![]).unwrap().equals(&config.create(vec![]).unwrap()));
//! assert_eq!(rt.anonymous_class().build().unwrap().name(), "AnonymousClass");
//! ```

use lineage_core::{ConfigurationError, TypeId, TypeKind};

use crate::class::{Class, Singleton};
use crate::composable::Composable;
use crate::definition::Definition;
use crate::module::Module;
use crate::runtime::Runtime;

/// Builder for a class.
///
/// Created by [`Runtime::class`] or [`Runtime::anonymous_class`].
pub struct ClassBuilder<'rt> {
    runtime: &'rt Runtime,
    name: Option<String>,
    superclass: Option<TypeId>,
    definition: Definition,
    /// Reported by `build`, before anything is registered.
    error: Option<ConfigurationError>,
}

impl<'rt> ClassBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt Runtime, name: Option<String>) -> Self {
        Self {
            runtime,
            name,
            superclass: None,
            definition: Definition::new(),
            error: None,
        }
    }

    /// Set the superclass. Defaults to the root. A class from another runtime
    /// fails with `ForeignType` when the class is built.
    pub fn extends(mut self, superclass: &Class) -> Self {
        self.error = self.runtime.check_owned(superclass).err();
        self.superclass = Some(superclass.id());
        self
    }

    /// Set the superclass by id. A module here fails with `TemplateMismatch`
    /// when the class is built.
    pub fn extends_type(mut self, superclass: TypeId) -> Self {
        self.error = None;
        self.superclass = Some(superclass);
        self
    }

    pub fn definition(mut self, definition: Definition) -> Self {
        self.definition = definition;
        self
    }

    pub fn build(self) -> Result<Class, ConfigurationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let id = self
            .runtime
            .register(self.name, TypeKind::Class, self.superclass)?;
        if !self.definition.is_empty() {
            self.runtime.define(id, self.definition)?;
        }
        Ok(Class::new(self.runtime.clone(), id, TypeKind::Class))
    }
}

/// Builder for a singleton.
///
/// Created by [`Runtime::singleton`].
pub struct SingletonBuilder<'rt> {
    inner: ClassBuilder<'rt>,
}

impl<'rt> SingletonBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt Runtime, name: Option<String>) -> Self {
        Self {
            inner: ClassBuilder::new(runtime, name),
        }
    }

    pub fn extends(mut self, superclass: &Class) -> Self {
        self.inner = self.inner.extends(superclass);
        self
    }

    pub fn definition(mut self, definition: Definition) -> Self {
        self.inner = self.inner.definition(definition);
        self
    }

    pub fn build(self) -> Result<Singleton, ConfigurationError> {
        let ClassBuilder {
            runtime,
            name,
            superclass,
            definition,
            error,
        } = self.inner;
        if let Some(err) = error {
            return Err(err);
        }
        let id = runtime.register(name, TypeKind::Singleton, superclass)?;
        if !definition.is_empty() {
            runtime.define(id, definition)?;
        }
        Ok(Singleton::new(Class::new(
            runtime.clone(),
            id,
            TypeKind::Singleton,
        )))
    }
}

/// Builder for a module.
///
/// Created by [`Runtime::module`] or [`Runtime::anonymous_module`].
pub struct ModuleBuilder<'rt> {
    runtime: &'rt Runtime,
    name: Option<String>,
    definition: Definition,
}

impl<'rt> ModuleBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt Runtime, name: Option<String>) -> Self {
        Self {
            runtime,
            name,
            definition: Definition::new(),
        }
    }

    pub fn definition(mut self, definition: Definition) -> Self {
        self.definition = definition;
        self
    }

    pub fn build(self) -> Result<Module, ConfigurationError> {
        let id = self.runtime.register(self.name, TypeKind::Module, None)?;
        if !self.definition.is_empty() {
            self.runtime.define(id, self.definition)?;
        }
        Ok(Module::new(self.runtime.clone(), id))
    }
}
