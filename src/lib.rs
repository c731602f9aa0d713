//! Runtime classes, mixin modules and cooperative call-next dispatch.
//!
//! Classes, singletons and modules are declared at runtime against a
//! [`Runtime`]. Each type's ancestry is flattened into a linearization; a
//! member name resolves to the stack of its declarations along it, most
//! specific last; and cooperative methods can step to the next declaration
//! with [`CallContext::call_next`].
//!
//! ```
//! use lineage::prelude::*;
//!
//! let rt = Runtime::new();
//! let loud = rt
//!     .module("Loud")
//!     .definition(Definition::new().method(
//!         "speak",
//!         Method::cooperative(|ctx| Ok(format!("{}!", ctx.call_next()?).into())),
//!     ))
//!     .build()
//!     .unwrap();
//! let animal = rt
//!     .class("Animal")
//!     .definition(Definition::new().method("speak", Method::new(|_| Ok("...".into()))))
//!     .build()
//!     .unwrap();
//! let dog = rt
//!     .class("Dog")
//!     .extends(&animal)
//!     .definition(Definition::new().include(&loud))
//!     .build()
//!     .unwrap();
//!
//! let rex = dog.create(vec![]).unwrap();
//! assert_eq!(rex.call("speak", vec![]).unwrap(), Value::from("...!"));
//! ```

mod builder;
mod class;
mod composable;
mod config;
mod definition;
mod dispatch;
mod error;
mod instance;
mod method;
mod module;
mod root;
mod runtime;
mod value;

pub use builder::{ClassBuilder, ModuleBuilder, SingletonBuilder};
pub use class::{Class, Singleton};
pub use composable::Composable;
pub use config::RuntimeConfig;
pub use definition::Definition;
pub use dispatch::{CallContext, CompiledMember, Receiver};
pub use error::{ConfigurationError, ConversionError, DispatchError, LineageError};
pub use instance::{BoundMethod, Instance};
pub use method::{Member, Method, MethodBody, MethodFlags};
pub use module::Module;
pub use runtime::Runtime;
pub use value::{FromValue, Value};

pub use lineage_core::{TypeId, TypeKind};
pub use lineage_registry::UnresolvedDelta;

// Re-export main types
pub mod prelude {
    pub use crate::{
        CallContext, Class, Composable, Definition, DispatchError, Instance, LineageError, Method,
        Module, Runtime, Singleton, TypeId, Value,
    };
}
