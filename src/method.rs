//! Callable members.
//!
//! A [`Method`] wraps a native Rust body. Member bodies receive a
//! [`CallContext`] with the receiver, the arguments and, for cooperative
//! methods, the call-next cursor of the chain they run in.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use lineage_core::MemberValue;
use parking_lot::RwLock;

use crate::dispatch::CallContext;
use crate::error::DispatchError;
use crate::value::Value;

/// Signature of a member body.
pub type MethodBody = dyn Fn(&mut CallContext<'_>) -> Result<Value, DispatchError> + Send + Sync;

bitflags! {
    /// Flags controlling how a method is dispatched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        /// Invoking the method opens a call-next chain over the owner's
        /// resolution stack.
        const COOPERATIVE = 1 << 0;
        /// Installed on the root class by the runtime.
        const BUILTIN = 1 << 1;
    }
}

/// A native member body with a stable identity.
///
/// Cloning a `Method` clones the handle, not the body; two clones compare
/// equal under [`ptr_eq`](Method::ptr_eq).
#[derive(Clone)]
pub struct Method(Arc<MethodInner>);

struct MethodInner {
    /// Display label, e.g. `Player.update()`. Set when defined on a type.
    label: RwLock<Option<Arc<str>>>,
    flags: MethodFlags,
    body: Box<MethodBody>,
}

impl Method {
    fn with_flags<F>(flags: MethodFlags, body: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        Method(Arc::new(MethodInner {
            label: RwLock::new(None),
            flags,
            body: Box::new(body),
        }))
    }

    /// Create a plain method. It runs without a dispatch chain, so
    /// `call_next` inside it fails with `NoActiveChain` unless it was itself
    /// reached through another method's chain.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        Self::with_flags(MethodFlags::empty(), body)
    }

    /// Create a cooperative method that may call the next implementation.
    ///
    /// ```
    /// use lineage::{Composable, Definition, Method, Runtime, Value};
    ///
    /// let rt = Runtime::new();
    /// let base = rt
    ///     .class("Base")
    ///     .definition(Definition::new().method("name", Method::new(|_| Ok("base".into()))))
    ///     .build()
    ///     .unwrap();
    /// let derived = rt
    ///     .class("Derived")
    ///     .extends(&base)
    ///     .definition(Definition::new().method(
    ///         "name",
    ///         Method::cooperative(|ctx| Ok(format!("{} > derived", ctx.call_next()?).into())),
    ///     ))
    ///     .build()
    ///     .unwrap();
    ///
    /// let obj = derived.create(vec![]).unwrap();
    /// assert_eq!(obj.call("name", vec![]).unwrap(), Value::from("base > derived"));
    /// ```
    pub fn cooperative<F>(body: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        Self::with_flags(MethodFlags::COOPERATIVE, body)
    }

    pub(crate) fn builtin<F>(body: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        Self::with_flags(MethodFlags::BUILTIN, body)
    }

    pub fn flags(&self) -> MethodFlags {
        self.0.flags
    }

    pub fn is_cooperative(&self) -> bool {
        self.0.flags.contains(MethodFlags::COOPERATIVE)
    }

    /// Display label given when the method was defined on a type.
    pub fn label(&self) -> Option<Arc<str>> {
        self.0.label.read().clone()
    }

    pub(crate) fn set_label(&self, label: String) {
        *self.0.label.write() = Some(label.into());
    }

    /// True if both handles refer to the same body.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Run the body directly with the given context.
    pub(crate) fn call_raw(&self, ctx: &mut CallContext<'_>) -> Result<Value, DispatchError> {
        (self.0.body)(ctx)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("label", &self.label())
            .field("flags", &self.0.flags)
            .finish()
    }
}

// ============================================================================
// Member
// ============================================================================

/// Definition stored in a member table.
#[derive(Debug, Clone)]
pub enum Member {
    Method(Method),
    /// Plain data shared by every instance, like a field default.
    Data(Value),
}

impl Member {
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            Member::Data(_) => None,
        }
    }

    /// True if this member is exactly `method`.
    pub fn is_method(&self, method: &Method) -> bool {
        self.as_method().is_some_and(|m| m.ptr_eq(method))
    }

    /// The member as a value, methods included.
    pub fn to_value(&self) -> Value {
        match self {
            Member::Method(method) => Value::Method(method.clone()),
            Member::Data(value) => value.clone(),
        }
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        match value {
            Value::Method(method) => Member::Method(method),
            other => Member::Data(other),
        }
    }
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

impl MemberValue for Member {
    fn is_callable(&self) -> bool {
        matches!(self, Member::Method(_))
    }
}
