//! Dispatch compiler and call-next chains.
//!
//! A member resolved for a receiver is wrapped in a [`CompiledMember`] bound to
//! its owner, the class whose resolution stack supplied it. Invoking a
//! cooperative member opens a [`ChainCursor`] over the owner's stack for that
//! name, computed at call time, positioned at the member itself.
//!
//! ## Chain semantics
//!
//! - Every `call_next` within the chain, including from raw ancestor bodies
//!   reached through it, steps the same cursor one entry toward the most
//!   general definition and restores it afterwards, on success or error.
//! - Explicit arguments overwrite the chain's shared argument slots
//!   left-to-right; omitted ones pass through unchanged.
//! - Stepping past the most general definition yields [`Value::Void`].
//! - A nested dispatch (e.g. `ctx.invoke(..)` on `this`) opens its own cursor;
//!   the outer chain is untouched when it returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;

use lineage_core::{ConfigurationError, TypeId};
use tracing::trace;

use crate::error::DispatchError;
use crate::instance::Instance;
use crate::method::{Member, Method};
use crate::runtime::Runtime;
use crate::value::{FromValue, Value};

/// What a member was invoked on.
#[derive(Debug, Clone)]
pub enum Receiver {
    Instance(Instance),
    /// A type object, for statics.
    Type(TypeId),
}

// ============================================================================
// Chain cursor
// ============================================================================

/// Position of one cooperative invocation within a resolution stack.
pub(crate) struct ChainCursor {
    member: String,
    stack: Arc<[Member]>,
    /// Index of the entry currently running.
    position: Cell<usize>,
    /// Arguments shared by every step of the chain.
    args: RefCell<Vec<Value>>,
}

impl ChainCursor {
    fn new(member: String, stack: Arc<[Member]>, position: usize, args: Vec<Value>) -> Self {
        Self {
            member,
            stack,
            position: Cell::new(position),
            args: RefCell::new(args),
        }
    }

    /// Overwrite the shared slots left-to-right and return the merged arguments.
    fn merge_args(&self, explicit: Vec<Value>) -> Vec<Value> {
        let mut shared = self.args.borrow_mut();
        for (i, arg) in explicit.into_iter().enumerate() {
            match shared.get_mut(i) {
                Some(slot) => *slot = arg,
                None => shared.push(arg),
            }
        }
        shared.clone()
    }
}

impl fmt::Debug for ChainCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCursor")
            .field("member", &self.member)
            .field("depth", &self.stack.len())
            .field("position", &self.position.get())
            .finish()
    }
}

// ============================================================================
// Call context
// ============================================================================

/// Context for one member invocation.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let count: i64 = ctx.arg(0)?;
/// let label: String = ctx.arg(1)?;
/// ```
///
/// ## Cooperative chaining
///
/// ```ignore
/// let inherited = ctx.call_next()?;
/// let shouted = ctx.call_next_with(vec![Value::from("FOO")])?;
/// ```
pub struct CallContext<'a> {
    runtime: &'a Runtime,
    receiver: Receiver,
    args: Vec<Value>,
    chain: Option<&'a ChainCursor>,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(
        runtime: &'a Runtime,
        receiver: Receiver,
        args: Vec<Value>,
        chain: Option<&'a ChainCursor>,
    ) -> Self {
        Self {
            runtime,
            receiver,
            args,
            chain,
        }
    }

    /// Runtime the receiver belongs to.
    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// The receiving instance.
    ///
    /// Fails with `ReceiverNotInstance` for statics called on a type.
    pub fn this(&self) -> Result<&Instance, DispatchError> {
        match &self.receiver {
            Receiver::Instance(instance) => Ok(instance),
            Receiver::Type(id) => Err(DispatchError::ReceiverNotInstance {
                type_name: self.runtime.type_name(*id)?,
            }),
        }
    }

    /// All arguments of this step.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Get a raw argument.
    pub fn arg_value(&self, index: usize) -> Result<&Value, DispatchError> {
        self.args
            .get(index)
            .ok_or(DispatchError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// Get a typed argument.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, DispatchError> {
        let value = self.arg_value(index)?;
        T::from_value(value).map_err(DispatchError::Conversion)
    }

    /// True if a `call_next` would reach another definition.
    pub fn has_next(&self) -> bool {
        self.chain.is_some_and(|cursor| cursor.position.get() > 0)
    }

    /// Invoke the next implementation with the chain's current arguments.
    pub fn call_next(&self) -> Result<Value, DispatchError> {
        self.call_next_with(Vec::new())
    }

    /// Invoke the next implementation, overwriting the leading arguments.
    ///
    /// Returns `Value::Void` once the most general definition has been passed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_next_with(&self, args: Vec<Value>) -> Result<Value, DispatchError> {
        let cursor = self.chain.ok_or(DispatchError::NoActiveChain)?;
        let position = cursor.position.get();
        if position == 0 {
            trace!(member = %cursor.member, "call_next past the end of the chain");
            return Ok(Value::Void);
        }

        let merged = cursor.merge_args(args);
        let next = position - 1;
        trace!(member = %cursor.member, from = position, to = next, "call_next");

        cursor.position.set(next);
        let result = match &cursor.stack[next] {
            Member::Method(method) => {
                let mut ctx =
                    CallContext::new(self.runtime, self.receiver.clone(), merged, Some(cursor));
                method.call_raw(&mut ctx)
            }
            Member::Data(_) => Err(DispatchError::NotCallable {
                type_name: self.receiver_name(),
                member: cursor.member.clone(),
            }),
        };
        cursor.position.set(position);
        result
    }

    /// Dispatch another member on the same receiver with a fresh chain.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        self.runtime.dispatch(&self.receiver, name, args)
    }

    fn receiver_name(&self) -> String {
        let id = match &self.receiver {
            Receiver::Instance(instance) => instance.class_id(),
            Receiver::Type(id) => *id,
        };
        self.runtime
            .type_name(id)
            .unwrap_or_else(|_| id.to_string())
    }
}

// ============================================================================
// Compiled member
// ============================================================================

/// A member compiled against its owner class.
///
/// It can be applied to any instance; the chain it opens always follows the
/// owner's resolution stack.
#[derive(Clone)]
pub struct CompiledMember {
    runtime: Runtime,
    owner: TypeId,
    name: String,
    method: Method,
    /// Stored on the instance itself rather than resolved from the class.
    instance_override: bool,
}

impl CompiledMember {
    pub(crate) fn new(
        runtime: &Runtime,
        owner: TypeId,
        name: impl Into<String>,
        method: Method,
    ) -> Self {
        Self {
            runtime: runtime.clone(),
            owner,
            name: name.into(),
            method,
            instance_override: false,
        }
    }

    pub(crate) fn instance_override(
        runtime: &Runtime,
        owner: TypeId,
        name: impl Into<String>,
        method: Method,
    ) -> Self {
        Self {
            instance_override: true,
            ..Self::new(runtime, owner, name, method)
        }
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw implementation.
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_instance_override(&self) -> bool {
        self.instance_override
    }

    /// Apply to `receiver`, which need not be an instance of the owner but
    /// must belong to the same runtime.
    pub fn apply(&self, receiver: &Instance, args: Vec<Value>) -> Result<Value, DispatchError> {
        if !receiver.runtime().ptr_eq(&self.runtime) {
            return Err(ConfigurationError::ForeignType {
                name: receiver.to_string(),
            }
            .into());
        }
        self.invoke(&self.runtime, Receiver::Instance(receiver.clone()), args)
    }

    /// Where the cursor starts: on the method's own entry. Instance-level
    /// overrides sit above the class stack, so their next is the class winner.
    fn start_position(&self, stack: &[Member]) -> usize {
        if self.instance_override {
            return stack.len();
        }
        stack
            .iter()
            .rposition(|member| member.is_method(&self.method))
            .unwrap_or_else(|| stack.len().saturating_sub(1))
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn invoke(
        &self,
        runtime: &Runtime,
        receiver: Receiver,
        args: Vec<Value>,
    ) -> Result<Value, DispatchError> {
        if !self.method.is_cooperative() {
            let mut ctx = CallContext::new(runtime, receiver, args, None);
            return self.method.call_raw(&mut ctx);
        }

        let stack = runtime.resolution_stack(self.owner, &self.name)?;
        let position = self.start_position(&stack);
        trace!(
            owner = %self.owner,
            member = %self.name,
            depth = stack.len(),
            position,
            "opening dispatch chain"
        );

        let cursor = ChainCursor::new(self.name.clone(), stack, position, args.clone());
        let mut ctx = CallContext::new(runtime, receiver, args, Some(&cursor));
        self.method.call_raw(&mut ctx)
    }
}

impl fmt::Debug for CompiledMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMember")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("method", &self.method)
            .field("instance_override", &self.instance_override)
            .finish()
    }
}
