//! Instances, identity tags and bound methods.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use lineage_core::TypeId;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::class::Class;
use crate::dispatch::{CompiledMember, Receiver};
use crate::error::DispatchError;
use crate::method::Method;
use crate::runtime::Runtime;
use crate::value::Value;

// ============================================================================
// Identity
// ============================================================================

/// Issues identity tags. Starts at zero, never resets.
struct IdentityRegistry {
    next: AtomicU64,
}

impl IdentityRegistry {
    const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    fn assign(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

static IDENTITIES: IdentityRegistry = IdentityRegistry::new();

// ============================================================================
// Instance
// ============================================================================

/// An instance of a class.
///
/// Cheap to clone; clones share fields and identity. The instance keeps its
/// runtime alive, so it stays usable after every other handle is dropped.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

struct InstanceInner {
    class: TypeId,
    runtime: Runtime,
    fields: RwLock<FxHashMap<String, Value>>,
    identity: OnceLock<u64>,
    /// name -> (implementation the wrapper was built for, wrapper)
    bound: Mutex<FxHashMap<String, (Method, Weak<BoundInner>)>>,
}

impl Instance {
    pub(crate) fn new(class: TypeId, runtime: Runtime) -> Self {
        Instance(Arc::new(InstanceInner {
            class,
            runtime,
            fields: RwLock::new(FxHashMap::default()),
            identity: OnceLock::new(),
            bound: Mutex::new(FxHashMap::default()),
        }))
    }

    pub fn class_id(&self) -> TypeId {
        self.0.class
    }

    /// Handle to the concrete class.
    pub fn class(&self) -> Result<Class, DispatchError> {
        Ok(self.0.runtime.class_handle(self.0.class)?)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.0.runtime
    }

    /// Dispatch a member with a fresh chain.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        self.0
            .runtime
            .dispatch(&Receiver::Instance(self.clone()), name, args)
    }

    /// Read a field stored on this instance only.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Read a field, falling back to the member the class resolves for `name`.
    pub fn get(&self, name: &str) -> Result<Option<Value>, DispatchError> {
        if let Some(value) = self.field(name) {
            return Ok(Some(value));
        }
        Ok(self
            .0
            .runtime
            .resolve_member(self.0.class, name)?
            .map(|member| member.to_value()))
    }

    /// Write a field. Storing a method overrides the class implementation for
    /// this instance only.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.fields.write().insert(name.into(), value.into());
    }

    /// Remove a field, returning its value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.fields.write().remove(name)
    }

    /// Names of the fields stored on this instance, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.fields.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The member `name` resolves to for this instance, compiled against the
    /// concrete class.
    pub fn method(&self, name: &str) -> Result<CompiledMember, DispatchError> {
        self.0.runtime.compile(self, name)
    }

    /// A callable bound to this instance.
    ///
    /// Repeated calls return the same wrapper while the resolved
    /// implementation is unchanged. After a redefinition a new wrapper is
    /// returned; wrappers handed out earlier keep the implementation they
    /// captured.
    pub fn bound_method(&self, name: &str) -> Result<BoundMethod, DispatchError> {
        let compiled = self.method(name)?;
        let mut cache = self.0.bound.lock();

        if let Some((method, wrapper)) = cache.get(name)
            && method.ptr_eq(compiled.method())
            && let Some(inner) = wrapper.upgrade()
        {
            return Ok(BoundMethod(inner));
        }

        let method = compiled.method().clone();
        let bound = BoundMethod(Arc::new(BoundInner {
            receiver: self.clone(),
            compiled,
        }));
        cache.insert(name.to_string(), (method, Arc::downgrade(&bound.0)));
        Ok(bound)
    }

    /// Identity comparison.
    pub fn equals(&self, other: &Instance) -> bool {
        self.ptr_eq(other)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity tag, assigned on first use and stable afterwards.
    pub fn hash(&self) -> u64 {
        *self.0.identity.get_or_init(|| IDENTITIES.assign())
    }

    /// True if `ty` is the concrete class or appears in its linearization.
    pub fn instance_of(&self, ty: TypeId) -> Result<bool, DispatchError> {
        Ok(self.0.runtime.linearization(self.0.class)?.contains(&ty))
    }

    fn class_name(&self) -> String {
        self.0
            .runtime
            .type_name(self.0.class)
            .unwrap_or_else(|_| self.0.class.to_string())
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:x}", self.class_name(), self.hash())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.0.class)
            .field("identity", &self.0.identity.get())
            .finish()
    }
}

// ============================================================================
// Bound methods
// ============================================================================

/// A compiled member bound to a receiver.
#[derive(Clone)]
pub struct BoundMethod(Arc<BoundInner>);

struct BoundInner {
    receiver: Instance,
    compiled: CompiledMember,
}

impl BoundMethod {
    pub fn call(&self, args: Vec<Value>) -> Result<Value, DispatchError> {
        self.0.compiled.apply(&self.0.receiver, args)
    }

    pub fn receiver(&self) -> &Instance {
        &self.0.receiver
    }

    pub fn method(&self) -> &Method {
        self.0.compiled.method()
    }

    pub fn ptr_eq(&self, other: &BoundMethod) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("receiver", &self.0.receiver)
            .field("member", &self.0.compiled.name())
            .finish()
    }
}
