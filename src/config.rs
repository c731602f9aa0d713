//! Runtime configuration.

use lineage_registry::DEFAULT_PRIVATE_PREFIX;

/// Settings fixed when a [`Runtime`](crate::Runtime) is created.
///
/// ```
/// use lineage::{Runtime, RuntimeConfig};
///
/// let config = RuntimeConfig::default()
///     .with_root_name("Base")
///     .with_initializer("init");
/// let rt = Runtime::with_config(config);
/// assert_eq!(rt.root().to_string(), "class Base");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Name of the root class every class descends from.
    pub root_name: String,
    /// Member run with the constructor arguments after instance creation.
    pub initializer: String,
    /// Names starting with this are left out of `methods()`.
    pub private_prefix: char,
    /// Name given to classes created without one.
    pub anonymous_class_name: String,
    /// Name given to modules created without one.
    pub anonymous_module_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            root_name: "Object".to_string(),
            initializer: "initialize".to_string(),
            private_prefix: DEFAULT_PRIVATE_PREFIX,
            anonymous_class_name: "AnonymousClass".to_string(),
            anonymous_module_name: "AnonymousModule".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn with_initializer(mut self, name: impl Into<String>) -> Self {
        self.initializer = name.into();
        self
    }

    pub fn with_private_prefix(mut self, prefix: char) -> Self {
        self.private_prefix = prefix;
        self
    }

    pub fn with_anonymous_class_name(mut self, name: impl Into<String>) -> Self {
        self.anonymous_class_name = name.into();
        self
    }

    pub fn with_anonymous_module_name(mut self, name: impl Into<String>) -> Self {
        self.anonymous_module_name = name.into();
        self
    }
}
