//! Definitions: batches of members applied to a type in one `define` call.

use std::collections::BTreeMap;

use lineage_core::{INCLUDES_KEY, STATICS_KEY};

use crate::composable::Composable;
use crate::method::Method;
use crate::module::Module;
use crate::value::Value;

/// An ordered batch of definition entries.
///
/// Keys are member names, except for two reserved keys:
/// - `includes`: a module or a list of modules to include
/// - `statics`: a map of entries installed on the type object itself
///
/// Module handles passed to [`include`](Self::include) and
/// [`includes`](Self::includes) are checked against the defining runtime when
/// the definition is applied. Raw `includes` entries added with
/// [`entry`](Self::entry) carry bare ids and are taken as ids of that runtime.
///
/// ```
/// use lineage::{Composable, Definition, Method, Runtime, Value};
///
/// let rt = Runtime::new();
/// let walker = rt
///     .module("Walker")
///     .definition(Definition::new().method("walk", Method::new(|_| Ok("walking".into()))))
///     .build()
///     .unwrap();
///
/// let person = rt
///     .class("Person")
///     .definition(
///         Definition::new()
///             .include(&walker)
///             .static_value("SPECIES", "human")
///             .field("legs", 2),
///     )
///     .build()
///     .unwrap();
///
/// assert!(person.has_type(walker.id()).unwrap());
/// assert_eq!(person.static_value("SPECIES").unwrap(), Some(Value::from("human")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Definition {
    entries: Vec<(String, Value)>,
    modules: Vec<Module>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw entry. Reserved keys are routed when the definition is applied.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn method(self, name: impl Into<String>, method: Method) -> Self {
        self.entry(name, Value::Method(method))
    }

    /// Add a data member shared by every instance.
    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, value)
    }

    /// Include one module.
    pub fn include(mut self, module: &Module) -> Self {
        self.modules.push(module.clone());
        self.entry(INCLUDES_KEY, Value::Type(module.id()))
    }

    /// Include several modules, in order.
    pub fn includes(mut self, modules: &[Module]) -> Self {
        self.modules.extend_from_slice(modules);
        let list = modules.iter().map(|m| Value::Type(m.id())).collect::<Vec<_>>();
        self.entry(INCLUDES_KEY, Value::List(list))
    }

    /// Install a single entry on the type object.
    pub fn static_value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(name.into(), value.into());
        self.statics(map)
    }

    /// Install several entries on the type object.
    pub fn statics(self, statics: BTreeMap<String, Value>) -> Self {
        self.entry(STATICS_KEY, Value::Map(statics))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries in order, and every module handle they name.
    pub(crate) fn into_parts(self) -> (Vec<(String, Value)>, Vec<Module>) {
        (self.entries, self.modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_order() {
        let def = Definition::new()
            .field("b", 1)
            .field("a", 2)
            .method("run", Method::new(|_| Ok(Value::Void)));

        let keys: Vec<&str> = def.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "run"]);
        assert_eq!(def.len(), 3);
    }

    #[test]
    fn statics_use_reserved_key() {
        let def = Definition::new().static_value("VERSION", 3);
        let (key, value) = def.iter().next().unwrap();
        assert_eq!(key, "statics");
        assert!(matches!(value, Value::Map(map) if map.get("VERSION") == Some(&Value::Int(3))));
    }
}
