//! Members every class inherits from the root.
//!
//! They are ordinary members of the root's table, so they resolve, can be
//! overridden, and can be reached with `call_next` like any other definition.

use lineage_core::{ConfigurationError, display_label};
use lineage_registry::TypeRegistry;

use crate::instance::Instance;
use crate::method::{Member, Method};
use crate::value::Value;

/// Install the root members and resolve the root. Called once when a
/// runtime is created.
pub(crate) fn install(registry: &mut TypeRegistry<Member>) -> Result<(), ConfigurationError> {
    let root = registry.root();
    let root_name = registry.name(root)?.to_string();

    let members: [(&str, Method); 5] = [
        (
            "equals",
            Method::builtin(|ctx| {
                let other = ctx.arg::<Instance>(0);
                Ok(Value::Bool(match other {
                    Ok(other) => ctx.this()?.equals(&other),
                    Err(_) => false,
                }))
            }),
        ),
        (
            "hash",
            Method::builtin(|ctx| Ok(Value::Int(ctx.this()?.hash() as i64))),
        ),
        (
            "to_string",
            Method::builtin(|ctx| Ok(Value::Str(ctx.this()?.to_string()))),
        ),
        (
            "instance_of",
            Method::builtin(|ctx| {
                let ty = ctx.arg(0)?;
                Ok(Value::Bool(ctx.this()?.instance_of(ty)?))
            }),
        ),
        (
            "get_class",
            Method::builtin(|ctx| Ok(Value::Type(ctx.this()?.class_id()))),
        ),
    ];

    for (name, method) in members {
        method.set_label(display_label(&root_name, name));
        registry.define_member(root, name, Member::Method(method))?;
    }
    registry.resolve(root)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_defines_every_root_member() {
        let mut registry = TypeRegistry::new("Base");
        install(&mut registry).unwrap();

        let root = registry.root();
        let names: Vec<String> = registry.declared_methods(root).unwrap().into_keys().collect();
        assert_eq!(names, ["equals", "get_class", "hash", "instance_of", "to_string"]);
    }
}

