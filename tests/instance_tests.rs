//! Instance identity, built-in members and bound methods.

use lineage::{Class, Composable, Definition, Instance, Method, Module, Runtime, Value};

// =============================================================================
// Identity and built-ins
// =============================================================================

#[test]
fn test_equals_is_identity() {
    let rt = Runtime::new();
    let object = rt.root().create(vec![]).unwrap();
    let other = rt.root().create(vec![]).unwrap();

    assert_eq!(
        object.call("equals", vec![object.clone().into()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        object.call("equals", vec![other.clone().into()]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        object.call("equals", vec![other.clone().into()]).unwrap(),
        other.call("equals", vec![object.clone().into()]).unwrap()
    );
    assert_eq!(
        object.call("equals", vec![Value::from(3)]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_hash_is_stable_and_distinct() {
    let rt = Runtime::new();
    let object = rt.root().create(vec![]).unwrap();
    let other = rt.root().create(vec![]).unwrap();

    let hash = object.call("hash", vec![]).unwrap();
    assert!(matches!(hash, Value::Int(_)));
    assert_eq!(object.call("hash", vec![]).unwrap(), hash);
    assert_ne!(other.call("hash", vec![]).unwrap(), hash);
    assert_eq!(hash, Value::Int(object.hash() as i64));
}

#[test]
fn test_to_string_names_class_and_hash() {
    let rt = Runtime::new();
    let widget = rt.class("Widget").build().unwrap();
    let object = widget.create(vec![]).unwrap();

    let expected = format!("Widget@{:x}", object.hash());
    assert_eq!(object.to_string(), expected);
    assert_eq!(object.call("to_string", vec![]).unwrap(), Value::from(expected));
}

#[test]
fn test_builtins_can_be_overridden() {
    let rt = Runtime::new();
    let named = rt
        .class("Named")
        .definition(Definition::new().method("to_string", Method::new(|_| Ok("named".into()))))
        .build()
        .unwrap();

    let object = named.create(vec![]).unwrap();
    assert_eq!(object.call("to_string", vec![]).unwrap(), Value::from("named"));
}

// =============================================================================
// instance_of
// =============================================================================

struct Kinship {
    module_a: Module,
    module_b: Module,
    module_c: Module,
    parent: Class,
    child: Class,
    other: Class,
    root: Class,
    child_object: Instance,
}

fn kinship() -> Kinship {
    let rt = Runtime::new();
    let module_a = rt.module("ModuleA").build().unwrap();
    let module_b = rt
        .module("ModuleB")
        .definition(Definition::new().include(&module_a))
        .build()
        .unwrap();
    let module_c = rt.module("ModuleC").build().unwrap();
    let parent = rt
        .class("Parent")
        .definition(Definition::new().include(&module_b))
        .build()
        .unwrap();
    let child = rt.class("Child").extends(&parent).build().unwrap();
    let other = rt.class("Other").build().unwrap();
    let child_object = child.create(vec![]).unwrap();

    Kinship {
        module_a,
        module_b,
        module_c,
        parent,
        child,
        other,
        root: rt.root(),
        child_object,
    }
}

#[test]
fn test_instance_of_classes() {
    let k = kinship();
    assert!(k.child_object.instance_of(k.child.id()).unwrap());
    assert!(k.child_object.instance_of(k.parent.id()).unwrap());
    assert!(k.child_object.instance_of(k.root.id()).unwrap());
    assert!(!k.child_object.instance_of(k.other.id()).unwrap());
}

#[test]
fn test_instance_of_modules() {
    let k = kinship();
    assert!(k.child_object.instance_of(k.module_a.id()).unwrap());
    assert!(k.child_object.instance_of(k.module_b.id()).unwrap());
    assert!(!k.child_object.instance_of(k.module_c.id()).unwrap());

    k.child.include(&k.module_c).unwrap();
    assert!(k.child_object.instance_of(k.module_c.id()).unwrap());
}

#[test]
fn test_instance_of_builtin() {
    let k = kinship();
    assert_eq!(
        k.child_object
            .call("instance_of", vec![k.module_a.id().into()])
            .unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        k.child_object
            .call("instance_of", vec![k.other.id().into()])
            .unwrap(),
        Value::Bool(false)
    );
}

// =============================================================================
// Bound methods
// =============================================================================

fn person(rt: &Runtime) -> (Class, Instance) {
    let mixin = rt
        .anonymous_module()
        .definition(Definition::new().method("mixinMethod", Method::new(|_| Ok(Value::Void))))
        .build()
        .unwrap();
    let person = rt
        .class("Person")
        .definition(
            Definition::new()
                .include(&mixin)
                .method(
                    "initialize",
                    Method::new(|ctx| {
                        ctx.this()?.set("_name", ctx.arg::<String>(0)?);
                        Ok(Value::Void)
                    }),
                )
                .method(
                    "getName",
                    Method::new(|ctx| Ok(ctx.this()?.field("_name").unwrap_or_default())),
                )
                .method("otherMethod", Method::new(|_| Ok("woop".into()))),
        )
        .build()
        .unwrap();
    let torin = person.create(vec![Value::from("Torin")]).unwrap();
    (person, torin)
}

#[test]
fn test_bound_method_is_reused() {
    let rt = Runtime::new();
    let (_, torin) = person(&rt);

    let first = torin.bound_method("getName").unwrap();
    let second = torin.bound_method("getName").unwrap();
    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&torin.bound_method("otherMethod").unwrap()));
    assert!(torin.bound_method("mixinMethod").is_ok());
}

#[test]
fn test_bound_method_keeps_its_receiver() {
    let rt = Runtime::new();
    let (_, torin) = person(&rt);

    let get_name = torin.bound_method("getName").unwrap();
    assert!(get_name.receiver().equals(&torin));
    assert_eq!(get_name.call(vec![]).unwrap(), Value::from("Torin"));
}

#[test]
fn test_instance_override_renews_bound_method() {
    let rt = Runtime::new();
    let (_, torin) = person(&rt);
    let get_name = torin.bound_method("getName").unwrap();

    torin.set("getName", Method::new(|_| Ok("NOT TORIN!".into())));

    assert_eq!(get_name.call(vec![]).unwrap(), Value::from("Torin"));
    let renewed = torin.bound_method("getName").unwrap();
    assert!(!renewed.ptr_eq(&get_name));
    assert_eq!(renewed.call(vec![]).unwrap(), Value::from("NOT TORIN!"));
    assert_eq!(torin.call("getName", vec![]).unwrap(), Value::from("NOT TORIN!"));
}

#[test]
fn test_class_redefinition_renews_bound_method() {
    let rt = Runtime::new();
    let (person_class, torin) = person(&rt);
    let get_name = torin.bound_method("getName").unwrap();

    person_class
        .define(Definition::new().method("getName", Method::new(|_| Ok("NOT TORIN!".into()))))
        .unwrap();

    assert_eq!(get_name.call(vec![]).unwrap(), Value::from("Torin"));
    let renewed = torin.bound_method("getName").unwrap();
    assert!(!renewed.ptr_eq(&get_name));
    assert_eq!(renewed.call(vec![]).unwrap(), Value::from("NOT TORIN!"));
}

#[test]
fn test_bound_method_for_missing_member() {
    let rt = Runtime::new();
    let (_, torin) = person(&rt);
    assert!(torin.bound_method("fly").unwrap_err().is_member_not_found());
}

// =============================================================================
// Instance-level overrides
// =============================================================================

#[test]
fn test_instance_override_can_call_the_class_winner() {
    let rt = Runtime::new();
    let greeter = rt
        .class("Greeter")
        .definition(Definition::new().method("greet", Method::new(|_| Ok("hello".into()))))
        .build()
        .unwrap();
    let loud = greeter.create(vec![]).unwrap();
    let quiet = greeter.create(vec![]).unwrap();

    loud.set(
        "greet",
        Method::cooperative(|ctx| Ok(format!("{}!", ctx.call_next()?).into())),
    );

    assert_eq!(loud.call("greet", vec![]).unwrap(), Value::from("hello!"));
    assert_eq!(quiet.call("greet", vec![]).unwrap(), Value::from("hello"));
    assert!(loud.method("greet").unwrap().is_instance_override());

    loud.remove("greet");
    assert_eq!(loud.call("greet", vec![]).unwrap(), Value::from("hello"));
}

/// Builds a class on a throwaway runtime and hands back only an instance.
fn detached_greeter() -> Instance {
    let rt = Runtime::new();
    rt.class("Greeter")
        .definition(Definition::new().method("hello", Method::new(|_| Ok("hello".into()))))
        .build()
        .unwrap()
        .create(vec![])
        .unwrap()
}

#[test]
fn test_instance_keeps_its_runtime_alive() {
    let greeter = detached_greeter();

    assert_eq!(greeter.call("hello", vec![]).unwrap(), Value::from("hello"));
    assert!(greeter.to_string().starts_with("Greeter@"));
    assert_eq!(greeter.class().unwrap().name(), "Greeter");
    assert_eq!(
        greeter.bound_method("hello").unwrap().call(vec![]).unwrap(),
        Value::from("hello")
    );
}
