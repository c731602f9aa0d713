//! Member naming conventions shared by the registry and the runtime.

/// Reserved definition key that delegates to module inclusion.
pub const INCLUDES_KEY: &str = "includes";

/// Reserved definition key whose entries are installed on the type object.
pub const STATICS_KEY: &str = "statics";

/// Values stored in a member table.
///
/// The registry only needs to know whether a definition can be called; the
/// payload itself is opaque to linearization and resolution.
pub trait MemberValue: Clone {
    /// True if this definition is a method rather than plain data.
    fn is_callable(&self) -> bool;
}

/// Check whether a definition key is reserved.
#[inline]
pub fn is_reserved_key(key: &str) -> bool {
    key == INCLUDES_KEY || key == STATICS_KEY
}

/// Check whether a member name is private under the given prefix.
///
/// Private members still resolve and dispatch normally; they are only left
/// out of public method listings.
#[inline]
pub fn is_private_name(name: &str, prefix: char) -> bool {
    name.starts_with(prefix)
}

/// Display label given to a callable member, e.g. `Player.update()`.
pub fn display_label(type_name: &str, member: &str) -> String {
    format!("{type_name}.{member}()")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keys() {
        assert!(is_reserved_key("includes"));
        assert!(is_reserved_key("statics"));
        assert!(!is_reserved_key("include"));
        assert!(!is_reserved_key("method"));
    }

    #[test]
    fn private_names() {
        assert!(is_private_name("_secret", '_'));
        assert!(!is_private_name("open", '_'));
        assert!(is_private_name("#hidden", '#'));
    }

    #[test]
    fn labels() {
        assert_eq!(display_label("MyClass", "methodOne"), "MyClass.methodOne()");
    }
}
