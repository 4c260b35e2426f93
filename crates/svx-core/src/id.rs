use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner for element ids, class names and selector tags.
///
/// Interning is append-only and thread-safe, so documents parsed on
/// different threads share it without coordination.
///
/// Strings are never freed: every distinct id and class name seen by any
/// document stays interned for the life of the process. A long-running
/// process that parses many untrusted documents grows this table without
/// bound.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned string used for `id` values, class names and tag names.
/// 4 bytes, Copy, Eq and Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Spur);

impl Atom {
    /// Intern a string, or return the existing atom if already interned.
    pub fn intern(s: &str) -> Self {
        Atom(INTERNER.get_or_intern(s))
    }

    /// Look up an atom without interning. `None` means no document or
    /// stylesheet has ever used this string, so nothing can match it.
    pub fn get(s: &str) -> Option<Self> {
        INTERNER.get(s).map(Atom)
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Atom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Atom::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_same_atom() {
        let a = Atom::intern("logo");
        let b = Atom::intern("logo");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "logo");
    }

    #[test]
    fn get_does_not_intern() {
        assert!(Atom::get("never-interned-class-name-9f1c").is_none());
        let a = Atom::intern("interned-once");
        assert_eq!(Atom::get("interned-once"), Some(a));
    }

    #[test]
    fn names_outlive_their_document() {
        let doc = crate::parse_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="short-lived-3b7e"/></svg>"#,
            &crate::Config::default(),
        )
        .unwrap();
        drop(doc);
        assert_eq!(Atom::get("short-lived-3b7e").map(|a| a.as_str()), Some("short-lived-3b7e"));
    }
}
