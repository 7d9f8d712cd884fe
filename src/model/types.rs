//! Type references: builtin primitives or named components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Builtin semantic types with a fixed wire-schema mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Boolean,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Number,
    String,
    Object,
}

/// Flat lookup table keyed by canonical name.
const BUILTINS: &[(&str, Builtin)] = &[
    ("Boolean", Builtin::Boolean),
    ("UInt8", Builtin::UInt8),
    ("UInt16", Builtin::UInt16),
    ("UInt32", Builtin::UInt32),
    ("UInt64", Builtin::UInt64),
    ("Int8", Builtin::Int8),
    ("Int16", Builtin::Int16),
    ("Int32", Builtin::Int32),
    ("Int64", Builtin::Int64),
    ("Float", Builtin::Float),
    ("Double", Builtin::Double),
    ("Number", Builtin::Number),
    ("String", Builtin::String),
    ("Object", Builtin::Object),
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        BUILTINS.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
    }

    pub fn name(self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, b)| *b == self)
            .map(|(n, _)| *n)
            .unwrap_or("Object")
    }
}

/// A type descriptor: builtin, array of an optional element type, or a reference to a component by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Builtin(Builtin),
    Array(Option<Box<TypeRef>>),
    Named(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array_of(item: impl Into<TypeRef>) -> Self {
        TypeRef::Array(Some(Box::new(item.into())))
    }

    /// `Array` with unconstrained items.
    pub fn array() -> Self {
        TypeRef::Array(None)
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        TypeRef::Builtin(Builtin::Object)
    }
}

impl From<Builtin> for TypeRef {
    fn from(b: Builtin) -> Self {
        TypeRef::Builtin(b)
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        parse_type_ref(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Builtin(b) => f.write_str(b.name()),
            TypeRef::Array(None) => f.write_str("Array"),
            TypeRef::Array(Some(item)) => write!(f, "Array<{}>", item),
            TypeRef::Named(n) => f.write_str(n),
        }
    }
}

impl FromStr for TypeRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("type name must not be empty".into());
        }
        if s.starts_with("Array<") && !s.ends_with('>') {
            return Err(format!("unterminated array type: {}", s));
        }
        Ok(parse_type_ref(s))
    }
}

impl TryFrom<String> for TypeRef {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeRef> for String {
    fn from(t: TypeRef) -> Self {
        t.to_string()
    }
}

fn parse_type_ref(s: &str) -> TypeRef {
    let s = s.trim();
    if s == "Array" {
        return TypeRef::Array(None);
    }
    if let Some(inner) = s.strip_prefix("Array<").and_then(|r| r.strip_suffix('>')) {
        let inner = inner.trim();
        if inner.is_empty() {
            return TypeRef::Array(None);
        }
        return TypeRef::Array(Some(Box::new(parse_type_ref(inner))));
    }
    match Builtin::from_name(s) {
        Some(b) => TypeRef::Builtin(b),
        None => TypeRef::Named(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtins_arrays_and_names() {
        assert_eq!("UInt8".parse::<TypeRef>().unwrap(), TypeRef::Builtin(Builtin::UInt8));
        assert_eq!("Array".parse::<TypeRef>().unwrap(), TypeRef::Array(None));
        assert_eq!(
            "Array<Study>".parse::<TypeRef>().unwrap(),
            TypeRef::array_of(TypeRef::named("Study"))
        );
        assert_eq!(
            "Array<Array<Int32>>".parse::<TypeRef>().unwrap(),
            TypeRef::array_of(TypeRef::array_of(Builtin::Int32))
        );
        assert_eq!("Widget".parse::<TypeRef>().unwrap(), TypeRef::named("Widget"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!("".parse::<TypeRef>().is_err());
        assert!("Array<Study".parse::<TypeRef>().is_err());
    }

    #[test]
    fn display_is_the_textual_form() {
        for text in ["Boolean", "Array", "Array<Study>", "Identifier"] {
            assert_eq!(text.parse::<TypeRef>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn serde_uses_the_textual_form() {
        let t: TypeRef = serde_json::from_str("\"Array<Double>\"").unwrap();
        assert_eq!(t, TypeRef::array_of(Builtin::Double));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Array<Double>\"");
    }
}
