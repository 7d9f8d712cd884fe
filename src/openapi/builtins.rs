//! Type descriptor table: builtin types to schema fragments, everything else to a `$ref`.

use crate::model::{Builtin, TypeRef};
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Ref, Schema, SchemaFormat, SchemaType, Type};
use utoipa::openapi::RefOr;

fn scalar(ty: Type, format: Option<&str>) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(SchemaType::Type(ty))
        .format(format.map(|f| SchemaFormat::Custom(f.to_string())))
}

fn builtin(b: Builtin) -> ObjectBuilder {
    match b {
        Builtin::Boolean => scalar(Type::Boolean, None),
        Builtin::UInt8 => scalar(Type::Integer, Some("uint8")),
        Builtin::UInt16 => scalar(Type::Integer, Some("uint16")),
        Builtin::UInt32 => scalar(Type::Integer, Some("uint32")),
        Builtin::UInt64 => scalar(Type::Integer, Some("uint64")),
        Builtin::Int8 => scalar(Type::Integer, Some("int8")),
        Builtin::Int16 => scalar(Type::Integer, Some("int16")),
        Builtin::Int32 => scalar(Type::Integer, Some("int32")),
        Builtin::Int64 => scalar(Type::Integer, Some("int64")),
        Builtin::Float => scalar(Type::Number, Some("float")),
        Builtin::Double => scalar(Type::Number, Some("double")),
        Builtin::Number => scalar(Type::Number, None),
        Builtin::String => scalar(Type::String, None),
        Builtin::Object => scalar(Type::Object, None),
    }
}

/// `{}`: accepts any value.
fn unconstrained() -> RefOr<Schema> {
    ObjectBuilder::new().schema_type(SchemaType::AnyValue).build().into()
}

/// Resolve a type to its inline fragment, or a reference to `#/components/schemas/<Name>`.
///
/// Unknown names are never an error; they resolve by name when the document is read.
pub fn schema_for(ty: &TypeRef) -> RefOr<Schema> {
    described(ty, None)
}

/// As [`schema_for`], with a description attached to inline fragments.
pub fn described(ty: &TypeRef, description: Option<&str>) -> RefOr<Schema> {
    let description = description.map(str::to_string);
    match ty {
        TypeRef::Builtin(b) => builtin(*b).description(description).build().into(),
        TypeRef::Array(item) => {
            let items = item.as_deref().map(schema_for).unwrap_or_else(unconstrained);
            ArrayBuilder::new().items(items).description(description).build().into()
        }
        // OpenAPI 3.0 ignores siblings of `$ref`, so a reference carries no description.
        TypeRef::Named(name) => RefOr::Ref(Ref::from_schema_name(name.as_str())),
    }
}
