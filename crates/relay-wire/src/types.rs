//! The closed set of wire-representable types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of values a service method may accept or return.
///
/// The set is closed: a schema type name that does not resolve to one of
/// these kinds is rejected when the descriptor is built, never at runtime.
///
/// `Byte` and `Short` have no wire representation of their own. They travel
/// as `Int32` and are narrowed by the receiving side (see [`crate::marshal`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Bool,
    Byte,
    Short,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    /// A structured JSON object.
    Object,
    /// A structured JSON array.
    Array,
}

impl TypeKind {
    /// Every kind, in declaration order.
    pub const ALL: [TypeKind; 10] = [
        TypeKind::Bool,
        TypeKind::Byte,
        TypeKind::Short,
        TypeKind::Int32,
        TypeKind::Int64,
        TypeKind::Float32,
        TypeKind::Float64,
        TypeKind::String,
        TypeKind::Object,
        TypeKind::Array,
    ];

    /// Resolve a schema type name to a kind.
    ///
    /// Accepts the canonical names (`bool`, `byte`, `short`, `i32`, `i64`,
    /// `f32`, `f64`, `string`, `object`, `array`) plus the common aliases
    /// seen in interface schemas. Returns `None` for anything outside the
    /// closed set.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bool" | "boolean" => Some(TypeKind::Bool),
            "byte" | "i8" => Some(TypeKind::Byte),
            "short" | "i16" => Some(TypeKind::Short),
            "int" | "int32" | "i32" => Some(TypeKind::Int32),
            "long" | "int64" | "i64" => Some(TypeKind::Int64),
            "float" | "float32" | "f32" => Some(TypeKind::Float32),
            "double" | "float64" | "f64" => Some(TypeKind::Float64),
            "string" => Some(TypeKind::String),
            "object" => Some(TypeKind::Object),
            "array" => Some(TypeKind::Array),
            _ => None,
        }
    }

    /// The canonical schema name for this kind.
    #[must_use]
    pub fn schema_name(&self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Byte => "byte",
            TypeKind::Short => "short",
            TypeKind::Int32 => "i32",
            TypeKind::Int64 => "i64",
            TypeKind::Float32 => "f32",
            TypeKind::Float64 => "f64",
            TypeKind::String => "string",
            TypeKind::Object => "object",
            TypeKind::Array => "array",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}
