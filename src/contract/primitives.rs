//! Fixed XSD-compatible primitive classification.
//!
//! Every primitive a contract can carry maps to exactly one wire name in
//! either the XML Schema namespace or the serialization namespace. The
//! mapping is fixed by the wire format and never configurable.

use strum::Display;

use crate::wire::{SERIALIZATION_NS, XSD_NS};

/// The set of primitive wire types.
///
/// Wire names follow the XSD vocabulary (`int`, `string`, `boolean`,
/// `dateTime`, ...). `char`, `duration` and `guid` are not XSD built-ins and
/// live in the serialization namespace instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum XsdPrimitive {
    /// `boolean`
    Boolean,
    /// `byte` - 8-bit signed
    Byte,
    /// `unsignedByte` - 8-bit unsigned
    UnsignedByte,
    /// `short` - 16-bit signed
    Short,
    /// `unsignedShort` - 16-bit unsigned
    UnsignedShort,
    /// `int` - 32-bit signed
    Int,
    /// `unsignedInt` - 32-bit unsigned
    UnsignedInt,
    /// `long` - 64-bit signed
    Long,
    /// `unsignedLong` - 64-bit unsigned
    UnsignedLong,
    /// `float` - 32-bit IEEE
    Float,
    /// `double` - 64-bit IEEE
    Double,
    /// `decimal` - exact decimal text
    Decimal,
    /// `string`
    String,
    /// `char` - UTF-16 code unit, serialization namespace
    Char,
    /// `dateTime`
    DateTime,
    /// `duration` - ISO-8601 duration, serialization namespace
    Duration,
    /// `guid` - serialization namespace
    Guid,
    /// `anyURI`
    AnyUri,
    /// `base64Binary`
    Base64Binary,
    /// `anyType` - polymorphic root for heterogeneous collections
    AnyType,
}

/// All primitives in registration order.
///
/// The registry seeds its cache from this slice, so the position of each
/// primitive here is also its [`crate::contract::TypeHandle`] index.
pub const ALL_PRIMITIVES: &[XsdPrimitive] = &[
    XsdPrimitive::Boolean,
    XsdPrimitive::Byte,
    XsdPrimitive::UnsignedByte,
    XsdPrimitive::Short,
    XsdPrimitive::UnsignedShort,
    XsdPrimitive::Int,
    XsdPrimitive::UnsignedInt,
    XsdPrimitive::Long,
    XsdPrimitive::UnsignedLong,
    XsdPrimitive::Float,
    XsdPrimitive::Double,
    XsdPrimitive::Decimal,
    XsdPrimitive::String,
    XsdPrimitive::Char,
    XsdPrimitive::DateTime,
    XsdPrimitive::Duration,
    XsdPrimitive::Guid,
    XsdPrimitive::AnyUri,
    XsdPrimitive::Base64Binary,
    XsdPrimitive::AnyType,
];

impl XsdPrimitive {
    /// The fixed wire name of this primitive
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            XsdPrimitive::Boolean => "boolean",
            XsdPrimitive::Byte => "byte",
            XsdPrimitive::UnsignedByte => "unsignedByte",
            XsdPrimitive::Short => "short",
            XsdPrimitive::UnsignedShort => "unsignedShort",
            XsdPrimitive::Int => "int",
            XsdPrimitive::UnsignedInt => "unsignedInt",
            XsdPrimitive::Long => "long",
            XsdPrimitive::UnsignedLong => "unsignedLong",
            XsdPrimitive::Float => "float",
            XsdPrimitive::Double => "double",
            XsdPrimitive::Decimal => "decimal",
            XsdPrimitive::String => "string",
            XsdPrimitive::Char => "char",
            XsdPrimitive::DateTime => "dateTime",
            XsdPrimitive::Duration => "duration",
            XsdPrimitive::Guid => "guid",
            XsdPrimitive::AnyUri => "anyURI",
            XsdPrimitive::Base64Binary => "base64Binary",
            XsdPrimitive::AnyType => "anyType",
        }
    }

    /// The namespace the wire name lives in
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            XsdPrimitive::Char | XsdPrimitive::Duration | XsdPrimitive::Guid => SERIALIZATION_NS,
            _ => XSD_NS,
        }
    }

    /// Reverse lookup of a wire name within its expected namespace
    #[must_use]
    pub fn from_wire(name: &str, namespace: &str) -> Option<Self> {
        ALL_PRIMITIVES
            .iter()
            .copied()
            .find(|p| p.wire_name() == name && p.namespace() == namespace)
    }
}
