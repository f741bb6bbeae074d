use std::fmt;

use bitflags::bitflags;
use strum::Display;

use crate::contract::XsdPrimitive;

/// A handle identifying a registered data contract.
///
/// Handles are indices into the [`crate::contract::ContractRegistry`]; they are
/// cheap to copy, stable for the lifetime of the registry, and are the only way
/// the engine refers to a runtime type. Graph nodes, member declarations and
/// known-type sets all carry handles, never contract objects.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    /// Creates a new handle from a raw index
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeHandle(value)
    }

    /// Returns the raw index value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for TypeHandle {
    fn from(value: u32) -> Self {
        TypeHandle(value)
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A qualified wire name - local name plus namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QName {
    /// Local element name
    pub name: String,
    /// Namespace URI (may be empty)
    pub namespace: String,
}

impl QName {
    /// Creates a qualified name from a local name and namespace URI
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        QName {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// True if this qname matches the given local name and namespace
    #[must_use]
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace == namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.name)
        }
    }
}

bitflags! {
    /// Per-member behavior flags.
    ///
    /// `GET`/`SET` describe the accessor capability of the member; `EMIT_DEFAULT`
    /// controls whether a default-valued optional member is written at all;
    /// `IS_REQUIRED` forces emission on write and makes absence on read a hard
    /// error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemberFlags: u8 {
        /// Member must be present on the wire; absence on read is an error
        const IS_REQUIRED = 0x01;
        /// Emit the member even when its value equals the type default
        const EMIT_DEFAULT = 0x02;
        /// Member value can be read from the instance
        const GET = 0x04;
        /// Member value can be written into the instance
        const SET = 0x08;
    }
}

impl Default for MemberFlags {
    fn default() -> Self {
        MemberFlags::EMIT_DEFAULT | MemberFlags::GET | MemberFlags::SET
    }
}

/// A single serializable member of a class/struct contract.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMember {
    /// Wire name of the member element
    pub name: String,
    /// Declared type of the member
    pub ty: TypeHandle,
    /// Explicit wire order; `-1` means declaration order
    pub order: i32,
    /// Behavior flags
    pub flags: MemberFlags,
}

impl DataMember {
    /// Creates a member with default flags and declaration order
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeHandle) -> Self {
        DataMember {
            name: name.into(),
            ty,
            order: -1,
            flags: MemberFlags::default(),
        }
    }

    /// True if this member must appear on the wire
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.flags.contains(MemberFlags::IS_REQUIRED)
    }

    /// True if a default-valued instance of this member is still emitted
    #[must_use]
    pub fn emit_default(&self) -> bool {
        self.flags.contains(MemberFlags::EMIT_DEFAULT)
    }
}

/// Classification of a data contract.
///
/// Classification happens once, at registration time, in the order primitive,
/// enum, collection/dictionary, class/struct. A type that claims to be
/// serializable but lacks a required capability classifies as `Invalid`; that
/// is not an error by itself - it becomes one only when a non-empty instance
/// of it is serialized or deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContractKind {
    /// Known primitive with a fixed XSD-compatible wire name
    Primitive(XsdPrimitive),
    /// Enum with member-name based wire representation
    Enum,
    /// Sequence of homogeneous items with a wrapper element
    Collection,
    /// Sequence of key/value entries
    Dictionary,
    /// Class or struct with ordered data members
    ClassOrStruct,
    /// Claims serializability but lacks a required capability
    Invalid,
}

/// Item shape of a collection or dictionary contract.
///
/// Wire names default to the `ArrayOf{T}` / `KeyValueOf{K}{V}` / `Key` /
/// `Value` conventions but may be overridden by the contract; overrides apply
/// uniformly to both write and read.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionShape {
    /// Homogeneous item sequence
    Items {
        /// Declared item type
        item_ty: TypeHandle,
        /// Per-item element name
        item_name: String,
    },
    /// Key/value entry sequence
    Entries {
        /// Declared key type
        key_ty: TypeHandle,
        /// Declared value type
        value_ty: TypeHandle,
        /// Per-entry element name
        entry_name: String,
        /// Key child element name
        key_name: String,
        /// Value child element name
        value_name: String,
    },
}

impl CollectionShape {
    /// The per-item (or per-entry) element name
    #[must_use]
    pub fn item_name(&self) -> &str {
        match self {
            CollectionShape::Items { item_name, .. } => item_name,
            CollectionShape::Entries { entry_name, .. } => entry_name,
        }
    }
}

/// The serialization-relevant metadata for one runtime type.
///
/// Built once per distinct type via [`crate::contract::ContractBuilder`],
/// cached in the registry for its lifetime and immutable afterwards. The
/// `members` vector is already flattened into final wire order: base-class
/// members before derived members, and within one declaration level,
/// declaration order unless an explicit `order` overrides it. That order
/// never changes across calls.
#[derive(Debug, Clone)]
pub struct DataContract {
    /// Registry handle of this contract
    pub handle: TypeHandle,
    /// Wire name and namespace of the root/type element
    pub wire_name: QName,
    /// Classification
    pub kind: ContractKind,
    /// Members in final wire order (flattened base chain)
    pub members: Vec<DataMember>,
    /// Base contract, if any
    pub base: Option<TypeHandle>,
    /// Participates in default-mode reference tracking (`z:Id`/`z:Ref`)
    pub is_reference: bool,
    /// Enum contract serializes as space-separated member names
    pub flags_enum: bool,
    /// Named values of an enum contract, in declaration order
    pub enum_values: Vec<(String, i64)>,
    /// Item shape for collection/dictionary contracts
    pub shape: Option<CollectionShape>,
    /// Unknown child elements are captured into an extension bag on read
    pub supports_extension: bool,
}

impl DataContract {
    /// Look up a member by wire name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&DataMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Look up the numeric value of a named enum member
    #[must_use]
    pub fn enum_value(&self, name: &str) -> Option<i64> {
        self.enum_values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Look up the name of an exact enum value
    #[must_use]
    pub fn enum_name(&self, value: i64) -> Option<&str> {
        self.enum_values
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.as_str())
    }

    /// Returns the fully qualified wire name for diagnostics
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("{}", self.wire_name)
    }
}

/// Sorts a contract's own members into wire order.
///
/// Stable sort by explicit order key; members without an explicit order
/// (`-1`) keep their declaration positions ahead of ordered members.
pub(crate) fn sort_members(members: &mut [DataMember]) {
    members.sort_by_key(|m| m.order);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip() {
        let handle = TypeHandle::new(7);
        assert_eq!(handle.value(), 7);
        let from: TypeHandle = 7u32.into();
        assert_eq!(handle, from);
        assert_eq!(format!("{}", handle), "#7");
    }

    #[test]
    fn test_qname_is() {
        let q = QName::new("Person", "http://example.org");
        assert!(q.is("Person", "http://example.org"));
        assert!(!q.is("Person", ""));
        assert_eq!(format!("{}", q), "{http://example.org}Person");
        assert_eq!(format!("{}", QName::new("int", "")), "int");
    }

    #[test]
    fn test_member_flags_default() {
        let m = DataMember::new("Name", TypeHandle::new(0));
        assert!(!m.is_required());
        assert!(m.emit_default());
        assert!(m.flags.contains(MemberFlags::GET | MemberFlags::SET));
        assert_eq!(m.order, -1);
    }

    #[test]
    fn test_sort_members_stable() {
        let h = TypeHandle::new(0);
        let mut members = vec![
            DataMember {
                order: 2,
                ..DataMember::new("C", h)
            },
            DataMember::new("A", h),
            DataMember {
                order: 1,
                ..DataMember::new("B", h)
            },
            DataMember::new("D", h),
        ];
        sort_members(&mut members);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "D", "B", "C"]);
    }
}
