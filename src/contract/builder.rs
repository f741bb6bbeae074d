use crate::{
    contract::{
        descriptor::sort_members, CollectionShape, ContractKind, ContractRegistry, DataContract,
        DataMember, MemberFlags, QName, TypeHandle,
    },
    wire::ARRAYS_NS,
    Error, Result,
};

/// What the builder is constructing; refined into [`ContractKind`] at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderKind {
    Class,
    Enum,
    Collection,
    Dictionary,
    Invalid,
}

/// Builder for [`DataContract`] descriptors.
///
/// Classification is decided by the constructor used: [`ContractBuilder::class`],
/// [`ContractBuilder::enumeration`], [`ContractBuilder::collection`],
/// [`ContractBuilder::dictionary`] or [`ContractBuilder::invalid`]. Collection
/// and dictionary wire names are synthesized from the item contracts
/// (`ArrayOf{T}`, `KeyValueOf{K}{V}`) unless overridden; overrides apply to
/// write and read alike.
///
/// # Examples
///
/// ```rust
/// use dcxml::contract::{ContractBuilder, ContractRegistry};
///
/// let registry = ContractRegistry::new();
/// let person = registry.register(
///     ContractBuilder::class("Person", "http://schemas.datacontract.org/2004/07/Test")
///         .member("Name", registry.string())
///         .member("Age", registry.int()),
/// )?;
/// assert!(registry.get(person).is_some());
/// # Ok::<(), dcxml::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    kind: BuilderKind,
    name: Option<String>,
    namespace: Option<String>,
    members: Vec<DataMember>,
    base: Option<TypeHandle>,
    is_reference: bool,
    flags_enum: bool,
    enum_values: Vec<(String, i64)>,
    item_ty: Option<TypeHandle>,
    key_ty: Option<TypeHandle>,
    value_ty: Option<TypeHandle>,
    item_name: Option<String>,
    key_name: Option<String>,
    value_name: Option<String>,
    supports_extension: bool,
}

impl ContractBuilder {
    fn empty(kind: BuilderKind) -> Self {
        ContractBuilder {
            kind,
            name: None,
            namespace: None,
            members: Vec::new(),
            base: None,
            is_reference: false,
            flags_enum: false,
            enum_values: Vec::new(),
            item_ty: None,
            key_ty: None,
            value_ty: None,
            item_name: None,
            key_name: None,
            value_name: None,
            supports_extension: false,
        }
    }

    /// Starts a class/struct contract with an explicit wire name
    #[must_use]
    pub fn class(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut builder = Self::empty(BuilderKind::Class);
        builder.name = Some(name.into());
        builder.namespace = Some(namespace.into());
        builder
    }

    /// Starts an enum contract with an explicit wire name
    #[must_use]
    pub fn enumeration(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut builder = Self::empty(BuilderKind::Enum);
        builder.name = Some(name.into());
        builder.namespace = Some(namespace.into());
        builder
    }

    /// Starts a collection contract over the given item type.
    ///
    /// Without overrides the wrapper is named `ArrayOf{Item}` in the arrays
    /// namespace and each item element carries the item contract's own name.
    #[must_use]
    pub fn collection(item_ty: TypeHandle) -> Self {
        let mut builder = Self::empty(BuilderKind::Collection);
        builder.item_ty = Some(item_ty);
        builder
    }

    /// Starts a dictionary contract over the given key and value types.
    #[must_use]
    pub fn dictionary(key_ty: TypeHandle, value_ty: TypeHandle) -> Self {
        let mut builder = Self::empty(BuilderKind::Dictionary);
        builder.key_ty = Some(key_ty);
        builder.value_ty = Some(value_ty);
        builder
    }

    /// Starts an `Invalid` contract: a type that claims serializability but
    /// lacks a required capability. Registration succeeds; only a non-empty
    /// instance errors.
    #[must_use]
    pub fn invalid(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut builder = Self::empty(BuilderKind::Invalid);
        builder.name = Some(name.into());
        builder.namespace = Some(namespace.into());
        builder
    }

    /// Adds a data member with default flags, in declaration order
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, ty: TypeHandle) -> Self {
        self.members.push(DataMember::new(name, ty));
        self
    }

    /// Adds a data member with explicit order and flags
    #[must_use]
    pub fn member_with(
        mut self,
        name: impl Into<String>,
        ty: TypeHandle,
        order: i32,
        flags: MemberFlags,
    ) -> Self {
        self.members.push(DataMember {
            name: name.into(),
            ty,
            order,
            flags,
        });
        self
    }

    /// Sets the base contract; base members precede this contract's members
    /// on the wire
    #[must_use]
    pub fn base(mut self, base: TypeHandle) -> Self {
        self.base = Some(base);
        self
    }

    /// Marks the contract as participating in default-mode reference tracking
    #[must_use]
    pub fn as_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    /// Marks the enum as a flags enum (space-separated member names)
    #[must_use]
    pub fn flags(mut self) -> Self {
        self.flags_enum = true;
        self
    }

    /// Adds a named enum value, in declaration order
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.enum_values.push((name.into(), value));
        self
    }

    /// Overrides the wire name (collection/dictionary wrapper)
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the wire namespace
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Overrides the per-item (or per-entry) element name
    #[must_use]
    pub fn item_named(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    /// Overrides the dictionary key/value child element names
    #[must_use]
    pub fn entry_named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_name = Some(key.into());
        self.value_name = Some(value.into());
        self
    }

    /// Enables the extension-data bag for unknown child elements
    #[must_use]
    pub fn with_extension_data(mut self) -> Self {
        self.supports_extension = true;
        self
    }

    /// Resolves the builder into a descriptor. Called by
    /// [`ContractRegistry::register`], which owns handle allocation and
    /// duplicate detection.
    pub(crate) fn build(
        self,
        registry: &ContractRegistry,
        handle: TypeHandle,
    ) -> Result<DataContract> {
        match self.kind {
            BuilderKind::Class => self.build_class(registry, handle),
            BuilderKind::Enum => self.build_enum(handle),
            BuilderKind::Collection => self.build_collection(registry, handle),
            BuilderKind::Dictionary => self.build_dictionary(registry, handle),
            BuilderKind::Invalid => Ok(DataContract {
                handle,
                wire_name: QName::new(
                    self.name.unwrap_or_default(),
                    self.namespace.unwrap_or_default(),
                ),
                kind: ContractKind::Invalid,
                members: Vec::new(),
                base: None,
                is_reference: false,
                flags_enum: false,
                enum_values: Vec::new(),
                shape: None,
                supports_extension: false,
            }),
        }
    }

    fn build_class(self, registry: &ContractRegistry, handle: TypeHandle) -> Result<DataContract> {
        let mut members = Vec::new();
        if let Some(base) = self.base {
            let base_contract = registry.contract_of(base)?;
            if base_contract.kind != ContractKind::ClassOrStruct {
                return Err(Error::ContractViolation(format!(
                    "base contract '{}' is not a class",
                    base_contract.fullname()
                )));
            }
            // Base chain is already flattened in the base contract
            members.extend(base_contract.members.iter().cloned());
        }

        // Member types resolve lazily at use, so self- and mutually-recursive
        // contracts can be declared against reserved handles
        let mut own = self.members;
        sort_members(&mut own);
        members.extend(own);

        for (i, member) in members.iter().enumerate() {
            if members[..i].iter().any(|m| m.name == member.name) {
                return Err(Error::DuplicateMember {
                    member: member.name.clone(),
                });
            }
        }

        Ok(DataContract {
            handle,
            wire_name: QName::new(
                self.name.unwrap_or_default(),
                self.namespace.unwrap_or_default(),
            ),
            kind: ContractKind::ClassOrStruct,
            members,
            base: self.base,
            is_reference: self.is_reference,
            flags_enum: false,
            enum_values: Vec::new(),
            shape: None,
            supports_extension: self.supports_extension,
        })
    }

    fn build_enum(self, handle: TypeHandle) -> Result<DataContract> {
        for (i, (name, _)) in self.enum_values.iter().enumerate() {
            if self.enum_values[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::DuplicateMember {
                    member: name.clone(),
                });
            }
        }
        Ok(DataContract {
            handle,
            wire_name: QName::new(
                self.name.unwrap_or_default(),
                self.namespace.unwrap_or_default(),
            ),
            kind: ContractKind::Enum,
            members: Vec::new(),
            base: None,
            is_reference: false,
            flags_enum: self.flags_enum,
            enum_values: self.enum_values,
            shape: None,
            supports_extension: false,
        })
    }

    fn build_collection(
        self,
        registry: &ContractRegistry,
        handle: TypeHandle,
    ) -> Result<DataContract> {
        let item_ty = self
            .item_ty
            .ok_or_else(|| Error::ContractViolation("collection without item type".to_string()))?;
        let item_contract = registry.contract_of(item_ty)?;
        let item_name = self
            .item_name
            .unwrap_or_else(|| item_contract.wire_name.name.clone());
        let name = self
            .name
            .unwrap_or_else(|| format!("ArrayOf{item_name}"));
        let namespace = self.namespace.unwrap_or_else(|| ARRAYS_NS.to_string());

        Ok(DataContract {
            handle,
            wire_name: QName::new(name, namespace),
            kind: ContractKind::Collection,
            members: Vec::new(),
            base: None,
            is_reference: self.is_reference,
            flags_enum: false,
            enum_values: Vec::new(),
            shape: Some(CollectionShape::Items { item_ty, item_name }),
            supports_extension: false,
        })
    }

    fn build_dictionary(
        self,
        registry: &ContractRegistry,
        handle: TypeHandle,
    ) -> Result<DataContract> {
        let key_ty = self
            .key_ty
            .ok_or_else(|| Error::ContractViolation("dictionary without key type".to_string()))?;
        let value_ty = self
            .value_ty
            .ok_or_else(|| Error::ContractViolation("dictionary without value type".to_string()))?;
        let key_contract = registry.contract_of(key_ty)?;
        let value_contract = registry.contract_of(value_ty)?;

        let entry_name = self.item_name.unwrap_or_else(|| {
            format!(
                "KeyValueOf{}{}",
                key_contract.wire_name.name, value_contract.wire_name.name
            )
        });
        let name = self
            .name
            .unwrap_or_else(|| format!("ArrayOf{entry_name}"));
        let namespace = self.namespace.unwrap_or_else(|| ARRAYS_NS.to_string());

        Ok(DataContract {
            handle,
            wire_name: QName::new(name, namespace),
            kind: ContractKind::Dictionary,
            members: Vec::new(),
            base: None,
            is_reference: self.is_reference,
            flags_enum: false,
            enum_values: Vec::new(),
            shape: Some(CollectionShape::Entries {
                key_ty,
                value_ty,
                entry_name,
                key_name: self.key_name.unwrap_or_else(|| "Key".to_string()),
                value_name: self.value_name.unwrap_or_else(|| "Value".to_string()),
            }),
            supports_extension: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::XsdPrimitive;

    #[test]
    fn test_class_builder() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(
                ContractBuilder::class("Person", "urn:test")
                    .member("Name", registry.string())
                    .member("Age", registry.int()),
            )
            .unwrap();
        let contract = registry.get(handle).unwrap();
        assert_eq!(contract.kind, ContractKind::ClassOrStruct);
        assert!(contract.wire_name.is("Person", "urn:test"));
        assert_eq!(contract.members.len(), 2);
        assert_eq!(contract.members[0].name, "Name");
    }

    #[test]
    fn test_base_members_precede_derived() {
        let registry = ContractRegistry::new();
        let base = registry
            .register(ContractBuilder::class("Base", "urn:test").member("Id", registry.int()))
            .unwrap();
        let derived = registry
            .register(
                ContractBuilder::class("Derived", "urn:test")
                    .base(base)
                    .member("Extra", registry.string()),
            )
            .unwrap();
        let contract = registry.get(derived).unwrap();
        let names: Vec<&str> = contract.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Id", "Extra"]);
        assert_eq!(contract.base, Some(base));
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let registry = ContractRegistry::new();
        let result = registry.register(
            ContractBuilder::class("Person", "urn:test")
                .member("Name", registry.string())
                .member("Name", registry.string()),
        );
        assert!(matches!(result, Err(Error::DuplicateMember { .. })));
    }

    #[test]
    fn test_collection_name_synthesis() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(ContractBuilder::collection(registry.int()))
            .unwrap();
        let contract = registry.get(handle).unwrap();
        assert!(contract
            .wire_name
            .is("ArrayOfint", "http://schemas.microsoft.com/2003/10/Serialization/Arrays"));
        match contract.shape.as_ref().unwrap() {
            CollectionShape::Items { item_name, .. } => assert_eq!(item_name, "int"),
            CollectionShape::Entries { .. } => panic!("expected item shape"),
        }
    }

    #[test]
    fn test_dictionary_name_synthesis() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(ContractBuilder::dictionary(
                registry.string(),
                registry.int(),
            ))
            .unwrap();
        let contract = registry.get(handle).unwrap();
        assert_eq!(contract.wire_name.name, "ArrayOfKeyValueOfstringint");
        match contract.shape.as_ref().unwrap() {
            CollectionShape::Entries {
                entry_name,
                key_name,
                value_name,
                ..
            } => {
                assert_eq!(entry_name, "KeyValueOfstringint");
                assert_eq!(key_name, "Key");
                assert_eq!(value_name, "Value");
            }
            CollectionShape::Items { .. } => panic!("expected entry shape"),
        }
    }

    #[test]
    fn test_custom_collection_overrides() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(
                ContractBuilder::collection(registry.string())
                    .named("Roster")
                    .in_namespace("urn:custom")
                    .item_named("Entry"),
            )
            .unwrap();
        let contract = registry.get(handle).unwrap();
        assert!(contract.wire_name.is("Roster", "urn:custom"));
        assert_eq!(contract.shape.as_ref().unwrap().item_name(), "Entry");
    }

    #[test]
    fn test_invalid_contract_registers() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(ContractBuilder::invalid("Broken", "urn:test"))
            .unwrap();
        assert_eq!(registry.get(handle).unwrap().kind, ContractKind::Invalid);
    }

    #[test]
    fn test_enum_builder() {
        let registry = ContractRegistry::new();
        let handle = registry
            .register(
                ContractBuilder::enumeration("Color", "urn:test")
                    .value("Red", 0)
                    .value("Green", 1)
                    .value("Blue", 2),
            )
            .unwrap();
        let contract = registry.get(handle).unwrap();
        assert_eq!(contract.kind, ContractKind::Enum);
        assert_eq!(contract.enum_value("Green"), Some(1));
        assert_eq!(contract.enum_name(2), Some("Blue"));
        assert!(!contract.flags_enum);
    }

    #[test]
    fn test_primitive_classification_first() {
        // A primitive handle classifies as Primitive even when reachable
        // through member declarations
        let registry = ContractRegistry::new();
        let contract = registry.get(registry.primitive(XsdPrimitive::Double)).unwrap();
        assert_eq!(
            contract.kind,
            ContractKind::Primitive(XsdPrimitive::Double)
        );
    }
}
