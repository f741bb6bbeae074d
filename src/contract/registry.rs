use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    contract::{
        ContractBuilder, ContractKind, DataContract, DataMember, QName, TypeHandle, XsdPrimitive,
        ALL_PRIMITIVES,
    },
    wire::CONTRACT_NS_BASE,
    Error, Result,
};

/// Process-wide cache of registered data contracts.
///
/// The registry is append-only: contracts are registered once, handed out as
/// `Arc<DataContract>` and never mutated or removed afterwards. Handles are
/// allocated from a monotonic counter, so a [`TypeHandle`] stays valid for
/// the registry's lifetime and lookups from concurrent serializer calls never
/// block each other.
///
/// All primitive contracts are pre-registered at construction; their handles
/// are exposed through [`ContractRegistry::primitive`] and the typed
/// shorthands ([`ContractRegistry::string`], [`ContractRegistry::int`], ...).
/// `DateTimeOffset` is also pre-registered, as the conventional two-member
/// structure (`DateTime` in UTC plus `OffsetMinutes`) the wire format uses
/// for it.
///
/// # Examples
///
/// ```rust
/// use dcxml::contract::{ContractBuilder, ContractRegistry, XsdPrimitive};
///
/// let registry = ContractRegistry::new();
/// let handle = registry.register(
///     ContractBuilder::class("Person", "http://schemas.datacontract.org/2004/07/Test")
///         .member("Name", registry.string()),
/// )?;
///
/// let contract = registry.contract_of(handle)?;
/// assert_eq!(contract.wire_name.name, "Person");
/// assert_eq!(registry.primitive(XsdPrimitive::Int), registry.int());
/// # Ok::<(), dcxml::Error>(())
/// ```
pub struct ContractRegistry {
    /// Primary storage indexed by handle value
    contracts: SkipMap<u32, Arc<DataContract>>,
    /// Wire qname to handle, for exact resolution
    by_qname: DashMap<(String, String), TypeHandle>,
    /// Local wire name to first registered handle, for the
    /// namespace-insensitive fallback on read
    by_name: DashMap<String, TypeHandle>,
    next_handle: AtomicU32,
}

impl ContractRegistry {
    /// Creates a registry seeded with all primitive contracts and
    /// `DateTimeOffset`
    #[must_use]
    pub fn new() -> Self {
        let registry = ContractRegistry {
            contracts: SkipMap::new(),
            by_qname: DashMap::new(),
            by_name: DashMap::new(),
            next_handle: AtomicU32::new(0),
        };
        for primitive in ALL_PRIMITIVES {
            let handle = TypeHandle::new(registry.next_handle.fetch_add(1, Ordering::SeqCst));
            registry.insert(Arc::new(DataContract {
                handle,
                wire_name: QName::new(primitive.wire_name(), primitive.namespace()),
                kind: ContractKind::Primitive(*primitive),
                members: Vec::new(),
                base: None,
                is_reference: false,
                flags_enum: false,
                enum_values: Vec::new(),
                shape: None,
                supports_extension: false,
            }));
        }
        registry.seed_date_time_offset();
        registry
    }

    /// DateTimeOffset decomposes into a UTC instant and a local offset on the
    /// wire rather than serializing as one primitive token.
    fn seed_date_time_offset(&self) {
        let handle = TypeHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.insert(Arc::new(DataContract {
            handle,
            wire_name: QName::new(
                "DateTimeOffset",
                format!("{CONTRACT_NS_BASE}System"),
            ),
            kind: ContractKind::ClassOrStruct,
            members: vec![
                DataMember::new("DateTime", self.primitive(XsdPrimitive::DateTime)),
                DataMember::new("OffsetMinutes", self.primitive(XsdPrimitive::Short)),
            ],
            base: None,
            is_reference: false,
            flags_enum: false,
            enum_values: Vec::new(),
            shape: None,
            supports_extension: false,
        }));
    }

    fn insert(&self, contract: Arc<DataContract>) {
        let handle = contract.handle;
        let key = (
            contract.wire_name.name.clone(),
            contract.wire_name.namespace.clone(),
        );
        self.by_qname.insert(key, handle);
        self.by_name
            .entry(contract.wire_name.name.clone())
            .or_insert(handle);
        self.contracts.insert(handle.value(), contract);
    }

    /// Registers a contract built by the given builder and returns its handle.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateContract`] if a contract with the same
    /// wire name and namespace is already registered, or the builder's own
    /// validation errors ([`crate::Error::DuplicateMember`],
    /// [`crate::Error::UnknownHandle`], [`crate::Error::ContractViolation`]).
    pub fn register(&self, builder: ContractBuilder) -> Result<TypeHandle> {
        let handle = TypeHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.register_reserved(handle, builder)
    }

    /// Allocates a handle without a contract behind it yet.
    ///
    /// Reserved handles let recursive contracts name themselves (or each
    /// other) in member declarations before [`ContractRegistry::register_reserved`]
    /// fills them in. Using a reserved handle that was never filled fails at
    /// serialization time with [`crate::Error::UnknownHandle`].
    #[must_use]
    pub fn reserve(&self) -> TypeHandle {
        TypeHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }

    /// Registers a contract under a previously reserved handle.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateContract`] if the handle is already
    /// filled or the wire name is taken, plus the builder's own validation
    /// errors.
    pub fn register_reserved(
        &self,
        handle: TypeHandle,
        builder: ContractBuilder,
    ) -> Result<TypeHandle> {
        let contract = builder.build(self, handle)?;
        if self.contracts.contains_key(&handle.value()) {
            return Err(Error::DuplicateContract {
                name: contract.wire_name.name.clone(),
                namespace: contract.wire_name.namespace.clone(),
            });
        }
        match self.by_qname.entry((
            contract.wire_name.name.clone(),
            contract.wire_name.namespace.clone(),
        )) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::DuplicateContract {
                name: contract.wire_name.name.clone(),
                namespace: contract.wire_name.namespace.clone(),
            }),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(handle);
                self.by_name
                    .entry(contract.wire_name.name.clone())
                    .or_insert(handle);
                self.contracts.insert(handle.value(), Arc::new(contract));
                Ok(handle)
            }
        }
    }

    /// Looks up a contract by handle
    #[must_use]
    pub fn get(&self, handle: TypeHandle) -> Option<Arc<DataContract>> {
        self.contracts
            .get(&handle.value())
            .map(|entry| entry.value().clone())
    }

    /// Looks up a contract by handle, failing on unknown handles.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownHandle`] if the handle was never
    /// allocated by this registry.
    pub fn contract_of(&self, handle: TypeHandle) -> Result<Arc<DataContract>> {
        self.get(handle).ok_or(Error::UnknownHandle(handle))
    }

    /// Looks up a contract by exact wire name and namespace
    #[must_use]
    pub fn get_by_qname(&self, name: &str, namespace: &str) -> Option<Arc<DataContract>> {
        self.by_qname
            .get(&(name.to_string(), namespace.to_string()))
            .and_then(|handle| self.get(*handle))
    }

    /// Looks up a contract by local wire name alone, ignoring the namespace.
    ///
    /// When several contracts share a local name the earliest registration
    /// wins. This is the tolerant-reader fallback, never the primary path.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<DataContract>> {
        self.by_name.get(name).and_then(|handle| self.get(*handle))
    }

    /// The pre-registered handle of a primitive contract
    #[must_use]
    pub fn primitive(&self, primitive: XsdPrimitive) -> TypeHandle {
        // Seeding order fixes each primitive's handle at its slice position
        let index = ALL_PRIMITIVES
            .iter()
            .position(|p| *p == primitive)
            .unwrap_or(0);
        TypeHandle::new(index as u32)
    }

    /// The pre-registered `DateTimeOffset` structure contract
    #[must_use]
    pub fn date_time_offset(&self) -> TypeHandle {
        TypeHandle::new(ALL_PRIMITIVES.len() as u32)
    }

    /// Handle of the `string` primitive
    #[must_use]
    pub fn string(&self) -> TypeHandle {
        self.primitive(XsdPrimitive::String)
    }

    /// Handle of the `int` primitive
    #[must_use]
    pub fn int(&self) -> TypeHandle {
        self.primitive(XsdPrimitive::Int)
    }

    /// Handle of the `boolean` primitive
    #[must_use]
    pub fn boolean(&self) -> TypeHandle {
        self.primitive(XsdPrimitive::Boolean)
    }

    /// Handle of the `anyType` pseudo-primitive
    #[must_use]
    pub fn any_type(&self) -> TypeHandle {
        self.primitive(XsdPrimitive::AnyType)
    }

    /// Number of registered contracts, primitives included
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True if the registry holds no contracts (never the case after `new`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contracts", &self.contracts.len())
            .finish()
    }
}
