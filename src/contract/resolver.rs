use crate::contract::{ContractRegistry, QName, TypeHandle};

/// Caller-supplied mapping between wire type names and contract handles.
///
/// A resolver participates in polymorphic dispatch on both sides of the wire.
/// On write it is consulted first for the `i:type` name of an instance whose
/// runtime contract differs from the declared one; on read it is consulted
/// after an `i:type` name fails the built-in lookups. Returning `None` from
/// either hook defers to the next stage of the chain, it is never an error by
/// itself.
///
/// Implementations must be thread-safe; one resolver instance may serve
/// concurrent serializer calls.
pub trait ContractResolver: Send + Sync {
    /// Maps a wire type name to a contract handle.
    ///
    /// `declared` is the statically declared contract of the slot being read,
    /// available as context for scoped resolution schemes.
    fn try_resolve_type(
        &self,
        name: &str,
        namespace: &str,
        declared: TypeHandle,
    ) -> Option<TypeHandle>;

    /// Maps a contract handle to the wire type name to emit for it
    fn try_resolve_name(&self, ty: TypeHandle) -> Option<QName>;
}

/// A closed set of contracts admissible for polymorphic reads.
///
/// Mirrors known-type declarations: when an incoming `i:type` name is not
/// resolved by the resolver, it is matched against the wire names of the
/// handles in this set before falling back to the whole registry.
#[derive(Debug, Clone, Default)]
pub struct KnownTypeSet {
    handles: Vec<TypeHandle>,
}

impl KnownTypeSet {
    /// Creates a set from the given handles, dropping duplicates
    #[must_use]
    pub fn new(handles: impl IntoIterator<Item = TypeHandle>) -> Self {
        let mut set = KnownTypeSet {
            handles: Vec::new(),
        };
        for handle in handles {
            set.add(handle);
        }
        set
    }

    /// Adds a handle if not already present
    pub fn add(&mut self, handle: TypeHandle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    /// True if the handle is in the set
    #[must_use]
    pub fn contains(&self, handle: TypeHandle) -> bool {
        self.handles.contains(&handle)
    }

    /// The handles in insertion order
    #[must_use]
    pub fn handles(&self) -> &[TypeHandle] {
        &self.handles
    }

    /// Resolves a wire type name against the wire names of the set's members
    #[must_use]
    pub fn resolve(
        &self,
        name: &str,
        namespace: &str,
        registry: &ContractRegistry,
    ) -> Option<TypeHandle> {
        self.handles.iter().copied().find(|handle| {
            registry
                .get(*handle)
                .is_some_and(|c| c.wire_name.is(name, namespace))
        })
    }
}
