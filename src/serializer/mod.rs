//! The serialization engine: graph to XML and back.
//!
//! [`Serializer`] is the facade over the two pipelines. Writing projects an
//! object graph through its contracts into a wire tree and emits canonical
//! XML; reading parses XML under quotas, then projects the wire tree into a
//! fresh graph, tolerantly. A serializer is cheap to construct, immutable
//! and shareable across threads; all per-call state lives inside the call.
//!
//! # Key Components
//!
//! - [`Serializer`] - configured write/read entry points
//! - [`SerializerConfig`] - known types, resolver, reference mode and quotas
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dcxml::{
//!     contract::{ContractBuilder, ContractRegistry},
//!     graph::{Graph, Value},
//!     Serializer,
//! };
//!
//! let registry = Arc::new(ContractRegistry::new());
//! let person = registry.register(
//!     ContractBuilder::class("Person", "http://schemas.datacontract.org/2004/07/Test")
//!         .member("Name", registry.string()),
//! )?;
//!
//! let mut graph = Graph::new();
//! let root = graph.add_object(person, vec![("Name", Value::string("John"))]);
//!
//! let serializer = Serializer::new(registry);
//! let xml = serializer.write_to_string(&graph, &Value::Ref(root), person)?;
//! let (decoded, value) = serializer.read(xml.as_bytes(), person)?;
//! assert_eq!(
//!     decoded.node(value.as_node().unwrap()).member("Name"),
//!     Some(&Value::string("John"))
//! );
//! # Ok::<(), dcxml::Error>(())
//! ```

mod reader;
mod tracker;
mod writer;

use std::{fmt, io::Write, sync::Arc};

use crate::{
    contract::{ContractRegistry, ContractResolver, QName, TypeHandle},
    graph::{Graph, Value},
    wire::{self, ReaderQuotas},
    Result,
};

/// Per-serializer behavior switches.
///
/// The defaults match the conventional wire behavior: no reference
/// preservation, extension data captured for contracts that opt in, and
/// quotas sized for well-behaved documents.
#[derive(Clone)]
pub struct SerializerConfig {
    /// Contracts admissible for polymorphic reads beyond the registry lookup
    pub known_types: Vec<TypeHandle>,
    /// Caller hook for mapping wire type names to and from handles
    pub resolver: Option<Arc<dyn ContractResolver>>,
    /// Track and deduplicate every node (`z:Id`/`z:Ref` on all of them)
    /// instead of only reference contracts
    pub preserve_references: bool,
    /// Maximum node visits per write call and node allocations per read call
    pub max_items_in_graph: u64,
    /// Drop unknown child elements even for contracts with an extension bag
    pub ignore_extension_data: bool,
    /// Root element name replacing the root contract's wire name
    pub root_name_override: Option<QName>,
    /// Parse-time input limits
    pub quotas: ReaderQuotas,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        SerializerConfig {
            known_types: Vec::new(),
            resolver: None,
            preserve_references: false,
            max_items_in_graph: 65536,
            ignore_extension_data: false,
            root_name_override: None,
            quotas: ReaderQuotas::default(),
        }
    }
}

impl fmt::Debug for SerializerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerConfig")
            .field("known_types", &self.known_types)
            .field("resolver", &self.resolver.is_some())
            .field("preserve_references", &self.preserve_references)
            .field("max_items_in_graph", &self.max_items_in_graph)
            .field("ignore_extension_data", &self.ignore_extension_data)
            .field("root_name_override", &self.root_name_override)
            .field("quotas", &self.quotas)
            .finish()
    }
}

/// Configured entry point for writing and reading documents.
///
/// Holds a shared registry and an immutable configuration; the same instance
/// may serve concurrent calls.
#[derive(Debug)]
pub struct Serializer {
    registry: Arc<ContractRegistry>,
    config: SerializerConfig,
}

impl Serializer {
    /// Creates a serializer with default configuration
    #[must_use]
    pub fn new(registry: Arc<ContractRegistry>) -> Self {
        Serializer {
            registry,
            config: SerializerConfig::default(),
        }
    }

    /// Creates a serializer with an explicit configuration
    #[must_use]
    pub fn with_config(registry: Arc<ContractRegistry>, config: SerializerConfig) -> Self {
        Serializer { registry, config }
    }

    /// The registry this serializer resolves contracts against
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Writes `root` (declared as `declared`) as an XML document into `sink`.
    ///
    /// # Errors
    /// Returns [`crate::Error::QuotaExceeded`] when the graph quota trips
    /// (including unbounded expansion of untracked cycles),
    /// [`crate::Error::InvalidContract`] for non-empty instances of invalid
    /// contracts, [`crate::Error::EnumValueUnnamed`] for unnamed enum bits,
    /// and I/O errors from the sink.
    pub fn write<W: Write>(
        &self,
        graph: &Graph,
        root: &Value,
        declared: TypeHandle,
        sink: W,
    ) -> Result<()> {
        self.write_inner(graph, root, declared, self.config.resolver.as_deref(), sink)
    }

    /// Writes with a per-call resolver replacing the configured one.
    ///
    /// # Errors
    /// Same failure modes as [`Serializer::write`].
    pub fn write_with_resolver<W: Write>(
        &self,
        graph: &Graph,
        root: &Value,
        declared: TypeHandle,
        resolver: &dyn ContractResolver,
        sink: W,
    ) -> Result<()> {
        self.write_inner(graph, root, declared, Some(resolver), sink)
    }

    fn write_inner<W: Write>(
        &self,
        graph: &Graph,
        root: &Value,
        declared: TypeHandle,
        resolver: Option<&dyn ContractResolver>,
        sink: W,
    ) -> Result<()> {
        let mut writer = writer::Writer::new(&self.registry, graph, resolver, &self.config);
        let tree = writer.project_root(root, declared)?;
        wire::emit(&tree, sink)
    }

    /// Writes `root` as an XML document string.
    ///
    /// # Errors
    /// Same failure modes as [`Serializer::write`].
    pub fn write_to_string(
        &self,
        graph: &Graph,
        root: &Value,
        declared: TypeHandle,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.write(graph, root, declared, &mut buf)?;
        String::from_utf8(buf).map_err(|_| malformed_error!("emitted document is not valid UTF-8"))
    }

    /// Reads an XML document into a fresh graph, returning the graph and the
    /// root value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unparseable or
    /// contract-violating input, [`crate::Error::QuotaExceeded`] when a
    /// reader quota trips, [`crate::Error::TypeNotResolvable`] when an
    /// `i:type` annotation survives the whole resolution chain unresolved,
    /// and [`crate::Error::RequiredMemberMissing`] for absent required
    /// members.
    pub fn read(&self, input: &[u8], declared: TypeHandle) -> Result<(Graph, Value)> {
        let tree = wire::parse(input, &self.config.quotas)?;
        let resolver = self.config.resolver.as_deref();
        reader::Reader::new(&self.registry, resolver, &self.config).read_root(&tree, declared)
    }

    /// Reads with a per-call resolver replacing the configured one.
    ///
    /// # Errors
    /// Same failure modes as [`Serializer::read`].
    pub fn read_with_resolver(
        &self,
        input: &[u8],
        declared: TypeHandle,
        resolver: &dyn ContractResolver,
    ) -> Result<(Graph, Value)> {
        let tree = wire::parse(input, &self.config.quotas)?;
        reader::Reader::new(&self.registry, Some(resolver), &self.config).read_root(&tree, declared)
    }
}
