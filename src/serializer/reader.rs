//! Read pipeline: wire tree projection into a fresh graph.
//!
//! The reader is tolerant by construction: unknown member elements are
//! dropped (or captured into the extension bag when the contract opts in),
//! member matching ignores the child's namespace, and `i:type` resolution
//! walks a fallback chain before giving up. Nodes are allocated in the arena
//! before their children are read, so `z:Ref` back-references into an
//! ancestor resolve while that ancestor is still being filled.

use std::collections::HashMap;

use crate::{
    contract::{
        CollectionShape, ContractKind, ContractRegistry, ContractResolver, DataContract,
        KnownTypeSet, QName, TypeHandle, XsdPrimitive,
    },
    graph::{Graph, Node, NodeBody, NodeId, Primitive, Value},
    serializer::SerializerConfig,
    wire::WireElement,
    Error, Result,
};

pub(crate) struct Reader<'a> {
    registry: &'a ContractRegistry,
    resolver: Option<&'a dyn ContractResolver>,
    known: KnownTypeSet,
    config: &'a SerializerConfig,
    graph: Graph,
    ids: HashMap<String, NodeId>,
    items_read: u64,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(
        registry: &'a ContractRegistry,
        resolver: Option<&'a dyn ContractResolver>,
        config: &'a SerializerConfig,
    ) -> Self {
        Reader {
            registry,
            resolver,
            known: KnownTypeSet::new(config.known_types.iter().copied()),
            config,
            graph: Graph::new(),
            ids: HashMap::new(),
            items_read: 0,
        }
    }

    /// Reads a complete document rooted at `elem` into a fresh graph.
    pub(crate) fn read_root(
        mut self,
        elem: &WireElement,
        declared: TypeHandle,
    ) -> Result<(Graph, Value)> {
        let contract = self.registry.contract_of(declared)?;
        let expected = match &self.config.root_name_override {
            Some(name) => name.clone(),
            None => contract.wire_name.clone(),
        };
        if elem.name != expected {
            return Err(malformed_error!(
                "unexpected root element '{}', expected '{}'",
                elem.name,
                expected
            ));
        }
        let value = self.read_value(elem, declared)?;
        Ok((self.graph, value))
    }

    fn read_value(&mut self, elem: &WireElement, declared: TypeHandle) -> Result<Value> {
        if let Some(reference) = &elem.reference {
            let node = self
                .ids
                .get(reference)
                .copied()
                .ok_or_else(|| malformed_error!("unresolved reference '{}'", reference))?;
            return Ok(Value::Ref(node));
        }
        if elem.nil {
            return Ok(Value::Null);
        }

        let actual = self.resolve_type(elem.type_attr.as_ref(), declared)?;
        let contract = self.registry.contract_of(actual)?;

        match contract.kind {
            ContractKind::Primitive(kind) => {
                if !elem.children.is_empty() {
                    return Err(malformed_error!(
                        "primitive element '{}' has child elements",
                        elem.name
                    ));
                }
                let text = elem.text.as_deref().unwrap_or_default();
                // An untyped anyType slot has nothing better than text
                if kind == XsdPrimitive::AnyType {
                    return Ok(Value::Prim(Primitive::Str(text.to_string())));
                }
                Ok(Value::Prim(Primitive::from_text(kind, text)?))
            }
            ContractKind::Enum => {
                let text = elem.text.as_deref().unwrap_or_default();
                let bits = decode_enum(&contract, text)?;
                Ok(Value::Enum { ty: actual, bits })
            }
            _ => self.read_node(elem, &contract),
        }
    }

    /// Resolves the effective contract of a slot: `i:type` through the
    /// resolver, the known-type set and the registry, the declared contract
    /// when no annotation is present.
    fn resolve_type(&self, type_attr: Option<&QName>, declared: TypeHandle) -> Result<TypeHandle> {
        let Some(name) = type_attr else {
            return Ok(declared);
        };
        if let Some(resolver) = self.resolver {
            if let Some(handle) = resolver.try_resolve_type(&name.name, &name.namespace, declared) {
                return Ok(handle);
            }
        }
        if let Some(handle) = self.known.resolve(&name.name, &name.namespace, self.registry) {
            return Ok(handle);
        }
        if let Some(contract) = self.registry.get_by_qname(&name.name, &name.namespace) {
            return Ok(contract.handle);
        }
        if let Some(contract) = self.registry.get_by_name(&name.name) {
            return Ok(contract.handle);
        }
        Err(Error::TypeNotResolvable {
            name: name.name.clone(),
            namespace: name.namespace.clone(),
        })
    }

    fn read_node(&mut self, elem: &WireElement, contract: &DataContract) -> Result<Value> {
        self.items_read += 1;
        if self.items_read > self.config.max_items_in_graph {
            return Err(Error::QuotaExceeded {
                quota: "max_items_in_graph",
                limit: self.config.max_items_in_graph,
            });
        }

        if contract.kind == ContractKind::Invalid {
            if !elem.children.is_empty() || elem.text.as_deref().is_some_and(|t| !t.is_empty()) {
                return Err(Error::InvalidContract {
                    type_name: contract.fullname(),
                });
            }
            let id = self.alloc(elem, contract.handle, NodeBody::Class(Vec::new()))?;
            return Ok(Value::Ref(id));
        }

        let body = match contract.kind {
            ContractKind::ClassOrStruct => NodeBody::Class(Vec::new()),
            ContractKind::Collection => NodeBody::Collection(Vec::new()),
            ContractKind::Dictionary => NodeBody::Dictionary(Vec::new()),
            _ => {
                return Err(Error::ContractViolation(format!(
                    "contract '{}' cannot shape a node",
                    contract.fullname()
                )))
            }
        };
        // Allocate and register before descending so back-references into
        // this node resolve mid-fill
        let id = self.alloc(elem, contract.handle, body)?;

        match contract.kind {
            ContractKind::ClassOrStruct => self.fill_class(elem, contract, id)?,
            ContractKind::Collection => self.fill_collection(elem, contract, id)?,
            ContractKind::Dictionary => self.fill_dictionary(elem, contract, id)?,
            _ => {}
        }
        Ok(Value::Ref(id))
    }

    fn alloc(&mut self, elem: &WireElement, ty: TypeHandle, body: NodeBody) -> Result<NodeId> {
        let id = self.graph.alloc(Node {
            ty,
            body,
            extension: Vec::new(),
        });
        if let Some(wire_id) = &elem.id {
            if self.ids.insert(wire_id.clone(), id).is_some() {
                return Err(malformed_error!("duplicate object id '{}'", wire_id));
            }
        }
        Ok(id)
    }

    fn fill_class(
        &mut self,
        elem: &WireElement,
        contract: &DataContract,
        id: NodeId,
    ) -> Result<()> {
        let mut members = Vec::new();
        let mut extension = Vec::new();
        for child in &elem.children {
            // Member matching is by local name only
            match contract.member(&child.name.name) {
                Some(member) => {
                    let value = self.read_value(child, member.ty)?;
                    members.push((member.name.clone(), value));
                }
                None => {
                    if contract.supports_extension && !self.config.ignore_extension_data {
                        extension.push(child.clone());
                    }
                }
            }
        }
        for member in &contract.members {
            if member.is_required() && !members.iter().any(|(n, _)| *n == member.name) {
                return Err(Error::RequiredMemberMissing {
                    member: member.name.clone(),
                    type_name: contract.fullname(),
                });
            }
        }
        let node = self.graph.node_mut(id);
        node.body = NodeBody::Class(members);
        node.extension = extension;
        Ok(())
    }

    fn fill_collection(
        &mut self,
        elem: &WireElement,
        contract: &DataContract,
        id: NodeId,
    ) -> Result<()> {
        let Some(CollectionShape::Items { item_ty, item_name }) = contract.shape.clone() else {
            return Err(Error::ContractViolation(format!(
                "collection contract '{}' has no item shape",
                contract.fullname()
            )));
        };
        let mut items = Vec::new();
        for child in &elem.children {
            if child.name.name == item_name {
                items.push(self.read_value(child, item_ty)?);
            }
            // Foreign-named children in a collection are skipped
        }
        if let Some(size) = elem.size {
            if size != items.len() as u64 {
                return Err(malformed_error!(
                    "declared size {} does not match {} items",
                    size,
                    items.len()
                ));
            }
        }
        self.graph.node_mut(id).body = NodeBody::Collection(items);
        Ok(())
    }

    fn fill_dictionary(
        &mut self,
        elem: &WireElement,
        contract: &DataContract,
        id: NodeId,
    ) -> Result<()> {
        let Some(CollectionShape::Entries {
            key_ty,
            value_ty,
            entry_name,
            key_name,
            value_name,
        }) = contract.shape.clone()
        else {
            return Err(Error::ContractViolation(format!(
                "dictionary contract '{}' has no entry shape",
                contract.fullname()
            )));
        };
        let mut entries = Vec::new();
        for child in &elem.children {
            if child.name.name != entry_name {
                continue;
            }
            let key_elem = child
                .children
                .iter()
                .find(|c| c.name.name == key_name)
                .ok_or_else(|| {
                    malformed_error!("dictionary entry '{}' is missing its key", entry_name)
                })?;
            let value_elem = child
                .children
                .iter()
                .find(|c| c.name.name == value_name)
                .ok_or_else(|| {
                    malformed_error!("dictionary entry '{}' is missing its value", entry_name)
                })?;
            let key = self.read_value(key_elem, key_ty)?;
            let value = self.read_value(value_elem, value_ty)?;
            entries.push((key, value));
        }
        if let Some(size) = elem.size {
            if size != entries.len() as u64 {
                return Err(malformed_error!(
                    "declared size {} does not match {} entries",
                    size,
                    entries.len()
                ));
            }
        }
        self.graph.node_mut(id).body = NodeBody::Dictionary(entries);
        Ok(())
    }
}

/// Decodes enum wire text into its numeric value.
///
/// Flags enums accept space-separated names ORed together; empty text is
/// zero. Plain enums require exactly one known name.
fn decode_enum(contract: &DataContract, text: &str) -> Result<i64> {
    if !contract.flags_enum {
        return contract
            .enum_value(text)
            .ok_or_else(|| malformed_error!("'{}' is not a value of {}", text, contract.fullname()));
    }
    let mut bits = 0i64;
    for name in text.split_whitespace() {
        let value = contract
            .enum_value(name)
            .ok_or_else(|| malformed_error!("'{}' is not a value of {}", name, contract.fullname()))?;
        bits |= value;
    }
    Ok(bits)
}
