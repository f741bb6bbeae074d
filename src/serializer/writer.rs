//! Write pipeline: graph projection into a wire tree.
//!
//! The writer walks [`Value`]s from the root downward, consulting the
//! declared contract of every slot to decide element names, `i:type`
//! annotations and member filtering. Reference bookkeeping is delegated to
//! the tracker; everything here is a single recursive projection with a
//! visit counter standing in for cycle detection - an untracked cycle keeps
//! revisiting nodes until the graph quota trips.

use crate::{
    contract::{
        CollectionShape, ContractKind, ContractRegistry, ContractResolver, DataContract, QName,
        TypeHandle,
    },
    graph::{Graph, NodeBody, NodeId, Value},
    serializer::{
        tracker::{Noted, ReferenceTracker},
        SerializerConfig,
    },
    wire::WireElement,
    Error, Result,
};

pub(crate) struct Writer<'a> {
    registry: &'a ContractRegistry,
    graph: &'a Graph,
    resolver: Option<&'a dyn ContractResolver>,
    config: &'a SerializerConfig,
    tracker: ReferenceTracker,
    visited: u64,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(
        registry: &'a ContractRegistry,
        graph: &'a Graph,
        resolver: Option<&'a dyn ContractResolver>,
        config: &'a SerializerConfig,
    ) -> Self {
        Writer {
            registry,
            graph,
            resolver,
            config,
            tracker: ReferenceTracker::new(config.preserve_references),
            visited: 0,
        }
    }

    /// Projects the root value into a complete wire tree.
    pub(crate) fn project_root(&mut self, root: &Value, declared: TypeHandle) -> Result<WireElement> {
        let contract = self.registry.contract_of(declared)?;
        let name = match &self.config.root_name_override {
            Some(name) => name.clone(),
            None => contract.wire_name.clone(),
        };
        let mut elem = WireElement::new(name);
        self.project_value(&mut elem, root, declared)?;
        Ok(elem)
    }

    fn project_value(
        &mut self,
        elem: &mut WireElement,
        value: &Value,
        declared: TypeHandle,
    ) -> Result<()> {
        match value {
            Value::Null => {
                elem.nil = true;
                Ok(())
            }
            Value::Prim(prim) => {
                let actual = self.registry.primitive(prim.xsd());
                if actual != declared {
                    elem.type_attr = Some(self.type_name_for(actual)?);
                }
                elem.text = Some(prim.to_text());
                Ok(())
            }
            Value::Enum { ty, bits } => {
                let contract = self.registry.contract_of(*ty)?;
                if contract.kind != ContractKind::Enum {
                    return Err(Error::ContractViolation(format!(
                        "'{}' used as an enum value but is {}",
                        contract.fullname(),
                        contract.kind
                    )));
                }
                if *ty != declared {
                    elem.type_attr = Some(self.type_name_for(*ty)?);
                }
                elem.text = Some(encode_enum(&contract, *bits)?);
                Ok(())
            }
            Value::Ref(node) => self.project_node(elem, *node, declared),
        }
    }

    fn project_node(
        &mut self,
        elem: &mut WireElement,
        node_id: NodeId,
        declared: TypeHandle,
    ) -> Result<()> {
        self.visited += 1;
        if self.visited > self.config.max_items_in_graph {
            return Err(Error::QuotaExceeded {
                quota: "max_items_in_graph",
                limit: self.config.max_items_in_graph,
            });
        }

        let node = self.graph.node(node_id);
        let contract = self.registry.contract_of(node.ty)?;

        if contract.kind == ContractKind::Invalid {
            if !node.is_empty() {
                return Err(Error::InvalidContract {
                    type_name: contract.fullname(),
                });
            }
            return Ok(());
        }

        match self.tracker.note(node_id, contract.is_reference) {
            Noted::Seen(id) => {
                // A back-reference carries no type or content of its own
                elem.reference = Some(id);
                return Ok(());
            }
            Noted::First(id) => elem.id = id,
        }

        if node.ty != declared {
            elem.type_attr = Some(self.type_name_for(node.ty)?);
        }

        match (&contract.kind, &node.body) {
            (ContractKind::ClassOrStruct, NodeBody::Class(_)) => {
                self.project_class(elem, node_id, &contract)
            }
            (ContractKind::Collection, NodeBody::Collection(_)) => {
                self.project_collection(elem, node_id, &contract)
            }
            (ContractKind::Dictionary, NodeBody::Dictionary(_)) => {
                self.project_dictionary(elem, node_id, &contract)
            }
            _ => Err(Error::ContractViolation(format!(
                "node body does not match {} contract '{}'",
                contract.kind,
                contract.fullname()
            ))),
        }
    }

    fn project_class(
        &mut self,
        elem: &mut WireElement,
        node_id: NodeId,
        contract: &DataContract,
    ) -> Result<()> {
        let namespace = contract.wire_name.namespace.clone();
        for member in &contract.members {
            let node = self.graph.node(node_id);
            let value = node.member(&member.name).cloned().unwrap_or(Value::Null);
            if value.is_default() && !member.emit_default() && !member.is_required() {
                continue;
            }
            let mut child = WireElement::new(QName::new(member.name.clone(), namespace.clone()));
            self.project_value(&mut child, &value, member.ty)?;
            elem.children.push(child);
        }
        let node = self.graph.node(node_id);
        if contract.supports_extension {
            elem.children.extend(node.extension.iter().cloned());
        }
        Ok(())
    }

    fn project_collection(
        &mut self,
        elem: &mut WireElement,
        node_id: NodeId,
        contract: &DataContract,
    ) -> Result<()> {
        let Some(CollectionShape::Items { item_ty, item_name }) = contract.shape.clone() else {
            return Err(Error::ContractViolation(format!(
                "collection contract '{}' has no item shape",
                contract.fullname()
            )));
        };
        let NodeBody::Collection(items) = self.graph.node(node_id).body.clone() else {
            return Err(Error::ContractViolation("not a collection node".to_string()));
        };
        if self.config.preserve_references {
            elem.size = Some(items.len() as u64);
        }
        let namespace = contract.wire_name.namespace.clone();
        for item in &items {
            let mut child = WireElement::new(QName::new(item_name.clone(), namespace.clone()));
            self.project_value(&mut child, item, item_ty)?;
            elem.children.push(child);
        }
        Ok(())
    }

    fn project_dictionary(
        &mut self,
        elem: &mut WireElement,
        node_id: NodeId,
        contract: &DataContract,
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
        let NodeBody::Dictionary(entries) = self.graph.node(node_id).body.clone() else {
            return Err(Error::ContractViolation("not a dictionary node".to_string()));
        };
        if self.config.preserve_references {
            elem.size = Some(entries.len() as u64);
        }
        let namespace = contract.wire_name.namespace.clone();
        for (key, value) in &entries {
            let mut entry = WireElement::new(QName::new(entry_name.clone(), namespace.clone()));
            let mut key_elem = WireElement::new(QName::new(key_name.clone(), namespace.clone()));
            self.project_value(&mut key_elem, key, key_ty)?;
            let mut value_elem =
                WireElement::new(QName::new(value_name.clone(), namespace.clone()));
            self.project_value(&mut value_elem, value, value_ty)?;
            entry.children.push(key_elem);
            entry.children.push(value_elem);
            elem.children.push(entry);
        }
        Ok(())
    }

    /// The `i:type` name for a runtime contract: resolver first, the
    /// contract's own wire name as fallback.
    fn type_name_for(&self, ty: TypeHandle) -> Result<QName> {
        if let Some(resolver) = self.resolver {
            if let Some(name) = resolver.try_resolve_name(ty) {
                return Ok(name);
            }
        }
        Ok(self.registry.contract_of(ty)?.wire_name.clone())
    }
}

/// Encodes an enum value as its wire text.
///
/// Flags enums emit the space-separated names of the set members; any bit
/// with no named value is an error. Plain enums require an exactly named
/// value.
fn encode_enum(contract: &DataContract, bits: i64) -> Result<String> {
    if !contract.flags_enum {
        return contract
            .enum_name(bits)
            .map(str::to_string)
            .ok_or(Error::EnumValueUnnamed {
                value: bits,
                type_name: contract.fullname(),
            });
    }
    if bits == 0 {
        // Zero emits its named value when one exists, empty text otherwise
        return Ok(contract.enum_name(0).unwrap_or_default().to_string());
    }
    let mut remaining = bits;
    let mut names = Vec::new();
    for (name, value) in &contract.enum_values {
        if *value != 0 && bits & value == *value {
            names.push(name.as_str());
            remaining &= !value;
        }
    }
    if remaining != 0 {
        return Err(Error::EnumValueUnnamed {
            value: bits,
            type_name: contract.fullname(),
        });
    }
    Ok(names.join(" "))
}
