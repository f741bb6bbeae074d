//! Arena-based object graph model.
//!
//! The engine never serializes live language objects; callers project their
//! data into a [`Graph`], an arena of [`Node`]s keyed by integer id. Object
//! identity is the arena index, and references between nodes are plain
//! [`NodeId`] indices - which makes shared instances and genuine cycles
//! trivially representable without aliased pointers, and makes "same
//! instance visited twice" a simple index comparison.
//!
//! # Key Components
//!
//! - [`Graph`] - append-only node arena, alive for one write/read call pair
//! - [`Node`] - a class, collection or dictionary instance with its contract
//! - [`Value`] - inline primitive/enum payloads and node references
//! - [`Primitive`] - scalar values with canonical wire text codecs

mod primitive;

pub use primitive::{
    format_date_time, format_duration, format_f32, format_f64, parse_date_time, parse_duration,
    DateTime, DateTimeKind, Decimal, Primitive,
};

use crate::contract::TypeHandle;
use crate::wire::WireElement;

/// Index of a node within a [`Graph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The raw arena index
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A value slot in the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null
    Null,
    /// Inline primitive
    Prim(Primitive),
    /// Inline enum value, `bits` interpreted per the contract's named values
    Enum {
        /// Enum contract of the value
        ty: TypeHandle,
        /// Raw numeric value (bitwise OR of members for flags enums)
        bits: i64,
    },
    /// Reference to an arena node
    Ref(NodeId),
}

impl Value {
    /// Shorthand for an inline string
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Value::Prim(Primitive::Str(text.into()))
    }

    /// Shorthand for an inline 32-bit integer
    #[must_use]
    pub fn int(value: i32) -> Self {
        Value::Prim(Primitive::I4(value))
    }

    /// The referenced node id, if this is a reference
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// True if the value equals the type default for its shape.
    ///
    /// Null counts as default; node references never do.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Prim(p) => p.is_default(),
            Value::Enum { bits, .. } => *bits == 0,
            Value::Ref(_) => false,
        }
    }
}

/// Body of a graph node, shaped by its contract kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// Class/struct instance: member name to value, tolerant of gaps
    Class(Vec<(String, Value)>),
    /// Homogeneous item sequence
    Collection(Vec<Value>),
    /// Key/value entries in insertion order
    Dictionary(Vec<(Value, Value)>),
}

/// One reference-typed instance in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Runtime contract of this instance
    pub ty: TypeHandle,
    /// Shaped payload
    pub body: NodeBody,
    /// Unknown subtrees captured on read for forward compatibility
    pub extension: Vec<WireElement>,
}

impl Node {
    /// Looks up a class member value by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        match &self.body {
            NodeBody::Class(members) => members
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// True if the node carries no members, items or entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.body {
            NodeBody::Class(members) => members.is_empty(),
            NodeBody::Collection(items) => items.is_empty(),
            NodeBody::Dictionary(entries) => entries.is_empty(),
        }
    }
}

/// Append-only node arena.
///
/// A graph is call-scoped input/output of the serializer: callers build one
/// before writing and receive a fresh one from reading. Nothing in it is
/// shared across calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Creates an empty graph
    #[must_use]
    pub fn new() -> Self {
        Graph { nodes: Vec::new() }
    }

    /// Number of nodes in the arena
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a node and returns its id
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Appends a class instance
    pub fn add_object<S: Into<String>>(
        &mut self,
        ty: TypeHandle,
        members: Vec<(S, Value)>,
    ) -> NodeId {
        self.alloc(Node {
            ty,
            body: NodeBody::Class(
                members.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            ),
            extension: Vec::new(),
        })
    }

    /// Appends a collection instance
    pub fn add_collection(&mut self, ty: TypeHandle, items: Vec<Value>) -> NodeId {
        self.alloc(Node {
            ty,
            body: NodeBody::Collection(items),
            extension: Vec::new(),
        })
    }

    /// Appends a dictionary instance
    pub fn add_dictionary(&mut self, ty: TypeHandle, entries: Vec<(Value, Value)>) -> NodeId {
        self.alloc(Node {
            ty,
            body: NodeBody::Dictionary(entries),
            extension: Vec::new(),
        })
    }

    /// Borrows a node
    ///
    /// # Panics
    /// Panics if the id does not belong to this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrows a node.
    ///
    /// Needed to close cycles: allocate first, then patch a member to point
    /// back at an earlier node.
    ///
    /// # Panics
    /// Panics if the id does not belong to this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Sets (or replaces) a class member on an existing node.
    ///
    /// # Panics
    /// Panics if the id does not belong to this graph or the node is not a
    /// class instance.
    pub fn set_member(&mut self, id: NodeId, name: &str, value: Value) {
        match &mut self.nodes[id.index()].body {
            NodeBody::Class(members) => {
                if let Some(slot) = members.iter_mut().find(|(n, _)| n == name) {
                    slot.1 = value;
                } else {
                    members.push((name.to_string(), value));
                }
            }
            _ => panic!("set_member on a non-class node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_lookup() {
        let mut graph = Graph::new();
        let ty = TypeHandle::new(40);
        let id = graph.add_object(ty, vec![("Name", Value::string("John"))]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(id).ty, ty);
        assert_eq!(
            graph.node(id).member("Name"),
            Some(&Value::string("John"))
        );
        assert_eq!(graph.node(id).member("Missing"), None);
    }

    #[test]
    fn test_cycle_via_set_member() {
        let mut graph = Graph::new();
        let ty = TypeHandle::new(40);
        let a = graph.add_object(ty, vec![("Next", Value::Null)]);
        let b = graph.add_object(ty, vec![("Next", Value::Ref(a))]);
        graph.set_member(a, "Next", Value::Ref(b));
        assert_eq!(graph.node(a).member("Next"), Some(&Value::Ref(b)));
        assert_eq!(graph.node(b).member("Next"), Some(&Value::Ref(a)));
    }

    #[test]
    fn test_value_defaults() {
        assert!(Value::Null.is_default());
        assert!(Value::int(0).is_default());
        assert!(!Value::int(3).is_default());
        assert!(Value::string("").is_default());
        assert!(!Value::Ref(NodeId(0)).is_default());
        assert!(Value::Enum {
            ty: TypeHandle::new(30),
            bits: 0
        }
        .is_default());
    }

    #[test]
    fn test_node_is_empty() {
        let mut graph = Graph::new();
        let ty = TypeHandle::new(41);
        let empty = graph.add_collection(ty, vec![]);
        let full = graph.add_collection(ty, vec![Value::int(1)]);
        assert!(graph.node(empty).is_empty());
        assert!(!graph.node(full).is_empty());
    }
}
