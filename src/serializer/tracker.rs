use std::collections::HashMap;

use crate::graph::NodeId;

/// Outcome of noting a node visit during write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Noted {
    /// First visit; stamp the element with the given id, if any
    First(Option<String>),
    /// Node was already emitted under this id; emit a reference instead
    Seen(String),
}

/// Write-side object identity tracker.
///
/// In default mode only contracts marked as reference contracts participate;
/// their ids use the `i{n}` scheme. In preserve-references mode every node
/// participates and ids are bare ordinals, matching the two id vocabularies
/// of the wire format. Non-participating nodes are never deduplicated, so a
/// cycle through them keeps expanding until the graph quota stops it.
pub(crate) struct ReferenceTracker {
    preserve: bool,
    ids: HashMap<NodeId, String>,
    next_id: u32,
}

impl ReferenceTracker {
    pub(crate) fn new(preserve: bool) -> Self {
        ReferenceTracker {
            preserve,
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Notes a visit to `node`. `participates` is the contract's reference
    /// flag; it is ignored in preserve mode.
    pub(crate) fn note(&mut self, node: NodeId, participates: bool) -> Noted {
        if !self.preserve && !participates {
            return Noted::First(None);
        }
        if let Some(id) = self.ids.get(&node) {
            return Noted::Seen(id.clone());
        }
        let id = if self.preserve {
            self.next_id.to_string()
        } else {
            format!("i{}", self.next_id)
        };
        self.next_id += 1;
        self.ids.insert(node, id.clone());
        Noted::First(Some(id))
    }
}
