//! Node handles and arena slot contents

use crate::number::Number;
use crate::print::Format;

/// Handle to a node stored in a [`Document`](crate::Document)
///
/// Handles are generation-checked: once a node is deleted, every handle to
/// it stops resolving, even after the slot is reused for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// The active variant of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    False,
    True,
    Null,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Lowercase name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            Kind::False => "false",
            Kind::True => "true",
            Kind::Null => "null",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Arrays and objects hold children
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }

    /// `true` or `false`
    pub fn is_bool(&self) -> bool {
        matches!(self, Kind::True | Kind::False)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialized text attached to the node it was rendered from
#[derive(Debug, Clone)]
pub(crate) struct PrintCache {
    pub format: Format,
    pub revision: u64,
    pub text: String,
}

/// Arena slot contents
///
/// Siblings form a doubly linked chain in insertion order; a container only
/// records the head. A node with `alias` set is a reference: it owns neither
/// the aliased node's data nor its children.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub kind: Kind,
    pub number: Number,
    pub text: Option<String>,
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub alias: Option<NodeId>,
    pub cache: Option<PrintCache>,
}

impl Node {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            number: Number::default(),
            text: None,
            name: None,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            alias: None,
            cache: None,
        }
    }

    /// Bytes charged to the allocator for this node's owned strings
    pub fn owned_bytes(&self) -> usize {
        self.text.as_ref().map_or(0, String::len) + self.name.as_ref().map_or(0, String::len)
    }
}

/// Fixed cost charged per node slot
pub(crate) const NODE_COST: usize = std::mem::size_of::<Node>();

pub(crate) struct Slot {
    pub generation: u32,
    pub node: Option<Node>,
}
