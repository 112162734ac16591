//! Arena-backed document tree and its mutation API

use crate::alloc::{Allocator, SystemAllocator};
use crate::error::{JsonError, JsonResult};
use crate::node::{Kind, NODE_COST, Node, NodeId, Slot};
use crate::number::Number;
use crate::tree::Tree;

/// Maximum nesting depth accepted by the parser, renderer, and deep copy
pub const MAX_DEPTH: usize = 512;

/// A set of JSON trees stored in one arena
///
/// Nodes are addressed by [`NodeId`] handles. A node created by one of the
/// `create_*` constructors is a detached root owned by the caller until it
/// is inserted into a container; inserting transfers ownership to the
/// container, detaching hands it back. Deleting a node frees it and every
/// child it owns. Reference nodes ([`Document::add_reference_to_array`])
/// alias another node's data without owning it.
///
/// # Example
///
/// ```
/// use jrpc_json::{Document, Format};
///
/// let mut doc = Document::new();
/// let params = doc.create_object()?;
/// let a = doc.create_number(3.0)?;
/// doc.add_to_object(params, "A", a)?;
///
/// assert_eq!(doc.render(params, Format::Compact)?, r#"{"A":3}"#);
/// # Ok::<(), jrpc_json::JsonError>(())
/// ```
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    pub(crate) revision: u64,
    allocator: Box<dyn Allocator>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("live_nodes", &self.live)
            .field("revision", &self.revision)
            .field("bytes_in_use", &self.allocator.in_use())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create an empty document using the [`SystemAllocator`]
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator::new())
    }

    /// Create an empty document that charges all storage to `allocator`
    pub fn with_allocator(allocator: impl Allocator + 'static) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            revision: 0,
            allocator: Box::new(allocator),
        }
    }

    /// Number of live nodes across all trees in this document
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    /// The allocator this document charges
    pub fn allocator(&self) -> &dyn Allocator {
        self.allocator.as_ref()
    }

    /// Check if `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    // ========================================================================
    // Slot management
    // ========================================================================

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn get(&self, id: NodeId) -> JsonResult<&Node> {
        self.node(id).ok_or(JsonError::UnknownNode)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> JsonResult<&mut Node> {
        self.node_mut(id).ok_or(JsonError::UnknownNode)
    }

    fn insert_node(&mut self, node: Node) -> JsonResult<NodeId> {
        self.allocator.allocate(NODE_COST + node.owned_bytes())?;
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return Ok(NodeId {
                index,
                generation: slot.generation,
            });
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        Ok(NodeId {
            index,
            generation: 0,
        })
    }

    fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        self.allocator.release(NODE_COST + node.owned_bytes());
        Some(node)
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: String) -> JsonResult<()> {
        self.get(id)?;
        self.allocator.allocate(text.len())?;
        let old = self.get_mut(id)?.text.replace(text);
        if let Some(old) = old {
            self.allocator.release(old.len());
        }
        Ok(())
    }

    pub(crate) fn set_name(&mut self, id: NodeId, name: String) -> JsonResult<()> {
        self.get(id)?;
        self.allocator.allocate(name.len())?;
        let old = self.get_mut(id)?.name.replace(name);
        if let Some(old) = old {
            self.allocator.release(old.len());
        }
        Ok(())
    }

    /// Array children never carry a member name
    fn clear_name(&mut self, id: NodeId) {
        let old = self.node_mut(id).and_then(|node| node.name.take());
        if let Some(old) = old {
            self.allocator.release(old.len());
        }
    }

    /// Follow reference links to the node that holds the data
    ///
    /// Returns `None` if `id` is unknown or the aliased node was deleted.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            match self.node(current)?.alias {
                Some(target) => current = target,
                None => return Some(current),
            }
        }
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&Node> {
        self.resolve(id).and_then(|target| self.node(target))
    }

    pub(crate) fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a detached `null`
    pub fn create_null(&mut self) -> JsonResult<NodeId> {
        self.insert_node(Node::new(Kind::Null))
    }

    /// Create a detached `true`
    pub fn create_true(&mut self) -> JsonResult<NodeId> {
        self.insert_node(Node::new(Kind::True))
    }

    /// Create a detached `false`
    pub fn create_false(&mut self) -> JsonResult<NodeId> {
        self.insert_node(Node::new(Kind::False))
    }

    /// Create a detached boolean
    pub fn create_bool(&mut self, value: bool) -> JsonResult<NodeId> {
        if value {
            self.create_true()
        } else {
            self.create_false()
        }
    }

    /// Create a detached number
    pub fn create_number(&mut self, value: f64) -> JsonResult<NodeId> {
        let mut node = Node::new(Kind::Number);
        node.number = Number::new(value);
        self.insert_node(node)
    }

    /// Create a detached string holding a copy of `value`
    pub fn create_string(&mut self, value: &str) -> JsonResult<NodeId> {
        let mut node = Node::new(Kind::String);
        node.text = Some(value.to_owned());
        self.insert_node(node)
    }

    /// Create a detached empty array
    pub fn create_array(&mut self) -> JsonResult<NodeId> {
        self.insert_node(Node::new(Kind::Array))
    }

    /// Create a detached empty object
    pub fn create_object(&mut self) -> JsonResult<NodeId> {
        self.insert_node(Node::new(Kind::Object))
    }

    /// Create an array of numbers from `i32` values
    pub fn create_int_array(&mut self, values: &[i32]) -> JsonResult<NodeId> {
        self.build_array(values.iter().map(|&v| Tree::Number(Number::from(v))))
    }

    /// Create an array of numbers from `f32` values
    pub fn create_float_array(&mut self, values: &[f32]) -> JsonResult<NodeId> {
        self.build_array(values.iter().map(|&v| Tree::Number(Number::new(f64::from(v)))))
    }

    /// Create an array of numbers from `f64` values
    pub fn create_double_array(&mut self, values: &[f64]) -> JsonResult<NodeId> {
        self.build_array(values.iter().map(|&v| Tree::Number(Number::new(v))))
    }

    /// Create an array of strings
    pub fn create_string_array<S: AsRef<str>>(&mut self, values: &[S]) -> JsonResult<NodeId> {
        self.build_array(values.iter().map(|v| Tree::String(v.as_ref().to_owned())))
    }

    fn build_array(&mut self, items: impl Iterator<Item = Tree>) -> JsonResult<NodeId> {
        self.materialize(&Tree::Array(items.collect()))
    }

    fn create_reference(&mut self, target: NodeId) -> JsonResult<NodeId> {
        let kind = self.get(target)?.kind;
        let mut node = Node::new(kind);
        node.alias = Some(target);
        self.insert_node(node)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Kind of the node's data
    ///
    /// A reference whose aliased node was deleted reports [`Kind::Null`].
    pub fn kind(&self, id: NodeId) -> Option<Kind> {
        self.node(id)?;
        Some(self.data(id).map_or(Kind::Null, |node| node.kind))
    }

    /// Number value, if the node is a number
    pub fn number(&self, id: NodeId) -> Option<Number> {
        let node = self.data(id)?;
        (node.kind == Kind::Number).then_some(node.number)
    }

    /// Floating-point value of a number node
    pub fn as_f64(&self, id: NodeId) -> Option<f64> {
        self.number(id).map(|n| n.as_f64())
    }

    /// Integer projection of a number node
    pub fn as_i32(&self, id: NodeId) -> Option<i32> {
        self.number(id).map(|n| n.as_i32())
    }

    /// Boolean value of a `true`/`false` node
    pub fn as_bool(&self, id: NodeId) -> Option<bool> {
        match self.data(id)?.kind {
            Kind::True => Some(true),
            Kind::False => Some(false),
            _ => None,
        }
    }

    /// String value of a string node
    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        let node = self.data(id)?;
        if node.kind != Kind::String {
            return None;
        }
        node.text.as_deref()
    }

    /// Check if a number node needs a floating-point rendering
    ///
    /// Returns `None` for non-number nodes.
    pub fn is_double(&self, id: NodeId) -> Option<bool> {
        self.number(id).map(|n| !n.is_integral())
    }

    /// Member name, present only for children of an object
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.name.as_deref()
    }

    /// Container this node is attached to
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Check if the node aliases another node
    pub fn is_reference(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.alias.is_some())
    }

    /// Iterate over the children of an array or object in insertion order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.data(id).and_then(|node| node.first_child),
        }
    }

    /// Number of children (0 for scalars)
    pub fn array_len(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Child at `index` (0-based)
    pub fn array_item(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// First member whose name matches `name`, ignoring ASCII case
    pub fn object_item(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).find(|&child| {
            self.name(child)
                .is_some_and(|member| member.eq_ignore_ascii_case(name))
        })
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Append `item` to `array`, transferring ownership
    ///
    /// A name left over from a previous object membership is dropped.
    pub fn add_to_array(&mut self, array: NodeId, item: NodeId) -> JsonResult<()> {
        self.check_container(array, Kind::Array)?;
        self.check_attachable(array, item)?;
        self.clear_name(item);
        self.append_child(array, item)
    }

    /// Append `item` to `object` under `name`, transferring ownership
    ///
    /// Any name the item carried before is replaced.
    pub fn add_to_object(&mut self, object: NodeId, name: &str, item: NodeId) -> JsonResult<()> {
        self.check_container(object, Kind::Object)?;
        self.check_attachable(object, item)?;
        self.set_name(item, name.to_owned())?;
        self.append_child(object, item)
    }

    /// Append a reference to `item` to `array`; `item` stays owned elsewhere
    ///
    /// Returns the new reference node. Deleting it never frees `item`.
    pub fn add_reference_to_array(&mut self, array: NodeId, item: NodeId) -> JsonResult<NodeId> {
        self.check_container(array, Kind::Array)?;
        let reference = self.reference_for(array, item)?;
        self.append_child(array, reference)?;
        Ok(reference)
    }

    /// Append a reference to `item` to `object` under `name`
    pub fn add_reference_to_object(
        &mut self,
        object: NodeId,
        name: &str,
        item: NodeId,
    ) -> JsonResult<NodeId> {
        self.check_container(object, Kind::Object)?;
        let reference = self.reference_for(object, item)?;
        if let Err(err) = self.set_name(reference, name.to_owned()) {
            self.delete(reference);
            return Err(err);
        }
        self.append_child(object, reference)?;
        Ok(reference)
    }

    fn reference_for(&mut self, container: NodeId, item: NodeId) -> JsonResult<NodeId> {
        let target = self.resolve(item).ok_or(JsonError::UnknownNode)?;
        if self.is_ancestor_or_self(target, container) {
            return Err(JsonError::Cycle);
        }
        self.create_reference(target)
    }

    fn check_container(&self, id: NodeId, expected: Kind) -> JsonResult<()> {
        let node = self.get(id)?;
        if node.alias.is_some() {
            return Err(JsonError::ReadOnlyReference);
        }
        if node.kind != expected {
            return Err(JsonError::KindMismatch {
                expected,
                actual: node.kind,
            });
        }
        Ok(())
    }

    fn check_attachable(&self, container: NodeId, item: NodeId) -> JsonResult<()> {
        if self.get(item)?.parent.is_some() {
            return Err(JsonError::AlreadyAttached);
        }
        if self.is_ancestor_or_self(item, container) {
            return Err(JsonError::Cycle);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.node(current).and_then(|node| node.parent);
        }
        false
    }

    fn append_child(&mut self, parent: NodeId, item: NodeId) -> JsonResult<()> {
        let mut tail = None;
        let mut cursor = self.get(parent)?.first_child;
        while let Some(current) = cursor {
            tail = Some(current);
            cursor = self.node(current).and_then(|node| node.next);
        }
        self.link_after(parent, tail, item)
    }

    /// Link `item` into `parent` directly after `tail` (or as the head)
    pub(crate) fn link_after(
        &mut self,
        parent: NodeId,
        tail: Option<NodeId>,
        item: NodeId,
    ) -> JsonResult<()> {
        self.get(item)?;
        match tail {
            Some(tail) => self.get_mut(tail)?.next = Some(item),
            None => self.get_mut(parent)?.first_child = Some(item),
        }
        let node = self.get_mut(item)?;
        node.parent = Some(parent);
        node.prev = tail;
        node.next = None;
        self.touch();
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let Some((parent, prev, next)) = self.node(id).map(|n| (n.parent, n.prev, n.next)) else {
            return;
        };
        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next = next;
                }
            }
            None => {
                if let Some(node) = parent.and_then(|p| self.node_mut(p)) {
                    node.first_child = next;
                }
            }
        }
        if let Some(node) = next.and_then(|n| self.node_mut(n)) {
            node.prev = prev;
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
            node.prev = None;
            node.next = None;
        }
        self.touch();
    }

    // ========================================================================
    // Detach, replace, delete
    // ========================================================================

    /// Unlink the child at `index` and hand ownership to the caller
    ///
    /// Returns `None` when there is no such child or `array` is a reference.
    pub fn detach_from_array(&mut self, array: NodeId, index: usize) -> Option<NodeId> {
        if self.node(array)?.alias.is_some() {
            return None;
        }
        let child = self.array_item(array, index)?;
        self.unlink(child);
        Some(child)
    }

    /// Unlink the member named `name` (ASCII case-insensitive)
    ///
    /// The detached node keeps its name.
    pub fn detach_from_object(&mut self, object: NodeId, name: &str) -> Option<NodeId> {
        if self.node(object)?.alias.is_some() {
            return None;
        }
        let child = self.object_item(object, name)?;
        self.unlink(child);
        Some(child)
    }

    /// Detach and delete the child at `index`
    pub fn delete_from_array(&mut self, array: NodeId, index: usize) -> bool {
        match self.detach_from_array(array, index) {
            Some(child) => self.delete(child),
            None => false,
        }
    }

    /// Detach and delete the member named `name`
    pub fn delete_from_object(&mut self, object: NodeId, name: &str) -> bool {
        match self.detach_from_object(object, name) {
            Some(child) => self.delete(child),
            None => false,
        }
    }

    /// Put `item` in place of the child at `index`, deleting the old child
    ///
    /// On error `item` is left detached and still owned by the caller.
    pub fn replace_in_array(&mut self, array: NodeId, index: usize, item: NodeId) -> JsonResult<()> {
        self.check_container(array, Kind::Array)?;
        self.check_attachable(array, item)?;
        let old = self.array_item(array, index).ok_or(JsonError::NotFound)?;
        self.clear_name(item);
        self.replace_child(old, item)
    }

    /// Put `item` in place of the member named `name`, deleting the old one
    pub fn replace_in_object(&mut self, object: NodeId, name: &str, item: NodeId) -> JsonResult<()> {
        self.check_container(object, Kind::Object)?;
        self.check_attachable(object, item)?;
        let old = self.object_item(object, name).ok_or(JsonError::NotFound)?;
        self.set_name(item, name.to_owned())?;
        self.replace_child(old, item)
    }

    fn replace_child(&mut self, old: NodeId, item: NodeId) -> JsonResult<()> {
        let (parent, prev, next) = {
            let node = self.get(old)?;
            (node.parent, node.prev, node.next)
        };
        {
            let node = self.get_mut(item)?;
            node.parent = parent;
            node.prev = prev;
            node.next = next;
        }
        match (prev, parent) {
            (Some(prev), _) => self.get_mut(prev)?.next = Some(item),
            (None, Some(parent)) => self.get_mut(parent)?.first_child = Some(item),
            (None, None) => {}
        }
        if let Some(next) = next {
            self.get_mut(next)?.prev = Some(item);
        }
        {
            let node = self.get_mut(old)?;
            node.parent = None;
            node.prev = None;
            node.next = None;
        }
        self.delete(old);
        Ok(())
    }

    /// Delete a node and every child it owns
    ///
    /// An attached node is unlinked from its parent first. Reference nodes
    /// are freed without touching the node they alias. Returns `false` if
    /// `id` was not live.
    pub fn delete(&mut self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        self.unlink(id);

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.remove_node(current) else {
                continue;
            };
            if node.alias.is_some() {
                continue;
            }
            let mut child = node.first_child;
            while let Some(c) = child {
                child = self.node(c).and_then(|n| n.next);
                pending.push(c);
            }
        }
        self.touch();
        true
    }

    // ========================================================================
    // Copies
    // ========================================================================

    /// Deep-copy a subtree into a new detached root
    ///
    /// References are copied as owned data. The copy's root has no name.
    pub fn duplicate(&mut self, id: NodeId) -> JsonResult<NodeId> {
        let tree = self.snapshot(id, 0)?;
        self.materialize(&tree)
    }

    /// Deep-copy a subtree from another document into this one
    pub fn import(&mut self, source: &Document, id: NodeId) -> JsonResult<NodeId> {
        let tree = source.snapshot(id, 0)?;
        self.materialize(&tree)
    }

    pub(crate) fn snapshot(&self, id: NodeId, depth: usize) -> JsonResult<Tree> {
        if depth > MAX_DEPTH {
            return Err(JsonError::TooDeep { limit: MAX_DEPTH });
        }
        self.get(id)?;
        let Some(node) = self.data(id) else {
            return Ok(Tree::Null);
        };
        let tree = match node.kind {
            Kind::Null => Tree::Null,
            Kind::True => Tree::Bool(true),
            Kind::False => Tree::Bool(false),
            Kind::Number => Tree::Number(node.number),
            Kind::String => Tree::String(node.text.clone().unwrap_or_default()),
            Kind::Array => Tree::Array(
                self.children(id)
                    .map(|child| self.snapshot(child, depth + 1))
                    .collect::<JsonResult<_>>()?,
            ),
            Kind::Object => Tree::Object(
                self.children(id)
                    .map(|child| {
                        let name = self.name(child).unwrap_or_default().to_owned();
                        Ok((name, self.snapshot(child, depth + 1)?))
                    })
                    .collect::<JsonResult<_>>()?,
            ),
        };
        Ok(tree)
    }

    pub(crate) fn materialize(&mut self, tree: &Tree) -> JsonResult<NodeId> {
        let root = self.create_shallow(tree)?;
        if let Err(err) = self.fill(root, tree) {
            self.delete(root);
            return Err(err);
        }
        Ok(root)
    }

    fn create_shallow(&mut self, tree: &Tree) -> JsonResult<NodeId> {
        match tree {
            Tree::Null => self.create_null(),
            Tree::Bool(value) => self.create_bool(*value),
            Tree::Number(number) => self.create_number(number.as_f64()),
            Tree::String(text) => self.create_string(text),
            Tree::Array(_) => self.create_array(),
            Tree::Object(_) => self.create_object(),
        }
    }

    fn fill(&mut self, parent: NodeId, tree: &Tree) -> JsonResult<()> {
        let mut tail = None;
        match tree {
            Tree::Array(items) => {
                for item in items {
                    let child = self.create_shallow(item)?;
                    self.link_after(parent, tail, child)?;
                    tail = Some(child);
                    self.fill(child, item)?;
                }
            }
            Tree::Object(members) => {
                for (name, item) in members {
                    let child = self.create_shallow(item)?;
                    self.link_after(parent, tail, child)?;
                    tail = Some(child);
                    self.set_name(child, name.clone())?;
                    self.fill(child, item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Iterator over the children of a container, see [`Document::children`]
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.node(current).and_then(|node| node.next);
        Some(current)
    }
}
