//! Conversion to and from `serde_json::Value`

use serde_json::Value;

use crate::document::Document;
use crate::error::JsonResult;
use crate::node::NodeId;
use crate::tree::Tree;

impl Document {
    /// Build a detached tree from a `serde_json` value
    pub fn from_value(&mut self, value: &Value) -> JsonResult<NodeId> {
        self.materialize(&Tree::from_value(value))
    }

    /// Convert the subtree rooted at `id` into a `serde_json` value
    ///
    /// References are followed. Duplicate object keys collapse to the last
    /// occurrence and non-finite numbers become `null`.
    pub fn to_value(&self, id: NodeId) -> JsonResult<Value> {
        Ok(self.snapshot(id, 0)?.into_value())
    }
}
