use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

type NodeId = usize;

const ROOT: NodeId = 0;

/// One JSON object under construction, addressed by key path.
///
/// Block labels become nested plain objects and only the innermost level is
/// a list of block bodies. Nodes live in an arena so descending never holds
/// two mutable views of the same map.
pub(super) struct TreeBuilder {
    nodes: Vec<Node>,
}

enum Node {
    Object(IndexMap<String, NodeId>),
    Blocks(Vec<Value>),
    Leaf(Value),
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { nodes: vec![Node::Object(IndexMap::new())] }
    }

    pub fn set_attribute(&mut self, name: &str, value: Value) {
        match self.child(ROOT, name) {
            Some(id) => self.nodes[id] = Node::Leaf(value),
            None => {
                self.insert(ROOT, name, Node::Leaf(value));
            }
        }
    }

    /// Append a block body at `path` (block type followed by its labels).
    pub fn append_block(&mut self, path: &[&str], body: Value) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };
        let mut current = ROOT;
        for (depth, key) in parents.iter().enumerate() {
            current = match self.child(current, key) {
                None => self.insert(current, key, Node::Object(IndexMap::new())),
                Some(id) => match &self.nodes[id] {
                    Node::Object(_) => id,
                    Node::Leaf(_) => return Err(conflict(&path[..=depth], "already defined as an attribute")),
                    Node::Blocks(_) => {
                        return Err(conflict(&path[..=depth], "cannot have blocks with and without labels"));
                    }
                },
            };
        }
        match self.child(current, last) {
            None => {
                self.insert(current, last, Node::Blocks(vec![body]));
            }
            Some(id) => match &mut self.nodes[id] {
                Node::Blocks(list) => list.push(body),
                Node::Leaf(_) => return Err(conflict(path, "already defined as an attribute")),
                Node::Object(_) => return Err(conflict(path, "cannot have blocks with and without labels")),
            },
        }
        Ok(())
    }

    pub fn finish(mut self) -> Value {
        self.take(ROOT)
    }

    // ---- arena ---- //

    fn child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        match &self.nodes[parent] {
            Node::Object(map) => map.get(key).copied(),
            _ => None,
        }
    }

    fn insert(&mut self, parent: NodeId, key: &str, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Node::Object(map) = &mut self.nodes[parent] {
            map.insert(key.to_string(), id);
        }
        id
    }

    fn take(&mut self, id: NodeId) -> Value {
        match std::mem::replace(&mut self.nodes[id], Node::Leaf(Value::Null)) {
            Node::Leaf(value) => value,
            Node::Blocks(list) => Value::Array(list),
            Node::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key, self.take(child));
                }
                Value::Object(out)
            }
        }
    }
}

fn conflict(path: &[&str], reason: &str) -> Error {
    let path = path.join(".");
    tracing::debug!(%path, reason, "structural conflict");
    Error::StructuralConflict { path, reason: reason.to_string() }
}
