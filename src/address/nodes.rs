//! Node registry: deduplicates rounded points and assigns stable ids.

use hashbrown::HashMap;

use crate::models::{Node, PointKey, RawPoint};
use crate::project::Unproject;

/// Monotonic id source, owned by one conversion run
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`IdCounter::next_id`] returns
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// Append-only map from rounded point to (id, unprojected point).
///
/// Ids start at 1 and follow first-sight order. The registry owns the
/// transformer and calls it once per distinct key.
pub struct NodeRegistry<T: Unproject> {
    transformer: T,
    nodes: HashMap<PointKey, Node>,
    ids: IdCounter,
}

impl<T: Unproject> NodeRegistry<T> {
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            nodes: HashMap::new(),
            ids: IdCounter::starting_at(1),
        }
    }

    /// Register a point, returning the stored node.
    ///
    /// Idempotent: a point agreeing with an earlier one to eight decimal
    /// places gets the earlier id and unprojected value back.
    pub fn register(&mut self, point: RawPoint) -> Node {
        let key = point.key();
        if let Some(node) = self.nodes.get(&key) {
            return *node;
        }
        let node = Node {
            id: self.ids.next_id(),
            point: self.transformer.unproject(point),
        };
        self.nodes.insert(key, node);
        node
    }

    /// Look up an already registered point
    pub fn get(&self, point: &RawPoint) -> Option<&Node> {
        self.nodes.get(&point.key())
    }

    /// First id not handed out by this registry
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}
