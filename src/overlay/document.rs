//! The active modal stack.
//!
//! A [`Document`] holds ordinary elements (the screens behind dialogs) and
//! attached overlays as siblings. Whenever the sibling set changes, inertness
//! is recomputed from scratch: ordinary elements sort before overlays, overlays
//! by ascending z-index, ties by insertion order. While any overlay is
//! attached, only the highest-priority node stays interactive.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use crate::overlay::lifecycle::Overlay;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL: OnceLock<Document> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
enum NodeKind {
    Element(String),
    Overlay(Overlay),
}

#[derive(Clone)]
struct Node {
    id: NodeId,
    kind: NodeKind,
    z_index: i32,
    inert: bool,
}

impl Node {
    const fn is_overlay(&self) -> bool {
        matches!(self.kind, NodeKind::Overlay(_))
    }
}

/// Read-only view of one node, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: NodeId,
    /// Element name, `None` for overlays.
    pub name: Option<String>,
    pub z_index: i32,
    pub inert: bool,
}

#[derive(Default)]
struct DocumentState {
    nodes: Vec<Node>,
}

impl DocumentState {
    /// Node indices sorted lowest to highest priority.
    fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        // Stable, so insertion order breaks ties.
        order.sort_by_key(|&index| {
            let node = &self.nodes[index];
            (node.is_overlay(), if node.is_overlay() { node.z_index } else { 0 })
        });
        order
    }

    fn recompute(&mut self) {
        let order = self.priority_order();
        let has_overlay = self.nodes.iter().any(Node::is_overlay);
        let top = order.last().copied();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.inert = has_overlay && Some(index) != top;
        }
        debug!(
            nodes = self.nodes.len(),
            interactive = ?top.map(|index| self.nodes[index].id),
            "Recomputed document inertness"
        );
    }

    fn find(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// Shared handle to a set of sibling elements and overlays.
#[derive(Clone, Default)]
pub struct Document {
    state: Arc<Mutex<DocumentState>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide document.
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::new).clone()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an ordinary element, such as a background screen.
    pub fn append_element(&self, name: impl Into<String>) -> NodeId {
        let id = NodeId::next();
        let mut state = self.lock();
        state.nodes.push(Node {
            id,
            kind: NodeKind::Element(name.into()),
            z_index: 0,
            inert: false,
        });
        state.recompute();
        id
    }

    /// Remove any node. Returns whether it was present.
    ///
    /// Overlays should be removed through [`Overlay::remove`] so their pending
    /// waits are released.
    pub fn remove_element(&self, id: NodeId) -> bool {
        self.detach(id).is_some()
    }

    pub(crate) fn attach(&self, overlay: Overlay, z_index: i32) {
        let mut state = self.lock();
        if state.find(overlay.id()).is_some() {
            return;
        }
        state.nodes.push(Node {
            id: overlay.id(),
            kind: NodeKind::Overlay(overlay),
            z_index,
            inert: false,
        });
        state.recompute();
    }

    pub(crate) fn detach(&self, id: NodeId) -> Option<NodeId> {
        let removed = {
            let mut state = self.lock();
            let index = state.nodes.iter().position(|node| node.id == id)?;
            let removed = state.nodes.remove(index);
            state.recompute();
            removed
        };
        // The overlay handle may be the last strong reference; drop it
        // after releasing the lock.
        drop(removed);
        Some(id)
    }

    pub(crate) fn set_z_index(&self, id: NodeId, z_index: i32) {
        let mut state = self.lock();
        if let Some(node) = state.nodes.iter_mut().find(|node| node.id == id) {
            node.z_index = z_index;
            state.recompute();
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.lock().find(id).is_some()
    }

    /// Whether `id` is attached and currently non-interactive.
    pub fn is_inert(&self, id: NodeId) -> bool {
        self.lock().find(id).is_some_and(|node| node.inert)
    }

    /// The node that currently receives input, if any node exists.
    pub fn interactive(&self) -> Option<NodeId> {
        let state = self.lock();
        state
            .priority_order()
            .last()
            .map(|&index| state.nodes[index].id)
    }

    /// Attached overlays, lowest priority first.
    pub fn overlays(&self) -> Vec<Overlay> {
        let state = self.lock();
        state
            .priority_order()
            .into_iter()
            .filter_map(|index| match &state.nodes[index].kind {
                NodeKind::Overlay(overlay) => Some(overlay.clone()),
                NodeKind::Element(_) => None,
            })
            .collect()
    }

    /// The highest-priority attached overlay.
    pub fn top_overlay(&self) -> Option<Overlay> {
        self.overlays().pop()
    }

    /// Snapshot of every node, lowest priority first.
    pub fn nodes(&self) -> Vec<NodeInfo> {
        let state = self.lock();
        state
            .priority_order()
            .into_iter()
            .map(|index| {
                let node = &state.nodes[index];
                NodeInfo {
                    id: node.id,
                    name: match &node.kind {
                        NodeKind::Element(name) => Some(name.clone()),
                        NodeKind::Overlay(_) => None,
                    },
                    z_index: node.z_index,
                    inert: node.inert,
                }
            })
            .collect()
    }

    /// Ordinary elements only, lowest priority first.
    pub fn elements(&self) -> Vec<NodeInfo> {
        self.nodes()
            .into_iter()
            .filter(|node| node.name.is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().nodes.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes())
            .finish()
    }
}
