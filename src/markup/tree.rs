//! Arena-backed element tree with explicit subtree release.
//!
//! Nodes live in slots addressed by [`NodeId`]. Freed slots are reused, and
//! every id carries the generation of its slot so a stale id never aliases a
//! newer node.

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

/// Element tree built incrementally by the pull parser.
#[derive(Debug, Default)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    peak: usize,
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node as the last child of `parent` (or as a detached root).
    pub fn create(
        &mut self,
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let data = NodeData {
            tag: tag.into(),
            attrs,
            text: String::new(),
            parent: parent.filter(|p| self.contains(*p)),
            children: Vec::new(),
        };

        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(data);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(data),
            });
            NodeId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        };

        if let Some(parent) = parent
            && let Some(parent_node) = self.get_mut(parent)
        {
            parent_node.children.push(id);
        }

        self.live += 1;
        self.peak = self.peak.max(self.live);
        id
    }

    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Whether `id` still refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Lowercased tag name.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|node| node.tag.as_str())
    }

    /// Value of attribute `name`; `None` when the attribute is absent.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text preceding the first child element; `None` when there is none.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)
            .map(|node| node.text.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Appends character data to a node that has no child elements yet.
    ///
    /// Text following a child element is dropped.
    pub fn append_text(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.get_mut(id)
            && node.children.is_empty()
        {
            node.text.push_str(text);
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// The `index`-th child element.
    #[must_use]
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Highest number of simultaneously live nodes seen so far.
    #[must_use]
    pub fn peak_live_count(&self) -> usize {
        self.peak
    }

    /// Drops the node's attributes, text and whole subtree; the node itself stays.
    pub fn clear(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        node.attrs = Vec::new();
        node.text = String::new();
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.free_subtree(child);
        }
    }

    /// Detaches the node from its parent and frees its whole subtree.
    pub fn release(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id)
            && let Some(parent_node) = self.get_mut(parent)
        {
            parent_node.children.retain(|child| *child != id);
        }
        self.free_subtree(id);
    }

    /// Frees every sibling that precedes the node under its parent.
    pub fn remove_preceding_siblings(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(parent_node) = self.get_mut(parent) else {
            return;
        };
        let Some(position) = parent_node.children.iter().position(|child| *child == id) else {
            return;
        };
        let preceding: Vec<NodeId> = parent_node.children.drain(..position).collect();
        for sibling in preceding {
            self.free_subtree(sibling);
        }
    }

    /// Marks a closed node as processed: clears it, then removes every
    /// preceding sibling of the node and of each of its ancestors.
    ///
    /// Those nodes precede the parse position and can never be inspected again.
    pub fn discard_processed(&mut self, id: NodeId) {
        self.clear(id);
        let mut current = Some(id);
        while let Some(node) = current {
            self.remove_preceding_siblings(node);
            current = self.parent(node);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(slot) = self.slots.get_mut(next.index) else {
                continue;
            };
            if slot.generation != next.generation {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(next.index);
            self.live -= 1;
            pending.extend(node.children);
        }
    }
}
