use crate::api::{ConfigError, Node};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Handle to a parser in a [`ParserRegistry`](crate::ParserRegistry).
///
/// Handles are only valid for the tree they were created in.
/// Once the registry is cleared, old handles are rejected rather than aliasing new parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Arena of parser nodes; the first node inserted is the root.
#[derive(Debug, Default)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    generation: u32,
}

impl Tree {
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        if id.generation == self.generation {
            self.nodes.get(id.index)
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.generation == self.generation {
            self.nodes.get_mut(id.index)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Insert a node under `parent`, or as the root when the tree is empty.
    /// The caller guarantees `parent` is valid.
    pub(crate) fn insert(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId {
            index: self.nodes.len(),
            generation: self.generation,
        };
        let parent = parent.or(self.root);
        self.nodes.push(Node::new(parent));

        match parent {
            Some(parent) => self.nodes[parent.index].children.push(id),
            None => self.root = Some(id),
        }

        id
    }

    pub(crate) fn is_parent_valid(&self, parent: Option<NodeId>) -> bool {
        match (self.root, parent) {
            (root, None) => root.is_none(),
            (Some(root), Some(parent)) => root == parent || self.is_descendant(root, parent),
            (None, Some(_)) => false,
        }
    }

    pub(crate) fn is_direct_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.get(parent)
            .map(|node| node.children.contains(&child))
            .unwrap_or(false)
    }

    /// Whether `node` sits anywhere underneath `ancestor` (not counting `ancestor` itself).
    pub(crate) fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        match self.get(ancestor) {
            Some(ancestor) => ancestor
                .children
                .iter()
                .any(|child| *child == node || self.is_descendant(*child, node)),
            None => false,
        }
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ConfigError> {
        if !self.contains(child) {
            return Err(ConfigError::UnknownNode(child));
        }

        if !self.is_parent_valid(Some(parent)) {
            return Err(ConfigError::InvalidParent(parent));
        }

        if self.root == Some(child) {
            return Err(ConfigError::RootReparent(child));
        }

        if parent == child || self.is_descendant(child, parent) {
            return Err(ConfigError::Cycle { parent, child });
        }

        if self.is_direct_child(parent, child) {
            return Ok(());
        }

        if let Some(previous) = self.nodes[child.index].parent {
            self.nodes[previous.index]
                .children
                .retain(|sibling| *sibling != child);
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Re-parenting {child} under {parent}.");
        }

        self.nodes[child.index].parent = Some(parent);
        self.nodes[parent.index].children.push(child);
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn first_insert_is_root() {
        // Setup
        let mut tree = Tree::default();

        // Execute
        let root = tree.insert(None);
        let child = tree.insert(None);

        // Verify
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.get(child).unwrap().parent(), Some(root));
        assert_eq!(tree.get(root).unwrap().children(), &[child]);
        assert_eq!(tree.get(root).unwrap().parent(), None);
    }

    #[test]
    fn parent_validity() {
        let mut tree = Tree::default();
        assert!(tree.is_parent_valid(None));

        let root = tree.insert(None);
        let child = tree.insert(Some(root));
        let grandchild = tree.insert(Some(child));

        assert!(!tree.is_parent_valid(None));
        assert!(tree.is_parent_valid(Some(root)));
        assert!(tree.is_parent_valid(Some(child)));
        assert!(tree.is_parent_valid(Some(grandchild)));

        tree.clear();
        assert!(!tree.is_parent_valid(Some(root)));
        assert!(tree.is_parent_valid(None));
    }

    #[test]
    fn descendants() {
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));
        let b = tree.insert(Some(root));
        let a1 = tree.insert(Some(a));

        assert!(tree.is_direct_child(root, a));
        assert!(!tree.is_direct_child(root, a1));
        assert!(tree.is_descendant(root, a1));
        assert!(tree.is_descendant(a, a1));
        assert!(!tree.is_descendant(b, a1));
        assert!(!tree.is_descendant(a1, a1));
    }

    #[test]
    fn add_child_reparents() {
        // Setup
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));
        let b = tree.insert(Some(root));

        // Execute
        tree.add_child(b, a).unwrap();

        // Verify
        assert!(!tree.is_direct_child(root, a));
        assert!(tree.is_direct_child(b, a));
        assert_eq!(tree.get(a).unwrap().parent(), Some(b));
        assert_eq!(tree.get(root).unwrap().children(), &[b]);
    }

    #[test]
    fn add_child_idempotent() {
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));

        tree.add_child(root, a).unwrap();
        tree.add_child(root, a).unwrap();

        assert_eq!(tree.get(root).unwrap().children(), &[a]);
    }

    #[rstest]
    #[case(1, 0, ConfigError::RootReparent(id(0)))]
    #[case(1, 1, ConfigError::Cycle { parent: id(1), child: id(1) })]
    #[case(2, 1, ConfigError::Cycle { parent: id(2), child: id(1) })]
    #[case(0, 7, ConfigError::UnknownNode(id(7)))]
    fn add_child_rejected(
        #[case] parent: usize,
        #[case] child: usize,
        #[case] expected: ConfigError,
    ) {
        // Setup
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));
        tree.insert(Some(a));

        // Execute
        let result = tree.add_child(id(parent), id(child));

        // Verify
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn stale_handles() {
        let mut tree = Tree::default();
        let old = tree.insert(None);
        tree.clear();
        let new = tree.insert(None);

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(tree.get(old).is_none());
        assert!(tree.get(new).is_some());
        assert_eq!(tree.len(), 1);
    }

    fn id(index: usize) -> NodeId {
        NodeId {
            index,
            generation: 0,
        }
    }
}
