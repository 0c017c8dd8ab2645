use std::collections::HashMap;

use crate::api::{ArgOption, ChildHeader, NodeId, Tree};
use crate::model::ParseFlags;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A child as seen by its parent's descriptor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChildDescriptor {
    pub(crate) descriptor: usize,
    pub(crate) flags: ParseFlags,
    pub(crate) header: ChildHeader,
    pub(crate) group: i32,
}

/// A snapshot of one parser, taken at the start of a parse.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Descriptor {
    pub(crate) options: Vec<ArgOption>,
    pub(crate) children: Vec<ChildDescriptor>,
    pub(crate) usage: String,
    pub(crate) pre_doc: String,
    pub(crate) post_doc: String,
    /// The effective flags (the global parse flags for the root).
    pub(crate) flags: ParseFlags,
}

/// The parser tree flattened into descriptors, children before their parents.
#[derive(Debug)]
pub(crate) struct Flattened {
    descriptors: Vec<Descriptor>,
    owners: Vec<NodeId>,
    index_of: HashMap<NodeId, usize>,
    root: usize,
}

impl Flattened {
    pub(crate) fn root(&self) -> usize {
        self.root
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub(crate) fn descriptor(&self, index: usize) -> &Descriptor {
        &self.descriptors[index]
    }

    pub(crate) fn owner(&self, index: usize) -> NodeId {
        self.owners[index]
    }

    pub(crate) fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index_of.get(&node).copied()
    }

    /// The nodes of `node`'s children, in flattening order.
    pub(crate) fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        match self.index_of(node) {
            Some(index) => self.descriptors[index]
                .children
                .iter()
                .map(|child| self.owners[child.descriptor])
                .collect(),
            None => Vec::default(),
        }
    }

    pub(crate) fn effective_flags(&self, node: NodeId) -> ParseFlags {
        match self.index_of(node) {
            Some(index) => self.descriptors[index].flags,
            None => self.descriptors[self.root].flags,
        }
    }

    /// Descriptor indices, parents before children.
    pub(crate) fn pre_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.descriptors.len());
        let mut stack = vec![self.root];

        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(
                self.descriptors[index]
                    .children
                    .iter()
                    .rev()
                    .map(|child| child.descriptor),
            );
        }

        out
    }
}

/// Flatten the tree under `flags`, or `None` when there is no root.
///
/// A child's effective flags are its own when set, and its parent's otherwise.
/// Nothing is written back to the tree, so flattening the same tree twice gives the same result.
pub(crate) fn flatten(tree: &Tree, flags: ParseFlags) -> Option<Flattened> {
    let root = tree.root()?;
    let mut flattened = Flattened {
        descriptors: Vec::with_capacity(tree.len()),
        owners: Vec::with_capacity(tree.len()),
        index_of: HashMap::default(),
        root: 0,
    };
    flattened.root = visit(tree, root, flags, &mut flattened);

    #[cfg(feature = "tracing_debug")]
    {
        for (index, descriptor) in flattened.descriptors.iter().enumerate() {
            debug!(
                "Flattened {} as descriptor {index} with effective flags {}.",
                flattened.owners[index], descriptor.flags
            );
        }
    }

    Some(flattened)
}

fn visit(tree: &Tree, id: NodeId, effective: ParseFlags, out: &mut Flattened) -> usize {
    let node = tree
        .get(id)
        .expect("internal error - flattened node must be in the tree");
    let mut children = Vec::with_capacity(node.children().len());

    for child_id in node.children() {
        let child = tree
            .get(*child_id)
            .expect("internal error - flattened child must be in the tree");
        let child_flags = if child.child_flags().is_empty() {
            effective
        } else {
            child.child_flags()
        };
        let descriptor = visit(tree, *child_id, child_flags, out);
        children.push(ChildDescriptor {
            descriptor,
            flags: child_flags,
            header: child.child_header().clone(),
            group: child.group(),
        });
    }

    let index = out.descriptors.len();
    out.descriptors.push(Descriptor {
        options: node.options().as_slice().to_vec(),
        children,
        usage: node.usage().to_string(),
        pre_doc: node.pre_doc().to_string(),
        post_doc: node.post_doc().to_string(),
        flags: effective,
    });
    out.owners.push(id);
    out.index_of.insert(id, index);
    index
}
