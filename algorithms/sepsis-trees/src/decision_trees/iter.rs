use std::iter::Iterator;

use super::TreeNode;
use sepsis_forest::Float;

/// Depth-first pre-order iterator of the nodes reachable from the root of a decision tree
pub struct NodeIter<'a, F> {
    nodes: &'a [TreeNode<F>],
    stack: Vec<usize>,
}

impl<'a, F> NodeIter<'a, F> {
    pub fn new(nodes: &'a [TreeNode<F>]) -> Self {
        let stack = if nodes.is_empty() { vec![] } else { vec![0] };

        NodeIter { nodes, stack }
    }
}

impl<'a, F: Float> Iterator for NodeIter<'a, F> {
    type Item = &'a TreeNode<F>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.nodes[idx];

        // right first, so that the left subtree is visited next
        let [left, right] = node.children();
        self.stack.extend(right);
        self.stack.extend(left);

        Some(node)
    }
}
