//! Depth-first traversal over an owned mdast tree.
//!
//! Visitors receive the matched node together with a [`NodePath`]. Paths are
//! plain index lists, so a traversal can record where to mutate and the
//! mutation can be applied afterwards against the same owned tree without
//! holding references across the walk.

use markdown::mdast::Node;

/// Location of a node: the index path of its parent from the root, plus its
/// position among the parent's children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    /// Child indices leading from the root to the parent.
    pub parent: Vec<usize>,
    /// Index of the node inside the parent's children.
    pub index: usize,
}

impl NodePath {
    /// Depth of the node below the root (top-level children have depth 1).
    pub fn depth(&self) -> usize {
        self.parent.len() + 1
    }

    /// Full index path from the root to the node.
    pub fn to_indices(&self) -> Vec<usize> {
        let mut indices = self.parent.clone();
        indices.push(self.index);
        indices
    }
}

/// Visits every descendant of `root` matching `predicate`, pre-order.
///
/// The root itself is never visited.
pub fn walk<P, V>(root: &Node, mut predicate: P, mut visit: V)
where
    P: FnMut(&Node) -> bool,
    V: FnMut(&Node, &NodePath),
{
    let mut trail = Vec::new();
    walk_children(root, &mut trail, &mut predicate, &mut visit);
}

fn walk_children<P, V>(node: &Node, trail: &mut Vec<usize>, predicate: &mut P, visit: &mut V)
where
    P: FnMut(&Node) -> bool,
    V: FnMut(&Node, &NodePath),
{
    let Some(children) = node.children() else {
        return;
    };
    for (index, child) in children.iter().enumerate() {
        if predicate(child) {
            let path = NodePath {
                parent: trail.clone(),
                index,
            };
            visit(child, &path);
        }
        trail.push(index);
        walk_children(child, trail, predicate, visit);
        trail.pop();
    }
}

/// Mutable variant of [`walk`].
///
/// The visitor may edit the node in place, including its children; the walk
/// then descends into whatever children the node has after the edit.
pub fn walk_mut<P, V>(root: &mut Node, mut predicate: P, mut visit: V)
where
    P: FnMut(&Node) -> bool,
    V: FnMut(&mut Node, &NodePath),
{
    let mut trail = Vec::new();
    walk_children_mut(root, &mut trail, &mut predicate, &mut visit);
}

fn walk_children_mut<P, V>(
    node: &mut Node,
    trail: &mut Vec<usize>,
    predicate: &mut P,
    visit: &mut V,
) where
    P: FnMut(&Node) -> bool,
    V: FnMut(&mut Node, &NodePath),
{
    let Some(children) = node.children_mut() else {
        return;
    };
    for (index, child) in children.iter_mut().enumerate() {
        if predicate(&*child) {
            let path = NodePath {
                parent: trail.clone(),
                index,
            };
            visit(child, &path);
        }
        trail.push(index);
        walk_children_mut(child, trail, predicate, visit);
        trail.pop();
    }
}

/// Records the path of every descendant matching `predicate`.
pub fn collect_paths<P>(root: &Node, mut predicate: P) -> Vec<NodePath>
where
    P: FnMut(&Node, &NodePath) -> bool,
{
    let mut paths = Vec::new();
    walk(
        root,
        |_| true,
        |node, path| {
            if predicate(node, path) {
                paths.push(path.clone());
            }
        },
    );
    paths
}

/// Resolves a path against the tree.
pub fn node_at<'a>(root: &'a Node, path: &NodePath) -> Option<&'a Node> {
    let mut current = root;
    for index in path.to_indices() {
        current = current.children()?.get(index)?;
    }
    Some(current)
}

/// Resolves a path against the tree, mutably.
pub fn node_at_mut<'a>(root: &'a mut Node, path: &NodePath) -> Option<&'a mut Node> {
    let mut current = root;
    for index in path.to_indices() {
        current = current.children_mut()?.get_mut(index)?;
    }
    Some(current)
}

/// Replaces the node at `path`, returning the node that was there.
///
/// Returns `None` and leaves the tree untouched when the path no longer
/// resolves.
pub fn replace_at(root: &mut Node, path: &NodePath, replacement: Node) -> Option<Node> {
    let slot = node_at_mut(root, path)?;
    Some(std::mem::replace(slot, replacement))
}
