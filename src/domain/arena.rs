//! Arena-backed dominance hierarchy.
//!
//! Every node lives in a single generational arena and is addressed by its
//! [`Index`]. Child lists own their entries, parent links are plain indices,
//! so detaching and re-attaching a subtree is an index rewrite.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument, trace};

use crate::domain::error::InvariantViolation;
use crate::domain::point::{Point, PointId};

/// Default number of levels shown by [`DominanceTree::to_tree_string`].
pub const RENDER_DEPTH: usize = 32;

/// Handle to a node returned by [`DominanceTree::insert`].
pub type NodeHandle = Index;

/// The level a node hangs from: the virtual root or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Root,
    Node(Index),
}

/// A point together with the points it directly dominates.
#[derive(Debug)]
pub struct DominanceNode {
    /// The point owned by this node
    pub point: Point,
    /// Level this node is attached to, None while detached
    pub parent: Option<Anchor>,
    /// Directly dominated nodes, pairwise incomparable
    pub children: Vec<Index>,
}

impl DominanceNode {
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }
}

/// Dominance forest under a virtual root.
///
/// The root's children are exactly the current skyline. Every other node
/// is dominated by its parent, and siblings never dominate each other.
#[derive(Debug, Default)]
pub struct DominanceTree {
    arena: Arena<DominanceNode>,
    /// Children of the virtual root
    roots: Vec<Index>,
    /// Active identifiers and the node owning each of them
    active: HashMap<PointId, Index>,
}

impl DominanceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active points.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.active.get(&id).map(|&idx| &self.arena[idx].point)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&DominanceNode> {
        self.arena.get(handle)
    }

    /// Identifier of the node `id` hangs under, None for skyline members
    /// and inactive points.
    pub fn parent_of(&self, id: PointId) -> Option<PointId> {
        let idx = *self.active.get(&id)?;
        match self.arena[idx].parent? {
            Anchor::Root => None,
            Anchor::Node(parent) => Some(self.arena[parent].point.id()),
        }
    }

    pub fn is_skyline_member(&self, id: PointId) -> bool {
        self.active
            .get(&id)
            .is_some_and(|&idx| self.arena[idx].parent == Some(Anchor::Root))
    }

    /// Insert a point and place it below its closest dominator.
    ///
    /// An identifier that is already active is ejected first, so the
    /// active index stays one-to-one.
    #[instrument(level = "trace", skip(self, point), fields(id = %point.id()))]
    pub fn insert(&mut self, point: Point) -> NodeHandle {
        let id = point.id();
        if self.active.contains_key(&id) {
            debug!(%id, "point already active, replacing");
            self.eject(id);
        }

        let node = self.arena.insert(DominanceNode {
            point,
            parent: None,
            children: Vec::new(),
        });
        self.active.insert(id, node);
        self.place(Anchor::Root, node);

        debug!(%id, skyline = self.roots.len(), active = self.active.len(), "inserted");
        node
    }

    /// Remove a point and re-derive the position of its orphaned children.
    ///
    /// Unknown identifiers are ignored. Returns the removed point.
    #[instrument(level = "trace", skip(self))]
    pub fn eject(&mut self, id: PointId) -> Option<Point> {
        let Some(node) = self.active.remove(&id) else {
            trace!(%id, "eject of inactive point ignored");
            return None;
        };

        self.detach(node);
        let removed = self.arena.remove(node)?;

        let orphans = removed.children.len();
        for child in removed.children {
            self.arena[child].parent = None;
            self.place(Anchor::Root, child);
        }

        debug!(%id, orphans, skyline = self.roots.len(), "ejected");
        Some(removed.point)
    }

    /// Identifiers of the current skyline in ascending order.
    pub fn skyline(&self) -> Vec<PointId> {
        let mut ids: Vec<PointId> = self.skyline_points().map(Point::id).collect();
        ids.sort_unstable();
        ids
    }

    /// Skyline points in attachment order.
    pub fn skyline_points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.roots.iter().map(|&idx| &self.arena[idx].point)
    }

    pub fn children_of(&self, anchor: Anchor) -> &[Index] {
        match anchor {
            Anchor::Root => &self.roots,
            Anchor::Node(idx) => &self.arena[idx].children,
        }
    }

    /// Pre-order traversal over all attached nodes.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Length of the longest root-to-leaf path, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&root| (root, 1)).collect();
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.arena[idx].children.iter().map(|&child| (child, level + 1)));
        }
        deepest
    }

    /// Number of nodes strictly below `idx`.
    fn descendants(&self, idx: Index) -> usize {
        let mut count = 0;
        let mut stack = self.arena[idx].children.clone();
        while let Some(next) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.arena[next].children);
        }
        count
    }

    /// Render the forest below a `skyline` label, at most [`RENDER_DEPTH`]
    /// levels deep.
    pub fn to_tree_string(&self) -> Tree<String> {
        self.to_tree_string_bounded(RENDER_DEPTH)
    }

    /// Render at most `max_depth` levels. Deeper subtrees collapse into a
    /// single leaf counting the hidden points.
    pub fn to_tree_string_bounded(&self, max_depth: usize) -> Tree<String> {
        fn build(tree: &DominanceTree, idx: Index, remaining: usize) -> Tree<String> {
            let node = &tree.arena[idx];
            let label = node.point.to_string();
            if node.children.is_empty() {
                return Tree::new(label);
            }
            if remaining <= 1 {
                let hidden = tree.descendants(idx);
                return Tree::new(label).with_leaves([Tree::new(format!("... {} more below", hidden))]);
            }
            Tree::new(label).with_leaves(
                node.children
                    .iter()
                    .map(|&child| build(tree, child, remaining - 1)),
            )
        }

        let max_depth = max_depth.max(1);
        Tree::new("skyline".to_string())
            .with_leaves(self.roots.iter().map(|&root| build(self, root, max_depth)))
    }

    /// Verify parent dominance, sibling incomparability, link consistency
    /// and that the active index covers exactly the attached nodes.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut reached = 0usize;
        let mut stack = vec![Anchor::Root];

        while let Some(level) = stack.pop() {
            let children = self.children_of(level);
            for (i, &child) in children.iter().enumerate() {
                let node = self
                    .arena
                    .get(child)
                    .ok_or_else(|| InvariantViolation::DanglingChild(format!("{child:?}")))?;
                if node.parent != Some(level) {
                    return Err(InvariantViolation::BrokenParentLink(node.point.id()));
                }
                if let Anchor::Node(parent) = level {
                    let parent = &self.arena[parent].point;
                    if !parent.dominates(&node.point) {
                        return Err(InvariantViolation::ParentDoesNotDominate {
                            parent: parent.id(),
                            child: node.point.id(),
                        });
                    }
                }
                for &other in &children[i + 1..] {
                    let other = &self.arena[other].point;
                    if !node.point.is_incomparable(other) {
                        return Err(InvariantViolation::ComparableSiblings {
                            a: node.point.id(),
                            b: other.id(),
                        });
                    }
                }
                match self.active.get(&node.point.id()) {
                    Some(&idx) if idx == child => {}
                    _ => return Err(InvariantViolation::NotIndexed(node.point.id())),
                }
                reached += 1;
                stack.push(Anchor::Node(child));
            }
        }

        if reached != self.active.len() || reached != self.arena.len() {
            return Err(InvariantViolation::CountMismatch {
                attached: reached,
                indexed: self.active.len(),
                allocated: self.arena.len(),
            });
        }
        Ok(())
    }

    /// Walk down from `level` and attach `node` below its closest dominator.
    ///
    /// `node` is moved as a unit with whatever subtree it already carries.
    fn place(&mut self, mut level: Anchor, node: Index) {
        loop {
            let (dominator, dominated) = self.scan(level, node);
            if let Some(next) = dominator {
                debug_assert!(dominated.is_empty(), "siblings must be incomparable");
                level = Anchor::Node(next);
                continue;
            }

            // A fresh node can adopt former siblings as-is: they are
            // already pairwise incomparable. A recycled subtree has to
            // sort them in among its existing children.
            let fresh = self.arena[node].children.is_empty();
            for &sibling in &dominated {
                self.detach(sibling);
            }
            self.attach(level, node);
            for sibling in dominated {
                if fresh {
                    self.attach(Anchor::Node(node), sibling);
                } else {
                    self.place(Anchor::Node(node), sibling);
                }
            }
            return;
        }
    }

    /// Compare `node` against every child of `level`. Returns the first
    /// sibling dominating it, or the siblings it dominates.
    fn scan(&self, level: Anchor, node: Index) -> (Option<Index>, Vec<Index>) {
        let candidate = &self.arena[node].point;
        let mut dominated = Vec::new();
        for &sibling in self.children_of(level) {
            let other = &self.arena[sibling].point;
            if other.dominates(candidate) {
                return (Some(sibling), dominated);
            }
            if candidate.dominates(other) {
                dominated.push(sibling);
            }
        }
        (None, dominated)
    }

    fn children_mut(&mut self, anchor: Anchor) -> &mut Vec<Index> {
        match anchor {
            Anchor::Root => &mut self.roots,
            Anchor::Node(idx) => &mut self.arena[idx].children,
        }
    }

    fn attach(&mut self, level: Anchor, node: Index) {
        self.children_mut(level).push(node);
        self.arena[node].parent = Some(level);
    }

    fn detach(&mut self, node: Index) {
        if let Some(parent) = self.arena[node].parent.take() {
            let siblings = self.children_mut(parent);
            if let Some(pos) = siblings.iter().position(|&c| c == node) {
                siblings.remove(pos);
            }
        }
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a DominanceTree,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a DominanceTree) -> Self {
        // Reverse so traversal runs left-to-right
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a DominanceNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.tree.arena.get(current)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some((current, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u64, coords: &[f64]) -> Point {
        Point::new(id, coords.to_vec(), coords.len()).unwrap()
    }

    fn ids(raw: &[u64]) -> Vec<PointId> {
        raw.iter().copied().map(PointId).collect()
    }

    #[test]
    fn test_insert_into_empty_tree_joins_skyline() {
        let mut tree = DominanceTree::new();
        let handle = tree.insert(p(1, &[1.0, 2.0]));

        assert_eq!(tree.skyline(), ids(&[1]));
        assert!(tree.node(handle).unwrap().is_attached());
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_dominated_point_nests_under_dominator() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[2.0, 2.0]));
        tree.insert(p(2, &[5.0, 5.0]));
        tree.insert(p(3, &[1.0, 3.0]));

        assert_eq!(tree.skyline(), ids(&[1, 3]));
        assert_eq!(tree.parent_of(PointId(2)), Some(PointId(1)));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_dominating_point_adopts_several_siblings() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[3.0, 4.0]));
        tree.insert(p(2, &[4.0, 3.0]));
        tree.insert(p(3, &[0.0, 9.0]));
        tree.insert(p(4, &[1.0, 1.0]));

        assert_eq!(tree.skyline(), ids(&[3, 4]));
        assert_eq!(tree.parent_of(PointId(1)), Some(PointId(4)));
        assert_eq!(tree.parent_of(PointId(2)), Some(PointId(4)));
        assert_eq!(tree.depth(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_eject_promotes_orphan_to_skyline() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));
        assert_eq!(tree.skyline(), ids(&[1]));

        let removed = tree.eject(PointId(1)).unwrap();

        assert_eq!(removed.id(), PointId(1));
        assert_eq!(tree.skyline(), ids(&[2]));
        assert!(!tree.contains(PointId(1)));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_eject_moves_orphan_with_its_subtree() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));
        tree.insert(p(3, &[3.0, 3.0]));
        assert_eq!(tree.depth(), 3);

        tree.eject(PointId(1));

        assert_eq!(tree.skyline(), ids(&[2]));
        assert_eq!(tree.parent_of(PointId(3)), Some(PointId(2)));
        assert_eq!(tree.depth(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_eject_reattaches_orphan_under_other_dominator() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[0.0, 3.0]));
        tree.insert(p(3, &[2.0, 4.0]));
        assert_eq!(tree.parent_of(PointId(3)), Some(PointId(1)));

        tree.eject(PointId(1));

        assert_eq!(tree.skyline(), ids(&[2]));
        assert_eq!(tree.parent_of(PointId(3)), Some(PointId(2)));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_eject_inner_node_keeps_skyline() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));
        tree.insert(p(3, &[3.0, 3.0]));

        tree.eject(PointId(2));

        assert_eq!(tree.skyline(), ids(&[1]));
        assert_eq!(tree.parent_of(PointId(3)), Some(PointId(1)));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_eject_unknown_id_is_noop() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 0.5]));

        assert!(tree.eject(PointId(42)).is_none());
        assert!(tree.eject(PointId(42)).is_none());

        assert_eq!(tree.skyline(), ids(&[1, 2]));
        assert_eq!(tree.len(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_reinserting_active_id_replaces_node() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));
        tree.insert(p(1, &[3.0, 3.0]));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.skyline(), ids(&[2]));
        assert_eq!(tree.get(PointId(1)).unwrap().coords(), &[3.0, 3.0]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_equal_points_are_both_skyline() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[1.0, 1.0]));

        assert_eq!(tree.skyline(), ids(&[1, 2]));
    }

    #[test]
    fn test_preorder_iteration_visits_every_node() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));
        tree.insert(p(3, &[0.0, 5.0]));

        let visited: Vec<PointId> = tree.iter().map(|(_, node)| node.point.id()).collect();
        assert_eq!(visited, ids(&[1, 2, 3]));
    }

    #[test]
    fn test_tree_string_lists_hierarchy() {
        let mut tree = DominanceTree::new();
        tree.insert(p(1, &[1.0, 1.0]));
        tree.insert(p(2, &[2.0, 2.0]));

        let rendered = tree.to_tree_string().to_string();
        assert!(rendered.starts_with("skyline"));
        assert!(rendered.contains("#1 (1, 1)"));
        assert!(rendered.contains("#2 (2, 2)"));
    }

    #[test]
    fn test_tree_string_collapses_levels_past_limit() {
        let mut tree = DominanceTree::new();
        for i in 1..=5u64 {
            tree.insert(p(i, &[i as f64, i as f64]));
        }

        let rendered = tree.to_tree_string_bounded(2).to_string();

        assert!(rendered.contains("#2 (2, 2)"));
        assert!(!rendered.contains("#3 (3, 3)"));
        assert!(rendered.contains("... 3 more below"));
    }
}
