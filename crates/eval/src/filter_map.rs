//! Flattened rule trees.
//!
//! A `FilterMap` stores every node of a rule tree under its id. Groups
//! keep the ids of their conditions instead of the conditions
//! themselves, and every node records its parent. The root is the node
//! that is its own parent.
//!
//! The flat form is for editing: appending, removing, and toggling
//! touch only the nodes involved. `from_filter_map` rebuilds the tree
//! for normalization and compilation.
//!
//! For any tree `t` with unique ids and a group at the root,
//! `from_filter_map(&to_filter_map(&t, None)?, None)? == t`.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use sift_core::{GroupOp, RuleGroup, RuleId, RuleLeaf, RuleNode};

use crate::error::EvalError;

/// One entry of a `FilterMap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MapNode<L> {
    #[serde(rename_all = "camelCase")]
    Filter { data: L, parent_id: RuleId },
    #[serde(rename_all = "camelCase")]
    Group {
        id: RuleId,
        op: GroupOp,
        #[serde(default)]
        invert: bool,
        condition_ids: Vec<RuleId>,
        parent_id: RuleId,
    },
}

impl<L> MapNode<L> {
    pub fn parent_id(&self) -> &RuleId {
        match self {
            MapNode::Filter { parent_id, .. } | MapNode::Group { parent_id, .. } => parent_id,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, MapNode::Group { .. })
    }
}

/// A rule tree keyed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap<L> {
    nodes: HashMap<RuleId, MapNode<L>>,
}

impl<L> Default for FilterMap<L> {
    fn default() -> Self {
        FilterMap {
            nodes: HashMap::new(),
        }
    }
}

/// Flatten `tree` breadth-first.
///
/// The root's parent is `parent_of_root`, or the root itself when
/// omitted. Ids must be unique within the tree.
pub fn to_filter_map<L: RuleLeaf + Clone>(
    tree: &RuleNode<L>,
    parent_of_root: Option<&RuleId>,
) -> Result<FilterMap<L>, EvalError> {
    let mut map = FilterMap::default();
    let root_parent = parent_of_root.unwrap_or_else(|| tree.id()).clone();
    let mut queue: VecDeque<(&RuleNode<L>, RuleId)> = VecDeque::new();
    queue.push_back((tree, root_parent));

    while let Some((node, parent_id)) = queue.pop_front() {
        let id = node.id().clone();
        if map.nodes.contains_key(&id) {
            return Err(EvalError::DuplicateId { id });
        }
        let entry = match node {
            RuleNode::Leaf(leaf) => MapNode::Filter {
                data: leaf.clone(),
                parent_id,
            },
            RuleNode::Group(group) => {
                for child in &group.conditions {
                    queue.push_back((child, id.clone()));
                }
                MapNode::Group {
                    id: id.clone(),
                    op: group.op,
                    invert: group.invert,
                    condition_ids: group.conditions.iter().map(|c| c.id().clone()).collect(),
                    parent_id,
                }
            }
        };
        map.nodes.insert(id, entry);
    }
    Ok(map)
}

/// Rebuild the tree rooted at `root`.
///
/// Without an explicit root, the unique self-parented node is used and
/// it must be a group. An explicit root may be any node, which rebuilds
/// just that subtree.
pub fn from_filter_map<L: Clone>(
    map: &FilterMap<L>,
    root: Option<&RuleId>,
) -> Result<RuleNode<L>, EvalError> {
    let root_id = match root {
        Some(id) => {
            if !map.nodes.contains_key(id) {
                return Err(EvalError::UnknownId { id: id.clone() });
            }
            id.clone()
        }
        None => {
            let id = map.root_id()?;
            if !map.nodes.get(&id).is_some_and(MapNode::is_group) {
                return Err(EvalError::RootNotGroup { id });
            }
            id
        }
    };
    let mut visited = HashSet::new();
    build(map, &root_id, &mut visited)
}

fn build<L: Clone>(
    map: &FilterMap<L>,
    id: &RuleId,
    visited: &mut HashSet<RuleId>,
) -> Result<RuleNode<L>, EvalError> {
    if !visited.insert(id.clone()) {
        return Err(EvalError::Cycle { id: id.clone() });
    }
    let node = map
        .nodes
        .get(id)
        .ok_or_else(|| EvalError::DanglingId { id: id.clone() })?;
    match node {
        MapNode::Filter { data, .. } => Ok(RuleNode::Leaf(data.clone())),
        MapNode::Group {
            id,
            op,
            invert,
            condition_ids,
            ..
        } => {
            let conditions = condition_ids
                .iter()
                .map(|child| build(map, child, visited))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RuleNode::Group(RuleGroup {
                id: id.clone(),
                op: *op,
                conditions,
                invert: *invert,
            }))
        }
    }
}

/// Distance from `id` to the root. The root has depth 0.
pub fn depth_of<L>(map: &FilterMap<L>, id: &RuleId) -> Result<usize, EvalError> {
    let mut current = map
        .nodes
        .get(id)
        .ok_or_else(|| EvalError::UnknownId { id: id.clone() })?;
    let mut current_id = id;
    let mut depth = 0;
    loop {
        let parent = current.parent_id();
        if parent == current_id {
            return Ok(depth);
        }
        depth += 1;
        if depth > map.nodes.len() {
            return Err(EvalError::Cycle { id: id.clone() });
        }
        current = map
            .nodes
            .get(parent)
            .ok_or_else(|| EvalError::DanglingId { id: parent.clone() })?;
        current_id = parent;
    }
}

impl<L> FilterMap<L> {
    pub fn get(&self, id: &RuleId) -> Option<&MapNode<L>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &RuleId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RuleId> {
        self.nodes.keys()
    }

    /// The unique self-parented node.
    pub fn root_id(&self) -> Result<RuleId, EvalError> {
        let mut roots: Vec<&RuleId> = self
            .nodes
            .iter()
            .filter(|(id, node)| node.parent_id() == *id)
            .map(|(id, _)| id)
            .collect();
        match roots.len() {
            0 => Err(EvalError::NoRoot),
            1 => Ok(roots[0].clone()),
            _ => {
                roots.sort();
                Err(EvalError::MultipleRoots {
                    ids: roots.into_iter().cloned().collect(),
                })
            }
        }
    }

    fn group_mut(&mut self, id: &RuleId) -> Result<&mut MapNode<L>, EvalError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| EvalError::UnknownId { id: id.clone() })?;
        if node.is_group() {
            Ok(node)
        } else {
            Err(EvalError::NotAGroup { id: id.clone() })
        }
    }

    /// Flip a group between `and` and `or`. Returns the new connective.
    pub fn toggle_op(&mut self, id: &RuleId) -> Result<GroupOp, EvalError> {
        match self.group_mut(id)? {
            MapNode::Group { op, .. } => {
                *op = op.toggled();
                Ok(*op)
            }
            MapNode::Filter { .. } => Err(EvalError::NotAGroup { id: id.clone() }),
        }
    }

    /// Set the invert flag of a group or a single filter.
    pub fn set_invert(&mut self, id: &RuleId, value: bool) -> Result<(), EvalError>
    where
        L: RuleLeaf,
    {
        match self.nodes.get_mut(id) {
            Some(MapNode::Group { invert, .. }) => {
                *invert = value;
                Ok(())
            }
            Some(MapNode::Filter { data, .. }) => {
                data.set_invert(value);
                Ok(())
            }
            None => Err(EvalError::UnknownId { id: id.clone() }),
        }
    }

    /// Edit a single filter in place.
    ///
    /// An edit may rename the filter: the entry moves to the new id and
    /// its parent's condition list follows. Renaming onto an id that is
    /// already in the map is rolled back.
    pub fn update_filter<F>(&mut self, id: &RuleId, edit: F) -> Result<(), EvalError>
    where
        L: RuleLeaf + Clone,
        F: FnOnce(&mut L),
    {
        let (before, new_id) = match self.nodes.get_mut(id) {
            Some(MapNode::Filter { data, .. }) => {
                let before = data.clone();
                edit(data);
                if data.id() == id {
                    return Ok(());
                }
                (before, data.id().clone())
            }
            Some(MapNode::Group { .. }) => return Err(EvalError::NotAGroup { id: id.clone() }),
            None => return Err(EvalError::UnknownId { id: id.clone() }),
        };

        if self.nodes.contains_key(&new_id) {
            if let Some(MapNode::Filter { data, .. }) = self.nodes.get_mut(id) {
                *data = before;
            }
            return Err(EvalError::DuplicateId { id: new_id });
        }

        if let Some(mut node) = self.nodes.remove(id) {
            if let MapNode::Filter { parent_id, .. } = &mut node {
                if *parent_id == *id {
                    *parent_id = new_id.clone();
                } else if let Some(MapNode::Group { condition_ids, .. }) =
                    self.nodes.get_mut(&*parent_id)
                {
                    for child in condition_ids.iter_mut().filter(|c| **c == *id) {
                        *child = new_id.clone();
                    }
                }
            }
            self.nodes.insert(new_id, node);
        }
        Ok(())
    }

    /// Remove a node and everything below it, and unlink it from its
    /// parent. The root cannot be removed.
    pub fn remove(&mut self, id: &RuleId) -> Result<usize, EvalError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| EvalError::UnknownId { id: id.clone() })?
            .parent_id()
            .clone();
        if &parent == id {
            return Err(EvalError::RemoveRoot { id: id.clone() });
        }
        if let Some(MapNode::Group { condition_ids, .. }) = self.nodes.get_mut(&parent) {
            condition_ids.retain(|c| c != id);
        }
        let mut removed = 0;
        let mut pending = vec![id.clone()];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                removed += 1;
                if let MapNode::Group { condition_ids, .. } = node {
                    pending.extend(condition_ids);
                }
            }
        }
        Ok(removed)
    }
}

impl<L: RuleLeaf + Clone> FilterMap<L> {
    /// Build the flat form of a tree, rooted at itself.
    pub fn from_tree(tree: &RuleNode<L>) -> Result<Self, EvalError> {
        to_filter_map(tree, None)
    }

    /// Rebuild the tree from its self-parented root.
    pub fn to_tree(&self) -> Result<RuleNode<L>, EvalError> {
        from_filter_map(self, None)
    }

    /// Attach `node` (and its subtree) as the last condition of `parent`.
    ///
    /// Nothing is changed if any id of the new subtree is already used.
    pub fn append_child(&mut self, parent: &RuleId, node: RuleNode<L>) -> Result<(), EvalError> {
        self.group_mut(parent)?;
        let subtree = to_filter_map(&node, Some(parent))?;
        if let Some(taken) = subtree.nodes.keys().find(|id| self.nodes.contains_key(*id)) {
            return Err(EvalError::DuplicateId { id: taken.clone() });
        }
        if let Some(MapNode::Group { condition_ids, .. }) = self.nodes.get_mut(parent) {
            condition_ids.push(node.id().clone());
        }
        self.nodes.extend(subtree.nodes);
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
