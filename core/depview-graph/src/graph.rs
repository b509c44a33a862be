use std::collections::{BTreeMap, BTreeSet};

use depview_protocol::{NodeIndex, TreeNodeId};
use tracing::debug;

use crate::error::{GraphError, Result};

/// Index of the synthetic root.
pub const ROOT: u32 = 0;

/// A parsed sentence as a governor/dependent graph keyed by token position.
///
/// Every mapping is keyed independently and kept in sync by the builder and
/// by [`DependencyGraph::prune`]. Markup tags only ever live in `word`, at
/// fractional [`NodeIndex`] keys; the other maps are keyed by token
/// position, so a markup key cannot leak into them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    pub(crate) node: BTreeMap<u32, TreeNodeId>,
    pub(crate) word: BTreeMap<NodeIndex, String>,
    pub(crate) tag: BTreeMap<u32, String>,
    pub(crate) lemma: BTreeMap<u32, String>,
    pub(crate) dep: BTreeMap<u32, u32>,
    pub(crate) rel: BTreeMap<u32, String>,
    pub(crate) children: BTreeMap<u32, Vec<u32>>,
}

/// A token row handed to [`DependencyGraph::insert_token`].
#[derive(Debug, Clone)]
pub(crate) struct TokenEntry {
    pub handle: TreeNodeId,
    pub word: String,
    pub tag: String,
    pub lemma: String,
    pub governor: u32,
    pub relation: String,
}

impl DependencyGraph {
    pub(crate) fn insert_token(&mut self, idx: u32, entry: TokenEntry) {
        if self.node.contains_key(&idx) {
            // Re-linking without unhooking first would leave a stale child.
            self.unlink(idx);
        }

        self.node.insert(idx, entry.handle);
        self.word.insert(NodeIndex::token(idx), entry.word);
        self.tag.insert(idx, entry.tag);
        self.lemma.insert(idx, entry.lemma);
        self.rel.insert(idx, entry.relation);
        self.dep.insert(idx, entry.governor);
        self.children.entry(entry.governor).or_default().push(idx);
    }

    pub(crate) fn insert_markup(&mut self, key: NodeIndex, text: String) {
        debug_assert!(key.is_markup(), "markup stored at token key {key}");
        self.word.insert(key, text);
    }

    /// Number of tokens (markup excluded).
    pub fn len(&self) -> usize {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    pub fn contains(&self, idx: u32) -> bool {
        self.node.contains_key(&idx)
    }

    /// Token positions in ascending order.
    pub fn tokens(&self) -> impl Iterator<Item = u32> + '_ {
        self.node.keys().copied()
    }

    /// Markup tags with their fractional keys, in surface order.
    pub fn markup(&self) -> impl Iterator<Item = (NodeIndex, &str)> + '_ {
        self.word
            .iter()
            .filter(|(key, _)| key.is_markup())
            .map(|(key, text)| (*key, text.as_str()))
    }

    pub fn word(&self, idx: u32) -> Option<&str> {
        self.word_at(NodeIndex::token(idx))
    }

    /// Word or markup tag stored at any key.
    pub fn word_at(&self, key: NodeIndex) -> Option<&str> {
        self.word.get(&key).map(String::as_str)
    }

    pub fn tag(&self, idx: u32) -> Option<&str> {
        self.tag.get(&idx).map(String::as_str)
    }

    pub fn lemma(&self, idx: u32) -> Option<&str> {
        self.lemma.get(&idx).map(String::as_str)
    }

    pub fn relation(&self, idx: u32) -> Option<&str> {
        self.rel.get(&idx).map(String::as_str)
    }

    /// Recorded governor, `Some(ROOT)` for root-attached tokens.
    pub fn governor(&self, idx: u32) -> Option<u32> {
        self.dep.get(&idx).copied()
    }

    pub fn handle(&self, idx: u32) -> Option<TreeNodeId> {
        self.node.get(&idx).copied()
    }

    fn ensure_known(&self, idx: u32) -> Result<()> {
        if idx == ROOT || self.node.contains_key(&idx) {
            Ok(())
        } else {
            Err(GraphError::UnknownIndex(idx))
        }
    }

    fn child_slice(&self, idx: u32) -> &[u32] {
        self.children.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Child positions of `idx` in insertion order.
    pub fn child_indices(&self, idx: u32) -> Result<&[u32]> {
        self.ensure_known(idx)?;
        Ok(self.child_slice(idx))
    }

    /// Handle of the governor of `idx` and the relation label on the arc.
    /// `None` when `idx` hangs from the synthetic root.
    pub fn get_head(&self, idx: u32) -> Result<Option<(TreeNodeId, &str)>> {
        self.ensure_known(idx)?;
        let head = match self.dep.get(&idx) {
            Some(&parent) if parent != ROOT => self
                .node
                .get(&parent)
                .zip(self.rel.get(&idx))
                .map(|(handle, rel)| (*handle, rel.as_str())),
            _ => None,
        };
        Ok(head)
    }

    /// `(child handle, relation)` pairs in insertion order.
    ///
    /// The iterator is cloneable, so it can be replayed without asking the
    /// graph again.
    pub fn get_children(
        &self,
        idx: u32,
    ) -> Result<impl Iterator<Item = (TreeNodeId, &str)> + Clone + '_> {
        let ids = self.child_indices(idx)?;
        Ok(ids.iter().filter_map(move |child| {
            let handle = self.node.get(child)?;
            let rel = self.rel.get(child)?;
            Some((*handle, rel.as_str()))
        }))
    }

    /// `start` followed by everything below it, depth first in child order.
    pub fn get_descendants(&self, start: u32) -> Result<Vec<u32>> {
        self.ensure_known(start)?;

        let mut descendants = vec![start];
        let mut seen = BTreeSet::from([start]);
        let mut stack: Vec<u32> = self.child_slice(start).iter().rev().copied().collect();

        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            descendants.push(idx);
            stack.extend(self.child_slice(idx).iter().rev().copied());
        }

        Ok(descendants)
    }

    /// Removes `idx` and its whole subtree. Returns the removed positions.
    pub fn prune(&mut self, idx: u32) -> Result<Vec<u32>> {
        let doomed = self.get_descendants(idx)?;
        for &i in &doomed {
            self.delete_node(i);
        }

        debug!(root = idx, removed = doomed.len(), remaining = self.len(), "pruned subtree");
        debug_assert!(
            self.check_consistency().is_ok(),
            "prune left the graph inconsistent: {:?}",
            self.check_consistency()
        );
        Ok(doomed)
    }

    fn delete_node(&mut self, idx: u32) {
        self.node.remove(&idx);
        self.word.remove(&NodeIndex::token(idx));
        self.tag.remove(&idx);
        self.lemma.remove(&idx);
        self.rel.remove(&idx);
        self.unlink(idx);
        self.children.remove(&idx);
    }

    /// Detaches `idx` from its governor's child list.
    fn unlink(&mut self, idx: u32) {
        let Some(parent) = self.dep.remove(&idx) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&child| child != idx);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    /// `idx`, its governor, the governor's governor and so on, ending with
    /// the root once it is reached.
    pub fn path_to_root(&self, idx: u32) -> Result<Vec<u32>> {
        self.ensure_known(idx)?;

        let mut path = vec![idx];
        let mut current = idx;
        while current != ROOT {
            let Some(&parent) = self.dep.get(&current) else {
                break;
            };
            if path.contains(&parent) {
                // governor cycle
                break;
            }
            path.push(parent);
            current = parent;
        }
        Ok(path)
    }

    /// Lowest common ancestor of `i` and `j` and the path joining them:
    /// `i` up to the ancestor, then `j` up to (not including) the ancestor.
    ///
    /// Yields `(None, [])` when the two nodes share no ancestor.
    pub fn get_least_common_node(&self, i: u32, j: u32) -> Result<(Option<u32>, Vec<u32>)> {
        let path1 = self.path_to_root(i)?;
        let path2 = self.path_to_root(j)?;

        let common = path1.iter().enumerate().find_map(|(pos1, idx)| {
            path2
                .iter()
                .position(|other| other == idx)
                .map(|pos2| (pos1, pos2))
        });

        Ok(match common {
            Some((pos1, pos2)) => {
                let mut path = path1[..=pos1].to_vec();
                path.extend_from_slice(&path2[..pos2]);
                (Some(path1[pos1]), path)
            }
            None => (None, Vec::new()),
        })
    }

    /// Verifies that `dep` and `children` mirror each other and that every
    /// token has a full row.
    pub fn check_consistency(&self) -> Result<()> {
        for (&child, &parent) in &self.dep {
            if parent != ROOT && !self.node.contains_key(&parent) {
                return Err(GraphError::IndexConsistency(format!(
                    "dep[{child}] = {parent}, which is neither the root nor a token"
                )));
            }
            if !self.child_slice(parent).contains(&child) {
                return Err(GraphError::IndexConsistency(format!(
                    "dep[{child}] = {parent} but children[{parent}] lacks {child}"
                )));
            }
        }

        for (&parent, kids) in &self.children {
            for &child in kids {
                if self.dep.get(&child) != Some(&parent) {
                    return Err(GraphError::IndexConsistency(format!(
                        "children[{parent}] lists {child} but dep[{child}] = {:?}",
                        self.dep.get(&child)
                    )));
                }
            }
            let unique: BTreeSet<_> = kids.iter().collect();
            if unique.len() != kids.len() {
                return Err(GraphError::IndexConsistency(format!(
                    "children[{parent}] holds duplicates"
                )));
            }
        }

        for &idx in self.node.keys() {
            let complete = self.word.contains_key(&NodeIndex::token(idx))
                && self.tag.contains_key(&idx)
                && self.lemma.contains_key(&idx)
                && self.rel.contains_key(&idx)
                && self.dep.contains_key(&idx);
            if !complete {
                return Err(GraphError::IndexConsistency(format!(
                    "token {idx} has a partial row"
                )));
            }
        }

        Ok(())
    }
}
