//! Hand-built parser output for tests.

use std::collections::BTreeMap;

use depview_morph::SuffixLemmatizer;
use depview_protocol::{GrammaticalStructure, TerminalNode, TreeNodeId};

use crate::builder::IndexBuilder;
use crate::graph::DependencyGraph;

#[derive(Debug, Clone)]
pub(crate) struct Leaf {
    pub handle: TreeNodeId,
    pub index: u32,
    pub value: String,
    pub category: Option<String>,
    pub placeholder: bool,
}

impl TerminalNode for Leaf {
    fn handle(&self) -> TreeNodeId {
        self.handle
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn parent_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn is_head_placeholder(&self) -> bool {
        self.placeholder
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Arcs {
    pub leaves: Vec<Leaf>,
    pub heads: BTreeMap<u32, u32>,
    pub labels: BTreeMap<(u32, u32), String>,
}

impl GrammaticalStructure for Arcs {
    type Node = Leaf;

    fn terminals(&self) -> &[Leaf] {
        &self.leaves
    }

    fn governor(&self, node: &Leaf) -> Option<u32> {
        self.heads.get(&node.index).copied()
    }

    fn relation(&self, governor: u32, dependent: u32) -> Option<String> {
        self.labels.get(&(governor, dependent)).cloned()
    }
}

/// `(word, tag, Some((governor, relation)))` rows, numbered from 1.
/// Handles are `10 * index`.
pub(crate) fn sentence(rows: &[(&str, &str, Option<(u32, &str)>)]) -> Arcs {
    let mut arcs = Arcs::default();
    for (i, (word, tag, head)) in rows.iter().enumerate() {
        let index = i as u32 + 1;
        arcs.leaves.push(Leaf {
            handle: TreeNodeId::new(index * 10),
            index,
            value: word.to_string(),
            category: Some(tag.to_string()),
            placeholder: false,
        });
        if let Some((governor, relation)) = head {
            arcs.heads.insert(index, *governor);
            arcs.labels.insert((*governor, index), relation.to_string());
        }
    }
    arcs
}

pub(crate) fn build(structure: &Arcs) -> DependencyGraph {
    IndexBuilder::new(&SuffixLemmatizer::new()).build(structure)
}

/// Hello , my name is Melroy
pub(crate) fn hello_melroy() -> DependencyGraph {
    build(&sentence(&[
        ("Hello", "UH", Some((6, "discourse"))),
        (",", ",", Some((6, "punct"))),
        ("my", "PRP$", Some((4, "poss"))),
        ("name", "NN", Some((6, "nsubj"))),
        ("is", "VBZ", Some((6, "cop"))),
        ("Melroy", "NNP", Some((0, "root"))),
    ]))
}

/// The dog quickly chased the cat .
pub(crate) fn chased_the_cat() -> DependencyGraph {
    build(&sentence(&[
        ("The", "DT", Some((2, "det"))),
        ("dog", "NN", Some((4, "nsubj"))),
        ("quickly", "RB", Some((4, "advmod"))),
        ("chased", "VBD", Some((0, "root"))),
        ("the", "DT", Some((6, "det"))),
        ("cat", "NN", Some((4, "dobj"))),
        (".", ".", Some((4, "punct"))),
    ]))
}

/// Random tree over `parents.len()` tokens: token `i + 1` hangs from
/// `parents[i]`, which must be smaller than `i + 1`.
pub(crate) fn random_tree(parents: &[u32]) -> DependencyGraph {
    let rows: Vec<(String, Option<(u32, &str)>)> = parents
        .iter()
        .enumerate()
        .map(|(i, parent)| (format!("w{}", i + 1), Some((*parent, "dep"))))
        .collect();
    let borrowed: Vec<(&str, &str, Option<(u32, &str)>)> = rows
        .iter()
        .map(|(word, head)| (word.as_str(), "NN", *head))
        .collect();
    build(&sentence(&borrowed))
}
