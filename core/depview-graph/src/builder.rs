use std::collections::{BTreeMap, BTreeSet};

use depview_protocol::{GrammaticalStructure, Lemmatizer, NodeIndex, TerminalNode};
use tracing::{debug, warn};

use crate::graph::{DependencyGraph, TokenEntry, ROOT};

/// Markup tags keyed by the position of the token they follow
/// (`0` for tags in front of the first token), in surface order.
pub type MarkupIndex = BTreeMap<u32, Vec<String>>;

/// Relation given to punctuation and to tokens without a governor.
pub const PUNCT_RELATION: &str = "punct";

/// Tag given to a leaf without a preterminal above it.
pub const MISSING_TAG: &str = "Z";

/// Relation used when the parser names a governor but no label.
pub const UNLABELED_RELATION: &str = "dep";

/// Same set as Python's `string.punctuation`. Membership is a substring
/// test, so "()" and the empty token count as punctuation too.
const ASCII_PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Undoes the tokenizer's bracket escaping. The swap is intentional and
/// mirrored by the tokenizer.
pub fn normalize_word(raw: &str) -> &str {
    match raw {
        "-RRB-" => "(",
        "-LRB-" => ")",
        other => other,
    }
}

pub fn is_punctuation(word: &str) -> bool {
    ASCII_PUNCTUATION.contains(word)
}

/// Turns a parser's grammatical structure into a [`DependencyGraph`] in a
/// single left-to-right pass over its terminals.
pub struct IndexBuilder<'a, L: ?Sized> {
    lemmatizer: &'a L,
    markup: Option<&'a MarkupIndex>,
}

impl<'a, L: Lemmatizer + ?Sized> IndexBuilder<'a, L> {
    pub fn new(lemmatizer: &'a L) -> Self {
        Self {
            lemmatizer,
            markup: None,
        }
    }

    /// Interleave `markup` between the tokens of the built graph.
    pub fn with_markup(mut self, markup: &'a MarkupIndex) -> Self {
        self.markup = Some(markup);
        self
    }

    pub fn build<S: GrammaticalStructure>(&self, structure: &S) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        let mut anchors_seen = BTreeSet::new();
        let positions: BTreeSet<u32> = structure
            .terminals()
            .iter()
            .filter(|node| !node.is_head_placeholder())
            .map(|node| node.index())
            .filter(|&idx| idx != ROOT)
            .collect();

        // Tags in front of the first token
        self.inject_markup(&mut graph, ROOT, &mut anchors_seen);

        for node in structure.terminals() {
            if node.is_head_placeholder() {
                continue;
            }

            let idx = node.index();
            if idx == ROOT {
                warn!(word = node.value(), "terminal reported at the root position, skipped");
                continue;
            }

            let word = normalize_word(node.value()).to_string();
            let tag = node.parent_category().unwrap_or(MISSING_TAG).to_string();
            let lemma = self.lemmatizer.lemmatize(&word, &tag);

            let governor = match structure.governor(node) {
                Some(governor) if governor != ROOT && !positions.contains(&governor) => {
                    warn!(idx, governor, "governor is not a token of this sentence, attached to root");
                    None
                }
                governor => governor,
            };
            let (governor, relation) = match governor {
                Some(governor) if !is_punctuation(&word) => {
                    let relation = structure
                        .relation(governor, idx)
                        .unwrap_or_else(|| UNLABELED_RELATION.to_string());
                    (governor, relation)
                }
                _ => (ROOT, PUNCT_RELATION.to_string()),
            };

            graph.insert_token(
                idx,
                TokenEntry {
                    handle: node.handle(),
                    word,
                    tag,
                    lemma,
                    governor,
                    relation,
                },
            );

            // Tags between this token and the next
            self.inject_markup(&mut graph, idx, &mut anchors_seen);
        }

        if let Some(markup) = self.markup {
            for (anchor, tags) in markup.iter().filter(|(a, _)| !anchors_seen.contains(*a)) {
                warn!(anchor, count = tags.len(), "markup anchored after an unknown token, dropped");
            }
        }

        debug!(tokens = graph.len(), markup = graph.markup().count(), "built dependency view");
        debug_assert!(
            graph.check_consistency().is_ok(),
            "builder produced an inconsistent graph: {:?}",
            graph.check_consistency()
        );
        graph
    }

    fn inject_markup(&self, graph: &mut DependencyGraph, anchor: u32, seen: &mut BTreeSet<u32>) {
        let Some(tags) = self.markup.and_then(|markup| markup.get(&anchor)) else {
            return;
        };
        seen.insert(anchor);

        let Ok(count) = u32::try_from(tags.len()) else {
            warn!(anchor, count = tags.len(), "too many markup tags at one position, dropped");
            return;
        };
        for (slot, text) in (1..=count).zip(tags) {
            match NodeIndex::markup_slot(anchor, slot, count) {
                Some(key) => graph.insert_markup(key, text.clone()),
                None => warn!(anchor, slot, "no room for markup tag, dropped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{sentence, Leaf};
    use depview_protocol::TreeNodeId;
    use depview_morph::SuffixLemmatizer;
    use proptest::prelude::*;

    fn markup(entries: &[(u32, &[&str])]) -> MarkupIndex {
        entries
            .iter()
            .map(|(anchor, tags)| (*anchor, tags.iter().map(|t| t.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_markup_lands_between_tokens() {
        let structure = sentence(&[
            ("John", "NNP", Some((2, "nsubj"))),
            ("sleeps", "VBZ", Some((0, "root"))),
            ("soundly", "RB", Some((2, "advmod"))),
        ]);
        let tags = markup(&[(0, &["<p>"][..]), (2, &["A", "B", "C"][..]), (3, &["</p>"][..])]);

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).with_markup(&tags).build(&structure);

        let placed: Vec<(f64, &str)> = graph.markup().map(|(k, t)| (k.to_f64(), t)).collect();
        assert_eq!(
            placed,
            vec![(0.5, "<p>"), (2.25, "A"), (2.5, "B"), (2.75, "C"), (3.5, "</p>")]
        );

        // Markup stays out of every token mapping
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.tag.len(), 3);
        assert_eq!(graph.get_plain_text(), "John sleeps soundly");

        let table = graph.table();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows[0], "-\t<p>\t\t\t\t");
        assert_eq!(rows[3], "-\tA\t\t\t\t");
        assert_eq!(rows[2], "2\tsleeps\tsleep\tVBZ\troot\t0");
    }

    #[test]
    fn test_unmatched_markup_is_dropped() {
        let structure = sentence(&[("Hi", "UH", None)]);
        let tags = markup(&[(7, &["<b>"][..])]);

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).with_markup(&tags).build(&structure);
        assert_eq!(graph.markup().count(), 0);
    }

    #[test]
    fn test_brackets_are_swapped_and_root_attached() {
        let structure = sentence(&[
            ("-RRB-", "-LRB-", Some((2, "punct"))),
            ("yes", "UH", Some((0, "root"))),
            ("-LRB-", "-RRB-", Some((2, "punct"))),
        ]);

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).build(&structure);

        assert_eq!(graph.word(1), Some("("));
        assert_eq!(graph.word(3), Some(")"));
        assert_eq!(graph.governor(1), Some(ROOT));
        assert_eq!(graph.relation(3), Some(PUNCT_RELATION));
        assert_eq!(graph.get_plain_text(), "( yes )");
    }

    #[test]
    fn test_missing_parent_and_governor() {
        let mut structure = sentence(&[("Wow", "UH", None)]);
        structure.leaves[0].category = None;

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).build(&structure);

        assert_eq!(graph.tag(1), Some(MISSING_TAG));
        assert_eq!(graph.relation(1), Some(PUNCT_RELATION));
        assert_eq!(graph.governor(1), Some(ROOT));
        assert_eq!(graph.child_indices(ROOT).unwrap(), &[1]);
    }

    #[test]
    fn test_head_placeholders_are_skipped() {
        let mut structure = sentence(&[
            ("New", "NNP", Some((2, "nn"))),
            ("York", "NNP", Some((0, "root"))),
        ]);
        structure.leaves.push(Leaf {
            handle: TreeNodeId::new(99),
            index: 2,
            value: "York".to_string(),
            category: Some("NNP".to_string()),
            placeholder: true,
        });

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).build(&structure);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.handle(2), Some(TreeNodeId::new(20)));
        assert_eq!(graph.child_indices(2).unwrap(), &[1]);
    }

    #[test]
    fn test_unlabeled_arc_falls_back() {
        let mut structure = sentence(&[
            ("big", "JJ", Some((2, "amod"))),
            ("dogs", "NNS", Some((0, "root"))),
        ]);
        structure.labels.clear();

        let lemmatizer = SuffixLemmatizer::new();
        let graph = IndexBuilder::new(&lemmatizer).build(&structure);
        assert_eq!(graph.relation(1), Some(UNLABELED_RELATION));
        assert_eq!(graph.lemma(2), Some("dog"));
    }

    #[test]
    fn test_dangling_governor_attaches_to_root() {
        let structure = sentence(&[
            ("a", "DT", Some((9, "det"))),
            ("b", "NN", Some((0, "root"))),
        ]);

        let lemmatizer = SuffixLemmatizer::new();
        let mut graph = IndexBuilder::new(&lemmatizer).build(&structure);

        assert_eq!(graph.governor(1), Some(ROOT));
        assert_eq!(graph.relation(1), Some(PUNCT_RELATION));
        assert!(graph.check_consistency().is_ok());

        graph.prune(ROOT).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_punctuation_membership() {
        assert!(is_punctuation(","));
        assert!(is_punctuation("()"));
        assert!(!is_punctuation("..."));
        assert!(!is_punctuation("word"));
    }

    /// Tag batches keyed by anchor, over a sentence of `len` tokens.
    fn batches() -> impl Strategy<Value = (u32, MarkupIndex)> {
        (1u32..12).prop_flat_map(|len| {
            let batch = prop::collection::vec("<[a-z]{1,3}>", 1..40);
            (Just(len), prop::collection::btree_map(0..=len, batch, 0..6))
        })
    }

    proptest! {
        #[test]
        fn test_built_markup_keeps_order((len, tags) in batches()) {
            let rows: Vec<(String, Option<(u32, &str)>)> =
                (1..=len).map(|i| (format!("w{}", i), Some((0, "dep")))).collect();
            let borrowed: Vec<(&str, &str, Option<(u32, &str)>)> = rows
                .iter()
                .map(|(word, head)| (word.as_str(), "NN", *head))
                .collect();
            let structure = sentence(&borrowed);

            let lemmatizer = SuffixLemmatizer::new();
            let graph = IndexBuilder::new(&lemmatizer).with_markup(&tags).build(&structure);

            let expected: Vec<(u32, &str)> = tags
                .iter()
                .flat_map(|(anchor, batch)| batch.iter().map(move |t| (*anchor, t.as_str())))
                .collect();
            let placed: Vec<(u32, &str)> = graph.markup().map(|(k, t)| (k.anchor(), t)).collect();
            prop_assert_eq!(placed, expected);

            prop_assert_eq!(graph.len(), len as usize);
            prop_assert_eq!(graph.tokens().collect::<Vec<_>>(), (1..=len).collect::<Vec<_>>());
            prop_assert!(graph.check_consistency().is_ok());
        }
    }
}
