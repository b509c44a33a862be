//! The seam between a [`crate::ParserSession`] and the parser doing the work.

use depview_protocol::GrammaticalStructure;

/// A candidate tree with its log-probability score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredParse<T> {
    pub tree: T,
    pub log_score: f64,
}

/// A loaded statistical parser.
pub trait ParserBackend {
    type Tree: Clone;
    type Structure: GrammaticalStructure;
    type Query: ParserQuery<Tree = Self::Tree>;

    /// Best parse of a token list, `None` when the grammar admits none.
    fn apply(&self, tokens: &[String]) -> Option<Self::Tree>;

    /// The parser's own tokenizer, applied to raw text.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Typed dependencies derived from `tree`.
    fn grammatical_structure(&self, tree: &Self::Tree) -> Self::Structure;

    /// A fresh query object for k-best parsing. Created once per session.
    fn parser_query(&self) -> Self::Query;
}

/// Stateful k-best parsing: `parse` first, then read the candidates.
pub trait ParserQuery {
    type Tree;

    /// Parses `tokens`, returning whether any analysis was found.
    fn parse(&mut self, tokens: &[String]) -> bool;

    /// Up to `k` best analyses of the last parsed sentence.
    fn k_best_parses(&mut self, k: usize) -> Vec<ScoredParse<Self::Tree>>;
}
