//! What the dependency view needs from the parser, lemmatizer and tree
//! printer it wraps. Nothing here knows how a parse is computed.

use alloc::string::String;

use crate::ids::TreeNodeId;
use crate::print::PrintMode;

/// One terminal (leaf) of a parse tree, as reported by the parser.
pub trait TerminalNode {
    /// Handle the parser can resolve back to its own node object.
    fn handle(&self) -> TreeNodeId;

    /// 1-based surface position of the token.
    fn index(&self) -> u32;

    /// Raw token string, still in the parser's escaped form.
    fn value(&self) -> &str;

    /// Category label of the preterminal above this leaf (the POS tag),
    /// `None` when the leaf has no parent.
    fn parent_category(&self) -> Option<&str>;

    /// Multi-word units carry an extra node marking their head; those
    /// copies must not be indexed twice.
    fn is_head_placeholder(&self) -> bool {
        false
    }
}

/// The typed-dependency view the parser derives from one tree.
pub trait GrammaticalStructure {
    type Node: TerminalNode;

    /// Terminals in the parser's left-to-right order.
    fn terminals(&self) -> &[Self::Node];

    /// Position of the governor of `node`, `None` if it has none.
    fn governor(&self, node: &Self::Node) -> Option<u32>;

    /// Relation label on the arc `governor -> dependent`.
    fn relation(&self, governor: u32, dependent: u32) -> Option<String>;
}

/// Maps an inflected word plus its POS tag to a dictionary form.
pub trait Lemmatizer {
    fn lemmatize(&self, word: &str, tag: &str) -> String;
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for &L {
    fn lemmatize(&self, word: &str, tag: &str) -> String {
        (**self).lemmatize(word, tag)
    }
}

/// Renders a parser-owned tree as text. Output is opaque to the view.
pub trait TreePrinter {
    type Tree;

    fn render(&self, tree: &Self::Tree, mode: PrintMode) -> String;
}
