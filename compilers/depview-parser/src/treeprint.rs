//! Text renderings of recorded parses, one per [`PrintMode`].

use std::collections::BTreeMap;

use depview_graph::ROOT;
use depview_protocol::{GrammaticalStructure, PrintMode, TerminalNode, TreePrinter};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::replay::{RecordedParse, RecordedStructure, ReplayParser};

const UNLABELED: &str = "dep";

#[derive(Debug, Clone, PartialEq)]
enum Bracketed {
    Leaf(String),
    Node {
        label: String,
        children: Vec<Bracketed>,
    },
}

impl Bracketed {
    fn is_preterminal(&self) -> bool {
        matches!(self, Bracketed::Node { children, .. }
            if children.len() == 1 && matches!(children[0], Bracketed::Leaf(_)))
    }

    /// Nodes whose children are all preterminals stay on one line.
    fn is_flat(&self) -> bool {
        match self {
            Bracketed::Leaf(_) => true,
            Bracketed::Node { children, .. } => children
                .iter()
                .all(|c| c.is_preterminal() || matches!(c, Bracketed::Leaf(_))),
        }
    }
}

fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')')(input)
}

fn node(input: &str) -> IResult<&str, Bracketed> {
    map(
        delimited(
            char('('),
            pair(
                preceded(multispace0, opt(atom)),
                many0(preceded(
                    multispace0,
                    alt((node, map(atom, |a: &str| Bracketed::Leaf(a.to_string())))),
                )),
            ),
            preceded(multispace0, char(')')),
        ),
        |(label, children)| Bracketed::Node {
            label: label.unwrap_or_default().to_string(),
            children,
        },
    )(input)
}

fn parse_bracketed(text: &str) -> Option<Bracketed> {
    all_consuming(delimited(multispace0, node, multispace0))(text)
        .ok()
        .map(|(_, tree)| tree)
}

fn write_oneline(tree: &Bracketed, out: &mut String) {
    match tree {
        Bracketed::Leaf(word) => out.push_str(word),
        Bracketed::Node { label, children } => {
            out.push('(');
            out.push_str(label);
            for child in children {
                out.push(' ');
                write_oneline(child, out);
            }
            out.push(')');
        }
    }
}

fn write_penn(tree: &Bracketed, depth: usize, out: &mut String) {
    match tree {
        Bracketed::Node { label, children } if !tree.is_flat() => {
            out.push('(');
            out.push_str(label);
            for child in children {
                out.push('\n');
                out.push_str(&"  ".repeat(depth + 1));
                write_penn(child, depth + 1, out);
            }
            out.push(')');
        }
        _ => write_oneline(tree, out),
    }
}

fn penn(parse: &RecordedParse) -> String {
    match parse_bracketed(&parse.tree) {
        Some(tree) => {
            let mut out = String::new();
            write_penn(&tree, 0, &mut out);
            out
        }
        None => parse.tree.clone(),
    }
}

fn oneline(parse: &RecordedParse) -> String {
    match parse_bracketed(&parse.tree) {
        Some(tree) => {
            let mut out = String::new();
            write_oneline(&tree, &mut out);
            out
        }
        None => parse.tree.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

fn words_and_tags(parse: &RecordedParse) -> String {
    parse
        .terminals
        .iter()
        .filter(|t| !t.head_placeholder)
        .map(|t| match &t.tag {
            Some(tag) => format!("{}/{}", t.word, tag),
            None => t.word.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct Dependency<'a> {
    relation: String,
    governor: u32,
    dependent: u32,
    word: &'a str,
}

fn dependencies(structure: &RecordedStructure) -> (BTreeMap<u32, &str>, Vec<Dependency<'_>>) {
    let mut words = BTreeMap::new();
    let mut arcs = Vec::new();

    for leaf in structure.terminals().iter().filter(|l| !l.is_head_placeholder()) {
        words.insert(leaf.index(), leaf.value());
        if let Some(governor) = structure.governor(leaf) {
            arcs.push(Dependency {
                relation: structure
                    .relation(governor, leaf.index())
                    .unwrap_or_else(|| UNLABELED.to_string()),
                governor,
                dependent: leaf.index(),
                word: leaf.value(),
            });
        }
    }
    (words, arcs)
}

fn node_label(words: &BTreeMap<u32, &str>, idx: u32) -> String {
    match words.get(&idx) {
        _ if idx == ROOT => format!("ROOT-{}", ROOT),
        Some(word) => format!("{}-{}", word, idx),
        None => format!("?-{}", idx),
    }
}

fn typed_dependencies(parse: &RecordedParse, collapsed: bool) -> String {
    let structure = RecordedStructure::new(parse);
    let (words, arcs) = dependencies(&structure);

    // Prepositions folded into the label of their object
    let mut folded: BTreeMap<u32, (u32, String)> = BTreeMap::new();
    if collapsed {
        for pobj in arcs.iter().filter(|a| a.relation == "pobj") {
            let prep = arcs
                .iter()
                .find(|a| a.dependent == pobj.governor && a.relation == "prep");
            if let Some(prep) = prep {
                let label = format!("prep_{}", prep.word.to_lowercase());
                folded.insert(prep.dependent, (prep.governor, label));
            }
        }
    }

    arcs.iter()
        .filter(|arc| !folded.contains_key(&arc.dependent))
        .map(|arc| match folded.get(&arc.governor) {
            Some((head, label)) if arc.relation == "pobj" => format!(
                "{}({}, {})",
                label,
                node_label(&words, *head),
                node_label(&words, arc.dependent)
            ),
            _ => format!(
                "{}({}, {})",
                arc.relation,
                node_label(&words, arc.governor),
                node_label(&words, arc.dependent)
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl TreePrinter for ReplayParser {
    type Tree = RecordedParse;

    fn render(&self, tree: &RecordedParse, mode: PrintMode) -> String {
        match mode {
            PrintMode::Penn => penn(tree),
            PrintMode::OneLine => oneline(tree),
            PrintMode::WordsAndTags => words_and_tags(tree),
            PrintMode::TypedDependencies => typed_dependencies(tree, false),
            PrintMode::TypedDependenciesCollapsed => typed_dependencies(tree, true),
        }
    }
}
