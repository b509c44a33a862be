use std::fmt::{self, Write};

use depview_protocol::NodeIndex;

use crate::graph::DependencyGraph;

/// Marks that never take a space in front of them in plain text.
pub const NO_SPACE_BEFORE: [char; 6] = [',', '.', ':', ';', '!', '?'];

/// Index column for markup rows.
pub const MARKUP_PLACEHOLDER: &str = "-";

impl DependencyGraph {
    /// The sentence as running text. Markup is left out.
    pub fn get_plain_text(&self) -> String {
        let mut text = self
            .node
            .keys()
            .filter_map(|idx| self.word.get(&NodeIndex::token(*idx)))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        for mark in NO_SPACE_BEFORE {
            text = text.replace(&format!(" {mark}"), &mark.to_string());
        }
        text
    }

    /// FDG-style table: index, word, lemma, tag, relation, governor.
    pub fn write_table<W: Write>(&self, out: &mut W) -> fmt::Result {
        for (key, word) in &self.word {
            let (index, lemma, tag, rel, dep) = match key.as_token() {
                Some(idx) => (
                    idx.to_string(),
                    self.lemma(idx).unwrap_or(""),
                    self.tag(idx).unwrap_or(""),
                    self.relation(idx).unwrap_or(""),
                    self.governor(idx).map(|p| p.to_string()).unwrap_or_default(),
                ),
                None => (MARKUP_PLACEHOLDER.to_string(), "", "", "", String::new()),
            };
            writeln!(out, "{index}\t{word}\t{lemma}\t{tag}\t{rel}\t{dep}")?;
        }
        Ok(())
    }

    pub fn table(&self) -> String {
        self.to_string()
    }

    /// Prints [`DependencyGraph::table`] to stdout.
    pub fn print_table(&self) {
        print!("{}", self.table());
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_table(f)
    }
}
