//! A backend that answers from recorded parser output.
//!
//! A bank holds, for each sentence it knows, one or more scored analyses.
//! Entries with the same token sequence are the k-best candidates for that
//! sentence. Banks are written as JSON and can be compiled into a
//! validated `rkyv` archive for loading without a JSON pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use depview_graph::ROOT;
use depview_protocol::{GrammaticalStructure, TerminalNode, TreeNodeId};
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use tracing::{debug, info};

use crate::backend::{ParserBackend, ParserQuery, ScoredParse};
use crate::config::SessionConfig;
use crate::error::BankError;
use crate::tokenizer;

pub const BANK_VERSION: u32 = 1;

/// One leaf of a recorded tree.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[archive(check_bytes)]
pub struct RecordedTerminal {
    /// Token as the parser saw it, brackets escaped.
    pub word: String,
    /// Preterminal label; absent when the leaf hangs directly off the tree.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub governor: Option<u32>,
    #[serde(default)]
    pub relation: Option<String>,
    /// Extra head marker of a multi-word unit.
    #[serde(default)]
    pub head_placeholder: bool,
    /// Explicit position, otherwise counted from the left.
    #[serde(default)]
    pub index: Option<u32>,
}

/// One scored analysis of a sentence.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[archive(check_bytes)]
pub struct RecordedParse {
    /// Bracketed Penn Treebank tree.
    pub tree: String,
    pub log_score: f64,
    pub terminals: Vec<RecordedTerminal>,
}

impl RecordedParse {
    /// Surface tokens in order, head placeholders excluded.
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.terminals
            .iter()
            .filter(|t| !t.head_placeholder)
            .map(|t| t.word.as_str())
    }

    fn matches(&self, tokens: &[String]) -> bool {
        let mut recorded = self.tokens();
        tokens
            .iter()
            .all(|token| recorded.next().map(escape) == Some(escape(token)))
            && recorded.next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[archive(check_bytes)]
pub struct ReplayBank {
    pub version: u32,
    pub parses: Vec<RecordedParse>,
}

impl ReplayBank {
    pub fn from_json_str(json: &str) -> Result<Self, BankError> {
        let bank: ReplayBank = serde_json::from_str(json)?;
        bank.validate()?;
        Ok(bank)
    }

    /// Loads a bank from validated archive bytes.
    pub fn from_archive(bytes: &[u8]) -> Result<Self, BankError> {
        let mut aligned = rkyv::AlignedVec::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);

        let archived = rkyv::check_archived_root::<ReplayBank>(&aligned)
            .map_err(|e| BankError::Archive(format!("{:?}", e)))?;
        let bank: ReplayBank = archived
            .deserialize(&mut rkyv::Infallible)
            .map_err(|e| BankError::Archive(format!("{:?}", e)))?;
        bank.validate()?;
        Ok(bank)
    }

    pub fn to_archive(&self) -> Result<Vec<u8>, BankError> {
        let mut serializer = AllocSerializer::<4096>::default();
        serializer
            .serialize_value(self)
            .map_err(|e| BankError::Archive(format!("{:?}", e)))?;
        Ok(serializer.into_serializer().into_inner().to_vec())
    }

    /// Reads a `.rkyv` archive or, for any other extension, JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| BankError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bank = if path.extension().is_some_and(|ext| ext == "rkyv") {
            Self::from_archive(&fs::read(path).map_err(io_err)?)?
        } else {
            Self::from_json_str(&fs::read_to_string(path).map_err(io_err)?)?
        };
        info!(path = %path.display(), parses = bank.parses.len(), "loaded parse bank");
        Ok(bank)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        if self.version != BANK_VERSION {
            return Err(BankError::Invalid(format!(
                "unsupported version {}, expected {}",
                self.version, BANK_VERSION
            )));
        }
        for (n, parse) in self.parses.iter().enumerate() {
            if parse.tokens().next().is_none() {
                return Err(BankError::Invalid(format!("parse {} has no tokens", n)));
            }
            if parse.log_score.is_nan() {
                return Err(BankError::Invalid(format!("parse {} has a NaN score", n)));
            }

            let structure = RecordedStructure::new(parse);
            let positions: BTreeSet<u32> = structure
                .terminals()
                .iter()
                .filter(|leaf| !leaf.is_head_placeholder())
                .map(|leaf| leaf.index())
                .collect();
            if let Some(governor) = structure
                .heads
                .values()
                .find(|g| **g != ROOT && !positions.contains(g))
            {
                return Err(BankError::Invalid(format!(
                    "parse {} has governor {} outside its {} tokens",
                    n,
                    governor,
                    positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Every recorded analysis of `tokens`, best first.
    pub fn candidates(&self, tokens: &[String]) -> Vec<&RecordedParse> {
        let mut found: Vec<&RecordedParse> =
            self.parses.iter().filter(|p| p.matches(tokens)).collect();
        found.sort_by(|a, b| b.log_score.total_cmp(&a.log_score));
        found
    }
}

/// Brackets compare equal whether or not they arrive escaped.
fn escape(token: &str) -> &str {
    match token {
        "(" => "-RRB-",
        ")" => "-LRB-",
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct ReplayParser {
    bank: Arc<ReplayBank>,
}

impl ReplayParser {
    pub fn new(bank: ReplayBank) -> Self {
        Self {
            bank: Arc::new(bank),
        }
    }

    /// Opens the bank named by `config.model_path`.
    pub fn from_config(config: &SessionConfig) -> Result<Self, BankError> {
        ReplayBank::from_path(&config.model_path).map(Self::new)
    }

    pub fn bank(&self) -> &ReplayBank {
        &self.bank
    }
}

impl ParserBackend for ReplayParser {
    type Tree = RecordedParse;
    type Structure = RecordedStructure;
    type Query = ReplayQuery;

    fn apply(&self, tokens: &[String]) -> Option<RecordedParse> {
        self.bank.candidates(tokens).first().map(|p| (*p).clone())
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenizer::tokenize(text)
    }

    fn grammatical_structure(&self, tree: &RecordedParse) -> RecordedStructure {
        RecordedStructure::new(tree)
    }

    fn parser_query(&self) -> ReplayQuery {
        ReplayQuery {
            bank: Arc::clone(&self.bank),
            current: Vec::new(),
        }
    }
}

/// k-best query over a shared bank. Holds the candidates of the last
/// sentence passed to [`ParserQuery::parse`].
#[derive(Debug)]
pub struct ReplayQuery {
    bank: Arc<ReplayBank>,
    current: Vec<RecordedParse>,
}

impl ParserQuery for ReplayQuery {
    type Tree = RecordedParse;

    fn parse(&mut self, tokens: &[String]) -> bool {
        self.current = self.bank.candidates(tokens).into_iter().cloned().collect();
        debug!(tokens = tokens.len(), candidates = self.current.len(), "replay lookup");
        !self.current.is_empty()
    }

    fn k_best_parses(&mut self, k: usize) -> Vec<ScoredParse<RecordedParse>> {
        self.current
            .iter()
            .take(k)
            .map(|parse| ScoredParse {
                tree: parse.clone(),
                log_score: parse.log_score,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedLeaf {
    handle: TreeNodeId,
    index: u32,
    word: String,
    tag: Option<String>,
    placeholder: bool,
}

impl TerminalNode for RecordedLeaf {
    fn handle(&self) -> TreeNodeId {
        self.handle
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn value(&self) -> &str {
        &self.word
    }

    fn parent_category(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn is_head_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Typed dependencies of one recorded parse. Leaf handles are the 1-based
/// positions in the recorded terminal list.
#[derive(Debug, Clone, Default)]
pub struct RecordedStructure {
    leaves: Vec<RecordedLeaf>,
    heads: BTreeMap<u32, u32>,
    labels: BTreeMap<(u32, u32), String>,
}

impl RecordedStructure {
    pub fn new(parse: &RecordedParse) -> Self {
        let mut structure = Self::default();
        let mut position = 0;

        for (n, terminal) in parse.terminals.iter().enumerate() {
            if !terminal.head_placeholder {
                position += 1;
            }
            let index = terminal.index.unwrap_or(position);

            structure.leaves.push(RecordedLeaf {
                handle: TreeNodeId::new(n as u32 + 1),
                index,
                word: terminal.word.clone(),
                tag: terminal.tag.clone(),
                placeholder: terminal.head_placeholder,
            });

            if terminal.head_placeholder {
                continue;
            }
            if let Some(governor) = terminal.governor {
                structure.heads.insert(index, governor);
                if let Some(relation) = &terminal.relation {
                    structure.labels.insert((governor, index), relation.clone());
                }
            }
        }
        structure
    }
}

impl GrammaticalStructure for RecordedStructure {
    type Node = RecordedLeaf;

    fn terminals(&self) -> &[RecordedLeaf] {
        &self.leaves
    }

    fn governor(&self, node: &RecordedLeaf) -> Option<u32> {
        self.heads.get(&node.index).copied()
    }

    fn relation(&self, governor: u32, dependent: u32) -> Option<String> {
        self.labels.get(&(governor, dependent)).cloned()
    }
}
