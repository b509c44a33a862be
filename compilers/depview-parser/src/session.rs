use depview_graph::{DependencyGraph, IndexBuilder, MarkupIndex};
use depview_morph::SuffixLemmatizer;
use depview_protocol::{Lemmatizer, PrintMode, TreePrinter};
use tracing::{debug, info};

use crate::backend::{ParserBackend, ParserQuery};
use crate::config::SessionConfig;
use crate::error::ParseError;
use crate::markup::strip_markup;

const NBSP: char = '\u{00A0}';
const NBSP_UTF8: [u8; 2] = [0xC2, 0xA0];

/// A parse tree together with the dependency view built from it.
#[derive(Debug, Clone)]
pub struct ParsedSentence<T> {
    tree: T,
    graph: DependencyGraph,
}

impl<T> ParsedSentence<T> {
    pub fn new(tree: T, graph: DependencyGraph) -> Self {
        Self { tree, graph }
    }

    /// The backend's own tree.
    pub fn get_parse(&self) -> &T {
        &self.tree
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.graph
    }

    pub fn into_graph(self) -> DependencyGraph {
        self.graph
    }

    pub fn into_parts(self) -> (T, DependencyGraph) {
        (self.tree, self.graph)
    }

    pub fn render<P: TreePrinter<Tree = T>>(&self, printer: &P, mode: PrintMode) -> String {
        printer.render(&self.tree, mode)
    }
}

/// One loaded parser plus the state it keeps between calls.
///
/// Not meant for concurrent use: k-best parsing reuses a single query
/// object and takes `&mut self`.
pub struct ParserSession<B: ParserBackend, L = SuffixLemmatizer> {
    backend: B,
    lemmatizer: L,
    config: SessionConfig,
    query: Option<B::Query>,
}

impl<B: ParserBackend> ParserSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self::with_lemmatizer(backend, SuffixLemmatizer::new(), config)
    }
}

impl<B: ParserBackend, L: Lemmatizer> ParserSession<B, L> {
    pub fn with_lemmatizer(backend: B, lemmatizer: L, config: SessionConfig) -> Self {
        info!(
            model = %config.model_path.display(),
            options = ?config.parser_options(),
            "parser session ready"
        );
        Self {
            backend,
            lemmatizer,
            config,
            query: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parses an already tokenized sentence.
    pub fn parse<S: AsRef<str>>(&self, words: &[S]) -> Result<ParsedSentence<B::Tree>, ParseError> {
        let tokens = normalize_tokens(words);
        self.analyse(&tokens, None)
    }

    /// Like [`Self::parse`], for tokens that arrive as raw UTF-8.
    pub fn parse_bytes<T: AsRef<[u8]>>(
        &self,
        words: &[T],
    ) -> Result<ParsedSentence<B::Tree>, ParseError> {
        let tokens = words
            .iter()
            .map(|word| String::from_utf8(replace_nbsp(word.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        self.parse(&tokens)
    }

    /// Parses the text tokens of `words` and puts the markup tags among
    /// them back into the graph at fractional positions.
    pub fn parse_with_markup<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> Result<ParsedSentence<B::Tree>, ParseError> {
        let (tokens, markup) = strip_markup(words);
        let tokens = normalize_tokens(&tokens);
        debug!(
            tokens = tokens.len(),
            tags = markup.values().map(Vec::len).sum::<usize>(),
            "stripped markup"
        );
        self.analyse(&tokens, Some(&markup))
    }

    /// Tokenizes `text` with the backend and returns up to `k` parses, best
    /// first, each with `exp(log_score)`. The scores are not normalized.
    pub fn k_best_parses(
        &mut self,
        text: &str,
        k: usize,
    ) -> Result<impl Iterator<Item = (ParsedSentence<B::Tree>, f64)> + '_, ParseError> {
        let tokens = self.backend.tokenize(text);
        self.check_length(&tokens)?;

        let backend = &self.backend;
        let query = self.query.get_or_insert_with(|| {
            debug!("creating parser query");
            backend.parser_query()
        });
        if !query.parse(&tokens) {
            return Err(ParseError::Rejected(tokens.join(" ")));
        }

        let mut parses = query.k_best_parses(k);
        parses.sort_by(|a, b| b.log_score.total_cmp(&a.log_score));
        parses.truncate(k);
        debug!(tokens = tokens.len(), k, found = parses.len(), "k-best parses");

        let lemmatizer = &self.lemmatizer;
        Ok(parses.into_iter().map(move |parse| {
            let structure = backend.grammatical_structure(&parse.tree);
            let graph = IndexBuilder::new(lemmatizer).build(&structure);
            (ParsedSentence::new(parse.tree, graph), parse.log_score.exp())
        }))
    }

    /// k-best parsing with the configured default `k`.
    pub fn default_k_best(
        &mut self,
        text: &str,
    ) -> Result<impl Iterator<Item = (ParsedSentence<B::Tree>, f64)> + '_, ParseError> {
        let k = self.config.default_k_best;
        self.k_best_parses(text, k)
    }

    fn check_length(&self, tokens: &[String]) -> Result<(), ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        if !self.config.accepts_length(tokens.len()) {
            return Err(ParseError::TooLong {
                len: tokens.len(),
                max: self.config.max_length,
            });
        }
        Ok(())
    }

    fn analyse(
        &self,
        tokens: &[String],
        markup: Option<&MarkupIndex>,
    ) -> Result<ParsedSentence<B::Tree>, ParseError> {
        self.check_length(tokens)?;

        let tree = self
            .backend
            .apply(tokens)
            .ok_or_else(|| ParseError::Rejected(tokens.join(" ")))?;
        let structure = self.backend.grammatical_structure(&tree);

        let builder = IndexBuilder::new(&self.lemmatizer);
        let graph = match markup {
            Some(markup) => builder.with_markup(markup).build(&structure),
            None => builder.build(&structure),
        };
        debug!(tokens = tokens.len(), "parsed sentence");
        Ok(ParsedSentence::new(tree, graph))
    }
}

fn normalize_tokens<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|word| word.as_ref().replace(NBSP, " "))
        .collect()
}

fn replace_nbsp(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut rest = bytes;
    while let Some((&first, tail)) = rest.split_first() {
        if rest.starts_with(&NBSP_UTF8) {
            out.push(b' ');
            rest = &rest[NBSP_UTF8.len()..];
        } else {
            out.push(first);
            rest = tail;
        }
    }
    out
}
