pub mod backend;
pub mod config;
pub mod error;
pub mod markup;
pub mod replay;
pub mod session;
pub mod token;
pub mod tokenizer;
pub mod treeprint;

pub use backend::{ParserBackend, ParserQuery, ScoredParse};
pub use config::SessionConfig;
pub use error::{BankError, ConfigError, ParseError};
pub use markup::{is_markup, strip_markup};
pub use replay::{RecordedParse, RecordedTerminal, ReplayBank, ReplayParser};
pub use session::{ParsedSentence, ParserSession};
pub use tokenizer::tokenize;
