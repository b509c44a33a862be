use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use depview_graph::DependencyGraph;
use depview_parser::{ParsedSentence, ParserSession, RecordedParse, ReplayBank, ReplayParser, SessionConfig};
use depview_protocol::{PrintMode, TreePrinter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Indexed dependency views of parsed sentences")]
struct Cli {
    /// Session config (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parse bank to replay, overrides `model_path` from the config
    #[arg(short, long, global = true, value_name = "FILE")]
    bank: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a tokenized sentence
    Parse(ParseArgs),
    /// Tokenize raw text and list the k best parses
    Kbest(KbestArgs),
    /// Compile a JSON parse bank into an rkyv archive
    Compile {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ParseArgs {
    /// Tokens of the sentence, markup tags allowed with --markup
    #[arg(required = true)]
    tokens: Vec<String>,

    /// table, text, or a tree print mode (penn, oneline, wordsAndTags, ...)
    #[arg(short, long, default_value = "table", value_parser = parse_output)]
    format: Output,

    /// Treat XML-like tokens as markup and keep them out of the parse
    #[arg(long)]
    markup: bool,

    /// Remove this token and its subtree before printing
    #[arg(long, value_name = "INDEX")]
    prune: Option<u32>,

    /// Report the least common node of two tokens and the path between them
    #[arg(long, num_args = 2, value_names = ["I", "J"])]
    lca: Option<Vec<u32>>,

    /// Override the configured maximum sentence length (0 = unlimited)
    #[arg(long)]
    max_length: Option<usize>,
}

#[derive(Args)]
struct KbestArgs {
    text: String,

    /// Number of parses, defaults to `default_k_best` from the config
    #[arg(short)]
    k: Option<usize>,

    #[arg(short, long, default_value = "table", value_parser = parse_output)]
    format: Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Table,
    Text,
    Tree(PrintMode),
}

fn parse_output(name: &str) -> Result<Output, String> {
    match name {
        "table" => Ok(Output::Table),
        "text" => Ok(Output::Text),
        other => other
            .parse()
            .map(Output::Tree)
            .map_err(|e| format!("{}, or table, text", e)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, bank: Option<&Path>) -> anyhow::Result<SessionConfig> {
    let mut config = match path {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(bank) = bank {
        config.model_path = bank.to_path_buf();
    }
    Ok(config)
}

fn open_session(config: SessionConfig) -> anyhow::Result<ParserSession<ReplayParser>> {
    let parser = ReplayParser::from_config(&config)
        .with_context(|| format!("opening parse bank {}", config.model_path.display()))?;
    Ok(ParserSession::new(parser, config))
}

fn render<P: TreePrinter<Tree = RecordedParse>>(
    parsed: &ParsedSentence<RecordedParse>,
    printer: &P,
    output: Output,
) -> String {
    match output {
        Output::Table => table(parsed.graph()),
        Output::Text => parsed.graph().get_plain_text(),
        Output::Tree(mode) => parsed.render(printer, mode),
    }
}

fn table(graph: &DependencyGraph) -> String {
    graph.table().trim_end().to_string()
}

fn run_parse(config: SessionConfig, args: ParseArgs) -> anyhow::Result<()> {
    let mut config = config;
    if let Some(max_length) = args.max_length {
        config.max_length = max_length;
    }
    let session = open_session(config)?;

    let mut parsed = if args.markup {
        session.parse_with_markup(&args.tokens)
    } else {
        session.parse(&args.tokens)
    }
    .context("parsing sentence")?;

    if let Some(idx) = args.prune {
        let removed = parsed.graph_mut().prune(idx)?;
        info!(root = idx, ?removed, "pruned");
    }

    println!("{}", render(&parsed, session.backend(), args.format));

    if let Some(pair) = args.lca {
        let [i, j] = pair[..] else {
            bail!("--lca takes exactly two indices");
        };
        let (common, path) = parsed.graph().get_least_common_node(i, j)?;
        let common = common.map_or_else(|| "none".to_string(), |c| c.to_string());
        let path: Vec<String> = path.iter().map(u32::to_string).collect();
        println!("lca\t{}\npath\t{}", common, path.join(" "));
    }
    Ok(())
}

fn run_kbest(config: SessionConfig, args: KbestArgs) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let k = args.k.unwrap_or(session.config().default_k_best);

    let parses: Vec<_> = session
        .k_best_parses(&args.text, k)
        .context("k-best parsing")?
        .collect();

    for (rank, (parsed, score)) in parses.iter().enumerate() {
        println!("# parse {} score {:e}", rank + 1, score);
        println!("{}", render(parsed, session.backend(), args.format));
    }
    Ok(())
}

fn compile(input: &Path, output: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let bank = ReplayBank::from_json_str(&json)?;

    let bytes = bank.to_archive()?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Compiled {} parses ({} bytes) into {}",
        bank.parses.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compile { input, output } => compile(&input, &output),
        Command::Parse(args) => {
            run_parse(load_config(cli.config.as_deref(), cli.bank.as_deref())?, args)
        }
        Command::Kbest(args) => {
            run_kbest(load_config(cli.config.as_deref(), cli.bank.as_deref())?, args)
        }
    }
}
