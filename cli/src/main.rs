use std::io;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cfgchart::{ChartParser, Err, Grammar, ParserConfig};

/// Reads sentences from stdin, one per line, and prints every parse tree
#[derive(Parser, Debug)]
#[command(name = "cfgchart", version, about)]
struct Args {
  /// Grammar file, one `LHS -> RHS | ...` rule per line
  grammar: PathBuf,

  /// Print the parse chart
  #[arg(short, long)]
  chart: bool,

  /// Stop after this many trees
  #[arg(short, long, value_name = "N")]
  max_results: Option<usize>,

  /// Only print how many trees were found
  #[arg(short = 'n', long)]
  count: bool,

  /// Print indented trees annotated with spans
  #[arg(short, long)]
  pretty: bool,
}

fn parse(parser: &ChartParser, sentence: &str, opts: &Args) {
  let sentence = sentence.split_whitespace().collect::<Vec<_>>();

  if opts.chart {
    println!("chart:\n{}\n", parser.chart(&sentence));
  }

  let mut parses = parser.parse(&sentence);
  let mut found = 0;
  for tree in parses.by_ref() {
    found += 1;
    if opts.count {
      continue;
    }
    if opts.pretty {
      println!("{:#}\n", tree);
    } else {
      println!("{}", tree);
    }
  }

  println!(
    "Parsed {}{} tree{}",
    found,
    if parses.is_truncated() { "+" } else { "" },
    if found == 1 { "" } else { "s" }
  );
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = Args::parse();
  let g = Grammar::read_from_file(&opts.grammar)?;
  info!(start = g.start(), productions = g.productions().len(), "loaded grammar");

  let parser = ChartParser::with_config(
    &g,
    ParserConfig {
      max_results: opts.max_results,
    },
  );

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    input.clear();
    if io::stdin().read_line(&mut input)? == 0 {
      // ctrl+d
      return Ok(());
    }
    let line = input.trim();
    if !line.is_empty() {
      parse(&parser, line, &opts);
    }
  }
}
