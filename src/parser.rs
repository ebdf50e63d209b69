use std::fmt;
use std::iter::{self, FusedIterator};

use tracing::{debug, trace};

use crate::earley::{Chart, parse_chart};
use crate::forest::{Forest, Trees};
use crate::grammar::Grammar;
use crate::syntree::ParseTree;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
  /// Stop after this many trees. Unbounded when None.
  pub max_results: Option<usize>,
}

/// Enumerates every derivation of a token sequence under a grammar
#[derive(Debug, Clone)]
pub struct ChartParser<'g> {
  grammar: &'g Grammar,
  config: ParserConfig,
}

impl<'g> ChartParser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self::with_config(grammar, ParserConfig::default())
  }

  pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
    Self { grammar, config }
  }

  pub fn with_max_results(mut self, max_results: usize) -> Self {
    self.config.max_results = Some(max_results);
    self
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn config(&self) -> &ParserConfig {
    &self.config
  }

  pub fn chart(&self, tokens: &[&str]) -> Chart {
    parse_chart(self.grammar, tokens)
  }

  /// Lazily yields every tree rooted at the start symbol whose leaves are
  /// exactly `tokens`. No parse is not an error: the iterator is just empty.
  pub fn parse(&self, tokens: &[&str]) -> Parses {
    if tokens.is_empty() {
      debug!("empty input has no parses");
      return Parses::empty();
    }
    if let Some(unknown) = tokens.iter().find(|t| !self.grammar.is_terminal_symbol(t)) {
      debug!(token = unknown, "no terminal production for token");
      return Parses::empty();
    }

    let chart = self.chart(tokens);
    if !chart.is_accepted(self.grammar.start()) {
      return Parses::empty();
    }

    let forest = Forest::new(chart, tokens);
    trace!(%forest, "completed constituents");
    let trees = forest.trees(self.grammar.start());
    Parses::new(trees, self.config.max_results)
  }
}

/// The trees found by [`ChartParser::parse`], built as they're pulled
pub struct Parses {
  trees: Trees,
  remaining: Option<usize>,
  truncated: bool,
  done: bool,
}

impl Parses {
  fn new(trees: Trees, max_results: Option<usize>) -> Self {
    Self {
      trees,
      remaining: max_results,
      truncated: false,
      done: false,
    }
  }

  pub fn empty() -> Self {
    Self::new(Box::new(iter::empty()), None)
  }

  /// True if the result limit cut the sequence short while more trees
  /// existed. Only meaningful once the iterator has returned None.
  pub fn is_truncated(&self) -> bool {
    self.truncated
  }
}

impl Iterator for Parses {
  type Item = ParseTree;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    if self.remaining == Some(0) {
      // look one tree past the limit so we never claim a complete result we didn't check
      self.done = true;
      self.truncated = self.trees.next().is_some();
      if self.truncated {
        debug!("result limit reached with derivations left");
      }
      return None;
    }

    match self.trees.next() {
      Some(tree) => {
        if let Some(remaining) = self.remaining.as_mut() {
          *remaining -= 1;
        }
        Some(tree)
      }
      None => {
        self.done = true;
        None
      }
    }
  }
}

impl FusedIterator for Parses {}

impl fmt::Debug for Parses {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Parses")
      .field("remaining", &self.remaining)
      .field("truncated", &self.truncated)
      .field("done", &self.done)
      .finish_non_exhaustive()
  }
}
