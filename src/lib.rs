#[macro_use]
extern crate lazy_static;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

pub mod bracketed;
pub mod earley;
pub mod error;
pub mod filter;
pub mod forest;
pub mod grammar;
pub mod parse_grammar;
pub mod parser;
pub mod rules;
pub mod syntree;

use crate::earley::Chart;
pub use crate::error::{Err, MalformedGrammarError, TreeSyntaxError};
pub use crate::filter::{Filter, Predicate};
pub use crate::grammar::Grammar;
pub use crate::parser::{ChartParser, ParserConfig, Parses};
pub use crate::rules::{Production, Symbol};
pub use crate::syntree::{ParseTree, SynTree};

impl Grammar {
  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    ChartParser::new(self).chart(input)
  }

  /// Every parse of `input`, unbounded. See [`ChartParser`] to cap the results.
  pub fn parse(&self, input: &[&str]) -> Parses {
    ChartParser::new(self).parse(input)
  }
}
