use std::error::Error;

use thiserror::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// Raised when a grammar can't be built, either from productions or from text notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGrammarError {
  #[error("grammar has no productions")]
  NoProductions,
  #[error("production for {lhs} has an empty right-hand side")]
  EmptyRightHandSide { lhs: String },
  #[error("empty left-hand side or start symbol")]
  EmptyLeftHandSide,
  #[error("line {line}: {message}")]
  Syntax { line: usize, message: String },
}

/// Raised when bracketed tree notation can't be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeSyntaxError {
  #[error("no tree in input")]
  Empty,
  #[error("input ended inside a tree")]
  UnexpectedEnd,
  #[error("unexpected {token:?} at token {index}")]
  Unexpected { token: String, index: usize },
  #[error("trailing input after tree at token {index}")]
  TrailingInput { index: usize },
}
