use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
  Terminal(String),
  Nonterminal(String),
}

impl Symbol {
  pub fn terminal(s: impl Into<String>) -> Self {
    Self::Terminal(s.into())
  }

  pub fn nonterminal(s: impl Into<String>) -> Self {
    Self::Nonterminal(s.into())
  }

  pub fn symbol_str(&self) -> &str {
    match self {
      Self::Terminal(s) => s,
      Self::Nonterminal(s) => s,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Terminal(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Self::Nonterminal(_))
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(s) if s.contains('\'') => write!(f, "\"{}\"", s),
      Self::Terminal(s) => write!(f, "'{}'", s),
      Self::Nonterminal(s) => write!(f, "{}", s),
    }
  }
}

/// A single rewrite rule, `lhs -> rhs[0] rhs[1] ...`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
  pub lhs: String,
  pub rhs: Vec<Symbol>,
}

impl Production {
  pub fn new(lhs: impl Into<String>, rhs: Vec<Symbol>) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
    }
  }

  pub fn len(&self) -> usize {
    self.rhs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// True if the right-hand side is made only of terminals, like `N -> 'fish'`
  pub fn is_lexical(&self) -> bool {
    self.rhs.iter().all(Symbol::is_terminal)
  }

  pub fn terminals(&self) -> impl Iterator<Item = &str> {
    self
      .rhs
      .iter()
      .filter(|s| s.is_terminal())
      .map(Symbol::symbol_str)
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self
      .rhs
      .iter()
      .filter(|s| s.is_nonterminal())
      .map(Symbol::symbol_str)
  }
}

impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.lhs)?;
    for s in self.rhs.iter() {
      write!(f, " {}", s)?;
    }
    Ok(())
  }
}
