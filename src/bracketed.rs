//! Bracketed tree notation, as used by treebanks: `(S (NP Mary) (VP (V saw) (NP Bob)))`
use regex::Regex;
use std::str::FromStr;

use crate::error::TreeSyntaxError;
use crate::syntree::{Constituent, ParseTree, SynTree, Word};

impl FromStr for SynTree<String, String> {
  type Err = TreeSyntaxError;

  /// Reads one bracketed tree. An unlabeled wrapper like `( (S ...) )`, common
  /// in Penn treebank files, gets the empty string as its label.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    regex_static!(TOKEN, r"\(|\)|[^\s()]+");
    let tokens = TOKEN.find_iter(s).map(|m| m.as_str()).collect::<Vec<_>>();
    if tokens.is_empty() {
      return Err(TreeSyntaxError::Empty);
    }

    let mut reader = Reader {
      tokens,
      pos: 0,
      leaves: 0,
    };
    let tree = reader.read_branch()?;
    if reader.pos < reader.tokens.len() {
      return Err(TreeSyntaxError::TrailingInput { index: reader.pos });
    }
    Ok(tree)
  }
}

struct Reader<'a> {
  tokens: Vec<&'a str>,
  pos: usize,
  leaves: usize,
}

impl<'a> Reader<'a> {
  fn next(&mut self) -> Result<&'a str, TreeSyntaxError> {
    let token = self
      .tokens
      .get(self.pos)
      .copied()
      .ok_or(TreeSyntaxError::UnexpectedEnd)?;
    self.pos += 1;
    Ok(token)
  }

  fn peek(&self) -> Option<&'a str> {
    self.tokens.get(self.pos).copied()
  }

  fn unexpected(&self, token: &str) -> TreeSyntaxError {
    TreeSyntaxError::Unexpected {
      token: token.to_string(),
      index: self.pos - 1,
    }
  }

  fn read_branch(&mut self) -> Result<ParseTree, TreeSyntaxError> {
    let open = self.next()?;
    if open != "(" {
      return Err(self.unexpected(open));
    }

    let label = match self.peek() {
      Some("(") => String::new(),
      Some(")") => {
        self.pos += 1;
        return Err(self.unexpected(")"));
      }
      None => return Err(TreeSyntaxError::UnexpectedEnd),
      Some(_) => self.next()?.to_string(),
    };

    let start = self.leaves;
    let mut children = Vec::new();
    loop {
      match self.peek() {
        None => return Err(TreeSyntaxError::UnexpectedEnd),
        Some(")") => {
          self.pos += 1;
          break;
        }
        Some("(") => children.push(self.read_branch()?),
        Some(word) => {
          self.pos += 1;
          children.push(SynTree::Leaf(Word {
            value: word.to_string(),
            span: (self.leaves, self.leaves + 1),
          }));
          self.leaves += 1;
        }
      }
    }

    Ok(SynTree::Branch(
      Constituent {
        value: label,
        span: (start, self.leaves),
      },
      children,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CAT_TREE: &str = "(S (NP (DT the) (NN cat)) (VP (VBD ate) (NP (DT a) (NN cookie))))";

  #[test]
  fn test_reads_nested_tree() {
    let t: ParseTree = CAT_TREE.parse().unwrap();

    assert_eq!(t.to_string(), CAT_TREE);
    assert_eq!(t.label().map(String::as_str), Some("S"));
    assert_eq!(t.height(), 5);
    assert_eq!(t.leaves(), vec!["the", "cat", "ate", "a", "cookie"]);
    assert_eq!(
      t.get(&[1, 1]).unwrap().to_string(),
      "(NP (DT a) (NN cookie))"
    );
    assert_eq!(t.get(&[1, 1, 0]).unwrap().to_string(), "(DT a)");
    assert_eq!(t.get(&[1, 1]).unwrap().span(), (3, 5));
    assert_eq!(t.get(&[1, 1, 1, 0]).unwrap().span(), (4, 5));
  }

  #[test]
  fn test_reads_across_lines_and_wrapper() {
    let t: ParseTree = "( (S\n  (NP-SBJ (-NONE- *-1))\n  (VP (TO to))) )".parse().unwrap();

    assert_eq!(t.label().map(String::as_str), Some(""));
    assert_eq!(t.get(&[0, 0]).unwrap().label().map(String::as_str), Some("NP-SBJ"));
    assert_eq!(t.leaves(), vec!["*-1", "to"]);
  }

  #[test]
  fn test_syntax_errors() {
    assert_eq!("".parse::<ParseTree>(), Err(TreeSyntaxError::Empty));
    assert_eq!(
      "(S (NP Mary)".parse::<ParseTree>(),
      Err(TreeSyntaxError::UnexpectedEnd)
    );
    assert_eq!(
      "Mary".parse::<ParseTree>(),
      Err(TreeSyntaxError::Unexpected {
        token: "Mary".to_string(),
        index: 0
      })
    );
    assert_eq!(
      "()".parse::<ParseTree>(),
      Err(TreeSyntaxError::Unexpected {
        token: ")".to_string(),
        index: 1
      })
    );
    assert_eq!(
      "(NP Mary) (VP ran)".parse::<ParseTree>(),
      Err(TreeSyntaxError::TrailingInput { index: 4 })
    );
  }
}
