use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

/// A derivation produced by the parser, or read from bracketed notation.
/// Branches are labeled with non-terminal names, leaves hold tokens.
pub type ParseTree = SynTree<String, String>;

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn into_branch(self) -> Option<(Constituent<T>, Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The branch label, or None for a leaf
  pub fn label(&self) -> Option<&T> {
    self.get_branch().map(|(c, _)| &c.value)
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  pub fn children(&self) -> &[SynTree<T, U>] {
    match self {
      Self::Branch(_, cs) => cs,
      Self::Leaf(_) => &[],
    }
  }

  /// Labels of the immediate branch children, skipping leaves
  pub fn child_labels(&self) -> impl Iterator<Item = &T> {
    self.children().iter().filter_map(SynTree::label)
  }

  /// Follows a path of child indices, so `t.get(&[1, 0])` is the first child
  /// of the second child. The empty path is the tree itself.
  pub fn get(&self, path: &[usize]) -> Option<&SynTree<T, U>> {
    path
      .iter()
      .try_fold(self, |node, &idx| node.children().get(idx))
  }

  /// Tokens under this tree, left to right
  pub fn leaves(&self) -> Vec<&U> {
    let mut leaves = Vec::new();
    self.collect_leaves(&mut leaves);
    leaves
  }

  fn collect_leaves<'a>(&'a self, into: &mut Vec<&'a U>) {
    match self {
      Self::Leaf(w) => into.push(&w.value),
      Self::Branch(_, children) => {
        for child in children.iter() {
          child.collect_leaves(into);
        }
      }
    }
  }

  /// A leaf counts as one level, so a preterminal like `(NN cat)` has height 2.
  pub fn height(&self) -> usize {
    match self {
      Self::Leaf(_) => 1,
      Self::Branch(_, children) => 1 + children.iter().map(SynTree::height).max().unwrap_or(0),
    }
  }

  /// Every branch in the tree, parent before children, siblings left to right
  pub fn branches(&self) -> Branches<'_, T, U> {
    Branches { stack: vec![self] }
  }
}

/// Pre-order iterator over the branches of a tree, see [`SynTree::branches`]
#[derive(Debug, Clone)]
pub struct Branches<'a, T, U> {
  stack: Vec<&'a SynTree<T, U>>,
}

impl<'a, T, U> Iterator for Branches<'a, T, U> {
  type Item = &'a SynTree<T, U>;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(node) = self.stack.pop() {
      if let SynTree::Branch(_, children) = node {
        // reversed so the leftmost child is popped first
        self.stack.extend(children.iter().rev());
        return Some(node);
      }
    }
    None
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  /// `{}` prints bracketed notation on one line, `{:#}` prints an indented tree
  /// annotated with spans.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.alternate() {
      return self.fmt_indented(f);
    }
    match self {
      Self::Leaf(w) => write!(f, "{}", w.value),
      Self::Branch(c, children) => {
        write!(f, "({}", c.value)?;
        for child in children.iter() {
          write!(f, " {}", child)?;
        }
        write!(f, ")")
      }
    }
  }
}

impl<T, U> SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt_indented(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(t) => write!(f, "{}", t),
      Self::Branch(t, ts) => {
        write!(f, "({}", t)?;
        if ts.len() == 1 {
          write!(f, " ({:#}))", ts[0])
        } else {
          for t in ts.iter() {
            let fmt = format!("{:#}", t);
            for line in fmt.lines() {
              write!(f, "\n  {}", line)?;
            }
          }
          write!(f, ")")
        }
      }
    }
  }
}
