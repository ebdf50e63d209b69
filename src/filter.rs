//! Structural queries over parsed or hand-built trees, in the style of
//! treebank searches like "verb phrases with a sentential complement".
//!
//! ```
//! use cfgchart::filter::{Filter, subtrees};
//! use cfgchart::ParseTree;
//!
//! let t: ParseTree = "(S (NP Bob) (VP (V knew) (S (NP Mary) (VP (V left)))))".parse().unwrap();
//! let vcomp = Filter::label("VP").and(Filter::child_label("S"));
//!
//! let found = subtrees(&t, vcomp).map(|s| s.leaves().len()).collect::<Vec<_>>();
//! assert_eq!(found, vec![3]);
//! ```
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::syntree::ParseTree;

/// A yes/no question about a single tree node. Closures over `&ParseTree`
/// are predicates, so are [`Filter`]s.
pub trait Predicate {
  fn matches(&self, tree: &ParseTree) -> bool;
}

impl<F> Predicate for F
where
  F: Fn(&ParseTree) -> bool,
{
  fn matches(&self, tree: &ParseTree) -> bool {
    self(tree)
  }
}

/// A composable, cloneable predicate
#[derive(Clone)]
pub struct Filter(Rc<dyn Fn(&ParseTree) -> bool>);

impl Filter {
  pub fn new(f: impl Fn(&ParseTree) -> bool + 'static) -> Self {
    Self(Rc::new(f))
  }

  /// Matches every node
  pub fn any() -> Self {
    Self::new(|_| true)
  }

  pub fn label(label: impl Into<String>) -> Self {
    let label = label.into();
    Self::new(move |t| t.label() == Some(&label))
  }

  /// Some immediate child is a branch labeled `label`
  pub fn child_label(label: impl Into<String>) -> Self {
    let label = label.into();
    Self::new(move |t| t.child_labels().any(|l| *l == label))
  }

  /// The first child is the leaf `word`, as with preterminals like `(DT the)`
  pub fn first_word(word: impl Into<String>) -> Self {
    let word = word.into();
    Self::new(move |t| {
      t.children()
        .first()
        .and_then(|c| c.get_leaf())
        .is_some_and(|w| w.value == word)
    })
  }

  /// `word` is somewhere among the node's leaves
  pub fn dominates_word(word: impl Into<String>) -> Self {
    let word = word.into();
    Self::new(move |t| t.leaves().into_iter().any(|w| *w == word))
  }

  pub fn and(self, other: Filter) -> Self {
    Self::new(move |t| self.matches(t) && other.matches(t))
  }

  pub fn or(self, other: Filter) -> Self {
    Self::new(move |t| self.matches(t) || other.matches(t))
  }

  #[allow(clippy::should_implement_trait)]
  pub fn not(self) -> Self {
    Self::new(move |t| !self.matches(t))
  }
}

impl Predicate for Filter {
  fn matches(&self, tree: &ParseTree) -> bool {
    (self.0)(tree)
  }
}

impl fmt::Debug for Filter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Filter(..)")
  }
}

/// Every subtree of `tree`, `tree` included, that `predicate` accepts. Visits
/// parent before children and siblings left to right. Leaves are never visited.
pub fn subtrees<'t, P>(tree: &'t ParseTree, predicate: P) -> impl Iterator<Item = &'t ParseTree>
where
  P: Predicate,
{
  tree.branches().filter(move |t| predicate.matches(t))
}

/// Matching subtrees across a collection of trees, in order
pub fn select<'t, I, P>(trees: I, predicate: P) -> Vec<&'t ParseTree>
where
  I: IntoIterator<Item = &'t ParseTree>,
  P: Predicate,
{
  let predicate = &predicate;
  trees
    .into_iter()
    .flat_map(move |t| subtrees(t, move |node: &ParseTree| predicate.matches(node)))
    .collect()
}

/// Distinct labels of the matching subtrees across a collection of trees, sorted
pub fn labels_where<'t, I, P>(trees: I, predicate: P) -> BTreeSet<&'t str>
where
  I: IntoIterator<Item = &'t ParseTree>,
  P: Predicate,
{
  select(trees, predicate)
    .into_iter()
    .filter_map(|t| t.label().map(String::as_str))
    .collect()
}

impl ParseTree {
  /// Shorthand for [`subtrees`]
  pub fn subtrees<P: Predicate>(&self, predicate: P) -> impl Iterator<Item = &ParseTree> {
    subtrees(self, predicate)
  }
}
