use std::collections::BTreeSet;
use std::fmt;
use std::iter;
use std::rc::Rc;

use tracing::trace;

use crate::earley::Chart;
use crate::rules::{Production, Symbol};
use crate::syntree::{Constituent, ParseTree, SynTree, Word};

/// Boxed lazy sequence of trees
pub type Trees = Box<dyn Iterator<Item = ParseTree>>;

type Sequences = Box<dyn Iterator<Item = Vec<ParseTree>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestState {
  rule: Rc<Production>,
  alt: usize,
  span: (usize, usize),
}

impl ForestState {
  pub fn new(rule: &Rc<Production>, alt: usize, start: usize, end: usize) -> Self {
    Self {
      rule: rule.clone(),
      alt,
      span: (start, end),
    }
  }
}

impl fmt::Display for ForestState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.rule)
  }
}

/// One child slot of a partially expanded node: a token, or a constituent
/// still to be expanded into trees
#[derive(Debug, Clone, PartialEq)]
enum Child {
  Leaf(Word<String>),
  Node(String, (usize, usize)),
}

/// The chain of (symbol, span) pairs from the root down to the node being
/// expanded, used to cut unary cycles
#[derive(Debug)]
enum Ancestors {
  Root,
  Node {
    symbol: String,
    span: (usize, usize),
    parent: Rc<Ancestors>,
  },
}

impl Ancestors {
  fn contains(&self, symbol: &str, span: (usize, usize)) -> bool {
    let mut current = self;
    loop {
      match current {
        Self::Root => return false,
        Self::Node {
          symbol: s,
          span: sp,
          parent,
        } => {
          if s == symbol && *sp == span {
            return true;
          }
          current = parent.as_ref();
        }
      }
    }
  }
}

/// Completed chart states, indexed by origin, plus the tokens they cover
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
  states: Vec<Vec<ForestState>>,
  tokens: Vec<String>,
}

impl Forest {
  pub fn new(chart: Chart, input: &[&str]) -> Self {
    // no rule can have its origin at the end of the string, so there's one
    // origin slot per token
    let mut v = vec![Vec::new(); chart.len().saturating_sub(1)];

    for (k, states) in chart.into_iter() {
      for state in states {
        // unfinished rules can't contribute to a tree
        if !state.lr0.is_active() {
          if let Some(slot) = v.get_mut(state.origin) {
            slot.push(ForestState::new(&state.lr0.rule, state.lr0.alt, state.origin, k));
          }
        }
      }
    }

    Self {
      states: v,
      tokens: input.iter().map(|t| t.to_string()).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Ends of the completed `symbol` constituents starting at `start` that fit
  /// inside `end`, shortest first
  fn candidate_ends(&self, symbol: &str, start: usize, end: usize) -> BTreeSet<usize> {
    self.states[start]
      .iter()
      .filter(|s| s.span.1 <= end && s.rule.lhs == symbol)
      .map(|s| s.span.1)
      .collect()
  }

  /// The productions that completed `symbol` over exactly `span`, in grammar order
  fn alternatives(&self, symbol: &str, span: (usize, usize)) -> Vec<ForestState> {
    let mut alts = self.states[span.0]
      .iter()
      .filter(|s| s.span == span && s.rule.lhs == symbol)
      .cloned()
      .collect::<Vec<_>>();
    alts.sort_by_key(|s| s.alt);
    alts
  }

  /// Takes a right-hand side and search span, and returns every way of
  /// assigning sub-spans to the remaining symbols so they exactly cover the
  /// span. For the situation:
  ///
  /// ```text
  /// g := S -> 'x' | S S
  /// forest := parse(g, "x x x")
  /// forest.extend_out([S, S], 0, start = 0, end = 3)
  /// ```
  ///
  /// you'd get, leftmost split first:
  ///
  /// ```text
  /// [[S 0..1, S 1..3],
  ///  [S 0..2, S 2..3]]
  /// ```
  fn extend_out(
    &self,
    rhs: &[Symbol],
    idx: usize,
    search_start: usize,
    search_end: usize,
  ) -> Vec<Vec<Child>> {
    if idx == rhs.len() && search_start == search_end {
      // consumed the whole rule and the whole span together
      return vec![Vec::new()];
    } else if idx == rhs.len() || rhs.len() - idx > search_end - search_start {
      // every remaining symbol needs at least one token
      return Vec::new();
    }

    match &rhs[idx] {
      Symbol::Nonterminal(wanted) => self
        .candidate_ends(wanted, search_start, search_end)
        .into_iter()
        .flat_map(|end| {
          self
            .extend_out(rhs, idx + 1, end, search_end)
            .into_iter()
            .map(move |mut seq| {
              seq.insert(0, Child::Node(wanted.clone(), (search_start, end)));
              seq
            })
        })
        .collect(),
      Symbol::Terminal(word) => {
        if self.tokens[search_start] != *word {
          return Vec::new();
        }
        let leaf = Child::Leaf(Word {
          value: word.clone(),
          span: (search_start, search_start + 1),
        });

        self
          .extend_out(rhs, idx + 1, search_start + 1, search_end)
          .into_iter()
          .map(move |mut seq| {
            seq.insert(0, leaf.clone());
            seq
          })
          .collect()
      }
    }
  }

  /// Lazily yields every tree for `symbol` over `span`. Productions are tried in
  /// grammar order and splits leftmost first. Nothing below a node is built
  /// until the consumer asks for a tree that needs it.
  fn expand(
    forest: &Rc<Self>,
    symbol: &str,
    span: (usize, usize),
    ancestors: &Rc<Ancestors>,
  ) -> Trees {
    if ancestors.contains(symbol, span) {
      trace!(symbol, ?span, "cutting unary cycle");
      return Box::new(iter::empty());
    }
    let ancestors = Rc::new(Ancestors::Node {
      symbol: symbol.to_string(),
      span,
      parent: ancestors.clone(),
    });
    let label = Constituent {
      value: symbol.to_string(),
      span,
    };
    let alternatives = forest.alternatives(symbol, span);
    let forest = forest.clone();

    Box::new(alternatives.into_iter().flat_map(move |state| {
      let sequences = forest.extend_out(&state.rule.rhs, 0, span.0, span.1);
      let forest = forest.clone();
      let ancestors = ancestors.clone();
      let label = label.clone();

      sequences.into_iter().flat_map(move |children| {
        let label = label.clone();
        Self::combine(&forest, Rc::new(children), 0, &ancestors)
          .map(move |children| SynTree::Branch(label.clone(), children))
      })
    }))
  }

  /// Every combination of trees for `children[idx..]`, leftmost child varying slowest
  fn combine(
    forest: &Rc<Self>,
    children: Rc<Vec<Child>>,
    idx: usize,
    ancestors: &Rc<Ancestors>,
  ) -> Sequences {
    let heads: Trees = match children.get(idx) {
      None => return Box::new(iter::once(Vec::new())),
      Some(Child::Leaf(word)) => Box::new(iter::once(SynTree::Leaf(word.clone()))),
      Some(Child::Node(symbol, span)) => Self::expand(forest, symbol, *span, ancestors),
    };
    let forest = forest.clone();
    let ancestors = ancestors.clone();

    Box::new(heads.flat_map(move |head| {
      Self::combine(&forest, children.clone(), idx + 1, &ancestors).map(move |mut rest| {
        rest.insert(0, head.clone());
        rest
      })
    }))
  }

  /// All trees headed by `start` that cover the whole input, built on demand
  pub fn trees(self, start: &str) -> Trees {
    if self.is_empty() {
      return Box::new(iter::empty());
    }
    let span = (0, self.len());
    Self::expand(&Rc::new(self), start, span, &Rc::new(Ancestors::Root))
  }
}

impl fmt::Display for Forest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "Origin {}:", k)?;
      for fs in self.states[k].iter() {
        writeln!(f, "  {}", fs)?;
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::earley::parse_chart;
  use crate::grammar::Grammar;

  fn forest(g: &Grammar, input: &[&str]) -> Forest {
    Forest::new(parse_chart(g, input), input)
  }

  #[test]
  fn test_forest_states() {
    let g: Grammar = "S -> 'x' | S S".parse().unwrap();
    let rule1 = &g.productions_for("S")[0];
    let rule2 = &g.productions_for("S")[1];

    let f = forest(&g, &["x", "x", "x"]);
    let mut by_origin = f.states.clone();
    for states in by_origin.iter_mut() {
      states.sort_by_key(|s| (s.span.1, s.alt));
    }

    assert_eq!(
      by_origin,
      vec![
        vec![
          ForestState::new(rule1, 0, 0, 1),
          ForestState::new(rule2, 1, 0, 2),
          ForestState::new(rule2, 1, 0, 3),
        ],
        vec![
          ForestState::new(rule1, 0, 1, 2),
          ForestState::new(rule2, 1, 1, 3),
        ],
        vec![ForestState::new(rule1, 0, 2, 3)],
      ]
    );
  }

  #[test]
  fn test_extend_out_prefers_leftmost_split() {
    let g: Grammar = "S -> 'x' | S S".parse().unwrap();
    let f = forest(&g, &["x", "x", "x"]);
    let rhs = &g.productions_for("S")[1].rhs;

    assert_eq!(
      f.extend_out(rhs, 0, 0, 3),
      vec![
        vec![
          Child::Node("S".to_string(), (0, 1)),
          Child::Node("S".to_string(), (1, 3)),
        ],
        vec![
          Child::Node("S".to_string(), (0, 2)),
          Child::Node("S".to_string(), (2, 3)),
        ],
      ]
    );
  }

  #[test]
  fn test_tree_generation() {
    // a naive walk of the forest would also glue together spurious trees like
    //  (S (S x) (S x))                     -> [x][x]
    //  (S (S (S x) (S x)) (S (S x) (S x))) -> [xx][xx]
    // only these two cover the input exactly
    let g: Grammar = "S -> 'x' | S S".parse().unwrap();
    let trees = forest(&g, &["x", "x", "x"])
      .trees("S")
      .map(|t| t.to_string())
      .collect::<Vec<_>>();

    assert_eq!(
      trees,
      vec!["(S (S x) (S (S x) (S x)))", "(S (S (S x) (S x)) (S x))"]
    );
  }

  #[test]
  fn test_terminals_must_line_up_with_tokens() {
    // A covers 0..1 and 2..5, but a split there would put 'b' over the 'a' at 1
    let g: Grammar = "S -> A 'b' A\nA -> 'a' | 'b' | A A".parse().unwrap();
    let trees = forest(&g, &["a", "a", "b", "a", "b"])
      .trees("S")
      .map(|t| t.to_string())
      .collect::<Vec<_>>();

    assert_eq!(trees, vec!["(S (A (A a) (A a)) b (A (A a) (A b)))"]);
  }

  #[test]
  fn test_unary_cycle_yields_finite_trees() {
    let g: Grammar = "S -> A\nA -> S | 'x'".parse().unwrap();
    let trees = forest(&g, &["x"])
      .trees("S")
      .map(|t| t.to_string())
      .collect::<Vec<_>>();

    assert_eq!(trees, vec!["(S (A x))"]);
  }

  #[test]
  fn test_mixed_terminals_keep_their_leaves() {
    let g: Grammar = "VP -> V 'to' V\nV -> 'want' | 'go'".parse().unwrap();
    let trees = forest(&g, &["want", "to", "go"]).trees("VP").collect::<Vec<_>>();

    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_string(), "(VP (V want) to (V go))");
    assert_eq!(trees[0].get(&[1]).unwrap().span(), (1, 2));
  }
}
