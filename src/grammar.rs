use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{Err, MalformedGrammarError};
use crate::rules::Production;

#[derive(Debug)]
pub struct Grammar {
  start: String,
  productions: Vec<Rc<Production>>,
  rules: HashMap<String, Vec<Rc<Production>>>,
  terminals: HashSet<String>,
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "%start {}", self.start)?;
    for p in self.productions.iter() {
      writeln!(f, "{}", p)?;
    }
    Ok(())
  }
}

impl Grammar {
  /// Builds a grammar, keeping productions in insertion order.
  ///
  /// Fails if there are no productions or if any production has an empty side.
  /// Gaps that still leave a usable grammar (undefined or unreachable
  /// non-terminals, a start symbol with no rules) are logged, not rejected.
  pub fn new(
    start: impl Into<String>,
    productions: Vec<Production>,
  ) -> Result<Self, MalformedGrammarError> {
    let start = start.into();
    if productions.is_empty() {
      return Err(MalformedGrammarError::NoProductions);
    }
    if start.is_empty() {
      return Err(MalformedGrammarError::EmptyLeftHandSide);
    }

    let mut seen = HashSet::with_capacity(productions.len());
    let mut kept = Vec::with_capacity(productions.len());
    for production in productions {
      if production.lhs.is_empty() {
        return Err(MalformedGrammarError::EmptyLeftHandSide);
      }
      if production.is_empty() {
        return Err(MalformedGrammarError::EmptyRightHandSide {
          lhs: production.lhs,
        });
      }
      if !seen.insert(production.clone()) {
        warn!(%production, "dropping duplicate production");
        continue;
      }
      kept.push(Rc::new(production));
    }

    let rules: HashMap<String, Vec<Rc<Production>>> =
      kept.iter().fold(HashMap::new(), |mut map, rule| {
        map
          .entry(rule.lhs.clone())
          .or_insert_with(Vec::new)
          .push(rule.clone());
        map
      });

    let terminals = kept
      .iter()
      .flat_map(|p| p.terminals())
      .map(String::from)
      .collect();

    let g = Self {
      start,
      productions: kept,
      rules,
      terminals,
    };
    g.report_gaps();
    debug!(start = %g.start, productions = g.productions.len(), "built grammar");

    Ok(g)
  }

  fn report_gaps(&self) {
    if !self.rules.contains_key(&self.start) {
      warn!(start = %self.start, "start symbol has no productions");
    }
    for nt in self.undefined() {
      warn!(nonterminal = nt, "non-terminal is used but has no productions");
    }
    for nt in self.unreachable() {
      warn!(nonterminal = nt, "non-terminal is unreachable from the start symbol");
    }
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, Err> {
    let src = fs::read_to_string(path)?;
    Ok(src.parse()?)
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  pub fn productions(&self) -> &[Rc<Production>] {
    &self.productions
  }

  /// Productions headed by `nonterminal`, in insertion order
  pub fn productions_for(&self, nonterminal: &str) -> &[Rc<Production>] {
    self
      .rules
      .get(nonterminal)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn is_terminal_symbol(&self, token: &str) -> bool {
    self.terminals.contains(token)
  }

  /// Left-hand symbols in order of first appearance
  pub fn nonterminals(&self) -> Vec<&str> {
    let mut seen = HashSet::new();
    self
      .productions
      .iter()
      .map(|p| p.lhs.as_str())
      .filter(|lhs| seen.insert(*lhs))
      .collect()
  }

  pub fn terminals(&self) -> Vec<&str> {
    let mut terminals = self.terminals.iter().map(String::as_str).collect::<Vec<_>>();
    terminals.sort_unstable();
    terminals
  }

  /// Non-terminals that appear on a right-hand side but head no production
  pub fn undefined(&self) -> Vec<&str> {
    let mut seen = HashSet::new();
    self
      .productions
      .iter()
      .flat_map(|p| p.nonterminals())
      .filter(|nt| !self.rules.contains_key(*nt) && seen.insert(*nt))
      .collect()
  }

  /// Left-hand symbols no derivation from the start symbol can reach
  pub fn unreachable(&self) -> Vec<&str> {
    let reachable = self.reachable_from(&self.start);
    self
      .nonterminals()
      .into_iter()
      .filter(|nt| *nt != self.start && !reachable.contains(nt))
      .collect()
  }

  /// Checks if `nonterminal` can derive a form containing itself, directly or
  /// through other non-terminals.
  pub fn is_recursive(&self, nonterminal: &str) -> bool {
    self
      .productions_for(nonterminal)
      .iter()
      .flat_map(|p| p.nonterminals())
      .any(|nt| nt == nonterminal || self.reachable_from(nt).contains(nonterminal))
  }

  /// Every non-terminal reachable from `symbol` by one or more rewrites. `symbol`
  /// itself is only included if it is reachable from itself.
  fn reachable_from<'a>(&'a self, symbol: &'a str) -> HashSet<&'a str> {
    let mut reached = HashSet::new();
    let mut queue = VecDeque::from([symbol]);
    while let Some(current) = queue.pop_front() {
      for nt in self.productions_for(current).iter().flat_map(|p| p.nonterminals()) {
        if reached.insert(nt) {
          queue.push_back(nt);
        }
      }
    }
    reached
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rules::Symbol;

  fn nt(s: &str) -> Symbol {
    Symbol::nonterminal(s)
  }

  fn t(s: &str) -> Symbol {
    Symbol::terminal(s)
  }

  fn mary_saw_bob() -> Grammar {
    Grammar::new(
      "S",
      vec![
        Production::new("S", vec![nt("NP"), nt("VP")]),
        Production::new("NP", vec![t("Mary")]),
        Production::new("VP", vec![nt("V"), nt("NP")]),
        Production::new("V", vec![t("saw")]),
        Production::new("NP", vec![t("Bob")]),
      ],
    )
    .unwrap()
  }

  #[test]
  fn test_rejects_malformed() {
    assert_eq!(
      Grammar::new("S", Vec::new()).unwrap_err(),
      MalformedGrammarError::NoProductions
    );
    assert_eq!(
      Grammar::new(
        "S",
        vec![
          Production::new("S", vec![nt("A")]),
          Production::new("A", Vec::new())
        ]
      )
      .unwrap_err(),
      MalformedGrammarError::EmptyRightHandSide {
        lhs: "A".to_string()
      }
    );
    assert_eq!(
      Grammar::new("", vec![Production::new("S", vec![t("x")])]).unwrap_err(),
      MalformedGrammarError::EmptyLeftHandSide
    );
  }

  #[test]
  fn test_productions_for_keeps_insertion_order() {
    let g = mary_saw_bob();
    let nps = g
      .productions_for("NP")
      .iter()
      .map(|p| p.to_string())
      .collect::<Vec<_>>();
    assert_eq!(nps, vec!["NP -> 'Mary'", "NP -> 'Bob'"]);
    assert!(g.productions_for("PP").is_empty());
    assert_eq!(g.nonterminals(), vec!["S", "NP", "VP", "V"]);
  }

  #[test]
  fn test_terminal_lookup() {
    let g = mary_saw_bob();
    assert!(g.is_terminal_symbol("saw"));
    assert!(g.is_terminal_symbol("Bob"));
    assert!(!g.is_terminal_symbol("flew"));
    assert!(!g.is_terminal_symbol("NP"));
    assert_eq!(g.terminals(), vec!["Bob", "Mary", "saw"]);
  }

  #[test]
  fn test_duplicates_are_dropped() {
    let g = Grammar::new(
      "S",
      vec![
        Production::new("S", vec![t("x")]),
        Production::new("S", vec![t("x")]),
      ],
    )
    .unwrap();
    assert_eq!(g.productions().len(), 1);
  }

  #[test]
  fn test_gaps_are_tolerated() {
    let g = Grammar::new(
      "S",
      vec![
        Production::new("S", vec![nt("NP"), nt("VP")]),
        Production::new("NP", vec![t("fish")]),
        Production::new("Adj", vec![t("angry")]),
      ],
    )
    .unwrap();
    assert_eq!(g.undefined(), vec!["VP"]);
    assert_eq!(g.unreachable(), vec!["Adj"]);
  }

  #[test]
  fn test_recursion_detection() {
    let g = Grammar::new(
      "S",
      vec![
        Production::new("S", vec![nt("NP"), nt("VP")]),
        Production::new("VP", vec![nt("V"), nt("SComp")]),
        Production::new("SComp", vec![nt("Comp"), nt("S")]),
        Production::new("Nom", vec![nt("Adj"), nt("Nom")]),
        Production::new("Nom", vec![t("bear")]),
        Production::new("NP", vec![t("Bob")]),
      ],
    )
    .unwrap();
    // indirect, through SComp
    assert!(g.is_recursive("S"));
    assert!(g.is_recursive("VP"));
    // direct
    assert!(g.is_recursive("Nom"));
    assert!(!g.is_recursive("NP"));
    assert!(!g.is_recursive("Comp"));
  }
}
