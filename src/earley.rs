use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::grammar::Grammar;
use crate::rules::{Production, Symbol};

/// A dotted rule: `rule` with the first `pos` right-hand symbols recognized
#[derive(Debug, Clone, PartialEq)]
pub struct LR0 {
  pub rule: Rc<Production>,
  /// Index of `rule` among the productions sharing its left-hand side
  pub alt: usize,
  pub pos: usize,
}

impl LR0 {
  pub fn new(rule: &Rc<Production>, alt: usize) -> Self {
    Self {
      rule: rule.clone(),
      alt,
      pos: 0,
    }
  }

  pub fn is_active(&self) -> bool {
    self.pos < self.rule.len()
  }

  pub fn advance(&self) -> Self {
    assert!(self.is_active());
    Self {
      rule: self.rule.clone(),
      alt: self.alt,
      pos: self.pos + 1,
    }
  }

  pub fn next_symbol(&self) -> Option<&Symbol> {
    self.rule.rhs.get(self.pos)
  }
}

impl fmt::Display for LR0 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.rule.lhs)?;
    for idx in 0..self.rule.len() {
      if idx == self.pos {
        write!(f, " ・")?;
      }
      write!(f, " {}", self.rule.rhs[idx])?;
    }
    if !self.is_active() {
      write!(f, " ・")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
  pub lr0: LR0,
  pub origin: usize,
}

impl State {
  pub fn new(lr0: LR0, origin: usize) -> Self {
    Self { lr0, origin }
  }

  pub fn advance(&self) -> Self {
    Self::new(self.lr0.advance(), self.origin)
  }
}

/// States indexed by the input position they end at
#[derive(Debug)]
pub struct Chart(Vec<Vec<State>>);

impl Chart {
  pub fn new(length: usize) -> Self {
    Self(vec![Vec::new(); length])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.0[k].len()
  }

  pub fn states_at(&self, k: usize) -> &[State] {
    &self.0[k]
  }

  pub fn state_count(&self) -> usize {
    self.0.iter().map(Vec::len).sum()
  }

  pub fn has(&self, k: usize, state: &State) -> bool {
    self.0[k].contains(state)
  }

  pub fn add(&mut self, k: usize, state: State) {
    if !self.has(k, &state) {
      self.0[k].push(state);
    }
  }

  /// Checks for a completed `start` state covering the whole input
  pub fn is_accepted(&self, start: &str) -> bool {
    match self.0.last() {
      Some(last) if self.len() > 1 => last
        .iter()
        .any(|s| s.origin == 0 && !s.lr0.is_active() && s.lr0.rule.lhs == start),
      _ => false,
    }
  }

  /// Owned copy of a state, so the chart can be mutably borrowed while it's in use.
  /// Only an Rc and a few usizes are cloned.
  fn get_state(&self, k: usize, idx: usize) -> State {
    self.0[k][idx].clone()
  }
}

impl IntoIterator for Chart {
  type Item = (usize, Vec<State>);
  type IntoIter = std::iter::Enumerate<std::vec::IntoIter<Vec<State>>>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter().enumerate()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "State {}:", k)?;
      for state in self.0[k].iter() {
        writeln!(f, "  {}..{}: {}", state.origin, k, state.lr0)?;
      }
    }
    Ok(())
  }
}

/// Runs the Earley recognizer over `input`. Grammars have no empty productions,
/// so completed states always span at least one token.
pub fn parse_chart(g: &Grammar, input: &[&str]) -> Chart {
  let mut chart = Chart::new(input.len() + 1);

  for (alt, rule) in g.productions_for(g.start()).iter().enumerate() {
    chart.add(0, State::new(LR0::new(rule, alt), 0));
  }

  for k in 0..chart.len() {
    // the number of states at k grows while we walk it
    let mut idx = 0;
    while idx < chart.len_at(k) {
      let state = chart.get_state(k, idx);
      idx += 1;

      match state.lr0.next_symbol() {
        None => completer(&mut chart, k, &state),
        Some(Symbol::Nonterminal(name)) => predictor(g, &mut chart, k, name),
        Some(Symbol::Terminal(word)) => scanner(&mut chart, k, &state, word, input),
      };
    }
  }

  debug!(
    tokens = input.len(),
    states = chart.state_count(),
    accepted = chart.is_accepted(g.start()),
    "built chart"
  );
  chart
}

fn completer(chart: &mut Chart, k: usize, state: &State) {
  assert!(!state.lr0.is_active(), "tried to complete active state");

  // find the states that were waiting on this symbol where it started, and
  // move their dot past it
  for idx in 0..chart.len_at(state.origin) {
    let other = chart.get_state(state.origin, idx);

    if let Some(Symbol::Nonterminal(wanted)) = other.lr0.next_symbol() {
      if *wanted == state.lr0.rule.lhs {
        chart.add(k, other.advance())
      }
    }
  }
}

fn predictor(g: &Grammar, chart: &mut Chart, k: usize, needed: &str) {
  // an undefined non-terminal predicts nothing, and its parent never completes
  for (alt, wanted_rule) in g.productions_for(needed).iter().enumerate() {
    chart.add(k, State::new(LR0::new(wanted_rule, alt), k));
  }
}

fn scanner(chart: &mut Chart, k: usize, state: &State, word: &str, input: &[&str]) {
  if k < input.len() && input[k] == word {
    chart.add(k + 1, state.advance());
  }
}
