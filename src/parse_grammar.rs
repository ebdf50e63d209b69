//! Line-oriented parsing of grammars written as `LHS -> RHS1 | RHS2`
use regex::Regex;
use std::str::FromStr;

use tracing::debug;

use crate::error::MalformedGrammarError;
use crate::grammar::Grammar;
use crate::rules::{Production, Symbol};

impl FromStr for Grammar {
  type Err = MalformedGrammarError;

  /// Parses a grammar from a string. The start symbol is given by a `%start`
  /// line, or else is the first rule's symbol.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse(s)
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), String>;

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  if let Some(m) = re.find(s) {
    if m.start() > 0 {
      return (None, s);
    }
    let (_, rest) = s.split_at(m.end());
    (Some(m.as_str()), rest)
  } else {
    (None, s)
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("expected {} at {:?}", re, s))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Skips spaces and a trailing `#` comment
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"\s*(#.*)?");
  optional_re(&*WHITESPACE_OR_COMMENT, s).1
}

/// Tries to parse a name made of letters, numbers, - and _
fn parse_name(s: &str) -> ParseResult<'_, &str> {
  regex_static!(NAME, r"[A-Za-z0-9_][A-Za-z0-9_\-]*");
  needed_re(&*NAME, s).map_err(|e| format!("name: {}", e))
}

/// Parses a terminal quoted with ' or "
fn parse_terminal(s: &str) -> ParseResult<'_, String> {
  regex_static!(QUOTED, r#"'[^']*'|"[^"]*""#);
  let (quoted, rest) = needed_re(&*QUOTED, s).map_err(|e| format!("terminal: {}", e))?;
  let word = &quoted[1..quoted.len() - 1];
  if word.is_empty() {
    Err(format!("empty terminal at {:?}", s))
  } else {
    Ok((word.to_string(), rest))
  }
}

fn parse_symbol(s: &str) -> ParseResult<'_, Symbol> {
  if s.starts_with('\'') || s.starts_with('"') {
    let (word, s) = parse_terminal(s)?;
    Ok((Symbol::Terminal(word), s))
  } else {
    let (name, s) = parse_name(s).map_err(|e| format!("symbol: {}", e))?;
    Ok((Symbol::Nonterminal(name.to_string()), s))
  }
}

/// Alternatives separated by `|`, up to the end of the line.
/// An empty alternative is kept so the grammar can reject it.
fn parse_alternatives(s: &str) -> Result<Vec<Vec<Symbol>>, String> {
  let mut alternatives = Vec::new();
  let mut current = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      alternatives.push(current);
      return Ok(alternatives);
    }
    if let (Some(_), s) = optional_char('|', rem) {
      alternatives.push(std::mem::take(&mut current));
      rem = s;
      continue;
    }
    let (symbol, s) = parse_symbol(rem)?;
    current.push(symbol);
    rem = s;
  }
}

enum Line {
  Blank,
  Start(String),
  Rule(String, Vec<Vec<Symbol>>),
  Continuation(Vec<Vec<Symbol>>),
}

fn parse_line(line: &str) -> Result<Line, String> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "->");
  regex_static!(START, "%start");

  let s = skip_whitespace(line);
  if s.is_empty() {
    return Ok(Line::Blank);
  }

  if let (Some(_), s) = optional_re(&*START, s) {
    let s = skip_whitespace(s);
    let (name, s) = parse_name(s).map_err(|e| format!("start symbol: {}", e))?;
    return if skip_whitespace(s).is_empty() {
      Ok(Line::Start(name.to_string()))
    } else {
      Err(format!("unexpected input after start symbol: {:?}", s))
    };
  }

  if let (Some(_), s) = optional_char('|', s) {
    // `| X Y` continues the previous rule; the leading bar is not an empty alternative
    return Ok(Line::Continuation(parse_alternatives(s)?));
  }

  let (lhs, s) = parse_name(s).map_err(|e| format!("rule symbol: {}", e))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&*ARROW, s).map_err(|e| format!("rule arrow: {}", e))?;
  Ok(Line::Rule(lhs.to_string(), parse_alternatives(s)?))
}

/// Parses grammar text into a [`Grammar`].
/// Errors if the text doesn't parse or describes a malformed grammar.
pub fn parse(s: &str) -> Result<Grammar, MalformedGrammarError> {
  let mut start = None;
  let mut productions = Vec::new();
  let mut last_lhs: Option<String> = None;

  for (idx, line) in s.lines().enumerate() {
    let syntax = |message: String| MalformedGrammarError::Syntax {
      line: idx + 1,
      message,
    };

    match parse_line(line).map_err(syntax)? {
      Line::Blank => {}
      Line::Start(name) => {
        if start.replace(name).is_some() {
          return Err(syntax("duplicate %start".to_string()));
        }
      }
      Line::Rule(lhs, alternatives) => {
        productions.extend(
          alternatives
            .into_iter()
            .map(|rhs| Production::new(lhs.clone(), rhs)),
        );
        last_lhs = Some(lhs);
      }
      Line::Continuation(alternatives) => {
        let Some(lhs) = &last_lhs else {
          return Err(syntax("continuation line without a rule".to_string()));
        };
        productions.extend(
          alternatives
            .into_iter()
            .map(|rhs| Production::new(lhs.clone(), rhs)),
        );
      }
    }
  }

  let start = match start {
    Some(start) => start,
    None => match productions.first() {
      Some(first) => first.lhs.clone(),
      None => return Err(MalformedGrammarError::NoProductions),
    },
  };

  debug!(%start, productions = productions.len(), "parsed grammar text");
  Grammar::new(start, productions)
}

#[cfg(test)]
mod tests {
  use super::*;

  macro_rules! grammar_file {
    ($filename:expr) => {
      (
        $filename,
        include_str!(concat!("../grammars/", $filename)),
      )
    };
  }

  #[test]
  fn smoke_test_bundled_grammars() {
    let grammars = [
      grammar_file!("fish.cfg"),
      grammar_file!("groucho.cfg"),
      grammar_file!("recursive.cfg"),
      grammar_file!("sentential.cfg"),
      grammar_file!("simple.cfg"),
    ];

    for (filename, src) in grammars {
      assert!(src.parse::<Grammar>().is_ok(), "failed to parse {filename}");
    }
  }

  #[test]
  fn test_alternatives_and_quotes() {
    let g: Grammar = r#"
      S   -> NP VP
      NP  -> Det N | Det N PP | 'I'
      Det -> "an" | 'my'
    "#
    .parse()
    .unwrap();

    assert_eq!(g.start(), "S");
    let nps = g
      .productions_for("NP")
      .iter()
      .map(|p| p.to_string())
      .collect::<Vec<_>>();
    assert_eq!(nps, vec!["NP -> Det N", "NP -> Det N PP", "NP -> 'I'"]);
    assert!(g.is_terminal_symbol("an"));
    assert!(g.is_terminal_symbol("I"));
  }

  #[test]
  fn test_comments_continuations_and_start() {
    let g: Grammar = r#"
      # sentences may embed sentences
      %start S
      SComp -> Comp S   # indirect recursion
      S -> NP VP
      VP -> V NP
          | V SComp
      NP -> 'Bob' | 'Mary'
      V -> 'knew'
      Comp -> 'that'
    "#
    .parse()
    .unwrap();

    assert_eq!(g.start(), "S");
    assert_eq!(g.productions_for("VP").len(), 2);
    assert_eq!(g.productions_for("VP")[1].to_string(), "VP -> V SComp");
  }

  #[test]
  fn test_display_round_trips() {
    let src = "S -> NP VP\nNP -> 'Mary' | \"Bob\"\nVP -> V NP\nV -> 'saw'\n";
    let g: Grammar = src.parse().unwrap();
    let again: Grammar = g.to_string().parse().unwrap();
    assert_eq!(g.productions(), again.productions());
    assert_eq!(g.start(), again.start());
  }

  #[test]
  fn test_syntax_errors_have_line_numbers() {
    let err = "S -> NP VP\nNP => 'x'\n".parse::<Grammar>().unwrap_err();
    assert!(matches!(err, MalformedGrammarError::Syntax { line: 2, .. }));

    let err = "S -> ''\n".parse::<Grammar>().unwrap_err();
    assert!(matches!(err, MalformedGrammarError::Syntax { line: 1, .. }));

    let err = "| 'x'\n".parse::<Grammar>().unwrap_err();
    assert!(matches!(err, MalformedGrammarError::Syntax { line: 1, .. }));

    let err = "%start S\n%start T\nS -> 'x'".parse::<Grammar>().unwrap_err();
    assert!(matches!(err, MalformedGrammarError::Syntax { line: 2, .. }));
  }

  #[test]
  fn test_structural_errors() {
    assert_eq!(
      "# nothing here\n".parse::<Grammar>().unwrap_err(),
      MalformedGrammarError::NoProductions
    );
    assert_eq!(
      "S -> 'x' |\n".parse::<Grammar>().unwrap_err(),
      MalformedGrammarError::EmptyRightHandSide {
        lhs: "S".to_string()
      }
    );
    assert_eq!(
      "S ->\n".parse::<Grammar>().unwrap_err(),
      MalformedGrammarError::EmptyRightHandSide {
        lhs: "S".to_string()
      }
    );
  }
}
