/*
    This module is for storing and manipulating grammars
*/

pub mod first_follow;
pub mod transform;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;

pub const EPSILON: &str = "ε";
pub const END_MARKER: &str = "$";

// The base unit in a grammar rule
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// The symbols in a single alternative. Empty means ε.
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

// Renders a sequence of symbols separated by spaces, or `ε` when empty.
pub fn format_symbols(symbols: &[Symbol]) -> String {
    if symbols.is_empty() {
        EPSILON.to_string()
    } else {
        symbols.iter().join(" ")
    }
}

// A single `A → α` production.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: Alternative,
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.lhs, format_symbols(&self.rhs))
    }
}

// Entries of FIRST and FOLLOW sets and the columns of a parsing table.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Lookahead {
    Terminal(String),
    Epsilon,
    EndMarker,
}

impl Display for Lookahead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookahead::Terminal(name) => write!(f, "{}", name),
            Lookahead::Epsilon => write!(f, "{}", EPSILON),
            Lookahead::EndMarker => write!(f, "{}", END_MARKER),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Grammar {
    pub start_symbol: String,
    // Nonterminals in the order they were first defined
    pub nonterminals: Vec<String>,
    pub rules: HashMap<String, Rewrite>,
}

impl Grammar {
    // Builds a grammar from rules in definition order. Repeated
    // nonterminals have their alternatives appended.
    pub fn from_rules(rules: impl IntoIterator<Item = (String, Rewrite)>) -> Grammar {
        let mut nonterminals = Vec::new();
        let mut ruleset: HashMap<String, Rewrite> = HashMap::new();

        for (symbol, rewrite) in rules {
            if !ruleset.contains_key(&symbol) {
                nonterminals.push(symbol.clone());
            }
            ruleset.entry(symbol).or_default().extend(rewrite);
        }

        Grammar {
            start_symbol: nonterminals.first().cloned().unwrap_or_default(),
            nonterminals,
            rules: ruleset,
        }
    }

    pub fn alternatives(&self, nonterminal: &str) -> &[Alternative] {
        self.rules.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    // Every production, grouped by nonterminal in definition order.
    pub fn productions(&self) -> impl Iterator<Item = Production> + '_ {
        self.nonterminals.iter().flat_map(move |lhs| {
            self.alternatives(lhs).iter().map(move |rhs| Production {
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            })
        })
    }

    pub fn production_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn terminals(&self) -> BTreeSet<String> {
        self.rules
            .values()
            .flatten()
            .flatten()
            .filter(|symbol| symbol.is_terminal())
            .map(|symbol| symbol.name().to_string())
            .collect()
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for nonterminal in &self.nonterminals {
            let rewrite = self.alternatives(nonterminal).iter().map(|alternative| format_symbols(alternative)).join(" | ");
            writeln!(f, "{} -> {}", nonterminal, rewrite)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;

    #[test]
    fn terminals_exclude_nonterminals() {
        let grammar = parse_grammar("E -> T E'\nE' -> + T E' | e\nT -> id").unwrap();

        assert_eq!(grammar.start_symbol, "E");
        assert_eq!(grammar.nonterminals, vec!["E", "E'", "T"]);
        assert_eq!(grammar.terminals(), BTreeSet::from(["+".to_string(), "id".to_string()]));
        assert_eq!(grammar.production_count(), 4);
    }

    #[test]
    fn productions_in_definition_order() {
        let grammar = parse_grammar("S -> a S | b\nS -> c").unwrap();
        let rendered = grammar.productions().map(|p| p.to_string()).collect::<Vec<_>>();

        assert_eq!(rendered, vec!["S → a S", "S → b", "S → c"]);
    }

    #[test]
    fn display_round_trips_through_parser() {
        let grammar = parse_grammar("E -> E + T | T\nT -> ( E ) | id | e").unwrap();
        let reparsed = parse_grammar(&grammar.to_string()).unwrap();

        assert_eq!(reparsed, grammar);
        assert_eq!(grammar.to_string(), "E -> E + T | T\nT -> ( E ) | id | ε\n");
    }
}
