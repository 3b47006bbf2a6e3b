/*
    Fixpoint computation of FIRST and FOLLOW sets
*/

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;

use super::{Grammar, Lookahead, Symbol};

pub type LookaheadSet = BTreeSet<Lookahead>;

#[derive(Debug, PartialEq, Clone)]
pub struct FirstFollow {
    first: HashMap<String, LookaheadSet>,
    follow: HashMap<String, LookaheadSet>,
    order: Vec<String>,
    // How many passes over the productions each fixpoint needed
    pub first_passes: usize,
    pub follow_passes: usize,
}

// FIRST of a symbol sequence given the FIRST sets of the nonterminals.
// An empty sequence derives only ε.
fn sequence_first(first: &HashMap<String, LookaheadSet>, symbols: &[Symbol]) -> LookaheadSet {
    let mut result = LookaheadSet::new();

    for symbol in symbols {
        match symbol {
            Symbol::Terminal(name) => {
                result.insert(Lookahead::Terminal(name.clone()));
                return result;
            }
            Symbol::Nonterminal(name) => {
                let Some(set) = first.get(name) else {
                    return result;
                };
                result.extend(set.iter().filter(|l| **l != Lookahead::Epsilon).cloned());
                if !set.contains(&Lookahead::Epsilon) {
                    return result;
                }
            }
        }
    }

    result.insert(Lookahead::Epsilon);
    return result;
}

fn first_sets(grammar: &Grammar) -> (HashMap<String, LookaheadSet>, usize) {
    let mut first: HashMap<String, LookaheadSet> = grammar.nonterminals
        .iter()
        .map(|nonterminal| (nonterminal.clone(), LookaheadSet::new()))
        .collect();
    let mut passes = 0;

    loop {
        passes += 1;
        let mut changed = false;

        for production in grammar.productions() {
            let additions = sequence_first(&first, &production.rhs);
            let set = first.entry(production.lhs).or_default();
            let before = set.len();
            set.extend(additions);
            changed |= set.len() > before;
        }

        if !changed {
            return (first, passes);
        }
    }
}

fn follow_sets(grammar: &Grammar, first: &HashMap<String, LookaheadSet>) -> (HashMap<String, LookaheadSet>, usize) {
    let mut follow: HashMap<String, LookaheadSet> = grammar.nonterminals
        .iter()
        .map(|nonterminal| (nonterminal.clone(), LookaheadSet::new()))
        .collect();
    follow.entry(grammar.start_symbol.clone()).or_default().insert(Lookahead::EndMarker);
    let mut passes = 0;

    loop {
        passes += 1;
        let mut changed = false;

        for production in grammar.productions() {
            for (i, symbol) in production.rhs.iter().enumerate() {
                let Symbol::Nonterminal(name) = symbol else {
                    continue;
                };

                // A → αBβ: FIRST(β) without ε, plus FOLLOW(A) when β is nullable
                let rest = sequence_first(first, &production.rhs[i + 1..]);
                let mut additions: LookaheadSet = rest.iter().filter(|l| **l != Lookahead::Epsilon).cloned().collect();
                if rest.contains(&Lookahead::Epsilon) {
                    additions.extend(follow.get(&production.lhs).cloned().unwrap_or_default());
                }

                let set = follow.entry(name.clone()).or_default();
                let before = set.len();
                set.extend(additions);
                changed |= set.len() > before;
            }
        }

        if !changed {
            return (follow, passes);
        }
    }
}

pub fn compute(grammar: &Grammar) -> FirstFollow {
    let (first, first_passes) = first_sets(grammar);
    let (follow, follow_passes) = follow_sets(grammar, &first);

    FirstFollow {
        first,
        follow,
        order: grammar.nonterminals.clone(),
        first_passes,
        follow_passes,
    }
}

impl FirstFollow {
    pub fn first(&self, nonterminal: &str) -> Option<&LookaheadSet> {
        self.first.get(nonterminal)
    }

    pub fn follow(&self, nonterminal: &str) -> Option<&LookaheadSet> {
        self.follow.get(nonterminal)
    }

    // FIRST of an arbitrary symbol sequence, containing ε when the whole
    // sequence is nullable.
    pub fn first_of(&self, symbols: &[Symbol]) -> LookaheadSet {
        sequence_first(&self.first, symbols)
    }
}

fn format_set(set: Option<&LookaheadSet>) -> String {
    format!("{{ {} }}", set.into_iter().flatten().join(", "))
}

impl Display for FirstFollow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for nonterminal in &self.order {
            writeln!(f, "FIRST({}) = {}", nonterminal, format_set(self.first(nonterminal)))?;
        }
        for nonterminal in &self.order {
            writeln!(f, "FOLLOW({}) = {}", nonterminal, format_set(self.follow(nonterminal)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::parser::parse_grammar;

    const EXPRESSION: &str = "E -> T E'\nE' -> + T E' | e\nT -> F T'\nT' -> * F T' | e\nF -> ( E ) | id";

    fn set(items: &[&str]) -> LookaheadSet {
        items.iter().map(|item| match *item {
            "ε" => Lookahead::Epsilon,
            "$" => Lookahead::EndMarker,
            other => Lookahead::Terminal(other.to_string())
        }).collect()
    }

    #[test]
    fn expression_first_sets() {
        let sets = compute(&parse_grammar(EXPRESSION).unwrap());
        let nonterminals = vec!["E", "E'", "T", "T'", "F"];
        let answers = vec![
            set(&["(", "id"]),
            set(&["+", "ε"]),
            set(&["(", "id"]),
            set(&["*", "ε"]),
            set(&["(", "id"])
        ];

        for (nonterminal, answer) in zip(nonterminals, answers) {
            assert_eq!(sets.first(nonterminal), Some(&answer), "FIRST({})", nonterminal);
        }
    }

    #[test]
    fn expression_follow_sets() {
        let sets = compute(&parse_grammar(EXPRESSION).unwrap());
        let nonterminals = vec!["E", "E'", "T", "T'", "F"];
        let answers = vec![
            set(&[")", "$"]),
            set(&[")", "$"]),
            set(&["+", ")", "$"]),
            set(&["+", ")", "$"]),
            set(&["+", "*", ")", "$"])
        ];

        for (nonterminal, answer) in zip(nonterminals, answers) {
            assert_eq!(sets.follow(nonterminal), Some(&answer), "FOLLOW({})", nonterminal);
        }
    }

    #[test]
    fn nullable_chain() {
        let sets = compute(&parse_grammar("S -> A B c\nA -> a | e\nB -> b | e").unwrap());

        assert_eq!(sets.first("S"), Some(&set(&["a", "b", "c"])));
        assert_eq!(sets.follow("A"), Some(&set(&["b", "c"])));
        assert_eq!(sets.follow("B"), Some(&set(&["c"])));
        assert_eq!(sets.first_of(&[]), set(&["ε"]));
        assert_eq!(
            sets.first_of(&[Symbol::Nonterminal("A".to_string()), Symbol::Nonterminal("B".to_string())]),
            set(&["a", "b", "ε"])
        );
    }

    #[test]
    fn sets_never_contain_nonterminals_and_start_follows_end() {
        let grammars = vec![
            EXPRESSION,
            "S -> ( S ) S | e",
            "E -> E + E | E * E | ( E ) | id",
            "S -> A a | b\nA -> A c | S d | e",
            "S -> i c t S | i c t S e S | a"
        ];

        for text in grammars {
            let grammar = parse_grammar(text).unwrap();
            let sets = compute(&grammar);

            for nonterminal in &grammar.nonterminals {
                let first = sets.first(nonterminal).unwrap();
                let follow = sets.follow(nonterminal).unwrap();
                for entry in first.iter().chain(follow) {
                    if let Lookahead::Terminal(name) = entry {
                        assert!(!grammar.is_nonterminal(name), "{} leaked into a set", name);
                    }
                }
                assert!(!follow.contains(&Lookahead::Epsilon));
            }
            assert!(sets.follow(&grammar.start_symbol).unwrap().contains(&Lookahead::EndMarker));

            let bound = grammar.nonterminals.len() * grammar.production_count() + 1;
            assert!(sets.first_passes <= bound);
            assert!(sets.follow_passes <= bound);
        }
    }

    #[test]
    fn display_in_definition_order() {
        let sets = compute(&parse_grammar("S -> a B\nB -> b | e").unwrap());

        assert_eq!(
            sets.to_string(),
            "FIRST(S) = { a }\nFIRST(B) = { b, ε }\nFOLLOW(S) = { $ }\nFOLLOW(B) = { $ }\n"
        );
    }
}
