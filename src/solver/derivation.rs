use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::config::Limits;
use crate::grammar::{format_symbols, Grammar, Symbol};
use super::{Result, SearchErrorType};

type Form = Vec<Symbol>;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Strategy {
    Leftmost,
    Rightmost,
}

// The sentential forms from the start symbol to the target.
#[derive(Debug, PartialEq, Clone)]
pub struct Derivation {
    pub forms: Vec<Form>,
}

impl Derivation {
    pub fn steps(&self) -> usize {
        self.forms.len().saturating_sub(1)
    }
}

impl Display for Derivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.forms.iter().map(|form| format_symbols(form)).join(" ⇒ "))
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Verdict {
    // This many distinct shortest leftmost derivations
    Ambiguous(usize),
    Unambiguous,
}

#[derive(Debug, PartialEq, Clone)]
pub struct AmbiguityReport {
    pub verdict: Verdict,
    pub derivations: Vec<Derivation>,
}

fn expanded_index(form: &Form, strategy: Strategy) -> Option<usize> {
    match strategy {
        Strategy::Leftmost => form.iter().position(|symbol| !symbol.is_terminal()),
        Strategy::Rightmost => form.iter().rposition(|symbol| !symbol.is_terminal()),
    }
}

// Terminals never change once derived, so a form can only lead to the
// target if its terminals fit in it and the fixed ends already agree.
fn can_reach(form: &Form, target: &[String]) -> bool {
    let terminals = form.iter().filter(|symbol| symbol.is_terminal()).count();
    if terminals > target.len() {
        return false;
    }

    let prefix = form.iter().take_while(|symbol| symbol.is_terminal());
    let suffix = form.iter().rev().take_while(|symbol| symbol.is_terminal());

    if form.iter().all(Symbol::is_terminal) {
        return form.len() == target.len() && prefix.zip(target).all(|(symbol, token)| symbol.name() == token);
    }

    prefix.zip(target).all(|(symbol, token)| symbol.name() == token)
        && suffix.zip(target.iter().rev()).all(|(symbol, token)| symbol.name() == token)
}

fn collect_paths(form: &Form, start: &Form, parents: &HashMap<Form, Vec<Form>>) -> Vec<Vec<Form>> {
    if form == start {
        return vec![vec![start.clone()]];
    }

    parents
        .get(form)
        .into_iter()
        .flatten()
        .flat_map(|parent| collect_paths(parent, start, parents))
        .map(|mut path| {
            path.push(form.clone());
            path
        })
        .collect()
}

// Finds every shortest derivation of `target` that always expands the
// leftmost (or rightmost) nonterminal.
pub fn shortest_derivations(grammar: &Grammar, target: &[String], strategy: Strategy, limits: &Limits) -> Result<Vec<Derivation>> {
    let start: Form = vec![Symbol::Nonterminal(grammar.start_symbol.clone())];
    let goal: Form = target.iter().map(|token| Symbol::Terminal(token.clone())).collect();

    let mut depth_of: HashMap<Form, usize> = HashMap::from([(start.clone(), 0)]);
    let mut parents: HashMap<Form, Vec<Form>> = HashMap::new();
    let mut level = vec![start.clone()];

    for depth in 1..=limits.max_depth {
        let mut next = Vec::new();

        for form in &level {
            let Some(index) = expanded_index(form, strategy) else {
                continue;
            };

            for alternative in grammar.alternatives(form[index].name()) {
                let derived: Form = form[..index]
                    .iter()
                    .chain(alternative)
                    .chain(&form[index + 1..])
                    .cloned()
                    .collect();
                if !can_reach(&derived, target) {
                    continue;
                }

                match depth_of.get(&derived) {
                    // Reached sooner along another path
                    Some(&seen) if seen < depth => continue,
                    Some(_) => {}
                    None => {
                        depth_of.insert(derived.clone(), depth);
                        next.push(derived.clone());
                    }
                }
                let known = parents.entry(derived).or_default();
                if !known.contains(form) {
                    known.push(form.clone());
                }
            }
        }

        if depth_of.get(&goal) == Some(&depth) {
            return Ok(collect_paths(&goal, &start, &parents)
                .into_iter()
                .map(|forms| Derivation { forms })
                .collect());
        }
        if next.is_empty() {
            return Err(SearchErrorType::Unreachable);
        }
        if depth_of.len() > limits.max_states {
            return Err(SearchErrorType::BoundReached(depth_of.len()));
        }
        level = next;
    }

    Err(SearchErrorType::BoundReached(depth_of.len()))
}

// Counts the shortest leftmost derivations of `target`. Two or more mean
// the grammar is ambiguous; one only means no ambiguity shows up at the
// shortest length.
pub fn check_ambiguity(grammar: &Grammar, target: &[String], limits: &Limits) -> Result<AmbiguityReport> {
    let derivations = shortest_derivations(grammar, target, Strategy::Leftmost, limits)?;
    let verdict = match derivations.len() {
        0 | 1 => Verdict::Unambiguous,
        n => Verdict::Ambiguous(n),
    };

    Ok(AmbiguityReport { verdict, derivations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn classic_ambiguous_sum() {
        let grammar = parse_grammar("E -> E + E | id").unwrap();
        let report = check_ambiguity(&grammar, &tokens(&["id", "+", "id", "+", "id"]), &Limits::default()).unwrap();

        assert_eq!(report.verdict, Verdict::Ambiguous(2));
        assert!(report.derivations.iter().all(|derivation| derivation.forms.len() == 6));
        assert!(report.derivations.iter().map(|derivation| derivation.to_string()).contains(
            &"E ⇒ E + E ⇒ id + E ⇒ id + E + E ⇒ id + id + E ⇒ id + id + id".to_string()
        ));
    }

    #[test]
    fn unambiguous_expression() {
        let grammar = parse_grammar("E -> E + T | T\nT -> id").unwrap();
        let report = check_ambiguity(&grammar, &tokens(&["id", "+", "id"]), &Limits::default()).unwrap();

        assert_eq!(report.verdict, Verdict::Unambiguous);
        assert_eq!(
            report.derivations[0].to_string(),
            "E ⇒ E + T ⇒ T + T ⇒ id + T ⇒ id + id"
        );
    }

    #[test]
    fn balanced_parentheses_both_ways() {
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();
        let target = tokens(&["(", ")", "(", ")"]);

        let leftmost = shortest_derivations(&grammar, &target, Strategy::Leftmost, &Limits::default()).unwrap();
        assert_eq!(leftmost.len(), 1);
        assert_eq!(leftmost[0].to_string(), "S ⇒ ( S ) S ⇒ ( ) S ⇒ ( ) ( S ) S ⇒ ( ) ( ) S ⇒ ( ) ( )");

        let rightmost = shortest_derivations(&grammar, &target, Strategy::Rightmost, &Limits::default()).unwrap();
        assert_eq!(rightmost.len(), 1);
        assert_eq!(rightmost[0].to_string(), "S ⇒ ( S ) S ⇒ ( S ) ( S ) S ⇒ ( S ) ( S ) ⇒ ( S ) ( ) ⇒ ( ) ( )");
    }

    #[test]
    fn empty_target() {
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();
        let derivations = shortest_derivations(&grammar, &[], Strategy::Leftmost, &Limits::default()).unwrap();

        assert_eq!(derivations.iter().map(Derivation::to_string).collect_vec(), vec!["S ⇒ ε"]);
    }

    #[test]
    fn underivable_target() {
        let grammar = parse_grammar("E -> E + T | T\nT -> id").unwrap();

        assert_eq!(
            shortest_derivations(&grammar, &tokens(&["id", "+"]), Strategy::Leftmost, &Limits::default()),
            Err(SearchErrorType::Unreachable)
        );
    }

    #[test]
    fn depth_bound() {
        let grammar = parse_grammar("S -> a S | b").unwrap();
        let limits = Limits { max_depth: 3, ..Limits::default() };

        assert!(matches!(
            shortest_derivations(&grammar, &tokens(&["a", "a", "a", "a", "b"]), Strategy::Leftmost, &limits),
            Err(SearchErrorType::BoundReached(_))
        ));
        assert!(shortest_derivations(&grammar, &tokens(&["a", "a", "b"]), Strategy::Leftmost, &limits).is_ok());
    }

    #[test]
    fn state_bound() {
        // Forms keep growing without adding terminals, so the frontier never empties
        let grammar = parse_grammar("S -> S S | S c S | e").unwrap();
        let limits = Limits { max_states: 50, ..Limits::default() };

        assert!(matches!(
            shortest_derivations(&grammar, &tokens(&["b"]), Strategy::Leftmost, &limits),
            Err(SearchErrorType::BoundReached(explored)) if explored > 50
        ));
    }
}
