use std::fmt::Display;

use itertools::Itertools;

use crate::config::Limits;
use crate::error_handling::ErrorType;
use crate::grammar::{Lookahead, Symbol, END_MARKER};
use crate::trace::{Action, Step};
use super::table::ParseTable;

#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorType {
    // The table has no production for the nonterminal on this lookahead
    NoRule { nonterminal: String, lookahead: String },
    // The terminal on top of the stack is not the next input token
    Mismatch { expected: String, found: String },
    StepLimit(usize),
}

impl ErrorType for ParseErrorType {}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorType::NoRule { nonterminal, lookahead } => {
                write!(f, "No rule for `{}` on lookahead `{}`", nonterminal, lookahead)
            }
            ParseErrorType::Mismatch { expected, found } => write!(f, "Expected `{}` but found `{}`", expected, found),
            ParseErrorType::StepLimit(limit) => write!(f, "Gave up after {} steps", limit),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
enum StackEntry {
    Bottom,
    Symbol(Symbol),
}

impl Display for StackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackEntry::Bottom => write!(f, "{}", END_MARKER),
            StackEntry::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Simulation {
    pub steps: Vec<Step>,
    pub outcome: Result<(), ParseErrorType>,
}

impl Simulation {
    pub fn accepted(&self) -> bool {
        self.outcome.is_ok()
    }
}

// Runs the predictive parser. The stack starts as `$ S` and the input
// gets a trailing `$`; the trace keeps every configuration including the
// one that failed.
pub fn simulate(table: &ParseTable, start_symbol: &str, tokens: &[String], limits: &Limits) -> Simulation {
    let mut stack = vec![StackEntry::Bottom, StackEntry::Symbol(Symbol::Nonterminal(start_symbol.to_string()))];
    let mut position = 0;
    let mut steps = Vec::new();

    for _ in 0..limits.max_steps {
        let lookahead = tokens
            .get(position)
            .map(|token| Lookahead::Terminal(token.clone()))
            .unwrap_or(Lookahead::EndMarker);
        let stack_text = stack.iter().join(" ");
        let input_text = tokens[position..].iter().map(String::as_str).chain(std::iter::once(END_MARKER)).join(" ");
        let mut record = |action: Action| steps.push(Step {
            stack: stack_text.clone(),
            input: input_text.clone(),
            action,
        });

        let error = match stack.last() {
            None | Some(StackEntry::Bottom) if lookahead == Lookahead::EndMarker => {
                record(Action::Accept);
                return Simulation { steps, outcome: Ok(()) };
            }
            None | Some(StackEntry::Bottom) => ParseErrorType::Mismatch {
                expected: END_MARKER.to_string(),
                found: lookahead.to_string(),
            },
            Some(StackEntry::Symbol(Symbol::Terminal(terminal))) => {
                if lookahead == Lookahead::Terminal(terminal.clone()) {
                    record(Action::Match(terminal.clone()));
                    stack.pop();
                    position += 1;
                    continue;
                }
                ParseErrorType::Mismatch {
                    expected: terminal.clone(),
                    found: lookahead.to_string(),
                }
            }
            Some(StackEntry::Symbol(Symbol::Nonterminal(nonterminal))) => match table.entry(nonterminal, &lookahead) {
                Some(production) => {
                    record(Action::Predict(production.clone()));
                    stack.pop();
                    // Leftmost symbol ends up on top
                    stack.extend(production.rhs.iter().rev().cloned().map(StackEntry::Symbol));
                    continue;
                }
                None => ParseErrorType::NoRule {
                    nonterminal: nonterminal.clone(),
                    lookahead: lookahead.to_string(),
                },
            },
        };

        record(Action::Error(error.to_string()));
        return Simulation { steps, outcome: Err(error) };
    }

    let error = ParseErrorType::StepLimit(limits.max_steps);
    steps.push(Step {
        stack: stack.iter().join(" "),
        input: tokens[position..].iter().map(String::as_str).chain(std::iter::once(END_MARKER)).join(" "),
        action: Action::Error(error.to_string()),
    });
    Simulation { steps, outcome: Err(error) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::first_follow;
    use crate::parser::parse_grammar;
    use crate::trace::render_trace;

    const EXPRESSION: &str = "E -> T E'\nE' -> + T E' | e\nT -> F T'\nT' -> * F T' | e\nF -> ( E ) | id";

    fn run(grammar_text: &str, input: &[&str], limits: &Limits) -> Simulation {
        let grammar = parse_grammar(grammar_text).unwrap();
        let table = ParseTable::build(&grammar, &first_follow::compute(&grammar));
        let tokens = input.iter().map(|token| token.to_string()).collect_vec();
        simulate(&table, &grammar.start_symbol, &tokens, limits)
    }

    #[test]
    fn accepts_classic_expression() {
        let simulation = run(EXPRESSION, &["id", "+", "id", "*", "id"], &Limits::default());

        assert!(simulation.accepted());
        assert_eq!(simulation.steps.first().map(|step| step.stack.as_str()), Some("$ E"));
        assert_eq!(simulation.steps.first().map(|step| step.input.as_str()), Some("id + id * id $"));
        assert_eq!(simulation.steps.last().map(|step| step.action.clone()), Some(Action::Accept));
        assert_eq!(simulation.steps.iter().filter(|step| matches!(step.action, Action::Match(_))).count(), 5);
    }

    #[test]
    fn short_trace() {
        let simulation = run("S -> a S | b", &["a", "b"], &Limits::default());

        assert_eq!(
            render_trace(&simulation.steps),
            [
                "Stack | Input | Action",
                "------+-------+--------",
                "$ S   | a b $ | S → a S",
                "$ S a | a b $ | match a",
                "$ S   | b $   | S → b",
                "$ b   | b $   | match b",
                "$     | $     | accept",
            ]
            .map(|line| line.to_string() + "\n")
            .concat()
        );
    }

    #[test]
    fn missing_table_entry() {
        let simulation = run(EXPRESSION, &["id", "+", ")"], &Limits::default());

        assert_eq!(simulation.outcome, Err(ParseErrorType::NoRule {
            nonterminal: "T".to_string(),
            lookahead: ")".to_string()
        }));
        assert!(matches!(simulation.steps.last().map(|step| &step.action), Some(Action::Error(_))));
    }

    #[test]
    fn terminal_mismatch() {
        let simulation = run("S -> ( a )", &["(", "a", "a"], &Limits::default());

        assert_eq!(simulation.outcome, Err(ParseErrorType::Mismatch {
            expected: ")".to_string(),
            found: "a".to_string()
        }));
    }

    #[test]
    fn trailing_input() {
        let simulation = run("S -> a", &["a", "a"], &Limits::default());

        assert_eq!(simulation.outcome, Err(ParseErrorType::Mismatch {
            expected: "$".to_string(),
            found: "a".to_string()
        }));
    }

    #[test]
    fn left_recursion_hits_step_limit() {
        let limits = Limits { max_steps: 30, ..Limits::default() };
        let simulation = run("E -> E + id | id", &["id", "+", "id"], &limits);

        assert_eq!(simulation.outcome, Err(ParseErrorType::StepLimit(30)));
        assert_eq!(simulation.steps.len(), 31);
    }
}
