use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use itertools::Itertools;

use crate::config::Limits;
use crate::grammar::{format_symbols, Grammar, Production, Symbol, END_MARKER};
use crate::render;
use crate::trace::{Action, Step};
use super::{Result, SearchErrorType};

// One parser configuration, linked to the configuration it came from
struct Node {
    stack: Vec<Symbol>,
    position: usize,
    parent: Option<(usize, Action)>,
}

fn stack_text(stack: &[Symbol]) -> String {
    std::iter::once(END_MARKER.to_string()).chain(stack.iter().map(Symbol::to_string)).join(" ")
}

fn input_text(tokens: &[String], position: usize) -> String {
    tokens[position..].iter().map(String::as_str).chain(std::iter::once(END_MARKER)).join(" ")
}

fn successors(node: &Node, grammar: &Grammar, tokens: &[String]) -> Vec<(Vec<Symbol>, usize, Action)> {
    let mut result = Vec::new();

    if let Some(token) = tokens.get(node.position) {
        let mut stack = node.stack.clone();
        stack.push(Symbol::Terminal(token.clone()));
        result.push((stack, node.position + 1, Action::Shift(token.clone())));
    }

    for production in grammar.productions() {
        // An ε-production reduces an empty handle
        if !node.stack.ends_with(&production.rhs) {
            continue;
        }
        let mut stack = node.stack[..node.stack.len() - production.rhs.len()].to_vec();
        stack.push(Symbol::Nonterminal(production.lhs.clone()));
        result.push((stack, node.position, Action::Reduce(production)));
    }

    result
}

fn trace_to(nodes: &[Node], last: usize, tokens: &[String]) -> Vec<Step> {
    let mut steps = vec![Step {
        stack: stack_text(&nodes[last].stack),
        input: input_text(tokens, nodes[last].position),
        action: Action::Accept,
    }];

    let mut current = last;
    while let Some((parent, action)) = &nodes[current].parent {
        steps.push(Step {
            stack: stack_text(&nodes[*parent].stack),
            input: input_text(tokens, nodes[*parent].position),
            action: action.clone(),
        });
        current = *parent;
    }

    steps.reverse();
    steps
}

// Searches breadth-first for a sequence of shifts and reductions that
// leaves only the start symbol on the stack with all input consumed.
// Shifts are tried before reductions, and reductions in grammar order.
pub fn shift_reduce(grammar: &Grammar, tokens: &[String], limits: &Limits) -> Result<Vec<Step>> {
    let accepted = [Symbol::Nonterminal(grammar.start_symbol.clone())];

    let mut nodes = vec![Node { stack: Vec::new(), position: 0, parent: None }];
    let mut visited: HashSet<(Vec<Symbol>, usize)> = HashSet::from([(Vec::new(), 0)]);
    let mut queue = VecDeque::from([0]);
    let mut explored = 0;

    while let Some(current) = queue.pop_front() {
        if explored >= limits.max_states {
            return Err(SearchErrorType::BoundReached(explored));
        }
        explored += 1;

        let node = &nodes[current];
        if node.stack == accepted && node.position == tokens.len() {
            return Ok(trace_to(&nodes, current, tokens));
        }

        for (stack, position, action) in successors(node, grammar, tokens) {
            if visited.insert((stack.clone(), position)) {
                nodes.push(Node { stack, position, parent: Some((current, action)) });
                queue.push_back(nodes.len() - 1);
            }
        }
    }

    Err(SearchErrorType::Unreachable)
}

// One reduction of a whole sentential form: the handle `production.rhs`
// found at `position` in `form` is replaced by `production.lhs`.
#[derive(Debug, PartialEq, Clone)]
pub struct Reduction {
    pub form: Vec<Symbol>,
    pub position: usize,
    pub production: Production,
}

impl Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  [{} at {}]", format_symbols(&self.form), self.production, self.position)
    }
}

// Searches breadth-first for the fewest reductions taking `tokens` to the
// start symbol. Any occurrence of a right-hand side may be reduced, longer
// right-hand sides first. An ε-production inserts its left-hand side at any
// position, so the search stays complete and only the state bound stops it.
pub fn reduce_to_start(grammar: &Grammar, tokens: &[String], limits: &Limits) -> Result<Vec<Reduction>> {
    let accepted = vec![Symbol::Nonterminal(grammar.start_symbol.clone())];
    let productions = grammar
        .productions()
        .sorted_by_key(|production| std::cmp::Reverse(production.rhs.len()))
        .collect_vec();

    let start: Vec<Symbol> = tokens.iter().map(|token| Symbol::Terminal(token.clone())).collect();
    let mut forms = vec![(start.clone(), None::<(usize, Reduction)>)];
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([0]);
    let mut explored = 0;

    while let Some(current) = queue.pop_front() {
        if explored >= limits.max_states {
            return Err(SearchErrorType::BoundReached(explored));
        }
        explored += 1;

        if forms[current].0 == accepted {
            let mut reductions = Vec::new();
            let mut at = current;
            while let Some((parent, reduction)) = &forms[at].1 {
                reductions.push(reduction.clone());
                at = *parent;
            }
            reductions.reverse();
            return Ok(reductions);
        }

        let form = forms[current].0.clone();
        for production in &productions {
            let width = production.rhs.len();
            if width > form.len() {
                continue;
            }
            for position in (0..=form.len() - width).filter(|&i| form[i..i + width] == production.rhs[..]) {
                let reduced: Vec<Symbol> = form[..position]
                    .iter()
                    .cloned()
                    .chain(std::iter::once(Symbol::Nonterminal(production.lhs.clone())))
                    .chain(form[position + width..].iter().cloned())
                    .collect();
                if visited.insert(reduced.clone()) {
                    let reduction = Reduction { form: form.clone(), position, production: production.clone() };
                    forms.push((reduced, Some((current, reduction))));
                    queue.push_back(forms.len() - 1);
                }
            }
        }
    }

    Err(SearchErrorType::Unreachable)
}

pub fn render_reductions(reductions: &[Reduction]) -> String {
    let header = ["String", "Handle", "Rule"].map(String::from);
    let rows = reductions
        .iter()
        .map(|reduction| vec![
            format_symbols(&reduction.form),
            format_symbols(&reduction.production.rhs),
            reduction.production.to_string(),
        ])
        .collect_vec();

    render::table(&header, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;
    use crate::trace::render_trace;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn balanced_parentheses_with_epsilon_reductions() {
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();
        let steps = shift_reduce(&grammar, &tokens(&["(", ")", "(", ")"]), &Limits::default()).unwrap();

        assert_eq!(steps.len(), 10);
        assert_eq!(steps.first().map(|step| step.stack.as_str()), Some("$"));
        assert_eq!(steps.last().map(|step| (step.stack.as_str(), step.input.as_str())), Some(("$ S", "$")));
        assert_eq!(steps.last().map(|step| step.action.clone()), Some(Action::Accept));
    }

    #[test]
    fn ambiguous_expression_is_accepted() {
        let grammar = parse_grammar("E -> E + E | E * E | ( E ) | id").unwrap();
        let steps = shift_reduce(&grammar, &tokens(&["id", "+", "id", "*", "id"]), &Limits::default()).unwrap();

        assert_eq!(steps.iter().filter(|step| matches!(step.action, Action::Shift(_))).count(), 5);
        assert_eq!(steps.iter().filter(|step| matches!(step.action, Action::Reduce(_))).count(), 5);
    }

    #[test]
    fn short_trace() {
        let grammar = parse_grammar("S -> a b").unwrap();
        let steps = shift_reduce(&grammar, &tokens(&["a", "b"]), &Limits::default()).unwrap();

        assert_eq!(
            render_trace(&steps),
            [
                "Stack | Input | Action",
                "------+-------+---------------",
                "$     | a b $ | shift a",
                "$ a   | b $   | shift b",
                "$ a b | $     | reduce S → a b",
                "$ S   | $     | accept",
            ]
            .map(|line| line.to_string() + "\n")
            .concat()
        );
    }

    #[test]
    fn incomplete_input_is_unreachable() {
        let grammar = parse_grammar("E -> E + T | T\nT -> id").unwrap();

        assert_eq!(shift_reduce(&grammar, &tokens(&["id", "+"]), &Limits::default()), Err(SearchErrorType::Unreachable));
        assert_eq!(reduce_to_start(&grammar, &tokens(&["id", "+"]), &Limits::default()), Err(SearchErrorType::Unreachable));
    }

    #[test]
    fn explored_state_bound() {
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();
        let limits = Limits { max_states: 20, ..Limits::default() };

        assert_eq!(
            shift_reduce(&grammar, &tokens(&["(", ")", "(", ")"]), &limits),
            Err(SearchErrorType::BoundReached(20))
        );
    }

    #[test]
    fn whole_string_reduction() {
        let grammar = parse_grammar("E -> E + T | T\nT -> id").unwrap();
        let reductions = reduce_to_start(&grammar, &tokens(&["id", "+", "id"]), &Limits::default()).unwrap();

        assert_eq!(reductions.len(), 4);
        assert_eq!(reductions.first().map(|r| format_symbols(&r.form)), Some("id + id".to_string()));
        assert_eq!(reductions.last().map(|r| r.production.to_string()), Some("E → E + T".to_string()));
        assert_eq!(reductions.last().map(|r| r.position), Some(0));
    }

    #[test]
    fn epsilon_reductions_insert_the_left_hand_side() {
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();
        let reductions = reduce_to_start(&grammar, &tokens(&["(", ")", "(", ")"]), &Limits::default()).unwrap();

        let rules = reductions.iter().map(|r| r.production.to_string()).collect_vec();
        assert_eq!(rules, vec!["S → ε", "S → ε", "S → ε", "S → ( S ) S", "S → ( S ) S"]);
        assert_eq!(reductions.iter().map(|r| r.position).collect_vec(), vec![1, 4, 6, 3, 0]);
        assert_eq!(reductions.last().map(|r| format_symbols(&r.form)), Some("( S ) S".to_string()));
    }

    #[test]
    fn empty_target_with_nullable_start() {
        let grammar = parse_grammar("S -> a S | e").unwrap();
        let reductions = reduce_to_start(&grammar, &[], &Limits::default()).unwrap();

        assert_eq!(reductions.len(), 1);
        assert_eq!(reductions[0].position, 0);
        assert_eq!(reductions[0].production.to_string(), "S → ε");
    }

    #[test]
    fn epsilon_grammar_stops_at_the_bound() {
        // ε-insertions never run out, so an impossible string only hits the bound
        let grammar = parse_grammar("S -> ( S ) S | e").unwrap();

        assert_eq!(
            reduce_to_start(&grammar, &tokens(&[")", "("]), &Limits::default()),
            Err(SearchErrorType::BoundReached(2000))
        );
    }

    #[test]
    fn reduction_table() {
        let grammar = parse_grammar("S -> a b").unwrap();
        let reductions = reduce_to_start(&grammar, &tokens(&["a", "b"]), &Limits::default()).unwrap();

        assert_eq!(
            render_reductions(&reductions),
            "String | Handle | Rule\n\
             -------+--------+--------\n\
             a b    | a b    | S → a b\n"
        );
    }
}
