/*
    This module builds an NFA from a regular expression with Thompson's
    construction
*/

use std::fmt::Display;

use crate::error_handling::ErrorType;
use super::{Label, Nfa, StateId};

#[derive(Debug, PartialEq, Clone)]
pub enum RegexErrorType {
    // Nothing left after removing whitespace
    Empty,
    // A `)` without a matching `(` or the other way around
    UnbalancedParenthesis,
    // `()` with nothing inside
    EmptyGroup,
    // An operator without enough operands
    DanglingOperator(char),
    UnexpectedCharacter(char),
    // Operands left over with no operator joining them
    MissingOperator,
}

impl ErrorType for RegexErrorType {}

impl Display for RegexErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegexErrorType::Empty => write!(f, "The regular expression is empty"),
            RegexErrorType::UnbalancedParenthesis => write!(f, "Unbalanced parenthesis"),
            RegexErrorType::EmptyGroup => write!(f, "Empty group `()`"),
            RegexErrorType::DanglingOperator(op) => write!(f, "Operator `{}` is missing an operand", op),
            RegexErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            RegexErrorType::MissingOperator => write!(f, "Operands are not joined by an operator"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegexErrorType>;

const OPERATORS: [char; 6] = ['(', ')', '|', '.', '*', '+'];

fn is_literal(c: char) -> bool {
    c.is_alphanumeric()
}

fn precedence(op: char) -> u8 {
    match op {
        '*' => 3,
        '.' => 2,
        '|' => 1,
        _ => 0,
    }
}

// Strips whitespace, reads `+` as `|` and inserts an explicit `.`
// wherever two operands are concatenated.
pub fn preprocess(regex: &str) -> Result<String> {
    let chars: Vec<char> = regex
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '+' { '|' } else { c })
        .collect();

    if chars.is_empty() {
        return Err(RegexErrorType::Empty);
    }
    if let Some(c) = chars.iter().find(|c| !is_literal(**c) && !OPERATORS.contains(c)) {
        return Err(RegexErrorType::UnexpectedCharacter(*c));
    }

    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        result.push(c);
        let Some(&next) = chars.get(i + 1) else {
            continue;
        };

        if c == '(' && next == ')' {
            return Err(RegexErrorType::EmptyGroup);
        }
        if (is_literal(c) || c == ')' || c == '*') && (is_literal(next) || next == '(') {
            result.push('.');
        }
    }

    Ok(result)
}

// Converts a preprocessed expression to postfix with the shunting yard
// algorithm.
pub fn to_postfix(infix: &str) -> Result<String> {
    let mut output = String::new();
    let mut operators: Vec<char> = Vec::new();

    for c in infix.chars() {
        match c {
            '(' => operators.push(c),
            ')' => loop {
                match operators.pop() {
                    Some('(') => break,
                    Some(op) => output.push(op),
                    None => return Err(RegexErrorType::UnbalancedParenthesis),
                }
            },
            '*' | '.' | '|' => {
                while let Some(&top) = operators.last() {
                    if top == '(' || precedence(top) < precedence(c) {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(c);
            }
            _ if is_literal(c) => output.push(c),
            _ => return Err(RegexErrorType::UnexpectedCharacter(c)),
        }
    }

    while let Some(op) = operators.pop() {
        if op == '(' {
            return Err(RegexErrorType::UnbalancedParenthesis);
        }
        output.push(op);
    }

    Ok(output)
}

// A partial automaton with one entry and one exit
#[derive(Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

// States are named by creation order, starting from 1
fn new_state(nfa: &mut Nfa) -> StateId {
    let name = (nfa.state_count() + 1).to_string();
    nfa.add_state(name)
}

fn pop_operand(stack: &mut Vec<Fragment>, op: char) -> Result<Fragment> {
    stack.pop().ok_or(RegexErrorType::DanglingOperator(op))
}

// Builds an NFA from a postfix expression.
pub fn thompson(postfix: &str) -> Result<Nfa> {
    let mut nfa = Nfa::new();
    let mut stack: Vec<Fragment> = Vec::new();

    for c in postfix.chars() {
        match c {
            '.' => {
                let right = pop_operand(&mut stack, c)?;
                let left = pop_operand(&mut stack, c)?;
                nfa.add_transition(left.end, Label::Epsilon, right.start);
                stack.push(Fragment { start: left.start, end: right.end });
            }
            '|' => {
                let right = pop_operand(&mut stack, c)?;
                let left = pop_operand(&mut stack, c)?;
                let start = new_state(&mut nfa);
                let end = new_state(&mut nfa);
                nfa.add_transition(start, Label::Epsilon, left.start);
                nfa.add_transition(start, Label::Epsilon, right.start);
                nfa.add_transition(left.end, Label::Epsilon, end);
                nfa.add_transition(right.end, Label::Epsilon, end);
                stack.push(Fragment { start, end });
            }
            '*' => {
                let inner = pop_operand(&mut stack, c)?;
                let start = new_state(&mut nfa);
                let end = new_state(&mut nfa);
                nfa.add_transition(start, Label::Epsilon, inner.start);
                nfa.add_transition(start, Label::Epsilon, end);
                nfa.add_transition(inner.end, Label::Epsilon, inner.start);
                nfa.add_transition(inner.end, Label::Epsilon, end);
                stack.push(Fragment { start, end });
            }
            _ if is_literal(c) => {
                let start = new_state(&mut nfa);
                let end = new_state(&mut nfa);
                nfa.add_transition(start, Label::Symbol(c.to_string()), end);
                stack.push(Fragment { start, end });
            }
            _ => return Err(RegexErrorType::UnexpectedCharacter(c)),
        }
    }

    let whole = match stack.as_slice() {
        [whole] => *whole,
        [] => return Err(RegexErrorType::Empty),
        _ => return Err(RegexErrorType::MissingOperator),
    };
    nfa.set_start(whole.start);
    nfa.mark_accept(whole.end);

    Ok(nfa)
}

// Preprocesses, converts to postfix and builds the NFA in one go.
pub fn regex_to_nfa(regex: &str) -> Result<Nfa> {
    thompson(&to_postfix(&preprocess(regex)?)?)
}
