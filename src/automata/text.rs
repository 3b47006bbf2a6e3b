/*
    This module reads an NFA from a plain text description:

        start q0
        accept q2
        q0 a q1
        q1 e q2

    where `e`, `ε`, `l` and `λ` label an ε-transition
*/

use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::PathBuf;

use itertools::Itertools;

use crate::error_handling::*;
use super::{Label, Nfa};

const EPSILON_LABELS: [&str; 4] = ["e", "ε", "l", "λ"];

#[derive(Debug)]
pub enum NfaErrorType {
    // A line that is neither `start`, `accept` nor a transition
    MalformedLine,
    MissingStart,
    DuplicateStart,
    FileError(std::io::Error),
}

impl ErrorType for NfaErrorType {}

impl PartialEq for NfaErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NfaErrorType::FileError(a), NfaErrorType::FileError(b)) => a.kind() == b.kind(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for NfaErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NfaErrorType::MalformedLine => write!(f, "Expected `start <state>`, `accept <state>...` or `<from> <symbol> <to>`"),
            NfaErrorType::MissingStart => write!(f, "No `start` line"),
            NfaErrorType::DuplicateStart => write!(f, "More than one `start` line"),
            NfaErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type NfaError = Error<NfaErrorType>;
pub type NfaErrors = Errors<NfaErrorType>;
pub type FileResult<T> = std::result::Result<T, NfaErrors>;

#[derive(Debug, PartialEq)]
enum Line {
    Start(String),
    Accept(Vec<String>),
    Transition(String, Label, String),
}

fn parse_line(line: &str) -> Result<Line, NfaErrorType> {
    let words = line.split_whitespace().collect_vec();

    match words.as_slice() {
        ["start", state] => Ok(Line::Start(state.to_string())),
        ["accept", states @ ..] if !states.is_empty() => Ok(Line::Accept(states.iter().map(|s| s.to_string()).collect())),
        [from, symbol, to] => {
            let label = if EPSILON_LABELS.contains(symbol) {
                Label::Epsilon
            } else {
                Label::Symbol(symbol.to_string())
            };
            Ok(Line::Transition(from.to_string(), label, to.to_string()))
        }
        _ => Err(NfaErrorType::MalformedLine),
    }
}

// Drops `#` comments and surrounding whitespace
fn content(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

fn nfa_from_lines(text: &str, path: &PathBuf) -> FileResult<Nfa> {
    let located = |line: usize, error: NfaErrorType| NfaError {
        location: Location { file: path.clone(), line },
        error,
    };

    let (parsed, errors): (Vec<_>, Vec<_>) = text
        .lines()
        .enumerate()
        .map(|(num, line)| (num + 1, content(line)))
        .filter(|(_, line)| !line.is_empty())
        .map(|(num, line)| parse_line(line).map(|parsed| (num, parsed)).map_err(|error| located(num, error)))
        .partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    let starts = parsed.iter().filter_map(|(num, line)| match line {
        Line::Start(state) => Some((*num, state)),
        _ => None,
    }).collect_vec();
    let start = match starts.as_slice() {
        [] => return Err(vec![located(0, NfaErrorType::MissingStart)]),
        [(_, state)] => (*state).clone(),
        [_, rest @ ..] => return Err(rest.iter().map(|(num, _)| located(*num, NfaErrorType::DuplicateStart)).collect()),
    };

    // States are numbered in name order so that subset names are canonical
    let names: BTreeSet<&String> = parsed.iter().flat_map(|(_, line)| match line {
        Line::Start(state) => vec![state],
        Line::Accept(states) => states.iter().collect(),
        Line::Transition(from, _, to) => vec![from, to],
    }).collect();

    let mut nfa = Nfa::new();
    for name in &names {
        nfa.add_state(name.as_str());
    }
    let id = |name: &String| names.iter().position(|other| *other == name).unwrap_or_default();

    nfa.set_start(id(&start));
    for (_, line) in &parsed {
        match line {
            Line::Start(_) => {}
            Line::Accept(states) => states.iter().for_each(|state| nfa.mark_accept(id(state))),
            Line::Transition(from, label, to) => nfa.add_transition(id(from), label.clone(), id(to)),
        }
    }

    Ok(nfa)
}

// Reads an NFA description that did not come from a file.
pub fn parse_nfa(text: &str) -> FileResult<Nfa> {
    nfa_from_lines(text, &Location::inline(0).file)
}

pub fn parse_nfa_file(path: &PathBuf) -> FileResult<Nfa> {
    let text = std::fs::read_to_string(path).map_err(|e| vec![NfaError {
        location: Location { file: path.clone(), line: 0 },
        error: NfaErrorType::FileError(e)
    }])?;
    nfa_from_lines(&text, path)
}
