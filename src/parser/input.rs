/*
    This module splits a target string into the terminals of a grammar
*/

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::error_handling::ErrorType;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenizeErrorType {
    // No terminal starts at this character position
    UnknownSymbol { position: usize, text: String },
    // The chunk can be read as more than one sequence of terminals
    AmbiguousSplit { text: String },
}

impl ErrorType for TokenizeErrorType {}

impl Display for TokenizeErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizeErrorType::UnknownSymbol { position, text } => {
                write!(f, "No terminal matches `{}` at position {}", text, position)
            }
            TokenizeErrorType::AmbiguousSplit { text } => {
                write!(f, "`{}` splits into terminals in more than one way; separate them with spaces", text)
            }
        }
    }
}

// Whitespace separated chunks with the character position they start at
fn chunks(text: &str) -> Vec<(usize, &str)> {
    let mut result = Vec::new();
    let mut start = None;

    for (chars_before, (i, c)) in text.char_indices().enumerate() {
        match (start, c.is_whitespace()) {
            (None, false) => start = Some((chars_before, i)),
            (Some((position, begin)), true) => {
                result.push((position, &text[begin..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some((position, begin)) = start {
        result.push((position, &text[begin..]));
    }

    result
}

fn matching<'a>(chunk: &'a str, at: usize, terminals: &'a BTreeSet<String>) -> impl Iterator<Item = &'a String> + 'a {
    terminals.iter().filter(move |terminal| !terminal.is_empty() && chunk[at..].starts_with(terminal.as_str()))
}

fn tokenize_chunk(position: usize, chunk: &str, terminals: &BTreeSet<String>) -> Result<Vec<String>, TokenizeErrorType> {
    // ways[i] is the number of splits of chunk[i..], saturated at 2
    let mut ways = vec![0usize; chunk.len() + 1];
    ways[chunk.len()] = 1;
    for i in (0..chunk.len()).rev().filter(|&i| chunk.is_char_boundary(i)) {
        ways[i] = matching(chunk, i, terminals)
            .map(|terminal| ways[i + terminal.len()])
            .sum::<usize>()
            .min(2);
    }

    if ways[0] == 0 {
        // Report the furthest point any split of a prefix can reach
        let mut reachable = vec![false; chunk.len() + 1];
        reachable[0] = true;
        let mut furthest = 0;
        for i in (0..chunk.len()).filter(|&i| chunk.is_char_boundary(i)) {
            if !reachable[i] {
                continue;
            }
            furthest = i;
            for terminal in matching(chunk, i, terminals) {
                reachable[i + terminal.len()] = true;
            }
        }
        return Err(TokenizeErrorType::UnknownSymbol {
            position: position + chunk[..furthest].chars().count(),
            text: chunk[furthest..].to_string(),
        });
    }
    if ways[0] > 1 {
        return Err(TokenizeErrorType::AmbiguousSplit { text: chunk.to_string() });
    }

    let mut tokens = Vec::new();
    let mut at = 0;
    while at < chunk.len() {
        let Some(terminal) = matching(chunk, at, terminals).find(|terminal| ways[at + terminal.len()] > 0) else {
            break;
        };
        tokens.push(terminal.clone());
        at += terminal.len();
    }

    Ok(tokens)
}

// Splits `text` into terminals. Whitespace only separates tokens; inside
// a chunk the single possible split into known terminals is used.
pub fn tokenize_input(text: &str, terminals: &BTreeSet<String>) -> Result<Vec<String>, TokenizeErrorType> {
    let mut tokens = Vec::new();

    for (position, chunk) in chunks(text) {
        tokens.extend(tokenize_chunk(position, chunk, terminals)?);
    }

    Ok(tokens)
}
