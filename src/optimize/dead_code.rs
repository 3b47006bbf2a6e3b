use std::collections::HashSet;
use std::fmt::Display;

use itertools::Itertools;

// Words that end the reachable part of a block
const TERMINATORS: [&str; 2] = ["return", "exit"];

#[derive(Debug, PartialEq, Clone)]
pub enum Reason {
    // Follows a `return` or `exit`
    Unreachable,
    // Assigns a variable nothing reads
    UnusedAssignment(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Removal {
    pub line: String,
    pub reason: Reason,
}

impl Display for Removal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Reason::Unreachable => write!(f, "remove unreachable `{}`", self.line),
            Reason::UnusedAssignment(variable) => {
                write!(f, "remove `{}`: `{}` is never used", self.line, variable)
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Elimination {
    pub removals: Vec<Removal>,
    pub code: Vec<String>,
}

fn identifiers(text: &str) -> Vec<String> {
    let mut chars = text.chars().peekable();
    let mut result = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_alphabetic() || c == '_' {
            result.push(chars.peeking_take_while(|c| c.is_alphanumeric() || *c == '_').collect());
        } else if c.is_numeric() {
            // Digits of a number are not a name
            chars.peeking_take_while(|c| c.is_alphanumeric() || *c == '_').for_each(drop);
        } else {
            chars.next();
        }
    }

    result
}

// Splits `lhs = rhs` at a plain `=`. Comparisons and compound assignments
// like `+=` are not plain assignments.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let chars = line.char_indices().collect_vec();
    let position = (0..chars.len()).find(|&i| chars[i].1 == '=' && chars.get(i + 1).map(|(_, c)| *c) != Some('='))?;

    if position > 0 && "=<>!+-*/%&|^".contains(chars[position - 1].1) {
        return None;
    }
    let index = chars[position].0;
    Some((&line[..index], &line[index + 1..]))
}

// The variable an assignment writes, when its left-hand side is just a name
// with an optional type in front (`x`, `int x`)
fn assigned_variable(lhs: &str) -> Option<String> {
    let words = lhs.split_whitespace().collect_vec();
    let all_names = words.iter().all(|word| identifiers(word) == [word.to_string()]);
    if !all_names {
        return None;
    }
    words.last().map(|word| word.to_string())
}

fn is_terminator(line: &str) -> bool {
    identifiers(line).first().is_some_and(|word| TERMINATORS.contains(&word.as_str()))
}

// Lines made only of closing braces keep the block structure
fn is_block_end(line: &str) -> bool {
    line.chars().all(|c| c == '}' || c == ';')
}

fn used_variables(code: &[String]) -> HashSet<String> {
    code.iter()
        .flat_map(|line| match split_assignment(line) {
            Some((_, rhs)) => identifiers(rhs),
            None => identifiers(line),
        })
        .collect()
}

// Removes lines after a `return`/`exit`, then assignments to variables that
// are never read, repeating until nothing changes
pub fn eliminate_dead_code(source: &str) -> Elimination {
    let mut removals = Vec::new();
    let mut code = Vec::new();
    let mut reachable = true;

    for line in source.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if reachable || is_block_end(line) {
            code.push(line.to_string());
        } else {
            removals.push(Removal { line: line.to_string(), reason: Reason::Unreachable });
        }
        if is_terminator(line) {
            reachable = false;
        }
    }

    loop {
        let used = used_variables(&code);
        let mut dead = Vec::new();

        for (index, line) in code.iter().enumerate().rev() {
            let Some(variable) = split_assignment(line).and_then(|(lhs, _)| assigned_variable(lhs)) else {
                continue;
            };
            if !used.contains(&variable) {
                removals.push(Removal { line: line.clone(), reason: Reason::UnusedAssignment(variable) });
                dead.push(index);
            }
        }

        if dead.is_empty() {
            return Elimination { removals, code };
        }
        // Indices were collected from the bottom up
        for index in dead {
            code.remove(index);
        }
    }
}
