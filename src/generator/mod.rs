/*
    This module generates random sentences of a grammar
*/

use rand::prelude::*;
use std::{collections::HashMap, fmt::Display};

use crate::grammar::*;
use crate::error_handling::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // The requested start symbol has no rule
    UndefinedNonterminal(String),
    // A nonterminal that never derives a string of terminals
    Unproductive(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::Unproductive(nonterminal) => write!(f, "Nonterminal `{}` never derives a finite string", nonterminal),
        }
    }
}

pub type GenResult = Result<Vec<String>, GenerateErrorType>;

// The height of the shortest derivation tree of each nonterminal. Missing
// entries are unproductive.
fn heights(grammar: &Grammar) -> HashMap<String, usize> {
    let mut heights: HashMap<String, usize> = HashMap::new();

    loop {
        let mut changed = false;

        for nonterminal in &grammar.nonterminals {
            let best = grammar.alternatives(nonterminal)
                .iter()
                .filter_map(|alternative| alternative_height(alternative, &heights))
                .min();
            if let Some(height) = best {
                if heights.get(nonterminal).map_or(true, |old| height < *old) {
                    heights.insert(nonterminal.clone(), height);
                    changed = true;
                }
            }
        }

        if !changed {
            return heights;
        }
    }
}

fn alternative_height(alternative: &Alternative, heights: &HashMap<String, usize>) -> Option<usize> {
    let mut height = 0;
    for symbol in alternative {
        if let Symbol::Nonterminal(name) = symbol {
            height = height.max(*heights.get(name)?);
        }
    }
    Some(height + 1)
}

struct Generator<'a, R: Rng> {
    grammar: &'a Grammar,
    heights: HashMap<String, usize>,
    rng: &'a mut R,
    max_depth: usize,
}

impl<R: Rng> Generator<'_, R> {
    fn generate_nonterminal(&mut self, nonterminal: &str, depth: usize, output: &mut Vec<String>) -> Result<(), GenerateErrorType> {
        let candidates: Vec<(&Alternative, usize)> = self.grammar
            .alternatives(nonterminal)
            .iter()
            .filter_map(|alternative| alternative_height(alternative, &self.heights).map(|height| (alternative, height)))
            .collect();

        // Past the depth limit only the shortest alternatives keep the
        // derivation finite
        let lowest = candidates.iter().map(|(_, height)| *height).min();
        let choices: Vec<&Alternative> = candidates
            .iter()
            .filter(|(_, height)| depth < self.max_depth || Some(*height) == lowest)
            .map(|(alternative, _)| *alternative)
            .collect();

        let alternative = *choices
            .choose(&mut *self.rng)
            .ok_or_else(|| GenerateErrorType::Unproductive(nonterminal.to_string()))?;

        for symbol in alternative {
            match symbol {
                Symbol::Nonterminal(name) => self.generate_nonterminal(name, depth + 1, output)?,
                Symbol::Terminal(name) => output.push(name.clone()),
            }
        }

        Ok(())
    }
}

pub fn generate(grammar: &Grammar, rng: &mut impl Rng, max_depth: usize) -> GenResult {
    generate_with_override(grammar, &grammar.start_symbol, rng, max_depth)
}

// Generates a sentence in the given grammar starting with the given symbol
pub fn generate_with_override(grammar: &Grammar, start: &str, rng: &mut impl Rng, max_depth: usize) -> GenResult {
    if !grammar.is_nonterminal(start) {
        return Err(GenerateErrorType::UndefinedNonterminal(start.to_string()));
    }

    let mut generator = Generator {
        grammar,
        heights: heights(grammar),
        rng,
        max_depth,
    };
    let mut output = Vec::new();
    generator.generate_nonterminal(start, 0, &mut output)?;

    Ok(output)
}
