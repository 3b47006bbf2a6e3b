/*
    Grammar rewrites that prepare a grammar for top-down parsing
*/

use std::collections::HashSet;
use std::iter::once;

use super::{Alternative, Grammar, Rewrite, Symbol};

// Keeps appending primes until the name is not used by any symbol
fn fresh_name(base: String, taken: &mut HashSet<String>) -> String {
    let mut name = base;
    while taken.contains(&name) {
        name.push('\'');
    }
    taken.insert(name.clone());
    return name;
}

fn taken_names(grammar: &Grammar) -> HashSet<String> {
    grammar.nonterminals.iter().cloned().chain(grammar.terminals()).collect()
}

// Removes direct left recursion:
// `A → Aα | β` becomes `A → βA'` and `A' → αA' | ε`.
pub fn eliminate_left_recursion(grammar: &Grammar) -> Grammar {
    let mut taken = taken_names(grammar);
    let mut rules = Vec::new();

    for nonterminal in &grammar.nonterminals {
        let itself = Symbol::Nonterminal(nonterminal.clone());
        let (recursive, others): (Vec<&Alternative>, Vec<&Alternative>) = grammar
            .alternatives(nonterminal)
            .iter()
            .partition(|alternative| alternative.first() == Some(&itself));

        if recursive.is_empty() {
            rules.push((nonterminal.clone(), others.into_iter().cloned().collect()));
            continue;
        }

        let tail = Symbol::Nonterminal(fresh_name(format!("{}'", nonterminal), &mut taken));

        let betas: Rewrite = if others.is_empty() {
            vec![vec![tail.clone()]]
        } else {
            others.iter().map(|beta| beta.iter().cloned().chain(once(tail.clone())).collect()).collect()
        };

        let mut alphas: Rewrite = recursive
            .iter()
            .map(|alternative| alternative[1..].iter().cloned().chain(once(tail.clone())).collect())
            .collect();
        alphas.push(Vec::new());

        rules.push((nonterminal.clone(), betas));
        rules.push((tail.name().to_string(), alphas));
    }

    Grammar::from_rules(rules)
}

fn common_prefix(group: &[&Alternative]) -> Alternative {
    let first = group[0];
    let length = (0..first.len())
        .take_while(|&i| group.iter().all(|alternative| alternative.get(i) == Some(&first[i])))
        .count();
    first[..length].to_vec()
}

// Factors out the longest common prefix of alternatives that start with
// the same symbol: `A → αβ₁ | αβ₂ | γ` becomes `A → αA' | γ` and
// `A' → β₁ | β₂`.
pub fn left_factor(grammar: &Grammar) -> Grammar {
    let mut taken = taken_names(grammar);
    let mut rules = Vec::new();

    for nonterminal in &grammar.nonterminals {
        // Group alternatives by their first symbol, keeping first-seen order
        let mut groups: Vec<(Option<&Symbol>, Vec<&Alternative>)> = Vec::new();
        for alternative in grammar.alternatives(nonterminal) {
            let key = alternative.first();
            match groups.iter_mut().find(|(first, _)| *first == key) {
                Some((_, group)) => group.push(alternative),
                None => groups.push((key, vec![alternative])),
            }
        }

        let factored_groups = groups.iter().filter(|(key, group)| key.is_some() && group.len() > 1).count();
        let mut main: Rewrite = Vec::new();
        let mut factored = Vec::new();

        for (key, group) in groups {
            let Some(first) = key else {
                // Repeated ε alternatives collapse into one
                main.push(Vec::new());
                continue;
            };
            if group.len() == 1 {
                main.push(group[0].clone());
                continue;
            }

            let prefix = common_prefix(&group);
            let base = if factored_groups > 1 {
                format!("{}_{}'", nonterminal, first)
            } else {
                format!("{}'", nonterminal)
            };
            let tail = fresh_name(base, &mut taken);

            main.push(prefix.iter().cloned().chain(once(Symbol::Nonterminal(tail.clone()))).collect());
            factored.push((tail, group.iter().map(|alternative| alternative[prefix.len()..].to_vec()).collect::<Rewrite>()));
        }

        rules.push((nonterminal.clone(), main));
        rules.extend(factored);
    }

    Grammar::from_rules(rules)
}
