/*
    Subset construction of a DFA from an NFA
*/

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::Display;

use itertools::Itertools;

use crate::render;
use super::{format_state_set, Nfa, StateId};

#[derive(Debug, PartialEq, Clone)]
pub struct Dfa {
    // The NFA states behind each DFA state, in discovery order
    pub subsets: Vec<BTreeSet<StateId>>,
    pub names: Vec<String>,
    pub start: usize,
    pub accepting: BTreeSet<usize>,
    pub alphabet: Vec<String>,
    // Total: every state has a target for every symbol of the alphabet
    pub transitions: BTreeMap<(usize, String), usize>,
}

// Determinizes `nfa` by breadth-first subset construction. The empty
// subset becomes the dead state `∅` when some move leads nowhere.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    let alphabet = nfa.alphabet().into_iter().collect_vec();
    let start_subset = nfa.epsilon_closure(&BTreeSet::from([nfa.start()]));

    let mut subsets = vec![start_subset.clone()];
    let mut index: HashMap<BTreeSet<StateId>, usize> = HashMap::from([(start_subset, 0)]);
    let mut transitions = BTreeMap::new();
    let mut queue = VecDeque::from([0]);

    while let Some(current) = queue.pop_front() {
        for symbol in &alphabet {
            let target = nfa.epsilon_closure(&nfa.step(&subsets[current], symbol));
            let target_id = match index.get(&target) {
                Some(id) => *id,
                None => {
                    let id = subsets.len();
                    index.insert(target.clone(), id);
                    subsets.push(target);
                    queue.push_back(id);
                    id
                }
            };
            transitions.insert((current, symbol.clone()), target_id);
        }
    }

    let names = subsets
        .iter()
        .map(|subset| format_state_set(subset.iter().map(|state| nfa.name(*state))))
        .collect();
    let accepting = subsets
        .iter()
        .positions(|subset| subset.iter().any(|state| nfa.is_accepting(*state)))
        .collect();

    Dfa {
        subsets,
        names,
        start: 0,
        accepting,
        alphabet,
        transitions,
    }
}

impl Dfa {
    pub fn next(&self, state: usize, symbol: &str) -> Option<usize> {
        self.transitions.get(&(state, symbol.to_string())).copied()
    }

    pub fn accepts<S: AsRef<str>>(&self, input: &[S]) -> bool {
        let mut state = self.start;
        for symbol in input {
            // Symbols outside the alphabet reject
            match self.next(state, symbol.as_ref()) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.accepting.contains(&state)
    }

    pub fn accepts_str(&self, input: &str) -> bool {
        let symbols = input.chars().map(String::from).collect_vec();
        self.accepts(&symbols)
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    pub fn dead_state(&self) -> Option<usize> {
        self.subsets.iter().position(BTreeSet::is_empty)
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = std::iter::once("State".to_string()).chain(self.alphabet.iter().cloned()).collect_vec();
        let rows = (0..self.state_count())
            .map(|state| {
                let start = if state == self.start { "→" } else { " " };
                let accept = if self.accepting.contains(&state) { "*" } else { " " };
                std::iter::once(format!("{}{}{}", start, accept, self.names[state]))
                    .chain(self.alphabet.iter().map(|symbol| {
                        self.next(state, symbol).map(|target| self.names[target].clone()).unwrap_or_default()
                    }))
                    .collect_vec()
            })
            .collect_vec();

        write!(f, "{}", render::table(&header, &rows))
    }
}
