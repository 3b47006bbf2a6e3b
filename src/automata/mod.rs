/*
    This module is for nondeterministic finite automata and their
    determinization
*/

pub mod dot;
pub mod regex;
pub mod subset;
pub mod text;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::ops::Bound::Included;

use itertools::Itertools;

use crate::grammar::EPSILON;
use crate::render;

// Index of a state in the order it was added
pub type StateId = usize;

// Epsilon sorts after every symbol, so table columns end with it
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Label {
    Symbol(String),
    Epsilon,
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Symbol(symbol) => write!(f, "{}", symbol),
            Label::Epsilon => write!(f, "{}", EPSILON),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Nfa {
    names: Vec<String>,
    start: StateId,
    accepting: BTreeSet<StateId>,
    // Several transitions may leave one state on one label
    transitions: BTreeSet<(StateId, Label, StateId)>,
}

// Formats a set of state names as `{1, 2}`, or `∅` when empty.
pub fn format_state_set<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names = names.into_iter().collect_vec();
    if names.is_empty() {
        "∅".to_string()
    } else {
        format!("{{{}}}", names.iter().join(", "))
    }
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    // Creates and adds a new state returning its id
    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        self.names.push(name.into());
        self.names.len() - 1
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.names[id]
    }

    pub fn set_start(&mut self, id: StateId) {
        self.start = id;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn mark_accept(&mut self, id: StateId) {
        self.accepting.insert(id);
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    pub fn accepting(&self) -> impl Iterator<Item = StateId> + '_ {
        self.accepting.iter().copied()
    }

    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        self.transitions.insert((from, label, to));
    }

    pub fn transitions(&self) -> impl Iterator<Item = &(StateId, Label, StateId)> {
        self.transitions.iter()
    }

    // For a single state, gets all states it moves to on the given label
    pub fn lookup(&self, from: StateId, label: &Label) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .range((
                Included((from, label.clone(), 0)),
                Included((from, label.clone(), StateId::MAX)),
            ))
            .map(|(_, _, to)| *to)
    }

    // All non-ε symbols used by some transition, sorted
    pub fn alphabet(&self) -> BTreeSet<String> {
        self.transitions
            .iter()
            .filter_map(|(_, label, _)| match label {
                Label::Symbol(symbol) => Some(symbol.clone()),
                Label::Epsilon => None,
            })
            .collect()
    }

    pub fn has_epsilon(&self) -> bool {
        self.transitions.iter().any(|(_, label, _)| *label == Label::Epsilon)
    }

    pub fn epsilon_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut pending = states.iter().copied().collect_vec();

        while let Some(state) = pending.pop() {
            for next in self.lookup(state, &Label::Epsilon) {
                if closure.insert(next) {
                    pending.push(next);
                }
            }
        }

        closure
    }

    // The states reachable from `states` on exactly one `symbol`, without
    // taking the ε-closure of the result
    pub fn step(&self, states: &BTreeSet<StateId>, symbol: &str) -> BTreeSet<StateId> {
        let label = Label::Symbol(symbol.to_string());
        states.iter().flat_map(|state| self.lookup(*state, &label)).collect()
    }

    pub fn accepts<S: AsRef<str>>(&self, input: &[S]) -> bool {
        if self.names.is_empty() {
            return false;
        }

        let mut current = self.epsilon_closure(&BTreeSet::from([self.start]));
        for symbol in input {
            current = self.epsilon_closure(&self.step(&current, symbol.as_ref()));
            if current.is_empty() {
                return false;
            }
        }

        current.iter().any(|state| self.is_accepting(*state))
    }

    // Runs the automaton with every character of `input` as one symbol
    pub fn accepts_str(&self, input: &str) -> bool {
        let symbols = input.chars().map(String::from).collect_vec();
        self.accepts(&symbols)
    }

    fn names_of(&self, states: &BTreeSet<StateId>) -> String {
        format_state_set(states.iter().map(|state| self.name(*state)))
    }

    // The formal (Q, Σ, δ, q0, F) description
    pub fn describe(&self) -> String {
        let all_states = (0..self.state_count()).collect();
        let alphabet = self.alphabet().into_iter().collect_vec();

        format!(
            "Q = {}\nΣ = {}\nδ: {} transitions\nq0 = {}\nF = {}\n",
            self.names_of(&all_states),
            format_state_set(alphabet.iter().map(String::as_str)),
            self.transitions.len(),
            self.names.get(self.start).map(String::as_str).unwrap_or("∅"),
            self.names_of(&self.accepting)
        )
    }

    // Row label marking the start state with `→` and accepting states with `*`
    fn row_label(&self, state: StateId) -> String {
        let start = if state == self.start { "→" } else { " " };
        let accept = if self.is_accepting(state) { "*" } else { " " };
        format!("{}{}{}", start, accept, self.name(state))
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut labels = self.alphabet().into_iter().map(Label::Symbol).collect_vec();
        if self.has_epsilon() {
            labels.push(Label::Epsilon);
        }

        let header = std::iter::once("State".to_string())
            .chain(labels.iter().map(Label::to_string))
            .collect_vec();
        let rows = (0..self.state_count())
            .map(|state| {
                std::iter::once(self.row_label(state))
                    .chain(labels.iter().map(|label| self.names_of(&self.lookup(state, label).collect::<BTreeSet<_>>())))
                    .collect_vec()
            })
            .collect_vec();

        write!(f, "{}", render::table(&header, &rows))
    }
}
