/*
    Graphviz descriptions of the automata. Parallel edges between the same
    two states are merged into one edge with a combined label.
*/

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result};

use itertools::Itertools;

use super::subset::Dfa;
use super::Nfa;

fn write_header(f: &mut Formatter<'_>) -> Result {
    writeln!(f, "digraph {{")?;
    writeln!(f, "  rankdir=LR;")?;
    writeln!(f, "  node [shape=circle];")?;
    writeln!(f, "  start [shape=point];")
}

fn write_edges(f: &mut Formatter<'_>, edges: BTreeMap<(&str, &str), Vec<String>>) -> Result {
    for ((from, to), labels) in edges {
        writeln!(f, "  \"{}\" -> \"{}\" [label=\"{}\"];", from, to, labels.iter().join(", "))?;
    }
    writeln!(f, "}}")
}

pub struct NfaDot<'a>(pub &'a Nfa);

impl Display for NfaDot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let nfa = self.0;
        write_header(f)?;
        for state in nfa.accepting() {
            writeln!(f, "  \"{}\" [shape=doublecircle];", nfa.name(state))?;
        }
        if nfa.state_count() > 0 {
            writeln!(f, "  start -> \"{}\";", nfa.name(nfa.start()))?;
        }

        let mut edges: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
        for (from, label, to) in nfa.transitions() {
            edges.entry((nfa.name(*from), nfa.name(*to))).or_default().push(label.to_string());
        }
        write_edges(f, edges)
    }
}

pub struct DfaDot<'a>(pub &'a Dfa);

impl Display for DfaDot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let dfa = self.0;
        write_header(f)?;
        for state in &dfa.accepting {
            writeln!(f, "  \"{}\" [shape=doublecircle];", dfa.names[*state])?;
        }
        writeln!(f, "  start -> \"{}\";", dfa.names[dfa.start])?;

        let mut edges: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
        for ((from, symbol), to) in &dfa.transitions {
            edges.entry((dfa.names[*from].as_str(), dfa.names[*to].as_str())).or_default().push(symbol.clone());
        }
        write_edges(f, edges)
    }
}

pub fn nfa_to_dot(nfa: &Nfa) -> String {
    NfaDot(nfa).to_string()
}

pub fn dfa_to_dot(dfa: &Dfa) -> String {
    DfaDot(dfa).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::regex::regex_to_nfa;
    use crate::automata::subset::subset_construction;

    #[test]
    fn nfa_graph() {
        let nfa = regex_to_nfa("ab").unwrap();

        assert_eq!(
            nfa_to_dot(&nfa),
            "digraph {\n  rankdir=LR;\n  node [shape=circle];\n  start [shape=point];\n  \"4\" [shape=doublecircle];\n  start -> \"1\";\n  \"1\" -> \"2\" [label=\"a\"];\n  \"2\" -> \"3\" [label=\"ε\"];\n  \"3\" -> \"4\" [label=\"b\"];\n}\n"
        );
    }

    #[test]
    fn dfa_graph_merges_parallel_edges() {
        let dfa = subset_construction(&regex_to_nfa("ab").unwrap());
        let dot = dfa_to_dot(&dfa);

        assert!(dot.contains("  \"∅\" -> \"∅\" [label=\"a, b\"];\n"));
        assert!(dot.contains("  \"{4}\" [shape=doublecircle];\n"));
        assert!(dot.contains("  start -> \"{1}\";\n"));
    }
}
