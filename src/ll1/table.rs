use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::grammar::first_follow::FirstFollow;
use crate::grammar::{Grammar, Lookahead, Production};
use crate::render;

// A cell that more than one production claims.
#[derive(Debug, PartialEq, Clone)]
pub struct Conflict {
    pub nonterminal: String,
    pub lookahead: Lookahead,
    pub productions: Vec<Production>,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "M[{}, {}] holds {}",
            self.nonterminal,
            self.lookahead,
            self.productions.iter().map(|production| format!("`{}`", production)).join(" and ")
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ParseTable {
    nonterminals: Vec<String>,
    // Terminals in sorted order followed by the end marker
    columns: Vec<Lookahead>,
    // Every distinct production aimed at a cell, in grammar order
    cells: HashMap<(String, Lookahead), Vec<Production>>,
}

impl ParseTable {
    pub fn build(grammar: &Grammar, sets: &FirstFollow) -> ParseTable {
        let mut cells: HashMap<(String, Lookahead), Vec<Production>> = HashMap::new();

        for production in grammar.productions() {
            let first = sets.first_of(&production.rhs);
            let mut targets = first.iter().filter(|l| **l != Lookahead::Epsilon).cloned().collect_vec();
            if first.contains(&Lookahead::Epsilon) {
                targets.extend(sets.follow(&production.lhs).into_iter().flatten().cloned());
            }

            for lookahead in targets {
                let cell = cells.entry((production.lhs.clone(), lookahead)).or_default();
                if !cell.contains(&production) {
                    cell.push(production.clone());
                }
            }
        }

        let columns = grammar
            .terminals()
            .into_iter()
            .map(Lookahead::Terminal)
            .chain(std::iter::once(Lookahead::EndMarker))
            .collect();

        ParseTable {
            nonterminals: grammar.nonterminals.clone(),
            columns,
            cells,
        }
    }

    pub fn cell(&self, nonterminal: &str, lookahead: &Lookahead) -> &[Production] {
        self.cells
            .get(&(nonterminal.to_string(), lookahead.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // The production the parser uses: the earliest one in a conflicting cell
    pub fn entry(&self, nonterminal: &str, lookahead: &Lookahead) -> Option<&Production> {
        self.cell(nonterminal, lookahead).first()
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.nonterminals
            .iter()
            .cartesian_product(&self.columns)
            .filter(|(nonterminal, lookahead)| self.cell(nonterminal, lookahead).len() > 1)
            .map(|(nonterminal, lookahead)| Conflict {
                nonterminal: nonterminal.clone(),
                lookahead: lookahead.clone(),
                productions: self.cell(nonterminal, lookahead).to_vec(),
            })
            .collect()
    }

    pub fn is_ll1(&self) -> bool {
        self.cells.values().all(|cell| cell.len() <= 1)
    }
}

impl Display for ParseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = std::iter::once("M".to_string())
            .chain(self.columns.iter().map(Lookahead::to_string))
            .collect_vec();
        let rows = self
            .nonterminals
            .iter()
            .map(|nonterminal| {
                std::iter::once(nonterminal.clone())
                    .chain(self.columns.iter().map(|lookahead| self.cell(nonterminal, lookahead).iter().join(" / ")))
                    .collect_vec()
            })
            .collect_vec();

        write!(f, "{}", render::table(&header, &rows))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::grammar::first_follow;
    use crate::parser::{parse_file, parse_grammar};

    fn table_for(text: &str) -> ParseTable {
        let grammar = parse_grammar(text).unwrap();
        ParseTable::build(&grammar, &first_follow::compute(&grammar))
    }

    fn terminal(name: &str) -> Lookahead {
        Lookahead::Terminal(name.to_string())
    }

    #[test]
    fn expression_table_has_no_conflicts() {
        let table = table_for("E -> T E'\nE' -> + T E' | e\nT -> F T'\nT' -> * F T' | e\nF -> ( E ) | id");

        assert!(table.is_ll1());
        assert!(table.conflicts().is_empty());
        assert_eq!(table.entry("E", &terminal("id")).map(Production::to_string), Some("E → T E'".to_string()));
        assert_eq!(table.entry("E'", &Lookahead::EndMarker).map(Production::to_string), Some("E' → ε".to_string()));
        assert_eq!(table.entry("T'", &terminal("+")).map(Production::to_string), Some("T' → ε".to_string()));
        assert_eq!(table.entry("F", &terminal("+")), None);
    }

    #[test]
    fn ambiguous_grammar_conflicts() {
        let table = table_for("E -> E + E | id");
        let conflicts = table.conflicts();

        assert!(!table.is_ll1());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].lookahead, terminal("id"));
        // The earliest production wins the cell
        assert_eq!(table.entry("E", &terminal("id")).map(Production::to_string), Some("E → E + E".to_string()));
        assert_eq!(conflicts[0].to_string(), "M[E, id] holds `E → E + E` and `E → id`");
    }

    #[test]
    fn dangling_else_conflicts_on_else() {
        let grammar = parse_file(&PathBuf::from("example_data/dangling_else.grammar")).unwrap();
        let grammar = crate::grammar::transform::left_factor(&grammar);
        let table = ParseTable::build(&grammar, &first_follow::compute(&grammar));

        assert_eq!(table.conflicts().iter().map(|c| (c.nonterminal.as_str(), c.lookahead.clone())).collect_vec(), vec![
            ("S'", terminal("e"))
        ]);
    }

    #[test]
    fn table_display() {
        let table = table_for("S -> a S | b");

        assert_eq!(
            table.to_string(),
            "M | a       | b     | $\n\
             --+---------+-------+--\n\
             S | S → a S | S → b |\n"
        );
    }
}
