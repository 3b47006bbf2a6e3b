/*
    Step-by-step records of the LL(1) and shift-reduce parsers
*/

use std::fmt::Display;

use crate::grammar::Production;
use crate::render;

#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    // Top of the stack matched the lookahead
    Match(String),
    // A nonterminal was replaced by the right-hand side of a production
    Predict(Production),
    Shift(String),
    Reduce(Production),
    Accept,
    Error(String),
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Match(terminal) => write!(f, "match {}", terminal),
            Action::Predict(production) => write!(f, "{}", production),
            Action::Shift(terminal) => write!(f, "shift {}", terminal),
            Action::Reduce(production) => write!(f, "reduce {}", production),
            Action::Accept => write!(f, "accept"),
            Action::Error(message) => write!(f, "error: {}", message),
        }
    }
}

// The configuration of a parser before it took `action`.
#[derive(Debug, PartialEq, Clone)]
pub struct Step {
    pub stack: String,
    pub input: String,
    pub action: Action,
}

pub fn render_trace(steps: &[Step]) -> String {
    let header = ["Stack", "Input", "Action"].map(String::from);
    let rows: Vec<Vec<String>> = steps
        .iter()
        .map(|step| vec![step.stack.clone(), step.input.clone(), step.action.to_string()])
        .collect();

    render::table(&header, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Symbol;

    #[test]
    fn actions_display() {
        let production = Production {
            lhs: "E".to_string(),
            rhs: vec![Symbol::Nonterminal("T".to_string()), Symbol::Nonterminal("E'".to_string())],
        };

        assert_eq!(Action::Predict(production.clone()).to_string(), "E → T E'");
        assert_eq!(Action::Reduce(production).to_string(), "reduce E → T E'");
        assert_eq!(Action::Match("id".to_string()).to_string(), "match id");
        assert_eq!(Action::Accept.to_string(), "accept");
    }

    #[test]
    fn trace_table() {
        let steps = vec![
            Step { stack: "$".to_string(), input: "id $".to_string(), action: Action::Shift("id".to_string()) },
            Step { stack: "$ id".to_string(), input: "$".to_string(), action: Action::Accept },
        ];

        assert_eq!(
            render_trace(&steps),
            "Stack | Input | Action\n\
             ------+-------+---------\n\
             $     | id $  | shift id\n\
             $ id  | $     | accept\n"
        );
    }
}
