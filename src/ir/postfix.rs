use std::fmt::Display;

use super::{build, Builder, Operator, Result};

// One operator rewritten from infix to postfix, with its operands already
// in postfix form
#[derive(Debug, PartialEq, Clone)]
pub struct Conversion {
    pub left: String,
    pub op: Operator,
    pub right: String,
}

impl Conversion {
    pub fn postfix(&self) -> String {
        format!("{} {} {}", self.left, self.right, self.op)
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}  →  {}", self.left, self.op, self.right, self.postfix())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PostfixWalk {
    pub steps: Vec<Conversion>,
    pub postfix: String,
}

#[derive(Default)]
struct Recorder {
    steps: Vec<Conversion>,
}

impl Builder for Recorder {
    type Value = String;

    fn operand(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn apply(&mut self, op: Operator, left: String, right: String) -> String {
        let conversion = Conversion { left, op, right };
        let postfix = conversion.postfix();
        self.steps.push(conversion);
        postfix
    }
}

// Converts an arithmetic expression to postfix, keeping every conversion in
// the order the operators are resolved
pub fn infix_to_postfix(expression: &str) -> Result<PostfixWalk> {
    let mut recorder = Recorder::default();
    let postfix = build(expression, &mut recorder)?;

    Ok(PostfixWalk { steps: recorder.steps, postfix })
}
