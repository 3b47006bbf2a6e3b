use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::render;
use super::{build, Builder, Operator, Result};

// `result = arg1 op arg2`
#[derive(Debug, PartialEq, Clone)]
pub struct Instruction {
    pub op: Operator,
    pub arg1: String,
    pub arg2: String,
    pub result: String,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} {} {}", self.result, self.arg1, self.op, self.arg2)
    }
}

#[derive(Default)]
struct Emitter {
    instructions: Vec<Instruction>,
}

impl Builder for Emitter {
    type Value = String;

    fn operand(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn apply(&mut self, op: Operator, arg1: String, arg2: String) -> String {
        // Temporaries are numbered from 1
        let result = format!("t{}", self.instructions.len() + 1);
        self.instructions.push(Instruction { op, arg1, arg2, result: result.clone() });
        result
    }
}

// Three-address code for an arithmetic expression. A lone operand needs no
// instructions.
pub fn generate_tac(expression: &str) -> Result<Vec<Instruction>> {
    let mut emitter = Emitter::default();
    build(expression, &mut emitter)?;
    Ok(emitter.instructions)
}

pub fn render_quadruples(instructions: &[Instruction]) -> String {
    let header = ["#", "op", "arg1", "arg2", "result"].map(String::from);
    let rows = instructions
        .iter()
        .enumerate()
        .map(|(index, instruction)| vec![
            index.to_string(),
            instruction.op.to_string(),
            instruction.arg1.clone(),
            instruction.arg2.clone(),
            instruction.result.clone(),
        ])
        .collect_vec();

    render::table(&header, &rows)
}

// Triples name earlier results by their index instead of a temporary
pub fn render_triples(instructions: &[Instruction]) -> String {
    let positions: HashMap<&str, usize> = instructions
        .iter()
        .enumerate()
        .map(|(index, instruction)| (instruction.result.as_str(), index))
        .collect();
    let reference = |arg: &String| positions.get(arg.as_str()).map_or_else(|| arg.clone(), |index| format!("({})", index));

    let header = ["#", "op", "arg1", "arg2"].map(String::from);
    let rows = instructions
        .iter()
        .enumerate()
        .map(|(index, instruction)| vec![
            index.to_string(),
            instruction.op.to_string(),
            reference(&instruction.arg1),
            reference(&instruction.arg2),
        ])
        .collect_vec();

    render::table(&header, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporaries_in_evaluation_order() {
        let instructions = generate_tac("a + b * c - (d + e)").unwrap();

        assert_eq!(instructions.iter().map(Instruction::to_string).collect_vec(), vec![
            "t1 = b * c",
            "t2 = a + t1",
            "t3 = d + e",
            "t4 = t2 - t3",
        ]);
    }

    #[test]
    fn lone_operand() {
        assert_eq!(generate_tac("x"), Ok(vec![]));
    }

    #[test]
    fn quadruples_and_triples() {
        let instructions = generate_tac("a + b * c").unwrap();

        assert_eq!(
            render_quadruples(&instructions),
            "# | op | arg1 | arg2 | result\n\
             --+----+------+------+-------\n\
             0 | *  | b    | c    | t1\n\
             1 | +  | a    | t1   | t2\n"
        );
        assert_eq!(
            render_triples(&instructions),
            "# | op | arg1 | arg2\n\
             --+----+------+-----\n\
             0 | *  | b    | c\n\
             1 | +  | a    | (0)\n"
        );
    }
}
