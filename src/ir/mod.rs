/*
    Intermediate forms of arithmetic expressions: postfix, three-address
    code and DAGs. All of them come from one operator-precedence pass.
*/

pub mod dag;
pub mod postfix;
pub mod tac;

use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::ErrorType;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Operator {
    Power,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
}

impl Operator {
    fn from_char(c: char) -> Option<Operator> {
        match c {
            '^' => Some(Operator::Power),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            '%' => Some(Operator::Modulo),
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            _ => None,
        }
    }

    // Every operator is left associative, `^` included
    fn precedence(self) -> u8 {
        match self {
            Operator::Power => 4,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 3,
            Operator::Add | Operator::Subtract => 2,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Power => "^",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Add => "+",
            Operator::Subtract => "-",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprErrorType {
    // No operand at all
    Empty,
    UnexpectedCharacter(char),
    UnbalancedParenthesis,
    // An operator without two operands
    MissingOperand(Operator),
    // Two operands next to each other
    MissingOperator,
}

impl ErrorType for ExprErrorType {}

impl Display for ExprErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprErrorType::Empty => write!(f, "The expression is empty"),
            ExprErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            ExprErrorType::UnbalancedParenthesis => write!(f, "Unbalanced parenthesis"),
            ExprErrorType::MissingOperand(op) => write!(f, "Operator `{}` is missing an operand", op),
            ExprErrorType::MissingOperator => write!(f, "Operands are not joined by an operator"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExprErrorType>;

#[derive(Debug, PartialEq, Clone)]
enum Token {
    Operand(String),
    Operator(Operator),
    Open,
    Close,
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut chars = expression.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_alphanumeric() || c == '_' {
            let name: String = chars.peeking_take_while(|c| c.is_alphanumeric() || *c == '_').collect();
            tokens.push(Token::Operand(name));
        } else {
            chars.next();
            tokens.push(match c {
                '(' => Token::Open,
                ')' => Token::Close,
                _ => Token::Operator(Operator::from_char(c).ok_or(ExprErrorType::UnexpectedCharacter(c))?),
            });
        }
    }

    Ok(tokens)
}

// What to make of operands and of each applied operator
pub trait Builder {
    type Value;

    fn operand(&mut self, name: &str) -> Self::Value;
    fn apply(&mut self, op: Operator, left: Self::Value, right: Self::Value) -> Self::Value;
}

fn reduce_top<B: Builder>(builder: &mut B, op: Operator, values: &mut Vec<B::Value>) -> Result<()> {
    let right = values.pop().ok_or(ExprErrorType::MissingOperand(op))?;
    let left = values.pop().ok_or(ExprErrorType::MissingOperand(op))?;
    values.push(builder.apply(op, left, right));
    Ok(())
}

// Runs the shunting yard algorithm over an infix expression, handing every
// operator to the builder as soon as both of its operands are known
pub fn build<B: Builder>(expression: &str, builder: &mut B) -> Result<B::Value> {
    let mut values: Vec<B::Value> = Vec::new();
    // `None` marks an open parenthesis
    let mut operators: Vec<Option<Operator>> = Vec::new();

    for token in tokenize(expression)? {
        match token {
            Token::Operand(name) => values.push(builder.operand(&name)),
            Token::Open => operators.push(None),
            Token::Close => loop {
                match operators.pop() {
                    Some(None) => break,
                    Some(Some(op)) => reduce_top(builder, op, &mut values)?,
                    None => return Err(ExprErrorType::UnbalancedParenthesis),
                }
            },
            Token::Operator(op) => {
                while let Some(Some(top)) = operators.last().copied() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    operators.pop();
                    reduce_top(builder, top, &mut values)?;
                }
                operators.push(Some(op));
            }
        }
    }

    while let Some(entry) = operators.pop() {
        let op = entry.ok_or(ExprErrorType::UnbalancedParenthesis)?;
        reduce_top(builder, op, &mut values)?;
    }

    let result = values.pop().ok_or(ExprErrorType::Empty)?;
    if !values.is_empty() {
        return Err(ExprErrorType::MissingOperator);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    // Rebuilds the expression fully parenthesized
    struct Parenthesize;

    impl Builder for Parenthesize {
        type Value = String;

        fn operand(&mut self, name: &str) -> String {
            name.to_string()
        }

        fn apply(&mut self, op: Operator, left: String, right: String) -> String {
            format!("({} {} {})", left, op, right)
        }
    }

    #[test]
    fn precedence_and_associativity() {
        let expressions = vec!["a + b * c", "a - b - c", "(a + b) * c", "a ^ b ^ c", "x1 % 2 + y_2 / z"];
        let answers = vec![
            "(a + (b * c))",
            "((a - b) - c)",
            "((a + b) * c)",
            "((a ^ b) ^ c)",
            "((x1 % 2) + (y_2 / z))",
        ];

        for (expression, answer) in zip(expressions, answers) {
            assert_eq!(build(expression, &mut Parenthesize), Ok(answer.to_string()));
        }
    }

    #[test]
    fn malformed_expressions() {
        let expressions = vec!["", "()", "a + $", "(a + b", "a + b)", "a +", "- a", "a b"];
        let answers = vec![
            ExprErrorType::Empty,
            ExprErrorType::Empty,
            ExprErrorType::UnexpectedCharacter('$'),
            ExprErrorType::UnbalancedParenthesis,
            ExprErrorType::UnbalancedParenthesis,
            ExprErrorType::MissingOperand(Operator::Add),
            ExprErrorType::MissingOperand(Operator::Subtract),
            ExprErrorType::MissingOperator,
        ];

        for (expression, answer) in zip(expressions, answers) {
            assert_eq!(build(expression, &mut Parenthesize), Err(answer), "{:?}", expression);
        }
    }
}
