/*
    This module evaluates arithmetic with a syntax-directed definition and
    builds the annotated parse tree. Every attribute is synthesized.
*/

use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::ErrorType;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Rule {
    Start,
    Add,
    Multiply,
    Group,
    Integer,
    MoreDigits,
    Digit,
}

impl Rule {
    pub const ALL: [Rule; 7] = [
        Rule::Start,
        Rule::Add,
        Rule::Multiply,
        Rule::Group,
        Rule::Integer,
        Rule::MoreDigits,
        Rule::Digit,
    ];

    pub fn production(self) -> &'static str {
        match self {
            Rule::Start => "S → E $",
            Rule::Add => "E → E + E",
            Rule::Multiply => "E → E * E",
            Rule::Group => "E → ( E )",
            Rule::Integer => "E → I",
            Rule::MoreDigits => "I → I digit",
            Rule::Digit => "I → digit",
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Rule::Start => "S.val = E.val",
            Rule::Add => "E.val = E1.val + E2.val",
            Rule::Multiply => "E.val = E1.val * E2.val",
            Rule::Group => "E.val = E1.val",
            Rule::Integer => "E.val = I.val",
            Rule::MoreDigits => "I.val = 10 * I1.val + digit.lexval",
            Rule::Digit => "I.val = digit.lexval",
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  {{ {} }}", self.production(), self.action())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SdtErrorType {
    Empty,
    UnexpectedCharacter(char),
    Unexpected { expected: &'static str, found: String },
    // A value does not fit in 64 bits
    Overflow,
}

impl ErrorType for SdtErrorType {}

impl Display for SdtErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdtErrorType::Empty => write!(f, "The expression is empty"),
            SdtErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            SdtErrorType::Unexpected { expected, found } => write!(f, "Expected {} but found {}", expected, found),
            SdtErrorType::Overflow => write!(f, "The value does not fit in 64 bits"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SdtErrorType>;

// A node of the annotated parse tree. Terminals other than digits carry no
// attribute.
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub symbol: &'static str,
    pub attribute: Option<(&'static str, i64)>,
    pub children: Vec<Node>,
}

impl Node {
    fn terminal(symbol: &'static str) -> Node {
        Node { symbol, attribute: None, children: Vec::new() }
    }

    fn value(&self) -> i64 {
        self.attribute.map_or(0, |(_, value)| value)
    }

    fn write_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        write!(f, "{}{}", "  ".repeat(depth), self.symbol)?;
        if let Some((name, value)) = self.attribute {
            write!(f, " ({}={})", name, value)?;
        }
        writeln!(f)?;
        self.children.iter().try_for_each(|child| child.write_indented(f, depth + 1))
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_indented(f, 0)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Evaluation {
    pub tree: Node,
    // Semantic actions in the order they ran, with the value each produced
    pub actions: Vec<(Rule, i64)>,
}

impl Evaluation {
    pub fn value(&self) -> i64 {
        self.tree.value()
    }
}

#[derive(Debug, PartialEq, Clone)]
enum Token {
    Number(String),
    Plus,
    Star,
    Open,
    Close,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(digits) => write!(f, "`{}`", digits),
            Token::Plus => write!(f, "`+`"),
            Token::Star => write!(f, "`*`"),
            Token::Open => write!(f, "`(`"),
            Token::Close => write!(f, "`)`"),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    // The end marker is optional
    let expression = expression.trim_end().strip_suffix('$').unwrap_or(expression);
    let mut chars = expression.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            tokens.push(Token::Number(chars.peeking_take_while(char::is_ascii_digit).collect()));
            continue;
        }
        chars.next();
        match c {
            '+' => tokens.push(Token::Plus),
            '*' => tokens.push(Token::Star),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            _ if c.is_whitespace() => {}
            _ => return Err(SdtErrorType::UnexpectedCharacter(c)),
        }
    }

    Ok(tokens)
}

struct Evaluator {
    tokens: Vec<Token>,
    position: usize,
    actions: Vec<(Rule, i64)>,
}

impl Evaluator {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn found(&self) -> String {
        self.peek().map_or_else(|| "end of input".to_string(), Token::to_string)
    }

    fn annotate(&mut self, rule: Rule, symbol: &'static str, name: &'static str, value: i64, children: Vec<Node>) -> Node {
        self.actions.push((rule, value));
        Node { symbol, attribute: Some((name, value)), children }
    }

    // Left-associative chain of one operator over `operand`
    fn chain(&mut self, token: Token, rule: Rule, operand: fn(&mut Self) -> Result<Node>) -> Result<Node> {
        let mut left = operand(self)?;
        while self.peek() == Some(&token) {
            self.position += 1;
            let right = operand(self)?;
            let value = match rule {
                Rule::Add => left.value().checked_add(right.value()),
                _ => left.value().checked_mul(right.value()),
            }
            .ok_or(SdtErrorType::Overflow)?;
            let symbol = if rule == Rule::Add { "+" } else { "*" };
            left = self.annotate(rule, "E", "val", value, vec![left, Node::terminal(symbol), right]);
        }
        Ok(left)
    }

    fn expression(&mut self) -> Result<Node> {
        self.chain(Token::Plus, Rule::Add, Self::term)
    }

    fn term(&mut self) -> Result<Node> {
        self.chain(Token::Star, Rule::Multiply, Self::factor)
    }

    fn factor(&mut self) -> Result<Node> {
        match self.peek().cloned() {
            Some(Token::Open) => {
                self.position += 1;
                let inner = self.expression()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(SdtErrorType::Unexpected { expected: "`)`", found: self.found() });
                }
                self.position += 1;
                let value = inner.value();
                Ok(self.annotate(Rule::Group, "E", "val", value, vec![Node::terminal("("), inner, Node::terminal(")")]))
            }
            Some(Token::Number(digits)) => {
                self.position += 1;
                self.number(&digits)
            }
            _ => Err(SdtErrorType::Unexpected { expected: "a number or `(`", found: self.found() }),
        }
    }

    // Digits build `I` from the left, one `I → I digit` per extra digit
    fn number(&mut self, digits: &str) -> Result<Node> {
        let mut integer: Option<Node> = None;

        for digit in digits.chars().filter_map(|c| c.to_digit(10)).map(i64::from) {
            let leaf = Node { symbol: "digit", attribute: Some(("lexval", digit)), children: Vec::new() };
            integer = Some(match integer {
                None => self.annotate(Rule::Digit, "I", "val", digit, vec![leaf]),
                Some(previous) => {
                    let value = previous
                        .value()
                        .checked_mul(10)
                        .and_then(|value| value.checked_add(digit))
                        .ok_or(SdtErrorType::Overflow)?;
                    self.annotate(Rule::MoreDigits, "I", "val", value, vec![previous, leaf])
                }
            });
        }

        let integer = integer.ok_or(SdtErrorType::Empty)?;
        let value = integer.value();
        Ok(self.annotate(Rule::Integer, "E", "val", value, vec![integer]))
    }
}

pub fn evaluate(expression: &str) -> Result<Evaluation> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(SdtErrorType::Empty);
    }

    let mut evaluator = Evaluator { tokens, position: 0, actions: Vec::new() };
    let root = evaluator.expression()?;
    if evaluator.peek().is_some() {
        return Err(SdtErrorType::Unexpected { expected: "`+`, `*` or the end", found: evaluator.found() });
    }

    let value = root.value();
    let tree = evaluator.annotate(Rule::Start, "S", "val", value, vec![root, Node::terminal("$")]);
    Ok(Evaluation { tree, actions: evaluator.actions })
}

pub fn render_definition() -> String {
    Rule::ALL.iter().map(|rule| format!("{}\n", rule)).join("")
}
