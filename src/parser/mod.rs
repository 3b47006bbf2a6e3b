/*
    This module parses grammar text of the form `A -> alpha | beta`
*/

pub mod input;
mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use crate::grammar::*;
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use verifier::verify_rules;

// Standalone alternatives that denote the empty production
const EPSILON_MARKERS: [&str; 4] = ["e", "ε", "λ", "lambda"];
// Markers that can never be a terminal
const STRICT_EPSILON_MARKERS: [&str; 2] = ["ε", "λ"];

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule has no `->`
    MissingArrow,
    // A rule has multiple arrows
    UnexpectedArrow,
    // The left-hand side is not exactly one symbol
    MissingNonterminal,
    // ε written next to other symbols in one alternative
    MisplacedEpsilon,
    // The end marker was used as a grammar symbol
    ReservedSymbol(String),
    // The text has no rules at all
    EmptyGrammar,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::ReservedSymbol(a), CompileErrorType::ReservedSymbol(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingArrow => write!(f, "Expected `->` after nonterminal"),
            CompileErrorType::UnexpectedArrow => write!(f, "Unexpected `->` encountered"),
            CompileErrorType::MissingNonterminal => write!(f, "Expected exactly one nonterminal before `->`"),
            CompileErrorType::MisplacedEpsilon => write!(f, "`ε` must be the only symbol of an alternative"),
            CompileErrorType::ReservedSymbol(symbol) => write!(f, "`{}` is reserved for the end of input", symbol),
            CompileErrorType::EmptyGrammar => write!(f, "No rules found"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location {
            file,
            line: 0
        },
        error: CompileErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// A rule whose alternatives are still unsplit chunks of text
#[derive(PartialEq, Debug)]
struct RawRule {
    symbol: String,
    alternatives: Vec<Vec<String>>,
    location: Location
}

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location
}

fn parse_line(tokens: &[Token], location: Location) -> Result<RawRule> {
    let symbol = match tokens {
        [Token::Chunk(symbol), Token::Arrow, ..] => Ok(symbol.clone()),
        [Token::Chunk(_), Token::Chunk(_), ..] if tokens.contains(&Token::Arrow) => Err(CompileErrorType::MissingNonterminal),
        [Token::Arrow, ..] | [Token::Or, ..] => Err(CompileErrorType::MissingNonterminal),
        _ => Err(CompileErrorType::MissingArrow)
    }?;

    let rest = &tokens[2..];
    if rest.contains(&Token::Arrow) {
        return Err(CompileErrorType::UnexpectedArrow);
    }

    let alternatives = rest
        .split(|t| *t == Token::Or)
        .map(|alternative| alternative.iter().filter_map(|t| match t {
            Token::Chunk(text) => Some(text.clone()),
            _ => None
        }).collect())
        .collect();

    return Ok(RawRule {
        symbol,
        alternatives,
        location
    });
}

fn parse_alternative(chunks: &[String], nonterminals: &[String]) -> Result<Alternative> {
    if let [only] = chunks {
        if EPSILON_MARKERS.contains(&only.as_str()) {
            return Ok(Vec::new());
        }
    }

    let names = chunks.iter().flat_map(|chunk| split_chunk(chunk, nonterminals)).collect_vec();
    if names.iter().any(|name| STRICT_EPSILON_MARKERS.contains(&name.as_str())) {
        return Err(CompileErrorType::MisplacedEpsilon);
    }

    Ok(names.into_iter().map(|name| {
        if nonterminals.contains(&name) {
            Symbol::Nonterminal(name)
        } else {
            Symbol::Terminal(name)
        }
    }).collect())
}

fn resolve_rule(raw: RawRule, nonterminals: &[String]) -> LineResult<Rule> {
    let rewrite = raw.alternatives
        .iter()
        .map(|alternative| parse_alternative(alternative, nonterminals))
        .collect::<Result<Rewrite>>()
        .map_err(|error| CompileError { location: raw.location.clone(), error })?;

    Ok(Rule {
        symbol: raw.symbol,
        rewrite,
        location: raw.location
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<RawRule> {
    parse_line(&lexer::lex_line(line), location.clone())
        .map_err(|error| CompileError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';') && !line.starts_with('#')
}

// Splits results into values and the collected errors
fn collect_results<T>(results: impl Iterator<Item = LineResult<T>>) -> FileResult<Vec<T>> {
    let (values, errors): (Vec<_>, Vec<_>) = results.partition(LineResult::is_ok);
    if errors.len() > 0 {
        return Err(errors.into_iter().filter_map(LineResult::err).collect_vec());
    }
    Ok(values.into_iter().filter_map(LineResult::ok).collect_vec())
}

fn grammar_from_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, path: &PathBuf) -> FileResult<Grammar> {
    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: path.clone(),
            line: num
        }))
    });
    let raw_rules = collect_results(parsed_lines)?;

    if raw_rules.is_empty() {
        return Err(vec![CompileError {
            location: Location { file: path.clone(), line: 0 },
            error: CompileErrorType::EmptyGrammar
        }]);
    }

    // Every left-hand side is a nonterminal; everything else is a terminal
    let nonterminals = raw_rules.iter().map(|rule| rule.symbol.clone()).unique().collect_vec();
    let rules = collect_results(raw_rules.into_iter().map(|raw| resolve_rule(raw, &nonterminals)))?;

    verify_rules(&rules)?;

    return Ok(Grammar::from_rules(rules.into_iter().map(|rule| (rule.symbol, rule.rewrite))));
}

// Returns an iterator over the lines of a file, with the io errors wrapped
// in CompileError and enumerated
fn file_line_nums<'a>(file: File, path: &'a PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

pub fn parse_file(path: &PathBuf) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;
    grammar_from_lines(file_line_nums(file, path), path)
}

// Parses grammar text that did not come from a file.
pub fn parse_grammar(text: &str) -> FileResult<Grammar> {
    let lines = text
        .lines()
        .map(str::to_string)
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, Ok(line)));
    grammar_from_lines(lines, &Location::inline(0).file)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::iter::zip;

    use super::*;

    fn s_nonterminal(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    fn s_terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn parse_normal_alternative() {
        let nonterminals = strings(&["E", "E'", "T"]);
        let lines = vec![
            strings(&["T", "E'"]),
            strings(&["+", "T", "E'"]),
            strings(&["e"]),
            strings(&["(E)"]),
            strings(&["i", "c", "t", "E", "e", "E"])
        ];
        let answers = vec![
            vec![s_nonterminal("T"), s_nonterminal("E'")],
            vec![s_terminal("+"), s_nonterminal("T"), s_nonterminal("E'")],
            vec![],
            vec![s_terminal("("), s_nonterminal("E"), s_terminal(")")],
            vec![
                s_terminal("i"),
                s_terminal("c"),
                s_terminal("t"),
                s_nonterminal("E"),
                s_terminal("e"),
                s_nonterminal("E")
            ]
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_alternative(&line, &nonterminals).unwrap(), answer);
        }
    }

    #[test]
    fn parse_malformed_alternative() {
        assert_eq!(parse_alternative(&strings(&["a", "ε"]), &[]), Err(CompileErrorType::MisplacedEpsilon));
        assert_eq!(parse_alternative(&strings(&["λ", "b"]), &[]), Err(CompileErrorType::MisplacedEpsilon));
    }

    #[test]
    fn parse_normal_line() {
        let lexed = lexer::lex_line("F -> ( E ) | id");
        let location = Location::inline(3);

        let answer = RawRule {
            symbol: "F".to_string(),
            alternatives: vec![strings(&["(", "E", ")"]), strings(&["id"])],
            location: location.clone()
        };

        assert_eq!(parse_line(&lexed[..], location), Ok(answer));
    }

    #[test]
    fn parse_malformed_line() {
        let lines = vec![
            "alpha bravo charlie",
            "A -> b -> c",
            "-> b c",
            "A B -> c",
            "| -> c"
        ];
        let answers = vec![
            CompileErrorType::MissingArrow,
            CompileErrorType::UnexpectedArrow,
            CompileErrorType::MissingNonterminal,
            CompileErrorType::MissingNonterminal,
            CompileErrorType::MissingNonterminal
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_line(&lexer::lex_line(line), Location::inline(1)), Err(answer));
        }
    }

    #[test]
    fn repeated_nonterminals_are_merged() {
        let grammar = parse_grammar("S -> a S\n\n# comment\nS -> b").unwrap();

        assert_eq!(grammar.nonterminals, strings(&["S"]));
        assert_eq!(grammar.alternatives("S"), &[vec![s_terminal("a"), s_nonterminal("S")], vec![s_terminal("b")]]);
    }

    #[test]
    fn empty_text_is_an_error() {
        let errors = parse_grammar("\n; nothing here\n").unwrap_err();

        assert_eq!(errors, vec![CompileError {
            location: Location::inline(0),
            error: CompileErrorType::EmptyGrammar
        }]);
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/expression.grammar");
        let example_parsed = parse_file(&example_path).unwrap();

        let mut rules = HashMap::new();
        rules.insert("E".to_string(), vec![vec![s_nonterminal("T"), s_nonterminal("E'")]]);
        rules.insert("E'".to_string(), vec![
            vec![s_terminal("+"), s_nonterminal("T"), s_nonterminal("E'")],
            vec![]
        ]);
        rules.insert("T".to_string(), vec![vec![s_nonterminal("F"), s_nonterminal("T'")]]);
        rules.insert("T'".to_string(), vec![
            vec![s_terminal("*"), s_nonterminal("F"), s_nonterminal("T'")],
            vec![]
        ]);
        rules.insert("F".to_string(), vec![
            vec![s_terminal("("), s_nonterminal("E"), s_terminal(")")],
            vec![s_terminal("id")]
        ]);

        assert_eq!(example_parsed, Grammar {
            start_symbol: "E".to_string(),
            nonterminals: strings(&["E", "E'", "T", "T'", "F"]),
            rules
        });
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.grammar");
        let example_parsed = parse_file(&example_path).unwrap_err();

        assert_eq!(example_parsed, vec![
            CompileError {
                location: Location {
                    file: example_path.clone(),
                    line: 3
                },
                error: CompileErrorType::MissingArrow
            },
            CompileError {
                location: Location {
                    file: example_path,
                    line: 6
                },
                error: CompileErrorType::UnexpectedArrow
            }
        ]);
    }

    #[test]
    fn missing_file() {
        let path = PathBuf::from("example_data/does_not_exist.grammar");

        assert_eq!(parse_file(&path).unwrap_err(), vec![
            io_error(std::io::Error::from(std::io::ErrorKind::NotFound), path.clone())
        ]);
    }
}
