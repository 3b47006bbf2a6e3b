/*
    This module runs one subcommand and prints its results
*/

use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::automata::dot::{dfa_to_dot, nfa_to_dot};
use crate::automata::regex::{preprocess, regex_to_nfa, thompson, to_postfix, RegexErrorType};
use crate::automata::subset::subset_construction;
use crate::automata::text::{parse_nfa, parse_nfa_file, NfaError, NfaErrorType, NfaErrors};
use crate::automata::Nfa;
use crate::cli::{Cli, Command};
use crate::config::Limits;
use crate::error_handling::{note, report, warn, Location};
use crate::generator::{generate, generate_with_override, GenerateErrorType};
use crate::grammar::first_follow;
use crate::grammar::transform::{eliminate_left_recursion, left_factor};
use crate::grammar::Grammar;
use crate::ir::dag::{build_dag, dag_to_dot};
use crate::ir::postfix::infix_to_postfix;
use crate::ir::tac::{generate_tac, render_quadruples, render_triples};
use crate::ir::ExprErrorType;
use crate::ll1::simulate::{simulate, ParseErrorType};
use crate::ll1::table::ParseTable;
use crate::optimize::dead_code::eliminate_dead_code;
use crate::parser::input::{tokenize_input, TokenizeErrorType};
use crate::parser::{parse_file, parse_grammar, CompileError, CompileErrorType, CompileErrors};
use crate::sdt::{evaluate, render_definition, SdtErrorType};
use crate::solver::derivation::{check_ambiguity, shortest_derivations, Strategy, Verdict};
use crate::solver::shift_reduce::{reduce_to_start, render_reductions, shift_reduce};
use crate::solver::SearchErrorType;
use crate::trace::render_trace;

pub enum Failure {
    Grammar(CompileErrors),
    Automaton(NfaErrors),
    Regex(RegexErrorType),
    Tokenize(TokenizeErrorType),
    Parse(ParseErrorType),
    Search(SearchErrorType),
    Generate(GenerateErrorType),
    Expr(ExprErrorType),
    Sdt(SdtErrorType),
    Read(PathBuf, std::io::Error),
}

impl Failure {
    pub fn report(&self) {
        match self {
            Failure::Grammar(errors) => errors.iter().for_each(|error| eprintln!("{}", error)),
            Failure::Automaton(errors) => errors.iter().for_each(|error| eprintln!("{}", error)),
            Failure::Regex(error) => report(error),
            Failure::Tokenize(error) => report(error),
            Failure::Parse(error) => report(error),
            Failure::Search(error @ SearchErrorType::BoundReached(_)) => warn(error),
            Failure::Search(error) => report(error),
            Failure::Generate(error) => report(error),
            Failure::Expr(error) => report(error),
            Failure::Sdt(error) => report(error),
            Failure::Read(path, error) => report(&format!("Could not read {}: {}", path.display(), error)),
        }
    }
}

impl From<CompileErrors> for Failure {
    fn from(errors: CompileErrors) -> Self {
        Failure::Grammar(errors)
    }
}

impl From<NfaErrors> for Failure {
    fn from(errors: NfaErrors) -> Self {
        Failure::Automaton(errors)
    }
}

impl From<RegexErrorType> for Failure {
    fn from(error: RegexErrorType) -> Self {
        Failure::Regex(error)
    }
}

impl From<TokenizeErrorType> for Failure {
    fn from(error: TokenizeErrorType) -> Self {
        Failure::Tokenize(error)
    }
}

impl From<ParseErrorType> for Failure {
    fn from(error: ParseErrorType) -> Self {
        Failure::Parse(error)
    }
}

impl From<SearchErrorType> for Failure {
    fn from(error: SearchErrorType) -> Self {
        Failure::Search(error)
    }
}

impl From<GenerateErrorType> for Failure {
    fn from(error: GenerateErrorType) -> Self {
        Failure::Generate(error)
    }
}

impl From<ExprErrorType> for Failure {
    fn from(error: ExprErrorType) -> Self {
        Failure::Expr(error)
    }
}

impl From<SdtErrorType> for Failure {
    fn from(error: SdtErrorType) -> Self {
        Failure::Sdt(error)
    }
}

type Outcome = Result<(), Failure>;

fn from_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn load_grammar(path: &PathBuf) -> Result<Grammar, Failure> {
    if !from_stdin(path) {
        return Ok(parse_file(path)?);
    }
    let text = std::io::read_to_string(std::io::stdin()).map_err(|e| vec![CompileError {
        location: Location::inline(0),
        error: CompileErrorType::FileError(e)
    }])?;
    Ok(parse_grammar(&text)?)
}

fn load_nfa(path: &PathBuf) -> Result<Nfa, Failure> {
    if !from_stdin(path) {
        return Ok(parse_nfa_file(path)?);
    }
    let text = std::io::read_to_string(std::io::stdin()).map_err(|e| vec![NfaError {
        location: Location::inline(0),
        error: NfaErrorType::FileError(e)
    }])?;
    Ok(parse_nfa(&text)?)
}

fn load_text(path: &PathBuf) -> Result<String, Failure> {
    let text = if from_stdin(path) {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    text.map_err(|e| Failure::Read(path.clone(), e))
}

fn regex_nfa(regex: &str, verbose: bool) -> Result<Nfa, Failure> {
    if !verbose {
        return Ok(regex_to_nfa(regex)?);
    }
    let postfix = to_postfix(&preprocess(regex)?)?;
    note(&format!("postfix: {}", postfix));
    Ok(thompson(&postfix)?)
}

fn tokens_of(grammar: &Grammar, input: &str, verbose: bool) -> Result<Vec<String>, Failure> {
    let tokens = tokenize_input(input, &grammar.terminals())?;
    if verbose {
        note(&format!("tokens: {}", tokens.iter().map(|token| format!("`{}`", token)).join(" ")));
    }
    Ok(tokens)
}

fn verdict(accepted: bool) -> &'static str {
    if accepted { "accepted" } else { "rejected" }
}

fn run_nfa(regex: &str, dot: bool, verbose: bool) -> Outcome {
    let nfa = regex_nfa(regex, verbose)?;

    if dot {
        print!("{}", nfa_to_dot(&nfa));
    } else {
        print!("{}\n{}", nfa.describe(), nfa);
    }
    Ok(())
}

fn run_dfa(file: &Option<PathBuf>, regex: &Option<String>, dot: bool, tests: &[String], verbose: bool) -> Outcome {
    let nfa = match regex {
        Some(regex) => regex_nfa(regex, verbose)?,
        // clap guarantees a file when there is no regex
        None => load_nfa(&file.clone().unwrap_or_default())?,
    };
    let dfa = subset_construction(&nfa);
    if verbose {
        note(&format!("{} DFA states, dead state: {}", dfa.state_count(), if dfa.dead_state().is_some() { "yes" } else { "no" }));
    }

    if dot {
        print!("{}\n{}", nfa_to_dot(&nfa), dfa_to_dot(&dfa));
    } else {
        print!("{}\nNFA\n{}\nDFA\n{}", nfa.describe(), nfa, dfa);
    }

    for word in tests {
        // A word with a symbol outside the alphabet is rejected by both
        let (by_nfa, by_dfa) = match tokenize_input(word, &nfa.alphabet()) {
            Ok(symbols) => (nfa.accepts(&symbols), dfa.accepts(&symbols)),
            Err(TokenizeErrorType::UnknownSymbol { .. }) => (false, false),
            Err(error) => return Err(error.into()),
        };
        if by_nfa != by_dfa {
            warn(&format!("NFA and DFA disagree on `{}`", word));
        }
        println!("`{}`: NFA {}, DFA {}", word, verdict(by_nfa), verdict(by_dfa));
    }
    Ok(())
}

fn run_sets(file: &PathBuf, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let sets = first_follow::compute(&grammar);

    if verbose {
        note(&format!(
            "{} productions; FIRST took {} passes, FOLLOW took {} passes",
            grammar.production_count(),
            sets.first_passes,
            sets.follow_passes
        ));
    }
    print!("{}", sets);
    Ok(())
}

fn run_ll1(file: &PathBuf, input: &Option<String>, limits: &Limits, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let table = ParseTable::build(&grammar, &first_follow::compute(&grammar));

    for conflict in table.conflicts() {
        warn(&conflict);
    }
    if !table.is_ll1() {
        warn(&"The grammar is not LL(1); the parser uses the first production of each cell");
    }
    print!("{}", table);

    let Some(input) = input else {
        return Ok(());
    };
    let tokens = tokens_of(&grammar, input, verbose)?;
    let simulation = simulate(&table, &grammar.start_symbol, &tokens, limits);

    print!("\n{}", render_trace(&simulation.steps));
    Ok(simulation.outcome?)
}

fn run_derive(file: &PathBuf, input: &str, rightmost: bool, limits: &Limits, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let tokens = tokens_of(&grammar, input, verbose)?;
    let strategy = if rightmost { Strategy::Rightmost } else { Strategy::Leftmost };
    let derivations = shortest_derivations(&grammar, &tokens, strategy, limits)?;

    for derivation in derivations {
        println!("{}  ({} steps)", derivation, derivation.steps());
    }
    Ok(())
}

fn run_ambiguity(file: &PathBuf, input: &str, limits: &Limits, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let tokens = tokens_of(&grammar, input, verbose)?;
    let ambiguity = check_ambiguity(&grammar, &tokens, limits)?;

    match ambiguity.verdict {
        Verdict::Ambiguous(count) => println!("Ambiguous: {} distinct shortest leftmost derivations", count),
        Verdict::Unambiguous => println!("No ambiguity found: one shortest leftmost derivation"),
    }
    for (number, derivation) in ambiguity.derivations.iter().enumerate() {
        println!("{}. {}", number + 1, derivation);
    }
    Ok(())
}

fn run_shift_reduce(file: &PathBuf, input: &str, limits: &Limits, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let tokens = tokens_of(&grammar, input, verbose)?;

    print!("{}", render_trace(&shift_reduce(&grammar, &tokens, limits)?));
    Ok(())
}

fn run_reduce(file: &PathBuf, input: &str, limits: &Limits, verbose: bool) -> Outcome {
    let grammar = load_grammar(file)?;
    let tokens = tokens_of(&grammar, input, verbose)?;

    print!("{}", render_reductions(&reduce_to_start(&grammar, &tokens, limits)?));
    Ok(())
}

fn run_generate(file: &PathBuf, start: &Option<String>, amount: u32, limits: &Limits) -> Outcome {
    let grammar = load_grammar(file)?;
    let mut rng = rand::thread_rng();

    for _ in 0..amount {
        let sentence = match start {
            Some(start) => generate_with_override(&grammar, start, &mut rng, limits.max_depth)?,
            None => generate(&grammar, &mut rng, limits.max_depth)?,
        };
        println!("{}", sentence.join(" "));
    }
    Ok(())
}

fn run_postfix(expression: &str) -> Outcome {
    let walk = infix_to_postfix(expression)?;

    for (number, step) in walk.steps.iter().enumerate() {
        println!("{}. {}", number + 1, step);
    }
    println!("postfix: {}", walk.postfix);
    Ok(())
}

fn run_tac(expression: &str) -> Outcome {
    let instructions = generate_tac(expression)?;
    if instructions.is_empty() {
        note(&"A single operand needs no instructions");
        return Ok(());
    }

    for instruction in &instructions {
        println!("{}", instruction);
    }
    print!("\nQuadruples\n{}\nTriples\n{}", render_quadruples(&instructions), render_triples(&instructions));
    Ok(())
}

fn run_dag(expression: &str, dot: bool, verbose: bool) -> Outcome {
    let dag = build_dag(expression)?;
    if verbose {
        note(&format!("{} DAG nodes for a syntax tree of {}", dag.nodes.len(), dag.tree_size()));
    }

    if dot {
        print!("{}", dag_to_dot(&dag));
        return Ok(());
    }
    print!("{}", dag);
    for id in dag.common_subexpressions() {
        println!("shared: n{} = {}", id, dag.expression(id));
    }
    Ok(())
}

fn run_dead_code(file: &PathBuf, verbose: bool) -> Outcome {
    let elimination = eliminate_dead_code(&load_text(file)?);

    for line in &elimination.code {
        println!("{}", line);
    }
    if verbose {
        elimination.removals.iter().for_each(|removal| note(removal));
    } else if !elimination.removals.is_empty() {
        note(&format!("{} lines removed", elimination.removals.len()));
    }
    Ok(())
}

fn run_sdt(expression: &str, verbose: bool) -> Outcome {
    let evaluation = evaluate(expression)?;
    if verbose {
        note(&format!("definition:\n{}", render_definition()));
    }

    for (rule, value) in &evaluation.actions {
        println!("{}  →  {}", rule, value);
    }
    print!("\n{}", evaluation.tree);
    println!("value: {}", evaluation.value());
    Ok(())
}

pub fn run(cli: &Cli) -> Outcome {
    let limits = cli.limits();
    let verbose = cli.verbose;

    match &cli.command {
        Command::Nfa { regex, dot } => run_nfa(regex, *dot, verbose),
        Command::Dfa { file, regex, dot, tests } => run_dfa(file, regex, *dot, tests, verbose),
        Command::Sets { file } => run_sets(file, verbose),
        Command::Ll1 { file, input } => run_ll1(file, input, &limits, verbose),
        Command::Derive { file, input, rightmost } => run_derive(file, input, *rightmost, &limits, verbose),
        Command::Ambiguity { file, input } => run_ambiguity(file, input, &limits, verbose),
        Command::ShiftReduce { file, input } => run_shift_reduce(file, input, &limits, verbose),
        Command::Reduce { file, input } => run_reduce(file, input, &limits, verbose),
        Command::LeftRecursion { file } => {
            print!("{}", eliminate_left_recursion(&load_grammar(file)?));
            Ok(())
        }
        Command::LeftFactor { file } => {
            print!("{}", left_factor(&load_grammar(file)?));
            Ok(())
        }
        Command::Generate { file, start, amount } => run_generate(file, start, *amount, &limits),
        Command::Postfix { expression } => run_postfix(expression),
        Command::Tac { expression } => run_tac(expression),
        Command::Dag { expression, dot } => run_dag(expression, *dot, verbose),
        Command::DeadCode { file } => run_dead_code(file, verbose),
        Command::Sdt { expression } => run_sdt(expression, verbose),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn run_args(args: &[&str]) -> Outcome {
        run(&Cli::parse_from(std::iter::once("parselab").chain(args.iter().copied())))
    }

    #[test]
    fn commands_on_example_files() {
        let successes: [&[&str]; 15] = [
            &["nfa", "(a|b)*abb"],
            &["dfa", "example_data/ends_in_ab.nfa", "--test", "aab", "--test", "ba"],
            &["dfa", "--regex", "a*b", "--dot"],
            &["sets", "example_data/expression.grammar"],
            &["ll1", "example_data/expression.grammar", "--input", "id + id * id"],
            &["ambiguity", "example_data/ambiguous.grammar", "id + id * id"],
            &["shift-reduce", "example_data/parentheses.grammar", "()()"],
            &["left-recursion", "example_data/left_recursive.grammar"],
            &["generate", "example_data/expression.grammar", "-n", "3"],
            &["postfix", "(a + b) * c"],
            &["tac", "a + b * c - d"],
            &["dag", "a + a * (b - c)", "--dot"],
            &["dag", "x"],
            &["dead-code", "example_data/dead_code.c", "-v"],
            &["sdt", "(1 + 2) * 3 $"],
        ];

        for args in successes {
            assert!(run_args(args).is_ok(), "{:?} failed", args);
        }
    }

    #[test]
    fn failures_are_classified() {
        assert!(matches!(run_args(&["nfa", "(ab"]), Err(Failure::Regex(RegexErrorType::UnbalancedParenthesis))));
        assert!(matches!(run_args(&["sets", "example_data/malformed.grammar"]), Err(Failure::Grammar(errors)) if errors.len() == 2));
        assert!(matches!(run_args(&["dfa", "example_data/missing.nfa"]), Err(Failure::Automaton(_))));
        assert!(matches!(
            run_args(&["ll1", "example_data/expression.grammar", "--input", "id +"]),
            Err(Failure::Parse(ParseErrorType::NoRule { .. }))
        ));
        assert!(matches!(
            run_args(&["derive", "example_data/expression.grammar", "id ?"]),
            Err(Failure::Tokenize(TokenizeErrorType::UnknownSymbol { .. }))
        ));
        assert!(matches!(run_args(&["tac", "a + (b"]), Err(Failure::Expr(ExprErrorType::UnbalancedParenthesis))));
        assert!(matches!(run_args(&["sdt", "2 - 1"]), Err(Failure::Sdt(SdtErrorType::UnexpectedCharacter('-')))));
        assert!(matches!(run_args(&["dead-code", "example_data/missing.c"]), Err(Failure::Read(..))));
    }
}
