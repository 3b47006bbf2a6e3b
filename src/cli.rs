use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Limits;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Maximum steps of the LL(1) simulation
    #[arg(long, global = true, value_name = "STEPS", default_value_t = Limits::default().max_steps)]
    pub max_steps: usize,

    /// Maximum states explored by the search solvers
    #[arg(long, global = true, value_name = "STATES", default_value_t = Limits::default().max_states)]
    pub max_states: usize,

    /// Longest derivation searched for
    #[arg(long, global = true, value_name = "STEPS", default_value_t = Limits::default().max_depth)]
    pub max_depth: usize,

    /// Print intermediate results to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool
}

impl Cli {
    pub fn limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            max_states: self.max_states,
            max_depth: self.max_depth,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Build an NFA from a regular expression with Thompson's construction
    Nfa {
        /// Literals combined with `|` (or `+`), `*`, parentheses and concatenation
        regex: String,

        /// Print a Graphviz description instead of the transition table
        #[arg(long)]
        dot: bool
    },

    /// Convert an NFA to a DFA with the subset construction
    Dfa {
        /// File describing the NFA (`-` reads standard input)
        #[arg(required_unless_present = "regex")]
        file: Option<PathBuf>,

        /// Build the NFA from a regular expression instead
        #[arg(short, long, conflicts_with = "file")]
        regex: Option<String>,

        /// Print a Graphviz description instead of the transition table
        #[arg(long)]
        dot: bool,

        /// Word to run through both automata (repeatable)
        #[arg(short, long = "test", value_name = "WORD")]
        tests: Vec<String>
    },

    /// Compute FIRST and FOLLOW sets
    Sets {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf
    },

    /// Build the LL(1) parsing table and optionally parse a string
    Ll1 {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// String to parse with the table
        #[arg(short, long)]
        input: Option<String>
    },

    /// Find the shortest derivations of a string
    Derive {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// String to derive
        input: String,

        /// Expand the rightmost nonterminal instead of the leftmost
        #[arg(long)]
        rightmost: bool
    },

    /// Check a string for multiple shortest leftmost derivations
    Ambiguity {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// String to check
        input: String
    },

    /// Search for a shift-reduce parse of a string
    ShiftReduce {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// String to parse
        input: String
    },

    /// Reduce a whole string back to the start symbol
    Reduce {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// String to reduce
        input: String
    },

    /// Remove direct left recursion
    LeftRecursion {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf
    },

    /// Factor out common prefixes of alternatives
    LeftFactor {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf
    },

    /// Generate random sentences
    Generate {
        /// File containing the grammar (`-` reads standard input)
        file: PathBuf,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,

        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32
    },

    /// Convert an arithmetic expression to postfix step by step
    Postfix {
        /// Operands joined by `+ - * / % ^` and parentheses
        expression: String
    },

    /// Generate three-address code for an arithmetic expression
    Tac {
        /// Operands joined by `+ - * / % ^` and parentheses
        expression: String
    },

    /// Build the DAG of an arithmetic expression with value numbering
    Dag {
        /// Operands joined by `+ - * / % ^` and parentheses
        expression: String,

        /// Print a Graphviz description instead of the node table
        #[arg(long)]
        dot: bool
    },

    /// Remove unreachable lines and unused assignments from source code
    DeadCode {
        /// File containing the code (`-` reads standard input)
        file: PathBuf
    },

    /// Evaluate an expression with a syntax-directed definition
    Sdt {
        /// Integers joined by `+`, `*` and parentheses, optionally ending in `$`
        expression: String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_limits() {
        let cli = Cli::parse_from(["parselab", "derive", "g.grammar", "id", "--max-depth", "8"]);

        assert_eq!(cli.limits(), Limits { max_depth: 8, ..Limits::default() });
        assert!(matches!(cli.command, Command::Derive { rightmost: false, .. }));
    }

    #[test]
    fn dfa_needs_a_source() {
        assert!(Cli::try_parse_from(["parselab", "dfa"]).is_err());
        assert!(Cli::try_parse_from(["parselab", "dfa", "--regex", "ab"]).is_ok());
        assert!(Cli::try_parse_from(["parselab", "dfa", "m.nfa", "--regex", "ab"]).is_err());
    }

    #[test]
    fn back_end_commands() {
        let cli = Cli::parse_from(["parselab", "dag", "a * a", "--dot"]);
        assert!(matches!(cli.command, Command::Dag { dot: true, .. }));

        let cli = Cli::parse_from(["parselab", "dead-code", "-"]);
        assert!(matches!(&cli.command, Command::DeadCode { file } if file.as_os_str() == "-"));

        assert!(Cli::try_parse_from(["parselab", "sdt"]).is_err());
    }
}
