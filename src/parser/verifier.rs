use crate::error_handling::Location;
use crate::grammar::{Alternative, END_MARKER};
use super::CompileErrorType::ReservedSymbol;
use super::{CompileError, CompileErrors, FileResult, Rule};

fn get_alternative_reserved_symbols(alternative: &Alternative, location: &Location) -> CompileErrors {
    alternative.iter()
        .filter(|symbol| symbol.name() == END_MARKER)
        .map(|symbol| CompileError {
            location: location.to_owned(),
            error: ReservedSymbol(symbol.name().to_owned())
        })
        .collect()
}

fn get_rule_reserved_symbols(rule: &Rule) -> CompileErrors {
    let mut errors = CompileErrors::new();

    if rule.symbol == END_MARKER {
        errors.push(CompileError {
            location: rule.location.to_owned(),
            error: ReservedSymbol(rule.symbol.to_owned())
        });
    }

    // Flatten the reserved symbols of each alternative into one list
    errors.extend(rule.rewrite.iter()
        .flat_map(|alternative| get_alternative_reserved_symbols(alternative, &rule.location)));

    errors
}

pub fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let mut errors = Vec::new();

    errors.extend(rules.iter().flat_map(get_rule_reserved_symbols));

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}
