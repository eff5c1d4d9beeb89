use std::collections::BTreeSet;

use meval::tokenizer::Token;
use meval::Expr;
use thiserror::Error;

/// Errors raised while handling infix math.
#[derive(Debug, Error)]
pub enum MathError {
    /// The math string is not a valid infix expression.
    #[error("Could not parse math '{math}': {message}")]
    ParseError { math: String, message: String },
}

/// Parses an infix math string into an expression in reverse polish order.
///
/// # Arguments
///
/// * `math` - The infix math, e.g. `k * S / (Km + S)`.
///
/// # Returns
///
/// Returns the parsed `Expr` or a `MathError` if the string is malformed.
pub fn parse_math(math: &str) -> Result<Expr, MathError> {
    math.parse::<Expr>().map_err(|e| MathError::ParseError {
        math: math.to_string(),
        message: e.to_string(),
    })
}

/// Extracts the identifiers referenced by an expression.
///
/// # Arguments
///
/// * `expr` - A reference to the parsed expression.
///
/// # Returns
///
/// Returns the identifiers in sorted order without duplicates.
pub fn extract_symbols(expr: &Expr) -> Vec<String> {
    let mut vars: BTreeSet<String> = BTreeSet::new();

    for token in expr.iter() {
        if let Token::Var(v) = token {
            vars.insert(v.clone());
        }
    }

    vars.into_iter().collect()
}
