//! Safe arithmetic/symbolic expression evaluation.
//!
//! No code-execution path exists: expressions are parsed and evaluated by
//! `evalexpr`'s closed numeric grammar, never handed to a shell or an
//! interpreter. A blocklist rejects suspicious identifiers before the
//! expression is even parsed, mirroring the shell tool's defense-in-depth
//! shape (reject first, then run under a bound).

use std::time::Duration;

/// Identifiers that must never appear in an expression, even though the
/// evaluator itself cannot execute them — rejecting early gives a clear,
/// fast "illegal" error instead of a confusing parse failure.
const BLOCKED_IDENTIFIERS: &[&str] = &["import", "exec", "eval", "open", "__", "file"];

const MAX_EXPRESSION_LEN: usize = 500;
const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    #[error("expression exceeds {0} characters")]
    TooLong(usize),
    #[error("illegal identifier '{0}' in expression")]
    IllegalIdentifier(String),
    #[error("evaluation exceeded the {0:?} wall-clock cap")]
    Timeout(Duration),
    #[error("evaluation failed: {0}")]
    Eval(String),
}

fn is_blocked(expression: &str) -> Option<&'static str> {
    let lower = expression.to_lowercase();
    for pattern in BLOCKED_IDENTIFIERS {
        if lower.contains(pattern) {
            return Some(pattern);
        }
    }
    None
}

/// Evaluate a numeric/symbolic expression, returning its formatted result.
pub fn python_calculator(expression: &str) -> Result<String, CalculatorError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(CalculatorError::TooLong(MAX_EXPRESSION_LEN));
    }

    if let Some(pattern) = is_blocked(expression) {
        return Err(CalculatorError::IllegalIdentifier(pattern.to_string()));
    }

    let expr = expression.to_string();
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let result = evalexpr::eval(&expr).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    match rx.recv_timeout(TIMEOUT) {
        Ok(Ok(value)) => Ok(value.to_string()),
        Ok(Err(e)) => Err(CalculatorError::Eval(e)),
        Err(_) => Err(CalculatorError::Timeout(TIMEOUT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_plain_arithmetic() {
        let result = python_calculator("2 + 2 * 3").unwrap();
        assert_eq!(result, "8");
    }

    #[test]
    fn rejects_import_attempt_per_scenario_s5() {
        let err = python_calculator("__import__('os').system('ls')").unwrap_err();
        assert!(matches!(err, CalculatorError::IllegalIdentifier(_)));
    }

    #[test]
    fn rejects_eval_identifier() {
        let err = python_calculator("eval('1+1')").unwrap_err();
        assert!(matches!(err, CalculatorError::IllegalIdentifier(_)));
    }

    #[test]
    fn rejects_overlong_expressions() {
        let expr = "1+".repeat(300);
        assert!(matches!(
            python_calculator(&expr),
            Err(CalculatorError::TooLong(_))
        ));
    }
}
