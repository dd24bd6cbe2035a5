//! Static parsing of `pipeline-metrics` cells.

use std::collections::BTreeMap;

use super::lexer::TokenKind;
use super::parser::{Parser, is_keyword};
use crate::error::ParseError;

/// Metric name -> pipeline-safe metric identifier.
pub type PipelineMetrics = BTreeMap<String, String>;

/// One argument of a `print(...)` call.
enum Argument {
    /// A bare variable name.
    Variable(String),
    /// A single string literal.
    Label(String),
    /// Any other accepted value (dotted name or literal).
    Value,
}

/// Parse a block of `print(...)` statements into the metrics they report.
///
/// Accepts `print(variable)` and `print("metric_name", value)`. Values are
/// parsed but never evaluated. Repeated names collapse into one entry.
pub fn parse_metrics(source: &str) -> Result<PipelineMetrics, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut metrics = PipelineMetrics::new();

    loop {
        parser.skip_separators();
        if parser.at_end() {
            break;
        }
        let name = print_statement(&mut parser)?;
        let id = sanitize_metric_name(&name);
        metrics.insert(name, id);
    }

    Ok(metrics)
}

/// Lowercase `name` and replace anything outside `[a-z0-9-]` with `-`.
pub fn sanitize_metric_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    replaced.trim_matches('-').to_string()
}

fn print_statement(parser: &mut Parser<'_>) -> Result<String, ParseError> {
    let callee = parser.advance();
    if !matches!(&callee.kind, TokenKind::Name(name) if name == "print") {
        return Err(parser.error_at(
            &callee,
            format!("expected a `print(...)` statement, found {}", parser.describe(&callee)),
        ));
    }
    let open = parser.expect_punct("(", "`(` after `print`")?;

    let mut arguments = Vec::new();
    loop {
        if parser.eat_punct(")") {
            break;
        }
        arguments.push(argument(parser)?);
        if parser.eat_punct(")") {
            break;
        }
        parser.expect_punct(",", "`,` or `)`")?;
    }
    parser.end_statement()?;

    let name = match arguments.as_slice() {
        [Argument::Variable(name)] => name.clone(),
        [Argument::Label(label), _] => label.clone(),
        [] => return Err(parser.error_at(&open, "`print` needs the metric to report")),
        _ => {
            return Err(parser.error_at(
                &open,
                "expected `print(variable)` or `print(\"metric_name\", value)`",
            ));
        }
    };

    if name.is_empty() {
        return Err(parser.error_at(&open, "metric name must not be empty"));
    }
    if sanitize_metric_name(&name).is_empty() {
        return Err(parser.error_at(
            &open,
            format!("metric name `{name}` has no letters or digits"),
        ));
    }
    Ok(name)
}

fn argument(parser: &mut Parser<'_>) -> Result<Argument, ParseError> {
    let token = parser.peek().clone();
    match &token.kind {
        TokenKind::Name(name) if !matches!(name.as_str(), "True" | "False" | "None") => {
            if is_keyword(name) {
                return Err(parser.error_at(
                    &token,
                    format!("`{name}` is a keyword, not a metric value"),
                ));
            }
            if parser.peek_nth(1).kind == TokenKind::Punct("=") {
                return Err(parser.error_at(&token, "keyword arguments are not supported"));
            }
            parser.advance();
            if !parser.is_punct(".") {
                return Ok(Argument::Variable(name.clone()));
            }
            while parser.eat_punct(".") {
                let attr = parser.advance();
                if !matches!(&attr.kind, TokenKind::Name(field) if !is_keyword(field)) {
                    return Err(parser.error_at(
                        &attr,
                        format!("expected an attribute name, found {}", parser.describe(&attr)),
                    ));
                }
            }
            Ok(Argument::Value)
        }
        TokenKind::Str if !matches!(parser.peek_nth(1).kind, TokenKind::Str) => {
            parser.advance();
            Ok(Argument::Label(unquote(parser.text(&token))))
        }
        _ => {
            parser.literal()?;
            Ok(Argument::Value)
        }
    }
}

/// Contents of a single string literal token, with common escapes resolved.
fn unquote(literal: &str) -> String {
    let prefix_len = literal.find(['"', '\'']).unwrap_or(0);
    let raw = literal[..prefix_len].to_ascii_lowercase().contains('r');
    let body = &literal[prefix_len..];
    let quote_len = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = &body[quote_len..body.len() - quote_len];
    if raw {
        return inner.to_string();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_metrics() {
        let metrics = parse_metrics("print(accuracy)\nprint(F1_Score)").unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["accuracy"], "accuracy");
        assert_eq!(metrics["F1_Score"], "f1-score");
    }

    #[test]
    fn test_labelled_metrics() {
        let metrics = parse_metrics("print('val_loss', history.loss)\nprint(\"auc\", 0.9)").unwrap();
        let names: Vec<_> = metrics.keys().cloned().collect();
        assert_eq!(names, vec!["auc".to_string(), "val_loss".to_string()]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let metrics = parse_metrics("print(acc)\nprint(acc)\nprint('acc', acc)").unwrap();
        assert_eq!(metrics.len(), 1);
    }

    #[test]
    fn test_rejects_other_statements() {
        let err = parse_metrics("print(acc)\nacc = 1").unwrap_err();
        assert_eq!(err.line, 2);

        assert!(parse_metrics("log(acc)").is_err());
        assert!(parse_metrics("print()").is_err());
        assert!(parse_metrics("print(a, b)").is_err());
        assert!(parse_metrics("print(acc, file=f)").is_err());
        assert!(parse_metrics("print(compute())").is_err());
        assert!(parse_metrics("print('acc', model.score(x))").is_err());
        assert!(parse_metrics("print(acc) + 1").is_err());
        assert!(parse_metrics("print('', acc)").is_err());
    }

    #[test]
    fn test_rejects_keywords() {
        let err = parse_metrics("print(lambda)").unwrap_err();
        assert!(err.message.contains("`lambda` is a keyword"));

        assert!(parse_metrics("print('m', import)").is_err());
        assert!(parse_metrics("print('m', model.class)").is_err());
        assert_eq!(parse_metrics("print('m', None)").unwrap()["m"], "m");
    }

    #[test]
    fn test_rejects_names_without_identifier() {
        let err = parse_metrics("print(_)").unwrap_err();
        assert!(err.message.contains("`_` has no letters or digits"));

        assert!(parse_metrics("print('--', acc)").is_err());
        assert!(parse_metrics("print(__)").is_err());
    }

    #[test]
    fn test_sanitize_metric_name() {
        assert_eq!(sanitize_metric_name("Val_Accuracy"), "val-accuracy");
        assert_eq!(sanitize_metric_name("_private_"), "private");
        assert_eq!(sanitize_metric_name("top-5"), "top-5");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'acc'"), "acc");
        assert_eq!(unquote("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote("r'a\\n'"), "a\\n");
        assert_eq!(unquote("'''x'''"), "x");
    }
}
