//! Static parsing of `pipeline-parameters` cells.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::lexer::TokenKind;
use super::parser::{LiteralKind, Parser, is_keyword};
use crate::error::ParseError;

/// Type and literal text of one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Inferred type of the literal.
    #[serde(rename = "type")]
    pub kind: LiteralKind,
    /// The literal exactly as written in the cell.
    pub value: String,
}

/// Parameters in declaration order.
pub type PipelineParameters = IndexMap<String, ParameterValue>;

const AUGMENTED: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", "&=", "|=", "^=", ">>=", "<<=", "@=",
];

/// Parse a block of `name = literal` statements without evaluating it.
///
/// A name assigned twice keeps its first position and takes the last value.
pub fn parse_assignments(source: &str) -> Result<PipelineParameters, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut parameters = PipelineParameters::new();

    loop {
        parser.skip_separators();
        if parser.at_end() {
            break;
        }
        let (name, value) = assignment(&mut parser)?;
        parameters.insert(name, value);
    }

    Ok(parameters)
}

/// Flatten parameters into `[name, type, value]` rows.
pub fn parameter_rows(parameters: &PipelineParameters) -> Vec<[String; 3]> {
    parameters
        .iter()
        .map(|(name, p)| [name.clone(), p.kind.type_name().to_string(), p.value.clone()])
        .collect()
}

fn assignment(parser: &mut Parser<'_>) -> Result<(String, ParameterValue), ParseError> {
    let target = parser.advance();
    let name = match &target.kind {
        TokenKind::Name(name) if !is_keyword(name) => name.clone(),
        _ => {
            return Err(parser.error_at(
                &target,
                format!(
                    "expected an assignment statement, found {}",
                    parser.describe(&target)
                ),
            ));
        }
    };

    let op = parser.peek().clone();
    match op.kind {
        TokenKind::Punct("=") => {
            parser.advance();
        }
        TokenKind::Punct(",") => {
            return Err(parser.error_at(&op, "only single-name assignments are supported"));
        }
        TokenKind::Punct(":") => {
            return Err(parser.error_at(&op, "annotated assignments are not supported"));
        }
        TokenKind::Punct(p) if AUGMENTED.contains(&p) => {
            return Err(parser.error_at(
                &op,
                format!("augmented assignment `{p}` is not supported"),
            ));
        }
        _ => {
            return Err(parser.error_at(
                &op,
                format!("expected `=` after `{name}`, found {}", parser.describe(&op)),
            ));
        }
    }

    let literal = parser.literal_or_tuple()?;
    if parser.is_punct("=") {
        let eq = parser.peek().clone();
        return Err(parser.error_at(&eq, "chained assignments are not supported"));
    }
    parser.end_statement()?;

    Ok((
        name,
        ParameterValue {
            kind: literal.kind,
            value: parser.slice(&literal).trim().to_string(),
        },
    ))
}
