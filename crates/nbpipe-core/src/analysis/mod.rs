//! Static analysis of tagged notebook cells.
//!
//! Tagged cells are parsed, never executed. Each grammar accepts a narrow
//! statement shape and rejects everything else:
//!
//! ```text
//! pipeline-parameters    name = <literal>          -> name: (type, literal text)
//! pipeline-metrics       print(name)               -> name
//!                        print("name", <value>)    -> name
//! ```
//!
//! Literals are numbers, strings, `True`/`False`/`None`, and
//! lists/tuples/dicts/sets made of literals.

mod assignments;
mod lexer;
mod metrics;
mod parser;

pub use assignments::{ParameterValue, PipelineParameters, parameter_rows, parse_assignments};
pub use metrics::{PipelineMetrics, parse_metrics, sanitize_metric_name};
pub use parser::LiteralKind;
