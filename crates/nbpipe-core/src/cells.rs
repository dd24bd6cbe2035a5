//! Tagged cell lookup and extraction.

use crate::analysis::{PipelineMetrics, PipelineParameters, parse_assignments, parse_metrics};
use crate::error::{Error, Result};
use crate::notebook::Notebook;

/// Tag marking the cell(s) that declare pipeline parameters.
pub const PIPELINE_PARAMETERS_TAG: &str = "pipeline-parameters";

/// Tag marking the cell(s) that report pipeline metrics.
pub const PIPELINE_METRICS_TAG: &str = "pipeline-metrics";

/// Concatenate the source of every cell tagged with `tag`, in cell order.
///
/// Returns an empty string when no cell carries the tag.
pub fn tagged_source(notebook: &Notebook, tag: &str) -> String {
    notebook
        .cells
        .iter()
        .filter(|cell| cell.has_tag(tag))
        .map(|cell| cell.source.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Source of the `pipeline-parameters` cells.
pub fn pipeline_parameters_source(notebook: &Notebook) -> String {
    tagged_source(notebook, PIPELINE_PARAMETERS_TAG)
}

/// Source of the `pipeline-metrics` cells.
pub fn pipeline_metrics_source(notebook: &Notebook) -> String {
    tagged_source(notebook, PIPELINE_METRICS_TAG)
}

/// Parse the pipeline parameters declared in the notebook.
///
/// A notebook whose tagged source is empty or whitespace has no parameters
/// annotation and fails with [`Error::MissingAnnotation`].
pub fn extract_parameters(notebook: &Notebook) -> Result<PipelineParameters> {
    let source = pipeline_parameters_source(notebook);
    if source.trim().is_empty() {
        return Err(Error::MissingAnnotation {
            kind: "pipeline parameters",
            tag: PIPELINE_PARAMETERS_TAG,
        });
    }
    Ok(parse_assignments(&source)?)
}

/// Parse the pipeline metrics reported by the notebook.
pub fn extract_metrics(notebook: &Notebook) -> Result<PipelineMetrics> {
    let source = pipeline_metrics_source(notebook);
    if source.trim().is_empty() {
        return Err(Error::MissingAnnotation {
            kind: "pipeline metrics",
            tag: PIPELINE_METRICS_TAG,
        });
    }
    Ok(parse_metrics(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;

    fn notebook(cells: Vec<Cell>) -> Notebook {
        let mut nb = Notebook::new();
        nb.cells = cells;
        nb
    }

    #[test]
    fn test_no_tagged_cell() {
        let nb = notebook(vec![Cell::code("x = 1", &[]), Cell::code("y = 2", &["other"])]);
        assert_eq!(pipeline_parameters_source(&nb), "");
    }

    #[test]
    fn test_concatenates_in_order() {
        let nb = notebook(vec![
            Cell::code("a = 1", &[PIPELINE_PARAMETERS_TAG]),
            Cell::code("print(acc)", &[PIPELINE_METRICS_TAG]),
            Cell::code("b = 2", &["skip", PIPELINE_PARAMETERS_TAG]),
        ]);

        assert_eq!(pipeline_parameters_source(&nb), "a = 1\nb = 2");
        assert_eq!(pipeline_metrics_source(&nb), "print(acc)");
    }

    #[test]
    fn test_tagged_cell_with_empty_body() {
        let nb = notebook(vec![Cell::code("", &[PIPELINE_PARAMETERS_TAG])]);
        assert_eq!(pipeline_parameters_source(&nb), "");
    }

    #[test]
    fn test_extract_parameters() {
        let nb = notebook(vec![
            Cell::code("lr = 0.01\nepochs = 10", &[PIPELINE_PARAMETERS_TAG]),
            Cell::code("train()", &[]),
        ]);
        let params = extract_parameters(&nb).unwrap();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["lr", "epochs"]);
        assert_eq!(params["epochs"].value, "10");
    }

    #[test]
    fn test_extract_missing_annotation() {
        let nb = notebook(vec![Cell::code("  \n", &[PIPELINE_PARAMETERS_TAG])]);
        let err = extract_parameters(&nb).unwrap_err();
        assert!(err.is_annotation_error());
        assert_eq!(
            err.to_string(),
            "No pipeline parameters found. Please tag a cell of the notebook with the `pipeline-parameters` tag."
        );

        let err = extract_metrics(&nb).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAnnotation { tag: PIPELINE_METRICS_TAG, .. }
        ));
    }

    #[test]
    fn test_extract_malformed_cell() {
        let nb = notebook(vec![Cell::code("x = foo()", &[PIPELINE_PARAMETERS_TAG])]);
        let err = extract_parameters(&nb).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_extract_metrics() {
        let nb = notebook(vec![Cell::code("print(accuracy)", &[PIPELINE_METRICS_TAG])]);
        let metrics = extract_metrics(&nb).unwrap();
        assert_eq!(metrics["accuracy"], "accuracy");
    }
}
