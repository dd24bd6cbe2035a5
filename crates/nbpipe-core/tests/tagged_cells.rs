//! Extraction of parameters and metrics from notebooks on disk.

use nbpipe_core::notebook::{Cell, Notebook};
use nbpipe_core::{
    Error, LiteralKind, PIPELINE_METRICS_TAG, PIPELINE_PARAMETERS_TAG, extract_metrics,
    extract_parameters, parameter_rows,
};
use tempfile::TempDir;

fn write_notebook(temp: &TempDir, cells: Vec<Cell>) -> std::path::PathBuf {
    let mut notebook = Notebook::new();
    notebook.cells = cells;
    let path = temp.path().join("pipeline.ipynb");
    notebook.write_to_file(&path).expect("Failed to write notebook");
    path
}

#[test]
fn test_parameters_from_file() {
    let temp = TempDir::new().unwrap();
    let path = write_notebook(
        &temp,
        vec![
            Cell::code("import numpy as np", &["imports"]),
            Cell::code(
                "learning_rate = 0.001\nlayers = [64, 32]\nname = 'mnist'  # dataset\n",
                &[PIPELINE_PARAMETERS_TAG],
            ),
            Cell::code("use_gpu = True", &[PIPELINE_PARAMETERS_TAG]),
        ],
    );

    let notebook = Notebook::read_from_file(&path).unwrap();
    let params = extract_parameters(&notebook).unwrap();

    assert_eq!(
        params.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["learning_rate", "layers", "name", "use_gpu"]
    );
    assert_eq!(params["layers"].kind, LiteralKind::List);
    assert_eq!(params["use_gpu"].kind, LiteralKind::Bool);

    let rows = parameter_rows(&params);
    assert_eq!(
        rows[0],
        [
            "learning_rate".to_string(),
            "float".to_string(),
            "0.001".to_string()
        ]
    );
    assert_eq!(rows[2][2], "'mnist'");
}

#[test]
fn test_metrics_from_file() {
    let temp = TempDir::new().unwrap();
    let path = write_notebook(
        &temp,
        vec![Cell::code(
            "print(accuracy)\nprint(\"Mean_Squared Error\", mse)\n",
            &[PIPELINE_METRICS_TAG],
        )],
    );

    let notebook = Notebook::read_from_file(&path).unwrap();
    let metrics = extract_metrics(&notebook).unwrap();

    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics["accuracy"], "accuracy");
    assert_eq!(metrics["Mean_Squared Error"], "mean-squared-error");
}

#[test]
fn test_untagged_notebook() {
    let temp = TempDir::new().unwrap();
    let path = write_notebook(&temp, vec![Cell::code("x = 1", &[])]);
    let notebook = Notebook::read_from_file(&path).unwrap();

    for err in [
        extract_parameters(&notebook).unwrap_err(),
        extract_metrics(&notebook).map(|_| ()).unwrap_err(),
    ] {
        assert!(matches!(err, Error::MissingAnnotation { .. }));
        assert!(err.is_annotation_error());
    }
}

#[test]
fn test_parse_error_reports_position() {
    let temp = TempDir::new().unwrap();
    let path = write_notebook(
        &temp,
        vec![Cell::code("a = 1\nb = compute()\n", &[PIPELINE_PARAMETERS_TAG])],
    );
    let notebook = Notebook::read_from_file(&path).unwrap();

    let Error::Parse(err) = extract_parameters(&notebook).unwrap_err() else {
        panic!("expected a parse error");
    };
    assert_eq!(err.line, 2);
}
