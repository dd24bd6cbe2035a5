//! Plain-text tables for log output.

/// Render rows under `headers` as a left-aligned text table.
///
/// ```text
/// name           type   value
/// -------------  -----  -----
/// learning_rate  float  0.001
/// ```
pub fn render<R, C>(headers: &[&str], rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.as_ref().iter().enumerate() {
            let cell: &str = cell.as_ref();
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(&widths, headers.iter().copied()));
    lines.push(line(&widths, widths.iter().map(|w| "-".repeat(*w))));
    for row in rows {
        lines.push(line(&widths, row.as_ref().iter()));
    }
    lines.join("\n")
}

fn line<S: AsRef<str>>(widths: &[usize], cells: impl Iterator<Item = S>) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let cell: &str = cell.as_ref();
            format!("{:<width$}", cell, width = *width)
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let rows = vec![
            ["learning_rate".to_string(), "float".to_string(), "0.001".to_string()],
            ["epochs".to_string(), "int".to_string(), "10".to_string()],
        ];
        let table = render(&["name", "type", "value"], &rows);
        assert_eq!(
            table,
            "name           type   value\n\
             -------------  -----  -----\n\
             learning_rate  float  0.001\n\
             epochs         int    10"
        );
    }

    #[test]
    fn test_render_headers_only() {
        let rows: Vec<[&str; 2]> = Vec::new();
        assert_eq!(render(&["a", "bb"], &rows), "a  bb\n-  --");
    }
}
