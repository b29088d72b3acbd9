//! Column projection of the provider's CSV response.
//!
//! The first record is the header; columns are looked up by name. Rows keep
//! the provider's order and short rows are padded with empty values.

use csv::{ReaderBuilder, StringRecord};

use crate::{
    error::SchemaMismatch,
    models::{ProjectedRow, ProjectedTable},
};

/// Selects `columns` from `csv_text`, in the given order.
pub fn project(csv_text: &str, columns: &[&str; 6]) -> Result<ProjectedTable, SchemaMismatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let header: StringRecord = reader.headers().map_err(SchemaMismatch::Unreadable)?.clone();

    let mut indices = [0usize; 6];
    for (slot, column) in indices.iter_mut().zip(columns.iter()) {
        *slot = header
            .iter()
            .position(|name| name == *column)
            .ok_or_else(|| SchemaMismatch::MissingColumn {
                column: column.to_string(),
            })?;
    }

    let mut rows: Vec<ProjectedRow> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(SchemaMismatch::Unreadable)?;
        rows.push(std::array::from_fn(|i| {
            record.get(indices[i]).unwrap_or_default().to_string()
        }));
    }

    Ok(ProjectedTable {
        headers: std::array::from_fn(|i| header[indices[i]].to_string()),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SELECTED_COLUMNS;

    const WIKI_CSV: &str = "Date,Open,Adj. Open,Adj. High,Adj. Low,Adj. Close,Volume,Adj. Volume\n\
        2015-01-05,108.29,104.3,104.6,101.2,102.5,64285491,64285491\n\
        2015-01-02,111.39,107.3,107.5,103.1,105.4,53204626,53204626\n";

    #[test]
    fn test_project_selects_six_columns_in_order() {
        let table = project(WIKI_CSV, &SELECTED_COLUMNS).unwrap();

        assert_eq!(table.headers, SELECTED_COLUMNS.map(String::from));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0],
            ["2015-01-05", "104.3", "104.6", "101.2", "102.5", "64285491"].map(String::from)
        );
        assert_eq!(table.rows[1][0], "2015-01-02");
        assert_eq!(table.rows[1][4], "105.4");
    }

    #[test]
    fn test_project_missing_column() {
        let csv = "Date,Adj. Open,Adj. High,Adj. Low,Adj. Volume\n2015-01-05,1,2,3,4\n";

        match project(csv, &SELECTED_COLUMNS) {
            Err(SchemaMismatch::MissingColumn { column }) => assert_eq!(column, "Adj. Close"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_project_error_page_is_schema_mismatch() {
        let html = "<html><body>Not Found</body></html>";
        assert!(matches!(
            project(html, &SELECTED_COLUMNS),
            Err(SchemaMismatch::MissingColumn { .. })
        ));
        assert!(matches!(
            project("", &SELECTED_COLUMNS),
            Err(SchemaMismatch::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_project_pads_short_rows() {
        let csv = "Date,Adj. Open,Adj. High,Adj. Low,Adj. Close,Adj. Volume\n2015-01-05,1,2\n";
        let table = project(csv, &SELECTED_COLUMNS).unwrap();

        assert_eq!(table.rows[0], ["2015-01-05", "1", "2", "", "", ""].map(String::from));
    }

    #[test]
    fn test_project_accepts_crlf_and_header_only() {
        let csv = "Date,Adj. Open,Adj. High,Adj. Low,Adj. Close,Adj. Volume\r\n";
        let table = project(csv, &SELECTED_COLUMNS).unwrap();
        assert!(table.is_empty());

        let csv = "Adj. Volume,Adj. Close,Adj. Low,Adj. High,Adj. Open,Date\r\n6,5,4,3,2,1\r\n";
        let table = project(csv, &SELECTED_COLUMNS).unwrap();
        assert_eq!(table.rows[0], ["1", "2", "3", "4", "5", "6"].map(String::from));
    }
}
