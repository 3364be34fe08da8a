//! Result export: CSV download and tab-separated clipboard text

use crate::error::{PracticeError, Result};
use crate::result::{export_cell, QueryResult};
use chrono::NaiveDate;
use itertools::Itertools;

/// CSV with a header row. NULL cells become empty fields.
pub fn to_csv(result: &QueryResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(export_cell))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PracticeError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PracticeError::InvalidInput(e.to_string()))
}

/// Tab-separated text suitable for pasting into a spreadsheet.
pub fn to_tsv(result: &QueryResult) -> String {
    let mut out = String::new();
    out.push_str(&result.columns.iter().join("\t"));
    out.push('\n');
    for row in &result.rows {
        out.push_str(&row.iter().map(export_cell).join("\t"));
        out.push('\n');
    }
    out
}

/// `<dataset>_results_<YYYY-MM-DD>.csv`
pub fn export_file_name(dataset: &str, date: NaiveDate) -> String {
    format!("{}_results_{}.csv", dataset, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample() -> QueryResult {
        QueryResult::new(
            vec!["order_id".to_string(), "shipping_address".to_string(), "delivery_date".to_string()],
            vec![
                vec![json!(4), json!("123 Main St, New York, NY"), Value::Null],
                vec![json!(5), json!("He said \"hi\""), json!("2024-01-25")],
            ],
        )
    }

    #[test]
    fn test_csv() {
        let csv = to_csv(&sample()).unwrap();
        assert_eq!(
            csv,
            "order_id,shipping_address,delivery_date\n\
             4,\"123 Main St, New York, NY\",\n\
             5,\"He said \"\"hi\"\"\",2024-01-25\n"
        );
    }

    #[test]
    fn test_tsv() {
        let tsv = to_tsv(&sample());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "order_id\tshipping_address\tdelivery_date");
        assert_eq!(lines[1], "4\t123 Main St, New York, NY\t");
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name("orders", date), "orders_results_2024-03-09.csv");
    }
}
