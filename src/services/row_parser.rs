use crate::date_utils::parse_date;
use crate::error::{AppError, AppResult};
use crate::models::Row;
use tracing::{debug, trace};

/// Parses a ledger result set with `date`, `number` (or `amount`) and
/// `account` columns. The first bad row aborts the whole parse.
pub fn parse_rows(content: &[u8], delimiter: char) -> AppResult<Vec<Row>> {
    trace!(content_size = content.len(), "Starting row parsing");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::row(1, "missing header row"));
    }

    let date_col = find_column(&headers, &["date"])
        .ok_or_else(|| AppError::row(1, "no date column found"))?;
    let amount_col = find_column(&headers, &["number", "amount"])
        .ok_or_else(|| AppError::row(1, "no number column found"))?;
    let account_col = find_column(&headers, &["account"])
        .ok_or_else(|| AppError::row(1, "no account column found"))?;
    let flag_col = find_column(&headers, &["flag"]);

    debug!(column_count = headers.len(), "Row source headers parsed");

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;
        let record = result.map_err(|e| AppError::row(row_number, e.to_string()))?;

        let date_str = record.get(date_col).unwrap_or("");
        let date = parse_date(date_str)
            .ok_or_else(|| AppError::row(row_number, format!("invalid date '{}'", date_str)))?;

        let amount_str = record.get(amount_col).unwrap_or("");
        let amount = parse_amount(amount_str).ok_or_else(|| {
            AppError::row(row_number, format!("invalid number '{}'", amount_str))
        })?;

        let account = record.get(account_col).unwrap_or("");
        if account.is_empty() {
            return Err(AppError::row(row_number, "missing account"));
        }

        let flag = flag_col.and_then(|col| record.get(col)).unwrap_or("");

        // An empty segment would share the "" tag of rows ending at the parent.
        let row = Row::new(date, amount, account, delimiter).with_flag(flag);
        if row.path.iter().any(|segment| segment.is_empty()) {
            return Err(AppError::row(
                row_number,
                format!("empty segment in account '{}'", account),
            ));
        }
        rows.push(row);
    }

    debug!(row_count = rows.len(), "Row parsing completed");
    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    })
}

fn parse_amount(amount: &str) -> Option<f64> {
    let amount = amount.trim();
    if amount.is_empty() {
        return None;
    }
    amount
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bean_query_output() {
        let csv = b"date,flag,account,number\n\
                    2024-01-01,*,Expenses:Food:Groceries,12.50\n\
                    2024-01-01,*,Assets:Bank,-12.50";
        let rows = parse_rows(csv, ':').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].path, vec!["Expenses", "Food", "Groceries"]);
        assert_eq!(rows[0].amount, 12.5);
        assert_eq!(rows[0].flag, "*");
        assert_eq!(rows[1].amount, -12.5);
    }

    #[test]
    fn test_parse_padded_fields() {
        let csv = b"date      ,flag,account          ,number\n\
                    2024-01-01,*   ,  Expenses:Rent   ,   900.00 ";
        let rows = parse_rows(csv, ':').unwrap();
        assert_eq!(rows[0].account, "Expenses:Rent");
        assert_eq!(rows[0].amount, 900.0);
    }

    #[test]
    fn test_parse_amount_alias_and_no_flag() {
        let csv = b"Date,Account,Amount\n2024-02-01,food:grocery,10";
        let rows = parse_rows(csv, ':').unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].flag.is_empty());
    }

    #[test]
    fn test_parse_custom_delimiter() {
        let csv = b"date,account,number\n2024-02-01,food/grocery,10";
        let rows = parse_rows(csv, '/').unwrap();
        assert_eq!(rows[0].path, vec!["food", "grocery"]);
    }

    #[test]
    fn test_bad_date_aborts_load() {
        let csv = b"date,account,number\n2024-01-01,a,1\n01/02/2024,a,2\n2024-01-03,a,3";
        let err = parse_rows(csv, ':').unwrap_err();
        match err {
            AppError::RowParse { row, .. } => assert_eq!(row, 3),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_amount_aborts_load() {
        let csv = b"date,account,number\n2024-01-01,a,abc";
        assert!(matches!(
            parse_rows(csv, ':'),
            Err(AppError::RowParse { row: 2, .. })
        ));
    }

    #[test]
    fn test_missing_account_aborts_load() {
        let csv = b"date,account,number\n2024-01-01,,1";
        assert!(parse_rows(csv, ':').is_err());
    }

    #[test]
    fn test_out_of_shape_date_aborts_load() {
        let csv = b"date,account,number\n2024-01-01,a,1\n+200000-01-01,a,2";
        assert!(matches!(
            parse_rows(csv, ':'),
            Err(AppError::RowParse { row: 3, .. })
        ));

        let csv = b"date,account,number\n2024-1-5,a,1";
        assert!(matches!(
            parse_rows(csv, ':'),
            Err(AppError::RowParse { row: 2, .. })
        ));
    }

    #[test]
    fn test_empty_account_segment_aborts_load() {
        for account in ["a::b", "a:", ":a"] {
            let csv = format!("date,account,number\n2024-01-01,x,1\n2024-01-02,{},2", account);
            match parse_rows(csv.as_bytes(), ':') {
                Err(AppError::RowParse { row, message }) => {
                    assert_eq!(row, 3);
                    assert!(message.contains("empty segment"), "{}", message);
                }
                other => panic!("{} accepted: {:?}", account, other),
            }
        }
    }

    #[test]
    fn test_missing_required_column() {
        assert!(parse_rows(b"date,number\n2024-01-01,1", ':').is_err());
        assert!(parse_rows(b"account,number\na,1", ':').is_err());
        assert!(parse_rows(b"date,account\n2024-01-01,a", ':').is_err());
    }

    #[test]
    fn test_headers_only() {
        let rows = parse_rows(b"date,flag,account,number", ':').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_rows(b"", ':').is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-3.25"), Some(-3.25));
        assert_eq!(parse_amount("1e2"), Some(100.0));
        assert_eq!(parse_amount("1,000.00"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount(""), None);
    }
}
