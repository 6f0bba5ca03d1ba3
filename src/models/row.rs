use chrono::NaiveDate;

/// One ledger posting as read from the row source.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub date: NaiveDate,
    pub flag: String,
    pub amount: f64,
    pub account: String,
    pub path: Vec<String>,
}

impl Row {
    pub fn new(date: NaiveDate, amount: f64, account: &str, delimiter: char) -> Self {
        let account = account.trim().to_string();
        let path = split_account(&account, delimiter);
        Self {
            date,
            flag: String::new(),
            amount,
            account,
            path,
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = flag.into();
        self
    }
}

pub fn split_account(account: &str, delimiter: char) -> Vec<String> {
    account
        .split(delimiter)
        .map(|segment| segment.trim().to_string())
        .collect()
}
