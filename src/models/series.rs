use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Days-per-sample of the sliding window. Always at least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowWidth(u32);

impl WindowWidth {
    pub fn new(days: u32) -> AppResult<Self> {
        if days == 0 {
            return Err(AppError::Validation(
                "days per sample must be at least 1".into(),
            ));
        }
        Ok(Self(days))
    }

    pub fn days(self) -> usize {
        self.0 as usize
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// One chart line: the sliding sum of everything tagged with `label`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSeries {
    pub label: String,
    /// `(day index relative to the visible start, value)`.
    pub points: Vec<(i64, f64)>,
}
