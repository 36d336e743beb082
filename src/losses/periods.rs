use serde::{Deserialize, Serialize};

use crate::basic::{PfError, PfResult};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Consecutive monthly labels such as `"May 24"`, `"June 24"`, ...
///
/// `start_month` is 1-based and must lie in `1..=12`. Years are printed with two digits.
pub fn calendar_periods(start_month: u32, start_year: i32, count: usize) -> PfResult<Vec<String>> {
    if !(1..=12).contains(&start_month) {
        return Err(PfError::invalid(format!(
            "start month must be in 1..=12, got {start_month}"
        )));
    }
    let start = (start_month - 1) as usize;
    Ok((0..count)
        .map(|k| {
            let m = start + k;
            let year = start_year + (m / 12) as i32;
            format!("{} {:02}", MONTHS[m % 12], year.rem_euclid(100))
        })
        .collect())
}

/// Period labels of a projection, either listed or generated from a start month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodLabels {
    Explicit(Vec<String>),
    Calendar {
        start_month: u32,
        start_year: i32,
        count: usize,
    },
}

impl PeriodLabels {
    pub fn labels(&self) -> PfResult<Vec<String>> {
        match self {
            PeriodLabels::Explicit(labels) => Ok(labels.clone()),
            PeriodLabels::Calendar {
                start_month,
                start_year,
                count,
            } => calendar_periods(*start_month, *start_year, *count),
        }
    }
}
