// 🔢 Account Codes - leading account number of a line-item label
// Grammar: [digits] [separator] description
//   "61000 - Salaries"  → Some(61000), "Salaries"
//   "Miscellaneous"     → None,        "Miscellaneous"

use std::ops::Range;

/// Operating expense accounts (the 6xxxx series)
pub const OPERATING_EXPENSE_ACCOUNTS: Range<u64> = 60_000..70_000;

/// Headcount (compensation) accounts
pub const HEADCOUNT_ACCOUNTS: Range<u64> = 61_000..62_000;

/// A line-item label split into its account number and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountLabel<'a> {
    /// Leading digit run, if the label starts with one
    pub number: Option<u64>,
    /// Whatever follows the number and its " - " separator
    pub description: &'a str,
}

impl<'a> AccountLabel<'a> {
    pub fn parse(label: &'a str) -> Self {
        let digits_end = label
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(label.len());

        if digits_end == 0 {
            return AccountLabel {
                number: None,
                description: label,
            };
        }

        // A digit run too long for u64 is not an account code anyone uses
        let number = label[..digits_end].parse::<u64>().ok();
        let description = label[digits_end..]
            .trim_start()
            .strip_prefix('-')
            .unwrap_or(&label[digits_end..])
            .trim();

        AccountLabel {
            number,
            description,
        }
    }

    /// Account number with "no number" folded to 0
    pub fn number_or_zero(&self) -> u64 {
        self.number.unwrap_or(0)
    }
}

/// Leading account number of `label`, or 0 when there is none.
pub fn account_number(label: &str) -> u64 {
    AccountLabel::parse(label).number_or_zero()
}

pub fn is_operating_expense(label: &str) -> bool {
    OPERATING_EXPENSE_ACCOUNTS.contains(&account_number(label))
}

pub fn is_headcount(label: &str) -> bool {
    HEADCOUNT_ACCOUNTS.contains(&account_number(label))
}
