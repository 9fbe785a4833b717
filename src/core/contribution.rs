//! Validation and round-up computation for raw deposit rows.
//!
//! Rows come from untrusted tabular input. The header shape is checked once up
//! front; after that every row is validated independently and problems are
//! recorded on the row as [`IssueCode`]s instead of aborting the batch.

use crate::core::error::{IssueCode, StructuralInputError};
use chrono::{DateTime, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Columns every contribution file must declare.
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "amount", "merchant", "category"];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Fractional parts closer to zero than this count as whole amounts.
const WHOLE_AMOUNT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// A row as read from the input, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub merchant: Option<String>,
    pub category: Option<String>,
}

/// A validated deposit earmarked for investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionEvent {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub roundup: Decimal,
    pub merchant: Option<String>,
    pub category: Option<String>,
}

/// A normalized input row, kept for display even when invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionRow {
    /// 1-based, header excluded.
    pub line: usize,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub roundup: Decimal,
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub valid: bool,
    pub issues: BTreeSet<IssueCode>,
}

impl ContributionRow {
    pub fn event(&self) -> Option<ContributionEvent> {
        if !self.valid {
            return None;
        }
        Some(ContributionEvent {
            date: self.date?,
            amount: self.amount?,
            roundup: self.roundup,
            merchant: self.merchant.clone(),
            category: self.category.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub rows: Vec<ContributionRow>,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub total_roundup: Decimal,
}

impl NormalizationReport {
    /// Valid rows as events, in input order.
    pub fn events(&self) -> Vec<ContributionEvent> {
        self.rows.iter().filter_map(ContributionRow::event).collect()
    }
}

/// Rounds to cents, halves away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount needed to bring `amount` up to the next whole unit, in cents.
///
/// Whole amounts round up by nothing: `4.00 -> 0`, `4.30 -> 0.70`, `4.995 -> 0.01`.
pub fn roundup(amount: Decimal) -> Decimal {
    let fraction = amount - amount.floor();
    if fraction.abs() < WHOLE_AMOUNT_EPSILON {
        return Decimal::ZERO;
    }
    round_cents(amount.ceil() - amount)
}

/// Returns the required columns absent from `headers` (trimmed, case-insensitive).
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let declared: BTreeSet<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    REQUIRED_COLUMNS
        .iter()
        .filter(|c| !declared.contains(**c))
        .map(|c| c.to_string())
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .filter(|a| *a > Decimal::ZERO)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_record(line: usize, record: &RawRecord) -> ContributionRow {
    let mut issues = BTreeSet::new();

    let date = record.date.as_deref().and_then(parse_date);
    if date.is_none() {
        issues.insert(IssueCode::BadDate);
    }
    let raw_amount = record.amount.as_deref().and_then(parse_amount);
    let amount = raw_amount.map(round_cents);
    if !amount.is_some_and(|a| a > Decimal::ZERO) {
        issues.insert(IssueCode::BadAmount);
    }

    let valid = issues.is_empty();
    let roundup = match (valid, raw_amount) {
        (true, Some(amount)) => roundup(amount),
        _ => Decimal::ZERO,
    };

    ContributionRow {
        line,
        date,
        amount,
        roundup,
        merchant: non_empty(&record.merchant),
        category: non_empty(&record.category),
        valid,
        issues,
    }
}

/// Validates `records` against the declared `headers`.
///
/// Fails only when required columns are missing, before looking at any row.
pub fn normalize<S: AsRef<str>>(
    headers: &[S],
    records: &[RawRecord],
) -> Result<NormalizationReport, StructuralInputError> {
    let missing = missing_columns(headers);
    if !missing.is_empty() {
        return Err(StructuralInputError { missing });
    }

    let rows: Vec<ContributionRow> = records
        .iter()
        .enumerate()
        .map(|(i, record)| normalize_record(i + 1, record))
        .collect();

    let valid_count = rows.iter().filter(|r| r.valid).count();
    let total_roundup = round_cents(
        rows.iter()
            .filter(|r| r.valid)
            .map(|r| r.roundup)
            .sum::<Decimal>(),
    );

    Ok(NormalizationReport {
        invalid_count: rows.len() - valid_count,
        valid_count,
        total_roundup,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADERS: [&str; 4] = ["date", "amount", "merchant", "category"];

    fn record(date: &str, amount: &str) -> RawRecord {
        RawRecord {
            date: Some(date.to_string()),
            amount: Some(amount.to_string()),
            merchant: Some("Coffee Shop".to_string()),
            category: Some("Food".to_string()),
        }
    }

    #[test]
    fn test_roundup_examples() {
        assert_eq!(roundup(dec!(4.00)), Decimal::ZERO);
        assert_eq!(roundup(dec!(4.30)), dec!(0.70));
        assert_eq!(roundup(dec!(4.995)), dec!(0.01));
        assert_eq!(roundup(dec!(12.01)), dec!(0.99));
        assert_eq!(roundup(dec!(0.0000000001) + dec!(7)), Decimal::ZERO);
    }

    #[test]
    fn test_header_check_is_case_insensitive_and_trimmed() {
        let headers = [" Date", "AMOUNT ", "Merchant", "category", "notes"];
        assert!(missing_columns(&headers).is_empty());
    }

    #[test]
    fn test_missing_columns_abort_before_rows() {
        let headers = ["date", "amount"];
        let err = normalize(&headers, &[record("not a date", "x")]).unwrap_err();
        assert_eq!(err.missing, vec!["merchant", "category"]);
    }

    #[test]
    fn test_valid_and_invalid_rows() {
        let records = vec![
            record("2025-01-01", "4.30"),
            record("2025-13-45", "3.00"),
            record("2025-01-03", "-2"),
            record("", "abc"),
            record("01/08/2025", " 2.75 "),
        ];
        let report = normalize(&HEADERS, &records).unwrap();

        assert_eq!(report.valid_count, 2);
        assert_eq!(report.invalid_count, 3);
        assert_eq!(report.total_roundup, dec!(0.95));

        let first = &report.rows[0];
        assert_eq!(first.line, 1);
        assert!(first.valid);
        assert!(first.issues.is_empty());
        assert_eq!(first.amount, Some(dec!(4.30)));
        assert_eq!(first.roundup, dec!(0.70));

        let bad_date = &report.rows[1];
        assert!(!bad_date.valid);
        assert_eq!(bad_date.issues, BTreeSet::from([IssueCode::BadDate]));
        assert_eq!(bad_date.roundup, Decimal::ZERO);

        let bad_amount = &report.rows[2];
        assert_eq!(bad_amount.issues, BTreeSet::from([IssueCode::BadAmount]));
        assert_eq!(bad_amount.amount, None);

        let both = &report.rows[3];
        assert_eq!(
            both.issues,
            BTreeSet::from([IssueCode::BadDate, IssueCode::BadAmount])
        );

        let us_format = &report.rows[4];
        assert_eq!(us_format.line, 5);
        assert_eq!(us_format.date, NaiveDate::from_ymd_opt(2025, 1, 8));
        assert_eq!(us_format.roundup, dec!(0.25));
    }

    #[test]
    fn test_amount_coerced_to_cents() {
        let report = normalize(&HEADERS, &[record("2025-02-01", "4.995")]).unwrap();
        let row = &report.rows[0];
        assert_eq!(row.amount, Some(dec!(5.00)));
        assert_eq!(row.roundup, dec!(0.01));
    }

    #[test]
    fn test_sub_cent_amount_is_bad_amount() {
        let report = normalize(&HEADERS, &[record("2025-02-01", "0.004")]).unwrap();
        let row = &report.rows[0];
        assert!(!row.valid);
        assert_eq!(row.issues, BTreeSet::from([IssueCode::BadAmount]));
        assert_eq!(row.amount, Some(dec!(0.00)));
        assert_eq!(row.roundup, Decimal::ZERO);
        assert!(report.events().is_empty());
        assert_eq!(report.total_roundup, Decimal::ZERO);

        let report = normalize(&HEADERS, &[record("2025-02-01", "0.005")]).unwrap();
        assert_eq!(report.events()[0].amount, dec!(0.01));
    }

    #[test]
    fn test_missing_fields_and_optional_text() {
        let records = vec![RawRecord {
            date: Some("2025-03-01T10:15:00Z".to_string()),
            amount: Some("10".to_string()),
            merchant: Some("   ".to_string()),
            category: None,
        }];
        let report = normalize(&HEADERS, &records).unwrap();
        let event = report.rows[0].event().unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(event.roundup, Decimal::ZERO);
        assert_eq!(event.merchant, None);
        assert_eq!(event.category, None);

        let empty = normalize(&HEADERS, &[RawRecord::default()]).unwrap();
        assert_eq!(empty.invalid_count, 1);
        assert!(empty.events().is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let records = vec![record("2025-01-01", "4.30"), record("bad", "1")];
        let first = normalize(&HEADERS, &records).unwrap();
        let second = normalize(&HEADERS, &records).unwrap();
        assert_eq!(first, second);
    }
}
