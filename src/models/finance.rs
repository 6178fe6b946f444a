// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transactions and finance features returned by the backend, and the
//! client-side reductions the dashboard shows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted bank transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// 1 for credits, -1 for debits
    pub prefix: i32,
    pub amount: f64,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.prefix == 1
    }
}

/// Aggregate metrics computed by the backend; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceFeatures {
    #[serde(default)]
    pub dti_ratio: Option<f64>,
    #[serde(default)]
    pub savings_rate: Option<f64>,
    #[serde(default)]
    pub credit_utilization: Option<f64>,
    #[serde(default)]
    pub total_loan_payment: Option<f64>,
    #[serde(default)]
    pub num_loans_paid: Option<f64>,
    #[serde(default)]
    pub avg_transaction_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub finance_features: Vec<FinanceFeatures>,
}

impl TransactionsResponse {
    /// The most recent feature snapshot, or an empty one.
    pub fn latest_features(&self) -> FinanceFeatures {
        self.finance_features.last().cloned().unwrap_or_default()
    }

    /// The first `n` transactions as returned.
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..self.transactions.len().min(n)]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    /// Sum of debit amounts as a positive magnitude
    pub spending: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.income - self.spending
    }
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    transactions.iter().fold(Totals::default(), |mut acc, t| {
        match t.prefix {
            1 => acc.income += t.amount,
            -1 => acc.spending += t.amount.abs(),
            _ => {}
        }
        acc
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Weekly, Timeframe::Monthly, Timeframe::Yearly];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Weekly => "Weekly",
            Timeframe::Monthly => "Monthly",
            Timeframe::Yearly => "Yearly",
        }
    }

    fn bucket_key(self, date: NaiveDate) -> String {
        match self {
            Timeframe::Weekly => date.format("%G-W%V").to_string(),
            Timeframe::Monthly => date.format("%Y-%m").to_string(),
            Timeframe::Yearly => date.format("%Y").to_string(),
        }
    }
}

/// Income and spending inside one time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: String,
    pub income: f64,
    pub spending: f64,
}

/// Group transactions by time bucket, sorted by bucket key.
///
/// Transactions whose date cannot be parsed are skipped.
pub fn group_by_timeframe(transactions: &[Transaction], timeframe: Timeframe) -> Vec<Bucket> {
    let mut grouped: BTreeMap<String, Bucket> = BTreeMap::new();

    for transaction in transactions {
        let Some(date) = parse_date(&transaction.date) else {
            log::warn!("Skipping transaction with unreadable date {:?}", transaction.date);
            continue;
        };
        let key = timeframe.bucket_key(date);
        let bucket = grouped.entry(key.clone()).or_insert_with(|| Bucket {
            key,
            income: 0.0,
            spending: 0.0,
        });
        match transaction.prefix {
            1 => bucket.income += transaction.amount,
            -1 => bucket.spending += transaction.amount.abs(),
            _ => {}
        }
    }

    grouped.into_values().collect()
}

/// Parse the date formats the backend is known to emit.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    // Flask's default JSON date format
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S GMT") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, prefix: i32, amount: f64) -> Transaction {
        Transaction {
            date: date.to_string(),
            description: "test".into(),
            category: "misc".into(),
            prefix,
            amount,
        }
    }

    #[test]
    fn test_totals() {
        let t = totals(&[
            tx("2024-01-02", 1, 1000.0),
            tx("2024-01-03", -1, 250.5),
            tx("2024-01-04", -1, 49.5),
            tx("2024-02-01", 1, 500.0),
        ]);
        assert_eq!(t.income, 1500.0);
        assert_eq!(t.spending, 300.0);
        assert_eq!(t.net(), 1200.0);
    }

    #[test]
    fn test_group_monthly_sorted() {
        let buckets = group_by_timeframe(
            &[
                tx("2024-02-10", 1, 100.0),
                tx("2024-01-05", -1, 40.0),
                tx("2024-01-20", 1, 10.0),
                tx("2024-02-11", -1, 5.0),
            ],
            Timeframe::Monthly,
        );
        assert_eq!(
            buckets,
            vec![
                Bucket {
                    key: "2024-01".into(),
                    income: 10.0,
                    spending: 40.0
                },
                Bucket {
                    key: "2024-02".into(),
                    income: 100.0,
                    spending: 5.0
                },
            ]
        );
    }

    #[test]
    fn test_group_weekly_uses_iso_weeks() {
        let buckets = group_by_timeframe(
            &[
                tx("2024-01-01", 1, 1.0),
                tx("2024-01-07", 1, 2.0),
                tx("2024-01-08", 1, 4.0),
                tx("2023-01-01", 1, 8.0),
            ],
            Timeframe::Weekly,
        );
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2022-W52", "2024-W01", "2024-W02"]);
        assert_eq!(buckets[1].income, 3.0);
    }

    #[test]
    fn test_group_yearly_skips_bad_dates() {
        let buckets = group_by_timeframe(
            &[
                tx("Mon, 15 Jan 2024 00:00:00 GMT", -1, 20.0),
                tx("2023-12-31T23:00:00Z", 1, 7.0),
                tx("yesterday", 1, 99.0),
            ],
            Timeframe::Yearly,
        );
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2023", "2024"]);
        assert_eq!(buckets[1].spending, 20.0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("2024-01-15"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00"), expected);
        assert_eq!(parse_date("2024-01-15 10:30:00"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00+00:00"), expected);
        assert_eq!(parse_date("Mon, 15 Jan 2024 10:30:00 GMT"), expected);
        assert_eq!(parse_date("15/01/2024"), None);
    }

    #[test]
    fn test_latest_features_and_recent() {
        let transactions: Vec<serde_json::Value> = (0..12)
            .map(|i| {
                serde_json::json!({
                    "date": "2024-01-01", "description": format!("t{i}"),
                    "category": "food", "prefix": -1, "amount": 1.0
                })
            })
            .collect();
        let response: TransactionsResponse = serde_json::from_value(serde_json::json!({
            "transactions": transactions,
            "finance_features": [
                {"dti_ratio": 0.5},
                {"dti_ratio": 0.25, "savings_rate": 0.1}
            ]
        }))
        .unwrap();

        let latest = response.latest_features();
        assert_eq!(latest.dti_ratio, Some(0.25));
        assert_eq!(latest.savings_rate, Some(0.1));
        assert_eq!(latest.credit_utilization, None);
        assert_eq!(response.recent(10).len(), 10);
        assert_eq!(response.recent(10)[0].description, "t0");
        assert_eq!(TransactionsResponse::default().latest_features(), FinanceFeatures::default());
    }
}
