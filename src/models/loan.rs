// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Loan application form and the backend's decision.

use serde::{Deserialize, Deserializer, Serialize};

pub const LOAN_TERMS: [u32; 5] = [12, 24, 36, 48, 60];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LoanError {
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
    #[error("{field} must be a whole number")]
    NotAWholeNumber { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("Please select a loan term")]
    MissingTerm,
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanForm {
    pub age: String,
    pub credit_score: String,
    pub term: Option<u32>,
    pub loan_amount: String,
}

/// Validated request body for `/api/loan/apply`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanApplication {
    pub age: u32,
    pub credit_score: u32,
    pub term: u32,
    pub loan_amount: f64,
    pub user_id: String,
}

impl LoanForm {
    /// Check every field and build the request for `user_id`.
    pub fn validate(&self, user_id: &str) -> Result<LoanApplication, LoanError> {
        let age = parse_whole_in_range("Age", &self.age, 18, 100)?;
        let credit_score = parse_whole_in_range("Credit score", &self.credit_score, 300, 850)?;
        let term = self
            .term
            .filter(|t| LOAN_TERMS.contains(t))
            .ok_or(LoanError::MissingTerm)?;
        let loan_amount = parse_in_range("Loan amount", &self.loan_amount, 1_000.0, 1_000_000.0)?;

        Ok(LoanApplication {
            age,
            credit_score,
            term,
            loan_amount,
            user_id: user_id.to_string(),
        })
    }
}

fn parse_in_range(field: &'static str, raw: &str, min: f64, max: f64) -> Result<f64, LoanError> {
    let value: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or(LoanError::NotANumber { field })?;
    if value < min || value > max {
        return Err(LoanError::OutOfRange { field, min, max });
    }
    Ok(value)
}

fn parse_whole_in_range(field: &'static str, raw: &str, min: u32, max: u32) -> Result<u32, LoanError> {
    let value = parse_in_range(field, raw, f64::from(min), f64::from(max))?;
    if value.fract() != 0.0 {
        return Err(LoanError::NotAWholeNumber { field });
    }
    Ok(value as u32)
}

/// Backend verdict. Unapproved applications are a normal outcome.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoanDecision {
    #[serde(deserialize_with = "bool_or_number")]
    pub approved: bool,
    #[serde(default)]
    pub apr_rate: Option<f64>,
    #[serde(default)]
    pub annual_income: Option<f64>,
    #[serde(default)]
    pub dti_ratio: Option<f64>,
}

/// The approval model reports 0/1 rather than a JSON boolean.
fn bool_or_number<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        other => Err(serde::de::Error::custom(format!(
            "expected boolean or number for `approved`, got {other}"
        ))),
    }
}
