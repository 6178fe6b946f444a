// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Backend HTTP client.
//!
//! Thin blocking wrapper around the analysis backend's routes. Calls are
//! made from worker threads; response interpretation is kept in pure
//! functions so it can be tested without a server.

use crate::config::AppConfig;
use crate::models::finance::TransactionsResponse;
use crate::models::loan::{LoanApplication, LoanDecision};
use crate::models::session::{Session, SessionError};
use crate::models::submission::SubmissionPayload;
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SUBMIT_PATH: &str = "/api/submit";
const TRANSACTIONS_PATH: &str = "/api/transactions";
const LOGIN_PATH: &str = "/api/auth/login";
const SIGNUP_PATH: &str = "/api/auth/signup";
const LOAN_PATH: &str = "/api/loan/apply";

const SUBMIT_FALLBACK: &str = "Failed to submit PDF and boxes";
const TRANSACTIONS_FALLBACK: &str = "Failed to fetch transactions";
const AUTH_FALLBACK: &str = "Authentication failed";
const LOAN_FALLBACK: &str = "Your loan application was not approved at this time.";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    /// Non-success reply; `message` is the server's `error` field or a
    /// per-route fallback
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Sign-in or sign-up mode of the auth form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    fn path(self) -> &'static str {
        match self {
            AuthMode::Login => LOGIN_PATH,
            AuthMode::Signup => SIGNUP_PATH,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Send every selected file and the annotation store in one request.
    pub fn submit(&self, payload: &SubmissionPayload) -> Result<serde_json::Value, ApiError> {
        let mut form = multipart::Form::new();
        for file in &payload.files {
            let part = multipart::Part::bytes(file.bytes.as_ref().clone())
                .file_name(file.file_name.clone())
                .mime_str("application/pdf")
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            form = form.part(file.field.clone(), part);
        }
        form = form.text("boxes", payload.boxes.clone());
        if let Some(user_id) = &payload.user_id {
            form = form.text("user_id", user_id.clone());
        }

        let response = self
            .http
            .post(self.url(SUBMIT_PATH))
            .multipart(form)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let (status, body) = read_response(response)?;
        parse_submit_response(status, &body)
    }

    pub fn transactions(&self, user_id: &str) -> Result<TransactionsResponse, ApiError> {
        let response = self
            .http
            .get(self.url(TRANSACTIONS_PATH))
            .query(&[("user_id", user_id)])
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let (status, body) = read_response(response)?;
        if !is_success(status) {
            return Err(ApiError::Server {
                status,
                message: TRANSACTIONS_FALLBACK.to_string(),
            });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> Result<Session, ApiError> {
        let response = self
            .http
            .post(self.url(mode.path()))
            .json(credentials)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let (status, body) = read_response(response)?;
        parse_auth_response(status, &body)
    }

    pub fn apply_loan(&self, application: &LoanApplication) -> Result<LoanDecision, ApiError> {
        let response = self
            .http
            .post(self.url(LOAN_PATH))
            .json(application)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let (status, body) = read_response(response)?;
        parse_loan_response(status, &body)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<(u16, String), ApiError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(|e| ApiError::Transport(e.to_string()))?;
    Ok((status, body))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Extract the `error` field of a JSON body, if there is one.
pub fn error_field(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<serde_json::Value>,
    }
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.error? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Null => None,
        serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn server_error(status: u16, body: &str, fallback: &str) -> ApiError {
    ApiError::Server {
        status,
        message: error_field(body).unwrap_or_else(|| fallback.to_string()),
    }
}

/// Success requires a 2xx status, a JSON body and no `error` field.
pub fn parse_submit_response(status: u16, body: &str) -> Result<serde_json::Value, ApiError> {
    if !is_success(status) {
        return Err(server_error(status, body, SUBMIT_FALLBACK));
    }
    if let Some(message) = error_field(body) {
        return Err(ApiError::Server { status, message });
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a login/signup reply into a session.
pub fn parse_auth_response(status: u16, body: &str) -> Result<Session, ApiError> {
    #[derive(Deserialize)]
    struct AuthReply {
        user: Option<IssuedUser>,
    }
    #[derive(Deserialize)]
    struct IssuedUser {
        token: Option<String>,
        user: Option<crate::models::session::SessionUser>,
    }

    if !is_success(status) {
        return Err(server_error(status, body, AUTH_FALLBACK));
    }
    let reply: AuthReply = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let issued = reply.user.ok_or(SessionError::MissingToken)?;
    let token = issued
        .token
        .filter(|t| !t.is_empty())
        .ok_or(SessionError::MissingToken)?;

    match issued.user {
        Some(user) => Ok(Session { user, token }),
        None => Ok(Session::from_token(&token)?),
    }
}

pub fn parse_loan_response(status: u16, body: &str) -> Result<LoanDecision, ApiError> {
    if !is_success(status) {
        return Err(server_error(status, body, LOAN_FALLBACK));
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_success_without_error_field() {
        let value = parse_submit_response(200, r#"{"message": "PDF and boxes data received successfully"}"#).unwrap();
        assert_eq!(value["message"], "PDF and boxes data received successfully");
    }

    #[test]
    fn test_submit_server_error_uses_error_field() {
        let err = parse_submit_response(400, r#"{"error": "No file provided"}"#).unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 400,
                message: "No file provided".into()
            }
        );
        assert_eq!(err.to_string(), "No file provided");
    }

    #[test]
    fn test_submit_server_error_without_body_uses_fallback() {
        let err = parse_submit_response(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), SUBMIT_FALLBACK);
    }

    #[test]
    fn test_submit_ok_status_with_error_field_fails() {
        let err = parse_submit_response(200, r#"{"error": "Invalid boxes data format"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid boxes data format");
    }

    #[test]
    fn test_submit_ok_status_non_json_is_decode_error() {
        assert!(matches!(
            parse_submit_response(200, "done"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn test_error_field_variants() {
        assert_eq!(error_field(r#"{"error": null}"#), None);
        assert_eq!(error_field(r#"{"error": ""}"#), None);
        assert_eq!(error_field(r#"{"error": 5}"#), Some("5".into()));
        assert_eq!(error_field("[]"), None);
    }

    #[test]
    fn test_auth_reply_with_nested_user() {
        let session = parse_auth_response(
            200,
            r#"{"user": {"token": "a.b.c", "user": {"_id": "u1", "email": "ana@example.com"}}}"#,
        )
        .unwrap();
        assert_eq!(session.token, "a.b.c");
        assert_eq!(session.user_id(), "u1");
    }

    #[test]
    fn test_auth_reply_without_token() {
        let err = parse_auth_response(200, r#"{"user": {"user": {"_id": "u1"}}}"#).unwrap_err();
        assert_eq!(err.to_string(), "No token received from server");
        let err = parse_auth_response(200, r#"{}"#).unwrap_err();
        assert_eq!(err, ApiError::Session(SessionError::MissingToken));
    }

    #[test]
    fn test_auth_failure_messages() {
        let err = parse_auth_response(401, r#"{"error": "Invalid credentials"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        let err = parse_auth_response(500, "").unwrap_err();
        assert_eq!(err.to_string(), AUTH_FALLBACK);
    }

    #[test]
    fn test_loan_reply() {
        let decision = parse_loan_response(200, r#"{"approved": true, "apr_rate": 7.1}"#).unwrap();
        assert!(decision.approved);
        let err = parse_loan_response(400, r#"{"error": "Missing field: age"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: age");
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = ApiClient::new(&AppConfig::default()).unwrap();
        assert_eq!(client.url(SUBMIT_PATH), "http://localhost:5000/api/submit");
    }
}
