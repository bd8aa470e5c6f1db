//! Security audit logging for authentication events
//!
//! Registrations, sign-ins and rejected bearer tokens are logged at INFO
//! level on the `audit` target so they can be routed separately from
//! application logs (`RUST_LOG=audit=info`).
//!
//! Author: hephaex@gmail.com

use axum::http::{header, HeaderMap};
use serde::Serialize;
use tracing::info;

/// Where a request came from, as far as headers can tell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Security audit events
///
/// Plaintext passwords and tokens never appear in an event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    RegistrationSuccess {
        user_id: i64,
        username: String,
        origin: RequestOrigin,
    },

    RegistrationFailure {
        username: String,
        reason: String,
        origin: RequestOrigin,
    },

    LoginSuccess {
        user_id: i64,
        username: String,
        origin: RequestOrigin,
    },

    /// Failed sign-in; `reason` distinguishes unknown user from bad password
    /// for operators only, clients always see the same response
    LoginFailure {
        username: String,
        reason: String,
        origin: RequestOrigin,
    },

    /// Bearer credential rejected by the auth gate
    InvalidToken {
        reason: String,
        origin: RequestOrigin,
    },
}

impl AuditEvent {
    fn summary(&self) -> &'static str {
        match self {
            AuditEvent::RegistrationSuccess { .. } => "Registration successful",
            AuditEvent::RegistrationFailure { .. } => "Registration failed",
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::InvalidToken { .. } => "Invalid token",
        }
    }

    fn origin(&self) -> &RequestOrigin {
        match self {
            AuditEvent::RegistrationSuccess { origin, .. }
            | AuditEvent::RegistrationFailure { origin, .. }
            | AuditEvent::LoginSuccess { origin, .. }
            | AuditEvent::LoginFailure { origin, .. }
            | AuditEvent::InvalidToken { origin, .. } => origin,
        }
    }
}

/// Log a security audit event with structured fields
///
/// The full event is attached as JSON for log aggregators; the client
/// address is repeated as its own field for quick filtering.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(
        target: "audit",
        event = %event_json,
        ip_address = ?event.origin().ip_address,
        "{}",
        event.summary()
    );
}

/// Extract the client IP from proxy headers
///
/// Checks X-Forwarded-For (first hop), then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(first_ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        let first_ip = first_ip.trim();
        if !first_ip.is_empty() {
            return Some(first_ip.to_string());
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
