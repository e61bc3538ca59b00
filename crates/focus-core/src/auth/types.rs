//! Data carried through one submission: form input, wire payloads, the raw
//! network result and the classified outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const REDACTED: &str = "<redacted>";

/// Sign-in form values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Registration form values. `confirm_password` never leaves the client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("confirm_password", &REDACTED)
            .finish()
    }
}

/// Body of `POST /api/users/signin`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInPayload")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl From<Credentials> for SignInPayload {
    fn from(credentials: Credentials) -> Self {
        Self {
            email: credentials.email,
            password: credentials.password,
        }
    }
}

/// Body of `POST /api/users/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl From<RegistrationRequest> for RegisterPayload {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
        }
    }
}

/// Unprocessed network result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Body as text. Empty is a valid body.
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Any 2xx counts as success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Decoded response body.
///
/// Empty text decodes to `{}`. Any valid JSON document is accepted; field
/// lookups on a non-object yield nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(Value);

impl ParsedBody {
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Decodes response text.
    ///
    /// # Errors
    /// Returns the JSON error for non-empty text that is not valid JSON.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        serde_json::from_str(text).map(Self)
    }

    /// Returns `key` when it holds a non-empty string.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the first of `keys` that holds a non-empty string.
    pub fn first_text_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.text_field(key))
    }

    /// Typed view of a user record, if the body looks like one.
    pub fn profile(&self) -> Option<UserProfile> {
        if !self.0.is_object() {
            return None;
        }
        serde_json::from_value(self.0.clone()).ok()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ParsedBody {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// User record returned by the backend on sign-in and registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub nr_focus_sessions: Option<i64>,
    pub total_focus_time: Option<i64>,
    pub nr_focus_sessions_today: Option<i64>,
    pub focus_time_today: Option<String>,
    pub avatar: Option<String>,
}

/// Why a request did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The 15 second timer fired before the response arrived.
    Timeout,
    /// No connection could be made, or it broke before the body was read.
    Unreachable,
    /// Non-empty body that is not JSON.
    MalformedResponse,
    /// The server answered with a non-2xx status.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unreachable => write!(f, "unreachable"),
            FailureKind::MalformedResponse => write!(f, "malformed_response"),
            FailureKind::Rejected => write!(f, "rejected"),
        }
    }
}

/// A classified failure with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// HTTP status, set for `Rejected` only.
    pub status: Option<u16>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Rejected,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn malformed(raw: &str) -> Self {
        Self::new(
            FailureKind::MalformedResponse,
            format!("Invalid server response: {raw}"),
        )
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ParsedBody),
    Failure(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }
}
