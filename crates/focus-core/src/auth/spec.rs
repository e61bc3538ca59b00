//! Static per-flow tables: endpoint, status-code messages and UI texts.

use std::fmt;

use url::Url;

use super::types::ParsedBody;

/// Which flow a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    SignIn,
    Register,
}

impl FlowKind {
    pub fn spec(self) -> &'static FlowSpec {
        match self {
            FlowKind::SignIn => &SIGN_IN,
            FlowKind::Register => &REGISTER,
        }
    }

    /// Route to the other flow (sign-in ↔ registration).
    pub fn reciprocal(self) -> Route {
        match self {
            FlowKind::SignIn => Route::SignUp,
            FlowKind::Register => Route::SignIn,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::SignIn => write!(f, "sign_in"),
            FlowKind::Register => write!(f, "register"),
        }
    }
}

/// Navigation destinations. Opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Authenticated landing screen.
    FocusScreen,
    SignIn,
    SignUp,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::FocusScreen => "/focusScreen",
            Route::SignIn => "/",
            Route::SignUp => "/signup",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One row of a status-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRule {
    /// Use the server's message when present, else `fallback`.
    BodyOr { status: u16, fallback: &'static str },
    /// Fixed message; the body is ignored.
    Fixed { status: u16, message: &'static str },
}

impl StatusRule {
    fn status(&self) -> u16 {
        match self {
            StatusRule::BodyOr { status, .. } | StatusRule::Fixed { status, .. } => *status,
        }
    }
}

/// Maps a non-2xx status and body to the message shown to the user.
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
    /// First matching rule wins.
    pub rules: &'static [StatusRule],
    /// Body fields that may carry a server message, in lookup order.
    pub body_fields: &'static [&'static str],
    /// Used when no rule matches and the body carries no message.
    pub fallback: &'static str,
}

impl StatusTable {
    pub fn message_for(&self, status: u16, body: &ParsedBody) -> String {
        let server_message = body.first_text_field(self.body_fields);
        let selected = match self.rules.iter().find(|rule| rule.status() == status) {
            Some(StatusRule::BodyOr { fallback, .. }) => server_message.unwrap_or(*fallback),
            Some(StatusRule::Fixed { message, .. }) => *message,
            None => server_message.unwrap_or(self.fallback),
        };
        selected.to_string()
    }
}

/// What a successful response leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessAction {
    /// Navigate right away.
    Navigate(Route),
    /// Show an acknowledgement and navigate once the user dismisses it.
    AcknowledgeThenNavigate {
        title: &'static str,
        message: &'static str,
        route: Route,
    },
}

/// Everything that distinguishes one flow from the other.
#[derive(Debug, Clone, Copy)]
pub struct FlowSpec {
    pub kind: FlowKind,
    /// Endpoint path joined onto the configured base URL.
    pub path: &'static str,
    pub statuses: StatusTable,
    /// Shown while the request is in flight.
    pub busy_label: &'static str,
    /// Title for local validation errors.
    pub invalid_title: &'static str,
    /// Title for server rejections.
    pub rejected_title: &'static str,
    /// Title for undecodable responses.
    pub malformed_title: &'static str,
    /// Title for timeout and unreachable errors.
    pub connection_title: &'static str,
    pub timeout_message: fn(&str) -> String,
    pub unreachable_message: fn(&str) -> String,
    pub on_success: SuccessAction,
}

impl FlowSpec {
    /// Full endpoint URL for this flow.
    pub fn endpoint(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

pub static SIGN_IN: FlowSpec = FlowSpec {
    kind: FlowKind::SignIn,
    path: "/api/users/signin",
    statuses: StatusTable {
        rules: &[
            StatusRule::BodyOr {
                status: 400,
                fallback: "Invalid input",
            },
            StatusRule::Fixed {
                status: 401,
                message: "Invalid credentials",
            },
            StatusRule::Fixed {
                status: 500,
                message: "Server error. Try later",
            },
        ],
        body_fields: &["message"],
        fallback: "Sign in failed. Please try again",
    },
    busy_label: "Signing In...",
    invalid_title: "Error",
    rejected_title: "Sign In Failed",
    malformed_title: "Error",
    connection_title: "Connection Error",
    timeout_message: sign_in_timeout_message,
    unreachable_message: sign_in_unreachable_message,
    on_success: SuccessAction::Navigate(Route::FocusScreen),
};

pub static REGISTER: FlowSpec = FlowSpec {
    kind: FlowKind::Register,
    path: "/api/users/register",
    statuses: StatusTable {
        rules: &[
            StatusRule::BodyOr {
                status: 400,
                fallback: "Invalid input. Please check your details.",
            },
            StatusRule::Fixed {
                status: 409,
                message: "Username or email already exists",
            },
            StatusRule::Fixed {
                status: 500,
                message: "Server error. Please try again later.",
            },
        ],
        body_fields: &["message", "error"],
        fallback: "Please try again",
    },
    busy_label: "Creating Account...",
    invalid_title: "Error",
    rejected_title: "Registration Failed",
    malformed_title: "Connection Error",
    connection_title: "Connection Error",
    timeout_message: register_timeout_message,
    unreachable_message: register_unreachable_message,
    on_success: SuccessAction::AcknowledgeThenNavigate {
        title: "Success",
        message: "Account created successfully!",
        route: Route::FocusScreen,
    },
};

fn sign_in_timeout_message(base_url: &str) -> String {
    format!("Request timed out. Check backend at {base_url}")
}

fn sign_in_unreachable_message(base_url: &str) -> String {
    format!("Cannot reach server at {base_url}. Make sure backend is running.")
}

fn register_timeout_message(base_url: &str) -> String {
    let port = Url::parse(base_url)
        .ok()
        .and_then(|url| url.port_or_known_default())
        .map_or_else(|| "the configured port".to_string(), |port| format!("port {port}"));
    format!(
        "Connection timeout. Please check:\n\n\
         1. Backend is running on {port}\n\
         2. Using correct URL: {base_url}\n\
         3. No firewall blocking the connection"
    )
}

fn register_unreachable_message(base_url: &str) -> String {
    format!(
        "Cannot reach server at {base_url}\n\n\
         Make sure:\n\
         1. Backend server is running\n\
         2. You're using the correct IP address"
    )
}
