//! Sign-in and registration command handlers.

use anyhow::{Result, anyhow};
use focus_core::auth::{
    AuthClient, AuthForm, Credentials, FailureKind, FlowKind, HttpTransport, Outcome,
    RegistrationRequest, RequestState, Route, Submission,
};
use focus_core::interrupt::{self, InterruptedError};
use tokio_util::sync::CancellationToken;

use crate::presenter::TerminalPresenter;

/// The flow ended in a failure that was already shown to the user.
#[derive(Debug)]
pub struct FlowFailed;

impl std::fmt::Display for FlowFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Flow failed")
    }
}

impl std::error::Error for FlowFailed {}

pub async fn sign_in(base_url: String, credentials: Credentials) -> Result<()> {
    submit(base_url, credentials).await
}

pub async fn register(base_url: String, request: RegistrationRequest) -> Result<()> {
    submit(base_url, request).await
}

async fn submit<F: AuthForm>(base_url: String, form: F) -> Result<()> {
    let flow = F::spec().kind;
    let client = AuthClient::new(HttpTransport::new()?, base_url);
    let state = RequestState::new();
    let cancel = CancellationToken::new();
    interrupt::cancel_on_ctrl_c(&cancel);

    let mut presenter = TerminalPresenter::stdio();
    let submission = client.submit(&state, form, &mut presenter, &cancel).await;
    cancel.cancel();

    finish(flow, &submission)
}

/// Maps a finished submission to the process result.
fn finish(flow: FlowKind, submission: &Submission) -> Result<()> {
    match submission {
        Submission::Completed(Outcome::Success(body)) => {
            if let Some(username) = body.profile().and_then(|profile| profile.username) {
                match flow {
                    FlowKind::SignIn => println!("Signed in as {username}"),
                    FlowKind::Register => println!("Welcome, {username}"),
                }
            }
            Ok(())
        }
        Submission::Completed(Outcome::Failure(failure)) => {
            if failure.kind == FailureKind::Rejected {
                eprintln!("{}", reciprocal_hint(flow));
            }
            Err(FlowFailed.into())
        }
        Submission::Invalid(_) => Err(FlowFailed.into()),
        Submission::Cancelled => Err(InterruptedError.into()),
        Submission::Ignored => Err(anyhow!("A request is already in progress")),
    }
}

fn reciprocal_hint(flow: FlowKind) -> String {
    match flow.reciprocal() {
        Route::SignUp => "Don't have an account? Sign up with `focus register`".to_string(),
        Route::SignIn | Route::FocusScreen => {
            "Already have an account? Log in with `focus signin`".to_string()
        }
    }
}
