//! Shared orchestration for both flows:
//! validate → dispatch → interpret → handle.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dispatch::{DispatchError, REQUEST_TIMEOUT, Transport, dispatch};
use super::interpret::interpret;
use super::outcome::{Handled, Notice, Presenter, handle_outcome};
use super::spec::{FlowSpec, REGISTER, SIGN_IN};
use super::state::RequestState;
use super::types::{
    Credentials, Failure, FailureKind, Outcome, RegisterPayload, RegistrationRequest,
    SignInPayload,
};
use super::validate::ValidationError;

/// Form input for one flow.
pub trait AuthForm {
    /// Exact field subset sent on the wire.
    type Payload: Serialize;

    fn spec() -> &'static FlowSpec;

    /// # Errors
    /// Returns the reason the form cannot be submitted.
    fn check(&self) -> Result<(), ValidationError>;

    fn into_payload(self) -> Self::Payload;

    /// Payload field names, for logging without values.
    fn payload_fields() -> &'static [&'static str];
}

impl AuthForm for Credentials {
    type Payload = SignInPayload;

    fn spec() -> &'static FlowSpec {
        &SIGN_IN
    }

    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn into_payload(self) -> SignInPayload {
        self.into()
    }

    fn payload_fields() -> &'static [&'static str] {
        &["email", "password"]
    }
}

impl AuthForm for RegistrationRequest {
    type Payload = RegisterPayload;

    fn spec() -> &'static FlowSpec {
        &REGISTER
    }

    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn into_payload(self) -> RegisterPayload {
        self.into()
    }

    fn payload_fields() -> &'static [&'static str] {
        &["username", "email", "password"]
    }
}

/// How one call to [`AuthClient::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A request for this flow was already in flight; nothing happened.
    Ignored,
    /// Rejected locally; no request was sent.
    Invalid(ValidationError),
    /// The caller cancelled before the flow finished: while the request
    /// was in flight or while awaiting the acknowledgement.
    Cancelled,
    /// A request was sent and its outcome handled.
    Completed(Outcome),
}

/// Submits sign-in and registration forms to one backend.
#[derive(Debug, Clone)]
pub struct AuthClient<T> {
    transport: T,
    base_url: String,
    timeout: Duration,
}

impl<T: Transport> AuthClient<T> {
    /// Client with the fixed 15 second request bound.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs one complete flow for `form`.
    ///
    /// Returns [`Submission::Ignored`] without side effects when `state`
    /// already has a request in flight. Otherwise the loading flag is set
    /// for the duration of the call and cleared on every exit path,
    /// including a presenter that panics or a caller that drops the future.
    pub async fn submit<F, P>(
        &self,
        state: &RequestState,
        form: F,
        presenter: &mut P,
        cancel: &CancellationToken,
    ) -> Submission
    where
        F: AuthForm,
        P: Presenter,
    {
        let spec = F::spec();
        let Some(in_flight) = state.begin() else {
            debug!(flow = %spec.kind, "request already in flight, ignoring submission");
            return Submission::Ignored;
        };

        if let Err(reason) = form.check() {
            info!(flow = %spec.kind, reason = reason.reason(), "form rejected");
            presenter.show_notice(&Notice::new(spec.invalid_title, reason.message()));
            return Submission::Invalid(reason);
        }

        let url = spec.endpoint(&self.base_url);
        debug!(flow = %spec.kind, fields = ?F::payload_fields(), "request body prepared");
        presenter.show_busy(spec.busy_label);

        let payload = form.into_payload();
        let outcome = match dispatch(&self.transport, &url, &payload, self.timeout, cancel).await {
            Ok(raw) => interpret(&raw, &spec.statuses),
            Err(err) => match failure_kind(&err) {
                Some(kind) => Outcome::Failure(Failure::new(kind, err.to_string())),
                None => return Submission::Cancelled,
            },
        };

        match &outcome {
            Outcome::Success(_) => info!(flow = %spec.kind, "request succeeded"),
            Outcome::Failure(failure) => warn!(
                flow = %spec.kind,
                kind = %failure.kind,
                status = ?failure.status,
                message = %failure.message,
                "request failed"
            ),
        }

        let handled = handle_outcome(&outcome, spec, &self.base_url, presenter, cancel).await;
        drop(in_flight);
        match handled {
            Handled::Done => Submission::Completed(outcome),
            Handled::Cancelled => Submission::Cancelled,
        }
    }
}

/// `None` when the caller cancelled; that is not a failure to show.
fn failure_kind(err: &DispatchError) -> Option<FailureKind> {
    match err {
        DispatchError::Timeout(_) => Some(FailureKind::Timeout),
        DispatchError::Transport(_) | DispatchError::Encode(_) => Some(FailureKind::Unreachable),
        DispatchError::Cancelled => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::auth::dispatch::TransportError;
    use crate::auth::dispatch::tests::ScriptedTransport;
    use crate::auth::outcome::tests::RecordingPresenter;
    use crate::auth::spec::Route;
    use crate::auth::types::ParsedBody;

    const BASE: &str = "http://127.0.0.1:8080";

    fn registration(password: &str, confirm: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_sign_in_sends_nothing() {
        let transport = ScriptedTransport::replying(200, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        let submission = client
            .submit(
                &state,
                Credentials::new("ana@example.com", ""),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            submission,
            Submission::Invalid(ValidationError::MissingCredentials)
        );
        assert_eq!(transport.call_count(), 0);
        assert_eq!(
            presenter.notices,
            vec![Notice::new("Error", "Please enter email and password")]
        );
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_sends_nothing() {
        let transport = ScriptedTransport::replying(200, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        let submission = client
            .submit(
                &state,
                registration("secret", "Secret"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            submission,
            Submission::Invalid(ValidationError::PasswordMismatch)
        );
        assert_eq!(transport.call_count(), 0);
        assert_eq!(presenter.notices[0].message, "Passwords do not match");
    }

    #[tokio::test]
    async fn test_sign_in_success_posts_payload_and_navigates() {
        let transport = ScriptedTransport::replying(200, r#"{"id":1,"username":"ana"}"#);
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        let submission = client
            .submit(
                &state,
                Credentials::new("ana@example.com", "pw"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            submission,
            Submission::Completed(Outcome::Success(ParsedBody::from(
                json!({"id": 1, "username": "ana"})
            )))
        );
        assert_eq!(
            presenter.events,
            vec!["busy:Signing In...", "navigate:/focusScreen"]
        );
        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0].0, "http://127.0.0.1:8080/api/users/signin");
        drop(bodies);
        assert_eq!(
            transport.last_body(),
            json!({"email": "ana@example.com", "password": "pw"})
        );
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_register_never_transmits_confirmation() {
        let transport = ScriptedTransport::replying(201, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        client
            .submit(
                &state,
                registration("pw", "pw"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            transport.last_body(),
            json!({"username": "ana", "email": "ana@example.com", "password": "pw"})
        );
        assert_eq!(
            presenter.events,
            vec![
                "busy:Creating Account...",
                "acknowledge:Success",
                "navigate:/focusScreen"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_timeout_failure_and_clears_loading() {
        let transport = ScriptedTransport::silent();
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        let submission = client
            .submit(
                &state,
                Credentials::new("ana@example.com", "pw"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        let Submission::Completed(Outcome::Failure(failure)) = submission else {
            panic!("expected failure, got {submission:?}");
        };
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(!state.is_loading());
        assert_eq!(presenter.notices[0].title, "Connection Error");
        assert!(presenter.notices[0].message.contains(BASE));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let transport =
            ScriptedTransport::failing(TransportError::Connect("connection refused".to_string()));
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();

        let submission = client
            .submit(
                &state,
                registration("pw", "pw"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        let Submission::Completed(Outcome::Failure(failure)) = submission else {
            panic!("expected failure, got {submission:?}");
        };
        assert_eq!(failure.kind, FailureKind::Unreachable);
        assert_eq!(transport.call_count(), 1);
        assert!(presenter.routes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submission_while_loading_is_ignored() {
        let transport = ScriptedTransport::delayed(Duration::from_secs(1), 200, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut first_presenter = RecordingPresenter::default();
        let mut second_presenter = RecordingPresenter::default();
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            client.submit(
                &state,
                Credentials::new("ana@example.com", "pw"),
                &mut first_presenter,
                &cancel,
            ),
            client.submit(
                &state,
                Credentials::new("ana@example.com", "pw"),
                &mut second_presenter,
                &cancel,
            ),
        );

        assert!(matches!(first, Submission::Completed(Outcome::Success(_))));
        assert_eq!(second, Submission::Ignored);
        assert_eq!(transport.call_count(), 1);
        assert!(second_presenter.events.is_empty());
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_submission_shows_nothing_and_clears_loading() {
        let transport = ScriptedTransport::silent();
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let submission = client
            .submit(
                &state,
                Credentials::new("ana@example.com", "pw"),
                &mut presenter,
                &cancel,
            )
            .await;

        assert_eq!(submission, Submission::Cancelled);
        assert_eq!(presenter.events, vec!["busy:Signing In..."]);
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_awaiting_acknowledgement() {
        let transport = ScriptedTransport::replying(201, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter {
            hang_acknowledge: true,
            ..RecordingPresenter::default()
        };
        let cancel = CancellationToken::new();

        let (submission, ()) = tokio::join!(
            client.submit(&state, registration("pw", "pw"), &mut presenter, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                cancel.cancel();
            },
        );

        assert_eq!(submission, Submission::Cancelled);
        assert_eq!(
            presenter.events,
            vec!["busy:Creating Account...", "acknowledge:Success"]
        );
        assert!(presenter.routes.is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_cancelled_dispatch_is_not_a_failure() {
        assert_eq!(failure_kind(&DispatchError::Cancelled), None);
        assert_eq!(
            failure_kind(&DispatchError::Timeout(REQUEST_TIMEOUT)),
            Some(FailureKind::Timeout)
        );
        assert_eq!(
            failure_kind(&DispatchError::Transport(TransportError::Io("reset".to_string()))),
            Some(FailureKind::Unreachable)
        );
    }

    #[tokio::test]
    async fn test_dismissal_failure_still_clears_loading() {
        let transport = ScriptedTransport::replying(200, "");
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter {
            refuse_acknowledge: true,
            ..RecordingPresenter::default()
        };

        let submission = client
            .submit(
                &state,
                registration("pw", "pw"),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(submission, Submission::Completed(Outcome::Success(_))));
        assert!(!presenter.routes.contains(&Route::FocusScreen));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_rejection_preserves_form_for_resubmission() {
        let transport = ScriptedTransport::replying(401, r#"{"message":"ignored"}"#);
        let client = AuthClient::new(&transport, BASE);
        let state = RequestState::new();
        let mut presenter = RecordingPresenter::default();
        let credentials = Credentials::new("ana@example.com", "wrong");

        let submission = client
            .submit(
                &state,
                credentials.clone(),
                &mut presenter,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            submission,
            Submission::Completed(Outcome::Failure(Failure::rejected(
                401,
                "Invalid credentials"
            )))
        );
        assert_eq!(
            presenter.notices,
            vec![Notice::new("Sign In Failed", "Invalid credentials")]
        );

        // A second attempt is accepted once the first has concluded.
        let again = client
            .submit(&state, credentials, &mut presenter, &CancellationToken::new())
            .await;
        assert!(matches!(again, Submission::Completed(_)));
        assert_eq!(transport.call_count(), 2);
    }
}
