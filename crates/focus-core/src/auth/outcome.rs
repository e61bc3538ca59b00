//! Turns an [`Outcome`] into user-visible effects.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::spec::{FlowSpec, Route, SuccessAction};
use super::types::{FailureKind, Outcome};

/// A titled message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// The UI side of a flow: message display and navigation.
pub trait Presenter {
    /// Called once the request is about to be sent.
    fn show_busy(&mut self, label: &str);

    fn show_notice(&mut self, notice: &Notice);

    /// Shows `notice` and resolves when the user dismisses it.
    fn acknowledge(&mut self, notice: &Notice) -> impl Future<Output = anyhow::Result<()>>;

    fn navigate(&mut self, route: Route);
}

/// Builds the notice for a failed outcome.
///
/// Timeout and unreachable messages name `base_url`; the others show the
/// classified message verbatim.
pub fn failure_notice(spec: &FlowSpec, kind: FailureKind, message: &str, base_url: &str) -> Notice {
    match kind {
        FailureKind::Timeout => Notice::new(spec.connection_title, (spec.timeout_message)(base_url)),
        FailureKind::Unreachable => {
            Notice::new(spec.connection_title, (spec.unreachable_message)(base_url))
        }
        FailureKind::MalformedResponse => Notice::new(spec.malformed_title, message),
        FailureKind::Rejected => Notice::new(spec.rejected_title, message),
    }
}

/// How [`handle_outcome`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Done,
    /// `cancel` fired while waiting on the user; nothing was navigated.
    Cancelled,
}

/// Applies `outcome` for the flow described by `spec`.
///
/// Sign-in navigates on success right away; registration navigates only
/// after the acknowledgement is dismissed. A pending acknowledgement is
/// abandoned when `cancel` fires. Clearing the loading flag is the
/// caller's job.
pub async fn handle_outcome<P: Presenter>(
    outcome: &Outcome,
    spec: &FlowSpec,
    base_url: &str,
    presenter: &mut P,
    cancel: &CancellationToken,
) -> Handled {
    match outcome {
        Outcome::Success(_) => match spec.on_success {
            SuccessAction::Navigate(route) => {
                info!(flow = %spec.kind, %route, "navigating");
                presenter.navigate(route);
            }
            SuccessAction::AcknowledgeThenNavigate {
                title,
                message,
                route,
            } => {
                let notice = Notice::new(title, message);
                let dismissed = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        info!(flow = %spec.kind, "cancelled while awaiting acknowledgement");
                        return Handled::Cancelled;
                    }
                    result = presenter.acknowledge(&notice) => result,
                };
                match dismissed {
                    Ok(()) => {
                        info!(flow = %spec.kind, %route, "acknowledged, navigating");
                        presenter.navigate(route);
                    }
                    Err(err) => {
                        warn!(flow = %spec.kind, error = %err, "acknowledgement not dismissed");
                    }
                }
            }
        },
        Outcome::Failure(failure) => {
            presenter.show_notice(&failure_notice(
                spec,
                failure.kind,
                &failure.message,
                base_url,
            ));
        }
    }
    Handled::Done
}
