//! Sign-in and registration request flows.
//!
//! One submission runs validate → dispatch → interpret → handle. Both flows
//! share the same orchestration routine in [`flow`]; what differs between
//! them lives in their static [`FlowSpec`].

pub mod dispatch;
pub mod flow;
pub mod interpret;
pub mod outcome;
pub mod spec;
pub mod state;
pub mod types;
pub mod validate;

pub use dispatch::{DispatchError, HttpTransport, REQUEST_TIMEOUT, Transport, TransportError};
pub use flow::{AuthClient, AuthForm, Submission};
pub use interpret::interpret;
pub use outcome::{Handled, Notice, Presenter, handle_outcome};
pub use spec::{FlowKind, FlowSpec, REGISTER, Route, SIGN_IN, StatusRule, StatusTable, SuccessAction};
pub use state::{InFlight, RequestState};
pub use types::{
    Credentials, Failure, FailureKind, Outcome, ParsedBody, RawResponse, RegisterPayload,
    RegistrationRequest, SignInPayload, UserProfile,
};
pub use validate::ValidationError;
