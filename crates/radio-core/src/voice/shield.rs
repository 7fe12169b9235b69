//! Conversion of collaborator faults into ordinary errors.
//!
//! Voice sessions belong to a foreign client that may panic on its own
//! internal races (a disconnect racing a gateway close, for instance).
//! These helpers catch the unwind and report it as
//! [`RadioError::Collaborator`].

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use radio_common::RadioError;

use super::types::{SessionStatus, VoiceSession};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Await a fallible collaborator future, mapping both its error and any
/// panic into `RadioError::Collaborator`.
pub(crate) async fn shielded<T, E, F>(what: &str, fut: F) -> Result<T, RadioError>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RadioError::Collaborator(format!("{what}: {e}"))),
        Err(payload) => Err(RadioError::Collaborator(format!(
            "{what} panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

/// Await `fut`, turning only a panic into `RadioError::Collaborator`. The
/// future's own output is passed through untouched.
pub(crate) async fn caught<F: Future>(what: &str, fut: F) -> Result<F::Output, RadioError> {
    AssertUnwindSafe(fut).catch_unwind().await.map_err(|payload| {
        RadioError::Collaborator(format!(
            "{what} panicked: {}",
            panic_message(payload.as_ref())
        ))
    })
}

/// Synchronous counterpart of [`shielded`] for infallible calls.
pub(crate) fn shielded_sync<T>(what: &str, f: impl FnOnce() -> T) -> Result<T, RadioError> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        RadioError::Collaborator(format!(
            "{what} panicked: {}",
            panic_message(payload.as_ref())
        ))
    })
}

/// Session status, with a faulting session reported as closed.
pub(crate) fn probe_status(session: &Arc<dyn VoiceSession>) -> SessionStatus {
    shielded_sync("status", || session.status()).unwrap_or(SessionStatus::Closed)
}

/// Whether two handles point at the same session object.
pub(crate) fn same_session(a: &Arc<dyn VoiceSession>, b: &Arc<dyn VoiceSession>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
