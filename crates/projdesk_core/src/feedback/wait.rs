//! Bounded waiting on watched state.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The predicate did not hold within the bound.
    TimedOut(Duration),
    /// The publishing side went away before the predicate held.
    Closed,
}

impl Display for WaitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut(bound) => {
                write!(f, "condition not met within {} ms", bound.as_millis())
            }
            Self::Closed => write!(f, "watched state was dropped before condition was met"),
        }
    }
}

impl Error for WaitError {}

/// Waits until `predicate` holds for the watched value or `timeout` elapses.
///
/// The current value is checked first, so an already-satisfied condition
/// returns immediately.
pub async fn wait_until<T, F>(
    rx: &mut watch::Receiver<T>,
    timeout: Duration,
    predicate: F,
) -> Result<T, WaitError>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    match tokio::time::timeout(timeout, rx.wait_for(predicate)).await {
        Ok(Ok(value)) => Ok((*value).clone()),
        Ok(Err(_)) => Err(WaitError::Closed),
        Err(_) => Err(WaitError::TimedOut(timeout)),
    }
}
