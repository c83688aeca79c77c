//! Blocking confirmation gate.
//!
//! A workflow that needs confirmation parks its action here and suspends.
//! It resumes only through `answer`, with the request id it was handed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RequestId = u64;

/// User answer to a pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation<A> {
    pub request_id: RequestId,
    pub action: A,
    pub title: String,
    pub message: String,
}

/// Resolution handed back to the suspended workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<A> {
    Accepted(A),
    Dismissed(A),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmError {
    /// Another confirmation must be answered first.
    AlreadyPending(RequestId),
    /// Nothing is waiting for an answer.
    NothingPending,
    /// The answer targets a request that is no longer pending.
    StaleRequest {
        answered: RequestId,
        pending: RequestId,
    },
}

impl Display for ConfirmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyPending(id) => write!(f, "confirmation {id} is still pending"),
            Self::NothingPending => write!(f, "no confirmation is pending"),
            Self::StaleRequest { answered, pending } => write!(
                f,
                "answer for confirmation {answered} does not match pending {pending}"
            ),
        }
    }
}

impl Error for ConfirmError {}

#[derive(Debug)]
pub struct ConfirmationGate<A> {
    next_id: RequestId,
    pending: Option<PendingConfirmation<A>>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: None,
        }
    }
}

impl<A: Clone> ConfirmationGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `action` until answered.
    ///
    /// # Errors
    /// - `AlreadyPending` when another request is still open.
    pub fn request(
        &mut self,
        action: A,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<RequestId, ConfirmError> {
        if let Some(pending) = &self.pending {
            return Err(ConfirmError::AlreadyPending(pending.request_id));
        }
        let request_id = self.next_id;
        self.next_id += 1;
        self.pending = Some(PendingConfirmation {
            request_id,
            action,
            title: title.into(),
            message: message.into(),
        });
        Ok(request_id)
    }

    pub fn pending(&self) -> Option<&PendingConfirmation<A>> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves the pending request.
    ///
    /// A stale or missing request leaves the gate untouched.
    pub fn answer(
        &mut self,
        request_id: RequestId,
        decision: Decision,
    ) -> Result<Resolution<A>, ConfirmError> {
        let pending_id = match &self.pending {
            Some(pending) => pending.request_id,
            None => return Err(ConfirmError::NothingPending),
        };
        if pending_id != request_id {
            return Err(ConfirmError::StaleRequest {
                answered: request_id,
                pending: pending_id,
            });
        }

        let pending = self.pending.take().ok_or(ConfirmError::NothingPending)?;
        Ok(match decision {
            Decision::Accept => Resolution::Accepted(pending.action),
            Decision::Dismiss => Resolution::Dismissed(pending.action),
        })
    }

    /// Escape gesture: drops whatever is pending.
    pub fn dismiss(&mut self) -> Option<PendingConfirmation<A>> {
        self.pending.take()
    }
}
