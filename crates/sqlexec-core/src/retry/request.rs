//! Originating request of a failed attempt, as far as diagnostics care.

use crate::handle::{Guid, OperationHandle, SessionHandle};

/// Which server-side object a request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Session-level calls (open/close session, execute statement).
    SessionScoped(SessionHandle),
    /// Calls against one execution (status poll, fetch, cancel, close).
    OperationScoped(OperationHandle),
    /// Anything else (e.g. opening a session).
    Plain,
}

impl Request {
    pub fn session(session_id: Guid) -> Self {
        Request::SessionScoped(SessionHandle { session_id })
    }

    pub fn operation(operation_id: Guid) -> Self {
        Request::OperationScoped(OperationHandle { operation_id })
    }

    /// Session id, if this request carries a session handle.
    pub fn session_id(&self) -> Option<Guid> {
        match self {
            Request::SessionScoped(h) => Some(h.session_id),
            Request::OperationScoped(_) | Request::Plain => None,
        }
    }

    /// Query id, if this request carries an operation handle.
    pub fn query_id(&self) -> Option<Guid> {
        match self {
            Request::OperationScoped(h) => Some(h.operation_id),
            Request::SessionScoped(_) | Request::Plain => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_variant() {
        let g = Guid::random();
        assert_eq!(Request::session(g).session_id(), Some(g));
        assert_eq!(Request::session(g).query_id(), None);
        assert_eq!(Request::operation(g).query_id(), Some(g));
        assert_eq!(Request::operation(g).session_id(), None);
        assert_eq!(Request::Plain.session_id(), None);
        assert_eq!(Request::Plain.query_id(), None);
    }
}
