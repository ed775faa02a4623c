//! Decision table for the authenticated request cycle.
//!
//! A call moves `Idle -> Attempting`, and on a 401 through `Refreshing` and
//! `Retrying` at most once. Every other path ends the call. The table is
//! pure so the single-retry guarantee can be tested without a transport.

/// Where a call is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Attempting,
    Refreshing,
    Retrying,
    Failed,
}

/// What just happened to the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The caller issued the request
    Begin,
    /// 2xx response
    Succeeded,
    /// 401 response
    Unauthorized,
    /// Any other non-2xx response
    Rejected,
    /// The request never reached the server
    Unreachable,
    /// No refresh token is stored
    NoRefreshToken,
    /// The refresh exchange produced a new access token
    Refreshed,
    /// The refresh endpoint rejected the refresh token
    RefreshRejected,
}

/// What the client must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Send the original request with the current access token
    Send,
    /// Exchange the refresh token
    Refresh,
    /// Send the original request again with the refreshed token
    Resend,
    /// Hand the last response to the caller
    Return,
    /// Turn the last outcome into an error for the caller
    Propagate,
    /// Fail with `AuthenticationRequired`
    RequireLogin,
    /// Clear both tokens and fail with `SessionExpired`
    ExpireSession,
}

/// Next phase and action, or `None` if `event` cannot happen in `phase`
pub fn transition(phase: Phase, event: Event) -> Option<(Phase, Action)> {
    use Action::*;
    use Event::*;

    let next = match (phase, event) {
        (Phase::Idle, Begin) => (Phase::Attempting, Send),

        (Phase::Attempting, Succeeded) => (Phase::Idle, Return),
        (Phase::Attempting, Unauthorized) => (Phase::Refreshing, Refresh),
        (Phase::Attempting, Rejected | Unreachable) => (Phase::Failed, Propagate),

        (Phase::Refreshing, Refreshed) => (Phase::Retrying, Resend),
        (Phase::Refreshing, NoRefreshToken) => (Phase::Failed, RequireLogin),
        (Phase::Refreshing, RefreshRejected) => (Phase::Failed, ExpireSession),
        (Phase::Refreshing, Unreachable) => (Phase::Failed, Propagate),

        // The retried call is final; a second 401 means the fresh token is
        // not accepted either.
        (Phase::Retrying, Succeeded) => (Phase::Idle, Return),
        (Phase::Retrying, Unauthorized) => (Phase::Failed, ExpireSession),
        (Phase::Retrying, Rejected | Unreachable) => (Phase::Failed, Propagate),

        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: [Event; 8] = [
        Event::Begin,
        Event::Succeeded,
        Event::Unauthorized,
        Event::Rejected,
        Event::Unreachable,
        Event::NoRefreshToken,
        Event::Refreshed,
        Event::RefreshRejected,
    ];

    #[test]
    fn happy_path_returns_immediately() {
        let (phase, action) = transition(Phase::Idle, Event::Begin).unwrap();
        assert_eq!((phase, action), (Phase::Attempting, Action::Send));
        let (phase, action) = transition(phase, Event::Succeeded).unwrap();
        assert_eq!((phase, action), (Phase::Idle, Action::Return));
    }

    #[test]
    fn unauthorized_refreshes_then_resends_once() {
        let (phase, action) = transition(Phase::Attempting, Event::Unauthorized).unwrap();
        assert_eq!(action, Action::Refresh);
        let (phase, action) = transition(phase, Event::Refreshed).unwrap();
        assert_eq!((phase, action), (Phase::Retrying, Action::Resend));

        // No path from Retrying leads to another refresh.
        for event in EVENTS {
            if let Some((_, action)) = transition(Phase::Retrying, event) {
                assert_ne!(action, Action::Refresh);
                assert_ne!(action, Action::Resend);
            }
        }
    }

    #[test]
    fn refresh_failures() {
        assert_eq!(
            transition(Phase::Refreshing, Event::NoRefreshToken),
            Some((Phase::Failed, Action::RequireLogin))
        );
        assert_eq!(
            transition(Phase::Refreshing, Event::RefreshRejected),
            Some((Phase::Failed, Action::ExpireSession))
        );
        assert_eq!(
            transition(Phase::Refreshing, Event::Unreachable),
            Some((Phase::Failed, Action::Propagate))
        );
    }

    #[test]
    fn other_errors_are_not_retried() {
        assert_eq!(
            transition(Phase::Attempting, Event::Rejected),
            Some((Phase::Failed, Action::Propagate))
        );
        assert_eq!(
            transition(Phase::Attempting, Event::Unreachable),
            Some((Phase::Failed, Action::Propagate))
        );
    }

    #[test]
    fn failed_is_terminal() {
        for event in EVENTS {
            assert!(transition(Phase::Failed, event).is_none());
        }
    }

    #[test]
    fn refresh_happens_at_most_once_on_any_path() {
        // Exhaustively walk every event sequence from Idle and count refreshes.
        fn walk(phase: Phase, refreshes: u32, depth: u32) {
            assert!(refreshes <= 1, "more than one refresh");
            if depth == 0 {
                return;
            }
            for event in EVENTS {
                if let Some((next, action)) = transition(phase, event) {
                    let count = refreshes + u32::from(action == Action::Refresh);
                    if next == Phase::Idle && action == Action::Return {
                        assert!(count <= 1);
                        continue;
                    }
                    walk(next, count, depth - 1);
                }
            }
        }
        walk(Phase::Idle, 0, 6);
    }
}
