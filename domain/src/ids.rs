//! Identifier newtypes used throughout the orchestration core.
//!
//! IDs are hand-rolled from a nanosecond timestamp rather than pulled from an
//! external UUID crate — every identifier in this crate follows the same
//! `{prefix}-{timestamp-hex}-{counter}` shape so two IDs minted in the same
//! nanosecond never collide.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a unique, sortable-by-creation token. Not a UUID — just unique.
fn generate_token(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{prefix}-{nanos:x}-{seq:04x}")
}

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing string as an identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh, process-unique identifier.
            pub fn generate() -> Self {
                Self(generate_token($prefix))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<T: Into<String>> From<T> for $name {
            fn from(s: T) -> Self {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a registered [`crate::agent::Agent`].
    AgentId,
    "agent"
);
id_newtype!(
    /// Unique identifier for a submitted [`crate::problem::Problem`].
    ProblemId,
    "problem"
);
id_newtype!(
    /// Unique identifier for a [`crate::problem::SubProblem`].
    SubProblemId,
    "subproblem"
);
id_newtype!(
    /// Unique identifier for a [`crate::crew::Task`].
    TaskId,
    "task"
);
id_newtype!(
    /// Unique identifier for a [`crate::vote::VotingSession`].
    VotingSessionId,
    "vsession"
);
id_newtype!(
    /// Unique identifier for a [`crate::consensus::Proposal`].
    ProposalId,
    "proposal"
);
id_newtype!(
    /// Unique identifier for a [`crate::swarm::Swarm`].
    SwarmId,
    "swarm"
);
id_newtype!(
    /// Unique identifier for a [`crate::crew::Crew`].
    CrewId,
    "crew"
);
id_newtype!(
    /// Unique identifier for a [`crate::pool::Reservation`] token.
    ReservationId,
    "reservation"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = AgentId::generate();
        let b = AgentId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("agent-"));
    }

    #[test]
    fn wraps_existing_string() {
        let id: TaskId = "t1".into();
        assert_eq!(id.as_str(), "t1");
        assert_eq!(id.to_string(), "t1");
    }
}
