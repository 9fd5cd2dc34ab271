//! Lifecycle of a message inside the durable work queue

use std::fmt;

/// Represents where a queued message currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageState {
    /// Waiting to be handed to a consumer
    Ready,

    /// Handed to a consumer and not yet acknowledged or rejected
    Unacked,
}

impl MessageState {
    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Unacked => "unacked",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ready" => Some(Self::Ready),
            "unacked" => Some(Self::Unacked),
            _ => None,
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_string() {
        assert_eq!(MessageState::from_db_string("ready"), Some(MessageState::Ready));
        assert_eq!(
            MessageState::from_db_string("unacked"),
            Some(MessageState::Unacked)
        );
        assert_eq!(MessageState::from_db_string("acked"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", MessageState::Unacked), "unacked");
    }
}
