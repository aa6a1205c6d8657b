// Error taxonomy for portal operations
//
// Every variant except `Storage` is a recoverable condition reported back to the
// caller with no mutation applied.

use thiserror::Error;

/// Entity kinds that can fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Event,
    Participation,
    Reward,
    RewardRequest,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::User => write!(f, "user"),
            Entity::Event => write!(f, "event"),
            Entity::Participation => write!(f, "participation"),
            Entity::Reward => write!(f, "reward"),
            Entity::RewardRequest => write!(f, "reward request"),
        }
    }
}

/// Preconditions whose violation leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("event is no longer accepting participants")]
    EventInactive,

    #[error("already joined this event")]
    AlreadyJoined,

    #[error("insufficient stamps: {required} required, {available} available")]
    InsufficientStamps { required: i32, available: i32 },
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("permission denied")]
    PermissionDenied,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    PreconditionFailed(#[from] Precondition),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PortalError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for conditions the caller can act on (everything except storage failures).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
