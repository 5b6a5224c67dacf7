//! Error types for the learnzone core library.

use thiserror::Error;

use crate::types::ZoneId;

/// Top-level error type for all learnzone core operations.
#[derive(Error, Debug)]
pub enum LearnZoneError {
    /// Input was empty or malformed (empty chat text, missing drag payload).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The zone is still locked for the player's current level.
    #[error("Zone {zone} is locked until level {required_level} (current level: {current_level})")]
    LockedZone {
        /// The locked zone.
        zone: ZoneId,
        /// Level required to enter.
        required_level: u32,
        /// The player's level at the time of the attempt.
        current_level: u32,
    },

    /// The zone exists but carries no challenge.
    #[error("Zone {0} has no challenge")]
    NoChallenge(ZoneId),

    /// No zone with this ID exists in the registry.
    #[error("Zone not found: {0}")]
    UnknownZone(ZoneId),

    /// An operation needed an open challenge but none is open.
    #[error("No challenge is currently open")]
    NoActiveChallenge,

    /// A challenge is already open; close it before opening another.
    #[error("Challenge in zone {0} is already open")]
    ChallengeAlreadyOpen(ZoneId),

    /// `run()` was called with an empty workspace.
    #[error("No item placed in the workspace")]
    NoItemPlaced,

    /// The placed item does not solve the challenge.
    #[error("Wrong item: expected {expected}, placed {placed}")]
    WrongItem {
        /// Item type the solution requires.
        expected: String,
        /// Item type that was placed.
        placed: String,
    },

    /// The dropped item does not come from the open challenge's toolbox.
    #[error("Item type {0} is not part of this challenge's toolbox")]
    ForeignItem(String),

    /// The challenge was solved and is waiting to auto-close; it is read-only.
    #[error("Challenge is closing and can no longer be modified")]
    ChallengeClosing,

    /// No registered account exists in the local store.
    #[error("No registered account found")]
    AccountNotFound,

    /// Email or password did not match the stored record.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password and confirmation differ at registration.
    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    /// Payment form was submitted with missing fields.
    #[error("Payment details incomplete: {0}")]
    IncompletePayment(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LearnZoneError>;
