//! Error types for the concierge.

use crate::dialog::state::DialogStep;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned an empty reply")]
    EmptyReply { provider: String },
}

/// Rejected dialog input.
///
/// None of these is ever shown to the visitor. The presentation layer hides
/// the affordance that would produce them; the engine refuses the event and
/// leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("Input refused while the agent is composing (step {step})")]
    Busy { step: DialogStep },

    #[error("Event {event} is not accepted in step {step}")]
    NotAccepting { step: DialogStep, event: &'static str },

    #[error("Input is empty after trimming")]
    EmptyInput,

    #[error("Day {day} is outside the visible month (1..={days_in_month})")]
    DayOutOfRange { day: u32, days_in_month: u32 },

    #[error("Cannot move the calendar {delta} months from the visible one")]
    MonthOutOfRange { delta: i32 },

    #[error("Both check-in and check-out must be selected")]
    RangeIncomplete,

    #[error("No chat session has been initialized")]
    NoSession,
}

/// Result type alias for the concierge.
pub type Result<T> = std::result::Result<T, Error>;
