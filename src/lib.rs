//! Resort Concierge — guided booking intake with a chat hand-off.

pub mod config;
pub mod dialog;
pub mod error;
pub mod llm;
pub mod terminal;
