//! Guided intake dialog — scripted qualification followed by free chat.
//!
//! The agent greets the visitor, optionally explains the resort, then asks
//! who is travelling, when, and the visitor's name. Agent lines are revealed
//! one at a time behind a composing indicator. Once the name is in, the
//! collected selections frame a chat session with a generative backend and
//! the conversation continues freely.

pub mod calendar;
pub mod engine;
pub mod messages;
pub mod model;
pub mod prompts;
pub mod reveal;
pub mod script;
pub mod session;
pub mod state;

pub use calendar::{CalendarRangePicker, ConfirmedRange, DayMark, YearMonth, compute_nights};
pub use engine::{Affordance, DialogEngine, DialogSnapshot, UiEvent};
pub use messages::{Message, MessageLog, Sender};
pub use model::{DateWindow, Familiarity, PartyKind, Selections};
pub use prompts::{Persona, greeting_utterance, system_instruction};
pub use script::{PartyBridges, Script, ScriptedLine};
pub use session::{ChatSession, ChatSessionAdapter};
pub use state::DialogStep;
