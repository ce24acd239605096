//! Dialog step discriminant, the single value that decides which prompt and
//! which choices are on screen.

use serde::{Deserialize, Serialize};

/// The steps of the guided intake.
///
/// Progresses forward only: Greeting → KnowledgeCheck → (Explanation) →
/// PartySelect → DateDecision → (CalendarPick | DateCategoryPick) →
/// NameCapture → FreeChat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogStep {
    #[default]
    Greeting,
    KnowledgeCheck,
    Explanation,
    PartySelect,
    DateDecision,
    CalendarPick,
    DateCategoryPick,
    NameCapture,
    FreeChat,
}

impl DialogStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialogStep) -> bool {
        use DialogStep::*;
        matches!(
            (self, target),
            (Greeting, KnowledgeCheck)
                | (KnowledgeCheck, Explanation)
                | (KnowledgeCheck, PartySelect)
                | (Explanation, PartySelect)
                | (PartySelect, DateDecision)
                | (DateDecision, CalendarPick)
                | (DateDecision, DateCategoryPick)
                | (CalendarPick, NameCapture)
                | (DateCategoryPick, NameCapture)
                | (NameCapture, FreeChat)
        )
    }

    /// Position in the forward ordering. The two date branches share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Greeting => 0,
            Self::KnowledgeCheck => 1,
            Self::Explanation => 2,
            Self::PartySelect => 3,
            Self::DateDecision => 4,
            Self::CalendarPick | Self::DateCategoryPick => 5,
            Self::NameCapture => 6,
            Self::FreeChat => 7,
        }
    }

    /// Whether this step is terminal (scripted part is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FreeChat)
    }
}

impl std::fmt::Display for DialogStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::KnowledgeCheck => "knowledge_check",
            Self::Explanation => "explanation",
            Self::PartySelect => "party_select",
            Self::DateDecision => "date_decision",
            Self::CalendarPick => "calendar_pick",
            Self::DateCategoryPick => "date_category_pick",
            Self::NameCapture => "name_capture",
            Self::FreeChat => "free_chat",
        };
        write!(f, "{s}")
    }
}
