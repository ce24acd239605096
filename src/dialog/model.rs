//! Intake choices and the selections accumulated during the dialog.

use serde::{Deserialize, Serialize};

/// Answer to "do you already know the resort?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Familiarity {
    Familiar,
    NotFamiliar,
}

impl Familiarity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Familiar => "✅ Já conheço",
            Self::NotFamiliar => "👀 Ainda não conheço",
        }
    }
}

/// Who the trip is for.
///
/// `Other` carries a label that matched none of the known categories; it is
/// never offered as a choice but is accepted and answered with the generic
/// bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    FamilyWithChildren,
    Couple,
    FriendGroup,
    Other(String),
}

impl PartyKind {
    /// The categories offered at the party step, in display order.
    pub const OFFERED: [PartyKind; 3] = [
        PartyKind::FamilyWithChildren,
        PartyKind::Couple,
        PartyKind::FriendGroup,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::FamilyWithChildren => "Família com crianças",
            Self::Couple => "Casal",
            Self::FriendGroup => "Grupo de amigos",
            Self::Other(label) => label,
        }
    }

    /// Map a displayed label back to its category.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        Self::OFFERED
            .into_iter()
            .find(|kind| kind.label() == trimmed)
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Vague travel windows offered when the visitor has no fixed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    Next30Days,
    Next3Months,
    SchoolHolidays,
    JustBrowsing,
}

impl DateWindow {
    pub const ALL: [DateWindow; 4] = [
        DateWindow::Next30Days,
        DateWindow::Next3Months,
        DateWindow::SchoolHolidays,
        DateWindow::JustBrowsing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Next30Days => "📅 Próximos 30 dias",
            Self::Next3Months => "📅 Próximos 3 meses",
            Self::SchoolHolidays => "📅 Férias escolares",
            Self::JustBrowsing => "📅 Só pesquisando",
        }
    }
}

/// What the dialog has learned so far. Filled field by field, read in full
/// once at hand-off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<PartyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Selections {
    pub fn party_label(&self) -> &str {
        self.party.as_ref().map(PartyKind::label).unwrap_or_default()
    }

    pub fn date_description(&self) -> &str {
        self.date_description.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Every intake answer is in. Logged at hand-off.
    pub fn is_complete(&self) -> bool {
        self.party.is_some() && self.date_description.is_some() && self.name.is_some()
    }
}
