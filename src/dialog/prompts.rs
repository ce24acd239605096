//! System instruction and opening utterance for the free-chat hand-off.

use serde::{Deserialize, Serialize};

use super::model::Selections;

/// Who the agent is once the scripted part is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub resort: String,
    /// Expressions the agent should sprinkle into replies.
    pub slang: Vec<String>,
    /// Attractions the agent should recommend.
    pub highlights: Vec<String>,
    /// What the agent invites the visitor to do at the end.
    pub call_to_action: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Guia Country".to_string(),
            resort: "Barretos Country Resort".to_string(),
            slang: vec!["Uai".to_string(), "Bão".to_string(), "Segura Peão".to_string()],
            highlights: vec!["a Praia Termal".to_string(), "a Fazendinha".to_string()],
            call_to_action: "Convide-o a girar a roleta ao final.".to_string(),
        }
    }
}

/// Build the system instruction for the chat session from what the intake
/// collected.
pub fn system_instruction(persona: &Persona, selections: &Selections) -> String {
    let slang = persona
        .slang
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let mut parts = vec![format!(
        "Você é o \"{}\", assistente do {}.",
        persona.name, persona.resort
    )];

    if !selections.name().is_empty() {
        parts.push(format!("O usuário é {}.", selections.name()));
    }

    let trip = [selections.party_label(), selections.date_description()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !trip.is_empty() {
        parts.push(format!("Vai viajar com {trip}."));
    }

    if !slang.is_empty() {
        parts.push(format!("Use gírias caipiras ({slang})."));
    }

    if !persona.highlights.is_empty() {
        parts.push(format!("Recomende {}.", join_pt(&persona.highlights)));
    }

    if !persona.call_to_action.is_empty() {
        parts.push(persona.call_to_action.clone());
    }

    parts.join(" ")
}

/// First utterance sent on the visitor's behalf right after hand-off.
pub fn greeting_utterance(selections: &Selections) -> String {
    format!("Sou {}, receba-me!", selections.name())
}

/// "a", "a e b", "a, b e c"
fn join_pt(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} e {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::model::PartyKind;

    fn full_selections() -> Selections {
        Selections {
            party: Some(PartyKind::FamilyWithChildren),
            date_description: Some("10/03/2026 até 13/03/2026 (3 noites)".to_string()),
            name: Some("Ana".to_string()),
        }
    }

    #[test]
    fn instruction_includes_all_selections() {
        let prompt = system_instruction(&Persona::default(), &full_selections());
        assert!(prompt.starts_with("Você é o \"Guia Country\", assistente do Barretos Country Resort."));
        assert!(prompt.contains("O usuário é Ana."));
        assert!(prompt.contains(
            "Vai viajar com Família com crianças 10/03/2026 até 13/03/2026 (3 noites)."
        ));
        assert!(prompt.contains("\"Uai\", \"Bão\", \"Segura Peão\""));
        assert!(prompt.contains("Recomende a Praia Termal e a Fazendinha."));
        assert!(prompt.ends_with("Convide-o a girar a roleta ao final."));
    }

    #[test]
    fn instruction_skips_missing_pieces() {
        let prompt = system_instruction(&Persona::default(), &Selections::default());
        assert!(!prompt.contains("O usuário é"));
        assert!(!prompt.contains("Vai viajar"));
    }

    #[test]
    fn custom_persona() {
        let persona = Persona {
            name: "Peão".into(),
            slang: vec![],
            highlights: vec!["o Rodeio".into()],
            call_to_action: String::new(),
            ..Persona::default()
        };
        let prompt = system_instruction(&persona, &full_selections());
        assert!(prompt.contains("\"Peão\""));
        assert!(!prompt.contains("gírias"));
        assert!(prompt.ends_with("Recomende o Rodeio."));
    }

    #[test]
    fn greeting_names_the_visitor() {
        assert_eq!(greeting_utterance(&full_selections()), "Sou Ana, receba-me!");
    }

    #[test]
    fn join_pt_lists() {
        let items = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_pt(&items(&[])), "");
        assert_eq!(join_pt(&items(&["a"])), "a");
        assert_eq!(join_pt(&items(&["a", "b", "c"])), "a, b e c");
    }
}
