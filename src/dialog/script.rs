//! Scripted copy for the guided intake.
//!
//! Everything the agent says before the hand-off lives here as data, together
//! with the reveal delay that precedes it. The engine only decides *which*
//! line to reveal; hosts can swap the copy without touching transition logic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::PartyKind;

/// One agent line and the composing delay shown before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedLine {
    pub text: String,
    pub delay_ms: u64,
}

impl ScriptedLine {
    pub fn new(text: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            delay_ms,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Acknowledgements for each party category, plus the generic one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBridges {
    pub family_with_children: String,
    pub couple: String,
    pub friend_group: String,
    pub fallback: String,
}

impl PartyBridges {
    pub fn for_party(&self, party: &PartyKind) -> &str {
        match party {
            PartyKind::FamilyWithChildren => &self.family_with_children,
            PartyKind::Couple => &self.couple,
            PartyKind::FriendGroup => &self.friend_group,
            PartyKind::Other(_) => &self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    pub welcome: ScriptedLine,
    pub knowledge_prompt: ScriptedLine,
    pub familiar_bridge: ScriptedLine,
    /// Played in order when the visitor does not know the resort yet.
    pub explanation: Vec<ScriptedLine>,
    pub continue_label: String,
    /// Asked after the visitor taps continue at the end of the explanation.
    pub party_question: ScriptedLine,
    pub party_bridges: PartyBridges,
    pub party_bridge_delay_ms: u64,
    pub date_question: String,
    pub yes_label: String,
    pub no_label: String,
    pub has_date_reply: ScriptedLine,
    pub no_date_reply: ScriptedLine,
    pub range_echo_prefix: String,
    pub dates_confirmed: ScriptedLine,
    pub date_window_bridge: ScriptedLine,
    pub name_echo_prefix: String,
    /// Shown when the hand-off greeting fails or comes back empty.
    pub greeting_fallback: String,
    /// Shown when a free-chat turn fails or comes back empty.
    pub reply_fallback: String,
}

impl Script {
    /// Bridge after a party choice, followed by the date question.
    pub fn party_bridge(&self, party: &PartyKind) -> ScriptedLine {
        ScriptedLine::new(
            format!("{}\n\n{}", self.party_bridges.for_party(party), self.date_question),
            self.party_bridge_delay_ms,
        )
    }

    pub fn range_echo(&self, description: &str) -> String {
        format!("{}{description}", self.range_echo_prefix)
    }

    pub fn name_echo(&self, name: &str) -> String {
        format!("{}{name}", self.name_echo_prefix)
    }

    pub fn date_answer_label(&self, has_date: bool) -> &str {
        if has_date { &self.yes_label } else { &self.no_label }
    }
}

impl Default for Script {
    fn default() -> Self {
        Self {
            welcome: ScriptedLine::new(
                "Bem-vindo(a) ao Barretos Country Resort!\nO primeiro resort com temática country do Brasil 🤠",
                800,
            ),
            knowledge_prompt: ScriptedLine::new("Você já conhece o Barretos Country Resort?", 1000),
            familiar_bridge: ScriptedLine::new(
                "Bão demais que você já conhece! ✨\n\nEntão vamos lá: essa viagem é para quem?",
                800,
            ),
            explanation: vec![
                ScriptedLine::new(
                    "Perfeito 😊 Então deixa eu te explicar rapidinho o que é o Barretos Country Resort.",
                    800,
                ),
                ScriptedLine::new("Ele é o primeiro resort com temática country do Brasil 🤠", 800),
                ScriptedLine::new(
                    "Aqui adultos descansam e crianças se divertem o dia inteiro com piscinas termais, parque aquático e fazendinha. 🏊‍♂️🐄",
                    1000,
                ),
                ScriptedLine::new(
                    "Agora que você já sabe como funciona, deixa eu adaptar o pacote pro seu perfil 😉",
                    800,
                ),
            ],
            continue_label: "👉 Continuar".to_string(),
            party_question: ScriptedLine::new("Então me conta: essa viagem é para quem?", 400),
            party_bridges: PartyBridges {
                family_with_children: "Maravilha! A criançada vai fazer a festa por aqui. 🐄🏊‍♂️"
                    .to_string(),
                couple: "Nada como um descanso a dois nas nossas águas termais, né? Muito romântico! 💑"
                    .to_string(),
                friend_group: "A diversão tá garantida! O clima de festa aqui é contagiante. 🎉"
                    .to_string(),
                fallback: "Entendido!".to_string(),
            },
            party_bridge_delay_ms: 800,
            date_question: "Já tem uma data em mente para vir nos visitar?".to_string(),
            yes_label: "✅ Sim".to_string(),
            no_label: "❌ Não".to_string(),
            has_date_reply: ScriptedLine::new(
                "Perfeito 😊 Selecione as datas da sua estadia no calendário abaixo:",
                600,
            ),
            no_date_reply: ScriptedLine::new("Sem problema 😊 Quando você imagina viajar?", 600),
            range_echo_prefix: "Desejo ir de ".to_string(),
            dates_confirmed: ScriptedLine::new(
                "Excelente! Datas anotadas. ✅\n\nPra gente finalizar, como posso te chamar?",
                800,
            ),
            date_window_bridge: ScriptedLine::new(
                "Ótima escolha! ✅\n\nPra gente finalizar os detalhes, como posso te chamar?",
                800,
            ),
            name_echo_prefix: "Meu nome é ".to_string(),
            greeting_fallback: "Bão demais ter você aqui!".to_string(),
            reply_fallback: "Repete aí, peão!".to_string(),
        }
    }
}
