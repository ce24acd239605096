//! Message log — the ordered, append-only transcript of the dialog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Agent,
    User,
}

/// One entry in the transcript. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    /// Position in the log, starting at 0. This is the ordering key:
    /// strictly increasing and gap-free, unlike the wall clock.
    pub seq: u64,
    pub sender: Sender,
    /// May contain `\n` paragraph breaks.
    pub text: String,
    /// Wall-clock time for display only. Never used for ordering.
    pub created_at: DateTime<Utc>,
}

/// Append-only transcript. Insertion order is display order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let message = Message {
            id: Uuid::new_v4(),
            seq: self.entries.len() as u64,
            sender,
            text: text.into(),
            created_at: Utc::now(),
        };
        self.entries.push(message);
        &self.entries[self.entries.len() - 1]
    }

    pub fn agent(&mut self, text: impl Into<String>) -> &Message {
        self.append(Sender::Agent, text)
    }

    pub fn user(&mut self, text: impl Into<String>) -> &Message {
        self.append(Sender::User, text)
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    pub fn count_from(&self, sender: Sender) -> usize {
        self.entries.iter().filter(|m| m.sender == sender).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_numbers_entries() {
        let mut log = MessageLog::new();
        log.agent("Oi!");
        log.user("Olá");
        log.agent("Tudo bem?\nPode falar.");

        let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Oi!", "Olá", "Tudo bem?\nPode falar."]);
        let seqs: Vec<_> = log.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, [0, 1, 2]);
        assert_eq!(log.count_from(Sender::Agent), 2);
        assert_eq!(log.count_from(Sender::User), 1);
    }

    #[test]
    fn order_follows_seq_not_timestamps() {
        let mut log = MessageLog::new();
        for i in 0..5 {
            log.append(if i % 2 == 0 { Sender::Agent } else { Sender::User }, format!("msg {i}"));
        }
        let msgs = log.as_slice();
        for (index, pair) in msgs.windows(2).enumerate() {
            assert_ne!(pair[0].id, pair[1].id);
            assert_eq!(pair[0].seq, index as u64);
            assert_eq!(pair[1].seq, pair[0].seq + 1);
            assert_eq!(pair[1].text, format!("msg {}", index + 1));
        }
    }

    #[test]
    fn last_is_most_recent() {
        let mut log = MessageLog::new();
        log.agent("a");
        log.user("b");
        log.agent("c");
        assert_eq!(log.last().map(|m| m.text.as_str()), Some("c"));
        assert_eq!(log.count_from(Sender::Agent), 2);
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut log = MessageLog::new();
        log.user("Casal");
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["sender"], "user");
        assert_eq!(json[0]["text"], "Casal");
    }
}
