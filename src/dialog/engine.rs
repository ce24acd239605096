//! Dialog engine — drives the guided intake and the free chat after it.
//!
//! The engine owns the whole session: step, transcript, selections,
//! calendar, reveal queue and chat session. Input arrives as discrete
//! events; timer expiries and chat replies arrive through
//! [`DialogEngine::next_completion`]. While a line is being composed or a
//! reply is outstanding the engine is busy and refuses every event, so a
//! step can never be acted on before its prompt has been revealed.

use chrono::Local;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::DialogConfig;
use crate::error::{DialogError, LlmError};

use super::calendar::CalendarRangePicker;
use super::messages::{Message, MessageLog};
use super::model::{DateWindow, Familiarity, PartyKind, Selections};
use super::prompts::greeting_utterance;
use super::reveal::{Reveal, RevealQueue};
use super::script::Script;
use super::session::{ChatSession, ChatSessionAdapter};
use super::state::DialogStep;

/// Input from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    Familiarity(Familiarity),
    ContinueExplanation,
    Party(PartyKind),
    HasDate(bool),
    DayClick(u32),
    ShiftMonth(i32),
    ConfirmDates,
    DateWindow(DateWindow),
    SubmitName(String),
    SendMessage(String),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Familiarity(_) => "familiarity",
            Self::ContinueExplanation => "continue_explanation",
            Self::Party(_) => "party",
            Self::HasDate(_) => "has_date",
            Self::DayClick(_) => "day_click",
            Self::ShiftMonth(_) => "shift_month",
            Self::ConfirmDates => "confirm_dates",
            Self::DateWindow(_) => "date_window",
            Self::SubmitName(_) => "submit_name",
            Self::SendMessage(_) => "send_message",
        }
    }
}

/// Something the presentation layer should offer right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affordance {
    Choice { label: String, event: UiEvent },
    Calendar { can_confirm: bool },
    NameInput,
    MessageInput,
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Serialize)]
pub struct DialogSnapshot {
    pub step: DialogStep,
    pub busy: bool,
    pub messages: Vec<Message>,
    pub selections: Selections,
    pub calendar: CalendarRangePicker,
    pub affordances: Vec<Affordance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnKind {
    /// Engine-synthesized opener sent at hand-off.
    Greeting,
    /// A message the visitor typed.
    Followup,
}

struct TurnOutcome {
    kind: TurnKind,
    utterance: String,
    result: Result<String, LlmError>,
}

enum Completion {
    Reveal,
    Reply(TurnOutcome),
}

pub struct DialogEngine {
    step: DialogStep,
    log: MessageLog,
    selections: Selections,
    calendar: CalendarRangePicker,
    script: Script,
    config: DialogConfig,
    reveals: RevealQueue,
    adapter: ChatSessionAdapter,
    session: Option<ChatSession>,
    in_flight: Option<BoxFuture<'static, TurnOutcome>>,
    updates: Option<watch::Sender<DialogSnapshot>>,
}

impl DialogEngine {
    pub fn new(adapter: ChatSessionAdapter, config: DialogConfig) -> Self {
        let today = config.today.unwrap_or_else(|| Local::now().date_naive());
        Self {
            step: DialogStep::default(),
            log: MessageLog::new(),
            selections: Selections::default(),
            calendar: CalendarRangePicker::new(today),
            script: Script::default(),
            config,
            reveals: RevealQueue::new(),
            adapter,
            session: None,
            in_flight: None,
            updates: None,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    pub fn step(&self) -> DialogStep {
        self.step
    }

    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn calendar(&self) -> &CalendarRangePicker {
        &self.calendar
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// A line is being composed or a reply is outstanding.
    pub fn is_busy(&self) -> bool {
        !self.reveals.is_idle() || self.in_flight.is_some()
    }

    pub fn snapshot(&self) -> DialogSnapshot {
        DialogSnapshot {
            step: self.step,
            busy: self.is_busy(),
            messages: self.log.as_slice().to_vec(),
            selections: self.selections.clone(),
            calendar: self.calendar.clone(),
            affordances: self.affordances(),
        }
    }

    /// Receive a fresh snapshot after every change.
    pub fn subscribe(&mut self) -> watch::Receiver<DialogSnapshot> {
        match &self.updates {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(self.snapshot());
                self.updates = Some(tx);
                rx
            }
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.updates {
            tx.send_replace(self.snapshot());
        }
    }

    /// What the visitor may do now. Empty while busy.
    pub fn affordances(&self) -> Vec<Affordance> {
        if self.is_busy() {
            return Vec::new();
        }
        let choice = |label: &str, event: UiEvent| Affordance::Choice {
            label: label.to_string(),
            event,
        };
        match self.step {
            DialogStep::Greeting => Vec::new(),
            DialogStep::KnowledgeCheck => [Familiarity::Familiar, Familiarity::NotFamiliar]
                .into_iter()
                .map(|f| choice(f.label(), UiEvent::Familiarity(f)))
                .collect(),
            DialogStep::Explanation => {
                vec![choice(&self.script.continue_label, UiEvent::ContinueExplanation)]
            }
            DialogStep::PartySelect => PartyKind::OFFERED
                .into_iter()
                .map(|p| choice(p.label(), UiEvent::Party(p.clone())))
                .collect(),
            DialogStep::DateDecision => [true, false]
                .into_iter()
                .map(|yes| choice(self.script.date_answer_label(yes), UiEvent::HasDate(yes)))
                .collect(),
            DialogStep::CalendarPick => vec![Affordance::Calendar {
                can_confirm: self.calendar.is_complete(),
            }],
            DialogStep::DateCategoryPick => DateWindow::ALL
                .into_iter()
                .map(|w| choice(w.label(), UiEvent::DateWindow(w)))
                .collect(),
            DialogStep::NameCapture => vec![Affordance::NameInput],
            DialogStep::FreeChat => vec![Affordance::MessageInput],
        }
    }

    /// Queue the welcome lines. Does nothing once the dialog has begun.
    pub fn start(&mut self) {
        if self.step != DialogStep::Greeting || !self.log.is_empty() || !self.reveals.is_idle() {
            return;
        }
        info!("Starting guided intake");
        self.reveals.push(Reveal::from(&self.script.welcome));
        self.reveals
            .push(Reveal::from(&self.script.knowledge_prompt).then(DialogStep::KnowledgeCheck));
        self.publish();
    }

    /// Dispatch a presentation event to its handler.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), DialogError> {
        match event {
            UiEvent::Familiarity(choice) => self.choose_familiarity(choice),
            UiEvent::ContinueExplanation => self.continue_explanation(),
            UiEvent::Party(party) => self.choose_party(party),
            UiEvent::HasDate(has_date) => self.choose_has_date(has_date),
            UiEvent::DayClick(day) => self.click_day(day),
            UiEvent::ShiftMonth(delta) => self.shift_month(delta),
            UiEvent::ConfirmDates => self.confirm_dates(),
            UiEvent::DateWindow(window) => self.choose_date_window(window),
            UiEvent::SubmitName(name) => self.submit_name(&name),
            UiEvent::SendMessage(text) => self.send_message(&text),
        }
    }

    fn accept(&self, expected: DialogStep, event: &'static str) -> Result<(), DialogError> {
        if self.is_busy() {
            debug!(step = %self.step, event, "Refusing input while busy");
            return Err(DialogError::Busy { step: self.step });
        }
        if self.step != expected {
            debug!(step = %self.step, event, "Refusing input for another step");
            return Err(DialogError::NotAccepting {
                step: self.step,
                event,
            });
        }
        Ok(())
    }

    fn transition(&mut self, target: DialogStep) {
        if self.step.can_transition_to(target) {
            info!(from = %self.step, to = %target, "Dialog step changed");
            self.step = target;
        } else {
            warn!(from = %self.step, to = %target, "Ignoring invalid dialog transition");
        }
    }

    pub fn choose_familiarity(&mut self, choice: Familiarity) -> Result<(), DialogError> {
        self.accept(DialogStep::KnowledgeCheck, "familiarity")?;
        self.log.user(choice.label());
        match choice {
            Familiarity::Familiar => self
                .reveals
                .push(Reveal::from(&self.script.familiar_bridge).then(DialogStep::PartySelect)),
            Familiarity::NotFamiliar => {
                let mut lines: Vec<Reveal> =
                    self.script.explanation.iter().map(Reveal::from).collect();
                match lines.last_mut() {
                    Some(last) => last.then = Some(DialogStep::Explanation),
                    None => self.transition(DialogStep::Explanation),
                }
                self.reveals.extend(lines);
            }
        }
        self.publish();
        Ok(())
    }

    /// The explanation never advances on its own; the visitor must tap
    /// continue.
    pub fn continue_explanation(&mut self) -> Result<(), DialogError> {
        self.accept(DialogStep::Explanation, "continue_explanation")?;
        self.reveals
            .push(Reveal::from(&self.script.party_question).then(DialogStep::PartySelect));
        self.publish();
        Ok(())
    }

    pub fn choose_party(&mut self, party: PartyKind) -> Result<(), DialogError> {
        self.accept(DialogStep::PartySelect, "party")?;
        self.log.user(party.label());
        let bridge = self.script.party_bridge(&party);
        self.reveals
            .push(Reveal::from(bridge).then(DialogStep::DateDecision));
        self.selections.party = Some(party);
        self.publish();
        Ok(())
    }

    pub fn choose_has_date(&mut self, has_date: bool) -> Result<(), DialogError> {
        self.accept(DialogStep::DateDecision, "has_date")?;
        self.log.user(self.script.date_answer_label(has_date));
        let reveal = if has_date {
            Reveal::from(&self.script.has_date_reply).then(DialogStep::CalendarPick)
        } else {
            Reveal::from(&self.script.no_date_reply).then(DialogStep::DateCategoryPick)
        };
        self.reveals.push(reveal);
        self.publish();
        Ok(())
    }

    pub fn click_day(&mut self, day: u32) -> Result<(), DialogError> {
        self.accept(DialogStep::CalendarPick, "day_click")?;
        self.calendar.click_day(day)?;
        self.publish();
        Ok(())
    }

    pub fn shift_month(&mut self, delta: i32) -> Result<(), DialogError> {
        self.accept(DialogStep::CalendarPick, "shift_month")?;
        self.calendar.shift_month(delta)?;
        self.publish();
        Ok(())
    }

    /// The only way out of the calendar step.
    pub fn confirm_dates(&mut self) -> Result<(), DialogError> {
        self.accept(DialogStep::CalendarPick, "confirm_dates")?;
        let range = self.calendar.confirm()?;
        let description = range.describe();
        info!(nights = range.nights, "Stay dates confirmed");
        self.log.user(self.script.range_echo(&description));
        self.selections.date_description = Some(description);
        self.reveals
            .push(Reveal::from(&self.script.dates_confirmed).then(DialogStep::NameCapture));
        self.publish();
        Ok(())
    }

    pub fn choose_date_window(&mut self, window: DateWindow) -> Result<(), DialogError> {
        self.accept(DialogStep::DateCategoryPick, "date_window")?;
        self.log.user(window.label());
        self.selections.date_description = Some(window.label().to_string());
        self.reveals
            .push(Reveal::from(&self.script.date_window_bridge).then(DialogStep::NameCapture));
        self.publish();
        Ok(())
    }

    /// Accept the visitor's name and hand off to the chat backend.
    pub fn submit_name(&mut self, raw: &str) -> Result<(), DialogError> {
        self.accept(DialogStep::NameCapture, "submit_name")?;
        let name = raw.trim();
        if name.is_empty() {
            debug!("Refusing empty name");
            return Err(DialogError::EmptyInput);
        }

        self.selections.name = Some(name.to_string());
        self.log.user(self.script.name_echo(name));
        self.transition(DialogStep::FreeChat);

        let session = self.adapter.initialize(&self.selections);
        self.session = Some(session);
        let opener = greeting_utterance(&self.selections);
        self.start_turn(TurnKind::Greeting, opener)?;
        self.publish();
        Ok(())
    }

    pub fn send_message(&mut self, raw: &str) -> Result<(), DialogError> {
        self.accept(DialogStep::FreeChat, "send_message")?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(DialogError::EmptyInput);
        }
        if self.session.is_none() {
            return Err(DialogError::NoSession);
        }
        self.log.user(text);
        self.start_turn(TurnKind::Followup, text.to_string())?;
        self.publish();
        Ok(())
    }

    fn start_turn(&mut self, kind: TurnKind, utterance: String) -> Result<(), DialogError> {
        let session = self.session.as_ref().ok_or(DialogError::NoSession)?;
        let call = self.adapter.dispatch(session, &utterance);
        debug!(?kind, "Chat turn dispatched");
        self.in_flight = Some(
            async move {
                let result = call.await;
                TurnOutcome {
                    kind,
                    utterance,
                    result,
                }
            }
            .boxed(),
        );
        Ok(())
    }

    /// Wait for the next timer expiry or chat reply and apply it.
    ///
    /// Returns `false` when nothing is pending. Safe to drop mid-wait: an
    /// armed reveal keeps its deadline and a pending reply stays pending.
    pub async fn next_completion(&mut self) -> bool {
        let deadline = self.reveals.arm(Instant::now());
        let completion = match (deadline, self.in_flight.as_mut()) {
            (None, None) => return false,
            (Some(due), None) => {
                sleep_until(due).await;
                Completion::Reveal
            }
            (None, Some(call)) => Completion::Reply(call.await),
            (Some(due), Some(call)) => tokio::select! {
                _ = sleep_until(due) => Completion::Reveal,
                outcome = call => Completion::Reply(outcome),
            },
        };

        match completion {
            Completion::Reveal => self.finish_reveal(),
            Completion::Reply(outcome) => {
                self.in_flight = None;
                self.finish_turn(outcome);
            }
        }
        self.publish();
        true
    }

    /// Run until nothing is pending.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    /// Event loop: feed presentation events in and apply completions until
    /// the event channel closes.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<UiEvent>) {
        self.start();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let name = event.name();
                        if let Err(e) = self.handle(event) {
                            debug!(event = name, error = %e, "Input refused");
                        }
                    }
                    None => break,
                },
                _ = self.next_completion(), if self.is_busy() => {}
            }
        }
        debug!("Event channel closed, dialog loop stopped");
    }

    fn finish_reveal(&mut self) {
        let Some(reveal) = self.reveals.take_due(Instant::now()) else {
            return;
        };
        self.log.agent(reveal.text);
        if let Some(step) = reveal.then {
            self.transition(step);
        }
    }

    fn finish_turn(&mut self, outcome: TurnOutcome) {
        let text = match outcome.result {
            Ok(reply) => {
                if let Some(session) = self.session.as_mut() {
                    session.record_turn(&outcome.utterance, &reply);
                }
                reply
            }
            Err(e) => {
                warn!(error = %e, kind = ?outcome.kind, "Chat reply failed, using fallback");
                match outcome.kind {
                    TurnKind::Greeting => self.script.greeting_fallback.clone(),
                    TurnKind::Followup => self.script.reply_fallback.clone(),
                }
            }
        };
        let delay = self.config.reply_pacing.delay_for(&text);
        self.reveals.push(Reveal::new(text, delay));
    }
}
