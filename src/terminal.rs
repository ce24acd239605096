//! Terminal front-end: prints dialog snapshots and turns typed lines into
//! events.
//!
//! Choices are picked by number. In the calendar step, a bare number or
//! `d <day>` marks a day, `<` and `>` change the month and `ok` confirms.
//! Free text goes to the name prompt or the chat.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::dialog::{
    Affordance, CalendarRangePicker, DayMark, DialogEngine, DialogSnapshot, PartyKind, Sender,
    UiEvent,
};
use crate::error::Result;

const WEEKDAYS: [&str; 7] = ["D", "S", "T", "Q", "Q", "S", "S"];
const CALENDAR_HINT: &str = "Dia: número ou d <dia> · mês: < ou > · confirmar: ok";

/// Incremental renderer. Each call returns only what is new since the
/// previous one.
#[derive(Debug, Default)]
pub struct Renderer {
    next_seq: u64,
    composing_shown: bool,
    last_prompt: Option<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, snapshot: &DialogSnapshot) -> String {
        let mut out = String::new();

        let from = self.next_seq;
        for message in snapshot.messages.iter().filter(|m| m.seq >= from) {
            match message.sender {
                Sender::Agent => out.push_str(&format!("\n🤠 {}\n", indent(&message.text))),
                Sender::User => out.push_str(&format!("\n   › {}\n", message.text)),
            }
            self.next_seq = message.seq + 1;
            self.composing_shown = false;
        }

        if snapshot.busy {
            if !self.composing_shown {
                out.push_str("   digitando...\n");
                self.composing_shown = true;
            }
            self.last_prompt = None;
            return out;
        }
        self.composing_shown = false;

        let prompt = render_affordances(snapshot);
        if self.last_prompt.as_deref() != Some(prompt.as_str()) {
            out.push_str(&prompt);
            self.last_prompt = Some(prompt);
        }
        out
    }
}

fn indent(text: &str) -> String {
    text.replace('\n', "\n   ")
}

/// What the visitor can do now, as printable text.
pub fn render_affordances(snapshot: &DialogSnapshot) -> String {
    let mut out = String::new();
    let mut index = 0;
    for affordance in &snapshot.affordances {
        match affordance {
            Affordance::Choice { label, .. } => {
                index += 1;
                out.push_str(&format!("   [{index}] {label}\n"));
            }
            Affordance::Calendar { can_confirm } => {
                out.push_str(&render_calendar(&snapshot.calendar));
                out.push_str(&format!("   {CALENDAR_HINT}\n"));
                if *can_confirm {
                    out.push_str("   (ok para confirmar)\n");
                }
            }
            Affordance::NameInput => out.push_str("   Digite seu nome:\n"),
            Affordance::MessageInput => out.push_str("   Digite sua mensagem:\n"),
        }
    }
    out
}

/// Sunday-first month grid with the selection marked.
pub fn render_calendar(picker: &CalendarRangePicker) -> String {
    let mut out = format!("\n   {:^35}\n   ", picker.month_label());
    for day in WEEKDAYS {
        out.push_str(&format!("  {day}  "));
    }
    out.push_str("\n   ");

    let blanks = picker.leading_blanks();
    for _ in 0..blanks {
        out.push_str("     ");
    }
    for day in 1..=picker.days_in_month() {
        let cell = match picker.mark(day) {
            DayMark::CheckIn | DayMark::CheckOut => format!("[{day:>2}] "),
            DayMark::InRange => format!("·{day:>2}· "),
            DayMark::Plain => format!(" {day:>2}  "),
        };
        out.push_str(&cell);
        if (blanks + day) % 7 == 0 && day != picker.days_in_month() {
            out.push_str("\n   ");
        }
    }
    out.push('\n');

    if let Ok(range) = picker.confirm() {
        out.push_str(&format!("   {}\n", range.describe()));
    }
    out
}

/// Map a typed line to an event for the current snapshot.
///
/// Returns `None` when the line means nothing right now, including every
/// line typed while the agent is composing.
pub fn parse_input(line: &str, snapshot: &DialogSnapshot) -> Option<UiEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let choices: Vec<&UiEvent> = snapshot
        .affordances
        .iter()
        .filter_map(|a| match a {
            Affordance::Choice { event, .. } => Some(event),
            _ => None,
        })
        .collect();
    if !choices.is_empty() {
        if let Ok(n) = line.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| choices.get(i)).map(|e| (*e).clone());
        }
        // Anything else typed at the party question is a custom category.
        if choices.iter().any(|e| matches!(e, UiEvent::Party(_))) {
            return Some(UiEvent::Party(PartyKind::from_label(line)));
        }
        return None;
    }

    match snapshot.affordances.first()? {
        Affordance::Calendar { .. } => parse_calendar(line),
        Affordance::NameInput => Some(UiEvent::SubmitName(line.to_string())),
        Affordance::MessageInput => Some(UiEvent::SendMessage(line.to_string())),
        Affordance::Choice { .. } => None,
    }
}

fn parse_calendar(line: &str) -> Option<UiEvent> {
    match line {
        "<" => Some(UiEvent::ShiftMonth(-1)),
        ">" => Some(UiEvent::ShiftMonth(1)),
        _ if line.eq_ignore_ascii_case("ok") => Some(UiEvent::ConfirmDates),
        _ => {
            let day = line.strip_prefix('d').map(str::trim).unwrap_or(line);
            day.parse().ok().map(UiEvent::DayClick)
        }
    }
}

/// Drive `engine` from stdin until EOF or `/quit`.
pub async fn run(mut engine: DialogEngine) -> Result<()> {
    let mut updates = engine.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();
    let dialog = tokio::spawn(async move {
        engine.run(rx).await;
    });

    let mut renderer = Renderer::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let initial = updates.borrow_and_update().clone();
    print!("{}", renderer.render(&initial));
    std::io::stdout().flush()?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print!("{}", renderer.render(&snapshot));
                std::io::stdout().flush()?;
            }
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) => {
                    let snapshot = updates.borrow().clone();
                    match parse_input(&line, &snapshot) {
                        Some(event) => {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                        None if snapshot.busy => eprintln!("   (aguarde, o guia está digitando)"),
                        None if line.trim().is_empty() => {}
                        None => eprintln!("   (opção inválida)"),
                    }
                }
                None => break,
            }
        }
    }

    drop(tx);
    if let Err(e) = dialog.await {
        tracing::error!("Dialog task failed: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::dialog::{DateWindow, DialogStep, Familiarity, MessageLog, Selections};

    fn snapshot(step: DialogStep, busy: bool, affordances: Vec<Affordance>) -> DialogSnapshot {
        DialogSnapshot {
            step,
            busy,
            messages: Vec::new(),
            selections: Selections::default(),
            calendar: CalendarRangePicker::new(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()),
            affordances,
        }
    }

    fn choice(label: &str, event: UiEvent) -> Affordance {
        Affordance::Choice {
            label: label.into(),
            event,
        }
    }

    #[test]
    fn numbers_pick_choices() {
        let snap = snapshot(
            DialogStep::KnowledgeCheck,
            false,
            vec![
                choice("✅ Já conheço", UiEvent::Familiarity(Familiarity::Familiar)),
                choice("👀 Ainda não conheço", UiEvent::Familiarity(Familiarity::NotFamiliar)),
            ],
        );
        assert_eq!(
            parse_input(" 2 ", &snap),
            Some(UiEvent::Familiarity(Familiarity::NotFamiliar))
        );
        assert_eq!(parse_input("0", &snap), None);
        assert_eq!(parse_input("3", &snap), None);
        assert_eq!(parse_input("talvez", &snap), None);
    }

    #[test]
    fn free_text_at_party_question_is_custom_category() {
        let snap = snapshot(
            DialogStep::PartySelect,
            false,
            PartyKind::OFFERED
                .into_iter()
                .map(|p| choice(p.label(), UiEvent::Party(p.clone())))
                .collect(),
        );
        assert_eq!(parse_input("2", &snap), Some(UiEvent::Party(PartyKind::Couple)));
        assert_eq!(
            parse_input("Casal", &snap),
            Some(UiEvent::Party(PartyKind::Couple))
        );
        assert_eq!(
            parse_input("Excursão da escola", &snap),
            Some(UiEvent::Party(PartyKind::Other("Excursão da escola".into())))
        );
    }

    #[test]
    fn calendar_commands() {
        let snap = snapshot(
            DialogStep::CalendarPick,
            false,
            vec![Affordance::Calendar { can_confirm: false }],
        );
        assert_eq!(parse_input("d 10", &snap), Some(UiEvent::DayClick(10)));
        assert_eq!(parse_input("13", &snap), Some(UiEvent::DayClick(13)));
        assert_eq!(parse_input("<", &snap), Some(UiEvent::ShiftMonth(-1)));
        assert_eq!(parse_input(">", &snap), Some(UiEvent::ShiftMonth(1)));
        assert_eq!(parse_input("OK", &snap), Some(UiEvent::ConfirmDates));
        assert_eq!(parse_input("amanhã", &snap), None);
    }

    #[test]
    fn text_inputs_and_busy() {
        let name = snapshot(DialogStep::NameCapture, false, vec![Affordance::NameInput]);
        assert_eq!(
            parse_input("  Ana ", &name),
            Some(UiEvent::SubmitName("Ana".into()))
        );
        let chat = snapshot(DialogStep::FreeChat, false, vec![Affordance::MessageInput]);
        assert_eq!(
            parse_input("Tem piscina?", &chat),
            Some(UiEvent::SendMessage("Tem piscina?".into()))
        );
        assert_eq!(parse_input("   ", &chat), None);

        let busy = snapshot(DialogStep::FreeChat, true, Vec::new());
        assert_eq!(parse_input("oi", &busy), None);
    }

    #[test]
    fn renderer_prints_only_new_lines_and_composing_once() {
        let mut log = MessageLog::new();
        log.agent("Olá!\nTudo bem?");
        let mut snap = snapshot(DialogStep::Greeting, true, Vec::new());
        snap.messages = log.as_slice().to_vec();

        let mut renderer = Renderer::new();
        let first = renderer.render(&snap);
        assert!(first.contains("🤠 Olá!\n   Tudo bem?"));
        assert!(first.contains("digitando"));
        assert_eq!(renderer.render(&snap), "");

        log.agent("Você já conhece?");
        snap.messages = log.as_slice().to_vec();
        snap.busy = false;
        snap.affordances = vec![choice("✅ Já conheço", UiEvent::Familiarity(Familiarity::Familiar))];
        let second = renderer.render(&snap);
        assert!(!second.contains("Olá"));
        assert!(second.contains("Você já conhece?"));
        assert!(second.contains("[1] ✅ Já conheço"));
        assert_eq!(renderer.render(&snap), "");
    }

    #[test]
    fn renderer_prints_a_burst_of_messages_once_in_order() {
        let mut log = MessageLog::new();
        log.user("Casal");
        log.agent("Que delícia!");
        log.agent("Já tem data?");
        let mut snap = snapshot(DialogStep::DateDecision, true, Vec::new());
        snap.messages = log.as_slice().to_vec();

        let mut renderer = Renderer::new();
        let out = renderer.render(&snap);
        let casal = out.find("› Casal").unwrap();
        let delicia = out.find("Que delícia!").unwrap();
        let data = out.find("Já tem data?").unwrap();
        assert!(casal < delicia && delicia < data);

        log.agent("Escolha no calendário");
        snap.messages = log.as_slice().to_vec();
        let next = renderer.render(&snap);
        assert!(next.contains("Escolha no calendário"));
        assert!(!next.contains("Casal"));
        assert!(!next.contains("Que delícia!"));
    }

    #[test]
    fn calendar_grid_marks_selection() {
        let mut picker = CalendarRangePicker::new(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        picker.click_day(10).unwrap();
        picker.click_day(13).unwrap();
        let grid = render_calendar(&picker);
        assert!(grid.contains("março 2026"));
        assert!(grid.contains("[10]"));
        assert!(grid.contains("·11·"));
        assert!(grid.contains("[13]"));
        assert!(grid.contains("10/03/2026 até 13/03/2026 (3 noites)"));
        // March 2026 starts on a Sunday.
        assert_eq!(picker.leading_blanks(), 0);
        assert!(grid.contains("\n     1    2    3  "));
        assert!(grid.contains("\n    29   30   31  \n"));
    }

    #[test]
    fn window_choices_render_numbered() {
        let snap = snapshot(
            DialogStep::DateCategoryPick,
            false,
            DateWindow::ALL
                .into_iter()
                .map(|w| choice(w.label(), UiEvent::DateWindow(w)))
                .collect(),
        );
        let text = render_affordances(&snap);
        assert!(text.contains("[1] 📅 Próximos 30 dias"));
        assert!(text.contains("[4] 📅 Só pesquisando"));
    }
}
