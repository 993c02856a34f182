use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::clock::Clock;
use crate::editor::Focus;
use crate::flow::{Session, Stage};

pub struct App<C: Clock> {
    pub session: Session<C>,
    pub should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            session,
            should_quit: false,
        }
    }

    pub fn on_tick(&mut self) {
        self.session.tick();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            log::info!("Quit requested");
            self.should_quit = true;
            return;
        }
        if self.session.notice().is_some() {
            self.session.dismiss_notice();
            return;
        }

        match self.session.stage() {
            Stage::Idle => self.idle_key(key.code),
            Stage::Reminder => self.reminder_key(key.code),
            Stage::MinutesPrompt { .. } => self.minutes_key(key.code),
            Stage::Countdown(countdown) => {
                let hidden = countdown.is_hidden();
                self.countdown_key(key.code, hidden)
            }
            Stage::LogForm(_) => self.log_key(key.code),
            Stage::Editor { editor, .. } => {
                let focus = editor.focus;
                self.editor_key(key.code, focus)
            }
        }
    }

    fn idle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') => self.session.open_editor(),
            _ => {}
        }
    }

    fn reminder_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Char('s') => self.session.start_reading(),
            KeyCode::Esc | KeyCode::Char('c') => self.session.close_reminder(),
            _ => {}
        }
    }

    fn minutes_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.session.submit_minutes(),
            KeyCode::Esc => self.session.cancel_minutes(),
            KeyCode::Backspace => self.session.minutes_backspace(),
            KeyCode::Char(c) => self.session.minutes_input(c),
            _ => {}
        }
    }

    fn countdown_key(&mut self, code: KeyCode, hidden: bool) {
        match (code, hidden) {
            (KeyCode::Char('t'), true) => self.session.show_countdown(),
            (KeyCode::Char('s'), false) => self.session.stop_countdown(),
            (KeyCode::Char('h') | KeyCode::Esc, false) => self.session.hide_countdown(),
            _ => {}
        }
    }

    fn log_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.session.submit_log(),
            KeyCode::Esc => self.session.cancel_log(),
            other => {
                let Some(form) = self.session.log_form_mut() else {
                    return;
                };
                match other {
                    KeyCode::Up => form.select_prev(),
                    KeyCode::Down => form.select_next(),
                    KeyCode::Backspace => form.pop_char(),
                    KeyCode::Char(c) => form.push_char(c),
                    _ => {}
                }
            }
        }
    }

    fn editor_key(&mut self, code: KeyCode, focus: Focus) {
        if focus == Focus::List {
            match code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.session.with_editor(|e, doc| e.select_next(doc));
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.session.with_editor(|e, doc| e.select_prev(doc));
                }
                KeyCode::Char('a') => {
                    self.session.with_editor(|e, _| e.begin_new());
                }
                KeyCode::Enter => self.session.editor_edit_selected(),
                KeyCode::Char('r') => self.session.editor_remove(),
                KeyCode::Char('c') => self.session.editor_complete(),
                KeyCode::Char('o') => self.session.open_completed_list(),
                KeyCode::Tab => {
                    self.session.with_editor(|e, _| e.focus = e.focus.next());
                }
                KeyCode::Esc => self.session.close_editor(),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Enter => self.session.editor_save(),
            KeyCode::Esc => {
                self.session.with_editor(|e, _| e.focus = Focus::List);
            }
            KeyCode::Tab => {
                self.session.with_editor(|e, _| e.focus = e.focus.next());
            }
            KeyCode::Left if focus == Focus::Kind => {
                self.session.with_editor(|e, _| e.cycle_kind(false));
            }
            KeyCode::Right if focus == Focus::Kind => {
                self.session.with_editor(|e, _| e.cycle_kind(true));
            }
            KeyCode::Backspace => {
                self.session.with_editor(|e, _| e.pop_char());
            }
            KeyCode::Char(c) => {
                self.session.with_editor(|e, _| e.push_char(c));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::settings::Settings;
    use std::time::Duration;
    use tempfile::TempDir;

    fn press(app: &mut App<ManualClock>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App<ManualClock>, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app_in(dir: &TempDir) -> App<ManualClock> {
        let settings = Settings::rooted_at(dir.path());
        App::new(Session::start(&settings, ManualClock::new()).unwrap())
    }

    #[test]
    fn keyboard_walks_a_reading_session() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        app.session.clock().advance(Duration::from_secs(20 * 60));
        app.on_tick();
        assert!(matches!(app.session.stage(), Stage::Reminder));

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        assert!(matches!(app.session.stage(), Stage::Countdown(c) if c.is_hidden()));

        app.session.clock().advance(Duration::from_secs(60));
        app.on_tick();
        assert!(matches!(app.session.stage(), Stage::LogForm(_)));

        type_str(&mut app, "12");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.session.stage(), Stage::Editor { .. }));
        assert_eq!(app.session.doc().active[0].last_page, 12);

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.session.stage(), Stage::Idle));
        assert_eq!(app.session.next_reminder_in(), Some(Duration::from_secs(30 * 60)));
    }

    #[test]
    fn notice_swallows_next_key() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.session.notice().is_some());

        press(&mut app, KeyCode::Esc);
        assert!(app.session.notice().is_none());
        assert!(matches!(app.session.stage(), Stage::Editor { .. }));
    }

    #[test]
    fn editor_add_by_keyboard() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Gödel, Escher, Bach");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "77");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        let last = app.session.doc().active.last().unwrap().clone();
        assert_eq!(last.title, "Gödel, Escher, Bach");
        assert_eq!(last.last_page, 77);
        assert_eq!(last.kind, crate::model::Kind::Article);
    }

    #[test]
    fn q_quits_only_when_idle() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
