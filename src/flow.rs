//! Reminder flow.
//!
//! A [`Session`] owns the document, the storage, the reminder timer and the
//! current [`Stage`]. The UI calls one method per user event. Every way out of
//! a reminder back to [`Stage::Idle`] leaves the timer armed.

use chrono::{DateTime, Timelike, Utc};
use std::time::Duration;

use crate::clock::Clock;
use crate::countdown::{Countdown, Tick};
use crate::editor::Editor;
use crate::log_form::LogForm;
use crate::model::Document;
use crate::scheduler::{self, FireDecision, Scheduler};
use crate::settings::Settings;
use crate::storage::Storage;
use crate::validation::{parse_minutes, ValidationError};
use crate::vault;

pub const DEFAULT_MINUTES: &str = "10";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOrigin {
    /// Opened after logging a reading session.
    ReadSession,
    /// Opened from the idle screen.
    Standalone,
}

#[derive(Debug)]
pub enum Stage {
    Idle,
    Reminder,
    MinutesPrompt { input: String },
    Countdown(Countdown),
    LogForm(LogForm),
    Editor { editor: Editor, origin: EditorOrigin },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Reminder => "reminder",
            Stage::MinutesPrompt { .. } => "minutes prompt",
            Stage::Countdown(_) => "countdown",
            Stage::LogForm(_) => "log form",
            Stage::Editor { .. } => "editor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A modal message box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub heading: String,
    pub body: String,
}

impl Notice {
    pub fn info(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            heading: heading.into(),
            body: body.into(),
        }
    }

    pub fn error(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            heading: heading.into(),
            body: body.into(),
        }
    }
}

impl From<ValidationError> for Notice {
    fn from(e: ValidationError) -> Self {
        Notice::error(e.heading(), e.to_string())
    }
}

pub struct Session<C: Clock> {
    doc: Document,
    storage: Storage,
    scheduler: Scheduler,
    clock: C,
    stage: Stage,
    notice: Option<Notice>,
    snooze: Duration,
    vault_name: String,
    opener: vault::Opener,
}

impl<C: Clock> Session<C> {
    /// Loads the document and arms the first reminder.
    pub fn start(settings: &Settings, clock: C) -> anyhow::Result<Self> {
        let storage = Storage::new(settings);
        storage.ensure()?;
        let doc = storage.load()?;

        let mut scheduler = Scheduler::new();
        let delay = scheduler::initial_delay(
            &doc,
            clock.now_utc(),
            settings.popup_now,
            settings.launch_delay,
        );
        scheduler.arm(delay, clock.now_instant());
        log::info!("First reminder in {}s", delay.as_secs());

        Ok(Self {
            doc,
            storage,
            scheduler,
            clock,
            stage: Stage::Idle,
            notice: None,
            snooze: settings.snooze,
            vault_name: settings.vault_name.clone(),
            opener: vault::open_in_vault,
        })
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[cfg(test)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[cfg(test)]
    pub fn set_opener(&mut self, opener: vault::Opener) {
        self.opener = opener;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn next_reminder_in(&self) -> Option<Duration> {
        self.scheduler.remaining(self.clock.now_instant())
    }

    /// Drives the countdown and the reminder timer; called every loop pass.
    pub fn tick(&mut self) {
        let now = self.clock.now_instant();
        if let Stage::Countdown(countdown) = &mut self.stage {
            if countdown.tick(now) == Tick::Finished {
                log::info!("Countdown finished");
                self.open_log_stage();
            }
        }
        if matches!(self.stage, Stage::Idle) && self.scheduler.poll(now) {
            self.fire();
        }
    }

    /// The reminder timer went off.
    pub fn fire(&mut self) {
        if !matches!(self.stage, Stage::Idle) {
            log::debug!("Reminder fire discarded during {}", self.stage.name());
            return;
        }
        self.reload();
        match scheduler::on_fire(&self.doc, self.clock.now_utc()) {
            FireDecision::Rearm(delay) => {
                log::debug!("Woke before snooze ended, re-arming");
                self.scheduler.arm(delay, self.clock.now_instant());
            }
            FireDecision::Show => {
                log::info!("Showing reminder");
                self.stage = Stage::Reminder;
            }
        }
    }

    pub fn close_reminder(&mut self) {
        if matches!(self.stage, Stage::Reminder) {
            log::info!("Reminder closed");
            self.to_idle_snoozed();
        }
    }

    pub fn start_reading(&mut self) {
        if matches!(self.stage, Stage::Reminder) {
            self.stage = Stage::MinutesPrompt {
                input: DEFAULT_MINUTES.to_string(),
            };
        }
    }

    pub fn minutes_input(&mut self, c: char) {
        if let Stage::MinutesPrompt { input } = &mut self.stage {
            if c.is_ascii_digit() || c == '-' {
                input.push(c);
            }
        }
    }

    pub fn minutes_backspace(&mut self) {
        if let Stage::MinutesPrompt { input } = &mut self.stage {
            input.pop();
        }
    }

    pub fn submit_minutes(&mut self) {
        let Stage::MinutesPrompt { input } = &self.stage else {
            return;
        };
        match parse_minutes(input) {
            Ok(minutes) => {
                log::info!("Reading for {} minutes", minutes);
                self.stage = Stage::Countdown(Countdown::start(minutes, self.clock.now_instant()));
            }
            Err(e) => {
                log::debug!("Rejected minutes {:?}: {}", input, e);
                self.notice = Some(e.into());
            }
        }
    }

    pub fn cancel_minutes(&mut self) {
        if matches!(self.stage, Stage::MinutesPrompt { .. }) {
            log::info!("Reading cancelled at the minutes prompt");
            self.to_idle_snoozed();
        }
    }

    pub fn hide_countdown(&mut self) {
        if let Stage::Countdown(countdown) = &mut self.stage {
            countdown.hide();
        }
    }

    pub fn show_countdown(&mut self) {
        if let Stage::Countdown(countdown) = &mut self.stage {
            countdown.show();
        }
    }

    /// Abandons the countdown. Nothing is persisted.
    pub fn stop_countdown(&mut self) {
        if let Stage::Countdown(countdown) = &mut self.stage {
            countdown.stop();
            log::info!("Countdown stopped early");
            self.stage = Stage::Idle;
            self.scheduler.arm(self.snooze, self.clock.now_instant());
        }
    }

    pub fn log_form_mut(&mut self) -> Option<&mut LogForm> {
        match &mut self.stage {
            Stage::LogForm(form) => Some(form),
            _ => None,
        }
    }

    pub fn submit_log(&mut self) {
        let Stage::LogForm(form) = &self.stage else {
            return;
        };
        match form.submit() {
            Ok((title, page)) => {
                let idx = self.doc.log_page(&title, page);
                log::info!("Logged page {} for {:?}", page, title);
                self.persist();
                let mut editor = Editor::new();
                editor.select(&self.doc, idx);
                self.stage = Stage::Editor {
                    editor,
                    origin: EditorOrigin::ReadSession,
                };
                self.snooze();
            }
            Err(e) => {
                log::debug!("Rejected log entry: {}", e);
                self.notice = Some(e.into());
            }
        }
    }

    pub fn cancel_log(&mut self) {
        if matches!(self.stage, Stage::LogForm(_)) {
            log::info!("Log form cancelled");
            self.to_idle_snoozed();
        }
    }

    /// Opens the list editor from the idle screen.
    pub fn open_editor(&mut self) {
        if matches!(self.stage, Stage::Idle) {
            self.reload();
            self.stage = Stage::Editor {
                editor: Editor::new(),
                origin: EditorOrigin::Standalone,
            };
        }
    }

    pub fn close_editor(&mut self) {
        if let Stage::Editor { origin, .. } = &self.stage {
            log::info!("Editor closed ({:?})", origin);
            self.stage = Stage::Idle;
        }
    }

    /// Runs `f` against the editor and the document, without persisting.
    pub fn with_editor<R>(&mut self, f: impl FnOnce(&mut Editor, &Document) -> R) -> Option<R> {
        match &mut self.stage {
            Stage::Editor { editor, .. } => Some(f(editor, &self.doc)),
            _ => None,
        }
    }

    pub fn editor_edit_selected(&mut self) {
        let Stage::Editor { editor, .. } = &mut self.stage else {
            return;
        };
        if let Err(e) = editor.edit_selected() {
            self.notice = Some(Notice::info("Edit", e.to_string()));
        }
    }

    pub fn editor_save(&mut self) {
        let Stage::Editor { editor, .. } = &mut self.stage else {
            return;
        };
        match editor.save(&mut self.doc) {
            Ok(idx) => {
                log::info!("Saved row {}", idx);
                self.persist();
            }
            Err(e) => {
                log::debug!("Rejected editor save: {}", e);
                self.notice = Some(e.into());
            }
        }
    }

    pub fn editor_remove(&mut self) {
        let Stage::Editor { editor, .. } = &mut self.stage else {
            return;
        };
        match editor.remove(&mut self.doc) {
            Ok(item) => {
                log::info!("Removed {:?}", item.title);
                self.persist();
            }
            Err(e) => self.notice = Some(Notice::info("Remove", e.to_string())),
        }
    }

    pub fn editor_complete(&mut self) {
        let Stage::Editor { editor, .. } = &mut self.stage else {
            return;
        };
        let (idx, item) = match editor.completion_target(&self.doc) {
            Ok(target) => target,
            Err(e) => {
                self.notice = Some(Notice::info("Completed", e.to_string()));
                return;
            }
        };
        if let Err(e) = self.storage.append_completed(
            &item.title,
            item.last_page,
            item.kind,
            self.clock.today_local(),
        ) {
            log::error!("Failed to append completed item: {:#}", e);
            self.notice = Some(Notice::error("Completed", format!("{:#}", e)));
            return;
        }
        editor.finish_completion(&mut self.doc, idx);
        log::info!("Completed {:?} at page {}", item.title, item.last_page);
        self.persist();
        if self.notice.is_none() {
            self.notice = Some(Notice::info(
                "Completed",
                "Marked completed and added to the reading list markdown.",
            ));
        }
    }

    pub fn open_completed_list(&mut self) {
        if let Err(e) = (self.opener)(&self.vault_name, self.storage.markdown_path()) {
            log::error!("Open failed: {:#}", e);
            self.notice = Some(Notice::error(
                "Open failed",
                format!("Could not open markdown file:\n{:#}", e),
            ));
        }
    }

    fn open_log_stage(&mut self) {
        self.reload();
        if self.doc.active.is_empty() {
            self.notice = Some(Notice::info(
                "Reading list empty",
                "Your reading list is empty. Add items in the editor.",
            ));
            self.stage = Stage::Editor {
                editor: Editor::new(),
                origin: EditorOrigin::ReadSession,
            };
            self.snooze();
        } else {
            self.stage = Stage::LogForm(LogForm::new(&self.doc));
        }
    }

    fn to_idle_snoozed(&mut self) {
        self.stage = Stage::Idle;
        self.snooze();
    }

    /// Persists the snooze timestamp and arms the timer to match it.
    fn snooze(&mut self) {
        let now = self.clock.now_utc();
        let until = snooze_until(now, self.snooze);
        self.doc.set_not_before(Some(until));
        self.persist();
        let delay = (until - now).to_std().unwrap_or(self.snooze);
        self.scheduler.arm(delay, self.clock.now_instant());
        log::info!("Snoozed until {}", until);
    }

    fn reload(&mut self) {
        match self.storage.load() {
            Ok(doc) => self.doc = doc,
            Err(e) => log::error!("Failed to reload reading list: {:#}", e),
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save(&self.doc) {
            log::error!("Failed to save reading list: {:#}", e);
            self.notice = Some(Notice::error("Save failed", format!("{:#}", e)));
        }
    }
}

/// `now + snooze`, rounded up to the whole second the timestamp is stored at.
fn snooze_until(now: DateTime<Utc>, snooze: Duration) -> DateTime<Utc> {
    let at = chrono::Duration::from_std(snooze)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    if at.nanosecond() == 0 {
        return at;
    }
    at.with_nanosecond(0)
        .and_then(|t| t.checked_add_signed(chrono::Duration::seconds(1)))
        .unwrap_or(at)
}
