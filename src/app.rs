use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use crate::clock::{Clock, CoarseClock};
use crate::config::AppConfig;
use crate::governance::{self, DateFormatter, ProposalCaption};
use crate::migration::{self, MigrationRow, RowAction};
use crate::snapshot::DashboardSnapshot;

/// Status messages clear after this long
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Proposals,
    Migration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Data from the upstream providers
    pub snapshot: DashboardSnapshot,
    pub snapshot_path: Option<PathBuf>,
    snapshot_modified: Option<SystemTime>,

    pub selected_proposal: usize,
    pub selected_position: usize,

    // Coarse clock all captions are computed against
    pub clock: CoarseClock<Box<dyn Clock>>,
    pub dates: DateFormatter,
    pub show_usd: bool,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    /// Build the app around an already loaded snapshot
    pub fn from_snapshot(config: &AppConfig, snapshot: DashboardSnapshot, clock: Box<dyn Clock>) -> Self {
        Self {
            section: Section::Proposals,
            popup: Popup::None,

            snapshot,
            snapshot_path: None,
            snapshot_modified: None,

            selected_proposal: 0,
            selected_position: 0,

            clock: CoarseClock::new(clock, Duration::from_secs(config.clock_refresh_secs)),
            dates: DateFormatter::with_offset_minutes(config.utc_offset_minutes),
            show_usd: config.show_usd,

            status_message: None,
            status_message_time: None,
        }
    }

    pub async fn new(config: &AppConfig, snapshot_path: Option<PathBuf>, clock: Box<dyn Clock>) -> Result<Self> {
        let mut app = Self::from_snapshot(config, DashboardSnapshot::default(), clock);
        app.snapshot_path = snapshot_path;

        if app.snapshot_path.is_some() {
            // A broken snapshot should not keep the dashboard from opening
            if let Err(e) = app.reload().await {
                tracing::warn!("Initial snapshot load failed: {:#}", e);
                app.set_status(format!("Snapshot: {}", e));
            }
        } else {
            app.set_status("No snapshot loaded (pass --snapshot)");
        }

        Ok(app)
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn proposal_captions(&self) -> Vec<ProposalCaption> {
        let now = self.now();
        self.snapshot
            .proposals
            .iter()
            .map(|p| governance::caption(&p.timing, now, &self.dates))
            .collect()
    }

    pub fn migration_rows(&self) -> Vec<MigrationRow> {
        self.snapshot.migration.iter().map(migration::describe).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.snapshot.migration.iter().filter(|p| p.checked).count()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Proposals => Section::Migration,
                    Section::Migration => Section::Proposals,
                };
            }

            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Checkbox of the selected migration row
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.section == Section::Migration {
                    self.press_checkbox();
                }
            }

            // Enable-as-collateral affordance
            KeyCode::Char('c') => {
                if self.section == Section::Migration {
                    self.press_enable_collateral();
                }
            }

            KeyCode::Char('R') => {
                if let Err(e) = self.reload().await {
                    self.set_status(format!("Reload failed: {}", e));
                }
            }

            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn move_down(&mut self) {
        match self.section {
            Section::Proposals => {
                if !self.snapshot.proposals.is_empty() {
                    self.selected_proposal = (self.selected_proposal + 1) % self.snapshot.proposals.len();
                }
            }
            Section::Migration => {
                if !self.snapshot.migration.is_empty() {
                    self.selected_position = (self.selected_position + 1) % self.snapshot.migration.len();
                }
            }
        }
    }

    fn move_up(&mut self) {
        match self.section {
            Section::Proposals => {
                if !self.snapshot.proposals.is_empty() {
                    self.selected_proposal = self
                        .selected_proposal
                        .checked_sub(1)
                        .unwrap_or(self.snapshot.proposals.len() - 1);
                }
            }
            Section::Migration => {
                if !self.snapshot.migration.is_empty() {
                    self.selected_position = self
                        .selected_position
                        .checked_sub(1)
                        .unwrap_or(self.snapshot.migration.len() - 1);
                }
            }
        }
    }

    fn selected_row(&self) -> Option<MigrationRow> {
        self.snapshot
            .migration
            .get(self.selected_position)
            .map(migration::describe)
    }

    fn press_checkbox(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        match row.press_checkbox() {
            Some(action) => self.apply_action(self.selected_position, action),
            None => {
                let reason = row.disabled_reason.unwrap_or("not available");
                self.set_status(format!("{} can't be migrated: {}", row.symbol, reason));
            }
        }
    }

    fn press_enable_collateral(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if let Some(action) = row.press_enable_collateral() {
            self.apply_action(self.selected_position, action);
        }
    }

    /// Selector-store side of the row interactions
    pub fn apply_action(&mut self, index: usize, action: RowAction) {
        let Some(position) = self.snapshot.migration.get_mut(index) else {
            return;
        };
        let symbol = position.user_reserve.symbol.clone();

        match action {
            RowAction::ToggleSelection => {
                position.checked = !position.checked;
                tracing::info!(symbol = %symbol, checked = position.checked, "migration selection toggled");
                let verb = if position.checked { "Selected" } else { "Deselected" };
                self.set_status(format!("{} {}", verb, symbol));
            }
            RowAction::EnableCollateral => {
                if let Some(collateral) = position.collateral.as_mut() {
                    collateral.enabled_as_collateral = true;
                    tracing::info!(symbol = %symbol, "collateral enabled for migration");
                    self.set_status(format!("{} will be used as collateral on v3", symbol));
                }
            }
        }
    }

    /// Re-read the snapshot file
    pub async fn reload(&mut self) -> Result<()> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };

        let mut snapshot = DashboardSnapshot::load(&path).await?;
        migration::carry_selections(&self.snapshot.migration, &mut snapshot.migration);
        self.snapshot = snapshot;
        self.snapshot_modified = tokio::fs::metadata(&path).await.and_then(|m| m.modified()).ok();

        if self.selected_proposal >= self.snapshot.proposals.len() {
            self.selected_proposal = 0;
        }
        if self.selected_position >= self.snapshot.migration.len() {
            self.selected_position = 0;
        }

        // Fresh data gets fresh captions
        self.clock.force_refresh();

        if self.snapshot.is_empty() {
            self.set_status(format!("{} has no proposals or positions", path.display()));
        } else {
            self.set_status(format!(
                "Loaded {} proposals, {} positions",
                self.snapshot.proposals.len(),
                self.snapshot.migration.len()
            ));
        }
        Ok(())
    }

    async fn snapshot_changed(&self) -> bool {
        let Some(path) = &self.snapshot_path else {
            return false;
        };
        match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
            Ok(modified) => Some(modified) != self.snapshot_modified,
            Err(_) => false,
        }
    }

    pub async fn tick(&mut self) -> Result<()> {
        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        // Captions only move when the coarse clock does; the snapshot is
        // polled on the same cadence
        if self.clock.refresh() && self.snapshot_changed().await {
            tracing::debug!("snapshot changed on disk");
            if let Err(e) = self.reload().await {
                tracing::warn!("Snapshot reload failed: {:#}", e);
                self.set_status(format!("Reload failed: {}", e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::migration::MigrationDisabled;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    const DEMO: &str = include_str!("../demos/dashboard.json");
    const NOW: i64 = 1_760_500_000;

    struct SharedClock(Arc<AtomicI64>);

    impl Clock for SharedClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn demo_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, DEMO).unwrap();
        let app = App::new(&AppConfig::default(), Some(path), Box::new(FixedClock(NOW)))
            .await
            .unwrap();
        (app, dir)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[tokio::test]
    async fn test_loads_snapshot() {
        let (app, _dir) = demo_app().await;
        assert_eq!(app.snapshot.proposals.len(), 5);
        assert_eq!(app.proposal_captions().len(), 5);
        assert_eq!(app.migration_rows().len(), 4);
        assert_eq!(app.selected_count(), 1);
        assert_eq!(app.proposal_captions()[1].label, "Voting ends");
    }

    #[tokio::test]
    async fn test_missing_snapshot_does_not_fail_startup() {
        let app = App::new(
            &AppConfig::default(),
            Some(PathBuf::from("/nonexistent/govboard.json")),
            Box::new(FixedClock(NOW)),
        )
        .await
        .unwrap();
        assert!(app.snapshot.is_empty());
        assert!(app.status_message.as_deref().unwrap_or_default().starts_with("Snapshot:"));
    }

    #[tokio::test]
    async fn test_space_toggles_selection_once() {
        let (mut app, _dir) = demo_app().await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.section, Section::Migration);

        app.handle_key(key(KeyCode::Down)).await.unwrap();
        assert!(!app.snapshot.migration[1].checked);
        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        assert!(app.snapshot.migration[1].checked);
        assert_eq!(app.selected_count(), 2);

        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        assert!(!app.snapshot.migration[1].checked);
    }

    #[tokio::test]
    async fn test_disabled_row_ignores_toggle() {
        let (mut app, _dir) = demo_app().await;
        app.section = Section::Migration;
        app.selected_position = 3;
        assert_eq!(app.snapshot.migration[3].disabled, Some(MigrationDisabled::V3AssetMissing));

        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert!(!app.snapshot.migration[3].checked);
        assert!(app
            .status_message
            .as_deref()
            .unwrap_or_default()
            .contains("Asset is not listed on v3"));
    }

    #[tokio::test]
    async fn test_space_outside_migration_does_nothing() {
        let (mut app, _dir) = demo_app().await;
        let before = app.snapshot.clone();
        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        assert_eq!(app.snapshot, before);
    }

    #[tokio::test]
    async fn test_enable_collateral_requires_capability() {
        let (mut app, _dir) = demo_app().await;
        app.section = Section::Migration;

        // DAI borrow has no collateral capability
        app.selected_position = 2;
        let before = app.snapshot.clone();
        app.handle_key(key(KeyCode::Char('c'))).await.unwrap();
        assert_eq!(app.snapshot, before);

        app.snapshot.migration[0].collateral = Some(Default::default());
        app.selected_position = 0;
        app.handle_key(key(KeyCode::Char('c'))).await.unwrap();
        assert_eq!(
            app.snapshot.migration[0].collateral.map(|c| c.enabled_as_collateral),
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_navigation_wraps() {
        let (mut app, _dir) = demo_app().await;
        app.handle_key(key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.selected_proposal, 4);
        app.handle_key(key(KeyCode::Char('j'))).await.unwrap();
        assert_eq!(app.selected_proposal, 0);
    }

    #[tokio::test]
    async fn test_help_popup_swallows_keys() {
        let (mut app, _dir) = demo_app().await;
        app.handle_key(key(KeyCode::Char('?'))).await.unwrap();
        assert_eq!(app.popup, Popup::Help);
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.section, Section::Proposals);
        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test]
    async fn test_tick_moves_captions_on_clock_interval() {
        let time = Arc::new(AtomicI64::new(NOW));
        let mut app = App::new(&AppConfig::default(), None, Box::new(SharedClock(time.clone())))
            .await
            .unwrap();
        assert_eq!(app.now(), NOW);

        time.store(NOW + 10, Ordering::SeqCst);
        app.tick().await.unwrap();
        assert_eq!(app.now(), NOW, "inside the 30s window");

        time.store(NOW + 30, Ordering::SeqCst);
        app.tick().await.unwrap();
        assert_eq!(app.now(), NOW + 30);
    }

    #[tokio::test]
    async fn test_auto_reload_keeps_selections() {
        let mut demo: serde_json::Value = serde_json::from_str(DEMO).unwrap();
        demo["migration"][1]["collateral"]["enabled_as_collateral"] = false.into();
        let demo = demo.to_string();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, &demo).unwrap();

        let time = Arc::new(AtomicI64::new(NOW));
        let mut app = App::new(&AppConfig::default(), Some(path.clone()), Box::new(SharedClock(time.clone())))
            .await
            .unwrap();

        app.apply_action(0, RowAction::ToggleSelection);
        app.apply_action(1, RowAction::ToggleSelection);
        app.apply_action(1, RowAction::EnableCollateral);
        assert_eq!(app.selected_count(), 1);

        // The exporter rewrites the file with its own view of the positions
        std::fs::write(&path, &demo).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        time.store(NOW + 30, Ordering::SeqCst);
        app.tick().await.unwrap();
        assert_eq!(app.now(), NOW + 30);
        assert!(app.status_message.as_deref().unwrap_or_default().starts_with("Loaded"));

        assert!(!app.snapshot.migration[0].checked);
        assert!(app.snapshot.migration[1].checked);
        assert_eq!(
            app.snapshot.migration[1].collateral.map(|c| c.enabled_as_collateral),
            Some(true)
        );
        assert_eq!(app.selected_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_snapshot() {
        let (mut app, dir) = demo_app().await;
        app.selected_position = 3;
        std::fs::write(dir.path().join("dashboard.json"), r#"{"migration": []}"#).unwrap();

        app.handle_key(key(KeyCode::Char('R'))).await.unwrap();
        assert!(app.snapshot.migration.is_empty());
        assert_eq!(app.selected_position, 0);
    }
}
