//! Application state and logic

use std::time::{Duration, Instant};

use condoguard_core::{
    query, AccessLevel, Clock, Config, KeyValueStore, Resident, ResidentStore, StorageUsage,
};

use crate::commands::document;

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Search mode (after pressing /)
    Search,
}

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Resident list with a preview of the selection
    List,
    /// Full-screen detail of the selected resident
    Detail,
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Current screen
    pub view: View,
    /// What the operator may do
    pub access: AccessLevel,
    /// All residents (unfiltered, for search)
    pub all_residents: Vec<Resident>,
    /// Residents matching the search
    pub residents: Vec<Resident>,
    /// Currently selected resident index
    pub selected: usize,
    /// Search text
    pub search: String,
    /// Register usage against capacity
    pub usage: StorageUsage,
    /// Percentage at which usage is flagged
    pub warning_percent: f64,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Create a new app with data from store
    pub fn new<K: KeyValueStore, C: Clock>(
        store: &ResidentStore<K, C>,
        config: &Config,
        access: AccessLevel,
    ) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            view: View::List,
            access,
            all_residents: Vec::new(),
            residents: Vec::new(),
            selected: 0,
            search: String::new(),
            usage: StorageUsage::new(0, config.capacity),
            warning_percent: config.usage_warning_percent,
            status_message: None,
            status_message_time: None,
            show_help: false,
        };
        app.refresh(store);
        app
    }

    /// Reload residents from the store, keeping the search
    pub fn refresh<K: KeyValueStore, C: Clock>(&mut self, store: &ResidentStore<K, C>) {
        self.all_residents = store.list();
        self.usage = StorageUsage::new(self.all_residents.len(), self.usage.total);
        self.apply_search();
    }

    /// Re-run the search over all residents
    pub fn apply_search(&mut self) {
        self.residents = query::filter(&self.all_residents, &self.search);
        if self.selected >= self.residents.len() {
            self.selected = self.residents.len().saturating_sub(1);
        }
    }

    /// Whether usage has reached the warning threshold
    pub fn usage_critical(&self) -> bool {
        self.usage.is_critical(self.warning_percent)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Get the currently selected resident
    pub fn current_resident(&self) -> Option<&Resident> {
        self.residents.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected < self.residents.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_last(&mut self) {
        self.selected = self.residents.len().saturating_sub(1);
    }

    /// Open the detail view for the selection
    pub fn open_detail(&mut self) {
        if self.current_resident().is_some() {
            self.view = View::Detail;
        }
    }

    pub fn close_detail(&mut self) {
        self.view = View::List;
    }

    /// Enter search mode
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
    }

    /// Leave search mode, keeping the filter
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Clear search and show all residents
    pub fn clear_search(&mut self) {
        self.search.clear();
        self.apply_search();
    }

    /// Append a character to the search and re-filter
    pub fn insert_char(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
        self.apply_search();
    }

    /// Remove the last search character and re-filter
    pub fn delete_char(&mut self) {
        self.search.pop();
        self.apply_search();
    }

    /// Toggle the selected resident's status (admin only)
    pub fn toggle_current<K: KeyValueStore, C: Clock>(&mut self, store: &ResidentStore<K, C>) {
        if !self.access.is_admin() {
            self.set_status("Admin access required to change status");
            return;
        }
        let Some(resident) = self.current_resident().cloned() else {
            return;
        };

        match store.toggle_status(&resident.id) {
            Ok(Some(status)) => {
                self.refresh(store);
                self.set_status(format!("{} is now {}", resident.display_id(), status));
            }
            Ok(None) => {
                self.refresh(store);
                self.set_status(format!("{} no longer exists", resident.display_id()));
            }
            Err(e) => self.set_status(format!("Failed to update status: {}", e)),
        }
    }

    /// Export the selected resident's card (admin only)
    pub fn export_current_card<K: KeyValueStore, C: Clock>(
        &mut self,
        store: &ResidentStore<K, C>,
        config: &Config,
    ) {
        if !self.access.is_admin() {
            self.set_status("Admin access required to export cards");
            return;
        }
        let Some(resident) = self.current_resident().cloned() else {
            return;
        };

        match document::write_card(store, config, &resident) {
            Ok(path) => self.set_status(format!("Card written to {}", path.display())),
            Err(e) => self.set_status(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use condoguard_core::{FixedClock, MemoryStore, ResidentDraft, ResidentStatus};
    use tempfile::TempDir;

    fn store(kv: &MemoryStore) -> ResidentStore<&MemoryStore, FixedClock> {
        let store = ResidentStore::new(
            kv,
            FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()),
        );
        store.register(ResidentDraft::new("Ana", "12")).unwrap();
        store.register(ResidentDraft::new("Beto", "7")).unwrap();
        store.register(ResidentDraft::new("Carla", "120")).unwrap();
        store
    }

    #[test]
    fn test_search_filters_and_clamps_selection() {
        let kv = MemoryStore::new();
        let store = store(&kv);
        let mut app = App::new(&store, &Config::default(), AccessLevel::Viewer);

        app.move_to_last();
        assert_eq!(app.selected, 2);

        for c in "12".chars() {
            app.insert_char(c);
        }
        let names: Vec<_> = app.residents.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Carla"]);
        assert_eq!(app.selected, 0);

        app.clear_search();
        assert_eq!(app.residents.len(), 3);
    }

    #[test]
    fn test_navigation_bounds() {
        let kv = MemoryStore::new();
        let store = store(&kv);
        let mut app = App::new(&store, &Config::default(), AccessLevel::Viewer);

        app.move_up();
        assert_eq!(app.selected, 0);
        app.move_down();
        app.move_down();
        app.move_down();
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_viewer_cannot_toggle() {
        let kv = MemoryStore::new();
        let store = store(&kv);
        let mut app = App::new(&store, &Config::default(), AccessLevel::Viewer);

        app.toggle_current(&store);

        assert!(app.status_message.unwrap().contains("Admin access required"));
        assert!(store.list().iter().all(|r| r.status.is_active()));
    }

    #[test]
    fn test_admin_toggle_refreshes_list() {
        let kv = MemoryStore::new();
        let store = store(&kv);
        let mut app = App::new(&store, &Config::default(), AccessLevel::Admin);

        app.move_down();
        app.toggle_current(&store);

        assert_eq!(app.residents[1].status, ResidentStatus::Inactive);
        assert_eq!(store.get("2").unwrap().status, ResidentStatus::Inactive);
    }

    #[test]
    fn test_admin_exports_card() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };
        let kv = MemoryStore::new();
        let store = store(&kv);
        let mut app = App::new(&store, &config, AccessLevel::Admin);

        app.export_current_card(&store, &config);

        assert!(temp_dir.path().join("Ana.pdf").exists());
        assert!(app.status_message.unwrap().starts_with("Card written"));
    }

    #[test]
    fn test_usage_reflects_capacity() {
        let kv = MemoryStore::new();
        let store = store(&kv);
        let config = Config {
            capacity: 3,
            ..Config::default()
        };
        let app = App::new(&store, &config, AccessLevel::Viewer);

        assert_eq!(app.usage.used, 3);
        assert!(app.usage_critical());
    }

    #[test]
    fn test_detail_requires_selection() {
        let kv = MemoryStore::new();
        let store = ResidentStore::new(&kv, FixedClock::at_millis(0));
        let mut app = App::new(&store, &Config::default(), AccessLevel::Viewer);

        app.open_detail();
        assert_eq!(app.view, View::List);
    }
}
