use super::app_state::{AppMode, ExtensionRow, Focus, LineInput, WorkerMessage};
use super::tree_view::TreeView;
use crate::api::OrganizerApi;
use crate::{clipboard, file_scanner};
use crate::session::{Session, Side};
use crate::settings::{Settings, Theme};
use crate::tree_builder::FolderTree;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error, info, warn};

const QUIT_WHILE_COMMITTING: &str = "The layout is still being applied, quit once it finishes.";

pub struct TuiApp {
    pub(super) session: Session,
    api: Arc<dyn OrganizerApi>,
    pub(super) theme: Theme,
    settings: Settings,
    settings_path: Option<PathBuf>,
    pub(super) focus: Focus,
    pub(super) mode: AppMode,
    pub(super) ext_cursor: usize,
    pub(super) path_input: LineInput,
    pub(super) search_input: LineInput,
    /// `None` until a search has run.
    pub(super) search_results: Option<Vec<String>>,
    pub(super) search_cursor: usize,
    pub(super) searching: bool,
    pub(super) current_view: Option<TreeView>,
    pub(super) proposed_view: Option<TreeView>,
    /// Short-lived notice shown in the footer (copy result, refused request).
    pub(super) notice: String,
    pub(super) quit: bool,
    worker_tx: Sender<WorkerMessage>,
    pub(super) worker_rx: Receiver<WorkerMessage>,
}

impl TuiApp {
    pub fn new(
        session: Session,
        api: Arc<dyn OrganizerApi>,
        settings: Settings,
        settings_path: Option<PathBuf>,
        theme: Theme,
    ) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        TuiApp {
            path_input: LineInput::new(session.root_path()),
            search_input: LineInput::default(),
            search_results: None,
            search_cursor: 0,
            searching: false,
            session,
            api,
            theme,
            settings,
            settings_path,
            focus: Focus::Extensions,
            mode: AppMode::Normal,
            ext_cursor: 0,
            current_view: None,
            proposed_view: None,
            notice: String::new(),
            quit: false,
            worker_tx,
            worker_rx,
        }
    }

    // --- Extension panel ---

    pub(super) fn extension_rows(&self) -> Vec<ExtensionRow> {
        let mut rows = Vec::new();
        for (group_idx, group) in self.session.catalog.groups().iter().enumerate() {
            rows.push(ExtensionRow::Group(group_idx));
            if group.expanded {
                for ext_idx in 0..group.extensions.len() {
                    rows.push(ExtensionRow::Extension {
                        group: group_idx,
                        ext: ext_idx,
                    });
                }
            }
        }
        rows
    }

    fn move_ext_cursor(&mut self, delta: i32) {
        let len = self.extension_rows().len();
        if len == 0 {
            return;
        }
        self.ext_cursor = (self.ext_cursor as i32 + delta).rem_euclid(len as i32) as usize;
    }

    fn activate_ext_row(&mut self) {
        let rows = self.extension_rows();
        match rows.get(self.ext_cursor).copied() {
            Some(ExtensionRow::Group(group_idx)) => self.session.catalog.toggle_group(group_idx),
            Some(ExtensionRow::Extension { group, ext }) => {
                let ext = self.session.catalog.groups()[group].extensions[ext].clone();
                self.session.catalog.toggle(&ext);
            }
            None => {}
        }
    }

    fn set_all_groups_expanded(&mut self, expanded: bool) {
        // Keep the cursor on the same group header when rows disappear.
        let group_idx = match self.extension_rows().get(self.ext_cursor) {
            Some(ExtensionRow::Group(g)) | Some(ExtensionRow::Extension { group: g, .. }) => *g,
            None => 0,
        };
        self.session.catalog.set_all_expanded(expanded);
        self.ext_cursor = self
            .extension_rows()
            .iter()
            .position(|row| *row == ExtensionRow::Group(group_idx))
            .unwrap_or(0);
    }

    // --- Backend calls ---

    pub(super) fn request_fetch(&mut self) {
        let request = match self.session.begin_fetch() {
            Ok(request) => request,
            Err(e) => {
                self.notice = e.to_string();
                return;
            }
        };
        self.current_view = None;
        self.proposed_view = None;
        self.notice.clear();
        let api = Arc::clone(&self.api);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = api.get_formatted_files(&request);
            let _ = tx.send(WorkerMessage::Fetched(result));
        });
    }

    pub(super) fn request_commit(&mut self) {
        let files = match self.session.begin_commit() {
            Ok(files) => files,
            Err(e) => {
                self.notice = e.to_string();
                return;
            }
        };
        self.notice.clear();
        let api = Arc::clone(&self.api);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = api.update_structure(&files);
            let _ = tx.send(WorkerMessage::Committed(result));
        });
    }

    pub(super) fn request_search(&mut self) {
        if self.searching {
            self.notice = "A search is already running.".to_string();
            return;
        }
        let root = file_scanner::search_root(self.session.root_path());
        let recursive = self.session.recursive;
        let exts = self.session.catalog.selected_extensions().to_vec();
        let query = self.search_input.text.clone();
        self.searching = true;
        self.search_results = None;
        self.search_cursor = 0;
        self.notice.clear();
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = file_scanner::search_files(&root, recursive, &exts, &query, false)
                .map(|found| {
                    found
                        .iter()
                        .map(|path| file_scanner::relative_display(&root, path))
                        .collect()
                });
            let _ = tx.send(WorkerMessage::Searched(result));
        });
    }

    pub(super) fn handle_worker_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Fetched(result) => {
                self.session.complete_fetch(result);
                self.rebuild_views();
            }
            WorkerMessage::Committed(result) => self.session.complete_commit(result),
            WorkerMessage::Searched(result) => {
                self.searching = false;
                match result {
                    Ok(hits) => {
                        info!(matches = hits.len(), "local search finished");
                        self.search_results = Some(hits);
                    }
                    Err(e) => {
                        warn!(error = %e, "local search failed");
                        self.notice = format!("Search failed: {}", e);
                    }
                }
            }
        }
    }

    pub(super) fn drain_worker_messages(&mut self) {
        while let Ok(message) = self.worker_rx.try_recv() {
            self.handle_worker_message(message);
        }
    }

    fn rebuild_views(&mut self) {
        let Some(comparison) = self.session.comparison() else {
            self.current_view = None;
            self.proposed_view = None;
            return;
        };
        let root = comparison.root_path();
        self.current_view = Some(TreeView::new(
            Side::Current,
            FolderTree::from_paths(root, comparison.src_paths()),
        ));
        self.proposed_view = Some(TreeView::new(
            Side::Proposed,
            FolderTree::from_paths(root, comparison.dst_paths()),
        ));
    }

    // --- Comparison trees ---

    pub(super) fn view(&self, side: Side) -> Option<&TreeView> {
        match side {
            Side::Current => self.current_view.as_ref(),
            Side::Proposed => self.proposed_view.as_ref(),
        }
    }

    fn view_mut(&mut self, side: Side) -> Option<&mut TreeView> {
        match side {
            Side::Current => self.current_view.as_mut(),
            Side::Proposed => self.proposed_view.as_mut(),
        }
    }

    fn focused_side(&self) -> Option<Side> {
        match self.focus {
            Focus::Current => Some(Side::Current),
            Focus::Proposed => Some(Side::Proposed),
            Focus::Extensions | Focus::Search => None,
        }
    }

    /// Tell the opposite tree which node corresponds to the file under the
    /// cursor on `side`.
    pub(super) fn notify_counterpart(&mut self, side: Side) {
        let Some(view) = self.view(side) else {
            return;
        };
        let highlight = view
            .current_file_path()
            .and_then(|path| self.session.counterpart(side, path));
        if let Some(own) = self.view_mut(side) {
            own.highlighted = None;
        }
        match highlight {
            Some(h) => {
                if let Some(other) = self.view_mut(h.side) {
                    other.highlight(Some(&h.path));
                }
            }
            None => {
                if let Some(other) = self.view_mut(side.opposite()) {
                    other.highlight(None);
                }
            }
        }
    }

    fn with_focused_view(&mut self, action: impl FnOnce(&mut TreeView)) {
        let Some(side) = self.focused_side() else {
            return;
        };
        if let Some(view) = self.view_mut(side) {
            action(view);
            self.notify_counterpart(side);
        }
    }

    // --- Preferences ---

    pub(super) fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.settings.theme = self.theme;
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            error!(error = %e, "could not persist theme");
            self.notice = format!("Could not save theme: {}", e);
        }
    }

    fn copy_plan(&mut self) {
        let Some(comparison) = self.session.comparison() else {
            self.notice = "Nothing to copy yet, fetch a layout first.".to_string();
            return;
        };
        match clipboard::copy_text_to_clipboard(comparison.move_plan()) {
            Ok(()) => self.notice = "Move plan copied to clipboard.".to_string(),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                self.notice = format!("Clipboard error: {}", e);
            }
        }
    }

    fn move_search_cursor(&mut self, delta: i32) {
        let len = self.search_results.as_ref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        self.search_cursor = (self.search_cursor as i32 + delta).rem_euclid(len as i32) as usize;
    }

    // Leaving mid-commit would drop the request and its outcome.
    fn request_quit(&mut self) {
        if self.session.is_committing() {
            self.notice = QUIT_WHILE_COMMITTING.to_string();
            return;
        }
        self.quit = true;
    }

    // --- Event handling sub-methods ---

    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        if key_event.modifiers == KeyModifiers::CONTROL && key_event.code == KeyCode::Char('c') {
            self.request_quit();
            return;
        }
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Char('e') => {
                self.path_input = LineInput::new(self.session.root_path());
                self.mode = AppMode::EditingPath;
            }
            KeyCode::Char('/') => self.mode = AppMode::EditingSearch,
            KeyCode::Char('s') => self.request_search(),
            KeyCode::Char('g') => self.request_fetch(),
            KeyCode::Char('u') => self.request_commit(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('r') => self.session.recursive = !self.session.recursive,
            KeyCode::Char('a') => self.session.catalog.select_all(),
            KeyCode::Char('c') => self.session.catalog.clear(),
            KeyCode::Char('y') => self.copy_plan(),
            _ => match self.focus {
                Focus::Extensions => self.handle_extension_keys(key_event.code),
                Focus::Current | Focus::Proposed => self.handle_tree_keys(key_event.code),
                Focus::Search => self.handle_search_keys(key_event.code),
            },
        }
    }

    fn handle_extension_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_ext_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_ext_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.activate_ext_row(),
            KeyCode::Char('*') => self.set_all_groups_expanded(true),
            KeyCode::Char('-') => self.set_all_groups_expanded(false),
            _ => {}
        }
    }

    fn handle_tree_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.with_focused_view(|v| v.move_cursor(1)),
            KeyCode::Up | KeyCode::Char('k') => self.with_focused_view(|v| v.move_cursor(-1)),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('o') => {
                self.with_focused_view(|v| v.toggle_expansion())
            }
            KeyCode::Char('*') => self.with_focused_view(|v| v.expand_all()),
            KeyCode::Char('-') => self.with_focused_view(|v| v.collapse_all()),
            _ => {}
        }
    }

    fn handle_search_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_search_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_search_cursor(-1),
            KeyCode::Enter => self.request_search(),
            _ => {}
        }
    }

    pub(super) fn handle_editing_mode_input(&mut self, key_event: KeyEvent) {
        let editing_path = self.mode == AppMode::EditingPath;
        match key_event.code {
            KeyCode::Enter if editing_path => {
                self.session.set_root_path(&self.path_input.text);
                debug!(root_path = self.session.root_path(), "root path set");
                self.path_input = LineInput::new(self.session.root_path());
                self.mode = AppMode::Normal;
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.focus = Focus::Search;
                self.request_search();
            }
            KeyCode::Esc => {
                if editing_path {
                    self.path_input = LineInput::new(self.session.root_path());
                }
                self.mode = AppMode::Normal;
            }
            code => {
                let input = if editing_path {
                    &mut self.path_input
                } else {
                    &mut self.search_input
                };
                match code {
                    KeyCode::Char(c) => input.insert(c),
                    KeyCode::Backspace => input.backspace(),
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.move_home(),
                    KeyCode::End => input.move_end(),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionCatalog;
    use crate::session::tests::{FakeApi, sample_layout};
    use crate::session::{COMMIT_SUCCESS_MESSAGE, FETCH_ERROR_MESSAGE};
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(api: FakeApi) -> (TuiApp, Arc<FakeApi>) {
        let api = Arc::new(api);
        let session = Session::new("/r", false, ExtensionCatalog::default());
        let app = TuiApp::new(
            session,
            api.clone(),
            Settings::default(),
            None,
            Theme::Light,
        );
        (app, api)
    }

    fn wait_for_worker(app: &mut TuiApp) {
        let message = app
            .worker_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker reply");
        app.handle_worker_message(message);
    }

    fn fetched_app() -> (TuiApp, Arc<FakeApi>) {
        let (mut app, api) = app_with(FakeApi {
            layout: Some(sample_layout()),
            ..Default::default()
        });
        app.handle_normal_mode_input(key(KeyCode::Char('g')));
        wait_for_worker(&mut app);
        (app, api)
    }

    #[test]
    fn extension_panel_expands_groups_and_toggles_extensions() {
        let (mut app, _) = app_with(FakeApi::default());
        assert_eq!(app.extension_rows().len(), 7);
        app.handle_normal_mode_input(key(KeyCode::Enter)); // expand Documents
        assert_eq!(app.extension_rows().len(), 12);
        app.handle_normal_mode_input(key(KeyCode::Down));
        app.handle_normal_mode_input(key(KeyCode::Char(' '))); // .pdf
        assert!(app.session.catalog.is_selected(".pdf"));
        assert_eq!(app.session.catalog.groups()[0].ratio_label(), "1/5");
        app.handle_normal_mode_input(key(KeyCode::Char('-')));
        assert_eq!(app.extension_rows().len(), 7);
        assert_eq!(app.ext_cursor, 0);
    }

    #[test]
    fn select_all_and_clear_keys() {
        let (mut app, _) = app_with(FakeApi::default());
        app.handle_normal_mode_input(key(KeyCode::Char('a')));
        assert!(app.session.catalog.groups().iter().all(|g| g.selected == g.total));
        app.handle_normal_mode_input(key(KeyCode::Char('c')));
        assert!(app.session.catalog.selected_extensions().is_empty());
    }

    #[test]
    fn editing_the_root_path_normalizes_it() {
        let (mut app, _) = app_with(FakeApi::default());
        app.handle_normal_mode_input(key(KeyCode::Char('e')));
        assert_eq!(app.mode, AppMode::EditingPath);
        for _ in 0..2 {
            app.handle_editing_mode_input(key(KeyCode::Backspace));
        }
        for c in "C:\\data\\inbox".chars() {
            app.handle_editing_mode_input(key(KeyCode::Char(c)));
        }
        app.handle_editing_mode_input(key(KeyCode::Enter));
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.session.root_path(), "C:/data/inbox");
    }

    #[test]
    fn fetch_builds_both_trees() {
        let (app, api) = fetched_app();
        assert!(!app.session.is_loading());
        let current = app.view(Side::Current).unwrap();
        let proposed = app.view(Side::Proposed).unwrap();
        assert!(current.tree.position_of("/r/a/b.txt").is_some());
        assert!(proposed.tree.position_of("/r/images/photo.png").is_some());
        assert_eq!(api.fetches.lock().unwrap()[0].root_path, "/r");
    }

    #[test]
    fn failed_fetch_leaves_loading_state() {
        let (mut app, _) = app_with(FakeApi::default());
        app.handle_normal_mode_input(key(KeyCode::Char('g')));
        wait_for_worker(&mut app);
        assert!(!app.session.is_loading());
        assert_eq!(app.session.error_message, FETCH_ERROR_MESSAGE);
        assert!(app.view(Side::Current).is_none());
    }

    #[test]
    fn moving_onto_a_file_highlights_its_counterpart() {
        let (mut app, _) = fetched_app();
        app.handle_normal_mode_input(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Current);
        // Current tree: /r, a, b.txt, photo.png
        app.handle_normal_mode_input(key(KeyCode::Down));
        app.handle_normal_mode_input(key(KeyCode::Down));
        let current = app.view(Side::Current).unwrap();
        assert_eq!(current.current_file_path(), Some("/r/a/b.txt"));
        let proposed = app.view(Side::Proposed).unwrap();
        let expected = proposed.tree.position_of("/r/c/b.txt");
        assert_eq!(proposed.highlighted, expected);

        // And back from the proposed side.
        app.handle_normal_mode_input(key(KeyCode::Tab));
        let target = app
            .view(Side::Proposed)
            .unwrap()
            .tree
            .position_of("/r/images/photo.png")
            .unwrap();
        app.proposed_view.as_mut().unwrap().cursor = target - 1;
        app.handle_normal_mode_input(key(KeyCode::Down));
        let current = app.view(Side::Current).unwrap();
        assert_eq!(current.highlighted, current.tree.position_of("/r/a/photo.png"));
    }

    #[test]
    fn directories_clear_the_opposite_highlight() {
        let (mut app, _) = fetched_app();
        app.focus = Focus::Current;
        app.handle_normal_mode_input(key(KeyCode::Down));
        app.handle_normal_mode_input(key(KeyCode::Down));
        assert!(app.view(Side::Proposed).unwrap().highlighted.is_some());
        app.handle_normal_mode_input(key(KeyCode::Up));
        assert!(app.view(Side::Proposed).unwrap().highlighted.is_none());
    }

    #[test]
    fn commit_reports_success() {
        let (mut app, api) = fetched_app();
        app.handle_normal_mode_input(key(KeyCode::Char('u')));
        wait_for_worker(&mut app);
        assert_eq!(app.session.success_message, COMMIT_SUCCESS_MESSAGE);
        assert_eq!(api.commits.lock().unwrap().len(), 1);
    }

    #[test]
    fn quitting_waits_for_a_pending_commit() {
        let (mut app, _) = fetched_app();
        app.handle_normal_mode_input(key(KeyCode::Char('u')));
        assert!(app.session.is_committing());
        app.handle_normal_mode_input(key(KeyCode::Char('q')));
        app.handle_normal_mode_input(key(KeyCode::Esc));
        app.handle_normal_mode_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.quit);
        assert_eq!(app.notice, QUIT_WHILE_COMMITTING);

        wait_for_worker(&mut app);
        assert_eq!(app.session.success_message, COMMIT_SUCCESS_MESSAGE);
        app.handle_normal_mode_input(key(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn search_pane_lists_matching_local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("invoice-2024.pdf"), "").unwrap();
        std::fs::write(dir.path().join("invoice-2024.txt"), "").unwrap();
        std::fs::write(dir.path().join("holiday.pdf"), "").unwrap();

        let (mut app, api) = app_with(FakeApi::default());
        app.session.set_root_path(&dir.path().to_string_lossy());
        app.session.catalog.toggle(".pdf");
        app.handle_normal_mode_input(key(KeyCode::Char('/')));
        assert_eq!(app.mode, AppMode::EditingSearch);
        for c in "INVOICE".chars() {
            app.handle_editing_mode_input(key(KeyCode::Char(c)));
        }
        app.handle_editing_mode_input(key(KeyCode::Enter));
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.focus, Focus::Search);
        assert!(app.searching);
        wait_for_worker(&mut app);

        assert!(!app.searching);
        assert_eq!(app.search_results, Some(vec!["invoice-2024.pdf".to_string()]));
        // Local only: the backend is never asked.
        assert!(api.fetches.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_search_reports_a_notice() {
        let (mut app, _) = app_with(FakeApi::default());
        app.session.set_root_path("/definitely/not/here");
        app.handle_normal_mode_input(key(KeyCode::Char('s')));
        wait_for_worker(&mut app);
        assert!(app.search_results.is_none());
        assert!(app.notice.starts_with("Search failed"));
    }

    #[test]
    fn commit_before_fetch_only_shows_a_notice() {
        let (mut app, api) = app_with(FakeApi::default());
        app.handle_normal_mode_input(key(KeyCode::Char('u')));
        assert!(!app.notice.is_empty());
        assert!(api.commits.lock().unwrap().is_empty());
    }

    #[test]
    fn theme_toggle_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let session = Session::new("/r", false, ExtensionCatalog::default());
        let mut app = TuiApp::new(
            session,
            Arc::new(FakeApi::default()),
            Settings::default(),
            Some(path.clone()),
            Theme::Light,
        );
        app.handle_normal_mode_input(key(KeyCode::Char('t')));
        assert_eq!(app.theme, Theme::Dark);
        assert_eq!(Settings::load(&path).theme, Theme::Dark);
        app.handle_normal_mode_input(key(KeyCode::Char('t')));
        assert_eq!(Settings::load(&path).theme, Theme::Light);
    }

    #[test]
    fn recursive_flag_toggles() {
        let (mut app, _) = app_with(FakeApi::default());
        app.handle_normal_mode_input(key(KeyCode::Char('r')));
        assert!(app.session.recursive);
    }
}
