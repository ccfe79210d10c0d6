//! Session state shared by the TUI and the headless workflow: the root path,
//! the extension selection, the last fetched layout and the status messages.

use crate::api::{FetchRequest, FileItem, FormattedFiles, OrganizerApi};
use crate::error::{ApiError, SessionError};
use crate::extensions::ExtensionCatalog;
use crate::paths;
use tracing::{error, info, warn};

pub const COMMIT_SUCCESS_MESSAGE: &str = "Files re-structured successfully.";
pub const COMMIT_ERROR_MESSAGE: &str = "An error occurred while moving data.";
pub const FETCH_ERROR_MESSAGE: &str = "An error occurred while fetching files.";

/// Which of the two rendered trees a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Current = 0,
    Proposed = 1,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Current => Side::Proposed,
            Side::Proposed => Side::Current,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Side::Current => "Current Structure",
            Side::Proposed => "Optimized Structure",
        }
    }
}

/// A path the opposite tree should highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub side: Side,
    pub path: String,
}

/// The last fetched layout plus the absolute paths derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    files: FormattedFiles,
    src_paths: Vec<String>,
    dst_paths: Vec<String>,
}

impl Comparison {
    /// Normalize separators and prefix every relative path with the
    /// response's root path.
    pub fn from_response(mut files: FormattedFiles) -> Self {
        files.items = files
            .items
            .into_iter()
            .map(|item| FileItem {
                src_path: paths::normalize_separators(&item.src_path),
                dst_path: paths::normalize_separators(&item.dst_path),
            })
            .collect();
        let src_paths = files
            .items
            .iter()
            .map(|item| paths::compose(&files.root_path, &item.src_path))
            .collect();
        let dst_paths = files
            .items
            .iter()
            .map(|item| paths::compose(&files.root_path, &item.dst_path))
            .collect();
        Comparison {
            files,
            src_paths,
            dst_paths,
        }
    }

    pub fn files(&self) -> &FormattedFiles {
        &self.files
    }

    pub fn root_path(&self) -> &str {
        &self.files.root_path
    }

    pub fn src_paths(&self) -> &[String] {
        &self.src_paths
    }

    pub fn dst_paths(&self) -> &[String] {
        &self.dst_paths
    }

    pub fn paths(&self, side: Side) -> &[String] {
        match side {
            Side::Current => &self.src_paths,
            Side::Proposed => &self.dst_paths,
        }
    }

    /// Locate the item rendered at `path` on `side` and return where the same
    /// file lives in the opposite tree. `None` when nothing matches.
    pub fn counterpart(&self, side: Side, path: &str) -> Option<Highlight> {
        let idx = self.paths(side).iter().position(|p| p == path)?;
        let opposite = side.opposite();
        Some(Highlight {
            side: opposite,
            path: self.paths(opposite)[idx].clone(),
        })
    }

    /// One `src -> dst` line per item, relative to the root.
    pub fn move_plan(&self) -> String {
        let mut plan = format!("# root: {}\n", self.files.root_path);
        for item in &self.files.items {
            plan.push_str(&format!("{} -> {}\n", item.src_path, item.dst_path));
        }
        plan
    }

    /// Items whose destination differs from their source.
    pub fn moved_count(&self) -> usize {
        self.files
            .items
            .iter()
            .filter(|item| item.src_path != item.dst_path)
            .count()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    root_path: String,
    pub recursive: bool,
    pub catalog: ExtensionCatalog,
    comparison: Option<Comparison>,
    pub success_message: String,
    pub error_message: String,
    loading: bool,
    committing: bool,
}

impl Session {
    pub fn new(root_path: &str, recursive: bool, catalog: ExtensionCatalog) -> Self {
        Session {
            root_path: paths::normalize_separators(root_path),
            recursive,
            catalog,
            ..Default::default()
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn set_root_path(&mut self, value: &str) {
        self.root_path = paths::normalize_separators(value);
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_committing(&self) -> bool {
        self.committing
    }

    /// Clear previous results and describe the request to send.
    ///
    /// Refused while a commit is in flight: the layout is about to change,
    /// and the commit outcome must not land next to a new fetch.
    pub fn begin_fetch(&mut self) -> Result<FetchRequest, SessionError> {
        if self.loading {
            warn!("fetch requested while another fetch is in flight");
            return Err(SessionError::InFlight("fetch"));
        }
        if self.committing {
            warn!("fetch requested while a commit is in flight");
            return Err(SessionError::InFlight("commit"));
        }
        self.comparison = None;
        self.success_message.clear();
        self.error_message.clear();
        self.loading = true;
        Ok(FetchRequest {
            root_path: self.root_path.clone(),
            recursive: self.recursive,
            required_exts: self.catalog.required_exts(),
        })
    }

    pub fn complete_fetch(&mut self, result: Result<FormattedFiles, ApiError>) {
        self.loading = false;
        match result {
            Ok(files) => {
                let comparison = Comparison::from_response(files);
                info!(
                    root_path = comparison.root_path(),
                    items = comparison.files().items.len(),
                    moved = comparison.moved_count(),
                    "layout fetched"
                );
                self.comparison = Some(comparison);
            }
            Err(e) => {
                error!(error = %e, "fetching layout failed");
                self.error_message = FETCH_ERROR_MESSAGE.to_string();
            }
        }
    }

    pub fn fetch(&mut self, api: &dyn OrganizerApi) -> Result<(), SessionError> {
        let request = self.begin_fetch()?;
        let result = api.get_formatted_files(&request);
        self.complete_fetch(result);
        Ok(())
    }

    /// Hand out the fetched layout for submission.
    pub fn begin_commit(&mut self) -> Result<FormattedFiles, SessionError> {
        if self.committing {
            warn!("commit requested while another commit is in flight");
            return Err(SessionError::InFlight("commit"));
        }
        let files = self
            .comparison
            .as_ref()
            .map(|c| c.files().clone())
            .ok_or(SessionError::NothingFetched)?;
        self.success_message.clear();
        self.error_message.clear();
        self.committing = true;
        Ok(files)
    }

    pub fn complete_commit(&mut self, result: Result<(), ApiError>) {
        self.committing = false;
        match result {
            Ok(()) => {
                info!("layout applied");
                self.success_message = COMMIT_SUCCESS_MESSAGE.to_string();
            }
            Err(e) => {
                error!(error = %e, "applying layout failed");
                self.error_message = COMMIT_ERROR_MESSAGE.to_string();
            }
        }
    }

    pub fn commit(&mut self, api: &dyn OrganizerApi) -> Result<(), SessionError> {
        let files = self.begin_commit()?;
        let result = api.update_structure(&files);
        self.complete_commit(result);
        Ok(())
    }

    pub fn counterpart(&self, side: Side, path: &str) -> Option<Highlight> {
        self.comparison.as_ref()?.counterpart(side, path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// In-memory backend recording what it was asked.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub layout: Option<FormattedFiles>,
        pub fail_commit: bool,
        pub fetches: Mutex<Vec<FetchRequest>>,
        pub commits: Mutex<Vec<FormattedFiles>>,
    }

    impl OrganizerApi for FakeApi {
        fn get_formatted_files(&self, request: &FetchRequest) -> Result<FormattedFiles, ApiError> {
            self.fetches.lock().unwrap().push(request.clone());
            self.layout.clone().ok_or(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            })
        }

        fn update_structure(&self, files: &FormattedFiles) -> Result<(), ApiError> {
            self.commits.lock().unwrap().push(files.clone());
            if self.fail_commit {
                Err(ApiError::Status {
                    status: StatusCode::BAD_GATEWAY,
                    body: String::new(),
                })
            } else {
                Ok(())
            }
        }
    }

    pub(crate) fn sample_layout() -> FormattedFiles {
        FormattedFiles {
            root_path: "/r".to_string(),
            items: vec![
                FileItem {
                    src_path: "a/b.txt".to_string(),
                    dst_path: "c/b.txt".to_string(),
                },
                FileItem {
                    src_path: "a\\photo.png".to_string(),
                    dst_path: "images\\photo.png".to_string(),
                },
            ],
        }
    }

    fn fetched_session() -> Session {
        let mut session = Session::new("/r", false, ExtensionCatalog::default());
        session.begin_fetch().unwrap();
        session.complete_fetch(Ok(sample_layout()));
        session
    }

    #[test]
    fn composes_absolute_paths_from_the_response_root() {
        let session = fetched_session();
        let comparison = session.comparison().unwrap();
        assert_eq!(comparison.src_paths()[0], "/r/a/b.txt");
        assert_eq!(comparison.dst_paths()[0], "/r/c/b.txt");
    }

    #[test]
    fn normalizes_backslashes_before_display() {
        let session = fetched_session();
        let comparison = session.comparison().unwrap();
        assert_eq!(comparison.src_paths()[1], "/r/a/photo.png");
        assert_eq!(comparison.dst_paths()[1], "/r/images/photo.png");
        assert_eq!(comparison.files().items[1].src_path, "a/photo.png");
    }

    #[test]
    fn highlight_maps_current_to_proposed_and_back() {
        let session = fetched_session();
        assert_eq!(
            session.counterpart(Side::Current, "/r/a/b.txt"),
            Some(Highlight {
                side: Side::Proposed,
                path: "/r/c/b.txt".to_string()
            })
        );
        assert_eq!(
            session.counterpart(Side::Proposed, "/r/c/b.txt"),
            Some(Highlight {
                side: Side::Current,
                path: "/r/a/b.txt".to_string()
            })
        );
    }

    #[test]
    fn highlight_miss_returns_none() {
        let session = fetched_session();
        assert_eq!(session.counterpart(Side::Current, "/r/c/b.txt"), None);
        assert_eq!(session.counterpart(Side::Proposed, "/r/nope"), None);
        let empty = Session::default();
        assert_eq!(empty.counterpart(Side::Current, "/r/a/b.txt"), None);
    }

    #[test]
    fn fetch_sends_root_recursive_and_joined_extensions() {
        let api = FakeApi {
            layout: Some(sample_layout()),
            ..Default::default()
        };
        let mut catalog = ExtensionCatalog::default();
        catalog.toggle(".txt");
        catalog.toggle(".png");
        let mut session = Session::new(r"C:\data", true, catalog);
        session.fetch(&api).unwrap();

        let sent = api.fetches.lock().unwrap();
        assert_eq!(
            sent[0],
            FetchRequest {
                root_path: "C:/data".to_string(),
                recursive: true,
                required_exts: ".txt;.png".to_string(),
            }
        );
        assert!(!session.is_loading());
        assert!(session.comparison().is_some());
    }

    #[test]
    fn begin_fetch_clears_previous_results() {
        let mut session = fetched_session();
        session.error_message = "old".to_string();
        session.begin_fetch().unwrap();
        assert!(session.comparison().is_none());
        assert!(session.error_message.is_empty());
        assert!(session.is_loading());
        assert_eq!(session.begin_fetch(), Err(SessionError::InFlight("fetch")));
    }

    #[test]
    fn failed_fetch_stops_loading_and_reports() {
        let api = FakeApi::default();
        let mut session = Session::new("/r", false, ExtensionCatalog::default());
        session.fetch(&api).unwrap();
        assert!(!session.is_loading());
        assert!(session.comparison().is_none());
        assert_eq!(session.error_message, FETCH_ERROR_MESSAGE);
    }

    #[test]
    fn commit_submits_the_fetched_layout() {
        let api = FakeApi::default();
        let mut session = fetched_session();
        session.commit(&api).unwrap();
        assert_eq!(session.success_message, COMMIT_SUCCESS_MESSAGE);
        assert!(session.error_message.is_empty());
        let commits = api.commits.lock().unwrap();
        assert_eq!(commits[0].root_path, "/r");
        assert_eq!(commits[0].items[1].src_path, "a/photo.png");
    }

    #[test]
    fn failed_commit_shows_the_generic_message() {
        let api = FakeApi {
            fail_commit: true,
            ..Default::default()
        };
        let mut session = fetched_session();
        session.commit(&api).unwrap();
        assert_eq!(session.error_message, COMMIT_ERROR_MESSAGE);
        assert!(session.success_message.is_empty());
        assert!(!session.is_committing());
    }

    #[test]
    fn fetch_waits_for_a_pending_commit() {
        let mut session = fetched_session();
        session.begin_commit().unwrap();
        assert_eq!(session.begin_fetch(), Err(SessionError::InFlight("commit")));
        assert!(session.comparison().is_some());
        assert!(!session.is_loading());

        session.complete_commit(Ok(()));
        assert_eq!(session.success_message, COMMIT_SUCCESS_MESSAGE);
        session.begin_fetch().unwrap();
        assert!(session.success_message.is_empty());
    }

    #[test]
    fn commit_without_fetch_is_rejected() {
        let api = FakeApi::default();
        let mut session = Session::new("/r", false, ExtensionCatalog::default());
        assert_eq!(session.commit(&api), Err(SessionError::NothingFetched));
        assert!(api.commits.lock().unwrap().is_empty());
    }

    #[test]
    fn root_path_input_is_normalized() {
        let mut session = Session::default();
        session.set_root_path(r"D:\\photos\2024");
        assert_eq!(session.root_path(), "D:/photos/2024");
    }

    #[test]
    fn move_plan_lists_relative_moves() {
        let session = fetched_session();
        let comparison = session.comparison().unwrap();
        assert_eq!(
            comparison.move_plan(),
            "# root: /r\na/b.txt -> c/b.txt\na/photo.png -> images/photo.png\n"
        );
        assert_eq!(comparison.moved_count(), 2);
    }
}
