//! Grouped extension catalog and the flat selection that feeds `required_exts`.

/// Separator used when sending the selection to the backend.
pub const EXT_SEPARATOR: &str = ";";

const DEFAULT_GROUPS: &[(&str, &str, &[&str])] = &[
    ("Documents", "description", &[".pdf", ".doc", ".docx", ".txt", ".md"]),
    ("Images", "image", &[".jpg", ".jpeg", ".png", ".gif", ".svg"]),
    ("Audio", "audiotrack", &[".mp3", ".wav", ".ogg", ".m4a", ".flac"]),
    ("Video", "movie", &[".mp4", ".avi", ".mkv", ".mov", ".wmv"]),
    ("Archives", "folder_zip", &[".zip", ".rar", ".7z", ".tar", ".gz"]),
    (
        "Code",
        "code",
        &[".js", ".ts", ".py", ".java", ".html", ".css", ".json", ".php", ".cpp"],
    ),
    ("Data", "storage", &[".csv", ".xlsx", ".xml", ".sql", ".db", ".json"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGroup {
    pub name: String,
    pub icon: String,
    pub extensions: Vec<String>,
    pub selected: usize,
    pub total: usize,
    pub expanded: bool,
}

impl ExtensionGroup {
    pub fn new(name: &str, icon: &str, extensions: &[&str]) -> Self {
        ExtensionGroup {
            name: name.to_string(),
            icon: icon.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            selected: 0,
            total: extensions.len(),
            expanded: false,
        }
    }

    /// "selected/total" as shown next to the group name.
    pub fn ratio_label(&self) -> String {
        format!("{}/{}", self.selected, self.total)
    }
}

/// Extension groups plus the global selection list.
///
/// Group counts are always recomputed from the selection after a mutation,
/// so `group.selected` equals the number of its extensions present in the
/// selection.
#[derive(Debug, Clone)]
pub struct ExtensionCatalog {
    groups: Vec<ExtensionGroup>,
    selection: Vec<String>,
}

impl Default for ExtensionCatalog {
    fn default() -> Self {
        let groups = DEFAULT_GROUPS
            .iter()
            .map(|(name, icon, exts)| ExtensionGroup::new(name, icon, exts))
            .collect();
        ExtensionCatalog::with_groups(groups)
    }
}

impl ExtensionCatalog {
    pub fn with_groups(groups: Vec<ExtensionGroup>) -> Self {
        let mut catalog = ExtensionCatalog {
            groups,
            selection: Vec::new(),
        };
        catalog.update_selected_counts();
        catalog
    }

    pub fn groups(&self) -> &[ExtensionGroup] {
        &self.groups
    }

    pub fn selected_extensions(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, ext: &str) -> bool {
        self.selection.iter().any(|e| e == ext)
    }

    pub fn toggle(&mut self, ext: &str) {
        match self.selection.iter().position(|e| e == ext) {
            Some(idx) => {
                self.selection.remove(idx);
            }
            None => self.selection.push(ext.to_string()),
        }
        // An extension may belong to several groups (".json"), so every count is refreshed.
        self.update_selected_counts();
    }

    pub fn select_all(&mut self) {
        self.selection.clear();
        for group in &self.groups {
            for ext in &group.extensions {
                if !self.selection.contains(ext) {
                    self.selection.push(ext.clone());
                }
            }
        }
        self.update_selected_counts();
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.update_selected_counts();
    }

    /// Add extensions coming from the command line or config. Leading dots are
    /// optional and case is folded; extensions outside the catalog are kept.
    pub fn select<S: AsRef<str>>(&mut self, exts: &[S]) {
        for raw in exts {
            let ext = normalize_extension(raw.as_ref());
            if !ext.is_empty() && !self.selection.contains(&ext) {
                self.selection.push(ext);
            }
        }
        self.update_selected_counts();
    }

    pub fn toggle_group(&mut self, group_idx: usize) {
        if let Some(group) = self.groups.get_mut(group_idx) {
            group.expanded = !group.expanded;
        }
    }

    pub fn set_all_expanded(&mut self, expanded: bool) {
        for group in &mut self.groups {
            group.expanded = expanded;
        }
    }

    /// The selection as the backend expects it: `.pdf;.md`.
    pub fn required_exts(&self) -> String {
        self.selection.join(EXT_SEPARATOR)
    }

    fn update_selected_counts(&mut self) {
        let selection = &self.selection;
        for group in &mut self.groups {
            group.selected = group
                .extensions
                .iter()
                .filter(|ext| selection.contains(ext))
                .count();
        }
    }
}

pub fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}
