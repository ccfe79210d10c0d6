use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Absolute path; for files this is exactly the string the tree was built from.
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub parent_index: Option<usize>,
    pub children_indices: Vec<usize>,
}

/// Folder tree of a flat path list, stored as an arena in pre-order.
/// Node 0 is always the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTree {
    pub nodes: Vec<TreeNode>,
}

impl FolderTree {
    /// Build the tree in **O(n log n)**: every path contributes its ancestor
    /// directories below `root_path`, then the set is sorted component-wise
    /// so parents precede children and siblings stay contiguous.
    ///
    /// A file and an implied directory may share a name (`a` and `a/b.txt`);
    /// they become two sibling nodes, the file first.
    pub fn from_paths(root_path: &str, paths: &[String]) -> Self {
        // (components, is_dir) -> full path string
        let mut entries: HashMap<(Vec<String>, bool), String> = HashMap::new();
        for full in paths {
            let components = relative_components(root_path, full);
            if components.is_empty() {
                continue;
            }
            for depth in 1..components.len() {
                let prefix = components[..depth].to_vec();
                let dir_path = format!("{}/{}", root_path, prefix.join("/"));
                entries.entry((prefix, true)).or_insert(dir_path);
            }
            entries.insert((components, false), full.clone());
        }

        let mut sorted: Vec<((Vec<String>, bool), String)> = entries.into_iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut nodes = Vec::with_capacity(sorted.len() + 1);
        nodes.push(TreeNode {
            path: root_path.to_string(),
            name: root_path.to_string(),
            is_dir: true,
            is_expanded: true,
            parent_index: None,
            children_indices: Vec::new(),
        });
        // Only directories can be parents.
        let mut dir_index_of: HashMap<Vec<String>, usize> = HashMap::new();
        for ((components, is_dir), path) in sorted {
            let idx = nodes.len();
            let parent_idx = if components.len() == 1 {
                0
            } else {
                dir_index_of
                    .get(&components[..components.len() - 1])
                    .copied()
                    .unwrap_or(0)
            };
            nodes[parent_idx].children_indices.push(idx);
            nodes.push(TreeNode {
                path,
                name: components.last().cloned().unwrap_or_default(),
                is_dir,
                is_expanded: is_dir,
                parent_index: Some(parent_idx),
                children_indices: Vec::new(),
            });
            if is_dir {
                dir_index_of.insert(components, idx);
            }
        }

        FolderTree { nodes }
    }

    pub fn position_of(&self, path: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.path == path)
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_dir).count()
    }

    /// Tree-drawing prefixes ("├─ ", "│  ", "└─ ") for every node.
    pub fn labels(&self) -> Vec<String> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                if node.parent_index.is_none() {
                    return format!("{}/", node.name);
                }
                let mut prefix = String::new();
                // Ancestors below the root, outermost first.
                let mut ancestors = Vec::new();
                let mut current = node.parent_index;
                while let Some(ancestor_idx) = current {
                    if self.nodes[ancestor_idx].parent_index.is_some() {
                        ancestors.push(ancestor_idx);
                    }
                    current = self.nodes[ancestor_idx].parent_index;
                }
                for &ancestor_idx in ancestors.iter().rev() {
                    prefix.push_str(if self.is_last_child(ancestor_idx) {
                        "   "
                    } else {
                        "│  "
                    });
                }
                prefix.push_str(if self.is_last_child(idx) { "└─ " } else { "├─ " });
                if node.is_dir {
                    format!("{}{}/", prefix, node.name)
                } else {
                    format!("{}{}", prefix, node.name)
                }
            })
            .collect()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for label in self.labels() {
            out.push_str(&label);
            out.push('\n');
        }
        out
    }

    fn is_last_child(&self, idx: usize) -> bool {
        match self.nodes[idx].parent_index {
            Some(parent_idx) => self.nodes[parent_idx].children_indices.last() == Some(&idx),
            None => true,
        }
    }
}

fn relative_components(root_path: &str, full: &str) -> Vec<String> {
    let relative = full.strip_prefix(root_path).unwrap_or(full);
    relative
        .split('/')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_directories_from_file_paths() {
        let tree = FolderTree::from_paths(
            "/r",
            &paths(&["/r/docs/b.txt", "/r/a.md", "/r/docs/sub/c.pdf"]),
        );
        let names: Vec<&str> = tree.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["/r", "a.md", "docs", "b.txt", "sub", "c.pdf"]);
        let docs = tree.position_of("/r/docs").unwrap();
        assert!(tree.nodes[docs].is_dir);
        assert_eq!(tree.nodes[docs].children_indices.len(), 2);
        assert_eq!(tree.file_count(), 3);
        let c = tree.position_of("/r/docs/sub/c.pdf").unwrap();
        assert_eq!(tree.nodes[c].parent_index, tree.position_of("/r/docs/sub"));
    }

    #[test]
    fn file_nodes_keep_their_original_path() {
        let tree = FolderTree::from_paths("/r", &paths(&["/r/x//y.txt"]));
        assert!(tree.position_of("/r/x//y.txt").is_some());
    }

    #[test]
    fn renders_tree_prefixes() {
        let tree = FolderTree::from_paths(
            "/r",
            &paths(&["/r/a/b.txt", "/r/a/c.txt", "/r/d/e.txt"]),
        );
        assert_eq!(
            tree.render_text(),
            "/r/\n├─ a/\n│  ├─ b.txt\n│  └─ c.txt\n└─ d/\n   └─ e.txt\n"
        );
    }

    #[test]
    fn file_and_directory_with_the_same_name_stay_apart() {
        let tree = FolderTree::from_paths("/r", &paths(&["/r/a", "/r/a/b.txt"]));
        assert_eq!(tree.nodes.len(), 4);
        assert!(!tree.nodes[1].is_dir);
        assert!(tree.nodes[2].is_dir);
        let child = tree.position_of("/r/a/b.txt").unwrap();
        let parent = tree.nodes[child].parent_index.unwrap();
        assert!(tree.nodes[parent].is_dir);
        assert!(tree.nodes[parent].is_expanded);
        assert_eq!(tree.file_count(), 2);
        // The file node is the one found by path.
        assert_eq!(tree.position_of("/r/a"), Some(1));
        assert_eq!(tree.render_text(), "/r/\n├─ a\n└─ a/\n   └─ b.txt\n");
    }

    #[test]
    fn empty_list_yields_only_the_root() {
        let tree = FolderTree::from_paths("/r", &[]);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.file_count(), 0);
        assert_eq!(tree.render_text(), "/r/\n");
    }
}
