use crate::session::Side;
use crate::tree_builder::{FolderTree, TreeNode};

/// Scrollable, collapsible view over one side of the comparison.
#[derive(Debug, Clone)]
pub(super) struct TreeView {
    pub(super) side: Side,
    pub(super) tree: FolderTree,
    pub(super) labels: Vec<String>,
    pub(super) cursor: usize,
    pub(super) scroll_offset: usize,
    pub(super) viewport_height: usize,
    pub(super) highlighted: Option<usize>,
}

impl TreeView {
    pub(super) fn new(side: Side, tree: FolderTree) -> Self {
        let labels = tree.labels();
        TreeView {
            side,
            tree,
            labels,
            cursor: 0,
            scroll_offset: 0,
            viewport_height: 0,
            highlighted: None,
        }
    }

    pub(super) fn current_node(&self) -> Option<&TreeNode> {
        self.tree.nodes.get(self.cursor)
    }

    /// Path under the cursor when it rests on a file.
    pub(super) fn current_file_path(&self) -> Option<&str> {
        self.current_node()
            .filter(|node| !node.is_dir)
            .map(|node| node.path.as_str())
    }

    pub(super) fn is_visible(&self, idx: usize) -> bool {
        let mut current = self.tree.nodes.get(idx).and_then(|n| n.parent_index);
        while let Some(parent_idx) = current {
            if !self.tree.nodes[parent_idx].is_expanded {
                return false;
            }
            current = self.tree.nodes[parent_idx].parent_index;
        }
        idx < self.tree.nodes.len()
    }

    pub(super) fn visible_indices(&self) -> Vec<usize> {
        (0..self.tree.nodes.len())
            .filter(|&idx| self.is_visible(idx))
            .collect()
    }

    pub(super) fn move_cursor(&mut self, delta: i32) {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return;
        }
        let new_pos = match visible.iter().position(|&idx| idx == self.cursor) {
            Some(pos) => (pos as i32 + delta).rem_euclid(visible.len() as i32) as usize,
            None if delta > 0 => 0,
            None => visible.len() - 1,
        };
        self.cursor = visible[new_pos];
        self.ensure_cursor_in_viewport();
    }

    pub(super) fn toggle_expansion(&mut self) {
        let idx = self.cursor;
        // The root stays open; collapsing it would hide everything.
        if idx == 0 {
            return;
        }
        if let Some(node) = self.tree.nodes.get_mut(idx) {
            if node.is_dir {
                node.is_expanded = !node.is_expanded;
            }
        }
        self.ensure_cursor_in_viewport();
    }

    pub(super) fn expand_all(&mut self) {
        for node in self.tree.nodes.iter_mut().filter(|n| n.is_dir) {
            node.is_expanded = true;
        }
        self.ensure_cursor_in_viewport();
    }

    pub(super) fn collapse_all(&mut self) {
        for node in self.tree.nodes.iter_mut().filter(|n| n.is_dir) {
            node.is_expanded = node.parent_index.is_none();
        }
        self.ensure_cursor_visible();
    }

    /// Move the cursor up to its nearest visible ancestor after a collapse.
    pub(super) fn ensure_cursor_visible(&mut self) {
        while !self.is_visible(self.cursor) {
            match self.tree.nodes.get(self.cursor).and_then(|n| n.parent_index) {
                Some(parent_idx) => self.cursor = parent_idx,
                None => {
                    self.cursor = 0;
                    break;
                }
            }
        }
        self.ensure_cursor_in_viewport();
    }

    pub(super) fn ensure_cursor_in_viewport(&mut self) {
        self.scroll_to(self.cursor);
    }

    fn scroll_to(&mut self, idx: usize) {
        if self.viewport_height == 0 {
            return;
        }
        let visible = self.visible_indices();
        let Some(pos) = visible.iter().position(|&i| i == idx) else {
            return;
        };
        if pos < self.scroll_offset {
            self.scroll_offset = pos;
        } else if pos >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = pos + 1 - self.viewport_height;
        }
        let max_offset = visible.len().saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Mark `path` as the counterpart of the other tree's cursor, opening its
    /// folders and scrolling it into view. `None` (or an unknown path) clears
    /// the mark.
    pub(super) fn highlight(&mut self, path: Option<&str>) {
        self.highlighted = path.and_then(|p| self.tree.position_of(p));
        let Some(idx) = self.highlighted else {
            return;
        };
        let mut current = self.tree.nodes[idx].parent_index;
        while let Some(parent_idx) = current {
            self.tree.nodes[parent_idx].is_expanded = true;
            current = self.tree.nodes[parent_idx].parent_index;
        }
        self.scroll_to(idx);
    }
}
