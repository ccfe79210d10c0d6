use super::app_logic::TuiApp;
use super::app_state::{AppMode, ExtensionRow, Focus, LineInput};
use super::tree_view::TreeView;
use crate::session::Side;
use crate::settings::Theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

#[derive(Debug, Clone, Copy)]
pub(super) struct Palette {
    pub(super) fg: Color,
    pub(super) bg: Color,
    pub(super) muted: Color,
    pub(super) accent: Color,
    pub(super) cursor_bg: Color,
    pub(super) match_bg: Color,
    pub(super) success: Color,
    pub(super) error: Color,
}

impl Palette {
    pub(super) fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Dark => Palette {
                fg: Color::Gray,
                bg: Color::Black,
                muted: Color::DarkGray,
                accent: Color::LightBlue,
                cursor_bg: Color::DarkGray,
                match_bg: Color::Rgb(90, 70, 0),
                success: Color::LightGreen,
                error: Color::LightRed,
            },
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::Gray,
                accent: Color::Blue,
                cursor_bg: Color::Rgb(210, 210, 230),
                match_bg: Color::Rgb(255, 235, 150),
                success: Color::Green,
                error: Color::Red,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    fn block<'a>(&self, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
        let border = if focused { self.accent } else { self.muted };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
            .style(self.base())
    }
}

// Screen column of a text cursor drawn from `start`, kept left of `limit`.
fn cursor_column(start: u16, limit: u16, input: &LineInput) -> u16 {
    let offset = u16::try_from(input.display_offset()).unwrap_or(u16::MAX);
    start.saturating_add(offset).min(limit)
}

// Material icon names mapped to terminal-friendly glyphs.
fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "description" => "📄",
        "image" => "🖼",
        "audiotrack" => "🎵",
        "movie" => "🎬",
        "folder_zip" => "🗜",
        "code" => "⌨",
        "storage" => "🗄",
        _ => "•",
    }
}

fn draw_header(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let toggle_hint = match app.theme {
        Theme::Dark => "[t] Light Mode",
        Theme::Light => "[t] Dark Mode",
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Welcome to FileWizard AI",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(toggle_hint, Style::default().fg(palette.muted)),
        ]),
        Line::styled(
            "Intelligent file management at your fingertips",
            Style::default().fg(palette.muted),
        ),
    ];
    f.render_widget(Paragraph::new(lines).style(palette.base()), area);
}

fn draw_root_path_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let editing = app.mode == AppMode::EditingPath;
    let text = if editing {
        app.path_input.text.clone()
    } else if app.session.root_path().is_empty() {
        "Press e to type a directory".to_string()
    } else {
        app.session.root_path().to_string()
    };
    let title = if editing {
        "Root Path (Enter to apply, Esc to cancel)"
    } else {
        "Root Path"
    };
    let style = if !editing && app.session.root_path().is_empty() {
        Style::default().fg(palette.muted)
    } else {
        Style::default().fg(palette.fg)
    };
    let paragraph = Paragraph::new(Span::styled(text, style)).block(palette.block(title, editing));
    f.render_widget(paragraph, area);
    if editing {
        let x = cursor_column(area.x + 1, area.right().saturating_sub(2), &app.path_input);
        f.set_cursor_position((x, area.y + 1));
    }
}

fn draw_options_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let recursive = if app.session.recursive { "[x]" } else { "[ ]" };
    let line = Line::from(vec![
        Span::raw(format!("{} Include Subdirectories (r)", recursive)),
        Span::styled(
            format!(
                "   {} ext selected",
                app.session.catalog.selected_extensions().len()
            ),
            Style::default().fg(palette.muted),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).block(palette.block("Options", false)),
        area,
    );
}

fn draw_extensions_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let catalog = &app.session.catalog;
    let rows = app.extension_rows();
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match *row {
            ExtensionRow::Group(group_idx) => {
                let group = &catalog.groups()[group_idx];
                let fold = if group.expanded { "▾" } else { "▸" };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} {} {:<10}", fold, icon_glyph(&group.icon), group.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(group.ratio_label(), Style::default().fg(palette.accent)),
                ]))
            }
            ExtensionRow::Extension { group, ext } => {
                let ext = &catalog.groups()[group].extensions[ext];
                let mark = if catalog.is_selected(ext) { "[x]" } else { "[ ]" };
                ListItem::new(format!("    {} {}", mark, ext))
            }
        })
        .collect();

    let focused = app.focus == Focus::Extensions;
    let list = List::new(items)
        .block(palette.block("File Extensions (a: all, c: clear)", focused))
        .highlight_style(Style::default().bg(palette.cursor_bg))
        .highlight_symbol("❯ ");
    let mut state = ListState::default();
    if focused {
        state.select(Some(app.ext_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_messages_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let mut lines = Vec::new();
    if app.session.is_loading() {
        lines.push(Line::styled("Fetching layout…", Style::default().fg(palette.accent)));
    }
    if app.session.is_committing() {
        lines.push(Line::styled("Applying layout…", Style::default().fg(palette.accent)));
    }
    if app.searching {
        lines.push(Line::styled("Searching…", Style::default().fg(palette.accent)));
    }
    if !app.session.success_message.is_empty() {
        lines.push(Line::styled(
            format!("✔ {}", app.session.success_message),
            Style::default().fg(palette.success),
        ));
    }
    if !app.session.error_message.is_empty() {
        lines.push(Line::styled(
            format!("✖ {}", app.session.error_message),
            Style::default().fg(palette.error),
        ));
    }
    if !app.notice.is_empty() {
        lines.push(Line::styled(app.notice.clone(), Style::default().fg(palette.muted)));
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(palette.block("Status", false)),
        area,
    );
}

fn draw_tree_block(
    f: &mut Frame,
    view: &mut TreeView,
    focused: bool,
    palette: &Palette,
    area: Rect,
) {
    view.viewport_height = area.height.saturating_sub(2) as usize;
    view.ensure_cursor_in_viewport();

    let visible = view.visible_indices();
    let window = visible
        .get(view.scroll_offset..(view.scroll_offset + view.viewport_height).min(visible.len()))
        .unwrap_or(&[]);

    let items: Vec<ListItem> = window
        .iter()
        .map(|&idx| {
            let node = &view.tree.nodes[idx];
            let fold = if node.is_dir && idx != 0 {
                if node.is_expanded { "[-] " } else { "[+] " }
            } else {
                "    "
            };
            let mut style = Style::default();
            if node.is_dir {
                style = style.fg(palette.accent);
            }
            if view.highlighted == Some(idx) {
                style = style.bg(palette.match_bg).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Span::styled(format!("{}{}", fold, view.labels[idx]), style))
        })
        .collect();

    let title = format!("{} ({} files)", view.side.title(), view.tree.file_count());
    let list = List::new(items)
        .block(palette.block(title, focused))
        .highlight_style(Style::default().bg(palette.cursor_bg))
        .highlight_symbol("❯ ");

    let mut state = ListState::default();
    if focused {
        if let Some(pos) = window.iter().position(|&idx| idx == view.cursor) {
            state.select(Some(pos));
        }
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_comparison(f: &mut Frame, app: &mut TuiApp, palette: &Palette, area: Rect) {
    if app.view(Side::Current).is_none() {
        let text = if app.session.is_loading() {
            "Fetching the optimized structure…"
        } else {
            "Select extensions, then press g to get files."
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(palette.muted)))
                .block(palette.block("Structure", false)),
            area,
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let focus = app.focus;
    if let Some(view) = app.current_view.as_mut() {
        draw_tree_block(f, view, focus == Focus::Current, palette, columns[0]);
    }
    if let Some(view) = app.proposed_view.as_mut() {
        draw_tree_block(f, view, focus == Focus::Proposed, palette, columns[1]);
    }
}

const QUERY_LABEL: &str = "Name: ";

fn draw_search_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let focused = app.focus == Focus::Search;
    let editing = app.mode == AppMode::EditingSearch;
    let title = match &app.search_results {
        Some(hits) => format!("File Search ({} found)", hits.len()),
        None => "File Search".to_string(),
    };
    let block = palette.block(title, focused || editing);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let query = if app.search_input.text.is_empty() && !editing {
        Span::styled("any (press / to type)", Style::default().fg(palette.muted))
    } else {
        Span::styled(app.search_input.text.clone(), Style::default().fg(palette.fg))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(QUERY_LABEL, Style::default().fg(palette.muted)),
            query,
        ])),
        rows[0],
    );
    if editing {
        let start = rows[0].x.saturating_add(QUERY_LABEL.len() as u16);
        let x = cursor_column(start, rows[0].right().saturating_sub(1), &app.search_input);
        f.set_cursor_position((x, rows[0].y));
    }

    let items: Vec<ListItem> = match &app.search_results {
        Some(hits) if hits.is_empty() => vec![ListItem::new(Span::styled(
            "No matching files.",
            Style::default().fg(palette.muted),
        ))],
        Some(hits) => hits.iter().map(|hit| ListItem::new(hit.as_str())).collect(),
        None => Vec::new(),
    };
    let has_hits = app.search_results.as_ref().is_some_and(|hits| !hits.is_empty());
    let list = List::new(items)
        .highlight_style(Style::default().bg(palette.cursor_bg))
        .highlight_symbol("❯ ");
    let mut state = ListState::default();
    if focused && has_hits {
        state.select(Some(app.search_cursor));
    }
    f.render_stateful_widget(list, rows[1], &mut state);
}

fn draw_help_block(f: &mut Frame, app: &TuiApp, palette: &Palette, area: Rect) {
    let help = match (app.mode, app.focus) {
        (AppMode::EditingPath, _) => "Type a path | Enter: Apply | Esc: Cancel",
        (AppMode::EditingSearch, _) => "Type part of a file name | Enter: Search | Esc: Done",
        (_, Focus::Search) => {
            "Tab: Pane | j/k: Nav | /: Name | s or Enter: Search | e: Path | q: Quit"
        }
        (_, Focus::Extensions) => {
            "Tab: Pane | j/k: Nav | Space: Toggle/Fold | e: Path | /: Search | g: Get Files | u: Update | y: Copy Plan | q: Quit"
        }
        _ => "Tab: Pane | j/k: Nav | Enter: Fold | */-: Expand/Collapse | g: Get Files | u: Update | q: Quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(palette.muted))).style(palette.base()),
        area,
    );
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let palette = Palette::for_theme(app.theme);
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(main_chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(body[0]);

    draw_header(frame, app, &palette, main_chunks[0]);
    draw_root_path_block(frame, app, &palette, left[0]);
    draw_options_block(frame, app, &palette, left[1]);
    draw_extensions_block(frame, app, &palette, left[2]);
    draw_messages_block(frame, app, &palette, left[3]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(9)])
        .split(body[1]);

    draw_comparison(frame, app, &palette, right[0]);
    draw_search_block(frame, app, &palette, right[1]);
    draw_help_block(frame, app, &palette, main_chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_column_follows_display_width() {
        let input = LineInput::new("日本");
        assert_eq!(cursor_column(1, 40, &input), 5);
        assert_eq!(cursor_column(1, 3, &input), 3);
    }

    #[test]
    fn cursor_column_saturates_on_long_input() {
        let input = LineInput::new(&"x".repeat(70_000));
        assert_eq!(cursor_column(10, u16::MAX, &input), u16::MAX);
    }
}
