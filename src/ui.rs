//! Layout and drawing: menu, board, falling tiles, selection path, sidebar, overlays.

use crate::app::{MenuState, MenuTab, QuitOption, Screen};
use crate::theme::Theme;
use mergetui::grid::{Coord, GRID_SIZE, format_value};
use mergetui::merge::multiplier;
use mergetui::{Difficulty, GameState, RefillPolicy};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Tile body in terminal cells.
const CELL_W: u16 = 8;
const CELL_H: u16 = 3;
/// Spacing between tiles (and around the edge of the board).
const GAP: u16 = 1;
const PITCH_X: u16 = CELL_W + GAP;
const PITCH_Y: u16 = CELL_H + GAP;
/// Board size without its border.
const BOARD_W: u16 = GRID_SIZE as u16 * PITCH_X + GAP;
const BOARD_H: u16 = GRID_SIZE as u16 * PITCH_Y + GAP;

const SIDEBAR_WIDTH: u16 = 26;

/// Columns at each side of a tile that do not count as "over" it while dragging.
const HOVER_MARGIN: u16 = 1;

const MERGE_FLASH_MS: u32 = 300;

/// How strict a pointer-to-cell lookup is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Anywhere on the tile body (press).
    Body,
    /// Tile body minus a side margin (drag), so grazing a corner does not pick a neighbour.
    Center,
}

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub menu: &'a MenuState,
    pub quit_selected: QuitOption,
    /// Keyboard cursor, shown once the keyboard has been used.
    pub cursor: Option<Coord>,
    pub now: Instant,
    pub no_animation: bool,
}

/// Short white flash on the tile a merge produced.
#[derive(Default)]
pub struct MergeFlash {
    target: Option<Coord>,
    effect: Option<Effect>,
    process_time: Option<Instant>,
}

impl MergeFlash {
    pub fn start(&mut self, target: Coord) {
        self.target = Some(target);
        self.effect = None;
        self.process_time = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Board plus sidebar, centred in `area`. Returns (board border rect, sidebar rect).
fn layout(area: Rect) -> (Rect, Rect) {
    let board_outer_w = BOARD_W + 2;
    let board_outer_h = BOARD_H + 2;
    let total_w = board_outer_w + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(board_outer_h) / 2;
    let board = Rect {
        x,
        y,
        width: board_outer_w,
        height: board_outer_h,
    }
    .intersection(area);
    let sidebar = Rect {
        x: x + board_outer_w,
        y,
        width: SIDEBAR_WIDTH,
        height: board_outer_h,
    }
    .intersection(area);
    (board, sidebar)
}

/// Inner board rect (inside the border). Not clipped: callers clip against the frame.
fn board_rect(area: Rect) -> Rect {
    let (outer, _) = layout(area);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: BOARD_W,
        height: BOARD_H,
    }
}

fn cell_origin(board: Rect, at: Coord) -> (u16, u16) {
    (
        board.x + GAP + at.col as u16 * PITCH_X,
        board.y + GAP + at.row as u16 * PITCH_Y,
    )
}

fn cell_rect(board: Rect, at: Coord) -> Rect {
    let (x, y) = cell_origin(board, at);
    Rect {
        x,
        y,
        width: CELL_W,
        height: CELL_H,
    }
}

/// Board cell under terminal position (x, y) for a frame of size `area`.
pub fn cell_at(area: Rect, x: u16, y: u16, hit: Hit) -> Option<Coord> {
    let board = board_rect(area);
    let dx = x.checked_sub(board.x + GAP)?;
    let dy = y.checked_sub(board.y + GAP)?;
    let (col, ox) = (dx / PITCH_X, dx % PITCH_X);
    let (row, oy) = (dy / PITCH_Y, dy % PITCH_Y);
    if ox >= CELL_W || oy >= CELL_H {
        return None;
    }
    if hit == Hit::Center && (ox < HOVER_MARGIN || ox >= CELL_W - HOVER_MARGIN) {
        return None;
    }
    Coord::checked(i32::from(row), i32::from(col))
}

/// Minimum terminal size that shows the whole board and sidebar.
pub const fn min_terminal_size() -> (u16, u16) {
    (BOARD_W + 2 + SIDEBAR_WIDTH, BOARD_H + 2)
}

pub fn draw(frame: &mut Frame, view: &View<'_>, flash: &mut MergeFlash) {
    let area = frame.area();
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing => {
            draw_game(frame, view, area);
            if !view.no_animation {
                apply_merge_flash(frame, view, area, flash);
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area);
            draw_quit_menu(frame, view.theme, view.quit_selected);
        }
        Screen::GameOver => {
            draw_game(frame, view, area);
            draw_game_over(frame, view, area);
        }
    }
}

fn draw_game(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let (board_outer, sidebar) = layout(area);
    draw_board(frame, view, area, board_outer);
    draw_sidebar(frame, view, sidebar);
}

fn draw_board(frame: &mut Frame, view: &View<'_>, area: Rect, outer: Rect) {
    let theme = view.theme;
    let state = view.state;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(
            format!(" Mergetui  {} ", state.difficulty()),
            Style::default().fg(theme.title),
        ));
    block.render(outer, frame.buffer_mut());

    let board = board_rect(area);
    let clip = board.intersection(area);
    let buf = frame.buffer_mut();
    let label_style = Style::default()
        .fg(theme.tile_fg)
        .add_modifier(Modifier::BOLD);

    // Committed tiles. Cells with a tile on its way are drawn empty.
    for at in mergetui::Grid::coords() {
        let (x, y) = cell_origin(board, at);
        let value = if state.is_reserved(at) {
            0
        } else {
            state.grid().get(at).unwrap_or(0)
        };
        let label = if value == 0 {
            String::new()
        } else {
            format_value(value)
        };
        let style = if state.selection().contains(at) {
            label_style
                .fg(theme.select)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            label_style
        };
        paint_tile(
            buf,
            clip,
            x,
            i32::from(y),
            theme.tile_color(value),
            &label,
            style,
        );
    }

    // Falling tiles, interpolated between start and destination rows.
    for anim in state.animations() {
        let (row, _) = anim.position();
        let (x, _) = cell_origin(board, anim.dest);
        let y = i32::from(board.y + GAP) + (row * f32::from(PITCH_Y)).round() as i32;
        paint_tile(
            buf,
            clip,
            x,
            y,
            theme.tile_color(anim.value),
            &format_value(anim.value),
            label_style,
        );
    }

    draw_selection_path(buf, clip, board, view);

    if let Some(cursor) = view.cursor {
        let (x, y) = cell_origin(board, cursor);
        let mid = y + CELL_H / 2;
        let style = Style::default().fg(theme.select).bg(theme.bg);
        put(buf, clip, x.saturating_sub(1), mid, "▶", style);
        put(buf, clip, x + CELL_W, mid, "◀", style);
    }
}

/// Connectors in the gaps between consecutive picks.
fn draw_selection_path(buf: &mut Buffer, clip: Rect, board: Rect, view: &View<'_>) {
    let style = Style::default()
        .fg(view.theme.select)
        .bg(view.theme.bg)
        .add_modifier(Modifier::BOLD);
    for pair in view.state.selection().path().windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !a.is_adjacent(b) {
            continue;
        }
        let (ax, ay) = cell_origin(board, a);
        let (bx, by) = cell_origin(board, b);
        let cx = (ax + bx) / 2 + CELL_W / 2;
        let cy = (ay + by) / 2 + CELL_H / 2;
        // Midpoint of the two centres lands in the gap (or gap crossing) between them.
        let (mx, my) = match (a.col.cmp(&b.col), a.row.cmp(&b.row)) {
            (std::cmp::Ordering::Equal, _) => (cx, (ay.max(by)) - 1),
            (_, std::cmp::Ordering::Equal) => ((ax.max(bx)) - 1, cy),
            _ => ((ax.max(bx)) - 1, (ay.max(by)) - 1),
        };
        let symbol = if a.row == b.row {
            "━"
        } else if a.col == b.col {
            "┃"
        } else if (a.row < b.row) == (a.col < b.col) {
            "╲"
        } else {
            "╱"
        };
        put(buf, clip, mx, my, symbol, style);
    }
}

fn put(buf: &mut Buffer, clip: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if x >= clip.x && x < clip.right() && y >= clip.y && y < clip.bottom() {
        buf[(x, y)].set_symbol(symbol).set_style(style);
    }
}

/// Solid tile with a centred label; rows outside `clip` are skipped (tiles above the board).
fn paint_tile(
    buf: &mut Buffer,
    clip: Rect,
    x: u16,
    y: i32,
    color: Color,
    label: &str,
    label_style: Style,
) {
    let fill = Style::default().bg(color);
    for dy in 0..CELL_H {
        let ry = y + i32::from(dy);
        if ry < i32::from(clip.y) || ry >= i32::from(clip.bottom()) {
            continue;
        }
        let ry = ry as u16;
        for rx in x..x + CELL_W {
            put(buf, clip, rx, ry, " ", fill);
        }
        if dy == CELL_H / 2 && !label.is_empty() {
            let w = label.chars().count() as u16;
            let lx = x + CELL_W.saturating_sub(w) / 2;
            for (i, ch) in label.chars().enumerate() {
                let mut tmp = [0u8; 4];
                put(
                    buf,
                    clip,
                    lx + i as u16,
                    ry,
                    ch.encode_utf8(&mut tmp),
                    label_style.bg(color),
                );
            }
        }
    }
}

/// Create or advance the merge flash (TachyonFX fade from white on the merged tile).
fn apply_merge_flash(frame: &mut Frame, view: &View<'_>, area: Rect, flash: &mut MergeFlash) {
    let Some(target) = flash.target else {
        return;
    };
    let rect = cell_rect(board_rect(area), target).intersection(area);
    let delta = flash
        .process_time
        .map(|t| view.now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.process_time = Some(view.now);

    if flash.effect.is_none() {
        let effect = fx::fade_from(
            view.theme.select,
            view.theme.select,
            (MERGE_FLASH_MS, Interpolation::Linear),
        )
        .with_area(rect);
        flash.effect = Some(effect);
    }
    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(1),
            Constraint::Length(4), // Chain preview
            Constraint::Length(1),
            Constraint::Fill(1), // Controls
        ])
        .split(area);

    let stats = state.stats();
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best tile: ", title_style),
            Span::styled(format_value(stats.best_tile), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Merges: ", title_style),
            Span::styled(stats.merges.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Longest chain: ", title_style),
            Span::styled(stats.longest_chain.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Last: ", title_style),
            Span::styled(
                state
                    .last_merge()
                    .map_or_else(|| "-".to_string(), |m| format!("+{}", m.score_delta)),
                fg_style,
            ),
        ]),
    ];
    Paragraph::new(Text::from(stats_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[0], frame.buffer_mut());

    let selection = state.selection();
    let chain_line = match selection.anchor_value(state.grid()) {
        Some(value) if selection.len() >= 2 => {
            let merged = value.saturating_mul(multiplier(selection.len()));
            Line::from(vec![
                Span::styled(format!("{} × {} → ", selection.len(), format_value(value)), fg_style),
                Span::styled(
                    format_value(merged),
                    Style::default().fg(theme.tile_color(merged)).add_modifier(Modifier::BOLD),
                ),
            ])
        }
        Some(value) => Line::from(Span::styled(format!("1 × {}", format_value(value)), fg_style)),
        None => Line::from(Span::styled("-", Style::default().fg(theme.inactive_fg))),
    };
    Paragraph::new(vec![Line::from(Span::styled("Chain", title_style)), chain_line])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[2], frame.buffer_mut());

    let help = Style::default().fg(theme.inactive_fg);
    let controls = vec![
        Line::from(Span::styled("Drag    merge", help)),
        Line::from(Span::styled("R-click undo pick", help)),
        Line::from(Span::styled("←↑↓→    cursor", help)),
        Line::from(Span::styled("Space   grab/release", help)),
        Line::from(Span::styled("⌫ / u   undo pick", help)),
        Line::from(Span::styled("R       restart", help)),
        Line::from(Span::styled("Q       quit", help)),
    ];
    Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[4], frame.buffer_mut());
}

fn draw_menu(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let menu = view.menu;
    let popup_w = 48u16;
    let popup_h = 20u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };

    let title = Line::from(vec![
        Span::styled(
            " Merge ",
            Style::default()
                .fg(theme.tile_color(2))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " tui ",
            Style::default()
                .fg(theme.main_fg)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let highlight_style = Style::default()
        .fg(Color::Black)
        .bg(theme.title)
        .add_modifier(Modifier::BOLD);
    let selected_style = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);
    let normal_style = Style::default().fg(theme.main_fg);
    let tab_style = |current: bool, selected: bool| {
        if current {
            highlight_style
        } else if selected {
            selected_style
        } else {
            normal_style
        }
    };

    let mut difficulty_spans = Vec::new();
    for d in Difficulty::ALL {
        if !difficulty_spans.is_empty() {
            difficulty_spans.push(Span::from("  "));
        }
        difficulty_spans.push(Span::styled(
            format!(" {} ", d.to_string().to_uppercase()),
            tab_style(
                menu.current_tab == MenuTab::Difficulty && menu.selected_difficulty == d,
                menu.selected_difficulty == d,
            ),
        ));
    }
    let pool: Vec<String> = menu
        .selected_difficulty
        .profile()
        .values()
        .map(format_value)
        .collect();

    let refill_spans = vec![
        Span::styled(
            " ANIMATED ",
            tab_style(
                menu.current_tab == MenuTab::Refill && menu.selected_refill == RefillPolicy::Animated,
                menu.selected_refill == RefillPolicy::Animated,
            ),
        ),
        Span::from("  "),
        Span::styled(
            " SWEEP ",
            tab_style(
                menu.current_tab == MenuTab::Refill && menu.selected_refill == RefillPolicy::Sweep,
                menu.selected_refill == RefillPolicy::Sweep,
            ),
        ),
    ];

    let start_btn = Span::styled(
        " [ START ] ",
        if menu.current_tab == MenuTab::Start {
            highlight_style
        } else {
            normal_style
        },
    );

    let key = Style::default().fg(theme.tile_color(16));
    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        Line::from(Span::styled(" ─ DIFFICULTY ─ ", Style::default().fg(theme.div_line))),
        Line::from(difficulty_spans),
        Line::from(Span::styled(
            format!("start tiles: {}", pool.join(" ")),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" ─ REFILL ─ ", Style::default().fg(theme.div_line))),
        Line::from(refill_spans),
        Line::from(""),
        Line::from(""),
        Line::from(start_btn),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", key),
            Span::from("NAVIGATE   "),
            Span::styled(" ↔ ", key),
            Span::from("CHANGE   "),
            Span::styled(" ENTER ", key),
            Span::from("START"),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Q] QUIT ", Style::default().fg(Color::Rgb(255, 80, 80)))),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Slide in from below over the first half second (ease-out cubic).
    let elapsed = view.now.saturating_duration_since(menu.animation_start).as_millis() as u32;
    let t = (elapsed as f32 / 500.0).min(1.0);
    let offset_t = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - offset_t) * 10.0) as u16;
    p.render(anim_popup.intersection(area), frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let popup_w = 32u16;
    let popup_h = 10u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " No moves left ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score()), fg)),
        Line::from(Span::styled(
            format!(" Best tile: {} ", format_value(state.stats().best_tile)),
            fg,
        )),
        Line::from(""),
        Line::from(Span::styled(" [R] Restart    [Q] Quit ", fg)),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line))
            .style(Style::default().bg(theme.bg))
            .title(Span::styled(" Mergetui ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let area = frame.area();
    let qw = 24;
    let qh = 8;
    let quit_rect = Rect {
        x: area.x + area.width.saturating_sub(qw) / 2,
        y: area.y + area.height.saturating_sub(qh) / 2,
        width: qw,
        height: qh,
    }
    .intersection(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .style(Style::default().bg(theme.bg))
        .title(" Quit? ");
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
