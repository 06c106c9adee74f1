//! App: terminal init, main loop, frame tick and key/mouse handling.

use crate::Args;
use crate::input::{Action, MouseIntent, key_to_action, mouse_to_intent};
use crate::theme::Theme;
use crate::ui::{self, Hit, MergeFlash, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use mergetui::grid::{Coord, GRID_SIZE};
use mergetui::merge::Merge;
use mergetui::{Difficulty, GameConfig, GameState, PointerEvent, RefillPolicy, Status};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Difficulty,
    Refill,
    Start,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_difficulty: Difficulty,
    pub selected_refill: RefillPolicy,
    pub animation_start: Instant,
}

impl MenuState {
    fn new(difficulty: Difficulty, refill: RefillPolicy) -> Self {
        Self {
            current_tab: MenuTab::Difficulty,
            selected_difficulty: difficulty,
            selected_refill: refill,
            animation_start: Instant::now(),
        }
    }
}

/// Whether the loop keeps running after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    frame_interval: Duration,
    menu_state: MenuState,
    quit_selected: QuitOption,
    /// Keyboard cursor; `None` until a cursor key is used.
    cursor: Option<Coord>,
    /// Frame area from the last draw, for mouse hit-testing.
    last_area: Rect,
    merge_flash: MergeFlash,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme, fps: f64) -> Result<Self> {
        let state = GameState::new(&config);
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Ok(Self {
            menu_state: MenuState::new(config.difficulty, config.refill),
            args,
            config,
            theme,
            state,
            screen,
            frame_interval: Duration::from_secs_f64(1.0 / fps),
            quit_selected: QuitOption::Resume,
            cursor: None,
            last_area: Rect::default(),
            merge_flash: MergeFlash::default(),
        })
    }

    fn reset_game(&mut self) {
        self.config.difficulty = self.menu_state.selected_difficulty;
        self.config.refill = self.menu_state.selected_refill;
        self.state = GameState::new(&self.config);
        self.screen = if self.state.status() == Status::Stuck {
            Screen::GameOver
        } else {
            Screen::Playing
        };
        self.quit_selected = QuitOption::Resume;
        self.merge_flash.clear();
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let (term_cols, term_rows) = crossterm::terminal::size()?;
        let (min_cols, min_rows) = ui::min_terminal_size();
        if term_cols < min_cols || term_rows < min_rows {
            info!(term_cols, term_rows, min_cols, min_rows, "terminal smaller than the board");
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let frame_start = Instant::now();
            terminal.draw(|f| {
                self.last_area = f.area();
                let view = View {
                    screen: self.screen,
                    state: &self.state,
                    theme: &self.theme,
                    menu: &self.menu_state,
                    quit_selected: self.quit_selected,
                    cursor: self.cursor,
                    now: frame_start,
                    no_animation: self.args.no_animation,
                };
                ui::draw(f, &view, &mut self.merge_flash);
            })?;

            if self.merge_flash.is_done() {
                self.merge_flash.clear();
            }

            if self.screen == Screen::Playing {
                self.state.tick();
                if self.state.status() == Status::Stuck && self.state.is_settled() {
                    self.screen = Screen::GameOver;
                }
            }

            // Drain input until the next frame is due.
            let deadline = frame_start + self.frame_interval;
            while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
                if !event::poll(timeout)? {
                    break;
                }
                let flow = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key(key),
                    Event::Mouse(mouse) => {
                        self.on_mouse(mouse);
                        Flow::Continue
                    }
                    _ => Flow::Continue,
                };
                if flow == Flow::Exit {
                    return Ok(());
                }
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        let action = key_to_action(key);
        match self.screen {
            Screen::Menu => self.on_menu_key(action),
            Screen::Playing => {
                self.on_play_key(action);
                Flow::Continue
            }
            Screen::QuitMenu => self.on_quit_menu_key(action),
            Screen::GameOver => match action {
                Action::Quit => Flow::Exit,
                Action::Restart => {
                    self.reset_game();
                    Flow::Continue
                }
                _ => Flow::Continue,
            },
        }
    }

    fn on_menu_key(&mut self, action: Action) -> Flow {
        let menu = &mut self.menu_state;
        match action {
            Action::Quit => return Flow::Exit,
            Action::CursorLeft | Action::CursorRight => {
                let forward = action == Action::CursorRight;
                match menu.current_tab {
                    MenuTab::Difficulty => {
                        menu.selected_difficulty = if forward {
                            menu.selected_difficulty.next()
                        } else {
                            menu.selected_difficulty.prev()
                        };
                    }
                    MenuTab::Refill => {
                        menu.selected_refill = match menu.selected_refill {
                            RefillPolicy::Animated => RefillPolicy::Sweep,
                            RefillPolicy::Sweep => RefillPolicy::Animated,
                        };
                    }
                    MenuTab::Start => {}
                }
            }
            Action::CursorDown => {
                menu.current_tab = match menu.current_tab {
                    MenuTab::Difficulty => MenuTab::Refill,
                    MenuTab::Refill => MenuTab::Start,
                    MenuTab::Start => MenuTab::Difficulty,
                };
            }
            Action::CursorUp => {
                menu.current_tab = match menu.current_tab {
                    MenuTab::Difficulty => MenuTab::Start,
                    MenuTab::Refill => MenuTab::Difficulty,
                    MenuTab::Start => MenuTab::Refill,
                };
            }
            Action::Grab | Action::Release => {
                if menu.current_tab == MenuTab::Start {
                    self.reset_game();
                } else {
                    menu.current_tab = MenuTab::Start;
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_play_key(&mut self, action: Action) {
        let (dr, dc) = match action {
            Action::CursorUp => (-1, 0),
            Action::CursorDown => (1, 0),
            Action::CursorLeft => (0, -1),
            Action::CursorRight => (0, 1),
            Action::Grab => {
                let at = self.cursor_or_center();
                if self.state.is_dragging() {
                    self.apply(PointerEvent::Up);
                } else {
                    self.apply(PointerEvent::Down(Some(at)));
                }
                return;
            }
            Action::Release => {
                self.apply(PointerEvent::Up);
                return;
            }
            Action::PopLast => {
                self.apply(PointerEvent::Secondary);
                return;
            }
            Action::Quit => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
                return;
            }
            Action::Restart => {
                self.reset_game();
                return;
            }
            Action::None => return,
        };
        let at = self.cursor_or_center();
        let max = GRID_SIZE as i32 - 1;
        let row = (at.row as i32 + dr).clamp(0, max);
        let col = (at.col as i32 + dc).clamp(0, max);
        let next = Coord::checked(row, col).unwrap_or(at);
        self.cursor = Some(next);
        if self.state.is_dragging() {
            self.apply(PointerEvent::Move(Some(next)));
        }
    }

    fn cursor_or_center(&mut self) -> Coord {
        *self
            .cursor
            .get_or_insert(Coord::new(GRID_SIZE / 2, GRID_SIZE / 2))
    }

    fn on_quit_menu_key(&mut self, action: Action) -> Flow {
        match action {
            Action::CursorDown | Action::CursorRight => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::MainMenu,
                    QuitOption::MainMenu => QuitOption::Exit,
                    QuitOption::Exit => QuitOption::Resume,
                };
            }
            Action::CursorUp | Action::CursorLeft => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::Exit,
                    QuitOption::MainMenu => QuitOption::Resume,
                    QuitOption::Exit => QuitOption::MainMenu,
                };
            }
            Action::Grab | Action::Release => match self.quit_selected {
                QuitOption::Resume => self.screen = Screen::Playing,
                QuitOption::MainMenu => {
                    self.menu_state.animation_start = Instant::now();
                    self.screen = Screen::Menu;
                }
                QuitOption::Exit => return Flow::Exit,
            },
            Action::Quit => self.screen = Screen::Playing,
            _ => {}
        }
        Flow::Continue
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(intent) = mouse_to_intent(mouse.kind) else {
            return;
        };
        let event = match intent {
            MouseIntent::Press => PointerEvent::Down(ui::cell_at(
                self.last_area,
                mouse.column,
                mouse.row,
                Hit::Body,
            )),
            MouseIntent::Drag => PointerEvent::Move(ui::cell_at(
                self.last_area,
                mouse.column,
                mouse.row,
                Hit::Center,
            )),
            MouseIntent::Release => PointerEvent::Up,
            MouseIntent::Secondary => PointerEvent::Secondary,
        };
        // Mouse play hides the keyboard cursor.
        self.cursor = None;
        self.apply(event);
    }

    fn apply(&mut self, event: PointerEvent) {
        if let Some(merge) = self.state.handle(event) {
            self.on_merge(merge);
        }
    }

    fn on_merge(&mut self, merge: Merge) {
        debug!(target = %merge.target, value = merge.value, score = self.state.score(), "merge");
        if !self.args.no_animation {
            self.merge_flash.start(merge.target);
        }
    }
}
