use anyhow::Result;
use clap::Parser;
use goalboard_scene::{HttpGoalSource, Key, SceneController, SceneEvent};
use ratatui::{
    crossterm::{
        self,
        event::{
            self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
            MouseButton, MouseEventKind,
        },
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

mod view;

use view::StageView;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(version, about = "Walk to the whiteboard and press space to read your goals")]
struct Args {
    /// Base URL of the goal service
    #[arg(long, env = "GOALBOARD_API_URL", default_value = "http://127.0.0.1:39333")]
    api_url: String,
    /// Write logs to this file (the terminal is taken by the stage)
    #[arg(long, env = "GOALBOARD_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    controller: SceneController,
    /// Where the stage was drawn last frame, for mapping mouse clicks.
    stage: StageView,
    should_quit: bool,
}

impl App {
    fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                code => {
                    if let Some(key) = map_key(code) {
                        self.controller.handle(SceneEvent::KeyDown(key));
                    }
                }
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if let Some(point) = self.stage.to_stage(mouse.column, mouse.row) {
                    self.controller.handle(SceneEvent::PointerDown(point));
                }
            }
            _ => {}
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Char(' ') => Some(Key::Space),
        _ => None,
    }
}

/// `RUST_LOG` when it parses, `warn` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    tracing::info!(api_url = %args.api_url, "starting stage");

    // Worker threads run the goal request; the scene itself stays on this thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let controller = SceneController::mount(
        Box::new(HttpGoalSource::new(&args.api_url)),
        runtime.handle().clone(),
    );
    let mut app = App {
        controller,
        stage: StageView::new(Rect::default()),
        should_quit: false,
    };

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    if let Err(err) = &result {
        tracing::error!(error = ?err, "stage loop failed");
    }
    app.controller.unmount();
    restore_terminal(&mut terminal)?;
    runtime.shutdown_background();

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.controller.drain_completions();
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(FRAME_INTERVAL)? {
            app.on_event(event::read()?);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(frame: &mut Frame, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(2)])
        .split(frame.area());

    let block = Block::default().title(" goalboard ").borders(Borders::ALL);
    let stage_area = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    app.stage = StageView::new(stage_area);
    app.stage.draw(&app.controller.frame(), frame.buffer_mut());

    let help = Paragraph::new("Arrows: move | Space: read whiteboard | Click: close | q/Esc: quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, layout[1]);
}
