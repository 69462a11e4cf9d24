mod app;
mod config;
mod core;
mod domain;
mod infrastructure;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{error, info, warn};

use crate::app::{App, InputMode, StatusLevel, Tab};
use crate::config::Settings;
use crate::infrastructure::{HttpBackend, RuntimeBridge, RuntimeEvent};

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version,
    about = "Stockroom: a terminal dashboard for shop stock and orders"
)]
struct Args {
    /// Shop backend origin (e.g. http://localhost:8081)
    #[arg(long)]
    base_url: Option<String>,

    /// Admin password; overrides STOCKROOM_ADMIN_PASSWORD and the config file
    #[arg(long)]
    password: Option<String>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load();
    let settings = Settings::resolve(
        &config,
        args.base_url.as_deref(),
        args.password.as_deref(),
        std::env::var(config::PASSWORD_ENV).ok(),
    );

    let log_dir = args
        .log_dir
        .clone()
        .or_else(config::log_dir)
        .unwrap_or_else(|| PathBuf::from("logs"));
    let _log_guard = logging::init(&log_dir)?;
    info!(base_url = %settings.base_url, "starting stockroom");

    let size = terminal_rect().context("cannot read terminal size")?;
    ui::bindings::validate(size)?;

    let api = HttpBackend::new(&settings.base_url, settings.timeout)
        .with_context(|| format!("invalid backend url {}", settings.base_url))?;
    let runtime = RuntimeBridge::new(Arc::new(api));

    let mut app = App::new(settings.base_url.clone());
    if let Some(password) = settings.password.clone() {
        app.request_login(password);
    }
    app.activate(Tab::Stock);
    app.set_status("Loading stock…", StatusLevel::Info);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("{err:#}");
        eprintln!("{err:?}");
    }
    info!("stockroom exited");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Resize(width, height) => {
                    if let Err(err) = ui::bindings::validate(Rect::new(0, 0, width, height)) {
                        warn!("{err}");
                        app.set_status(err.to_string(), StatusLevel::Warn);
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    // Process runtime events
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::LoggedIn => app.apply_logged_in(),
            RuntimeEvent::LoginRejected { message } => app.apply_login_rejected(message),
            RuntimeEvent::StockLoaded { items } => app.apply_stock_loaded(items),
            RuntimeEvent::ItemSubmitted { action } => app.apply_item_submitted(action),
            RuntimeEvent::OrdersLoaded { filter, orders } => {
                app.apply_orders_loaded(filter, orders)
            }
            RuntimeEvent::ImageUploaded { title } => app.apply_image_uploaded(title),
            RuntimeEvent::ImageFailed { title, message } => app.apply_image_failed(title, message),
            RuntimeEvent::Error { message } => app.apply_error(message),
        }
    }

    // Forward queued requests
    for cmd in app.take_requests() {
        if let Err(err) = runtime.send(cmd) {
            app.set_status(err.to_string(), StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Alerts block all other input
    if app.current_alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Modal => handle_modal_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char(':'), _) => app.enter_command(),
        (KeyCode::Char('1'), _) => app.activate(Tab::Stock),
        (KeyCode::Char('2'), _) => app.activate(Tab::Orders),
        (KeyCode::Tab | KeyCode::BackTab, _) => app.cycle_tab(),
        (KeyCode::Char('j') | KeyCode::Down, _) => app.move_selection_down(),
        (KeyCode::Char('k') | KeyCode::Up, _) => app.move_selection_up(),
        (KeyCode::Char('r'), _) => app.execute_command(&crate::core::Command::Reload),
        _ => match app.active_tab() {
            Some(Tab::Stock) => handle_stock_key(app, key.code),
            Some(Tab::Orders) => handle_orders_key(app, key.code),
            None => {}
        },
    }
}

fn handle_stock_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('a') => app.open_add_modal(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_selected(),
        KeyCode::Char(' ') => app.toggle_mark_selected(),
        KeyCode::Char('d') => app.submit_delete(),
        _ => {}
    }
}

fn handle_orders_key(app: &mut App, code: KeyCode) {
    if code == KeyCode::Char('f') {
        app.cycle_order_filter();
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => app.command.input.push(ch),
        _ => {}
    }
}

fn handle_modal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_modal(),
        KeyCode::Enter => app.submit_modal(),
        KeyCode::Tab | KeyCode::Down => app.modal_focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.modal_focus_prev(),
        KeyCode::Backspace => app.modal_backspace(),
        KeyCode::Char(ch) => app.modal_input(ch),
        _ => {}
    }
}

fn terminal_rect() -> Option<Rect> {
    crossterm::terminal::size()
        .ok()
        .map(|(width, height)| Rect::new(0, 0, width, height))
}
