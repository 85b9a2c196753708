// Defensive programming lints - prevent panics and unsafe patterns
#![deny(clippy::indexing_slicing)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::fallible_impl_from)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::fn_params_excessive_bools)]
// Idiomatic Rust lints
#![warn(clippy::needless_return)]
#![warn(clippy::let_and_return)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::explicit_iter_loop)]

mod app;
mod assistant;
mod config;
mod logging;
mod scope;
mod services;
mod session;
mod ui;

use app::{App, AppMode};
use assistant::{ChatBackend, ResponsesClient};
use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use scope::ServiceScope;
use session::ConversationSession;
use std::{io, sync::Arc, time::Duration};
use tracing::{error, info};

/// Exit status when required setup is missing
const SETUP_EXIT_CODE: i32 = 2;

fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map_or("dopl-chatbot", String::as_str);

    // Commands that need no credentials
    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            print_help(program_name);
            return Ok(());
        }
        Some("--version" | "-v") => {
            println!("{} v{}", ui::APP_TITLE, env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("scopes") => {
            print_scopes();
            return Ok(());
        }
        Some("ask") | None => {}
        Some(unknown) => {
            eprintln!("Unknown command: {}", unknown);
            eprintln!("Run with --help for available commands.");
            std::process::exit(1);
        }
    }

    // Load config and refuse to start without a knowledge source and key
    let config = config::Config::load()?;
    let credentials = match config.require_credentials() {
        Ok(credentials) => credentials,
        Err(setup_error) => {
            eprintln!("{}", setup_error.remediation());
            std::process::exit(SETUP_EXIT_CODE);
        }
    };

    let log_path = logging::init(&config.logging)?;
    info!(log = %log_path.display(), model = %config.openai.model, "dopl-chatbot starting");

    let backend: Arc<dyn ChatBackend> =
        Arc::new(ResponsesClient::new(&config.openai, &credentials)?);

    if args.get(1).is_some() {
        return run_ask(backend.as_ref(), args.get(2..).unwrap_or_default());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let mut app = App::new(backend);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    info!("dopl-chatbot exiting");
    Ok(())
}

/// One exchange without the UI: answer on stdout, failure on stderr with status 1
fn run_ask(backend: &dyn ChatBackend, words: &[String]) -> Result<()> {
    let question = words.join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: dopl-chatbot ask <question...>");
        std::process::exit(1);
    }

    let mut session = ConversationSession::new();
    match session.exchange(backend, &question) {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(err) => {
            let notice = session
                .transcript()
                .last()
                .map_or_else(|| err.to_string(), |turn| turn.content.clone());
            eprintln!("{}", notice);
            std::process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    println!("{} - 앱 고객지원 챗봇", ui::APP_TITLE);
    println!();
    println!("Usage: {} [command]", program_name);
    println!();
    println!("Commands:");
    println!("  ask <question...>  - Ask one question and print the answer");
    println!("  scopes             - List the search scope commands");
    println!("  --help             - Show this help");
    println!("  --version          - Show version");
    println!();
    println!("Run without arguments to start interactive mode.");
    println!("Requires OPENAI_API_KEY and VECTOR_STORE_ID (environment, .env, or config file).");
}

fn print_scopes() {
    for scope in ServiceScope::APPS {
        println!(
            "{:<8} {} {}",
            scope.command().unwrap_or_default(),
            scope.icon(),
            scope.description()
        );
    }
    println!(
        "{:<8} {} {}",
        "",
        ServiceScope::All.icon(),
        ServiceScope::All.description()
    );
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Check for a finished exchange
        app.check_assistant_response();
        app.tick_loading_animation();
        app.clear_expired_status_toast();

        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        // Poll for events with a timeout so the worker result is picked up promptly
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle KeyPress events to avoid duplicate handling
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.should_quit = true;
                        continue;
                    }

                    match app.mode {
                        AppMode::Chat => handle_chat_mode(app, key.code, key.modifiers)?,
                        AppMode::Help => handle_help_mode(app, key.code),
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Paste(paste) => {
                    if app.mode == AppMode::Chat {
                        app.handle_chat_paste(&paste);
                    }
                }
                Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

fn handle_chat_mode(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
    match (key_code, modifiers) {
        (KeyCode::Char('n'), key_modifiers) if key_modifiers.contains(KeyModifiers::CONTROL) => {
            app.start_new_conversation();
        }
        (KeyCode::Char('y'), key_modifiers) if key_modifiers.contains(KeyModifiers::CONTROL) => {
            app.copy_last_answer();
        }
        (KeyCode::F(1), _) => app.open_help(),
        (KeyCode::Up, _) => app.scroll_chat_up_lines(3),
        (KeyCode::Down, _) => app.scroll_chat_down_lines(3),
        (KeyCode::PageUp, _) => app.scroll_chat_up_page(),
        (KeyCode::PageDown, _) => app.scroll_chat_down_page(),
        (KeyCode::Home, _) if app.chat_input.is_empty() => app.jump_to_top(),
        (KeyCode::End, _) if app.chat_input.is_empty() => app.reset_chat_scroll(),
        (KeyCode::Home, _) => app.chat_input.move_to_start(),
        (KeyCode::End, _) => app.chat_input.move_to_end(),
        (KeyCode::Left, _) => app.chat_input.move_left(),
        (KeyCode::Right, _) => app.chat_input.move_right(),
        (KeyCode::Enter, _) => app.send_chat_message()?,
        (KeyCode::Char(character), key_modifiers)
            if !key_modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.add_chat_input_char(character)
        }
        (KeyCode::Backspace, _) => app.remove_chat_input_char(),
        (KeyCode::Delete, _) => app.chat_input.delete_char(),
        (KeyCode::Esc, _)
        | (KeyCode::Char(_), _)
        | (KeyCode::Tab, _)
        | (KeyCode::BackTab, _)
        | (KeyCode::Insert, _)
        | (KeyCode::F(_), _)
        | (KeyCode::Null, _)
        | (KeyCode::CapsLock, _)
        | (KeyCode::ScrollLock, _)
        | (KeyCode::NumLock, _)
        | (KeyCode::PrintScreen, _)
        | (KeyCode::Pause, _)
        | (KeyCode::Menu, _)
        | (KeyCode::KeypadBegin, _)
        | (KeyCode::Media(_), _)
        | (KeyCode::Modifier(_), _) => {}
    }
    Ok(())
}

fn handle_help_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Enter => app.close_help(),
        KeyCode::Char(_)
        | KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: event::MouseEvent) {
    if app.mode != AppMode::Chat {
        return;
    }

    match mouse.kind {
        event::MouseEventKind::ScrollUp => app.scroll_chat_up_lines(3),
        event::MouseEventKind::ScrollDown => app.scroll_chat_down_lines(3),
        event::MouseEventKind::ScrollLeft
        | event::MouseEventKind::ScrollRight
        | event::MouseEventKind::Down(_)
        | event::MouseEventKind::Up(_)
        | event::MouseEventKind::Drag(_)
        | event::MouseEventKind::Moved => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::testing::ScriptedBackend;

    fn chat_app() -> App {
        App::new(Arc::new(ScriptedBackend::answering(&[])))
    }

    #[test]
    fn test_unbound_control_and_alt_chords_do_not_type() {
        let mut app = chat_app();
        handle_chat_mode(&mut app, KeyCode::Char('a'), KeyModifiers::CONTROL).unwrap();
        handle_chat_mode(&mut app, KeyCode::Char('b'), KeyModifiers::ALT).unwrap();
        handle_chat_mode(
            &mut app,
            KeyCode::Char('c'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        )
        .unwrap();
        assert!(app.chat_input.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_plain_and_shifted_characters_type() {
        let mut app = chat_app();
        handle_chat_mode(&mut app, KeyCode::Char('a'), KeyModifiers::NONE).unwrap();
        handle_chat_mode(&mut app, KeyCode::Char('B'), KeyModifiers::SHIFT).unwrap();
        handle_chat_mode(&mut app, KeyCode::Char('지'), KeyModifiers::NONE).unwrap();
        assert_eq!(app.chat_input.content(), "aB지");
    }

    #[test]
    fn test_home_then_page_down_moves_view() {
        let mut app = chat_app();
        app.chat_scroll_limit.set(50);
        handle_chat_mode(&mut app, KeyCode::Home, KeyModifiers::NONE).unwrap();
        assert_eq!(app.chat_scroll_offset, 50);
        handle_chat_mode(&mut app, KeyCode::PageDown, KeyModifiers::NONE).unwrap();
        assert_eq!(app.chat_scroll_offset, 30);
    }
}
