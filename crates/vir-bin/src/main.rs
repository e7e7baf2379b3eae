//! Minimal terminal front-end for the recognizer (§5, §6): reads raw key
//! events from `crossterm` in a plain blocking loop, translates them to
//! `vir_events::Event`, and prints whatever `Action` the dispatcher
//! recognizes. It owns no buffer and applies no action to editor state —
//! that is out of scope for the recognizer itself (§1 Non-goals); this
//! binary exists only to exercise `Dispatcher::process_key` end to end.

use std::io::{stdout, Write};
use std::panic;
use std::sync::Once;

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{info, warn};
use vir_commands::{Action, Ctx, Mode, SelectionMode};
use vir_dispatch::Dispatcher;
use vir_events::{encode_key, encode_rune, Event, KeyClass};

fn configure_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            tracing::error!(target: "recognizer.dispatch", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Maps a Ctrl-modified letter to its named `KeyClass`, special-casing
/// `KeyModifiers::CTRL` combinations instead of carrying a modifier
/// bitmask into the automaton, so guards stay single-class comparisons.
fn ctrl_class(c: char) -> Option<KeyClass> {
    match c.to_ascii_lowercase() {
        'u' => Some(KeyClass::CtrlU),
        'd' => Some(KeyClass::CtrlD),
        'f' => Some(KeyClass::CtrlF),
        'b' => Some(KeyClass::CtrlB),
        'r' => Some(KeyClass::CtrlR),
        'v' => Some(KeyClass::CtrlV),
        'n' => Some(KeyClass::CtrlN),
        'p' => Some(KeyClass::CtrlP),
        'j' => Some(KeyClass::Lf),
        _ => None,
    }
}

/// Translates one terminal key press to a recognizer event (C1), or `None`
/// for combinations the grammar has no class for (e.g. unmapped Ctrl
/// letters) — the demo simply drops those rather than guessing.
fn translate_key(key: event::KeyEvent) -> Option<Event> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            return ctrl_class(c).map(encode_key);
        }
    }
    match key.code {
        KeyCode::Char(c) => Some(encode_rune(c)),
        KeyCode::Enter => Some(encode_key(KeyClass::Enter)),
        KeyCode::Tab => Some(encode_key(KeyClass::Tab)),
        // crossterm normalizes both raw backspace codes into one `KeyCode`;
        // `KeyClass::Backspace2` is reachable only by a host that keeps the
        // raw byte distinction, so this binary never emits it.
        KeyCode::Backspace => Some(encode_key(KeyClass::Backspace)),
        KeyCode::Esc => Some(encode_key(KeyClass::Escape)),
        KeyCode::Delete => Some(encode_key(KeyClass::Delete)),
        KeyCode::Left => Some(encode_key(KeyClass::Left)),
        KeyCode::Right => Some(encode_key(KeyClass::Right)),
        KeyCode::Up => Some(encode_key(KeyClass::Up)),
        KeyCode::Down => Some(encode_key(KeyClass::Down)),
        _ => None,
    }
}

/// Updates the demo's own mode tracking from a recognized action. A real
/// host owns this via editor state; this binary keeps just enough to drive
/// `Ctx.mode` for the next key.
fn next_mode(current: Mode, action: &Action) -> Mode {
    match action {
        Action::EnterInsert => Mode::Insert,
        Action::ExitToNormal => Mode::Normal,
        Action::EnterVisual(_) => Mode::Visual,
        Action::EnterCommandLine => Mode::Menu,
        Action::EnterSearch { .. } => Mode::Search,
        Action::SearchCommit | Action::SearchCancel => Mode::Normal,
        Action::MenuConfirm | Action::MenuCancel => Mode::Normal,
        Action::TaskConfirm(_) | Action::TaskCancel => Mode::Normal,
        Action::TextFieldCommit | Action::TextFieldCancel => Mode::Normal,
        _ => current,
    }
}

fn print_line(line: &str) {
    let mut out = stdout();
    let _ = write!(out, "{line}\r\n");
    let _ = out.flush();
}

fn run() -> Result<()> {
    let config = vir_config::load_from(None).context("loading recognizer config")?;
    let mut dispatcher =
        Dispatcher::new(&config).context("loading embedded command-table machines")?;

    info!(target: "recognizer.dispatch", "dispatcher_ready");

    enable_raw_mode().context("entering raw mode")?;
    let result = (|| -> Result<()> {
        let mut mode = Mode::Normal;
        loop {
            match event::read().context("reading terminal event")? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    let Some(raw_event) = translate_key(key) else {
                        continue;
                    };
                    let ctx = Ctx {
                        mode,
                        scroll_lines: 0,
                        hide_patterns: Vec::new(),
                        selection_mode: SelectionMode::Char,
                        selection_end: Box::new(|| None),
                    };
                    let action = dispatcher.process_key(raw_event, &ctx);
                    if action != Action::Noop {
                        print_line(&format!("{mode:?} -> {action:?}"));
                    }
                    mode = next_mode(mode, &action);
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }
                }
                TermEvent::Resize(width, height) => {
                    let action = dispatcher.process_resize(width, height);
                    print_line(&format!("{action:?}"));
                }
                TermEvent::Paste(text) => {
                    let action = dispatcher.process_paste(mode, &text);
                    print_line(&format!("{action:?}"));
                }
                TermEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {}
                _ => {}
            }
        }
        Ok(())
    })();

    if let Err(error) = disable_raw_mode() {
        warn!(target: "recognizer.dispatch", %error, "failed to leave raw mode");
    }
    result
}

fn main() -> Result<()> {
    configure_logging();
    install_panic_hook();
    run()
}
