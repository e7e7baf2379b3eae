//! Mode dispatcher (C7): owns one [`Runtime`] and one command table per
//! [`Mode`], translates `process_key`'s key events through them (§4.7), and
//! turns an `Accept` into a concrete [`Action`] via
//! `vir_commands::build_action`. `Reject` and count-cap violations are
//! ordinary `Action` values, never errors (§7) — the only fallible step is
//! loading the embedded machines at startup.

use std::collections::HashMap;

use tracing::{trace, warn};
use vir_commands::args::extract_params;
use vir_commands::{build_action, modes::table_for, Action, CommandSpec, Mode, Params};
use vir_compile::{deserialize, DeserializeError, Machine};
use vir_events::{decode_class, decode_rune, Event, KeyClass};
use vir_runtime::{Outcome, Runtime};

/// Re-exported so callers can write `vir_dispatch::Ctx` without a second
/// direct dependency on `vir-commands` (§6 names this type `vir-dispatch::Ctx`).
pub use vir_commands::Ctx;

const MACHINE_BYTES: [(&str, &[u8]); 7] = [
    (
        "normal",
        include_bytes!(concat!(env!("OUT_DIR"), "/normal.vir_machine")),
    ),
    (
        "insert",
        include_bytes!(concat!(env!("OUT_DIR"), "/insert.vir_machine")),
    ),
    (
        "visual",
        include_bytes!(concat!(env!("OUT_DIR"), "/visual.vir_machine")),
    ),
    (
        "menu",
        include_bytes!(concat!(env!("OUT_DIR"), "/menu.vir_machine")),
    ),
    (
        "search",
        include_bytes!(concat!(env!("OUT_DIR"), "/search.vir_machine")),
    ),
    (
        "task",
        include_bytes!(concat!(env!("OUT_DIR"), "/task.vir_machine")),
    ),
    (
        "text_field",
        include_bytes!(concat!(env!("OUT_DIR"), "/text_field.vir_machine")),
    ),
];

fn machine_bytes_for(mode: Mode) -> &'static [u8] {
    MACHINE_BYTES
        .iter()
        .find(|(name, _)| *name == mode.name())
        .map(|(_, bytes)| *bytes)
        .expect("build.rs embeds one machine per Mode::ALL entry")
}

struct ModeEntry {
    runtime: Runtime,
    table: Vec<CommandSpec>,
    max_count_override: Option<u64>,
}

/// Merges a command's own `max_count` (`0` = unbounded) with a host-supplied
/// per-mode override: the override can only tighten the cap, never raise it
/// past the table's own ceiling (`vir-config`'s documented contract).
fn effective_cap(table_max: u64, override_cap: Option<u64>) -> u64 {
    match (table_max, override_cap) {
        (0, Some(ov)) => ov,
        (0, None) => 0,
        (tm, Some(ov)) => tm.min(ov),
        (tm, None) => tm,
    }
}

/// Owns one compiled [`Runtime`] and command table per mode (§4.7), plus the
/// rune-accumulation buffer used for a host's "pending input" display.
pub struct Dispatcher {
    modes: HashMap<Mode, ModeEntry>,
    pending: String,
}

impl Dispatcher {
    /// Deserializes every mode's embedded machine and builds its command
    /// table. Fatal at startup: a corrupt embedded machine file means the
    /// binary was built wrong, not a runtime condition to recover from.
    pub fn new(config: &vir_config::Config) -> Result<Dispatcher, DeserializeError> {
        let mut modes = HashMap::with_capacity(Mode::ALL.len());
        for mode in Mode::ALL {
            let machine: Machine = deserialize(machine_bytes_for(mode))?;
            trace!(
                target = "recognizer.dispatch",
                mode = mode.name(),
                states = machine.state_count(),
                "loaded embedded machine"
            );
            modes.insert(
                mode,
                ModeEntry {
                    runtime: Runtime::with_capacity(machine, config.max_input_len()),
                    table: table_for(mode),
                    max_count_override: config.max_count_override(mode.name()),
                },
            );
        }
        Ok(Dispatcher { modes, pending: String::new() })
    }

    /// Advances `ctx.mode`'s automaton by one key event and returns the
    /// resulting action (§4.7 steps 1-5). Never blocks, never allocates
    /// beyond the small fixed-capacity buffers described in §5.
    pub fn process_key(&mut self, event: Event, ctx: &Ctx) -> Action {
        if decode_class(event) == KeyClass::Rune {
            self.pending.push(decode_rune(event));
        }

        let entry = self
            .modes
            .get_mut(&ctx.mode)
            .expect("every Mode has an entry built in Dispatcher::new");

        match entry.runtime.process_event(event) {
            Outcome::Wait => Action::Noop,
            Outcome::Reject => {
                self.pending.clear();
                Action::Noop
            }
            Outcome::Accept {
                command_id,
                captures,
            } => {
                self.pending.clear();
                let Some(spec) = entry.table.get(command_id as usize) else {
                    warn!(
                        target = "recognizer.dispatch",
                        mode = ctx.mode.name(),
                        command_id,
                        "accepted command id has no table entry"
                    );
                    return Action::ErrorStatus(format!(
                        "internal error: unknown command {command_id}"
                    ));
                };

                let params: Params = extract_params(&captures);

                let cap = effective_cap(spec.max_count, entry.max_count_override);
                if cap != 0 && params.count > cap {
                    trace!(
                        target = "recognizer.dispatch",
                        mode = ctx.mode.name(),
                        command = %spec.name,
                        count = params.count,
                        cap,
                        "count exceeds cap"
                    );
                    return Action::ErrorStatus(format!("count must be \u{2264} {cap}"));
                }

                build_action(spec.kind, ctx, &params)
            }
        }
    }

    /// Resize is not part of any mode's grammar (§4.7 [NEW]); answered
    /// immediately without touching any `Runtime`.
    pub fn process_resize(&mut self, width: u16, height: u16) -> Action {
        Action::Resize { width, height }
    }

    /// Bracketed-paste body, delivered as a side-channel bypassing the
    /// runtime entirely (§6). Insert/menu/search insert it "as if typed";
    /// every other mode rejects it with a status message.
    pub fn process_paste(&mut self, mode: Mode, text: &str) -> Action {
        match mode {
            Mode::Insert | Mode::Menu | Mode::Search => Action::Paste(text.to_string()),
            _ => Action::ErrorStatus("paste is not allowed in this mode".to_string()),
        }
    }

    /// The rune characters typed since the last `Accept`/`Reject`, for a
    /// host's "pending command" status line (e.g. `"d3"` while waiting on a
    /// motion). Non-rune keys (arrows, `Enter`, ...) are not recorded.
    pub fn pending_input(&self) -> &str {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vir_commands::{ClipboardPage, Params};
    use vir_events::encode_rune;

    fn test_config() -> vir_config::Config {
        vir_config::Config::default()
    }

    #[test]
    fn effective_cap_override_only_tightens_a_bounded_table_cap() {
        assert_eq!(effective_cap(32, Some(99)), 32);
        assert_eq!(effective_cap(32, Some(5)), 5);
        assert_eq!(effective_cap(32, None), 32);
    }

    #[test]
    fn effective_cap_override_sets_a_bound_on_an_unbounded_table_cap() {
        assert_eq!(effective_cap(0, Some(10)), 10);
        assert_eq!(effective_cap(0, None), 0);
    }

    #[test]
    fn configured_max_input_len_shrinks_the_runtime_ring() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[recognizer]\nmax_input_len = 3\n").unwrap();
        let config = vir_config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        let mut dispatcher = Dispatcher::new(&config).unwrap();
        let ctx = Ctx::new(Mode::Normal);
        // "9999" overflows a 3-event ring well before any command pattern
        // could accept, so the 4th digit forces a Reject.
        dispatcher.process_key(encode_rune('9'), &ctx);
        dispatcher.process_key(encode_rune('9'), &ctx);
        dispatcher.process_key(encode_rune('9'), &ctx);
        let action = dispatcher.process_key(encode_rune('9'), &ctx);
        assert_eq!(action, Action::Noop);
        assert!(dispatcher.pending_input().is_empty());
    }

    #[test]
    fn dispatcher_loads_every_mode_without_error() {
        let dispatcher = Dispatcher::new(&test_config());
        assert!(dispatcher.is_ok());
    }

    #[test]
    fn process_resize_never_touches_the_runtime() {
        let mut dispatcher = Dispatcher::new(&test_config()).unwrap();
        let before = dispatcher
            .modes
            .get(&Mode::Normal)
            .unwrap()
            .runtime
            .buffered_len();
        let action = dispatcher.process_resize(120, 40);
        assert_eq!(action, Action::Resize { width: 120, height: 40 });
        let after = dispatcher
            .modes
            .get(&Mode::Normal)
            .unwrap()
            .runtime
            .buffered_len();
        assert_eq!(before, after);
    }

    #[test]
    fn pending_buffer_accumulates_runes_and_clears_on_accept() {
        let mut dispatcher = Dispatcher::new(&test_config()).unwrap();
        let ctx = Ctx::new(Mode::Normal);
        dispatcher.process_key(encode_rune('3'), &ctx);
        assert_eq!(dispatcher.pending_input(), "3");
        let action = dispatcher.process_key(encode_rune('j'), &ctx);
        assert!(!matches!(action, Action::Noop) || dispatcher.pending_input().is_empty());
        assert_eq!(dispatcher.pending_input(), "");
    }

    #[test]
    fn paste_is_accepted_in_insert_mode_and_rejected_in_normal_mode() {
        let mut dispatcher = Dispatcher::new(&test_config()).unwrap();
        assert_eq!(
            dispatcher.process_paste(Mode::Insert, "hello"),
            Action::Paste("hello".to_string())
        );
        assert!(matches!(
            dispatcher.process_paste(Mode::Normal, "hello"),
            Action::ErrorStatus(_)
        ));
    }

    #[test]
    fn count_over_cap_yields_error_status_not_a_panic() {
        let mut dispatcher = Dispatcher::new(&test_config()).unwrap();
        let ctx = Ctx::new(Mode::Visual);
        // visual-indent's pattern is `verb_count_then('>')`, capped at 32.
        for ch in "9999".chars() {
            dispatcher.process_key(encode_rune(ch), &ctx);
        }
        let action = dispatcher.process_key(encode_rune('>'), &ctx);
        match action {
            Action::ErrorStatus(msg) => assert!(msg.contains("count must be")),
            other => panic!("expected an error status, got {other:?}"),
        }
        let _ = ClipboardPage::Default;
        let _ = Params::default();
    }
}
