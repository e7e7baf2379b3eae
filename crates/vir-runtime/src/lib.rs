//! Runtime (C4): executes a compiled [`Machine`] against a live event
//! stream, one event at a time, with bounded memory (§3 "Runtime frame",
//! §4.4, §5 "Memory bounds").

use std::collections::VecDeque;

use tracing::trace;
use vir_compile::{Machine, MarkerKind, StateId};
use vir_events::Event;
use vir_expr::CaptureId;

/// Ring capacity for buffered events (§3, §5). A stuck prefix longer than
/// this forces a `Reject`.
pub const MAX_INPUT_LEN: usize = 64;

/// One completed capture: the argument-kind id plus the inclusive
/// `[start, start + length)` window over the event buffer it spans.
/// Only meaningful while the runtime's event buffer that produced it is
/// still live — [`Runtime::process_event`] resolves every `Capture` to a
/// [`ResolvedCapture`] before it clears that buffer, so this type never
/// escapes this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Capture {
    id: CaptureId,
    start: usize,
    length: usize,
}

/// A completed capture with its event slice already resolved, safe to read
/// after the runtime that produced it has reset (§4.6 "argument
/// extraction" reads these instead of indexing a buffer that may already
/// be gone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCapture {
    pub id: CaptureId,
    pub events: Vec<Event>,
}

/// Snapshot of the most recent accepting state reached along the current
/// prefix, kept so a failed extension can still commit to it
/// (maximal-munch, §4.4 step 2/3).
#[derive(Debug, Clone)]
struct AcceptSnapshot {
    command_id: u32,
    captures: Vec<Capture>,
}

/// The outcome of feeding one event to the runtime (§3 "Accept / Wait /
/// Reject").
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The buffered prefix is still viable; no command is decided yet.
    Wait,
    /// No command can possibly match; the buffer has been reset.
    Reject,
    /// A command was recognized; the buffer has been reset. Captures are
    /// already resolved to their event slices (§4.6) — safe to read even
    /// though the runtime's own buffer is now empty.
    Accept {
        command_id: u32,
        captures: Vec<ResolvedCapture>,
    },
}

/// Executes one compiled [`Machine`] against a stream of events. Owns the
/// bounded event ring, the active-capture table, and the latest-accept
/// snapshot described in §3's "Runtime frame".
pub struct Runtime {
    machine: Machine,
    current_state: StateId,
    event_buffer: VecDeque<Event>,
    max_input_len: usize,
    active_captures: Vec<(CaptureId, usize)>,
    completed_captures: Vec<Capture>,
    last_accept: Option<AcceptSnapshot>,
}

impl Runtime {
    /// Builds a runtime with the default ring capacity ([`MAX_INPUT_LEN`]).
    pub fn new(machine: Machine) -> Self {
        Self::with_capacity(machine, MAX_INPUT_LEN)
    }

    /// Builds a runtime whose ring buffer holds at most `max_input_len`
    /// events before a stuck prefix is forced to `Reject` (§5). A host may
    /// tighten or relax this past the built-in default via
    /// `vir-config`'s `max_input_len` knob; `vir-dispatch::Dispatcher::new`
    /// is the sole caller that threads a non-default value through.
    pub fn with_capacity(machine: Machine, max_input_len: usize) -> Self {
        let start = machine.start();
        Runtime {
            machine,
            current_state: start,
            event_buffer: VecDeque::with_capacity(max_input_len),
            max_input_len,
            active_captures: Vec::new(),
            completed_captures: Vec::new(),
            last_accept: None,
        }
    }

    /// Current number of buffered events; `0` immediately after any
    /// `Accept`/`Reject` (§8 "Bounded memory").
    pub fn buffered_len(&self) -> usize {
        self.event_buffer.len()
    }

    fn reset(&mut self) {
        self.event_buffer.clear();
        self.active_captures.clear();
        self.completed_captures.clear();
        self.last_accept = None;
        self.current_state = self.machine.start();
    }

    /// Advances the automaton by one event (§4.4).
    pub fn process_event(&mut self, event: Event) -> Outcome {
        self.event_buffer.push_back(event);
        if self.event_buffer.len() > self.max_input_len {
            trace!(
                target = "recognizer.runtime",
                len = self.event_buffer.len(),
                "input buffer overflow, forcing reject"
            );
            self.reset();
            return Outcome::Reject;
        }
        let index = self.event_buffer.len() - 1;

        let state = self.machine.state(self.current_state);
        let Some(transition) = state.transition_for(event) else {
            return self.no_match_outcome();
        };

        for marker in &transition.markers {
            match marker.kind {
                MarkerKind::Start => self.active_captures.push((marker.id, index)),
                MarkerKind::End => {
                    if let Some(pos) = self
                        .active_captures
                        .iter()
                        .rposition(|(id, _)| *id == marker.id)
                    {
                        let (id, start) = self.active_captures.remove(pos);
                        self.completed_captures.push(Capture {
                            id,
                            start,
                            length: index - start + 1,
                        });
                    }
                }
            }
        }

        self.current_state = transition.target;
        let new_state = self.machine.state(self.current_state);

        if let Some(command_id) = new_state.accept {
            if new_state.is_terminal() {
                trace!(
                    target = "recognizer.runtime",
                    command_id,
                    "terminal accept"
                );
                // Resolve every capture's event slice against the still-live
                // buffer *before* resetting clears it out from under us.
                let captures = self.resolve(&self.completed_captures.clone());
                self.reset();
                return Outcome::Accept {
                    command_id,
                    captures,
                };
            }
            trace!(
                target = "recognizer.runtime",
                command_id,
                "snapshot accept, waiting for a longer match"
            );
            self.last_accept = Some(AcceptSnapshot {
                command_id,
                captures: self.completed_captures.clone(),
            });
            return Outcome::Wait;
        }

        Outcome::Wait
    }

    fn no_match_outcome(&mut self) -> Outcome {
        if let Some(snapshot) = self.last_accept.take() {
            trace!(
                target = "recognizer.runtime",
                command_id = snapshot.command_id,
                "committing to last accepting prefix"
            );
            // The buffer hasn't been reset since the snapshot was taken, so
            // its indices are still valid — resolve them before they aren't.
            let captures = self.resolve(&snapshot.captures);
            self.reset();
            return Outcome::Accept {
                command_id: snapshot.command_id,
                captures,
            };
        }
        trace!(target = "recognizer.runtime", "no viable transition, reject");
        self.reset();
        Outcome::Reject
    }

    /// Resolves each `Capture`'s `[start, start + length)` window against
    /// the current event buffer into an owned event slice. Must be called
    /// before `reset()` clears that buffer — every call site in this module
    /// does so immediately before resetting.
    fn resolve(&self, captures: &[Capture]) -> Vec<ResolvedCapture> {
        captures
            .iter()
            .map(|capture| ResolvedCapture {
                id: capture.id,
                events: self
                    .event_buffer
                    .iter()
                    .skip(capture.start)
                    .take(capture.length)
                    .copied()
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vir_compile::compile;
    use vir_events::{encode_key, encode_rune, KeyClass};
    use vir_expr::{cmd_expr, rune_expr, CmdOpts};

    fn dd_machine() -> Machine {
        let commands = vec![
            (0u32, rune_expr('d')),
            (1u32, vir_expr::concat(vec![rune_expr('d'), rune_expr('d')])),
        ];
        compile(&commands).unwrap()
    }

    #[test]
    fn maximal_munch_commits_to_dd_when_extended() {
        let mut rt = Runtime::new(dd_machine());
        assert_eq!(rt.process_event(encode_rune('d')), Outcome::Wait);
        assert_eq!(
            rt.process_event(encode_rune('d')),
            Outcome::Accept {
                command_id: 1,
                captures: vec![]
            }
        );
        assert_eq!(rt.buffered_len(), 0);
    }

    #[test]
    fn maximal_munch_commits_to_shorter_prefix_when_extension_fails() {
        let mut rt = Runtime::new(dd_machine());
        assert_eq!(rt.process_event(encode_rune('d')), Outcome::Wait);
        assert_eq!(
            rt.process_event(encode_rune('x')),
            Outcome::Accept {
                command_id: 0,
                captures: vec![]
            }
        );
        assert_eq!(rt.buffered_len(), 0);
    }

    #[test]
    fn reject_when_no_prior_accept_exists() {
        let mut rt = Runtime::new(dd_machine());
        assert_eq!(rt.process_event(encode_rune('z')), Outcome::Reject);
        assert_eq!(rt.buffered_len(), 0);
    }

    #[test]
    fn with_capacity_overrides_the_default_ring_size() {
        let machine = compile(&[(
            0u32,
            vir_expr::concat(vec![vir_expr::Expr::star(rune_expr('9')), rune_expr('!')]),
        )])
        .unwrap();
        let mut rt = Runtime::with_capacity(machine, 4);
        let mut last = Outcome::Wait;
        for _ in 0..5 {
            last = rt.process_event(encode_rune('9'));
        }
        assert_eq!(last, Outcome::Reject);
        assert_eq!(rt.buffered_len(), 0);
    }

    #[test]
    fn overflowing_the_ring_forces_reject() {
        // Star alone would zero-input-accept; wrap with a trailing literal
        // so the grammar is well-formed while still accepting long runs.
        let machine = compile(&[(
            0u32,
            vir_expr::concat(vec![vir_expr::Expr::star(rune_expr('9')), rune_expr('!')]),
        )])
        .unwrap();
        let mut rt = Runtime::new(machine);
        let mut last = Outcome::Wait;
        for _ in 0..(MAX_INPUT_LEN + 1) {
            last = rt.process_event(encode_rune('9'));
        }
        assert_eq!(last, Outcome::Reject);
        assert_eq!(rt.buffered_len(), 0);
    }

    #[test]
    fn captures_span_the_exact_typed_digits() {
        let machine = compile(&[(
            0u32,
            cmd_expr(
                "w",
                None,
                CmdOpts {
                    count: true,
                    ..Default::default()
                },
            ),
        )])
        .unwrap();
        let mut rt = Runtime::new(machine);
        rt.process_event(encode_rune('2'));
        let outcome = rt.process_event(encode_rune('w'));
        match outcome {
            Outcome::Accept {
                command_id,
                captures,
            } => {
                assert_eq!(command_id, 0);
                assert_eq!(captures.len(), 1);
                assert_eq!(captures[0].id, CaptureId::VerbCount);
                // The capture must still decode to the digit actually
                // typed, even though the runtime's own buffer has already
                // been reset by the time the caller inspects the `Accept`.
                assert_eq!(captures[0].events, vec![encode_rune('2')]);
            }
            other => panic!("expected accept, got {other:?}"),
        }
    }

    #[test]
    fn resolved_captures_survive_the_internal_reset() {
        // Regression test for captures referencing an event buffer that had
        // already been cleared by the time `process_event` returned.
        let machine = compile(&[(
            0u32,
            cmd_expr(
                "f",
                None,
                CmdOpts {
                    match_char: true,
                    ..Default::default()
                },
            ),
        )])
        .unwrap();
        let mut rt = Runtime::new(machine);
        rt.process_event(encode_rune('f'));
        let outcome = rt.process_event(encode_rune('x'));
        assert_eq!(rt.buffered_len(), 0, "runtime resets after accepting");
        match outcome {
            Outcome::Accept { captures, .. } => {
                assert_eq!(captures.len(), 1);
                assert_eq!(captures[0].id, CaptureId::MatchChar);
                assert_eq!(captures[0].events, vec![encode_rune('x')]);
            }
            other => panic!("expected accept, got {other:?}"),
        }
    }

    #[test]
    fn named_keys_are_distinguished_from_runes() {
        let machine = compile(&[(0u32, vir_expr::key_expr(KeyClass::Enter))]).unwrap();
        let mut rt = Runtime::new(machine);
        assert_eq!(rt.process_event(encode_key(KeyClass::Tab)), Outcome::Reject);
    }
}
