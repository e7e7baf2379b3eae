//! ε-NFA lowering (§4.3 step 1): Thompson-style construction from the
//! [`vir_expr::Expr`] tree into a graph of states joined by either a real,
//! event-consuming edge or an ε-edge carrying zero or more capture
//! markers. `vir-compile::compiler` joins one fragment per command under a
//! shared start state and determinizes the whole graph.

use std::collections::HashMap;

use vir_events::Event;
use vir_expr::{CaptureId, Expr};

use crate::machine::{CaptureMarker, Guard, MarkerKind};

#[derive(Debug, Clone)]
pub(crate) enum NfaEdge {
    Epsilon,
    Guard(Guard),
}

#[derive(Debug, Clone)]
pub(crate) struct NfaTransition {
    pub edge: NfaEdge,
    pub target: usize,
    /// Markers carried on an ε-edge only; real (`Guard`) edges never carry
    /// markers in this construction — a `Capture` wraps its inner fragment
    /// with ε-edges on entry and exit (see [`NfaBuilder::capture`]).
    pub markers: Vec<CaptureMarker>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
    pub transitions: Vec<NfaTransition>,
}

/// Start/end state pair of a compiled sub-expression, per the classic
/// Thompson construction: every fragment has exactly one entry and one
/// exit state, wired together by concatenation, alternation, etc.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fragment {
    pub start: usize,
    pub end: usize,
}

/// Accumulates NFA states across every command's fragment, plus the
/// command each fragment's exit state accepts.
#[derive(Debug, Default)]
pub(crate) struct NfaBuilder {
    pub states: Vec<NfaState>,
    pub accepts: HashMap<usize, u32>,
}

impl NfaBuilder {
    fn new_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn eps(&mut self, from: usize, to: usize, markers: Vec<CaptureMarker>) {
        self.states[from].transitions.push(NfaTransition {
            edge: NfaEdge::Epsilon,
            target: to,
            markers,
        });
    }

    fn guarded(&mut self, from: usize, to: usize, guard: Guard) {
        self.states[from].transitions.push(NfaTransition {
            edge: NfaEdge::Guard(guard),
            target: to,
            markers: Vec::new(),
        });
    }

    /// Lowers one expression into a fresh fragment.
    pub fn compile(&mut self, expr: &Expr) -> Fragment {
        match expr {
            Expr::Event(e) => self.literal(*e),
            Expr::Range(lo, hi) => self.range(*lo, *hi),
            Expr::Concat(parts) => self.concat(parts),
            Expr::Alt(parts) => self.alt(parts),
            Expr::Star(inner) => self.star(inner),
            Expr::Option(inner) => self.option(inner),
            Expr::Capture(id, inner) => self.capture(*id, inner),
        }
    }

    fn literal(&mut self, e: Event) -> Fragment {
        self.range(e, e)
    }

    fn range(&mut self, lo: Event, hi: Event) -> Fragment {
        let start = self.new_state();
        let end = self.new_state();
        self.guarded(start, end, Guard::range(lo, hi));
        Fragment { start, end }
    }

    fn concat(&mut self, parts: &[Expr]) -> Fragment {
        assert!(!parts.is_empty(), "Concat must not be empty");
        let mut frags = parts.iter().map(|p| self.compile(p));
        let first = frags.next().unwrap();
        let mut prev_end = first.end;
        let start = first.start;
        for frag in frags {
            self.eps(prev_end, frag.start, Vec::new());
            prev_end = frag.end;
        }
        Fragment {
            start,
            end: prev_end,
        }
    }

    fn alt(&mut self, parts: &[Expr]) -> Fragment {
        assert!(!parts.is_empty(), "Alt must not be empty");
        let start = self.new_state();
        let end = self.new_state();
        for part in parts {
            let frag = self.compile(part);
            self.eps(start, frag.start, Vec::new());
            self.eps(frag.end, end, Vec::new());
        }
        Fragment { start, end }
    }

    fn star(&mut self, inner: &Expr) -> Fragment {
        let start = self.new_state();
        let end = self.new_state();
        let frag = self.compile(inner);
        self.eps(start, frag.start, Vec::new());
        self.eps(start, end, Vec::new());
        self.eps(frag.end, frag.start, Vec::new());
        self.eps(frag.end, end, Vec::new());
        Fragment { start, end }
    }

    fn option(&mut self, inner: &Expr) -> Fragment {
        let start = self.new_state();
        let end = self.new_state();
        let frag = self.compile(inner);
        self.eps(start, frag.start, Vec::new());
        self.eps(start, end, Vec::new());
        self.eps(frag.end, end, Vec::new());
        Fragment { start, end }
    }

    fn capture(&mut self, id: CaptureId, inner: &Expr) -> Fragment {
        let start = self.new_state();
        let end = self.new_state();
        let frag = self.compile(inner);
        self.eps(start, frag.start, vec![CaptureMarker {
            id,
            kind: MarkerKind::Start,
        }]);
        self.eps(frag.end, end, vec![CaptureMarker {
            id,
            kind: MarkerKind::End,
        }]);
        Fragment { start, end }
    }

    /// Joins every command's fragment under a single fresh start state and
    /// tags each fragment's exit with its command id (§4.3 step 2).
    pub fn join(&mut self, commands: &[(u32, Expr)]) -> usize {
        let start = self.new_state();
        for (id, expr) in commands {
            let frag = self.compile(expr);
            self.eps(start, frag.start, Vec::new());
            self.accepts.insert(frag.end, *id);
        }
        start
    }
}
