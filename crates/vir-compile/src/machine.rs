//! The compiled, immutable state machine (§3 "State machine", §4.3).
//!
//! A [`Machine`] is a flat vector of [`StateData`]; transitions carry a
//! disjoint event guard, a target state, and the capture markers that fire
//! when the transition is taken. This is the artifact `vir-runtime` walks
//! and that `vir-compile::serialize` turns into the §6 byte format.

use vir_events::Event;
use vir_expr::CaptureId;

/// The index a command table assigns a rule; also the value tagged on the
/// state the compiler marks accepting for that rule (§3 "Command record").
pub type CommandId = u32;

/// Index of a [`StateData`] within a [`Machine`].
pub type StateId = u32;

/// Whether a capture marker opens or closes the named capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Start,
    End,
}

/// A capture-start or capture-end marker attached to a transition (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureMarker {
    pub id: CaptureId,
    pub kind: MarkerKind,
}

impl CaptureMarker {
    pub fn start(id: CaptureId) -> Self {
        CaptureMarker {
            id,
            kind: MarkerKind::Start,
        }
    }

    pub fn end(id: CaptureId) -> Self {
        CaptureMarker {
            id,
            kind: MarkerKind::End,
        }
    }
}

/// An inclusive guard over automaton events. Events compare by their raw
/// `u64` representation (class in the upper half, value in the lower
/// half — `vir-events::Event::raw`), so a guard never straddles two key
/// classes: the class bits dominate the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    pub lo: Event,
    pub hi: Event,
}

impl Guard {
    pub fn single(e: Event) -> Self {
        Guard { lo: e, hi: e }
    }

    pub fn range(lo: Event, hi: Event) -> Self {
        debug_assert!(lo.raw() <= hi.raw(), "guard range must be non-decreasing");
        Guard { lo, hi }
    }

    pub fn contains(self, e: Event) -> bool {
        self.lo.raw() <= e.raw() && e.raw() <= self.hi.raw()
    }

    pub fn overlaps(self, other: Guard) -> bool {
        self.lo.raw() <= other.hi.raw() && other.lo.raw() <= self.hi.raw()
    }
}

/// One outgoing edge of a [`StateData`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub guard: Guard,
    pub target: StateId,
    /// Markers in the order they fire: all `Start`s before all `End`s,
    /// since a transition consumes exactly one event and a capture cannot
    /// both open and close on disjoint events within the same step unless
    /// nested — the compiler preserves construction order here.
    pub markers: Vec<CaptureMarker>,
}

/// A single automaton state: its outgoing transitions plus, when the state
/// is an accept state, the command it recognizes.
#[derive(Debug, Clone, Default)]
pub struct StateData {
    pub transitions: Vec<Transition>,
    pub accept: Option<CommandId>,
}

impl StateData {
    /// The transition (if any) whose guard contains `e`. Determinism (§3
    /// invariant iii) guarantees at most one match.
    pub fn transition_for(&self, e: Event) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.guard.contains(e))
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// An immutable, verified state machine (§3, §4.3 step 5).
#[derive(Debug, Clone)]
pub struct Machine {
    states: Vec<StateData>,
    start: StateId,
}

impl Machine {
    /// Builds a machine from an already-verified state vector. Callers
    /// outside this crate only ever obtain a `Machine` via
    /// [`crate::compiler::compile`] or [`crate::serialize::deserialize`],
    /// both of which validate well-formedness before returning one.
    pub(crate) fn from_parts(states: Vec<StateData>, start: StateId) -> Self {
        Machine { states, start }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &StateData {
        &self.states[id as usize]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn states(&self) -> &[StateData] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vir_events::encode_rune;

    #[test]
    fn guard_contains_is_inclusive() {
        let g = Guard::range(encode_rune('a'), encode_rune('z'));
        assert!(g.contains(encode_rune('a')));
        assert!(g.contains(encode_rune('m')));
        assert!(g.contains(encode_rune('z')));
        assert!(!g.contains(encode_rune('A')));
    }

    #[test]
    fn guards_overlap_when_ranges_intersect() {
        let a = Guard::range(encode_rune('a'), encode_rune('m'));
        let b = Guard::range(encode_rune('g'), encode_rune('z'));
        let c = Guard::range(encode_rune('n'), encode_rune('z'));
        assert!(a.overlaps(b));
        assert!(!a.overlaps(c));
    }
}
