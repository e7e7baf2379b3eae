//! Determinization, minimization, and well-formedness verification
//! (§4.3 steps 2–5). Converts the ε-NFA `vir-compile::nfa` builds from a
//! command list into the immutable [`crate::machine::Machine`] the runtime
//! executes.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{debug, trace};
use vir_expr::Expr;

use crate::error::GrammarError;
use crate::machine::{CaptureMarker, CommandId, Guard, Machine, StateData, Transition};
use crate::nfa::{NfaBuilder, NfaEdge};

/// Hard caps a conforming grammar should never approach; real mode tables
/// run to a few hundred states after minimization. Exceeding these is
/// treated as a malformed grammar (§4.3 "Failure modes") rather than an
/// attempt to grow the cap, since an explosion this large almost certainly
/// means two command patterns were accidentally made ambiguous across a
/// huge shared prefix.
const MAX_STATES: usize = 20_000;
const MAX_TRANSITIONS: usize = 200_000;

/// Compiles an ordered `(CommandId, Expr)` list into a verified [`Machine`].
///
/// Order matters twice over (§4.5): it assigns no additional meaning to
/// `CommandId` itself (that's the caller's command-table index), but it is
/// the deterministic tie-break when two patterns accept the same input —
/// earlier entries win.
pub fn compile(commands: &[(CommandId, Expr)]) -> Result<Machine, GrammarError> {
    if commands.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }

    let mut builder = NfaBuilder::default();
    let nfa_start = builder.join(commands);
    let priority: HashMap<CommandId, usize> = commands
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i))
        .collect();

    let dfa = determinize(&builder, nfa_start, &priority)?;
    debug!(
        target = "recognizer.compile",
        states = dfa.len(),
        "determinized"
    );

    let minimized = minimize(dfa);
    debug!(
        target = "recognizer.compile",
        states = minimized.len(),
        "minimized"
    );

    verify(&minimized)?;

    if minimized.len() > MAX_STATES {
        return Err(GrammarError::TooManyStates(minimized.len()));
    }
    let transitions: usize = minimized.iter().map(|s| s.transitions.len()).sum();
    if transitions > MAX_TRANSITIONS {
        return Err(GrammarError::TooManyTransitions(transitions));
    }

    Ok(Machine::from_parts(minimized, 0))
}

/// ε-closure of a seed set of `(nfa_state, markers accumulated to reach
/// it)` pairs, within one determinization or joining step. Returns the
/// sorted set of reachable NFA states together with, for each, the marker
/// path used to reach it — assumed unique per grammar (two different
/// command fragments never converge on the same NFA state before
/// determinization merges their *DFA* states, only after).
fn eps_closure(
    nfa: &NfaBuilder,
    seeds: Vec<(usize, Vec<CaptureMarker>)>,
) -> BTreeMap<usize, Vec<CaptureMarker>> {
    let mut reached: BTreeMap<usize, Vec<CaptureMarker>> = BTreeMap::new();
    let mut stack = seeds;
    while let Some((state, acc)) = stack.pop() {
        if reached.contains_key(&state) {
            continue;
        }
        reached.insert(state, acc.clone());
        for t in &nfa.states[state].transitions {
            if let NfaEdge::Epsilon = t.edge {
                let mut next = acc.clone();
                next.extend(t.markers.iter().copied());
                stack.push((t.target, next));
            }
        }
    }
    reached
}

type DfaStateKey = Vec<usize>;

struct DfaBuildState {
    transitions: Vec<Transition>,
    accept: Option<CommandId>,
}

/// Subset construction (§4.3 step 3). Each DFA state is the ε-closure of
/// an NFA state set; transitions out of it are formed by partitioning the
/// union of outgoing real guards into maximal disjoint intervals so every
/// resulting transition is unambiguous (§3 invariant iii).
fn determinize(
    nfa: &NfaBuilder,
    nfa_start: usize,
    priority: &HashMap<CommandId, usize>,
) -> Result<Vec<StateData>, GrammarError> {
    let start_closure = eps_closure(nfa, vec![(nfa_start, Vec::new())]);
    let start_key: DfaStateKey = start_closure.keys().copied().collect();

    let mut dfa_states: Vec<DfaBuildState> = Vec::new();
    let mut key_to_id: HashMap<DfaStateKey, usize> = HashMap::new();
    let mut worklist: Vec<(usize, DfaStateKey, BTreeMap<usize, Vec<CaptureMarker>>)> = Vec::new();

    key_to_id.insert(start_key.clone(), 0);
    dfa_states.push(DfaBuildState {
        transitions: Vec::new(),
        accept: accept_for(nfa, &start_closure, priority),
    });
    worklist.push((0, start_key, start_closure));

    while let Some((dfa_id, _key, closure)) = worklist.pop() {
        // Collect every real transition reachable from states in this
        // closure, each tagged with the markers needed to *reach* its
        // source (applied when the transition fires) and its own target.
        let mut edges: Vec<(Guard, usize, Vec<CaptureMarker>)> = Vec::new();
        for (&nfa_state, pre_markers) in &closure {
            for t in &nfa.states[nfa_state].transitions {
                if let NfaEdge::Guard(g) = t.edge {
                    edges.push((g, t.target, pre_markers.clone()));
                }
            }
        }
        if edges.is_empty() {
            continue;
        }

        for (guard, targets_and_markers) in partition(&edges) {
            let seeds: Vec<(usize, Vec<CaptureMarker>)> = targets_and_markers
                .iter()
                .map(|(target, pre)| (*target, pre.clone()))
                .collect();
            let next_closure = eps_closure(nfa, seeds);
            let next_key: DfaStateKey = next_closure.keys().copied().collect();

            let mut fired_markers: Vec<CaptureMarker> = Vec::new();
            for (_, pre) in &targets_and_markers {
                for m in pre {
                    if !fired_markers.contains(m) {
                        fired_markers.push(*m);
                    }
                }
            }
            for markers in next_closure.values() {
                for m in markers {
                    if !fired_markers.contains(m) {
                        fired_markers.push(*m);
                    }
                }
            }

            let target_id = *key_to_id.entry(next_key.clone()).or_insert_with(|| {
                let id = dfa_states.len();
                dfa_states.push(DfaBuildState {
                    transitions: Vec::new(),
                    accept: accept_for(nfa, &next_closure, priority),
                });
                worklist.push((id, next_key.clone(), next_closure));
                id
            });

            trace!(
                target = "recognizer.compile",
                from = dfa_id,
                to = target_id,
                "transition"
            );
            dfa_states[dfa_id].transitions.push(Transition {
                guard,
                target: target_id as u32,
                markers: fired_markers,
            });
        }
    }

    // Zero-input accept check (§4.3 step 5): the join start state must not
    // itself be accepting.
    if dfa_states[0].accept.is_some() {
        let id = dfa_states[0].accept.unwrap();
        return Err(GrammarError::ZeroInputAccept(id));
    }

    Ok(dfa_states
        .into_iter()
        .map(|s| StateData {
            transitions: s.transitions,
            accept: s.accept,
        })
        .collect())
}

/// Picks the accepting command (if any) for a closure: the lowest-priority
/// (earliest-listed) command among those whose fragment-exit state is in
/// the closure (§4.3 step 3 tie-break).
fn accept_for(
    nfa: &NfaBuilder,
    closure: &BTreeMap<usize, Vec<CaptureMarker>>,
    priority: &HashMap<CommandId, usize>,
) -> Option<CommandId> {
    closure
        .keys()
        .filter_map(|s| nfa.accepts.get(s).copied())
        .min_by_key(|id| priority.get(id).copied().unwrap_or(usize::MAX))
}

/// Splits a set of `(guard, target, pre-markers)` edges into maximal
/// disjoint intervals, each paired with every `(target, pre-markers)` that
/// contributes to it (§4.3 step 3 "split ranges so every transition is
/// disjoint").
fn partition(edges: &[(Guard, usize, Vec<CaptureMarker>)]) -> Vec<(Guard, Vec<(usize, Vec<CaptureMarker>)>)> {
    let mut boundaries: Vec<u64> = Vec::new();
    for (g, _, _) in edges {
        boundaries.push(g.lo.raw());
        boundaries.push(g.hi.raw().saturating_add(1));
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut out = Vec::new();
    for window in boundaries.windows(2) {
        let (lo, hi_exclusive) = (window[0], window[1]);
        if lo >= hi_exclusive {
            continue;
        }
        let hi = hi_exclusive - 1;
        let contributors: Vec<(usize, Vec<CaptureMarker>)> = edges
            .iter()
            .filter(|(g, _, _)| g.lo.raw() <= lo && hi <= g.hi.raw())
            .map(|(_, target, pre)| (*target, pre.clone()))
            .collect();
        if contributors.is_empty() {
            continue;
        }
        out.push((
            Guard::range(
                vir_events::Event::from_raw(lo),
                vir_events::Event::from_raw(hi),
            ),
            contributors,
        ));
    }
    out
}

/// Iterative partition refinement to a fixpoint (§4.3 step 4): a direct,
/// unoptimized rendering of Hopcroft's partitioning idea rather than the
/// asymptotically optimal work-list variant (`DESIGN.md` records this as
/// the Open Question's resolution). States are distinguishable unless they
/// share an accept tag and, for every guard value, transition to the same
/// block via the same capture-marker signature.
fn minimize(states: Vec<StateData>) -> Vec<StateData> {
    let n = states.len();
    let mut block_of: Vec<usize> = states
        .iter()
        .map(|s| match s.accept {
            Some(id) => 1 + id as usize,
            None => 0,
        })
        .collect();

    loop {
        let mut new_block_of = vec![0usize; n];
        let mut changed = false;

        // Keep accepting/non-accepting split stable across iterations by
        // seeding signatures with the original coarse block id too.
        let mut seen_coarse: HashMap<(usize, Vec<(u64, u64, usize, Vec<CaptureMarker>)>), usize> =
            HashMap::new();

        for (i, state) in states.iter().enumerate() {
            let mut sig: Vec<(u64, u64, usize, Vec<CaptureMarker>)> = state
                .transitions
                .iter()
                .map(|t| {
                    (
                        t.guard.lo.raw(),
                        t.guard.hi.raw(),
                        block_of[t.target as usize],
                        t.markers.clone(),
                    )
                })
                .collect();
            sig.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

            let coarse = block_of[i];
            let key = (coarse, sig.clone());
            let next_len = seen_coarse.len();
            let block = *seen_coarse.entry(key.clone()).or_insert(next_len);
            new_block_of[i] = block;
        }

        if new_block_of != block_of {
            changed = true;
        }
        block_of = new_block_of;
        if !changed {
            break;
        }
    }

    // Build one representative state per final block, remapping targets.
    let mut block_repr: BTreeMap<usize, usize> = BTreeMap::new();
    let mut ordered_blocks: Vec<usize> = Vec::new();
    for (i, &b) in block_of.iter().enumerate() {
        block_repr.entry(b).or_insert_with(|| {
            ordered_blocks.push(i);
            ordered_blocks.len() - 1
        });
    }
    let new_id_of_block: HashMap<usize, usize> = block_repr
        .iter()
        .map(|(&b, &new_id)| (b, new_id))
        .collect();

    // Ensure the state holding the original start (block of state 0)
    // becomes the new state 0.
    let start_block = block_of[0];
    let start_new_id = new_id_of_block[&start_block];

    let mut result: Vec<Option<StateData>> = vec![None; ordered_blocks.len()];
    for &repr_index in &ordered_blocks {
        let b = block_of[repr_index];
        let new_id = new_id_of_block[&b];
        let state = &states[repr_index];
        let transitions = state
            .transitions
            .iter()
            .map(|t| Transition {
                guard: t.guard,
                target: new_id_of_block[&block_of[t.target as usize]] as u32,
                markers: t.markers.clone(),
            })
            .collect();
        result[new_id] = Some(StateData {
            transitions,
            accept: state.accept,
        });
    }

    let mut result: Vec<StateData> = result.into_iter().map(|s| s.unwrap()).collect();
    if start_new_id != 0 {
        result.swap(0, start_new_id);
        // Fix up any transition that pointed at whichever state now holds
        // the old index 0.
        for state in result.iter_mut() {
            for t in state.transitions.iter_mut() {
                if t.target as usize == 0 {
                    t.target = start_new_id as u32;
                } else if t.target as usize == start_new_id {
                    t.target = 0;
                }
            }
        }
    }
    result
}

/// Well-formedness verification (§4.3 step 5): reachability, disjoint
/// guards (guaranteed by construction, re-checked defensively here), and
/// no zero-input accepts beyond the one already checked in
/// [`determinize`].
fn verify(states: &[StateData]) -> Result<(), GrammarError> {
    let mut reachable = vec![false; states.len()];
    let mut stack = vec![0usize];
    reachable[0] = true;
    while let Some(s) = stack.pop() {
        for t in &states[s].transitions {
            let target = t.target as usize;
            if !reachable[target] {
                reachable[target] = true;
                stack.push(target);
            }
        }
    }

    for (i, state) in states.iter().enumerate() {
        let mut sorted = state.transitions.clone();
        sorted.sort_by_key(|t| t.guard.lo.raw());
        for pair in sorted.windows(2) {
            if pair[0].guard.overlaps(pair[1].guard) {
                // Overlap here means the subset construction failed to
                // split cleanly — two commands disagree over the same
                // input with no way to reconcile. Name the two commands
                // genuinely reachable from each conflicting transition's
                // target rather than guessing.
                let a = accept_reachable_from(states, pair[0].target as usize);
                let b = accept_reachable_from(states, pair[1].target as usize);
                return Err(GrammarError::AmbiguousAccept {
                    a: a.unwrap_or(i as CommandId),
                    b: b.unwrap_or(i as CommandId),
                });
            }
        }
    }

    for (id, r) in reachable.iter().enumerate() {
        if !*r {
            if let Some(cmd) = states[id].accept {
                return Err(GrammarError::UnreachableCommand(cmd));
            }
        }
    }

    Ok(())
}

/// Breadth-first search for the nearest accept tag reachable from `start`,
/// used to name the two commands actually in conflict when [`verify`] finds
/// overlapping guards on the same state.
fn accept_reachable_from(states: &[StateData], start: usize) -> Option<CommandId> {
    let mut seen = vec![false; states.len()];
    let mut queue = VecDeque::new();
    seen[start] = true;
    queue.push_back(start);
    while let Some(s) = queue.pop_front() {
        if let Some(id) = states[s].accept {
            return Some(id);
        }
        for t in &states[s].transitions {
            let target = t.target as usize;
            if !seen[target] {
                seen[target] = true;
                queue.push_back(target);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use vir_expr::{CaptureId, cmd_expr, rune_expr, CmdOpts};

    #[test]
    fn compiles_two_commands_sharing_a_prefix() {
        let commands = vec![
            (0u32, rune_expr('d')),
            (1u32, vir_expr::concat(vec![rune_expr('d'), rune_expr('d')])),
        ];
        let machine = compile(&commands).expect("should compile");
        assert!(machine.state_count() >= 2);
    }

    #[test]
    fn rejects_empty_grammar() {
        assert_eq!(compile(&[]), Err(GrammarError::EmptyGrammar));
    }

    #[test]
    fn rejects_zero_input_accept() {
        // An Option wrapping the whole pattern makes the join state itself
        // accepting without consuming any event.
        let commands = vec![(0u32, Expr::option(rune_expr('x')))];
        let err = compile(&commands).unwrap_err();
        assert!(matches!(err, GrammarError::ZeroInputAccept(0)));
    }

    #[test]
    fn dd_prefix_stays_reachable_after_merge() {
        let commands = vec![
            (
                0u32,
                cmd_expr("d", Some("w"), CmdOpts {
                    count: true,
                    ..Default::default()
                }),
            ),
            (1u32, cmd_expr("dd", None, CmdOpts::default())),
            (
                2u32,
                cmd_expr(
                    "\"",
                    None,
                    CmdOpts {
                        clipboard_page: true,
                        ..Default::default()
                    },
                ),
            ),
        ];
        let machine = compile(&commands).expect("should compile");
        // every command id must still be reachable as an accept tag
        let accepts: Vec<CommandId> = machine
            .states()
            .iter()
            .filter_map(|s| s.accept)
            .collect();
        assert!(accepts.contains(&0));
        assert!(accepts.contains(&1));
    }

    #[test]
    fn captured_count_digits_fire_markers() {
        let commands = vec![(
            0u32,
            cmd_expr("w", None, CmdOpts {
                count: true,
                ..Default::default()
            }),
        )];
        let machine = compile(&commands).unwrap();
        let has_verb_count_marker = machine.states().iter().any(|s| {
            s.transitions
                .iter()
                .any(|t| t.markers.iter().any(|m| m.id == CaptureId::VerbCount))
        });
        assert!(has_verb_count_marker);
    }
}
