//! Shared cursor-movement command list. Normal and visual mode each
//! prepend a *fresh* copy — never one `Vec` aliased across both tables,
//! since the compiler assigns command ids by a table's position and needs
//! them stable per mode.

use vir_events::KeyClass;
use vir_expr::{key_expr, rune_expr, verb_count_then};

use crate::action::{ActionKind, MotionKind};
use crate::{CommandSpec, RecordFlags};

const DEFAULT_MOTION_CAP: u64 = 1024;

fn motion(name: &'static str, pattern: vir_expr::Expr, kind: MotionKind, max_count: u64) -> CommandSpec {
    CommandSpec {
        name: name.to_string(),
        pattern,
        max_count,
        kind: ActionKind::Motion(kind),
        record: RecordFlags::NONE,
    }
}

/// Fresh every call (§9): `vir-commands::modes::normal` and
/// `vir-commands::modes::visual` each call this once and own their own
/// `Vec`.
pub fn cursor_commands() -> Vec<CommandSpec> {
    vec![
        motion(
            "cursor-left",
            verb_count_then(rune_expr('h')),
            MotionKind::Left,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "cursor-right",
            verb_count_then(rune_expr('l')),
            MotionKind::Right,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "cursor-up",
            verb_count_then(rune_expr('k')),
            MotionKind::Up,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "cursor-down",
            verb_count_then(rune_expr('j')),
            MotionKind::Down,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "cursor-left-arrow",
            key_expr(KeyClass::Left),
            MotionKind::Left,
            1,
        ),
        motion(
            "cursor-right-arrow",
            key_expr(KeyClass::Right),
            MotionKind::Right,
            1,
        ),
        motion(
            "cursor-up-arrow",
            key_expr(KeyClass::Up),
            MotionKind::Up,
            1,
        ),
        motion(
            "cursor-down-arrow",
            key_expr(KeyClass::Down),
            MotionKind::Down,
            1,
        ),
        motion(
            "word-forward",
            verb_count_then(rune_expr('w')),
            MotionKind::WordForward,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "word-backward",
            verb_count_then(rune_expr('b')),
            MotionKind::WordBackward,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "word-end-forward",
            verb_count_then(rune_expr('e')),
            MotionKind::WordEndForward,
            DEFAULT_MOTION_CAP,
        ),
        // '0' is deliberately bare (§4.2 `opt_count` note): a leading
        // digit is always consumed as a count prefix first, so an
        // unprefixed '0' keystroke can only ever mean cursor-line-start.
        motion("cursor-line-start", rune_expr('0'), MotionKind::LineStart, 1),
        motion(
            "cursor-first-non-blank",
            verb_count_then(rune_expr('^')),
            MotionKind::FirstNonBlank,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "cursor-line-end",
            verb_count_then(rune_expr('$')),
            MotionKind::LineEnd,
            DEFAULT_MOTION_CAP,
        ),
        motion(
            "goto-line",
            verb_count_then(vir_expr::concat(vec![rune_expr('g'), rune_expr('g')])),
            MotionKind::GotoFirstLine,
            0,
        ),
        motion(
            "goto-last-line",
            verb_count_then(rune_expr('G')),
            MotionKind::GotoLastLine,
            0,
        ),
        motion(
            "half-page-down",
            key_expr(KeyClass::CtrlD),
            MotionKind::HalfPageDown,
            1,
        ),
        motion(
            "half-page-up",
            key_expr(KeyClass::CtrlU),
            MotionKind::HalfPageUp,
            1,
        ),
        motion(
            "page-forward",
            key_expr(KeyClass::CtrlF),
            MotionKind::PageForward,
            1,
        ),
        motion(
            "page-backward",
            key_expr(KeyClass::CtrlB),
            MotionKind::PageBackward,
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_a_fresh_vec_each_call() {
        let a = cursor_commands();
        let b = cursor_commands();
        assert_eq!(a.len(), b.len());
        assert!(!a.is_empty());
    }

    #[test]
    fn bare_zero_has_no_count_cap_above_one() {
        let zero = cursor_commands()
            .into_iter()
            .find(|c| c.name == "cursor-line-start")
            .unwrap();
        assert_eq!(zero.max_count, 1);
    }
}
