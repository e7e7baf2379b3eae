//! Insert mode (§4.5): every printable rune is `insert-rune`; `Enter`,
//! `Tab`, `Backspace`/`Backspace2`, and `Escape` each have their own
//! dedicated named-key command.

use vir_events::KeyClass;
use vir_expr::{insert_char, key_expr};

use crate::action::ActionKind;
use crate::{CommandSpec, RecordFlags};

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "insert-newline-with-autoindent".into(),
            pattern: key_expr(KeyClass::Enter),
            max_count: 1,
            kind: ActionKind::InsertNewlineAutoindent,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "insert-tab".into(),
            pattern: key_expr(KeyClass::Tab),
            max_count: 1,
            kind: ActionKind::InsertTab,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "insert-delete-backward".into(),
            pattern: key_expr(KeyClass::Backspace),
            max_count: 1,
            kind: ActionKind::InsertDeleteBackward,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "insert-delete-backward-2".into(),
            pattern: key_expr(KeyClass::Backspace2),
            max_count: 1,
            kind: ActionKind::InsertDeleteBackward,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "insert-exit-to-normal".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::ExitToNormal,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "insert-rune".into(),
            pattern: insert_char(),
            max_count: 1,
            kind: ActionKind::InsertRune,
            record: RecordFlags::EDIT,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rune_is_last_so_named_keys_win_ties() {
        let cmds = commands();
        // `vir-compile` tie-breaks by list order; named keys must precede
        // the catch-all rune range so Enter/Tab/Backspace don't collide
        // with it (they're disjoint event classes anyway, but order still
        // documents intent).
        assert_eq!(cmds.last().unwrap().name, "insert-rune");
    }
}
