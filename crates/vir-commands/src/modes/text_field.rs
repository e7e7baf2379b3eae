//! Text-field mode (§4.5): a single-line editable field (rename prompts,
//! `:`-line editing once forwarded to the host). `Enter` commits,
//! `Escape` cancels, `Backspace`/`Backspace2` delete backward,
//! `Left`/`Right` move the field cursor, and every other printable rune
//! is inserted at the cursor.

use vir_events::KeyClass;
use vir_expr::{insert_char, key_expr};

use crate::action::{ActionKind, Direction};
use crate::{CommandSpec, RecordFlags};

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "text-field-commit".into(),
            pattern: key_expr(KeyClass::Enter),
            max_count: 1,
            kind: ActionKind::TextFieldCommit,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-cancel".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::TextFieldCancel,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-delete-backward".into(),
            pattern: key_expr(KeyClass::Backspace),
            max_count: 1,
            kind: ActionKind::TextFieldDeleteBackward,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-delete-backward-2".into(),
            pattern: key_expr(KeyClass::Backspace2),
            max_count: 1,
            kind: ActionKind::TextFieldDeleteBackward,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-move-left".into(),
            pattern: key_expr(KeyClass::Left),
            max_count: 1,
            kind: ActionKind::TextFieldMove(Direction::Backward),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-move-right".into(),
            pattern: key_expr(KeyClass::Right),
            max_count: 1,
            kind: ActionKind::TextFieldMove(Direction::Forward),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "text-field-input".into(),
            pattern: insert_char(),
            max_count: 1,
            kind: ActionKind::TextFieldInput,
            record: RecordFlags::NONE,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_input_is_last_so_named_keys_win_ties() {
        let cmds = commands();
        assert_eq!(cmds.last().unwrap().name, "text-field-input");
    }

    #[test]
    fn both_backspace_variants_share_the_same_action() {
        let cmds = commands();
        let a = cmds
            .iter()
            .find(|c| c.name == "text-field-delete-backward")
            .unwrap();
        let b = cmds
            .iter()
            .find(|c| c.name == "text-field-delete-backward-2")
            .unwrap();
        assert_eq!(a.kind, b.kind);
    }
}
