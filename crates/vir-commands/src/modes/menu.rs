//! Menu mode (§4.5): fuzzy-picker navigation. `j`/`k` and the arrow keys
//! move the selection, `Ctrl-n`/`Ctrl-p` are the emacs-style aliases,
//! `Enter` confirms, `Escape` cancels, and any other printable rune feeds
//! the filter text incrementally.

use vir_events::KeyClass;
use vir_expr::{insert_char, key_expr, rune_expr};

use crate::action::{ActionKind, Direction};
use crate::{CommandSpec, RecordFlags};

fn mv(name: &str, pattern: vir_expr::Expr, dir: Direction) -> CommandSpec {
    CommandSpec {
        name: name.to_string(),
        pattern,
        max_count: 1,
        kind: ActionKind::MenuMove(dir),
        record: RecordFlags::NONE,
    }
}

pub fn commands() -> Vec<CommandSpec> {
    vec![
        mv("menu-down-j", rune_expr('j'), Direction::Forward),
        mv("menu-up-k", rune_expr('k'), Direction::Backward),
        mv(
            "menu-down-arrow",
            key_expr(KeyClass::Down),
            Direction::Forward,
        ),
        mv("menu-up-arrow", key_expr(KeyClass::Up), Direction::Backward),
        mv(
            "menu-down-ctrl-n",
            key_expr(KeyClass::CtrlN),
            Direction::Forward,
        ),
        mv(
            "menu-up-ctrl-p",
            key_expr(KeyClass::CtrlP),
            Direction::Backward,
        ),
        CommandSpec {
            name: "menu-confirm".into(),
            pattern: key_expr(KeyClass::Enter),
            max_count: 1,
            kind: ActionKind::MenuConfirm,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "menu-cancel".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::MenuCancel,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "menu-filter-input".into(),
            pattern: insert_char(),
            max_count: 1,
            kind: ActionKind::MenuFilterInput,
            record: RecordFlags::NONE,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_n_and_j_both_move_forward() {
        let cmds = commands();
        let j = cmds.iter().find(|c| c.name == "menu-down-j").unwrap();
        let ctrl_n = cmds.iter().find(|c| c.name == "menu-down-ctrl-n").unwrap();
        assert_eq!(j.kind, ActionKind::MenuMove(Direction::Forward));
        assert_eq!(ctrl_n.kind, ActionKind::MenuMove(Direction::Forward));
    }

    #[test]
    fn filter_input_is_last_so_named_keys_win_ties() {
        let cmds = commands();
        assert_eq!(cmds.last().unwrap().name, "menu-filter-input");
    }
}
