//! Search mode (§4.5): incremental `/`/`?` pattern entry. Every printable
//! rune extends the live pattern, `Enter` commits, `Escape` cancels, and
//! `Ctrl-r`/`Ctrl-p` step backward through search history (kept as two
//! aliases, like `vim`'s own search-command-line bindings).

use vir_events::KeyClass;
use vir_expr::{insert_char, key_expr};

use crate::action::ActionKind;
use crate::{CommandSpec, RecordFlags};

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "search-commit".into(),
            pattern: key_expr(KeyClass::Enter),
            max_count: 1,
            kind: ActionKind::SearchCommit,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "search-cancel".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::SearchCancel,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "search-history-prev-ctrl-r".into(),
            pattern: key_expr(KeyClass::CtrlR),
            max_count: 1,
            kind: ActionKind::SearchHistoryPrev,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "search-history-prev-ctrl-p".into(),
            pattern: key_expr(KeyClass::CtrlP),
            max_count: 1,
            kind: ActionKind::SearchHistoryPrev,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "search-input".into(),
            pattern: insert_char(),
            max_count: 1,
            kind: ActionKind::SearchInput,
            record: RecordFlags::NONE,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_input_is_last_so_named_keys_win_ties() {
        let cmds = commands();
        assert_eq!(cmds.last().unwrap().name, "search-input");
    }

    #[test]
    fn both_history_aliases_share_the_same_action() {
        let cmds = commands();
        let r = cmds
            .iter()
            .find(|c| c.name == "search-history-prev-ctrl-r")
            .unwrap();
        let p = cmds
            .iter()
            .find(|c| c.name == "search-history-prev-ctrl-p")
            .unwrap();
        assert_eq!(r.kind, p.kind);
    }
}
