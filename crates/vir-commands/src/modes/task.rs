//! Task mode (§4.5): a blocking yes/no confirmation (e.g. "overwrite
//! file?"). `y` confirms, `n` and `Escape` both decline.

use vir_events::KeyClass;
use vir_expr::{key_expr, rune_expr};

use crate::action::ActionKind;
use crate::{CommandSpec, RecordFlags};

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "task-confirm-yes".into(),
            pattern: rune_expr('y'),
            max_count: 1,
            kind: ActionKind::TaskConfirm(true),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "task-confirm-no".into(),
            pattern: rune_expr('n'),
            max_count: 1,
            kind: ActionKind::TaskConfirm(false),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "task-cancel".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::TaskCancel,
            record: RecordFlags::NONE,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_three_commands() {
        assert_eq!(commands().len(), 3);
    }
}
