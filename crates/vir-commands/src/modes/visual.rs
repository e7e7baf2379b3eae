//! Visual mode (char/line/block, §4.5): shares the normal-mode cursor list
//! verbatim (a fresh copy per §9), adds selection operators (no motion
//! capture needed — the selection bound is already known), text-object
//! selection, indent/outdent, and the three mode toggles plus `Escape`.

use vir_events::KeyClass;
use vir_expr::{concat, key_expr, rune_expr};

use crate::action::{ActionKind, OperatorKind, TextObjectKind, VisualKind};
use crate::{shared, CommandSpec, RecordFlags};

/// Reparsing a whole selection for indent/outdent is expensive; capped
/// far lower than the generic operator cap (§4.5).
const INDENT_CAP: u64 = 32;

const TEXT_OBJECTS: &[(char, TextObjectKind, &str)] = &[
    ('w', TextObjectKind::Word, "word"),
    ('(', TextObjectKind::Paren, "paren"),
    ('{', TextObjectKind::Brace, "brace"),
    ('[', TextObjectKind::Bracket, "bracket"),
    ('"', TextObjectKind::DoubleQuote, "double-quote"),
    ('\'', TextObjectKind::SingleQuote, "single-quote"),
];

fn select(obj_char: char, object: TextObjectKind, object_name: &str, inner: bool) -> CommandSpec {
    let selector = if inner { 'i' } else { 'a' };
    CommandSpec {
        name: format!(
            "select-{}-{object_name}",
            if inner { "inner" } else { "around" }
        ),
        pattern: concat(vec![rune_expr(selector), rune_expr(obj_char)]),
        max_count: 1,
        kind: ActionKind::VisualTextObject(object, inner),
        record: RecordFlags::NONE,
    }
}

pub fn commands() -> Vec<CommandSpec> {
    let mut cmds = shared::cursor_commands();

    for &(ch, object, name) in TEXT_OBJECTS {
        cmds.push(select(ch, object, name, true));
        cmds.push(select(ch, object, name, false));
    }

    cmds.extend([
        CommandSpec {
            name: "visual-delete".into(),
            pattern: rune_expr('d'),
            max_count: 1,
            kind: ActionKind::VisualOperator(OperatorKind::Delete),
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "visual-yank".into(),
            pattern: rune_expr('y'),
            max_count: 1,
            kind: ActionKind::VisualOperator(OperatorKind::Yank),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "visual-change".into(),
            pattern: rune_expr('c'),
            max_count: 1,
            kind: ActionKind::VisualOperator(OperatorKind::Change),
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "visual-indent".into(),
            pattern: vir_expr::verb_count_then(rune_expr('>')),
            max_count: INDENT_CAP,
            kind: ActionKind::IndentSelection { outdent: false },
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "visual-outdent".into(),
            pattern: vir_expr::verb_count_then(rune_expr('<')),
            max_count: INDENT_CAP,
            kind: ActionKind::IndentSelection { outdent: true },
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "visual-toggle-char".into(),
            pattern: rune_expr('v'),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Char),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "visual-toggle-line".into(),
            pattern: rune_expr('V'),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Line),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "visual-toggle-block".into(),
            pattern: key_expr(KeyClass::CtrlV),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Block),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "visual-exit".into(),
            pattern: key_expr(KeyClass::Escape),
            max_count: 1,
            kind: ActionKind::ExitToNormal,
            record: RecordFlags::NONE,
        },
    ]);

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_inner_word_exists_with_default_count() {
        let cmds = commands();
        let iw = cmds.iter().find(|c| c.name == "select-inner-word").unwrap();
        assert_eq!(iw.max_count, 1);
    }

    #[test]
    fn no_duplicate_command_names() {
        let cmds = commands();
        let mut names: Vec<&str> = cmds.iter().map(|c| c.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
