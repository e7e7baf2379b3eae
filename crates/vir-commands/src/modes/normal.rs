//! Normal mode (§4.5): cursor motion (via `shared::cursor_commands`),
//! operators, operator+motion and operator+text-object compounds, paste,
//! undo/redo, find-char family, replace, visual entry, search entry,
//! command-line entry, and the `.` repeat command.

use vir_events::KeyClass;
use vir_expr::{cmd_expr, key_expr, rune_expr, CmdOpts};

use crate::action::{ActionKind, MotionKind, OperatorKind, TextObjectKind, VisualKind};
use crate::{shared, CommandSpec, RecordFlags};

const OPERATOR_CAP: u64 = 1024;
const FIND_CAP: u64 = 1024;
const GOTO_CAP: u64 = 0; // unbounded (§4.5, scenario 5)

fn op_char(op: OperatorKind) -> char {
    match op {
        OperatorKind::Delete => 'd',
        OperatorKind::Yank => 'y',
        OperatorKind::Change => 'c',
    }
}

fn op_name(op: OperatorKind) -> &'static str {
    match op {
        OperatorKind::Delete => "delete",
        OperatorKind::Yank => "yank",
        OperatorKind::Change => "change",
    }
}

const MOTION_SUFFIXES: &[(char, MotionKind, &str)] = &[
    ('w', MotionKind::WordForward, "word-forward"),
    ('b', MotionKind::WordBackward, "word-backward"),
    ('e', MotionKind::WordEndForward, "word-end-forward"),
    ('$', MotionKind::LineEnd, "line-end"),
    ('0', MotionKind::LineStart, "line-start"),
    ('^', MotionKind::FirstNonBlank, "first-non-blank"),
];

const TEXT_OBJECTS: &[(char, TextObjectKind, &str)] = &[
    ('w', TextObjectKind::Word, "word"),
    ('(', TextObjectKind::Paren, "paren"),
    (')', TextObjectKind::Paren, "paren"),
    ('{', TextObjectKind::Brace, "brace"),
    ('}', TextObjectKind::Brace, "brace"),
    ('[', TextObjectKind::Bracket, "bracket"),
    (']', TextObjectKind::Bracket, "bracket"),
    ('<', TextObjectKind::Angle, "angle"),
    ('>', TextObjectKind::Angle, "angle"),
    ('\'', TextObjectKind::SingleQuote, "single-quote"),
    ('"', TextObjectKind::DoubleQuote, "double-quote"),
    ('`', TextObjectKind::Backtick, "backtick"),
    ('p', TextObjectKind::Paragraph, "paragraph"),
];

/// Operator fully doubled (`dd`, `yy`, `cc`): linewise, with verb-count and
/// object-count both in play (`3d2d` deletes six lines, same
/// multiplication rule as any other compound, §4.2).
fn linewise(op: OperatorKind) -> CommandSpec {
    let c = op_char(op);
    let object = c.to_string();
    CommandSpec {
        name: format!("{}-line", op_name(op)),
        pattern: cmd_expr(
            &c.to_string(),
            Some(&object),
            CmdOpts {
                count: true,
                clipboard_page: true,
                ..Default::default()
            },
        ),
        max_count: OPERATOR_CAP,
        kind: ActionKind::LinewiseOperator(op),
        record: RecordFlags::EDIT,
    }
}

/// `{op}{motion}` compounds: `dw`, `d$`, `y^`, …
fn operator_motion(op: OperatorKind, motion_char: char, motion: MotionKind, motion_name: &str) -> CommandSpec {
    CommandSpec {
        name: format!("{}-{motion_name}", op_name(op)),
        pattern: cmd_expr(
            &op_char(op).to_string(),
            Some(&motion_char.to_string()),
            CmdOpts {
                count: true,
                clipboard_page: true,
                ..Default::default()
            },
        ),
        max_count: OPERATOR_CAP,
        kind: ActionKind::OperatorMotion(op, motion),
        record: RecordFlags::EDIT,
    }
}

/// `{op}i{obj}` / `{op}a{obj}` compounds: `di(`, `daw`, `ci"`, …
fn operator_text_object(
    op: OperatorKind,
    inner: bool,
    obj_char: char,
    object: TextObjectKind,
    object_name: &str,
) -> CommandSpec {
    let selector = if inner { 'i' } else { 'a' };
    let object_token = format!("{selector}{obj_char}");
    CommandSpec {
        name: format!(
            "{}-{}-{object_name}-{obj_char}",
            op_name(op),
            if inner { "inner" } else { "around" }
        ),
        pattern: cmd_expr(
            &op_char(op).to_string(),
            Some(&object_token),
            CmdOpts {
                count: true,
                clipboard_page: true,
                ..Default::default()
            },
        ),
        max_count: OPERATOR_CAP,
        kind: ActionKind::OperatorTextObject(op, object, inner),
        record: RecordFlags::EDIT,
    }
}

pub fn commands() -> Vec<CommandSpec> {
    let mut cmds = shared::cursor_commands();

    for &op in &[OperatorKind::Delete, OperatorKind::Yank, OperatorKind::Change] {
        cmds.push(linewise(op));
        for &(ch, motion, motion_name) in MOTION_SUFFIXES {
            cmds.push(operator_motion(op, ch, motion, motion_name));
        }
        for &(ch, object, object_name) in TEXT_OBJECTS {
            cmds.push(operator_text_object(op, true, ch, object, object_name));
            cmds.push(operator_text_object(op, false, ch, object, object_name));
        }
    }

    cmds.extend([
        CommandSpec {
            name: "delete-under-cursor".into(),
            pattern: cmd_expr(
                "x",
                None,
                CmdOpts {
                    count: true,
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: OPERATOR_CAP,
            kind: ActionKind::DeleteUnderCursor,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "delete-before-cursor".into(),
            pattern: cmd_expr(
                "X",
                None,
                CmdOpts {
                    count: true,
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: OPERATOR_CAP,
            kind: ActionKind::DeleteBeforeCursor,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "delete-to-line-end".into(),
            pattern: cmd_expr(
                "D",
                None,
                CmdOpts {
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: 1,
            kind: ActionKind::OperatorToLineEnd(OperatorKind::Delete),
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "change-to-line-end".into(),
            pattern: cmd_expr(
                "C",
                None,
                CmdOpts {
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: 1,
            kind: ActionKind::OperatorToLineEnd(OperatorKind::Change),
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "paste-after-cursor".into(),
            pattern: cmd_expr(
                "p",
                None,
                CmdOpts {
                    count: true,
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: OPERATOR_CAP,
            kind: ActionKind::PasteAfter,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "paste-before-cursor".into(),
            pattern: cmd_expr(
                "P",
                None,
                CmdOpts {
                    count: true,
                    clipboard_page: true,
                    ..Default::default()
                },
            ),
            max_count: OPERATOR_CAP,
            kind: ActionKind::PasteBefore,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "undo".into(),
            pattern: cmd_expr("u", None, CmdOpts { count: true, ..Default::default() }),
            max_count: OPERATOR_CAP,
            kind: ActionKind::Undo,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "redo".into(),
            pattern: vir_expr::verb_count_then(key_expr(KeyClass::CtrlR)),
            max_count: OPERATOR_CAP,
            kind: ActionKind::Redo,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-insert".into(),
            pattern: rune_expr('i'),
            max_count: 1,
            kind: ActionKind::EnterInsert,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-visual-char".into(),
            pattern: rune_expr('v'),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Char),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-visual-line".into(),
            pattern: rune_expr('V'),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Line),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-visual-block".into(),
            pattern: key_expr(KeyClass::CtrlV),
            max_count: 1,
            kind: ActionKind::EnterVisual(VisualKind::Block),
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "find-char-forward".into(),
            pattern: cmd_expr(
                "f",
                None,
                CmdOpts {
                    count: true,
                    match_char: true,
                    ..Default::default()
                },
            ),
            max_count: FIND_CAP,
            kind: ActionKind::FindChar {
                forward: true,
                till: false,
            },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "find-char-backward".into(),
            pattern: cmd_expr(
                "F",
                None,
                CmdOpts {
                    count: true,
                    match_char: true,
                    ..Default::default()
                },
            ),
            max_count: FIND_CAP,
            kind: ActionKind::FindChar {
                forward: false,
                till: false,
            },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "till-char-forward".into(),
            pattern: cmd_expr(
                "t",
                None,
                CmdOpts {
                    count: true,
                    match_char: true,
                    ..Default::default()
                },
            ),
            max_count: FIND_CAP,
            kind: ActionKind::FindChar {
                forward: true,
                till: true,
            },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "till-char-backward".into(),
            pattern: cmd_expr(
                "T",
                None,
                CmdOpts {
                    count: true,
                    match_char: true,
                    ..Default::default()
                },
            ),
            max_count: FIND_CAP,
            kind: ActionKind::FindChar {
                forward: false,
                till: true,
            },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "repeat-find-forward".into(),
            pattern: vir_expr::verb_count_then(rune_expr(';')),
            max_count: FIND_CAP,
            kind: ActionKind::RepeatFind { reverse: false },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "repeat-find-backward".into(),
            pattern: vir_expr::verb_count_then(rune_expr(',')),
            max_count: FIND_CAP,
            kind: ActionKind::RepeatFind { reverse: true },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "replace-char".into(),
            pattern: cmd_expr(
                "r",
                None,
                CmdOpts {
                    replace_char: true,
                    ..Default::default()
                },
            ),
            max_count: 1,
            kind: ActionKind::ReplaceChar,
            record: RecordFlags::EDIT,
        },
        CommandSpec {
            name: "enter-search-forward".into(),
            pattern: rune_expr('/'),
            max_count: 1,
            kind: ActionKind::EnterSearch { forward: true },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-search-backward".into(),
            pattern: rune_expr('?'),
            max_count: 1,
            kind: ActionKind::EnterSearch { forward: false },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "repeat-search-forward".into(),
            pattern: vir_expr::verb_count_then(rune_expr('n')),
            max_count: OPERATOR_CAP,
            kind: ActionKind::RepeatSearch { reverse: false },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "repeat-search-backward".into(),
            pattern: vir_expr::verb_count_then(rune_expr('N')),
            max_count: OPERATOR_CAP,
            kind: ActionKind::RepeatSearch { reverse: true },
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "repeat-last-action".into(),
            pattern: rune_expr('.'),
            max_count: 1,
            kind: ActionKind::RepeatLastAction,
            record: RecordFlags::NONE,
        },
        CommandSpec {
            name: "enter-command-line".into(),
            pattern: rune_expr(':'),
            max_count: 1,
            kind: ActionKind::Forward,
            record: RecordFlags::NONE,
        },
    ]);

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dd_is_present_with_unbounded_placeholder_cap() {
        let cmds = commands();
        assert!(cmds.iter().any(|c| c.name == "delete-line"));
    }

    #[test]
    fn goto_line_comes_from_shared_cursor_commands_unbounded() {
        let cmds = commands();
        let goto = cmds.iter().find(|c| c.name == "goto-line").unwrap();
        assert_eq!(goto.max_count, GOTO_CAP);
    }

    #[test]
    fn find_char_forward_caps_at_1024() {
        let cmds = commands();
        let f = cmds.iter().find(|c| c.name == "find-char-forward").unwrap();
        assert_eq!(f.max_count, 1024);
    }

    #[test]
    fn no_duplicate_command_names() {
        let cmds = commands();
        let mut names: Vec<&str> = cmds.iter().map(|c| c.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before, "duplicate command name in normal mode table");
    }
}
