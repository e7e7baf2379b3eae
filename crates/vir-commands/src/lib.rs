//! Command tables (C5) and argument extraction (C6): per-mode command
//! rosters, the shared cursor-movement helper, and the glue types
//! (`Ctx`, `Params`, `Action`) that carry a recognized command's
//! arguments out to the host (§4.5, §4.6, §6).

mod action;
pub mod args;
pub mod modes;
pub mod shared;

pub use action::{
    build_action, Action, ActionKind, Direction, MotionKind, OperatorKind, TextObjectKind,
    VisualKind,
};

use vir_expr::Expr;

/// The seven input modes the editor recognizes commands in (§1, §GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
    Menu,
    Search,
    Task,
    TextField,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Normal,
        Mode::Insert,
        Mode::Visual,
        Mode::Menu,
        Mode::Search,
        Mode::Task,
        Mode::TextField,
    ];

    /// A short, stable name used for the embedded machine file per mode
    /// (`vir-dispatch/build.rs`) and in startup diagnostics (§7).
    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Visual => "visual",
            Mode::Menu => "menu",
            Mode::Search => "search",
            Mode::Task => "task",
            Mode::TextField => "text_field",
        }
    }
}

/// Which of the three visual sub-modes is active (§4.5 "Visual mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    #[default]
    Char,
    Line,
    Block,
}

/// The clipboard register a yank/paste/delete targets (§4.6). `Null` is
/// used by insert-mode deletes that must not clobber the user's default
/// clipboard (§4.6 "clipboard-page").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClipboardPage {
    #[default]
    Default,
    Null,
    Letter(char),
}

/// An opaque buffer location, forwarded verbatim by the recognizer (§6):
/// it never inspects or computes one, only passes the host's locator
/// through to an `Action`'s consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Host-supplied context threaded through to every action builder (§6
/// "Host → recognizer"). `selection_end` is an opaque locator the
/// recognizer only forwards; it never calls it itself.
pub struct Ctx {
    pub mode: Mode,
    pub scroll_lines: u16,
    pub hide_patterns: Vec<String>,
    pub selection_mode: SelectionMode,
    pub selection_end: Box<dyn Fn() -> Option<Position> + Send + Sync>,
}

impl Ctx {
    /// A context with no selection locator, useful for modes where no
    /// selection is active (normal/insert/menu/search/task/text-field).
    pub fn new(mode: Mode) -> Self {
        Ctx {
            mode,
            scroll_lines: 0,
            hide_patterns: Vec::new(),
            selection_mode: SelectionMode::default(),
            selection_end: Box::new(|| None),
        }
    }
}

/// Typed command arguments extracted from an accept's captures (§4.6, §6
/// "Command-to-action"). `count` defaults to `1`; the rune fields default
/// to the `\0` sentinel when their capture was absent (a command whose
/// pattern never captures `match_char` simply never reads it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub count: u64,
    pub clipboard_page: ClipboardPage,
    pub match_char: char,
    pub replace_char: char,
    pub insert_char: char,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            count: 1,
            clipboard_page: ClipboardPage::Default,
            match_char: '\0',
            replace_char: '\0',
            insert_char: '\0',
        }
    }
}

/// Whether an accepted command should be recorded for macro playback
/// and/or as the target of the `.` repeat command (§9 "Recording for
/// macros / `.` repeat"). A free-form annotation on the command record;
/// the recognizer does not interpret it beyond carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFlags {
    pub user_macro: bool,
    pub repeat: bool,
}

impl RecordFlags {
    pub const NONE: RecordFlags = RecordFlags {
        user_macro: false,
        repeat: false,
    };

    pub const EDIT: RecordFlags = RecordFlags {
        user_macro: true,
        repeat: true,
    };
}

/// One entry in a mode's command table (§3 "Command record", §4.5). The
/// automaton's `CommandId` is this record's index in the `Vec` a mode's
/// `commands()` function returns — order is significant both for id
/// assignment and as the compiler's ambiguity tie-break.
pub struct CommandSpec {
    /// Debug-only name, never shown to the user. Owned because several
    /// families of commands (operator × text-object, see `modes::normal`)
    /// generate their names programmatically.
    pub name: String,
    pub pattern: Expr,
    /// `0` means unbounded (§4.5).
    pub max_count: u64,
    pub kind: ActionKind,
    pub record: RecordFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_name_is_stable_and_unique() {
        let mut names: Vec<&str> = Mode::ALL.iter().map(|m| m.name()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn params_default_count_is_one_and_chars_are_nul() {
        let p = Params::default();
        assert_eq!(p.count, 1);
        assert_eq!(p.match_char, '\0');
        assert_eq!(p.clipboard_page, ClipboardPage::Default);
    }
}
