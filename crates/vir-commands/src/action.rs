//! The `Action` sum type (§9 "Closures as actions" — the first, inspectable
//! alternative). Each [`crate::CommandSpec`] carries a data-only
//! [`ActionKind`] template; [`build_action`] is the single place that
//! combines a template with the extracted [`crate::Params`] and the
//! dispatcher's [`crate::Ctx`] into the concrete [`Action`] value the host
//! applies to editor state. The recognizer never calls this itself beyond
//! producing the value (§1 "Non-goals").

use crate::{ClipboardPage, Ctx, Params};

/// Cursor-movement and jump kinds shared by normal and visual mode
/// (`vir-commands::shared::cursor_commands`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    WordEndForward,
    LineStart,
    FirstNonBlank,
    LineEnd,
    GotoLine,
    GotoFirstLine,
    GotoLastLine,
    HalfPageDown,
    HalfPageUp,
    PageForward,
    PageBackward,
}

/// The three operators that combine with a motion or text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Delete,
    Yank,
    Change,
}

/// Text objects addressable by `i{obj}` / `a{obj}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextObjectKind {
    Word,
    Paren,
    Brace,
    Bracket,
    Angle,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Sentence,
    Paragraph,
}

/// Visual sub-mode a `v`/`V`/`Ctrl-v` keypress selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Char,
    Line,
    Block,
}

/// Direction for menu navigation and text-field cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// The data-only template stored on a [`crate::CommandSpec`]. Distinct from
/// [`Action`] because it never carries the per-invocation `count` /
/// `clipboard_page` / rune fields — those live in [`Params`] and are
/// merged in by [`build_action`] at accept time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Motion(MotionKind),
    LinewiseOperator(OperatorKind),
    OperatorMotion(OperatorKind, MotionKind),
    OperatorTextObject(OperatorKind, TextObjectKind, bool),
    OperatorToLineEnd(OperatorKind),
    PasteAfter,
    PasteBefore,
    Undo,
    Redo,
    DeleteUnderCursor,
    DeleteBeforeCursor,
    EnterInsert,
    ExitToNormal,
    InsertRune,
    InsertNewlineAutoindent,
    InsertTab,
    InsertDeleteBackward,
    FindChar { forward: bool, till: bool },
    RepeatFind { reverse: bool },
    ReplaceChar,
    EnterVisual(VisualKind),
    VisualOperator(OperatorKind),
    VisualTextObject(TextObjectKind, bool),
    IndentSelection { outdent: bool },
    RepeatLastAction,
    EnterCommandLine,
    EnterSearch { forward: bool },
    RepeatSearch { reverse: bool },
    MenuMove(Direction),
    MenuConfirm,
    MenuFilterInput,
    MenuCancel,
    SearchCommit,
    SearchCancel,
    SearchInput,
    SearchHistoryPrev,
    TaskConfirm(bool),
    TaskCancel,
    TextFieldCommit,
    TextFieldCancel,
    TextFieldInput,
    TextFieldDeleteBackward,
    TextFieldMove(Direction),
    /// Any keypress the grammar recognizes but that the recognizer itself
    /// does not act on beyond identifying it (`:`, bracketed-paste body
    /// delivered as a side-channel, §6).
    Forward,
}

/// A concrete, fully-resolved command outcome, ready for the host to apply
/// to editor state. The recognizer hands this back from
/// [`crate::ModeTable`]/`vir-dispatch::Dispatcher::process_key` without
/// ever invoking it itself (§1).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Noop,
    ErrorStatus(String),
    Motion {
        motion: MotionKind,
        count: u64,
    },
    Operator {
        op: OperatorKind,
        motion: Option<MotionKind>,
        text_object: Option<TextObjectKind>,
        inner: bool,
        count: u64,
        clipboard_page: ClipboardPage,
    },
    PasteAfter {
        clipboard_page: ClipboardPage,
        count: u64,
    },
    PasteBefore {
        clipboard_page: ClipboardPage,
        count: u64,
    },
    Undo {
        count: u64,
    },
    Redo {
        count: u64,
    },
    DeleteUnderCursor {
        clipboard_page: ClipboardPage,
        count: u64,
    },
    DeleteBeforeCursor {
        clipboard_page: ClipboardPage,
        count: u64,
    },
    EnterInsert,
    ExitToNormal,
    InsertRune(char),
    InsertNewlineAutoindent,
    InsertTab,
    InsertDeleteBackward,
    FindChar {
        forward: bool,
        till: bool,
        target: char,
        count: u64,
    },
    RepeatFind {
        reverse: bool,
        count: u64,
    },
    ReplaceChar {
        replacement: char,
        count: u64,
    },
    EnterVisual(VisualKind),
    VisualOperator {
        op: OperatorKind,
        clipboard_page: ClipboardPage,
    },
    VisualTextObject {
        object: TextObjectKind,
        inner: bool,
    },
    IndentSelection {
        outdent: bool,
        count: u64,
    },
    RepeatLastAction,
    EnterCommandLine,
    EnterSearch {
        forward: bool,
    },
    RepeatSearch {
        reverse: bool,
    },
    MenuMove(Direction),
    MenuConfirm,
    MenuFilterInput(char),
    MenuCancel,
    SearchCommit,
    SearchCancel,
    SearchInput(char),
    SearchHistoryPrev,
    TaskConfirm(bool),
    TaskCancel,
    TextFieldCommit,
    TextFieldCancel,
    TextFieldInput(char),
    TextFieldDeleteBackward,
    TextFieldMove(Direction),
    /// Pass-through for `:` (§6): the recognizer identifies the keypress,
    /// the host owns what happens next.
    Forward,
    /// Bracketed-paste body delivered as a side-channel (§6), bypassing the
    /// runtime entirely: `vir-dispatch` hands the pasted text back as-is
    /// for insert/menu/search modes to insert "as if typed".
    Paste(String),
    /// Terminal resize, answered by `vir-dispatch::Dispatcher::process_resize`
    /// without ever touching a `Runtime` (§4.7 [NEW]).
    Resize { width: u16, height: u16 },
}

/// Merges an [`ActionKind`] template with extracted [`Params`] (and, where
/// a command needs it, `ctx`) into the final [`Action`] the host applies.
/// This is the sole action builder; every command in every mode's table
/// funnels through it.
pub fn build_action(kind: ActionKind, _ctx: &Ctx, params: &Params) -> Action {
    match kind {
        ActionKind::Motion(motion) => Action::Motion {
            motion,
            count: params.count,
        },
        ActionKind::LinewiseOperator(op) => Action::Operator {
            op,
            motion: None,
            text_object: None,
            inner: false,
            count: params.count,
            clipboard_page: params.clipboard_page,
        },
        ActionKind::OperatorMotion(op, motion) => Action::Operator {
            op,
            motion: Some(motion),
            text_object: None,
            inner: false,
            count: params.count,
            clipboard_page: params.clipboard_page,
        },
        ActionKind::OperatorTextObject(op, object, inner) => Action::Operator {
            op,
            motion: None,
            text_object: Some(object),
            inner,
            count: params.count,
            clipboard_page: params.clipboard_page,
        },
        ActionKind::OperatorToLineEnd(op) => Action::Operator {
            op,
            motion: Some(MotionKind::LineEnd),
            text_object: None,
            inner: false,
            count: 1,
            clipboard_page: params.clipboard_page,
        },
        ActionKind::PasteAfter => Action::PasteAfter {
            clipboard_page: params.clipboard_page,
            count: params.count,
        },
        ActionKind::PasteBefore => Action::PasteBefore {
            clipboard_page: params.clipboard_page,
            count: params.count,
        },
        ActionKind::Undo => Action::Undo {
            count: params.count,
        },
        ActionKind::Redo => Action::Redo {
            count: params.count,
        },
        ActionKind::DeleteUnderCursor => Action::DeleteUnderCursor {
            clipboard_page: params.clipboard_page,
            count: params.count,
        },
        ActionKind::DeleteBeforeCursor => Action::DeleteBeforeCursor {
            clipboard_page: params.clipboard_page,
            count: params.count,
        },
        ActionKind::EnterInsert => Action::EnterInsert,
        ActionKind::ExitToNormal => Action::ExitToNormal,
        ActionKind::InsertRune => Action::InsertRune(params.insert_char),
        ActionKind::InsertNewlineAutoindent => Action::InsertNewlineAutoindent,
        ActionKind::InsertTab => Action::InsertTab,
        ActionKind::InsertDeleteBackward => Action::InsertDeleteBackward,
        ActionKind::FindChar { forward, till } => Action::FindChar {
            forward,
            till,
            target: params.match_char,
            count: params.count,
        },
        ActionKind::RepeatFind { reverse } => Action::RepeatFind {
            reverse,
            count: params.count,
        },
        ActionKind::ReplaceChar => Action::ReplaceChar {
            replacement: params.replace_char,
            count: params.count,
        },
        ActionKind::EnterVisual(kind) => Action::EnterVisual(kind),
        ActionKind::VisualOperator(op) => Action::VisualOperator {
            op,
            clipboard_page: params.clipboard_page,
        },
        ActionKind::VisualTextObject(object, inner) => Action::VisualTextObject { object, inner },
        ActionKind::IndentSelection { outdent } => Action::IndentSelection {
            outdent,
            count: params.count,
        },
        ActionKind::RepeatLastAction => Action::RepeatLastAction,
        ActionKind::EnterCommandLine => Action::EnterCommandLine,
        ActionKind::EnterSearch { forward } => Action::EnterSearch { forward },
        ActionKind::RepeatSearch { reverse } => Action::RepeatSearch { reverse },
        ActionKind::MenuMove(dir) => Action::MenuMove(dir),
        ActionKind::MenuConfirm => Action::MenuConfirm,
        ActionKind::MenuFilterInput => Action::MenuFilterInput(params.insert_char),
        ActionKind::MenuCancel => Action::MenuCancel,
        ActionKind::SearchCommit => Action::SearchCommit,
        ActionKind::SearchCancel => Action::SearchCancel,
        ActionKind::SearchInput => Action::SearchInput(params.insert_char),
        ActionKind::SearchHistoryPrev => Action::SearchHistoryPrev,
        ActionKind::TaskConfirm(yes) => Action::TaskConfirm(yes),
        ActionKind::TaskCancel => Action::TaskCancel,
        ActionKind::TextFieldCommit => Action::TextFieldCommit,
        ActionKind::TextFieldCancel => Action::TextFieldCancel,
        ActionKind::TextFieldInput => Action::TextFieldInput(params.insert_char),
        ActionKind::TextFieldDeleteBackward => Action::TextFieldDeleteBackward,
        ActionKind::TextFieldMove(dir) => Action::TextFieldMove(dir),
        ActionKind::Forward => Action::Forward,
    }
}
