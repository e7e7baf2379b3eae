use thiserror::Error;

use crate::machine::CommandId;

/// Compile-time grammar errors (§4.3, §7). These are build-time failures —
/// a grammar that triggers one of these must not ship.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("commands {a} and {b} accept the same input with no tie-break available")]
    AmbiguousAccept { a: CommandId, b: CommandId },
    #[error("command {0} is unreachable after merging with earlier rules")]
    UnreachableCommand(CommandId),
    #[error("grammar exceeds the compiler's state cap ({0} states)")]
    TooManyStates(usize),
    #[error("grammar exceeds the compiler's transition cap ({0} transitions)")]
    TooManyTransitions(usize),
    #[error("pattern for command {0} can accept without consuming any event")]
    ZeroInputAccept(CommandId),
    #[error("compiled machine has no reachable initial transitions")]
    EmptyGrammar,
}

/// Errors returned while deserializing an embedded machine file (§6, §7).
/// Fatal at host startup — the caller aborts with a diagnostic naming the
/// mode whose machine failed to load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeserializeError {
    #[error("bad magic header")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("truncated machine file (needed {needed} bytes, have {have})")]
    Truncated { needed: usize, have: usize },
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("transition target {0} out of bounds")]
    TransitionTargetOutOfBounds(u32),
    #[error("transition marker range out of bounds")]
    MarkerRangeOutOfBounds,
    #[error("state transition range out of bounds")]
    StateTransitionRangeOutOfBounds,
    #[error("start state {0} out of bounds")]
    StartOutOfBounds(u32),
    #[error("unknown key class discriminant {0}")]
    UnknownKeyClass(u32),
    #[error("unknown capture id discriminant {0}")]
    UnknownCaptureId(u8),
}
