//! Compiler (C3): turns a mode's `(CommandId, Expr)` list into an
//! immutable, verified [`Machine`] (§4.3), and serializes/deserializes that
//! machine to the §6 byte format so `vir-dispatch`'s build script can embed
//! one compiled machine per mode in the binary.

mod compiler;
mod error;
mod machine;
mod nfa;
mod serialize;

pub use compiler::compile;
pub use error::{DeserializeError, GrammarError};
pub use machine::{CaptureMarker, CommandId, Guard, Machine, MarkerKind, StateData, StateId, Transition};
pub use serialize::{deserialize, serialize};
