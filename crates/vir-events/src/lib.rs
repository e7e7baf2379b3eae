//! Event codec (C1): packs terminal key events into 64-bit automaton events.
//!
//! An [`Event`] places a [`KeyClass`] in the upper 32 bits and a value (a
//! Unicode scalar for [`KeyClass::Rune`], zero otherwise) in the lower 32
//! bits. The encoding is total and injective: two key presses compare equal
//! as events iff they carry the same class and value, and a single `u64`
//! compare is enough for the runtime and compiler to test equality or
//! membership in a contiguous range within one class.

use std::fmt;

/// Discriminant for the upper half of an [`Event`].
///
/// `Rune` is reserved class `0` and uses the full lower half for Unicode
/// scalars up to `U+10FFFF`; named keys never produce a rune value and never
/// share `Rune`'s discriminant, so a guard can always tell the two apart by
/// class alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum KeyClass {
    Rune = 0,
    Enter = 1,
    Tab = 2,
    Backspace = 3,
    Backspace2 = 4,
    Escape = 5,
    Delete = 6,
    Left = 7,
    Right = 8,
    Up = 9,
    Down = 10,
    CtrlU = 11,
    CtrlD = 12,
    CtrlF = 13,
    CtrlB = 14,
    CtrlR = 15,
    Lf = 16,
    /// Visual-block entry (`Ctrl-v`), alongside the other named `Ctrl-*`
    /// classes the visual-mode mode-toggle family needs.
    CtrlV = 17,
    CtrlN = 18,
    CtrlP = 19,
}

impl KeyClass {
    const ALL: [KeyClass; 20] = [
        KeyClass::Rune,
        KeyClass::Enter,
        KeyClass::Tab,
        KeyClass::Backspace,
        KeyClass::Backspace2,
        KeyClass::Escape,
        KeyClass::Delete,
        KeyClass::Left,
        KeyClass::Right,
        KeyClass::Up,
        KeyClass::Down,
        KeyClass::CtrlU,
        KeyClass::CtrlD,
        KeyClass::CtrlF,
        KeyClass::CtrlB,
        KeyClass::CtrlR,
        KeyClass::CtrlV,
        KeyClass::CtrlN,
        KeyClass::CtrlP,
        KeyClass::Lf,
    ];

    /// Reconstructs a class from its raw `u32` discriminant.
    ///
    /// Returns `None` for values that do not correspond to a known class;
    /// deserialization uses this to validate embedded machine files (§6).
    pub fn from_u32(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| *c as u32 == raw)
    }
}

const MAX_RUNE: u32 = 0x0010_FFFF;

/// A packed automaton event: `(class << 32) | value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Event(u64);

impl Event {
    /// Builds an event from a raw class/value pair without validating that
    /// `value` is sensible for `class` (e.g. a nonzero value on a named
    /// key). Used internally and by the compiler when splitting ranges.
    pub const fn from_parts(class: KeyClass, value: u32) -> Self {
        Event(((class as u32 as u64) << 32) | value as u64)
    }

    /// The raw 64-bit representation, for serialization and for ordering
    /// comparisons inside a single class (range guards).
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Reconstructs an event from its raw representation. Used by the
    /// deserializer; callers must have validated the class half themselves.
    pub const fn from_raw(raw: u64) -> Self {
        Event(raw)
    }

    pub fn class(self) -> KeyClass {
        let raw_class = (self.0 >> 32) as u32;
        KeyClass::from_u32(raw_class).expect("Event always carries a valid class")
    }

    pub fn value(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            KeyClass::Rune => match char::from_u32(self.value()) {
                Some(c) => write!(f, "{c:?}"),
                None => write!(f, "<invalid-rune:{:#x}>", self.value()),
            },
            class => write!(f, "{class:?}"),
        }
    }
}

/// Encodes a named (non-rune) key as an event. The value half is always
/// zero for named keys.
pub fn encode_key(class: KeyClass) -> Event {
    debug_assert_ne!(class, KeyClass::Rune, "use encode_rune for printable keys");
    Event::from_parts(class, 0)
}

/// Encodes a Unicode scalar as a `Rune` event.
pub fn encode_rune(r: char) -> Event {
    Event::from_parts(KeyClass::Rune, r as u32)
}

/// Recovers the key class carried by an event.
pub fn decode_class(e: Event) -> KeyClass {
    e.class()
}

/// Recovers the rune carried by a `Rune`-class event. Returns the
/// replacement character if the event's value is not a valid scalar (this
/// can only happen if a corrupt machine file was deserialized; §7 malformed
/// capture handling treats it the same as any other defense-in-depth case).
pub fn decode_rune(e: Event) -> char {
    char::from_u32(e.value()).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Lowest and highest possible `Rune` events, used by callers that need a
/// full-range capture (e.g. the insert-mode single-rune grab, §4.2).
pub fn rune_range() -> (Event, Event) {
    (
        Event::from_parts(KeyClass::Rune, 0),
        Event::from_parts(KeyClass::Rune, MAX_RUNE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rune_round_trips() {
        for c in ['a', 'Z', '0', '$', '"', '\u{10FFFF}'] {
            let e = encode_rune(c);
            assert_eq!(decode_class(e), KeyClass::Rune);
            assert_eq!(decode_rune(e), c);
        }
    }

    #[test]
    fn named_keys_carry_zero_value() {
        for class in KeyClass::ALL {
            if class == KeyClass::Rune {
                continue;
            }
            let e = encode_key(class);
            assert_eq!(decode_class(e), class);
            assert_eq!(e.value(), 0);
        }
    }

    #[test]
    fn equality_is_injective_over_class_and_value() {
        assert_eq!(encode_rune('a'), encode_rune('a'));
        assert_ne!(encode_rune('a'), encode_rune('b'));
        assert_ne!(encode_rune('\0'), encode_key(KeyClass::Enter));
        assert_ne!(encode_key(KeyClass::Enter), encode_key(KeyClass::Tab));
    }

    #[test]
    fn rune_events_never_collide_with_named_keys() {
        let (lo, hi) = rune_range();
        for class in KeyClass::ALL {
            if class == KeyClass::Rune {
                continue;
            }
            let named = encode_key(class);
            assert!(named.raw() < lo.raw() || named.raw() > hi.raw());
        }
    }

    #[test]
    fn raw_ordering_within_a_class_matches_value_ordering() {
        let a = encode_rune('0');
        let b = encode_rune('9');
        assert!(a.raw() < b.raw());
    }

    #[test]
    fn key_class_from_u32_rejects_unknown_discriminants() {
        assert_eq!(KeyClass::from_u32(0), Some(KeyClass::Rune));
        assert_eq!(KeyClass::from_u32(16), Some(KeyClass::Lf));
        assert_eq!(KeyClass::from_u32(9999), None);
    }

    #[test]
    fn display_shows_rune_or_named_key() {
        assert_eq!(format!("{}", encode_rune('x')), "'x'");
        assert_eq!(format!("{}", encode_key(KeyClass::Escape)), "Escape");
    }
}
