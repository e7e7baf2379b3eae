//! Expression IR (C2): the algebraic pattern language command tables are
//! built from, plus the helper constructors command tables call.
//!
//! Capture ids are reserved for the small, fixed set of argument kinds a
//! command can expose (count, clipboard page, match/replace/insert rune).
//! Unlike some regex-style engines, command *identity* is never a capture —
//! the compiler tags an accepting state with the `CommandId` of the rule
//! that produced it (see `vir-compile`), so the capture namespace here is
//! reserved entirely for arguments.

use vir_events::{Event, KeyClass, encode_key, encode_rune, rune_range};

/// The fixed set of argument-kind captures a pattern may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaptureId {
    VerbCount,
    ObjectCount,
    ClipboardPage,
    MatchChar,
    ReplaceChar,
    InsertChar,
}

impl CaptureId {
    const ALL: [CaptureId; 6] = [
        CaptureId::VerbCount,
        CaptureId::ObjectCount,
        CaptureId::ClipboardPage,
        CaptureId::MatchChar,
        CaptureId::ReplaceChar,
        CaptureId::InsertChar,
    ];

    /// Stable discriminant used by `vir-compile`'s serialized machine format
    /// (§6); command ids live in a disjoint `u32` namespace, so a single
    /// byte is ample for the fixed argument-kind set (§9 "capture id
    /// space").
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Self::to_u8`]; used by the deserializer to validate a
    /// capture marker table before trusting it (§7 malformed-input
    /// defense).
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.to_u8() == raw)
    }
}

/// An expression tree over automaton [`Event`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Match exactly one event equal to `e`.
    Event(Event),
    /// Match one event whose raw value lies in `[lo, hi]` (same key class).
    Range(Event, Event),
    /// Match each child in order.
    Concat(Vec<Expr>),
    /// Match any one child; ties among children broken by list order.
    Alt(Vec<Expr>),
    /// Zero or more repetitions (greedy).
    Star(Box<Expr>),
    /// Zero or one repetition (greedy).
    Option(Box<Expr>),
    /// Match `inner` and record the inclusive event range consumed under
    /// `id`.
    Capture(CaptureId, Box<Expr>),
}

impl Expr {
    pub fn capture(id: CaptureId, inner: Expr) -> Expr {
        Expr::Capture(id, Box::new(inner))
    }

    pub fn star(inner: Expr) -> Expr {
        Expr::Star(Box::new(inner))
    }

    pub fn option(inner: Expr) -> Expr {
        Expr::Option(Box::new(inner))
    }
}

/// A single literal rune event.
pub fn rune_expr(r: char) -> Expr {
    Expr::Event(encode_rune(r))
}

/// A single literal named-key event.
pub fn key_expr(k: KeyClass) -> Expr {
    Expr::Event(encode_key(k))
}

/// Match any one of `choices`, earliest listed wins ties.
pub fn alt(choices: Vec<Expr>) -> Expr {
    if choices.len() == 1 {
        choices.into_iter().next().unwrap()
    } else {
        Expr::Alt(choices)
    }
}

/// Match each of `parts` in sequence.
pub fn concat(parts: Vec<Expr>) -> Expr {
    if parts.len() == 1 {
        parts.into_iter().next().unwrap()
    } else {
        Expr::Concat(parts)
    }
}

fn digit_range(lo: char, hi: char) -> Expr {
    Expr::Range(encode_rune(lo), encode_rune(hi))
}

/// `[1-9][0-9]*` captured under `id` and wrapped in an optional: the pattern
/// for one optional multi-digit decimal count. A leading `0` is deliberately
/// excluded so a bare `0` keystroke stays available as the cursor-line-start
/// command rather than being swallowed as a count.
pub fn opt_count(id: CaptureId) -> Expr {
    let digits = concat(vec![digit_range('1', '9'), Expr::star(digit_range('0', '9'))]);
    Expr::option(Expr::capture(id, digits))
}

/// Optional `"` followed by a single lowercase letter captured as the
/// clipboard-page selector.
pub fn opt_clipboard_page() -> Expr {
    let page = Expr::capture(CaptureId::ClipboardPage, Expr::Range(encode_rune('a'), encode_rune('z')));
    Expr::option(concat(vec![rune_expr('"'), page]))
}

/// The terminal rune capture used by `f{c}` / `t{c}`.
pub fn match_char() -> Expr {
    let (lo, hi) = rune_range();
    Expr::capture(CaptureId::MatchChar, Expr::Range(lo, hi))
}

/// The terminal capture used by `r{c}`; in addition to any rune, `Enter`
/// and `Tab` are accepted and later decoded to `'\n'` / `'\t'` (§4.6).
pub fn replace_char() -> Expr {
    let (lo, hi) = rune_range();
    let choice = alt(vec![
        Expr::Range(lo, hi),
        key_expr(KeyClass::Enter),
        key_expr(KeyClass::Tab),
    ]);
    Expr::capture(CaptureId::ReplaceChar, choice)
}

/// The insert-mode single-rune grab; its range spans the entire scalar
/// space so every printable keystroke is captured.
pub fn insert_char() -> Expr {
    let (lo, hi) = rune_range();
    Expr::capture(CaptureId::InsertChar, Expr::Range(lo, hi))
}

/// Options accepted by [`cmd_expr`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CmdOpts {
    /// Enable verb-count (and, when `object` is non-empty, a separate
    /// object-count) captures.
    pub count: bool,
    /// Prepend the optional `"{page}` clipboard selector.
    pub clipboard_page: bool,
    /// Append a terminal `match_char` capture (`f`/`t` family). Mutually
    /// exclusive with `replace_char`.
    pub match_char: bool,
    /// Append a terminal `replace_char` capture (`r` family). Mutually
    /// exclusive with `match_char`.
    pub replace_char: bool,
}

/// The canonical command builder (§4.2):
/// `[clipboard-page?] [verb-count?] verb [object-count? object] [match-char?|replace-char?]`.
///
/// `verb` and `object` are short ASCII strings whose bytes are emitted as
/// rune literals (`"dd"`, `"w"`, `"i("`, …). When `object` is `None` the
/// object-count capture is also absent, even if `opts.count` is set.
pub fn cmd_expr(verb: &str, object: Option<&str>, opts: CmdOpts) -> Expr {
    assert!(
        !(opts.match_char && opts.replace_char),
        "match_char and replace_char are mutually exclusive per command"
    );
    let mut parts = Vec::new();
    if opts.clipboard_page {
        parts.push(opt_clipboard_page());
    }
    if opts.count {
        parts.push(opt_count(CaptureId::VerbCount));
    }
    parts.push(concat(verb.chars().map(rune_expr).collect()));
    if let Some(obj) = object {
        if opts.count {
            parts.push(opt_count(CaptureId::ObjectCount));
        }
        parts.push(concat(obj.chars().map(rune_expr).collect()));
    }
    if opts.match_char {
        parts.push(match_char());
    }
    if opts.replace_char {
        parts.push(replace_char());
    }
    concat(parts)
}

/// Convenience for cursor-movement commands that accept only a verb-count
/// prefix: `[verb-count?] expr`.
pub fn verb_count_then(expr: Expr) -> Expr {
    concat(vec![opt_count(CaptureId::VerbCount), expr])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_expr_bare_verb_has_no_counts_or_object() {
        let e = cmd_expr("dd", None, CmdOpts::default());
        match e {
            Expr::Concat(parts) => assert_eq!(parts.len(), 1),
            other => panic!("expected single concat part, got {other:?}"),
        }
    }

    #[test]
    fn cmd_expr_with_object_and_count_has_two_count_captures() {
        let e = cmd_expr(
            "d",
            Some("w"),
            CmdOpts {
                count: true,
                ..Default::default()
            },
        );
        let Expr::Concat(parts) = e else {
            panic!("expected concat")
        };
        // verb-count, verb, object-count, object
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn cmd_expr_without_object_ignores_object_count_even_with_count_opt() {
        let e = cmd_expr(
            "u",
            None,
            CmdOpts {
                count: true,
                ..Default::default()
            },
        );
        let Expr::Concat(parts) = e else {
            panic!("expected concat")
        };
        // verb-count, verb only
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn cmd_expr_rejects_both_match_and_replace_char() {
        let result = std::panic::catch_unwind(|| {
            cmd_expr(
                "f",
                None,
                CmdOpts {
                    match_char: true,
                    replace_char: true,
                    ..Default::default()
                },
            )
        });
        assert!(result.is_err());
    }

    #[test]
    fn opt_count_excludes_leading_zero() {
        let Expr::Option(inner) = opt_count(CaptureId::VerbCount) else {
            panic!("expected option")
        };
        let Expr::Capture(CaptureId::VerbCount, digits) = *inner else {
            panic!("expected capture")
        };
        let Expr::Concat(parts) = *digits else {
            panic!("expected concat")
        };
        match &parts[0] {
            Expr::Range(lo, hi) => {
                assert_eq!(vir_events::decode_rune(*lo), '1');
                assert_eq!(vir_events::decode_rune(*hi), '9');
            }
            other => panic!("expected leading digit range, got {other:?}"),
        }
    }

    #[test]
    fn alt_and_concat_collapse_singletons() {
        assert_eq!(alt(vec![rune_expr('a')]), rune_expr('a'));
        assert_eq!(concat(vec![rune_expr('a')]), rune_expr('a'));
    }

    #[test]
    fn capture_id_round_trips_through_u8() {
        for id in CaptureId::ALL {
            assert_eq!(CaptureId::from_u8(id.to_u8()), Some(id));
        }
        assert_eq!(CaptureId::from_u8(255), None);
    }
}
