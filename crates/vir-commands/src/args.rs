//! Argument extraction (C6, §4.6): turns a completed, already-resolved
//! capture list into a typed [`crate::Params`] value.

use vir_events::{KeyClass, decode_class, decode_rune};
use vir_events::Event;
use vir_expr::CaptureId;
use vir_runtime::ResolvedCapture;

use crate::{ClipboardPage, Params};

/// Decodes a single verb-count or object-count capture's digit events as
/// decimal, clamping to `u64::MAX` on overflow and defaulting to `1` when
/// the capture is absent or its digits fail to parse (§4.6).
fn decode_count(events: &[Event]) -> u64 {
    if events.is_empty() {
        return 1;
    }
    let mut value: u64 = 0;
    for e in events {
        if decode_class(*e) != KeyClass::Rune {
            return 1;
        }
        let c = decode_rune(*e);
        let Some(digit) = c.to_digit(10) else {
            return 1;
        };
        value = value.saturating_mul(10).saturating_add(digit as u64);
    }
    value
}

fn decode_clipboard_page(events: &[Event]) -> ClipboardPage {
    match events.first() {
        Some(e) if decode_class(*e) == KeyClass::Rune => {
            let c = decode_rune(*e);
            if c.is_ascii_lowercase() {
                ClipboardPage::Letter(c)
            } else {
                ClipboardPage::Default
            }
        }
        _ => ClipboardPage::Default,
    }
}

fn decode_match_char(events: &[Event]) -> char {
    match events.first() {
        Some(e) if decode_class(*e) == KeyClass::Rune => decode_rune(*e),
        _ => '\0',
    }
}

/// `replace_char` additionally accepts `Enter` → `'\n'` and `Tab` → `'\t'`
/// (§4.2, §4.6); any other named key (shouldn't occur given a correct
/// compiler) falls back to the malformed-capture sentinel.
fn decode_replace_char(events: &[Event]) -> char {
    match events.first() {
        Some(e) => match decode_class(*e) {
            KeyClass::Rune => decode_rune(*e),
            KeyClass::Enter => '\n',
            KeyClass::Tab => '\t',
            _ => '\0',
        },
        None => '\0',
    }
}

fn decode_insert_char(events: &[Event]) -> char {
    match events.first() {
        Some(e) if decode_class(*e) == KeyClass::Rune => decode_rune(*e),
        _ => '\0',
    }
}

/// Builds a [`Params`] from an accept's already-resolved captures — each
/// [`ResolvedCapture`] carries its own event slice, so this only needs to
/// dispatch on `id` and decode.
pub fn extract_params(captures: &[ResolvedCapture]) -> Params {
    let mut verb_count: Option<&[Event]> = None;
    let mut object_count: Option<&[Event]> = None;
    let mut clipboard_page = ClipboardPage::Default;
    let mut match_char = '\0';
    let mut replace_char = '\0';
    let mut insert_char = '\0';

    for capture in captures {
        let events = capture.events.as_slice();
        match capture.id {
            CaptureId::VerbCount => verb_count = Some(events),
            CaptureId::ObjectCount => object_count = Some(events),
            CaptureId::ClipboardPage => clipboard_page = decode_clipboard_page(events),
            CaptureId::MatchChar => match_char = decode_match_char(events),
            CaptureId::ReplaceChar => replace_char = decode_replace_char(events),
            CaptureId::InsertChar => insert_char = decode_insert_char(events),
        }
    }

    let verb = verb_count.map(decode_count).unwrap_or(1);
    let object = object_count.map(decode_count).unwrap_or(1);

    Params {
        count: verb.saturating_mul(object),
        clipboard_page,
        match_char,
        replace_char,
        insert_char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vir_events::encode_rune;

    fn events_of(chars: &str) -> Vec<Event> {
        chars.chars().map(encode_rune).collect()
    }

    #[test]
    fn count_defaults_to_one_when_absent() {
        let params = extract_params(&[]);
        assert_eq!(params.count, 1);
    }

    #[test]
    fn counts_multiply() {
        let captures = vec![
            ResolvedCapture {
                id: CaptureId::VerbCount,
                events: events_of("2"),
            },
            ResolvedCapture {
                id: CaptureId::ObjectCount,
                events: events_of("3"),
            },
        ];
        let params = extract_params(&captures);
        assert_eq!(params.count, 6);
    }

    #[test]
    fn overflow_saturates_rather_than_panics() {
        let many_nines = "9".repeat(25);
        let captures = vec![ResolvedCapture {
            id: CaptureId::VerbCount,
            events: events_of(&many_nines),
        }];
        let params = extract_params(&captures);
        assert_eq!(params.count, u64::MAX);
    }

    #[test]
    fn clipboard_page_letter_is_decoded() {
        let captures = vec![ResolvedCapture {
            id: CaptureId::ClipboardPage,
            events: events_of("a"),
        }];
        let params = extract_params(&captures);
        assert_eq!(params.clipboard_page, ClipboardPage::Letter('a'));
    }

    #[test]
    fn replace_char_maps_enter_and_tab() {
        use vir_events::{encode_key, KeyClass};
        let captures = vec![ResolvedCapture {
            id: CaptureId::ReplaceChar,
            events: vec![encode_key(KeyClass::Enter)],
        }];
        let params = extract_params(&captures);
        assert_eq!(params.replace_char, '\n');
    }
}
