//! Byte-level (de)serialization of a compiled [`Machine`] (§6 "Compiled
//! state-machine file format", §7 "Deserialization errors").
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic        4 bytes   b"VIRM"
//! version      1 byte
//! start        u32
//! state_count  u32
//! states[]     state_count * (u32 transitions_offset, u32 transitions_len, i64 accept)
//! trans_count  u32
//! transitions[] trans_count * (u64 lo, u64 hi, u32 target, u32 markers_offset, u32 markers_len)
//! marker_count u32
//! markers[]    marker_count * (u8 capture_id, u8 kind)
//! checksum     u32 (CRC32 of every byte preceding it)
//! ```
//!
//! `accept` is `-1` for "no accept", else the command id. Deserialization
//! validates every offset/length and the trailing checksum before handing
//! back a `Machine`; a version this crate doesn't recognize or a truncated
//! buffer fails closed rather than guessing.

use crc32fast::Hasher;
use vir_expr::CaptureId;

use crate::error::DeserializeError;
use crate::machine::{CaptureMarker, Guard, Machine, MarkerKind, StateData, Transition};

const MAGIC: &[u8; 4] = b"VIRM";
const VERSION: u8 = 1;

pub fn serialize(machine: &Machine) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&machine.start().to_le_bytes());
    buf.extend_from_slice(&(machine.state_count() as u32).to_le_bytes());

    let mut all_transitions: Vec<&Transition> = Vec::new();
    let mut all_markers: Vec<CaptureMarker> = Vec::new();

    let mut state_headers: Vec<(u32, u32, i64)> = Vec::new();
    for state in machine.states() {
        let offset = all_transitions.len() as u32;
        for t in &state.transitions {
            all_transitions.push(t);
        }
        let accept = state.accept.map(|a| a as i64).unwrap_or(-1);
        state_headers.push((offset, state.transitions.len() as u32, accept));
    }

    for (offset, len, accept) in &state_headers {
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&accept.to_le_bytes());
    }

    buf.extend_from_slice(&(all_transitions.len() as u32).to_le_bytes());
    let mut transition_marker_spans: Vec<(u32, u32)> = Vec::new();
    for t in &all_transitions {
        let offset = all_markers.len() as u32;
        all_markers.extend(t.markers.iter().copied());
        transition_marker_spans.push((offset, t.markers.len() as u32));
    }
    for (t, (offset, len)) in all_transitions.iter().zip(transition_marker_spans.iter()) {
        buf.extend_from_slice(&t.guard.lo.raw().to_le_bytes());
        buf.extend_from_slice(&t.guard.hi.raw().to_le_bytes());
        buf.extend_from_slice(&t.target.to_le_bytes());
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
    }

    buf.extend_from_slice(&(all_markers.len() as u32).to_le_bytes());
    for m in &all_markers {
        buf.push(m.id.to_u8());
        buf.push(match m.kind {
            MarkerKind::Start => 0,
            MarkerKind::End => 1,
        });
    }

    let mut hasher = Hasher::new();
    hasher.update(&buf);
    let checksum = hasher.finalize();
    buf.extend_from_slice(&checksum.to_le_bytes());
    buf
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DeserializeError> {
        if self.pos + n > self.data.len() {
            return Err(DeserializeError::Truncated {
                needed: self.pos + n,
                have: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DeserializeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, DeserializeError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(u32::from_le_bytes(bytes))
    }

    fn i64(&mut self) -> Result<i64, DeserializeError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(i64::from_le_bytes(bytes))
    }

    fn u64(&mut self) -> Result<u64, DeserializeError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(u64::from_le_bytes(bytes))
    }
}

pub fn deserialize(data: &[u8]) -> Result<Machine, DeserializeError> {
    if data.len() < 4 + 1 + 4 {
        return Err(DeserializeError::Truncated {
            needed: 9,
            have: data.len(),
        });
    }
    if &data[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let checksum_at = data.len().checked_sub(4).ok_or(DeserializeError::Truncated {
        needed: 4,
        have: data.len(),
    })?;
    let body = &data[..checksum_at];
    let mut hasher = Hasher::new();
    hasher.update(body);
    let expected = hasher.finalize();
    let actual = u32::from_le_bytes(data[checksum_at..].try_into().unwrap());
    if expected != actual {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let mut cur = Cursor::new(body);
    cur.take(4)?;
    let version = cur.u8()?;
    if version != VERSION {
        return Err(DeserializeError::UnsupportedVersion(version));
    }

    let start = cur.u32()?;
    let state_count = cur.u32()? as usize;
    if start as usize >= state_count {
        return Err(DeserializeError::StartOutOfBounds(start));
    }

    let mut headers = Vec::with_capacity(state_count);
    for _ in 0..state_count {
        let offset = cur.u32()?;
        let len = cur.u32()?;
        let accept = cur.i64()?;
        headers.push((offset, len, accept));
    }

    let trans_count = cur.u32()? as usize;
    struct RawTransition {
        lo: u64,
        hi: u64,
        target: u32,
        marker_offset: u32,
        marker_len: u32,
    }
    let mut raw_transitions = Vec::with_capacity(trans_count);
    for _ in 0..trans_count {
        let lo = cur.u64()?;
        let hi = cur.u64()?;
        let target = cur.u32()?;
        if target as usize >= state_count {
            return Err(DeserializeError::TransitionTargetOutOfBounds(target));
        }
        let marker_offset = cur.u32()?;
        let marker_len = cur.u32()?;
        raw_transitions.push(RawTransition {
            lo,
            hi,
            target,
            marker_offset,
            marker_len,
        });
    }

    let marker_count = cur.u32()? as usize;
    let mut markers = Vec::with_capacity(marker_count);
    for _ in 0..marker_count {
        let id_raw = cur.u8()?;
        let kind_raw = cur.u8()?;
        let id = CaptureId::from_u8(id_raw).ok_or(DeserializeError::UnknownCaptureId(id_raw))?;
        let kind = match kind_raw {
            0 => MarkerKind::Start,
            1 => MarkerKind::End,
            _ => return Err(DeserializeError::UnknownCaptureId(id_raw)),
        };
        markers.push(CaptureMarker { id, kind });
    }

    for (offset, len, _) in &headers {
        if (*offset as usize)
            .checked_add(*len as usize)
            .is_none_or(|end| end > raw_transitions.len())
        {
            return Err(DeserializeError::StateTransitionRangeOutOfBounds);
        }
    }
    for rt in &raw_transitions {
        if (rt.marker_offset as usize)
            .checked_add(rt.marker_len as usize)
            .is_none_or(|end| end > markers.len())
        {
            return Err(DeserializeError::MarkerRangeOutOfBounds);
        }
    }

    let mut states = Vec::with_capacity(state_count);
    for (offset, len, accept) in headers {
        let slice = &raw_transitions[offset as usize..(offset + len) as usize];
        let transitions = slice
            .iter()
            .map(|rt| Transition {
                guard: Guard::range(
                    vir_events::Event::from_raw(rt.lo),
                    vir_events::Event::from_raw(rt.hi),
                ),
                target: rt.target,
                markers: markers
                    [rt.marker_offset as usize..(rt.marker_offset + rt.marker_len) as usize]
                    .to_vec(),
            })
            .collect();
        states.push(StateData {
            transitions,
            accept: if accept < 0 { None } else { Some(accept as u32) },
        });
    }

    Ok(Machine::from_parts(states, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use vir_expr::{cmd_expr, CmdOpts};

    fn sample_machine() -> Machine {
        let commands = vec![
            (0u32, cmd_expr("dd", None, CmdOpts::default())),
            (
                1u32,
                cmd_expr(
                    "d",
                    Some("w"),
                    CmdOpts {
                        count: true,
                        ..Default::default()
                    },
                ),
            ),
        ];
        compile(&commands).expect("sample grammar should compile")
    }

    #[test]
    fn round_trips_a_compiled_machine() {
        let machine = sample_machine();
        let bytes = serialize(&machine);
        let restored = deserialize(&bytes).expect("valid bytes should deserialize");
        assert_eq!(restored.state_count(), machine.state_count());
        assert_eq!(restored.transition_count(), machine.transition_count());
        assert_eq!(restored.start(), machine.start());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = serialize(&sample_machine());
        bytes[0] = b'X';
        assert_eq!(deserialize(&bytes), Err(DeserializeError::BadMagic));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let bytes = serialize(&sample_machine());
        let truncated = &bytes[..bytes.len() - 10];
        assert!(deserialize(truncated).is_err());
    }

    #[test]
    fn rejects_checksum_mismatch() {
        let mut bytes = serialize(&sample_machine());
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(
            deserialize(&bytes),
            Err(DeserializeError::ChecksumMismatch)
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = serialize(&sample_machine());
        bytes[4] = 99;
        // recompute checksum so the corruption is caught by version check,
        // not checksum mismatch
        let body_len = bytes.len() - 4;
        let mut hasher = Hasher::new();
        hasher.update(&bytes[..body_len]);
        let checksum = hasher.finalize().to_le_bytes();
        bytes[body_len..].copy_from_slice(&checksum);
        assert_eq!(
            deserialize(&bytes),
            Err(DeserializeError::UnsupportedVersion(99))
        );
    }
}
