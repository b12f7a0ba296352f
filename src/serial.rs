//! Binary cache for parsed prerequisite indexes.
//!
//! Parsing every catalog prerequisite string is the expensive step of
//! building a [`PrereqIndex`](crate::PrereqIndex); this module persists the
//! parsed trees so they are built once and reused. The format consists of a
//! 32-byte fixed header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"PREQ"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{folded_depth, CourseCode, PrereqExpr, PrereqIndex, MAX_EXPR_DEPTH};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"PREQ";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`PrereqIndex`](crate::PrereqIndex) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode prerequisite index: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`PrereqIndex`](crate::PrereqIndex) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a prerequisite cache: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedIndex {
    metadata: IndexMetadata,
    entries: Vec<(String, SerializedExpr)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexMetadata {
    entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum SerializedExpr {
    Course(String),
    And(Vec<SerializedExpr>),
    Or(Vec<SerializedExpr>),
    Unrecognized(String),
}

// ---------------------------------------------------------------------------
// Expression flattening (binary -> n-ary)
// ---------------------------------------------------------------------------

fn flatten_expr(expr: &PrereqExpr) -> SerializedExpr {
    match expr {
        PrereqExpr::And(_, _) => {
            let mut children = Vec::new();
            collect_and_children(expr, &mut children);
            SerializedExpr::And(children)
        }
        PrereqExpr::Or(_, _) => {
            let mut children = Vec::new();
            collect_or_children(expr, &mut children);
            SerializedExpr::Or(children)
        }
        PrereqExpr::Course(code) => SerializedExpr::Course(code.clone()),
        PrereqExpr::Unrecognized(tag) => SerializedExpr::Unrecognized(tag.clone()),
    }
}

fn collect_and_children(expr: &PrereqExpr, out: &mut Vec<SerializedExpr>) {
    match expr {
        PrereqExpr::And(left, right) => {
            collect_and_children(left, out);
            collect_and_children(right, out);
        }
        other => out.push(flatten_expr(other)),
    }
}

fn collect_or_children(expr: &PrereqExpr, out: &mut Vec<SerializedExpr>) {
    match expr {
        PrereqExpr::Or(left, right) => {
            collect_or_children(left, out);
            collect_or_children(right, out);
        }
        other => out.push(flatten_expr(other)),
    }
}

// ---------------------------------------------------------------------------
// Expression unflattening (n-ary -> binary, left-associative)
// ---------------------------------------------------------------------------

fn unflatten_expr(expr: SerializedExpr) -> Result<PrereqExpr, DeserializeError> {
    match expr {
        SerializedExpr::And(children) => fold_children(children, PrereqExpr::and),
        SerializedExpr::Or(children) => fold_children(children, PrereqExpr::or),
        SerializedExpr::Course(code) => Ok(PrereqExpr::Course(code)),
        SerializedExpr::Unrecognized(tag) => Ok(PrereqExpr::Unrecognized(tag)),
    }
}

fn fold_children(
    children: Vec<SerializedExpr>,
    combine: fn(PrereqExpr, PrereqExpr) -> PrereqExpr,
) -> Result<PrereqExpr, DeserializeError> {
    let mut iter = children.into_iter();
    let Some(first) = iter.next() else {
        return Err(DeserializeError::Validation(
            "empty And/Or expression".to_owned(),
        ));
    };
    let first = unflatten_expr(first)?;
    iter.try_fold(first, |acc, child| Ok(combine(acc, unflatten_expr(child)?)))
}

// ---------------------------------------------------------------------------
// PrereqIndex <-> SerializedIndex
// ---------------------------------------------------------------------------

fn index_to_serialized(index: &PrereqIndex) -> SerializedIndex {
    // BTreeMap iteration keeps the output deterministic.
    let entries: Vec<(String, SerializedExpr)> = index
        .entries
        .iter()
        .map(|(code, expr)| (code.as_str().to_owned(), flatten_expr(expr)))
        .collect();

    SerializedIndex {
        metadata: IndexMetadata {
            entry_count: entries.len(),
        },
        entries,
    }
}

fn serialized_to_index(ser: SerializedIndex) -> Result<PrereqIndex, DeserializeError> {
    validate(&ser)?;
    let mut index = PrereqIndex::new();
    for (code, expr) in ser.entries {
        index
            .entries
            .insert(CourseCode::new(code), unflatten_expr(expr)?);
    }
    Ok(index)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedIndex) -> Result<(), DeserializeError> {
    if ser.metadata.entry_count != ser.entries.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} entries but payload has {}",
            ser.metadata.entry_count,
            ser.entries.len()
        )));
    }

    for (code, expr) in &ser.entries {
        if code.is_empty() {
            return Err(DeserializeError::Validation(
                "entry with empty course code".to_owned(),
            ));
        }
        let depth = expr_depth(expr);
        if depth > MAX_EXPR_DEPTH {
            return Err(DeserializeError::Validation(format!(
                "prerequisite tree for '{code}' is {depth} deep, at most {MAX_EXPR_DEPTH} allowed"
            )));
        }
        validate_expr(expr)?;
    }

    // Keys strictly ascending: sorted and unique
    for window in ser.entries.windows(2) {
        if window[0].0 >= window[1].0 {
            return Err(DeserializeError::Validation(format!(
                "course codes not strictly ascending at '{}'",
                window[1].0
            )));
        }
    }

    Ok(())
}

/// Depth of the binary tree `expr` unflattens into, computed without
/// recursion.
fn expr_depth(expr: &SerializedExpr) -> usize {
    enum Step<'a> {
        Enter(&'a SerializedExpr),
        Fold(usize),
    }

    let mut steps = vec![Step::Enter(expr)];
    let mut depths: Vec<usize> = Vec::new();
    while let Some(step) = steps.pop() {
        match step {
            Step::Enter(SerializedExpr::And(children) | SerializedExpr::Or(children)) => {
                steps.push(Step::Fold(children.len()));
                steps.extend(children.iter().rev().map(Step::Enter));
            }
            Step::Enter(_) => depths.push(1),
            Step::Fold(n) => {
                let start = depths.len() - n;
                let depth = folded_depth(&depths[start..]);
                depths.truncate(start);
                depths.push(depth);
            }
        }
    }
    depths.pop().unwrap_or(0)
}

fn validate_expr(expr: &SerializedExpr) -> Result<(), DeserializeError> {
    match expr {
        SerializedExpr::Course(code) => {
            if code.trim().is_empty() {
                return Err(DeserializeError::Validation(
                    "empty course literal".to_owned(),
                ));
            }
            Ok(())
        }
        SerializedExpr::And(children) | SerializedExpr::Or(children) => {
            if children.is_empty() {
                return Err(DeserializeError::Validation(
                    "empty And/Or expression".to_owned(),
                ));
            }
            children.iter().try_for_each(validate_expr)
        }
        SerializedExpr::Unrecognized(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] engine version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(index: &PrereqIndex) -> Result<Vec<u8>, SerializeError> {
    let serialized = index_to_serialized(index);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<PrereqIndex, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedIndex, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    let index = serialized_to_index(serialized)?;
    tracing::debug!(entries = index.len(), "loaded prerequisite cache");
    Ok(index)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course;

    // -- Expression flatten/unflatten --

    #[test]
    fn flatten_chained_and() {
        // And(And(a, b), c) -> And([a, b, c])
        let expr = course("CS 2505").and(course("CS 2506")).and(course("CS 2114"));
        let flat = flatten_expr(&expr);
        match &flat {
            SerializedExpr::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected And with 3 children, got {other:?}"),
        }
        assert_eq!(unflatten_expr(flat).unwrap(), expr);
    }

    #[test]
    fn flatten_mixed_and_or_stops_at_boundary() {
        // And(Or(a, b), c) -> And([Or([a, b]), c])
        let expr = course("MATH 1225")
            .or(course("MATH 1226"))
            .and(course("CS 2506"));
        let flat = flatten_expr(&expr);
        match &flat {
            SerializedExpr::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[0], SerializedExpr::Or(inner) if inner.len() == 2));
            }
            other => panic!("expected And with 2 children, got {other:?}"),
        }
        assert_eq!(unflatten_expr(flat).unwrap(), expr);
    }

    #[test]
    fn unflatten_single_child_unwraps() {
        let wrapped = SerializedExpr::Or(vec![SerializedExpr::Course("CS 3114".to_owned())]);
        assert_eq!(unflatten_expr(wrapped).unwrap(), course("CS 3114"));
    }

    #[test]
    fn unrecognized_survives() {
        let expr = PrereqExpr::Unrecognized("xor".to_owned());
        assert_eq!(unflatten_expr(flatten_expr(&expr)).unwrap(), expr);
    }

    // -- Header round-trip --

    #[test]
    fn header_round_trip() {
        let payload = b"test payload data";
        let mut buf = Vec::new();
        write_header(&mut buf, payload);
        assert_eq!(buf.len(), HEADER_SIZE);

        let (format_version, payload_len, hash) = read_header(&buf).unwrap();
        assert_eq!(format_version, FORMAT_VERSION);
        assert_eq!(payload_len as usize, payload.len());

        let expected_hash = blake3::hash(payload);
        assert_eq!(&hash, &expected_hash.as_bytes()[..16]);
    }

    #[test]
    fn header_bad_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"OORO");
        assert!(matches!(read_header(&buf), Err(DeserializeError::BadMagic)));
    }

    #[test]
    fn header_too_short() {
        let buf = vec![0u8; 10];
        assert!(matches!(
            read_header(&buf),
            Err(DeserializeError::LengthMismatch { .. })
        ));
    }

    // -- Validation --

    #[test]
    fn validate_empty_and_or_rejected() {
        for expr in [SerializedExpr::And(vec![]), SerializedExpr::Or(vec![])] {
            assert!(matches!(
                validate_expr(&expr),
                Err(DeserializeError::Validation(_))
            ));
        }
    }

    #[test]
    fn validate_empty_literal_rejected() {
        let expr = SerializedExpr::And(vec![
            SerializedExpr::Course("CS 2506".to_owned()),
            SerializedExpr::Course("  ".to_owned()),
        ]);
        assert!(matches!(
            validate_expr(&expr),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn validate_deep_tree_rejected() {
        let leaf = || SerializedExpr::Course("CS 2506".to_owned());
        let wide = SerializedExpr::Or(vec![leaf(); 1000]);
        assert_eq!(expr_depth(&wide), 1000);
        let ser = SerializedIndex {
            metadata: IndexMetadata { entry_count: 1 },
            entries: vec![("CS3214".to_owned(), wide)],
        };
        assert!(matches!(validate(&ser), Err(DeserializeError::Validation(_))));

        let nested = SerializedExpr::And(vec![
            SerializedExpr::Or(vec![leaf(), leaf()]),
            leaf(),
        ]);
        assert_eq!(expr_depth(&nested), 3);
        let at_limit = SerializedIndex {
            metadata: IndexMetadata { entry_count: 1 },
            entries: vec![(
                "CS3214".to_owned(),
                SerializedExpr::Or(vec![leaf(); MAX_EXPR_DEPTH]),
            )],
        };
        assert!(validate(&at_limit).is_ok());
    }

    #[test]
    fn validate_metadata_count() {
        let ser = SerializedIndex {
            metadata: IndexMetadata { entry_count: 2 },
            entries: vec![("CS3114".to_owned(), SerializedExpr::Course("CS 2114".to_owned()))],
        };
        assert!(matches!(validate(&ser), Err(DeserializeError::Validation(_))));
    }

    #[test]
    fn validate_duplicate_keys_rejected() {
        let entry = ("CS3114".to_owned(), SerializedExpr::Course("CS 2114".to_owned()));
        let ser = SerializedIndex {
            metadata: IndexMetadata { entry_count: 2 },
            entries: vec![entry.clone(), entry],
        };
        assert!(matches!(validate(&ser), Err(DeserializeError::Validation(_))));
    }

    // -- Full encode/decode --

    #[test]
    fn encode_decode_index() {
        let mut index = PrereqIndex::new();
        index.insert("CS 3114", course("CS 2114").and(course("MATH 2534").or(course("MATH 3034"))));
        index.insert("CS 2114", course("CS 1114"));
        let bytes = encode(&index).unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(decode(&bytes).unwrap(), index);
    }

    #[test]
    fn version_mismatch_rejected() {
        let mut bytes = encode(&PrereqIndex::new()).unwrap();
        bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(DeserializeError::IncompatibleVersion { blob: 99, supported: 1 })
        ));
    }

    #[test]
    fn corrupted_payload_rejected() {
        let mut index = PrereqIndex::new();
        index.insert("CS 3114", course("CS 2114"));
        let mut bytes = encode(&index).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode(&bytes), Err(DeserializeError::ChecksumMismatch)));
    }
}
