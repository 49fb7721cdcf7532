//! Length-prefixed framing for the wire protocol.
//!
//! Every message travels as one frame: a fixed header carrying magic bytes,
//! the protocol version, the payload length, and a CRC32 of the payload,
//! followed by the payload itself.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc32fast::Hasher;

use crate::error::{WireError, WireResult};

/// Protocol magic bytes: "STRM" in big-endian.
pub const MAGIC: u32 = 0x5354_524D;

/// Current protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Frame header size in bytes (magic + version + length + checksum).
pub const FRAME_HEADER_SIZE: usize = 14;

/// Maximum payload size (8 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 8 * 1024 * 1024;

/// Writes `payload` as a complete frame into `buf`.
pub fn encode_frame(payload: &[u8], buf: &mut BytesMut) {
    buf.reserve(FRAME_HEADER_SIZE + payload.len());
    buf.put_u32(MAGIC);
    buf.put_u16(PROTOCOL_VERSION);
    buf.put_u32(payload.len() as u32);
    buf.put_u32(checksum(payload));
    buf.put_slice(payload);
}

/// Attempts to decode one frame from the front of `buf`.
///
/// Returns `Ok(Some(payload))` when a complete, valid frame was consumed,
/// `Ok(None)` when more bytes are needed, and `Err` when the bytes at the
/// front of the buffer are not a valid frame.
pub fn decode_frame(buf: &mut BytesMut) -> WireResult<Option<Bytes>> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Ok(None);
    }

    // Peek at the header without consuming it; the payload may still be
    // in flight.
    let mut peek = &buf[..];
    let magic = peek.get_u32();
    let version = peek.get_u16();
    let length = peek.get_u32();
    let expected = peek.get_u32();

    if magic != MAGIC {
        return Err(WireError::InvalidMagic(magic));
    }
    if version != PROTOCOL_VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    if length > MAX_PAYLOAD_SIZE {
        return Err(WireError::PayloadTooLarge {
            size: length,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let total = FRAME_HEADER_SIZE + length as usize;
    if buf.len() < total {
        return Ok(None);
    }

    buf.advance(FRAME_HEADER_SIZE);
    let payload = buf.split_to(length as usize).freeze();

    let actual = checksum(&payload);
    if actual != expected {
        return Err(WireError::ChecksumMismatch { expected, actual });
    }

    Ok(Some(payload))
}

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    fn encoded(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf);
        buf
    }

    #[test]
    fn frame_roundtrip() {
        let mut buf = encoded(b"hello, stratum");
        assert_eq!(buf.len(), FRAME_HEADER_SIZE + 14);

        let payload = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], b"hello, stratum");
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_header_needs_more_bytes() {
        let mut buf = BytesMut::from(&[0u8; 6][..]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn incomplete_payload_needs_more_bytes() {
        let full = encoded(b"partial");
        let mut buf = BytesMut::from(&full[..FRAME_HEADER_SIZE + 3]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn two_frames_decode_in_sequence() {
        let mut buf = encoded(b"first");
        buf.extend_from_slice(&encoded(b"second"));

        let a = decode_frame(&mut buf).unwrap().unwrap();
        let b = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(&a[..], b"first");
        assert_eq!(&b[..], b"second");
        assert!(buf.is_empty());
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(0xDEAD_BEEF);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32(4);
        buf.put_u32(0);
        buf.put_slice(b"test");

        let result = decode_frame(&mut buf);
        assert!(matches!(result, Err(WireError::InvalidMagic(0xDEAD_BEEF))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAGIC);
        buf.put_u16(99);
        buf.put_u32(0);
        buf.put_u32(0);

        let result = decode_frame(&mut buf);
        assert!(matches!(result, Err(WireError::UnsupportedVersion(99))));
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut buf = encoded(b"payload");
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;

        let result = decode_frame(&mut buf);
        assert!(matches!(result, Err(WireError::ChecksumMismatch { .. })));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAGIC);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32(MAX_PAYLOAD_SIZE + 1);
        buf.put_u32(0);

        let result = decode_frame(&mut buf);
        assert!(matches!(result, Err(WireError::PayloadTooLarge { .. })));
    }
}
