//! The length-prefixed container persisted collections are stored as.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! version: u8 | count: u32 | count * (length: u32 | bytes: [u8; length])
//! ```
//!
//! Items are opaque byte strings, so no item content can be mistaken for a separator.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{StoreError, StoreResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The current container format version.
pub const CONTAINER_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + 4;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Encodes `items` into a container.
pub fn encode<I>(items: &[I]) -> StoreResult<Bytes>
where
    I: AsRef<[u8]>,
{
    let count = u32::try_from(items.len())
        .map_err(|_| StoreError::MalformedContainer(format!("too many items: {}", items.len())))?;

    let body_len: usize = items.iter().map(|i| 4 + i.as_ref().len()).sum();
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body_len);

    buf.put_u8(CONTAINER_VERSION);
    buf.put_u32(count);

    for (position, item) in items.iter().enumerate() {
        let item = item.as_ref();
        let len = u32::try_from(item.len()).map_err(|_| {
            StoreError::ItemCodec(position, format!("item too large: {} bytes", item.len()))
        })?;

        buf.put_u32(len);
        buf.put_slice(item);
    }

    Ok(buf.freeze())
}

/// Decodes a container into its items.
///
/// Fails on an unknown version, a truncated item, or bytes trailing the last item.
pub fn decode(bytes: Bytes) -> StoreResult<Vec<Bytes>> {
    let mut buf = bytes;

    if buf.remaining() < HEADER_LEN {
        return Err(StoreError::MalformedContainer(format!(
            "expected at least {HEADER_LEN} header bytes, got {}",
            buf.remaining()
        )));
    }

    let version = buf.get_u8();
    if version != CONTAINER_VERSION {
        return Err(StoreError::UnsupportedContainerVersion(version));
    }

    let count = buf.get_u32() as usize;
    let mut items = Vec::with_capacity(count.min(buf.remaining() / 4));

    for position in 0..count {
        if buf.remaining() < 4 {
            return Err(StoreError::MalformedContainer(format!(
                "missing length of item {position}"
            )));
        }

        let len = buf.get_u32() as usize;
        if buf.remaining() < len {
            return Err(StoreError::MalformedContainer(format!(
                "item {position} needs {len} bytes, {} left",
                buf.remaining()
            )));
        }

        items.push(buf.split_to(len));
    }

    if buf.has_remaining() {
        return Err(StoreError::MalformedContainer(format!(
            "{} trailing bytes",
            buf.remaining()
        )));
    }

    Ok(items)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_keeps_delimiter_like_items_intact() -> anyhow::Result<()> {
        let items: Vec<&[u8]> = vec![&b"a,b"[..], &b""[..], &b"|||"[..], &b"\x00\x00\x00\x01"[..]];

        let encoded = encode(&items)?;
        assert_eq!(encoded[0], CONTAINER_VERSION);
        assert_eq!(&encoded[1..5], &[0, 0, 0, 4]);

        let decoded = decode(encoded)?;
        assert_eq!(decoded.len(), 4);
        for (item, decoded) in items.iter().zip(decoded.iter()) {
            assert_eq!(*item, decoded.as_ref());
        }

        Ok(())
    }

    #[test]
    fn test_container_empty() -> anyhow::Result<()> {
        let encoded = encode::<&[u8]>(&[])?;
        assert_eq!(encoded.as_ref(), &[CONTAINER_VERSION, 0, 0, 0, 0]);
        assert!(decode(encoded)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_container_rejects_malformed_input() -> anyhow::Result<()> {
        assert!(matches!(
            decode(Bytes::from_static(&[1, 0])),
            Err(StoreError::MalformedContainer(_))
        ));

        assert_eq!(
            decode(Bytes::from_static(&[9, 0, 0, 0, 0])),
            Err(StoreError::UnsupportedContainerVersion(9))
        );

        // Declares one item of 5 bytes but carries only 2.
        assert!(matches!(
            decode(Bytes::from_static(&[1, 0, 0, 0, 1, 0, 0, 0, 5, b'a', b'b'])),
            Err(StoreError::MalformedContainer(_))
        ));

        let mut trailing = encode(&[b"x"])?.to_vec();
        trailing.push(0);
        assert!(matches!(
            decode(Bytes::from(trailing)),
            Err(StoreError::MalformedContainer(_))
        ));

        Ok(())
    }
}
