use std::marker::PhantomData;

use bytes::{Buf, BufMut, BytesMut};
use log::debug;
use nom::Err;
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    errors::WireError,
    message::{Envelope, Reply, Request, HEADER_LEN},
    parser::parse_header,
};

/// Frames larger than this are refused unless the codec is built with
/// [`EnvelopeCodec::with_max_length`].
pub const DEFAULT_MAX_LENGTH: u64 = 64 * 1024 * 1024;

pub type RequestCodec = EnvelopeCodec<Request>;
pub type ReplyCodec = EnvelopeCodec<Reply>;

#[derive(Clone, Debug)]
pub struct EnvelopeCodec<T> {
    max_length: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EnvelopeCodec<T> {
    /// Creates a new [`EnvelopeCodec`] with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LENGTH)
    }

    pub fn with_max_length(max_length: u64) -> Self {
        Self {
            max_length,
            _marker: PhantomData,
        }
    }

    pub fn max_length(&self) -> u64 {
        self.max_length
    }
}

impl<T> Default for EnvelopeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Envelope> Decoder for EnvelopeCodec<T> {
    type Item = T;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, WireError> {
        if src.is_empty() {
            return Ok(None);
        }

        let (tag, length) = match parse_header(&src[..]) {
            Ok((_remaining_bytes, header)) => header,
            Err(Err::Incomplete(_)) => return Ok(None),
            Err(_) => return Err(WireError::ParseFailure),
        };

        if length > self.max_length {
            return Err(WireError::FrameTooLarge {
                length,
                max: self.max_length,
            });
        }

        // max_length keeps this within usize on every supported target
        let frame_len = HEADER_LEN + length as usize;
        if src.len() < frame_len {
            // Not all of the payload is here yet, make room for the rest in one go.
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let payload = src.split_to(length as usize).freeze();
        debug!("Decoded frame tag {tag} with {length} payload bytes");

        T::from_parts(tag, payload).map(Some)
    }
}

impl<T: Envelope> Encoder<T> for EnvelopeCodec<T> {
    type Error = WireError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.payload();

        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u8(item.tag());
        dst.put_u64(payload.len() as u64);
        dst.extend_from_slice(payload);

        Ok(())
    }
}
