use serde::Deserialize;
use serde::Serialize;
use tokio_util::bytes::Bytes;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;
use tokio_util::codec::LengthDelimitedCodec;

use crate::constants::DEFAULT_MAX_FRAME_LENGTH;
use crate::Document;
use crate::ProtocolError;

/// One frame on the wire. Replies carry the id of the request they answer
/// in `response_to`; requests leave it at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub request_id: u32,
    pub response_to: u32,
    pub body: Document,
}

/// Length-prefixed bincode frames.
///
/// A 4-byte big-endian length followed by the encoded [`Message`].
#[derive(Debug)]
pub struct WireCodec {
    frames: LengthDelimitedCodec,
}

impl WireCodec {
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            frames: LengthDelimitedCodec::builder()
                .max_frame_length(max_frame_length)
                .new_codec(),
        }
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl Decoder for WireCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Message>, ProtocolError> {
        match self.frames.decode(src)? {
            Some(frame) => bincode::deserialize(&frame)
                .map(Some)
                .map_err(ProtocolError::Decode),
            None => Ok(None),
        }
    }
}

impl Encoder<Message> for WireCodec {
    type Error = ProtocolError;

    fn encode(
        &mut self,
        message: Message,
        dst: &mut BytesMut,
    ) -> Result<(), ProtocolError> {
        let bytes = bincode::serialize(&message).map_err(ProtocolError::Encode)?;
        self.frames.encode(Bytes::from(bytes), dst)?;
        Ok(())
    }
}
