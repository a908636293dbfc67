use tokio_util::bytes::BufMut;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use super::*;
use crate::doc;
use crate::ProtocolError;

fn create_command() -> Message {
    Message {
        request_id: 7,
        response_to: 0,
        body: doc! {
            "create" => "test_collection_methods",
            "writeConcern" => doc! { "w" => 2, "wtimeout" => 1000 },
        },
    }
}

#[test]
fn test_decoded_frame_matches_encoded_message() {
    let mut codec = WireCodec::default();
    let mut buffer = BytesMut::new();

    codec.encode(create_command(), &mut buffer).unwrap();
    let decoded = codec.decode(&mut buffer).unwrap();

    assert_eq!(decoded, Some(create_command()));
    assert!(buffer.is_empty());
}

#[test]
fn test_partial_frame_waits_for_more_bytes() {
    let mut codec = WireCodec::default();
    let mut buffer = BytesMut::new();
    codec.encode(create_command(), &mut buffer).unwrap();

    let mut partial = buffer.split_to(buffer.len() - 3);
    assert!(codec.decode(&mut partial).unwrap().is_none());

    partial.unsplit(buffer);
    assert!(codec.decode(&mut partial).unwrap().is_some());
}

#[test]
fn test_two_frames_decode_in_order() {
    let mut codec = WireCodec::default();
    let mut buffer = BytesMut::new();

    let mut second = create_command();
    second.request_id = 8;
    codec.encode(create_command(), &mut buffer).unwrap();
    codec.encode(second, &mut buffer).unwrap();

    assert_eq!(codec.decode(&mut buffer).unwrap().unwrap().request_id, 7);
    assert_eq!(codec.decode(&mut buffer).unwrap().unwrap().request_id, 8);
}

#[test]
fn test_garbage_payload_is_a_decode_error() {
    let mut codec = WireCodec::default();
    let mut buffer = BytesMut::new();
    buffer.put_u32(3);
    buffer.put_slice(&[0xff, 0xff, 0xff]);

    let result = codec.decode(&mut buffer);

    assert!(matches!(result, Err(ProtocolError::Decode(_))));
}

#[test]
fn test_oversized_frame_is_rejected() {
    let mut codec = WireCodec::new(1024);
    let mut buffer = BytesMut::new();
    buffer.put_u32(4096);
    buffer.put_slice(&[0u8; 16]);

    let result = codec.decode(&mut buffer);

    assert!(matches!(result, Err(ProtocolError::Frame(_))));
}

fn nested_document(levels: usize) -> crate::Document {
    let mut document = doc! { "leaf" => 1 };
    for _ in 0..levels {
        document = doc! { "a" => document };
    }
    document
}

/// Hand-built frame holding `levels` nested documents, laid out as bincode
/// writes `Message`: ids, then per level a one-entry map keyed `a` whose
/// value is the `Document` variant.
fn deeply_nested_frame(levels: usize) -> BytesMut {
    const DOCUMENT_VARIANT: u32 = 9;

    let mut payload = BytesMut::new();
    payload.put_u32_le(1);
    payload.put_u32_le(0);
    for _ in 0..levels {
        payload.put_u64_le(1);
        payload.put_u64_le(1);
        payload.put_slice(b"a");
        payload.put_u32_le(DOCUMENT_VARIANT);
    }
    payload.put_u64_le(0);

    let mut frame = BytesMut::new();
    frame.put_u32(payload.len() as u32);
    frame.unsplit(payload);
    frame
}

#[test]
fn test_nesting_within_limit_decodes() {
    let mut codec = WireCodec::default();
    let mut buffer = BytesMut::new();
    let message = Message {
        request_id: 1,
        response_to: 0,
        body: nested_document(50),
    };

    codec.encode(message.clone(), &mut buffer).unwrap();

    assert_eq!(codec.decode(&mut buffer).unwrap(), Some(message));
}

#[test]
fn test_excessive_nesting_is_a_decode_error() {
    let mut codec = WireCodec::default();
    let mut buffer = deeply_nested_frame(100_000);

    let result = codec.decode(&mut buffer);

    assert!(matches!(result, Err(ProtocolError::Decode(_))));
}

#[test]
fn test_decoding_recovers_after_rejected_nesting() {
    let mut codec = WireCodec::default();
    let mut rejected = deeply_nested_frame(1_000);
    assert!(codec.decode(&mut rejected).is_err());

    let mut buffer = BytesMut::new();
    codec.encode(create_command(), &mut buffer).unwrap();

    assert_eq!(codec.decode(&mut buffer).unwrap(), Some(create_command()));
}
