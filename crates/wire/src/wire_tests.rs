// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use crate::work_item::WorkItem;

#[test]
fn encode_returns_json_without_length_prefix() {
    let item = WorkItem::TableOid(42);
    let encoded = encode(&item).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {}", json_str);
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn write_message_rejects_oversized_payload() {
    let oversized = vec![0u8; MAX_FRAME_LEN + 1];
    let mut buffer = Vec::new();
    let err = write_message(&mut buffer, &oversized).await.unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge(_)));
}

#[tokio::test]
async fn frame_roundtrips_a_work_item() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &WorkItem::IndexOid(7)).await.unwrap();
    let mut cursor = std::io::Cursor::new(buffer);
    let back: WorkItem = read_frame(&mut cursor).await.unwrap();
    assert_eq!(back, WorkItem::IndexOid(7));
}
