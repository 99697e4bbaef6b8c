// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_core::PartitionKey;

fn table(oid: u32) -> SourceTable {
    SourceTable {
        oid,
        namespace: "public".into(),
        relname: "accounts".into(),
        est_row_count: 100,
        relation_size: 8192,
        partition_key: PartitionKey::None,
        restore_list_name: "public.accounts".into(),
    }
}

#[tokio::test]
async fn fetch_tables_returns_canned_rows_and_records_the_call() {
    let fake = FakeSourceConnection::new();
    fake.set_tables(vec![table(16400)]);

    let tables = fake.fetch_tables().await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].oid, 16400);
    assert_eq!(fake.calls(), vec![SourceCall::FetchTables]);
}

#[tokio::test]
async fn adopt_snapshot_records_the_token() {
    let fake = FakeSourceConnection::new();
    fake.adopt_snapshot("00000003-1").await.unwrap();
    assert_eq!(fake.adopted_token(), Some("00000003-1".to_string()));
}

#[tokio::test]
async fn sequence_value_without_canned_data_errors() {
    let fake = FakeSourceConnection::new();
    let result = fake.sequence_value("public.accounts_id_seq").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn copy_table_to_returns_canned_payload_and_byte_count() {
    let fake = FakeSourceConnection::new();
    fake.set_copy_payload("COPY public.accounts TO STDOUT", b"1\tAlice\n".to_vec());

    let (bytes, outcome) = fake.copy_table_to("COPY public.accounts TO STDOUT").await.unwrap();
    assert_eq!(bytes, b"1\tAlice\n");
    assert_eq!(outcome.bytes, 8);
}

#[tokio::test]
async fn large_object_oids_are_returned_in_ascending_order() {
    let fake = FakeSourceConnection::new();
    fake.set_large_object(300, b"b".to_vec());
    fake.set_large_object(100, b"a".to_vec());

    let oids = fake.fetch_large_object_oids().await.unwrap();
    assert_eq!(oids, vec![100, 300]);
}

#[tokio::test]
async fn reading_an_uncanned_large_object_errors() {
    let fake = FakeSourceConnection::new();
    assert!(fake.read_large_object(999).await.is_err());
}
