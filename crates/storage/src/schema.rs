// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DDL for the catalog store (spec §2, §4.2). Every statement is
//! `CREATE TABLE IF NOT EXISTS`, so opening an existing store is a
//! no-op migration.

pub const DDL: &str = r#"
PRAGMA journal_mode=WAL;
PRAGMA synchronous=NORMAL;
PRAGMA busy_timeout=5000;
PRAGMA foreign_keys=ON;

CREATE TABLE IF NOT EXISTS setup (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    source_uri TEXT NOT NULL,
    target_uri TEXT NOT NULL,
    snapshot_token TEXT NOT NULL,
    split_threshold INTEGER NOT NULL,
    split_max_parts INTEGER NOT NULL,
    filters_digest TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sections (
    name TEXT PRIMARY KEY,
    started_at_ms INTEGER NOT NULL,
    done_at_ms INTEGER,
    object_count INTEGER NOT NULL DEFAULT 0,
    byte_count INTEGER NOT NULL DEFAULT 0,
    job_mask INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS source_tables (
    oid INTEGER PRIMARY KEY,
    namespace TEXT NOT NULL,
    relname TEXT NOT NULL,
    est_row_count INTEGER NOT NULL,
    relation_size INTEGER NOT NULL,
    partition_key_kind TEXT NOT NULL,
    partition_key_column TEXT,
    restore_list_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS source_indexes (
    oid INTEGER PRIMARY KEY,
    table_oid INTEGER NOT NULL,
    index_name TEXT NOT NULL,
    is_constraint INTEGER NOT NULL,
    is_primary INTEGER NOT NULL,
    definition TEXT NOT NULL,
    restore_list_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS source_sequences (
    oid INTEGER PRIMARY KEY,
    last_value INTEGER NOT NULL,
    is_called INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS source_extensions (
    oid INTEGER PRIMARY KEY,
    extname TEXT NOT NULL,
    extversion TEXT NOT NULL,
    restore_list_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS source_extension_config_relations (
    extension_oid INTEGER NOT NULL,
    ord INTEGER NOT NULL,
    namespace TEXT NOT NULL,
    relname TEXT NOT NULL,
    relkind TEXT NOT NULL,
    condition TEXT,
    PRIMARY KEY (extension_oid, ord)
);

CREATE TABLE IF NOT EXISTS filter_decisions (
    decision_key TEXT PRIMARY KEY,
    key_kind TEXT NOT NULL,
    kind TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sentinel (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    startpos TEXT NOT NULL,
    endpos TEXT,
    apply INTEGER NOT NULL,
    write_lsn TEXT NOT NULL,
    flush_lsn TEXT NOT NULL,
    replay_lsn TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lsn_tracking (
    source_lsn TEXT PRIMARY KEY,
    target_insert_lsn TEXT NOT NULL,
    recorded_at_ms INTEGER NOT NULL
);
"#;
