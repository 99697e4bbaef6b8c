// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn stem_is_zero_padded_hex() {
    let id = SegmentId(Lsn::new(0, 0x10));
    assert_eq!(id.stem(), "0000000000000010");
}

#[test]
fn json_and_sql_filenames_share_stem() {
    let id = SegmentId(Lsn::new(1, 0));
    assert_eq!(id.json_filename(), format!("{}.json", id.stem()));
    assert_eq!(id.sql_filename(), format!("{}.sql", id.stem()));
}

#[test]
fn segment_ids_order_by_lsn() {
    let a = SegmentId(Lsn::new(0, 10));
    let b = SegmentId(Lsn::new(0, 20));
    assert!(a < b);
}

#[test]
fn segment_paths_join_cdc_dir() {
    let id = SegmentId(Lsn::new(0, 1));
    let paths = SegmentPaths::new(Path::new("/var/lib/pgcopydb/cdc"), id);
    assert_eq!(
        paths.json_path,
        Path::new("/var/lib/pgcopydb/cdc/0000000000000001.json")
    );
    assert_eq!(
        paths.sql_path,
        Path::new("/var/lib/pgcopydb/cdc/0000000000000001.sql")
    );
}
