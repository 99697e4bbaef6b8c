// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SchemaSection;

#[test]
fn pre_data_and_post_data_map_to_distinct_flags_and_filenames() {
    assert_eq!(SchemaSection::PreData.pg_dump_flag(), "pre-data");
    assert_eq!(SchemaSection::PostData.pg_dump_flag(), "post-data");
    assert_ne!(SchemaSection::PreData.archive_filename(), SchemaSection::PostData.archive_filename());
}
