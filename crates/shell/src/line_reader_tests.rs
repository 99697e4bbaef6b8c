// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Cursor;

#[tokio::test]
async fn collects_each_line_without_trailing_newline() {
    let input = Cursor::new(b"1; 16400 TABLE public accounts postgres\n2; 16401 INDEX public accounts_pkey postgres\n".to_vec());
    let lines = collect_lines(input).await.unwrap();
    assert_eq!(
        lines,
        vec![
            "1; 16400 TABLE public accounts postgres",
            "2; 16401 INDEX public accounts_pkey postgres",
        ]
    );
}

#[tokio::test]
async fn empty_input_yields_no_lines() {
    let input = Cursor::new(Vec::new());
    let lines = collect_lines(input).await.unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn final_line_without_trailing_newline_is_still_collected() {
    let input = Cursor::new(b"only line, no newline".to_vec());
    let lines = collect_lines(input).await.unwrap();
    assert_eq!(lines, vec!["only line, no newline"]);
}
