//! End-to-end scenarios mirroring spec.md §8's literal test cases, plus the
//! invariants that must hold across every registered mode.

use tbpu::{parse, Point, Quad, Separator, TextBlock};

fn axis_block(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> TextBlock {
    TextBlock::new(
        Quad::new(
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ),
        text,
        0.9,
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// S1 — single line, Latin.
#[test]
fn s1_single_line_latin() {
    init_tracing();
    let blocks = vec![
        axis_block(0.0, 0.0, 50.0, 10.0, "Hello"),
        axis_block(60.0, 0.0, 110.0, 10.0, "World"),
    ];
    let out = parse("single_line", blocks).unwrap();
    assert_eq!(out[0].text, "Hello");
    assert_eq!(out[1].text, "World");
    assert_eq!(out[0].end, Some(Separator::Space));
    assert_eq!(out[1].end, Some(Separator::Newline));
}

/// S2 — two paragraphs, same column.
#[test]
fn s2_two_paragraphs_same_column() {
    let blocks = vec![
        axis_block(0.0, 0.0, 100.0, 10.0, "foo"),
        axis_block(0.0, 12.0, 100.0, 22.0, "bar"),
        axis_block(0.0, 40.0, 100.0, 50.0, "baz"),
    ];
    let out = parse("multi_para", blocks).unwrap();
    assert_eq!(out[0].end, Some(Separator::Space));
    assert_eq!(out[1].end, Some(Separator::Newline));
    assert_eq!(out[2].end, Some(Separator::Newline));
}

/// S3 — two-column page.
#[test]
fn s3_two_column_page() {
    let blocks = vec![
        axis_block(0.0, 0.0, 50.0, 10.0, "A1"),
        axis_block(0.0, 20.0, 50.0, 30.0, "A2"),
        axis_block(60.0, 0.0, 110.0, 10.0, "B1"),
        axis_block(60.0, 20.0, 110.0, 30.0, "B2"),
    ];
    let out = parse("multi_para", blocks).unwrap();
    let texts: Vec<&str> = out.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["A1", "A2", "B1", "B2"]);
}

/// S4 — CJK concatenation.
#[test]
fn s4_cjk_concatenation() {
    let blocks = vec![
        axis_block(0.0, 0.0, 100.0, 10.0, "你好世界"),
        axis_block(0.0, 11.0, 100.0, 21.0, "欢迎使用"),
    ];
    let out = parse("multi_para", blocks).unwrap();
    assert_eq!(out[0].end, Some(Separator::Empty));
    assert_eq!(out[1].end, Some(Separator::Newline));
}

/// S5 — rotated page: the same four blocks as S3, uniformly rotated by
/// +10 degrees, must normalize back to the same reading order.
#[test]
fn s5_rotated_page_normalizes_to_the_same_order() {
    let theta = 10.0_f64.to_radians();
    let rotated = |x0: f64, y0: f64, x1: f64, y1: f64, text: &str| {
        let corners = [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
        .map(|p| p.rotate(theta));
        TextBlock::new(Quad::new(corners[0], corners[1], corners[2], corners[3]), text, 0.9)
    };
    let blocks = vec![
        rotated(0.0, 0.0, 50.0, 10.0, "A1"),
        rotated(0.0, 20.0, 50.0, 30.0, "A2"),
        rotated(60.0, 0.0, 110.0, 10.0, "B1"),
        rotated(60.0, 20.0, 110.0, 30.0, "B2"),
    ];
    let out = parse("multi_para", blocks).unwrap();
    let texts: Vec<&str> = out.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["A1", "A2", "B1", "B2"]);
}

/// S6 — code indent.
#[test]
fn s6_code_indent() {
    let blocks = vec![
        axis_block(10.0, 0.0, 30.0, 12.0, "def f():"),
        axis_block(30.0, 16.0, 60.0, 28.0, "return 1"),
        axis_block(10.0, 32.0, 40.0, 44.0, "g()"),
    ];
    let out = parse("single_code", blocks).unwrap();
    assert_eq!(out.len(), 3);
    assert!(!out[0].text.starts_with("  "));
    assert!(out[1].text.starts_with("  "));
    assert!(!out[2].text.starts_with("  "));
    for b in &out {
        assert_eq!(b.quad.top_left().x, 10.0);
    }
}

/// Invariant 1: every mode but `single_code` preserves block count.
#[test]
fn invariant_permutation_preserving_modes_keep_block_count() {
    let make = || {
        vec![
            axis_block(0.0, 0.0, 50.0, 10.0, "a"),
            axis_block(60.0, 0.0, 110.0, 10.0, "b"),
            axis_block(0.0, 20.0, 50.0, 30.0, "c"),
        ]
    };
    for mode in [
        "none",
        "multi_para",
        "multi_line",
        "multi_none",
        "single_para",
        "single_line",
        "single_none",
    ] {
        let out = parse(mode, make()).unwrap();
        assert_eq!(out.len(), 3, "mode {mode} should preserve block count");
    }
}

/// Invariant 2: every output block's `end` is set.
#[test]
fn invariant_every_output_block_has_an_end() {
    let blocks = vec![
        axis_block(0.0, 0.0, 50.0, 10.0, "a"),
        axis_block(60.0, 0.0, 110.0, 10.0, "b"),
    ];
    let out = parse("multi_none", blocks).unwrap();
    assert!(out.iter().all(|b| b.end.is_some()));
}

/// Invariant 5: `none` is idempotent once `end` is already set.
#[test]
fn invariant_none_mode_is_idempotent() {
    let blocks = vec![axis_block(0.0, 0.0, 50.0, 10.0, "a")];
    let once = parse("none", blocks).unwrap();
    let twice = parse("none", once.clone()).unwrap();
    assert_eq!(once[0].end, twice[0].end);
}

/// Reading-order law: a single horizontal row is emitted left-to-right
/// under every mode.
#[test]
fn reading_order_law_single_row_left_to_right() {
    let make = || {
        vec![
            axis_block(60.0, 0.0, 110.0, 10.0, "right"),
            axis_block(0.0, 0.0, 50.0, 10.0, "left"),
        ]
    };
    for mode in ["multi_para", "multi_line", "multi_none", "single_line"] {
        let out = parse(mode, make()).unwrap();
        assert_eq!(out[0].text, "left", "mode {mode} should sort left-to-right");
        assert_eq!(out[1].text, "right");
    }
}
