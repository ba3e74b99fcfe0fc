use cake_cutter_core::decompose::decompose;
use cake_cutter_core::{CutterConfig, CutterError, Rect, Shape};

fn cfg_120_pad_10() -> CutterConfig {
    CutterConfig::builder().container(120, 120).padding(10, 10).build()
}

#[test]
fn just_over_container_yields_tile_strips_and_corner() {
    let p = decompose("a", Shape::new(121, 121), &cfg_120_pad_10()).unwrap();
    assert_eq!(p.full, vec![("a", Rect::new(0, 0, 120, 120))]);
    assert_eq!(p.fit_width, vec![("a", Rect::new(0, 100, 120, 21))]);
    assert_eq!(p.fit_height, vec![("a", Rect::new(100, 0, 21, 120))]);
    assert_eq!(p.small, vec![("a", Rect::new(100, 100, 21, 21))]);
    assert_eq!(p.len(), 4);
}

#[test]
fn matrix_inside_container_is_one_small_piece() {
    let p = decompose(7usize, Shape::new(100, 50), &cfg_120_pad_10()).unwrap();
    assert!(p.full.is_empty() && p.fit_width.is_empty() && p.fit_height.is_empty());
    assert_eq!(p.small, vec![(7, Rect::new(0, 0, 100, 50))]);
}

#[test]
fn remainder_of_exactly_twice_padding_is_dropped() {
    // 220 - 2 * 100 = 20 rows left over: the last tile row already reaches the bottom edge.
    let p = decompose("m", Shape::new(340, 220), &cfg_120_pad_10()).unwrap();
    let tiles: Vec<Rect> = p.full.iter().map(|(_, r)| *r).collect();
    assert_eq!(
        tiles,
        vec![
            Rect::new(0, 0, 120, 120),
            Rect::new(0, 100, 120, 120),
            Rect::new(100, 0, 120, 120),
            Rect::new(100, 100, 120, 120),
            Rect::new(200, 0, 120, 120),
            Rect::new(200, 100, 120, 120),
        ]
    );
    assert!(p.fit_width.is_empty());
    assert_eq!(
        p.fit_height,
        vec![("m", Rect::new(300, 0, 40, 120)), ("m", Rect::new(300, 100, 40, 120))]
    );
    assert!(p.small.is_empty());
}

#[test]
fn narrow_tall_matrix_has_no_full_tiles() {
    let p = decompose("n", Shape::new(50, 300), &cfg_120_pad_10()).unwrap();
    assert!(p.full.is_empty());
    assert!(p.fit_width.is_empty());
    assert_eq!(
        p.fit_height,
        vec![("n", Rect::new(0, 0, 50, 120)), ("n", Rect::new(0, 100, 50, 120))]
    );
    assert_eq!(p.small, vec![("n", Rect::new(0, 200, 50, 100))]);
}

#[test]
fn container_wide_matrix_without_padding_is_one_strip() {
    let cfg = CutterConfig::new(Shape::new(120, 120));
    let p = decompose("w", Shape::new(120, 50), &cfg).unwrap();
    assert!(p.full.is_empty());
    assert_eq!(p.fit_width, vec![("w", Rect::new(0, 0, 120, 50))]);
    assert!(p.fit_height.is_empty());
    assert!(p.small.is_empty());
}

#[test]
fn collections_concatenate_in_order() {
    let cfg = cfg_120_pad_10();
    let a = decompose("a", Shape::new(121, 121), &cfg).unwrap();
    let b = decompose("b", Shape::new(60, 60), &cfg).unwrap();
    let merged = a.clone() + b;
    assert_eq!(merged.full, a.full);
    assert_eq!(
        merged.small,
        vec![
            ("a", Rect::new(100, 100, 21, 21)),
            ("b", Rect::new(0, 0, 60, 60)),
        ]
    );
    let collected: cake_cutter_core::decompose::PiecesCollection<&str> = ["x", "y"]
        .into_iter()
        .map(|id| decompose(id, Shape::new(121, 121), &cfg).unwrap())
        .collect();
    assert_eq!(collected.len(), 8);
    assert_eq!(collected.fit_width[1].0, "y");
}

#[test]
fn invalid_sizes_are_errors_not_panics() {
    // no room left between the margins: a tile would advance by zero pixels
    let cfg = CutterConfig::new(Shape::new(20, 120)).with_padding(Shape::new(10, 10));
    let err = decompose("a", Shape::new(500, 500), &cfg).unwrap_err();
    assert!(matches!(err, CutterError::InvalidConfig { .. }));

    let err = decompose("z", Shape::new(500, 500), &CutterConfig::new(Shape::new(0, 0))).unwrap_err();
    assert!(matches!(err, CutterError::InvalidDimensions { .. }));

    let err = decompose("thin", Shape::new(15, 300), &cfg_120_pad_10()).unwrap_err();
    assert!(matches!(err, CutterError::MatrixTooSmall { .. }));
}
