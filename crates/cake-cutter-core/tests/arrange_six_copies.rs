use cake_cutter_core::check::verify;
use cake_cutter_core::{Container, CutterConfig, Layout, PieceKind, Rect, Shape, arrange};

const IDS: [&str; 6] = ["m0", "m1", "m2", "m3", "m4", "m5"];

fn run() -> (CutterConfig, Vec<(&'static str, Shape)>, Vec<Container<&'static str>>) {
    let cfg = CutterConfig::new(Shape::new(120, 120)).with_padding(Shape::new(10, 10));
    let matrices: Vec<(&str, Shape)> = IDS.iter().map(|id| (*id, Shape::new(121, 121))).collect();
    let containers = arrange(matrices.clone(), &cfg).expect("arrange should succeed");
    (cfg, matrices, containers)
}

fn dests(c: &Container<&'static str>) -> Vec<(&'static str, Rect)> {
    c.pieces
        .iter()
        .map(|m| (*m.source_id(), m.destination()))
        .collect()
}

#[test]
fn full_tiles_come_first_one_per_container() {
    let (_, _, containers) = run();
    assert_eq!(containers.len(), 10);
    for (i, c) in containers[..6].iter().enumerate() {
        assert_eq!(c.len(), 1);
        let m = &c.pieces[0];
        assert_eq!(*m.source_id(), IDS[i]);
        assert_eq!(m.kind(), PieceKind::Full);
        assert_eq!(m.source(), Rect::new(0, 0, 120, 120));
        assert_eq!(m.destination(), Rect::new(0, 0, 120, 120));
    }
}

#[test]
fn width_strips_and_corners_share_containers() {
    let (_, _, containers) = run();
    assert_eq!(
        dests(&containers[6]),
        vec![
            ("m5", Rect::new(0, 0, 120, 21)),
            ("m4", Rect::new(0, 21, 120, 21)),
            ("m3", Rect::new(0, 42, 120, 21)),
            ("m2", Rect::new(0, 63, 120, 21)),
            ("m1", Rect::new(0, 84, 120, 21)),
        ]
    );
    assert_eq!(
        dests(&containers[7]),
        vec![
            ("m0", Rect::new(0, 0, 120, 21)),
            ("m0", Rect::new(0, 21, 21, 21)),
            ("m1", Rect::new(21, 21, 21, 21)),
            ("m2", Rect::new(42, 21, 21, 21)),
            ("m3", Rect::new(42, 42, 21, 21)),
            ("m4", Rect::new(63, 42, 21, 21)),
            ("m5", Rect::new(63, 63, 21, 21)),
        ]
    );
    for m in &containers[7].pieces[1..] {
        assert_eq!(m.kind(), PieceKind::Small);
        assert_eq!(m.source(), Rect::new(100, 100, 21, 21));
    }
}

#[test]
fn height_strips_fill_the_last_containers() {
    let (_, _, containers) = run();
    assert_eq!(
        dests(&containers[8]),
        vec![
            ("m5", Rect::new(0, 0, 21, 120)),
            ("m4", Rect::new(21, 0, 21, 120)),
            ("m3", Rect::new(42, 0, 21, 120)),
            ("m2", Rect::new(63, 0, 21, 120)),
            ("m1", Rect::new(84, 0, 21, 120)),
        ]
    );
    assert_eq!(dests(&containers[9]), vec![("m0", Rect::new(0, 0, 21, 120))]);
}

#[test]
fn layout_passes_all_checks() {
    let (cfg, matrices, containers) = run();
    let layout = Layout::new(&cfg, containers);
    assert!(verify(&layout, &matrices).is_empty());
    let stats = layout.stats();
    assert_eq!(stats.num_containers, 10);
    assert_eq!(stats.num_pieces, 24);
    assert_eq!(stats.num_full, 6);
    assert_eq!(stats.num_fit_width, 6);
    assert_eq!(stats.num_fit_height, 6);
    assert_eq!(stats.num_small, 6);
}
