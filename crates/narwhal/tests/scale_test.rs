use narwhal::node::collect_layout_nodes;
use narwhal::tree::{Node, Tree};
use narwhal::scale::MIN_SCALE_FACTOR;
use narwhal::{Error, Layout, LayoutNodes, LayoutSettings, Scale, ScaleCategory};
use std::f64::consts::SQRT_2;

/// 1000x1000 canvas with no fixed-size (absolute) stem components.
fn scalable_only() -> LayoutSettings {
    LayoutSettings {
        svg_width: 1000.0,
        svg_height: 1000.0,
        label_minimum_space: 0.0,
        line_width: 0.0,
        ..Default::default()
    }
}

fn single_leaf(between: f64, within: f64) -> Tree {
    let mut tree = Tree::new();
    tree.insert(Node::new("leaf", None, between, within)).unwrap();
    tree
}

/// Root `n0` down to `n{len - 1}`, every node carrying the same weights.
fn chain(len: usize, between: f64, within: f64) -> Tree {
    let mut tree = Tree::new();
    tree.insert(Node::new("n0", None, between, within)).unwrap();
    for i in 1..len {
        let parent = format!("n{}", i - 1);
        tree.insert(Node::new(format!("n{i}"), Some(&parent), between, within))
            .unwrap();
    }
    tree
}

/// Zero-weight root `r` with one leaf per entry of `betweens`.
fn fan(betweens: &[f64]) -> Tree {
    let mut tree = Tree::new();
    tree.insert(Node::new("r", None, 0.0, 0.0)).unwrap();
    for (i, between) in betweens.iter().enumerate() {
        tree.insert(Node::new(format!("r/{i}"), Some("r"), *between, 0.0))
            .unwrap();
    }
    tree
}

fn nodes(tree: &Tree, settings: &LayoutSettings) -> LayoutNodes {
    let ids = tree.depth_first_ids();
    collect_layout_nodes(tree, ids.iter().map(String::as_str), settings).unwrap()
}

fn calculated(nodes: &LayoutNodes, settings: &LayoutSettings) -> Scale {
    let mut scale = Scale::new(settings);
    scale.calculate_scale_factor(nodes).unwrap();
    scale
}

fn category(scale: &Scale) -> ScaleCategory {
    scale.decisive_weight().unwrap().category
}

#[test]
fn scale_single_leaf_of_half_height_is_bound_by_longest() {
    let settings = scalable_only();
    let tree = single_leaf(settings.svg_height / 2.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    let f = scale.scale_factor();
    assert!(f > 2.8 && f < 3.0, "scale factor: {f}");
}

#[test]
fn scale_single_leaf_of_half_height_on_default_canvas() {
    let settings = LayoutSettings {
        label_minimum_space: 0.0,
        line_width: 0.0,
        ..Default::default()
    };
    let tree = single_leaf(settings.svg_height / 2.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    // Stretched height less both insets, over the leaf: (1125 - 60) / 375.
    let f = scale.scale_factor();
    assert!((f - 1065.0 / 375.0).abs() < 1e-12, "scale factor: {f}");
    assert!(f > 2.8 && f < 3.0);
}

#[test]
fn scale_two_uneven_leaves_are_bound_by_shortest() {
    let settings = scalable_only();
    let mut tree = Tree::new();
    tree.insert(Node::new("r", None, 0.0, 0.0)).unwrap();
    tree.insert(Node::new("r/a", Some("r"), settings.svg_width, 0.0))
        .unwrap();
    tree.insert(Node::new("r/b", Some("r"), settings.svg_width * 2.01, 0.0))
        .unwrap();
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Shortest);
    let f = scale.scale_factor();
    assert!(f > 0.4 && f < 0.5, "scale factor: {f}");
}

#[test]
fn scale_very_long_leaf_stretches_the_canvas() {
    let settings = scalable_only();
    let tree = single_leaf(settings.svg_height * 3.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    assert_eq!(scale.final_svg_height(), settings.svg_height * 1.5);
    let f = scale.scale_factor();
    assert!(f > 0.4 && f < 0.5, "scale factor: {f}");
}

#[test]
fn scale_canvas_wide_diameter_is_clamped() {
    let settings = scalable_only();
    let tree = single_leaf(0.0, 0.0);
    let mut nodes = nodes(&tree, &settings);
    nodes["leaf"].stem.raw.own_diameter = settings.svg_width;

    let scale = calculated(&nodes, &settings);
    assert_eq!(category(&scale), ScaleCategory::DiameterClamp);
    let f = scale.scale_factor();
    assert!(f > 0.2 && f < 0.25, "scale factor: {f}");
}

#[test]
fn scale_many_similar_leaves_are_bound_by_q25_triangle() {
    let settings = LayoutSettings::default();
    let mut tree = Tree::new();
    tree.insert(Node::new("r", None, 0.0, 0.0)).unwrap();
    for i in 0..8 {
        tree.insert(Node::new(format!("r/{i}"), Some("r"), 100.0, 0.0))
            .unwrap();
    }
    let scale = calculated(&nodes(&tree, &settings), &settings);

    // Half the drawable width over the 4-3-5 horizontal leg, minus two nodes of fixed length.
    let expected = (345.0 * 5.0 / 4.0 - 59.0) / 100.0;
    assert_eq!(category(&scale), ScaleCategory::Q25Triangle);
    assert!((scale.scale_factor() - expected).abs() < 1e-9);
    assert_eq!(scale.candidates().len(), 4);
}

#[test]
fn scale_without_stretch_keeps_configured_height() {
    let settings = LayoutSettings {
        allow_stretch: false,
        ..scalable_only()
    };
    let tree = single_leaf(3000.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    assert!((scale.scale_factor() - 940.0 / 3000.0).abs() < 1e-12);
    assert_eq!(scale.final_svg_height(), 1000.0);
}

#[test]
fn scale_calculation_is_idempotent() {
    let settings = LayoutSettings::default();
    let mut tree = Tree::new();
    tree.insert(Node::new("r", None, 3.0, 40.0)).unwrap();
    tree.insert(Node::new("r/a", Some("r"), 120.0, 10.0)).unwrap();
    tree.insert(Node::new("r/b", Some("r"), 30.0, 90.0)).unwrap();
    let nodes = nodes(&tree, &settings);

    let mut scale = Scale::new(&settings);
    scale.calculate_scale_factor(&nodes).unwrap();
    let first = (scale.scale_factor(), scale.decisive_weight().cloned());
    scale.calculate_scale_factor(&nodes).unwrap();
    let second = (scale.scale_factor(), scale.decisive_weight().cloned());
    assert_eq!(first, second);
}

#[test]
fn scale_line_length_and_circle_radius_follow_the_factor() {
    let settings = scalable_only();
    let tree = single_leaf(500.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);
    let f = scale.scale_factor();

    for n in [0.0, 1.0, 12.5, 1000.0] {
        assert_eq!(scale.line_length(n), n * f);
        assert_eq!(
            scale.circle_radius(n),
            scale.line_length(n) / (2.0 * std::f64::consts::PI)
        );
    }
}

#[test]
fn scale_rejects_trees_with_nothing_to_scale() {
    let settings = scalable_only();
    let tree = single_leaf(0.0, 0.0);
    let mut scale = Scale::new(&settings);
    let err = scale
        .calculate_scale_factor(&nodes(&tree, &settings))
        .unwrap_err();
    assert!(matches!(err, Error::NoScaleConstraint));
    assert_eq!(scale.scale_factor(), 1.0);
    assert!(scale.decisive_weight().is_none());
}

#[test]
fn scale_category_serializes_with_display_names() {
    let settings = scalable_only();
    let tree = single_leaf(500.0, 0.0);
    let mut layout = Layout::new(&tree, settings).unwrap();
    let result = layout.generate().unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["scale"]["decisiveWeight"]["category"], "longest");
    assert_eq!(
        json["scale"]["decisiveWeight"]["diagnostics"]["kind"],
        "longest"
    );
}

#[test]
fn scale_deep_chain_beyond_canvas_keeps_longest_at_floor() {
    let settings = LayoutSettings::default();
    // 40 nodes of fixed length (29.5 each) already overflow the 1065px budget.
    let tree = chain(40, 5.0, 0.0);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    assert_eq!(scale.scale_factor(), MIN_SCALE_FACTOR);
    assert_eq!(scale.final_svg_height(), settings.svg_height * 1.5);
}

#[test]
fn scale_deep_chain_is_not_released_by_diameter_clamp() {
    let settings = LayoutSettings::default();
    let tree = chain(40, 5.0, 3.0);
    let mut layout = Layout::new(&tree, settings).unwrap();
    let result = layout.generate().unwrap();

    let decisive = layout.scale().decisive_weight().unwrap();
    assert_eq!(decisive.category, ScaleCategory::Longest);
    assert_eq!(decisive.scale_factor, MIN_SCALE_FACTOR);
    assert!(
        layout
            .scale()
            .candidates()
            .iter()
            .any(|c| c.category == ScaleCategory::DiameterClamp && c.scale_factor > 100.0)
    );
    for (id, p) in &result.positions {
        assert!(p.x.is_finite() && p.y.is_finite(), "{id} at {p:?}");
    }
}

#[test]
fn scale_quantile_with_one_unreachable_leg_keeps_floor() {
    let settings = LayoutSettings::default();
    // Leaves 15 nodes deep carry 442.5px of fixed length, more than the 431.25px the q25
    // horizontal leg allows, while the vertical leg still fits.
    let mut tree = chain(14, 10.0, 0.0);
    for i in 0..4 {
        tree.insert(Node::new(format!("leaf{i}"), Some("n13"), 10.0, 0.0))
            .unwrap();
    }
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Q25Triangle);
    assert_eq!(scale.scale_factor(), MIN_SCALE_FACTOR);
    let q50 = scale
        .candidates()
        .iter()
        .find(|c| c.category == ScaleCategory::Q50Triangle)
        .unwrap();
    assert!(q50.scale_factor > MIN_SCALE_FACTOR);
}

#[test]
fn scale_tie_between_shortest_and_longest_goes_to_shortest() {
    let settings = scalable_only();
    // shortest: 470 / (1440 - 970) = 1; longest: 1440 / 1440 = 1.
    let tree = fan(&[970.0, 1440.0]);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Shortest);
    assert_eq!(scale.scale_factor(), 1.0);
    let factors: Vec<(ScaleCategory, f64)> = scale
        .candidates()
        .iter()
        .map(|c| (c.category, c.scale_factor))
        .collect();
    assert_eq!(
        factors,
        [(ScaleCategory::Shortest, 1.0), (ScaleCategory::Longest, 1.0)]
    );
}

#[test]
fn scale_tie_between_longest_and_diameter_clamp_goes_to_longest() {
    let settings = scalable_only();
    // longest: 1440 / (1205 + 235) = 1; diameter clamp: 940 / 4 / 235 = 1.
    let tree = single_leaf(1205.0, 0.0);
    let mut nodes = nodes(&tree, &settings);
    nodes["leaf"].stem.raw.own_diameter = 235.0;
    let scale = calculated(&nodes, &settings);

    assert_eq!(category(&scale), ScaleCategory::Longest);
    assert_eq!(scale.scale_factor(), 1.0);
    assert!(
        scale
            .candidates()
            .iter()
            .any(|c| c.category == ScaleCategory::DiameterClamp && c.scale_factor == 1.0)
    );
}

#[test]
fn scale_median_leaf_far_from_lower_quartile_is_bound_by_q50_triangle() {
    let settings = scalable_only();
    let tree = fan(&[800.0, 1000.0, 1000.0, 1000.0]);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Q50Triangle);
    let expected = 470.0 * SQRT_2 / 1000.0;
    assert!((scale.scale_factor() - expected).abs() < 1e-9);
}

#[test]
fn scale_long_upper_quartile_is_bound_by_q75_triangle() {
    let settings = scalable_only();
    let tree = fan(&[700.0, 700.0, 1000.0, 1000.0]);
    let scale = calculated(&nodes(&tree, &settings), &settings);

    assert_eq!(category(&scale), ScaleCategory::Q75Triangle);
    let expected = 470.0 * 5.0 / 3.0 / 1000.0;
    assert!((scale.scale_factor() - expected).abs() < 1e-9);
}
