use crate::geom::{PieceIdentity, classify, distance_from_center, is_inside_object};

use super::{default_params, params};

#[test]
fn points_below_the_board_are_outside() {
    let p = default_params(0);
    assert!(classify([0.0, -0.1, 0.0], &p).is_none());
    assert!(!is_inside_object([0.0, -1e-9, 0.0], &p));
    assert!(is_inside_object([0.0, 0.0, 0.0], &p));
}

#[test]
fn sphere_surface_is_inside_and_beyond_is_outside() {
    let p = default_params(0);
    assert_eq!(
        classify([40.0, 0.0, 0.0], &p),
        Some(PieceIdentity::new(0, 8, 0, 0))
    );
    assert!(classify([40.0, 1.0, 0.0], &p).is_none());
    assert!((distance_from_center([3.0, 4.0, 12.0]) - 13.0).abs() < 1e-12);
}

#[test]
fn centre_sits_in_the_innermost_layer() {
    let p = default_params(0);
    // floor((40 - 0) / 3) = 13
    assert_eq!(classify([0.0, 0.0, 0.0], &p), Some(PieceIdentity::new(13, 0, 0, 0)));
}

#[test]
fn negative_coordinates_floor_towards_negative_cells() {
    let p = default_params(0);
    let id = classify([-0.5, 1.0, -7.0], &p).expect("inside");
    assert_eq!(id.vertical, -1);
    assert_eq!(id.cross, -2);
    assert_eq!(id.horizontal, 0);
}

#[test]
fn horizontal_index_uses_equal_bands() {
    let p = default_params(3);
    let id = classify([0.0, 25.0, 0.0], &p).expect("inside");
    assert_eq!(id, PieceIdentity::new(5, 0, 0, 2));

    let without_cuts = classify([0.0, 25.0, 0.0], &default_params(0)).expect("inside");
    assert_eq!(without_cuts.horizontal, 0);
}

#[test]
fn outer_shell_is_layer_zero() {
    let p = params(10.0, 2.0, 5.0, 0);
    let id = classify([0.0, 9.0, 0.0], &p).expect("inside");
    assert_eq!(id.layer, 0);
    let id = classify([0.0, 7.5, 0.0], &p).expect("inside");
    assert_eq!(id.layer, 1);
}

#[test]
fn identity_display_matches_piece_key_format() {
    assert_eq!(PieceIdentity::new(2, -1, 3, 0).to_string(), "L2_V-1_C3_H0");
}

#[test]
fn maximum_horizontal_cut_count_still_classifies() {
    let p = default_params(u32::MAX);
    let id = classify([0.0, 1.0, 0.0], &p).expect("inside");
    assert_eq!(id.horizontal, 107_374_182);
    assert_eq!(classify([0.0, 0.0, 0.0], &p).map(|id| id.horizontal), Some(0));
}
