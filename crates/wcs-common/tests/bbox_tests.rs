//! Envelope parsing and containment tests.

use wcs_common::bbox::{BboxParseError, BoundingBox};

#[test]
fn test_parse_with_spaces() {
    let bbox = BoundingBox::parse(" -10.5, 20 ,30.25, 40 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(-10.5, 20.0, 30.25, 40.0));
    assert!((bbox.width() - 40.75).abs() < 1e-9);
    assert!((bbox.height() - 20.0).abs() < 1e-9);
}

#[test]
fn test_parse_wrong_arity() {
    assert!(matches!(
        BoundingBox::parse("0,0,10"),
        Err(BboxParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_parse_bad_number() {
    match BoundingBox::parse("0,0,ten,10") {
        Err(BboxParseError::InvalidNumber(n)) => assert_eq!(n, "ten"),
        other => panic!("Expected InvalidNumber, got {:?}", other),
    }
}

#[test]
fn test_parse_inverted() {
    assert!(matches!(
        BoundingBox::parse("10,10,5,5"),
        Err(BboxParseError::Inverted(_))
    ));
}

#[test]
fn test_degenerate_point_envelope() {
    let outer = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let point = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
    assert!(outer.contains(&point));
    assert!(outer.contains_point(180.0, -90.0));
    assert!(!outer.contains_point(180.1, 0.0));
}
