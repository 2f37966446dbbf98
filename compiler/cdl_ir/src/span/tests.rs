use super::*;

#[test]
fn test_merge_covers_both() {
    let a = Span::new(4, 7);
    let b = Span::new(1, 5);
    assert_eq!(a.merge(b), Span::new(1, 7));
    assert_eq!(b.merge(a), Span::new(1, 7));
}

#[test]
fn test_point_is_empty() {
    let p = Span::point(3);
    assert!(p.is_empty());
    assert_eq!(p.len(), 0);
}

#[test]
fn test_from_range() {
    assert_eq!(Span::from_range(2..9), Span::new(2, 9));
    assert_eq!(Span::from_range(2..9).len(), 7);
}

#[test]
fn test_slice() {
    let src = "Print: 1 + 2";
    assert_eq!(Span::new(0, 5).slice(src), Some("Print"));
    assert_eq!(Span::new(7, 40).slice(src), None);
}

#[test]
fn test_display() {
    assert_eq!(Span::new(1, 4).to_string(), "1..4");
    assert_eq!(format!("{:?}", Span::new(0, 2)), "0..2");
}
