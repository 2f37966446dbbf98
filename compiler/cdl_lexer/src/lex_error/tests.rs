use super::*;

#[test]
fn test_messages() {
    let err = LexError::unterminated_string(Span::new(3, 8), '"');
    assert_eq!(
        err.to_string(),
        "unterminated string literal (missing closing '\"') at 3..8"
    );

    let err = LexError::trailing_escape(Span::new(0, 4));
    assert_eq!(err.to_string(), "escape character `\\` at end of input at 0..4");

    let err = LexError::malformed_number(Span::new(0, 5), "1.2.3");
    assert_eq!(err.to_string(), "malformed number `1.2.3` at 0..5");

    let err = LexError::unrecognized(Span::new(2, 3), '#');
    assert_eq!(err.to_string(), "unrecognized character '#' at 2..3");
}
