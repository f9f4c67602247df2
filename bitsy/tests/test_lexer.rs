use bitsy::{lexer::tokenize, tokens::TokenKind};

#[test]
fn test_spans_cover_source() {
    for source in [
        include_str!("../programs/fibonacci.bitsy"),
        include_str!("../programs/factorial.bitsy"),
        include_str!("../programs/conditions.bitsy"),
    ] {
        let tokens = match tokenize(source) {
            Ok(tokens) => tokens,
            Err(err) => panic!("{}", err),
        };

        let joined: String = tokens
            .iter()
            .map(|token| token.span.fragment(source))
            .collect();
        assert_eq!(joined, source);

        // Spans are contiguous.
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].span.end(), pair[1].span.index);
        }
    }
}

#[test]
fn test_fibonacci_significant_tokens() {
    use TokenKind as TK;

    let source = include_str!("../programs/fibonacci.bitsy");
    let kinds: Vec<TokenKind> = tokenize(source)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .filter(|kind| !kind.is_skippable())
        .take(8)
        .collect();

    assert_eq!(
        kinds,
        [
            TK::Begin,
            TK::Variable,
            TK::Assignment,
            TK::Integer,
            TK::Variable,
            TK::Assignment,
            TK::Integer,
            TK::Loop
        ]
    );
}

#[test]
fn test_comment_text() {
    let tokens = tokenize("{ Prints }BEGIN").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].text(), " Prints ");
    assert_eq!(tokens[0].span.size, 10);
    assert_eq!(tokens[1].kind, TokenKind::Begin);
}
