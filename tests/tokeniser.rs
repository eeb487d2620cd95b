use pdflex::{Direction, Lexer, TokenKind};
use pdflex::source::bytes::InMemoryByteSource;

fn lex_ok(input: &[u8]) -> Vec<TokenKind> {
    let source = InMemoryByteSource::new(input.to_vec(), Direction::Forward, 0);
    Lexer::new(source)
        .map(|r| r.expect("lexes cleanly").kind)
        .collect()
}

#[test]
fn scenario_a_literal_string_with_nesting_and_escapes() {
    let tokens = lex_ok(b"(A (nested) string \\n with \\051 escape)");
    assert_eq!(tokens.len(), 1);
    match &tokens[0] {
        TokenKind::String(bytes, _) => {
            assert_eq!(*bytes, b"A (nested) string \n with ) escape".to_vec());
        }
        other => panic!("expected a literal string token, got {other:?}"),
    }
}

#[test]
fn scenario_b_stream_keyword_halts_tokenising() {
    let source = InMemoryByteSource::new(b"<< /Length 4 >>\nstream\r\nbody".to_vec(), Direction::Forward, 0);
    let mut lexer = Lexer::new(source);
    let mut kinds = Vec::new();
    for result in &mut lexer {
        kinds.push(result.expect("lexes cleanly").kind);
    }
    assert_eq!(
        kinds.last(),
        Some(&TokenKind::StreamBegin { stream_start_index: 16 + 8 })
    );
    assert!(lexer.next().is_none(), "tokeniser must stay halted");
}

#[test]
fn whitespace_bytes_are_exactly_the_iso_set() {
    let tokens = lex_ok(b"\x00\x09\x0A\x0C\x0D\x20true");
    assert_eq!(tokens, vec![TokenKind::Boolean(true)]);
}

#[test]
fn keyword_tokens_require_a_terminator() {
    // "nullify" must not be lexed as `Null` followed by a leftover "ify": the keyword rule
    // only matches when the keyword is followed by whitespace, `]`, `>`, `/`, or end-of-input.
    let source = InMemoryByteSource::new(b"nullify".to_vec(), Direction::Forward, 0);
    let mut lexer = Lexer::new(source);
    let err = lexer.next().unwrap().unwrap_err();
    assert!(matches!(err, pdflex::error::LexError::InvalidByte { .. }));
}

#[test]
fn numeric_tokens_distinguish_integer_from_real() {
    let tokens = lex_ok(b"123 -17 +4 3.14 -.5 10.");
    let expected_kinds: Vec<&str> = tokens
        .iter()
        .map(|t| match t {
            TokenKind::NumericInteger(..) => "int",
            TokenKind::NumericReal(..) => "real",
            _ => "other",
        })
        .collect();
    assert_eq!(expected_kinds, vec!["int", "int", "int", "real", "real", "real"]);
}

#[test]
fn hex_string_pads_odd_digit_count_and_skips_whitespace() {
    let tokens = lex_ok(b"<41 42 43 4>");
    match &tokens[0] {
        TokenKind::String(bytes, _) => assert_eq!(*bytes, vec![0x41, 0x42, 0x43, 0x40]),
        other => panic!("expected a hex string token, got {other:?}"),
    }
}

#[test]
fn name_hash_escape_decodes_two_hex_digits() {
    let tokens = lex_ok(b"/A#42C");
    match &tokens[0] {
        TokenKind::Name(bytes) => assert_eq!(*bytes, b"ABC".to_vec()),
        other => panic!("expected a name token, got {other:?}"),
    }
}

#[test]
fn header_comment_and_binary_indicator_are_classified() {
    let tokens = lex_ok(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
    assert_eq!(tokens[0], TokenKind::HeaderComment("1.4".to_string()));
    assert_eq!(tokens[1], TokenKind::BinaryIndicatorComment);
}

#[test]
fn invalid_byte_at_top_level_is_fatal() {
    let source = InMemoryByteSource::new(b"@".to_vec(), Direction::Forward, 0);
    let mut lexer = Lexer::new(source);
    let err = lexer.next().unwrap().unwrap_err();
    assert!(matches!(err, pdflex::error::LexError::InvalidByte { offset: 0, byte: b'@' }));
}

#[test]
fn bare_cr_after_stream_keyword_is_fatal() {
    let source = InMemoryByteSource::new(b"stream\rbody".to_vec(), Direction::Forward, 0);
    let mut lexer = Lexer::new(source);
    assert!(lexer.next().unwrap().is_err());
}
