//! Byte-stream tokeniser (§4.4), grounded on the lexical rules of a nom-based PDF tokeniser
//! (escape tables, hex pairing, name hash-escapes, numeric grammar) but re-expressed as an
//! explicit state machine pulling from a bounded ring buffer instead of parsing a whole slice.

use crate::decimal::Decimal;
use crate::error::LexError;
use crate::object::StringFormat;
use crate::source::ItemSource;
use crate::source::buffered::BufferedProvider;
use crate::token::{Token, TokenKind};

/// Default ring-buffer capacity for the byte provider feeding the tokeniser (§4.2).
pub const DEFAULT_BYTE_BUFFER_CAPACITY: usize = 1024;

const KEYWORD_TOKENS: &[(&[u8], TokenKind)] = &[
    (b"endstream", TokenKind::StreamEnd),
    (b"endobj", TokenKind::IndirectObjectEnd),
    (b"obj", TokenKind::IndirectObjectBegin),
    (b"null", TokenKind::Null),
    (b"true", TokenKind::Boolean(true)),
    (b"false", TokenKind::Boolean(false)),
    (b"R", TokenKind::IndirectReferenceMarker),
];

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

#[inline]
fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

#[inline]
fn is_keyword_terminator(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b']' | b'>' | b'/')
}

#[inline]
fn hex_value(b: u8) -> u8 {
    (b as char).to_digit(16).expect("caller validated hex digit") as u8
}

/// Pulls tokens out of a buffered byte provider, one per [`Iterator::next`] call. Halts for
/// good after yielding `StreamBegin` (§4.4 rule 2): the iterator returns `None` from then on.
pub struct Lexer<S> {
    bytes: BufferedProvider<u8, S>,
    halted: bool,
}

impl<S: ItemSource<u8>> Lexer<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_BYTE_BUFFER_CAPACITY)
    }

    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Lexer {
            bytes: BufferedProvider::new(source, capacity),
            halted: false,
        }
    }

    fn peek_matches(&mut self, word: &[u8]) -> Result<bool, LexError> {
        for (i, &expected) in word.iter().enumerate() {
            if !self.bytes.has_item_at(i)? || self.bytes.peek(i)? != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn terminated_keyword(&mut self, word: &[u8]) -> Result<bool, LexError> {
        if !self.peek_matches(word)? {
            return Ok(false);
        }
        let after = word.len();
        Ok(!self.bytes.has_item_at(after)? || is_keyword_terminator(self.bytes.peek(after)?))
    }

    fn lex_stream_keyword(&mut self, start: u64) -> Result<Option<Token>, LexError> {
        if !self.peek_matches(b"stream")? {
            return Ok(None);
        }
        self.bytes.consume(6)?;
        if self.bytes.has_item_at(0)? && self.bytes.peek(0)? == b'\n' {
            self.bytes.consume(1)?;
            self.halted = true;
            return Ok(Some(Token::new(
                start,
                TokenKind::StreamBegin { stream_start_index: start + 7 },
            )));
        }
        if self.bytes.has_item_at(0)? && self.bytes.peek(0)? == b'\r' {
            if self.bytes.has_item_at(1)? && self.bytes.peek(1)? == b'\n' {
                self.bytes.consume(2)?;
                self.halted = true;
                return Ok(Some(Token::new(
                    start,
                    TokenKind::StreamBegin { stream_start_index: start + 8 },
                )));
            }
            return Err(LexError::BadStreamKeyword { offset: start });
        }
        Err(LexError::BadStreamKeyword { offset: start })
    }

    fn lex_keyword(&mut self, start: u64) -> Result<Option<Token>, LexError> {
        for (word, kind) in KEYWORD_TOKENS {
            if self.terminated_keyword(word)? {
                self.bytes.consume(word.len())?;
                return Ok(Some(Token::new(start, kind.clone())));
            }
        }
        Ok(None)
    }

    fn lex_numeric(&mut self, start: u64) -> Result<Token, LexError> {
        let mut raw = Vec::new();
        while self.bytes.has_item_at(0)? {
            let b = self.bytes.peek(0)?;
            if b == b'+' || b == b'-' || b == b'.' || b.is_ascii_digit() {
                raw.push(b);
                self.bytes.consume(1)?;
            } else {
                break;
            }
        }
        parse_numeric(start, &raw)
    }

    fn lex_literal_string(&mut self, start: u64) -> Result<Token, LexError> {
        self.bytes.consume(1)?;
        let mut depth = 1usize;
        let mut content = Vec::new();
        loop {
            if !self.bytes.has_item_at(0)? {
                return Err(LexError::UnterminatedString { offset: start });
            }
            let b = self.bytes.next()?;
            match b {
                b'(' => {
                    depth += 1;
                    content.push(b'(');
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    content.push(b')');
                }
                b'\\' => self.lex_literal_string_escape(start, &mut content)?,
                b'\r' => {
                    if self.bytes.has_item_at(0)? && self.bytes.peek(0)? == b'\n' {
                        self.bytes.consume(1)?;
                    }
                    content.push(b'\n');
                }
                other => content.push(other),
            }
        }
        Ok(Token::new(start, TokenKind::String(content, StringFormat::Literal)))
    }

    fn lex_literal_string_escape(&mut self, start: u64, content: &mut Vec<u8>) -> Result<(), LexError> {
        if !self.bytes.has_item_at(0)? {
            return Err(LexError::UnterminatedString { offset: start });
        }
        let e = self.bytes.peek(0)?;
        match e {
            b'\n' => self.bytes.consume(1)?,
            b'\r' => {
                self.bytes.consume(1)?;
                if self.bytes.has_item_at(0)? && self.bytes.peek(0)? == b'\n' {
                    self.bytes.consume(1)?;
                }
            }
            b'n' => {
                self.bytes.consume(1)?;
                content.push(b'\n');
            }
            b'r' => {
                self.bytes.consume(1)?;
                content.push(b'\r');
            }
            b't' => {
                self.bytes.consume(1)?;
                content.push(b'\t');
            }
            b'b' => {
                self.bytes.consume(1)?;
                content.push(0x08);
            }
            b'f' => {
                self.bytes.consume(1)?;
                content.push(0x0C);
            }
            b'(' => {
                self.bytes.consume(1)?;
                content.push(b'(');
            }
            b')' => {
                self.bytes.consume(1)?;
                content.push(b')');
            }
            b'\\' => {
                self.bytes.consume(1)?;
                content.push(b'\\');
            }
            b'0'..=b'7' => {
                let mut value: u16 = 0;
                let mut digits = 0;
                while digits < 3 && self.bytes.has_item_at(0)? {
                    let d = self.bytes.peek(0)?;
                    if !(b'0'..=b'7').contains(&d) {
                        break;
                    }
                    value = value * 8 + (d - b'0') as u16;
                    self.bytes.consume(1)?;
                    digits += 1;
                }
                content.push((value & 0xFF) as u8);
            }
            other => {
                self.bytes.consume(1)?;
                content.push(other);
            }
        }
        Ok(())
    }

    fn lex_hex_string(&mut self, start: u64) -> Result<Token, LexError> {
        self.bytes.consume(1)?;
        let mut digits = Vec::new();
        loop {
            if !self.bytes.has_item_at(0)? {
                return Err(LexError::UnterminatedString { offset: start });
            }
            let b = self.bytes.next()?;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            if !b.is_ascii_hexdigit() {
                return Err(LexError::InvalidByte { offset: start, byte: b });
            }
            digits.push(b);
        }
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        let bytes = digits
            .chunks(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect();
        Ok(Token::new(start, TokenKind::String(bytes, StringFormat::Hexadecimal)))
    }

    fn lex_name(&mut self, start: u64) -> Result<Token, LexError> {
        self.bytes.consume(1)?;
        let mut name = Vec::new();
        while self.bytes.has_item_at(0)? {
            let b = self.bytes.peek(0)?;
            if b == b'#' {
                self.bytes.consume(1)?;
                if !self.bytes.has_item_at(0)? {
                    return Err(LexError::BadEscape { offset: start });
                }
                let h1 = self.bytes.next()?;
                if !h1.is_ascii_hexdigit() {
                    return Err(LexError::BadEscape { offset: start });
                }
                if !self.bytes.has_item_at(0)? {
                    return Err(LexError::BadEscape { offset: start });
                }
                let h2 = self.bytes.next()?;
                if !h2.is_ascii_hexdigit() {
                    return Err(LexError::BadEscape { offset: start });
                }
                name.push((hex_value(h1) << 4) | hex_value(h2));
            } else if is_regular(b) {
                name.push(b);
                self.bytes.consume(1)?;
            } else {
                break;
            }
        }
        Ok(Token::new(start, TokenKind::Name(name)))
    }

    fn lex_comment(&mut self, start: u64) -> Result<Token, LexError> {
        self.bytes.consume(1)?;
        let mut content = Vec::new();
        while self.bytes.has_item_at(0)? {
            let b = self.bytes.peek(0)?;
            if b == b'\r' || b == b'\n' {
                break;
            }
            content.push(b);
            self.bytes.consume(1)?;
        }
        if self.bytes.has_item_at(0)? {
            let b = self.bytes.next()?;
            if b == b'\r' && self.bytes.has_item_at(0)? && self.bytes.peek(0)? == b'\n' {
                self.bytes.consume(1)?;
            }
        }
        Ok(Token::new(start, classify_comment(content)))
    }
}

fn classify_comment(content: Vec<u8>) -> TokenKind {
    if content.len() == 7 && content.starts_with(b"PDF-") {
        let version = &content[4..];
        if version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit() {
            return TokenKind::HeaderComment(String::from_utf8_lossy(version).into_owned());
        }
    }
    if content.len() == 4 && content.iter().all(|&b| b >= 0x80) {
        return TokenKind::BinaryIndicatorComment;
    }
    TokenKind::Comment(content)
}

fn parse_numeric(start: u64, raw: &[u8]) -> Result<Token, LexError> {
    let bad = || LexError::BadNumber { offset: start };
    let (negative, rest) = match raw.first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if rest.iter().any(|&b| b == b'+' || b == b'-') {
        return Err(bad());
    }
    let dot_count = rest.iter().filter(|&&b| b == b'.').count();
    if dot_count > 1 {
        return Err(bad());
    }
    if dot_count == 1 {
        let dot_pos = rest.iter().position(|&b| b == b'.').unwrap();
        let int_part = &rest[..dot_pos];
        let frac_part = &rest[dot_pos + 1..];
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        if !int_part.iter().all(u8::is_ascii_digit) || !frac_part.iter().all(u8::is_ascii_digit) {
            return Err(bad());
        }
        let decimal = Decimal::new(
            negative,
            String::from_utf8(int_part.to_vec()).expect("digits are ASCII"),
            String::from_utf8(frac_part.to_vec()).expect("digits are ASCII"),
        );
        Ok(Token::new(start, TokenKind::NumericReal(decimal, raw.to_vec())))
    } else {
        if rest.is_empty() || !rest.iter().all(u8::is_ascii_digit) {
            return Err(bad());
        }
        let text = std::str::from_utf8(rest).expect("digits are ASCII");
        let magnitude: i64 = text.parse().map_err(|_| bad())?;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Token::new(start, TokenKind::NumericInteger(value, raw.to_vec())))
    }
}

impl<S: ItemSource<u8>> Lexer<S> {
    /// Tokenises the next token, if any. `Ok(None)` means clean end-of-input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while self.bytes.has_item_at(0)? && is_whitespace(self.bytes.peek(0)?) {
            self.bytes.consume(1)?;
        }
        if !self.bytes.has_item_at(0)? {
            return Ok(None);
        }
        let start = self.bytes.current_index() as u64;
        let b = self.bytes.peek(0)?;

        if b == b'(' {
            return self.lex_literal_string(start).map(Some);
        }
        if b == b'[' {
            self.bytes.consume(1)?;
            return Ok(Some(Token::new(start, TokenKind::ArrayBegin)));
        }
        if b == b']' {
            self.bytes.consume(1)?;
            return Ok(Some(Token::new(start, TokenKind::ArrayEnd)));
        }
        if b == b'<' {
            if self.bytes.has_item_at(1)? && self.bytes.peek(1)? == b'<' {
                self.bytes.consume(2)?;
                return Ok(Some(Token::new(start, TokenKind::DictionaryBegin)));
            }
            return self.lex_hex_string(start).map(Some);
        }
        if b == b'>' {
            if self.bytes.has_item_at(1)? && self.bytes.peek(1)? == b'>' {
                self.bytes.consume(2)?;
                return Ok(Some(Token::new(start, TokenKind::DictionaryEnd)));
            }
            self.bytes.consume(1)?;
            return Err(LexError::InvalidByte { offset: start, byte: b });
        }
        if b == b'/' {
            return self.lex_name(start).map(Some);
        }
        if b == b'%' {
            return self.lex_comment(start).map(Some);
        }
        if b == b's' {
            if let Some(token) = self.lex_stream_keyword(start)? {
                return Ok(Some(token));
            }
        }
        if let Some(token) = self.lex_keyword(start)? {
            return Ok(Some(token));
        }
        if b == b'+' || b == b'-' || b == b'.' || b.is_ascii_digit() {
            return self.lex_numeric(start).map(Some);
        }
        self.bytes.consume(1)?;
        Err(LexError::InvalidByte { offset: start, byte: b })
    }
}

impl<S: ItemSource<u8>> Iterator for Lexer<S> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Adapts a [`Lexer`] into a token [`ItemSource`], so a parser can pull tokens straight off a
/// byte stream without materialising the whole token sequence first.
///
/// A lexical [`LexError`] does not propagate through `next_items` (the item source contract has
/// no room for one past I/O failure); it is latched instead, and `next_items` reports exhaustion
/// from that point on. A caller that drives a [`Parser`](crate::parser::Parser) off this source
/// should check [`Self::lex_error`] whenever the parse ends early or with
/// [`crate::error::ParseError::NoObjectParsed`]. A [`LexError::Io`], by contrast, is a genuine
/// I/O failure rather than a malformed token: it propagates straight through `next_items` as
/// `Err` instead of being latched.
pub struct LexerTokenSource<S> {
    lexer: Lexer<S>,
    error: Option<LexError>,
}

impl<S: ItemSource<u8>> LexerTokenSource<S> {
    pub fn new(lexer: Lexer<S>) -> Self {
        LexerTokenSource { lexer, error: None }
    }

    /// The lex error that halted tokenising, if any.
    pub fn lex_error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }
}

impl<S: ItemSource<u8>> ItemSource<Token> for LexerTokenSource<S> {
    fn dummy_item(&self) -> Token {
        Token::new(0, TokenKind::Dummy)
    }

    fn next_items(&mut self, requested_count: usize) -> std::io::Result<Vec<Token>> {
        let mut out = Vec::with_capacity(requested_count);
        if self.error.is_some() {
            return Ok(out);
        }
        for _ in 0..requested_count {
            match self.lexer.next() {
                Some(Ok(token)) => out.push(token),
                Some(Err(LexError::Io(io_err))) => return Err(io_err),
                Some(Err(err)) => {
                    self.error = Some(err);
                    break;
                }
                None => break,
            }
        }
        Ok(out)
    }

    fn current_index(&self, items_consumed: u64) -> i64 {
        items_consumed as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Direction;
    use crate::source::bytes::InMemoryByteSource;

    fn lex_all(input: &[u8]) -> Vec<Result<Token, LexError>> {
        let source = InMemoryByteSource::new(input.to_vec(), Direction::Forward, 0);
        Lexer::new(source).collect()
    }

    #[test]
    fn scenario_a_literal_string() {
        let tokens = lex_all(b"(This is a string)");
        assert_eq!(tokens.len(), 1);
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.start_index, 0);
        assert_eq!(token.kind, TokenKind::String(b"This is a string".to_vec(), StringFormat::Literal));
    }

    #[test]
    fn scenario_b_stream_halts_tokenising() {
        let tokens = lex_all(b"<</Length 42>>stream\n");
        let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.as_ref().unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::DictionaryBegin,
                &TokenKind::Name(b"Length".to_vec()),
                &TokenKind::NumericInteger(42, b"42".to_vec()),
                &TokenKind::DictionaryEnd,
                &TokenKind::StreamBegin { stream_start_index: 22 },
            ]
        );
        assert_eq!(tokens[4].as_ref().unwrap().start_index, 15);
    }

    /// Byte source that fails every read, simulating a broken reader underneath the lexer.
    struct AlwaysFailingByteSource;

    impl ItemSource<u8> for AlwaysFailingByteSource {
        fn dummy_item(&self) -> u8 {
            0
        }

        fn next_items(&mut self, _requested_count: usize) -> std::io::Result<Vec<u8>> {
            Err(std::io::Error::other("simulated I/O failure"))
        }

        fn current_index(&self, items_consumed: u64) -> i64 {
            items_consumed as i64
        }
    }

    #[test]
    fn io_failure_surfaces_as_lex_error_io_not_a_panic() {
        let mut lexer = Lexer::new(AlwaysFailingByteSource);
        match lexer.next() {
            Some(Err(LexError::Io(_))) => {}
            other => panic!("expected a LexError::Io, got {other:?}"),
        }
    }

    #[test]
    fn token_source_propagates_io_failure_instead_of_latching_it() {
        let mut source = LexerTokenSource::new(Lexer::new(AlwaysFailingByteSource));
        assert!(source.next_items(4).is_err());
        assert!(source.lex_error().is_none());
    }

    #[test]
    fn scenario_f_escape_table() {
        let tokens = lex_all(b"( \\n \\r \\t \\b \\f \\( \\) \\\\ \\123 \\x )");
        let token = tokens[0].as_ref().unwrap();
        let expected: &[u8] = b" \n \r \t \x08 \x0C ( ) \\ S x ";
        assert_eq!(token.kind, TokenKind::String(expected.to_vec(), StringFormat::Literal));
    }

    #[test]
    fn bare_cr_after_stream_is_fatal() {
        let tokens = lex_all(b"stream\rdata");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Err(LexError::BadStreamKeyword { offset: 0 })));
    }

    #[test]
    fn keyword_requires_terminator() {
        let tokens = lex_all(b"nullify");
        assert!(tokens[0].is_err());
    }

    #[test]
    fn hex_string_odd_digit_padding() {
        let tokens = lex_all(b"<901FA>");
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.kind, TokenKind::String(vec![0x90, 0x1F, 0xA0], StringFormat::Hexadecimal));
    }

    #[test]
    fn hex_string_ignores_internal_whitespace() {
        let tokens = lex_all(b"<9 01F A>");
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.kind, TokenKind::String(vec![0x90, 0x1F, 0xA0], StringFormat::Hexadecimal));
    }

    #[test]
    fn name_hash_escape() {
        let tokens = lex_all(b"/ABC#5f");
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.kind, TokenKind::Name(b"ABC\x5F".to_vec()));
    }

    #[test]
    fn name_stops_before_array_delimiter() {
        let tokens = lex_all(b"/Key3[123");
        let first = tokens[0].as_ref().unwrap();
        assert_eq!(first.kind, TokenKind::Name(b"Key3".to_vec()));
        let second = tokens[1].as_ref().unwrap();
        assert_eq!(second.kind, TokenKind::ArrayBegin);
    }

    #[test]
    fn header_comment_carries_version() {
        let tokens = lex_all(b"%PDF-1.7\nrest");
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.kind, TokenKind::HeaderComment("1.7".to_string()));
    }

    #[test]
    fn binary_indicator_comment() {
        let tokens = lex_all(&[b'%', 0x80, 0x90, 0xA0, 0xB0, b'\n']);
        let token = tokens[0].as_ref().unwrap();
        assert_eq!(token.kind, TokenKind::BinaryIndicatorComment);
    }

    #[test]
    fn unterminated_literal_string_is_fatal() {
        let tokens = lex_all(b"(unterminated");
        assert!(matches!(tokens[0], Err(LexError::UnterminatedString { offset: 0 })));
    }

    #[test]
    fn token_start_indices_strictly_increase() {
        let tokens = lex_all(b"123 456 R true");
        let mut last = -1i64;
        for result in &tokens {
            let token = result.as_ref().unwrap();
            assert!(token.start_index as i64 > last);
            last = token.start_index as i64;
        }
    }

    #[test]
    fn token_source_latches_lex_error_and_then_reports_exhausted() {
        let src = InMemoryByteSource::new(b"true (unterminated".to_vec(), Direction::Forward, 0);
        let mut source = LexerTokenSource::new(Lexer::new(src));
        let first = source.next_items(4).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, TokenKind::Boolean(true));
        assert!(matches!(source.lex_error(), Some(LexError::UnterminatedString { offset: 5 })));
        assert_eq!(source.next_items(1).unwrap(), Vec::new());
    }

    #[test]
    fn token_source_yields_nothing_past_stream_halt() {
        let src = InMemoryByteSource::new(b"stream\nbody".to_vec(), Direction::Forward, 0);
        let mut source = LexerTokenSource::new(Lexer::new(src));
        let tokens = source.next_items(4).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::StreamBegin { stream_start_index: 7 });
        assert_eq!(source.next_items(1).unwrap(), Vec::new());
        assert!(source.lex_error().is_none());
    }
}
