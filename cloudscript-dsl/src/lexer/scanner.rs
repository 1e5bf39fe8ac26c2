//! Lexer implementation

use super::keywords::classify;
use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for the CloudScript DSL.
///
/// A lexer owns its cursor and is meant to be used for a single source text.
/// Lexical anomalies never fail: unknown characters and stray `/` are
/// dropped, and an unterminated string runs to the end of input.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source.
    fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();

            let start_pos = self.pos;
            let start_line = self.line;
            let start_col = self.column;

            let Some(c) = self.peek_char() else {
                return Token::new(
                    TokenKind::Eof,
                    "",
                    Span {
                        start: start_pos,
                        end: start_pos,
                        line: start_line,
                        column: start_col,
                    },
                );
            };

            let scanned = match c {
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                ':' => self.single(TokenKind::Colon),
                ',' => self.single(TokenKind::Comma),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),

                '/' if self.starts_path() => Some(self.scan_path()),

                '"' => Some(self.scan_string()),

                c if c.is_ascii_digit() => Some(self.scan_number_or_duration()),

                c if c.is_alphabetic() || c == '_' => Some(self.scan_identifier()),

                _ => {
                    self.advance();
                    None
                }
            };

            if let Some((kind, lexeme)) = scanned {
                return Token::new(
                    kind,
                    lexeme,
                    Span {
                        start: start_pos,
                        end: self.pos,
                        line: start_line,
                        column: start_col,
                    },
                );
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Option<(TokenKind, String)> {
        let start = self.pos;
        self.advance();
        Some((kind, self.source[start..self.pos].to_string()))
    }

    /// A `/` opens a path only when followed by a letter or `:`.
    fn starts_path(&self) -> bool {
        matches!(self.peek_next_char(), Some(c) if c.is_alphabetic() || c == ':')
    }

    /// Scan a path literal such as `/users/:id`.
    fn scan_path(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        self.advance(); // consume leading '/'

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || matches!(c, '/' | '_' | '-' | ':') {
                self.advance();
            } else {
                break;
            }
        }

        (TokenKind::Path, self.source[start..self.pos].to_string())
    }

    /// Scan an identifier or reserved word.
    fn scan_identifier(&mut self) -> (TokenKind, String) {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start..self.pos];
        (classify(ident), ident.to_string())
    }

    /// Scan a string literal. A backslash makes the next character literal.
    fn scan_string(&mut self) -> (TokenKind, String) {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek_char() {
                None => break,
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        (TokenKind::String, value)
    }

    /// Scan a number or duration literal.
    fn scan_number_or_duration(&mut self) -> (TokenKind, String) {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let kind = if matches!(self.peek_char(), Some('s' | 'm' | 'h' | 'd')) {
            self.advance();
            TokenKind::Duration
        } else {
            TokenKind::Number
        };

        (kind, self.source[start..self.pos].to_string())
    }

    /// Skip whitespace and `//` line comments (including their newline).
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.pos = i + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

/// Tokenize a source text in one call.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_basic_service() {
        let tokens = tokenize("service UserService { }");

        assert_eq!(tokens[0].kind, TokenKind::Service);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "UserService");
        assert_eq!(tokens[2].kind, TokenKind::LBrace);
        assert_eq!(tokens[3].kind, TokenKind::RBrace);
        assert_eq!(tokens[4].kind, TokenKind::Eof);
        assert_eq!(tokens[4].lexeme, "");
    }

    #[test]
    fn test_lexer_endpoint_tokens() {
        let tokens = tokenize("endpoint /users { method: GET }");

        assert_eq!(tokens[0].kind, TokenKind::Endpoint);
        assert_eq!(tokens[1].kind, TokenKind::Path);
        assert_eq!(tokens[1].lexeme, "/users");
        assert_eq!(tokens[3].kind, TokenKind::Method);
        assert_eq!(tokens[4].kind, TokenKind::Colon);
        assert_eq!(tokens[5].kind, TokenKind::Get);
    }

    #[test]
    fn test_lexer_durations() {
        let tokens = tokenize("cache: 5m timeout: 10s 1h 7d");
        let durations: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Duration)
            .map(|t| t.lexeme.as_str())
            .collect();

        assert_eq!(durations, vec!["5m", "10s", "1h", "7d"]);
    }

    #[test]
    fn test_lexer_duration_takes_single_unit() {
        let tokens = tokenize("5ms 2w");

        assert_eq!(tokens[0].kind, TokenKind::Duration);
        assert_eq!(tokens[0].lexeme, "5m");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "s");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].lexeme, "2");
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].lexeme, "w");
    }

    #[test]
    fn test_lexer_numbers() {
        let tokens = tokenize("8080 3.14 1.2.3");

        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "8080");
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].lexeme, "1.2.3");
    }

    #[test]
    fn test_lexer_path_parameters() {
        let tokens = tokenize("/users/:id");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Path);
        assert_eq!(tokens[0].lexeme, "/users/:id");
    }

    #[test]
    fn test_lexer_path_characters() {
        let tokens = tokenize("/api/v1/order-items/:item_id/ next");

        assert_eq!(tokens[0].lexeme, "/api/v1/order-items/:item_id/");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_lexer_path_may_start_with_parameter() {
        let tokens = tokenize("/:id");

        assert_eq!(tokens[0].kind, TokenKind::Path);
        assert_eq!(tokens[0].lexeme, "/:id");
    }

    #[test]
    fn test_lexer_stray_slash_is_skipped() {
        assert_eq!(
            kinds("100 / m"),
            vec![TokenKind::Number, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(kinds("/1"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(kinds("/"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_lexer_rate_limit_shape() {
        let tokens = tokenize("100/m");

        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "100");
        assert_eq!(tokens[1].kind, TokenKind::Path);
        assert_eq!(tokens[1].lexeme, "/m");
    }

    #[test]
    fn test_lexer_string_literals() {
        let tokens = tokenize(r#""localhost" "a\"b" "x\ny" "back\\slash""#);

        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "localhost");
        assert_eq!(tokens[1].lexeme, "a\"b");
        // No named escapes: `\n` is a literal `n`.
        assert_eq!(tokens[2].lexeme, "xny");
        assert_eq!(tokens[3].lexeme, "back\\slash");
    }

    #[test]
    fn test_lexer_unterminated_string_runs_to_end() {
        let tokens = tokenize("host: \"localhost");

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].lexeme, "localhost");
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_trailing_backslash_in_string() {
        let tokens = tokenize("\"abc\\");

        assert_eq!(tokens[0].lexeme, "abc");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_comments() {
        let tokens = tokenize("service // line comment\nendpoint // trailing");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Service);
        assert_eq!(tokens[1].kind, TokenKind::Endpoint);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_delimiters() {
        assert_eq!(
            kinds("{ } [ ] : , ( )"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_unknown_characters_are_skipped() {
        assert_eq!(
            kinds("service @ # ; Name"),
            vec![TokenKind::Service, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lexer_reserved_categories() {
        assert_eq!(
            kinds("grpc kafka docker gcp required none get"),
            vec![
                TokenKind::Grpc,
                TokenKind::Kafka,
                TokenKind::Docker,
                TokenKind::Gcp,
                TokenKind::Required,
                TokenKind::None,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_positions() {
        let tokens = tokenize("service A {\n  port: 80\n}");

        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
        assert_eq!((tokens[1].line(), tokens[1].column()), (1, 9));
        assert_eq!((tokens[3].line(), tokens[3].column()), (2, 3));
        assert_eq!((tokens[5].line(), tokens[5].column()), (2, 9));
        assert_eq!((tokens[6].line(), tokens[6].column()), (3, 1));
        assert_eq!(tokens[5].span.start, 20);
        assert_eq!(tokens[5].span.end, 22);
    }

    #[test]
    fn test_lexer_unicode_identifiers() {
        let tokens = tokenize("service Überdienst { }");

        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "Überdienst");
    }

    proptest! {
        #[test]
        fn prop_whitespace_and_comments_yield_only_eof(
            parts in prop::collection::vec(
                prop_oneof![
                    Just(" ".to_string()),
                    Just("\t".to_string()),
                    Just("\r\n".to_string()),
                    Just("\n".to_string()),
                    "//[^\n]*\n",
                ],
                0..20,
            )
        ) {
            let source = parts.concat();
            let tokens = tokenize(&source);

            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].kind, TokenKind::Eof);
        }

        #[test]
        fn prop_tokenize_terminates_with_single_eof(source in "\\PC{0,200}") {
            let tokens = tokenize(&source);

            prop_assert!(!tokens.is_empty());
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            prop_assert_eq!(
                tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
                1
            );
        }
    }
}
