//! Parser implementation

use super::ast::*;
use crate::config::{DatabaseValuePolicy, ParserConfig, UnknownMemberPolicy};
use crate::error::{BlockKind, ParseError, ParseResult};
use crate::lexer::*;
use tracing::{debug, trace};

// ============================================================================
// PARSER
// ============================================================================

/// Recursive-descent parser for the CloudScript DSL.
///
/// A parser consumes one token sequence; [`Parser::parse`] takes `self` so an
/// instance cannot be reused across inputs.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser from a vector of tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_config(tokens, ParserConfig::default())
    }

    /// Create a parser that applies the given policies.
    pub fn with_config(mut tokens: Vec<Token>, config: ParserConfig) -> Self {
        // The cursor relies on a trailing Eof.
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span {
                    start: t.span.end,
                    end: t.span.end,
                    line: t.span.line,
                    column: t.span.column,
                })
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }

        Self {
            tokens,
            pos: 0,
            config,
        }
    }

    /// Parse the tokens into a Program.
    pub fn parse(mut self) -> ParseResult<Program> {
        debug!(tokens = self.tokens.len(), "parsing program");

        let mut program = Program::default();

        while !self.is_at_end() {
            if self.check(TokenKind::Service) {
                program.services.push(self.parse_service()?);
            } else {
                self.on_unknown(BlockKind::Program)?;
            }
        }

        debug!(services = program.services.len(), "parsed program");
        Ok(program)
    }

    /// Parse `service Name { ... }`.
    fn parse_service(&mut self) -> ParseResult<Service> {
        self.expect(TokenKind::Service)?;
        let name = self.expect_lexeme(TokenKind::Identifier)?;
        let mut service = Service::new(name);

        self.expect(TokenKind::LBrace)?;

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.current().kind {
                TokenKind::Endpoint => {
                    let endpoint = self.parse_endpoint()?;
                    service.endpoints.push(endpoint);
                }
                TokenKind::Connect => {
                    let connection = self.parse_connection()?;
                    service.connections.push(connection);
                }
                TokenKind::Deploy => self.parse_deploy(&mut service)?,
                TokenKind::Port | TokenKind::Replicas => self.parse_integer_setting(&mut service)?,
                TokenKind::Database => self.parse_database(&mut service)?,
                TokenKind::On if self.peek_event_type().is_some() => {
                    let event = self.parse_event()?;
                    service.events.push(event);
                }
                _ => self.on_unknown(BlockKind::Service)?,
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(service)
    }

    /// Parse `endpoint /path { ... }`.
    fn parse_endpoint(&mut self) -> ParseResult<Endpoint> {
        self.expect(TokenKind::Endpoint)?;
        let path = self.expect_lexeme(TokenKind::Path)?;
        let mut endpoint = Endpoint::new(path);

        self.expect(TokenKind::LBrace)?;

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.current().kind {
                TokenKind::Method => {
                    self.expect_member_header(TokenKind::Method)?;
                    if let Some(method) = HttpMethod::from_token(self.current().kind) {
                        endpoint.method = Some(method);
                        self.advance();
                    }
                }
                TokenKind::Response => {
                    self.expect_member_header(TokenKind::Response)?;
                    endpoint.response_type = Some(self.parse_response_type()?);
                }
                TokenKind::Cache => {
                    self.expect_member_header(TokenKind::Cache)?;
                    let literal = self.expect_lexeme(TokenKind::Duration)?;
                    endpoint.cache = Some(DurationLiteral::new(literal));
                }
                TokenKind::RateLimit => {
                    self.expect_member_header(TokenKind::RateLimit)?;
                    endpoint.rate_limit = Some(self.parse_rate_limit()?);
                }
                TokenKind::Timeout => {
                    self.expect_member_header(TokenKind::Timeout)?;
                    let literal = self.expect_lexeme(TokenKind::Duration)?;
                    endpoint.timeout = Some(DurationLiteral::new(literal));
                }
                TokenKind::Auth => {
                    self.expect_member_header(TokenKind::Auth)?;
                    if let Some(level) = AuthLevel::from_token(self.current().kind) {
                        endpoint.auth = Some(level);
                        self.advance();
                    }
                }
                TokenKind::Fallback => {
                    self.expect_member_header(TokenKind::Fallback)?;
                    endpoint.fallback = Some(self.expect_lexeme(TokenKind::Identifier)?);
                }
                _ => self.on_unknown(BlockKind::Endpoint)?,
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(endpoint)
    }

    /// Parse `Name` or `Name[]`.
    fn parse_response_type(&mut self) -> ParseResult<ResponseType> {
        let name = self.expect_lexeme(TokenKind::Identifier)?;

        if self.check(TokenKind::LBracket) {
            self.advance();
            self.expect(TokenKind::RBracket)?;
            Ok(ResponseType::array(name))
        } else {
            Ok(ResponseType::single(name))
        }
    }

    /// Parse `N`, `N/unit` or `N / unit`.
    ///
    /// The lexer reads `/m` as a path, so a single-segment path whose tail is
    /// an identifier supplies the unit. With spaces around the slash, the
    /// slash is dropped by the lexer and the unit arrives as an identifier.
    fn parse_rate_limit(&mut self) -> ParseResult<RateLimit> {
        let amount = self.expect_lexeme(TokenKind::Number)?;

        let per = match self.current().kind {
            TokenKind::Path => rate_unit(&self.current().lexeme).map(str::to_string),
            TokenKind::Identifier => Some(self.current().lexeme.clone()),
            _ => None,
        };
        if per.is_some() {
            self.advance();
        }

        Ok(RateLimit { amount, per })
    }

    /// Parse `connect to Target [via protocol]`.
    fn parse_connection(&mut self) -> ParseResult<Connection> {
        self.expect(TokenKind::Connect)?;
        self.expect(TokenKind::To)?;
        let target_service = self.expect_lexeme(TokenKind::Identifier)?;

        let mut protocol = Protocol::default();
        if self.check(TokenKind::Via) {
            self.advance();
            if let Some(p) = Protocol::from_token(self.current().kind) {
                protocol = p;
                self.advance();
            }
        }

        Ok(Connection {
            target_service,
            protocol,
        })
    }

    /// Parse `deploy on: platform`.
    fn parse_deploy(&mut self, service: &mut Service) -> ParseResult<()> {
        self.expect(TokenKind::Deploy)?;
        self.expect(TokenKind::On)?;
        self.expect(TokenKind::Colon)?;

        if let Some(platform) = Platform::from_token(self.current().kind) {
            service
                .configuration
                .insert(PLATFORM_KEY, ConfigValue::Platform(platform));
            self.advance();
        }
        Ok(())
    }

    /// Parse `port: N` or `replicas: N`.
    fn parse_integer_setting(&mut self, service: &mut Service) -> ParseResult<()> {
        let key = match self.current().kind {
            TokenKind::Port => PORT_KEY,
            _ => REPLICAS_KEY,
        };
        self.advance();
        self.expect(TokenKind::Colon)?;

        let value = self.expect_integer()?;
        service.configuration.insert(key, ConfigValue::Integer(value));
        Ok(())
    }

    /// Parse `database type [{ key: value ... }]`.
    fn parse_database(&mut self, service: &mut Service) -> ParseResult<()> {
        self.expect(TokenKind::Database)?;
        let db_type = self.expect_lexeme(TokenKind::Identifier)?;
        let mut database = DatabaseConfig::new(db_type);

        if self.check(TokenKind::LBrace) {
            self.advance();

            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                if self.check(TokenKind::Identifier) {
                    let key = self.expect_lexeme(TokenKind::Identifier)?;
                    self.expect(TokenKind::Colon)?;
                    let value = self.parse_setting_value(&key)?;
                    database.settings.insert(key, value);
                } else {
                    self.on_unknown(BlockKind::Database)?;
                }
            }

            self.expect(TokenKind::RBrace)?;
        }

        service
            .configuration
            .insert(DATABASE_KEY, ConfigValue::Database(database));
        Ok(())
    }

    /// Parse the value of a database setting. Exactly one token is consumed
    /// whatever its kind, so a malformed pair cannot desynchronize the block.
    fn parse_setting_value(&mut self, key: &str) -> ParseResult<Option<SettingValue>> {
        let token = self.current();
        let value = match token.kind {
            TokenKind::String => Some(SettingValue::String(token.lexeme.clone())),
            TokenKind::Number => Some(SettingValue::Integer(self.integer_literal()?)),
            found => match self.config.database_values {
                DatabaseValuePolicy::Lenient => None,
                DatabaseValuePolicy::Strict => {
                    return Err(ParseError::InvalidSettingValue {
                        key: key.to_string(),
                        found,
                        line: token.line(),
                        column: token.column(),
                    })
                }
            },
        };

        self.advance();
        Ok(value)
    }

    /// The event type named after an `on` at the cursor, if any.
    fn peek_event_type(&self) -> Option<EventType> {
        let next = self.peek(1);
        match next.kind {
            TokenKind::Identifier => EventType::from_name(&next.lexeme),
            _ => None,
        }
    }

    /// Parse `on event { action, action ... }`.
    fn parse_event(&mut self) -> ParseResult<Event> {
        self.expect(TokenKind::On)?;
        let name_token = self.current();
        let event_type = match EventType::from_name(&name_token.lexeme) {
            Some(event_type) if name_token.kind == TokenKind::Identifier => event_type,
            _ => return Err(self.unexpected(TokenKind::Identifier)),
        };
        self.advance();

        self.expect(TokenKind::LBrace)?;

        let mut actions = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.current().kind {
                TokenKind::Identifier => {
                    actions.push(self.current().lexeme.clone());
                    self.advance();
                }
                TokenKind::Comma => self.advance(),
                _ => self.on_unknown(BlockKind::Event)?,
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Event {
            event_type,
            actions,
        })
    }

    // ========================================================================
    // Unknown-member policy
    // ========================================================================

    /// The single decision point for tokens a block does not recognize.
    fn on_unknown(&mut self, block: BlockKind) -> ParseResult<()> {
        let token = self.current();
        match self.config.unknown_member_policy(block) {
            UnknownMemberPolicy::Skip => {
                trace!(%block, kind = ?token.kind, line = token.line(), "skipping token");
                self.advance();
                Ok(())
            }
            UnknownMemberPolicy::Reject => Err(ParseError::UnknownMember {
                block,
                found: token.kind,
                line: token.line(),
                column: token.column(),
            }),
        }
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Look ahead without consuming; clamps to the trailing Eof.
    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(kind))
        }
    }

    /// Expect a token of `kind` and return its lexeme.
    pub(crate) fn expect_lexeme(&mut self, kind: TokenKind) -> ParseResult<String> {
        if self.check(kind) {
            let lexeme = self.current().lexeme.clone();
            self.advance();
            Ok(lexeme)
        } else {
            Err(self.unexpected(kind))
        }
    }

    /// Expect `keyword :`.
    fn expect_member_header(&mut self, keyword: TokenKind) -> ParseResult<()> {
        self.expect(keyword)?;
        self.expect(TokenKind::Colon)
    }

    /// Expect a number literal that is a valid integer.
    pub(crate) fn expect_integer(&mut self) -> ParseResult<i64> {
        if !self.check(TokenKind::Number) {
            return Err(self.unexpected(TokenKind::Number));
        }
        let value = self.integer_literal()?;
        self.advance();
        Ok(value)
    }

    /// Interpret the number token at the cursor as an integer.
    fn integer_literal(&self) -> ParseResult<i64> {
        let token = self.current();
        token
            .lexeme
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidInteger {
                literal: token.lexeme.clone(),
                line: token.line(),
                column: token.column(),
            })
    }

    pub(crate) fn unexpected(&self, expected: TokenKind) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            expected,
            found: token.kind,
            line: token.line(),
            column: token.column(),
        }
    }
}

/// The unit of a path token that spells `/unit`.
fn rate_unit(path: &str) -> Option<&str> {
    let unit = path.strip_prefix('/')?;
    let mut chars = unit.chars();
    let first = chars.next()?;
    let valid = (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(unit)
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

/// Parse DSL source code into a Program.
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_with_config(source, &ParserConfig::default())
}

/// Parse DSL source code with explicit parser policies.
pub fn parse_with_config(source: &str, config: &ParserConfig) -> ParseResult<Program> {
    let tokens = Lexer::new(source).tokenize();
    Parser::with_config(tokens, config.clone()).parse()
}

// ============================================================================
// TESTS
// ============================================================================
