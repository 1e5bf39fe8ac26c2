//! CloudScript Test Utilities
//!
//! Shared test infrastructure for the CloudScript workspace:
//! - Proptest generators for syntax trees the printer can reproduce
//! - Fixture sources for common scenarios
//! - Custom assertions for parse results

// Re-export the tree and entry points for convenience
pub use cloudscript_dsl::{
    parse, parse_with_config, pretty_print, AuthLevel, BlockKind, ConfigValue, Connection,
    DatabaseConfig, DurationLiteral, Endpoint, Event, EventType, HttpMethod, ParseError,
    ParseResult, ParserConfig, Platform, Program, Protocol, RateLimit, ResponseType, Service,
    SettingMap, SettingValue, TokenKind, DATABASE_KEY, PLATFORM_KEY, PORT_KEY, REPLICAS_KEY,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating CloudScript trees.
    //!
    //! Every generated tree is one the parser can produce, so printing it and
    //! parsing the output gives the same tree back.

    use super::*;
    use cloudscript_dsl::keyword;
    use proptest::prelude::*;
    use proptest::sample::select;

    // === Lexical Generators ===

    /// Generate an identifier that is not a reserved word.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[A-Za-z_][A-Za-z0-9_]{0,11}".prop_filter("reserved word", |s| keyword(s).is_none())
    }

    /// Generate an endpoint path such as `/users/:id/posts`.
    pub fn arb_path() -> impl Strategy<Value = String> {
        let segment = prop_oneof![
            "/[a-z][a-z0-9_-]{0,7}",
            "/:[a-zA-Z][a-zA-Z0-9]{0,7}",
        ];
        prop::collection::vec(segment, 1..4).prop_map(|segments| segments.concat())
    }

    /// Generate a duration literal such as `5m` or `1.5h`.
    pub fn arb_duration() -> impl Strategy<Value = DurationLiteral> {
        "[1-9][0-9]{0,2}(\\.[0-9])?[smhd]".prop_map(DurationLiteral::new)
    }

    /// Generate a rate limit, with or without a unit.
    pub fn arb_rate_limit() -> impl Strategy<Value = RateLimit> {
        ("[1-9][0-9]{0,3}", prop::option::of("[smhd]"))
            .prop_map(|(amount, per)| RateLimit { amount, per })
    }

    // === Vocabulary Generators ===

    pub fn arb_http_method() -> impl Strategy<Value = HttpMethod> {
        select(HttpMethod::ALL)
    }

    pub fn arb_protocol() -> impl Strategy<Value = Protocol> {
        select(Protocol::ALL)
    }

    pub fn arb_platform() -> impl Strategy<Value = Platform> {
        select(Platform::ALL)
    }

    pub fn arb_auth_level() -> impl Strategy<Value = AuthLevel> {
        select(AuthLevel::ALL)
    }

    pub fn arb_event_type() -> impl Strategy<Value = EventType> {
        select(EventType::ALL)
    }

    // === Tree Generators ===

    /// Generate a response type, optionally an array.
    pub fn arb_response_type() -> impl Strategy<Value = ResponseType> {
        (arb_identifier(), any::<bool>()).prop_map(|(name, is_array)| ResponseType { name, is_array })
    }

    /// Generate an Endpoint with any subset of attributes set.
    pub fn arb_endpoint() -> impl Strategy<Value = Endpoint> {
        (
            arb_path(),
            prop::option::of(arb_http_method()),
            prop::option::of(arb_response_type()),
            prop::option::of(arb_duration()),
            prop::option::of(arb_rate_limit()),
            prop::option::of(arb_duration()),
            prop::option::of(arb_auth_level()),
            prop::option::of(arb_identifier()),
        )
            .prop_map(
                |(path, method, response_type, cache, rate_limit, timeout, auth, fallback)| {
                    Endpoint {
                        path,
                        method,
                        response_type,
                        cache,
                        rate_limit,
                        timeout,
                        auth,
                        fallback,
                    }
                },
            )
    }

    pub fn arb_connection() -> impl Strategy<Value = Connection> {
        (arb_identifier(), arb_protocol()).prop_map(|(target_service, protocol)| Connection {
            target_service,
            protocol,
        })
    }

    pub fn arb_event() -> impl Strategy<Value = Event> {
        (arb_event_type(), prop::collection::vec(arb_identifier(), 0..4))
            .prop_map(|(event_type, actions)| Event { event_type, actions })
    }

    /// Generate a database setting value, including the absent marker.
    pub fn arb_setting_value() -> impl Strategy<Value = Option<SettingValue>> {
        prop_oneof![
            Just(None),
            "[ -~]{0,16}".prop_map(|s| Some(SettingValue::String(s))),
            (0i64..=i64::MAX).prop_map(|n| Some(SettingValue::Integer(n))),
        ]
    }

    pub fn arb_database() -> impl Strategy<Value = DatabaseConfig> {
        (
            arb_identifier(),
            prop::collection::vec((arb_identifier(), arb_setting_value()), 0..5),
        )
            .prop_map(|(db_type, settings)| DatabaseConfig {
                db_type,
                settings: settings.into_iter().collect(),
            })
    }

    /// Generate a Service with members of every kind.
    pub fn arb_service() -> impl Strategy<Value = Service> {
        (
            arb_identifier(),
            prop::collection::vec(arb_endpoint(), 0..4),
            prop::collection::vec(arb_connection(), 0..3),
            prop::option::of(arb_platform()),
            prop::option::of(0i64..65_536),
            prop::option::of(0i64..100),
            prop::option::of(arb_database()),
            prop::collection::vec(arb_event(), 0..3),
        )
            .prop_map(
                |(name, endpoints, connections, platform, port, replicas, database, events)| {
                    let mut service = Service::new(name);
                    service.endpoints = endpoints;
                    service.connections = connections;
                    service.events = events;
                    if let Some(platform) = platform {
                        service
                            .configuration
                            .insert(PLATFORM_KEY, ConfigValue::Platform(platform));
                    }
                    if let Some(port) = port {
                        service.configuration.insert(PORT_KEY, ConfigValue::Integer(port));
                    }
                    if let Some(replicas) = replicas {
                        service
                            .configuration
                            .insert(REPLICAS_KEY, ConfigValue::Integer(replicas));
                    }
                    if let Some(database) = database {
                        service
                            .configuration
                            .insert(DATABASE_KEY, ConfigValue::Database(database));
                    }
                    service
                },
            )
    }

    pub fn arb_program() -> impl Strategy<Value = Program> {
        prop::collection::vec(arb_service(), 0..4).prop_map(|services| Program { services })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Fixture sources and pre-built trees.

    use super::*;

    /// Two services: a blog backed by postgres and its auth service.
    pub const BLOG_SOURCE: &str = include_str!("../fixtures/blog.cs");

    /// Six services of an online shop, wired with http, grpc and rabbitmq.
    pub const ECOMMERCE_SOURCE: &str = include_str!("../fixtures/ecommerce.cs");

    /// Lifecycle hooks, fallbacks and every optional endpoint attribute.
    pub const LIFECYCLE_SOURCE: &str = include_str!("../fixtures/lifecycle.cs");

    /// A service with no members.
    pub fn empty_service(name: &str) -> Service {
        Service::new(name)
    }

    /// `GET /users/:id` returning `User`, cached for five minutes.
    pub fn user_lookup_endpoint() -> Endpoint {
        let mut endpoint = Endpoint::new("/users/:id");
        endpoint.method = Some(HttpMethod::Get);
        endpoint.response_type = Some(ResponseType::single("User"));
        endpoint.cache = Some(DurationLiteral::new("5m"));
        endpoint
    }

    /// A users service deployed on kubernetes with a postgres database.
    pub fn users_service() -> Service {
        let mut service = Service::new("UserService");
        service.endpoints.push(user_lookup_endpoint());
        service.connections.push(Connection {
            target_service: "AuthService".to_string(),
            protocol: Protocol::Grpc,
        });
        service
            .configuration
            .insert(PLATFORM_KEY, ConfigValue::Platform(Platform::Kubernetes));
        service.configuration.insert(PORT_KEY, ConfigValue::Integer(8001));

        let mut database = DatabaseConfig::new("postgres");
        database
            .settings
            .insert("host", Some(SettingValue::String("localhost".to_string())));
        database.settings.insert("pool_size", Some(SettingValue::Integer(20)));
        service
            .configuration
            .insert(DATABASE_KEY, ConfigValue::Database(database));
        service
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertions for parse results.

    use super::*;

    /// Parse `source`, panicking with the error if it is rejected.
    #[track_caller]
    pub fn assert_parses(source: &str) -> Program {
        match parse(source) {
            Ok(program) => program,
            Err(err) => panic!("Expected source to parse, got: {}", err),
        }
    }

    /// Parse `source`, panicking if it is accepted.
    #[track_caller]
    pub fn assert_rejected(source: &str) -> ParseError {
        match parse(source) {
            Ok(program) => panic!("Expected a parse error, got: {:?}", program),
            Err(err) => err,
        }
    }

    /// Assert that a result is an UnexpectedToken error with the given kinds.
    #[track_caller]
    pub fn assert_unexpected_token<T: std::fmt::Debug>(
        result: &ParseResult<T>,
        expected: TokenKind,
        found: TokenKind,
    ) {
        match result {
            Err(ParseError::UnexpectedToken {
                expected: e,
                found: f,
                ..
            }) => {
                assert_eq!(*e, expected, "Wrong expected kind in UnexpectedToken");
                assert_eq!(*f, found, "Wrong found kind in UnexpectedToken");
            }
            other => panic!(
                "Expected UnexpectedToken({} / {}), got: {:?}",
                expected, found, other
            ),
        }
    }

    /// Assert that a result is an UnknownMember error raised in `block`.
    #[track_caller]
    pub fn assert_unknown_member<T: std::fmt::Debug>(result: &ParseResult<T>, block: BlockKind) {
        match result {
            Err(ParseError::UnknownMember { block: b, .. }) => {
                assert_eq!(*b, block, "Wrong block in UnknownMember");
            }
            other => panic!("Expected UnknownMember in {}, got: {:?}", block, other),
        }
    }

    /// Assert that printing `program` and parsing the output gives it back.
    #[track_caller]
    pub fn assert_round_trips(program: &Program) {
        let printed = pretty_print(program);
        match parse(&printed) {
            Ok(reparsed) => assert_eq!(
                &reparsed, program,
                "Round trip changed the tree; printed source:\n{}",
                printed
            ),
            Err(err) => panic!("Printed source failed to parse: {}\n{}", err, printed),
        }
    }
}
