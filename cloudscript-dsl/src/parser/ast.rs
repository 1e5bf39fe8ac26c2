//! Abstract Syntax Tree types
//!
//! The tree is plain owned data: a [`Program`] owns its services and each
//! [`Service`] owns everything declared inside it. Sequence fields are always
//! present (possibly empty) and optional attributes are `None` when the
//! source did not set them.

use crate::lexer::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// DOWNSTREAM DEFAULTS
// ============================================================================

/// Port generators use when a service does not declare one.
pub const DEFAULT_PORT: i64 = 8080;

/// Replica count generators use when a service does not declare one.
pub const DEFAULT_REPLICAS: i64 = 3;

/// Reserved configuration keys.
pub const PLATFORM_KEY: &str = "platform";
pub const PORT_KEY: &str = "port";
pub const REPLICAS_KEY: &str = "replicas";
pub const DATABASE_KEY: &str = "database";

// ============================================================================
// AST TYPES
// ============================================================================

/// The root AST node: every service in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub services: Vec<Service>,
}

impl Program {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// A named microservice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
    pub connections: Vec<Connection>,
    pub configuration: SettingMap<ConfigValue>,
    pub events: Vec<Event>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
            connections: Vec::new(),
            configuration: SettingMap::new(),
            events: Vec::new(),
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        match self.configuration.get(PLATFORM_KEY) {
            Some(ConfigValue::Platform(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn port(&self) -> Option<i64> {
        self.integer(PORT_KEY)
    }

    pub fn replicas(&self) -> Option<i64> {
        self.integer(REPLICAS_KEY)
    }

    pub fn database(&self) -> Option<&DatabaseConfig> {
        match self.configuration.get(DATABASE_KEY) {
            Some(ConfigValue::Database(db)) => Some(db),
            _ => None,
        }
    }

    pub fn effective_port(&self) -> i64 {
        self.port().unwrap_or(DEFAULT_PORT)
    }

    pub fn effective_replicas(&self) -> i64 {
        self.replicas().unwrap_or(DEFAULT_REPLICAS)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.configuration.get(key) {
            Some(ConfigValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }
}

/// A value stored in a service's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigValue {
    Integer(i64),
    Platform(Platform),
    Database(DatabaseConfig),
}

/// An API route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Always non-empty and starting with `/`.
    pub path: String,
    pub method: Option<HttpMethod>,
    pub response_type: Option<ResponseType>,
    pub cache: Option<DurationLiteral>,
    pub rate_limit: Option<RateLimit>,
    pub timeout: Option<DurationLiteral>,
    pub auth: Option<AuthLevel>,
    pub fallback: Option<String>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: None,
            response_type: None,
            cache: None,
            rate_limit: None,
            timeout: None,
            auth: None,
            fallback: None,
        }
    }

    /// The method generators should emit; absent means GET.
    pub fn effective_method(&self) -> HttpMethod {
        self.method.unwrap_or(HttpMethod::Get)
    }

    /// Names of the `:name` parameter segments in the path, in order.
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// A declared dependency on another service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub target_service: String,
    pub protocol: Protocol,
}

/// A lifecycle hook with its ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub actions: Vec<String>,
}

/// Database configuration stored under the `database` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub db_type: String,
    /// `None` marks a setting whose value was neither a string nor a number.
    pub settings: SettingMap<Option<SettingValue>>,
}

impl DatabaseConfig {
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            settings: SettingMap::new(),
        }
    }
}

/// Scalar database setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    String(String),
    Integer(i64),
}

// ============================================================================
// CLOSED VOCABULARIES
// ============================================================================

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($token:ident, $spelling:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Source spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $spelling),+
                }
            }

            pub fn from_token(kind: TokenKind) -> Option<Self> {
                match kind {
                    $(TokenKind::$token => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn token_kind(self) -> TokenKind {
                match self {
                    $($name::$variant => TokenKind::$token),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// HTTP methods accepted by `method:`.
    HttpMethod {
        Get => (Get, "GET"),
        Post => (Post, "POST"),
        Put => (Put, "PUT"),
        Delete => (Delete, "DELETE"),
        Patch => (Patch, "PATCH"),
    }
}

vocabulary! {
    /// Transport protocols accepted by `via`.
    Protocol {
        Http => (Http, "http"),
        Grpc => (Grpc, "grpc"),
        RabbitMq => (RabbitMq, "rabbitmq"),
        Kafka => (Kafka, "kafka"),
    }
}

vocabulary! {
    /// Deployment platforms accepted by `deploy on:`.
    Platform {
        Docker => (Docker, "docker"),
        Kubernetes => (Kubernetes, "kubernetes"),
        Aws => (Aws, "aws"),
        Azure => (Azure, "azure"),
        Gcp => (Gcp, "gcp"),
    }
}

vocabulary! {
    /// Authentication levels accepted by `auth:`.
    AuthLevel {
        Required => (Required, "required"),
        Optional => (Optional, "optional"),
        None => (None, "none"),
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Http
    }
}

/// Lifecycle event types. These are contextual names, not reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Start,
    Shutdown,
    Error,
    Scale,
}

impl EventType {
    pub const ALL: &'static [EventType] = &[
        EventType::Start,
        EventType::Shutdown,
        EventType::Error,
        EventType::Scale,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::Shutdown => "shutdown",
            EventType::Error => "error",
            EventType::Scale => "scale",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(EventType::Start),
            "shutdown" => Some(EventType::Shutdown),
            "error" => Some(EventType::Error),
            "scale" => Some(EventType::Scale),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ATTRIBUTE VALUES
// ============================================================================

/// Response type of an endpoint, e.g. `User` or `User[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseType {
    pub name: String,
    pub is_array: bool,
}

impl ResponseType {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
        }
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: true,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Rate limit, e.g. `100/m`, or a bare amount when no unit was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Number literal exactly as written.
    pub amount: String,
    pub per: Option<String>,
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.per {
            Some(unit) => write!(f, "{}/{}", self.amount, unit),
            None => f.write_str(&self.amount),
        }
    }
}

/// Duration literal as written in source, e.g. `5m` or `1.5h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationLiteral(pub String);

impl DurationLiteral {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unit suffix: one of `s`, `m`, `h`, `d`.
    pub fn unit(&self) -> Option<char> {
        self.0.chars().last().filter(|c| matches!(c, 's' | 'm' | 'h' | 'd'))
    }

    /// Convert to a `std::time::Duration`, if the magnitude is a valid number.
    pub fn to_std(&self) -> Option<Duration> {
        let unit = self.unit()?;
        let magnitude: f64 = self.0[..self.0.len() - 1].parse().ok()?;
        let seconds_per_unit = match unit {
            's' => 1.0,
            'm' => 60.0,
            'h' => 3_600.0,
            _ => 86_400.0,
        };
        Duration::try_from_secs_f64(magnitude * seconds_per_unit).ok()
    }
}

impl fmt::Display for DurationLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SETTING MAP
// ============================================================================

/// Insertion-ordered string-keyed map.
///
/// Setting a key that is already present replaces the value in place, so the
/// key keeps its original position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> SettingMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for SettingMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for SettingMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
