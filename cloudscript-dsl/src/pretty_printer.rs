//! Pretty printer for CloudScript ASTs
//!
//! [`pretty_print`] renders canonical source that parses back to an equal
//! tree. [`outline`] renders the indented summary used by `trace_parser`.

use crate::error::ParseResult;
use crate::parser::*;

// ============================================================================
// CANONICAL SOURCE
// ============================================================================

/// Pretty-print a Program back to DSL source code.
///
/// Integer values are expected to be non-negative, as the grammar has no
/// way to spell a negative number.
pub fn pretty_print(program: &Program) -> String {
    program
        .services
        .iter()
        .map(|service| pretty_print_service(service, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse and pretty-print DSL source code (for round-trip testing).
pub fn round_trip(source: &str) -> ParseResult<String> {
    let program = parse(source)?;
    Ok(pretty_print(&program))
}

fn indent_str(level: usize) -> String {
    "    ".repeat(level)
}

fn pretty_print_service(service: &Service, indent: usize) -> String {
    let mut output = String::new();
    let ind = indent_str(indent);
    let inner = indent_str(indent + 1);

    output.push_str(&format!("{}service {} {{\n", ind, service.name));

    for endpoint in &service.endpoints {
        output.push_str(&pretty_print_endpoint(endpoint, indent + 1));
    }

    for connection in &service.connections {
        output.push_str(&format!(
            "{}connect to {} via {}\n",
            inner, connection.target_service, connection.protocol
        ));
    }

    for (key, value) in service.configuration.iter() {
        output.push_str(&pretty_print_config_entry(key, value, indent + 1));
    }

    for event in &service.events {
        output.push_str(&format!(
            "{}on {} {{ {} }}\n",
            inner,
            event.event_type,
            event.actions.join(", ")
        ));
    }

    output.push_str(&format!("{}}}\n", ind));
    output
}

fn pretty_print_endpoint(endpoint: &Endpoint, indent: usize) -> String {
    let mut output = String::new();
    let ind = indent_str(indent);
    let inner = indent_str(indent + 1);

    output.push_str(&format!("{}endpoint {} {{\n", ind, endpoint.path));

    if let Some(method) = endpoint.method {
        output.push_str(&format!("{}method: {}\n", inner, method));
    }
    if let Some(response) = &endpoint.response_type {
        output.push_str(&format!("{}response: {}\n", inner, response));
    }
    if let Some(cache) = &endpoint.cache {
        output.push_str(&format!("{}cache: {}\n", inner, cache));
    }
    if let Some(rate_limit) = &endpoint.rate_limit {
        output.push_str(&format!("{}rateLimit: {}\n", inner, rate_limit));
    }
    if let Some(timeout) = &endpoint.timeout {
        output.push_str(&format!("{}timeout: {}\n", inner, timeout));
    }
    if let Some(auth) = endpoint.auth {
        output.push_str(&format!("{}auth: {}\n", inner, auth));
    }
    if let Some(fallback) = &endpoint.fallback {
        output.push_str(&format!("{}fallback: {}\n", inner, fallback));
    }

    output.push_str(&format!("{}}}\n", ind));
    output
}

fn pretty_print_config_entry(key: &str, value: &ConfigValue, indent: usize) -> String {
    let ind = indent_str(indent);
    match value {
        ConfigValue::Platform(platform) => format!("{}deploy on: {}\n", ind, platform),
        ConfigValue::Integer(n) => format!("{}{}: {}\n", ind, key, n),
        ConfigValue::Database(database) => pretty_print_database(database, indent),
    }
}

fn pretty_print_database(database: &DatabaseConfig, indent: usize) -> String {
    let mut output = String::new();
    let ind = indent_str(indent);

    output.push_str(&format!("{}database {} {{\n", ind, database.db_type));
    for (key, value) in database.settings.iter() {
        output.push_str(&format!(
            "{}{}: {}\n",
            indent_str(indent + 1),
            key,
            pretty_print_setting_value(value.as_ref())
        ));
    }
    output.push_str(&format!("{}}}\n", ind));
    output
}

/// An absent value prints as `none`, which the lenient parser reads back as
/// absent.
fn pretty_print_setting_value(value: Option<&SettingValue>) -> String {
    match value {
        Some(SettingValue::String(s)) => format!("\"{}\"", escape_string(s)),
        Some(SettingValue::Integer(n)) => n.to_string(),
        None => "none".to_string(),
    }
}

/// Escape a string for the lexer's one-character escape rule.
pub(crate) fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ============================================================================
// DEBUG OUTLINE
// ============================================================================

/// Render an indented outline of the tree.
pub fn outline(program: &Program) -> String {
    let mut lines = vec!["Program:".to_string()];

    for service in &program.services {
        lines.push(format!("  Service: {}", service.name));

        if !service.endpoints.is_empty() {
            lines.push("    Endpoints:".to_string());
            for endpoint in &service.endpoints {
                lines.push(format!(
                    "      Endpoint: {} {}",
                    endpoint.effective_method(),
                    endpoint.path
                ));
                let attributes = [
                    ("response", endpoint.response_type.as_ref().map(ToString::to_string)),
                    ("cache", endpoint.cache.as_ref().map(ToString::to_string)),
                    ("rateLimit", endpoint.rate_limit.as_ref().map(ToString::to_string)),
                    ("timeout", endpoint.timeout.as_ref().map(ToString::to_string)),
                    ("auth", endpoint.auth.map(|a| a.to_string())),
                    ("fallback", endpoint.fallback.clone()),
                ];
                for (name, value) in attributes {
                    if let Some(value) = value {
                        lines.push(format!("        {}: {}", name, value));
                    }
                }
            }
        }

        if !service.connections.is_empty() {
            lines.push("    Connections:".to_string());
            for connection in &service.connections {
                lines.push(format!(
                    "      Connection to {} via {}",
                    connection.target_service, connection.protocol
                ));
            }
        }

        if !service.configuration.is_empty() {
            lines.push("    Configs:".to_string());
            for (key, value) in service.configuration.iter() {
                lines.push(format!("      {}: {}", key, outline_config_value(value)));
            }
        }

        if !service.events.is_empty() {
            lines.push("    Events:".to_string());
            for event in &service.events {
                lines.push(format!(
                    "      on {}: [{}]",
                    event.event_type,
                    event.actions.join(", ")
                ));
            }
        }
    }

    lines.join("\n")
}

fn outline_config_value(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Integer(n) => n.to_string(),
        ConfigValue::Platform(p) => p.to_string(),
        ConfigValue::Database(db) => {
            let settings = db
                .settings
                .iter()
                .map(|(k, v)| format!("{}={}", k, pretty_print_setting_value(v.as_ref())))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} {{{}}}", db.db_type, settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const BLOG: &str = r#"
service BlogService {
    endpoint /posts {
        method: GET
        response: Post[]
        cache: 5m
        rateLimit: 100/m
    }

    endpoint /posts/:id {
        method: DELETE
        response: bool
        auth: required
        timeout: 2s
        fallback: PostArchive
    }

    connect to AuthService

    deploy on: docker
    port: 8080
    replicas: 2

    database postgres {
        host: "local\"host"
        port: 5432
        ssl: required
    }

    on start { migrate, warm_cache }
}
"#;

    #[test]
    fn test_pretty_print_minimal() {
        let program = Program {
            services: vec![Service::new("Empty")],
        };

        assert_eq!(pretty_print(&program), "service Empty {\n}\n");
    }

    #[test]
    fn test_pretty_print_empty_program() {
        assert_eq!(pretty_print(&Program::default()), "");
    }

    #[test]
    fn test_pretty_print_endpoint() -> Result<(), ParseError> {
        let output = round_trip("service A { endpoint /users/:id { method: PUT rateLimit: 10/s } }")?;

        assert_eq!(
            output,
            "service A {\n    endpoint /users/:id {\n        method: PUT\n        rateLimit: 10/s\n    }\n}\n"
        );
        Ok(())
    }

    #[test]
    fn test_pretty_print_connection_spells_default_protocol() -> Result<(), ParseError> {
        let output = round_trip("service A { connect to B }")?;

        assert!(output.contains("connect to B via http\n"));
        Ok(())
    }

    #[test]
    fn test_round_trip_blog() -> Result<(), ParseError> {
        let program = parse(BLOG)?;
        let printed = pretty_print(&program);
        let reparsed = parse(&printed)?;

        assert_eq!(program, reparsed);
        assert_eq!(pretty_print(&reparsed), printed);
        Ok(())
    }

    #[test]
    fn test_round_trip_absent_setting_value() -> Result<(), ParseError> {
        let program = parse(BLOG)?;
        let printed = pretty_print(&program);

        assert!(printed.contains("        ssl: none\n"));
        assert!(printed.contains("        host: \"local\\\"host\"\n"));
        Ok(())
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn test_outline() -> Result<(), ParseError> {
        let program = parse(BLOG)?;
        let text = outline(&program);

        assert!(text.starts_with("Program:\n  Service: BlogService\n    Endpoints:\n"));
        assert!(text.contains("      Endpoint: GET /posts\n"));
        assert!(text.contains("        rateLimit: 100/m\n"));
        assert!(text.contains("      Connection to AuthService via http\n"));
        assert!(text.contains("      platform: docker\n"));
        assert!(text.contains("      database: postgres {host=\"local\\\"host\", ssl=none}"));
        assert!(text.ends_with("      on start: [migrate, warm_cache]"));
        Ok(())
    }
}
