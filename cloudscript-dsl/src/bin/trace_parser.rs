/// CloudScript Tracer - Shows the flow through Source → Tokens → AST
///
/// Usage: cargo run --features cli --bin trace_parser <source-file> [parser-config.toml]
///
/// Set RUST_LOG=cloudscript_dsl=trace to see every skipped token.
use cloudscript_dsl::{outline, pretty_print, Lexer, Parser, ParserConfig, TokenKind};
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cloudscript_dsl=debug,info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --features cli --bin trace_parser <source-file> [parser-config.toml]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --features cli --bin trace_parser cloudscript-test-utils/fixtures/blog.cs");
        return ExitCode::FAILURE;
    }

    let source_path = &args[1];

    let config = match args.get(2) {
        Some(config_path) => {
            let parsed = fs::read_to_string(config_path)
                .map_err(|e| e.to_string())
                .and_then(|text| ParserConfig::from_toml_str(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load {}: {}", config_path, e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => ParserConfig::default(),
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ CLOUDSCRIPT PARSER TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    let source = match fs::read_to_string(source_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", source_path, e);
            return ExitCode::FAILURE;
        }
    };

    // Step 1: Source → tokens
    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    let tokens = Lexer::new(&source).tokenize();
    for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
        println!(
            "  {:<14} | {:<24} | Line {}",
            format!("{:?}", token.kind),
            token.lexeme,
            token.line()
        );
    }
    println!("  ({} tokens)\n", tokens.len());

    // Step 2: Tokens → AST
    let program = match Parser::with_config(tokens, config).parse() {
        Ok(program) => program,
        Err(e) => {
            println!("❌ Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("🌳 AST:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", outline(&program));
    println!();

    println!("📦 JSON:");
    println!("─────────────────────────────────────────────────────────────");
    match serde_json::to_string_pretty(&program) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("(serialization failed: {})", e),
    }
    println!();

    // Step 3: Round-trip
    println!("🔄 CANONICAL SOURCE:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", pretty_print(&program));

    println!("✅ Parse succeeded!");
    ExitCode::SUCCESS
}
