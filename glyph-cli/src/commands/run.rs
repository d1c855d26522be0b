//! `glyph run <file>` (§6): transpile then execute inside the sandbox,
//! reporting the resulting [`ExecutionResult`].

use crate::config::Config;
use clap::Parser;
use glyph_analyzer::{analyze, AnalyzerOptions, Mode};
use glyph_codegen::{generate, GeneratorOptions, StdlibMode};
use glyph_diagnostics::render_text;
use glyph_registry::Registry;
use glyph_sandbox::{SandboxExecutor, SandboxOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Args {
    pub file: PathBuf,
    #[arg(long)]
    pub memory_limit: Option<u64>,
    #[arg(long)]
    pub cpu_timeout: Option<u64>,
    #[arg(long = "allow-file", value_name = "PATTERN")]
    pub file_patterns: Vec<String>,
    #[arg(long)]
    pub allow_network: bool,
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: Args, config: &Config) -> anyhow::Result<i32> {
    let source = std::fs::read_to_string(&args.file)?;
    let file_name = args.file.to_string_lossy().to_string();

    let program = match glyph_syntax::parse(&source, Some(&file_name)) {
        Ok(program) => program,
        Err(err) => {
            eprint!("{}", render_text(&err, &source));
            return Ok(1);
        }
    };

    let registry = Registry::with_default_builtins();
    let analyzer_options = AnalyzerOptions { mode: Mode::Strict, ..Default::default() };
    let analysis = analyze(&program, &registry, &analyzer_options);

    if !analysis.passed {
        for issue in &analysis.issues {
            eprint!("{}", render_text(issue, &source));
        }
        return Ok(1);
    }

    let stdlib_mode = match config.stdlib_mode.as_str() {
        "host" => StdlibMode::Host,
        _ => StdlibMode::Native,
    };
    let generator_options = GeneratorOptions { stdlib_mode, source_file: Some(file_name) };
    let output = match generate(&program, &source, &registry, &generator_options) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("error: {}", err);
            return Ok(1);
        }
    };

    let sandbox_options = SandboxOptions {
        cpu_timeout_secs: args.cpu_timeout.unwrap_or(config.cpu_timeout_secs),
        memory_limit_bytes: args.memory_limit.unwrap_or(config.memory_limit_bytes),
        network_enabled: args.allow_network,
        file_patterns: args.file_patterns,
        ..Default::default()
    };

    let executor = SandboxExecutor::new();
    let result = executor.run(&output.code, Vec::new(), &sandbox_options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.stdout);
        eprint!("{}", result.stderr);
        if !result.is_success() {
            eprintln!("run status: {:?}", result.status);
        }
    }

    Ok(if result.is_success() { 0 } else { 1 })
}
