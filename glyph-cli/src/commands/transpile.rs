//! `glyph transpile <file>` (§6): parse → analyze → generate, writing the
//! generated code and an optional source map.

use crate::config::Config;
use clap::Parser;
use glyph_analyzer::{analyze, AnalyzerOptions, Mode};
use glyph_codegen::{generate, GeneratorOptions, StdlibMode};
use glyph_diagnostics::render_text;
use glyph_registry::Registry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Args {
    pub file: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub sourcemap: bool,
    #[arg(long, conflicts_with = "no_strict")]
    pub strict: bool,
    #[arg(long)]
    pub no_strict: bool,
    #[arg(long)]
    pub stdlib_mode: Option<String>,
}

pub fn execute(args: Args, config: &Config) -> anyhow::Result<i32> {
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
    let mode = if args.no_strict { Mode::Permissive } else { Mode::Strict };
    let analyzer_options = AnalyzerOptions { mode, ..Default::default() };
    let analysis = analyze(&program, &registry, &analyzer_options);

    if !analysis.passed {
        for issue in &analysis.issues {
            eprint!("{}", render_text(issue, &source));
        }
        return Ok(1);
    }

    let stdlib_mode = match args.stdlib_mode.as_deref().unwrap_or(&config.stdlib_mode) {
        "host" => StdlibMode::Host,
        _ => StdlibMode::Native,
    };
    let generator_options = GeneratorOptions { stdlib_mode, source_file: Some(file_name) };

    match generate(&program, &source, &registry, &generator_options) {
        Ok(output) => {
            match &args.output {
                Some(path) => std::fs::write(path, &output.code)?,
                None => print!("{}", output.code),
            }
            if args.sourcemap {
                let map_path = args.output.as_ref().map(|p| p.with_extension("map.json"));
                let map_json = serde_json::to_string_pretty(&output.source_map)?;
                match map_path {
                    Some(path) => std::fs::write(path, map_json)?,
                    None => eprintln!("{}", map_json),
                }
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("error: {}", err);
            Ok(1)
        }
    }
}
