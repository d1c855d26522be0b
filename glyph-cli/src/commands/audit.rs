//! `glyph audit <file>` (§6): runs the analyzer and exits non-zero on any
//! `critical` issue.

use clap::Parser;
use glyph_analyzer::{analyze, AnalyzerOptions, Mode};
use glyph_diagnostics::{render_json, render_text, Severity};
use glyph_registry::Registry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Args {
    pub file: PathBuf,
    #[arg(long, default_value = "text")]
    pub format: String,
    /// Accepted for interface compatibility; the analyzer's own strict/
    /// permissive mode already decides what is a hard failure (§4.3).
    #[arg(long)]
    pub threat_level: Option<String>,
}

pub fn execute(args: Args) -> anyhow::Result<i32> {
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
    let options = AnalyzerOptions { mode: Mode::Strict, ..Default::default() };
    let result = analyze(&program, &registry, &options);

    if args.format == "json" {
        let rendered: Vec<_> = result.issues.iter().map(|issue| render_json(issue)).collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        for issue in &result.issues {
            print!("{}", render_text(issue, &source));
        }
        if result.issues.is_empty() {
            println!("no issues found");
        }
    }

    let has_critical = result.issues.iter().any(|issue| issue.severity == Severity::Critical);
    Ok(if has_critical { 1 } else { 0 })
}
