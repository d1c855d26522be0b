//! `glyph parse <file>` (§6): prints the AST as a tree or as JSON.

use clap::Parser;
use glyph_diagnostics::render_text;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Args {
    pub file: PathBuf,
    /// Print the AST as JSON instead of an indented tree.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: Args) -> anyhow::Result<i32> {
    let source = std::fs::read_to_string(&args.file)?;
    let file_name = args.file.to_string_lossy().to_string();

    match glyph_syntax::parse(&source, Some(&file_name)) {
        Ok(program) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                println!("{:#?}", program);
            }
            Ok(0)
        }
        Err(err) => {
            eprint!("{}", render_text(&err, &source));
            Ok(1)
        }
    }
}
