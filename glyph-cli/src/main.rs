use clap::{Parser, Subcommand};
use glyph_cli::commands::{audit, cache, parse, run, transpile};
use glyph_cli::config::Config;
use glyph_cli::logging;

#[derive(Parser, Debug)]
#[command(name = "glyph", version, about = "Transpiler and sandboxed runtime for ML")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a source file and print its AST.
    Parse(parse::Args),
    /// Run the security analyzer over a source file.
    Audit(audit::Args),
    /// Transpile a source file to the host language.
    Transpile(transpile::Args),
    /// Transpile and execute a source file inside the sandbox.
    Run(run::Args),
    /// Inspect or clear the on-disk cache.
    Cache(cache::Args),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    logging::init();

    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return std::process::ExitCode::from(1);
        }
    };

    let dispatch = async {
        match cli.command {
            Command::Parse(args) => parse::execute(args),
            Command::Audit(args) => audit::execute(args),
            Command::Transpile(args) => transpile::execute(args, &config),
            Command::Run(args) => run::execute(args, &config).await,
            Command::Cache(args) => cache::execute(args, &config),
        }
    };

    let code = tokio::select! {
        result = dispatch => match result {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {}", err);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            130
        }
    };

    std::process::ExitCode::from(code as u8)
}
