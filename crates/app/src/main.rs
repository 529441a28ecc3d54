mod cli;

use clap::{Parser, Subcommand};

use cli::args::Args;
use cli::op::{Op, OpContext};
use cli::{Init, List, Normalize};

command_enum! {
    (Init, Init),
    (List, List),
    (Normalize, Normalize),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = match OpContext::new(args.remote, args.token, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = args
        .log_level
        .unwrap_or_else(|| ctx.state.config.log_level.clone());
    let guard = drivefix::logging::init_logging(&log_level);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered log lines before exiting
    drop(guard);
    std::process::exit(code);
}
