use gitclone::{Cli, Result};
use std::env;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if let Err(err) = run(&args[1..]).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let cli = Cli::new(args)?;
    cli.run().await
}
