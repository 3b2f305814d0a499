//! One-shot translation from the command line.
//!
//! Usage:
//!   cargo run --bin translate -- --to es Hello world
//!   cargo run --bin translate -- --from de --to en --raw "Guten Morgen"
//!
//! Prints the result as JSON. Endpoint overrides are read from the same
//! environment variables as the server (see `.env`).

use anyhow::{bail, Context, Result};
use tracing::info;
use translate_gateway::{config::Config, TranslateOptions, Translator};

struct Args {
    text: String,
    options: TranslateOptions,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut options = TranslateOptions::new();
    let mut words = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--from" | "-f" => {
                options.from = Some(args.next().context("--from needs a language")?);
            }
            "--to" | "-t" => {
                options.to = Some(args.next().context("--to needs a language")?);
            }
            "--raw" => options.raw = true,
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        bail!("Usage: translate [--from LANG] [--to LANG] [--raw] TEXT...");
    }

    Ok(Args {
        text: words.join(" "),
        options,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr, so stdout stays pure JSON)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translate_gateway=warn".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    let translator = Translator::from_config(&config)?;

    info!("Translating {} chars", args.text.chars().count());
    let result = translator
        .translate(&args.text, args.options)
        .await
        .context("Translation failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
