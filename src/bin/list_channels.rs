use anyhow::Result;
use clap::Parser;
use sxm_rs::utils::logger;
use sxm_rs::SxmClient;

/// Connects with the given credentials and prints the channel lineup.
#[derive(Debug, Parser)]
#[command(name = "list-channels")]
#[command(about = "Print the SiriusXM channel lineup for an account")]
struct Args {
    #[arg(long, env = "SXM_USERNAME")]
    username: String,

    #[arg(long, env = "SXM_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, help = "Include channels the account is not entitled to")]
    all: bool,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let client = SxmClient::new(&args.username, &args.password);
    client.connect().await?;

    let channels = client.get_channels().await?;
    println!("📻 {} channels", channels.len());

    for channel in &channels {
        if channel.unentitled && !args.all {
            continue;
        }
        // channelNumber comes over the wire as either a number or a string.
        let number = match &channel.channel_number {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {:>5}  {}  {}", number, channel.id, channel.title);
    }

    Ok(())
}
