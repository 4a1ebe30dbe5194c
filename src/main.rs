use api_client::{DEFAULT_SUMMARY_LIMIT, VyaparApi, VyaparClient};
use clap::{Parser, Subcommand};
use configuration::load_config;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Vyapar command-line client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one is present.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Credentials must be complete before any request is attempted.
    let config = load_config()?;

    let response = match cli.command {
        Commands::ItemSummary(args) => {
            VyaparClient::new(args.user_id, &config)?
                .item_summary(args.limit)
                .await
        }
        Commands::ItemDetailed(args) => {
            VyaparClient::new(args.user_id, &config)?
                .item_detailed(&args.ids)
                .await
        }
        Commands::PartySummary(args) => {
            VyaparClient::new(args.user_id, &config)?
                .party_summary(args.limit)
                .await
        }
        Commands::PartyDetailed(args) => {
            VyaparClient::new(args.user_id, &config)?
                .party_detailed(&args.ids)
                .await
        }
        Commands::TransactionSummary(args) => {
            VyaparClient::new(args.user_id, &config)?
                .transaction_summary(args.limit)
                .await
        }
        Commands::TransactionDetailed(args) => {
            VyaparClient::new(args.user_id, &config)?
                .transaction_detailed(&args.ids)
                .await
        }
    };

    // The envelope already distinguishes success from failure; print it
    // either way and leave the exit code for usage and setup errors.
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Signed command-line access to Vyapar bookkeeping records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List inventory items for an account.
    ItemSummary(SummaryArgs),
    /// Fetch full item records by id.
    ItemDetailed(DetailedArgs),
    /// List parties (customers and suppliers) for an account.
    PartySummary(SummaryArgs),
    /// Fetch full party records by id.
    PartyDetailed(DetailedArgs),
    /// List transactions for an account.
    TransactionSummary(SummaryArgs),
    /// Fetch full transaction records by id.
    TransactionDetailed(DetailedArgs),
}

#[derive(Parser)]
struct SummaryArgs {
    /// The remote account whose records to query.
    user_id: i64,

    /// Maximum number of records to return.
    #[arg(long, default_value_t = DEFAULT_SUMMARY_LIMIT)]
    limit: u32,
}

#[derive(Parser)]
struct DetailedArgs {
    /// The remote account whose records to query.
    user_id: i64,

    /// Ids of the records to fetch.
    ids: Vec<i64>,
}
