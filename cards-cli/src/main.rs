//! Cards CLI
//!
//! Command-line interface for the Cards API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cards_client::CardsClient;
use cards_types::{CardId, CreateCardRequest, HolderId, UpdateCardRequest};

#[derive(Parser)]
#[command(name = "cards")]
#[command(author, version, about = "Cards API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Cards API
    #[arg(long, env = "CARDS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// API version path segment
    #[arg(long, env = "CARDS_API_VERSION", default_value = "v1")]
    api_version: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Card operations
    Card {
        #[command(subcommand)]
        action: CardCommands,
    },
    /// Holder operations
    Holder {
        #[command(subcommand)]
        action: HolderCommands,
    },
    /// Check API health
    Health,
}

/// Fields shared by `card update` and `card patch`.
#[derive(clap::Args)]
struct CardChanges {
    #[arg(long)]
    number: Option<String>,
    #[arg(long)]
    cvc: Option<String>,
    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expiry: Option<NaiveDate>,
    #[arg(long)]
    balance: Option<f64>,
}

impl From<CardChanges> for UpdateCardRequest {
    fn from(changes: CardChanges) -> Self {
        UpdateCardRequest {
            number: changes.number,
            cvc: changes.cvc,
            expiry: changes.expiry,
            balance: changes.balance,
        }
    }
}

#[derive(Subcommand)]
enum CardCommands {
    /// List cards
    List {
        /// Substring of the card number
        #[arg(long)]
        number: Option<String>,
        /// Substring of the holder name
        #[arg(long)]
        holder: Option<String>,
    },
    /// Get card details
    Get {
        /// Card ID
        id: String,
    },
    /// Get card details by external UUID
    GetExternal {
        external_id: String,
    },
    /// Create a new card
    Create {
        #[arg(long)]
        number: String,
        #[arg(long)]
        cvc: String,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: NaiveDate,
        #[arg(long)]
        holder: String,
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    /// Replace a card (PUT)
    Update {
        id: String,
        #[command(flatten)]
        changes: CardChanges,
    },
    /// Partially update a card (PATCH)
    Patch {
        id: String,
        #[command(flatten)]
        changes: CardChanges,
    },
    /// Delete a card
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum HolderCommands {
    /// List holders
    List {
        /// Substring of the holder name
        #[arg(long)]
        name: Option<String>,
    },
    /// Get holder details
    Get {
        /// Holder ID
        id: String,
    },
    /// Get a holder by exact name
    ByName {
        name: String,
    },
    /// Create a new holder
    Create {
        name: String,
    },
    /// Rename a holder
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a holder without cards
    Delete {
        id: String,
    },
}

fn parse_card_id(s: &str) -> Result<CardId> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid card ID: {}", s))
}

fn parse_holder_id(s: &str) -> Result<HolderId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid holder ID: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = CardsClient::new(&cli.api_url).with_api_version(cli.api_version);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Card { action } => match action {
            CardCommands::List { number, holder } => {
                let cards = client
                    .list_cards(number.as_deref(), holder.as_deref())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&cards)?);
            }
            CardCommands::Get { id } => {
                let card = client.get_card(parse_card_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
            CardCommands::GetExternal { external_id } => {
                let card = client.get_card_by_external_id(&external_id).await?;
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
            CardCommands::Create {
                number,
                cvc,
                expiry,
                holder,
                balance,
            } => {
                let req = CreateCardRequest {
                    number,
                    cvc,
                    expiry,
                    holder_name: holder,
                    balance,
                };
                let card = client.create_card(&req).await?;
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
            CardCommands::Update { id, changes } => {
                let card = client
                    .replace_card(parse_card_id(&id)?, &changes.into())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
            CardCommands::Patch { id, changes } => {
                let card = client
                    .patch_card(parse_card_id(&id)?, &changes.into())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
            CardCommands::Delete { id } => {
                client.delete_card(parse_card_id(&id)?).await?;
                println!("✓ Card deleted");
            }
        },

        Commands::Holder { action } => match action {
            HolderCommands::List { name } => {
                let holders = client.list_holders(name.as_deref()).await?;
                println!("{}", serde_json::to_string_pretty(&holders)?);
            }
            HolderCommands::Get { id } => {
                let holder = client.get_holder(parse_holder_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&holder)?);
            }
            HolderCommands::ByName { name } => {
                let holder = client.get_holder_by_name(&name).await?;
                println!("{}", serde_json::to_string_pretty(&holder)?);
            }
            HolderCommands::Create { name } => {
                let holder = client.create_holder(&name).await?;
                println!("{}", serde_json::to_string_pretty(&holder)?);
            }
            HolderCommands::Update { id, name } => {
                let holder = client.update_holder(parse_holder_id(&id)?, name).await?;
                println!("{}", serde_json::to_string_pretty(&holder)?);
            }
            HolderCommands::Delete { id } => {
                client.delete_holder(parse_holder_id(&id)?).await?;
                println!("✓ Holder deleted");
            }
        },
    }

    Ok(())
}
