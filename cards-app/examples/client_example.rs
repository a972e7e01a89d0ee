//! Client example walking through card and holder flows against a running server.
//!
//! Run with: cargo run -p cards-app --example client_example

use std::net::SocketAddr;
use std::sync::Arc;

use cards_client::CardsClient;
use cards_hex::{CardService, HolderService, inbound::HttpServer};
use cards_repo::SqliteRepo;
use cards_types::{CreateCardRequest, UpdateCardRequest};
use chrono::{Duration, Utc};
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("cards.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let repo = Arc::new(SqliteRepo::new(&db_url).await?);
    let server = HttpServer::new(
        CardService::with_memory_cache(repo.clone()),
        HolderService::with_memory_cache(repo),
    );
    let router = server.router();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    println!("🚀 Server on {addr}, database {db_url}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server stopped: {e}");
        }
    });

    let client = CardsClient::new(format!("http://{addr}"));

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let ana = client.create_holder("Ana Maria").await?;
    println!("✅ Created holder: {} (id={})", ana.name, ana.id);

    let card = client
        .create_card(&CreateCardRequest {
            number: "1111-2222-3333-4444".to_string(),
            cvc: "123".to_string(),
            expiry: Utc::now().date_naive() + Duration::days(365),
            holder_name: ana.name.clone(),
            balance: 123.0,
        })
        .await?;
    println!("✅ Created card {} (external id {})", card.id, card.external_id);

    let card = client
        .patch_card(
            card.id,
            &UpdateCardRequest {
                balance: Some(500.0),
                ..Default::default()
            },
        )
        .await?;
    println!("✅ Patched balance: {:.2}", card.balance);

    let same = client
        .get_card_by_external_id(&card.external_id.to_string())
        .await?;
    println!("✅ Fetched by external id: {}", same.number);

    // Holder still owns a card, so the delete is refused
    match client.delete_holder(ana.id).await {
        Err(e) => println!("✅ Delete refused: {e}"),
        Ok(()) => anyhow::bail!("holder with cards was deleted"),
    }

    let matches = client.list_cards(None, Some("maria")).await?;
    println!("\n📋 Cards held by *maria*:");
    for c in &matches {
        println!("   - {} {} ({:.2})", c.id, c.number, c.balance);
    }

    client.delete_card(card.id).await?;
    client.delete_holder(ana.id).await?;
    println!("✅ Card and holder removed");

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
