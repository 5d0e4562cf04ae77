//! Shelf - console front end for the book store.
//!
//! Reads one command per line from stdin and prints the edit scripts of a live
//! view over all books as they arrive.

use std::sync::Arc;

use shelf_engine::{BookId, Query};
use shelf_library::{CatalogBook, Config, LiveView, OpenLibraryClient, Shelf, Store};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: search <text> | add <n> | read <id> | unread <id> | toggle <id> | rm <id> | list [all|read|unread] | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_library=debug,shelf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let store = Arc::new(Store::open(&config).await?);
    let catalog = OpenLibraryClient::from_config(&config)?;
    let shelf = Shelf::new(store.clone(), catalog, config.search_min_chars);

    let view = shelf.watch(Query::all()).await?;
    let printer = tokio::spawn(render(view));

    println!("{HELP}");
    let mut hits: Vec<CatalogBook> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        let outcome = match command {
            "" => Ok(()),
            "quit" | "exit" => break,
            "search" => shelf.search(arg).await.map(|found| {
                for (n, hit) in found.iter().enumerate() {
                    println!(
                        "{n:>3}  {} / {} {}",
                        hit.title,
                        hit.primary_author().unwrap_or("?"),
                        hit.primary_isbn()
                    );
                }
                hits = found;
            }),
            "add" => match arg.parse::<usize>().ok().and_then(|n| hits.get(n)) {
                Some(hit) => shelf.add(hit).await.map(|_| ()),
                None => {
                    println!("no search result {arg:?}");
                    Ok(())
                }
            },
            "read" | "unread" | "toggle" | "rm" => match arg.parse::<BookId>() {
                Ok(id) => match command {
                    "read" => shelf.mark_read(id, true).await.map(|_| ()),
                    "unread" => shelf.mark_read(id, false).await.map(|_| ()),
                    "toggle" => shelf.toggle_read(id).await.map(|_| ()),
                    _ => shelf.remove(id).await,
                },
                Err(_) => {
                    println!("not a book id: {arg:?}");
                    Ok(())
                }
            },
            "list" => {
                let query = match arg {
                    "read" => Query::read(),
                    "unread" => Query::unread(),
                    _ => Query::all(),
                };
                store.query(&query).await.map(|snapshot| {
                    for book in &snapshot {
                        let mark = if book.read { 'x' } else { ' ' };
                        println!("[{mark}] {:>4}  {} / {}", book.id, book.title, book.author);
                    }
                })
            }
            _ => {
                println!("{HELP}");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            println!("error: {err}");
        }
    }

    store.close().await;
    printer.await?;

    Ok(())
}

/// Print every change of a live view until it closes.
async fn render(mut view: LiveView) {
    while let Some(change) = view.next().await {
        if change.edits.is_empty() {
            continue;
        }
        match serde_json::to_string(&change.edits) {
            Ok(json) => println!("~ {json}"),
            Err(err) => tracing::warn!("Cannot render edits: {}", err),
        }
    }
}
