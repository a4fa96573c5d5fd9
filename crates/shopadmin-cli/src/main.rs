//! shopadmin CLI
//!
//! Command-line client for the shop admin backend: page through any list
//! resource and run the order and notification actions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::bail;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use shopadmin_api::{OrderStatus, Resource};
use shopadmin_client::HttpClient;
use shopadmin_core::{CollectionView, HttpPageFetcher, NotificationFeed, ViewState, pagination};

mod config;

use config::Config;

/// shop admin command-line client
#[derive(Parser, Debug)]
#[command(name = "shopadmin", version, long_about = None)]
struct Cli {
    /// API base URL, overrides the config file
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of a resource
    List(ListArgs),
    /// Delete an item of a resource
    Delete { resource: Resource, id: String },
    /// Change the status of an order
    OrderStatus { id: String, status: OrderStatus },
    /// Assign a shipper to an order
    AssignShipper { order_id: String, shipper_id: String },
    /// Show notifications or change their read state
    Notifications(NotificationArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    resource: Resource,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: u64,

    /// Items per page, defaults to the configured size of the resource
    #[arg(long)]
    page_size: Option<u64>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    sort_by: Option<String>,

    /// Resource-specific filter, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct NotificationArgs {
    /// Only show unread notifications
    #[arg(long)]
    unread: bool,

    #[command(subcommand)]
    action: Option<NotificationAction>,
}

#[derive(Subcommand, Debug)]
enum NotificationAction {
    /// Mark one notification as read
    MarkRead { id: String },
    /// Mark every notification as read
    MarkAllRead,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let (mut config, source) = Config::discover(cli.config.as_deref())?;

    init_tracing(&config.api.log_level, cli.json_logs);
    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::warn!("no config file found, using defaults"),
    }

    if let Some(server) = cli.server {
        config.api.base_url = server;
    }
    let client = HttpClient::with_timeout(&config.api.base_url, config.timeout())?;

    match cli.command {
        Commands::List(args) => list(client, &config, args).await,
        Commands::Delete { resource, id } => {
            client.delete_item(resource, &id).await?;
            println!("Deleted {resource} {id}");
            Ok(())
        }
        Commands::OrderStatus { id, status } => {
            client.update_order_status(&id, status).await?;
            println!("Order {id} is now {status}");
            Ok(())
        }
        Commands::AssignShipper {
            order_id,
            shipper_id,
        } => {
            client.assign_shipper(&order_id, &shipper_id).await?;
            println!("Assigned shipper {shipper_id} to order {order_id}");
            Ok(())
        }
        Commands::Notifications(args) => notifications(client, &config, args).await,
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn list(client: HttpClient, config: &Config, args: ListArgs) -> Result<()> {
    let resource = args.resource;
    let mut query = resource
        .default_query()
        .with_page_size(args.page_size.unwrap_or_else(|| config.page_size(resource)))
        .with_page(args.page);
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(sort_by) = args.sort_by {
        query = query.with_sort(sort_by);
    }
    for (key, value) in args.filters {
        query = query.with_filter(key, value);
    }

    let fetcher = HttpPageFetcher::for_resource(client, resource);
    let view: CollectionView<Value> =
        CollectionView::with_options(fetcher, query, config.view.clone());
    let state = view.settled().await;
    if let Some(err) = state.error() {
        bail!("failed to list {resource}: {err}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page_json(&state))?);
    } else {
        print_page(resource, &state);
    }
    Ok(())
}

async fn notifications(client: HttpClient, config: &Config, args: NotificationArgs) -> Result<()> {
    let query = Resource::Notifications
        .default_query()
        .with_page_size(config.page_size(Resource::Notifications));
    let feed = NotificationFeed::with_options(client, query, config.view.clone());
    let state = feed.view().settled().await;
    if let Some(err) = state.error() {
        bail!("failed to load notifications: {err}");
    }

    match args.action {
        Some(NotificationAction::MarkRead { id }) => {
            feed.mark_as_read(&id).await?;
            println!("Marked notification {id} as read, {} unread", feed.unread_count());
        }
        Some(NotificationAction::MarkAllRead) => {
            feed.mark_all_as_read().await?;
            println!("Marked all notifications as read");
        }
        None => {
            let shown = state
                .items()
                .iter()
                .filter(|n| !args.unread || n.is_unread);
            for n in shown {
                let marker = if n.is_unread { "*" } else { " " };
                println!("{marker} {:>8}  {}  {}", n.id, n.title, n.message);
            }
            println!("{} unread of {}", feed.unread_count(), state.total());
        }
    }
    Ok(())
}

fn page_json(state: &ViewState<Value>) -> Value {
    json!({
        "items": state.items(),
        "page": state.query.page,
        "pageSize": state.query.page_size,
        "total": state.total(),
        "totalPages": state.total_pages(),
    })
}

fn print_page(resource: Resource, state: &ViewState<Value>) {
    if state.items().is_empty() {
        println!("No {resource} found");
        return;
    }
    for item in state.items() {
        println!("{:>8}  {}", item_id(item), item_label(item));
    }
    if let Some((first, last)) = state.item_range() {
        println!(
            "Showing {first}-{last} of {} (page {}/{})",
            state.total(),
            state.query.page + 1,
            state.total_pages()
        );
    }
    if state.total_pages() > 1 {
        println!("{}", page_bar(state.query.page, state.total_pages()));
    }
}

/// Nearby page numbers, one-based, with the current page bracketed
fn page_bar(current: u64, total_pages: u64) -> String {
    const WIDTH: u64 = 7;
    pagination::page_window(current, total_pages, WIDTH)
        .into_iter()
        .map(|page| {
            if page == current {
                format!("[{}]", page + 1)
            } else {
                (page + 1).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn item_id(item: &Value) -> String {
    match item.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// First human-readable field an item carries
fn item_label(item: &Value) -> &str {
    ["name", "title", "code", "email"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "shopadmin",
            "list",
            "Products",
            "--page",
            "2",
            "--search",
            "mug",
            "--filter",
            "categoryId=7",
            "--filter",
            "inStock=true",
        ])
        .unwrap();

        let Commands::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.resource, Resource::Products);
        assert_eq!(args.page, 2);
        assert_eq!(args.search.as_deref(), Some("mug"));
        assert_eq!(
            args.filters,
            vec![
                ("categoryId".to_string(), "7".to_string()),
                ("inStock".to_string(), "true".to_string()),
            ]
        );
        assert!(!args.json);
    }

    #[test]
    fn test_parse_rejects_unknown_resource_and_status() {
        assert!(Cli::try_parse_from(["shopadmin", "list", "widgets"]).is_err());
        assert!(Cli::try_parse_from(["shopadmin", "order-status", "9", "LOST"]).is_err());
    }

    #[test]
    fn test_parse_actions_with_global_flags() {
        let cli = Cli::try_parse_from([
            "shopadmin",
            "order-status",
            "9",
            "shipping",
            "--server",
            "http://shop.test/api",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://shop.test/api"));
        assert!(matches!(
            cli.command,
            Commands::OrderStatus { ref id, status: OrderStatus::Shipping } if id == "9"
        ));

        let cli = Cli::try_parse_from(["shopadmin", "notifications", "mark-read", "42"]).unwrap();
        let Commands::Notifications(args) = cli.command else {
            panic!("expected notifications command");
        };
        assert!(matches!(args.action, Some(NotificationAction::MarkRead { ref id }) if id == "42"));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("status=PENDING"),
            Ok(("status".to_string(), "PENDING".to_string()))
        );
        assert_eq!(
            parse_filter("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_page_bar() {
        assert_eq!(page_bar(0, 3), "[1] 2 3");
        assert_eq!(page_bar(2, 3), "1 2 [3]");
        assert_eq!(page_bar(10, 20), "8 9 10 [11] 12 13 14");
        assert_eq!(page_bar(19, 20), "14 15 16 17 18 19 [20]");
    }

    #[test]
    fn test_item_id_and_label() {
        let product = json!({"id": 7, "name": "Mug"});
        assert_eq!(item_id(&product), "7");
        assert_eq!(item_label(&product), "Mug");

        let coupon = json!({"id": "c-1", "code": "SPRING10"});
        assert_eq!(item_id(&coupon), "c-1");
        assert_eq!(item_label(&coupon), "SPRING10");

        assert_eq!(item_id(&json!({})), "-");
        assert_eq!(item_label(&json!({"id": 1})), "");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
