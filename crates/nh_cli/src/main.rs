use clap::Parser;
use nh_client::{HttpNewsClient, DEFAULT_BASE_URL};
use nh_core::{Category, Country, Navigator, DEFAULT_CATEGORY_NAME, HOME_PATH};
use nh_header::{DisplayStore, Header, HeaderConfig, HistoryRouter, ResetBus};
use nh_storage::PersistentPreferences;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive news header", long_about = None)]
pub struct Cli {
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NEWS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Preference storage: memory or file
    #[arg(long, default_value = "file")]
    storage: String,
    #[arg(long, default_value = "nh_prefs.json")]
    prefs: PathBuf,
    /// Quiescence window before a search is sent, in milliseconds
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,
    #[arg(long, default_value = HOME_PATH)]
    start_path: String,
    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, PartialEq)]
enum Command {
    Type(String),
    Category { category: Category, name: String },
    Country(Country),
    Go(String),
    Back,
    Forward,
    Reset,
    View(usize),
    Show,
    Categories,
    Countries,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        match word {
            "type" | "t" => Ok(Command::Type(rest.to_string())),
            "clear" => Ok(Command::Type(String::new())),
            "category" | "c" => {
                let (code, name) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
                let category = code.parse::<Category>().map_err(|e| e.to_string())?;
                let name = match name.trim() {
                    "" => DEFAULT_CATEGORY_NAME.to_string(),
                    name => name.to_string(),
                };
                Ok(Command::Category { category, name })
            }
            "country" => rest
                .trim()
                .parse()
                .map(Command::Country)
                .map_err(|e: nh_core::Error| e.to_string()),
            "go" if !rest.trim().is_empty() => Ok(Command::Go(rest.trim().to_string())),
            "back" => Ok(Command::Back),
            "forward" => Ok(Command::Forward),
            "reset" => Ok(Command::Reset),
            "view" | "v" => rest
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::View)
                .ok_or_else(|| "view expects a result number starting at 1".to_string()),
            "show" | "s" => Ok(Command::Show),
            "categories" => Ok(Command::Categories),
            "countries" => Ok(Command::Countries),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

const HELP: &str = "\
Commands:
  type <text>              update the search box (empty text clears it)
  clear                    clear the search box
  category <code> [name]   browse a category
  country <code>           switch country
  go <path> | back | forward
  reset                    broadcast a search reset
  view <n>                 open search result n
  show                     print the header and store state
  categories | countries   list the choices
  quit";

fn show(header: &Header, store: &DisplayStore, router: &HistoryRouter) {
    let selection = header.categories().category_selection();
    let snapshot = store.snapshot();
    println!(
        "📍 {} | {} ({}) | {}",
        router.current_path(),
        selection.display_name,
        selection.category,
        header.categories().selected_country().name()
    );
    println!("🗂️ search mode: {}", snapshot.search_mode);
    for (i, article) in header.search().results().iter().enumerate() {
        println!("  🔍 {}. {} - {}", i + 1, article.title, article.source.name);
    }
    for article in snapshot.articles.iter().take(10) {
        println!("  📰 {} - {}", article.title, article.source.name);
    }
    if let Some(article) = snapshot.article {
        println!("  📖 {}", article.title);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let backend = nh_storage::create_store(cli.storage.as_str(), Some(cli.prefs.as_path()))?;
    let prefs = Arc::new(PersistentPreferences::new(backend));
    let client = Arc::new(HttpNewsClient::new(&cli.base_url, cli.api_key.clone())?);
    let store = Arc::new(DisplayStore::new());
    let router = Arc::new(HistoryRouter::new(&cli.start_path));
    let reset = ResetBus::new();
    let config = HeaderConfig::default().with_debounce(Duration::from_millis(cli.debounce_ms));

    let header = Header::new(client, store.clone(), router.clone(), prefs, reset.clone(), config);
    let handle = header.start().await;
    info!("Type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Type(text) => header.on_term_changed(&text),
            Command::Category { category, name } => header.select_category(category, &name).await,
            Command::Country(country) => header.select_country(country).await,
            Command::Go(path) => router.navigate_to(&path),
            Command::Back => {
                if !router.back() {
                    eprintln!("Already at the oldest entry");
                }
            }
            Command::Forward => {
                if !router.forward() {
                    eprintln!("Already at the newest entry");
                }
            }
            Command::Reset => reset.request_reset(),
            Command::View(n) => match header.search().results().get(n - 1) {
                Some(article) => header.view_article(article),
                None => eprintln!("No search result {}", n),
            },
            Command::Show => show(&header, &store, &router),
            Command::Categories => {
                for category in Category::ALL {
                    println!("  {}", category);
                }
            }
            Command::Countries => {
                for country in Country::ALL {
                    println!("  {} {}", country.code(), country.name());
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    handle.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("type  giá vàng".parse(), Ok(Command::Type(" giá vàng".to_string())));
        assert_eq!("clear".parse(), Ok(Command::Type(String::new())));
        assert_eq!("country jp".parse(), Ok(Command::Country(Country::Jp)));
        assert_eq!("view 2".parse(), Ok(Command::View(2)));
        assert_eq!("back".parse(), Ok(Command::Back));
    }

    #[test]
    fn test_category_name_defaults() {
        assert_eq!(
            "category business Kinh doanh".parse(),
            Ok(Command::Category { category: Category::Business, name: "Kinh doanh".to_string() })
        );
        assert_eq!(
            "c sports".parse(),
            Ok(Command::Category {
                category: Category::Sports,
                name: DEFAULT_CATEGORY_NAME.to_string()
            })
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("category weather".parse::<Command>().is_err());
        assert!("country zz".parse::<Command>().is_err());
        assert!("view 0".parse::<Command>().is_err());
        assert!("go".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["nh"]);
        assert_eq!(cli.storage, "file");
        assert_eq!(cli.debounce_ms, 500);
        assert_eq!(cli.start_path, "/home");
    }
}
