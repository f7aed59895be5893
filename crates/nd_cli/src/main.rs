use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use nd_client::{create_api, ClientConfig, DEFAULT_BASE_URL};
use nd_core::{FilterForm, NewsApi, Result};
use nd_dashboard::{
    CancelHandle, DashboardConfig, DashboardController, FileThemeStore, TaskKind, TaskRunner, TaskSummary,
    ThemeStore, ThemeToggle,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod duration;
mod output;
mod report;

use duration::HumanDuration;
use report::LogReporter;

#[derive(Parser, Debug)]
#[command(author, version, about = "News dashboard front end", long_about = None)]
pub struct Cli {
    /// API backend: http or memory
    #[arg(long, default_value = "http")]
    api: String,
    /// Base URL of the news API
    #[arg(long, env = "ND_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    /// Where the theme preference is stored (defaults to the user config dir)
    #[arg(long, env = "ND_THEME_FILE")]
    theme_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct FilterArgs {
    #[arg(long, default_value = "")]
    source: String,
    #[arg(long, default_value = "")]
    sentiment: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    start_date: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    end_date: String,
    /// true or false
    #[arg(long, default_value = "")]
    ai_processed: String,
}

impl From<FilterArgs> for FilterForm {
    fn from(args: FilterArgs) -> Self {
        FilterForm {
            source: args.source,
            sentiment: args.sentiment,
            start_date: args.start_date,
            end_date: args.end_date,
            ai_processed: args.ai_processed,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Show article statistics
    Stats,
    /// List articles
    Articles {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one article
    Show { id: String },
    /// Run AI processing over every unprocessed article
    Process {
        #[arg(long, default_value_t = 10)]
        batch_size: u32,
        /// Server-side delay between articles, forwarded as-is
        #[arg(long, default_value_t = 0)]
        delay: u64,
    },
    /// Fetch the latest articles
    Fetch {
        /// Keep fetching with this interval (e.g. 10m, 1h, 1h30m)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Show or toggle the dashboard theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ThemeCommands {
    Show,
    Toggle,
}

fn theme_store(path: Option<PathBuf>) -> Result<Arc<dyn ThemeStore>> {
    let path = match path {
        Some(path) => path,
        None => FileThemeStore::default_path()?,
    };
    Ok(Arc::new(FileThemeStore::new(path)))
}

async fn run_task(api: Arc<dyn NewsApi>, config: DashboardConfig, kind: TaskKind) -> Result<TaskSummary> {
    let runner = TaskRunner::new(api.clone(), config.clone(), Arc::new(LogReporter::new()));
    let summary = runner.run(kind, &CancelHandle::new()).await?;
    let mut controller = DashboardController::new(api, &config);
    controller.refresh().await;
    for line in output::stats_lines(&controller.view().stats) {
        println!("{}", line);
    }
    Ok(summary)
}

/// One page of the filtered list as terminal lines. A failed load is an error.
async fn list_articles(
    api: Arc<dyn NewsApi>,
    config: &DashboardConfig,
    page: u32,
    filters: FilterForm,
) -> Result<Vec<String>> {
    let mut controller = DashboardController::new(api.clone(), config);
    let load = controller.set_filters(filters);
    let result = load.fetch(api.as_ref()).await?;
    controller.complete_load(&load, Ok(result));
    if page > 1 {
        match controller.set_page(page) {
            Some(load) => {
                let result = load.fetch(api.as_ref()).await?;
                controller.complete_load(&load, Ok(result));
            }
            None => info!("Page {} is out of range ({} pages)", page, controller.total_pages()),
        }
    }

    let view = controller.view();
    let mut lines = vec![view.article_count.clone()];
    lines.extend(view.articles.iter().map(output::article_line));
    let pagination = output::pagination_line(view.pagination.as_ref());
    if !pagination.is_empty() {
        lines.push(pagination);
    }
    Ok(lines)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let client_config = ClientConfig {
        base_url: cli.api_url.clone(),
        timeout_secs: cli.timeout,
    };
    let api = create_api(cli.api.as_str(), &client_config)?;
    let mut config = DashboardConfig::default();

    match cli.command {
        Commands::Serve { addr } => {
            let state = nd_web::AppState::new(api, config, theme_store(cli.theme_file)?).await;
            nd_web::serve(addr, state).await?;
        }
        Commands::Stats => {
            let stats = api.stats().await?;
            for line in output::stats_lines(&stats) {
                println!("{}", line);
            }
        }
        Commands::Articles { page, filters } => {
            for line in list_articles(api, &config, page, filters.into()).await? {
                println!("{}", line);
            }
        }
        Commands::Show { id } => {
            let article = api.article_by_id(&id).await?;
            for line in output::detail_lines(&article) {
                println!("{}", line);
            }
        }
        Commands::Process { batch_size, delay } => {
            config.batch_size = batch_size;
            config.batch_delay = delay;
            run_task(api, config, TaskKind::Process).await?;
        }
        Commands::Fetch { interval } => match interval {
            Some(interval) => {
                info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                loop {
                    if let Err(e) = run_task(api.clone(), config.clone(), TaskKind::Fetch).await {
                        error!("Error during fetch: {}", e);
                    }
                    info!("Waiting {}s before next fetch", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                }
            }
            None => {
                run_task(api, config, TaskKind::Fetch).await?;
            }
        },
        Commands::Theme { command } => {
            let mut toggle = ThemeToggle::load(theme_store(cli.theme_file)?).await;
            if let Some(ThemeCommands::Toggle) = command {
                toggle.toggle().await?;
            }
            println!("{}", toggle.theme().as_str());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use nd_client::{MemoryNewsApi, Operation};
    use nd_core::Article;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_articles_filters() {
        let cli = Cli::try_parse_from([
            "nd", "--api", "memory", "articles", "--page", "2", "--source", "CoinDesk", "--ai-processed", "false",
        ])
        .unwrap();
        match cli.command {
            Commands::Articles { page, filters } => {
                assert_eq!(page, 2);
                let form: FilterForm = filters.into();
                assert_eq!(form.source, "CoinDesk");
                assert_eq!(form.ai_processed, "false");
                assert_eq!(form.sentiment, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_fetch_interval() {
        let cli = Cli::try_parse_from(["nd", "fetch", "--interval", "10m"]).unwrap();
        match cli.command {
            Commands::Fetch { interval } => assert_eq!(interval.unwrap().0.as_secs(), 600),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn sample_articles(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                id: format!("a{:02}", i),
                title: Some(format!("Article {}", i)),
                source: Some("CoinDesk".to_string()),
                published: Some(format!("2024-01-{:02}T08:00:00", i + 1)),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_list_articles_second_page() {
        let api = MemoryNewsApi::with_articles(sample_articles(12));
        let lines = list_articles(Arc::new(api), &DashboardConfig::default(), 2, FilterForm::default())
            .await
            .unwrap();
        assert_eq!(lines[0], "12 篇文章");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("a01  2024/01/02 08:00  Article 1"));
        assert_eq!(lines[3], "‹ 1 [2]  ");
    }

    #[tokio::test]
    async fn test_list_articles_fails_when_the_load_fails() {
        let api = MemoryNewsApi::with_articles(sample_articles(3));
        api.fail(Operation::Articles, "backend down").await;
        let err = list_articles(Arc::new(api), &DashboardConfig::default(), 1, FilterForm::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("backend down"));
    }

    #[tokio::test]
    async fn test_process_task_against_memory_backend() {
        let api = create_api("memory", &ClientConfig::default()).unwrap();
        let summary = run_task(api, DashboardConfig::default(), TaskKind::Process).await.unwrap();
        match summary {
            TaskSummary::Processed(summary) => assert_eq!(summary.batches, 0),
            other => panic!("unexpected summary: {:?}", other),
        }
    }
}
