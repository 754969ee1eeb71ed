use std::{
    error::Error,
    io::BufRead,
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rxsearch::{
    config::{AppConfig, HttpLogLevel, OverlapPolicy},
    pipeline::{ListView, ResultSink, SearchPipeline},
    scheduler::{owner_context, OwnerScheduler, WorkerScheduler},
    search::{DemoRestClient, GithubClient, SearchService},
    subjects::Subject,
    subscribe::Subscriber,
    Observable, ObservableExt, Observer, SearchError, Subscribeable,
};

/// Replays the reactive list screens on the terminal.
#[derive(Debug, Parser)]
#[command(name = "rxsearch", version, about)]
struct Cli {
    /// JSON file with pipeline and service settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quiescence window of the search pipeline.
    #[arg(long, env = "RXSEARCH_DEBOUNCE_MS", global = true)]
    debounce_ms: Option<u64>,

    /// Simulated latency of the in-memory backend.
    #[arg(long, global = true)]
    latency_ms: Option<u64>,

    #[arg(long, env = "RXSEARCH_BASE_URL", global = true)]
    base_url: Option<String>,

    /// off, basic or body.
    #[arg(long, global = true)]
    http_log: Option<HttpLogLevel>,

    /// switch or latest-wins.
    #[arg(long, global = true)]
    overlap: Option<OverlapPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the colour list.
    Colors,
    /// Fetch favourite TV shows off the owner context.
    TvShows,
    /// Count stdin lines as button clicks through a subject.
    Counter,
    /// Turn a single number into its text form.
    Single,
    /// Debounced search; every stdin line is the new content of the input field.
    Search {
        /// Treat input as GitHub user names instead of city prefixes.
        #[arg(long)]
        github: bool,
    },
    /// List the public repositories of a GitHub user.
    Repos { user: String },
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(ms) = self.debounce_ms {
            config.pipeline.debounce_ms = ms;
        }
        if let Some(overlap) = self.overlap {
            config.pipeline.overlap = overlap;
        }
        if let Some(ms) = self.latency_ms {
            config.demo_latency_ms = ms;
        }
        if let Some(base_url) = &self.base_url {
            config.service = config.service.with_base_url(base_url.as_str())?;
        }
        if let Some(level) = self.http_log {
            config.service = config.service.with_log_level(level);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.app_config()?;
    debug!(?config, "configuration resolved");

    let (owner, owner_loop) = owner_context();
    tokio::spawn(owner_loop.run());

    match cli.command {
        Command::Colors => colors(),
        Command::TvShows => tv_shows(&config, owner).await?,
        Command::Counter => counter().await?,
        Command::Single => single(),
        Command::Search { github } => search(&config, owner, github).await?,
        Command::Repos { user } => repos(&config, owner, user).await?,
    }
    Ok(())
}

fn colors() {
    Observable::just(DemoRestClient::color_list()).subscribe(Subscriber::on_next(
        |colors: Vec<String>| {
            for color in colors {
                println!("{color}");
            }
        },
    ));
}

/// Channel that resolves once the observed stream terminates.
fn terminal_signal() -> (mpsc::UnboundedSender<()>, mpsc::UnboundedReceiver<()>) {
    mpsc::unbounded_channel()
}

async fn tv_shows(config: &AppConfig, owner: OwnerScheduler) -> Result<(), Box<dyn Error>> {
    let client = DemoRestClient::new(config.demo_latency());
    let (done_tx, mut done_rx) = terminal_signal();
    let done_e = done_tx.clone();

    let subscription = Observable::from_callable(move || Ok::<_, SearchError>(client.favorite_tv_shows()))
        .subscribe_on(WorkerScheduler::current()?)
        .observe_on(owner)
        .subscribe(Subscriber::new(
            |shows: Vec<String>| {
                for show in shows {
                    println!("{show}");
                }
            },
            move |e| {
                eprintln!("error: {e}");
                let _ = done_e.send(());
            },
            move || {
                let _ = done_tx.send(());
            },
        ));

    done_rx.recv().await;
    subscription.release();
    Ok(())
}

fn single() {
    let mut subscriber = Subscriber::on_next(|text: String| println!("{text}"));
    subscriber.on_complete(|| debug!("single value delivered"));

    Observable::just(4)
        .map(|v: i32| v.to_string())
        .subscribe(subscriber);
}

async fn counter() -> Result<(), Box<dyn Error>> {
    let (mut clicks, counter) = Subject::emitter_receiver();
    let count = Arc::new(AtomicU64::new(0));

    let subscription = counter
        .map(move |_: ()| count.fetch_add(1, Ordering::SeqCst) + 1)
        .subscribe(Subscriber::on_next(|n| println!("Count: {n}")));

    tokio::task::spawn_blocking(move || {
        for _ in std::io::stdin().lock().lines().map_while(Result::ok) {
            clicks.next(());
        }
        clicks.complete();
    })
    .await?;

    subscription.release();
    Ok(())
}

/// Prints every change of the result list.
struct ConsoleView {
    view: ListView,
}

impl ConsoleView {
    fn print(&self) {
        let state = self.view.snapshot();
        if let Some(notice) = &state.notice {
            eprintln!("! {notice}");
        } else if state.empty_indicator_visible {
            println!("(no results)");
        } else {
            println!("{}", state.items.join(" | "));
        }
    }
}

impl ResultSink for ConsoleView {
    fn show_results(&self, results: &[String]) {
        self.view.show_results(results);
        self.print();
    }

    fn show_empty(&self) {
        self.view.show_empty();
        self.print();
    }

    fn show_error(&self, error: &SearchError) {
        self.view.show_error(error);
        self.print();
    }
}

async fn search(config: &AppConfig, owner: OwnerScheduler, github: bool) -> Result<(), Box<dyn Error>> {
    let service: Arc<dyn SearchService> = if github {
        Arc::new(GithubClient::new(config.service.clone())?)
    } else {
        Arc::new(DemoRestClient::new(config.demo_latency()))
    };
    let sink = Arc::new(ConsoleView { view: ListView::new() });

    let pipeline = SearchPipeline::builder(service, sink, owner)
        .config(config.pipeline.clone())
        .build()?;

    let (mut input, mut changes) = Subject::emitter_receiver();
    let subscription = pipeline.subscribe_to(&mut changes);

    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            input.next(line);
        }
    })
    .await?;

    // Let the last window elapse and its query land before tearing down.
    let grace = pipeline.window() + config.demo_latency() + config.service.timeout().min(Duration::from_secs(2));
    tokio::time::sleep(grace).await;
    subscription.release();

    let stats = pipeline.stats();
    info!(?stats, "search session finished");
    Ok(())
}

async fn repos(config: &AppConfig, owner: OwnerScheduler, user: String) -> Result<(), Box<dyn Error>> {
    let client = GithubClient::new(config.service.clone())?;
    let (done_tx, mut done_rx) = terminal_signal();
    let done_e = done_tx.clone();

    let subscription = Observable::from_callable(move || client.repos_for_user(&user))
        .subscribe_on(WorkerScheduler::current()?)
        .observe_on(owner)
        .subscribe(Subscriber::new(
            |repos: Vec<rxsearch::search::GithubRepo>| {
                for repo in repos {
                    match repo.description {
                        Some(description) => println!("{} - {description}", repo.full_name),
                        None => println!("{}", repo.full_name),
                    }
                }
            },
            move |e| {
                eprintln!("error: {e}");
                let _ = done_e.send(());
            },
            move || {
                let _ = done_tx.send(());
            },
        ));

    done_rx.recv().await;
    subscription.release();
    Ok(())
}
