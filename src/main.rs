//! eventmaster-console entry point.
//!
//! Fills the search form from command-line flags, runs the search, prints
//! the table and optionally keeps polling until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use eventmaster_console::client::HttpEventApi;
use eventmaster_console::config::{ConsoleConfig, parse_base_url};
use eventmaster_console::domain::{ConsoleEvent, EventBus, SearchForm};
use eventmaster_console::error::ConsoleError;
use eventmaster_console::render::render_table;
use eventmaster_console::service::{QuerySession, RefreshLoop, SessionSettings};

#[derive(Parser)]
#[command(name = "eventmaster-console")]
#[command(about = "Query the eventmaster event store from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Look up a single event by id; every other filter is ignored
    #[arg(long, value_name = "ID")]
    event_id: Option<String>,

    /// Parent event ids, comma-separated
    #[arg(long, value_name = "IDS")]
    parent_event_id: Option<String>,

    /// Datacenters, comma-separated
    #[arg(long)]
    dc: Option<String>,

    /// Topic to include (repeatable)
    #[arg(long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,

    /// Require every tag instead of any
    #[arg(long)]
    tag_and: bool,

    /// Tags, comma-separated
    #[arg(long = "tags", value_name = "TAGS")]
    tag_set: Option<String>,

    /// Tags to exclude, comma-separated
    #[arg(long = "exclude-tags", value_name = "TAGS")]
    exclude_tag_set: Option<String>,

    /// Hosts, comma-separated
    #[arg(long)]
    host: Option<String>,

    /// Require every target host instead of any
    #[arg(long)]
    target_host_and: bool,

    /// Target hosts, comma-separated
    #[arg(long = "target-hosts", value_name = "HOSTS")]
    target_host_set: Option<String>,

    /// Users, comma-separated
    #[arg(long)]
    user: Option<String>,

    /// Payload filter, passed through as-is
    #[arg(long)]
    data: Option<String>,

    /// Window start: unix seconds, RFC 3339 or "MM/DD/YYYY h:mm AM"
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// Window end: unix seconds, RFC 3339 or "MM/DD/YYYY h:mm AM"
    #[arg(long, value_name = "TIME")]
    end: Option<String>,

    /// Do not fill the default window when --start and --end are absent
    #[arg(long)]
    all_time: bool,

    /// Show the payload of this row after the first render (repeatable)
    #[arg(long = "expand", value_name = "EVENT_ID")]
    expand: Vec<String>,

    /// Show the payload of the row at this 1-based position (repeatable)
    #[arg(long = "expand-row", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    expand_rows: Vec<u32>,

    /// Print a shareable link for the query
    #[arg(long)]
    link: bool,

    /// Page URL whose origin the shareable link uses (defaults to --url)
    #[arg(long, value_name = "URL")]
    page_url: Option<String>,

    /// Keep refreshing the table until Ctrl-C
    #[arg(long)]
    watch: bool,

    /// eventmaster base URL
    #[arg(long, env = "EVENTMASTER_URL", value_name = "URL")]
    url: Option<String>,

    /// Result cap for list searches
    #[arg(long)]
    limit: Option<u32>,

    /// Seconds between refreshes in --watch mode
    #[arg(long, value_name = "SECS")]
    interval_secs: Option<u64>,
}

impl Cli {
    fn form(&self, config: &ConsoleConfig) -> SearchForm {
        let mut form = if self.all_time || self.start.is_some() || self.end.is_some() {
            SearchForm::new()
        } else {
            SearchForm::with_default_window(chrono::Utc::now().timestamp(), config.utc_offset())
        };
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        form.event_id = text(&self.event_id);
        form.parent_event_id = text(&self.parent_event_id);
        form.dc = text(&self.dc);
        form.topics.clone_from(&self.topics);
        form.tag_and_operator = self.tag_and;
        form.tag_set = text(&self.tag_set);
        form.exclude_tag_set = text(&self.exclude_tag_set);
        form.host = text(&self.host);
        form.target_host_and_operator = self.target_host_and;
        form.target_host_set = text(&self.target_host_set);
        form.user = text(&self.user);
        form.data = text(&self.data);
        if let Some(start) = &self.start {
            form.start_event_time.clone_from(start);
        }
        if let Some(end) = &self.end {
            form.end_event_time.clone_from(end);
        }
        form
    }

    fn apply(&self, config: &mut ConsoleConfig) -> Result<(), ConsoleError> {
        if let Some(url) = &self.url {
            config.base_url = parse_base_url(url)?;
        }
        if let Some(limit) = self.limit {
            config.search_limit = limit;
        }
        if let Some(secs) = self.interval_secs {
            config.refresh_interval_secs = secs;
        }
        if self.watch {
            config.auto_refresh = true;
        }
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CONSOLE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    // Load configuration
    let mut config = ConsoleConfig::from_env()?;
    cli.apply(&mut config)?;
    tracing::info!(url = %config.base_url, limit = config.search_limit, "starting eventmaster-console");

    // Build session
    let api = HttpEventApi::from_config(&config)?;
    let event_bus = EventBus::new(config.event_bus_capacity);
    let session = Arc::new(QuerySession::new(
        api,
        SessionSettings::from(&config),
        event_bus.clone(),
    ));

    let form = cli.form(&config);
    let searched = match session.submit(&form).await {
        Ok(_) => true,
        Err(err) => {
            eprintln!("{}", err.search_alert());
            false
        }
    };

    for event_id in &cli.expand {
        if let Err(err) = session.toggle_detail(event_id).await {
            eprintln!("{}", err.detail_alert());
        }
    }
    for position in &cli.expand_rows {
        let index = usize::try_from(position - 1).unwrap_or(usize::MAX);
        if let Err(err) = session.toggle_row(index).await {
            eprintln!("{}", err.detail_alert());
        }
    }
    if searched {
        print!("{}", render_table(&session.table().await));
    }

    if cli.link {
        let page_url = cli
            .page_url
            .clone()
            .unwrap_or_else(|| config.base_url.to_string());
        println!("{}", session.shareable_link(&page_url).await?);
    }

    if !cli.watch {
        return Ok(if searched {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let printer = tokio::spawn(print_updates(Arc::clone(&session), event_bus.subscribe()));
    let refresh = RefreshLoop::spawn(Arc::clone(&session), config.refresh_interval());

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupted, stopping refresh loop");
    let stats = refresh.shutdown().await;
    printer.abort();
    tracing::info!(
        ticks = stats.ticks,
        searches = stats.searches,
        failures = stats.failures,
        "refresh loop finished"
    );
    Ok(ExitCode::SUCCESS)
}

/// Prints every refreshed table to stdout and every alert to stderr.
async fn print_updates(
    session: Arc<QuerySession<HttpEventApi>>,
    mut rx: broadcast::Receiver<ConsoleEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(ConsoleEvent::TableReplaced { .. }) => {
                print!("{}", render_table(&session.table().await));
            }
            Ok(event) => {
                if let Some(alert) = event.alert() {
                    eprintln!("{alert}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "console printer lagged behind event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
