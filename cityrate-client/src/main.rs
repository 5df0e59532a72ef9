//! cityrate - terminal client for the city rating service
//!
//! Log in with the id issued by the Telegram bot, vote on cities, browse the
//! rankings and review your own votes.
//!
//! Configuration priority for the API URL: `--api-url` → `CITYRATE_API_URL`
//! → `api_url` in config.toml → compiled default.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cityrate_client::render::{render_profile, render_ratings, render_voting};
use cityrate_client::views::{
    CountryFilter, LoginView, ProfileView, RatingsOptions, RatingsView, Scope, VotingView,
};
use cityrate_client::{ApiClient, AppState, ClientError, Tab, ViewState};
use cityrate_common::config::ConfigResolver;
use cityrate_common::session::SessionStore;
use cityrate_common::{RatingMode, SortColumn, SortDirection, SortSpec, VoteType};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cityrate")]
#[command(about = "Vote on cities and browse city rankings")]
#[command(version)]
struct Cli {
    /// Base URL of the rating service
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with your user id
    Login { user_id: String },
    /// Forget the stored user id
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show city or country rankings
    Ratings {
        #[arg(long, value_enum, default_value_t = ModeArg::Overall)]
        mode: ModeArg,
        /// Aggregate cities per country
        #[arg(long)]
        countries: bool,
        /// Hide entries with too few likes and dislikes
        #[arg(long)]
        hide_unpopular: bool,
        /// index, name, country, score, likes, dislikes, dont_know
        #[arg(long, value_name = "COLUMN")]
        sort: Option<SortColumn>,
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Vote on cities one by one (l = like, d = dislike, k = don't know, q = quit)
    Vote,
    /// Vote on the next city in the queue
    VoteNext { vote_type: VoteType },
    /// Show your votes grouped by country
    Profile {
        #[arg(long, conflicts_with = "unvisited_only")]
        visited_only: bool,
        #[arg(long)]
        unvisited_only: bool,
    },
    /// Change your vote on a city
    ChangeVote { city_id: String, vote_type: VoteType },
    /// Mark every city of a country as "don't know"
    NotVisited { country: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Overall,
    Hidden,
}

impl From<ModeArg> for RatingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Overall => RatingMode::Overall,
            ModeArg::Hidden => RatingMode::HiddenJam,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigResolver::new()
        .with_api_url(cli.api_url.clone())
        .with_config_path(cli.config.clone())
        .resolve()
        .context("Failed to load configuration")?;

    init_tracing(&config.log_level);

    info!("Starting cityrate v{}", env!("CARGO_PKG_VERSION"));
    info!(api_url = %config.api_url, source = %config.api_url_source, "API endpoint");
    match &config.config_file {
        Some(path) => debug!(path = %path.display(), "Config file loaded"),
        None => info!("No config file found, using defaults"),
    }

    let client = ApiClient::from_config(&config).context("Failed to create HTTP client")?;
    let mut app = AppState::with_session(SessionStore::new(&config.session_file))
        .context("Failed to read session")?;

    match cli.command {
        Command::Login { user_id } => {
            let mut view = LoginView::new();
            if !view.submit(&client, &mut app, &user_id).await {
                bail!("{}", view.error().unwrap_or("Login failed"));
            }
            println!("Logged in as {}", user_id.trim());
        }

        Command::Logout => {
            app.logout()?;
            println!("Logged out");
        }

        Command::Whoami => match app.user_id() {
            Some(id) => println!("{}", id),
            None => println!("Not logged in"),
        },

        Command::Ratings {
            mode,
            countries,
            hide_unpopular,
            sort,
            desc,
        } => {
            app.switch_tab(Tab::Ratings)?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let options = RatingsOptions {
                mode: mode.into(),
                scope: if countries { Scope::Countries } else { Scope::Cities },
                hide_unpopular,
                sort: SortSpec::new(sort.unwrap_or_default(), direction),
                threshold: config.popularity_threshold,
            };

            let mut view = RatingsView::new(&app, options);
            view.load(&client).await;
            ready(view.state())?;
            if let Some(table) = view.rows() {
                print!("{}", render_ratings(&table, options.mode));
            }
        }

        Command::Vote => {
            app.switch_tab(Tab::Voting)?;
            let mut view = VotingView::new(&app)?;
            view.load(&client).await;
            ready(view.state())?;
            run_voting_loop(&client, &mut view).await?;
        }

        Command::VoteNext { vote_type } => {
            app.switch_tab(Tab::Voting)?;
            let mut view = VotingView::new(&app)?;
            view.load(&client).await;
            let queue = ready(view.state())?;
            let city = queue
                .current()
                .map(|c| c.name.clone())
                .ok_or(ClientError::EmptyQueue)?;

            view.submit_vote(&client, vote_type)
                .await
                .with_context(|| format!("Failed to submit vote for {}", city))?;
            println!("{}: {}", city, vote_type);
            if let Some(queue) = view.queue() {
                print!("{}", render_voting(queue));
            }
        }

        Command::Profile {
            visited_only,
            unvisited_only,
        } => {
            let mut view = load_profile(&client, &mut app, config.popularity_threshold).await?;
            view.set_filter(if visited_only {
                CountryFilter::VisitedOnly
            } else if unvisited_only {
                CountryFilter::UnvisitedOnly
            } else {
                CountryFilter::All
            });

            let stats = view.stats().ok_or_else(|| anyhow!("Profile is not loaded"))?;
            print!("{}", render_profile(&view.countries(), &stats, view.threshold()));
        }

        Command::ChangeVote { city_id, vote_type } => {
            let mut view = load_profile(&client, &mut app, config.popularity_threshold).await?;
            view.change_vote(&client, &city_id, vote_type)
                .await
                .with_context(|| view_error(view.action_error()))?;
            println!("{}: {}", city_id, vote_type);
        }

        Command::NotVisited { country } => {
            let mut view = load_profile(&client, &mut app, config.popularity_threshold).await?;
            let changed = view
                .mark_country_not_visited(&client, &country)
                .await
                .with_context(|| view_error(view.action_error()))?;
            println!("Marked {} cities in {} as not visited", changed, country);
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loaded data, or the view's error message
fn ready<T>(state: &ViewState<T>) -> Result<&T> {
    match state {
        ViewState::Ready(data) => Ok(data),
        ViewState::Error(message) => Err(anyhow!("{}", message)),
        ViewState::Loading => Err(anyhow!("Still loading")),
    }
}

fn view_error(message: Option<&str>) -> String {
    message.unwrap_or("Request failed").to_string()
}

async fn load_profile(client: &ApiClient, app: &mut AppState, threshold: u64) -> Result<ProfileView> {
    app.switch_tab(Tab::Profile)?;
    let mut view = ProfileView::new(app)?.with_threshold(threshold);
    view.load(client).await;
    ready(view.state())?;
    Ok(view)
}

async fn run_voting_loop(client: &ApiClient, view: &mut VotingView) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(queue) = view.queue() else {
            bail!("Voting queue is not loaded");
        };
        print!("{}", render_voting(queue));
        if queue.is_complete() {
            return Ok(());
        }
        println!("[l]ike  [d]islike  don't [k]now  [q]uit");

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            return Ok(());
        };
        let vote_type = match line.trim() {
            "l" => VoteType::Liked,
            "d" => VoteType::Disliked,
            "k" => VoteType::DontKnow,
            "q" => return Ok(()),
            other => {
                println!("Unknown choice '{}'", other);
                continue;
            }
        };

        if let Err(e) = view.submit_vote(client, vote_type).await {
            debug!(error = %e, "Vote not applied");
            let message = view.queue().and_then(|q| q.error()).unwrap_or("Failed to submit vote");
            println!("{}", message);
        }
    }
}
