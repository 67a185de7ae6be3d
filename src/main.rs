use std::path::PathBuf;
use std::sync::Arc;

use blogdash::net::types::{Credentials, Id, Post, PostDraft, PostPatch};
use blogdash::routes::{self, Route};
use blogdash::{ApiError, App, ClientConfig, ConfigError, FileStore, HttpBackend, SyncError};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("backend client: {0}")]
    Backend(#[from] ApiError),
    #[error("{0}")]
    Sync(#[from] SyncError),
    #[error("nothing to update; pass --title or --body")]
    EmptyPatch,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "blogdash", about = "Blog dashboard client")]
struct Cli {
    /// Backend base URL; overrides `BLOGDASH_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Directory for the persisted session; overrides `BLOGDASH_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long, env = "BLOGDASH_USERNAME")]
        username: String,
        #[arg(long, env = "BLOGDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Resolve a path through the auth guards.
    Route { path: String },
    /// List the loaded posts.
    Dashboard,
    Posts(PostsCommand),
    Comments(CommentsCommand),
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        hidden: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Flip the hidden flag.
    Toggle {
        id: String,
    },
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    Delete { post_id: String, comment_id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let backend = HttpBackend::from_config(&config)?;
    let store = FileStore::new(&config.state_dir, &config.storage_key);
    let app = App::new(Arc::new(backend), Arc::new(store));
    app.start().await;

    let result = run(&app, cli.command).await;
    if let Some(notice) = app.take_notice() {
        eprintln!("[{}] {}", notice.code, notice.message);
    }
    result
}

async fn run(app: &App, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            let session = app.login(&Credentials { username, password }).await?;
            println!("signed in as {}", session.display_name());
        }
        Command::Logout => {
            app.logout();
            println!("signed out");
        }
        Command::Whoami => match app.snapshot().auth.session {
            Some(session) => println!("{}", session.display_name()),
            None => println!("anonymous"),
        },
        Command::Route { path } => {
            let (route, page) = routes::navigate(&path, app.is_authenticated());
            println!("{route} -> {page:?}");
        }
        Command::Dashboard => {
            if routes::should_redirect_unauth(&Route::dashboard(), app.is_authenticated()) {
                return Err(SyncError::NotAuthenticated.into());
            }
            print_dashboard(&app.snapshot().posts.items);
        }
        Command::Posts(posts) => run_posts(app, posts.command).await?,
        Command::Comments(comments) => match comments.command {
            CommentsSubcommand::Delete { post_id, comment_id } => {
                let post = app
                    .delete_comment_from(&Id::new(post_id), &Id::new(comment_id))
                    .await?;
                print_json(&post)?;
            }
        },
    }
    Ok(())
}

async fn run_posts(app: &App, command: PostsSubcommand) -> Result<(), CliError> {
    match command {
        PostsSubcommand::Create { title, body, hidden } => {
            let post = app.create_post(&PostDraft { title, body, hidden }).await?;
            print_json(&post)?;
        }
        PostsSubcommand::Update { id, title, body } => {
            let patch = PostPatch { title, body, hidden: None };
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            let post = app.update_post(&Id::new(id), &patch).await?;
            print_json(&post)?;
            if let Some(route) = app.take_redirect() {
                eprintln!("navigate: {route}");
            }
        }
        PostsSubcommand::Delete { id } => {
            app.delete_post(&Id::new(id)).await?;
            println!("deleted");
        }
        PostsSubcommand::Toggle { id } => {
            let post = app.toggle_hidden_flag(&Id::new(id)).await?;
            println!("{} hidden={}", post.id, post.hidden);
        }
    }
    Ok(())
}

fn print_dashboard(posts: &[Post]) {
    if posts.is_empty() {
        println!("no posts");
        return;
    }
    for post in posts {
        let marker = if post.hidden { "hidden" } else { "shown" };
        println!(
            "{}\t{marker}\t{} comments\t{}",
            Route::post_detail(&post.id),
            post.comments.len(),
            post.title
        );
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
