//! `wiki-nav`: drive the wiki navigation core from the command line.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//!
//! # Examples
//! ```sh
//! wiki-nav login --email ada@example.org --password secret
//! wiki-nav open /teamA/setup
//! wiki-nav search "deploy"
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use wiki_client::domain::PageId;
use wiki_client::domain::ports::BrowserHistory;
use wiki_client::outbound::http::{
    ApiClient, HttpAuthGateway, HttpPageDirectory, HttpPageSearch, HttpPublicShare,
    HttpRoomDirectory,
};
use wiki_client::outbound::{FileTokenStore, MemoryHistory};
use wiki_client::{ClientSettings, View, WikiApp, WikiPorts};
use zeroize::Zeroizing;

/// `wiki-nav` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "wiki-nav",
    about = "Sign in to a wiki server and resolve rooms, pages and URLs",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the token.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted token.
    Logout,
    /// Load a browser path and print the resulting view.
    Open {
        /// Browser path such as `/teamA/setup`.
        path: String,
    },
    /// List the rooms of the signed-in user.
    Rooms,
    /// Full-text search in the active room.
    Search {
        /// Search terms.
        query: String,
        /// Room to search instead of the default one.
        #[arg(long)]
        room: Option<String>,
    },
    /// Open a publicly shared room.
    Public {
        /// Share slug.
        share: String,
        /// Page to open instead of the first one.
        #[arg(long)]
        page: Option<i64>,
    },
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    view: View,
    location: &'a str,
    history: Vec<String>,
    dangling_slug: Option<&'a str>,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = ClientSettings::load_from_iter([std::ffi::OsString::from("wiki-nav")])
        .map_err(|error| io::Error::other(format!("load configuration: {error}")))?;

    match args.command {
        Command::Login { email, password } => {
            let password = Zeroizing::new(password);
            let (mut app, _) = build_app(&settings, "/")?;
            app.login(&email, &password).await.map_err(client_error)?;
            print_json(&app.view())
        }
        Command::Register { email, password } => {
            let password = Zeroizing::new(password);
            let (mut app, _) = build_app(&settings, "/")?;
            app.register(&email, &password).await.map_err(client_error)?;
            print_json(&app.view())
        }
        Command::Logout => {
            let (mut app, _) = build_app(&settings, "/")?;
            app.logout();
            print_json(&app.view())
        }
        Command::Open { path } => {
            let (mut app, history) = build_app(&settings, &path)?;
            app.boot().await.map_err(client_error)?;
            let state = app.navigation().state();
            print_json(&Snapshot {
                view: app.view(),
                location: state.location(),
                history: history.entries(),
                dangling_slug: state.dangling_slug().map(|slug| slug.as_str()),
            })
        }
        Command::Rooms => {
            let (mut app, _) = build_app(&settings, "/")?;
            app.boot().await.map_err(client_error)?;
            print_json(&app.rooms())
        }
        Command::Search { query, room } => {
            let (mut app, _) = build_app(&settings, "/")?;
            app.boot().await.map_err(client_error)?;
            if let Some(room) = room {
                app.switch_room(&room).await.map_err(client_error)?;
            }
            let hits = app.search(&query).await.map_err(client_error)?;
            print_json(&hits)
        }
        Command::Public { share, page } => {
            let (app, _) = build_app(&settings, &format!("/public/{share}"))?;
            match page {
                Some(page) => {
                    let page = app
                        .open_public_page(&share, PageId::new(page))
                        .await
                        .map_err(client_error)?;
                    print_json(&page)
                }
                None => {
                    let view = app.open_public(&share).await.map_err(client_error)?;
                    print_json(&view)
                }
            }
        }
    }
}

fn build_app(settings: &ClientSettings, path: &str) -> io::Result<(WikiApp, Arc<MemoryHistory>)> {
    let base = settings.api_base_url().map_err(client_error)?;
    let api = ApiClient::new(base, settings.request_timeout()).map_err(io::Error::other)?;
    let tokens = FileTokenStore::new(&settings.token_file())
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let history = Arc::new(MemoryHistory::new(path));
    let history_port: Arc<dyn BrowserHistory> = history.clone();
    let app = WikiApp::new(WikiPorts {
        auth: Arc::new(HttpAuthGateway::new(api.clone())),
        tokens: Arc::new(tokens),
        rooms: Arc::new(HttpRoomDirectory::new(api.clone())),
        pages: Arc::new(HttpPageDirectory::new(api.clone())),
        search: Arc::new(HttpPageSearch::new(api.clone())),
        public: Arc::new(HttpPublicShare::new(api)),
        history: history_port,
    });
    Ok((app, history))
}

fn client_error(error: wiki_client::domain::Error) -> io::Error {
    io::Error::other(format!("{:?}: {}", error.code(), error.message()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    writeln!(stdout)
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI argument parsing.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn open_takes_a_path() {
        let args = CliArgs::try_parse_from(["wiki-nav", "open", "/teamA/setup"]).expect("parse");
        assert!(matches!(args.command, Command::Open { path } if path == "/teamA/setup"));
    }

    #[rstest]
    fn public_accepts_an_optional_page() {
        let args =
            CliArgs::try_parse_from(["wiki-nav", "public", "docs", "--page", "7"]).expect("parse");
        assert!(matches!(
            args.command,
            Command::Public { share, page: Some(7) } if share == "docs"
        ));
    }

    #[rstest]
    fn login_requires_credentials() {
        assert!(CliArgs::try_parse_from(["wiki-nav", "login", "--email", "a@b.c"]).is_err());
    }
}
