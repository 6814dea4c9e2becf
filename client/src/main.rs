//! `shortflix` command-line client for the short-video catalogue.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use shortflix_client::domain::{
    FilterPatch, MediaFile, QueryParams, Registration, SELECTION_PARAM, Short, ShortDraft, ShortId,
};
use shortflix_client::{ClientSettings, ShortflixClient};

/// `shortflix` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "shortflix",
    about = "Browse, search and upload short videos",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List shorts, optionally filtered, and show the selected one.
    List {
        /// Title must contain this text.
        #[arg(long)]
        title: Option<String>,
        /// Description must contain this text.
        #[arg(long)]
        description: Option<String>,
        /// Tag must contain this text.
        #[arg(long)]
        tag: Option<String>,
        /// Open the playback overlay for this short.
        #[arg(long, value_name = "id")]
        video: Option<ShortId>,
    },
    /// Sign in and persist the token.
    Login {
        #[arg(long)]
        username: String,
        /// Read from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account, then sign in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Read (twice) from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Upload a short as the signed-in user.
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Repeat for several tags.
        #[arg(long = "tag", value_name = "tag")]
        tags: Vec<String>,
        #[arg(long, value_name = "path")]
        video: PathBuf,
        #[arg(long, value_name = "path")]
        thumbnail: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("shortflix")])
        .map_err(|error| eyre!("load settings: {error}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args.command, &settings))
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let mut initial = QueryParams::default();
    if let Command::List {
        video: Some(id), ..
    } = &command
    {
        initial.set(SELECTION_PARAM, id.to_string());
    }
    let client = ShortflixClient::from_settings(settings, initial)?;
    client.session().initialize().await;

    let outcome = match command {
        Command::List {
            title,
            description,
            tag,
            ..
        } => list(&client, FilterPatch { title, description, tag }).await,
        Command::Login { username, password } => {
            let password = password.map_or_else(|| prompt("Password: "), Ok)?;
            let identity = client.session().login(&username, &password).await?;
            println!("signed in as {}", identity.username);
            Ok(())
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let (password, confirmation) = match password {
                Some(password) => (password.clone(), password),
                None => (prompt("Password: ")?, prompt("Confirm password: ")?),
            };
            let registration =
                Registration::try_from_form(&username, &email, &password, &confirmation)?;
            let identity = client.session().register_validated(&registration).await?;
            println!("account created; signed in as {}", identity.username);
            Ok(())
        }
        Command::Logout => {
            client.session().logout().await;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            match client.session().identity() {
                Some(identity) => println!("{} <{}> (#{})", identity.username, identity.email, identity.id),
                None => println!("not signed in"),
            }
            Ok(())
        }
        Command::Upload {
            title,
            description,
            tags,
            video,
            thumbnail,
        } => {
            let mut draft = ShortDraft::new(title, description);
            for tag in &tags {
                draft.add_tag(tag);
            }
            draft.video = Some(read_media(&video)?);
            draft.thumbnail = thumbnail.as_deref().map(read_media).transpose()?;
            let created = client.upload(&draft).await?;
            println!("uploaded #{}: {}", created.id, created.title);
            Ok(())
        }
    };
    client.shutdown();
    outcome
}

async fn list(client: &ShortflixClient, patch: FilterPatch) -> Result<()> {
    let listing = if patch == FilterPatch::default() {
        client.listing().mount();
        client.settled_listing().await?
    } else {
        client.search_now(patch).await?
    };

    if listing.results.is_empty() {
        println!("no shorts match");
    }
    for short in listing.results.iter() {
        print_row(short);
    }

    if let Some(key) = client.router().selection_key() {
        match client.router().selected(&listing.results) {
            Some(short) => print_overlay(short),
            None => {
                println!("short {key} is not in the current results");
                client.router().drop_unmatched_selection(&listing.results);
            }
        }
    }
    Ok(())
}

fn print_row(short: &Short) {
    let tags = if short.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", short.tags.join(", "))
    };
    println!(
        "#{:<5} {} ({} views, by {}){tags}",
        short.id, short.title, short.view_count, short.owner
    );
}

fn print_overlay(short: &Short) {
    println!();
    println!("now playing: {}", short.title);
    if !short.description.is_empty() {
        println!("  {}", short.description);
    }
    println!("  media:     {}", short.media_uri);
    if let Some(thumbnail) = &short.thumbnail_uri {
        println!("  thumbnail: {thumbnail}");
    }
    println!("  uploaded:  {}", short.created_at.format("%Y-%m-%d %H:%M UTC"));
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn read_media(path: &Path) -> Result<MediaFile> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| eyre!("{} has no file name", path.display()))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .with_context(|| format!("open directory {}", parent.display()))?;
    let bytes = dir
        .read(&file_name)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(MediaFile {
        content_type: content_type_for(&file_name).to_owned(),
        file_name,
        bytes,
    })
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
