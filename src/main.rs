// Entrypoint for the CLI application.
// - Keeps `main` small: read the credential, bootstrap one client and
//   dispatch the chosen command (or the interactive menu).
// - Returns `anyhow::Result` so any failure exits non-zero with a message.

use std::path::PathBuf;

use anyhow::Result;
use blasphemy_cli::models::Layout;
use blasphemy_cli::ui::{self, DownloadRequest};
use blasphemy_cli::{Blasphemy, Config};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blasphemy")]
#[command(about = "Browse and download wallpapers from the Digital Blasphemy catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the endpoint bases discovered at startup
    Summary,
    /// Show the account the API key belongs to
    Account,
    /// List one page of the catalog
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Sort order passed through to the API
        #[arg(long, default_value = "desc")]
        order: String,
    },
    /// Show one wallpaper and its resolution variants
    Show {
        id: u64,
    },
    /// Download one resolution variant of a wallpaper
    Download {
        id: u64,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// single, dual or triple
        #[arg(long, default_value = "single")]
        layout: Layout,
        /// Request the watermarked rendering
        #[arg(long)]
        watermark: bool,
        /// Destination file (defaults to the pictures directory)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Verify the wallpaper lists this variant before downloading
        #[arg(long)]
        check: bool,
    },
    /// Interactive menu (the default)
    Menu,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    // No token, no network: this fails before the client exists.
    let config = Config::from_env()?;
    let mut client = Blasphemy::new(&config)?;
    client.initialize()?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Summary => {
            if let Some(endpoints) = client.endpoints() {
                ui::print_endpoints(endpoints);
            }
        }
        Commands::Account => ui::print_account(&client.get_account()?),
        Commands::List { page, limit, order } => ui::show_listing(&client, page, limit, &order)?,
        Commands::Show { id } => ui::show_wallpaper(&client, id)?,
        Commands::Download {
            id,
            width,
            height,
            layout,
            watermark,
            output,
            check,
        } => {
            ui::run_download(
                &client,
                &DownloadRequest {
                    wallpaper_id: id,
                    width,
                    height,
                    layout,
                    watermark,
                    output,
                    check,
                },
            )?;
        }
        Commands::Menu => ui::main_menu(&client)?,
    }
    Ok(())
}
