// UI layer: printers for each command plus a simple interactive menu using
// `dialoguer`. Every flow is synchronous and talks to a bootstrapped client.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::Blasphemy;
use crate::models::{parse_wallpaper_listing, Account, Layout, Wallpaper};
use crate::session::Endpoints;

/// Everything needed to fetch one wallpaper variant.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub wallpaper_id: u64,
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
    pub watermark: bool,
    /// Defaults to [`default_destination`].
    pub output: Option<PathBuf>,
    /// Confirm the variant exists on the wallpaper before downloading.
    pub check: bool,
}

impl DownloadRequest {
    pub fn destination(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            default_destination(self.wallpaper_id, self.layout, self.width, self.height)
        })
    }
}

/// `<pictures dir>/<id>_<layout>_<W>x<H>.jpg`, or the current directory
/// when the platform has no pictures directory.
pub fn default_destination(wallpaper_id: u64, layout: Layout, width: u32, height: u32) -> PathBuf {
    let dir = dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("{wallpaper_id}_{layout}_{width}x{height}.jpg"))
}

pub fn print_endpoints(endpoints: &Endpoints) {
    println!("image: {}", endpoints.image);
    println!("thumb: {}", endpoints.thumb);
    println!("web:   {}", endpoints.web);
}

pub fn print_account(account: &Account) {
    println!("{} (#{})", account.display_name, account.id);
    println!("  active:   {}", account.active);
    println!("  plus:     {}", account.plus);
    println!("  lifetime: {}", account.lifetime);
    if let Some(level) = &account.membership_level {
        println!("  level:    {level}");
    }
}

pub fn print_wallpaper(wallpaper: &Wallpaper, endpoints: &Endpoints) {
    println!("{} (#{})  rating {:.1}", wallpaper.name, wallpaper.id, wallpaper.rating);
    if wallpaper.free || wallpaper.all_free {
        println!("  free");
    }
    if let Some(url) = endpoints.web_url(wallpaper) {
        println!("  page:  {url}");
    }
    if let Some(url) = endpoints.thumbnail_url(wallpaper) {
        println!("  thumb: {url}");
    }
    for (layout, variants) in &wallpaper.resolutions {
        let sizes: Vec<String> = variants
            .iter()
            .map(|r| format!("{}x{}", r.width, r.height))
            .collect();
        println!("  {layout}: {}", sizes.join(", "));
    }
}

/// Fetch a catalog page and print one line per wallpaper.
pub fn show_listing(client: &Blasphemy, page: u32, limit: u32, order: &str) -> Result<()> {
    let raw = client.list_wallpapers(page, limit, order)?;
    let listing = parse_wallpaper_listing(&raw)?;
    for wallpaper in &listing.wallpapers {
        println!("{:>6}  {}", wallpaper.id, wallpaper.name);
    }
    match listing.total_pages {
        Some(total) => println!("page {page} of {total}"),
        None => println!("page {page}"),
    }
    Ok(())
}

pub fn show_wallpaper(client: &Blasphemy, wallpaper_id: u64) -> Result<()> {
    let endpoints = client
        .endpoints()
        .context("client is not bootstrapped")?;
    let wallpaper = client.get_wallpaper(wallpaper_id)?;
    print_wallpaper(&wallpaper, endpoints);
    Ok(())
}

/// Run the two-hop download with a spinner and report where the file went.
pub fn run_download(client: &Blasphemy, req: &DownloadRequest) -> Result<PathBuf> {
    if req.check {
        let wallpaper = client.get_wallpaper(req.wallpaper_id)?;
        if wallpaper
            .find_variant(req.layout.as_str(), req.width, req.height)
            .is_none()
        {
            bail!(
                "{} has no {} variant at {}x{}",
                wallpaper.name,
                req.layout,
                req.width,
                req.height
            );
        }
    }

    let destination = req.destination();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Downloading wallpaper {}...", req.wallpaper_id));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.download_wallpaper(
        req.wallpaper_id,
        req.width,
        req.height,
        req.layout.as_str(),
        req.watermark,
        &destination,
    );
    spinner.finish_and_clear();

    let written = result.with_context(|| format!("download of {} failed", req.wallpaper_id))?;
    println!("Saved {} ({written} bytes)", destination.display());
    Ok(destination)
}

/// Main interactive menu. Runs a select loop until the user picks "Exit".
/// A failed action is reported and the loop continues.
pub fn main_menu(client: &Blasphemy) -> Result<()> {
    let items = ["Account", "List wallpapers", "Show wallpaper", "Download", "Exit"];
    loop {
        let selection = Select::new().items(&items).default(0).interact()?;
        let outcome = match selection {
            0 => handle_account(client),
            1 => handle_listing(client),
            2 => {
                let id: u64 = Input::new().with_prompt("Wallpaper id").interact_text()?;
                show_wallpaper(client, id)
            }
            3 => handle_download(client),
            _ => break,
        };
        if let Err(e) = outcome {
            println!("{} failed: {e:#}", items[selection]);
        }
    }
    Ok(())
}

fn handle_account(client: &Blasphemy) -> Result<()> {
    let account = client.get_account()?;
    print_account(&account);
    Ok(())
}

fn handle_listing(client: &Blasphemy) -> Result<()> {
    let page: u32 = Input::new().with_prompt("Page").default(1).interact_text()?;
    let limit: u32 = Input::new().with_prompt("Per page").default(10).interact_text()?;
    let orders = ["desc", "asc"];
    let order = orders[Select::new().items(&orders).default(0).interact()?];
    show_listing(client, page, limit, order)
}

fn handle_download(client: &Blasphemy) -> Result<()> {
    let wallpaper_id: u64 = Input::new().with_prompt("Wallpaper id").interact_text()?;
    let layout = Layout::ALL[Select::new()
        .with_prompt("Layout")
        .items(&Layout::ALL.map(Layout::as_str))
        .default(0)
        .interact()?];
    let width: u32 = Input::new().with_prompt("Width").default(1920).interact_text()?;
    let height: u32 = Input::new().with_prompt("Height").default(1080).interact_text()?;
    let watermark = Confirm::new()
        .with_prompt("Show watermark?")
        .default(false)
        .interact()?;
    let suggested = default_destination(wallpaper_id, layout, width, height);
    let output: String = Input::new()
        .with_prompt("Save to")
        .default(suggested.display().to_string())
        .interact_text()?;

    run_download(
        client,
        &DownloadRequest {
            wallpaper_id,
            width,
            height,
            layout,
            watermark,
            output: Some(PathBuf::from(output)),
            check: true,
        },
    )?;
    Ok(())
}
