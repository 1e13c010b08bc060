//! Interactive company browser.
//!
//! Generates a fake company directory into a `MemorySource`, starts a
//! background pager over it and reads one-line commands from stdin. A
//! separate task renders every snapshot the pager publishes, so loading
//! states show up while the shell keeps accepting input.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::debug;

use crate::companies::{Company, generate_companies};
use crate::config::Config;
use crate::display::{navigation_hint, query_summary, render_companies, status_line_colored};
use crate::error::{PagewiseError, Result};
use crate::pager::{PagerHandle, PagerStatus, Snapshot, spawn_pager};
use crate::query::{QueryParams, SortOrder};
use crate::source::MemorySource;

const INDUSTRY_FIELD: &str = "industry";
const DEFAULT_BULK_ADD: usize = 20;

pub struct BrowseOptions {
    pub count: usize,
    pub seed: Option<u64>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub industry: Option<String>,
    pub order: SortOrder,
    pub latency_ms: u64,
}

/// A line typed into the browse shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Next,
    Prev,
    Retry,
    Refresh,
    Search(String),
    /// `None` lists the known industries.
    Industry(Option<String>),
    ToggleOrder,
    PageSize(usize),
    ResetFilters,
    Add(usize),
    Delete(String),
    /// Remove every company.
    Clear,
    Help,
    Quit,
}

/// Parse one non-empty shell line.
pub fn parse_shell_command(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(ShellCommand::Search(text.to_string()));
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "n" | "next" => Ok(ShellCommand::Next),
        "p" | "prev" => Ok(ShellCommand::Prev),
        "r" | "retry" => Ok(ShellCommand::Retry),
        "f" | "refresh" => Ok(ShellCommand::Refresh),
        "i" | "industry" => Ok(ShellCommand::Industry(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "o" | "order" => Ok(ShellCommand::ToggleOrder),
        "s" | "size" => rest
            .parse()
            .map(ShellCommand::PageSize)
            .map_err(|_| format!("invalid page size '{rest}'")),
        "x" | "reset" => Ok(ShellCommand::ResetFilters),
        "add" if rest.is_empty() => Ok(ShellCommand::Add(DEFAULT_BULK_ADD)),
        "add" => rest
            .parse()
            .map(ShellCommand::Add)
            .map_err(|_| format!("invalid count '{rest}'")),
        "del" | "delete" if rest.is_empty() => Err("usage: del <id>".to_string()),
        "del" | "delete" => Ok(ShellCommand::Delete(rest.to_string())),
        "clear" => Ok(ShellCommand::Clear),
        "h" | "help" | "?" => Ok(ShellCommand::Help),
        "q" | "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}' (h for help)")),
    }
}

/// Run the interactive browser until `q` or end of input.
pub async fn cmd_browse(options: BrowseOptions) -> Result<()> {
    let config = Config::load()?;

    let page_size = options.page_size.unwrap_or(config.page_size);
    if !config.is_offered_page_size(page_size) {
        return Err(PagewiseError::Config(format!(
            "page size {page_size} is not one of {:?}",
            config.page_size_options
        )));
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let source = Arc::new(
        MemorySource::with_records(generate_companies(options.count, &mut rng))
            .with_latency(Duration::from_millis(options.latency_ms)),
    );

    let mut params = QueryParams::new(page_size).with_order(options.order);
    if let Some(search) = options.search {
        params = params.with_search(search);
    }
    if let Some(industry) = options.industry {
        params = params.with_filter(INDUSTRY_FIELD, industry);
    }

    let (handle, snapshots) = spawn_pager(Arc::clone(&source), &config, params)?;

    println!(
        "{} {} companies, {} per page. Type h for help.",
        "pagewise".cyan().bold(),
        source.len(),
        page_size
    );

    let renderer = tokio::spawn(render_loop(snapshots));
    let result = run_shell(&handle, &source, &config, &mut rng).await;

    // The task may already be gone if the shell failed
    let _ = handle.shutdown();
    drop(handle);
    if let Err(e) = renderer.await {
        debug!("render task ended abnormally: {e}");
    }

    result
}

async fn run_shell<R: Rng + ?Sized>(
    handle: &PagerHandle,
    source: &MemorySource<Company>,
    config: &Config,
    rng: &mut R,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_shell_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message.red());
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => print_help(),
            ShellCommand::Next => handle.next()?,
            ShellCommand::Prev => handle.prev()?,
            ShellCommand::Retry => handle.retry()?,
            ShellCommand::Refresh => handle.refresh()?,
            ShellCommand::Search(text) => handle.search(text)?,
            ShellCommand::Industry(None) => {
                let industries = source.distinct_values(INDUSTRY_FIELD);
                println!("Industries: all, {}", industries.join(", "));
            }
            ShellCommand::Industry(Some(industry)) => {
                handle.set_filter(INDUSTRY_FIELD, industry)?
            }
            ShellCommand::ToggleOrder => handle.toggle_order()?,
            ShellCommand::PageSize(size) => {
                if config.is_offered_page_size(size) {
                    handle.set_page_size(size)?;
                } else {
                    eprintln!(
                        "{}",
                        format!(
                            "page size must be one of {:?}",
                            config.page_size_options
                        )
                        .red()
                    );
                }
            }
            ShellCommand::ResetFilters => handle.reset_filters()?,
            ShellCommand::Add(count) => {
                source.extend(generate_companies(count, rng));
                println!("Added {count} companies ({} total)", source.len());
                handle.refresh()?;
            }
            ShellCommand::Delete(id) => match source.remove(&id) {
                Some(company) => {
                    println!("Deleted {} ({})", company.name, company.id);
                    handle.refresh()?;
                }
                None => eprintln!("{}", format!("No company with id '{id}'").red()),
            },
            ShellCommand::Clear => {
                let removed = source.clear();
                println!("Removed {removed} companies");
                handle.refresh()?;
            }
        }
    }

    Ok(())
}

async fn render_loop(mut snapshots: watch::Receiver<Snapshot<Company>>) {
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        render(&snapshot);
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn render(snapshot: &Snapshot<Company>) {
    if snapshot.status == PagerStatus::Uninitialized {
        return;
    }
    if snapshot.status == PagerStatus::Loaded {
        println!("{}", render_companies(&snapshot.items));
    }
    println!(
        "{}  {}",
        status_line_colored(snapshot, "companies"),
        query_summary(&snapshot.query).dimmed()
    );
    if !snapshot.status.is_loading() {
        println!("{}", navigation_hint(snapshot));
    }
}

fn print_help() {
    println!("{}", "Commands:".cyan().bold());
    println!("  n            next page");
    println!("  p            previous page");
    println!("  r            retry the failed fetch");
    println!("  f            refresh the current page");
    println!("  /text        search (empty clears)");
    println!("  i [name]     filter by industry, 'all' clears; no name lists them");
    println!("  o            toggle name order");
    println!("  s <size>     change page size");
    println!("  x            reset search, filters and order");
    println!("  add [n]      add n generated companies (default {DEFAULT_BULK_ADD})");
    println!("  del <id>     delete a company");
    println!("  clear        remove every company");
    println!("  q            quit");
}
