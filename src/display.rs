//! Terminal rendering for the `browse` shell.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::companies::Company;
use crate::pager::{Direction, PagerStatus, Snapshot};
use crate::query::QueryKey;

/// One line describing what the pager is doing, without colors.
///
/// `noun` is the plural name of the listed records ("companies").
pub fn status_line<T>(snapshot: &Snapshot<T>, noun: &str) -> String {
    match snapshot.status {
        PagerStatus::Uninitialized => "Not loaded".to_string(),
        PagerStatus::LoadingInitial => "Loading initial results...".to_string(),
        PagerStatus::LoadingNext => "Loading next page...".to_string(),
        PagerStatus::LoadingPrev => "Loading previous page...".to_string(),
        PagerStatus::Reloading => format!("Refreshing page {}...", snapshot.page_number),
        PagerStatus::Loaded => format!(
            "Page {} loaded ({} {})",
            snapshot.page_number,
            snapshot.items.len(),
            noun
        ),
        PagerStatus::Error => match &snapshot.error {
            Some(failure) => format!(
                "Error loading {} page: {}",
                direction_label(failure.direction),
                failure.message
            ),
            None => "Error loading page".to_string(),
        },
    }
}

/// `status_line` with the color of its status.
pub fn status_line_colored<T>(snapshot: &Snapshot<T>, noun: &str) -> String {
    let line = status_line(snapshot, noun);
    match snapshot.status {
        PagerStatus::Uninitialized => line.dimmed().to_string(),
        PagerStatus::Loaded => line.green().to_string(),
        PagerStatus::Error => line.red().to_string(),
        _ => line.yellow().to_string(),
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Initial => "initial",
        Direction::Next => "next",
        Direction::Prev => "previous",
        Direction::Reload => "current",
    }
}

/// Compact description of the active query, e.g.
/// `search="cloud" industry=Finance order=desc size=20`.
pub fn query_summary(key: &QueryKey) -> String {
    let mut parts = Vec::new();
    if !key.search().is_empty() {
        parts.push(format!("search={:?}", key.search()));
    }
    for (field, value) in key.filters() {
        parts.push(format!("{field}={value}"));
    }
    parts.push(format!("order={}", key.order()));
    parts.push(format!("size={}", key.page_size()));
    parts.join(" ")
}

/// Which navigation keys currently do something.
pub fn navigation_hint<T>(snapshot: &Snapshot<T>) -> String {
    let prev = if snapshot.can_go_prev {
        "[p] prev".cyan().to_string()
    } else {
        "[p] prev".dimmed().to_string()
    };
    let next = if snapshot.can_go_next {
        "[n] next".cyan().to_string()
    } else {
        "[n] next".dimmed().to_string()
    };
    let retry = if snapshot.status == PagerStatus::Error {
        format!("  {}", "[r] retry".yellow())
    } else {
        String::new()
    };
    format!("{prev}  {next}{retry}")
}

/// A row in the companies table
#[derive(Tabled)]
struct CompanyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Company")]
    name: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Website")]
    website: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Company> for CompanyRow {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            industry: company.industry.clone(),
            tier: company.tier.as_str().to_string(),
            website: company.website.clone(),
            created: company.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Render a page of companies as a table, or a placeholder when empty.
pub fn render_companies(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "No companies found".dimmed().to_string();
    }

    let rows: Vec<CompanyRow> = companies.iter().map(CompanyRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
