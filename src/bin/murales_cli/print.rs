#![deny(clippy::all, clippy::pedantic)]

use std::fmt::Write;

use murales::application::moderation::ModerationState;
use murales::application::murals::MuralsState;
use murales::domain::images::default_thumbnail_url;
use murales_api_types::Mural;
use serde::Serialize;

use crate::client::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{out}");
    Ok(())
}

/// `neighborhood, municipality, province`, skipping absent tiers.
pub fn location_line(mural: &Mural) -> String {
    [
        mural.neighborhood.as_deref(),
        mural.municipality.as_deref(),
        Some(mural.province.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

fn display_name(mural: &Mural) -> &str {
    if mural.name.trim().is_empty() {
        "(untitled)"
    } else {
        &mural.name
    }
}

pub fn render_murals(state: &MuralsState) -> String {
    let mut out = String::new();
    if state.murals.is_empty() {
        out.push_str("No murals found.\n");
        return out;
    }

    let meta = &state.pagination;
    let _ = writeln!(
        out,
        "Page {} of {} ({} murals)",
        meta.page, meta.total_pages, meta.total_count
    );
    for mural in &state.murals {
        let _ = writeln!(out, "{}  {}", mural.id, display_name(mural));
        let _ = writeln!(out, "    {}", location_line(mural));
        let _ = writeln!(out, "    {}", default_thumbnail_url(&mural.image_url));
    }

    let navigation = state.navigation();
    if navigation.is_visible() {
        let _ = writeln!(out, "{navigation}");
    }
    out
}

pub fn render_submissions(state: &ModerationState) -> String {
    let mut out = String::new();
    let summary = &state.summary;
    let _ = writeln!(
        out,
        "{} submissions (pending {}, approved {}, rejected {})",
        state.current_status, summary.pending, summary.approved, summary.rejected
    );
    if state.murals.is_empty() {
        out.push_str("Nothing here.\n");
        return out;
    }

    for submission in &state.murals {
        let mural = &submission.mural;
        let _ = writeln!(
            out,
            "{}  {}  <{}>",
            mural.id,
            display_name(mural),
            submission.contributor_email
        );
        let _ = writeln!(out, "    {}", location_line(mural));
        let _ = writeln!(out, "    {}", default_thumbnail_url(&mural.image_url));
        if let Some(reason) = submission.rejection_reason.as_deref() {
            let _ = writeln!(out, "    rejected: {reason}");
        }
    }

    let navigation = murales::application::pagination::PageNavigation::new(
        state.pagination.page,
        state.pagination.total_pages,
    );
    if navigation.is_visible() {
        let _ = writeln!(out, "{navigation}");
    }
    out
}
