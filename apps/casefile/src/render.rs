//! # Terminal Output
//!
//! Plain-text and JSON renderings of the core view models for the CLI.

use casefile_core::{EvidencePage, EvidenceRecord, LoadState, SearchView};
use serde_json::{Value, json};

fn state_label(state: &LoadState) -> String {
    match state {
        LoadState::Idle => "idle".to_string(),
        LoadState::Loading => "loading".to_string(),
        LoadState::Loaded => "loaded".to_string(),
        LoadState::Empty => "empty".to_string(),
        LoadState::Failed(e) => format!("failed: {e}"),
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

// =============================================================================
// EVIDENCE
// =============================================================================

fn write_custody(out: &mut String, record: &EvidenceRecord) {
    if !record.has_custody_history() {
        out.push_str("      (no custody records)\n");
        return;
    }
    for entry in &record.chain_of_custody {
        out.push_str(&format!(
            "      {}  {}  by {}",
            entry.date, entry.action, entry.handler
        ));
        if let Some(notes) = &entry.notes {
            out.push_str(&format!("  ({notes})"));
        }
        out.push('\n');
    }
}

/// Evidence page as text.
#[must_use]
pub fn evidence_text(page: &EvidencePage<'_>) -> String {
    let mut out = String::from("Evidence Register\n=================\n");

    match page.state {
        LoadState::Empty => {
            out.push_str("No evidence records.\n");
            return out;
        }
        LoadState::Failed(e) => {
            out.push_str(&format!("Could not load evidence: {e}\n"));
            return out;
        }
        _ => {}
    }

    for record in page.records {
        let marker = if page.is_expanded(record) { "v" } else { ">" };
        let status = record.status.as_ref().map(|s| s.as_str());
        out.push_str(&format!(
            "{} {:<14} {:<12} {:<12} {}\n",
            marker,
            record.display_label(),
            or_dash(record.evidence_type.as_deref()),
            or_dash(status),
            or_dash(record.description.as_deref()),
        ));

        if page.is_expanded(record) {
            out.push_str(&format!(
                "    seized from: {}\n    seized on:   {}\n    location:    {}\n",
                or_dash(record.seized_from.as_deref()),
                or_dash(record.seizure_date.as_deref()),
                or_dash(record.current_location.as_deref()),
            ));
            if let Some(source) = &record.source_document {
                out.push_str(&format!("    source:      {source}\n"));
            }
            out.push_str("    chain of custody:\n");
            write_custody(&mut out, record);
        }
    }

    if page.show_pagination() {
        out.push_str(&format!(
            "\nPage {} of {} ({} records)\n",
            page.current_page, page.total_pages, page.total_count
        ));
    }
    out
}

/// Evidence page as JSON.
#[must_use]
pub fn evidence_json(page: &EvidencePage<'_>) -> Value {
    json!({
        "state": state_label(page.state),
        "current_page": page.current_page,
        "total_pages": page.total_pages,
        "total_count": page.total_count,
        "expanded_id": page.expanded_id.map(|id| id.as_str()),
        "records": page.records,
    })
}

// =============================================================================
// SEARCH
// =============================================================================

/// Search view as text.
#[must_use]
pub fn search_text(view: &SearchView<'_>) -> String {
    let mut out = String::new();

    match view.state {
        LoadState::Idle => {
            out.push_str("Type at least two characters to search.\n");
            return out;
        }
        LoadState::Empty => {
            out.push_str(&format!("No results for \"{}\".\n", view.query));
            return out;
        }
        LoadState::Failed(e) => {
            out.push_str(&format!("Search failed: {e}\n"));
            return out;
        }
        _ => {}
    }

    let facets: Vec<String> = view
        .counts
        .iter()
        .map(|(t, n)| {
            let mark = if view.selected.contains(&t) { "*" } else { "" };
            format!("{mark}{t} ({n})")
        })
        .collect();
    out.push_str(&format!(
        "Results for \"{}\": {}\n",
        view.query,
        facets.join("  ")
    ));
    if view.is_filtered() {
        out.push_str(&format!("Showing {} of {}\n", view.visible, view.total));
    }

    for (entity_type, results) in &view.groups {
        out.push_str(&format!("\n{entity_type}\n"));
        for result in results {
            match &result.subtitle {
                Some(subtitle) => {
                    out.push_str(&format!(
                        "  [{}] {} - {}\n",
                        result.id, result.name, subtitle
                    ));
                }
                None => {
                    out.push_str(&format!("  [{}] {}\n", result.id, result.name));
                }
            }
        }
    }
    out
}

/// Search view as JSON.
#[must_use]
pub fn search_json(view: &SearchView<'_>) -> Value {
    json!({
        "query": view.query,
        "state": state_label(view.state),
        "counts": view.counts.to_map(),
        "selected": view.selected,
        "total": view.total,
        "visible": view.visible,
        "groups": view.groups,
    })
}

// =============================================================================
// TESTS
// =============================================================================
