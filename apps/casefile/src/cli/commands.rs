//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::client::RecordClient;
use crate::config::Config;
use crate::driver::{load_page, retry_search, run_search, search_as_typed};
use crate::render;
use casefile_core::{
    CasefileError, EntityId, EntityType, EvidenceId, EvidencePager, Navigator, RawSearchHit,
    Route, SearchAggregator, dispatch, resolve_raw_navigation,
};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// NAVIGATION
// =============================================================================

/// Navigator that prints the destination instead of opening it.
struct PrintNavigator {
    json_mode: bool,
}

impl Navigator for PrintNavigator {
    fn navigate_to(&mut self, route: &Route) {
        if self.json_mode {
            println!("{}", serde_json::json!({ "route": route.path() }));
        } else {
            println!("Opening {}", route);
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CasefileError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CasefileError::SerializationError(e.to_string()))?;
    println!("{text}");
    Ok(())
}

// =============================================================================
// EVIDENCE COMMAND
// =============================================================================

/// Show one page of the evidence register.
pub async fn cmd_evidence(
    config: &Config,
    json_mode: bool,
    page: usize,
    expand: Option<&str>,
    retries: usize,
) -> Result<(), CasefileError> {
    let client = RecordClient::new(config)?;
    let mut pager = EvidencePager::new(config.page_size);
    tracing::info!(url = client.base_url(), page, "Loading evidence register");

    let issued = pager.go_to_page(page);
    let mut result = load_page(&mut pager, &client, issued).await;
    for attempt in 1..=retries {
        if result.is_ok() {
            break;
        }
        tracing::info!(attempt, page = pager.current_page(), "Retrying evidence page");
        let issued = pager.retry();
        result = load_page(&mut pager, &client, issued).await;
    }

    if let Some(id) = expand {
        let id = EvidenceId::new(id);
        pager.toggle_expanded(&id);
        if result.is_ok() && pager.expanded_record().is_none() {
            tracing::warn!(id = %id, "Evidence record is not on this page");
        }
    }

    if json_mode {
        print_json(&render::evidence_json(&pager.view()))?;
    } else {
        print!("{}", render::evidence_text(&pager.view()));
    }

    result.map_err(CasefileError::from)
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Options for the search command.
pub struct SearchOptions<'a> {
    pub types: &'a [String],
    pub incremental: bool,
    pub keystroke_ms: u64,
    pub retries: usize,
    pub open: bool,
}

/// Every prefix of `query`, one per typed character.
fn typed_prefixes(query: &str) -> Vec<String> {
    query
        .char_indices()
        .map(|(i, c)| query[..i + c.len_utf8()].to_string())
        .collect()
}

/// Search entities and show grouped results.
pub async fn cmd_search(
    config: &Config,
    json_mode: bool,
    query: &str,
    options: &SearchOptions<'_>,
) -> Result<(), CasefileError> {
    let mut aggregator = SearchAggregator::new();
    for raw in options.types {
        let entity_type: EntityType = raw.parse()?;
        if !aggregator.is_selected(entity_type) {
            aggregator.toggle_type(entity_type);
        }
    }

    let client = RecordClient::new(config)?;
    tracing::info!(url = client.base_url(), query, "Searching entities");

    let mut result = if options.incremental {
        let keystrokes = typed_prefixes(query);
        search_as_typed(
            &mut aggregator,
            Arc::new(client.clone()),
            &keystrokes,
            Duration::from_millis(options.keystroke_ms),
        )
        .await
    } else {
        run_search(&mut aggregator, &client, query).await
    };

    for attempt in 1..=options.retries {
        if result.is_ok() {
            break;
        }
        tracing::info!(attempt, query, "Retrying search");
        result = retry_search(&mut aggregator, &client).await;
    }

    let view = aggregator.view();
    if json_mode {
        print_json(&render::search_json(&view))?;
    } else {
        print!("{}", render::search_text(&view));
    }

    if options.open && result.is_ok() {
        let first = view.groups.values().flatten().next().copied();
        match first {
            Some(hit) => {
                dispatch(&mut PrintNavigator { json_mode }, hit);
            }
            None => tracing::info!("Nothing to open"),
        }
    }

    result.map_err(CasefileError::from)
}

// =============================================================================
// ROUTE COMMAND
// =============================================================================

/// Resolve and print the route for an entity type and id.
///
/// Unknown types resolve to no route; that is reported, not an error.
pub fn cmd_route(json_mode: bool, entity_type: &str, id: &str) -> Result<(), CasefileError> {
    let hit = RawSearchHit {
        id: EntityId::new(id),
        entity_type: Some(entity_type.to_string()),
        name: String::new(),
        subtitle: None,
    };
    let route = resolve_raw_navigation(&hit);

    if json_mode {
        return print_json(&serde_json::json!({
            "entity_type": entity_type,
            "id": id,
            "route": route.as_ref().map(Route::path),
        }));
    }

    match route {
        Some(route) => println!("{}", route),
        None => println!("No route for entity type '{}'", entity_type),
    }
    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Show the effective configuration with the API key redacted.
pub fn cmd_config(config: &Config, json_mode: bool) -> Result<(), CasefileError> {
    let api_key = config.api_key.as_ref().map(|_| "<redacted>");

    if json_mode {
        return print_json(&serde_json::json!({
            "base_url": config.base_url,
            "api_key": api_key,
            "page_size": config.page_size,
            "request_timeout_ms": config.request_timeout_ms,
        }));
    }

    println!("Casefile Configuration");
    println!("======================");
    println!("Base URL:   {}", config.base_url);
    println!("API key:    {}", api_key.unwrap_or("(none)"));
    println!("Page size:  {}", config.page_size);
    println!("Timeout:    {} ms", config.request_timeout_ms);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
