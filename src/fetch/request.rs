use std::collections::BTreeMap;

use reqwest::header::{HeaderName, HeaderValue};

use crate::config::Config;
use crate::error::{AppError, Context, Result};

use super::transport::HttpRequest;

/// Provider endpoints, as path templates below the configured base url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chart,
    Search,
    Company,
    News,
    Events,
}

impl Endpoint {
    pub const fn template(self) -> &'static str {
        match self {
            Endpoint::Chart => {
                "charting_service/v2/chart/exchange/{exchange}/segment/{segment}/{symbol}"
            }
            Endpoint::Search => "search/v3/query/global/st_p_query",
            Endpoint::Company => "stocks_data/v1/company/search_id/{search_id}",
            Endpoint::News => "groww-news/v2/stocks/news/{company_id}",
            Endpoint::Events => "stocks_data/equity_feature/v2/company/corporate_action/event",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Endpoint::Chart => "chart",
            Endpoint::Search => "search",
            Endpoint::Company => "company",
            Endpoint::News => "news",
            Endpoint::Events => "events",
        }
    }
}

/// Render the endpoint url and attach the configured headers.
pub fn prepare_request(
    config: &Config,
    endpoint: Endpoint,
    extras: &[(&str, &str)],
) -> Result<HttpRequest> {
    let path = render_template(endpoint.template(), |key| match key {
        "exchange" => Some(config.exchange.clone()),
        "segment" => Some(config.segment.clone()),
        _ => extras
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| (*value).to_string()),
    })?;
    let headers = build_headers(&config.headers)?;

    Ok(HttpRequest::get(config.endpoint(&path)).with_headers(headers))
}

pub fn expand_env_vars(value: &str) -> Result<String> {
    expand_with(value, |name| std::env::var(name).ok())
}

fn expand_with<F>(value: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find("${") {
        expanded.push_str(&rest[..open]);
        let tail = &rest[open + 2..];
        let close = tail.find('}').ok_or_else(|| {
            AppError::configuration("Unterminated environment placeholder in header")
        })?;
        let name = &tail[..close];
        if name.is_empty() {
            return Err(AppError::configuration(
                "Encountered empty environment placeholder in header",
            ));
        }
        let resolved = lookup(name).ok_or_else(|| {
            AppError::configuration(format!(
                "Environment variable {name} required by request header is not set"
            ))
        })?;
        expanded.push_str(&resolved);
        rest = &tail[close + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// Substitute `{key}` segments of an endpoint path.
fn render_template<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let close = tail.find('}').ok_or_else(|| {
            AppError::message(format!("Unterminated placeholder in path `{template}`"))
        })?;
        let key = &tail[..close];
        if key.is_empty() {
            return Err(AppError::message(format!(
                "Encountered empty placeholder in path `{template}`"
            )));
        }
        let value = lookup(key).ok_or_else(|| {
            AppError::message(format!("No value for `{key}` in path `{template}`"))
        })?;
        rendered.push_str(&value);
        rest = &tail[close + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Expand `${VAR}` placeholders and check every header is sendable.
pub fn build_headers(headers: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for (key, value) in headers {
        HeaderName::from_bytes(key.as_bytes())
            .with_context(|| format!("Invalid header name: {key}"))?;
        let expanded = expand_env_vars(value)?;
        HeaderValue::from_str(&expanded)
            .with_context(|| format!("Invalid header value for {key}"))?;
        map.insert(key.clone(), expanded);
    }
    Ok(map)
}
