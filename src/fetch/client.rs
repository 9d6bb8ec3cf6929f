use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::debug::DebugSink;
use crate::error::{AppError, Result};
use crate::models::DirectoryEntry;
use crate::resolve::SymbolDirectory;
use crate::window::RequestWindow;

use super::decode;
use super::request::{prepare_request, Endpoint};
use super::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// One method per provider endpoint; each performs exactly one HTTP call
/// and hands back the parsed JSON body.
#[derive(Clone)]
pub struct MarketClient {
    config: Arc<Config>,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl MarketClient {
    pub fn new(config: Arc<Config>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Client on the real network, with the configured timeout.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search(&self, query: &str, sink: &mut DebugSink) -> Result<Value> {
        let request = prepare_request(&self.config, Endpoint::Search, &[])?
            .with_query("entity_type", "stocks")
            .with_query("page", 0)
            .with_query("query", query)
            .with_query("size", self.config.search_page_size)
            .with_query("web", false);
        self.get_json(Endpoint::Search, request, sink)
    }

    pub fn company(&self, search_id: &str, sink: &mut DebugSink) -> Result<Value> {
        let request = prepare_request(&self.config, Endpoint::Company, &[("search_id", search_id)])?
            .with_query("fields", "COMPANY_HEADER,STATIC_PRICE")
            .with_query("page", 1)
            .with_query("size", 10);
        self.get_json(Endpoint::Company, request, sink)
    }

    pub fn chart(&self, symbol: &str, window: &RequestWindow, sink: &mut DebugSink) -> Result<Value> {
        let request = prepare_request(&self.config, Endpoint::Chart, &[("symbol", symbol)])?
            .with_query("endTimeInMillis", window.end_millis())
            .with_query("intervalInMinutes", window.interval_minutes())
            .with_query("startTimeInMillis", window.start_millis());
        self.get_json(Endpoint::Chart, request, sink)
    }

    pub fn news(&self, company_id: &str, page: u32, size: u32, sink: &mut DebugSink) -> Result<Value> {
        let request = prepare_request(&self.config, Endpoint::News, &[("company_id", company_id)])?
            .with_query("page", page)
            .with_query("size", size);
        self.get_json(Endpoint::News, request, sink)
    }

    pub fn events(&self, company_id: &str, sink: &mut DebugSink) -> Result<Value> {
        let request = prepare_request(&self.config, Endpoint::Events, &[])?
            .with_query("gsin", company_id);
        self.get_json(Endpoint::Events, request, sink)
    }

    fn get_json(&self, endpoint: Endpoint, request: HttpRequest, sink: &mut DebugSink) -> Result<Value> {
        let label = endpoint.label();
        sink.record(|| format!("GET {}", request.display_url()));
        log::debug!("{label} request to {}", request.url);

        let response = self
            .transport
            .execute(&request)
            .map_err(|err| AppError::transport(format!("{label} request failed: {err}")))?;

        sink.record(|| {
            format!(
                "{label} responded with status {} ({} bytes)",
                response.status,
                response.body.len()
            )
        });

        if !response.is_success() {
            return Err(AppError::transport(format!(
                "{label} request returned status {}",
                response.status
            )));
        }

        let payload = decode::parse_json(&response.body, label)?;
        sink.record(|| match payload.as_object() {
            Some(map) => format!(
                "{label} payload keys: {}",
                map.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
            None => format!("{label} payload is not an object"),
        });
        Ok(payload)
    }
}

impl SymbolDirectory for MarketClient {
    fn search(&self, query: &str, sink: &mut DebugSink) -> Result<Vec<DirectoryEntry>> {
        let payload = MarketClient::search(self, query, sink)?;
        Ok(decode::directory_entries(&payload))
    }

    fn company_id(&self, search_id: &str, sink: &mut DebugSink) -> Result<Option<String>> {
        let payload = self.company(search_id, sink)?;
        Ok(decode::company_id(&payload))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::fetch::transport::testing::StubTransport;

    fn client(stub: Arc<StubTransport>) -> MarketClient {
        MarketClient::new(Arc::new(Config::builtin()), stub)
    }

    #[test]
    fn chart_request_carries_window_in_millis() {
        let stub = Arc::new(StubTransport::new().route("charting_service", r#"{"candles": []}"#));
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 3, 45, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap();
        let window = RequestWindow::new(start, end, 15).unwrap();

        let mut sink = DebugSink::active("chart");
        client(stub.clone()).chart("TCS", &window, &mut sink).unwrap();

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with("/segment/CASH/TCS"));
        assert_eq!(requests[0].query_value("startTimeInMillis"), Some("1717991100000"));
        assert_eq!(requests[0].query_value("intervalInMinutes"), Some("15"));
        assert!(sink.lines().iter().any(|line| line.starts_with("GET ")));
    }

    #[test]
    fn non_success_status_is_a_transport_error() {
        let stub = Arc::new(StubTransport::new().route_status("search", 503, "busy"));
        let mut sink = DebugSink::disabled();
        let err = MarketClient::search(&client(stub), "TCS", &mut sink).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let stub = Arc::new(StubTransport::new().route("groww-news", "<html>"));
        let mut sink = DebugSink::disabled();
        let err = client(stub).news("GSTK500325", 0, 5, &mut sink).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }

    #[test]
    fn directory_search_uses_provider_query_parameters() {
        let stub = Arc::new(StubTransport::new().route(
            "st_p_query",
            r#"{"content": [{"nse_scrip_code": "TCS", "search_id": "tata-consultancy-services-ltd"}]}"#,
        ));
        let mut sink = DebugSink::disabled();
        let entries = SymbolDirectory::search(&client(stub.clone()), "TCS", &mut sink).unwrap();

        assert_eq!(entries[0].search_id.as_deref(), Some("tata-consultancy-services-ltd"));
        let request = &stub.requests()[0];
        assert_eq!(request.query_value("entity_type"), Some("stocks"));
        assert_eq!(request.query_value("size"), Some("6"));
        assert_eq!(request.query_value("web"), Some("false"));
    }

    #[test]
    fn network_client_keeps_the_given_config() {
        let mut config = Config::builtin();
        config.segment = "FNO".to_string();
        let client = MarketClient::from_config(Arc::new(config)).unwrap();
        assert_eq!(client.config().segment, "FNO");
    }
}
