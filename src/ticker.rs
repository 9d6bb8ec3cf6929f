use std::io::{self, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::debug::DebugSink;
use crate::envelope::{CallStage, CallTrace, ResponseEnvelope};
use crate::error::{AppError, Result};
use crate::fetch::{decode, HttpTransport, MarketClient};
use crate::models::{
    CandleSeries, CompanyInfo, CorporateEvents, NewsPage, ResolvedSymbol, Suggestion,
};
use crate::report;
use crate::resolve::{
    Resolution, SimilarityRanker, SuggestionRanker, SymbolDirectory, SymbolResolver,
};
use crate::utils::normalize_symbol;
use crate::window::{
    Clock, HistoryOptions, LiveOptions, LivePlan, NewsOptions, RequestWindow, SystemClock,
    TradingCalendar, WeekdayCalendar, WindowPlanner,
};

/// A stock symbol bound to the provider's identifiers.
///
/// Resolution runs at most once per instance. Every fetch method returns a
/// [`ResponseEnvelope`] and never panics or propagates errors; a symbol that
/// failed to resolve makes every fetch report a resolution error.
pub struct Ticker {
    symbol: String,
    debug: bool,
    config: Arc<Config>,
    client: MarketClient,
    directory: Arc<dyn SymbolDirectory>,
    ranker: Arc<dyn SuggestionRanker>,
    clock: Arc<dyn Clock>,
    calendar: Arc<dyn TradingCalendar>,
    resolution: Option<Resolution>,
    resolution_trace: Vec<String>,
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("symbol", &self.symbol)
            .field("debug", &self.debug)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

impl Ticker {
    /// Build against the environment configuration and resolve immediately.
    ///
    /// Only configuration or HTTP client setup problems are returned as
    /// errors; a symbol the directory does not know still yields a ticker.
    pub fn new(symbol: &str, debug: bool) -> Result<Self> {
        Self::builder(symbol).debug(debug).build()
    }

    pub fn builder(symbol: &str) -> TickerBuilder {
        TickerBuilder::new(symbol)
    }

    /// Resolve the symbol unless an outcome is already stored.
    pub fn resolve(&mut self) -> &Resolution {
        if self.resolution.is_none() {
            let mut sink = DebugSink::new(self.debug, "resolve");
            let resolver = SymbolResolver::new(
                self.directory.as_ref(),
                self.ranker.as_ref(),
                self.config.max_suggestions,
            );
            let resolution = resolver.resolve(&self.symbol, &mut sink);
            match &resolution {
                Resolution::Resolved(resolved) => {
                    log::info!("resolved {} to {}", self.symbol, resolved.search_id)
                }
                Resolution::Unresolved { suggestions } => log::info!(
                    "{} not found in directory; {} suggestions",
                    self.symbol,
                    suggestions.len()
                ),
                Resolution::LookupFailed { reason } => {
                    log::warn!("could not resolve {}: {reason}", self.symbol)
                }
            }
            self.resolution_trace = sink.into_lines();
            self.resolution = Some(resolution);
        }
        self.resolution
            .get_or_insert_with(|| Resolution::LookupFailed {
                reason: "resolution did not complete".to_string(),
            })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn resolved(&self) -> Option<&ResolvedSymbol> {
        self.resolution.as_ref().and_then(Resolution::resolved)
    }

    /// Provider search id once resolved.
    pub fn resolved_id(&self) -> Option<&str> {
        self.resolved().map(|resolved| resolved.search_id.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved().is_some()
    }

    /// Closest directory matches; empty unless resolution missed.
    pub fn suggestions(&self) -> &[Suggestion] {
        self.resolution
            .as_ref()
            .map(Resolution::suggestions)
            .unwrap_or(&[])
    }

    /// Debug lines captured while resolving, when the ticker was built with debug on.
    pub fn resolution_trace(&self) -> &[String] {
        &self.resolution_trace
    }

    pub fn history(&self, options: HistoryOptions) -> ResponseEnvelope<CandleSeries> {
        let mut trace = self.begin("history", options.debug);
        trace.note(|| format!("options: {options:?}"));

        trace.advance(CallStage::Validating);
        let plan = match self.planner().plan_history(&options) {
            Ok(plan) => plan,
            Err(err) => return trace.fail(err),
        };
        let tz = self.config.timezone;
        trace.note(|| format!("window {}", plan.window.describe(tz)));
        trace.note(|| format!("{} request batch(es)", plan.batches.len()));

        trace.advance(CallStage::Resolving);
        let resolved = match self.require_resolved(&mut trace) {
            Ok(resolved) => resolved,
            Err(err) => return trace.fail(err),
        };

        match self.fetch_candles(&mut trace, &resolved.symbol, &plan.batches) {
            Ok(series) => trace.finish(series),
            Err(err) => trace.fail(err),
        }
    }

    pub fn live(&self, options: LiveOptions) -> ResponseEnvelope<CandleSeries> {
        let mut trace = self.begin("live", options.debug);
        trace.note(|| format!("options: {options:?}"));

        trace.advance(CallStage::Validating);
        let window = match self.planner().plan_live(&options) {
            Ok(LivePlan::Open(window)) => window,
            Ok(LivePlan::Closed { reason }) => {
                trace.note(|| format!("no request issued: {reason}"));
                return trace.fail_with(vec![format!("market closed: {reason}")]);
            }
            Err(err) => return trace.fail(err),
        };
        let tz = self.config.timezone;
        trace.note(|| format!("window {}", window.describe(tz)));

        trace.advance(CallStage::Resolving);
        let resolved = match self.require_resolved(&mut trace) {
            Ok(resolved) => resolved,
            Err(err) => return trace.fail(err),
        };

        match self.fetch_candles(&mut trace, &resolved.symbol, &[window]) {
            Ok(series) => trace.finish(series),
            Err(err) => trace.fail(err),
        }
    }

    pub fn company_info(&self, debug: bool) -> ResponseEnvelope<CompanyInfo> {
        let mut trace = self.begin("company_info", debug);
        trace.advance(CallStage::Validating);

        trace.advance(CallStage::Resolving);
        let resolved = match self.require_resolved(&mut trace) {
            Ok(resolved) => resolved,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Fetching);
        let payload = match self.client.company(&resolved.search_id, trace.sink()) {
            Ok(payload) => payload,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Decoding);
        match decode::company_info(&payload) {
            Ok(info) => trace.finish(info),
            Err(err) => trace.fail(err),
        }
    }

    /// Print a company summary to stdout. Failures are printed, not returned.
    pub fn info(&self, debug: bool) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(err) = self.info_to(&mut out, debug) {
            log::warn!("failed to write company info for {}: {err}", self.symbol);
        }
    }

    pub fn info_to<W: Write>(&self, out: &mut W, debug: bool) -> io::Result<()> {
        if !self.suggestions().is_empty() {
            return report::write_suggestions(out, &self.symbol, self.suggestions());
        }

        let envelope = self.company_info(debug);
        for line in &envelope.debug_info {
            writeln!(out, "[debug] {line}")?;
        }
        match envelope.data() {
            Some(info) => report::write_company(out, info),
            None => {
                for entry in &envelope.error {
                    writeln!(out, "Failed to fetch company details: {entry}")?;
                }
                Ok(())
            }
        }
    }

    pub fn events(&self, debug: bool) -> ResponseEnvelope<CorporateEvents> {
        let mut trace = self.begin("events", debug);
        trace.advance(CallStage::Validating);

        trace.advance(CallStage::Resolving);
        let company_id = match self.require_company_id(&mut trace) {
            Ok(company_id) => company_id,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Fetching);
        let payload = match self.client.events(company_id, trace.sink()) {
            Ok(payload) => payload,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Decoding);
        match decode::corporate_events(&payload) {
            Ok(events) => {
                trace.note(|| format!("{} events decoded", events.total()));
                trace.finish(events)
            }
            Err(err) => trace.fail(err),
        }
    }

    pub fn news(&self, options: NewsOptions) -> ResponseEnvelope<NewsPage> {
        let mut trace = self.begin("news", options.debug);
        trace.note(|| format!("page {} size {}", options.page, options.size));

        trace.advance(CallStage::Validating);
        if let Err(err) = options.validate() {
            return trace.fail(err);
        }

        trace.advance(CallStage::Resolving);
        let company_id = match self.require_company_id(&mut trace) {
            Ok(company_id) => company_id,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Fetching);
        let payload = match self
            .client
            .news(company_id, options.page, options.size, trace.sink())
        {
            Ok(payload) => payload,
            Err(err) => return trace.fail(err),
        };

        trace.advance(CallStage::Decoding);
        match decode::news_items(&payload) {
            Ok(items) => {
                trace.note(|| format!("{} news items decoded", items.len()));
                trace.finish(NewsPage {
                    page: options.page,
                    size: options.size,
                    items,
                })
            }
            Err(err) => trace.fail(err),
        }
    }

    fn begin(&self, operation: &'static str, debug: bool) -> CallTrace {
        let mut trace = CallTrace::begin(operation, debug);
        trace.sink().extend(self.resolution_trace.iter().cloned());
        trace
    }

    fn planner(&self) -> WindowPlanner<'_> {
        WindowPlanner::new(&self.config, self.clock.as_ref(), self.calendar.as_ref())
    }

    fn require_resolved(&self, trace: &mut CallTrace) -> Result<&ResolvedSymbol> {
        let resolution = self.resolution.as_ref().ok_or_else(|| {
            AppError::unresolved(
                &self.symbol,
                Vec::new(),
                Some("resolve() has not been called".to_string()),
            )
        })?;
        let resolved = resolution.require(&self.symbol)?;
        trace.note(|| format!("using search id {}", resolved.search_id));
        Ok(resolved)
    }

    fn require_company_id(&self, trace: &mut CallTrace) -> Result<&str> {
        let resolved = self.require_resolved(trace)?;
        let company_id = resolved.company_id.as_deref().ok_or_else(|| {
            AppError::unresolved(
                &self.symbol,
                Vec::new(),
                Some("the provider company id is unavailable".to_string()),
            )
        })?;
        trace.note(|| format!("using company id {company_id}"));
        Ok(company_id)
    }

    /// One fetch/decode pair per batch; any failure discards the whole result.
    fn fetch_candles(
        &self,
        trace: &mut CallTrace,
        symbol: &str,
        batches: &[RequestWindow],
    ) -> Result<CandleSeries> {
        let tz = self.config.timezone;
        let total = batches.len();
        let mut candles = Vec::new();

        for (index, batch) in batches.iter().enumerate() {
            trace.advance(CallStage::Fetching);
            trace.note(|| format!("batch {}/{total}: {}", index + 1, batch.describe(tz)));
            let payload = self.client.chart(symbol, batch, trace.sink())?;

            trace.advance(CallStage::Decoding);
            let rows = decode::candles(&payload)?;
            trace.note(|| format!("batch {}/{total}: {} candles", index + 1, rows.len()));
            candles.extend(rows);
        }

        Ok(CandleSeries::new(candles))
    }
}

/// Collaborators default to the real network, the system clock and a
/// weekday calendar with the configured holidays.
pub struct TickerBuilder {
    symbol: String,
    debug: bool,
    config: Option<Config>,
    transport: Option<Arc<dyn HttpTransport>>,
    directory: Option<Arc<dyn SymbolDirectory>>,
    ranker: Option<Arc<dyn SuggestionRanker>>,
    clock: Option<Arc<dyn Clock>>,
    calendar: Option<Arc<dyn TradingCalendar>>,
}

impl TickerBuilder {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            debug: false,
            config: None,
            transport: None,
            directory: None,
            ranker: None,
            clock: None,
            calendar: None,
        }
    }

    /// Capture resolution trace lines; fetch methods take their own flag.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the HTTP-backed directory used for resolution.
    pub fn directory(mut self, directory: Arc<dyn SymbolDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn ranker(mut self, ranker: Arc<dyn SuggestionRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn calendar(mut self, calendar: Arc<dyn TradingCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Build without touching the directory; call [`Ticker::resolve`] next.
    pub fn build_unresolved(self) -> Result<Ticker> {
        let config = match self.config {
            Some(config) => config,
            None => Config::from_env()?,
        };
        let config = Arc::new(config);

        let client = match self.transport {
            Some(transport) => MarketClient::new(Arc::clone(&config), transport),
            None => MarketClient::from_config(Arc::clone(&config))?,
        };

        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(client.clone()) as Arc<dyn SymbolDirectory>);
        let calendar = self.calendar.unwrap_or_else(|| {
            Arc::new(WeekdayCalendar::with_holidays(config.holidays.iter().copied()))
        });

        Ok(Ticker {
            symbol: self.symbol,
            debug: self.debug,
            config,
            client,
            directory,
            ranker: self.ranker.unwrap_or_else(|| Arc::new(SimilarityRanker)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            calendar,
            resolution: None,
            resolution_trace: Vec::new(),
        })
    }

    pub fn build(self) -> Result<Ticker> {
        let mut ticker = self.build_unresolved()?;
        ticker.resolve();
        Ok(ticker)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::ErrorKind;
    use crate::fetch::transport::testing::StubTransport;
    use crate::resolve::testing::{entry, StaticDirectory};
    use crate::window::FixedClock;

    /// 2024-06-10 (Monday) 11:00 IST.
    const MONDAY_11_IST: i64 = 1_717_997_400;
    const SUNDAY_11_IST: i64 = MONDAY_11_IST - 86_400;

    const SEARCH_BODY: &str = r#"{"data": {"content": [
        {"nse_scrip_code": "RELINFRA", "search_id": "reliance-infrastructure-ltd", "title": "Reliance Infrastructure"},
        {"nse_scrip_code": "RELIANCE", "bse_scrip_code": "500325", "search_id": "reliance-industries-ltd", "title": "Reliance Industries"}
    ]}}"#;
    const COMPANY_BODY: &str = r#"{"header": {
        "displayName": "Reliance Industries", "growwCompanyId": "GSTK500325",
        "nseScriptCode": "RELIANCE", "isin": "INE002A01018", "industryName": "Refineries"
    }, "stats": {"peRatio": 27.4}}"#;
    const CHART_BODY: &str = r#"{"candles": [
        [1717991100, 2900.0, 2910.0, 2895.0, 2905.0, 1000],
        [1717992000, 2905.0, 2915.0, 2900.0, 2912.5, 800]
    ]}"#;

    fn stub() -> StubTransport {
        StubTransport::new()
            .route("st_p_query", SEARCH_BODY)
            .route("company/search_id", COMPANY_BODY)
            .route("charting_service", CHART_BODY)
            .route("groww-news", r#"{"results": [{"title": "RIL AGM date set", "pubDate": "2024-06-09"}]}"#)
            .route("corporate_action", r#"{"dividends": [{"exDate": "2024-08-19"}]}"#)
    }

    fn ticker_at(symbol: &str, transport: Arc<StubTransport>, epoch: i64) -> Ticker {
        let clock = FixedClock(Utc.timestamp_opt(epoch, 0).unwrap());
        Ticker::builder(symbol)
            .config(Config::builtin())
            .transport(transport)
            .clock(Arc::new(clock))
            .build()
            .unwrap()
    }

    fn ticker(symbol: &str, transport: Arc<StubTransport>) -> Ticker {
        ticker_at(symbol, transport, MONDAY_11_IST)
    }

    #[test]
    fn known_symbol_resolves_without_suggestions() {
        let transport = Arc::new(stub());
        let ticker = ticker("reliance", transport.clone());

        assert_eq!(ticker.symbol(), "RELIANCE");
        assert_eq!(ticker.resolved_id(), Some("reliance-industries-ltd"));
        assert!(ticker.suggestions().is_empty());
        assert_eq!(
            ticker.resolved().and_then(|r| r.company_id.as_deref()),
            Some("GSTK500325")
        );
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn unknown_symbol_gets_suggestions_and_every_fetch_refuses() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANC", transport.clone());
        assert!(ticker.resolved_id().is_none());
        assert_eq!(ticker.suggestions()[0].symbol, "RELIANCE");

        let after_construction = transport.calls();
        let history = ticker.history(HistoryOptions::lookback(15, 5));
        let live = ticker.live(LiveOptions::new(15));
        let events = ticker.events(false);
        let news = ticker.news(NewsOptions::new());
        let info = ticker.company_info(false);

        for errors in [&history.error, &live.error, &events.error, &news.error, &info.error] {
            assert!(!errors.is_empty());
            assert!(errors[0].contains("could not be resolved"), "{errors:?}");
        }
        assert!(history.data.is_none() && live.data.is_none());
        assert!(events.data.is_none() && news.data.is_none() && info.data.is_none());
        assert_eq!(transport.calls(), after_construction);
    }

    #[test]
    fn unsupported_interval_issues_no_request() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let history = ticker.history(HistoryOptions::lookback(7, 5));
        let live = ticker.live(LiveOptions::new(1440));

        assert!(history.error[0].starts_with(ErrorKind::Configuration.label()));
        assert!(live.error[0].starts_with(ErrorKind::Configuration.label()));
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn reversed_range_is_rejected_before_any_request() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.history(HistoryOptions::range(15, "2024-06-07 15:00", "2024-06-07 09:15"));
        assert!(envelope.data.is_none());
        assert!(envelope.error[0].starts_with("configuration error"));
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn valid_range_issues_exactly_one_matching_request() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.history(HistoryOptions::range(15, "2024-06-07 09:15", "2024-06-07 15:30"));
        assert!(envelope.is_success(), "{:?}", envelope.error);
        assert_eq!(transport.calls(), before + 1);

        let request = &transport.requests_to("charting_service")[0];
        assert!(request.url.ends_with("/exchange/NSE/segment/CASH/RELIANCE"));
        let start = Utc.with_ymd_and_hms(2024, 6, 7, 3, 45, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 7, 10, 0, 0).unwrap();
        assert_eq!(
            request.query_value("startTimeInMillis"),
            Some(start.timestamp_millis().to_string().as_str())
        );
        assert_eq!(
            request.query_value("endTimeInMillis"),
            Some(end.timestamp_millis().to_string().as_str())
        );
    }

    #[test]
    fn lookback_history_returns_decoded_candles() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.history(HistoryOptions::lookback(15, 5));
        assert!(envelope.error.is_empty());
        assert!(envelope.debug_info.is_empty());
        let series = envelope.data().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles[1].close, 2912.5);

        assert_eq!(transport.calls(), before + 1);
        let request = &transport.requests_to("charting_service")[0];
        assert_eq!(request.query_value("intervalInMinutes"), Some("15"));
        let end_millis = MONDAY_11_IST * 1000;
        let start_millis = end_millis - 5 * 86_400_000;
        assert_eq!(request.query_value("endTimeInMillis"), Some(end_millis.to_string().as_str()));
        assert_eq!(
            request.query_value("startTimeInMillis"),
            Some(start_millis.to_string().as_str())
        );
    }

    #[test]
    fn long_history_is_batched_and_merged() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.history(HistoryOptions::range(1, "2024-05-01", "2024-05-20"));
        assert!(envelope.is_success());
        assert_eq!(transport.calls(), before + 3);
        // Every batch returned the same rows; duplicates collapse.
        assert_eq!(envelope.data().unwrap().len(), 2);
    }

    #[test]
    fn failed_batch_discards_earlier_batches() {
        let transport = Arc::new(
            StubTransport::new()
                .route("st_p_query", SEARCH_BODY)
                .route("company/search_id", COMPANY_BODY)
                .route_status("charting_service", 502, "bad gateway"),
        );
        let ticker = ticker("RELIANCE", transport.clone());

        let envelope = ticker.history(HistoryOptions::range(1, "2024-05-01", "2024-05-20"));
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.len(), 1);
        assert!(envelope.error[0].starts_with("transport error"));
        assert!(envelope.error[0].contains("502"));
    }

    #[test]
    fn live_on_sunday_is_closed_without_requests() {
        let transport = Arc::new(stub());
        let ticker = ticker_at("RELIANCE", transport.clone(), SUNDAY_11_IST);
        let before = transport.calls();

        let envelope = ticker.live(LiveOptions::new(5).with_debug(true));
        assert!(envelope.data.is_none());
        assert!(envelope.error[0].contains("market closed"));
        assert!(envelope.debug_info.iter().any(|line| line.contains("no request issued")));
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn live_on_trading_day_fetches_today_once() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.live(LiveOptions::new(5));
        assert!(envelope.is_success(), "{:?}", envelope.error);
        assert_eq!(transport.calls(), before + 1);

        let request = &transport.requests_to("charting_service")[0];
        let session_open = Utc.with_ymd_and_hms(2024, 6, 10, 3, 45, 0).unwrap();
        assert_eq!(
            request.query_value("startTimeInMillis"),
            Some(session_open.timestamp_millis().to_string().as_str())
        );
        assert_eq!(request.query_value("intervalInMinutes"), Some("5"));
    }

    #[test]
    fn debug_flag_alone_controls_debug_info() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport);

        assert!(!ticker.history(HistoryOptions::lookback(15, 5).with_debug(true)).debug_info.is_empty());
        assert!(ticker.history(HistoryOptions::lookback(15, 5)).debug_info.is_empty());
        assert!(!ticker.live(LiveOptions::new(5).with_debug(true)).debug_info.is_empty());
        assert!(ticker.live(LiveOptions::new(5)).debug_info.is_empty());
        assert!(!ticker.events(true).debug_info.is_empty());
        assert!(ticker.events(false).debug_info.is_empty());
        assert!(!ticker.news(NewsOptions::new().with_debug(true)).debug_info.is_empty());
        assert!(ticker.news(NewsOptions::new()).debug_info.is_empty());
        assert!(!ticker.company_info(true).debug_info.is_empty());
        assert!(ticker.company_info(false).debug_info.is_empty());
    }

    #[test]
    fn news_and_events_use_the_company_id() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());

        let news = ticker.news(NewsOptions::new().page(2).size(10));
        let page = news.data().unwrap();
        assert_eq!((page.page, page.size), (2, 10));
        assert_eq!(page.items[0].headline, "RIL AGM date set");
        let request = &transport.requests_to("groww-news")[0];
        assert!(request.url.ends_with("/news/GSTK500325"));
        assert_eq!(request.query_value("size"), Some("10"));

        let events = ticker.events(false);
        assert_eq!(events.data().unwrap().total(), 1);
        let request = &transport.requests_to("corporate_action")[0];
        assert_eq!(request.query_value("gsin"), Some("GSTK500325"));
    }

    #[test]
    fn oversized_news_page_is_a_configuration_error() {
        let transport = Arc::new(stub());
        let ticker = ticker("RELIANCE", transport.clone());
        let before = transport.calls();

        let envelope = ticker.news(NewsOptions::new().size(500));
        assert!(envelope.error[0].starts_with("configuration error"));
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn missing_company_id_refuses_news() {
        let transport = Arc::new(
            StubTransport::new()
                .route("st_p_query", SEARCH_BODY)
                .route_failure("company/search_id", "connection reset"),
        );
        let ticker = ticker("RELIANCE", transport.clone());
        assert!(ticker.is_resolved());

        let before = transport.calls();
        let envelope = ticker.news(NewsOptions::new());
        assert!(envelope.error[0].contains("company id is unavailable"));
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn resolution_runs_once() {
        let directory = Arc::new(StaticDirectory::with(vec![entry(
            "TCS",
            Some("tata-consultancy-services-ltd"),
            "Tata Consultancy Services",
        )]));
        let mut ticker = Ticker::builder("tcs")
            .config(Config::builtin())
            .transport(Arc::new(StubTransport::new()))
            .directory(directory.clone())
            .build_unresolved()
            .unwrap();

        assert!(ticker.resolution().is_none());
        assert_eq!(directory.lookups(), 0);
        assert!(ticker.resolve().is_resolved());
        assert!(ticker.resolve().is_resolved());
        assert_eq!(directory.lookups(), 1);
    }

    #[test]
    fn unresolved_build_refuses_fetches_until_resolved() {
        let transport = Arc::new(stub());
        let ticker = Ticker::builder("RELIANCE")
            .config(Config::builtin())
            .transport(transport.clone())
            .build_unresolved()
            .unwrap();

        let envelope = ticker.events(false);
        assert!(envelope.error[0].contains("could not be resolved"));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn directory_outage_is_reported_on_fetch() {
        let transport = Arc::new(StubTransport::new().route_failure("st_p_query", "dns failure"));
        let ticker = ticker("RELIANCE", transport);

        assert!(matches!(ticker.resolution(), Some(Resolution::LookupFailed { .. })));
        let envelope = ticker.history(HistoryOptions::lookback(15, 1));
        assert!(envelope.error[0].contains("dns failure"));
    }

    #[test]
    fn info_prints_summary_or_suggestions() {
        let transport = Arc::new(stub());
        let known = ticker("RELIANCE", transport.clone());
        let mut out = Vec::new();
        known.info_to(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Reliance Industries (RELIANCE)"));
        assert!(text.contains("peRatio"));

        let unknown = ticker("RELIANC", transport);
        let mut out = Vec::new();
        unknown.info_to(&mut out, false).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Suggestions for 'RELIANC':"));
    }
}
