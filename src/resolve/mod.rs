use crate::debug::DebugSink;
use crate::error::{AppError, Result};
use crate::models::{DirectoryEntry, ResolvedSymbol, Suggestion};
use crate::utils::normalize_symbol;

pub mod ranking;

pub use ranking::{SimilarityRanker, SuggestionRanker};

/// Provider lookup used to turn a ticker into provider identifiers.
pub trait SymbolDirectory: Send + Sync {
    /// Directory rows matching a free-text query.
    fn search(&self, query: &str, sink: &mut DebugSink) -> Result<Vec<DirectoryEntry>>;

    /// Provider company id for a search id, when the provider reports one.
    fn company_id(&self, search_id: &str, sink: &mut DebugSink) -> Result<Option<String>>;
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedSymbol),
    /// Directory answered but no row matched exactly.
    Unresolved { suggestions: Vec<Suggestion> },
    /// Directory could not be consulted.
    LookupFailed { reason: String },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&ResolvedSymbol> {
        match self {
            Resolution::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Resolution::Unresolved { suggestions } => suggestions,
            _ => &[],
        }
    }

    /// The resolved identity, or the error every fetch reports while unresolved.
    pub fn require(&self, symbol: &str) -> Result<&ResolvedSymbol> {
        match self {
            Resolution::Resolved(resolved) => Ok(resolved),
            Resolution::Unresolved { suggestions } => Err(AppError::unresolved(
                symbol,
                suggestions.iter().map(ToString::to_string).collect(),
                None,
            )),
            Resolution::LookupFailed { reason } => Err(AppError::unresolved(
                symbol,
                Vec::new(),
                Some(reason.clone()),
            )),
        }
    }
}

pub struct SymbolResolver<'a> {
    directory: &'a dyn SymbolDirectory,
    ranker: &'a dyn SuggestionRanker,
    max_suggestions: usize,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(
        directory: &'a dyn SymbolDirectory,
        ranker: &'a dyn SuggestionRanker,
        max_suggestions: usize,
    ) -> Self {
        Self {
            directory,
            ranker,
            max_suggestions,
        }
    }

    /// Never fails: directory problems become [`Resolution::LookupFailed`].
    pub fn resolve(&self, symbol: &str, sink: &mut DebugSink) -> Resolution {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            sink.record(|| "empty symbol; skipping directory lookup".to_string());
            return Resolution::LookupFailed {
                reason: "symbol must not be empty".to_string(),
            };
        }

        sink.record(|| format!("looking up `{symbol}` in the symbol directory"));
        let entries = match self.directory.search(&symbol, sink) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("symbol lookup for {symbol} failed: {err}");
                sink.record(|| format!("directory lookup failed: {err}"));
                return Resolution::LookupFailed {
                    reason: err.to_string(),
                };
            }
        };
        sink.record(|| format!("directory returned {} entries", entries.len()));

        let exact = entries.iter().find(|entry| {
            entry.search_id.is_some()
                && entry
                    .nse_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(&symbol))
        });

        let Some(entry) = exact else {
            let suggestions = self.ranker.rank(&symbol, &entries, self.max_suggestions);
            sink.record(|| {
                format!(
                    "no exact match for `{symbol}`; suggestions: [{}]",
                    suggestions
                        .iter()
                        .map(|s| s.symbol.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            });
            return Resolution::Unresolved { suggestions };
        };

        let search_id = entry.search_id.clone().unwrap_or_default();
        sink.record(|| format!("exact match: {symbol} -> {search_id}"));

        let company_id = match self.directory.company_id(&search_id, sink) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("company id lookup for {symbol} failed: {err}");
                sink.record(|| format!("company id lookup failed: {err}"));
                None
            }
        };
        sink.record(|| match &company_id {
            Some(id) => format!("company id: {id}"),
            None => "company id unavailable; news and events will be refused".to_string(),
        });

        Resolution::Resolved(ResolvedSymbol {
            symbol,
            bse_code: entry.bse_code.clone(),
            search_id,
            company_id,
            title: entry.title.clone(),
        })
    }
}
