/// Collects human-readable trace lines for a single call.
///
/// Call sites record unconditionally; an inactive sink drops the closure
/// without evaluating it, so disabled tracing costs nothing beyond the call.
/// Active sinks also mirror each line to the `log` facade at debug level.
#[derive(Debug, Default, Clone)]
pub struct DebugSink {
    lines: Option<Vec<String>>,
    scope: &'static str,
}

impl DebugSink {
    pub fn new(enabled: bool, scope: &'static str) -> Self {
        Self {
            lines: enabled.then(Vec::new),
            scope,
        }
    }

    pub fn active(scope: &'static str) -> Self {
        Self::new(true, scope)
    }

    pub fn disabled() -> Self {
        Self::new(false, "")
    }

    pub fn is_active(&self) -> bool {
        self.lines.is_some()
    }

    pub fn record<F>(&mut self, line: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(lines) = self.lines.as_mut() {
            let line = line();
            log::debug!(target: "nse_ticker::trace", "[{}] {}", self.scope, line);
            lines.push(line);
        }
    }

    /// Append lines gathered elsewhere (e.g. during resolution).
    pub fn extend<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(existing) = self.lines.as_mut() {
            existing.extend(lines);
        }
    }

    pub fn lines(&self) -> &[String] {
        self.lines.as_deref().unwrap_or(&[])
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.unwrap_or_default()
    }
}
