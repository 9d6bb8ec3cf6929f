use std::fmt;

use serde::{Deserialize, Serialize};

use crate::debug::DebugSink;
use crate::error::AppError;

/// Uniform return shape of every fetch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default)]
    pub debug_info: Vec<String>,
    #[serde(default)]
    pub error: Vec<String>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(data: T, debug_info: Vec<String>) -> Self {
        Self {
            data: Some(data),
            debug_info,
            error: Vec::new(),
        }
    }

    pub fn failure(error: Vec<String>, debug_info: Vec<String>) -> Self {
        Self {
            data: None,
            debug_info,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

/// Linear lifecycle of a single public call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    Start,
    Validating,
    Resolving,
    Fetching,
    Decoding,
    Done,
    Failed,
}

impl CallStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            CallStage::Start => "start",
            CallStage::Validating => "validating",
            CallStage::Resolving => "resolving",
            CallStage::Fetching => "fetching",
            CallStage::Decoding => "decoding",
            CallStage::Done => "done",
            CallStage::Failed => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, CallStage::Done | CallStage::Failed)
    }

    fn can_advance_to(self, next: CallStage) -> bool {
        use CallStage::*;
        matches!(
            (self, next),
            (Start, Validating)
                | (Validating, Resolving)
                | (Resolving, Fetching)
                | (Fetching, Decoding)
                | (Decoding, Fetching)
                | (Decoding, Done)
        ) || (next == Failed && !self.is_terminal())
    }
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one call through its stages and assembles the resulting envelope.
///
/// `Decoding -> Fetching` is allowed so batched history requests can run one
/// fetch/decode pair per batch within the same pass.
#[derive(Debug)]
pub struct CallTrace {
    operation: &'static str,
    stage: CallStage,
    sink: DebugSink,
}

impl CallTrace {
    pub fn begin(operation: &'static str, debug: bool) -> Self {
        let mut sink = DebugSink::new(debug, operation);
        sink.record(|| format!("{operation}: start"));
        Self {
            operation,
            stage: CallStage::Start,
            sink,
        }
    }

    pub fn stage(&self) -> CallStage {
        self.stage
    }

    pub fn sink(&mut self) -> &mut DebugSink {
        &mut self.sink
    }

    pub fn advance(&mut self, next: CallStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        let operation = self.operation;
        let previous = self.stage;
        self.stage = next;
        self.sink
            .record(|| format!("{operation}: {previous} -> {next}"));
    }

    pub fn note<F>(&mut self, line: F)
    where
        F: FnOnce() -> String,
    {
        self.sink.record(line);
    }

    pub fn finish<T>(mut self, data: T) -> ResponseEnvelope<T> {
        self.advance(CallStage::Done);
        ResponseEnvelope::success(data, self.sink.into_lines())
    }

    pub fn fail<T>(self, err: AppError) -> ResponseEnvelope<T> {
        self.fail_with(vec![err.envelope_entry()])
    }

    pub fn fail_with<T>(mut self, errors: Vec<String>) -> ResponseEnvelope<T> {
        let stage = self.stage;
        self.advance(CallStage::Failed);
        for entry in &errors {
            self.sink.record(|| format!("failed while {stage}: {entry}"));
        }
        log::warn!("{} failed while {}: {}", self.operation, stage, errors.join("; "));
        ResponseEnvelope::failure(errors, self.sink.into_lines())
    }
}
