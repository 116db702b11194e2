//! Strategy selection for one document: rich first, degraded on failure.

use std::fmt;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::ContentStream;
use crate::parser::ExtractOptions;

use super::{DegradedExtractor, ExtractionStrategy, RichExtractor};

const DEGRADED_DISCLAIMER: &str = "This document was converted with basic text extraction. \
     Headings, lists, text styling and images may not have been preserved.";

/// Progress of a controller through one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Nothing attempted yet
    #[default]
    Idle,
    /// The rich strategy is running or has just failed
    RichExtractionAttempted,
    /// The rich strategy produced the result
    Success,
    /// The degraded strategy produced the result
    Degraded,
}

/// Why the degraded strategy was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// The rich strategy could not run
    Unavailable(String),
    /// The rich strategy failed on this document
    Failed(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Unavailable(why) => write!(f, "rich extraction unavailable: {}", why),
            DegradeReason::Failed(why) => write!(f, "rich extraction failed: {}", why),
        }
    }
}

/// Which strategy produced an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Full structure recovery
    Rich,
    /// Plain per-line text
    Degraded(DegradeReason),
}

impl ExtractionMode {
    /// Check if the result came from the fallback strategy.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionMode::Degraded(_))
    }
}

/// A document's content and the mode that produced it.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Ordered content
    pub stream: ContentStream,
    /// Producing strategy
    pub mode: ExtractionMode,
}

impl Extraction {
    /// Quality note to show the user, if the result is degraded.
    pub fn disclaimer(&self) -> Option<&'static str> {
        self.mode.is_degraded().then_some(DEGRADED_DISCLAIMER)
    }
}

/// Runs the rich strategy and falls back to the degraded one.
///
/// Load errors and documents without text are fatal and never retried.
pub struct ExtractionController {
    rich: Box<dyn ExtractionStrategy>,
    degraded: Box<dyn ExtractionStrategy>,
    state: ControllerState,
}

impl ExtractionController {
    /// Create a controller with the built-in strategies.
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_strategies(
            Box::new(RichExtractor::new(options)),
            Box::new(DegradedExtractor::new()),
        )
    }

    /// Create a controller over custom strategies.
    pub fn with_strategies(
        rich: Box<dyn ExtractionStrategy>,
        degraded: Box<dyn ExtractionStrategy>,
    ) -> Self {
        Self {
            rich,
            degraded,
            state: ControllerState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Extract a document.
    pub fn run(&mut self, data: &[u8]) -> Result<Extraction> {
        self.state = ControllerState::Idle;
        detect_format_from_bytes(data)?;

        let reason = if self.rich.is_available() {
            self.state = ControllerState::RichExtractionAttempted;
            match self.rich.extract(data) {
                Ok(stream) => {
                    ensure_text(&stream)?;
                    self.state = ControllerState::Success;
                    return Ok(Extraction {
                        stream,
                        mode: ExtractionMode::Rich,
                    });
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Strategy '{}' failed: {}", self.rich.name(), e);
                    DegradeReason::Failed(e.to_string())
                }
            }
        } else {
            DegradeReason::Unavailable(format!("strategy '{}' is not available", self.rich.name()))
        };

        log::warn!("Falling back to '{}' extraction ({})", self.degraded.name(), reason);
        let stream = self.degraded.extract(data)?;
        ensure_text(&stream)?;
        self.state = ControllerState::Degraded;

        Ok(Extraction {
            stream,
            mode: ExtractionMode::Degraded(reason),
        })
    }
}

fn ensure_text(stream: &ContentStream) -> Result<()> {
    if stream.stats().chars == 0 {
        return Err(Error::NoExtractableText);
    }
    Ok(())
}
