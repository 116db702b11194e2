//! Extraction options and configuration.

/// Options for extracting and classifying a document.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode for per-page failures
    pub error_mode: ErrorMode,

    /// Whether to extract page geometry in parallel
    pub parallel: bool,

    /// Classification thresholds
    pub thresholds: Thresholds,

    /// What list indentation is measured from
    pub margin_reference: MarginReference,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole extraction when a single page fails.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set classification thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the margin reference for list indentation.
    pub fn with_margin_reference(mut self, reference: MarginReference) -> Self {
        self.margin_reference = reference;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: false,
            thresholds: Thresholds::default(),
            margin_reference: MarginReference::PageBounds,
        }
    }
}

/// Error handling mode during geometry extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Log the failure and treat the page as empty
    #[default]
    Lenient,
}

/// Where list indentation is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginReference {
    /// The left edge of the page box
    #[default]
    PageBounds,
    /// The leftmost block on the page
    LeftmostBlock,
}

/// Empirical classification constants.
///
/// Size factors are multiples of the document's median font size; `indent`
/// is in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum indentation for a line to count as a list item
    pub indent: f32,
    /// Size factor above which a line is a level-1 heading
    pub heading1: f32,
    /// Size factor above which a line is a level-2 heading
    pub heading2: f32,
    /// Size factor above which a line is a level-3 heading
    pub heading3: f32,
    /// Vertical gap factor above which paragraphs are split
    pub paragraph_gap: f32,
}

impl Thresholds {
    /// Gap in points above which two lines belong to different paragraphs.
    pub fn paragraph_gap_points(&self, median_font_size: f32) -> f32 {
        median_font_size * self.paragraph_gap
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            indent: 20.0,
            heading1: 1.5,
            heading2: 1.3,
            heading3: 1.1,
            paragraph_gap: 1.2,
        }
    }
}
