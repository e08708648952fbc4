//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `E301` for an error, `W101` for a warning).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
    /// Informational diagnostics, prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// A channel span with zero total tracks was floored to one track.
    pub const ZERO_CHANNEL_CAPACITY: Self = Self::new(Category::Warning, 101);
    /// Bounding-box wirelength estimate report.
    pub const WIRELENGTH_ESTIMATE: Self = Self::new(Category::Note, 201);
    /// Which bounding-box form the engine selected.
    pub const BOUNDING_BOX_FORM: Self = Self::new(Category::Note, 202);
    /// Recomputed bounding-box cost diverged from the tracked total.
    pub const BB_COST_DRIFT: Self = Self::new(Category::Error, 301);
    /// Recomputed timing cost diverged from the tracked total.
    pub const TIMING_COST_DRIFT: Self = Self::new(Category::Error, 302);
    /// A committed bounding box disagreed with a from-scratch rebuild.
    pub const VERIFICATION_MISMATCH: Self = Self::new(Category::Error, 303);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
