//! Job family label parsing and validation
//!
//! The remote service filters on an exact text label (its `industry` query
//! parameter). No normalization is applied beyond trimming surrounding whitespace.

use std::fmt;

/// Job family label identifying which partition of listings to retrieve
///
/// # Examples
///
/// ```
/// use skillbridge_extractor::Category;
///
/// let category = Category::parse("  Healthcare ").unwrap();
/// assert_eq!(category.as_str(), "Healthcare");
/// assert!(Category::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    /// Parse a label, rejecting empty or whitespace-only input
    ///
    /// Case and inner spacing are preserved exactly; the label must match
    /// what the SkillBridge site shows.
    pub fn parse(s: &str) -> Result<Self, CategoryError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Label as sent to the API
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label made safe for use in a file name
    ///
    /// Spaces become `_`; path separators, `:` and `..` are neutralized.
    pub fn file_label(&self) -> String {
        self.0
            .replace("..", "__")
            .replace([' ', '/', '\\', ':'], "_")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Category errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    /// No label was given
    #[error("job family cannot be empty")]
    Empty,
}
