//! Page request parameters for `Location/Lookup`
//!
//! Everything except `start`, `length` and `industry` is a fixed protocol
//! constant taken from the SkillBridge site's own DataTables requests.

use crate::Category;

/// DataTables draw counter
pub const DRAW: u32 = 1;

/// Sort column index
pub const ORDER_COLUMN: u32 = 19;

/// Sort direction
pub const ORDER_DIR: &str = "asc";

/// Requested columns, in display order
pub const COLUMNS: [&str; 19] = [
    "Organization",
    "Program",
    "Branch",
    "City",
    "State",
    "Zip",
    "Duration",
    "EmployerPoc",
    "EmployerPocEmail",
    "DeliveryMethodId",
    "Installation",
    "LocationStates",
    "TargetMOCs",
    "OtherEligibilityFactors",
    "Other",
    "JobDescription",
    "Summary",
    "Industries",
    "Distance",
];

/// Device descriptor sent with every request
pub const DEVICE: &str = "platform:Windows,browser:Chrome";

/// Mobile flag sent with every request
pub const MOBILE: &str = "false";

/// `colMatrix` value: `1-Organization,2-Program,...,19-Distance`
pub fn column_matrix() -> String {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}-{}", i + 1, name))
        .collect::<Vec<_>>()
        .join(",")
}

/// One page of a category query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    category: Category,
    page_index: u64,
    page_size: u64,
}

impl PageRequest {
    /// Create a request for `page_index` (0-based)
    pub fn new(category: Category, page_index: u64, page_size: u64) -> Self {
        Self {
            category,
            page_index,
            page_size,
        }
    }

    /// Category being queried
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// 0-based page index
    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// Records per page
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Record offset of this page
    pub fn start(&self) -> u64 {
        self.page_index * self.page_size
    }

    /// Query string parameters in wire order
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("draw", DRAW.to_string()),
            ("order[0][column]", ORDER_COLUMN.to_string()),
            ("order[0][dir]", ORDER_DIR.to_string()),
            ("start", self.start().to_string()),
            ("length", self.page_size.to_string()),
            ("search[value]", String::new()),
            ("industry", self.category.as_str().to_string()),
            ("colMatrix", column_matrix()),
            ("device", DEVICE.to_string()),
            ("mobile", MOBILE.to_string()),
        ]
    }
}
