/// Category label used for expenses recorded without a category.
pub const UNCATEGORIZED_CATEGORY: &str = "Uncategorized";

/// Allocation bucket for holdings recorded without a type.
pub const OTHER_HOLDING_TYPE: &str = "other";

/// Length of the rolling window used by the financial summary, in days.
pub const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Maximum number of expense categories reported in a summary.
pub const TOP_CATEGORIES_LIMIT: usize = 5;

/// Default alert threshold (percent of limit) for new budgets.
pub const DEFAULT_BUDGET_ALERT_THRESHOLD: i32 = 80;

/// Currency symbol used when rendering amounts for the assistant.
pub const CURRENCY_SYMBOL: &str = "Rp";

/// Note attached to the contribution recorded for a goal's starting amount.
pub const INITIAL_CONTRIBUTION_NOTE: &str = "Initial amount";
