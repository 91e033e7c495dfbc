use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ViewColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicView {
    pub name: String,
    pub columns: Vec<ViewColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataRangeHint {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub category_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListData {
    pub rows: Vec<CategoryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAddData {
    pub category_id: String,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub txn_id: String,
    pub posted_at: String,
    pub amount: f64,
    pub category: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListData {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub rows: Vec<TransactionRow>,
    pub data_range_hint: DataRangeHint,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionAddData {
    pub txn_id: String,
    pub posted_at: String,
    pub amount: f64,
    pub category: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportData {
    pub dry_run: bool,
    pub path: Option<String>,
    pub message: String,
    pub summary: ImportSummary,
    pub issues: Vec<ImportIssue>,
    pub categories_created: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetRow {
    pub budget_id: String,
    pub category: String,
    pub amount: f64,
    pub period: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetListData {
    pub rows: Vec<BudgetRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSetData {
    pub budget_id: String,
    pub category: String,
    pub amount: f64,
    pub period: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetRemoveData {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetProgressRow {
    pub budget_id: String,
    pub category: String,
    pub period: String,
    pub window_start: String,
    pub window_end: String,
    pub budget_amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetProgressData {
    pub as_of: String,
    pub rows: Vec<BudgetProgressRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShareRow {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightRow {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub action: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingAnalysisData {
    pub policy_version: String,
    pub as_of: String,
    pub window_start: String,
    pub total_spent: f64,
    pub average_daily: f64,
    pub previous_total: f64,
    /// Month-over-month change in percent. Serializes to `null` when there
    /// was no prior-window spend (the division is deliberately unguarded).
    pub monthly_comparison: f64,
    pub trend: String,
    pub top_categories: Vec<CategoryShareRow>,
    pub insights: Vec<InsightRow>,
    pub potential_savings: f64,
    pub data_range_hint: DataRangeHint,
}
