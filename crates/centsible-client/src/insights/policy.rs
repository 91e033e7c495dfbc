/// Deterministic insight-generation policy identifier.
///
/// Emitted with analysis results so future threshold changes remain auditable
/// and easy to reason about in diffs and support/debug sessions.
pub const INSIGHTS_POLICY_VERSION: &str = "insights/v1";

/// v1 spending-insight policy.
///
/// Notes:
/// - Share and comparison thresholds are percentages (0..100 scale).
/// - Savings rates are fractions of the amounts they apply to; the cap is a
///   fraction of total 30-day spend and always wins.
#[derive(Debug, Clone, Copy)]
pub struct InsightPolicy {
    pub recent_window_days: i64,
    pub top_category_limit: usize,
    pub concentration_share: f64,
    pub diversification_share: f64,
    pub high_daily_spend: f64,
    pub comparison_increase: f64,
    pub comparison_decrease: f64,
    pub trend_band: f64,
    pub small_purchase_ceiling: f64,
    pub small_purchase_count: usize,
    pub concentration_savings_rate: f64,
    pub daily_savings_rate: f64,
    pub savings_cap_rate: f64,
    pub budget_warning_percentage: f64,
    pub budget_over_percentage: f64,
}

impl InsightPolicy {
    pub fn savings_cap(self, total_spent: f64) -> f64 {
        total_spent * self.savings_cap_rate
    }
}

pub const INSIGHTS_POLICY_V1: InsightPolicy = InsightPolicy {
    recent_window_days: 30,
    top_category_limit: 5,
    concentration_share: 30.0,
    diversification_share: 40.0,
    high_daily_spend: 50.0,
    comparison_increase: 10.0,
    comparison_decrease: -10.0,
    trend_band: 5.0,
    small_purchase_ceiling: 10.0,
    small_purchase_count: 20,
    concentration_savings_rate: 0.20,
    daily_savings_rate: 0.15,
    savings_cap_rate: 0.30,
    budget_warning_percentage: 80.0,
    budget_over_percentage: 100.0,
};
