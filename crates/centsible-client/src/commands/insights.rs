use std::path::{Path, PathBuf};

use crate::commands::common::data_range_hint;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CategoryShareRow, InsightRow, SpendingAnalysisData};
use crate::insights::analysis::analyze_spending;
use crate::insights::date::{format_iso_date, resolve_as_of};
use crate::insights::policy::INSIGHTS_POLICY_VERSION;
use crate::insights::query::load_transactions;
use crate::insights::types::TransactionFilter;
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::ClientResult;

#[derive(Debug, Default)]
pub struct InsightsRunOptions<'a> {
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(as_of: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(InsightsRunOptions {
        as_of,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: InsightsRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let as_of = resolve_as_of(options.as_of.as_deref(), "insights")?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let transactions = load_transactions(&db_path, &TransactionFilter::default())?;

    let analysis = analyze_spending(&transactions, as_of);

    let top_categories = analysis
        .top_categories
        .iter()
        .map(|share| CategoryShareRow {
            category: share.category.clone(),
            amount: share.amount,
            percentage: share.percentage,
        })
        .collect::<Vec<CategoryShareRow>>();

    let insights = analysis
        .insights
        .iter()
        .map(|insight| InsightRow {
            id: insight.id.clone(),
            kind: insight.kind.as_str().to_string(),
            title: insight.title.clone(),
            description: insight.description.clone(),
            action: insight.action.clone(),
            priority: insight.priority.as_str().to_string(),
            category: insight.category.clone(),
            amount: insight.amount,
            percentage: insight.percentage,
        })
        .collect::<Vec<InsightRow>>();

    success(
        "insights",
        SpendingAnalysisData {
            policy_version: INSIGHTS_POLICY_VERSION.to_string(),
            as_of: format_iso_date(&as_of),
            window_start: format_iso_date(&analysis.window_start),
            total_spent: analysis.total_spent,
            average_daily: analysis.average_daily,
            previous_total: analysis.previous_total,
            monthly_comparison: analysis.monthly_comparison,
            trend: analysis.trend.as_str().to_string(),
            top_categories,
            insights,
            potential_savings: analysis.potential_savings,
            data_range_hint: data_range_hint(&setup.data_range),
        },
    )
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    if let Some(path) = home_override {
        return ensure_initialized_at(path);
    }
    ensure_initialized()
}
