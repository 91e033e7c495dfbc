use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};

use crate::insights::policy::{INSIGHTS_POLICY_V1, InsightPolicy};
use crate::insights::types::{LedgerTransaction, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Tip,
    Warning,
    Achievement,
}

impl InsightKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Warning => "warning",
            Self::Achievement => "achievement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl InsightPriority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl SpendTrend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone)]
pub struct SpendingInsight {
    pub id: String,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub action: String,
    pub priority: InsightPriority,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SpendingAnalysis {
    pub window_start: NaiveDate,
    pub total_spent: f64,
    pub average_daily: f64,
    pub previous_total: f64,
    pub monthly_comparison: f64,
    pub trend: SpendTrend,
    pub top_categories: Vec<CategorySpend>,
    pub insights: Vec<SpendingInsight>,
    pub potential_savings: f64,
}

pub fn analyze_spending(transactions: &[LedgerTransaction], as_of: NaiveDate) -> SpendingAnalysis {
    analyze_spending_with_policy(transactions, as_of, INSIGHTS_POLICY_V1)
}

fn analyze_spending_with_policy(
    transactions: &[LedgerTransaction],
    as_of: NaiveDate,
    policy: InsightPolicy,
) -> SpendingAnalysis {
    let window_days = Duration::days(policy.recent_window_days);
    let recent_start = as_of - window_days;
    let previous_start = recent_start - window_days;

    let recent = transactions
        .iter()
        .filter(|transaction| {
            transaction.is_expense()
                && transaction.posted_at > recent_start
                && transaction.posted_at <= as_of
        })
        .collect::<Vec<&LedgerTransaction>>();
    let previous = transactions
        .iter()
        .filter(|transaction| {
            transaction.is_expense()
                && transaction.posted_at > previous_start
                && transaction.posted_at <= recent_start
        })
        .collect::<Vec<&LedgerTransaction>>();

    let total_spent = recent
        .iter()
        .map(|transaction| transaction.abs_amount())
        .sum::<f64>();
    let previous_total = previous
        .iter()
        .map(|transaction| transaction.abs_amount())
        .sum::<f64>();
    let average_daily = total_spent / policy.recent_window_days as f64;

    // Deliberately unguarded: with no prior-window spend this is non-finite
    // (inf, or NaN when both windows are empty). Downstream comparisons fall
    // out of IEEE semantics and JSON output renders it as null.
    let monthly_comparison = (total_spent - previous_total) / previous_total * 100.0;

    let trend = if monthly_comparison > policy.trend_band {
        SpendTrend::Increasing
    } else if monthly_comparison < -policy.trend_band {
        SpendTrend::Decreasing
    } else {
        SpendTrend::Stable
    };

    let top_categories = top_categories(&recent, total_spent, policy.top_category_limit);

    let mut insights: Vec<SpendingInsight> = Vec::new();
    let mut potential_savings = 0.0;
    let mut used_concentration_ids: BTreeSet<String> = BTreeSet::new();

    for category in &top_categories {
        if category.percentage > policy.concentration_share {
            potential_savings += category.amount * policy.concentration_savings_rate;
            insights.push(SpendingInsight {
                id: concentration_insight_id(&category.category, &mut used_concentration_ids),
                kind: InsightKind::Warning,
                title: format!("High {} spending", category.category),
                description: format!(
                    "{} makes up {:.1}% of your spending over the last 30 days.",
                    category.category, category.percentage
                ),
                action: format!("Set a {} budget to keep this in check.", category.category),
                priority: InsightPriority::High,
                category: Some(category.category.clone()),
                amount: Some(category.amount),
                percentage: Some(category.percentage),
            });
        }
    }

    if average_daily > policy.high_daily_spend {
        let window_spend = policy.recent_window_days as f64 * average_daily;
        potential_savings += window_spend * policy.daily_savings_rate;
        insights.push(SpendingInsight {
            id: "high_daily_spend".to_string(),
            kind: InsightKind::Warning,
            title: "High daily spending".to_string(),
            description: format!(
                "You are averaging ${average_daily:.2} per day over the last 30 days."
            ),
            action: "Review recent purchases and trim non-essentials.".to_string(),
            priority: InsightPriority::High,
            category: None,
            amount: Some(round_to(average_daily, 2)),
            percentage: None,
        });
    }

    if monthly_comparison > policy.comparison_increase {
        insights.push(SpendingInsight {
            id: "spending_increase".to_string(),
            kind: InsightKind::Warning,
            title: "Spending is trending up".to_string(),
            description: format!(
                "You spent {:.1}% more than in the previous 30 days.",
                monthly_comparison
            ),
            action: "Compare the two periods to find what changed.".to_string(),
            priority: InsightPriority::Medium,
            category: None,
            amount: None,
            percentage: Some(round_to(monthly_comparison, 1)),
        });
    } else if monthly_comparison < policy.comparison_decrease {
        insights.push(SpendingInsight {
            id: "spending_decrease".to_string(),
            kind: InsightKind::Achievement,
            title: "Spending is trending down".to_string(),
            description: format!(
                "You spent {:.1}% less than in the previous 30 days.",
                monthly_comparison.abs()
            ),
            action: "Keep it up and move the difference into savings.".to_string(),
            priority: InsightPriority::Low,
            category: None,
            amount: None,
            percentage: Some(round_to(monthly_comparison, 1)),
        });
    }

    if let Some(leader) = top_categories.first()
        && leader.percentage > policy.diversification_share
    {
        insights.push(SpendingInsight {
            id: "diversify_spending".to_string(),
            kind: InsightKind::Tip,
            title: "Spending is concentrated".to_string(),
            description: format!(
                "{} alone is {:.1}% of your recent spending.",
                leader.category, leader.percentage
            ),
            action: "Spread spending across categories to soften single-category shocks."
                .to_string(),
            priority: InsightPriority::Medium,
            category: Some(leader.category.clone()),
            amount: Some(leader.amount),
            percentage: Some(leader.percentage),
        });
    }

    let small_purchases = recent
        .iter()
        .filter(|transaction| transaction.abs_amount() < policy.small_purchase_ceiling)
        .collect::<Vec<&&LedgerTransaction>>();
    if small_purchases.len() > policy.small_purchase_count {
        let small_total = small_purchases
            .iter()
            .map(|transaction| transaction.abs_amount())
            .sum::<f64>();
        insights.push(SpendingInsight {
            id: "small_purchases".to_string(),
            kind: InsightKind::Tip,
            title: "Small purchases add up".to_string(),
            description: format!(
                "{} purchases under ${:.0} total ${small_total:.2} over the last 30 days.",
                small_purchases.len(),
                policy.small_purchase_ceiling
            ),
            action: "Batch small buys or set a weekly cash allowance.".to_string(),
            priority: InsightPriority::Medium,
            category: None,
            amount: Some(round_to(small_total, 2)),
            percentage: None,
        });
    }

    insights.sort_by_key(|insight| insight.priority.rank());

    SpendingAnalysis {
        window_start: recent_start + Duration::days(1),
        total_spent: round_to(total_spent, 2),
        average_daily: round_to(average_daily, 2),
        previous_total: round_to(previous_total, 2),
        monthly_comparison: round_to(monthly_comparison, 1),
        trend,
        top_categories,
        insights,
        potential_savings: round_to(potential_savings.min(policy.savings_cap(total_spent)), 2),
    }
}

fn top_categories(
    recent: &[&LedgerTransaction],
    total_spent: f64,
    limit: usize,
) -> Vec<CategorySpend> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for transaction in recent {
        *totals.entry(transaction.category_label()).or_insert(0.0) += transaction.abs_amount();
    }

    let mut categories = totals
        .into_iter()
        .map(|(category, amount)| {
            let percentage = if total_spent > 0.0 {
                amount / total_spent * 100.0
            } else {
                0.0
            };
            CategorySpend {
                category: category.to_string(),
                amount: round_to(amount, 2),
                percentage: round_to(percentage, 1),
            }
        })
        .collect::<Vec<CategorySpend>>();

    // BTreeMap iteration gives name order; the stable sort keeps it as the
    // tiebreak for equal amounts.
    categories.sort_by(|left, right| right.amount.total_cmp(&left.amount));
    categories.truncate(limit);
    categories
}

/// Ids stay unique even when distinct names share a slug ("Café" and
/// "Caf" both reduce to `caf`); later collisions take a numeric suffix.
fn concentration_insight_id(category: &str, used: &mut BTreeSet<String>) -> String {
    let mut slug = slugify(category);
    if slug.is_empty() {
        slug = "category".to_string();
    }
    let base = format!("category_concentration_{slug}");
    let mut id = base.clone();
    let mut suffix = 2;
    while !used.insert(id.clone()) {
        id = format!("{base}_{suffix}");
        suffix += 1;
    }
    id
}

fn slugify(value: &str) -> String {
    let mut slug = String::new();
    let mut previous_underscore = false;
    for character in value.trim().chars() {
        if character.is_ascii_alphanumeric() {
            slug.push(character.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !slug.is_empty() {
            slug.push('_');
            previous_underscore = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::insights::analysis::{
        InsightKind, InsightPriority, SpendTrend, analyze_spending, slugify,
    };
    use crate::insights::types::LedgerTransaction;

    const AS_OF: &str = "2026-03-31";

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn expense(posted_at: &str, amount: f64, category: &str) -> LedgerTransaction {
        LedgerTransaction {
            txn_id: format!("txn_{posted_at}_{category}_{amount}"),
            posted_at: date(posted_at),
            amount,
            category_id: Some(format!("cat_{}", slugify(category))),
            category: Some(category.to_string()),
            description: String::new(),
        }
    }

    #[test]
    fn empty_input_yields_a_zeroed_analysis() {
        let analysis = analyze_spending(&[], date(AS_OF));
        assert!((analysis.total_spent - 0.0).abs() < f64::EPSILON);
        assert!((analysis.average_daily - 0.0).abs() < f64::EPSILON);
        assert!(analysis.top_categories.is_empty());
        assert!(analysis.insights.is_empty());
        assert!((analysis.potential_savings - 0.0).abs() < f64::EPSILON);
        assert_eq!(analysis.trend, SpendTrend::Stable);
    }

    #[test]
    fn concentrated_category_emits_high_priority_warning_with_share() {
        // 35% of a $1000 recent spend sits in Dining.
        let rows = vec![
            expense("2026-03-05", -350.0, "Dining"),
            expense("2026-03-08", -300.0, "Rent"),
            expense("2026-03-12", -200.0, "Utilities"),
            expense("2026-03-20", -150.0, "Fun"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert!((analysis.total_spent - 1000.0).abs() < f64::EPSILON);

        let dining = analysis
            .insights
            .iter()
            .find(|insight| insight.id == "category_concentration_dining");
        assert!(dining.is_some());
        if let Some(insight) = dining {
            assert_eq!(insight.kind, InsightKind::Warning);
            assert_eq!(insight.priority, InsightPriority::High);
            assert!(insight.title.contains("Dining"));
            assert_eq!(insight.percentage, Some(35.0));
        }
    }

    #[test]
    fn concentration_ids_stay_unique_when_names_share_a_slug() {
        // "Café" and "Caf" both slugify to `caf`; each exceeds the 30% share.
        let rows = vec![
            expense("2026-03-05", -400.0, "Café"),
            expense("2026-03-08", -350.0, "Caf"),
            expense("2026-03-12", -250.0, "Rent"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        let concentration_ids = analysis
            .insights
            .iter()
            .filter(|insight| insight.id.starts_with("category_concentration_"))
            .map(|insight| insight.id.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(
            concentration_ids,
            vec!["category_concentration_caf", "category_concentration_caf_2"]
        );
    }

    #[test]
    fn potential_savings_never_exceeds_thirty_percent_of_total_spend() {
        // Everything in one category and a high daily average, so both
        // savings contributions fire and together exceed the cap.
        let rows = vec![
            expense("2026-03-03", -1000.0, "Travel"),
            expense("2026-03-13", -1000.0, "Travel"),
            expense("2026-03-23", -1000.0, "Travel"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert!((analysis.total_spent - 3000.0).abs() < f64::EPSILON);
        assert!((analysis.potential_savings - 900.0).abs() < 0.01);
        assert!(analysis.potential_savings <= analysis.total_spent * 0.3 + f64::EPSILON);
    }

    #[test]
    fn rising_spend_classifies_increasing_and_emits_warning() {
        let rows = vec![
            expense("2026-02-10", -500.0, "Groceries"),
            expense("2026-03-15", -600.0, "Groceries"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert_eq!(analysis.trend, SpendTrend::Increasing);
        assert!((analysis.monthly_comparison - 20.0).abs() < 0.01);
        assert!(
            analysis
                .insights
                .iter()
                .any(|insight| insight.id == "spending_increase"
                    && insight.priority == InsightPriority::Medium)
        );
    }

    #[test]
    fn falling_spend_classifies_decreasing_and_emits_achievement() {
        let rows = vec![
            expense("2026-02-10", -500.0, "Groceries"),
            expense("2026-03-15", -400.0, "Groceries"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert_eq!(analysis.trend, SpendTrend::Decreasing);
        let achievement = analysis
            .insights
            .iter()
            .find(|insight| insight.id == "spending_decrease");
        assert!(achievement.is_some());
        if let Some(insight) = achievement {
            assert_eq!(insight.kind, InsightKind::Achievement);
            assert_eq!(insight.priority, InsightPriority::Low);
        }
    }

    #[test]
    fn no_prior_spend_leaves_the_comparison_non_finite() {
        let rows = vec![expense("2026-03-15", -100.0, "Groceries")];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert!(!analysis.monthly_comparison.is_finite());
        // inf > threshold holds, so the trend still reads increasing.
        assert_eq!(analysis.trend, SpendTrend::Increasing);
    }

    #[test]
    fn many_small_purchases_emit_the_small_purchases_tip() {
        let mut rows = Vec::new();
        for day in 1..=21 {
            let category = match day % 4 {
                0 => "Coffee",
                1 => "Snacks",
                2 => "Transit",
                _ => "Apps",
            };
            rows.push(expense(&format!("2026-03-{day:02}"), -5.0, category));
        }

        let analysis = analyze_spending(&rows, date(AS_OF));
        let tip = analysis
            .insights
            .iter()
            .find(|insight| insight.id == "small_purchases");
        assert!(tip.is_some());
        if let Some(insight) = tip {
            assert_eq!(insight.kind, InsightKind::Tip);
            assert_eq!(insight.amount, Some(105.0));
        }
    }

    #[test]
    fn insights_are_sorted_high_to_low_priority() {
        // Concentration (high) + diversification (medium) + decrease (low).
        let rows = vec![
            expense("2026-02-10", -2000.0, "Rent"),
            expense("2026-03-15", -700.0, "Rent"),
            expense("2026-03-18", -300.0, "Groceries"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert!(analysis.insights.len() >= 3);
        let ranks = analysis
            .insights
            .iter()
            .map(|insight| insight.priority.rank())
            .collect::<Vec<u8>>();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn top_categories_are_capped_at_five_and_sorted_by_amount() {
        let rows = vec![
            expense("2026-03-02", -600.0, "Rent"),
            expense("2026-03-03", -500.0, "Groceries"),
            expense("2026-03-04", -400.0, "Dining"),
            expense("2026-03-05", -300.0, "Transit"),
            expense("2026-03-06", -200.0, "Fun"),
            expense("2026-03-07", -100.0, "Books"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert_eq!(analysis.top_categories.len(), 5);
        assert_eq!(analysis.top_categories[0].category, "Rent");
        assert!(
            analysis
                .top_categories
                .iter()
                .all(|share| share.category != "Books")
        );
    }

    #[test]
    fn uncategorized_rows_group_under_the_fallback_label() {
        let mut row = expense("2026-03-10", -100.0, "ignored");
        row.category = None;
        row.category_id = None;

        let analysis = analyze_spending(&[row], date(AS_OF));
        assert_eq!(analysis.top_categories.len(), 1);
        assert_eq!(analysis.top_categories[0].category, "Uncategorized");
    }

    #[test]
    fn income_rows_are_excluded_from_both_windows() {
        let rows = vec![
            expense("2026-03-10", -100.0, "Groceries"),
            expense("2026-03-11", 250.0, "Groceries"),
            expense("2026-02-10", 400.0, "Groceries"),
        ];

        let analysis = analyze_spending(&rows, date(AS_OF));
        assert!((analysis.total_spent - 100.0).abs() < f64::EPSILON);
        assert!((analysis.previous_total - 0.0).abs() < f64::EPSILON);
    }
}
