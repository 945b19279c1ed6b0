//! Renders a `FinancialSummary` as the Indonesian prompt block given to the assistant.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::CURRENCY_SYMBOL;

use super::insights_model::FinancialSummary;

const BANNER: &str = "═══════════════════════════════════════════════════════";

/// Formats an amount as Rupiah with Indonesian separators: `Rp 1.500.000,5`.
///
/// At most three fraction digits are kept, trailing zeros dropped.
pub fn format_idr(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = format!("{} ", CURRENCY_SYMBOL);
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

fn status_emoji(percentage: i64) -> &'static str {
    if percentage >= 90 {
        "🔴"
    } else if percentage >= 70 {
        "🟡"
    } else {
        "🟢"
    }
}

/// Sections without rows are omitted; the portfolio section only appears when
/// the portfolio has a positive value.
pub fn format_financial_context(summary: &FinancialSummary) -> String {
    let overview = &summary.overview;
    let mut lines: Vec<String> = vec![
        String::new(),
        BANNER.to_string(),
        "SNAPSHOT KEUANGAN PENGGUNA (Data Real-time)".to_string(),
        BANNER.to_string(),
        String::new(),
        format!(
            "📊 RINGKASAN PENDAPATAN & PENGELUARAN ({} - {}):",
            overview.period_start, overview.period_end
        ),
        format!("• Total Pendapatan: {}", format_idr(overview.total_income)),
        format!("• Total Pengeluaran: {}", format_idr(overview.total_expense)),
        format!("• Net Savings: {}", format_idr(overview.net_savings)),
        format!("• Saving Rate: {}%", summary.saving_rate()),
    ];

    if !summary.top_categories.is_empty() {
        lines.push(String::new());
        lines.push("📈 TOP KATEGORI PENGELUARAN:".to_string());
        lines.extend(summary.top_categories.iter().enumerate().map(|(i, category)| {
            format!(
                "{}. {}: {} ({}%) {}",
                i + 1,
                category.category,
                format_idr(category.total),
                category.percentage,
                category.trend.emoji()
            )
        }));
    }

    let portfolio = &summary.portfolio;
    if portfolio.total_value > Decimal::ZERO {
        let sign = if portfolio.gain_loss >= Decimal::ZERO { "+" } else { "" };
        let allocation = portfolio
            .allocation
            .iter()
            .map(|(holding_type, value)| format!("{}: {}", holding_type, format_idr(*value)))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(String::new());
        lines.push("💼 RINGKASAN PORTOFOLIO:".to_string());
        lines.push(format!("• Total Nilai: {}", format_idr(portfolio.total_value)));
        lines.push(format!("• Gain/Loss: {}{}", sign, format_idr(portfolio.gain_loss)));
        lines.push(format!("• Alokasi: {}", allocation));
    }

    if !summary.budgets.is_empty() {
        lines.push(String::new());
        lines.push("💵 BUDGET AKTIF:".to_string());
        lines.extend(summary.budgets.iter().map(|budget| {
            format!(
                "• {}: {} / {} ({}%) {}",
                budget.category,
                format_idr(budget.spent),
                format_idr(budget.limit),
                budget.percentage,
                status_emoji(budget.percentage)
            )
        }));
    }

    if !summary.goals.is_empty() {
        lines.push(String::new());
        lines.push("🎯 SAVING GOALS:".to_string());
        lines.extend(summary.goals.iter().map(|goal| {
            let days = match goal.days_remaining {
                Some(days) => format!("{} hari tersisa", days),
                None => "Tanpa deadline".to_string(),
            };
            format!("• {}: {}% tercapai ({})", goal.name, goal.progress, days)
        }));
    }

    lines.push(String::new());
    lines.push(BANNER.to_string());
    lines.push("Gunakan data di atas untuk memberikan saran yang dipersonalisasi.".to_string());
    lines.push(BANNER.to_string());
    // Trailing newline after the closing banner.
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{
        BudgetSummary, CategorySummary, CategoryTrend, FinancialOverview, GoalSummary,
        PortfolioSummary,
    };
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn overview() -> FinancialOverview {
        FinancialOverview {
            total_income: dec!(500000),
            total_expense: dec!(150000),
            net_savings: dec!(350000),
            period_start: "18/2/2026".to_string(),
            period_end: "20/3/2026".to_string(),
        }
    }

    fn empty_summary() -> FinancialSummary {
        FinancialSummary {
            overview: FinancialOverview::empty("1/1/2026".to_string(), "31/1/2026".to_string()),
            top_categories: Vec::new(),
            portfolio: PortfolioSummary::default(),
            budgets: Vec::new(),
            goals: Vec::new(),
        }
    }

    #[test]
    fn idr_uses_indonesian_separators() {
        assert_eq!(format_idr(dec!(0)), "Rp 0");
        assert_eq!(format_idr(dec!(999)), "Rp 999");
        assert_eq!(format_idr(dec!(1000)), "Rp 1.000");
        assert_eq!(format_idr(dec!(1500000)), "Rp 1.500.000");
        assert_eq!(format_idr(dec!(1234567.5)), "Rp 1.234.567,5");
        assert_eq!(format_idr(dec!(12.34567)), "Rp 12,346");
        assert_eq!(format_idr(dec!(100.000)), "Rp 100");
        assert_eq!(format_idr(dec!(-50000)), "Rp -50.000");
    }

    #[test]
    fn zero_state_only_has_overview() {
        let text = format_financial_context(&empty_summary());
        assert!(text.starts_with(&format!(
            "\n{}\nSNAPSHOT KEUANGAN PENGGUNA (Data Real-time)\n{}\n\n📊",
            BANNER, BANNER
        )));
        assert!(text.contains("📊 RINGKASAN PENDAPATAN & PENGELUARAN (1/1/2026 - 31/1/2026):"));
        assert!(text.contains("• Total Pendapatan: Rp 0"));
        assert!(text.contains("• Saving Rate: 0%"));
        assert!(!text.contains("TOP KATEGORI"));
        assert!(!text.contains("PORTOFOLIO"));
        assert!(!text.contains("BUDGET AKTIF"));
        assert!(!text.contains("SAVING GOALS"));
        assert!(text.ends_with(&format!(
            "{}\nGunakan data di atas untuk memberikan saran yang dipersonalisasi.\n{}\n",
            BANNER, BANNER
        )));
    }

    #[test]
    fn full_summary_renders_every_section() {
        let mut allocation = BTreeMap::new();
        allocation.insert("stock".to_string(), dec!(1000000));
        allocation.insert("crypto".to_string(), dec!(250000));
        let summary = FinancialSummary {
            overview: overview(),
            top_categories: vec![CategorySummary {
                category: "Food".to_string(),
                total: dec!(150000),
                percentage: 100,
                trend: CategoryTrend::Stable,
            }],
            portfolio: PortfolioSummary {
                total_value: dec!(1250000),
                allocation,
                gain_loss: dec!(50000),
            },
            budgets: vec![
                BudgetSummary {
                    category: "Food".to_string(),
                    limit: dec!(200000),
                    spent: dec!(150000),
                    remaining: dec!(50000),
                    percentage: 75,
                },
                BudgetSummary {
                    category: "Fun".to_string(),
                    limit: dec!(100000),
                    spent: dec!(95000),
                    remaining: dec!(5000),
                    percentage: 95,
                },
                BudgetSummary {
                    category: "Rent".to_string(),
                    limit: dec!(100000),
                    spent: dec!(0),
                    remaining: dec!(100000),
                    percentage: 0,
                },
            ],
            goals: vec![
                GoalSummary {
                    name: "Laptop".to_string(),
                    progress: 40,
                    days_remaining: Some(12),
                },
                GoalSummary {
                    name: "Dana Darurat".to_string(),
                    progress: 10,
                    days_remaining: None,
                },
            ],
        };

        let text = format_financial_context(&summary);
        assert!(text.contains("• Net Savings: Rp 350.000"));
        assert!(text.contains("• Saving Rate: 70%"));
        assert!(text.contains("1. Food: Rp 150.000 (100%) ➡️"));
        assert!(text.contains("• Total Nilai: Rp 1.250.000"));
        assert!(text.contains("• Gain/Loss: +Rp 50.000"));
        assert!(text.contains("• Alokasi: crypto: Rp 250.000, stock: Rp 1.000.000"));
        assert!(text.contains("• Food: Rp 150.000 / Rp 200.000 (75%) 🟡"));
        assert!(text.contains("• Fun: Rp 95.000 / Rp 100.000 (95%) 🔴"));
        assert!(text.contains("• Rent: Rp 0 / Rp 100.000 (0%) 🟢"));
        assert!(text.contains("• Laptop: 40% tercapai (12 hari tersisa)"));
        assert!(text.contains("• Dana Darurat: 10% tercapai (Tanpa deadline)"));

        let sections = ["📊", "📈 TOP", "💼", "💵", "🎯"];
        let positions: Vec<usize> = sections.iter().filter_map(|s| text.find(s)).collect();
        assert_eq!(positions.len(), sections.len());
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn negative_gain_has_no_plus_sign() {
        let mut summary = empty_summary();
        summary.portfolio = PortfolioSummary {
            total_value: dec!(100),
            allocation: BTreeMap::new(),
            gain_loss: dec!(-20),
        };
        let text = format_financial_context(&summary);
        assert!(text.contains("• Gain/Loss: Rp -20"));
    }

    #[test]
    fn trend_emojis() {
        assert_eq!(CategoryTrend::Up.emoji(), "📈");
        assert_eq!(CategoryTrend::Down.emoji(), "📉");
        assert_eq!(CategoryTrend::Stable.emoji(), "➡️");
    }
}
