//! Final report assembly and insight statements

use crate::reconcile::{ReconciledRow, ReconciledTable, TrendDirection};
use crate::signals::AuxiliarySignals;
use trend_math::stats::round_to;

/// A reconciled row joined with the auxiliary signals
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub reconciled: ReconciledRow,
    pub sentiment_label: Option<String>,
    pub trend_strength_score: Option<f64>,
    pub yearly_avg_interest: Option<f64>,
}

impl ReportRow {
    pub fn keyword(&self) -> &str {
        &self.reconciled.keyword
    }
}

/// Left-joins signals onto the reconciled table and derives insights
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAggregator;

impl ReportAggregator {
    /// Join every reconciled row with whatever signals exist for its keyword
    ///
    /// Row order follows the table; a missing signal leaves its field empty.
    pub fn aggregate(&self, table: &ReconciledTable, signals: &AuxiliarySignals) -> Vec<ReportRow> {
        table
            .rows()
            .iter()
            .map(|row| ReportRow {
                reconciled: row.clone(),
                sentiment_label: signals.sentiment.get(&row.keyword).cloned(),
                trend_strength_score: signals.trend_strength.get(&row.keyword).copied(),
                yearly_avg_interest: signals
                    .yearly_avg_interest
                    .get(&row.keyword)
                    .map(|avg| round_to(*avg, 3)),
            })
            .collect()
    }

    /// Human-readable observations about the report, one sentence each
    pub fn insights(&self, rows: &[ReportRow]) -> Vec<String> {
        let mut lines = Vec::new();

        let fastest = best_by(rows, |row| Some(row.reconciled.growth_percent), |a, b| a > b);
        if let Some(row) = fastest {
            lines.push(format!(
                "Fastest growing technology: {} with forecast growth {}%",
                row.keyword(),
                row.reconciled.growth_percent
            ));
        }

        if let Some(row) = best_by(rows, |row| Some(row.reconciled.volatility), |a, b| a < b) {
            lines.push(format!(
                "Most stable technology: {} (Volatility {})",
                row.keyword(),
                row.reconciled.volatility
            ));
        }

        if let Some(row) = best_by(rows, |row| row.trend_strength_score, |a, b| a > b) {
            lines.push(format!(
                "Strongest trend momentum: {} (Trend Strength {})",
                row.keyword(),
                row.trend_strength_score.unwrap_or_default()
            ));
        }

        if let Some(leader) = fastest {
            let rising = rows
                .iter()
                .filter(|row| row.reconciled.trend_direction == TrendDirection::Up)
                .count();
            lines.push(format!(
                "Overall: {} of {} technologies are forecast to rise; {} leads on growth.",
                rising,
                rows.len(),
                leader.keyword()
            ));
        }

        lines
    }
}

/// First row whose defined metric beats every other under `better`
fn best_by<'a, M, B>(rows: &'a [ReportRow], metric: M, better: B) -> Option<&'a ReportRow>
where
    M: Fn(&ReportRow) -> Option<f64>,
    B: Fn(f64, f64) -> bool,
{
    let mut best: Option<(&ReportRow, f64)> = None;
    for row in rows {
        let Some(value) = metric(row).filter(|v| !v.is_nan()) else {
            continue;
        };
        match best {
            Some((_, current)) if !better(value, current) => {}
            _ => best = Some((row, value)),
        }
    }
    best.map(|(row, _)| row)
}
