//! Cross-entity comparison over named KPI summaries

use crate::core::error::Outcome;
use crate::core::kpi::{KpiSummary, Metric, NamedSummary};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sort direction for rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Which end of a metric to select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    /// Smallest value
    Min,
    /// Largest value
    Max,
}

/// One row of a ranked comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based rank
    pub rank: usize,
    /// Group name
    pub name: String,
    /// Metric value
    pub value: f64,
}

/// Best and worst performer for a metric and the gap between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spread {
    /// Best performer
    pub best: String,
    /// Best value
    pub best_value: f64,
    /// Worst performer
    pub worst: String,
    /// Worst value
    pub worst_value: f64,
    /// Absolute difference, the improvement potential
    pub gap: f64,
}

/// Thresholds for KPI alerts, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Scrap rate above this raises a warning
    pub scrap_warning_percent: f64,
    /// Scrap rate above this is critical
    pub scrap_critical_percent: f64,
    /// Availability below this target raises a warning
    pub availability_target_percent: f64,
    /// Availability below this is critical
    pub availability_critical_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            scrap_warning_percent: 3.0,
            scrap_critical_percent: 5.0,
            availability_target_percent: 90.0,
            availability_critical_percent: 80.0,
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Outside the target band
    Warning,
    /// Requires action
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        })
    }
}

/// A threshold breach for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Group name
    pub name: String,
    /// Metric that breached
    pub metric: &'static str,
    /// Severity
    pub severity: Severity,
    /// Observed value
    pub value: f64,
    /// Threshold that was crossed
    pub threshold: f64,
}

/// Change of a metric between two consecutive periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodDelta {
    /// Earlier period
    pub from: String,
    /// Later period
    pub to: String,
    /// Value in the earlier period
    pub previous: f64,
    /// Value in the later period
    pub current: f64,
    /// `current - previous`
    pub delta: f64,
}

/// Improvement assumptions as fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementTargets {
    /// Fraction of scrap avoided
    pub scrap_reduction: f64,
    /// Fraction of additional output
    pub output_increase: f64,
    /// Fraction of energy saved
    pub energy_reduction: f64,
}

impl Default for ImprovementTargets {
    fn default() -> Self {
        Self {
            scrap_reduction: 0.30,
            output_increase: 0.05,
            energy_reduction: 0.15,
        }
    }
}

/// Projected gains for a summary under [`ImprovementTargets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImprovementProjection {
    /// Scrapped units avoided
    pub scrap_units_saved: f64,
    /// Additional units produced
    pub additional_output: f64,
    /// Energy saved in kWh
    pub energy_saved_kwh: f64,
}

/// Compares named aggregates, typically one per production line.
///
/// Input order is significant: ties are always resolved in favour of the
/// entry that comes first.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    items: &'a [NamedSummary],
}

impl<'a> Analyzer<'a> {
    /// Analyze a list of aggregates
    #[must_use]
    pub const fn new(items: &'a [NamedSummary]) -> Self {
        Self { items }
    }

    /// Whether there is nothing to compare
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Comparison table sorted by `metric`; equal values keep input order.
    ///
    /// An empty input yields [`Outcome::NoData`].
    #[must_use]
    pub fn rank_by(&self, metric: Metric, order: SortOrder) -> Outcome<Vec<RankedEntry>> {
        if self.items.is_empty() {
            return Outcome::NoData;
        }
        let mut rows: Vec<(&str, f64)> = self
            .items
            .iter()
            .map(|item| (item.name.as_str(), metric.value(&item.summary)))
            .collect();
        rows.sort_by(|a, b| match order {
            SortOrder::Ascending => a.1.total_cmp(&b.1),
            SortOrder::Descending => b.1.total_cmp(&a.1),
        });
        Outcome::Ready(
            rows.into_iter()
                .enumerate()
                .map(|(idx, (name, value))| RankedEntry {
                    rank: idx + 1,
                    name: name.to_string(),
                    value,
                })
                .collect(),
        )
    }

    /// The first `n` entries ranked by `metric`, largest first
    #[must_use]
    pub fn top(&self, metric: Metric, n: usize) -> Outcome<Vec<RankedEntry>> {
        self.rank_by(metric, SortOrder::Descending).map(|mut ranked| {
            ranked.truncate(n);
            ranked
        })
    }

    /// Single aggregate with the smallest or largest `metric`.
    ///
    /// The first occurrence wins ties; an empty input yields [`Outcome::NoData`].
    #[must_use]
    pub fn extremum(&self, metric: Metric, extreme: Extreme) -> Outcome<&'a NamedSummary> {
        let wanted = match extreme {
            Extreme::Min => Ordering::Less,
            Extreme::Max => Ordering::Greater,
        };
        let mut best: Option<&'a NamedSummary> = None;
        for item in self.items {
            let replace = best.map_or(true, |current| {
                metric
                    .value(&item.summary)
                    .total_cmp(&metric.value(&current.summary))
                    == wanted
            });
            if replace {
                best = Some(item);
            }
        }
        best.into()
    }

    /// Best performer for `metric`, honouring its direction
    #[must_use]
    pub fn best(&self, metric: Metric) -> Outcome<&'a NamedSummary> {
        self.extremum(metric, Self::best_end(metric))
    }

    /// Worst performer for `metric`, honouring its direction
    #[must_use]
    pub fn worst(&self, metric: Metric) -> Outcome<&'a NamedSummary> {
        let end = match Self::best_end(metric) {
            Extreme::Min => Extreme::Max,
            Extreme::Max => Extreme::Min,
        };
        self.extremum(metric, end)
    }

    const fn best_end(metric: Metric) -> Extreme {
        if metric.higher_is_better() {
            Extreme::Max
        } else {
            Extreme::Min
        }
    }

    /// Gap between best and worst performer
    #[must_use]
    pub fn spread(&self, metric: Metric) -> Outcome<Spread> {
        let (Outcome::Ready(best), Outcome::Ready(worst)) = (self.best(metric), self.worst(metric))
        else {
            return Outcome::NoData;
        };
        let best_value = metric.value(&best.summary);
        let worst_value = metric.value(&worst.summary);
        Outcome::Ready(Spread {
            best: best.name.clone(),
            best_value,
            worst: worst.name.clone(),
            worst_value,
            gap: (best_value - worst_value).abs(),
        })
    }

    /// Scrap and availability breaches, in input order
    #[must_use]
    pub fn alerts(&self, thresholds: &AlertThresholds) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for item in self.items {
            let scrap = item.summary.scrap_rate;
            let scrap_level = if scrap > thresholds.scrap_critical_percent {
                Some((Severity::Critical, thresholds.scrap_critical_percent))
            } else if scrap > thresholds.scrap_warning_percent {
                Some((Severity::Warning, thresholds.scrap_warning_percent))
            } else {
                None
            };
            if let Some((severity, threshold)) = scrap_level {
                alerts.push(Alert {
                    name: item.name.clone(),
                    metric: Metric::ScrapRate.label(),
                    severity,
                    value: scrap,
                    threshold,
                });
            }

            let availability = item.summary.availability.percent;
            let availability_level = if availability < thresholds.availability_critical_percent {
                Some((Severity::Critical, thresholds.availability_critical_percent))
            } else if availability < thresholds.availability_target_percent {
                Some((Severity::Warning, thresholds.availability_target_percent))
            } else {
                None
            };
            if let Some((severity, threshold)) = availability_level {
                alerts.push(Alert {
                    name: item.name.clone(),
                    metric: Metric::Availability.label(),
                    severity,
                    value: availability,
                    threshold,
                });
            }
        }
        alerts
    }

    /// Deltas of `metric` between consecutive entries.
    ///
    /// Expects chronologically ordered periods such as the output of
    /// [`crate::core::kpi::by_year`].
    #[must_use]
    pub fn year_over_year(&self, metric: Metric) -> Vec<PeriodDelta> {
        self.items
            .windows(2)
            .map(|pair| {
                let previous = metric.value(&pair[0].summary);
                let current = metric.value(&pair[1].summary);
                PeriodDelta {
                    from: pair[0].name.clone(),
                    to: pair[1].name.clone(),
                    previous,
                    current,
                    delta: current - previous,
                }
            })
            .collect()
    }
}

/// Project savings for a summary under the given targets
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project_improvements(
    summary: &KpiSummary,
    targets: &ImprovementTargets,
) -> ImprovementProjection {
    ImprovementProjection {
        scrap_units_saved: summary.total_scrap as f64 * targets.scrap_reduction,
        additional_output: summary.total_quantity as f64 * targets.output_increase,
        energy_saved_kwh: summary.total_energy_kwh * targets.energy_reduction,
    }
}
