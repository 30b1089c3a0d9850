//! Comparing the margins of the worst, conservative and best scenarios.
//!
//! The conservative scenario is the baseline: the other two are judged by how their total margin
//! differs from it.
use crate::simulation::ProjectedMonth;
use crate::units::Money;
use serde::Deserialize;
use std::fmt;

/// Something which may report a margin. A missing margin counts as zero.
pub trait HasMargin {
    /// The margin, if known
    fn margin(&self) -> Option<Money>;
}

impl HasMargin for ProjectedMonth {
    fn margin(&self) -> Option<Money> {
        Some(self.margin)
    }
}

/// A month read from a projections file, of which only the margin is of interest
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MarginRecord {
    /// The month's margin
    #[serde(default)]
    pub margin: Option<Money>,
}

impl HasMargin for MarginRecord {
    fn margin(&self) -> Option<Money> {
        self.margin
    }
}

/// Sum the margins of a scenario's months
pub fn total_margin<T: HasMargin>(months: &[T]) -> Money {
    months
        .iter()
        .map(|month| month.margin().unwrap_or_default())
        .sum()
}

/// The baseline against which the other scenarios are measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineOutcome {
    /// Total margin of the conservative scenario
    pub total_margin: Money,
}

impl fmt::Display for BaselineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BASELINE: Generates a margin of {}. Use it as the point of comparison.",
            self.total_margin.to_currency_string()
        )
    }
}

/// How the best scenario compares with the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BestOutcome {
    /// More profitable than the baseline
    Recommended {
        /// Extra margin over the baseline
        surplus: Money,
    },
    /// No more profitable than the baseline
    NotRecommended {
        /// Margin lost relative to the baseline
        deficit: Money,
    },
}

impl BestOutcome {
    fn new(difference: Money) -> Self {
        if difference > Money(0.0) {
            Self::Recommended {
                surplus: difference,
            }
        } else {
            Self::NotRecommended {
                deficit: difference.abs(),
            }
        }
    }
}

impl fmt::Display for BestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recommended { surplus } => write!(
                f,
                "RECOMMENDED: Generates {} more margin than the baseline. Aggressive strategy (fairs, discounts).",
                surplus.to_currency_string()
            ),
            Self::NotRecommended { deficit } => write!(
                f,
                "NOT RECOMMENDED: Generates {} less margin than the baseline.",
                deficit.to_currency_string()
            ),
        }
    }
}

/// How the worst scenario compares with the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorstOutcome {
    /// Less profitable than the baseline, as expected
    Risk {
        /// Margin lost relative to the baseline
        deficit: Money,
    },
    /// At least as profitable as the baseline, which suggests the inputs are mislabelled
    Mislabelled {
        /// Extra margin over the baseline
        surplus: Money,
    },
}

impl WorstOutcome {
    fn new(difference: Money) -> Self {
        if difference < Money(0.0) {
            Self::Risk {
                deficit: difference.abs(),
            }
        } else {
            Self::Mislabelled {
                surplus: difference,
            }
        }
    }
}

impl fmt::Display for WorstOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Risk { deficit } => write!(
                f,
                "WARNING: Generates {} less margin than the baseline. Risk scenario.",
                deficit.to_currency_string()
            ),
            Self::Mislabelled { surplus } => write!(
                f,
                "MISLABELLED: This 'worst' scenario is more profitable ({} more) than the conservative one. Check the inputs.",
                surplus.to_currency_string()
            ),
        }
    }
}

/// The result of comparing the three scenarios
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioComparison {
    /// Total margin of the worst scenario
    pub worst_margin: Money,
    /// Total margin of the best scenario
    pub best_margin: Money,
    /// The conservative scenario
    pub conservative: BaselineOutcome,
    /// The best scenario
    pub best: BestOutcome,
    /// The worst scenario
    pub worst: WorstOutcome,
}

/// Compare the worst and best scenarios against the conservative one
pub fn compare_scenarios<W, C, B>(worst: &[W], conservative: &[C], best: &[B]) -> ScenarioComparison
where
    W: HasMargin,
    C: HasMargin,
    B: HasMargin,
{
    let worst_margin = total_margin(worst);
    let conservative_margin = total_margin(conservative);
    let best_margin = total_margin(best);

    ScenarioComparison {
        worst_margin,
        best_margin,
        conservative: BaselineOutcome {
            total_margin: conservative_margin,
        },
        best: BestOutcome::new(best_margin - conservative_margin),
        worst: WorstOutcome::new(worst_margin - conservative_margin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn records(margins: &[Option<f64>]) -> Vec<MarginRecord> {
        margins
            .iter()
            .map(|margin| MarginRecord {
                margin: margin.map(Money),
            })
            .collect()
    }

    #[test]
    fn test_total_margin_missing_is_zero() {
        let months = records(&[Some(100.0), None, Some(-25.5)]);
        assert_eq!(total_margin(&months), Money(74.5));
        assert_eq!(total_margin::<MarginRecord>(&[]), Money(0.0));
    }

    #[test]
    fn test_compare_scenarios() {
        let worst = records(&[Some(30_000.0), Some(15_000.0)]);
        let conservative = records(&[Some(50_000.0), Some(40_000.0)]);
        let best = records(&[Some(70_000.0), Some(45_000.0)]);
        let comparison = compare_scenarios(&worst, &conservative, &best);

        assert_eq!(
            comparison.conservative.to_string(),
            "BASELINE: Generates a margin of $90,000. Use it as the point of comparison."
        );
        assert_eq!(
            comparison.best,
            BestOutcome::Recommended {
                surplus: Money(25_000.0)
            }
        );
        assert_eq!(
            comparison.best.to_string(),
            "RECOMMENDED: Generates $25,000 more margin than the baseline. Aggressive strategy (fairs, discounts)."
        );
        assert_eq!(
            comparison.worst,
            WorstOutcome::Risk {
                deficit: Money(45_000.0)
            }
        );
        assert_eq!(
            comparison.worst.to_string(),
            "WARNING: Generates $45,000 less margin than the baseline. Risk scenario."
        );
    }

    #[rstest]
    #[case(1000.0, true)]
    #[case(0.5, true)]
    #[case(0.0, false)]
    #[case(-1000.0, false)]
    fn test_best_flips_with_difference(#[case] delta: f64, #[case] recommended: bool) {
        let conservative = records(&[Some(5000.0)]);
        let best = records(&[Some(5000.0 + delta)]);
        let comparison = compare_scenarios(&conservative, &conservative, &best);
        assert_eq!(
            matches!(comparison.best, BestOutcome::Recommended { .. }),
            recommended
        );
        if !recommended {
            assert_eq!(
                comparison.best,
                BestOutcome::NotRecommended {
                    deficit: Money(delta.abs())
                }
            );
        }
    }

    #[test]
    fn test_baseline_ignores_other_scenarios() {
        let conservative = records(&[Some(1234.0)]);
        for other in [-1e6, 0.0, 1e6] {
            let other = records(&[Some(other)]);
            let comparison = compare_scenarios(&other, &conservative, &other);
            assert_eq!(comparison.conservative.total_margin, Money(1234.0));
        }
    }

    #[test]
    fn test_worst_mislabelled() {
        let conservative = records(&[Some(1000.0)]);
        let worst = records(&[Some(3500.0)]);
        let comparison = compare_scenarios(&worst, &conservative, &conservative);
        assert_eq!(
            comparison.worst,
            WorstOutcome::Mislabelled {
                surplus: Money(2500.0)
            }
        );
        assert_eq!(
            comparison.worst.to_string(),
            "MISLABELLED: This 'worst' scenario is more profitable ($2,500 more) than the conservative one. Check the inputs."
        );

        // Equal margins are not a risk either
        let comparison = compare_scenarios(&conservative, &conservative, &conservative);
        assert!(matches!(comparison.worst, WorstOutcome::Mislabelled { .. }));
    }
}
