//! Turning projected demand into a month-by-month purchase plan.
//!
//! Stock is carried from one month to the next: each month opens with the previous month's
//! closing stock, even when that is negative (i.e. demand went unmet). Months are therefore always
//! processed in the order given.
use crate::error::PlanningError;
use crate::product::ProductID;
use crate::simulation::ProjectedMonth;
use crate::units::{Dimensionless, Money, Quantity};
use anyhow::Result;
use log::{debug, warn};
use serde::Deserialize;
use std::fmt;

/// Extra lead time when fuel supply is constrained
pub const CONSTRAINED_LEAD_TIME_PENALTY_DAYS: u32 = 15;

/// Closing stock below this fraction of the month's demand is considered low
pub const SAFETY_STOCK_FRACTION: Dimensionless = Dimensionless(0.2);

/// The state of the supply chain, which affects lead times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
pub enum SupplyRisk {
    /// Normal supply (flag value 1)
    #[default]
    #[strum(to_string = "normal", serialize = "1")]
    Normal,
    /// Fuel shortages delay deliveries (flag value 2)
    #[strum(to_string = "constrained", serialize = "2")]
    Constrained,
}

impl<'de> Deserialize<'de> for SupplyRisk {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid supply risk: {value} (expected normal, constrained, 1 or 2)"
            ))
        })
    }
}

impl SupplyRisk {
    /// The lead time to plan for, given the product's usual lead time
    pub fn effective_lead_time(self, lead_time_days: u32) -> u32 {
        match self {
            Self::Normal => lead_time_days,
            Self::Constrained => lead_time_days + CONSTRAINED_LEAD_TIME_PENALTY_DAYS,
        }
    }
}

/// The advice given for a month of the purchase plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurchaseAdvice {
    /// Demand exceeds the stock available, even after ordering
    Stockout {
        /// Units of demand which cannot be met
        shortfall: Quantity,
    },
    /// Closing stock is below the safety threshold
    LowStock {
        /// The month's closing stock
        closing_stock: Quantity,
    },
    /// An order must be placed, but stock is healthy
    OrderRequired {
        /// Cost of the order
        cost: Money,
    },
    /// Existing stock covers demand
    StockSufficient,
}

impl PurchaseAdvice {
    /// Choose the advice for a month
    fn new(closing_stock: Quantity, demand: Quantity, purchase: Quantity, cost: Money) -> Self {
        let safety_stock = demand * SAFETY_STOCK_FRACTION;
        if closing_stock < Quantity(0.0) {
            Self::Stockout {
                shortfall: closing_stock.abs(),
            }
        } else if closing_stock < safety_stock {
            Self::LowStock { closing_stock }
        } else if purchase > Quantity(0.0) {
            Self::OrderRequired { cost }
        } else {
            Self::StockSufficient
        }
    }
}

impl fmt::Display for PurchaseAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stockout { shortfall } => write!(
                f,
                "ALERT! Stockout. {:.0} units short. Increase the order.",
                shortfall.value()
            ),
            Self::LowStock { closing_stock } => write!(
                f,
                "WARNING: Low closing stock ({:.0} units). Risk of stockout.",
                closing_stock.value()
            ),
            Self::OrderRequired { cost } => write!(
                f,
                "OK. Order required. Cost: {}",
                cost.to_currency_string()
            ),
            Self::StockSufficient => write!(f, "OK. Stock sufficient."),
        }
    }
}

/// One month of a purchase plan
#[derive(Debug, Clone, PartialEq)]
pub struct PurchasePlanEntry {
    /// Month of the year
    pub month: Option<u32>,
    /// The product
    pub product: ProductID,
    /// Projected demand
    pub demand: Quantity,
    /// Stock at the start of the month
    pub opening_stock: Quantity,
    /// Quantity to order (a multiple of the minimum order quantity)
    pub purchase_quantity: Quantity,
    /// Cost of the order
    pub purchase_cost: Money,
    /// Stock at the end of the month (negative if demand was not met)
    pub closing_stock: Quantity,
    /// Lead time to plan for, including any supply-risk penalty
    pub lead_time_days: u32,
    /// What to do about this month
    pub advice: PurchaseAdvice,
}

impl PurchasePlanEntry {
    /// The month as shown to users
    pub fn month_label(&self) -> String {
        self.month
            .map_or_else(|| "N/A".to_string(), |month| month.to_string())
    }

    /// When the order needs to be placed
    pub fn lead_time_notice(&self) -> String {
        format!("Order {} days in advance", self.lead_time_days)
    }
}

/// Round a required purchase up to a whole number of orders.
///
/// Nothing is ordered if nothing is required. Otherwise at least one minimum order quantity is
/// ordered, and larger amounts are rounded up to the next multiple of it.
pub fn round_up_to_moq(required: Quantity, moq: Quantity) -> Quantity {
    if required <= Quantity(0.0) {
        Quantity(0.0)
    } else if required < moq {
        moq
    } else if required.value() % moq.value() == 0.0 {
        required
    } else {
        Quantity(((required.value() / moq.value()).floor() + 1.0) * moq.value())
    }
}

/// Check that a minimum order quantity can be used for rounding
fn check_moq(month: &ProjectedMonth) -> Result<()> {
    let moq = month.min_order_quantity;
    if !(moq.is_finite() && moq > Quantity(0.0)) {
        Err(PlanningError::validation(format!(
            "Minimum order quantity for product {} must be a positive number (got {moq})",
            month.product
        )))?;
    }

    Ok(())
}

/// Create a purchase plan for a sequence of projected months.
///
/// # Arguments
///
/// * `months` - Projected demand, in chronological order
/// * `opening_stock` - Stock at the start of the first month
/// * `supply_risk` - The state of the supply chain
///
/// # Returns
///
/// One [`PurchasePlanEntry`] per month, in the same order, or an error if any month has an invalid
/// minimum order quantity.
pub fn plan_purchases(
    months: &[ProjectedMonth],
    opening_stock: Quantity,
    supply_risk: SupplyRisk,
) -> Result<Vec<PurchasePlanEntry>> {
    if !opening_stock.is_finite() {
        Err(PlanningError::validation("Opening stock must be a finite number"))?;
    }
    for month in months {
        check_moq(month)?;
    }

    let mut stock = opening_stock;
    let mut plan = Vec::with_capacity(months.len());
    for month in months {
        let demand = month.final_quantity;
        let required = (demand - stock).max(Quantity(0.0));
        let purchase = round_up_to_moq(required, month.min_order_quantity);
        let closing_stock = stock + purchase - demand;
        let cost = purchase * month.purchase_cost;
        let advice = PurchaseAdvice::new(closing_stock, demand, purchase, cost);

        if let PurchaseAdvice::Stockout { shortfall } = advice {
            warn!(
                "Stockout for product {} in month {}: {shortfall} units short",
                month.product,
                month.month.map_or_else(|| "N/A".to_string(), |m| m.to_string())
            );
        }

        plan.push(PurchasePlanEntry {
            month: month.month,
            product: month.product.clone(),
            demand,
            opening_stock: stock,
            purchase_quantity: purchase,
            purchase_cost: cost,
            closing_stock,
            lead_time_days: supply_risk.effective_lead_time(month.lead_time_days),
            advice,
        });

        stock = closing_stock;
    }
    debug!("Planned purchases for {} months ({supply_risk} supply)", plan.len());

    Ok(plan)
}

/// Totals for a purchase plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    /// Total projected demand
    pub total_demand: Quantity,
    /// Total quantity ordered
    pub total_purchases: Quantity,
    /// Total cost of all orders
    pub total_purchase_cost: Money,
    /// Closing stock of the final month
    pub final_stock: Quantity,
    /// Number of months in which demand could not be met
    pub stockout_months: usize,
}

impl PlanSummary {
    /// Summarise a purchase plan. Returns `None` for an empty plan.
    pub fn from_plan(plan: &[PurchasePlanEntry]) -> Option<Self> {
        let last = plan.last()?;
        Some(Self {
            total_demand: plan.iter().map(|entry| entry.demand).sum(),
            total_purchases: plan.iter().map(|entry| entry.purchase_quantity).sum(),
            total_purchase_cost: plan.iter().map(|entry| entry.purchase_cost).sum(),
            final_stock: last.closing_stock,
            stockout_months: plan
                .iter()
                .filter(|entry| matches!(entry.advice, PurchaseAdvice::Stockout { .. }))
                .count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::projected_month;
    use crate::units::MoneyPerUnit;
    use itertools::Itertools;
    use rstest::rstest;
    use std::str::FromStr;

    fn month_with(demand: f64, moq: f64, lead_time_days: u32) -> ProjectedMonth {
        let mut month = projected_month();
        month.final_quantity = Quantity(demand);
        month.min_order_quantity = Quantity(moq);
        month.lead_time_days = lead_time_days;
        month
    }

    #[rstest]
    #[case(0.0, 30.0, 0.0)]
    #[case(-5.0, 30.0, 0.0)]
    #[case(1.0, 30.0, 30.0)]
    #[case(30.0, 30.0, 30.0)]
    #[case(31.0, 30.0, 60.0)]
    #[case(100.0, 30.0, 120.0)]
    #[case(90.0, 50.0, 100.0)]
    #[case(2.5, 0.5, 2.5)]
    fn test_round_up_to_moq(#[case] required: f64, #[case] moq: f64, #[case] expected: f64) {
        assert_eq!(
            round_up_to_moq(Quantity(required), Quantity(moq)),
            Quantity(expected)
        );
    }

    #[test]
    fn test_round_up_to_moq_is_smallest_multiple() {
        for moq in [1.0, 7.0, 30.0, 100.0] {
            for required in 1..=250 {
                let required = f64::from(required);
                let purchase = round_up_to_moq(Quantity(required), Quantity(moq)).value();
                assert_eq!(purchase % moq, 0.0);
                assert!(purchase >= required.max(moq));
                assert!(purchase - moq < required.max(moq));
            }
        }
    }

    #[test]
    fn test_effective_lead_time() {
        assert_eq!(SupplyRisk::Normal.effective_lead_time(30), 30);
        assert_eq!(SupplyRisk::Constrained.effective_lead_time(30), 45);
    }

    #[rstest]
    #[case("normal", SupplyRisk::Normal)]
    #[case("1", SupplyRisk::Normal)]
    #[case("constrained", SupplyRisk::Constrained)]
    #[case("2", SupplyRisk::Constrained)]
    fn test_supply_risk_from_str(#[case] s: &str, #[case] expected: SupplyRisk) {
        assert_eq!(SupplyRisk::from_str(s).unwrap(), expected);

        // The same values are accepted in TOML files
        let table: toml::Table = toml::from_str(&format!("supply_risk = \"{s}\"")).unwrap();
        let value: SupplyRisk = table["supply_risk"].clone().try_into().unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_supply_risk_display() {
        assert_eq!(SupplyRisk::Normal.to_string(), "normal");
        assert_eq!(SupplyRisk::Constrained.to_string(), "constrained");
        assert!(SupplyRisk::from_str("3").is_err());
    }

    #[test]
    fn test_plan_order_rounded_to_moq() {
        let plan = plan_purchases(&[month_with(100.0, 30.0, 30)], Quantity(0.0), SupplyRisk::Normal)
            .unwrap();
        let entry = &plan[0];
        assert_eq!(entry.purchase_quantity, Quantity(120.0));
        assert_eq!(entry.closing_stock, Quantity(20.0));
        assert_eq!(entry.lead_time_notice(), "Order 30 days in advance");
        // 120 units at 6 each
        assert_eq!(entry.purchase_cost, Money(720.0));
        assert_eq!(
            entry.advice,
            PurchaseAdvice::OrderRequired {
                cost: Money(720.0)
            }
        );
        assert_eq!(entry.advice.to_string(), "OK. Order required. Cost: $720");
    }

    #[test]
    fn test_plan_stock_sufficient() {
        let plan = plan_purchases(&[month_with(40.0, 30.0, 30)], Quantity(50.0), SupplyRisk::Normal)
            .unwrap();
        let entry = &plan[0];
        assert_eq!(entry.purchase_quantity, Quantity(0.0));
        assert_eq!(entry.closing_stock, Quantity(10.0));
        assert_eq!(entry.advice, PurchaseAdvice::StockSufficient);
        assert_eq!(entry.advice.to_string(), "OK. Stock sufficient.");
    }

    #[test]
    fn test_plan_constrained_supply() {
        let plan = plan_purchases(
            &[month_with(100.0, 50.0, 30)],
            Quantity(10.0),
            SupplyRisk::Constrained,
        )
        .unwrap();
        let entry = &plan[0];
        assert_eq!(entry.lead_time_days, 45);
        assert_eq!(entry.purchase_quantity, Quantity(100.0));
        assert_eq!(entry.closing_stock, Quantity(10.0));
        // 10 < 20% of 100
        assert_eq!(
            entry.advice,
            PurchaseAdvice::LowStock {
                closing_stock: Quantity(10.0)
            }
        );
        assert_eq!(
            entry.advice.to_string(),
            "WARNING: Low closing stock (10 units). Risk of stockout."
        );
    }

    #[test]
    fn test_plan_negative_opening_stock() {
        // Negative opening stock is accepted and carried through
        let plan = plan_purchases(&[month_with(10.0, 50.0, 30)], Quantity(-25.0), SupplyRisk::Normal)
            .unwrap();
        assert_eq!(plan[0].purchase_quantity, Quantity(50.0));
        assert_eq!(plan[0].closing_stock, Quantity(15.0));
    }

    #[test]
    fn test_plan_zero_demand() {
        let plan = plan_purchases(&[month_with(0.0, 50.0, 30)], Quantity(0.0), SupplyRisk::Normal)
            .unwrap();
        assert_eq!(plan[0].purchase_quantity, Quantity(0.0));
        assert_eq!(plan[0].advice, PurchaseAdvice::StockSufficient);
    }

    #[test]
    fn test_stock_carried_between_months() {
        let months = [
            month_with(100.0, 30.0, 30),
            month_with(15.0, 30.0, 30),
            month_with(45.0, 30.0, 30),
            month_with(0.0, 30.0, 30),
        ];
        let plan = plan_purchases(&months, Quantity(0.0), SupplyRisk::Normal).unwrap();
        assert_eq!(plan[0].opening_stock, Quantity(0.0));
        for (prev, next) in plan.iter().tuple_windows() {
            assert_eq!(next.opening_stock, prev.closing_stock);
        }
        assert_eq!(
            plan.iter().map(|e| e.closing_stock.value()).collect_vec(),
            [20.0, 5.0, 20.0, 20.0]
        );
    }

    #[test]
    fn test_stockout_advice() {
        let advice = PurchaseAdvice::new(Quantity(-12.0), Quantity(100.0), Quantity(0.0), Money(0.0));
        assert_eq!(
            advice,
            PurchaseAdvice::Stockout {
                shortfall: Quantity(12.0)
            }
        );
        assert_eq!(
            advice.to_string(),
            "ALERT! Stockout. 12 units short. Increase the order."
        );
    }

    #[test]
    fn test_advice_priority() {
        // Low stock beats an informational order note
        let advice = PurchaseAdvice::new(Quantity(5.0), Quantity(100.0), Quantity(50.0), Money(1.0));
        assert_eq!(
            advice,
            PurchaseAdvice::LowStock {
                closing_stock: Quantity(5.0)
            }
        );

        // Exactly at the safety threshold is not low
        let advice = PurchaseAdvice::new(Quantity(20.0), Quantity(100.0), Quantity(0.0), Money(0.0));
        assert_eq!(advice, PurchaseAdvice::StockSufficient);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-30.0)]
    #[case(f64::NAN)]
    fn test_plan_invalid_moq(#[case] moq: f64) {
        let months = [month_with(10.0, 30.0, 30), month_with(10.0, moq, 30)];
        assert!(plan_purchases(&months, Quantity(0.0), SupplyRisk::Normal).is_err());
    }

    #[test]
    fn test_plan_summary() {
        let mut months = vec![month_with(100.0, 30.0, 30), month_with(15.0, 30.0, 30)];
        months[1].purchase_cost = MoneyPerUnit(2.0);
        let plan = plan_purchases(&months, Quantity(0.0), SupplyRisk::Normal).unwrap();
        assert_eq!(
            PlanSummary::from_plan(&plan).unwrap(),
            PlanSummary {
                total_demand: Quantity(115.0),
                total_purchases: Quantity(120.0),
                total_purchase_cost: Money(720.0),
                final_stock: Quantity(5.0),
                stockout_months: 0,
            }
        );
        assert!(PlanSummary::from_plan(&[]).is_none());
    }
}
