//! Illustrative board-level payloads: pay-gap bridge, finance impact per
//! organisation and payroll process efficiency.

use entity::org_unit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::error::HrResult;
use crate::stats::round_to;

const IMPACT_SEED: u64 = 41;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GapStep {
    pub label: &'static str,
    pub delta: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PayGapBridge {
    pub steps: Vec<GapStep>,
}

/// Waterfall from the raw gender pay gap to the unexplained residual.
pub fn pay_gap_bridge() -> PayGapBridge {
    let steps = [
        ("Raw Gap", -10.0),
        ("Job Mix", 3.5),
        ("Tenure", 2.0),
        ("Performance", 1.2),
        ("Geo/Market", 1.0),
        ("Residual Gap", -2.3),
    ];
    PayGapBridge {
        steps: steps
            .into_iter()
            .map(|(label, delta)| GapStep { label, delta })
            .collect(),
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgImpact {
    pub org: String,
    /// Payroll cost as a percentage of revenue.
    pub pr_ratio: f64,
    pub sales_per_emp: i64,
    pub productivity_index: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FinanceImpact {
    pub orgs: Vec<OrgImpact>,
}

/// One row per org unit; figures come from a fixed-seed generator so the
/// chart is stable between calls.
#[instrument(skip(db))]
pub async fn finance_impact(db: &DatabaseConnection) -> HrResult<FinanceImpact> {
    let names: Vec<String> = org_unit::Entity::find()
        .order_by_asc(org_unit::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|org| org.name)
        .collect();
    Ok(impact_for(names))
}

fn impact_for(names: Vec<String>) -> FinanceImpact {
    let mut rng = StdRng::seed_from_u64(IMPACT_SEED);
    let orgs = names
        .into_iter()
        .map(|org| OrgImpact {
            org,
            pr_ratio: round_to(30.0 + rng.r#gen::<f64>() * 25.0, 1),
            sales_per_emp: rng.gen_range(120_000..380_000),
            productivity_index: rng.gen_range(1..10),
        })
        .collect();
    FinanceImpact { orgs }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEfficiency {
    pub time_to_run_payroll_hours: f64,
    pub accuracy_rate_pct: f64,
}

pub fn process_efficiency() -> ProcessEfficiency {
    ProcessEfficiency {
        time_to_run_payroll_hours: 12.5,
        accuracy_rate_pct: 98.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_ends_at_residual() {
        let bridge = pay_gap_bridge();
        assert_eq!(bridge.steps.len(), 6);
        assert_eq!(bridge.steps[0], GapStep { label: "Raw Gap", delta: -10.0 });
        assert_eq!(bridge.steps[5].label, "Residual Gap");
    }

    #[test]
    fn impact_is_repeatable_and_in_range() {
        let names = || vec!["Sales".to_string(), "Engineering".to_string(), "Ops".to_string()];
        let first = impact_for(names());
        assert_eq!(first, impact_for(names()));
        for row in &first.orgs {
            assert!((30.0..=55.0).contains(&row.pr_ratio));
            assert!((120_000..380_000).contains(&row.sales_per_emp));
            assert!((1..10).contains(&row.productivity_index));
        }
    }

    #[tokio::test]
    async fn impact_follows_org_units() {
        use sea_orm::{ActiveModelTrait, Set};

        let db = crate::testing::db().await;
        for name in ["Finance", "HR"] {
            org_unit::ActiveModel {
                name: Set(name.into()),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }
        let impact = finance_impact(&db).await.unwrap();
        let orgs: Vec<_> = impact.orgs.iter().map(|o| o.org.as_str()).collect();
        assert_eq!(orgs, ["Finance", "HR"]);
    }

    #[test]
    fn efficiency_serializes_camel_case() {
        let json = serde_json::to_value(process_efficiency()).unwrap();
        assert_eq!(json["timeToRunPayrollHours"], 12.5);
        assert_eq!(json["accuracyRatePct"], 98.4);
    }
}
