//! Workforce cost charts.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use entity::absence;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::error::HrResult;
use crate::period::{month_end, month_label, trailing_months};
use crate::stats::{pct, round_to};
use crate::workforce::{self, headcount_on};

pub const TRAINING_PER_EMPLOYEE: i64 = 800;
pub const TRAVEL_PER_EMPLOYEE: i64 = 500;
/// Standard working hours in a month.
pub const MONTHLY_HOURS: f64 = 160.0;

const BUDGET_SEED: u64 = 22;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CostSlice {
    pub name: String,
    pub value: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct TotalCostOfWorkforce {
    pub total: Decimal,
    pub breakdown: Vec<CostSlice>,
}

/// Cost of the current workforce from each employee's latest pay record.
#[instrument(skip(db))]
pub async fn total_cost_of_workforce(db: &DatabaseConnection) -> HrResult<TotalCostOfWorkforce> {
    let latest = workforce::latest_compensations(db).await?;
    let headcount = Decimal::from(latest.len() as i64);
    let sum = |pick: fn(&entity::compensation::Model) -> Decimal| {
        latest.values().map(pick).sum::<Decimal>()
    };
    let breakdown = vec![
        ("Base Pay", sum(|c| c.base_salary)),
        ("Bonuses", sum(|c| c.bonus)),
        ("Benefits", sum(|c| c.benefits)),
        ("Payroll Taxes", sum(|c| c.payroll_taxes)),
        ("Training", headcount * Decimal::from(TRAINING_PER_EMPLOYEE)),
        ("Travel", headcount * Decimal::from(TRAVEL_PER_EMPLOYEE)),
    ]
    .into_iter()
    .map(|(name, value)| CostSlice {
        name: name.to_string(),
        value,
    })
    .collect::<Vec<_>>();
    let total = breakdown.iter().map(|slice| slice.value).sum();
    Ok(TotalCostOfWorkforce { total, breakdown })
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetVariance {
    pub labels: Vec<String>,
    pub budget: Vec<i64>,
    pub actual: Vec<i64>,
    pub variance_pct: Vec<f64>,
}

/// Illustrative plan-versus-actual series; the generator is seeded so the
/// chart is identical between calls.
pub fn budget_variance(today: NaiveDate) -> BudgetVariance {
    let labels: Vec<String> = trailing_months(today, 12).into_iter().map(month_label).collect();
    let mut rng = StdRng::seed_from_u64(BUDGET_SEED);
    let budget: Vec<i64> = labels
        .iter()
        .map(|_| rng.gen_range(1_400_000..1_600_000))
        .collect();
    let actual: Vec<i64> = budget
        .iter()
        .map(|b| (*b as f64 * (0.9 + rng.r#gen::<f64>() * 0.2)) as i64)
        .collect();
    let variance_pct = actual
        .iter()
        .zip(&budget)
        .map(|(a, b)| round_to(pct((a - b) as f64, *b as f64), 1))
        .collect();
    BudgetVariance {
        labels,
        budget,
        actual,
        variance_pct,
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OvertimeSeries {
    pub labels: Vec<String>,
    pub costs: Vec<i64>,
    pub hours: Vec<i64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenteeismSeries {
    pub labels: Vec<String>,
    pub costs: Vec<i64>,
    pub rate_pct: Vec<f64>,
}

#[derive(Default, Clone, Copy)]
struct MonthTotals {
    cost: Decimal,
    hours: f64,
}

async fn monthly_totals(
    db: &DatabaseConnection,
    months: &[NaiveDate],
    overtime: bool,
) -> HrResult<HashMap<(i32, u32), MonthTotals>> {
    let mut totals: HashMap<(i32, u32), MonthTotals> = HashMap::new();
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Ok(totals);
    };
    let rows = absence::Entity::find()
        .filter(absence::Column::IsOvertime.eq(overtime))
        .filter(absence::Column::StartDate.between(*first, month_end(*last)))
        .all(db)
        .await?;
    for row in rows {
        let entry = totals
            .entry((row.start_date.year(), row.start_date.month()))
            .or_default();
        entry.cost += row.cost;
        entry.hours += row.hours;
    }
    Ok(totals)
}

fn whole(value: Decimal) -> i64 {
    value.trunc().to_i64().unwrap_or(0)
}

/// Overtime cost and hours for the trailing twelve months.
#[instrument(skip(db))]
pub async fn overtime_by_month(db: &DatabaseConnection, today: NaiveDate) -> HrResult<OvertimeSeries> {
    let months = trailing_months(today, 12);
    let totals = monthly_totals(db, &months, true).await?;
    let mut series = OvertimeSeries {
        labels: Vec::with_capacity(months.len()),
        costs: Vec::with_capacity(months.len()),
        hours: Vec::with_capacity(months.len()),
    };
    for first in months {
        let t = totals
            .get(&(first.year(), first.month()))
            .copied()
            .unwrap_or_default();
        series.labels.push(month_label(first));
        series.costs.push(whole(t.cost));
        series.hours.push(t.hours.round() as i64);
    }
    Ok(series)
}

/// Absence cost and absence rate against 160 hours per employee on payroll at month end.
#[instrument(skip(db))]
pub async fn absenteeism_by_month(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> HrResult<AbsenteeismSeries> {
    let months = trailing_months(today, 12);
    let totals = monthly_totals(db, &months, false).await?;
    let employees = workforce::employees(db).await?;
    let mut series = AbsenteeismSeries {
        labels: Vec::with_capacity(months.len()),
        costs: Vec::with_capacity(months.len()),
        rate_pct: Vec::with_capacity(months.len()),
    };
    for first in months {
        let t = totals
            .get(&(first.year(), first.month()))
            .copied()
            .unwrap_or_default();
        let capacity = headcount_on(&employees, month_end(first)) as f64 * MONTHLY_HOURS;
        series.labels.push(month_label(first));
        series.costs.push(whole(t.cost));
        series.rate_pct.push(round_to(pct(t.hours, capacity), 2));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, at, day};

    #[tokio::test]
    async fn tcow_adds_flat_training_and_travel() {
        let db = testing::db().await;
        let a = testing::employee(&db, Hire::new("E1", day(2023, 1, 1))).await;
        let b = testing::employee(&db, Hire::new("E2", day(2023, 1, 1))).await;
        testing::compensation(&db, a.id, day(2023, 1, 1), 40_000).await;
        testing::compensation(&db, a.id, day(2024, 1, 1), 50_000).await;
        testing::compensation(&db, b.id, day(2024, 1, 1), 70_000).await;

        let tcow = total_cost_of_workforce(&db).await.unwrap();
        let value = |name: &str| {
            tcow.breakdown
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.value)
                .unwrap()
        };
        assert_eq!(value("Base Pay"), Decimal::from(120_000));
        assert_eq!(value("Bonuses"), Decimal::from(12_000));
        assert_eq!(value("Training"), Decimal::from(1_600));
        assert_eq!(value("Travel"), Decimal::from(1_000));
        assert_eq!(tcow.total, Decimal::from(120_000 + 12_000 + 24_000 + 1_600 + 1_000));
    }

    #[test]
    fn budget_variance_is_deterministic() {
        let first = budget_variance(day(2025, 6, 15));
        let second = budget_variance(day(2025, 6, 15));
        assert_eq!(first, second);
        assert_eq!(first.labels.len(), 12);
        assert_eq!(first.labels[11], "Jun");
        for (b, a) in first.budget.iter().zip(&first.actual) {
            assert!((1_400_000..1_600_000).contains(b));
            assert!(*a >= (*b as f64 * 0.9) as i64 - 1);
            assert!(*a <= (*b as f64 * 1.1) as i64 + 1);
        }
    }

    #[tokio::test]
    async fn overtime_and_absence_series_split_rows() {
        let db = testing::db().await;
        let kind = testing::absence_type(&db, "Sick Leave").await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        testing::absence(&db, e.id, kind.id, at(2025, 6, 2, 19), 2.6, true).await;
        testing::absence(&db, e.id, kind.id, at(2025, 6, 3, 9), 8.0, false).await;
        testing::absence(&db, e.id, kind.id, at(2023, 6, 3, 9), 8.0, false).await;

        let overtime = overtime_by_month(&db, day(2025, 6, 15)).await.unwrap();
        assert_eq!(overtime.hours[11], 3);
        assert_eq!(overtime.costs[11], 104);
        assert_eq!(overtime.hours[10], 0);

        let absence = absenteeism_by_month(&db, day(2025, 6, 15)).await.unwrap();
        assert_eq!(absence.costs[11], 320);
        assert_eq!(absence.rate_pct[11], 5.0);
        assert_eq!(absence.rate_pct.iter().filter(|r| **r > 0.0).count(), 1);
    }

    #[tokio::test]
    async fn absence_rate_without_staff_is_zero() {
        let db = testing::db().await;
        let series = absenteeism_by_month(&db, day(2025, 6, 15)).await.unwrap();
        assert!(series.rate_pct.iter().all(|r| *r == 0.0));
    }
}
