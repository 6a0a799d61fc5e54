//! Dashboard widgets.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use entity::{absence, absence_type, compensation, department};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::error::{HrError, HrResult};
use crate::period::{Period, add_months, month_start};
use crate::stats::{mean, pct, round_to};
use crate::turnover::{self, TurnoverMetrics};
use crate::workforce::{self, money, to_f64};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_employees: u64,
    pub active_employees: u64,
    pub new_hires: u64,
    pub terminations: u64,
    pub total_payroll: Decimal,
    pub average_salary: Decimal,
    pub overtime_cost: Decimal,
    pub absence_cost: Decimal,
    pub turnover_rate: f64,
    pub absence_rate: f64,
    pub last_updated: DateTime<Utc>,
}

/// Headline numbers. Payroll is the base pay of rows effective this month
/// and the average spreads it over every employee on record; the other
/// counters look back one month.
#[instrument(skip(db))]
pub async fn summary(db: &DatabaseConnection, now: DateTime<Utc>) -> HrResult<DashboardSummary> {
    let today = now.date_naive();
    let since = add_months(today, -1);
    let employees = workforce::employees(db).await?;
    let total_employees = employees.len() as u64;
    let active_employees = employees.iter().filter(|e| e.is_active).count() as u64;
    let new_hires = employees
        .iter()
        .filter(|e| e.hire_date.is_some_and(|d| d >= since && d <= today))
        .count() as u64;
    let terminations = employees
        .iter()
        .filter(|e| e.termination_date.is_some_and(|d| d >= since && d <= today))
        .count() as u64;

    let total_payroll = compensation::Entity::find()
        .filter(compensation::Column::EffectiveDate.between(month_start(today), today))
        .all(db)
        .await?
        .iter()
        .map(|c| c.base_salary)
        .sum::<Decimal>();
    let average_salary = if total_employees == 0 {
        Decimal::ZERO
    } else {
        (total_payroll / Decimal::from(total_employees)).round_dp(2)
    };

    let recent = absence::Entity::find()
        .filter(absence::Column::StartDate.between(since, today))
        .all(db)
        .await?;
    let (overtime, absences): (Vec<_>, Vec<_>) = recent.iter().partition(|a| a.is_overtime);

    Ok(DashboardSummary {
        total_employees,
        active_employees,
        new_hires,
        terminations,
        total_payroll,
        average_salary,
        overtime_cost: overtime.iter().map(|a| a.cost).sum(),
        absence_cost: absences.iter().map(|a| a.cost).sum(),
        turnover_rate: round_to(pct(terminations as f64, total_employees as f64), 2),
        absence_rate: round_to(pct(absences.len() as f64, active_employees as f64), 2),
        last_updated: now,
    })
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department_id: i32,
    pub department_name: String,
    pub employee_count: u64,
    pub average_salary: Decimal,
}

/// Roster size and average current salary per department, largest first.
#[instrument(skip(db))]
pub async fn department_stats(db: &DatabaseConnection) -> HrResult<Vec<DepartmentStats>> {
    let departments = department::Entity::find()
        .order_by_asc(department::Column::Name)
        .all(db)
        .await?;
    let employees = workforce::employees(db).await?;
    let latest = workforce::latest_compensations(db).await?;

    let mut stats: Vec<DepartmentStats> = departments
        .into_iter()
        .map(|dept| {
            let members: Vec<_> = employees
                .iter()
                .filter(|e| e.department_id == Some(dept.id))
                .collect();
            let salaries: Vec<f64> = members
                .iter()
                .filter_map(|e| latest.get(&e.id))
                .map(|c| to_f64(c.base_salary))
                .collect();
            DepartmentStats {
                department_id: dept.id,
                department_name: dept.name,
                employee_count: members.len() as u64,
                average_salary: money(mean(&salaries)),
            }
        })
        .collect();
    // Stable sort keeps name order among equal counts.
    stats.sort_by(|a, b| b.employee_count.cmp(&a.employee_count));
    Ok(stats)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTurnover {
    pub year: i32,
    #[serde(flatten)]
    pub metrics: TurnoverMetrics,
}

/// Calendar-year turnover with a January to December breakdown.
pub async fn turnover_for_year(db: &DatabaseConnection, year: i32) -> HrResult<YearTurnover> {
    let period = Period::calendar_year(year)
        .ok_or_else(|| HrError::InvalidInput(format!("year {year} is out of range")))?;
    let metrics = turnover::turnover_metrics(db, period).await?;
    Ok(YearTurnover { year, metrics })
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCompensation {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub average_salary: Decimal,
    pub employee_count: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationTrend {
    pub months: u32,
    pub monthly_data: Vec<MonthlyCompensation>,
}

/// Average base salary of pay changes effective in each of the last `months` months.
#[instrument(skip(db))]
pub async fn compensation_trend(
    db: &DatabaseConnection,
    months: u32,
    today: NaiveDate,
) -> HrResult<CompensationTrend> {
    let since = add_months(today, -(months.min(600) as i32));
    let rows = compensation::Entity::find()
        .filter(compensation::Column::EffectiveDate.between(since, today))
        .all(db)
        .await?;

    let mut groups: BTreeMap<(i32, u32), Vec<&compensation::Model>> = BTreeMap::new();
    for row in &rows {
        groups
            .entry((row.effective_date.year(), row.effective_date.month()))
            .or_default()
            .push(row);
    }
    let monthly_data = groups
        .into_iter()
        .map(|((year, month), rows)| {
            let salaries: Vec<f64> = rows.iter().map(|c| to_f64(c.base_salary)).collect();
            let distinct: HashSet<i32> = rows.iter().map(|c| c.employee_id).collect();
            let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today);
            MonthlyCompensation {
                year,
                month,
                month_name: first.format("%b %Y").to_string(),
                average_salary: money(mean(&salaries)),
                employee_count: distinct.len() as u64,
            }
        })
        .collect();
    Ok(CompensationTrend {
        months,
        monthly_data,
    })
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceTypeMetrics {
    pub absence_type_id: i32,
    pub absence_type_name: String,
    pub total_days: i64,
    pub occurrences: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearAbsences {
    pub year: i32,
    pub absence_type_metrics: Vec<AbsenceTypeMetrics>,
}

/// Calendar days and occurrences per absence type for absences overlapping `year`.
#[instrument(skip(db))]
pub async fn absences_for_year(db: &DatabaseConnection, year: i32) -> HrResult<YearAbsences> {
    let period = Period::calendar_year(year)
        .ok_or_else(|| HrError::InvalidInput(format!("year {year} is out of range")))?;
    let rows = absence::Entity::find()
        .filter(absence::Column::StartDate.lte(period.to))
        .all(db)
        .await?;
    let names: HashMap<i32, String> = absence_type::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut by_type: HashMap<i32, AbsenceTypeMetrics> = HashMap::new();
    for row in rows {
        let last = row.end_date.unwrap_or(row.start_date);
        if last < period.from {
            continue;
        }
        let entry = by_type
            .entry(row.absence_type_id)
            .or_insert_with(|| AbsenceTypeMetrics {
                absence_type_id: row.absence_type_id,
                absence_type_name: names.get(&row.absence_type_id).cloned().unwrap_or_default(),
                total_days: 0,
                occurrences: 0,
            });
        entry.total_days += (last - row.start_date).num_days() + 1;
        entry.occurrences += 1;
    }
    let mut absence_type_metrics: Vec<_> = by_type.into_values().collect();
    absence_type_metrics.sort_by(|a, b| {
        b.total_days
            .cmp(&a.total_days)
            .then_with(|| a.absence_type_name.cmp(&b.absence_type_name))
    });
    Ok(YearAbsences {
        year,
        absence_type_metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, at, day};
    use chrono::TimeZone;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn summary_counts_recent_movement() {
        let db = testing::db().await;
        let kind = testing::absence_type(&db, "Sick Leave").await;
        let a = testing::employee(&db, Hire::new("E1", day(2025, 6, 1))).await;
        let mut gone = Hire::new("E2", day(2020, 1, 1));
        gone.termination_date = Some(day(2025, 6, 2));
        testing::employee(&db, gone).await;
        testing::compensation(&db, a.id, day(2025, 6, 1), 90_000).await;
        testing::compensation(&db, a.id, day(2025, 1, 1), 80_000).await;
        testing::absence(&db, a.id, kind.id, at(2025, 6, 5, 9), 8.0, false).await;
        testing::absence(&db, a.id, kind.id, at(2025, 6, 6, 19), 2.0, true).await;

        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let s = summary(&db, now).await.unwrap();
        assert_eq!(s.total_employees, 2);
        assert_eq!(s.active_employees, 1);
        assert_eq!(s.new_hires, 1);
        assert_eq!(s.terminations, 1);
        assert_eq!(s.total_payroll, Decimal::from(90_000));
        assert_eq!(s.average_salary, Decimal::from(45_000));
        assert_eq!(s.overtime_cost, Decimal::from(80));
        assert_eq!(s.absence_cost, Decimal::from(320));
        assert_eq!(s.turnover_rate, 50.0);
        assert_eq!(s.absence_rate, 100.0);
        assert_eq!(s.last_updated, now);
    }

    #[tokio::test]
    async fn department_stats_rank_by_headcount() {
        let db = testing::db().await;
        let small = testing::department(&db, "Finance").await;
        let big = testing::department(&db, "Sales").await;
        testing::department(&db, "Marketing").await;
        for (number, dept, salary) in [("E1", big.id, 60_000), ("E2", big.id, 80_000), ("E3", small.id, 90_000)] {
            let mut hire = Hire::new(number, day(2024, 1, 1));
            hire.department_id = Some(dept);
            let e = testing::employee(&db, hire).await;
            testing::compensation(&db, e.id, day(2024, 1, 1), salary).await;
        }

        let stats = department_stats(&db).await.unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.department_name.as_str()).collect();
        assert_eq!(names, vec!["Sales", "Finance", "Marketing"]);
        assert_eq!(stats[0].average_salary, Decimal::from(70_000));
        assert_eq!(stats[2].employee_count, 0);
        assert_eq!(stats[2].average_salary, Decimal::ZERO);
    }

    #[tokio::test]
    async fn compensation_trend_groups_by_effective_month() {
        let db = testing::db().await;
        let a = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let b = testing::employee(&db, Hire::new("E2", day(2024, 1, 1))).await;
        testing::compensation(&db, a.id, day(2025, 3, 1), 60_000).await;
        testing::compensation(&db, b.id, day(2025, 3, 20), 80_000).await;
        testing::compensation(&db, a.id, day(2025, 5, 1), 66_000).await;
        testing::compensation(&db, a.id, day(2023, 5, 1), 50_000).await;

        let trend = compensation_trend(&db, 12, day(2025, 6, 15)).await.unwrap();
        assert_eq!(trend.monthly_data.len(), 2);
        let march = &trend.monthly_data[0];
        assert_eq!(march.month_name, "Mar 2025");
        assert_eq!(march.average_salary, Decimal::from(70_000));
        assert_eq!(march.employee_count, 2);
        assert_eq!(trend.monthly_data[1].month, 5);
    }

    #[tokio::test]
    async fn absence_days_include_both_ends() {
        let db = testing::db().await;
        let vacation = testing::absence_type(&db, "Vacation").await;
        let sick = testing::absence_type(&db, "Sick Leave").await;
        let e = testing::employee(&db, Hire::new("E1", day(2020, 1, 1))).await;
        let trip = testing::absence(&db, e.id, vacation.id, at(2024, 12, 30, 9), 8.0, false).await;
        let mut trip: absence::ActiveModel = trip.into();
        trip.end_date = Set(Some(day(2025, 1, 3)));
        trip.update(&db).await.unwrap();
        testing::absence(&db, e.id, sick.id, at(2025, 2, 1, 9), 8.0, false).await;
        testing::absence(&db, e.id, sick.id, at(2024, 2, 1, 9), 8.0, false).await;

        let year = absences_for_year(&db, 2025).await.unwrap();
        assert_eq!(year.absence_type_metrics.len(), 2);
        let first = &year.absence_type_metrics[0];
        assert_eq!(first.absence_type_name, "Vacation");
        assert_eq!(first.total_days, 5);
        assert_eq!(year.absence_type_metrics[1].occurrences, 1);
    }

    #[tokio::test]
    async fn year_turnover_is_flattened() {
        let db = testing::db().await;
        let report = turnover_for_year(&db, 2024).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["year"], 2024);
        assert_eq!(json["byMonth"].as_array().unwrap().len(), 12);
        assert_eq!(json["overallTurnoverRate"], 0.0);
    }
}
