//! Exits, hires and what turnover costs.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use entity::employee_exit::{self, ExitType};
use entity::employee_start;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::analytics::TURNOVER_COST_PER_EXIT;
use crate::error::HrResult;
use crate::period::{Period, check_dates, month_end, month_label, months_between, trailing_months};
use crate::stats::{pct, round_to};
use crate::workforce::{self, department_of, headcount_on};

/// Replacement cost per exit on the turnover cost chart.
pub const REPLACEMENT_COST_PER_EXIT: i64 = 25_000;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnoverCosts {
    pub labels: Vec<String>,
    pub replacement_cost: Vec<i64>,
    pub voluntary_pct: Vec<f64>,
    pub involuntary_pct: Vec<f64>,
}

async fn exits_between(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> HrResult<Vec<employee_exit::Model>> {
    Ok(employee_exit::Entity::find()
        .filter(employee_exit::Column::ExitDate.between(from, to))
        .order_by_asc(employee_exit::Column::ExitDate)
        .all(db)
        .await?)
}

/// Trailing twelve months of exits, split by exit type as a share of month-end headcount.
#[instrument(skip(db))]
pub async fn turnover_costs(db: &DatabaseConnection, today: NaiveDate) -> HrResult<TurnoverCosts> {
    let months = trailing_months(today, 12);
    let employees = workforce::employees(db).await?;
    let exits = match (months.first(), months.last()) {
        (Some(first), Some(last)) => exits_between(db, *first, month_end(*last)).await?,
        _ => Vec::new(),
    };

    let mut by_month: HashMap<(i32, u32), (i64, i64)> = HashMap::new();
    for exit in &exits {
        let entry = by_month
            .entry((exit.exit_date.year(), exit.exit_date.month()))
            .or_default();
        match exit.exit_type {
            ExitType::Voluntary => entry.0 += 1,
            ExitType::Involuntary => entry.1 += 1,
        }
    }

    let mut costs = TurnoverCosts {
        labels: Vec::new(),
        replacement_cost: Vec::new(),
        voluntary_pct: Vec::new(),
        involuntary_pct: Vec::new(),
    };
    for first in months {
        let (voluntary, involuntary) = by_month
            .get(&(first.year(), first.month()))
            .copied()
            .unwrap_or_default();
        let headcount = headcount_on(&employees, month_end(first)) as f64;
        costs.labels.push(month_label(first));
        costs
            .replacement_cost
            .push((voluntary + involuntary) * REPLACEMENT_COST_PER_EXIT);
        costs
            .voluntary_pct
            .push(round_to(pct(voluntary as f64, headcount), 2));
        costs
            .involuntary_pct
            .push(round_to(pct(involuntary as f64, headcount), 2));
    }
    Ok(costs)
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentTurnover {
    pub department_name: String,
    pub employees: u64,
    pub hires: u64,
    pub terminations: u64,
    pub turnover_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTurnover {
    pub year: i32,
    pub month: u32,
    pub hires: u64,
    pub terminations: u64,
    pub turnover_rate: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoverMetrics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hires: u64,
    pub total_exits: u64,
    pub voluntary_exits: u64,
    pub involuntary_exits: u64,
    pub overall_turnover_rate: f64,
    pub voluntary_turnover_rate: f64,
    pub involuntary_turnover_rate: f64,
    pub turnover_cost: Decimal,
    pub by_department: Vec<DepartmentTurnover>,
    pub by_month: Vec<MonthlyTurnover>,
}

/// Turnover inside `period`. Overall rates divide by every employee on
/// record, department rates by the department roster and monthly rates by
/// month-end headcount.
#[instrument(skip(db))]
pub async fn turnover_metrics(db: &DatabaseConnection, period: Period) -> HrResult<TurnoverMetrics> {
    check_dates(&[Some(period.from), Some(period.to)])?;
    let employees = workforce::employees(db).await?;
    let names = workforce::department_names(db).await?;
    let exits = exits_between(db, period.from, period.to).await?;
    let starts = employee_start::Entity::find()
        .filter(employee_start::Column::StartDate.between(period.from, period.to))
        .all(db)
        .await?;

    let total_employees = employees.len() as f64;
    let total_exits = exits.len() as u64;
    let voluntary_exits = exits
        .iter()
        .filter(|e| e.exit_type == ExitType::Voluntary)
        .count() as u64;
    let involuntary_exits = total_exits - voluntary_exits;

    let department_by_employee: HashMap<i32, String> = employees
        .iter()
        .map(|e| (e.id, department_of(e, &names)))
        .collect();
    let department_for = |employee_id: i32| {
        department_by_employee
            .get(&employee_id)
            .cloned()
            .unwrap_or_else(|| "Unassigned".to_string())
    };

    let mut departments: BTreeMap<String, DepartmentTurnover> = BTreeMap::new();
    for name in names.values() {
        department_entry(&mut departments, name.clone());
    }
    for employee in &employees {
        department_entry(&mut departments, department_for(employee.id)).employees += 1;
    }
    for start in &starts {
        department_entry(&mut departments, department_for(start.employee_id)).hires += 1;
    }
    for exit in &exits {
        department_entry(&mut departments, department_for(exit.employee_id)).terminations += 1;
    }
    let by_department = departments
        .into_values()
        .map(|mut row| {
            row.turnover_rate = round_to(pct(row.terminations as f64, row.employees as f64), 2);
            row
        })
        .collect();

    let by_month = months_between(period.from, period.to)
        .into_iter()
        .map(|first| {
            let in_month = |day: NaiveDate| day.year() == first.year() && day.month() == first.month();
            let hires = starts.iter().filter(|s| in_month(s.start_date)).count() as u64;
            let terminations = exits.iter().filter(|e| in_month(e.exit_date)).count() as u64;
            let headcount = headcount_on(&employees, month_end(first)) as f64;
            MonthlyTurnover {
                year: first.year(),
                month: first.month(),
                hires,
                terminations,
                turnover_rate: round_to(pct(terminations as f64, headcount), 2),
            }
        })
        .collect();

    Ok(TurnoverMetrics {
        start_date: period.from,
        end_date: period.to,
        total_hires: starts.len() as u64,
        total_exits,
        voluntary_exits,
        involuntary_exits,
        overall_turnover_rate: round_to(pct(total_exits as f64, total_employees), 2),
        voluntary_turnover_rate: round_to(pct(voluntary_exits as f64, total_employees), 2),
        involuntary_turnover_rate: round_to(pct(involuntary_exits as f64, total_employees), 2),
        turnover_cost: Decimal::from(TURNOVER_COST_PER_EXIT * total_exits as i64),
        by_department,
        by_month,
    })
}

fn department_entry(
    map: &mut BTreeMap<String, DepartmentTurnover>,
    name: String,
) -> &mut DepartmentTurnover {
    map.entry(name.clone()).or_insert_with(|| DepartmentTurnover {
        department_name: name,
        employees: 0,
        hires: 0,
        terminations: 0,
        turnover_rate: 0.0,
    })
}
