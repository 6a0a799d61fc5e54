//! Payroll reports: period summaries, earnings history, department roll-ups
//! and withholding totals.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use entity::{department, employee, payroll};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::error::{HrError, HrResult};
use crate::period::{add_months, check_dates};
use crate::workforce::department_of;

const DATE_FORMAT: &str = "%m/%d/%Y";

fn span_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummaryRow {
    pub employee_id: i32,
    pub employee_name: String,
    pub department: String,
    pub pay_period: String,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
    pub total_deductions: Decimal,
    pub total_taxes: Decimal,
    pub pay_date: NaiveDate,
}

/// Payroll runs whose pay period lies entirely inside `[start, end]`.
/// Defaults to the month leading up to `today`.
#[instrument(skip(db))]
pub async fn payroll_summary(
    db: &DatabaseConnection,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> HrResult<Vec<PayrollSummaryRow>> {
    check_dates(&[start, end])?;
    let start = start.unwrap_or_else(|| add_months(today, -1));
    let end = end.unwrap_or(today);
    let rows = payroll::Entity::find()
        .filter(payroll::Column::PayPeriodStart.gte(start))
        .filter(payroll::Column::PayPeriodEnd.lte(end))
        .find_also_related(employee::Entity)
        .order_by_asc(payroll::Column::PayPeriodEnd)
        .order_by_asc(payroll::Column::EmployeeId)
        .all(db)
        .await?;
    let departments = crate::workforce::department_names(db).await?;
    Ok(rows
        .into_iter()
        .map(|(run, employee)| PayrollSummaryRow {
            employee_id: run.employee_id,
            employee_name: employee.as_ref().map(|e| e.full_name()).unwrap_or_default(),
            department: employee
                .as_ref()
                .filter(|e| e.department_id.is_some())
                .map(|e| department_of(e, &departments))
                .unwrap_or_else(|| "N/A".into()),
            pay_period: span_label(run.pay_period_start, run.pay_period_end),
            gross_pay: run.gross_pay,
            net_pay: run.net_pay,
            total_deductions: run.total_deductions,
            total_taxes: run.total_taxes,
            pay_date: run.pay_date,
        })
        .collect())
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRow {
    pub pay_period_end: NaiveDate,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub pay_date: NaiveDate,
}

/// Pay history of one employee, oldest period first. Defaults to the year
/// leading up to `today`.
#[instrument(skip(db))]
pub async fn employee_earnings(
    db: &DatabaseConnection,
    employee_id: i32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> HrResult<Vec<EarningsRow>> {
    check_dates(&[start, end])?;
    let start = start.unwrap_or_else(|| add_months(today, -12));
    let end = end.unwrap_or(today);
    let rows = payroll::Entity::find()
        .filter(payroll::Column::EmployeeId.eq(employee_id))
        .filter(payroll::Column::PayPeriodEnd.gte(start))
        .filter(payroll::Column::PayPeriodEnd.lte(end))
        .order_by_asc(payroll::Column::PayPeriodEnd)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|run| EarningsRow {
            pay_period_end: run.pay_period_end,
            gross_pay: run.gross_pay,
            net_pay: run.net_pay,
            regular_hours: run.regular_hours,
            overtime_hours: run.overtime_hours,
            pay_date: run.pay_date,
        })
        .collect())
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayrollSummary {
    pub employee_id: i32,
    pub employee_name: String,
    pub position: String,
    pub total_earnings: Decimal,
    pub average_pay: Decimal,
    pub last_pay_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayrollReport {
    pub department_id: i32,
    pub department_name: String,
    pub report_period: String,
    pub total_employees: usize,
    pub total_payroll_cost: Decimal,
    pub employee_payrolls: Vec<EmployeePayrollSummary>,
}

/// Gross pay of every member of a department over pay periods ending in
/// `[start, end]`, highest earner first. Defaults to the trailing year.
#[instrument(skip(db))]
pub async fn department_payroll(
    db: &DatabaseConnection,
    department_id: i32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> HrResult<DepartmentPayrollReport> {
    check_dates(&[start, end])?;
    let department = department::Entity::find_by_id(department_id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::NotFound("Department not found".into()))?;
    let start = start.unwrap_or_else(|| add_months(today, -12));
    let end = end.unwrap_or(today);

    let members = employee::Entity::find()
        .filter(employee::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?;
    let ids: Vec<i32> = members.iter().map(|e| e.id).collect();
    let mut runs: HashMap<i32, Vec<payroll::Model>> = HashMap::new();
    if !ids.is_empty() {
        for run in payroll::Entity::find()
            .filter(payroll::Column::EmployeeId.is_in(ids))
            .filter(payroll::Column::PayPeriodEnd.gte(start))
            .filter(payroll::Column::PayPeriodEnd.lte(end))
            .all(db)
            .await?
        {
            runs.entry(run.employee_id).or_default().push(run);
        }
    }

    let mut employee_payrolls: Vec<EmployeePayrollSummary> = members
        .iter()
        .map(|member| {
            let own = runs.get(&member.id).map(Vec::as_slice).unwrap_or_default();
            let total: Decimal = own.iter().map(|r| r.gross_pay).sum();
            let average = if own.is_empty() {
                Decimal::ZERO
            } else {
                (total / Decimal::from(own.len() as i64)).round_dp(2)
            };
            EmployeePayrollSummary {
                employee_id: member.id,
                employee_name: member.full_name(),
                position: member.position.clone(),
                total_earnings: total,
                average_pay: average,
                last_pay_date: own.iter().map(|r| r.pay_date).max(),
            }
        })
        .collect();
    employee_payrolls.sort_by(|a, b| b.total_earnings.cmp(&a.total_earnings));

    Ok(DepartmentPayrollReport {
        department_id: department.id,
        department_name: department.name,
        report_period: span_label(start, end),
        total_employees: members.len(),
        total_payroll_cost: employee_payrolls.iter().map(|e| e.total_earnings).sum(),
        employee_payrolls,
    })
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTaxSummary {
    pub employee_id: i32,
    pub employee_name: String,
    pub total_wages: Decimal,
    pub federal_income_tax: Decimal,
    pub social_security_tax: Decimal,
    pub medicare_tax: Decimal,
    pub state_income_tax: Decimal,
    pub local_income_tax: Decimal,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub year: i32,
    /// 0 for a full-year report.
    pub quarter: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_wages: Decimal,
    /// Federal income tax plus social security and medicare.
    pub total_federal_tax_withheld: Decimal,
    pub total_state_tax_withheld: Decimal,
    pub total_local_tax_withheld: Decimal,
    pub employee_tax_summaries: Vec<EmployeeTaxSummary>,
}

fn tax_window(year: i32, quarter: Option<u32>) -> HrResult<(NaiveDate, NaiveDate)> {
    let invalid = || HrError::InvalidInput(format!("invalid tax period {year}/{quarter:?}"));
    match quarter {
        Some(q @ 1..=4) => {
            let start = NaiveDate::from_ymd_opt(year, (q - 1) * 3 + 1, 1).ok_or_else(invalid)?;
            let end = start
                .checked_add_months(Months::new(3))
                .and_then(|next| next.pred_opt())
                .ok_or_else(invalid)?;
            Ok((start, end))
        }
        Some(_) => Err(invalid()),
        None => Ok((
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?,
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?,
        )),
    }
}

/// Withholding totals for payrolls paid within a calendar year or one of
/// its quarters.
#[instrument(skip(db))]
pub async fn tax_report(
    db: &DatabaseConnection,
    year: i32,
    quarter: Option<u32>,
) -> HrResult<TaxReport> {
    let (start, end) = tax_window(year, quarter)?;
    let rows = payroll::Entity::find()
        .filter(payroll::Column::PayDate.gte(start))
        .filter(payroll::Column::PayDate.lte(end))
        .find_also_related(employee::Entity)
        .all(db)
        .await?;

    let mut by_employee: HashMap<i32, EmployeeTaxSummary> = HashMap::new();
    for (run, employee) in &rows {
        let entry = by_employee
            .entry(run.employee_id)
            .or_insert_with(|| EmployeeTaxSummary {
                employee_id: run.employee_id,
                employee_name: employee.as_ref().map(|e| e.full_name()).unwrap_or_default(),
                total_wages: Decimal::ZERO,
                federal_income_tax: Decimal::ZERO,
                social_security_tax: Decimal::ZERO,
                medicare_tax: Decimal::ZERO,
                state_income_tax: Decimal::ZERO,
                local_income_tax: Decimal::ZERO,
            });
        entry.total_wages += run.gross_pay;
        entry.federal_income_tax += run.federal_income_tax;
        entry.social_security_tax += run.social_security_tax;
        entry.medicare_tax += run.medicare_tax;
        entry.state_income_tax += run.state_income_tax;
        entry.local_income_tax += run.local_income_tax;
    }
    let mut employee_tax_summaries: Vec<EmployeeTaxSummary> = by_employee.into_values().collect();
    employee_tax_summaries.sort_by(|a, b| {
        a.employee_name
            .cmp(&b.employee_name)
            .then(a.employee_id.cmp(&b.employee_id))
    });

    let runs = rows.iter().map(|(run, _)| run);
    Ok(TaxReport {
        year,
        quarter: quarter.unwrap_or(0),
        start_date: start,
        end_date: end,
        total_wages: runs.clone().map(|r| r.gross_pay).sum(),
        total_federal_tax_withheld: runs
            .clone()
            .map(|r| r.federal_income_tax + r.social_security_tax + r.medicare_tax)
            .sum(),
        total_state_tax_withheld: runs.clone().map(|r| r.state_income_tax).sum(),
        total_local_tax_withheld: runs.map(|r| r.local_income_tax).sum(),
        employee_tax_summaries,
    })
}
