//! Snapshot loaders shared by the analytics services.

use std::collections::HashMap;

use chrono::NaiveDate;
use entity::{compensation, department, employee};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::error::HrResult;

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Two-decimal money value from a float aggregate.
pub fn money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

pub async fn employees(db: &DatabaseConnection) -> HrResult<Vec<employee::Model>> {
    Ok(employee::Entity::find()
        .order_by_asc(employee::Column::Id)
        .all(db)
        .await?)
}

pub async fn department_names(db: &DatabaseConnection) -> HrResult<HashMap<i32, String>> {
    let rows = department::Entity::find().all(db).await?;
    Ok(rows.into_iter().map(|d| (d.id, d.name)).collect())
}

/// Latest row per employee by `effective_date`, ties broken by the highest id.
pub async fn latest_compensations(
    db: &DatabaseConnection,
) -> HrResult<HashMap<i32, compensation::Model>> {
    let rows = compensation::Entity::find()
        .order_by_asc(compensation::Column::EffectiveDate)
        .order_by_asc(compensation::Column::Id)
        .all(db)
        .await?;
    Ok(latest_by_employee(rows))
}

pub fn latest_by_employee(rows: Vec<compensation::Model>) -> HashMap<i32, compensation::Model> {
    let mut latest: HashMap<i32, compensation::Model> = HashMap::new();
    for row in rows {
        let replace = latest
            .get(&row.employee_id)
            .is_none_or(|seen| (row.effective_date, row.id) > (seen.effective_date, seen.id));
        if replace {
            latest.insert(row.employee_id, row);
        }
    }
    latest
}

/// Employees on payroll on `day`.
pub fn headcount_on(employees: &[employee::Model], day: NaiveDate) -> usize {
    employees.iter().filter(|e| e.is_employed_on(day)).count()
}

/// Employees on payroll at any point between `start` and `end`.
pub fn headcount_during(employees: &[employee::Model], start: NaiveDate, end: NaiveDate) -> usize {
    employees
        .iter()
        .filter(|e| {
            e.hire_date.is_some_and(|hire| hire <= end)
                && e.termination_date.is_none_or(|term| term > start)
        })
        .count()
}

pub fn department_of(employee: &employee::Model, names: &HashMap<i32, String>) -> String {
    employee
        .department_id
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| "Unassigned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn comp(id: i32, employee_id: i32, effective: NaiveDate, base: Decimal) -> compensation::Model {
        compensation::Model {
            id,
            employee_id,
            pay_grade_id: None,
            effective_date: effective,
            end_date: None,
            base_salary: base,
            bonus: Decimal::ZERO,
            commission: Decimal::ZERO,
            benefits: Decimal::ZERO,
            payroll_taxes: Decimal::ZERO,
            total_compensation: base,
            currency: "USD".into(),
            pay_frequency: "Annual".into(),
            is_active: true,
        }
    }

    #[test]
    fn latest_row_wins_and_ties_take_highest_id() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jun = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let rows = vec![
            comp(3, 1, jun, dec!(61000)),
            comp(1, 1, jan, dec!(50000)),
            comp(4, 1, jun, dec!(62000)),
            comp(2, 2, jan, dec!(70000)),
        ];
        let latest = latest_by_employee(rows);
        assert_eq!(latest[&1].base_salary, dec!(62000));
        assert_eq!(latest[&2].base_salary, dec!(70000));
    }

    #[test]
    fn money_rounds_to_cents() {
        assert_eq!(money(10.456), dec!(10.46));
        assert_eq!(to_f64(dec!(12.5)), 12.5);
    }
}
