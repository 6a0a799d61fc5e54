//! Compensation records: CRUD, per-employee history and salary trends.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use entity::{compensation, employee, pay_grade};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::audit::{self, ACTION_CREATE, ACTION_DELETE, ACTION_UPDATE, Actor, Change};
use crate::error::{HrError, HrResult};
use crate::period::check_dates;
use crate::stats::{SalaryStats, round_to};
use crate::workforce::{self, department_of, money, to_f64};

const ENTITY: &str = "Compensation";
const TABLE: &str = "Compensations";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationView {
    #[serde(flatten)]
    pub record: compensation::Model,
    pub employee_name: String,
    pub pay_grade: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationInput {
    pub id: Option<i32>,
    pub employee_id: i32,
    pub pay_grade_id: Option<i32>,
    pub effective_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub base_salary: Decimal,
    #[serde(default)]
    pub bonus: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub benefits: Decimal,
    #[serde(default)]
    pub payroll_taxes: Decimal,
    /// Derived from the components when omitted.
    pub total_compensation: Option<Decimal>,
    pub currency: Option<String>,
    pub pay_frequency: Option<String>,
    pub is_active: Option<bool>,
}

impl CompensationInput {
    fn validate(&self) -> HrResult<()> {
        let parts = [
            self.base_salary,
            self.bonus,
            self.commission,
            self.benefits,
            self.payroll_taxes,
        ];
        if parts.iter().any(|v| v.is_sign_negative() && !v.is_zero()) {
            return Err(HrError::InvalidInput(
                "compensation amounts cannot be negative".into(),
            ));
        }
        if self.end_date.is_some_and(|end| end < self.effective_date) {
            return Err(HrError::InvalidInput(
                "endDate must not precede effectiveDate".into(),
            ));
        }
        Ok(())
    }

    fn total(&self) -> Decimal {
        self.total_compensation.unwrap_or(
            self.base_salary + self.bonus + self.commission + self.benefits + self.payroll_taxes,
        )
    }

    fn apply(self, active: &mut compensation::ActiveModel) {
        let total = self.total();
        active.employee_id = Set(self.employee_id);
        active.pay_grade_id = Set(self.pay_grade_id);
        active.effective_date = Set(self.effective_date);
        active.end_date = Set(self.end_date);
        active.base_salary = Set(self.base_salary);
        active.bonus = Set(self.bonus);
        active.commission = Set(self.commission);
        active.benefits = Set(self.benefits);
        active.payroll_taxes = Set(self.payroll_taxes);
        active.total_compensation = Set(total);
        active.currency = Set(self.currency.unwrap_or_else(|| "USD".into()));
        active.pay_frequency = Set(self.pay_frequency.unwrap_or_else(|| "Annual".into()));
        active.is_active = Set(self.is_active.unwrap_or(true));
    }
}

async fn ensure_references(db: &DatabaseConnection, input: &CompensationInput) -> HrResult<()> {
    if employee::Entity::find_by_id(input.employee_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(HrError::InvalidInput(format!(
            "employee {} does not exist",
            input.employee_id
        )));
    }
    if let Some(grade) = input.pay_grade_id {
        if pay_grade::Entity::find_by_id(grade).one(db).await?.is_none() {
            return Err(HrError::InvalidInput(format!(
                "pay grade {grade} does not exist"
            )));
        }
    }
    Ok(())
}

async fn views(
    db: &DatabaseConnection,
    rows: Vec<(compensation::Model, Option<employee::Model>)>,
) -> HrResult<Vec<CompensationView>> {
    let grades: HashMap<i32, String> = pay_grade::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();
    Ok(rows
        .into_iter()
        .map(|(record, employee)| CompensationView {
            employee_name: employee.map(|e| e.full_name()).unwrap_or_default(),
            pay_grade: record.pay_grade_id.and_then(|id| grades.get(&id).cloned()),
            record,
        })
        .collect())
}

fn not_found(id: i32) -> HrError {
    HrError::not_found(format!("Compensation {id} not found"))
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> HrResult<Vec<CompensationView>> {
    let rows = compensation::Entity::find()
        .find_also_related(employee::Entity)
        .order_by_asc(compensation::Column::Id)
        .all(db)
        .await?;
    views(db, rows).await
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> HrResult<CompensationView> {
    let row = compensation::Entity::find_by_id(id)
        .find_also_related(employee::Entity)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    let mut out = views(db, vec![row]).await?;
    out.pop().ok_or_else(|| not_found(id))
}

/// Full history for one employee, newest first.
#[instrument(skip(db))]
pub async fn for_employee(db: &DatabaseConnection, employee_id: i32) -> HrResult<Vec<CompensationView>> {
    let rows = compensation::Entity::find()
        .filter(compensation::Column::EmployeeId.eq(employee_id))
        .find_also_related(employee::Entity)
        .order_by_desc(compensation::Column::EffectiveDate)
        .order_by_desc(compensation::Column::Id)
        .all(db)
        .await?;
    views(db, rows).await
}

/// The row with the latest effective date on or before `today`.
#[instrument(skip(db))]
pub async fn current_for_employee(
    db: &DatabaseConnection,
    employee_id: i32,
    today: NaiveDate,
) -> HrResult<CompensationView> {
    let row = compensation::Entity::find()
        .filter(compensation::Column::EmployeeId.eq(employee_id))
        .filter(compensation::Column::EffectiveDate.lte(today))
        .find_also_related(employee::Entity)
        .order_by_desc(compensation::Column::EffectiveDate)
        .order_by_desc(compensation::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("No compensation record found for this employee"))?;
    let mut out = views(db, vec![row]).await?;
    out.pop()
        .ok_or_else(|| HrError::not_found("No compensation record found for this employee"))
}

#[instrument(skip(db, input))]
pub async fn create(
    db: &DatabaseConnection,
    input: CompensationInput,
    actor: &Actor,
    now: DateTime<Utc>,
) -> HrResult<compensation::Model> {
    input.validate()?;
    ensure_references(db, &input).await?;
    let mut active = compensation::ActiveModel {
        ..Default::default()
    };
    input.apply(&mut active);

    let txn = db.begin().await?;
    let created = active.insert(&txn).await?;
    audit::record(
        &txn,
        actor,
        Change {
            entity_name: ENTITY,
            table_name: TABLE,
            entity_id: created.id,
            action: ACTION_CREATE,
            before: None,
            after: Some(&created),
        },
        now,
    )
    .await?;
    txn.commit().await?;
    info!(compensation_id = created.id, employee_id = created.employee_id, "compensation created");
    Ok(created)
}

/// Replaces a row. The body id must equal the path id.
#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: CompensationInput,
    actor: &Actor,
    now: DateTime<Utc>,
) -> HrResult<compensation::Model> {
    if input.id != Some(id) {
        return Err(HrError::IdMismatch);
    }
    input.validate()?;
    let existing = compensation::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_references(db, &input).await?;

    let mut active: compensation::ActiveModel = existing.clone().into();
    input.apply(&mut active);
    let txn = db.begin().await?;
    let updated = active.update(&txn).await?;
    audit::record(
        &txn,
        actor,
        Change {
            entity_name: ENTITY,
            table_name: TABLE,
            entity_id: id,
            action: ACTION_UPDATE,
            before: Some(&existing),
            after: Some(&updated),
        },
        now,
    )
    .await?;
    txn.commit().await?;
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(
    db: &DatabaseConnection,
    id: i32,
    actor: &Actor,
    now: DateTime<Utc>,
) -> HrResult<()> {
    let existing = compensation::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    let txn = db.begin().await?;
    existing.clone().delete(&txn).await?;
    audit::record(
        &txn,
        actor,
        Change {
            entity_name: ENTITY,
            table_name: TABLE,
            entity_id: id,
            action: ACTION_DELETE,
            before: Some(&existing),
            after: None,
        },
        now,
    )
    .await?;
    txn.commit().await?;
    info!(compensation_id = id, "compensation deleted");
    Ok(())
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCompensation {
    pub department_name: String,
    pub average_salary: Decimal,
    pub median_salary: Decimal,
    pub total_compensation: Decimal,
    pub employee_count: u64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthCompensation {
    pub year: i32,
    pub month: u32,
    pub average_salary: Decimal,
    pub total_compensation: Decimal,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayGradeCompensation {
    pub pay_grade_name: String,
    pub average_salary: Decimal,
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub total_compensation: Decimal,
    pub employee_count: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationTrends {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub average_salary: Decimal,
    pub median_salary: Decimal,
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub salary_variance: f64,
    pub by_department: Vec<DepartmentCompensation>,
    pub by_month: Vec<MonthCompensation>,
    pub by_pay_grade: Vec<PayGradeCompensation>,
}

#[derive(Default)]
struct Bucket {
    salaries: Vec<f64>,
    total: Decimal,
    employees: HashSet<i32>,
}

impl Bucket {
    fn push(&mut self, row: &compensation::Model) {
        self.salaries.push(to_f64(row.base_salary));
        self.total += row.total_compensation;
        self.employees.insert(row.employee_id);
    }
}

/// Salary statistics over pay changes, optionally limited to one
/// department. Each bound filters `effective_date` only when supplied.
#[instrument(skip(db))]
pub async fn trends(
    db: &DatabaseConnection,
    department_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> HrResult<CompensationTrends> {
    check_dates(&[start, end])?;
    let mut select = compensation::Entity::find();
    if let Some(start) = start {
        select = select.filter(compensation::Column::EffectiveDate.gte(start));
    }
    if let Some(end) = end {
        select = select.filter(compensation::Column::EffectiveDate.lte(end));
    }
    let rows = select
        .find_also_related(employee::Entity)
        .all(db)
        .await?;
    let names = workforce::department_names(db).await?;
    let grades: HashMap<i32, String> = pay_grade::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();

    let rows: Vec<_> = rows
        .into_iter()
        .filter(|(_, employee)| {
            department_id.is_none()
                || employee.as_ref().and_then(|e| e.department_id) == department_id
        })
        .collect();

    let mut overall = Vec::with_capacity(rows.len());
    let mut by_department: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
    let mut by_grade: BTreeMap<String, Bucket> = BTreeMap::new();
    for (row, employee) in &rows {
        overall.push(to_f64(row.base_salary));
        let department = employee
            .as_ref()
            .map(|e| department_of(e, &names))
            .unwrap_or_else(|| "Unassigned".to_string());
        by_department.entry(department).or_default().push(row);
        by_month
            .entry((row.effective_date.year(), row.effective_date.month()))
            .or_default()
            .push(row);
        let grade = row
            .pay_grade_id
            .and_then(|id| grades.get(&id).cloned())
            .unwrap_or_else(|| "Ungraded".to_string());
        by_grade.entry(grade).or_default().push(row);
    }

    let stats = SalaryStats::from_values(&overall);
    Ok(CompensationTrends {
        start_date: start,
        end_date: end,
        average_salary: money(stats.mean),
        median_salary: money(stats.median),
        min_salary: money(stats.min),
        max_salary: money(stats.max),
        salary_variance: round_to(stats.variance, 2),
        by_department: by_department
            .into_iter()
            .map(|(department_name, bucket)| {
                let s = SalaryStats::from_values(&bucket.salaries);
                DepartmentCompensation {
                    department_name,
                    average_salary: money(s.mean),
                    median_salary: money(s.median),
                    total_compensation: bucket.total,
                    employee_count: bucket.employees.len() as u64,
                }
            })
            .collect(),
        by_month: by_month
            .into_iter()
            .map(|((year, month), bucket)| MonthCompensation {
                year,
                month,
                average_salary: money(SalaryStats::from_values(&bucket.salaries).mean),
                total_compensation: bucket.total,
            })
            .collect(),
        by_pay_grade: by_grade
            .into_iter()
            .map(|(pay_grade_name, bucket)| {
                let s = SalaryStats::from_values(&bucket.salaries);
                PayGradeCompensation {
                    pay_grade_name,
                    average_salary: money(s.mean),
                    min_salary: money(s.min),
                    max_salary: money(s.max),
                    total_compensation: bucket.total,
                    employee_count: bucket.employees.len() as u64,
                }
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, day};
    use entity::audit_log;
    use rust_decimal_macros::dec;
    use sea_orm::PaginatorTrait;

    fn input(employee_id: i32, effective: NaiveDate, base: Decimal) -> CompensationInput {
        CompensationInput {
            id: None,
            employee_id,
            pay_grade_id: None,
            effective_date: effective,
            end_date: None,
            base_salary: base,
            bonus: dec!(5000),
            commission: Decimal::ZERO,
            benefits: dec!(10000),
            payroll_taxes: dec!(4000),
            total_compensation: None,
            currency: None,
            pay_frequency: None,
            is_active: None,
        }
    }

    fn now() -> DateTime<Utc> {
        day(2025, 6, 15).and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    #[tokio::test]
    async fn crud_round_trip_writes_audit_rows() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let actor = Actor::user("1", "admin");

        let created = create(&db, input(e.id, day(2025, 1, 1), dec!(80000)), &actor, now())
            .await
            .unwrap();
        assert_eq!(created.total_compensation, dec!(99000));
        assert_eq!(created.currency, "USD");

        let view = get(&db, created.id).await.unwrap();
        assert_eq!(view.employee_name, "Test E1");

        let mut change = input(e.id, day(2025, 1, 1), dec!(85000));
        change.id = Some(created.id);
        let updated = update(&db, created.id, change, &actor, now()).await.unwrap();
        assert_eq!(updated.base_salary, dec!(85000));

        delete(&db, created.id, &actor, now()).await.unwrap();
        assert!(matches!(get(&db, created.id).await, Err(HrError::NotFound(_))));
        assert!(matches!(
            delete(&db, created.id, &actor, now()).await,
            Err(HrError::NotFound(_))
        ));

        let trail = audit_log::Entity::find()
            .filter(audit_log::Column::TableName.eq(TABLE))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(trail, 3);
    }

    #[tokio::test]
    async fn update_rejects_mismatched_and_missing_ids() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let actor = Actor::default();

        let mut body = input(e.id, day(2025, 1, 1), dec!(1));
        body.id = Some(2);
        assert!(matches!(
            update(&db, 1, body.clone(), &actor, now()).await,
            Err(HrError::IdMismatch)
        ));
        assert!(matches!(
            update(&db, 2, body, &actor, now()).await,
            Err(HrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_rejects_unknown_employee_and_bad_amounts() {
        let db = testing::db().await;
        let actor = Actor::default();
        assert!(matches!(
            create(&db, input(42, day(2025, 1, 1), dec!(1)), &actor, now()).await,
            Err(HrError::InvalidInput(_))
        ));
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        assert!(matches!(
            create(&db, input(e.id, day(2025, 1, 1), dec!(-5)), &actor, now()).await,
            Err(HrError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn current_ignores_future_rows() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        testing::compensation(&db, e.id, day(2024, 1, 1), 60_000).await;
        testing::compensation(&db, e.id, day(2025, 3, 1), 65_000).await;
        testing::compensation(&db, e.id, day(2025, 9, 1), 70_000).await;

        let current = current_for_employee(&db, e.id, day(2025, 6, 15)).await.unwrap();
        assert_eq!(current.record.base_salary, dec!(65000));

        let history = for_employee(&db, e.id).await.unwrap();
        let dates: Vec<_> = history.iter().map(|v| v.record.effective_date).collect();
        assert_eq!(dates, vec![day(2025, 9, 1), day(2025, 3, 1), day(2024, 1, 1)]);

        let missing = current_for_employee(&db, e.id, day(2023, 1, 1)).await;
        match missing {
            Err(HrError::NotFound(message)) => {
                assert_eq!(message, "No compensation record found for this employee")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn trends_filter_by_department() {
        let db = testing::db().await;
        let sales = testing::department(&db, "Sales").await;
        let hr = testing::department(&db, "Human Resources").await;
        let grade = testing::pay_grade(&db, "Senior", 80_000, 120_000).await;
        for (number, dept, base) in [("E1", sales.id, 50_000), ("E2", sales.id, 70_000), ("E3", hr.id, 90_000)] {
            let mut hire = Hire::new(number, day(2023, 1, 1));
            hire.department_id = Some(dept);
            let e = testing::employee(&db, hire).await;
            let c = testing::compensation(&db, e.id, day(2025, 2, 1), base).await;
            if base == 90_000 {
                let mut graded: compensation::ActiveModel = c.into();
                graded.pay_grade_id = Set(Some(grade.id));
                graded.update(&db).await.unwrap();
            }
        }

        let all = trends(&db, None, None, None).await.unwrap();
        assert_eq!(all.average_salary, dec!(70000));
        assert_eq!(all.min_salary, dec!(50000));
        assert_eq!(all.by_department.len(), 2);
        assert_eq!(all.by_pay_grade[0].pay_grade_name, "Senior");
        assert_eq!(all.by_month.len(), 1);

        let only_sales = trends(&db, Some(sales.id), None, None).await.unwrap();
        assert_eq!(only_sales.average_salary, dec!(60000));
        assert_eq!(only_sales.median_salary, dec!(60000));
        assert_eq!(only_sales.salary_variance, 100_000_000.0);
        assert_eq!(only_sales.by_department[0].employee_count, 2);
        assert_eq!(only_sales.by_department[0].median_salary, dec!(60000));
    }

    #[tokio::test]
    async fn trends_without_bounds_keep_old_and_future_rows() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2018, 1, 1))).await;
        testing::compensation(&db, e.id, day(2018, 1, 1), 40_000).await;
        testing::compensation(&db, e.id, day(2024, 1, 1), 60_000).await;
        testing::compensation(&db, e.id, day(2030, 1, 1), 80_000).await;

        let all = trends(&db, None, None, None).await.unwrap();
        assert_eq!(all.average_salary, dec!(60000));
        assert_eq!(all.min_salary, dec!(40000));
        assert_eq!(all.max_salary, dec!(80000));
        assert_eq!(all.by_month.len(), 3);
        assert_eq!((all.start_date, all.end_date), (None, None));

        let from_2020 = trends(&db, None, Some(day(2020, 1, 1)), None).await.unwrap();
        assert_eq!(from_2020.min_salary, dec!(60000));
        let until_2025 = trends(&db, None, None, Some(day(2025, 1, 1))).await.unwrap();
        assert_eq!(until_2025.max_salary, dec!(60000));
        assert_eq!(until_2025.end_date, Some(day(2025, 1, 1)));
    }
}
