//! Absence and overtime records: CRUD plus absence metrics.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use entity::{absence, absence_type, employee};
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
use crate::stats::{pct, round_to};
use crate::workforce::{self, department_of, money};

const ENTITY: &str = "Absence";
const TABLE: &str = "Absences";
/// Flat hourly rate used to cost absence hours in the metrics.
pub const ABSENCE_HOURLY_COST: i64 = 25;
pub const HOURS_PER_DAY: f64 = 8.0;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceView {
    #[serde(flatten)]
    pub record: absence::Model,
    pub employee_name: String,
    pub absence_type_name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceInput {
    pub id: Option<i32>,
    pub employee_id: i32,
    pub absence_type_id: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Defaults to 09:00 on `start_date`.
    pub occurred_at: Option<NaiveDateTime>,
    pub hours: f64,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub is_overtime: bool,
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
    pub is_paid: Option<bool>,
}

impl AbsenceInput {
    fn validate(&self) -> HrResult<()> {
        if !self.hours.is_finite() || self.hours < 0.0 {
            return Err(HrError::InvalidInput("hours must be zero or more".into()));
        }
        if self.cost.is_sign_negative() && !self.cost.is_zero() {
            return Err(HrError::InvalidInput("cost cannot be negative".into()));
        }
        if self.end_date.is_some_and(|end| end < self.start_date) {
            return Err(HrError::InvalidInput(
                "endDate must not precede startDate".into(),
            ));
        }
        Ok(())
    }

    fn apply(self, kind: &absence_type::Model, active: &mut absence::ActiveModel) {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        active.employee_id = Set(self.employee_id);
        active.absence_type_id = Set(self.absence_type_id);
        active.occurred_at = Set(self
            .occurred_at
            .unwrap_or_else(|| self.start_date.and_time(nine)));
        active.start_date = Set(self.start_date);
        active.end_date = Set(self.end_date);
        active.hours = Set(self.hours);
        active.cost = Set(self.cost);
        active.is_overtime = Set(self.is_overtime);
        active.kind = Set(self.kind.unwrap_or_else(|| kind.name.clone()));
        active.reason = Set(self.reason);
        active.status = Set(self.status.unwrap_or_else(|| "Approved".into()));
        active.is_paid = Set(self.is_paid.unwrap_or(kind.is_paid));
    }
}

async fn load_type(db: &DatabaseConnection, input: &AbsenceInput) -> HrResult<absence_type::Model> {
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
    absence_type::Entity::find_by_id(input.absence_type_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            HrError::InvalidInput(format!(
                "absence type {} does not exist",
                input.absence_type_id
            ))
        })
}

async fn views(
    db: &DatabaseConnection,
    rows: Vec<(absence::Model, Option<employee::Model>)>,
) -> HrResult<Vec<AbsenceView>> {
    let types: HashMap<i32, String> = absence_type::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    Ok(rows
        .into_iter()
        .map(|(record, employee)| AbsenceView {
            employee_name: employee.map(|e| e.full_name()).unwrap_or_default(),
            absence_type_name: types.get(&record.absence_type_id).cloned().unwrap_or_default(),
            record,
        })
        .collect())
}

fn not_found(id: i32) -> HrError {
    HrError::not_found(format!("Absence {id} not found"))
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> HrResult<Vec<AbsenceView>> {
    let rows = absence::Entity::find()
        .find_also_related(employee::Entity)
        .order_by_asc(absence::Column::Id)
        .all(db)
        .await?;
    views(db, rows).await
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> HrResult<AbsenceView> {
    let row = absence::Entity::find_by_id(id)
        .find_also_related(employee::Entity)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    let mut out = views(db, vec![row]).await?;
    out.pop().ok_or_else(|| not_found(id))
}

/// One employee's absences, most recent start first.
#[instrument(skip(db))]
pub async fn for_employee(db: &DatabaseConnection, employee_id: i32) -> HrResult<Vec<AbsenceView>> {
    let rows = absence::Entity::find()
        .filter(absence::Column::EmployeeId.eq(employee_id))
        .find_also_related(employee::Entity)
        .order_by_desc(absence::Column::StartDate)
        .order_by_desc(absence::Column::Id)
        .all(db)
        .await?;
    views(db, rows).await
}

#[instrument(skip(db, input))]
pub async fn create(
    db: &DatabaseConnection,
    input: AbsenceInput,
    actor: &Actor,
    now: DateTime<Utc>,
) -> HrResult<absence::Model> {
    input.validate()?;
    let kind = load_type(db, &input).await?;
    let mut active = absence::ActiveModel {
        ..Default::default()
    };
    input.apply(&kind, &mut active);

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
    info!(absence_id = created.id, employee_id = created.employee_id, "absence created");
    Ok(created)
}

/// Replaces a row. The body id must equal the path id.
#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: AbsenceInput,
    actor: &Actor,
    now: DateTime<Utc>,
) -> HrResult<absence::Model> {
    if input.id != Some(id) {
        return Err(HrError::IdMismatch);
    }
    input.validate()?;
    let existing = absence::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    let kind = load_type(db, &input).await?;

    let mut active: absence::ActiveModel = existing.clone().into();
    input.apply(&kind, &mut active);
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
    let existing = absence::Entity::find_by_id(id)
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
    info!(absence_id = id, "absence deleted");
    Ok(())
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceGroup {
    pub count: u64,
    pub total_hours: f64,
    pub total_days: i64,
    pub total_cost: Decimal,
}

impl AbsenceGroup {
    fn push(&mut self, row: &absence::Model) {
        self.count += 1;
        self.total_hours += row.hours;
        self.total_days += absence_days(row.hours);
        self.total_cost += hours_cost(row.hours);
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceByType {
    pub absence_type_name: String,
    #[serde(flatten)]
    pub totals: AbsenceGroup,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceByDepartment {
    pub department_name: String,
    #[serde(flatten)]
    pub totals: AbsenceGroup,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceByMonth {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub totals: AbsenceGroup,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceMetrics {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_absences: u64,
    pub total_absence_hours: f64,
    pub total_absence_days: i64,
    pub total_absence_cost: Decimal,
    pub average_absence_cost: Decimal,
    /// Absences per distinct absent employee.
    pub overall_absence_rate: f64,
    pub by_type: Vec<AbsenceByType>,
    pub by_department: Vec<AbsenceByDepartment>,
    pub by_month: Vec<AbsenceByMonth>,
}

/// Whole eight-hour days, truncated.
pub fn absence_days(hours: f64) -> i64 {
    (hours / HOURS_PER_DAY).trunc() as i64
}

fn hours_cost(hours: f64) -> Decimal {
    money(hours * ABSENCE_HOURLY_COST as f64)
}

/// Absence totals, optionally for one department. Each bound filters
/// `start_date` only when supplied.
#[instrument(skip(db))]
pub async fn metrics(
    db: &DatabaseConnection,
    department_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> HrResult<AbsenceMetrics> {
    check_dates(&[start, end])?;
    let mut select = absence::Entity::find();
    if let Some(start) = start {
        select = select.filter(absence::Column::StartDate.gte(start));
    }
    if let Some(end) = end {
        select = select.filter(absence::Column::StartDate.lte(end));
    }
    let rows = select
        .find_also_related(employee::Entity)
        .all(db)
        .await?;
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|(_, employee)| {
            department_id.is_none()
                || employee.as_ref().and_then(|e| e.department_id) == department_id
        })
        .collect();
    let names = workforce::department_names(db).await?;
    let types: HashMap<i32, String> = absence_type::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut overall = AbsenceGroup::default();
    let mut absent = HashSet::new();
    let mut by_type: BTreeMap<String, AbsenceGroup> = BTreeMap::new();
    let mut by_department: BTreeMap<String, AbsenceGroup> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), AbsenceGroup> = BTreeMap::new();
    for (row, employee) in &rows {
        overall.push(row);
        absent.insert(row.employee_id);
        let type_name = types
            .get(&row.absence_type_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        by_type.entry(type_name).or_default().push(row);
        let department = employee
            .as_ref()
            .map(|e| department_of(e, &names))
            .unwrap_or_else(|| "Unassigned".to_string());
        by_department.entry(department).or_default().push(row);
        by_month
            .entry((row.start_date.year(), row.start_date.month()))
            .or_default()
            .push(row);
    }

    let total = overall.count as f64;
    let average_absence_cost = if overall.total_days > 0 {
        (overall.total_cost / Decimal::from(overall.total_days)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let overall_absence_rate = if absent.is_empty() {
        0.0
    } else {
        round_to(total / absent.len() as f64, 2)
    };

    let mut by_type: Vec<AbsenceByType> = by_type
        .into_iter()
        .map(|(absence_type_name, totals)| AbsenceByType {
            percentage: round_to(pct(totals.count as f64, total), 2),
            absence_type_name,
            totals,
        })
        .collect();
    by_type.sort_by(|a, b| b.totals.count.cmp(&a.totals.count));

    Ok(AbsenceMetrics {
        start_date: start,
        end_date: end,
        total_absences: overall.count,
        total_absence_hours: overall.total_hours,
        total_absence_days: overall.total_days,
        total_absence_cost: overall.total_cost,
        average_absence_cost,
        overall_absence_rate,
        by_type,
        by_department: by_department
            .into_iter()
            .map(|(department_name, totals)| AbsenceByDepartment {
                department_name,
                totals,
            })
            .collect(),
        by_month: by_month
            .into_iter()
            .map(|((year, month), totals)| AbsenceByMonth {
                year,
                month,
                totals,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, at, day};
    use rust_decimal_macros::dec;

    fn input(employee_id: i32, absence_type_id: i32) -> AbsenceInput {
        AbsenceInput {
            id: None,
            employee_id,
            absence_type_id,
            start_date: day(2025, 5, 5),
            end_date: Some(day(2025, 5, 6)),
            occurred_at: None,
            hours: 16.0,
            cost: dec!(640),
            is_overtime: false,
            kind: None,
            reason: Some("Flu".into()),
            status: None,
            is_paid: None,
        }
    }

    fn now() -> DateTime<Utc> {
        day(2025, 6, 15).and_hms_opt(8, 0, 0).unwrap().and_utc()
    }

    #[tokio::test]
    async fn crud_follows_http_semantics() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let sick = testing::absence_type(&db, "Sick Leave").await;
        let actor = Actor::user("1", "admin");

        let created = create(&db, input(e.id, sick.id), &actor, now()).await.unwrap();
        assert_eq!(created.kind, "Sick Leave");
        assert_eq!(created.occurred_at, at(2025, 5, 5, 9));
        assert!(created.is_paid);

        let view = get(&db, created.id).await.unwrap();
        assert_eq!(view.absence_type_name, "Sick Leave");

        let mut body = input(e.id, sick.id);
        assert!(matches!(
            update(&db, created.id, body.clone(), &actor, now()).await,
            Err(HrError::IdMismatch)
        ));
        body.id = Some(created.id);
        body.hours = 8.0;
        let updated = update(&db, created.id, body, &actor, now()).await.unwrap();
        assert_eq!(updated.hours, 8.0);

        delete(&db, created.id, &actor, now()).await.unwrap();
        assert!(matches!(
            get(&db, created.id).await,
            Err(HrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_validates_references() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let actor = Actor::default();
        assert!(matches!(
            create(&db, input(e.id, 77), &actor, now()).await,
            Err(HrError::InvalidInput(_))
        ));
        let sick = testing::absence_type(&db, "Sick Leave").await;
        let mut backwards = input(e.id, sick.id);
        backwards.end_date = Some(day(2025, 5, 1));
        assert!(matches!(
            create(&db, backwards, &actor, now()).await,
            Err(HrError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn employee_history_is_newest_first() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        let kind = testing::absence_type(&db, "Vacation").await;
        testing::absence(&db, e.id, kind.id, at(2025, 1, 3, 9), 8.0, false).await;
        testing::absence(&db, e.id, kind.id, at(2025, 4, 3, 9), 8.0, false).await;
        testing::absence(&db, e.id, kind.id, at(2024, 11, 3, 9), 8.0, false).await;

        let history = for_employee(&db, e.id).await.unwrap();
        let starts: Vec<_> = history.iter().map(|v| v.record.start_date).collect();
        assert_eq!(starts, vec![day(2025, 4, 3), day(2025, 1, 3), day(2024, 11, 3)]);
        assert!(for_employee(&db, e.id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metrics_cost_hours_at_a_flat_rate() {
        let db = testing::db().await;
        let ops = testing::department(&db, "Operations").await;
        let sick = testing::absence_type(&db, "Sick Leave").await;
        let pto = testing::absence_type(&db, "PTO").await;
        let mut hire = Hire::new("E1", day(2024, 1, 1));
        hire.department_id = Some(ops.id);
        let a = testing::employee(&db, hire).await;
        let b = testing::employee(&db, Hire::new("E2", day(2024, 1, 1))).await;
        testing::absence(&db, a.id, sick.id, at(2025, 3, 3, 9), 12.0, false).await;
        testing::absence(&db, a.id, pto.id, at(2025, 4, 3, 9), 8.0, false).await;
        testing::absence(&db, b.id, sick.id, at(2025, 4, 9, 9), 4.0, false).await;

        let m = metrics(&db, None, None, None).await.unwrap();
        assert_eq!(m.total_absences, 3);
        assert_eq!(m.total_absence_days, 2);
        assert_eq!(m.total_absence_cost, dec!(600));
        assert_eq!(m.average_absence_cost, dec!(300));
        assert_eq!(m.overall_absence_rate, 1.5);
        assert_eq!(m.by_type[0].absence_type_name, "Sick Leave");
        assert_eq!(m.by_type[0].totals.count, 2);
        assert_eq!(m.by_type[0].percentage, 66.67);
        assert_eq!(m.by_month.len(), 2);

        let ops_only = metrics(&db, Some(ops.id), None, None).await.unwrap();
        assert_eq!(ops_only.total_absences, 2);
        assert_eq!(ops_only.by_department[0].department_name, "Operations");

        let empty = metrics(&db, None, Some(day(2020, 1, 1)), Some(day(2020, 2, 1)))
            .await
            .unwrap();
        assert_eq!(empty.average_absence_cost, Decimal::ZERO);
        assert_eq!(empty.overall_absence_rate, 0.0);
        assert_eq!(empty.start_date, Some(day(2020, 1, 1)));
    }

    #[tokio::test]
    async fn metrics_without_bounds_cover_all_history() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2019, 1, 1))).await;
        let sick = testing::absence_type(&db, "Sick Leave").await;
        testing::absence(&db, e.id, sick.id, at(2019, 3, 4, 9), 8.0, false).await;
        testing::absence(&db, e.id, sick.id, at(2025, 4, 3, 9), 8.0, false).await;
        testing::absence(&db, e.id, sick.id, at(2031, 1, 6, 9), 8.0, false).await;

        let all = metrics(&db, None, None, None).await.unwrap();
        assert_eq!(all.total_absences, 3);
        assert_eq!(all.start_date, None);
        assert_eq!(all.end_date, None);

        let since = metrics(&db, None, Some(day(2020, 1, 1)), None).await.unwrap();
        assert_eq!(since.total_absences, 2);
        let until = metrics(&db, None, None, Some(day(2025, 12, 31))).await.unwrap();
        assert_eq!(until.total_absences, 2);

        let far: NaiveDate = serde_json::from_str("\"+262142-12-31\"").unwrap();
        let beyond = metrics(&db, None, None, Some(far)).await;
        assert!(matches!(beyond, Err(HrError::InvalidInput(_))));
    }
}
