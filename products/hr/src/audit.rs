//! Audit trail: writes from CRUD mutations and the read side behind `/api/audit`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use entity::audit_log;
use platform_api::{Page, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::{HrError, HrResult},
    period::{check_dates, earliest_supported},
};

pub const ACTION_CREATE: &str = "Create";
pub const ACTION_UPDATE: &str = "Update";
pub const ACTION_DELETE: &str = "Delete";

/// Who performed a mutation, as far as the request can tell.
#[derive(Clone, Debug, Default)]
pub struct Actor {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Actor {
    pub fn user(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_name: Some(user_name.into()),
            ..Self::default()
        }
    }
}

/// One change to persist.
pub struct Change<'a, T: Serialize> {
    pub entity_name: &'a str,
    pub table_name: &'a str,
    pub entity_id: i32,
    pub action: &'a str,
    pub before: Option<&'a T>,
    pub after: Option<&'a T>,
}

fn snapshot<T: Serialize>(value: Option<&T>) -> Option<String> {
    value.and_then(|v| serde_json::to_string(v).ok())
}

/// Writes one audit row on `conn`, usually the mutation's own transaction.
pub async fn record<C, T>(
    conn: &C,
    actor: &Actor,
    change: Change<'_, T>,
    now: DateTime<Utc>,
) -> HrResult<audit_log::Model>
where
    C: ConnectionTrait,
    T: Serialize,
{
    let row = audit_log::ActiveModel {
        entity_name: Set(change.entity_name.to_string()),
        entity_id: Set(Some(change.entity_id)),
        table_name: Set(change.table_name.to_string()),
        primary_key: Set(change.entity_id.to_string()),
        action: Set(change.action.to_string()),
        user_id: Set(actor.user_id.clone().unwrap_or_else(|| "anonymous".into())),
        user_name: Set(actor.user_name.clone()),
        timestamp: Set(now),
        old_values: Set(snapshot(change.before)),
        new_values: Set(snapshot(change.after)),
        description: Set(Some(format!(
            "{} {} {}",
            change.action, change.entity_name, change.entity_id
        ))),
        ip_address: Set(actor.ip_address.clone()),
        user_agent: Set(actor.user_agent.clone()),
        ..Default::default()
    };
    Ok(row.insert(conn).await?)
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn day_end(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_micro_opt(23, 59, 59, 999_999)
        .map(|last| last.and_utc())
        .unwrap_or_else(|| day_start(day))
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
    pub user_id: Option<String>,
    pub table_name: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LogQuery {
    fn apply(&self, mut select: Select<audit_log::Entity>) -> Select<audit_log::Entity> {
        if let Some(user_id) = self.user_id.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(audit_log::Column::UserId.eq(user_id));
        }
        if let Some(table) = self.table_name.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(audit_log::Column::TableName.eq(table));
        }
        if let Some(action) = self.action.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(audit_log::Column::Action.eq(action));
        }
        if let Some(start) = self.start_date {
            select = select.filter(audit_log::Column::Timestamp.gte(day_start(start)));
        }
        if let Some(end) = self.end_date {
            select = select.filter(audit_log::Column::Timestamp.lte(day_end(end)));
        }
        select
    }
}

/// Filtered audit rows, newest first.
#[instrument(skip(db))]
pub async fn logs(db: &DatabaseConnection, query: &LogQuery) -> HrResult<Page<audit_log::Model>> {
    check_dates(&[query.start_date, query.end_date])?;
    let page = PageRequest::new(query.page_number, query.page_size);
    let filtered = query.apply(audit_log::Entity::find());
    let total = filtered.clone().count(db).await?;
    let items = filtered
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .offset(page.offset())
        .limit(page.page_size)
        .all(db)
        .await?;
    Ok(Page::new(items, page, total))
}

pub async fn log(db: &DatabaseConnection, id: i32) -> HrResult<audit_log::Model> {
    audit_log::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found(format!("Audit log {id} not found")))
}

/// History of one record, newest first.
pub async fn entity_changes(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: &str,
    limit: Option<u64>,
) -> HrResult<Vec<audit_log::Model>> {
    let mut select = audit_log::Entity::find()
        .filter(audit_log::Column::TableName.eq(entity_type))
        .filter(audit_log::Column::PrimaryKey.eq(entity_id))
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id);
    if let Some(limit) = limit {
        select = select.limit(limit);
    }
    Ok(select.all(db).await?)
}

/// Everything `user_id` did in the last `days` days.
pub async fn user_activity(
    db: &DatabaseConnection,
    user_id: &str,
    days: u32,
    now: DateTime<Utc>,
) -> HrResult<Vec<audit_log::Model>> {
    let earliest = day_start(earliest_supported());
    let since = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .map_or(earliest, |since| since.max(earliest));
    Ok(audit_log::Entity::find()
        .filter(audit_log::Column::UserId.eq(user_id))
        .filter(audit_log::Column::Timestamp.gte(since))
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .all(db)
        .await?)
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionCount {
    pub action: String,
    pub count: u64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCount {
    pub user_id: String,
    pub user_name: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableCount {
    pub table_name: String,
    pub count: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_actions: u64,
    pub actions_by_type: Vec<ActionCount>,
    pub actions_by_user: Vec<UserCount>,
    pub actions_by_table: Vec<TableCount>,
}

const TOP_USERS: usize = 10;

fn ranked(counts: HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut rows: Vec<_> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Activity totals between two days; defaults to the thirty days before `now`.
#[instrument(skip(db))]
pub async fn summary(
    db: &DatabaseConnection,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> HrResult<AuditSummary> {
    check_dates(&[start_date, end_date])?;
    let start = start_date.map(day_start).unwrap_or(now - Duration::days(30));
    let end = end_date.map(day_end).unwrap_or(now);
    let rows = audit_log::Entity::find()
        .filter(audit_log::Column::Timestamp.between(start, end))
        .all(db)
        .await?;

    let mut by_action: HashMap<String, u64> = HashMap::new();
    let mut by_user: HashMap<String, u64> = HashMap::new();
    let mut user_names: HashMap<String, Option<String>> = HashMap::new();
    let mut by_table: HashMap<String, u64> = HashMap::new();
    for row in &rows {
        *by_action.entry(row.action.clone()).or_default() += 1;
        *by_user.entry(row.user_id.clone()).or_default() += 1;
        user_names
            .entry(row.user_id.clone())
            .or_insert_with(|| row.user_name.clone());
        *by_table.entry(row.table_name.clone()).or_default() += 1;
    }

    Ok(AuditSummary {
        start_date: start,
        end_date: end,
        total_actions: rows.len() as u64,
        actions_by_type: ranked(by_action)
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect(),
        actions_by_user: ranked(by_user)
            .into_iter()
            .take(TOP_USERS)
            .map(|(user_id, count)| UserCount {
                user_name: user_names.get(&user_id).cloned().flatten(),
                user_id,
                count,
            })
            .collect(),
        actions_by_table: ranked(by_table)
            .into_iter()
            .map(|(table_name, count)| TableCount { table_name, count })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::testing;

    #[derive(Serialize)]
    struct Row {
        id: i32,
    }

    async fn write(db: &DatabaseConnection, user: &str, table: &str, action: &str, id: i32, at: DateTime<Utc>) {
        record(
            db,
            &Actor::user(user, format!("{user} name")),
            Change {
                entity_name: "Absence",
                table_name: table,
                entity_id: id,
                action,
                before: None,
                after: Some(&Row { id }),
            },
            at,
        )
        .await
        .unwrap();
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn forty_five_rows_paginate_into_three_pages() {
        let db = testing::db().await;
        for i in 0..45 {
            write(&db, "1", "Absences", ACTION_CREATE, i, ts(1 + (i as u32 % 20), 8)).await;
        }
        let query = LogQuery {
            page_number: Some(2),
            page_size: Some(20),
            ..LogQuery::default()
        };
        let page = logs(&db, &query).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total_records, 45);
        assert_eq!(page.total_pages, 3);
        let last = logs(&db, &LogQuery { page_number: Some(3), ..query.clone() }).await.unwrap();
        assert_eq!(last.items.len(), 5);
    }

    #[tokio::test]
    async fn filters_narrow_the_log() {
        let db = testing::db().await;
        write(&db, "1", "Absences", ACTION_CREATE, 1, ts(2, 9)).await;
        write(&db, "1", "Absences", ACTION_UPDATE, 1, ts(3, 9)).await;
        write(&db, "2", "Compensations", ACTION_CREATE, 7, ts(4, 9)).await;

        let by_table = logs(&db, &LogQuery {
            table_name: Some("Absences".into()),
            ..LogQuery::default()
        })
        .await
        .unwrap();
        assert_eq!(by_table.total_records, 2);
        assert_eq!(by_table.items[0].action, ACTION_UPDATE);

        let by_day = logs(&db, &LogQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 3),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 3),
            ..LogQuery::default()
        })
        .await
        .unwrap();
        assert_eq!(by_day.total_records, 1);

        let changes = entity_changes(&db, "Absences", "1", Some(1)).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ACTION_UPDATE);
        assert!(changes[0].new_values.as_deref().unwrap().contains("\"id\":1"));

        let activity = user_activity(&db, "2", 30, ts(10, 0)).await.unwrap();
        assert_eq!(activity.len(), 1);

        assert!(matches!(log(&db, 999).await, Err(HrError::NotFound(_))));
    }

    #[tokio::test]
    async fn extreme_filters_are_rejected_or_saturated() {
        let db = testing::db().await;
        write(&db, "1", "Absences", ACTION_CREATE, 1, ts(2, 9)).await;
        let far: NaiveDate = serde_json::from_str("\"+262142-12-31\"").unwrap();

        let beyond = logs(&db, &LogQuery {
            end_date: Some(far),
            ..LogQuery::default()
        })
        .await;
        assert!(matches!(beyond, Err(HrError::InvalidInput(_))));
        let summary_beyond = summary(&db, None, Some(far), ts(10, 0)).await;
        assert!(matches!(summary_beyond, Err(HrError::InvalidInput(_))));

        let last_day = logs(&db, &LogQuery {
            end_date: NaiveDate::from_ymd_opt(9999, 12, 31),
            ..LogQuery::default()
        })
        .await
        .unwrap();
        assert_eq!(last_day.total_records, 1);

        let deep = logs(&db, &LogQuery {
            page_number: Some(u64::MAX),
            ..LogQuery::default()
        })
        .await
        .unwrap();
        assert!(deep.items.is_empty());
        assert_eq!(deep.total_records, 1);

        let everything = user_activity(&db, "1", u32::MAX, ts(10, 0)).await.unwrap();
        assert_eq!(everything.len(), 1);
    }

    #[tokio::test]
    async fn summary_ranks_actions_users_and_tables() {
        let db = testing::db().await;
        for i in 0..3 {
            write(&db, "1", "Absences", ACTION_CREATE, i, ts(2, 9)).await;
        }
        write(&db, "2", "Compensations", ACTION_DELETE, 9, ts(3, 9)).await;
        write(&db, "3", "Compensations", ACTION_DELETE, 9, ts(1, 9)).await;

        let s = summary(&db, None, None, ts(15, 0)).await.unwrap();
        assert_eq!(s.total_actions, 5);
        assert_eq!(s.actions_by_type[0], ActionCount { action: "Create".into(), count: 3 });
        assert_eq!(s.actions_by_user[0].user_id, "1");
        assert_eq!(s.actions_by_user[0].user_name.as_deref(), Some("1 name"));
        assert_eq!(s.actions_by_table.len(), 2);

        let narrow = summary(
            &db,
            NaiveDate::from_ymd_opt(2025, 6, 3),
            NaiveDate::from_ymd_opt(2025, 6, 3),
            ts(15, 0),
        )
        .await
        .unwrap();
        assert_eq!(narrow.total_actions, 1);
    }
}
