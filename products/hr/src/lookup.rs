//! Reference lists for form pickers.

use entity::{absence_type, department, employee, location, pay_grade};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};

use crate::error::HrResult;

pub async fn departments(db: &DatabaseConnection) -> HrResult<Vec<department::Model>> {
    Ok(department::Entity::find()
        .order_by_asc(department::Column::Name)
        .all(db)
        .await?)
}

pub async fn absence_types(db: &DatabaseConnection) -> HrResult<Vec<absence_type::Model>> {
    Ok(absence_type::Entity::find()
        .order_by_asc(absence_type::Column::Name)
        .all(db)
        .await?)
}

pub async fn pay_grades(db: &DatabaseConnection) -> HrResult<Vec<pay_grade::Model>> {
    Ok(pay_grade::Entity::find()
        .order_by_asc(pay_grade::Column::Name)
        .all(db)
        .await?)
}

pub async fn locations(db: &DatabaseConnection) -> HrResult<Vec<location::Model>> {
    Ok(location::Entity::find()
        .order_by_asc(location::Column::Name)
        .all(db)
        .await?)
}

async fn distinct_employee_values(
    db: &DatabaseConnection,
    column: employee::Column,
) -> HrResult<Vec<String>> {
    let values: Vec<String> = employee::Entity::find()
        .select_only()
        .column(column)
        .distinct()
        .order_by_asc(column)
        .into_tuple()
        .all(db)
        .await?;
    Ok(values.into_iter().filter(|v| !v.trim().is_empty()).collect())
}

/// Distinct positions held by employees.
pub async fn job_titles(db: &DatabaseConnection) -> HrResult<Vec<String>> {
    distinct_employee_values(db, employee::Column::Position).await
}

pub async fn employment_types(db: &DatabaseConnection) -> HrResult<Vec<String>> {
    distinct_employee_values(db, employee::Column::EmploymentType).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, day};

    #[tokio::test]
    async fn lists_are_sorted_and_distinct() {
        let db = testing::db().await;
        testing::department(&db, "Sales").await;
        testing::department(&db, "Engineering").await;
        let mut a = Hire::new("E1", day(2024, 1, 1));
        a.job_family = "Sales";
        testing::employee(&db, a).await;
        testing::employee(&db, Hire::new("E2", day(2024, 1, 1))).await;
        testing::employee(&db, Hire::new("E3", day(2024, 1, 1))).await;

        let names: Vec<_> = departments(&db).await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Engineering", "Sales"]);
        assert_eq!(
            job_titles(&db).await.unwrap(),
            vec!["Engineering Specialist", "Sales Specialist"]
        );
        assert_eq!(employment_types(&db).await.unwrap(), vec!["Full-time"]);
        assert!(pay_grades(&db).await.unwrap().is_empty());
    }
}
