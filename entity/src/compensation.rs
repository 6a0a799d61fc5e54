use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One historical compensation snapshot, keyed by `effective_date`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "compensations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub employee_id: i32,
    pub pay_grade_id: Option<i32>,
    pub effective_date: Date,
    pub end_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub base_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub bonus: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub commission: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub benefits: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub payroll_taxes: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_compensation: Decimal,
    pub currency: String,
    pub pay_frequency: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::pay_grade::Entity",
        from = "Column::PayGradeId",
        to = "super::pay_grade::Column::Id"
    )]
    PayGrade,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::pay_grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayGrade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
