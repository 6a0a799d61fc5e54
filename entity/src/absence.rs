use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Absence or overtime record. `is_overtime` rows count as worked hours.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "absences")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub employee_id: i32,
    pub absence_type_id: i32,
    pub occurred_at: DateTime,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub hours: f64,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub cost: Decimal,
    pub is_overtime: bool,
    pub kind: String,
    pub reason: Option<String>,
    pub status: String,
    pub is_paid: bool,
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
        belongs_to = "super::absence_type::Entity",
        from = "Column::AbsenceTypeId",
        to = "super::absence_type::Column::Id"
    )]
    AbsenceType,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::absence_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AbsenceType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
