use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "payrolls")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub employee_id: i32,
    pub pay_period_start: Date,
    pub pay_period_end: Date,
    pub pay_date: Date,
    pub pay_frequency: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub gross_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub net_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_taxes: Decimal,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub federal_income_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub state_income_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub local_income_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub social_security_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub medicare_tax: Decimal,
}

impl Model {
    pub fn withheld_taxes(&self) -> Decimal {
        self.federal_income_tax
            + self.state_income_tax
            + self.local_income_tax
            + self.social_security_tax
            + self.medicare_tax
    }
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
    #[sea_orm(has_many = "super::payroll_item::Entity")]
    PayrollItem,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payroll_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
