use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_logs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_name: String,
    pub entity_id: Option<i32>,
    #[sea_orm(indexed)]
    pub table_name: String,
    pub primary_key: String,
    pub action: String,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub user_name: Option<String>,
    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
