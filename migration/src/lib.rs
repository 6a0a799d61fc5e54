pub use sea_orm_migration::prelude::*;

mod m20251020_000001_reference_data;
mod m20251020_000002_workforce;
mod m20251020_000003_payroll;
mod m20251020_000004_audit_and_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000001_reference_data::Migration),
            Box::new(m20251020_000002_workforce::Migration),
            Box::new(m20251020_000003_payroll::Migration),
            Box::new(m20251020_000004_audit_and_users::Migration),
        ]
    }
}
