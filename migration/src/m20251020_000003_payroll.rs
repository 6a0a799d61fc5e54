use sea_orm_migration::prelude::*;

use super::m20251020_000002_workforce::Employees;

#[derive(DeriveIden)]
enum Payrolls {
    Table,
    Id,
    EmployeeId,
    PayPeriodStart,
    PayPeriodEnd,
    PayDate,
    PayFrequency,
    GrossPay,
    NetPay,
    TotalDeductions,
    TotalTaxes,
    RegularHours,
    OvertimeHours,
    FederalIncomeTax,
    StateIncomeTax,
    LocalIncomeTax,
    SocialSecurityTax,
    MedicareTax,
}

#[derive(DeriveIden)]
enum PayrollItems {
    Table,
    Id,
    PayrollId,
    ItemType,
    Name,
    Description,
    Amount,
    RateType,
    Rate,
    Quantity,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut payrolls = Table::create();
        payrolls
            .table(Payrolls::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Payrolls::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Payrolls::EmployeeId).integer().not_null())
            .col(ColumnDef::new(Payrolls::PayPeriodStart).date().not_null())
            .col(ColumnDef::new(Payrolls::PayPeriodEnd).date().not_null())
            .col(ColumnDef::new(Payrolls::PayDate).date().not_null())
            .col(
                ColumnDef::new(Payrolls::PayFrequency)
                    .string_len(32)
                    .not_null()
                    .default("Monthly"),
            )
            .col(
                ColumnDef::new(Payrolls::RegularHours)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(Payrolls::OvertimeHours)
                    .double()
                    .not_null()
                    .default(0.0),
            );
        for money in [
            Payrolls::GrossPay,
            Payrolls::NetPay,
            Payrolls::TotalDeductions,
            Payrolls::TotalTaxes,
            Payrolls::FederalIncomeTax,
            Payrolls::StateIncomeTax,
            Payrolls::LocalIncomeTax,
            Payrolls::SocialSecurityTax,
            Payrolls::MedicareTax,
        ] {
            payrolls.col(
                ColumnDef::new(money)
                    .decimal_len(18, 2)
                    .not_null()
                    .default(0),
            );
        }
        payrolls.foreign_key(
            ForeignKey::create()
                .name("fk_payrolls_employee")
                .from(Payrolls::Table, Payrolls::EmployeeId)
                .to(Employees::Table, Employees::Id)
                .on_delete(ForeignKeyAction::Cascade),
        );
        manager.create_table(payrolls.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payrolls_period")
                    .table(Payrolls::Table)
                    .col(Payrolls::PayPeriodStart)
                    .col(Payrolls::PayPeriodEnd)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayrollItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayrollItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PayrollItems::PayrollId).integer().not_null())
                    .col(ColumnDef::new(PayrollItems::ItemType).string_len(32).not_null())
                    .col(ColumnDef::new(PayrollItems::Name).string_len(128).not_null())
                    .col(ColumnDef::new(PayrollItems::Description).string_len(512))
                    .col(
                        ColumnDef::new(PayrollItems::Amount)
                            .decimal_len(18, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PayrollItems::RateType).string_len(32).not_null())
                    .col(ColumnDef::new(PayrollItems::Rate).decimal_len(18, 2))
                    .col(ColumnDef::new(PayrollItems::Quantity).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payroll_items_payroll")
                            .from(PayrollItems::Table, PayrollItems::PayrollId)
                            .to(Payrolls::Table, Payrolls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PayrollItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payrolls::Table).if_exists().to_owned())
            .await
    }
}
