use sea_orm_migration::prelude::*;

use super::m20251020_000001_reference_data::{
    AbsenceTypes, Departments, Locations, OrgUnits, PayGrades,
};

#[derive(DeriveIden)]
pub enum Employees {
    Table,
    Id,
    EmployeeNumber,
    FirstName,
    LastName,
    Email,
    Position,
    JobFamily,
    EmploymentType,
    Province,
    Status,
    IsActive,
    HireDate,
    TerminationDate,
    DepartmentId,
    LocationId,
    OrgUnitId,
}

#[derive(DeriveIden)]
enum EmployeeStarts {
    Table,
    Id,
    EmployeeId,
    StartDate,
    Position,
    Department,
    Reason,
    Salary,
}

#[derive(DeriveIden)]
enum EmployeeExits {
    Table,
    Id,
    EmployeeId,
    ExitDate,
    Reason,
    ExitType,
    Notes,
}

#[derive(DeriveIden)]
enum Compensations {
    Table,
    Id,
    EmployeeId,
    PayGradeId,
    EffectiveDate,
    EndDate,
    BaseSalary,
    Bonus,
    Commission,
    Benefits,
    PayrollTaxes,
    TotalCompensation,
    Currency,
    PayFrequency,
    IsActive,
}

#[derive(DeriveIden)]
enum Absences {
    Table,
    Id,
    EmployeeId,
    AbsenceTypeId,
    OccurredAt,
    StartDate,
    EndDate,
    Hours,
    Cost,
    IsOvertime,
    Kind,
    Reason,
    Status,
    IsPaid,
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(18, 2)
        .not_null()
        .default(0)
        .to_owned()
}

fn id_column(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(&mut id_column(Employees::Id))
                    .col(
                        ColumnDef::new(Employees::EmployeeNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(320))
                    .col(ColumnDef::new(Employees::Position).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::JobFamily).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Employees::EmploymentType)
                            .string_len(32)
                            .not_null()
                            .default("Full-time"),
                    )
                    .col(ColumnDef::new(Employees::Province).string_len(64))
                    .col(
                        ColumnDef::new(Employees::Status)
                            .string_len(32)
                            .not_null()
                            .default("Active"),
                    )
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::HireDate).date())
                    .col(ColumnDef::new(Employees::TerminationDate).date())
                    .col(ColumnDef::new(Employees::DepartmentId).integer())
                    .col(ColumnDef::new(Employees::LocationId).integer())
                    .col(ColumnDef::new(Employees::OrgUnitId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_location")
                            .from(Employees::Table, Employees::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_org_unit")
                            .from(Employees::Table, Employees::OrgUnitId)
                            .to(OrgUnits::Table, OrgUnits::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_department")
                    .table(Employees::Table)
                    .col(Employees::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeStarts::Table)
                    .if_not_exists()
                    .col(&mut id_column(EmployeeStarts::Id))
                    .col(ColumnDef::new(EmployeeStarts::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(EmployeeStarts::StartDate).date().not_null())
                    .col(ColumnDef::new(EmployeeStarts::Position).string_len(128).not_null())
                    .col(ColumnDef::new(EmployeeStarts::Department).string_len(128).not_null())
                    .col(ColumnDef::new(EmployeeStarts::Reason).string_len(128).not_null())
                    .col(&mut money(EmployeeStarts::Salary))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_starts_employee")
                            .from(EmployeeStarts::Table, EmployeeStarts::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeExits::Table)
                    .if_not_exists()
                    .col(&mut id_column(EmployeeExits::Id))
                    .col(ColumnDef::new(EmployeeExits::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(EmployeeExits::ExitDate).date().not_null())
                    .col(ColumnDef::new(EmployeeExits::Reason).string_len(128).not_null())
                    .col(ColumnDef::new(EmployeeExits::ExitType).string_len(16).not_null())
                    .col(ColumnDef::new(EmployeeExits::Notes).string_len(1024))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_exits_employee")
                            .from(EmployeeExits::Table, EmployeeExits::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_exits_date")
                    .table(EmployeeExits::Table)
                    .col(EmployeeExits::ExitDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Compensations::Table)
                    .if_not_exists()
                    .col(&mut id_column(Compensations::Id))
                    .col(ColumnDef::new(Compensations::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(Compensations::PayGradeId).integer())
                    .col(ColumnDef::new(Compensations::EffectiveDate).date().not_null())
                    .col(ColumnDef::new(Compensations::EndDate).date())
                    .col(&mut money(Compensations::BaseSalary))
                    .col(&mut money(Compensations::Bonus))
                    .col(&mut money(Compensations::Commission))
                    .col(&mut money(Compensations::Benefits))
                    .col(&mut money(Compensations::PayrollTaxes))
                    .col(&mut money(Compensations::TotalCompensation))
                    .col(
                        ColumnDef::new(Compensations::Currency)
                            .string_len(3)
                            .not_null()
                            .default("CAD"),
                    )
                    .col(
                        ColumnDef::new(Compensations::PayFrequency)
                            .string_len(32)
                            .not_null()
                            .default("Monthly"),
                    )
                    .col(
                        ColumnDef::new(Compensations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compensations_employee")
                            .from(Compensations::Table, Compensations::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compensations_pay_grade")
                            .from(Compensations::Table, Compensations::PayGradeId)
                            .to(PayGrades::Table, PayGrades::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_compensations_employee_effective")
                    .table(Compensations::Table)
                    .col(Compensations::EmployeeId)
                    .col(Compensations::EffectiveDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Absences::Table)
                    .if_not_exists()
                    .col(&mut id_column(Absences::Id))
                    .col(ColumnDef::new(Absences::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(Absences::AbsenceTypeId).integer().not_null())
                    .col(ColumnDef::new(Absences::OccurredAt).date_time().not_null())
                    .col(ColumnDef::new(Absences::StartDate).date().not_null())
                    .col(ColumnDef::new(Absences::EndDate).date())
                    .col(
                        ColumnDef::new(Absences::Hours)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(&mut money(Absences::Cost))
                    .col(
                        ColumnDef::new(Absences::IsOvertime)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Absences::Kind).string_len(64).not_null())
                    .col(ColumnDef::new(Absences::Reason).string_len(512))
                    .col(
                        ColumnDef::new(Absences::Status)
                            .string_len(32)
                            .not_null()
                            .default("Approved"),
                    )
                    .col(
                        ColumnDef::new(Absences::IsPaid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_absences_employee")
                            .from(Absences::Table, Absences::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_absences_absence_type")
                            .from(Absences::Table, Absences::AbsenceTypeId)
                            .to(AbsenceTypes::Table, AbsenceTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_absences_occurred_at")
                    .table(Absences::Table)
                    .col(Absences::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Absences::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Compensations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeExits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeStarts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
