use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Departments {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum Locations {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    PostalCode,
    Country,
    Phone,
    Email,
    IsActive,
    Latitude,
    Longitude,
}

#[derive(DeriveIden)]
pub enum OrgUnits {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum PayGrades {
    Table,
    Id,
    Name,
    Description,
    MinSalary,
    MaxSalary,
}

#[derive(DeriveIden)]
pub enum AbsenceTypes {
    Table,
    Id,
    Name,
    Description,
    IsPaid,
    RequiresApproval,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departments::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Departments::Description).string_len(512))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Locations::Address).string_len(256))
                    .col(ColumnDef::new(Locations::City).string_len(128))
                    .col(ColumnDef::new(Locations::State).string_len(64))
                    .col(ColumnDef::new(Locations::PostalCode).string_len(32))
                    .col(ColumnDef::new(Locations::Country).string_len(64))
                    .col(ColumnDef::new(Locations::Phone).string_len(64))
                    .col(ColumnDef::new(Locations::Email).string_len(320))
                    .col(
                        ColumnDef::new(Locations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Locations::Latitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Locations::Longitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrgUnits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrgUnits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrgUnits::Name).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayGrades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayGrades::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PayGrades::Name).string_len(64).not_null())
                    .col(ColumnDef::new(PayGrades::Description).string_len(256))
                    .col(
                        ColumnDef::new(PayGrades::MinSalary)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayGrades::MaxSalary)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AbsenceTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AbsenceTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AbsenceTypes::Name).string_len(64).not_null())
                    .col(ColumnDef::new(AbsenceTypes::Description).string_len(256))
                    .col(
                        ColumnDef::new(AbsenceTypes::IsPaid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AbsenceTypes::RequiresApproval)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AbsenceTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayGrades::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrgUnits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
