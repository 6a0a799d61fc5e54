//! In-memory SQLite fixtures for service tests.

use chrono::{NaiveDate, NaiveDateTime};
use entity::employee_exit::ExitType;
use entity::{
    absence, absence_type, compensation, department, employee, employee_exit, employee_start,
    location, pay_grade, payroll,
};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

pub async fn db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn department(db: &DatabaseConnection, name: &str) -> department::Model {
    department::ActiveModel {
        name: Set(name.into()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn location(db: &DatabaseConnection, name: &str, lat: f64, lon: f64) -> location::Model {
    location::ActiveModel {
        name: Set(name.into()),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        postal_code: Set(None),
        country: Set(None),
        phone: Set(None),
        email: Set(None),
        is_active: Set(true),
        latitude: Set(lat),
        longitude: Set(lon),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn absence_type(db: &DatabaseConnection, name: &str) -> absence_type::Model {
    absence_type::ActiveModel {
        name: Set(name.into()),
        description: Set(None),
        is_paid: Set(true),
        requires_approval: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn pay_grade(db: &DatabaseConnection, name: &str, min: i64, max: i64) -> pay_grade::Model {
    pay_grade::ActiveModel {
        name: Set(name.into()),
        description: Set(None),
        min_salary: Set(Decimal::from(min)),
        max_salary: Set(Decimal::from(max)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub struct Hire<'a> {
    pub number: &'a str,
    pub job_family: &'a str,
    pub department_id: Option<i32>,
    pub location_id: Option<i32>,
    pub province: Option<&'a str>,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
}

impl<'a> Hire<'a> {
    pub fn new(number: &'a str, hire_date: NaiveDate) -> Self {
        Self {
            number,
            job_family: "Engineering",
            department_id: None,
            location_id: None,
            province: None,
            hire_date,
            termination_date: None,
        }
    }
}

pub async fn employee(db: &DatabaseConnection, hire: Hire<'_>) -> employee::Model {
    let active = hire.termination_date.is_none();
    employee::ActiveModel {
        employee_number: Set(hire.number.into()),
        first_name: Set("Test".into()),
        last_name: Set(hire.number.into()),
        email: Set(None),
        position: Set(format!("{} Specialist", hire.job_family)),
        job_family: Set(hire.job_family.into()),
        employment_type: Set("Full-time".into()),
        province: Set(hire.province.map(str::to_string)),
        status: Set(if active { "Active" } else { "Terminated" }.into()),
        is_active: Set(active),
        hire_date: Set(Some(hire.hire_date)),
        termination_date: Set(hire.termination_date),
        department_id: Set(hire.department_id),
        location_id: Set(hire.location_id),
        org_unit_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn start_event(db: &DatabaseConnection, employee_id: i32, on: NaiveDate) {
    employee_start::ActiveModel {
        employee_id: Set(employee_id),
        start_date: Set(on),
        position: Set("Specialist".into()),
        department: Set("Engineering".into()),
        reason: Set("New Hire".into()),
        salary: Set(Decimal::from(60_000)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn exit_event(db: &DatabaseConnection, employee_id: i32, on: NaiveDate, kind: ExitType) {
    employee_exit::ActiveModel {
        employee_id: Set(employee_id),
        exit_date: Set(on),
        reason: Set("Relocation".into()),
        exit_type: Set(kind),
        notes: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn compensation(
    db: &DatabaseConnection,
    employee_id: i32,
    effective: NaiveDate,
    base: i64,
) -> compensation::Model {
    let base = Decimal::from(base);
    let bonus = base / Decimal::from(10);
    let benefits = base / Decimal::from(5);
    compensation::ActiveModel {
        employee_id: Set(employee_id),
        pay_grade_id: Set(None),
        effective_date: Set(effective),
        end_date: Set(None),
        base_salary: Set(base),
        bonus: Set(bonus),
        commission: Set(Decimal::ZERO),
        benefits: Set(benefits),
        payroll_taxes: Set(Decimal::ZERO),
        total_compensation: Set(base + bonus + benefits),
        currency: Set("USD".into()),
        pay_frequency: Set("Annual".into()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn absence(
    db: &DatabaseConnection,
    employee_id: i32,
    absence_type_id: i32,
    occurred_at: NaiveDateTime,
    hours: f64,
    overtime: bool,
) -> absence::Model {
    absence::ActiveModel {
        employee_id: Set(employee_id),
        absence_type_id: Set(absence_type_id),
        occurred_at: Set(occurred_at),
        start_date: Set(occurred_at.date()),
        end_date: Set(None),
        hours: Set(hours),
        cost: Set(Decimal::from((hours * 40.0) as i64)),
        is_overtime: Set(overtime),
        kind: Set(if overtime { "Overtime" } else { "Sick" }.into()),
        reason: Set(None),
        status: Set("Approved".into()),
        is_paid: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn payroll(
    db: &DatabaseConnection,
    employee_id: i32,
    period_end: NaiveDate,
    gross: i64,
) -> payroll::Model {
    let gross = Decimal::from(gross);
    let pct = |p: i64| gross * Decimal::from(p) / Decimal::from(100);
    let federal = pct(12);
    let state = pct(4);
    let local = pct(1);
    let social = pct(6);
    let medicare = pct(2);
    let taxes = federal + state + local + social + medicare;
    let deductions = pct(5);
    payroll::ActiveModel {
        employee_id: Set(employee_id),
        pay_period_start: Set(crate::period::month_start(period_end)),
        pay_period_end: Set(period_end),
        pay_date: Set(period_end),
        pay_frequency: Set("Monthly".into()),
        gross_pay: Set(gross),
        net_pay: Set(gross - taxes - deductions),
        total_deductions: Set(deductions),
        total_taxes: Set(taxes),
        regular_hours: Set(160.0),
        overtime_hours: Set(4.0),
        federal_income_tax: Set(federal),
        state_income_tax: Set(state),
        local_income_tax: Set(local),
        social_security_tax: Set(social),
        medicare_tax: Set(medicare),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
