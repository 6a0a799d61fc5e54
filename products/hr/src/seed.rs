//! Demo data generator behind the `seed` command.
//!
//! Everything is drawn from one seeded generator, so a given seed and date
//! always produce the same dataset. Seeding is skipped when users already
//! exist.

use chrono::{Duration, NaiveDate, NaiveTime};
use entity::employee_exit::ExitType;
use entity::{
    absence, absence_type, compensation, department, employee, employee_exit, employee_start,
    location, org_unit, pay_grade, payroll, payroll_item, user,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::accounts::create_user;
use crate::period::{add_months, month_end, trailing_months};
use crate::workforce::{money, to_f64};

pub const DEFAULT_EMPLOYEES: usize = 500;
pub const DEFAULT_SEED: u64 = 100;

const ORG_UNITS: [&str; 7] = [
    "Sales",
    "Engineering",
    "Ops",
    "Support",
    "Finance",
    "HR",
    "Marketing",
];
const DEPARTMENTS: [&str; 8] = [
    "Sales",
    "Engineering",
    "Human Resources",
    "Finance",
    "Operations",
    "Customer Success",
    "Marketing",
    "Research and Development",
];
/// Office name, city, province, latitude, longitude.
const OFFICES: [(&str, &str, &str, f64, f64); 6] = [
    ("Headquarters", "Toronto", "Ontario", 43.6532, -79.3832),
    ("Satellite Office A", "Montreal", "Quebec", 45.5017, -73.5673),
    ("Remote Hub B", "Vancouver", "British Columbia", 49.2827, -123.1207),
    ("Regional Center C", "Calgary", "Alberta", 51.0447, -114.0719),
    ("Prairie Office", "Winnipeg", "Manitoba", 49.8951, -97.1384),
    ("Atlantic Office", "Halifax", "Nova Scotia", 44.6488, -63.5752),
];
const ABSENCE_TYPES: [&str; 11] = [
    "Sick Leave",
    "Vacation",
    "Personal Leave",
    "Family Leave",
    "Bereavement Leave",
    "Jury Duty",
    "Maternity Leave",
    "Paternity Leave",
    "Sabbatical",
    "Overtime",
    "PTO",
];
/// Name, minimum and maximum annual salary.
const PAY_GRADES: [(&str, i64, i64); 6] = [
    ("Entry Level", 30_000, 60_000),
    ("Junior", 45_000, 75_000),
    ("Intermediate", 60_000, 95_000),
    ("Senior", 80_000, 120_000),
    ("Lead", 100_000, 150_000),
    ("Principal", 130_000, 200_000),
];
const JOB_FAMILIES: [&str; 6] = [
    "Engineering",
    "Sales",
    "HR",
    "Finance",
    "Operations",
    "Customer Success",
];
const EXIT_REASONS: [&str; 6] = [
    "Resignation",
    "Retirement",
    "Better Opportunity",
    "Relocation",
    "Career Change",
    "Dissatisfaction",
];
const ANNUAL_HOURS: f64 = 2080.0;

#[derive(Clone, Copy, Debug)]
pub struct SeedOptions {
    pub employees: usize,
    pub rng_seed: u64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            employees: DEFAULT_EMPLOYEES,
            rng_seed: DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub employees: usize,
    pub terminated: usize,
    pub compensations: usize,
    pub absences: usize,
    pub payrolls: usize,
}

struct Reference {
    org_units: Vec<i32>,
    departments: Vec<department::Model>,
    offices: Vec<location::Model>,
    absence_types: Vec<absence_type::Model>,
    pay_grades: Vec<pay_grade::Model>,
}

/// Populates an empty database. Returns `None` when users already exist.
#[instrument(skip(db))]
pub async fn seed(
    db: &DatabaseConnection,
    options: SeedOptions,
    today: NaiveDate,
) -> anyhow::Result<Option<SeedSummary>> {
    if user::Entity::find().count(db).await? > 0 {
        info!("database already seeded; skipping");
        return Ok(None);
    }
    let txn = db.begin().await?;
    create_user(&txn, "admin", "admin123", "Admin", "default").await?;
    create_user(&txn, "analyst", "analyst123", "User", "default").await?;

    let reference = reference_data(&txn).await?;
    let mut rng = StdRng::seed_from_u64(options.rng_seed);
    let mut summary = SeedSummary::default();
    let base = add_months(today, -24);
    for index in 0..options.employees {
        seed_employee(&txn, &reference, &mut rng, index, base, today, &mut summary).await?;
    }
    txn.commit().await?;
    info!(?summary, "seed complete");
    Ok(Some(summary))
}

async fn reference_data<C: ConnectionTrait>(db: &C) -> anyhow::Result<Reference> {
    let mut org_units = Vec::new();
    for name in ORG_UNITS {
        let unit = org_unit::ActiveModel {
            name: Set(name.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        org_units.push(unit.id);
    }

    let mut departments = Vec::new();
    for name in DEPARTMENTS {
        departments.push(
            department::ActiveModel {
                name: Set(name.into()),
                description: Set(Some(format!("{name} department"))),
                ..Default::default()
            }
            .insert(db)
            .await?,
        );
    }

    let mut offices = Vec::new();
    for (name, city, province, latitude, longitude) in OFFICES {
        offices.push(
            location::ActiveModel {
                name: Set(name.into()),
                address: Set(Some("123 Main St".into())),
                city: Set(Some(city.into())),
                state: Set(Some(province.into())),
                postal_code: Set(None),
                country: Set(Some("Canada".into())),
                phone: Set(Some("555-1234".into())),
                email: Set(Some("info@example.com".into())),
                is_active: Set(true),
                latitude: Set(latitude),
                longitude: Set(longitude),
                ..Default::default()
            }
            .insert(db)
            .await?,
        );
    }

    let mut absence_types = Vec::new();
    for name in ABSENCE_TYPES {
        absence_types.push(
            absence_type::ActiveModel {
                name: Set(name.into()),
                description: Set(Some(format!("{name} leave"))),
                is_paid: Set(name != "Sabbatical"),
                requires_approval: Set(true),
                ..Default::default()
            }
            .insert(db)
            .await?,
        );
    }

    let mut pay_grades = Vec::new();
    for (name, min, max) in PAY_GRADES {
        pay_grades.push(
            pay_grade::ActiveModel {
                name: Set(name.into()),
                description: Set(Some(format!("{name} pay grade"))),
                min_salary: Set(Decimal::from(min)),
                max_salary: Set(Decimal::from(max)),
                ..Default::default()
            }
            .insert(db)
            .await?,
        );
    }

    Ok(Reference {
        org_units,
        departments,
        offices,
        absence_types,
        pay_grades,
    })
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Highest grade whose floor the salary reaches.
fn grade_for(grades: &[pay_grade::Model], salary: f64) -> Option<i32> {
    grades
        .iter()
        .filter(|g| to_f64(g.min_salary) <= salary)
        .max_by(|a, b| a.min_salary.cmp(&b.min_salary))
        .or_else(|| grades.first())
        .map(|g| g.id)
}

async fn seed_employee<C: ConnectionTrait>(
    db: &C,
    reference: &Reference,
    rng: &mut StdRng,
    index: usize,
    base: NaiveDate,
    today: NaiveDate,
    summary: &mut SeedSummary,
) -> anyhow::Result<()> {
    let hire = (base + Duration::days(rng.gen_range(0..700))).min(today);
    let termination = (rng.r#gen::<f64>() < 0.15)
        .then(|| hire + Duration::days(rng.gen_range(60..600)))
        .filter(|term| *term <= today);
    let office = pick(rng, &reference.offices);
    let dept = pick(rng, &reference.departments);
    let family = *pick(rng, &JOB_FAMILIES);
    let full_time = rng.r#gen::<f64>() < 0.8;
    let level = rng.gen_range(1..5);

    let person = employee::ActiveModel {
        employee_number: Set(format!("E{index:05}")),
        first_name: Set("Emp".into()),
        last_name: Set(format!("{index:03}")),
        email: Set(Some(format!("emp{index:05}@example.com"))),
        position: Set(format!("{family} {level}")),
        job_family: Set(family.into()),
        employment_type: Set(if full_time { "Full-time" } else { "Part-time" }.into()),
        province: Set(office.state.clone()),
        status: Set(if termination.is_some() { "Terminated" } else { "Active" }.into()),
        is_active: Set(termination.is_none()),
        hire_date: Set(Some(hire)),
        termination_date: Set(termination),
        department_id: Set(Some(dept.id)),
        location_id: Set(Some(office.id)),
        org_unit_id: Set(Some(*pick(rng, &reference.org_units))),
        ..Default::default()
    }
    .insert(db)
    .await?;
    summary.employees += 1;

    let mut salary = f64::from(rng.gen_range(50_000..150_000_u32));
    employee_start::ActiveModel {
        employee_id: Set(person.id),
        start_date: Set(hire),
        position: Set(person.position.clone()),
        department: Set(dept.name.clone()),
        reason: Set("New Hire".into()),
        salary: Set(money(salary)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(exit_date) = termination {
        summary.terminated += 1;
        let exit_type = if rng.gen_bool(0.5) {
            ExitType::Voluntary
        } else {
            ExitType::Involuntary
        };
        employee_exit::ActiveModel {
            employee_id: Set(person.id),
            exit_date: Set(exit_date),
            reason: Set((*pick(rng, &EXIT_REASONS)).into()),
            exit_type: Set(exit_type),
            notes: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    // Three raises, the first within a year of hire; future steps are dropped.
    let mut effective = (hire + Duration::days(rng.gen_range(0..365))).min(today);
    let mut steps = Vec::new();
    for _ in 0..3 {
        if effective > today {
            break;
        }
        let bonus_rate = 0.05 + rng.r#gen::<f64>() * 0.1;
        steps.push((effective, salary, bonus_rate));
        salary *= 1.0 + rng.r#gen::<f64>() * 0.05;
        effective = add_months(effective, 8 + rng.gen_range(0..6));
    }
    let last = steps.len().saturating_sub(1);
    let rows: Vec<compensation::ActiveModel> = steps
        .iter()
        .enumerate()
        .map(|(i, &(from, base_pay, bonus_rate))| {
            let bonus = base_pay * bonus_rate;
            let benefits = base_pay * 0.2;
            let taxes = base_pay * 0.08;
            compensation::ActiveModel {
                employee_id: Set(person.id),
                pay_grade_id: Set(grade_for(&reference.pay_grades, base_pay)),
                effective_date: Set(from),
                end_date: Set(steps.get(i + 1).and_then(|next| next.0.pred_opt())),
                base_salary: Set(money(base_pay)),
                bonus: Set(money(bonus)),
                commission: Set(Decimal::ZERO),
                benefits: Set(money(benefits)),
                payroll_taxes: Set(money(taxes)),
                total_compensation: Set(money(base_pay + bonus + benefits + taxes)),
                currency: Set("USD".into()),
                pay_frequency: Set("Annual".into()),
                is_active: Set(i == last),
                ..Default::default()
            }
        })
        .collect();
    summary.compensations += rows.len();
    if !rows.is_empty() {
        compensation::Entity::insert_many(rows).exec(db).await?;
    }
    let current_salary = steps.last().map(|s| s.1).unwrap_or(salary);

    let last_day = termination.unwrap_or(today);
    let mut absences = Vec::new();
    for _ in 0..rng.gen_range(2..20) {
        let date = hire + Duration::days(rng.gen_range(0..600));
        let overtime = rng.r#gen::<f64>() < 0.3;
        let (kind, type_name) = if overtime {
            ("Overtime", "Overtime")
        } else if rng.gen_bool(0.5) {
            ("Sick", "Sick Leave")
        } else {
            ("PTO", "PTO")
        };
        let hours: u32 = if overtime {
            rng.gen_range(1..6)
        } else {
            rng.gen_range(4..9)
        };
        let hour = rng.gen_range(6..22);
        if date > last_day {
            continue;
        }
        let Some(kind_type) = reference
            .absence_types
            .iter()
            .find(|t| t.name == type_name)
            .or_else(|| reference.absence_types.first())
        else {
            continue;
        };
        let premium = if overtime { 1.5 } else { 1.0 };
        let hours = f64::from(hours);
        absences.push(absence::ActiveModel {
            employee_id: Set(person.id),
            absence_type_id: Set(kind_type.id),
            occurred_at: Set(date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))),
            start_date: Set(date),
            end_date: Set(Some(date)),
            hours: Set(hours),
            cost: Set(money(hours * current_salary / ANNUAL_HOURS * premium)),
            is_overtime: Set(overtime),
            kind: Set(kind.into()),
            reason: Set(None),
            status: Set("Approved".into()),
            is_paid: Set(kind_type.is_paid),
            ..Default::default()
        });
    }
    summary.absences += absences.len();
    if !absences.is_empty() {
        absence::Entity::insert_many(absences).exec(db).await?;
    }

    for month in trailing_months(today, 12) {
        let period_end = month_end(month);
        if hire > period_end || termination.is_some_and(|term| term < month) {
            continue;
        }
        let regular_hours = if full_time { 160.0 } else { 80.0 };
        let overtime_hours = f64::from(rng.gen_range(0..10_u32));
        let share = if full_time { 1.0 } else { 0.5 };
        let base_pay = current_salary / 12.0 * share;
        let overtime_pay = overtime_hours * current_salary / ANNUAL_HOURS * 1.5;
        seed_payroll(
            db,
            person.id,
            month,
            period_end,
            base_pay,
            overtime_pay,
            regular_hours,
            overtime_hours,
        )
        .await?;
        summary.payrolls += 1;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn seed_payroll<C: ConnectionTrait>(
    db: &C,
    employee_id: i32,
    start: NaiveDate,
    end: NaiveDate,
    base_pay: f64,
    overtime_pay: f64,
    regular_hours: f64,
    overtime_hours: f64,
) -> anyhow::Result<()> {
    let gross = base_pay + overtime_pay;
    let taxes = [
        ("Federal Income Tax", gross * 0.12),
        ("State Income Tax", gross * 0.04),
        ("Local Income Tax", gross * 0.01),
        ("Social Security", gross * 0.062),
        ("Medicare", gross * 0.0145),
    ];
    let withheld: Vec<Decimal> = taxes.iter().map(|(_, amount)| money(*amount)).collect();
    let total_taxes: Decimal = withheld.iter().copied().sum();
    let retirement = money(gross * 0.05);
    let gross_pay = money(gross);

    let run = payroll::ActiveModel {
        employee_id: Set(employee_id),
        pay_period_start: Set(start),
        pay_period_end: Set(end),
        pay_date: Set(end),
        pay_frequency: Set("Monthly".into()),
        gross_pay: Set(gross_pay),
        net_pay: Set(gross_pay - total_taxes - retirement),
        total_deductions: Set(retirement),
        total_taxes: Set(total_taxes),
        regular_hours: Set(regular_hours),
        overtime_hours: Set(overtime_hours),
        federal_income_tax: Set(withheld[0]),
        state_income_tax: Set(withheld[1]),
        local_income_tax: Set(withheld[2]),
        social_security_tax: Set(withheld[3]),
        medicare_tax: Set(withheld[4]),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let item = |item_type: &str, name: &str, amount: Decimal, quantity: Option<f64>| {
        payroll_item::ActiveModel {
            payroll_id: Set(run.id),
            item_type: Set(item_type.into()),
            name: Set(name.into()),
            description: Set(None),
            amount: Set(amount),
            rate_type: Set(if quantity.is_some() { "Hourly" } else { "Fixed" }.into()),
            rate: Set(None),
            quantity: Set(quantity),
            ..Default::default()
        }
    };
    let mut items = vec![item("Earning", "Base Pay", money(base_pay), Some(regular_hours))];
    if overtime_hours > 0.0 {
        items.push(item("Earning", "Overtime", money(overtime_pay), Some(overtime_hours)));
    }
    items.extend(
        taxes
            .iter()
            .zip(&withheld)
            .map(|((name, _), amount)| item("Tax", *name, *amount, None)),
    );
    items.push(item("Deduction", "Retirement", retirement, None));
    payroll_item::Entity::insert_many(items).exec(db).await?;
    Ok(())
}
