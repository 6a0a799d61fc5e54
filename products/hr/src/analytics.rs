//! Headline KPIs and the chart series behind the overview page.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike};
use entity::{absence, compensation, employee_exit, employee_start, location};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::error::HrResult;
use crate::period::{Period, add_months, check_dates, month_end, months_between};
use crate::stats::{BoxPlot, mean, pct, round_to};
use crate::workforce::{self, headcount_during, headcount_on, money, to_f64};

/// Replacement cost booked per exit in the KPI tiles.
pub const TURNOVER_COST_PER_EXIT: i64 = 50_000;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub overall_cost: Decimal,
    pub overtime_cost: Decimal,
    pub overtime_pct: f64,
    pub average_salary: Decimal,
    pub headcount: u64,
    pub new_hires: u64,
    pub terminations: u64,
    pub turnover_rate: f64,
    pub turnover_cost: Decimal,
}

struct HourTotals {
    overtime_hours: f64,
    total_hours: f64,
    overtime_cost: Decimal,
}

fn hour_totals(rows: &[absence::Model]) -> HourTotals {
    let mut totals = HourTotals {
        overtime_hours: 0.0,
        total_hours: 0.0,
        overtime_cost: Decimal::ZERO,
    };
    for row in rows {
        totals.total_hours += row.hours;
        if row.is_overtime {
            totals.overtime_hours += row.hours;
            totals.overtime_cost += row.cost;
        }
    }
    totals
}

async fn average_latest_salary(db: &DatabaseConnection) -> HrResult<Decimal> {
    let latest = workforce::latest_compensations(db).await?;
    let salaries: Vec<f64> = latest.values().map(|c| to_f64(c.base_salary)).collect();
    Ok(money(mean(&salaries)))
}

/// KPIs for a window; `to` defaults to `today` and `from` to one month before `to`.
#[instrument(skip(db))]
pub async fn kpis(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> HrResult<Kpis> {
    check_dates(&[from, to])?;
    let end = to.unwrap_or(today);
    let period = Period::new(from.unwrap_or_else(|| add_months(end, -1)), end);

    let employees = workforce::employees(db).await?;
    let headcount = headcount_on(&employees, period.to) as u64;
    let total_employees = employees.len() as u64;

    let new_hires = employee_start::Entity::find()
        .filter(employee_start::Column::StartDate.between(period.from, period.to))
        .count(db)
        .await?;
    let terminations = employee_exit::Entity::find()
        .filter(employee_exit::Column::ExitDate.between(period.from, period.to))
        .count(db)
        .await?;

    let absences = absence::Entity::find()
        .filter(absence::Column::StartDate.between(period.from, period.to))
        .all(db)
        .await?;
    let hours = hour_totals(&absences);

    let overall_cost = compensation::Entity::find()
        .filter(compensation::Column::EffectiveDate.between(period.from, period.to))
        .all(db)
        .await?
        .iter()
        .map(|c| c.total_compensation)
        .sum::<Decimal>();

    Ok(Kpis {
        overall_cost,
        overtime_cost: hours.overtime_cost,
        overtime_pct: round_to(pct(hours.overtime_hours, hours.total_hours), 2),
        average_salary: average_latest_salary(db).await?,
        headcount,
        new_hires,
        terminations,
        turnover_rate: round_to(pct(terminations as f64, total_employees as f64), 2),
        turnover_cost: Decimal::from(TURNOVER_COST_PER_EXIT * terminations as i64),
    })
}

/// Lifetime KPIs: headcount is the active roster and the rate divides by it.
#[instrument(skip(db))]
pub async fn kpis_all(db: &DatabaseConnection) -> HrResult<Kpis> {
    let employees = workforce::employees(db).await?;
    let headcount = employees.iter().filter(|e| e.is_active).count() as u64;
    let terminations = employees
        .iter()
        .filter(|e| e.termination_date.is_some())
        .count() as u64;
    let new_hires = employee_start::Entity::find().count(db).await?;

    let absences = absence::Entity::find().all(db).await?;
    let hours = hour_totals(&absences);
    let overall_cost = compensation::Entity::find()
        .all(db)
        .await?
        .iter()
        .map(|c| c.total_compensation)
        .sum::<Decimal>();

    Ok(Kpis {
        overall_cost,
        overtime_cost: hours.overtime_cost,
        overtime_pct: round_to(pct(hours.overtime_hours, hours.total_hours), 2),
        average_salary: average_latest_salary(db).await?,
        headcount,
        new_hires,
        terminations,
        turnover_rate: round_to(pct(terminations as f64, headcount as f64), 2),
        turnover_cost: Decimal::from(TURNOVER_COST_PER_EXIT * terminations as i64),
    })
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeadcountPoint {
    pub year: i32,
    pub month: u32,
    pub headcount: u64,
    pub new_hires: u64,
    pub terminations: u64,
}

/// One point per month; `from` defaults to eleven months before `to`.
#[instrument(skip(db))]
pub async fn headcount_trend(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> HrResult<Vec<HeadcountPoint>> {
    check_dates(&[from, to])?;
    let end = to.unwrap_or(today);
    let start = from.unwrap_or_else(|| add_months(end, -11));
    if start > end {
        return Ok(Vec::new());
    }
    let months = months_between(start, end);
    let window_end = month_end(end);

    let employees = workforce::employees(db).await?;
    let starts = employee_start::Entity::find()
        .filter(employee_start::Column::StartDate.between(months[0], window_end))
        .all(db)
        .await?;
    let exits = employee_exit::Entity::find()
        .filter(employee_exit::Column::ExitDate.between(months[0], window_end))
        .all(db)
        .await?;

    let bucket = |day: NaiveDate| (day.year(), day.month());
    let mut hires_by_month: HashMap<(i32, u32), u64> = HashMap::new();
    for row in &starts {
        *hires_by_month.entry(bucket(row.start_date)).or_default() += 1;
    }
    let mut exits_by_month: HashMap<(i32, u32), u64> = HashMap::new();
    for row in &exits {
        *exits_by_month.entry(bucket(row.exit_date)).or_default() += 1;
    }

    Ok(months
        .into_iter()
        .map(|first| {
            let key = bucket(first);
            HeadcountPoint {
                year: first.year(),
                month: first.month(),
                headcount: headcount_during(&employees, first, month_end(first)) as u64,
                new_hires: hires_by_month.get(&key).copied().unwrap_or(0),
                terminations: exits_by_month.get(&key).copied().unwrap_or(0),
            }
        })
        .collect())
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoRow {
    pub name: String,
    pub value: u64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Headcount per province, positioned at the first member's office.
#[instrument(skip(db))]
pub async fn geo_headcount(db: &DatabaseConnection) -> HrResult<Vec<GeoRow>> {
    let employees = workforce::employees(db).await?;
    let locations: HashMap<i32, location::Model> = location::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

    let mut rows: BTreeMap<String, GeoRow> = BTreeMap::new();
    for employee in &employees {
        let name = employee
            .province
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let row = rows.entry(name.clone()).or_insert_with(|| {
            let office = employee.location_id.and_then(|id| locations.get(&id));
            GeoRow {
                name,
                value: 0,
                latitude: office.map(|l| l.latitude).unwrap_or(0.0),
                longitude: office.map(|l| l.longitude).unwrap_or(0.0),
            }
        });
        row.value += 1;
    }
    Ok(rows.into_values().collect())
}

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeHeatmap {
    pub department: String,
    pub days: Vec<String>,
    pub hours: Vec<String>,
    /// `data[weekday][hour]`, Monday first.
    pub data: Vec<Vec<i64>>,
}

/// Overtime hours bucketed by weekday and hour of day.
#[instrument(skip(db))]
pub async fn time_heatmap(db: &DatabaseConnection) -> HrResult<TimeHeatmap> {
    let overtime = absence::Entity::find()
        .filter(absence::Column::IsOvertime.eq(true))
        .all(db)
        .await?;
    let mut data = vec![vec![0i64; 24]; 7];
    for row in &overtime {
        let weekday = row.occurred_at.weekday().num_days_from_monday() as usize;
        let hour = row.occurred_at.hour() as usize;
        data[weekday][hour] += row.hours.round() as i64;
    }
    Ok(TimeHeatmap {
        department: "Overall".to_string(),
        days: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        hours: (0..24).map(|h| format!("{h:02}:00")).collect(),
        data,
    })
}

#[derive(Clone, Debug, Serialize)]
pub struct CompensationSummary {
    pub categories: Vec<String>,
    #[serde(rename = "box")]
    pub boxes: Vec<[f64; 5]>,
}

/// Box plot of current base salary per job family, families sorted by name.
#[instrument(skip(db))]
pub async fn compensation_summary(db: &DatabaseConnection) -> HrResult<CompensationSummary> {
    let employees = workforce::employees(db).await?;
    let latest = workforce::latest_compensations(db).await?;

    let mut families: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for employee in &employees {
        let salaries = families.entry(employee.job_family.clone()).or_default();
        if let Some(comp) = latest.get(&employee.id) {
            salaries.push(to_f64(comp.base_salary).trunc());
        }
    }

    let (categories, boxes) = families
        .into_iter()
        .map(|(family, salaries)| (family, BoxPlot::from_values(&salaries).to_array()))
        .unzip();
    Ok(CompensationSummary { categories, boxes })
}

/// Market midpoint for a job family.
pub fn market_midpoint(job_family: &str) -> f64 {
    match job_family {
        "Engineering" => 110_000.0,
        "Sales" => 95_000.0,
        "HR" => 80_000.0,
        "Finance" => 95_000.0,
        "Operations" => 85_000.0,
        "Customer Success" => 75_000.0,
        _ => 90_000.0,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Competitiveness {
    /// `[tenureYears, compaRatio, level]`
    pub points: Vec<(f64, f64, u8)>,
}

/// Tenure against compa-ratio for every active employee with pay history.
#[instrument(skip(db))]
pub async fn competitiveness(db: &DatabaseConnection, today: NaiveDate) -> HrResult<Competitiveness> {
    let employees = workforce::employees(db).await?;
    let latest = workforce::latest_compensations(db).await?;

    let points = employees
        .iter()
        .filter(|e| e.is_active)
        .filter_map(|employee| {
            let hire = employee.hire_date?;
            let comp = latest.get(&employee.id)?;
            let tenure = (today - hire).num_days().max(0) as f64 / 365.25;
            let ratio = to_f64(comp.base_salary) / market_midpoint(&employee.job_family);
            // Level is stable per hire date so the scatter does not reshuffle.
            let mut rng = StdRng::seed_from_u64(hire.num_days_from_ce() as u64);
            let level = rng.gen_range(1..6u8);
            Some((round_to(tenure, 1), round_to(ratio, 2), level))
        })
        .collect();
    Ok(Competitiveness { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Hire, at, day};
    use entity::employee_exit::ExitType;

    #[tokio::test]
    async fn kpis_cover_the_requested_window() {
        let db = testing::db().await;
        let sick = testing::absence_type(&db, "Sick Leave").await;
        let a = testing::employee(&db, Hire::new("E1", day(2023, 1, 10))).await;
        let mut leaver = Hire::new("E2", day(2023, 2, 1));
        leaver.termination_date = Some(day(2025, 5, 20));
        let b = testing::employee(&db, leaver).await;
        testing::start_event(&db, a.id, day(2025, 5, 2)).await;
        testing::exit_event(&db, b.id, day(2025, 5, 20), ExitType::Voluntary).await;
        testing::compensation(&db, a.id, day(2025, 5, 1), 100_000).await;
        testing::compensation(&db, b.id, day(2024, 1, 1), 60_000).await;
        testing::absence(&db, a.id, sick.id, at(2025, 5, 6, 18), 3.0, true).await;
        testing::absence(&db, a.id, sick.id, at(2025, 5, 7, 9), 9.0, false).await;

        let k = kpis(&db, Some(day(2025, 5, 1)), Some(day(2025, 5, 31)), day(2025, 6, 15))
            .await
            .unwrap();
        assert_eq!(k.headcount, 1);
        assert_eq!(k.new_hires, 1);
        assert_eq!(k.terminations, 1);
        assert_eq!(k.overtime_pct, 25.0);
        assert_eq!(k.turnover_rate, 50.0);
        assert_eq!(k.turnover_cost, Decimal::from(50_000));
        assert_eq!(k.average_salary, Decimal::from(80_000));
        // base 100k + 10% bonus + 20% benefits
        assert_eq!(k.overall_cost, Decimal::from(130_000));

        let all = kpis_all(&db).await.unwrap();
        assert_eq!(all.headcount, 1);
        assert_eq!(all.terminations, 1);
        assert_eq!(all.turnover_rate, 100.0);
    }

    #[tokio::test]
    async fn kpis_on_an_empty_store_are_zero() {
        let db = testing::db().await;
        let k = kpis(&db, None, None, day(2025, 6, 15)).await.unwrap();
        assert_eq!(k.headcount, 0);
        assert_eq!(k.turnover_rate, 0.0);
        assert_eq!(k.overtime_pct, 0.0);
        assert_eq!(k.average_salary, Decimal::ZERO);
        let all = kpis_all(&db).await.unwrap();
        assert_eq!(all.turnover_rate, 0.0);
    }

    #[tokio::test]
    async fn headcount_trend_counts_anyone_employed_during_the_month() {
        let db = testing::db().await;
        testing::employee(&db, Hire::new("E1", day(2024, 1, 15))).await;
        let mut short = Hire::new("E2", day(2024, 2, 10));
        short.termination_date = Some(day(2024, 3, 5));
        let e2 = testing::employee(&db, short).await;
        testing::start_event(&db, e2.id, day(2024, 2, 10)).await;
        testing::exit_event(&db, e2.id, day(2024, 3, 5), ExitType::Involuntary).await;

        let trend = headcount_trend(&db, Some(day(2024, 1, 1)), Some(day(2024, 4, 30)), day(2025, 1, 1))
            .await
            .unwrap();
        let counts: Vec<u64> = trend.iter().map(|p| p.headcount).collect();
        assert_eq!(counts, vec![1, 2, 2, 1]);
        assert_eq!(trend[1].new_hires, 1);
        assert_eq!(trend[2].terminations, 1);
        assert_eq!((trend[3].year, trend[3].month), (2024, 4));

        let default_window = headcount_trend(&db, None, None, day(2024, 12, 31)).await.unwrap();
        assert_eq!(default_window.len(), 12);
    }

    #[tokio::test]
    async fn geo_rows_group_by_province() {
        let db = testing::db().await;
        let hq = testing::location(&db, "Headquarters", 43.65, -79.38).await;
        for number in ["E1", "E2"] {
            let mut hire = Hire::new(number, day(2024, 1, 1));
            hire.province = Some("Ontario");
            hire.location_id = Some(hq.id);
            testing::employee(&db, hire).await;
        }
        testing::employee(&db, Hire::new("E3", day(2024, 1, 1))).await;

        let rows = geo_headcount(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ontario");
        assert_eq!(rows[0].value, 2);
        assert_eq!(rows[0].latitude, 43.65);
        assert_eq!(rows[1].name, "Unknown");
        assert_eq!(rows[1].longitude, 0.0);
    }

    #[tokio::test]
    async fn heatmap_buckets_overtime_by_weekday_and_hour() {
        let db = testing::db().await;
        let ot = testing::absence_type(&db, "Overtime").await;
        let e = testing::employee(&db, Hire::new("E1", day(2024, 1, 1))).await;
        // 2024-06-03 is a Monday.
        testing::absence(&db, e.id, ot.id, at(2024, 6, 3, 18), 2.4, true).await;
        testing::absence(&db, e.id, ot.id, at(2024, 6, 10, 18), 3.0, true).await;
        testing::absence(&db, e.id, ot.id, at(2024, 6, 9, 7), 5.0, true).await;
        testing::absence(&db, e.id, ot.id, at(2024, 6, 4, 7), 8.0, false).await;

        let map = time_heatmap(&db).await.unwrap();
        assert_eq!(map.department, "Overall");
        assert_eq!(map.data.len(), 7);
        assert_eq!(map.data[0][18], 5);
        assert_eq!(map.data[6][7], 5);
        assert_eq!(map.data[1][7], 0);
        assert_eq!(map.hours[9], "09:00");
    }

    #[tokio::test]
    async fn compensation_summary_uses_latest_salary_per_family() {
        let db = testing::db().await;
        for (i, salary) in [50_000, 60_000, 70_000, 80_000, 90_000].into_iter().enumerate() {
            let number = format!("E{i}");
            let e = testing::employee(&db, Hire::new(&number, day(2023, 1, 1))).await;
            testing::compensation(&db, e.id, day(2023, 1, 1), 10_000).await;
            testing::compensation(&db, e.id, day(2024, 1, 1), salary).await;
        }
        let mut sales = Hire::new("S1", day(2023, 1, 1));
        sales.job_family = "Sales";
        testing::employee(&db, sales).await;

        let summary = compensation_summary(&db).await.unwrap();
        assert_eq!(summary.categories, vec!["Engineering", "Sales"]);
        assert_eq!(
            summary.boxes[0],
            [50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0]
        );
        assert_eq!(summary.boxes[1], [0.0; 5]);
    }

    #[tokio::test]
    async fn competitiveness_points_are_stable() {
        let db = testing::db().await;
        let e = testing::employee(&db, Hire::new("E1", day(2020, 6, 15))).await;
        testing::compensation(&db, e.id, day(2024, 1, 1), 121_000).await;

        let first = competitiveness(&db, day(2025, 6, 15)).await.unwrap();
        let again = competitiveness(&db, day(2025, 6, 15)).await.unwrap();
        assert_eq!(first.points, again.points);
        let (tenure, ratio, level) = first.points[0];
        assert_eq!(tenure, 5.0);
        assert_eq!(ratio, 1.1);
        assert!((1..6).contains(&level));
        assert_eq!(market_midpoint("Astronomy"), 90_000.0);
    }
}
