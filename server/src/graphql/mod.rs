use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema, SchemaBuilder,
    SimpleObject,
};
use chrono::{NaiveDate, Utc};
use platform_api::ApiError;
use platform_db::DbPool;
use products_hr::{HrError, analytics, dashboard};
use rust_decimal::Decimal;
use tracing::instrument;

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn schema_builder() -> SchemaBuilder<QueryRoot, EmptyMutation, EmptySubscription> {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
}

pub fn build_schema(db: DbPool) -> SchemaType {
    schema_builder().data(db).finish()
}

fn gql_error(err: HrError) -> async_graphql::Error {
    ApiError::from(err).extend()
}

#[derive(Clone, Debug, SimpleObject)]
pub struct KpiSummary {
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

impl From<analytics::Kpis> for KpiSummary {
    fn from(k: analytics::Kpis) -> Self {
        Self {
            overall_cost: k.overall_cost,
            overtime_cost: k.overtime_cost,
            overtime_pct: k.overtime_pct,
            average_salary: k.average_salary,
            headcount: k.headcount,
            new_hires: k.new_hires,
            terminations: k.terminations,
            turnover_rate: k.turnover_rate,
            turnover_cost: k.turnover_cost,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct HeadcountMonth {
    pub year: i32,
    pub month: u32,
    pub headcount: u64,
    pub new_hires: u64,
    pub terminations: u64,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ProvinceHeadcount {
    pub name: String,
    pub value: u64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentSummary {
    pub department_id: i32,
    pub department_name: String,
    pub employee_count: u64,
    pub average_salary: Decimal,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct YearTurnoverSummary {
    pub year: i32,
    pub total_hires: u64,
    pub total_exits: u64,
    pub overall_turnover_rate: f64,
    pub voluntary_turnover_rate: f64,
    pub involuntary_turnover_rate: f64,
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// KPIs for a window; defaults to the month before today.
    #[instrument(name = "graphql.kpis", skip(self, ctx))]
    async fn kpis(
        &self,
        ctx: &Context<'_>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> async_graphql::Result<KpiSummary> {
        let db = ctx.data::<DbPool>()?;
        let today = Utc::now().date_naive();
        let kpis = analytics::kpis(db, from, to, today).await.map_err(gql_error)?;
        Ok(kpis.into())
    }

    #[instrument(name = "graphql.headcount_trend", skip(self, ctx))]
    async fn headcount_trend(
        &self,
        ctx: &Context<'_>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> async_graphql::Result<Vec<HeadcountMonth>> {
        let db = ctx.data::<DbPool>()?;
        let today = Utc::now().date_naive();
        let points = analytics::headcount_trend(db, from, to, today)
            .await
            .map_err(gql_error)?;
        Ok(points
            .into_iter()
            .map(|p| HeadcountMonth {
                year: p.year,
                month: p.month,
                headcount: p.headcount,
                new_hires: p.new_hires,
                terminations: p.terminations,
            })
            .collect())
    }

    #[instrument(name = "graphql.geo_headcount", skip_all)]
    async fn geo_headcount(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ProvinceHeadcount>> {
        let db = ctx.data::<DbPool>()?;
        let rows = analytics::geo_headcount(db).await.map_err(gql_error)?;
        Ok(rows
            .into_iter()
            .map(|r| ProvinceHeadcount {
                name: r.name,
                value: r.value,
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect())
    }

    #[instrument(name = "graphql.department_stats", skip_all)]
    async fn department_stats(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<DepartmentSummary>> {
        let db = ctx.data::<DbPool>()?;
        let stats = dashboard::department_stats(db).await.map_err(gql_error)?;
        Ok(stats
            .into_iter()
            .map(|s| DepartmentSummary {
                department_id: s.department_id,
                department_name: s.department_name,
                employee_count: s.employee_count,
                average_salary: s.average_salary,
            })
            .collect())
    }

    #[instrument(name = "graphql.turnover", skip(self, ctx))]
    async fn turnover(
        &self,
        ctx: &Context<'_>,
        year: Option<i32>,
    ) -> async_graphql::Result<YearTurnoverSummary> {
        use chrono::Datelike;

        let db = ctx.data::<DbPool>()?;
        let year = year.unwrap_or_else(|| Utc::now().year());
        let report = dashboard::turnover_for_year(db, year)
            .await
            .map_err(gql_error)?;
        let m = report.metrics;
        Ok(YearTurnoverSummary {
            year: report.year,
            total_hires: m.total_hires,
            total_exits: m.total_exits,
            overall_turnover_rate: m.overall_turnover_rate,
            voluntary_turnover_rate: m.voluntary_turnover_rate,
            involuntary_turnover_rate: m.involuntary_turnover_rate,
        })
    }
}
