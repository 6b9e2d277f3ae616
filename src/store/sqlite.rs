use std::path::Path;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use diesel::sqlite::{Sqlite, SqliteConnection};
use diesel::ConnectionError;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use futures::future::{BoxFuture, FutureExt};

use super::schema::{plans, steps};
use super::Store;
use crate::error::{GatewayError, Result};
use crate::model::{NewPlan, NewStep, Plan, Step};
use crate::statement::{SqlValue, UpdateStatement};

const SCHEMA_SQL: &str = include_str!("schema.sql");
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
type SqlitePool = Pool<SqliteAsyncConn>;
type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

#[derive(Queryable, Selectable)]
#[diesel(table_name = plans, check_for_backend(Sqlite))]
struct PlanRow {
    id: i64,
    name: String,
    status: String,
    created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = plans)]
struct NewPlanRow<'a> {
    name: &'a str,
    status: &'a str,
}

#[derive(Queryable, Selectable, QueryableByName)]
#[diesel(table_name = steps, check_for_backend(Sqlite))]
struct StepRow {
    id: i64,
    plan_id: i64,
    title: String,
    owner: Option<String>,
    start_due: Option<String>,
    end_due: Option<String>,
    start_real: Option<String>,
    end_real: Option<String>,
    pct_planned: Option<f64>,
    pct_real: Option<f64>,
    status: String,
    position: Option<i64>,
    created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = steps)]
struct NewStepRow<'a> {
    plan_id: i64,
    title: &'a str,
    owner: Option<&'a str>,
    start_due: Option<&'a str>,
    end_due: Option<&'a str>,
    start_real: Option<&'a str>,
    end_real: Option<&'a str>,
    pct_planned: Option<f64>,
    pct_real: Option<f64>,
    status: &'a str,
    position: Option<i64>,
}

/// Plans and steps in a SQLite file, reached through a bb8 pool of
/// diesel-async connections.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        let sqlite_path = sqlite_path(database_url);
        ensure_parent_dir(sqlite_path)?;

        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(establish_connection);
        let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new_with_config(
            sqlite_path,
            manager_config,
        );
        let pool: SqlitePool = Pool::builder()
            .max_size(max_connections.max(1))
            .build(manager)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        let store = Self { pool };
        store.bootstrap_schema().await?;
        tracing::info!(path = sqlite_path, "Opened SQLite store");
        Ok(store)
    }

    async fn bootstrap_schema(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))
    }

    async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        self.pool
            .get()
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut conn = self.conn().await?;
        let rows: Vec<PlanRow> = plans::table
            .select(PlanRow::as_select())
            .order(plans::id.desc())
            .load(&mut conn)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(rows.into_iter().map(Plan::from).collect())
    }

    async fn insert_plan(&self, plan: NewPlan) -> Result<Plan> {
        let new = NewPlanRow {
            name: &plan.name,
            status: &plan.status,
        };
        let mut conn = self.conn().await?;
        let row: PlanRow = diesel::insert_into(plans::table)
            .values(&new)
            .returning(PlanRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(row.into())
    }

    async fn list_steps(&self, plan_id: i64) -> Result<Vec<Step>> {
        let mut conn = self.conn().await?;
        let rows: Vec<StepRow> = steps::table
            .filter(steps::plan_id.eq(plan_id))
            .order((
                steps::position.is_null().asc(),
                steps::position.asc(),
                steps::id.asc(),
            ))
            .select(StepRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(rows.into_iter().map(Step::from).collect())
    }

    async fn insert_step(&self, step: NewStep) -> Result<Step> {
        let new = NewStepRow {
            plan_id: step.plan_id,
            title: &step.title,
            owner: step.owner.as_deref(),
            start_due: step.start_due.as_deref(),
            end_due: step.end_due.as_deref(),
            start_real: step.start_real.as_deref(),
            end_real: step.end_real.as_deref(),
            pct_planned: step.pct_planned,
            pct_real: step.pct_real,
            status: &step.status,
            position: step.position,
        };
        let mut conn = self.conn().await?;
        let row: StepRow = diesel::insert_into(steps::table)
            .values(&new)
            .returning(StepRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(row.into())
    }

    async fn update_step(&self, statement: &UpdateStatement) -> Result<Option<Step>> {
        let mut query = diesel::sql_query(statement.sql()).into_boxed::<Sqlite>();
        for assignment in statement.assignments() {
            query = match assignment.value.clone() {
                SqlValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
                SqlValue::Text(text) => query.bind::<Text, _>(text),
                SqlValue::Float(value) => query.bind::<Double, _>(value),
                SqlValue::Integer(value) => query.bind::<BigInt, _>(value),
            };
        }
        let query = query.bind::<BigInt, _>(statement.step_id());

        let mut conn = self.conn().await?;
        let rows: Vec<StepRow> = query
            .load(&mut conn)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(rows.into_iter().next().map(Step::from))
    }
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

impl From<StepRow> for Step {
    fn from(row: StepRow) -> Self {
        Self {
            id: row.id,
            plan_id: row.plan_id,
            title: row.title,
            owner: row.owner,
            start_due: row.start_due,
            end_due: row.end_due,
            start_real: row.start_real,
            end_real: row.end_real,
            pct_planned: row.pct_planned,
            pct_real: row.pct_real,
            status: row.status,
            position: row.position,
            created_at: row.created_at,
        }
    }
}

fn establish_connection(url: &str) -> BoxFuture<'_, ConnectionResult<SqliteAsyncConn>> {
    async move {
        let mut conn = SqliteAsyncConn::establish(url).await?;
        conn.batch_execute(CONNECTION_PRAGMAS)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}

/// Accepts bare paths as well as `sqlite://` and `sqlite:` URLs.
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Store(e.to_string()))?;
        }
    }
    Ok(())
}
