use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewPlan, NewStep, Plan, Step};
use crate::statement::UpdateStatement;

mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// The relational store behind the gateway. Each method is a single statement.
#[async_trait]
pub trait Store: Send + Sync {
    /// All plans, newest id first.
    async fn list_plans(&self) -> Result<Vec<Plan>>;

    async fn insert_plan(&self, plan: NewPlan) -> Result<Plan>;

    /// Steps of one plan ordered by position (unset positions last), then id.
    async fn list_steps(&self, plan_id: i64) -> Result<Vec<Step>>;

    async fn insert_step(&self, step: NewStep) -> Result<Step>;

    /// `None` when no step has the statement's id.
    async fn update_step(&self, statement: &UpdateStatement) -> Result<Option<Step>>;
}
