use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAN_STATUS: &str = "ativo";
pub const DEFAULT_STEP_STATUS: &str = "pendente";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub plan_id: i64,
    pub title: String,
    pub owner: Option<String>,
    pub start_due: Option<String>,
    pub end_due: Option<String>,
    pub start_real: Option<String>,
    pub end_real: Option<String>,
    pub pct_planned: Option<f64>,
    pub pct_real: Option<f64>,
    pub status: String,
    pub position: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlan {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStep {
    pub plan_id: i64,
    pub title: String,
    pub owner: Option<String>,
    pub start_due: Option<String>,
    pub end_due: Option<String>,
    pub start_real: Option<String>,
    pub end_real: Option<String>,
    pub pct_planned: Option<f64>,
    pub pct_real: Option<f64>,
    pub status: String,
    pub position: Option<i64>,
}

impl NewStep {
    pub fn new(plan_id: i64, title: impl Into<String>) -> Self {
        Self {
            plan_id,
            title: title.into(),
            owner: None,
            start_due: None,
            end_due: None,
            start_real: None,
            end_real: None,
            pct_planned: None,
            pct_real: None,
            status: DEFAULT_STEP_STATUS.to_string(),
            position: None,
        }
    }
}
