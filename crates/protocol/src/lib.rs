use serde::{Deserialize, Serialize};

/// One entry of the goal list served at [`routes::GOALS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub goal: String,
    pub days: i64,
    pub completed: bool,
}

impl Goal {
    pub fn new(goal: impl Into<String>, days: i64, completed: bool) -> Self {
        Self {
            goal: goal.into(),
            days,
            completed,
        }
    }

    pub fn line(&self) -> String {
        format!(
            "{} - {} days - Completed: {}",
            self.goal, self.days, self.completed
        )
    }
}

/// Text shown in the goals dialog once the list arrives.
pub fn render_goals(goals: &[Goal]) -> String {
    let mut out = String::from("Goals:\n");
    for g in goals {
        out.push_str(&g.line());
        out.push('\n');
    }
    out
}

/// A `users` row as returned by [`routes::USER_BY_ID`]. Columns are passed
/// through by name, so the shape follows the table.
pub type User = serde_json::Map<String, serde_json::Value>;

pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const GOALS: &str = "/api/goals";
    pub const USER_BY_ID: &str = "/api/users/{id}";
}

pub mod messages {
    pub const LOADING: &str = "Loading goals...";
    pub const LOAD_FAILED: &str = "Failed to load goals.";
    pub const INVALID_USER_ID: &str = "Invalid user ID";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const SERVER_ERROR: &str = "Server error";
}
