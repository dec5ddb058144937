use serde::Deserialize;

/// `/_cat/tasks?format=json`.
pub type Tasks = Vec<Task>;

/// The cat API reports every column as a string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Task {
    pub action: String,
    pub task_id: String,
    pub parent_task_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: String,
    pub timestamp: String,
    /// E.g. `1.5s` or `350.2micros`.
    pub running_time: String,
    pub ip: String,
    pub node: String,
}
