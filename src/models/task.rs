use serde::{Deserialize, Serialize};

// Declaration order is sort order: most urgent first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    #[serde(rename = "Yüksek", alias = "High", alias = "yüksek", alias = "Yuksek")]
    High,
    #[serde(rename = "Orta", alias = "Medium", alias = "orta")]
    Medium,
    #[serde(rename = "Düşük", alias = "Low", alias = "düşük", alias = "Dusuk")]
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTask {
    pub task: String,
    pub priority: Priority,
    pub customer_name: String,
}

impl DailyTask {
    pub fn nothing_scheduled() -> Self {
        Self {
            task: "Bugün için planlanmış görev yok".to_string(),
            priority: Priority::Low,
            customer_name: "-".to_string(),
        }
    }
}
