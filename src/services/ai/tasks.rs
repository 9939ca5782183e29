use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::models::{CustomerRecord, DailyTask, Field};
use crate::services::ai::{embedded_json, strip_code_fences, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"Bir emlak danışmanının günlük iş listesini hazırlıyorsun. Kullanıcı sana hatırlatma zamanı gelmiş veya geçmiş müşteri kayıtlarını JSON olarak gönderecek.

Her kayıt için yapılması gereken işi kısa ve net bir cümleyle yaz ve önceliklendir:
- "Yüksek": hatırlatma zamanı geçmiş veya bütçesi yüksek, sıcak müşteri.
- "Orta": bugün yapılması gereken olağan takip.
- "Düşük": ertelenebilecek işler.

YALNIZCA şu biçimde bir JSON dizisi döndür, başka açıklama ekleme:
[{"task": "...", "priority": "Yüksek|Orta|Düşük", "customer_name": "..."}]
"#;

/// Some models wrap the list in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskReply {
    List(Vec<DailyTask>),
    Wrapped { tasks: Vec<DailyTask> },
}

pub async fn plan_daily_tasks(
    llm: &dyn LlmProvider,
    candidates: &[CustomerRecord],
    now: NaiveDateTime,
) -> Result<Vec<DailyTask>, AppError> {
    if candidates.is_empty() {
        return Ok(vec![DailyTask::nothing_scheduled()]);
    }

    let payload = json!({
        "today": now.format("%Y-%m-%d %H:%M").to_string(),
        "records": candidates.iter().map(candidate_summary).collect::<Vec<_>>(),
    });

    let response = llm
        .chat(SYSTEM_PROMPT, &[Message::user(payload.to_string())])
        .await
        .map_err(|e| AppError::Llm(format!("{e:#}")))?;

    parse_task_reply(&response)
}

fn candidate_summary(record: &CustomerRecord) -> serde_json::Value {
    json!({
        "customer_name": record.customer_name(),
        "phone": record.phone(),
        "reminder_at": record.reminder_text(),
        "actions": record.fields.get(Field::Actions),
        "notes": record.fields.get(Field::Notes),
        "budget": record.fields.get(Field::Budget),
        "location": record.fields.get(Field::Location),
    })
}

/// Parses the model's list and orders it by priority, keeping the model's
/// order within the same priority.
pub fn parse_task_reply(response: &str) -> Result<Vec<DailyTask>, AppError> {
    let cleaned = strip_code_fences(response);

    let reply = serde_json::from_str::<TaskReply>(cleaned).or_else(|first_err| {
        embedded_json(cleaned, '[', ']')
            .and_then(|json| serde_json::from_str::<TaskReply>(json).ok())
            .ok_or(first_err)
    });

    let mut tasks = match reply {
        Ok(TaskReply::List(tasks)) | Ok(TaskReply::Wrapped { tasks }) => tasks,
        Err(e) => return Err(AppError::MalformedModelOutput(e.to_string())),
    };

    if tasks.is_empty() {
        return Ok(vec![DailyTask::nothing_scheduled()]);
    }

    tasks.sort_by_key(|t| t.priority);
    Ok(tasks)
}
