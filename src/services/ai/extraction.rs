use serde_json::Value;

use crate::errors::AppError;
use crate::models::fields::{fold_case, is_unspecified, HOUSING_TYPES};
use crate::models::{ExtractedFields, Field, FieldKind, UNSPECIFIED};
use crate::services::ai::{embedded_json, strip_code_fences, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"Bir emlak danışmanının müşteri görüşme notlarını yapılandırıyorsun. Kullanıcının gönderdiği metni oku ve YALNIZCA aşağıdaki anahtarları içeren tek bir JSON nesnesi döndür. Açıklama veya Markdown ekleme.

Metinde bilgisi olmayan her alana "Belirtilmedi" yaz.

Kurallar:
- "Kaynak": sahibinden, reklam, branda, fsbo, etki çevresi, web sitesi, sosyal medya, google işletme, direkt temas gibi müşteri kaynağı.
- "Telefon": yalnızca rakamlar, örn. "5414746388".
- "Butce": aralık verilirse üst sınır, yalnızca sayı (örn. 5000000).
- "Oda_Sayisi": "2+1" biçiminde. "MetreKare", "Bina_Yasi": yalnızca sayı. "Kat": sayı veya standart ifade.
- "Balkon", "Asansor", "Havuz", "Otopark", "Manzara": yalnızca "Var" veya "Yok".
- "Konum": ilçe adları, "Mahalle": mahalle adları; birden fazlaysa virgülle ayır.
- "Konut_Tipi": yalnızca "Daire", "Rezidans", "Müstakil Ev" veya "Yazlık".
- "Aksiyonlar": yapılacak iş. "Hatırlatma_Tarihi_Metni": metindeki zaman ifadesi olduğu gibi ("yarın", "2 hafta sonra", "haftaya cuma"). "Hatırlatma_Saati_Metni": saat ifadesi "SS:DD" biçiminde.

Anahtarlar:
{"Kaynak", "Müşteri_Adı", "Telefon", "Oturum_mu_Yatirim_mi", "Taraf", "Butce", "Oda_Sayisi", "MetreKare", "Bina_Yasi", "Kat", "Balkon", "Asansor", "Konum", "Mahalle", "Havuz", "Otopark", "Manzara", "Notlar", "Konut_Tipi", "Aksiyonlar", "Hatırlatma_Tarihi_Metni", "Hatırlatma_Saati_Metni"}
"#;

pub async fn extract_fields(
    llm: &dyn LlmProvider,
    transcript: &str,
) -> Result<ExtractedFields, AppError> {
    let response = llm
        .chat(SYSTEM_PROMPT, &[Message::user(transcript)])
        .await
        .map_err(|e| AppError::Llm(format!("{e:#}")))?;

    validate(&response)
}

/// Parses the model's reply into a complete field set. Missing keys become
/// the sentinel; constrained fields are canonicalized or rejected.
pub fn validate(raw: &str) -> Result<ExtractedFields, AppError> {
    let object = parse_object(raw)?;

    let mut fields = ExtractedFields::new();
    for field in Field::ALL {
        let value = lookup(&object, field).map(cell_text).unwrap_or_default();
        fields.set(field, check_value(field, &value)?);
    }
    Ok(fields)
}

fn parse_object(raw: &str) -> Result<serde_json::Map<String, Value>, AppError> {
    let cleaned = strip_code_fences(raw);

    let parsed = serde_json::from_str::<Value>(cleaned).or_else(|first_err| {
        embedded_json(cleaned, '{', '}')
            .and_then(|json| serde_json::from_str::<Value>(json).ok())
            .ok_or(first_err)
    });

    match parsed {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::MalformedModelOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AppError::MalformedModelOutput(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Exact key first, then a match ignoring case and Turkish diacritics
/// ("Musteri_Adi" for "Müşteri_Adı").
fn lookup<'a>(object: &'a serde_json::Map<String, Value>, field: Field) -> Option<&'a Value> {
    object.get(field.key()).or_else(|| {
        let wanted = ascii_fold(field.key());
        object
            .iter()
            .find(|(k, _)| ascii_fold(k) == wanted)
            .map(|(_, v)| v)
    })
}

fn ascii_fold(s: &str) -> String {
    fold_case(s)
        .chars()
        .map(|c| match c {
            'ç' => 'c',
            'ğ' => 'g',
            'ı' => 'i',
            'ö' => 'o',
            'ş' => 's',
            'ü' => 'u',
            other => other,
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn check_value(field: Field, value: &str) -> Result<String, AppError> {
    if is_unspecified(value) {
        return Ok(UNSPECIFIED.to_string());
    }

    let canonical = match field.kind() {
        FieldKind::Text => Some(value.to_string()),
        FieldKind::Presence => match fold_case(value).as_str() {
            "var" | "true" => Some("Var".to_string()),
            "yok" | "false" => Some("Yok".to_string()),
            _ => None,
        },
        FieldKind::HousingType => HOUSING_TYPES
            .iter()
            .find(|t| fold_case(t) == fold_case(value))
            .map(|t| t.to_string()),
        FieldKind::Number => numeric_value(value),
    };

    canonical.ok_or_else(|| AppError::SchemaViolation {
        field: field.key().to_string(),
        value: value.to_string(),
    })
}

const AMOUNT_SCALES: &[(&str, f64)] = &[("milyon", 1_000_000.0), ("bin", 1_000.0)];

/// Plain numbers are kept as written ("8000000", "8.000.000", "120,5").
/// Amounts spoken with a scale word ("5 milyon", "4,5 milyon TL",
/// "750 bin") are expanded to digits.
fn numeric_value(value: &str) -> Option<String> {
    if is_numeric(value) {
        return Some(value.to_string());
    }

    let folded = fold_case(value);
    let mut words: Vec<&str> = folded.split_whitespace().collect();
    if words.last().is_some_and(|w| *w == "tl") {
        words.pop();
    }
    let (scale_word, number_words) = words.split_last()?;
    let scale = AMOUNT_SCALES
        .iter()
        .find(|(name, _)| name == scale_word)
        .map(|(_, scale)| *scale)?;

    let number = number_words.join("");
    if !is_numeric(&number) {
        return None;
    }
    let amount: f64 = number.replace(',', ".").parse().ok()?;
    Some(format!("{:.0}", amount * scale))
}

/// Digits with optional thousands/decimal separators.
fn is_numeric(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "Kaynak": "Sahibinden", "Müşteri_Adı": "Sercan Bey", "Telefon": "5414746388",
      "Oturum_mu_Yatirim_mi": "Oturum Amaçlı", "Taraf": "Alıcı", "Butce": 8000000,
      "Oda_Sayisi": "2+1", "MetreKare": "Belirtilmedi", "Bina_Yasi": 20, "Kat": "Belirtilmedi",
      "Balkon": "Var", "Asansor": "yok", "Konum": "Konak", "Mahalle": "Göztepe,Alsancak",
      "Havuz": "Yok", "Otopark": "Var", "Manzara": "Var", "Notlar": "Deniz görsün istiyor.",
      "Konut_Tipi": "daire", "Aksiyonlar": "Sercan Bey'i ara",
      "Hatırlatma_Tarihi_Metni": "yarın", "Hatırlatma_Saati_Metni": "17:00"
    }"#;

    #[test]
    fn test_validate_full_object() {
        let fields = validate(SAMPLE).unwrap();
        assert_eq!(fields.get(Field::CustomerName), "Sercan Bey");
        assert_eq!(fields.get(Field::Budget), "8000000");
        assert_eq!(fields.get(Field::BuildingAge), "20");
        assert_eq!(fields.get(Field::Elevator), "Yok");
        assert_eq!(fields.get(Field::HousingType), "Daire");
        assert_eq!(fields.get(Field::ReminderDateText), "yarın");
    }

    #[test]
    fn test_missing_keys_default_to_sentinel() {
        let fields = validate(r#"{"Telefon": "555", "Notlar": null}"#).unwrap();
        assert_eq!(fields.get(Field::Phone), "555");
        for field in Field::ALL.into_iter().filter(|f| *f != Field::Phone) {
            assert_eq!(fields.get(field), UNSPECIFIED, "{}", field.key());
        }
    }

    #[test]
    fn test_code_fenced_and_embedded_json() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        assert!(validate(&fenced).is_ok());

        let chatty = "Tabii, işte JSON: {\"Telefon\": \"555\"} Başka bir şey?";
        assert_eq!(validate(chatty).unwrap().get(Field::Phone), "555");
    }

    #[test]
    fn test_ascii_keys_are_accepted() {
        let fields = validate(r#"{"Musteri_Adi": "Ayşe Hanım", "Hatirlatma_Saati_Metni": "09:30"}"#).unwrap();
        assert_eq!(fields.get(Field::CustomerName), "Ayşe Hanım");
        assert_eq!(fields.get(Field::ReminderTimeText), "09:30");
    }

    #[test]
    fn test_malformed_output() {
        let err = validate("Üzgünüm, bu metni anlayamadım.").unwrap_err();
        assert!(matches!(err, AppError::MalformedModelOutput(_)));

        let err = validate("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AppError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_presence_field_violation() {
        let err = validate(r#"{"Balkon": "belki"}"#).unwrap_err();
        match err {
            AppError::SchemaViolation { field, value } => {
                assert_eq!(field, "Balkon");
                assert_eq!(value, "belki");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_spoken_amounts_are_expanded() {
        let fields = validate(r#"{"Butce": "5 milyon", "MetreKare": "120"}"#).unwrap();
        assert_eq!(fields.get(Field::Budget), "5000000");
        assert_eq!(fields.get(Field::Area), "120");

        assert_eq!(validate(r#"{"Butce": "4,5 milyon TL"}"#).unwrap().get(Field::Budget), "4500000");
        assert_eq!(validate(r#"{"Butce": "750 bin"}"#).unwrap().get(Field::Budget), "750000");
        assert!(matches!(
            validate(r#"{"Butce": "birkaç milyon"}"#).unwrap_err(),
            AppError::SchemaViolation { .. }
        ));
    }

    #[test]
    fn test_housing_type_and_number_violations() {
        assert!(matches!(
            validate(r#"{"Konut_Tipi": "Villa"}"#).unwrap_err(),
            AppError::SchemaViolation { .. }
        ));
        assert!(matches!(
            validate(r#"{"Butce": "dört milyon"}"#).unwrap_err(),
            AppError::SchemaViolation { .. }
        ));
        assert_eq!(
            validate(r#"{"Butce": "8.000.000", "Konut_Tipi": "MÜSTAKİL EV"}"#)
                .unwrap()
                .get(Field::HousingType),
            "Müstakil Ev"
        );
    }
}
