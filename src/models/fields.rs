use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Marker the extraction step writes for "nothing said about this".
pub const UNSPECIFIED: &str = "Belirtilmedi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Source,
    CustomerName,
    Phone,
    Purpose,
    Side,
    Budget,
    RoomCount,
    Area,
    BuildingAge,
    Floor,
    Balcony,
    Elevator,
    Location,
    Neighborhood,
    Pool,
    Parking,
    View,
    Notes,
    HousingType,
    Actions,
    ReminderDateText,
    ReminderTimeText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `Var` / `Yok`
    Presence,
    Number,
    HousingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// New values are added to the history as timestamped entries.
    Append,
    /// Last specified value wins.
    Overwrite,
}

pub const HOUSING_TYPES: [&str; 4] = ["Daire", "Rezidans", "Müstakil Ev", "Yazlık"];

impl Field {
    pub const ALL: [Field; 22] = [
        Field::Source,
        Field::CustomerName,
        Field::Phone,
        Field::Purpose,
        Field::Side,
        Field::Budget,
        Field::RoomCount,
        Field::Area,
        Field::BuildingAge,
        Field::Floor,
        Field::Balcony,
        Field::Elevator,
        Field::Location,
        Field::Neighborhood,
        Field::Pool,
        Field::Parking,
        Field::View,
        Field::Notes,
        Field::HousingType,
        Field::Actions,
        Field::ReminderDateText,
        Field::ReminderTimeText,
    ];

    /// Column / JSON key used by the model contract and the sheet header.
    pub fn key(self) -> &'static str {
        match self {
            Field::Source => "Kaynak",
            Field::CustomerName => "Müşteri_Adı",
            Field::Phone => "Telefon",
            Field::Purpose => "Oturum_mu_Yatirim_mi",
            Field::Side => "Taraf",
            Field::Budget => "Butce",
            Field::RoomCount => "Oda_Sayisi",
            Field::Area => "MetreKare",
            Field::BuildingAge => "Bina_Yasi",
            Field::Floor => "Kat",
            Field::Balcony => "Balkon",
            Field::Elevator => "Asansor",
            Field::Location => "Konum",
            Field::Neighborhood => "Mahalle",
            Field::Pool => "Havuz",
            Field::Parking => "Otopark",
            Field::View => "Manzara",
            Field::Notes => "Notlar",
            Field::HousingType => "Konut_Tipi",
            Field::Actions => "Aksiyonlar",
            Field::ReminderDateText => "Hatırlatma_Tarihi_Metni",
            Field::ReminderTimeText => "Hatırlatma_Saati_Metni",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Balcony | Field::Elevator | Field::Pool | Field::Parking | Field::View => {
                FieldKind::Presence
            }
            Field::Budget | Field::Area | Field::BuildingAge => FieldKind::Number,
            Field::HousingType => FieldKind::HousingType,
            _ => FieldKind::Text,
        }
    }

    pub fn merge_policy(self) -> MergePolicy {
        match self {
            Field::Notes | Field::Actions => MergePolicy::Append,
            _ => MergePolicy::Overwrite,
        }
    }
}

/// Lowercases with Turkish dotted/dotless i rules so `İ` and `I` fold to
/// `i` and `ı` instead of the generic Unicode mappings.
pub fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'İ' => 'i',
            'I' => 'ı',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// True for empty values and any casing of the sentinel.
pub fn is_unspecified(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case(UNSPECIFIED)
        || fold_case(trimmed) == "belirtilmedi"
}

/// The flat field set produced by one extraction. Every field reads as
/// [`UNSPECIFIED`] unless a value was set for it.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    values: BTreeMap<Field, String>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .get(&field)
            .map(String::as_str)
            .unwrap_or(UNSPECIFIED)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

// An unset field and an explicit sentinel are the same value.
impl PartialEq for ExtractedFields {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for ExtractedFields {}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let keys: std::collections::HashSet<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys.len(), Field::ALL.len());
    }

    #[test]
    fn test_missing_fields_read_as_unspecified() {
        let fields = ExtractedFields::new().with(Field::Phone, "5414746388");
        assert_eq!(fields.get(Field::Phone), "5414746388");
        assert_eq!(fields.get(Field::Budget), UNSPECIFIED);
    }

    #[test]
    fn test_is_unspecified_handles_turkish_casing() {
        assert!(is_unspecified("Belirtilmedi"));
        assert!(is_unspecified("BELİRTİLMEDİ"));
        assert!(is_unspecified("BELIRTILMEDI"));
        assert!(is_unspecified("  "));
        assert!(!is_unspecified("Var"));
    }

    #[test]
    fn test_serializes_every_key() {
        let json = serde_json::to_value(ExtractedFields::new()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), Field::ALL.len());
        assert_eq!(obj["Konut_Tipi"], UNSPECIFIED);
    }
}
