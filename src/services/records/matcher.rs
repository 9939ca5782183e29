use crate::models::fields::{fold_case, is_unspecified};
use crate::models::CustomerRecord;
use crate::services::phone;

/// First record of `owner` whose normalized phone equals the normalized
/// `phone`. Never crosses owners, and an empty phone matches nothing.
pub fn find<'a>(
    records: &'a [CustomerRecord],
    owner: &str,
    phone: &str,
) -> Option<(usize, &'a CustomerRecord)> {
    let wanted = phone::normalize(phone);
    if wanted.is_empty() {
        return None;
    }

    records
        .iter()
        .enumerate()
        .find(|(_, r)| r.owner == owner && phone::normalize(r.phone()) == wanted)
}

/// First record of `owner` whose customer name equals `name`, ignoring case
/// and surrounding whitespace. No substring matching.
pub fn find_by_name<'a>(
    records: &'a [CustomerRecord],
    owner: &str,
    name: &str,
) -> Option<(usize, &'a CustomerRecord)> {
    if is_unspecified(name) {
        return None;
    }
    let wanted = fold_case(name.trim());

    records
        .iter()
        .enumerate()
        .find(|(_, r)| r.owner == owner && fold_case(r.customer_name().trim()) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedFields, Field};
    use chrono::NaiveDateTime;

    fn record(owner: &str, name: &str, phone: &str) -> CustomerRecord {
        let now = NaiveDateTime::parse_from_str("2024-01-10 09:00", "%Y-%m-%d %H:%M").unwrap();
        CustomerRecord::new(
            owner,
            ExtractedFields::new()
                .with(Field::CustomerName, name)
                .with(Field::Phone, phone),
            now,
        )
    }

    #[test]
    fn test_matches_normalized_phone() {
        let records = vec![
            record("a@x.com", "Ali", "5551112222"),
            record("a@x.com", "Sercan Bey", "(541) 474-6388"),
        ];
        let (index, found) = find(&records, "a@x.com", "541 474 63 88").unwrap();
        assert_eq!(index, 1);
        assert_eq!(found.customer_name(), "Sercan Bey");
    }

    #[test]
    fn test_never_matches_other_owner() {
        let records = vec![record("b@x.com", "Ali", "555")];
        assert!(find(&records, "a@x.com", "555").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let records = vec![
            record("b@x.com", "Başka", "555"),
            record("a@x.com", "İlk", "555"),
            record("a@x.com", "İkinci", "555"),
        ];
        let (index, found) = find(&records, "a@x.com", "555").unwrap();
        assert_eq!(index, 1);
        assert_eq!(found.customer_name(), "İlk");
    }

    #[test]
    fn test_empty_phone_never_matches() {
        let records = vec![record("a@x.com", "Ali", "Belirtilmedi")];
        assert!(find(&records, "a@x.com", "Belirtilmedi").is_none());
        assert!(find(&records, "a@x.com", "").is_none());
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let records = vec![
            record("a@x.com", "Ali Yılmaz", "555"),
            record("a@x.com", "Ali", "666"),
        ];
        let (index, _) = find_by_name(&records, "a@x.com", "  ali ").unwrap();
        assert_eq!(index, 1);
        assert!(find_by_name(&records, "a@x.com", "Yılmaz").is_none());
        assert!(find_by_name(&records, "b@x.com", "Ali").is_none());
        assert!(find_by_name(&records, "a@x.com", "Belirtilmedi").is_none());
    }
}
