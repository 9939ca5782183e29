/// Keeps only the ASCII digits of a phone string. Both sides of any phone
/// comparison must go through this.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_and_bare_numbers_match() {
        assert_eq!(normalize("(541) 474-6388"), "5414746388");
        assert_eq!(normalize("5414746388"), "5414746388");
        assert_eq!(normalize("(541) 474-6388"), normalize("541 474 63 88"));
    }

    #[test]
    fn test_non_digit_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("Belirtilmedi"), "");
        assert_eq!(normalize("+90 (532) ٣٤"), "90532");
    }
}
