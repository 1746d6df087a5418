use std::cmp::Ordering;

pub const DEFAULT_CATCH_ALL_PREFIX: &str = "Escritos";

/// Presentation order for document identifiers.
///
/// Catch-all documents go last; the rest are ordered by the first number
/// embedded in their name, then by the name itself.
#[derive(Debug, Clone)]
pub struct OrderingPolicy {
    catch_all_prefix: String,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CATCH_ALL_PREFIX)
    }
}

impl OrderingPolicy {
    pub fn new(catch_all_prefix: impl Into<String>) -> Self {
        Self {
            catch_all_prefix: catch_all_prefix.into().to_lowercase(),
        }
    }

    pub fn catch_all_prefix(&self) -> &str {
        &self.catch_all_prefix
    }

    pub fn is_catch_all(&self, id: &str) -> bool {
        !self.catch_all_prefix.is_empty() && id.to_lowercase().starts_with(&self.catch_all_prefix)
    }

    /// First run of digits with leading zeros removed.
    pub fn numeric_key<'a>(&self, id: &'a str) -> Option<&'a str> {
        let start = id.find(|c: char| c.is_ascii_digit())?;
        let rest = &id[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());

        let digits = rest[..end].trim_start_matches('0');
        if digits.is_empty() {
            Some("0")
        } else {
            Some(digits)
        }
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.is_catch_all(left)
            .cmp(&self.is_catch_all(right))
            .then_with(|| compare_numeric_keys(self.numeric_key(left), self.numeric_key(right)))
            .then_with(|| left.cmp(right))
    }

    pub fn sort<S: AsRef<str>>(&self, ids: &mut [S]) {
        ids.sort_by(|left, right| self.compare(left.as_ref(), right.as_ref()));
    }
}

fn compare_numeric_keys(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.len().cmp(&right.len()).then_with(|| left.cmp(right)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(ids: &[&str]) -> Vec<String> {
        let mut owned = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
        OrderingPolicy::default().sort(&mut owned);
        owned
    }

    #[test]
    fn numeric_ascending_with_catch_all_last() {
        assert_eq!(sorted(&["S2", "S10", "S1", "Escritos"]), vec!["S1", "S2", "S10", "Escritos"]);
    }

    #[test]
    fn catch_all_prefix_is_case_insensitive() {
        assert_eq!(
            sorted(&["escritos_3.pdf", "Notes.docx", "S4.pdf"]),
            vec!["S4.pdf", "Notes.docx", "escritos_3.pdf"]
        );
    }

    #[test]
    fn names_without_numbers_follow_numbered_names() {
        assert_eq!(
            sorted(&["beta.pdf", "alpha.pdf", "S7.pdf"]),
            vec!["S7.pdf", "alpha.pdf", "beta.pdf"]
        );
    }

    #[test]
    fn ties_fall_back_to_case_sensitive_name_order() {
        assert_eq!(
            sorted(&["S1.pdf", "S01.docx", "s1.pdf"]),
            vec!["S01.docx", "S1.pdf", "s1.pdf"]
        );
    }

    #[test]
    fn long_digit_runs_do_not_overflow() {
        assert_eq!(
            sorted(&["S123456789012345678901234567890", "S99"]),
            vec!["S99", "S123456789012345678901234567890"]
        );
    }

    #[test]
    fn only_first_number_counts() {
        let policy = OrderingPolicy::default();
        assert_eq!(policy.numeric_key("S3_v20.pdf"), Some("3"));
        assert_eq!(policy.numeric_key("S000.pdf"), Some("0"));
        assert_eq!(policy.numeric_key("none.pdf"), None);
    }

    #[test]
    fn empty_prefix_disables_catch_all() {
        let policy = OrderingPolicy::new("");
        assert!(!policy.is_catch_all("Escritos.pdf"));
    }
}
