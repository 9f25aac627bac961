use chrono::NaiveDate;
use harvest_core::sanitize_name;
use sha2::{Digest, Sha256};

/// Longest sanitized stem kept verbatim; longer names are cut and suffixed with a hash.
const MAX_STEM_LEN: usize = 120;

/// Deterministic, filesystem-safe stem for a logical name.
///
/// Long names keep their first characters and gain `-{short_hash(name)}` so two
/// long locators sharing a prefix still map to distinct files.
pub fn artifact_stem(logical_name: &str) -> String {
    let sanitized = sanitize_name(logical_name);
    if sanitized.is_empty() {
        return "untitled".to_string();
    }
    if sanitized.len() <= MAX_STEM_LEN {
        return sanitized;
    }
    let hash = short_hash(&sanitized);
    // Sanitized names are ASCII, so byte slicing is safe.
    let keep = MAX_STEM_LEN - hash.len() - 1;
    format!("{}-{hash}", &sanitized[..keep])
}

/// `{stem}_{YYYY-MM-DD}.txt`: same source on the same day always maps to the same file.
pub fn artifact_filename(logical_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.txt", artifact_stem(logical_name), date.format("%Y-%m-%d"))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{artifact_filename, artifact_stem, MAX_STEM_LEN};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn filename_matches_documented_pattern() {
        assert_eq!(
            artifact_filename("https://example.com/a", day()),
            "https___example.com_a_2025-03-07.txt"
        );
    }

    #[test]
    fn empty_name_gets_placeholder_stem() {
        assert_eq!(artifact_filename("", day()), "untitled_2025-03-07.txt");
    }

    #[test]
    fn long_names_are_capped_and_stay_distinct() {
        let base = format!("https://example.com/{}", "x".repeat(200));
        let a = artifact_stem(&format!("{base}/a"));
        let b = artifact_stem(&format!("{base}/b"));
        assert_eq!(a.len(), MAX_STEM_LEN);
        assert_eq!(b.len(), MAX_STEM_LEN);
        assert_ne!(a, b);
        assert_eq!(a, artifact_stem(&format!("{base}/a")));
    }

    #[test]
    fn capped_stem_keeps_prefix_and_short_hash() {
        let long = "a".repeat(MAX_STEM_LEN + 1);
        let stem = artifact_stem(&long);
        let (prefix, hash) = stem.split_at(MAX_STEM_LEN - 9);
        assert_eq!(prefix, "a".repeat(MAX_STEM_LEN - 9));
        assert_eq!(hash.len(), 9);
        assert!(hash.starts_with('-'));
        assert!(hash[1..].chars().all(|c| c.is_ascii_hexdigit()));

        let exact = "b".repeat(MAX_STEM_LEN);
        assert_eq!(artifact_stem(&exact), exact);
    }
}
