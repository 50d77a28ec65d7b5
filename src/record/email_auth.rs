//! SPF, DMARC and DKIM detection over raw TXT data.
//!
//! Detection is deliberately shallow: prefixes, substrings and the presence of
//! a `p=` tag. Records are never parsed into full mechanism or tag grammars.

const SPF_VERSION: &str = "v=spf1";
const SPF_MECHANISMS: [&str; 3] = ["include:", "ip4:", "ip6:"];
const SPF_TERMINALS: [&str; 4] = ["-all", "~all", "+all", "?all"];
const SPF_RESTRICTIVE_TERMINALS: [&str; 2] = ["-all", "~all"];
const DMARC_VERSION: &str = "v=dmarc1";
const DKIM_VERSION: &str = "v=dkim1";

/// Concatenates every SPF-looking TXT fragment, in order, without separator.
///
/// A fragment counts when it (case-insensitively) starts with `v=spf1`,
/// contains an `include:`/`ip4:`/`ip6:` mechanism, or ends with an `all`
/// terminal. Fragments are concatenated as received, so a record split across
/// character-strings is reassembled. Returns `None` when nothing matches.
pub fn extract_spf(fragments: &[String]) -> Option<String> {
    let record: String = fragments
        .iter()
        .filter(|fragment| is_spf_fragment(fragment))
        .map(String::as_str)
        .collect();
    if record.is_empty() {
        None
    } else {
        Some(record)
    }
}

fn is_spf_fragment(fragment: &str) -> bool {
    let lower = fragment.to_ascii_lowercase();
    lower.starts_with(SPF_VERSION)
        || SPF_MECHANISMS.iter().any(|m| lower.contains(m))
        || SPF_TERMINALS.iter().any(|t| lower.ends_with(t))
}

/// True when the SPF record ends with a restrictive terminal (`-all` or `~all`).
///
/// The check is on the record as received: trailing whitespace is not ignored.
pub fn spf_is_valid(record: &str) -> bool {
    let lower = record.to_ascii_lowercase();
    SPF_RESTRICTIVE_TERMINALS.iter().any(|t| lower.ends_with(t))
}

/// First TXT record that starts with `v=DMARC1`.
pub fn extract_dmarc(records: &[String]) -> Option<String> {
    records
        .iter()
        .find(|record| starts_with_ignore_case(record.trim_start(), DMARC_VERSION))
        .cloned()
}

/// True when the DMARC record carries a policy (`p=`) tag.
pub fn dmarc_is_valid(record: &str) -> bool {
    has_tag(record, "p")
}

/// Looks for a DKIM key among a selector's TXT records.
///
/// Returns the first record starting with `v=DKIM1` and whether it carries a
/// public key (`p=`) tag, or `None` when no record is DKIM-formatted.
pub fn dkim_record_status(records: &[String]) -> Option<(String, bool)> {
    records
        .iter()
        .find(|record| starts_with_ignore_case(record.trim_start(), DKIM_VERSION))
        .map(|record| (record.clone(), has_tag(record, "p")))
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// True when the `;`-separated tag list contains `name=`.
fn has_tag(record: &str, name: &str) -> bool {
    record.split(';').any(|part| {
        part.split_once('=')
            .is_some_and(|(tag, _)| tag.trim().eq_ignore_ascii_case(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_spf_fragments_concatenate() {
        let fragments = strings(&["v=spf1 include:_spf.example.com ", "-all"]);
        let record = extract_spf(&fragments).unwrap();
        assert_eq!(record, "v=spf1 include:_spf.example.com -all");
        assert!(spf_is_valid(&record));
    }

    #[test]
    fn test_spf_plus_all_is_not_valid() {
        let fragments = strings(&["v=spf1 ip4:192.0.2.0/24 +all"]);
        let record = extract_spf(&fragments).unwrap();
        assert!(!spf_is_valid(&record));
    }

    #[test]
    fn test_spf_softfail_is_valid() {
        assert!(spf_is_valid("v=spf1 mx ~all"));
        assert!(spf_is_valid("v=spf1 mx -ALL"));
        assert!(!spf_is_valid("v=spf1 mx ?all"));
        assert!(!spf_is_valid("v=spf1 mx"));
    }

    #[test]
    fn test_spf_trailing_whitespace_is_not_valid() {
        assert!(!spf_is_valid("v=spf1 mx -all "));
        let record = extract_spf(&strings(&["v=spf1 mx ~all "])).unwrap();
        assert_eq!(record, "v=spf1 mx ~all ");
        assert!(!spf_is_valid(&record));
    }

    #[test]
    fn test_spf_ignores_unrelated_txt() {
        let fragments = strings(&[
            "google-site-verification=abc123",
            "V=SPF1 mx",
            "MS=ms12345",
            " ~all",
        ]);
        assert_eq!(extract_spf(&fragments).unwrap(), "V=SPF1 mx ~all");
    }

    #[test]
    fn test_spf_none_when_absent() {
        assert_eq!(extract_spf(&strings(&["hello world"])), None);
        assert_eq!(extract_spf(&[]), None);
    }

    #[test]
    fn test_dmarc_first_matching_record() {
        let records = strings(&[
            "some-other=1",
            "v=DMARC1; p=reject; rua=mailto:d@example.com",
            "v=DMARC1; p=none",
        ]);
        let record = extract_dmarc(&records).unwrap();
        assert!(record.contains("p=reject"));
        assert!(dmarc_is_valid(&record));
    }

    #[test]
    fn test_dmarc_case_insensitive_prefix() {
        let records = strings(&["V=dmarc1;P=quarantine"]);
        let record = extract_dmarc(&records).unwrap();
        assert!(dmarc_is_valid(&record));
    }

    #[test]
    fn test_dmarc_without_policy_is_invalid() {
        assert!(!dmarc_is_valid("v=DMARC1; rua=mailto:d@example.com"));
        // sp= is not p=
        assert!(!dmarc_is_valid("v=DMARC1; sp=reject"));
    }

    #[test]
    fn test_dkim_record_with_key() {
        let records = strings(&["v=DKIM1; k=rsa; p=MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQC"]);
        let (record, valid) = dkim_record_status(&records).unwrap();
        assert!(record.starts_with("v=DKIM1"));
        assert!(valid);
    }

    #[test]
    fn test_dkim_record_without_key() {
        let records = strings(&["v=DKIM1; k=rsa"]);
        let (_, valid) = dkim_record_status(&records).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_dkim_non_dkim_txt_is_ignored() {
        assert_eq!(dkim_record_status(&strings(&["v=spf1 -all"])), None);
        assert_eq!(dkim_record_status(&[]), None);
    }

    #[test]
    fn test_starts_with_ignore_case_handles_multibyte() {
        assert!(!starts_with_ignore_case("é", "v=dkim1"));
        assert!(!starts_with_ignore_case("v=dkiéééé", "v=dkim1"));
    }
}
