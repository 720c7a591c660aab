//! Tests for the PII engine

use super::*;

fn redactor() -> PiiRedactor {
    PiiRedactor::default()
}

fn is_token(s: &str, kind: PiiType) -> bool {
    let prefix = format!("[PII_{}_", kind.as_str());
    s.starts_with(&prefix)
        && s.ends_with(']')
        && s.len() == prefix.len() + 9
        && s[prefix.len()..s.len() - 1]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
}

#[test]
fn test_empty_input() {
    let (text, mapping) = redactor().redact("");
    assert_eq!(text, "");
    assert!(mapping.is_empty());
}

#[test]
fn test_each_pattern_detected() {
    let input = "ssn 123-45-6789, card 4111 1111 1111 1111, mail jane.doe@example.com, call +15551234567";
    let (redacted, mapping) = redactor().redact(input);

    assert_eq!(mapping.len(), 4);
    assert_eq!(
        mapping.types(),
        vec![PiiType::Ssn, PiiType::CreditCard, PiiType::Email, PiiType::Phone]
    );
    for entry in mapping.entries() {
        assert!(is_token(&entry.token, entry.pii_type), "{}", entry.token);
        assert!(redacted.contains(&entry.token));
        assert!(!redacted.contains(&entry.original));
    }
    assert_eq!(mapping.entries()[1].original, "4111 1111 1111 1111");
    assert_eq!(mapping.entries()[3].original, "+15551234567");
}

#[test]
fn test_restore_inverts_redact() {
    let samples = [
        "no pii here at all",
        "My SSN is 123-45-6789 and my email is john@example.com.",
        "card 4111-1111-1111-1111 twice 4111-1111-1111-1111",
        "phone 5551234567 then 123-45-6789 and 5551234567",
        "unicode ✓ jane@mail.org ✓ 987-65-4321",
    ];
    for sample in samples {
        let (redacted, mapping) = redactor().redact(sample);
        assert_eq!(restore(&redacted, &mapping), sample);

        let all = PiiRedactor::new(RedactionMode::AllOccurrences);
        let (redacted, mapping) = all.redact(sample);
        assert_eq!(restore(&redacted, &mapping), sample);
    }
}

#[test]
fn test_redaction_spans_are_deterministic() {
    let input = "a@b.io 123-45-6789 x 4111111111111111 y 15551234567";
    let (_, first) = redactor().redact(input);
    let (_, second) = redactor().redact(input);

    let originals = |m: &PiiMapping| {
        m.entries()
            .iter()
            .map(|e| (e.pii_type, e.original.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(originals(&first), originals(&second));
}

#[test]
fn test_first_occurrence_only_by_default() {
    let input = "123-45-6789 and again 123-45-6789";
    let (redacted, mapping) = redactor().redact(input);

    assert_eq!(mapping.len(), 1);
    let token = &mapping.entries()[0].token;
    assert_eq!(redacted, format!("{token} and again 123-45-6789"));
}

#[test]
fn test_all_occurrences_mode_reuses_token() {
    let input = "123-45-6789 and again 123-45-6789";
    let (redacted, mapping) = PiiRedactor::new(RedactionMode::AllOccurrences).redact(input);

    assert_eq!(mapping.len(), 1);
    let token = &mapping.entries()[0].token;
    assert_eq!(redacted, format!("{token} and again {token}"));
}

#[test]
fn test_boundaries_reject_embedded_numbers() {
    // longer dashed runs are not SSNs
    let (_, mapping) = redactor().redact("order 1123-45-67890 shipped");
    assert!(mapping.is_empty());

    // 17 digits is not a card and too long for a phone
    let (_, mapping) = redactor().redact("id 41111111111111112");
    assert!(mapping.is_empty());

    // 9 digits is too short for a phone
    let (_, mapping) = redactor().redact("ref 555123456");
    assert!(mapping.is_empty());
}

#[test]
fn test_sixteen_digits_is_card_not_phone() {
    let (redacted, mapping) = redactor().redact("pay with 4111111111111111 now");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.entries()[0].pii_type, PiiType::CreditCard);
    assert!(redacted.starts_with("pay with [PII_CREDIT_CARD_"));
}

#[test]
fn test_email_at_sentence_end() {
    let (redacted, mapping) = redactor().redact("Write to bob@corp.example.com.");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.entries()[0].original, "bob@corp.example.com");
    assert!(redacted.ends_with("].") );
}

#[test]
fn test_redact_into_shares_tokens_across_texts() {
    let engine = redactor();
    let mut mapping = PiiMapping::default();
    let first = engine.redact_into("mine is jane@example.com", &mut mapping);
    let second = engine.redact_into("again: jane@example.com", &mut mapping);

    assert_eq!(mapping.len(), 1);
    let token = &mapping.entries()[0].token;
    assert!(first.ends_with(token.as_str()));
    assert!(second.ends_with(token.as_str()));
}

#[test]
fn test_restore_is_idempotent() {
    let (redacted, mapping) = redactor().redact("mail a@b.co");
    let once = restore(&redacted, &mapping);
    assert_eq!(restore(&once, &mapping), once);
    assert_eq!(restore("nothing to do", &mapping), "nothing to do");
}

#[test]
fn test_mapping_serializes() {
    let (_, mapping) = redactor().redact("123-45-6789");
    let json = serde_json::to_value(&mapping).unwrap();
    assert_eq!(json["entries"][0]["pii_type"], "SSN");
    let back: PiiMapping = serde_json::from_value(json).unwrap();
    assert_eq!(back, mapping);
}
