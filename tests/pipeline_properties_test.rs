//! Properties of the redaction pipeline: scenarios, idempotence and
//! back-to-front substitution

use feedback_redactor::anonymization::{
    apply_actions, Action, AnonymizationEngine, EntityType, PiiMatch, PLACEHOLDER_TOKEN,
};
use feedback_redactor::domain::{FeedbackField, PolicyContext};
use regex::Regex;
use test_case::test_case;

fn engine() -> AnonymizationEngine {
    AnonymizationEngine::with_defaults().expect("default engine")
}

async fn redact(engine: &AnonymizationEngine, text: &str, context: PolicyContext) -> String {
    engine
        .anonymize(&FeedbackField::new("field", text, context))
        .await
        .expect("anonymize")
        .text
}

#[tokio::test]
async fn test_verbatim_scenario() {
    let engine = engine();
    let out = redact(
        &engine,
        "Contact me at jane@example.com or see https://docs.example.com",
        PolicyContext::verbatim(),
    )
    .await;

    assert!(out.contains("https://docs.example.com"));
    assert!(!out.contains("jane@example.com"));
    assert_eq!(out, "Contact me at <REDACTED> or see https://docs.example.com");
}

#[tokio::test]
async fn test_plain_ssn_scenario() {
    let engine = engine();
    let out = redact(&engine, "My SSN is 123-45-6789", PolicyContext::plain()).await;

    assert_eq!(out, format!("My SSN is {PLACEHOLDER_TOKEN}"));
    let ssn = Regex::new(r"\d{3}-\d{2}-\d{4}").unwrap();
    assert!(!ssn.is_match(&out));
}

#[test_case("jane@example.com" ; "bare")]
#[test_case("Reach me: first.last+tag@mail.example.org today" ; "with tag")]
#[test_case("a@b.io, c@d.io" ; "two addresses")]
#[test_case("Écrivez à jose@example.fr, merci" ; "non ascii context")]
#[tokio::test]
async fn test_plain_email_never_survives(text: &str) {
    let engine = engine();
    let out = redact(&engine, text, PolicyContext::plain()).await;

    let email = Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap();
    for m in email.find_iter(text) {
        assert!(!out.contains(m.as_str()), "{} leaked in {out}", m.as_str());
    }
    assert!(out.contains(PLACEHOLDER_TOKEN));
}

#[test_case("see https://docs.example.com/a?b=c" ; "query string")]
#[test_case("links: http://x.org and https://y.org/path." ; "two links")]
#[test_case("(https://example.com/docs)" ; "parenthesised")]
#[tokio::test]
async fn test_verbatim_url_preserved(text: &str) {
    let engine = engine();
    let out = redact(&engine, text, PolicyContext::verbatim()).await;
    assert_eq!(out, text);
}

#[test_case("Contact me at jane@example.com or see https://docs.example.com", PolicyContext::verbatim() ; "verbatim")]
#[test_case("Call Dr. Smith on 555-123-4567 from 10.20.30.40", PolicyContext::plain() ; "plain")]
#[test_case("card 4111 1111 1111 1111, ssn 123-45-6789", PolicyContext::plain() ; "card and ssn")]
#[tokio::test]
async fn test_idempotent(text: &str, context: PolicyContext) {
    let engine = engine();
    let once = redact(&engine, text, context.clone()).await;
    let twice = redact(&engine, &once, context.clone()).await;
    assert_eq!(once, twice);

    let rescan = engine
        .scan(&FeedbackField::new("field", once, context))
        .await
        .unwrap();
    assert_eq!(rescan.redacting_count(), 0);
}

#[test]
fn test_back_to_front_is_order_independent() {
    let text = "ssn 123-45-6789 mail a@b.io";
    let planned = vec![
        (
            PiiMatch::new(4, 15, EntityType::Ssn, 0.9),
            Action::replace("[SSN]"),
        ),
        (
            PiiMatch::new(21, 27, EntityType::Email, 0.95),
            Action::replace("[EMAIL-ADDRESS]"),
        ),
    ];
    let mut reversed = planned.clone();
    reversed.reverse();

    let expected = "ssn [SSN] mail [EMAIL-ADDRESS]";
    assert_eq!(apply_actions(text, &planned), expected);
    assert_eq!(apply_actions(text, &reversed), expected);
}

#[test]
fn test_front_to_back_shifts_offsets() {
    // Replacing the first span with a shorter token moves the second one left,
    // so its original offsets now point past the end of the text
    let text = "ssn 123-45-6789 mail a@b.io";
    let mut naive = text.to_string();
    naive.replace_range(4..15, "[SSN]");
    assert!(naive.len() < 27);

    let end = 27.min(naive.len());
    naive.replace_range(21..end, "[EMAIL-ADDRESS]");

    assert_eq!(naive, "ssn [SSN] mail a@b.io[EMAIL-ADDRESS]");
    assert!(naive.contains("a@b.io"));
}

#[tokio::test]
async fn test_mask_keeps_character_count() {
    use feedback_redactor::anonymization::RedactionPolicy;
    use std::collections::BTreeMap;

    let mut policies = BTreeMap::new();
    policies.insert(
        "masked".to_string(),
        RedactionPolicy::new(Action::mask('#')),
    );
    let engine = AnonymizationEngine::initialize(
        &Default::default(),
        &policies,
        &Default::default(),
    )
    .unwrap();

    let out = redact(&engine, "ssn 123-45-6789", PolicyContext::new("masked")).await;
    assert_eq!(out, format!("ssn {}", "#".repeat("123-45-6789".len())));
}

#[test_case(
    "Call me on 555-123-4567, profile https://crm.example.com/u/555-123-4567",
    "555-123-4567" ; "phone inside kept url"
)]
#[test_case(
    "SSN 123-45-6789, see https://hr.example.com/records?ssn=123-45-6789",
    "123-45-6789" ; "ssn in query string"
)]
#[tokio::test]
async fn test_redacted_value_not_reexposed_by_kept_url(text: &str, value: &str) {
    let engine = engine();
    let out = redact(&engine, text, PolicyContext::verbatim()).await;

    assert!(!out.contains(value), "{value} leaked in {out}");
    assert!(out.contains("https://"));

    // The rewritten URL re-scans clean
    let again = redact(&engine, &out, PolicyContext::verbatim()).await;
    assert_eq!(again, out);
}

#[tokio::test]
async fn test_masked_value_inside_kept_url_is_masked_too() {
    use feedback_redactor::anonymization::RedactionPolicy;
    use std::collections::BTreeMap;

    let mut policies = BTreeMap::new();
    policies.insert(
        "links-masked".to_string(),
        RedactionPolicy::new(Action::mask('*')).with_action(EntityType::Url, Action::Keep),
    );
    let engine =
        AnonymizationEngine::initialize(&Default::default(), &policies, &Default::default())
            .unwrap();

    let out = redact(
        &engine,
        "call 555-123-4567 or https://x.org/555-123-4567",
        PolicyContext::new("links-masked"),
    )
    .await;
    assert_eq!(out, "call ************ or https://x.org/************");
}
