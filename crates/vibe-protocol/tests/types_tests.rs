use vibe_protocol::*;

#[test]
fn test_vibe_parse_is_case_insensitive() {
    assert_eq!("Wholesome".parse::<Vibe>().unwrap(), Vibe::Wholesome);
    assert_eq!(" spicy ".parse::<Vibe>().unwrap(), Vibe::Spicy);
    assert_eq!("SAVAGE".parse::<Vibe>().unwrap(), Vibe::Savage);
}

#[test]
fn test_unknown_vibe_rejected() {
    let err = "chaotic".parse::<Vibe>().unwrap_err();
    assert_eq!(err, ProtocolError::UnknownVibe("chaotic".into()));
}

#[test]
fn test_quota_entry_wire_format() {
    let entry = QuotaEntry::new(parse_day("2024-03-09").unwrap(), 4);
    let json = serde_json::to_value(entry).unwrap();
    assert_eq!(json, serde_json::json!({"date": "2024-03-09", "count": 4}));

    let back: QuotaEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_quota_entry_remaining_saturates() {
    let day = parse_day("2024-03-09").unwrap();
    assert_eq!(QuotaEntry::new(day, 3).remaining(DAILY_LIMIT), 7);
    assert_eq!(QuotaEntry::new(day, 15).remaining(DAILY_LIMIT), 0);
}

#[test]
fn test_whoami_hides_identifier_on_the_wire() {
    let who = WhoAmI {
        identifier: "1.2.3.4".into(),
        name: "brave-otter".into(),
        credits_left: 7,
    };
    let json = serde_json::to_value(&who).unwrap();
    assert_eq!(json, serde_json::json!({"name": "brave-otter", "credits_left": 7}));
}
