use std::sync::{Arc, Barrier};

use vibe_protocol::{Clock, FixedClock, QuotaEntry, DAILY_LIMIT};
use vibe_state::QuotaLedger;

fn ledger_on(day: &str) -> (QuotaLedger, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at(day).unwrap());
    (QuotaLedger::in_memory(clock.clone()), clock)
}

#[test]
fn test_limit_enforced_from_eleventh_call() {
    let (ledger, _) = ledger_on("2024-06-10");
    for i in 0..DAILY_LIMIT {
        assert!(ledger.check_and_consume("abc").unwrap(), "call {} should be admitted", i + 1);
    }
    assert_eq!(ledger.remaining("abc").unwrap(), 0);
    assert!(!ledger.check_and_consume("abc").unwrap(), "11th call must be refused");
    assert!(!ledger.check_and_consume("abc").unwrap(), "refusal persists for the day");
}

#[test]
fn test_next_day_resets_and_counts_first_call() {
    let (ledger, clock) = ledger_on("2024-06-10");
    for _ in 0..=DAILY_LIMIT {
        ledger.check_and_consume("abc").unwrap();
    }
    clock.advance_days(1);
    assert!(ledger.check_and_consume("abc").unwrap());
    assert_eq!(ledger.remaining("abc").unwrap(), DAILY_LIMIT - 1);
}

#[test]
fn test_day_rollover_resets_exactly_once() {
    let (ledger, clock) = ledger_on("2024-06-10");
    for _ in 0..DAILY_LIMIT {
        ledger.check_and_consume("abc").unwrap();
    }
    clock.advance_days(1);
    // remaining() performs the rollover; later calls must not reset again.
    assert_eq!(ledger.remaining("abc").unwrap(), DAILY_LIMIT);
    assert!(ledger.check_and_consume("abc").unwrap());
    assert_eq!(ledger.remaining("abc").unwrap(), DAILY_LIMIT - 1);
    assert_eq!(ledger.entry("abc"), Some(QuotaEntry::new(clock.today(), 1)));
}

#[test]
fn test_identifiers_are_independent() {
    let (ledger, _) = ledger_on("2024-06-10");
    for _ in 0..DAILY_LIMIT {
        ledger.check_and_consume("a").unwrap();
    }
    assert!(!ledger.check_and_consume("a").unwrap());
    assert!(ledger.check_and_consume("b").unwrap());
    assert_eq!(ledger.remaining("b").unwrap(), DAILY_LIMIT - 1);
}

#[test]
fn test_reset_all_clears_every_identifier() {
    let (ledger, _) = ledger_on("2024-06-10");
    for _ in 0..DAILY_LIMIT {
        ledger.check_and_consume("a").unwrap();
    }
    ledger.check_and_consume("b").unwrap();
    ledger.reset_all().unwrap();
    assert_eq!(ledger.entry("a"), None);
    assert_eq!(ledger.entry("b"), None);
    assert!(ledger.check_and_consume("a").unwrap());
}

#[test]
fn test_concurrent_consumers_at_last_slot_admit_exactly_one() {
    let (ledger, _) = ledger_on("2024-06-10");
    for _ in 0..DAILY_LIMIT - 1 {
        ledger.check_and_consume("hot").unwrap();
    }
    let ledger = Arc::new(ledger);
    let n = 16;
    let barrier = Arc::new(Barrier::new(n));
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let ledger = ledger.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                ledger.check_and_consume("hot").unwrap()
            })
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|allowed| *allowed)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(ledger.entry("hot").unwrap().count, DAILY_LIMIT);
}

#[test]
fn test_concurrent_consumers_on_file_backend_never_overrun() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(QuotaLedger::open(dir.path(), 5));
    let handles: Vec<_> = (0..12)
        .map(|_| {
            let ledger = ledger.clone();
            std::thread::spawn(move || ledger.check_and_consume("shared").unwrap())
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|allowed| *allowed)
        .count();
    assert_eq!(admitted, 5);
}
