//! Integration tests for selector-driven readers over the in-memory queue.

mod common;

use std::time::{Duration, Instant};

use common::{queue_with, RacingQueue, NO_WAIT};
use mq_selector::eval::EvalErrorKind;
use mq_selector::memory::{MemoryTransaction, StoredBody, StoredMessage};
use mq_selector::{
    Body, ConversionError, MemoryConverter, MemoryQueue, Message, MessageQueue, MessageReader,
    ReadError, ReaderConfig, ScanStats, SelectorClassification, SelectorError,
};

fn colored(id: &str, color: &str) -> Message {
    Message::new(id).with_property("color", color)
}

fn ids(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.message_id.as_str()).collect()
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn message_id_selector_takes_the_fast_path() {
    let queue = queue_with([Message::new("other"), Message::new("abc-123")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "MessageId = 'abc-123'").unwrap();
    assert_eq!(
        reader.classification(),
        &SelectorClassification::ByMessageId("abc-123".to_string())
    );

    let message = reader.receive(NO_WAIT, None).unwrap().unwrap();
    assert_eq!(message.message_id, "abc-123");
    assert_eq!(reader.stats(), ScanStats::default());
    assert_eq!(queue.cursor_peeks(), 0);
    assert_eq!(queue.len(), 1);
}

#[test]
fn property_selector_scans() {
    let queue = queue_with([colored("a", "red"), colored("b", "blue")]);
    let mut blue = colored("c", "blue");
    blue.properties.insert("Foo", "bar");
    queue.send(blue).unwrap();

    let reader = MessageReader::new(&queue, MemoryConverter::new(), "Foo = 'bar'").unwrap();
    assert!(matches!(
        reader.classification(),
        SelectorClassification::Generic(_)
    ));

    let message = reader.receive(NO_WAIT, None).unwrap().unwrap();
    assert_eq!(message.message_id, "c");

    let stats = reader.stats();
    assert_eq!(stats.candidates, 3);
    assert_eq!(stats.evaluations, 3);
    assert_eq!(stats.matches, 1);
    assert!(queue.cursor_peeks() > 0);
}

#[test]
fn correlation_and_lookup_id_fast_paths() {
    let queue = queue_with([
        Message::new("a"),
        Message::new("b").with_correlation_id("reply-7"),
    ]);

    let reader =
        MessageReader::new(&queue, MemoryConverter::new(), "JMSCorrelationId = 'reply-7'").unwrap();
    assert_eq!(reader.peek(NO_WAIT).unwrap().unwrap().message_id, "b");

    let lookup_id = queue.send(Message::new("c")).unwrap();
    let selector = format!("LookupId = {lookup_id}");
    let reader = MessageReader::new(&queue, MemoryConverter::new(), &selector).unwrap();
    assert_eq!(
        reader.classification(),
        &SelectorClassification::ByLookupId(lookup_id)
    );
    assert_eq!(reader.receive(NO_WAIT, None).unwrap().unwrap().message_id, "c");
    assert!(reader.receive(NO_WAIT, None).unwrap().is_none());
    assert_eq!(queue.cursor_peeks(), 0);
}

#[test]
fn disabled_fast_paths_give_the_same_answers() {
    let queue = queue_with([Message::new("a"), Message::new("b")]);
    let lookup_id = queue.send(Message::new("c")).unwrap();
    let config = ReaderConfig::default().with_fast_paths(false);

    let by_id = MessageReader::with_config(
        &queue,
        MemoryConverter::new(),
        "NMSMessageId = 'b'",
        config.clone(),
    )
    .unwrap();
    assert!(!by_id.classification().is_fast_path());
    assert_eq!(by_id.peek(NO_WAIT).unwrap().unwrap().message_id, "b");

    let selector = format!("LookupId = {lookup_id}");
    let by_lookup =
        MessageReader::with_config(&queue, MemoryConverter::new(), &selector, config).unwrap();
    assert_eq!(by_lookup.peek(NO_WAIT).unwrap().unwrap().message_id, "c");
    assert_eq!(by_lookup.stats().matches, 1);
}

#[test]
fn unprefixed_id_selectors_agree_with_and_without_fast_paths() {
    let queue = queue_with([
        Message::new("a").with_correlation_id("k1"),
        Message::new("b").with_correlation_id("k2"),
    ]);

    for selector in ["MessageId = 'b'", "correlationid = 'k2'"] {
        for fast_paths in [true, false] {
            let config = ReaderConfig::default().with_fast_paths(fast_paths);
            let reader =
                MessageReader::with_config(&queue, MemoryConverter::new(), selector, config)
                    .unwrap();
            assert_eq!(reader.classification().is_fast_path(), fast_paths, "{}", selector);
            let found = reader.peek(NO_WAIT).unwrap();
            assert_eq!(
                found.map(|m| m.message_id),
                Some("b".to_string()),
                "{} with fast paths {}",
                selector,
                fast_paths
            );
        }
    }
}

#[test]
fn empty_selector_reads_the_head() {
    let queue = queue_with([Message::new("first"), Message::new("second")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "  ").unwrap();
    assert_eq!(reader.classification(), &SelectorClassification::All);

    assert_eq!(reader.receive(NO_WAIT, None).unwrap().unwrap().message_id, "first");
    assert_eq!(reader.stats(), ScanStats::default());
}

#[test]
fn invalid_selector_fails_construction() {
    let queue = MemoryQueue::new();
    let result = MessageReader::new(&queue, MemoryConverter::new(), "THIS IS NOT A VALID SELECTOR");
    assert!(matches!(result, Err(SelectorError::InvalidSelector { .. })));
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn not_like_filters_ignored_types() {
    let queue = queue_with((0..6).map(|i| {
        let kind = if i % 2 == 0 { "ACTIVE" } else { "ACTIVE.IGNORE" };
        Message::new(format!("m{i}"))
            .with_type(kind)
            .with_property("Type", kind)
    }));

    for selector in ["JMSType NOT LIKE '%IGNORE'", "Type NOT LIKE '%IGNORE'"] {
        let reader = MessageReader::new(&queue, MemoryConverter::new(), selector).unwrap();
        assert_eq!(ids(&reader.browse().unwrap()), ["m0", "m2", "m4"], "{}", selector);
    }

    let reader =
        MessageReader::new(&queue, MemoryConverter::new(), "JMSType NOT LIKE '%IGNORE'").unwrap();
    let mut received = Vec::new();
    while let Some(message) = reader.receive(NO_WAIT, None).unwrap() {
        received.push(message);
    }
    assert_eq!(ids(&received), ["m0", "m2", "m4"]);
    assert_eq!(queue.len(), 3);
}

#[test]
fn peek_leaves_the_message_and_includes_its_body() {
    let queue = queue_with([
        colored("a", "red"),
        colored("b", "blue").with_body(Body::Text("payload".to_string())),
    ]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'blue'").unwrap();

    let peeked = reader.peek(NO_WAIT).unwrap().unwrap();
    assert_eq!(peeked.message_id, "b");
    assert_eq!(peeked.text(), Some("payload"));
    assert_eq!(queue.len(), 2);
}

#[test]
fn matches_checks_native_messages() {
    let queue = queue_with([colored("a", "red"), colored("b", "blue")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();

    let first = queue.peek_by_id("a", NO_WAIT).unwrap().unwrap();
    let second = queue.peek_by_id("b", NO_WAIT).unwrap().unwrap();
    assert!(reader.matches(&first).unwrap());
    assert!(!reader.matches(&second).unwrap());
}

#[test]
fn evaluation_errors_reach_the_caller() {
    let queue = queue_with([colored("a", "red")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color > 3").unwrap();

    match reader.receive(NO_WAIT, None) {
        Err(ReadError::Evaluation(err)) => assert_eq!(err.kind, EvalErrorKind::UnsupportedType),
        other => panic!("expected an evaluation error, got {:?}", other),
    }
    assert_eq!(queue.len(), 1);
}

#[test]
fn body_conversion_errors_reach_the_caller() {
    let queue = MemoryQueue::new();
    queue
        .send_stored(StoredMessage {
            body: StoredBody::Text(vec![0xc3, 0x28]),
            ..StoredMessage::from(colored("bad", "red"))
        })
        .unwrap();
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();

    assert!(matches!(
        reader.peek(NO_WAIT),
        Err(ReadError::Conversion(ConversionError::InvalidBody { .. }))
    ));
}

// ============================================================================
// Body conversion
// ============================================================================

#[test]
fn bodies_are_converted_only_for_matches() {
    let messages = || {
        (0..5).map(|i| {
            colored(&format!("m{i}"), if i == 4 { "red" } else { "blue" })
                .with_body(Body::Text(format!("body {i}")))
        })
    };

    let queue = queue_with(messages());
    let converter = MemoryConverter::new();
    let reader = MessageReader::new(&queue, &converter, "color = 'red'").unwrap();
    let message = reader.receive(NO_WAIT, None).unwrap().unwrap();
    assert_eq!(message.text(), Some("body 4"));
    assert_eq!(converter.body_conversions(), 1);

    let queue = queue_with(messages());
    let converter = MemoryConverter::new();
    let config = ReaderConfig::default().with_deferred_body_conversion(false);
    let reader = MessageReader::with_config(&queue, &converter, "color = 'red'", config).unwrap();
    reader.receive(NO_WAIT, None).unwrap().unwrap();
    // Every candidate, plus the final conversion of the removed message.
    assert_eq!(converter.body_conversions(), 6);
}

// ============================================================================
// Races, deadlines and transactions
// ============================================================================

#[test]
fn lost_race_moves_on_to_the_next_match() {
    let queue = queue_with([colored("a", "red"), colored("b", "red")]);
    let racing = RacingQueue::new(&queue, 1);
    let reader = MessageReader::new(&racing, MemoryConverter::new(), "color = 'red'").unwrap();

    let message = reader.receive(NO_WAIT, None).unwrap().unwrap();
    assert_eq!(message.message_id, "b");
    assert_eq!(racing.stolen(), 1);
    assert_eq!(reader.stats().races_lost, 1);
    assert!(queue.is_empty());
}

#[test]
fn race_retries_can_be_capped() {
    let queue = queue_with([colored("a", "red"), colored("b", "red"), colored("c", "red")]);
    let racing = RacingQueue::new(&queue, u32::MAX);
    let config = ReaderConfig::default().with_max_race_retries(1);
    let reader =
        MessageReader::with_config(&racing, MemoryConverter::new(), "color = 'red'", config).unwrap();

    assert!(reader.receive(NO_WAIT, None).unwrap().is_none());
    assert_eq!(reader.stats().races_lost, 2);
    assert_eq!(queue.len(), 1);
}

#[test]
fn scan_times_out_without_a_match() {
    let queue = queue_with([colored("a", "blue")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();

    let started = Instant::now();
    assert!(reader
        .receive(Some(Duration::from_millis(50)), None)
        .unwrap()
        .is_none());
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(5));
    assert_eq!(reader.stats().timeouts, 1);
    assert_eq!(queue.len(), 1);
}

#[test]
fn blocked_receive_picks_up_a_later_match() {
    let queue = queue_with([colored("a", "blue")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();

    std::thread::scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(20));
            queue.send(colored("b", "green")).unwrap();
            queue.send(colored("c", "red")).unwrap();
        });

        let message = reader
            .receive(Some(Duration::from_secs(10)), None)
            .unwrap()
            .unwrap();
        assert_eq!(message.message_id, "c");
    });
    assert_eq!(queue.len(), 2);
}

#[test]
fn transactional_receive_can_be_rolled_back() {
    let queue = queue_with([colored("a", "blue"), colored("b", "red")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();
    let tx = MemoryTransaction::new();

    let message = reader.receive(NO_WAIT, Some(&tx)).unwrap().unwrap();
    assert_eq!(message.message_id, "b");
    assert_eq!(tx.received(), vec![message.lookup_id.unwrap()]);
    assert_eq!(queue.len(), 1);

    queue.rollback(&tx).unwrap();
    assert_eq!(ids(&reader.browse().unwrap()), ["b"]);
}

#[test]
fn browse_does_not_remove() {
    let queue = queue_with([colored("a", "red"), colored("b", "blue"), colored("c", "red")]);
    let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();

    assert_eq!(ids(&reader.browse().unwrap()), ["a", "c"]);
    assert_eq!(ids(&reader.browse().unwrap()), ["a", "c"]);
    assert_eq!(queue.len(), 3);
}
