#![allow(clippy::unwrap_used)]
//! Chat session behaviour against a scripted backend.
//!
//! Covers ordering of concurrent sends, the append-only transcript,
//! translation fallback, empty submissions, the bot scope lock, timeouts
//! and closing a session with requests still in flight.

use std::sync::Arc;
use std::time::Duration;

use docchat::backend::mock::{MockBackend, MockChat, MockFailure};
use docchat::error::SessionError;
use docchat::session::{AttachmentRef, ChatSession, Role, SessionConfig, Turn, TurnStatus};

fn config(lang: &str) -> SessionConfig {
    SessionConfig {
        display_language: lang.to_string(),
        ..SessionConfig::default()
    }
}

fn start(backend: MockBackend, config: SessionConfig) -> (Arc<MockBackend>, ChatSession) {
    let backend = Arc::new(backend);
    let session = ChatSession::new(backend.clone(), config);
    (backend, session)
}

fn summary(transcript: &[Turn]) -> Vec<(Role, String, TurnStatus)> {
    transcript
        .iter()
        .map(|t| (t.role, t.text.clone(), t.status))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn refund_policy_answer_with_source() {
    let backend = MockBackend::new().with_chat(
        "What is the refund policy?",
        MockChat::answer("30 days").with_source("policy.pdf", 0.92, None),
    );
    let (backend, session) = start(backend, config("en"));

    let user = session.submit("What is the refund policy?", vec![]).unwrap();
    assert_eq!(user.status, TurnStatus::Delivered);
    session.settled().await;

    let transcript = session.transcript();
    assert_eq!(
        summary(&transcript),
        vec![
            (
                Role::User,
                "What is the refund policy?".to_string(),
                TurnStatus::Delivered
            ),
            (Role::Bot, "30 days".to_string(), TurnStatus::Delivered),
        ]
    );
    assert_eq!(transcript[1].sources.len(), 1);
    assert_eq!(transcript[1].sources[0].label, "policy.pdf");
    assert!((transcript[1].sources[0].score - 0.92).abs() < f64::EPSILON);
    assert!(backend.translate_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn translation_failure_sends_original_text() {
    let backend = MockBackend::new()
        .failing_translations(MockFailure::Status(503))
        .with_chat("¿Cuál es la política?", MockChat::answer("30 days"));
    let (backend, session) = start(backend, config("es"));

    let user = session.submit("¿Cuál es la política?", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    let chats = backend.chat_requests();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].query, "¿Cuál es la política?");
    assert_eq!(chats[0].language.as_deref(), Some("es"));

    // Both directions were attempted.
    let translations = backend.translate_requests();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations[0].to_language, "en");
    assert_eq!(translations[1].to_language, "es");

    assert_eq!(reply.status, TurnStatus::Delivered);
    assert_eq!(reply.text, "30 days");
    assert_eq!(reply.raw_text, "30 days");
}

#[tokio::test(start_paused = true)]
async fn chat_timeout_becomes_error_turn() {
    let backend = MockBackend::new().with_chat(
        "slow question",
        MockChat::answer("too late").delayed(Duration::from_secs(60)),
    );
    let (_backend, session) = start(
        backend,
        SessionConfig {
            request_timeout: Duration::from_secs(5),
            ..config("en")
        },
    );

    let started = tokio::time::Instant::now();
    let user = session.submit("slow question", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(reply.status, TurnStatus::Error);
    assert_eq!(reply.text, "Sorry, I encountered an error. Please try again.");
    assert!(reply.sources.is_empty());
    assert!(!session.is_busy());
}

#[tokio::test(start_paused = true)]
async fn rapid_sends_resolve_in_submission_order() {
    let backend = MockBackend::new()
        .with_chat(
            "A",
            MockChat::answer("reply-to-A").delayed(Duration::from_millis(200)),
        )
        .with_chat(
            "B",
            MockChat::answer("reply-to-B").delayed(Duration::from_millis(10)),
        );
    let (backend, session) = start(backend, config("en"));

    session.submit("A", vec![]).unwrap();
    session.submit("B", vec![]).unwrap();

    // Both user turns are visible before anything resolves.
    let early = session.transcript();
    assert_eq!(early.len(), 4);
    assert_eq!(early[0].text, "A");
    assert_eq!(early[1].status, TurnStatus::Pending);
    assert_eq!(early[2].text, "B");
    assert_eq!(early[3].status, TurnStatus::Pending);

    session.settled().await;

    assert_eq!(
        summary(&session.transcript()),
        vec![
            (Role::User, "A".to_string(), TurnStatus::Delivered),
            (Role::Bot, "reply-to-A".to_string(), TurnStatus::Delivered),
            (Role::User, "B".to_string(), TurnStatus::Delivered),
            (Role::Bot, "reply-to-B".to_string(), TurnStatus::Delivered),
        ]
    );
    let queries: Vec<String> = backend.chat_requests().into_iter().map(|r| r.query).collect();
    assert_eq!(queries, vec!["A", "B"]);
    assert_eq!(backend.max_concurrent_chats(), 1);
}

#[tokio::test(start_paused = true)]
async fn many_sends_pair_each_reply_with_its_question() {
    let mut backend = MockBackend::new();
    let questions: Vec<String> = (1..=5).map(|i| format!("q{i}")).collect();
    for (i, q) in questions.iter().enumerate() {
        // Later questions answer faster.
        let delay = Duration::from_millis(100 * (5 - i as u64));
        backend = backend.with_chat(q, MockChat::answer(format!("a-{q}")).delayed(delay));
    }
    let (_backend, session) = start(backend, config("en"));

    for q in &questions {
        session.submit(q, vec![]).unwrap();
    }
    session.settled().await;

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 10);
    for (pair, q) in transcript.chunks(2).zip(&questions) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(&pair[0].text, q);
        assert_eq!(pair[1].role, Role::Bot);
        assert_eq!(pair[1].text, format!("a-{q}"));
        assert!(pair[0].id < pair[1].id);
    }
}

#[tokio::test(start_paused = true)]
async fn transcript_only_grows_and_resolved_turns_never_change() {
    let backend = MockBackend::new()
        .with_chat("ok", MockChat::answer("fine").delayed(Duration::from_millis(50)))
        .with_chat(
            "bad",
            MockChat::failure(MockFailure::Rejected("index missing".into())),
        );
    let (_backend, session) = start(
        backend,
        SessionConfig {
            announce_language_switch: true,
            ..config("en")
        },
    );

    let mut snapshots = vec![session.transcript()];
    session.submit("ok", vec![]).unwrap();
    snapshots.push(session.transcript());
    session.settled().await;
    snapshots.push(session.transcript());
    session.submit("bad", vec![]).unwrap();
    session.set_display_language("fr");
    snapshots.push(session.transcript());
    assert!(session.submit("", vec![]).is_err());
    snapshots.push(session.transcript());
    session.settled().await;
    snapshots.push(session.transcript());

    for window in snapshots.windows(2) {
        let (before, after) = (&window[0], &window[1]);
        assert!(after.len() >= before.len());
        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.role, new.role);
            if old.status.is_resolved() {
                assert_eq!(old, new);
            }
        }
    }

    let last = snapshots.last().unwrap();
    assert_eq!(last[3].status, TurnStatus::Error);
    assert_eq!(last[4].role, Role::System);
}

#[tokio::test(start_paused = true)]
async fn translation_failure_with_backend_failure_still_resolves() {
    let backend = MockBackend::new()
        .failing_translations(MockFailure::Rejected("quota".into()))
        .with_chat("Hallo", MockChat::failure(MockFailure::Status(500)));
    let (_backend, session) = start(backend, config("de"));

    let user = session.submit("Hallo", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert_eq!(reply.status, TurnStatus::Error);
    assert_eq!(
        reply.text,
        "Entschuldigung, es ist ein Fehler aufgetreten. Bitte versuchen Sie es erneut."
    );
}

#[tokio::test(start_paused = true)]
async fn translation_timeout_falls_back_without_failing_the_reply() {
    let backend = MockBackend::new()
        .with_translation_delay(Duration::from_secs(120))
        .with_chat("Bonjour", MockChat::answer("Hello"));
    let (backend, session) = start(
        backend,
        SessionConfig {
            request_timeout: Duration::from_secs(2),
            ..config("fr")
        },
    );

    let user = session.submit("Bonjour", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert_eq!(backend.chat_requests()[0].query, "Bonjour");
    assert_eq!(reply.status, TurnStatus::Delivered);
    assert_eq!(reply.text, "Hello");
}

#[tokio::test(start_paused = true)]
async fn client_translation_round_trip() {
    let backend = MockBackend::new()
        .with_translation("¿Dónde está el manual?", "en", "Where is the handbook?")
        .with_chat(
            "Where is the handbook?",
            MockChat::answer("On the intranet.").with_source("handbook.pdf", 0.8, Some(42)),
        )
        .with_translation("On the intranet.", "es", "En la intranet.");
    let (backend, session) = start(backend, config("es"));

    let user = session.submit("¿Dónde está el manual?", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert_eq!(user.text, "¿Dónde está el manual?");
    assert_eq!(reply.text, "En la intranet.");
    assert_eq!(reply.raw_text, "On the intranet.");
    assert_eq!(reply.sources[0].page_count, Some(42));

    let translations = backend.translate_requests();
    assert_eq!(translations[0].from_language.as_deref(), Some("es"));
    assert_eq!(translations[1].from_language.as_deref(), Some("en"));
}

#[tokio::test(start_paused = true)]
async fn server_side_translation_skips_translate_calls() {
    let backend = MockBackend::new().with_chat("返品ポリシーは？", MockChat::answer("30日です。"));
    let (backend, session) = start(
        backend,
        SessionConfig {
            server_translates: true,
            ..config("ja")
        },
    );

    let user = session.submit("返品ポリシーは？", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert!(backend.translate_requests().is_empty());
    assert_eq!(backend.chat_requests()[0].language.as_deref(), Some("ja"));
    assert_eq!(reply.text, "30日です。");
}

#[tokio::test(start_paused = true)]
async fn error_message_translated_for_languages_without_phrases() {
    let backend = MockBackend::new().with_chat(
        "[en] 환불 정책?",
        MockChat::failure(MockFailure::Rejected("boom".into())),
    );
    let (_backend, session) = start(backend, config("ko"));

    let user = session.submit("환불 정책?", vec![]).unwrap();
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert_eq!(reply.status, TurnStatus::Error);
    assert_eq!(
        reply.text,
        "[ko] Sorry, I encountered an error. Please try again."
    );
}

#[tokio::test]
async fn empty_submission_is_rejected_without_side_effects() {
    let (backend, session) = start(MockBackend::new(), config("en"));

    assert_eq!(session.submit("", vec![]), Err(SessionError::Validation));
    assert_eq!(session.submit(" \n\t ", vec![]), Err(SessionError::Validation));
    tokio::task::yield_now().await;

    assert!(session.transcript().is_empty());
    assert!(backend.calls().is_empty());
    assert!(session.pending_request_id().is_none());
}

#[tokio::test(start_paused = true)]
async fn attachments_alone_are_a_valid_submission() {
    let (backend, session) = start(MockBackend::new(), config("es"));

    let attachment = AttachmentRef::new("contract.pdf", 2048, "application/pdf");
    let user = session.submit("", vec![attachment.clone()]).unwrap();
    session.settled().await;

    assert_eq!(user.attachments, vec![attachment]);
    // File names are not translated.
    assert_eq!(backend.chat_requests()[0].query, "contract.pdf");
}

#[tokio::test(start_paused = true)]
async fn bot_scope_locked_while_request_in_flight() {
    let backend = MockBackend::new().with_chat(
        "q",
        MockChat::answer("a").delayed(Duration::from_secs(1)),
    );
    let (backend, session) = start(
        backend,
        SessionConfig {
            bot_scope: Some("hr".into()),
            ..config("en")
        },
    );

    session.submit("q", vec![]).unwrap();
    let pending = session.pending_request_id().unwrap();

    assert_eq!(
        session.set_bot_scope(Some("legal".into())),
        Err(SessionError::InvalidState { pending })
    );
    assert_eq!(session.bot_scope().as_deref(), Some("hr"));

    session.settled().await;
    assert!(session.pending_request_id().is_none());
    session.set_bot_scope(Some("legal".into())).unwrap();
    session.submit("next", vec![]).unwrap();
    session.settled().await;

    let bots: Vec<Option<String>> = backend
        .chat_requests()
        .into_iter()
        .map(|r| r.bot_id)
        .collect();
    assert_eq!(bots, vec![Some("hr".to_string()), Some("legal".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn bot_scope_locked_while_request_only_queued() {
    let backend = MockBackend::new()
        .with_chat("a", MockChat::answer("A").delayed(Duration::from_secs(1)))
        .with_chat("b", MockChat::answer("B").delayed(Duration::from_secs(1)));
    let (backend, session) = start(
        backend,
        SessionConfig {
            bot_scope: Some("hr".into()),
            ..config("en")
        },
    );

    let first = session.submit("a", vec![]).unwrap();
    let second = session.submit("b", vec![]).unwrap();
    let first_reply = session.reply_to(first.id).unwrap().id;
    let second_reply = session.reply_to(second.id).unwrap().id;

    // The dispatcher has not run yet, so both requests are still queued.
    assert!(backend.chat_requests().is_empty());
    assert_eq!(
        session.set_bot_scope(None),
        Err(SessionError::InvalidState {
            pending: first_reply
        })
    );

    session.wait_for_reply(first.id).await.unwrap();
    assert_eq!(
        session.set_bot_scope(None),
        Err(SessionError::InvalidState {
            pending: second_reply
        })
    );
    assert_eq!(session.bot_scope().as_deref(), Some("hr"));

    session.wait_for_reply(second.id).await.unwrap();
    session.set_bot_scope(None).unwrap();
    assert_eq!(session.bot_scope(), None);
}

#[tokio::test(start_paused = true)]
async fn language_change_applies_to_future_messages_only() {
    let backend = MockBackend::new()
        .with_translation("Hola", "en", "Hello")
        .with_chat("Hello", MockChat::answer("Hi").delayed(Duration::from_millis(100)))
        .with_translation("Hi", "es", "Buenas");
    let (_backend, session) = start(
        backend,
        SessionConfig {
            announce_language_switch: true,
            ..config("es")
        },
    );

    let user = session.submit("Hola", vec![]).unwrap();
    session.set_display_language("it");
    let reply = session.wait_for_reply(user.id).await.unwrap();

    assert_eq!(reply.text, "Buenas");
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2].role, Role::System);
    assert_eq!(transcript[2].text, "D'ora in poi risponderò in Italiano.");
    assert_eq!(session.display_language(), "it");
}

#[tokio::test(start_paused = true)]
async fn closed_session_ignores_late_replies() {
    let backend = MockBackend::new()
        .with_chat("first", MockChat::answer("late").delayed(Duration::from_secs(1)));
    let (backend, session) = start(backend, config("en"));

    let user = session.submit("first", vec![]).unwrap();
    session.submit("second", vec![]).unwrap();
    while backend.chat_requests().is_empty() {
        tokio::task::yield_now().await;
    }
    session.dispose();

    tokio::time::sleep(Duration::from_secs(5)).await;

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[1].status, TurnStatus::Pending);
    assert!(session.wait_for_reply(user.id).await.is_none());
    // The queued second request is never sent.
    assert_eq!(backend.chat_requests().len(), 1);
    assert_eq!(session.submit("third", vec![]), Err(SessionError::Disposed));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_every_change() {
    let (_backend, session) = start(MockBackend::new(), config("en"));
    let mut changes = session.subscribe();

    session.submit("ping", vec![]).unwrap();
    changes.changed().await.unwrap();
    let first = *changes.borrow_and_update();

    session.settled().await;
    assert!(*changes.borrow() > first);
}
