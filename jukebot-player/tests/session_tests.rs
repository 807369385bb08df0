//! Chat session integration tests
//!
//! Drives the search → confirm → queue flow the way chat users do.

mod helpers;

use std::sync::Arc;

use helpers::{manual_coordinator, RecordingBackend};
use jukebot_common::RequesterId;
use jukebot_player::playback::{Coordinator, ManualTimer};
use jukebot_player::session::commands::{GREETING, NOTHING_PLAYING, NO_PENDING_RESULT, NO_SEARCH_RESULTS};
use jukebot_player::session::{CatalogTrack, ChatMessage, ChatSession, StaticCatalog};
use jukebot_player::BackendError;
use jukebot_common::events::EventBus;

fn catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new(vec![
        CatalogTrack {
            uri: "spotify:track:never".to_string(),
            artist: Some("Rick Astley".to_string()),
            title: "Never Gonna Give You Up".to_string(),
            duration_ms: 213_573,
        },
        CatalogTrack {
            uri: "spotify:track:africa".to_string(),
            artist: Some("Toto".to_string()),
            title: "Africa".to_string(),
            duration_ms: 295_893,
        },
        CatalogTrack {
            uri: "spotify:track:mystery".to_string(),
            artist: None,
            title: "Mystery Track".to_string(),
            duration_ms: 60_000,
        },
    ]))
}

fn alice(text: &str) -> ChatMessage {
    ChatMessage::new(RequesterId(1), "alice", text)
}

fn bob(text: &str) -> ChatMessage {
    ChatMessage::new(RequesterId(2), "bob", text)
}

#[tokio::test]
async fn test_start_registers_and_greets() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    assert_eq!(session.handle(&alice("/start")).await, GREETING);
    assert_eq!(session.handle(&bob("/help")).await, GREETING);
    assert_eq!(session.requesters().len().await, 2);
}

#[tokio::test]
async fn test_search_then_confirm_queues_and_plays() {
    let (coordinator, backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog());

    let reply = session.handle(&alice("rick astley")).await;
    assert_eq!(
        reply,
        "I found a song:\nRick Astley - Never Gonna Give You Up\nEnter (or tap) /confirm to add it \
         to the queue, or just send a message to search again!"
    );
    assert!(backend.calls().is_empty());

    let reply = session.handle(&alice("/confirm")).await;
    assert_eq!(
        reply,
        "Rick Astley - Never Gonna Give You Up has been queued. There are approx. 1 songs in the queue."
    );

    let playing = coordinator.now_playing().await.unwrap();
    assert_eq!(playing.uri(), "spotify:track:never");
    assert_eq!(playing.requested_by(), RequesterId(1));
    assert_eq!(backend.played(), vec!["spotify:track:never"]);
}

#[tokio::test]
async fn test_confirm_without_search() {
    let (coordinator, backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    assert_eq!(session.handle(&alice("/confirm")).await, NO_PENDING_RESULT);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_confirm_consumes_pending_result() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog());

    session.handle(&alice("africa")).await;
    session.handle(&alice("/confirm")).await;
    assert_eq!(session.handle(&alice("/confirm")).await, NO_PENDING_RESULT);
    assert_eq!(coordinator.queue_len().await, 0);
}

#[tokio::test]
async fn test_new_search_replaces_pending_result() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog());

    session.handle(&alice("rick")).await;
    session.handle(&alice("toto")).await;
    session.handle(&alice("/confirm")).await;

    assert_eq!(coordinator.now_playing().await.unwrap().title(), "Africa");
}

#[tokio::test]
async fn test_pending_results_are_per_requester() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog());

    session.handle(&alice("rick")).await;
    assert_eq!(session.handle(&bob("/confirm")).await, NO_PENDING_RESULT);

    session.handle(&bob("africa")).await;
    session.handle(&bob("/confirm")).await;
    let reply = session.handle(&alice("/confirm")).await;

    assert!(reply.contains("has been queued. There are approx. 1 songs"), "{}", reply);
    assert_eq!(coordinator.now_playing().await.unwrap().title(), "Africa");
}

#[tokio::test]
async fn test_search_without_results() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    assert_eq!(session.handle(&alice("polka remix")).await, NO_SEARCH_RESULTS);
    assert_eq!(session.handle(&alice("/confirm")).await, NO_PENDING_RESULT);
}

#[tokio::test]
async fn test_unknown_artist_shown() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    let reply = session.handle(&alice("mystery")).await;
    assert!(reply.contains("Unknown - Mystery Track"), "{}", reply);
}

#[tokio::test]
async fn test_now_playing_names_requester() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    assert_eq!(session.handle(&bob("/nowplaying")).await, NOTHING_PLAYING);

    session.handle(&alice("africa")).await;
    session.handle(&alice("/confirm")).await;
    session.handle(&bob("rick")).await;
    session.handle(&bob("/confirm")).await;

    assert_eq!(
        session.handle(&bob("/nowplaying")).await,
        "Now playing: Toto - Africa (requested by alice). 1 songs queued."
    );
}

#[tokio::test]
async fn test_skip_advances_queue() {
    let (coordinator, backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog());

    session.handle(&alice("africa")).await;
    session.handle(&alice("/confirm")).await;
    session.handle(&bob("rick")).await;
    session.handle(&bob("/confirm")).await;

    assert_eq!(session.handle(&bob("/skip")).await, "Skipped Toto - Africa.");
    assert_eq!(
        backend.played(),
        vec!["spotify:track:africa", "spotify:track:never"]
    );
    assert_eq!(session.handle(&bob("/skip")).await, "Skipped Rick Astley - Never Gonna Give You Up.");
    assert_eq!(session.handle(&bob("/skip")).await, NOTHING_PLAYING);
}

#[tokio::test]
async fn test_quota_limits_waiting_songs() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator.clone(), catalog()).with_max_songs_per_user(1);

    // First song plays immediately and does not count as waiting
    session.handle(&alice("africa")).await;
    session.handle(&alice("/confirm")).await;
    session.handle(&alice("rick")).await;
    session.handle(&alice("/confirm")).await;

    session.handle(&alice("mystery")).await;
    let reply = session.handle(&alice("/confirm")).await;
    assert!(reply.starts_with("You already have 1 songs waiting"), "{}", reply);
    assert_eq!(coordinator.queue_len().await, 1);

    // The refused result is kept for a later confirm
    assert!(session.requesters().pending(RequesterId(1)).await.is_some());

    // Other requesters are unaffected
    session.handle(&bob("mystery")).await;
    let reply = session.handle(&bob("/confirm")).await;
    assert!(reply.contains("has been queued"), "{}", reply);
}

#[tokio::test]
async fn test_backend_failure_reported_to_requester() {
    let backend = Arc::new(RecordingBackend::new());
    let coordinator = Coordinator::new(backend.clone(), Arc::new(ManualTimer::new()), EventBus::new(16));
    let session = ChatSession::new(coordinator.clone(), catalog());

    backend.fail_next(BackendError::Unavailable("no active device".to_string()));
    session.handle(&alice("africa")).await;
    let reply = session.handle(&alice("/confirm")).await;

    assert!(reply.contains("the player reported a problem"), "{}", reply);
    assert!(reply.contains("no active device"), "{}", reply);
    // Song still holds the slot; the pending result is gone
    assert_eq!(coordinator.now_playing().await.unwrap().title(), "Africa");
    assert!(session.requesters().pending(RequesterId(1)).await.is_none());
}

#[tokio::test]
async fn test_unknown_command() {
    let (coordinator, _backend, _timer) = manual_coordinator();
    let session = ChatSession::new(coordinator, catalog());

    let reply = session.handle(&alice("/dance")).await;
    assert_eq!(reply, "Unknown command /dance. Send /help to see what I can do.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_search_during_confirm_is_never_lost() {
    for round in 0..50 {
        let (coordinator, _backend, _timer) = manual_coordinator();
        let session = Arc::new(
            ChatSession::new(coordinator.clone(), catalog()).with_max_songs_per_user(10),
        );
        session.handle(&alice("rick")).await;

        let confirming = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.handle(&alice("/confirm")).await })
        };
        let searching = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.handle(&alice("africa")).await })
        };
        confirming.await.unwrap();
        searching.await.unwrap();

        // The newer result is either still pending or is what got queued
        let pending = session.requesters().pending(RequesterId(1)).await;
        let playing = coordinator.now_playing().await;
        let kept = pending.as_ref().map(|e| e.title()) == Some("Africa")
            || playing.as_ref().map(|e| e.title()) == Some("Africa");
        assert!(kept, "round {}: pending {:?}, playing {:?}", round, pending, playing);
    }
}
