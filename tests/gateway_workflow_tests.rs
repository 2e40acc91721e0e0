use chatrelay::{MessageHandler, ServerEvent};

mod utils;

use utils::*;

#[tokio::test]
async fn test_room_lifecycle_scenario() {
    let setup = TestSetup::new();

    // Alice creates a room and joins it
    let code = setup.create_room("alice-conn").await;
    setup.clear_messages().await;

    setup.join_room("alice-conn", &code, "Alice").await;

    let alice_events = setup.events_for("alice-conn").await;
    match &alice_events[0] {
        ServerEvent::JoinedRoom(snapshot) => {
            assert_eq!(snapshot.room_id, code);
            assert_eq!(snapshot.users, vec!["Alice"]);
            assert_eq!(snapshot.user_size, 1);
            assert!(snapshot.messages.is_empty());
        }
        other => panic!("Expected joinedRoom, got {:?}", other),
    }
    assert_eq!(alice_events[1], ServerEvent::UserJoined(1));

    // Bob joins the same room; both connections see the new count
    setup.clear_messages().await;
    setup.join_room("bob-conn", &code, "Bob").await;

    let alice_events = setup.events_for("alice-conn").await;
    assert_eq!(alice_events, vec![ServerEvent::UserJoined(2)]);

    let bob_events = setup.events_for("bob-conn").await;
    assert!(matches!(&bob_events[0], ServerEvent::JoinedRoom(s) if s.user_size == 2));
    assert_eq!(bob_events[1], ServerEvent::UserJoined(2));

    // Alice sends a message; both connections receive it
    setup.clear_messages().await;
    setup.send_message("alice-conn", &code, "hi", "Alice").await;

    for connection_id in ["alice-conn", "bob-conn"] {
        let events = setup.events_for(connection_id).await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::Message(message) => {
                assert_eq!(message.content, "hi");
                assert_eq!(message.sender, "Alice");
            }
            other => panic!("Expected message, got {:?}", other),
        }
    }

    // Bob disconnects; Alice sees the departure
    setup.clear_messages().await;
    setup.disconnect("bob-conn").await;

    let alice_events = setup.events_for("alice-conn").await;
    assert_eq!(alice_events, vec![ServerEvent::UserLeft(1)]);
    assert!(setup.events_for("bob-conn").await.is_empty());

    // Alice disconnects; the room is gone
    setup.clear_messages().await;
    setup.disconnect("alice-conn").await;
    assert!(setup.registry.get_room(&code).await.unwrap().is_none());

    // Joining the dead code fails
    setup.join_room("carol-conn", &code, "Carol").await;
    let carol_events = setup.events_for("carol-conn").await;
    assert_eq!(carol_events.len(), 1);
    match &carol_events[0] {
        ServerEvent::Error(payload) => assert!(payload.message.contains("not found")),
        other => panic!("Expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_new_joiner_receives_full_ordered_history() {
    let setup = TestSetup::new();

    let code = setup.create_room("alice-conn").await;
    setup.join_room("alice-conn", &code, "Alice").await;

    for content in ["first", "second", "third"] {
        setup.send_message("alice-conn", &code, content, "Alice").await;
    }

    setup.clear_messages().await;
    setup.join_room("bob-conn", &code, "Bob").await;

    let bob_events = setup.events_for("bob-conn").await;
    match &bob_events[0] {
        ServerEvent::JoinedRoom(snapshot) => {
            let contents: Vec<&str> = snapshot
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect();
            assert_eq!(contents, vec!["first", "second", "third"]);
        }
        other => panic!("Expected joinedRoom, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_payload_only_reaches_offending_connection() {
    let setup = TestSetup::new();

    let code = setup.create_room("alice-conn").await;
    setup.join_room("alice-conn", &code, "Alice").await;
    setup.join_room("bob-conn", &code, "Bob").await;
    setup.clear_messages().await;

    // Bob sends garbage
    setup
        .gateway
        .handle_message("bob-conn", "}{ definitely not json".to_string())
        .await;

    let bob_events = setup.events_for("bob-conn").await;
    assert_eq!(bob_events.len(), 1);
    assert!(matches!(bob_events[0], ServerEvent::Error(_)));

    // Alice is untouched, and the room still works
    assert!(setup.events_for("alice-conn").await.is_empty());

    setup.send_message("bob-conn", &code, "still here", "Bob").await;
    let alice_events = setup.events_for("alice-conn").await;
    assert!(matches!(&alice_events[0], ServerEvent::Message(m) if m.content == "still here"));
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let setup = TestSetup::new();

    let first = setup.create_room("alice-conn").await;
    let second = setup.create_room("carol-conn").await;
    assert_ne!(first, second);

    setup.join_room("alice-conn", &first, "Alice").await;
    setup.join_room("carol-conn", &second, "Carol").await;
    setup.clear_messages().await;

    setup
        .send_message("alice-conn", &first, "room one only", "Alice")
        .await;

    assert_eq!(setup.events_for("alice-conn").await.len(), 1);
    assert!(setup.events_for("carol-conn").await.is_empty());
}

#[tokio::test]
async fn test_duplicate_join_does_not_duplicate_membership() {
    let setup = TestSetup::new();

    let code = setup.create_room("alice-conn").await;
    setup.join_room("alice-conn", &code, "Alice").await;
    setup.clear_messages().await;

    setup.join_room("alice-conn", &code, "Alice").await;

    let events = setup.events_for("alice-conn").await;
    match &events[0] {
        ServerEvent::JoinedRoom(snapshot) => {
            assert_eq!(snapshot.users, vec!["Alice"]);
            assert_eq!(snapshot.user_size, 1);
        }
        other => panic!("Expected joinedRoom, got {:?}", other),
    }
    assert_eq!(events[1], ServerEvent::UserJoined(1));
}

#[tokio::test]
async fn test_two_connections_may_share_a_display_name() {
    let setup = TestSetup::new();

    let code = setup.create_room("conn-a").await;
    setup.join_room("conn-a", &code, "Alice").await;
    setup.join_room("conn-b", &code, "Alice").await;
    setup.clear_messages().await;

    // Disconnecting one of them leaves the other in place
    setup.disconnect("conn-b").await;

    let events = setup.events_for("conn-a").await;
    assert_eq!(events, vec![ServerEvent::UserLeft(1)]);

    let room = setup.registry.get_room(&code).await.unwrap().unwrap();
    assert_eq!(room.display_names(), vec!["Alice"]);
}
