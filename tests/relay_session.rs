use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use tripanel::relay::{PeerMessage, PeerMessageKind, PeerRelay, RelayEvent};

async fn expect_connected(events: &mut tokio::sync::mpsc::UnboundedReceiver<RelayEvent>) {
    match events.recv().await.expect("event") {
        RelayEvent::PeerConnected(_) => {}
        other => panic!("expected peer_connected, got {other:?}"),
    }
}

#[tokio::test]
async fn exchanges_messages_with_a_single_peer() {
    let (relay, handle) = PeerRelay::bind_tcp("127.0.0.1:0").await.expect("bind");
    let addr = relay.tcp_local_addr().expect("addr");
    tokio::spawn(relay.run());
    let mut events = handle.events;
    let sender = handle.sender;

    let stream = TcpStream::connect(addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    expect_connected(&mut events).await;

    // peer -> application
    write_half
        .write_all(b"{\"kind\":\"general_output\",\"message\":\"hello\"}\n")
        .await
        .expect("write");
    match events.recv().await.expect("event") {
        RelayEvent::Message(msg) => {
            assert_eq!(msg.kind, PeerMessageKind::GeneralOutput);
            assert_eq!(msg.message, "hello");
        }
        other => panic!("expected message, got {other:?}"),
    }

    // application -> peer
    sender.send(PeerMessage::new(
        PeerMessageKind::InputCommandReceived,
        "do things",
    ));
    let line = lines.next_line().await.expect("read").expect("line");
    let msg: PeerMessage = serde_json::from_str(&line).expect("parse");
    assert_eq!(msg.kind, PeerMessageKind::InputCommandReceived);
    assert_eq!(msg.message, "do things");
}

#[tokio::test]
async fn refuses_a_second_peer_while_one_is_connected() {
    let (relay, handle) = PeerRelay::bind_tcp("127.0.0.1:0").await.expect("bind");
    let addr = relay.tcp_local_addr().expect("addr");
    tokio::spawn(relay.run());
    let mut events = handle.events;

    let _first = TcpStream::connect(addr).await.expect("connect");
    expect_connected(&mut events).await;

    let second = TcpStream::connect(addr).await.expect("connect2");
    let (second_read, _second_write) = second.into_split();
    let mut second_lines = BufReader::new(second_read).lines();
    let line = second_lines.next_line().await.expect("read").expect("line");
    let msg: PeerMessage = serde_json::from_str(&line).expect("parse");
    assert_eq!(msg.kind, PeerMessageKind::ProtocolError);
    // the refused connection is closed right after the refusal
    assert!(second_lines.next_line().await.expect("read").is_none());
}

#[tokio::test]
async fn garbage_input_gets_a_protocol_error_and_the_session_survives() {
    let (relay, handle) = PeerRelay::bind_tcp("127.0.0.1:0").await.expect("bind");
    let addr = relay.tcp_local_addr().expect("addr");
    tokio::spawn(relay.run());
    let mut events = handle.events;

    let stream = TcpStream::connect(addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    expect_connected(&mut events).await;

    write_half.write_all(b"not json\n").await.expect("write");
    let line = lines.next_line().await.expect("read").expect("line");
    let msg: PeerMessage = serde_json::from_str(&line).expect("parse");
    assert_eq!(msg.kind, PeerMessageKind::ProtocolError);
    match events.recv().await.expect("event") {
        RelayEvent::Error(e) => assert!(e.contains("unparseable")),
        other => panic!("expected error notice, got {other:?}"),
    }

    // the same session still carries well-formed messages
    write_half
        .write_all(b"{\"kind\":\"error_output\",\"message\":\"still here\"}\n")
        .await
        .expect("write");
    match events.recv().await.expect("event") {
        RelayEvent::Message(msg) => {
            assert_eq!(msg.kind, PeerMessageKind::ErrorOutput);
            assert_eq!(msg.message, "still here");
        }
        other => panic!("expected message, got {other:?}"),
    }
}

#[tokio::test]
async fn accepts_a_new_peer_after_the_first_disconnects() {
    let (relay, handle) = PeerRelay::bind_tcp("127.0.0.1:0").await.expect("bind");
    let addr = relay.tcp_local_addr().expect("addr");
    tokio::spawn(relay.run());
    let mut events = handle.events;

    let first = TcpStream::connect(addr).await.expect("connect");
    expect_connected(&mut events).await;
    drop(first);
    match events.recv().await.expect("event") {
        RelayEvent::PeerClosed(_) => {}
        other => panic!("expected peer_closed, got {other:?}"),
    }

    let _second = TcpStream::connect(addr).await.expect("connect2");
    expect_connected(&mut events).await;
}

#[cfg(unix)]
#[tokio::test]
async fn unix_socket_relay_round_trips() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("console.sock");
    let (relay, handle) = PeerRelay::bind_unix(&path).await.expect("bind");
    tokio::spawn(relay.run());
    let mut events = handle.events;
    let sender = handle.sender;

    let stream = tokio::net::UnixStream::connect(&path).await.expect("connect");
    let (read_half, _write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    expect_connected(&mut events).await;

    sender.send(PeerMessage::new(PeerMessageKind::GeneralOutput, "over unix"));
    let line = lines.next_line().await.expect("read").expect("line");
    let msg: PeerMessage = serde_json::from_str(&line).expect("parse");
    assert_eq!(msg.kind, PeerMessageKind::GeneralOutput);
    assert_eq!(msg.message, "over unix");
}
