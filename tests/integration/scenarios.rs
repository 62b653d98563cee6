use std::time::Duration;

use pingwire_core::segment::{compress, segment};
use pingwire_core::wire::{encode, EchoFrame, ICMP_ECHO_REPLY};
use pingwire_core::{reassemble, SendContext};
use pingwire_net::{Transport, TunnelError};
use tokio::time::{sleep, Instant};

use crate::*;

/// The classic demo payload: one chunk, one frame, then silence.
#[tokio::test(start_paused = true)]
async fn test_short_payload_end_to_end() {
    let payload = "testetststetststetstetstetststettsstet";
    let (sender, mut listener) = linked(100).unwrap();

    let report = sender.send(payload).await.unwrap();
    assert_eq!(report.frames, 1);

    let start = Instant::now();
    let text = listener.receive().await.unwrap();
    assert_eq!(text, payload);
    assert!(start.elapsed() >= WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_multi_chunk_payload_end_to_end() {
    let payload = noise(20_000);
    let (sender, mut listener) = linked(128).unwrap();

    let report = sender.send(&payload).await.unwrap();
    assert!(report.frames > 1, "only {} frame", report.frames);
    assert_eq!(report.frames, segment(&payload, 128).unwrap().len());

    let records = listener.listen().await.unwrap();
    assert_eq!(records.len(), report.frames);
    assert_eq!(sequences(&records), (1..=report.frames as u16).collect::<Vec<_>>());
    assert_eq!(reassemble(records).unwrap(), payload);
}

#[tokio::test(start_paused = true)]
async fn test_odd_chunk_size_end_to_end() {
    let payload = noise(3_001);
    let (sender, mut listener) = linked(101).unwrap();

    sender.send(&payload).await.unwrap();
    assert_eq!(listener.receive().await.unwrap(), payload);
}

/// Chunks 1..3 delivered 2, 3, 1 still rebuild the payload.
#[tokio::test(start_paused = true)]
async fn test_out_of_order_delivery() {
    let payload = noise(600);
    let compressed_len = compress(payload.as_bytes()).unwrap().len();
    let chunks = segment(&payload, (compressed_len / 3 + 2) & !1).unwrap();
    assert_eq!(chunks.len(), 3);

    let (_, mut listener) = linked(4096).unwrap();
    let mut ctx = SendContext::with_identifier(4242);
    let frames: Vec<Vec<u8>> = chunks.iter().map(|c| ctx.next_frame(c)).collect();

    for i in [1, 2, 0] {
        listener.transport().inject(datagram(&frames[i]));
    }

    let records = listener.listen().await.unwrap();
    assert_eq!(sequences(&records), vec![2, 3, 1]);
    assert_eq!(reassemble(records).unwrap(), payload);
}

/// Replies, other ICMP types and runt datagrams interleaved with a burst
/// never reach the record list.
#[tokio::test(start_paused = true)]
async fn test_non_request_frames_ignored() {
    let payload = noise(2_000);
    let (sender, mut listener) = linked(128).unwrap();
    let inject = listener.transport().injector();

    sender.send(&payload).await.unwrap();
    inject.send(datagram(&encode(ICMP_ECHO_REPLY, 0, 1, 2, b"reply!"))).unwrap();
    inject.send(datagram(&encode(3, 1, 0, 0, &[0u8; 28]))).unwrap();
    inject.send(vec![0x45, 0, 0, 12]).unwrap();

    let records = listener.listen().await.unwrap();
    let frames = segment(&payload, 128).unwrap().len();
    assert_eq!(records.len(), frames);
    assert_eq!(reassemble(records).unwrap(), payload);
}

/// Two sends separated by more than the window become two sessions.
#[tokio::test(start_paused = true)]
async fn test_consecutive_sessions() {
    let (sender, mut listener) = linked(64).unwrap();

    let send_task = tokio::spawn(async move {
        sender.send("first message").await.unwrap();
        sleep(Duration::from_secs(2)).await;
        sender.send(&noise(1_000)).await.unwrap();
        sender
    });

    assert_eq!(listener.receive().await.unwrap(), "first message");
    assert_eq!(listener.receive().await.unwrap(), noise(1_000));
    send_task.await.unwrap();
}

/// Back-to-back sends inside one window merge into one session. Both count
/// from sequence 1, so sorting interleaves their chunks and the merged
/// stream does not decode.
#[tokio::test(start_paused = true)]
async fn test_sends_inside_one_window_corrupt_the_session() {
    let (sender, mut listener) = linked(200).unwrap();

    let first = sender.send(&noise(3_000)).await.unwrap();
    let second = sender.send(&noise(3_000).to_uppercase()).await.unwrap();
    assert!(first.frames > 2 && second.frames > 2);

    let records = listener.listen().await.unwrap();
    assert_eq!(records.len(), first.frames + second.frames);
    assert_ne!(first.identifier, 0);

    let err = TunnelError::from(reassemble(records).unwrap_err());
    assert!(err.is_session_local());
}

/// A lost frame in the middle of a burst costs the whole session.
#[tokio::test(start_paused = true)]
async fn test_lost_frame_fails_session() {
    let payload = noise(4_000);
    let chunks = segment(&payload, 200).unwrap();
    assert!(chunks.len() > 3);

    let (_, mut listener) = linked(200).unwrap();
    let mut ctx = SendContext::with_identifier(77);
    for (i, chunk) in chunks.iter().enumerate() {
        let frame = ctx.next_frame(chunk);
        if i != 1 {
            listener.transport().inject(datagram(&frame));
        }
    }

    let err = listener.receive().await.unwrap_err();
    assert!(matches!(err, TunnelError::Reassembly(_)), "{err:?}");
}

/// The sender's frames on the wire verify and carry the fixed echo fields.
#[tokio::test]
async fn test_frames_on_the_wire() {
    let (sender, listener) = linked(100).unwrap();
    let report = sender.send(&noise(1_500)).await.unwrap();

    let mut buf = vec![0u8; 2048];
    for expected_seq in 1..=report.frames as u16 {
        let len = listener.transport().recv(&mut buf).await.unwrap();
        let icmp = &buf[20..len];
        assert!(pingwire_core::wire::verify(icmp));

        let frame = pingwire_core::wire::decode_icmp(icmp).unwrap();
        assert_eq!(frame, EchoFrame { sequence: expected_seq, ..frame.clone() });
        assert_eq!((frame.kind, frame.code), (8, 0));
        assert_eq!(frame.identifier, report.identifier);
        assert_eq!(frame.data.len() % 2, 0);
    }
}
