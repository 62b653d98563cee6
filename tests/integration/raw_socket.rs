use std::net::Ipv4Addr;

use pingwire_net::{SessionListener, Sender};

use crate::*;

/// Send over a real raw socket to loopback and read it back on a second one.
///
/// Every raw ICMP socket on the host sees every ICMP datagram, so the
/// listener also observes the kernel's echo replies; they must be ignored.
#[tokio::test]
async fn test_raw_socket_loopback() {
    let Some(receive_socket) = open_raw_or_skip() else {
        return;
    };
    let Some(send_socket) = open_raw_or_skip() else {
        return;
    };

    // Open the listener first so its socket queues the burst.
    let mut listener = SessionListener::new(receive_socket, WINDOW).unwrap();
    let sender = Sender::new(send_socket, Ipv4Addr::LOCALHOST, 512).unwrap();

    let payload = noise(8_000);
    let report = sender.send(&payload).await.unwrap();
    assert!(report.frames > 1);

    let text = listener.receive().await.unwrap();
    assert_eq!(text, payload);
}
