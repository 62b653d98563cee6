//! Datagram transport: the only place pingwire touches the network.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// A datagram endpoint carrying ICMP frames.
///
/// `send_to` takes a bare ICMP frame; the endpoint adds the IP header.
/// `recv` yields whole datagrams with the 20-byte IPv4 header still in front.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send_to(&self, frame: &[u8], dest: Ipv4Addr) -> io::Result<()>;

    /// Wait for one datagram and copy it into `buf`. Longer datagrams are
    /// truncated to `buf.len()`.
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Raw IPv4 ICMP socket. Opening one needs CAP_NET_RAW (or root).
pub struct RawIcmpSocket {
    socket: UdpSocket,
    port: u16,
}

impl RawIcmpSocket {
    /// Open and bind to `0.0.0.0:<port>`. Must be called inside a tokio
    /// runtime.
    pub fn open(port: u16) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        socket.set_nonblocking(true)?;

        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        socket.bind(&bind_addr.into())?;

        // recvfrom/sendto are all tokio's UdpSocket issues, so it drives a
        // raw fd just as well as a UDP one.
        let socket = UdpSocket::from_std(socket.into())?;

        tracing::debug!(port, "raw ICMP socket open");
        Ok(Self { socket, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Transport for RawIcmpSocket {
    async fn send_to(&self, frame: &[u8], dest: Ipv4Addr) -> io::Result<()> {
        self.socket
            .send_to(frame, SocketAddrV4::new(dest, self.port))
            .await
            .map(|_| ())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf).await
    }
}
