use crate::common::error::{Result, ServerError};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Blocking listening socket owned by the daemon's accept thread
pub struct Listener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Listener {
    /// Bind to `addr`; port 0 picks a free port
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::DaemonStart { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| ServerError::DaemonStart { addr, source })?;

        Ok(Self { listener, addr })
    }

    pub fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        self.listener.accept()
    }

    /// Address actually bound, with the OS-assigned port filled in
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Connect once to `addr` so a thread blocked in `accept` returns
pub fn wake(addr: SocketAddr) -> io::Result<()> {
    let target = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), addr.port()),
        _ => addr,
    };
    TcpStream::connect_timeout(&target, WAKE_TIMEOUT).map(drop)
}
