use super::readiness::{Interest, ready};
use crate::yield_now;

use log::debug;

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::os::fd::AsRawFd;

/// A listening TCP socket driven by readiness polling.
///
/// `PollListener` is the loop-friendly counterpart of
/// [`std::net::TcpListener`]: the socket is non-blocking and
/// [`accept`](Self::accept) yields to the loop until a connection is
/// pending.
pub struct PollListener {
    inner: TcpListener,
}

impl PollListener {
    /// Binds to `address` and starts listening.
    ///
    /// Binding to port `0` picks a free port; see
    /// [`local_addr`](Self::local_addr).
    pub fn bind<A: ToSocketAddrs>(address: A) -> io::Result<Self> {
        let inner = TcpListener::bind(address)?;
        inner.set_nonblocking(true)?;

        debug!("listening on {}", inner.local_addr()?);

        Ok(Self { inner })
    }

    /// Returns the local socket address of this listener.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accepts an incoming connection.
    pub async fn accept(&self) -> io::Result<(PollStream, SocketAddr)> {
        loop {
            ready(self.inner.as_raw_fd(), Interest::READ).await?;

            match self.inner.accept() {
                Ok((stream, address)) => {
                    debug!("accepted connection from {address}");
                    return Ok((PollStream::from_std(stream)?, address));
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

/// A connected TCP socket driven by readiness polling.
///
/// Every operation spins on a readiness check, yielding a plain
/// suspension after each failed attempt, until the socket can make
/// progress.
pub struct PollStream {
    inner: TcpStream,
}

impl PollStream {
    /// Connects to `address`.
    ///
    /// The task yields once before connecting. The connection handshake
    /// itself is a blocking call, so this is meant for peers that answer
    /// promptly (local services, tests).
    pub async fn connect(address: SocketAddr) -> io::Result<Self> {
        yield_now().await;

        let stream = TcpStream::connect(address)?;
        debug!("connected to {address}");

        Self::from_std(stream)
    }

    /// Wraps an already connected std stream, switching it to
    /// non-blocking mode.
    pub fn from_std(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;

        Ok(Self { inner: stream })
    }

    /// Receives up to `buffer.len()` bytes. Returns `0` at end of stream.
    pub async fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
        loop {
            ready(self.inner.as_raw_fd(), Interest::READ).await?;

            match (&self.inner).read(buffer) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Sends bytes from `buffer`, returning how many were written.
    pub async fn send(&self, buffer: &[u8]) -> io::Result<usize> {
        loop {
            ready(self.inner.as_raw_fd(), Interest::WRITE).await?;

            match (&self.inner).write(buffer) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Sends the entire buffer.
    ///
    /// # Errors
    ///
    /// Returns `WriteZero` if the socket accepts no bytes.
    pub async fn send_all(&self, mut buffer: &[u8]) -> io::Result<()> {
        while !buffer.is_empty() {
            let n = self.send(buffer).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "send returned zero bytes",
                ));
            }

            buffer = &buffer[n..];
        }

        Ok(())
    }

    /// Returns the address of the remote peer.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.peer_addr()
    }

    /// Shuts down the read, write, or both halves of the connection.
    pub fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        self.inner.shutdown(how)
    }
}
