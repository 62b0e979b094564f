//! Example: TCP echo server and client on one loop
//!
//! The server answers every message with its reversed bytes.

use spindle::net::{PollListener, PollStream};
use std::io;
use std::net::SocketAddr;

// Serves a single client, then returns
async fn server(listener: PollListener) -> io::Result<()> {
    let (stream, addr) = listener.accept().await?;
    println!("Accepted connection from {}", addr);

    let mut buf = [0u8; 1024];
    loop {
        let n = stream.recv(&mut buf).await?;
        if n == 0 {
            break;
        }

        let mut reply = buf[..n].to_vec();
        reply.reverse();
        stream.send_all(&reply).await?;
    }

    println!("Client disconnected");
    Ok(())
}

async fn client(addr: SocketAddr) -> io::Result<()> {
    let stream = PollStream::connect(addr).await?;

    for msg in ["Hello World!", "spindle"] {
        stream.send_all(msg.as_bytes()).await?;

        let mut buf = [0u8; 1024];
        let n = stream.recv(&mut buf).await?;
        println!("Sent {:?}, received {:?}", msg, String::from_utf8_lossy(&buf[..n]));
    }

    stream.shutdown(std::net::Shutdown::Write)
}

#[spindle::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    // Port 0 lets the system pick a free port
    let listener = PollListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    println!("Echo server listening on {}", addr);

    let (served, sent) = spindle::gather!(server(listener), client(addr));
    served?;
    sent
}
