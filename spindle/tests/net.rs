#![cfg(unix)]

use spindle::net::{PollListener, PollStream};

use std::io;

const MESSAGE: &[u8] = b"Hello World!";

async fn recv_exact(stream: &PollStream, len: usize) -> io::Result<Vec<u8>> {
    let mut received = Vec::with_capacity(len);
    let mut buffer = [0u8; 64];

    while received.len() < len {
        let n = stream.recv(&mut buffer).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        received.extend_from_slice(&buffer[..n]);
    }

    Ok(received)
}

#[spindle::test]
async fn test_echo_reversed() -> io::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let listener = PollListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;

    let (served, reply) = spindle::gather!(
        async move {
            let (stream, _) = listener.accept().await?;

            let mut request = recv_exact(&stream, MESSAGE.len()).await?;
            request.reverse();
            stream.send_all(&request).await?;

            io::Result::Ok(())
        },
        async move {
            let stream = PollStream::connect(address).await?;
            assert_eq!(stream.peer_addr()?, address);

            stream.send_all(MESSAGE).await?;
            recv_exact(&stream, MESSAGE.len()).await
        },
    );

    served?;
    assert_eq!(reply?, b"!dlroW olleH");
    Ok(())
}

#[spindle::test]
async fn test_recv_reports_end_of_stream() -> io::Result<()> {
    let listener = PollListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;

    let (served, received) = spindle::gather!(
        async move {
            let (stream, _) = listener.accept().await?;
            stream.shutdown(std::net::Shutdown::Write)?;
            io::Result::Ok(stream)
        },
        async move {
            let stream = PollStream::connect(address).await?;
            let mut buffer = [0u8; 8];
            stream.recv(&mut buffer).await
        },
    );

    let _stream = served?;
    assert_eq!(received?, 0);
    Ok(())
}
