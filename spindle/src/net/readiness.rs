use crate::yield_now;

use std::io;
use std::os::fd::RawFd;

/// Readiness a socket operation waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interest {
    pub(crate) read: bool,
    pub(crate) write: bool,
}

impl Interest {
    pub(crate) const READ: Self = Self {
        read: true,
        write: false,
    };

    pub(crate) const WRITE: Self = Self {
        read: false,
        write: true,
    };

    fn events(self) -> libc::c_short {
        let mut events = 0;

        if self.read {
            events |= libc::POLLIN;
        }

        if self.write {
            events |= libc::POLLOUT;
        }

        events
    }
}

/// Checks readiness of `fd` without blocking (`poll(2)` with a zero
/// timeout).
///
/// Error and hang-up conditions count as ready so that the following
/// operation surfaces them.
pub(crate) fn is_ready(fd: RawFd, interest: Interest) -> io::Result<bool> {
    let events = interest.events();
    let mut pollfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };

    let n = unsafe { libc::poll(&mut pollfd, 1, 0) };

    if n < 0 {
        let err = io::Error::last_os_error();

        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }

        return Err(err);
    }

    Ok(n > 0 && pollfd.revents & (events | libc::POLLERR | libc::POLLHUP) != 0)
}

/// Spins until `fd` is ready, yielding to the loop after every failed
/// check.
pub(crate) async fn ready(fd: RawFd, interest: Interest) -> io::Result<()> {
    while !is_ready(fd, interest)? {
        yield_now().await;
    }

    Ok(())
}
