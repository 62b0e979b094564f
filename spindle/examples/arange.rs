//! Example: an asynchronous range

use spindle::time::sleep;
use std::time::Duration;

/// Produces `0..stop`, pausing before each value.
struct ARange {
    current: u32,
    stop: u32,
    pause: Duration,
}

impl ARange {
    fn new(stop: u32) -> Self {
        Self {
            current: 0,
            stop,
            pause: Duration::from_millis(100),
        }
    }

    async fn next(&mut self) -> Option<u32> {
        if self.current >= self.stop {
            return None;
        }

        sleep(self.pause).await;

        let value = self.current;
        self.current += 1;
        Some(value)
    }
}

#[spindle::main(idle = "park")]
async fn main() {
    env_logger::init();

    let mut range = ARange::new(5);
    while let Some(value) = range.next().await {
        println!("{value}");
    }
}
