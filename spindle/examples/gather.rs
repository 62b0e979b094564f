//! Example: gathering counters and collecting their results

use spindle::{gather, yield_now};

// Counts up to `n`, yielding to the loop after each step
async fn count_up_to(name: &'static str, n: u32) -> u32 {
    for i in 0..n {
        println!("{name}: {i}");
        yield_now().await;
    }
    n
}

#[spindle::main]
async fn main() {
    env_logger::init();

    let totals = gather([count_up_to("a", 3), count_up_to("b", 5), count_up_to("c", 2)]).await;
    println!("Totals: {:?}", totals);
}
