//! Example: driving a task by hand, without a loop

use spindle::sync::Future;
use spindle::task::{Step, Task};
use spindle::yield_now;

async fn simple_print(msg: &str) {
    println!("{msg}");
}

async fn complex_work(ready: Future) -> &'static str {
    simple_print("Hello").await;
    yield_now().await;
    simple_print("World").await;
    ready.await;
    "done"
}

fn main() {
    env_logger::init();

    let ready = Future::new();
    let mut task = Task::new(complex_work(ready.clone()));

    // Every suspension point inside the task surfaces here, one per resume
    loop {
        match task.resume() {
            Ok(Step::Yielded) => println!("-- yielded"),
            Ok(Step::Waiting(future)) => {
                println!("-- waiting on a future, setting it");
                future.set();
            }
            Ok(Step::Complete(value)) => {
                println!("-- complete: {value}");
                break;
            }
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }

    assert!(ready.is_done());
}
