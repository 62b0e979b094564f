//! Example: two message printers sharing one loop

use spindle::time::sleep;
use std::time::Duration;

// Prints each message, then sleeps before the next one
async fn print_messages(messages: &[&str], pause: Duration) {
    for msg in messages {
        println!("{msg}");
        sleep(pause).await;
    }
}

#[spindle::main]
async fn main() {
    env_logger::init();

    // Both printers run concurrently: the output interleaves
    spindle::gather!(
        print_messages(&["Hello", "World", "!"], Duration::from_millis(300)),
        print_messages(&["Bonjour", "le", "monde"], Duration::from_millis(200)),
    );
}
