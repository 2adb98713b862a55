use quest_printer::{PrintJob, Quest, RenderOptions, discovery, queue::{PrintQueue, SystemConnector}};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Honors the RQS_PRINTER_* variables, then falls back to discovery
    let target = match discovery::resolve_target(false) {
        Ok(target) => target,
        Err(e) => panic!("Error: {}", e)
    };

    let quest = Quest::new("Water the plants")
        .with_description("They have been waiting since Monday.")
        .with_steps(Quest::steps_from_csv("Fill the can, Balcony first, Then the kitchen"))
        .with_next_action("Walk to the sink");
    let options = RenderOptions {
        qr_link: Some("https://example.com/quests/plants".to_string()),
        ..RenderOptions::default()
    };

    let queue = PrintQueue::start(SystemConnector);
    match queue.submit(PrintJob::new(quest, target).with_options(options)) {
        Ok(_) => println!("Printing..."),
        Err(e) => println!("Error: {}", e)
    }
    queue.shutdown().await;
}
