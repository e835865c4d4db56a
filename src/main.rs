// ABOUTME: Shadowrelay server binary
// ABOUTME: Standalone relay application for room chat with voice masking

use clap::Parser;
use shadowrelay::server::{RelayServer, ServerArgs};

#[derive(Parser, Debug)]
#[command(name = "shadowrelay-server")]
#[command(author, version, about = "Voice-masking room relay server", long_about = None)]
struct Args {
    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize tracing
    args.server.init_tracing();

    // Log startup info
    args.server.log_startup_info();

    // Create and run server
    let server = RelayServer::with_config(args.server.build_config());
    let registry = server.registry();

    // Spawn a task to periodically report live rooms
    let report_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            let rooms = registry.room_ids();
            if !rooms.is_empty() {
                tracing::info!("Live rooms: {}", rooms.len());
                for room in rooms {
                    tracing::info!("  - {} ({} members)", room, registry.member_count(&room));
                }
            }
        }
    });

    tracing::info!("Press Ctrl+C to stop");

    let result = server.run().await;
    report_task.abort();
    result
}
