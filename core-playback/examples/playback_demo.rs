//! # Player Session Demo
//!
//! Drives one player session against the simulated desktop engine and prints
//! every event the application layer would receive.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use bridge_desktop::SimulatedEngine;
use bridge_traits::{EngineNotification, NotificationReceiver, SessionId};
use core_playback::{PlayConfig, PlayerModule};
use core_runtime::events::{EventBus, EventSource, EventStream};
use std::sync::Arc;

/// Feed every queued engine notification back into the module.
async fn pump(
    player: &mut PlayerModule,
    notifications: &mut NotificationReceiver<EngineNotification>,
) {
    while let Ok(notification) = notifications.try_recv() {
        player.handle_notification(notification).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🎵 Player session demo\n");

    let engine = SimulatedEngine::new().with_duration(30_000);
    let bus = EventBus::new(32);
    let session = SessionId::new(1);
    let mut stream = EventStream::for_session(bus.subscribe(), EventSource::Player, session);

    let (mut player, mut notifications) =
        PlayerModule::new(Arc::new(engine.clone()), std::env::temp_dir(), bus);

    // Prepare
    let config = PlayConfig {
        volume: Some(0.8),
        looping: Some(false),
        ..Default::default()
    };
    let ready = player
        .prepare(session, "https://example.com/tone.mp3", config)
        .await?;
    pump(&mut player, &mut notifications).await;
    ready.wait().await?;
    println!("✅ Prepared: {:?}", player.get_current_time(session)?);

    // Play for a while
    let control = engine
        .control(session)
        .ok_or_else(|| anyhow::anyhow!("engine lost session {}", session))?;
    player.play(session).await?;
    control.tick(12_000)?;
    pump(&mut player, &mut notifications).await;
    println!("▶️  Playing at {:?}", player.get_current_time(session)?);

    // Pause and seek
    player.pause(session).await?;
    let seek = player.seek(session, 20_000).await?;
    pump(&mut player, &mut notifications).await;
    println!("⏩ Seek done: {:?}", seek.wait().await?);

    // Stop rewinds without destroying
    let stop = player.stop(session).await?;
    pump(&mut player, &mut notifications).await;
    println!("⏹️  Stopped: {:?}", stop.wait().await?);

    // Run to the end
    player.play(session).await?;
    control.finish()?;
    pump(&mut player, &mut notifications).await;

    player.destroy(session).await?;
    pump(&mut player, &mut notifications).await;

    println!("\n📨 Events:");
    for event in stream.drain() {
        println!(
            "   {} {}",
            event.channel(),
            serde_json::to_string(&event.to_wire())?
        );
    }

    println!("\n🎉 Demo completed successfully!");
    Ok(())
}
