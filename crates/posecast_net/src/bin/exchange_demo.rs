//! # Pose Exchange Demo
//!
//! Runs one full exchange session with a synthetic motion source: the tick
//! loop publishes an incrementing pose into the mailbox, the workers stream
//! it out, and the demo drains proxy commands as peers appear.
//!
//! Run two instances with distinct identifiers on one network segment and
//! each will register the other as a peer.
//!
//! ## Usage
//!
//! ```bash
//! exchange_demo --id 5551 --duration 30 --port 5007
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use posecast_net::{
    ChannelSpawner, ExchangeSession, MotionRecord, ProxyCommand, SessionConfig, Vec3,
};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         POSECAST EXCHANGE DEMO                                   ║");
    println!("║         MULTICAST POSE TELEMETRY                                 ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Parse command line arguments (simple parsing, no external deps)
    let args: Vec<String> = std::env::args().collect();
    let mut participant_id = 5551.0f64;
    let mut multicast_group = String::from("224.1.1.1");
    let mut multicast_port = 5007u16;
    let mut interval_micros = 1_000u64;
    let mut registry_capacity = 32usize;
    let mut duration_secs: Option<u32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" | "-i" => {
                if i + 1 < args.len() {
                    participant_id = args[i + 1].parse().unwrap_or(5551.0);
                    i += 1;
                }
            }
            "--group" | "-g" => {
                if i + 1 < args.len() {
                    multicast_group = args[i + 1].clone();
                    i += 1;
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    multicast_port = args[i + 1].parse().unwrap_or(5007);
                    i += 1;
                }
            }
            "--interval-micros" | "-t" => {
                if i + 1 < args.len() {
                    interval_micros = args[i + 1].parse().unwrap_or(1_000);
                    i += 1;
                }
            }
            "--capacity" | "-c" => {
                if i + 1 < args.len() {
                    registry_capacity = args[i + 1].parse().unwrap_or(32);
                    i += 1;
                }
            }
            "--duration" | "-d" => {
                if i + 1 < args.len() {
                    duration_secs = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: exchange_demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -i, --id <ID>               Participant identifier (default: 5551)");
                println!("  -g, --group <ADDR>          Multicast group (default: 224.1.1.1)");
                println!("  -p, --port <PORT>           Multicast port (default: 5007)");
                println!("  -t, --interval-micros <US>  Publish interval (default: 1000)");
                println!("  -c, --capacity <NUM>        Peer registry capacity (default: 32)");
                println!("  -d, --duration <SECS>       Run for N seconds then exit");
                println!("  -h, --help                  Show this help");
                return;
            }
            _ => {}
        }
        i += 1;
    }

    let config = SessionConfig {
        participant_id,
        multicast_group: multicast_group.parse().expect("valid multicast group"),
        multicast_port,
        publish_interval_micros: interval_micros,
        registry_capacity,
        ..SessionConfig::default()
    };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Participant ID:     {}                                        ", config.participant_id);
    println!("│ Motion Feed:        {}                              ", config.motion_addr);
    println!("│ Multicast Group:    {} (TTL {})                      ", config.multicast_addr(), config.multicast_ttl);
    println!("│ Publish Interval:   {} μs                                    ", config.publish_interval_micros);
    println!("│ Registry Capacity:  {}                                        ", config.registry_capacity);
    if let Some(d) = duration_secs {
        println!("│ Duration:           {} seconds                                 ", d);
    } else {
        println!("│ Duration:           infinite                                    ");
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let (spawner, proxy_commands) = ChannelSpawner::pair(256);

    let session = ExchangeSession::new(config).expect("valid session config");
    let mailbox = session.mailbox();
    let handle = session.start(spawner).expect("session start");

    println!("Session running. Publishing synthetic motion...");
    println!();

    let start = Instant::now();
    let tick_interval = Duration::from_micros(interval_micros);
    let stats_interval = Duration::from_secs(5);
    let mut last_stats = Instant::now();
    let mut tick = 0u64;
    let mut live_proxies: HashMap<u64, f64> = HashMap::new();

    loop {
        if let Some(duration) = duration_secs {
            if start.elapsed().as_secs() >= u64::from(duration) {
                break;
            }
        }
        if handle.is_shutting_down() {
            println!("A worker failed; winding down.");
            break;
        }

        // Synthetic tick source: an easily recognizable incrementing pose.
        #[allow(clippy::cast_precision_loss)]
        let t = tick as f32;
        mailbox.publish(MotionRecord {
            position: Vec3::new(t * 0.01, 0.0, 0.5),
            velocity: Vec3::new(0.01, 0.0, 0.0),
            orientation: Vec3::new(0.0, 0.0, t * 0.001),
            ..MotionRecord::default()
        });
        tick += 1;

        // Drain proxy commands: this loop is the demo's "actor system".
        for command in proxy_commands.try_iter() {
            match command {
                ProxyCommand::Spawn {
                    proxy,
                    participant,
                    class,
                    pose,
                } => {
                    println!(
                        "★ peer {} appeared: proxy {} class {} at ({:.2}, {:.2}, {:.2})",
                        participant.value(),
                        proxy.0,
                        class,
                        pose.position.x,
                        pose.position.y,
                        pose.position.z
                    );
                    live_proxies.insert(proxy.0, participant.value());
                }
                ProxyCommand::Move { .. } => {
                    // Per-packet; a real embedder would reposition the actor here.
                }
                ProxyCommand::Destroy { proxy } => {
                    live_proxies.remove(&proxy.0);
                }
            }
        }

        if last_stats.elapsed() >= stats_interval {
            last_stats = Instant::now();
            let stats = handle.stats();
            println!("┌─ SESSION STATUS ({:.1}s) ─────────────────────────────────────", start.elapsed().as_secs_f64());
            println!("│ Motion Sent:        {}", stats.motion_sent());
            println!("│ Telemetry Sent:     {}", stats.telemetry_sent());
            println!("│ Telemetry Received: {}", stats.telemetry_received());
            println!("│ Peers Registered:   {}", handle.registry().len());
            println!("│ Live Proxies:       {}", live_proxies.len());
            println!("│ Malformed Dropped:  {}", stats.malformed_dropped());
            if let Some(latency) = stats.last_latency_micros() {
                println!("│ Self Latency:       {} μs", latency);
            } else {
                println!("│ Self Latency:       (no sample)");
            }
            println!("└──────────────────────────────────────────────────────────────────");
            println!();
        }

        std::thread::sleep(tick_interval);
    }

    handle.shutdown();
    let stats = handle.stats();
    let registry = handle.registry();

    println!();
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    SESSION SHUTDOWN                              ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║ Ticks Published:    {:>10}                                   ║", tick);
    println!("║ Motion Sent:        {:>10}                                   ║", stats.motion_sent());
    println!("║ Telemetry Sent:     {:>10}                                   ║", stats.telemetry_sent());
    println!("║ Telemetry Received: {:>10}                                   ║", stats.telemetry_received());
    println!("║ Self Packets:       {:>10}                                   ║", stats.self_packets());
    println!("║ Peers Registered:   {:>10}                                   ║", registry.len());
    println!("║ Registry Rejected:  {:>10}                                   ║", stats.registry_rejected());
    println!("║ Fallback Spawns:    {:>10}                                   ║", stats.fallback_spawns());
    println!("╚══════════════════════════════════════════════════════════════════╝");

    for peer in registry.snapshot() {
        println!(
            "  peer {}: slot {}, {} updates, last at ({:.2}, {:.2}, {:.2})",
            peer.identifier.value(),
            peer.slot_index.0,
            peer.updates,
            peer.last_transform.position.x,
            peer.last_transform.position.y,
            peer.last_transform.position.z
        );
    }
    // Our side of the actor system: tear down whatever we spawned.
    for (proxy, participant) in &live_proxies {
        println!("  destroying proxy {} (peer {})", proxy, participant);
    }

    if let Err(error) = handle.join() {
        eprintln!("session ended with error: {error}");
        std::process::exit(1);
    }
}
