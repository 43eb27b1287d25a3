use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use log::{error, info, warn};

use tether::{GameServer, MonotonicClock, ServerConfig, ServerEvent, UdpTransport};

#[derive(Parser)]
#[command(name = "tether-server")]
#[command(about = "Authoritative UDP session server")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = tether::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = tether::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(long, default_value_t = 100, help = "Resend unacknowledged packets after this many ms")]
    retry_interval_ms: u64,

    #[arg(long, default_value_t = tether::DEFAULT_REJOIN_MALUS)]
    rejoin_malus: u32,

    #[arg(long, help = "Do not broadcast object positions every tick")]
    no_broadcast: bool,

    #[arg(long, help = "Maximum inbound datagrams handled per tick")]
    max_datagrams: Option<usize>,

    #[arg(long, default_value_t = 600, help = "Log stats every N ticks (0 disables)")]
    stats_every: u64,

    #[arg(long, help = "Stop after N ticks")]
    ticks: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ServerConfig {
        retry_interval: args.retry_interval_ms,
        rejoin_malus: args.rejoin_malus,
        spawn_position: Vec3::ZERO,
        broadcast_state: !args.no_broadcast,
        max_datagrams_per_tick: args.max_datagrams,
    };

    let mut server = GameServer::with_config(UdpTransport::new(), MonotonicClock::new(), config)
        .context("invalid server configuration")?;
    server
        .bind(&args.bind, args.port)
        .with_context(|| format!("failed to bind {}:{}", args.bind, args.port))?;

    let tick_duration = Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64);
    info!("Ticking at {} Hz", args.tick_rate.max(1));

    loop {
        let started = Instant::now();
        let report = server.single_step()?;

        for event in server.drain_events() {
            log_event(event);
        }

        if args.stats_every > 0 && report.tick % args.stats_every == 0 {
            let stats = server.stats();
            info!(
                "tick {} | {} sessions, {} objects, {} awaiting ack | sent {} ({} B), received {} ({} B), dropped {}, resent {}",
                stats.tick,
                stats.session_count,
                stats.object_count,
                stats.outstanding_acks,
                stats.network_stats.packets_sent,
                stats.network_stats.bytes_sent,
                stats.network_stats.packets_received,
                stats.network_stats.bytes_received,
                stats.network_stats.dropped(),
                stats.network_stats.retransmissions,
            );
        }

        if args.ticks.is_some_and(|limit| report.tick >= limit) {
            break;
        }

        if let Some(remaining) = tick_duration.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    info!("Server shutting down");
    Ok(())
}

fn log_event(event: ServerEvent) {
    match event {
        ServerEvent::ClientJoined {
            endpoint,
            object_id,
        } => info!("{} joined with object {}", endpoint, object_id),
        ServerEvent::ClientRejoined { endpoint, malus } => {
            info!("{} rejoined (malus {})", endpoint, malus)
        }
        ServerEvent::UnauthorizedMutation {
            endpoint,
            object_id,
        } => warn!("{} tried to move object {}", endpoint, object_id),
        ServerEvent::MalformedPacket { endpoint, error } => {
            warn!("Malformed packet from {}: {}", endpoint, error)
        }
        ServerEvent::Retransmitted { .. } => {}
        ServerEvent::TransportFault { endpoint, message } => match endpoint {
            Some(endpoint) => error!("Transport fault for {}: {}", endpoint, message),
            None => error!("Transport fault: {}", message),
        },
    }
}
