//! Emoji charade binary: reads chat events from stdin and prints every outbound
//! message on stdout.

use std::sync::Arc;

use anyhow::Context;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tokio_stream::{StreamExt, wrappers::LinesStream};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emoji_charade_back::{
    config::AppConfig,
    dao::{
        leaderboard_store::{JsonLeaderboardStore, LeaderboardStore},
        question_bank::JsonQuestionBank,
    },
    dto::{
        inbound::{InboundEvent, ParseError},
        outbound::Audience,
    },
    services::{
        dispatch::dispatch,
        notifier::{ChannelNotifier, Delivery},
    },
    state::AppState,
};

const OUTBOUND_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let question_bank = Arc::new(JsonQuestionBank::new(&config.question_bank_path));
    let leaderboard_store: Arc<dyn LeaderboardStore> =
        Arc::new(JsonLeaderboardStore::new(&config.leaderboard_path));
    info!(
        bank = %config.question_bank_path.display(),
        leaderboard = %config.leaderboard_path.display(),
        "using JSON storage"
    );
    let notifier = Arc::new(ChannelNotifier::new(OUTBOUND_CAPACITY));
    let mut deliveries = notifier.subscribe();

    let state = AppState::bootstrap(config, question_bank, leaderboard_store, notifier)
        .await
        .context("loading leaderboard")?;

    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
    info!("ready; send `<room> <player> <message>` lines (/emoji, /emoji_stop, /emoji_rank, #n)");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            delivery = deliveries.recv() => match delivery {
                Ok(delivery) => print_delivery(&delivery),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "console output lagging; messages dropped"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next() => match line {
                Some(Ok(line)) if line.trim().is_empty() => {}
                Some(Ok(line)) => match InboundEvent::parse_line(&line) {
                    // Events are handled one at a time so a room sees them in order.
                    Ok(event) => dispatch(&state, event).await,
                    Err(ParseError::UnknownCommand(command)) => debug!(command = %command, "ignoring unknown command"),
                    Err(err) => warn!(error = %err, line = %line, "ignoring malformed line"),
                },
                Some(Err(err)) => {
                    warn!(error = %err, "failed to read stdin");
                    break;
                }
                None => break,
            },
        }
    }

    drain(&mut deliveries);
    info!("shutting down");
    Ok(())
}

/// Print what is still queued so the last answers are not lost on exit.
fn drain(deliveries: &mut broadcast::Receiver<Delivery>) {
    while let Ok(delivery) = deliveries.try_recv() {
        print_delivery(&delivery);
    }
}

fn print_delivery(delivery: &Delivery) {
    let target = match &delivery.message.audience {
        Audience::Room => delivery.room.clone(),
        Audience::Player(player) => format!("{} → {player}", delivery.room),
    };
    println!("[{target}]\n{}", delivery.message.text);
    if let Some(markup) = &delivery.message.choices {
        for choice in &markup.choices {
            println!("  #{} {}", choice.index + 1, choice.label);
        }
    }
    println!();
}

/// Configure tracing subscribers; logs go to stderr so stdout stays readable.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
