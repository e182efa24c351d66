use tracing::{info, warn};

use crate::{
    dto::{
        inbound::{Action, InboundEvent},
        messages,
        outbound::OutboundMessage,
    },
    error::ServiceError,
    services::{
        notifier::notify,
        round_service::{self, LeaderboardView, StopOutcome},
    },
    state::SharedState,
};

/// Route an inbound event to the round controller and answer the sender when
/// the outcome concerns them only (errors, empty stop, leaderboard query).
pub async fn dispatch(state: &SharedState, event: InboundEvent) {
    let InboundEvent {
        room,
        player,
        action,
    } = event;

    let reply = match action {
        Action::Start { category } => {
            match round_service::start_round(state, &room, category.as_deref()).await {
                Ok(_) => None,
                Err(err) => {
                    log_failure(&room, &player, &err);
                    Some(OutboundMessage::room(messages::service_error(&err)))
                }
            }
        }
        Action::Stop => match round_service::stop_round(state, &room).await {
            StopOutcome::Stopped => None,
            StopOutcome::NothingToStop => Some(OutboundMessage::room(messages::nothing_to_stop())),
        },
        Action::Leaderboard => {
            let text = match round_service::get_leaderboard(state, &room).await {
                LeaderboardView::Empty => messages::leaderboard_empty(),
                LeaderboardView::Ranked(standings) => messages::leaderboard(&standings),
            };
            Some(OutboundMessage::room(text))
        }
        Action::Guess(submission) => {
            match round_service::submit_guess(state, &room, &player, submission).await {
                Ok(_) => None,
                Err(err) => {
                    log_failure(&room, &player, &err);
                    Some(OutboundMessage::player(
                        player.clone(),
                        messages::service_error(&err),
                    ))
                }
            }
        }
    };

    if let Some(reply) = reply {
        notify(state.notifier(), &room, reply).await;
    }
}

fn log_failure(room: &str, player: &str, err: &ServiceError) {
    match err {
        ServiceError::BankUnavailable(source) => {
            warn!(room, player, error = %source, "question bank unavailable; round not started")
        }
        ServiceError::InsufficientDecoys { .. } => {
            warn!(room, player, error = %err, "question bank too small for multiple choice")
        }
        _ => info!(room, player, error = %err, "operation rejected"),
    }
}
