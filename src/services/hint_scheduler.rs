//! Background task revealing the hints of one round, then expiring it.

use std::time::Duration;

use tokio::{sync::oneshot, task::JoinHandle, time::sleep};
use tracing::{debug, info};

use crate::{
    dto::{messages, outbound::OutboundMessage},
    services::notifier::notify,
    state::{
        RoomId, SharedState,
        round::{HintStep, RoundId},
    },
};

/// Start the scheduler of round `round_id` in `room`.
///
/// `done` resolves when the round closes (win, stop or expiry); the scheduler
/// then exits without touching the room again.
pub fn spawn(
    state: SharedState,
    room: RoomId,
    round_id: RoundId,
    done: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    let interval = state.config().hint_interval;
    tokio::spawn(run(state, room, round_id, interval, done))
}

async fn run(
    state: SharedState,
    room: RoomId,
    round_id: RoundId,
    interval: Duration,
    mut done: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut done => {
                debug!(%room, %round_id, "round closed; hint scheduler exiting");
                return;
            }
            _ = sleep(interval) => {}
        }

        let Some(mut round) = state.lock_existing_round(&room).await else {
            return;
        };
        // The room stays locked until the announcement is handed over, so a
        // guess answering this hint is always announced after it. The round id
        // check inside `reveal_next_hint` keeps a late wake-up from touching a
        // newer round of the same room.
        match round.reveal_next_hint(round_id) {
            HintStep::Revealed {
                number,
                hint,
                puzzle,
                choices,
            } => {
                info!(%room, %round_id, hint = number, total = puzzle.hint_count(), "hint revealed");
                let message = match choices {
                    Some(choices) => {
                        let standings = state.standings().await;
                        OutboundMessage::room(messages::hint_with_balloon(
                            number, &hint, &puzzle, &standings,
                        ))
                        .with_choices(Some(choices.as_slice()))
                    }
                    None => OutboundMessage::room(messages::hint_revealed(number, &hint)),
                };
                notify(state.notifier(), &room, message).await;
            }
            HintStep::Expired { puzzle } => {
                info!(%room, %round_id, answer = %puzzle.answer, "round expired");
                notify(
                    state.notifier(),
                    &room,
                    OutboundMessage::room(messages::expired(&puzzle)),
                )
                .await;
                return;
            }
            HintStep::Stale => {
                debug!(%room, %round_id, "round no longer current; hint scheduler exiting");
                return;
            }
        }
    }
}
