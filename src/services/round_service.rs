//! Round controller: start, guess, stop and leaderboard operations.
//!
//! Every read or write of a room's round happens under that room's lock;
//! storage and winner announcements happen after the lock is released.

use std::collections::HashSet;

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use tracing::{debug, info};

use crate::{
    config::DECOY_COUNT,
    dto::{messages, outbound::OutboundMessage},
    error::ServiceError,
    services::{hint_scheduler, notifier::notify},
    state::{
        Award, RoomId, SharedState,
        leaderboard::Standing,
        puzzle::{Puzzle, normalize},
        round::{Round, RoundId, Submission, Verdict},
    },
};

/// Result of a guess that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// No round is open in the room; the guess was dropped.
    NoActiveRound,
    /// The submission does not apply to the open round.
    Ignored,
    /// The player must wait for the next hint before answering again.
    AlreadyAttempted,
    /// Wrong answer; the round stays open.
    Incorrect,
    /// Right answer; the round is over and the points are credited.
    Correct(Award),
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The open round was closed.
    Stopped,
    /// No round was open.
    NothingToStop,
}

/// Leaderboard as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    /// Nobody scored yet.
    Empty,
    /// Players by score descending, ties in first-seen order.
    Ranked(Vec<Standing>),
}

/// Open a round in `room` on a random puzzle, optionally from `category`.
///
/// Posts the puzzle balloon and hands the round to its hint scheduler.
pub async fn start_round(
    state: &SharedState,
    room: &RoomId,
    category: Option<&str>,
) -> Result<RoundId, ServiceError> {
    // Cheap early rejection; `begin` below re-checks under the lock.
    if let Some(round_id) = state.with_existing_round(room, active_round_id).await.flatten() {
        return Err(ServiceError::RoundAlreadyActive { round_id });
    }

    let config = state.config();
    let bank = state
        .question_bank()
        .load()
        .await
        .map_err(ServiceError::BankUnavailable)?;

    let (puzzle, choices) = {
        let mut rng = rand::rng();
        let puzzle = pick_puzzle(&bank, category, &mut rng)?.clone();
        let choices = if config.multiple_choice() {
            Some(build_choices(&puzzle, &bank, &mut rng)?)
        } else {
            None
        };
        (puzzle, choices)
    };

    let (round_id, done) = state
        .with_round_mut(room, |round| round.begin(puzzle.clone(), choices.clone()))
        .await?;
    hint_scheduler::spawn(state.clone(), room.clone(), round_id, done);

    info!(
        %room,
        %round_id,
        category = %puzzle.category,
        hints = puzzle.hint_count(),
        multiple_choice = choices.is_some(),
        "round started"
    );

    let standings = state.standings().await;
    let message = OutboundMessage::room(messages::round_started(&puzzle, &standings))
        .with_choices(choices.as_deref());
    notify(state.notifier(), room, message).await;

    Ok(round_id)
}

/// Evaluate `player`'s submission against the round open in `room`.
///
/// A correct answer closes the round, credits the player, persists the
/// leaderboard, and only then announces the winner.
pub async fn submit_guess(
    state: &SharedState,
    room: &RoomId,
    player: &str,
    submission: Submission,
) -> Result<GuessOutcome, ServiceError> {
    let config = state.config();
    let verdict = state
        .with_existing_round(room, |round| {
            round.evaluate(player, &submission, config.one_attempt_per_hint)
        })
        .await
        .transpose()?
        .unwrap_or(Verdict::NoRound);

    match verdict {
        Verdict::NoRound => {
            debug!(%room, player, "guess ignored: no active round");
            Ok(GuessOutcome::NoActiveRound)
        }
        Verdict::Ignored => Ok(GuessOutcome::Ignored),
        Verdict::AlreadyAttempted => {
            debug!(%room, player, "guess rejected: already attempted this hint");
            let message = OutboundMessage::player(player, messages::already_attempted());
            notify(state.notifier(), room, message).await;
            Ok(GuessOutcome::AlreadyAttempted)
        }
        Verdict::Incorrect => {
            // Free-text misses stay silent so the chat is not flooded.
            let choice = matches!(submission, Submission::Choice(_));
            if choice && !config.one_attempt_per_hint {
                let message = OutboundMessage::player(player, messages::incorrect());
                notify(state.notifier(), room, message).await;
            }
            Ok(GuessOutcome::Incorrect)
        }
        Verdict::Correct(win) => {
            let award = state.award_points(player, win.points).await;
            info!(
                %room,
                round_id = %win.round_id,
                player,
                points = win.points,
                hints_revealed = win.hints_revealed,
                elapsed_secs = win.elapsed.as_secs(),
                durable = award.durable,
                "round won"
            );
            let message =
                OutboundMessage::room(messages::winner(player, award.points, &award.standings));
            notify(state.notifier(), room, message).await;
            Ok(GuessOutcome::Correct(award))
        }
    }
}

/// Close the round open in `room` without revealing its answer.
pub async fn stop_round(state: &SharedState, room: &RoomId) -> StopOutcome {
    let closed = state.with_existing_round(room, Round::close).await.flatten();
    let Some(round) = closed else {
        return StopOutcome::NothingToStop;
    };
    info!(%room, round_id = %round.id(), hints_revealed = round.hint_cursor(), "round stopped");
    // Dropping the round wakes its hint scheduler, which then exits.
    drop(round);

    notify(
        state.notifier(),
        room,
        OutboundMessage::room(messages::stopped()),
    )
    .await;
    StopOutcome::Stopped
}

/// Current leaderboard. Scores are shared by every room.
pub async fn get_leaderboard(state: &SharedState, room: &RoomId) -> LeaderboardView {
    let standings = state.standings().await;
    debug!(%room, players = standings.len(), "leaderboard requested");
    if standings.is_empty() {
        LeaderboardView::Empty
    } else {
        LeaderboardView::Ranked(standings)
    }
}

fn active_round_id(round: &mut Round) -> Option<RoundId> {
    match round {
        Round::Active(active) => Some(active.id()),
        Round::Idle => None,
    }
}

/// Draw one puzzle uniformly, restricted to `category` when given.
pub fn pick_puzzle<'a, R>(
    bank: &'a [Puzzle],
    category: Option<&str>,
    rng: &mut R,
) -> Result<&'a Puzzle, ServiceError>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&Puzzle> = bank
        .iter()
        .filter(|puzzle| category.is_none_or(|category| puzzle.in_category(category)))
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| ServiceError::NoPuzzles {
            category: category.map(str::to_string),
        })
}

/// Shuffle the answer of `puzzle` with [`DECOY_COUNT`] distinct wrong answers
/// taken from its own decoys and from same-category puzzles of `bank`.
pub fn build_choices<R>(
    puzzle: &Puzzle,
    bank: &[Puzzle],
    rng: &mut R,
) -> Result<Vec<String>, ServiceError>
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::from([normalize(&puzzle.answer)]);
    let pool: Vec<&String> = puzzle
        .decoys
        .iter()
        .chain(
            bank.iter()
                .filter(|other| other.in_category(&puzzle.category))
                .map(|other| &other.answer),
        )
        .filter(|candidate| !candidate.trim().is_empty() && seen.insert(normalize(candidate)))
        .collect();

    if pool.len() < DECOY_COUNT {
        return Err(ServiceError::InsufficientDecoys {
            category: puzzle.category.clone(),
            needed: DECOY_COUNT,
            found: pool.len(),
        });
    }

    let mut choices: Vec<String> = pool
        .choose_multiple(rng, DECOY_COUNT)
        .map(|decoy| decoy.trim().to_string())
        .collect();
    choices.push(puzzle.answer.clone());
    choices.shuffle(rng);
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn puzzle(category: &str, answer: &str) -> Puzzle {
        Puzzle {
            category: category.into(),
            prompt: "❓".into(),
            answer: answer.into(),
            hints: vec![],
            decoys: vec![],
        }
    }

    fn movie_bank() -> Vec<Puzzle> {
        [
            "Titanic", "Avatar", "Up", "Jaws", "Alien", "Rocky", "Frozen", "Cars", "Shrek",
        ]
        .into_iter()
        .map(|answer| puzzle("Movies", answer))
        .chain([puzzle("Songs", "Imagine")])
        .collect()
    }

    #[test]
    fn pick_respects_category() {
        let bank = movie_bank();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = pick_puzzle(&bank, Some("songs"), &mut rng).unwrap();
            assert_eq!(picked.answer, "Imagine");
        }
    }

    #[test]
    fn pick_fails_on_unknown_category_or_empty_bank() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = pick_puzzle(&movie_bank(), Some("Books"), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NoPuzzles { category: Some(ref c) } if c == "Books"
        ));
        let err = pick_puzzle(&[], None, &mut rng).unwrap_err();
        assert!(matches!(err, ServiceError::NoPuzzles { category: None }));
    }

    #[test]
    fn choices_hold_answer_and_seven_distinct_same_category_decoys() {
        let bank = movie_bank();
        let mut rng = StdRng::seed_from_u64(42);
        let choices = build_choices(&bank[0], &bank, &mut rng).unwrap();

        assert_eq!(choices.len(), DECOY_COUNT + 1);
        assert_eq!(choices.iter().filter(|c| *c == "Titanic").count(), 1);
        assert!(!choices.contains(&"Imagine".to_string()));
        let distinct: HashSet<_> = choices.iter().map(|c| normalize(c)).collect();
        assert_eq!(distinct.len(), choices.len());
    }

    #[test]
    fn too_few_decoys_is_reported() {
        let bank: Vec<Puzzle> = movie_bank().into_iter().take(5).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_choices(&bank[0], &bank, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientDecoys {
                needed: 7,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn own_decoys_count_and_duplicates_do_not() {
        let mut target = puzzle("Trivia", "Paris");
        target.decoys = ["London", "london", "Rome", "Berlin", "Madrid", "Lisbon", "PARIS"]
            .into_iter()
            .map(String::from)
            .collect();
        let bank = vec![target.clone(), puzzle("Trivia", "Vienna"), puzzle("Trivia", "Oslo")];
        let mut rng = StdRng::seed_from_u64(3);

        let choices = build_choices(&target, &bank, &mut rng).unwrap();
        assert_eq!(choices.len(), 8);
        assert_eq!(
            choices
                .iter()
                .filter(|c| normalize(c) == "london" || normalize(c) == "paris")
                .count(),
            2
        );
    }
}
