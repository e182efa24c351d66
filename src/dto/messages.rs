//! Text rendering of every message the game sends to a room.

use std::fmt::Write;

use crate::{
    error::ServiceError,
    state::{
        leaderboard::{SCORING_TABLE, Standing},
        puzzle::Puzzle,
    },
};

fn medal(rank: usize) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "⭐",
    }
}

fn points_label(points: u32) -> &'static str {
    if points == 1 { "pt" } else { "pts" }
}

fn push_standings(text: &mut String, standings: &[Standing]) {
    for standing in standings {
        let _ = writeln!(
            text,
            "{} {} — {} {}",
            medal(standing.rank),
            standing.player,
            standing.score,
            points_label(standing.score)
        );
    }
}

fn push_current_ranking(text: &mut String, standings: &[Standing]) {
    if standings.is_empty() {
        return;
    }
    text.push_str("🏆 Current ranking:\n");
    push_standings(text, standings);
}

fn push_scoring_table(text: &mut String) {
    text.push_str("💡 Points for a correct answer:\n");
    for (hints, points) in SCORING_TABLE.iter().enumerate() {
        let tier = match hints {
            0 => "No hint",
            1 => "1st hint",
            2 => "2nd hint",
            _ => "3rd hint or later",
        };
        let _ = writeln!(text, "🔹 {tier}: {points} {}", points_label(*points));
    }
    text.push_str("🔹 Nobody gets it: 0 pts\n");
}

/// Puzzle balloon posted when a round starts (and re-posted with hints in
/// multiple-choice rounds).
pub fn round_started(puzzle: &Puzzle, standings: &[Standing]) -> String {
    let mut text = String::from("🎲 *EMOJI CHALLENGE* 🎲\n\n");
    let _ = write!(
        text,
        "🔮 Category: *{}*\n\n🟦 Puzzle:\n{}\n\n",
        puzzle.category, puzzle.prompt
    );
    push_scoring_table(&mut text);
    text.push('\n');
    push_current_ranking(&mut text, standings);
    text
}

/// Announcement of a newly revealed hint.
pub fn hint_revealed(number: usize, hint: &str) -> String {
    format!("💡 Hint {number}: {hint}")
}

/// Hint announcement followed by the full balloon, for rounds whose choices
/// have to be shown again.
pub fn hint_with_balloon(
    number: usize,
    hint: &str,
    puzzle: &Puzzle,
    standings: &[Standing],
) -> String {
    format!(
        "{}\n\n{}",
        hint_revealed(number, hint),
        round_started(puzzle, standings)
    )
}

/// Winner announcement with the updated ranking.
pub fn winner(player: &str, points: u32, standings: &[Standing]) -> String {
    let mut text = format!(
        "✅ *{player} got it!* 🎉\nYou earned *{points} {}*\n\n",
        points_label(points)
    );
    push_current_ranking(&mut text, standings);
    text.push_str("\n🎯 To start a new challenge, use /emoji");
    text
}

/// Answer reveal once every hint went by without a winner.
pub fn expired(puzzle: &Puzzle) -> String {
    format!("⏱️ Nobody got it! The answer was: *{}*", puzzle.answer)
}

/// Acknowledgement of an explicit stop. The answer is deliberately not revealed.
pub fn stopped() -> String {
    "⛔ Round stopped.".to_string()
}

/// Reply to a stop request while no round is open.
pub fn nothing_to_stop() -> String {
    "ℹ️ There is no round to stop.".to_string()
}

/// Full leaderboard view.
pub fn leaderboard(standings: &[Standing]) -> String {
    if standings.is_empty() {
        return leaderboard_empty();
    }
    let mut text = String::from("🏆 *Overall ranking*\n\n");
    push_standings(&mut text, standings);
    text
}

/// Reply to a leaderboard query before any point was awarded.
pub fn leaderboard_empty() -> String {
    "🏆 The ranking is still empty.".to_string()
}

/// Transient notice for a player who already answered since the last hint.
pub fn already_attempted() -> String {
    "⏳ You already answered for this hint, wait for the next one.".to_string()
}

/// Transient notice for a wrong choice.
pub fn incorrect() -> String {
    "❌ Wrong answer, try again!".to_string()
}

/// User-facing rendering of a controller error.
pub fn service_error(err: &ServiceError) -> String {
    match err {
        ServiceError::RoundAlreadyActive { .. } => "⚠️ A round is already in progress!".to_string(),
        ServiceError::InvalidChoiceIndex { .. } => "⚠️ That choice is not available.".to_string(),
        ServiceError::InsufficientDecoys { category, .. } => format!(
            "⚠️ Category *{category}* does not have enough answers for a multiple-choice round."
        ),
        ServiceError::NoPuzzles { category: Some(category) } => {
            format!("⚠️ No puzzle found in category *{category}*.")
        }
        ServiceError::NoPuzzles { category: None } => "⚠️ The question bank is empty.".to_string(),
        ServiceError::BankUnavailable(_) => {
            "⚠️ The question bank is unavailable right now, try again later.".to_string()
        }
    }
}
