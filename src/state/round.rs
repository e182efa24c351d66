use std::{collections::HashSet, time::Duration};

use tokio::{sync::oneshot, time::Instant};
use uuid::Uuid;

use crate::state::{leaderboard::points_for, puzzle::Puzzle};

/// Identifier of one round instance; a new one is drawn at every start so a
/// scheduler can tell its own round apart from a later one in the same room.
pub type RoundId = Uuid;

/// Round state of a room. `Idle` carries nothing, so an inactive round can never
/// hold a puzzle, a hint cursor or responders.
#[derive(Debug, Default)]
pub enum Round {
    /// No round is open.
    #[default]
    Idle,
    /// A round is open.
    Active(ActiveRound),
}

/// Data of an open round.
#[derive(Debug)]
pub struct ActiveRound {
    id: RoundId,
    puzzle: Puzzle,
    hint_cursor: usize,
    responders: HashSet<String>,
    choices: Option<Vec<String>>,
    started_at: Instant,
    // Dropped with the round; the scheduler treats the closed channel as "done".
    _done: oneshot::Sender<()>,
}

/// Player submission, already parsed from the inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Free-text answer.
    Text(String),
    /// 0-based index into the round's choices.
    Choice(usize),
}

/// Rejections raised by the round state itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// `begin` was called while a round is open.
    AlreadyActive {
        /// Round currently open.
        round_id: RoundId,
    },
    /// A choice index does not map to any offered answer.
    InvalidChoiceIndex {
        /// Index received.
        index: usize,
        /// Number of choices offered (0 in free-text rounds).
        available: usize,
    },
}

/// Outcome of evaluating a submission against the open round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No round is open.
    NoRound,
    /// The submission does not apply to this round (free text in a multiple-choice round).
    Ignored,
    /// The player already used their attempt for the current hint.
    AlreadyAttempted,
    /// Wrong answer; the round stays open.
    Incorrect,
    /// Right answer; the round has been closed.
    Correct(Win),
}

/// Details of a winning guess, captured under the same lock that closed the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Win {
    /// Round that was won.
    pub round_id: RoundId,
    /// Hints revealed when the guess was evaluated.
    pub hints_revealed: usize,
    /// Points earned for those hints.
    pub points: u32,
    /// Puzzle that was solved.
    pub puzzle: Puzzle,
    /// How long the round stayed open.
    pub elapsed: Duration,
}

/// What the hint scheduler has to do after waking up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintStep {
    /// A new hint was revealed.
    Revealed {
        /// 1-based number of the hint just revealed.
        number: usize,
        /// Hint text.
        hint: String,
        /// Puzzle of the round, for re-rendering.
        puzzle: Puzzle,
        /// Offered choices, unchanged since the start of the round.
        choices: Option<Vec<String>>,
    },
    /// Every hint was already out; the round has been closed.
    Expired {
        /// Puzzle whose answer must be announced.
        puzzle: Puzzle,
    },
    /// The scheduler's round is over or was replaced; nothing was changed.
    Stale,
}

/// Read-only view of a room's round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundSnapshot {
    /// Open round, if any.
    pub round_id: Option<RoundId>,
    /// Hints revealed so far (0 when idle).
    pub hint_cursor: usize,
    /// Players who already attempted since the last hint.
    pub responders: Vec<String>,
    /// Offered choices in multiple-choice rounds.
    pub choices: Option<Vec<String>>,
    /// Puzzle of the open round.
    pub puzzle: Option<Puzzle>,
}

impl Round {
    /// Whether a round is open.
    pub fn is_active(&self) -> bool {
        matches!(self, Round::Active(_))
    }

    /// Open a round on `puzzle`. The returned receiver resolves once the round
    /// closes, whatever the reason.
    pub(crate) fn begin(
        &mut self,
        puzzle: Puzzle,
        choices: Option<Vec<String>>,
    ) -> Result<(RoundId, oneshot::Receiver<()>), RoundError> {
        if let Round::Active(active) = self {
            return Err(RoundError::AlreadyActive {
                round_id: active.id,
            });
        }

        let (done_tx, done_rx) = oneshot::channel();
        let id = Uuid::new_v4();
        *self = Round::Active(ActiveRound {
            id,
            puzzle,
            hint_cursor: 0,
            responders: HashSet::new(),
            choices,
            started_at: Instant::now(),
            _done: done_tx,
        });
        Ok((id, done_rx))
    }

    /// Evaluate a player's submission. A correct answer closes the round in the
    /// same step so that only one winner can ever be recorded.
    pub(crate) fn evaluate(
        &mut self,
        player: &str,
        submission: &Submission,
        one_attempt_per_hint: bool,
    ) -> Result<Verdict, RoundError> {
        let Round::Active(active) = self else {
            return Ok(Verdict::NoRound);
        };

        let candidate = match (submission, active.choices.as_ref()) {
            (Submission::Text(_), Some(_)) => return Ok(Verdict::Ignored),
            (Submission::Text(text), None) => text.as_str(),
            (Submission::Choice(index), choices) => {
                let available = choices.map_or(0, Vec::len);
                choices
                    .and_then(|choices| choices.get(*index))
                    .map(String::as_str)
                    .ok_or(RoundError::InvalidChoiceIndex {
                        index: *index,
                        available,
                    })?
            }
        };

        let rate_limited = one_attempt_per_hint && active.choices.is_some();
        if rate_limited && active.responders.contains(player) {
            return Ok(Verdict::AlreadyAttempted);
        }
        let correct = active.puzzle.is_answer(candidate);
        if rate_limited {
            active.responders.insert(player.to_string());
        }

        if !correct {
            return Ok(Verdict::Incorrect);
        }

        let hints_revealed = active.hint_cursor;
        let Some(active) = self.close() else {
            return Ok(Verdict::NoRound);
        };
        Ok(Verdict::Correct(Win {
            round_id: active.id,
            hints_revealed,
            points: points_for(hints_revealed),
            elapsed: active.started_at.elapsed(),
            puzzle: active.puzzle,
        }))
    }

    /// Reveal the next hint of round `round_id`, or close it when no hint is
    /// left. Does nothing if `round_id` is not the open round.
    pub(crate) fn reveal_next_hint(&mut self, round_id: RoundId) -> HintStep {
        let Round::Active(active) = self else {
            return HintStep::Stale;
        };
        if active.id != round_id {
            return HintStep::Stale;
        }

        if let Some(hint) = active.puzzle.hints.get(active.hint_cursor).cloned() {
            active.hint_cursor += 1;
            active.responders.clear();
            return HintStep::Revealed {
                number: active.hint_cursor,
                hint,
                puzzle: active.puzzle.clone(),
                choices: active.choices.clone(),
            };
        }

        match self.close() {
            Some(active) => HintStep::Expired {
                puzzle: active.puzzle,
            },
            None => HintStep::Stale,
        }
    }

    /// Close the open round, returning it. Dropping the result signals its scheduler.
    pub(crate) fn close(&mut self) -> Option<ActiveRound> {
        match std::mem::take(self) {
            Round::Active(active) => Some(active),
            Round::Idle => None,
        }
    }

    /// Copy the observable state of the round.
    pub fn snapshot(&self) -> RoundSnapshot {
        match self {
            Round::Idle => RoundSnapshot::default(),
            Round::Active(active) => {
                let mut responders: Vec<String> = active.responders.iter().cloned().collect();
                responders.sort();
                RoundSnapshot {
                    round_id: Some(active.id),
                    hint_cursor: active.hint_cursor,
                    responders,
                    choices: active.choices.clone(),
                    puzzle: Some(active.puzzle.clone()),
                }
            }
        }
    }
}

impl ActiveRound {
    /// Identifier of this round.
    pub(crate) fn id(&self) -> RoundId {
        self.id
    }

    /// Hints revealed so far.
    pub(crate) fn hint_cursor(&self) -> usize {
        self.hint_cursor
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot::error::TryRecvError;

    use super::*;

    fn titanic() -> Puzzle {
        Puzzle {
            category: "Movies".into(),
            prompt: "🚢🧊💔".into(),
            answer: "Titanic".into(),
            hints: vec!["ship".into(), "iceberg".into(), "1912".into()],
            decoys: vec![],
        }
    }

    fn choices() -> Option<Vec<String>> {
        Some(vec!["Avatar".into(), "Titanic".into(), "Up".into()])
    }

    #[test]
    fn initial_round_is_idle() {
        let round = Round::default();
        assert!(!round.is_active());
        assert_eq!(round.snapshot(), RoundSnapshot::default());
    }

    #[test]
    fn begin_twice_is_rejected_and_keeps_the_open_round() {
        let mut round = Round::default();
        let (id, _done) = round.begin(titanic(), None).unwrap();
        round.reveal_next_hint(id);

        let err = round.begin(titanic(), None).unwrap_err();
        assert_eq!(err, RoundError::AlreadyActive { round_id: id });

        let snapshot = round.snapshot();
        assert_eq!(snapshot.round_id, Some(id));
        assert_eq!(snapshot.hint_cursor, 1);
    }

    #[test]
    fn evaluate_without_round_is_a_no_op() {
        let mut round = Round::default();
        let verdict = round
            .evaluate("ana", &Submission::Text("titanic".into()), false)
            .unwrap();
        assert_eq!(verdict, Verdict::NoRound);
    }

    #[test]
    fn correct_guess_scores_by_cursor_and_closes_the_round() {
        let mut round = Round::default();
        let (id, mut done) = round.begin(titanic(), None).unwrap();
        round.reveal_next_hint(id);

        let verdict = round
            .evaluate("ana", &Submission::Text(" TITANIC ".into()), false)
            .unwrap();
        match verdict {
            Verdict::Correct(win) => {
                assert_eq!(win.round_id, id);
                assert_eq!(win.hints_revealed, 1);
                assert_eq!(win.points, 6);
            }
            other => panic!("expected a win, got {other:?}"),
        }
        assert!(!round.is_active());
        assert!(matches!(done.try_recv(), Err(TryRecvError::Closed)));

        let second = round
            .evaluate("bruno", &Submission::Text("titanic".into()), false)
            .unwrap();
        assert_eq!(second, Verdict::NoRound);
    }

    #[test]
    fn wrong_free_text_keeps_the_round_open() {
        let mut round = Round::default();
        round.begin(titanic(), None).unwrap();
        let verdict = round
            .evaluate("ana", &Submission::Text("avatar".into()), false)
            .unwrap();
        assert_eq!(verdict, Verdict::Incorrect);
        assert!(round.is_active());
    }

    #[test]
    fn hints_advance_then_expire() {
        let mut round = Round::default();
        let (id, _done) = round.begin(titanic(), None).unwrap();

        for expected in 1..=3 {
            match round.reveal_next_hint(id) {
                HintStep::Revealed { number, .. } => assert_eq!(number, expected),
                other => panic!("expected a reveal, got {other:?}"),
            }
            assert_eq!(round.snapshot().hint_cursor, expected);
        }

        match round.reveal_next_hint(id) {
            HintStep::Expired { puzzle } => assert_eq!(puzzle.answer, "Titanic"),
            other => panic!("expected expiry, got {other:?}"),
        }
        assert!(!round.is_active());
        assert_eq!(round.reveal_next_hint(id), HintStep::Stale);
    }

    #[test]
    fn stale_round_id_cannot_reveal() {
        let mut round = Round::default();
        let (old, _old_done) = round.begin(titanic(), None).unwrap();
        round.close();
        let (current, _done) = round.begin(titanic(), None).unwrap();

        assert_eq!(round.reveal_next_hint(old), HintStep::Stale);
        assert_eq!(round.snapshot().hint_cursor, 0);
        assert!(matches!(
            round.reveal_next_hint(current),
            HintStep::Revealed { number: 1, .. }
        ));
    }

    #[test]
    fn choice_index_resolves_against_offered_choices() {
        let mut round = Round::default();
        round.begin(titanic(), choices()).unwrap();

        let err = round
            .evaluate("ana", &Submission::Choice(3), false)
            .unwrap_err();
        assert_eq!(
            err,
            RoundError::InvalidChoiceIndex {
                index: 3,
                available: 3
            }
        );

        assert_eq!(
            round.evaluate("ana", &Submission::Choice(0), false).unwrap(),
            Verdict::Incorrect
        );
        assert!(matches!(
            round.evaluate("ana", &Submission::Choice(1), false).unwrap(),
            Verdict::Correct(Win { points: 10, .. })
        ));
    }

    #[test]
    fn free_text_is_ignored_in_choice_rounds() {
        let mut round = Round::default();
        round.begin(titanic(), choices()).unwrap();
        let verdict = round
            .evaluate("ana", &Submission::Text("titanic".into()), true)
            .unwrap();
        assert_eq!(verdict, Verdict::Ignored);
        assert!(round.is_active());
    }

    #[test]
    fn choice_in_free_text_round_is_invalid() {
        let mut round = Round::default();
        round.begin(titanic(), None).unwrap();
        let err = round
            .evaluate("ana", &Submission::Choice(0), false)
            .unwrap_err();
        assert_eq!(
            err,
            RoundError::InvalidChoiceIndex {
                index: 0,
                available: 0
            }
        );
    }

    #[test]
    fn one_attempt_per_hint_until_next_reveal() {
        let mut round = Round::default();
        let (id, _done) = round.begin(titanic(), choices()).unwrap();

        assert_eq!(
            round.evaluate("ana", &Submission::Choice(0), true).unwrap(),
            Verdict::Incorrect
        );
        assert_eq!(
            round.evaluate("ana", &Submission::Choice(1), true).unwrap(),
            Verdict::AlreadyAttempted
        );
        assert_eq!(round.snapshot().responders, vec!["ana".to_string()]);

        round.reveal_next_hint(id);
        assert!(round.snapshot().responders.is_empty());
        assert!(matches!(
            round.evaluate("ana", &Submission::Choice(1), true).unwrap(),
            Verdict::Correct(Win { points: 6, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn win_reports_time_since_start_on_the_runtime_clock() {
        let mut round = Round::default();
        round.begin(titanic(), None).unwrap();
        tokio::time::advance(Duration::from_secs(90)).await;

        match round
            .evaluate("ana", &Submission::Text("titanic".into()), false)
            .unwrap()
        {
            Verdict::Correct(win) => assert_eq!(win.elapsed, Duration::from_secs(90)),
            other => panic!("expected a win, got {other:?}"),
        }
    }

    #[test]
    fn puzzle_without_hints_expires_on_first_wake() {
        let mut round = Round::default();
        let mut puzzle = titanic();
        puzzle.hints.clear();
        let (id, _done) = round.begin(puzzle, None).unwrap();
        assert!(matches!(round.reveal_next_hint(id), HintStep::Expired { .. }));
    }
}
