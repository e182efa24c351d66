/// Cumulative scores and the scoring table.
pub mod leaderboard;
/// Puzzle records.
pub mod puzzle;
/// Per-room round state.
pub mod round;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::error;

use crate::{
    config::AppConfig,
    dao::{
        leaderboard_store::LeaderboardStore,
        question_bank::QuestionBank,
        storage::StorageResult,
    },
    services::notifier::Notifier,
};

use self::{
    leaderboard::{Leaderboard, Standing},
    round::{Round, RoundSnapshot},
};

/// Opaque identifier of a chat room.
pub type RoomId = String;

/// Handle on the application state shared by services and background tasks.
pub type SharedState = Arc<AppState>;

/// Points credited to a player, with the ranking right after the credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    /// Player credited.
    pub player: String,
    /// Points just earned.
    pub points: u32,
    /// Player's new total.
    pub total: u32,
    /// Ranking including this award.
    pub standings: Vec<Standing>,
    /// Whether the new scores reached durable storage.
    pub durable: bool,
}

/// Central application state: one round per room, the leaderboard, and the
/// collaborators every operation talks to.
pub struct AppState {
    config: Arc<AppConfig>,
    rooms: DashMap<RoomId, Arc<Mutex<Round>>>,
    leaderboard: Mutex<Leaderboard>,
    question_bank: Arc<dyn QuestionBank>,
    leaderboard_store: Arc<dyn LeaderboardStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        leaderboard: Leaderboard,
        question_bank: Arc<dyn QuestionBank>,
        leaderboard_store: Arc<dyn LeaderboardStore>,
        notifier: Arc<dyn Notifier>,
    ) -> SharedState {
        Arc::new(Self {
            config: Arc::new(config),
            rooms: DashMap::new(),
            leaderboard: Mutex::new(leaderboard),
            question_bank,
            leaderboard_store,
            notifier,
        })
    }

    /// Load the persisted leaderboard once, then build the state around it.
    pub async fn bootstrap(
        config: AppConfig,
        question_bank: Arc<dyn QuestionBank>,
        leaderboard_store: Arc<dyn LeaderboardStore>,
        notifier: Arc<dyn Notifier>,
    ) -> StorageResult<SharedState> {
        let scores = leaderboard_store.load().await?;
        Ok(Self::new(
            config,
            Leaderboard::from_scores(scores),
            question_bank,
            leaderboard_store,
            notifier,
        ))
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Puzzle source.
    pub fn question_bank(&self) -> Arc<dyn QuestionBank> {
        self.question_bank.clone()
    }

    /// Outbound messaging.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Round slot of `room`, created idle on first use.
    fn room_or_insert(&self, room: &RoomId) -> Arc<Mutex<Round>> {
        // Clone the Arc out so the map shard lock is released before awaiting.
        self.rooms
            .entry(room.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Round::Idle)))
            .value()
            .clone()
    }

    /// Round slot of `room`, if a round was ever opened there.
    fn existing_room(&self, room: &RoomId) -> Option<Arc<Mutex<Round>>> {
        self.rooms.get(room).map(|slot| slot.value().clone())
    }

    /// Run `f` with exclusive access to the round of `room`, creating the slot
    /// when the room never had one. Only round starts go through here.
    pub(crate) async fn with_round_mut<F, T>(&self, room: &RoomId, f: F) -> T
    where
        F: FnOnce(&mut Round) -> T,
    {
        let slot = self.room_or_insert(room);
        let mut guard = slot.lock().await;
        f(&mut *guard)
    }

    /// Run `f` with exclusive access to the round of `room`; `None` when the
    /// room never had a round.
    pub(crate) async fn with_existing_round<F, T>(&self, room: &RoomId, f: F) -> Option<T>
    where
        F: FnOnce(&mut Round) -> T,
    {
        let slot = self.existing_room(room)?;
        let mut guard = slot.lock().await;
        Some(f(&mut *guard))
    }

    /// Lock the round of `room` for as long as the returned guard lives.
    pub(crate) async fn lock_existing_round(&self, room: &RoomId) -> Option<OwnedMutexGuard<Round>> {
        let slot = self.existing_room(room)?;
        Some(slot.lock_owned().await)
    }

    /// Copy the observable state of the round of `room`.
    pub async fn round_snapshot(&self, room: &RoomId) -> RoundSnapshot {
        self.with_existing_round(room, |round| round.snapshot())
            .await
            .unwrap_or_default()
    }

    /// Current ranking.
    pub async fn standings(&self) -> Vec<Standing> {
        self.leaderboard.lock().await.standings()
    }

    /// Credit `points` to `player` and persist the whole leaderboard before
    /// returning.
    ///
    /// The leaderboard lock is held across the save so that concurrent awards
    /// reach storage in the order they were applied. A failed save keeps the
    /// in-memory credit: the win is announced anyway, and the next successful
    /// save will carry it.
    pub async fn award_points(&self, player: &str, points: u32) -> Award {
        let mut board = self.leaderboard.lock().await;
        let total = board.award(player, points);
        let standings = board.standings();

        let durable = match self.leaderboard_store.save(board.scores().clone()).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    player,
                    points,
                    error = %err,
                    "failed to persist leaderboard; award kept in memory only"
                );
                false
            }
        };

        Award {
            player: player.to_string(),
            points,
            total,
            standings,
            durable,
        }
    }
}
