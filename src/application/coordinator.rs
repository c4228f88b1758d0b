//! Drop coordinator use case
//!
//! Owns the user-visible state and sequences the four device capabilities:
//! location, capture, playback, and the drop store. All mutation happens on
//! the coordinator's single event loop; platform callbacks arrive as watch
//! channel updates and are drained there.

use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::domain::drop::AudioDrop;
use crate::domain::geo::{Coordinate, Region};
use crate::domain::session::RecorderSession;
use crate::domain::status::Status;

use super::ports::{
    AuthorizationStatus, ClipPlayer, ClipRecorder, DropStore, LocationProvider,
};

/// Commands accepted by the coordinator's event loop
#[derive(Debug)]
pub enum Command {
    ToggleRecording,
    Play(Uuid),
    Select(Uuid),
    Refresh,
    SetOwner(String),
    SetNotes(String),
    Shutdown,
}

/// Combined state republished for display after every mutation
#[derive(Debug, Clone)]
pub struct ViewState {
    pub status: Status,
    pub is_recording: bool,
    pub drops: Vec<AudioDrop>,
    pub selected: Option<Uuid>,
    pub region: Region,
    pub fix: Option<Coordinate>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: Status::initializing(),
            is_recording: false,
            drops: Vec::new(),
            selected: None,
            region: Region::default(),
            fix: None,
        }
    }
}

/// The core state machine tying location, capture, playback, and storage
/// together.
///
/// Failures are terminal per operation: every error becomes a status, and
/// the only retry is the user re-invoking the same action.
pub struct DropCoordinator<L, R, P, S>
where
    L: LocationProvider,
    R: ClipRecorder,
    P: ClipPlayer,
    S: DropStore,
{
    location: L,
    recorder: R,
    player: P,
    store: S,

    session: RecorderSession,
    microphone_permission: bool,
    draft_owner: String,
    draft_notes: String,
    drops: Vec<AudioDrop>,
    selected: Option<Uuid>,
    last_fix: Option<Coordinate>,
    region: Region,

    auth_rx: watch::Receiver<AuthorizationStatus>,
    fix_rx: watch::Receiver<Option<Coordinate>>,
    state_tx: watch::Sender<ViewState>,
    status: Status,
}

impl<L, R, P, S> DropCoordinator<L, R, P, S>
where
    L: LocationProvider,
    R: ClipRecorder,
    P: ClipPlayer,
    S: DropStore,
{
    /// Create a coordinator and the receiver for its published state.
    /// Subscribes to the location provider once, at construction.
    pub fn new(location: L, recorder: R, player: P, store: S, region: Region) -> (Self, watch::Receiver<ViewState>) {
        let auth_rx = location.authorization();
        let fix_rx = location.fixes();
        let (state_tx, state_rx) = watch::channel(ViewState {
            region,
            ..ViewState::default()
        });

        let microphone_permission = recorder.has_permission();

        (
            Self {
                location,
                recorder,
                player,
                store,
                session: RecorderSession::new(),
                microphone_permission,
                draft_owner: String::new(),
                draft_notes: String::new(),
                drops: Vec::new(),
                selected: None,
                last_fix: None,
                region,
                auth_rx,
                fix_rx,
                state_tx,
                status: Status::initializing(),
            },
            state_rx,
        )
    }

    pub fn set_draft_owner(&mut self, owner: String) {
        self.draft_owner = owner;
    }

    pub fn set_draft_notes(&mut self, notes: String) {
        self.draft_notes = notes;
    }

    /// First-appearance sequence: request location authorization, resolve
    /// microphone permission, then compute a status from whichever state
    /// currently holds.
    pub async fn start(&mut self) {
        self.location.request_authorization().await;
        self.ensure_microphone_permission().await;

        if let Err(e) = self.session.activate() {
            tracing::debug!("session already active: {}", e);
        }

        self.refresh().await;
        self.sync_location();
        self.update_status_for_current_state();
        self.publish();
    }

    /// Reload the store and mirror its collection
    pub async fn refresh(&mut self) {
        self.store.refresh().await;
        self.drops = self.store.drops().await;
        self.publish();
    }

    pub fn select(&mut self, id: Uuid) {
        if self.drops.iter().any(|d| d.id == id) {
            self.selected = Some(id);
            self.publish();
        }
    }

    /// Start a capture if idle, otherwise finish the one in flight
    pub async fn toggle_recording(&mut self) {
        if self.session.is_recording() {
            self.finish_recording().await;
        } else {
            self.begin_recording().await;
        }
    }

    async fn begin_recording(&mut self) {
        if !self.ensure_microphone_permission().await {
            return;
        }

        if self.last_fix.is_none() {
            self.status = Status::waiting_for_location();
            self.publish();
            return;
        }

        match self.recorder.start().await {
            Ok(()) => {
                if let Err(e) = self.session.start_recording() {
                    tracing::error!("session refused start: {}", e);
                    return;
                }
                self.status = Status::recording();
            }
            Err(e) => {
                tracing::warn!("capture start failed: {}", e);
                self.status = Status::record_start_failed();
            }
        }
        self.publish();
    }

    async fn finish_recording(&mut self) {
        let stopped = self.recorder.stop().await;
        if let Err(e) = self.session.finish_recording() {
            tracing::error!("session refused finish: {}", e);
        }

        let clip = match stopped {
            Ok(Some(path)) => path,
            Ok(None) => {
                self.status = Status::recording_failed();
                self.publish();
                return;
            }
            Err(e) => {
                tracing::warn!("capture stop failed: {}", e);
                self.status = Status::recording_failed();
                self.publish();
                return;
            }
        };

        let Some(fix) = self.last_fix else {
            // A drop without a location cannot be placed; the clip is lost
            // by policy, with no retry path.
            remove_clip(&clip).await;
            self.status = Status::missing_location();
            self.publish();
            return;
        };

        match self
            .store
            .add_drop(
                &clip,
                fix,
                self.draft_owner.trim(),
                self.draft_notes.trim(),
            )
            .await
        {
            Ok(drop) => {
                self.selected = Some(drop.id);
                self.drops = self.store.drops().await;
                self.draft_notes.clear();
                self.status = Status::dropped();
            }
            Err(e) => {
                tracing::warn!("failed to save drop: {}", e);
                self.status = Status::save_failed();
            }
        }

        // The temporary capture file is redundant once the store has
        // copied (or refused) it.
        remove_clip(&clip).await;
        self.publish();
    }

    /// Play a drop's clip. On failure the selection is left unchanged.
    pub async fn play(&mut self, id: Uuid) {
        let Some(drop) = self.drops.iter().find(|d| d.id == id).cloned() else {
            tracing::warn!("play requested for unknown drop {}", id);
            self.status = Status::playback_failed();
            self.publish();
            return;
        };

        let path = self.store.clip_path(&drop);
        match self.player.play(&path).await {
            Ok(()) => {
                self.selected = Some(drop.id);
                self.status = Status::playing(drop.title());
            }
            Err(e) => {
                tracing::warn!("playback failed for {}: {}", path.display(), e);
                self.status = Status::playback_failed();
            }
        }
        self.publish();
    }

    /// Drain commands and location updates until shutdown
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut auth_rx = self.auth_rx.clone();
        let mut fix_rx = self.fix_rx.clone();

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::ToggleRecording) => self.toggle_recording().await,
                    Some(Command::Play(id)) => self.play(id).await,
                    Some(Command::Select(id)) => self.select(id),
                    Some(Command::Refresh) => self.refresh().await,
                    Some(Command::SetOwner(owner)) => self.set_draft_owner(owner),
                    Some(Command::SetNotes(notes)) => self.set_draft_notes(notes),
                    Some(Command::Shutdown) | None => break,
                },
                Ok(()) = auth_rx.changed() => {
                    let status = *auth_rx.borrow_and_update();
                    self.on_authorization_change(status);
                }
                Ok(()) = fix_rx.changed() => {
                    let fix = *fix_rx.borrow_and_update();
                    self.on_fix_change(fix);
                }
            }
        }

        if self.session.is_recording() {
            self.recorder.cancel().await;
        }
        self.player.stop().await;
        self.location.stop_updates().await;
    }

    async fn ensure_microphone_permission(&mut self) -> bool {
        if self.microphone_permission {
            return true;
        }
        let granted = self.recorder.request_permission().await;
        self.microphone_permission = granted;
        if !granted {
            self.status = Status::microphone_denied();
            self.publish();
        }
        granted
    }

    /// Apply the provider's current values without waiting for a change
    /// notification
    fn sync_location(&mut self) {
        let auth = *self.auth_rx.borrow_and_update();
        if auth.is_denied() {
            self.status = Status::location_denied();
        }
        self.last_fix = *self.fix_rx.borrow_and_update();
        if let Some(fix) = self.last_fix {
            self.region.recenter(fix);
        }
    }

    fn on_fix_change(&mut self, fix: Option<Coordinate>) {
        self.last_fix = fix;
        match fix {
            Some(position) => {
                // Re-centers on every accepted fix; there is no suppression
                // while the user pans.
                self.region.recenter(position);
                self.status = Status::listening_near(position);
            }
            None => {
                self.status = Status::searching_for_location();
            }
        }
        self.publish();
    }

    fn on_authorization_change(&mut self, authorization: AuthorizationStatus) {
        match authorization {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                self.status = Status::location_denied();
            }
            AuthorizationStatus::NotDetermined => {
                self.status = Status::requesting_location();
            }
        }
        self.publish();
    }

    fn update_status_for_current_state(&mut self) {
        if self.auth_rx.borrow().is_denied() {
            self.status = Status::location_denied();
        } else if !self.microphone_permission {
            self.status = Status::microphone_denied();
        } else if self.last_fix.is_none() {
            self.status = Status::searching_for_location();
        } else {
            self.status = Status::ready();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(ViewState {
            status: self.status.clone(),
            is_recording: self.session.is_recording(),
            drops: self.drops.clone(),
            selected: self.selected,
            region: self.region,
            fix: self.last_fix,
        });
    }
}

async fn remove_clip(path: &PathBuf) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!("could not remove temp clip {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StatusIcon;
    use crate::infrastructure::store::FsDropStore;

    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::application::ports::{CaptureError, PlaybackError};

    struct MockLocation {
        auth_tx: watch::Sender<AuthorizationStatus>,
        fix_tx: watch::Sender<Option<Coordinate>>,
    }

    impl MockLocation {
        fn new() -> Self {
            Self {
                auth_tx: watch::channel(AuthorizationStatus::NotDetermined).0,
                fix_tx: watch::channel(None).0,
            }
        }

        fn push_fix(&self, fix: Option<Coordinate>) {
            self.fix_tx.send_replace(fix);
        }

        fn deny(&self) {
            self.auth_tx.send_replace(AuthorizationStatus::Denied);
        }
    }

    #[async_trait]
    impl LocationProvider for MockLocation {
        fn authorization(&self) -> watch::Receiver<AuthorizationStatus> {
            self.auth_tx.subscribe()
        }

        fn fixes(&self) -> watch::Receiver<Option<Coordinate>> {
            self.fix_tx.subscribe()
        }

        async fn request_authorization(&self) {
            self.auth_tx.send_replace(AuthorizationStatus::Authorized);
        }

        async fn start_updates(&self) {}
        async fn stop_updates(&self) {}
    }

    struct MockRecorder {
        permission: AtomicBool,
        recording: AtomicBool,
        emit_clip: bool,
        last_clip: std::sync::Mutex<Option<PathBuf>>,
    }

    impl MockRecorder {
        fn new(permission: bool) -> Self {
            Self {
                permission: AtomicBool::new(permission),
                recording: AtomicBool::new(false),
                emit_clip: true,
                last_clip: std::sync::Mutex::new(None),
            }
        }

        fn silent() -> Self {
            Self {
                emit_clip: false,
                ..Self::new(true)
            }
        }
    }

    #[async_trait]
    impl ClipRecorder for MockRecorder {
        fn has_permission(&self) -> bool {
            self.permission.load(Ordering::SeqCst)
        }

        async fn request_permission(&self) -> bool {
            self.permission.load(Ordering::SeqCst)
        }

        async fn start(&self) -> Result<(), CaptureError> {
            if !self.has_permission() {
                return Err(CaptureError::PermissionDenied);
            }
            self.recording.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<Option<PathBuf>, CaptureError> {
            if !self.recording.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            if !self.emit_clip {
                return Ok(None);
            }
            let path =
                std::env::temp_dir().join(format!("geodrop-test-{}.flac", uuid::Uuid::new_v4()));
            std::fs::write(&path, b"not really flac").unwrap();
            *self.last_clip.lock().unwrap() = Some(path.clone());
            Ok(Some(path))
        }

        async fn cancel(&self) {
            self.recording.store(false, Ordering::SeqCst);
        }

        fn is_recording(&self) -> bool {
            self.recording.load(Ordering::SeqCst)
        }
    }

    /// Succeeds only when the clip file exists on disk
    struct MockPlayer {
        playing_tx: Arc<watch::Sender<bool>>,
    }

    impl MockPlayer {
        fn new() -> Self {
            Self {
                playing_tx: Arc::new(watch::channel(false).0),
            }
        }
    }

    #[async_trait]
    impl ClipPlayer for MockPlayer {
        async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
            if !path.exists() {
                return Err(PlaybackError::OpenFailed(path.display().to_string()));
            }
            self.playing_tx.send_replace(true);
            Ok(())
        }

        async fn stop(&self) {
            self.playing_tx.send_replace(false);
        }

        fn playing(&self) -> watch::Receiver<bool> {
            self.playing_tx.subscribe()
        }
    }

    fn here() -> Coordinate {
        Coordinate::new(37.3349, -122.00902)
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        location: Arc<MockLocation>,
        coordinator: DropCoordinator<Arc<MockLocation>, MockRecorder, MockPlayer, FsDropStore>,
        state_rx: watch::Receiver<ViewState>,
    }

    #[async_trait]
    impl LocationProvider for Arc<MockLocation> {
        fn authorization(&self) -> watch::Receiver<AuthorizationStatus> {
            (**self).authorization()
        }

        fn fixes(&self) -> watch::Receiver<Option<Coordinate>> {
            (**self).fixes()
        }

        async fn request_authorization(&self) {
            (**self).request_authorization().await
        }

        async fn start_updates(&self) {}
        async fn stop_updates(&self) {}
    }

    async fn fixture_with(recorder: MockRecorder) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDropStore::new(dir.path().join("drops")).await.unwrap();
        let location = Arc::new(MockLocation::new());
        let (coordinator, state_rx) = DropCoordinator::new(
            Arc::clone(&location),
            recorder,
            MockPlayer::new(),
            store,
            Region::default(),
        );
        Fixture {
            _dir: dir,
            location,
            coordinator,
            state_rx,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(MockRecorder::new(true)).await
    }

    impl Fixture {
        /// Mirror what the run loop does when a fix notification arrives
        fn feed_fix(&mut self, fix: Option<Coordinate>) {
            self.location.push_fix(fix);
            self.coordinator.on_fix_change(fix);
        }

        fn state(&self) -> ViewState {
            self.state_rx.borrow().clone()
        }
    }

    #[tokio::test]
    async fn toggle_twice_with_fix_creates_one_drop() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.set_draft_owner("Alice".to_string());
        f.coordinator.set_draft_notes("hi".to_string());

        f.coordinator.toggle_recording().await;
        assert!(f.state().is_recording);

        f.coordinator.toggle_recording().await;
        let state = f.state();
        assert!(!state.is_recording);
        assert_eq!(state.drops.len(), 1);
        assert_eq!(state.drops[0].owner, "Alice");
        assert_eq!(state.drops[0].notes, "hi");
        assert_eq!(state.drops[0].coordinate, here());
        assert_eq!(state.selected, Some(state.drops[0].id));
        assert_eq!(state.status, Status::dropped());
    }

    #[tokio::test]
    async fn drop_coordinate_is_fix_at_stop_time() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.toggle_recording().await;

        let moved = Coordinate::new(37.7749, -122.4194);
        f.feed_fix(Some(moved));

        f.coordinator.toggle_recording().await;
        let state = f.state();
        assert_eq!(state.drops.len(), 1);
        assert_eq!(state.drops[0].coordinate, moved);
    }

    #[tokio::test]
    async fn toggle_without_fix_refuses_to_start() {
        let mut f = fixture().await;
        f.coordinator.start().await;

        f.coordinator.toggle_recording().await;
        let state = f.state();
        assert!(!state.is_recording);
        assert_eq!(state.status, Status::waiting_for_location());
        assert!(state.drops.is_empty());
    }

    #[tokio::test]
    async fn losing_fix_before_stop_discards_clip() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.toggle_recording().await;
        f.feed_fix(None);
        f.coordinator.toggle_recording().await;

        let state = f.state();
        assert!(state.drops.is_empty());
        assert_eq!(state.status, Status::missing_location());

        // The temp clip must have been removed
        let clip = f
            .coordinator
            .recorder
            .last_clip
            .lock()
            .unwrap()
            .clone()
            .expect("mock produced a clip");
        assert!(!clip.exists(), "temp clip not removed: {:?}", clip);
    }

    #[tokio::test]
    async fn stop_without_clip_reports_recording_failure() {
        let mut f = fixture_with(MockRecorder::silent()).await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        let state = f.state();
        assert!(state.drops.is_empty());
        assert_eq!(state.status, Status::recording_failed());
    }

    #[tokio::test]
    async fn denied_microphone_blocks_recording() {
        let mut f = fixture_with(MockRecorder::new(false)).await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.toggle_recording().await;
        let state = f.state();
        assert!(!state.is_recording);
        assert_eq!(state.status, Status::microphone_denied());
    }

    #[tokio::test]
    async fn play_missing_file_keeps_selection() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        // Two drops; select the first, then try to play the second after
        // its audio file has been deleted out from under the store.
        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        let state = f.state();
        assert_eq!(state.drops.len(), 2);
        let first = state.drops[0].id;
        let second = state.drops[1].clone();

        f.coordinator.select(first);
        std::fs::remove_file(f.coordinator.store.clip_path(&second)).unwrap();

        f.coordinator.play(second.id).await;
        let state = f.state();
        assert_eq!(state.status, Status::playback_failed());
        assert_eq!(state.selected, Some(first));
    }

    #[tokio::test]
    async fn play_updates_selection_and_status() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));
        f.coordinator.set_draft_owner("Alice".to_string());

        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        let id = f.state().drops[0].id;
        f.coordinator.play(id).await;

        let state = f.state();
        assert_eq!(state.selected, Some(id));
        assert_eq!(state.status, Status::playing("Alice"));
    }

    #[tokio::test]
    async fn notes_draft_cleared_after_save_owner_kept() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));
        f.coordinator.set_draft_owner("  Alice  ".to_string());
        f.coordinator.set_draft_notes("  hi  ".to_string());

        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        let first = &f.state().drops[0];
        assert_eq!(first.owner, "Alice");
        assert_eq!(first.notes, "hi");

        // Second recording saves with an empty note but the same owner
        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        let state = f.state();
        assert_eq!(state.drops.len(), 2);
        assert_eq!(state.drops[0].owner, "Alice");
        assert_eq!(state.drops[0].notes, "");
    }

    #[tokio::test]
    async fn fix_recenters_region_unconditionally() {
        let mut f = fixture().await;
        f.coordinator.start().await;

        let target = Coordinate::new(51.5007, -0.1246);
        f.feed_fix(Some(target));

        let state = f.state();
        assert_eq!(state.region.center, target);
        assert_eq!(state.status, Status::listening_near(target));
    }

    #[tokio::test]
    async fn lost_fix_reports_search_status() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));
        f.feed_fix(None);

        assert_eq!(f.state().status, Status::searching_for_location());
    }

    #[tokio::test]
    async fn denied_authorization_sets_status() {
        let mut f = fixture().await;
        f.coordinator.start().await;

        f.location.deny();
        f.coordinator
            .on_authorization_change(AuthorizationStatus::Denied);

        let state = f.state();
        assert_eq!(state.status, Status::location_denied());
        assert_eq!(state.status.icon, StatusIcon::LocationOff);
    }

    #[tokio::test]
    async fn refresh_mirrors_store_collection() {
        let mut f = fixture().await;
        f.coordinator.start().await;
        f.feed_fix(Some(here()));

        f.coordinator.toggle_recording().await;
        f.coordinator.toggle_recording().await;

        f.coordinator.refresh().await;
        f.coordinator.refresh().await;
        assert_eq!(f.state().drops.len(), 1);
    }
}
