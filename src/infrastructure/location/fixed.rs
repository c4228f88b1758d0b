//! Fixed-position location provider
//!
//! Desktop machines have no GPS, so the position comes from configuration
//! (or CLI flags) instead of hardware. Authorization still follows the
//! full state machine: a disabled provider reports Denied, an enabled one
//! resolves the prompt as granted and starts publishing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::application::ports::{AuthorizationStatus, LocationProvider};
use crate::domain::geo::{Coordinate, DistanceFilter, MIN_FIX_DISTANCE_M};

/// Location provider fed by a configured coordinate
pub struct FixedLocationProvider {
    position: std::sync::Mutex<Option<Coordinate>>,
    enabled: bool,
    updating: AtomicBool,
    filter: std::sync::Mutex<DistanceFilter>,
    auth_tx: watch::Sender<AuthorizationStatus>,
    fix_tx: watch::Sender<Option<Coordinate>>,
}

impl FixedLocationProvider {
    pub fn new(position: Option<Coordinate>, enabled: bool) -> Self {
        let (auth_tx, _) = watch::channel(AuthorizationStatus::NotDetermined);
        let (fix_tx, _) = watch::channel(None);
        Self {
            position: std::sync::Mutex::new(position),
            enabled,
            updating: AtomicBool::new(false),
            filter: std::sync::Mutex::new(DistanceFilter::new(MIN_FIX_DISTANCE_M)),
            auth_tx,
            fix_tx,
        }
    }

    /// Change the configured position. Published only while updating, and
    /// only when it clears the minimum-movement filter.
    pub fn move_to(&self, coordinate: Coordinate) {
        *self.position.lock().unwrap() = Some(coordinate);
        if self.updating.load(Ordering::SeqCst) {
            self.publish(coordinate);
        }
    }

    fn publish(&self, coordinate: Coordinate) {
        let accepted = self.filter.lock().unwrap().accept(coordinate);
        if accepted {
            tracing::debug!(%coordinate, "location fix");
            self.fix_tx.send_replace(Some(coordinate));
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    fn authorization(&self) -> watch::Receiver<AuthorizationStatus> {
        self.auth_tx.subscribe()
    }

    fn fixes(&self) -> watch::Receiver<Option<Coordinate>> {
        self.fix_tx.subscribe()
    }

    async fn request_authorization(&self) {
        if !self.enabled {
            self.auth_tx.send_replace(AuthorizationStatus::Denied);
            return;
        }

        let status = *self.auth_tx.borrow();
        match status {
            AuthorizationStatus::NotDetermined => {
                // No OS prompt to show; an enabled provider is a grant
                self.auth_tx.send_replace(AuthorizationStatus::Authorized);
                self.start_updates().await;
            }
            AuthorizationStatus::Authorized => self.start_updates().await,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {}
        }
    }

    async fn start_updates(&self) {
        if !self.auth_tx.borrow().is_authorized() {
            return;
        }
        if self.updating.swap(true, Ordering::SeqCst) {
            return;
        }
        let position = *self.position.lock().unwrap();
        if let Some(coordinate) = position {
            self.publish(coordinate);
        }
    }

    async fn stop_updates(&self) {
        self.updating.store(false, Ordering::SeqCst);
    }
}
