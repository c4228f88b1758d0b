//! Location port interface

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::geo::Coordinate;

/// Authorization state of the location capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    /// The user has not yet been asked
    #[default]
    NotDetermined,
    /// Access granted; updates may flow
    Authorized,
    /// The user refused access
    Denied,
    /// Access blocked by policy rather than the user
    Restricted,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }
}

/// Port for the location capability.
///
/// Exposes authorization state and the most recent fix as observable
/// values; no history, no smoothing. Providers apply the minimum-movement
/// filter before publishing, so subscribers only see meaningful changes.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Subscribe to authorization changes
    fn authorization(&self) -> watch::Receiver<AuthorizationStatus>;

    /// Subscribe to location fixes (None until the first fix arrives)
    fn fixes(&self) -> watch::Receiver<Option<Coordinate>>;

    /// Request authorization. Idempotent:
    /// - services disabled: publishes Denied and does nothing else
    /// - NotDetermined: resolves the prompt and, if granted, starts updates
    /// - Authorized: starts updates
    /// - Denied/Restricted: no prompt, status stays
    async fn request_authorization(&self);

    /// Begin publishing fixes (no-op unless authorized)
    async fn start_updates(&self);

    /// Stop publishing fixes
    async fn stop_updates(&self);
}
