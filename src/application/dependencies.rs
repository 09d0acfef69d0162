use std::sync::Arc;

use crate::config::SchedulingConfig;
use crate::ports::{DeletionListener, PasswordVerifier, Store};

/// Service dependencies
///
/// Plain data handed to every service function; services own no state of
/// their own.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Arc<dyn Store>,
    pub password_verifier: Arc<dyn PasswordVerifier>,
    /// Consulted in order before an account is deleted
    pub deletion_listeners: Vec<Arc<dyn DeletionListener>>,
    pub config: SchedulingConfig,
}
