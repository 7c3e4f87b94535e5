//! Cells the engine publishes for display code.

use crate::engine::ConnectionState;
use crate::observable::{Observable, Subscription};

use models::Address;

/// Everything the outside world can observe about a session.
///
/// Cloning yields handles onto the same cells.
#[derive(Debug, Clone, Default)]
pub struct ApplicationState {
    /// Connected wallet, if any.
    pub wallet: Observable<Option<Address>>,
    /// Energy from the latest profile update.
    pub energy: Observable<i64>,
    /// Token balance, published by the balance lookup after wallet bootstrap.
    pub balance: Observable<u128>,
    pub connection: Observable<ConnectionState>,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` each time the connection becomes ready.
    ///
    /// Unlike a plain subscription, registering while already ready does not fire.
    pub fn on_ready<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.connection.subscribe_changes(move |state| {
            if *state == ConnectionState::Ready {
                callback();
            }
        })
    }
}
