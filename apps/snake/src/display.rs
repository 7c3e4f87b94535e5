//! Console rendering of the client's observable state.
//!
//! The snake client has no UI of its own; it reports wallet, energy, balance and
//! connection changes through the log as the engine publishes them.

use game_core::app_state::ApplicationState;
use game_core::engine::ConnectionState;
use game_core::observable::Subscription;

use models::Address;

use log::info;

/// Live subscriptions on an [`ApplicationState`].
#[derive(Debug)]
pub struct StatusDisplay {
    state: ApplicationState,
    wallet: Subscription,
    energy: Subscription,
    balance: Subscription,
    connection: Subscription,
}

impl StatusDisplay {
    /// Subscribe to every cell. Current values are rendered immediately.
    pub fn attach(state: &ApplicationState) -> Self {
        let wallet = state.wallet.subscribe(|wallet| {
            if let Some(line) = wallet_line(wallet.as_ref()) {
                info!("{line}");
            }
        });
        let energy = state.energy.subscribe(|energy| {
            if let Some(line) = energy_line(*energy) {
                info!("{line}");
            }
        });
        let balance = state.balance.subscribe(|balance| {
            if let Some(line) = balance_line(*balance) {
                info!("{line}");
            }
        });
        let connection = state
            .connection
            .subscribe(|connection| info!("{}", connection_line(*connection)));

        Self {
            state: state.clone(),
            wallet,
            energy,
            balance,
            connection,
        }
    }

    /// Stop rendering.
    pub fn detach(self) {
        self.state.wallet.unsubscribe(self.wallet);
        self.state.energy.unsubscribe(self.energy);
        self.state.balance.unsubscribe(self.balance);
        self.state.connection.unsubscribe(self.connection);
    }
}

/// `Wallet: 0x529...9EE7`, or nothing before a wallet is known.
pub fn wallet_line(wallet: Option<&Address>) -> Option<String> {
    wallet.map(|address| format!("Wallet: {}", address.short()))
}

pub fn energy_line(energy: i64) -> Option<String> {
    (energy != 0).then(|| format!("Energy: {energy}"))
}

pub fn balance_line(balance: u128) -> Option<String> {
    (balance != 0).then(|| format!("Balance: {balance}"))
}

pub fn connection_line(connection: ConnectionState) -> String {
    format!("Connection: {connection}")
}
