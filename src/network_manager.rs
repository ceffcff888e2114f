//! NetworkManager D-Bus integration for the unmetered-network condition
//!
//! Reads the global `Metered` property of NetworkManager on the system bus.
//! Works natively and in Flatpak (with system bus access to NetworkManager).

use tracing::{debug, info, warn};

const NM_SERVICE: &str = "org.freedesktop.NetworkManager";
const NM_PATH: &str = "/org/freedesktop/NetworkManager";

/// NetworkManager `NMMetered` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeteredState {
    Unknown,
    Yes,
    No,
    GuessYes,
    GuessNo,
}

impl MeteredState {
    pub fn from_raw(value: u32) -> Self {
        match value {
            1 => MeteredState::Yes,
            2 => MeteredState::No,
            3 => MeteredState::GuessYes,
            4 => MeteredState::GuessNo,
            _ => MeteredState::Unknown,
        }
    }

    /// Only a definite or guessed "no" counts as unmetered
    pub fn is_unmetered(&self) -> bool {
        matches!(self, MeteredState::No | MeteredState::GuessNo)
    }
}

/// Query the current metered state
pub async fn metered_state() -> Result<MeteredState, String> {
    let connection = zbus::Connection::system()
        .await
        .map_err(|e| format!("Failed to connect to system D-Bus: {}", e))?;

    let nm_proxy = zbus::Proxy::new(&connection, NM_SERVICE, NM_PATH, NM_SERVICE)
        .await
        .map_err(|e| format!("Failed to create NetworkManager proxy: {}", e))?;

    let raw: u32 = nm_proxy
        .get_property("Metered")
        .await
        .map_err(|e| format!("Failed to read Metered property: {}", e))?;

    let state = MeteredState::from_raw(raw);
    debug!(raw, ?state, "NetworkManager metered state");
    Ok(state)
}

/// Whether the active connection is unmetered
///
/// An unreachable NetworkManager counts as metered.
pub async fn is_unmetered() -> bool {
    match metered_state().await {
        Ok(state) => {
            info!(?state, unmetered = state.is_unmetered(), "Checked network metering");
            state.is_unmetered()
        }
        Err(e) => {
            warn!(error = %e, "Could not determine metered state, assuming metered");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metered_mapping() {
        assert_eq!(MeteredState::from_raw(0), MeteredState::Unknown);
        assert_eq!(MeteredState::from_raw(1), MeteredState::Yes);
        assert_eq!(MeteredState::from_raw(2), MeteredState::No);
        assert_eq!(MeteredState::from_raw(3), MeteredState::GuessYes);
        assert_eq!(MeteredState::from_raw(4), MeteredState::GuessNo);
        assert_eq!(MeteredState::from_raw(42), MeteredState::Unknown);
    }

    #[test]
    fn test_only_no_and_guess_no_are_unmetered() {
        let unmetered: Vec<u32> = (0..=5)
            .filter(|raw| MeteredState::from_raw(*raw).is_unmetered())
            .collect();
        assert_eq!(unmetered, vec![2, 4]);
    }
}
