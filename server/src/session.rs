//! Roster of connected players and symbol assignment
//!
//! The registry holds at most two participants in fixed slots keyed by
//! connection id: slot 0 plays X, slot 1 plays O. Admission takes the
//! first free slot, so the first player in gets X and the second O, and
//! removal by id is a two-slot scan.

use log::info;
use shared::Symbol;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Maximum number of concurrent players in a match.
pub const MAX_PLAYERS: usize = 2;

/// A connected player: their fixed symbol plus the queue feeding the
/// connection's writer task. Participants never hold board data.
#[derive(Debug)]
pub struct Participant {
    pub id: u64,
    pub symbol: Symbol,
    pub sender: mpsc::UnboundedSender<Message>,
}

/// Fixed-capacity roster for one match.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: [Option<Participant>; MAX_PLAYERS],
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            slots: [None, None],
        }
    }

    /// Admits a connection into the first free slot, assigning that
    /// slot's symbol. Returns `None` when the match is full; the roster
    /// is left untouched in that case.
    pub fn admit(&mut self, id: u64, sender: mpsc::UnboundedSender<Message>) -> Option<Symbol> {
        let slot = self.slots.iter().position(|s| s.is_none())?;
        let symbol = if slot == 0 { Symbol::X } else { Symbol::O };

        info!("Connection {} admitted as {}", id, symbol);
        self.slots[slot] = Some(Participant { id, symbol, sender });
        Some(symbol)
    }

    /// Frees the slot held by `id`, returning the vacated symbol.
    /// The other participant keeps their slot and symbol.
    pub fn remove(&mut self, id: u64) -> Option<Symbol> {
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|p| p.id == id) {
                let participant = slot.take()?;
                info!(
                    "Connection {} ({}) removed from roster",
                    participant.id, participant.symbol
                );
                return Some(participant.symbol);
            }
        }
        None
    }

    pub fn participant(&self, id: u64) -> Option<&Participant> {
        self.slots
            .iter()
            .flatten()
            .find(|participant| participant.id == id)
    }

    /// Occupied slots in symbol order (X first).
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_PLAYERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sender() -> mpsc::UnboundedSender<Message> {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_full());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_admission_order_assigns_symbols() {
        let mut registry = SessionRegistry::new();

        assert_eq!(registry.admit(10, test_sender()), Some(Symbol::X));
        assert_eq!(registry.admit(11, test_sender()), Some(Symbol::O));
        assert!(registry.is_full());
    }

    #[test]
    fn test_third_connection_rejected() {
        let mut registry = SessionRegistry::new();
        registry.admit(1, test_sender()).unwrap();
        registry.admit(2, test_sender()).unwrap();

        assert_eq!(registry.admit(3, test_sender()), None);
        assert_eq!(registry.len(), 2);
        assert!(registry.participant(3).is_none());
    }

    #[test]
    fn test_remove_frees_only_that_slot() {
        let mut registry = SessionRegistry::new();
        registry.admit(1, test_sender()).unwrap();
        registry.admit(2, test_sender()).unwrap();

        assert_eq!(registry.remove(1), Some(Symbol::X));

        assert_eq!(registry.len(), 1);
        assert!(registry.participant(1).is_none());
        assert_eq!(registry.participant(2).unwrap().symbol, Symbol::O);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut registry = SessionRegistry::new();
        registry.admit(1, test_sender()).unwrap();

        assert_eq!(registry.remove(99), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_vacated_slot_is_reassigned() {
        let mut registry = SessionRegistry::new();
        registry.admit(1, test_sender()).unwrap();
        registry.admit(2, test_sender()).unwrap();
        registry.remove(1);

        // The freed X slot goes to the next admission.
        assert_eq!(registry.admit(3, test_sender()), Some(Symbol::X));
        assert!(registry.is_full());
    }

    #[test]
    fn test_participants_iterates_in_symbol_order() {
        let mut registry = SessionRegistry::new();
        registry.admit(7, test_sender()).unwrap();
        registry.admit(8, test_sender()).unwrap();

        let symbols: Vec<Symbol> = registry.participants().map(|p| p.symbol).collect();
        assert_eq!(symbols, vec![Symbol::X, Symbol::O]);
    }
}
