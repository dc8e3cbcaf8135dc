//! Destroy notification for scene objects.
//!
//! A [`DestroySignal`] records who wants to hear about an object going away.
//! Listeners are plain tokens, not callbacks: the owner of the object drains
//! the tokens with [`DestroySignal::emit`] and routes each one to whatever
//! registered it. Holding a token never keeps the object alive.

/// Ordered set of listener tokens waiting for a destroy notification.
#[derive(Debug)]
pub struct DestroySignal<L> {
    listeners: Vec<L>,
}

impl<L: Copy + PartialEq> DestroySignal<L> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Subscribe `listener`. Adding the same token twice is a no-op.
    pub fn add(&mut self, listener: L) {
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    /// Unsubscribe `listener`. Returns false if it was not subscribed.
    pub fn remove(&mut self, listener: L) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| *l != listener);
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: L) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot of the listeners in subscription order.
    ///
    /// The snapshot lets each listener unsubscribe itself while the caller
    /// walks the list.
    pub fn emit(&self) -> Vec<L> {
        self.listeners.clone()
    }
}

impl<L: Copy + PartialEq> Default for DestroySignal<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let mut signal = DestroySignal::new();
        signal.add(3u32);
        signal.add(1);
        signal.add(3);
        assert_eq!(signal.emit(), vec![3, 1]);
    }

    #[test]
    fn test_remove() {
        let mut signal = DestroySignal::new();
        signal.add(7u32);
        assert!(signal.remove(7));
        assert!(!signal.remove(7));
        assert!(signal.is_empty());
    }

    #[test]
    fn test_emit_snapshot_survives_removal() {
        let mut signal = DestroySignal::new();
        signal.add(1u32);
        signal.add(2);

        let mut seen = Vec::new();
        for listener in signal.emit() {
            signal.remove(listener);
            seen.push(listener);
        }

        assert_eq!(seen, vec![1, 2]);
        assert!(signal.is_empty());
    }
}
