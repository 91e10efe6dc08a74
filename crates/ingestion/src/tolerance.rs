use std::sync::Arc;

use log::info;
use reduction::Tolerance;
use tokio::sync::watch;

/// The route tolerance shared between the admin API and running workers.
///
/// A reduction reads the tolerance once when it starts, so a change applies
/// to every reduction started after [`ToleranceControl::set`] returns and
/// never to one already running.
#[derive(Debug, Clone)]
pub struct ToleranceControl {
    sender: Arc<watch::Sender<Tolerance>>,
}

impl ToleranceControl {
    pub fn new(initial: Tolerance) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> Tolerance {
        *self.sender.borrow()
    }

    /// Replaces the tolerance and returns the previous one.
    pub fn set(&self, tolerance: Tolerance) -> Tolerance {
        let previous = self.sender.send_replace(tolerance);
        info!("Route tolerance changed from {} to {}.", previous, tolerance);
        previous
    }

    pub fn subscribe(&self) -> watch::Receiver<Tolerance> {
        self.sender.subscribe()
    }
}

impl Default for ToleranceControl {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_updates() {
        let control = ToleranceControl::default();
        let receiver = control.subscribe();
        assert_eq!(*receiver.borrow(), Tolerance::DEFAULT);

        let previous = control.set(Tolerance::new(0.5).unwrap());

        assert_eq!(previous, Tolerance::DEFAULT);
        assert_eq!(control.get().value(), 0.5);
        assert_eq!(receiver.borrow().value(), 0.5);
    }
}
