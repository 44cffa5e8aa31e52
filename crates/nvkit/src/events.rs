use crossbeam_channel::{Receiver, Sender, unbounded};

use nvkit_backend::VersionIdentifier;

/// Emitted after dispatcher operations that change what the presentation
/// layer should display. Hosts re-render their version trees on receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// The cached lists were re-fetched.
    Refreshed,
    Installed(VersionIdentifier),
    SwitchedTo(VersionIdentifier),
    Removed(VersionIdentifier),
}

/// Fan-out of refresh events to any number of subscribers. Subscribers that
/// dropped their receiver are pruned on the next emit.
#[derive(Debug, Default)]
pub(crate) struct RefreshHub {
    subscribers: Vec<Sender<RefreshEvent>>,
}

impl RefreshHub {
    pub(crate) fn subscribe(&mut self) -> Receiver<RefreshEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: &RefreshEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_emitted_events() {
        let mut hub = RefreshHub::default();
        let first = hub.subscribe();
        let second = hub.subscribe();

        hub.emit(&RefreshEvent::Refreshed);

        assert_eq!(first.try_recv(), Ok(RefreshEvent::Refreshed));
        assert_eq!(second.try_recv(), Ok(RefreshEvent::Refreshed));
    }

    #[test]
    fn events_carry_the_version() {
        let mut hub = RefreshHub::default();
        let rx = hub.subscribe();

        hub.emit(&RefreshEvent::Installed(VersionIdentifier::new("v20.11.0")));

        assert_eq!(
            rx.try_recv(),
            Ok(RefreshEvent::Installed(VersionIdentifier::new("v20.11.0")))
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut hub = RefreshHub::default();
        let keep = hub.subscribe();
        drop(hub.subscribe());

        hub.emit(&RefreshEvent::Refreshed);
        hub.emit(&RefreshEvent::Refreshed);

        assert_eq!(hub.subscribers.len(), 1);
        assert_eq!(keep.try_recv(), Ok(RefreshEvent::Refreshed));
    }
}
