use nh_core::{NavigationEvent, Navigator};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
}

/// Browser-style history stack. Every move, including `back` and `forward`,
/// ends with a `NavigationCompleted` event.
#[derive(Debug)]
pub struct HistoryRouter {
    history: Mutex<History>,
    events: broadcast::Sender<NavigationEvent>,
}

impl HistoryRouter {
    pub fn new(initial_path: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            history: Mutex::new(History {
                entries: vec![initial_path.to_string()],
                index: 0,
            }),
            events,
        }
    }

    /// Returns false when there is no earlier entry.
    pub fn back(&self) -> bool {
        let path = {
            let mut history = self.lock();
            if history.index == 0 {
                return false;
            }
            history.index -= 1;
            history.entries[history.index].clone()
        };
        self.complete(path);
        true
    }

    pub fn forward(&self) -> bool {
        let path = {
            let mut history = self.lock();
            if history.index + 1 >= history.entries.len() {
                return false;
            }
            history.index += 1;
            history.entries[history.index].clone()
        };
        self.complete(path);
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    fn complete(&self, path: String) {
        debug!("Navigation completed: {}", path);
        // No subscribers is fine
        let _ = self.events.send(NavigationEvent::NavigationCompleted { path });
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for HistoryRouter {
    fn current_path(&self) -> String {
        let history = self.lock();
        history.entries[history.index].clone()
    }

    fn navigate_to(&self, path: &str) {
        {
            let mut history = self.lock();
            let next = history.index + 1;
            history.entries.truncate(next);
            history.entries.push(path.to_string());
            history.index = next;
        }
        self.complete(path.to_string());
    }

    fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_and_forward() {
        let router = HistoryRouter::new("/home");
        router.navigate_to("/news/a");
        router.navigate_to("/news/b");

        assert!(router.back());
        assert_eq!(router.current_path(), "/news/a");
        assert!(router.back());
        assert!(!router.back());
        assert_eq!(router.current_path(), "/home");

        assert!(router.forward());
        assert_eq!(router.current_path(), "/news/a");
    }

    #[test]
    fn test_navigate_drops_forward_entries() {
        let router = HistoryRouter::new("/home");
        router.navigate_to("/news/a");
        router.back();
        router.navigate_to("/news/c");

        assert_eq!(router.entries(), vec!["/home", "/news/c"]);
        assert!(!router.forward());
    }

    #[test]
    fn test_emits_completion_events() {
        let router = HistoryRouter::new("/");
        let mut events = router.subscribe();

        router.navigate_to("/home");
        router.back();

        assert_eq!(events.try_recv().unwrap().path(), "/home");
        assert_eq!(events.try_recv().unwrap().path(), "/");
        assert!(events.try_recv().is_err());
    }
}
