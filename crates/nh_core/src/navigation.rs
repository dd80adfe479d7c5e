use tokio::sync::broadcast;

pub const HOME_PATH: &str = "/home";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    NavigationCompleted { path: String },
}

impl NavigationEvent {
    pub fn path(&self) -> &str {
        match self {
            NavigationEvent::NavigationCompleted { path } => path,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate_to(&self, path: &str);

    /// Every completed navigation, including history moves
    fn subscribe(&self) -> broadcast::Receiver<NavigationEvent>;
}
