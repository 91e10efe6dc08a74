use core::fmt;
use std::any::Any;

use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionStrategy {
    Restart,
    Resume,
    Stop,
}

pub trait Actor: Send + Sync + 'static {
    /// Called when a handler on the actor panics. The return value represents the
    /// supervision strategy used to handle the panic.
    /// NOTE: If this method panics, the actor can not recover from the panic.
    #[allow(unused_variables)]
    fn on_fail(&mut self, error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Restart
    }
}

#[derive(Debug)]
pub enum ActorError {
    /// The actor is no longer running and its mailbox is closed.
    Stopped,
    /// The actor dropped the message without answering, e.g. because the
    /// handler panicked.
    NoResponse(oneshot::error::RecvError),
}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "actor stopped"),
            Self::NoResponse(why) => write!(f, "actor did not respond: {}", why),
        }
    }
}

impl std::error::Error for ActorError {}
