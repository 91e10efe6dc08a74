use tokio::sync::mpsc;

use crate::{actor::ActorError, handler::MessageHandler, Actor};

pub type Envelope<A> = Box<dyn MessageHandler<A>>;

/// Sending half of an actor's mailbox.
///
/// Mailboxes are unbounded: posting never waits, so a slow actor never
/// stalls the sender or other actors fed by the same sender. The order of
/// successful posts is the order in which the actor receives them.
pub struct Mailbox<A: Actor>(mpsc::UnboundedSender<Envelope<A>>);

impl<A: Actor> Clone for Mailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Mailbox<A> {
    pub fn post<M>(&self, message: M) -> Result<(), ActorError>
    where
        M: MessageHandler<A> + 'static,
    {
        self.0
            .send(Box::new(message))
            .map_err(|_| ActorError::Stopped)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

pub struct MailboxReceiver<A: Actor>(mpsc::UnboundedReceiver<Envelope<A>>);

impl<A: Actor> MailboxReceiver<A> {
    pub async fn recv(&mut self) -> Option<Envelope<A>> {
        self.0.recv().await
    }
}

pub fn mailbox<A: Actor>() -> (Mailbox<A>, MailboxReceiver<A>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Mailbox(tx), MailboxReceiver(rx))
}
