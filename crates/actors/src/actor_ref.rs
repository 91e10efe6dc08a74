use tokio::sync::oneshot;

use crate::{
    actor::{Actor, ActorError},
    handler::{ActorMessage, Handler, Message},
    mailbox::Mailbox,
};

pub struct ActorRef<A: Actor> {
    sender: Mailbox<A>,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    pub(crate) fn new(sender: Mailbox<A>) -> Self {
        Self { sender }
    }

    pub fn tell<M>(&self, msg: M) -> Result<(), ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let message = ActorMessage::<M, A>::new(msg, None);
        self.sender.post(message)
    }

    /// Enqueues `msg` right away; the answer is awaited through the returned
    /// [`Pending`].
    pub fn ask<M>(&self, msg: M) -> Result<Pending<M::Response>, ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let (response_tx, response_rx) = oneshot::channel();
        let message = ActorMessage::<M, A>::new(msg, Some(response_tx));
        self.sender.post(message)?;
        Ok(Pending(response_rx))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The outstanding answer to an [`ActorRef::ask`].
pub struct Pending<R>(oneshot::Receiver<R>);

impl<R> Pending<R> {
    pub async fn response(self) -> Result<R, ActorError> {
        self.0.await.map_err(ActorError::NoResponse)
    }
}
