use std::fmt;

use tokio::sync::{mpsc, oneshot};

use crate::{
    handler::{Envelope, Handler, Message, MessageHandler},
    Actor,
};

/// Sending to or receiving from an actor failed, which means the actor
/// has stopped (or dropped the response).
pub enum ActorError {
    MailboxClosed,
    ResponseDropped(oneshot::error::RecvError),
}

impl fmt::Debug for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MailboxClosed => write!(f, "MailboxClosed"),
            Self::ResponseDropped(why) => write!(f, "ResponseDropped: {:?}", why),
        }
    }
}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MailboxClosed => write!(f, "actor mailbox is closed"),
            Self::ResponseDropped(_) => {
                write!(f, "actor dropped the response channel")
            }
        }
    }
}

impl std::error::Error for ActorError {}

pub struct ActorRef<A: Actor> {
    sender: mpsc::Sender<Box<dyn MessageHandler<A>>>,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    pub(crate) fn new(sender: mpsc::Sender<Box<dyn MessageHandler<A>>>) -> Self {
        Self { sender }
    }

    /// Fire-and-forget send. Awaits mailbox capacity.
    pub async fn tell<M>(&self, msg: M) -> Result<(), ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let envelope = Envelope::<M, A>::new(msg, None);
        self.sender
            .send(Box::new(envelope))
            .await
            .map_err(|_| ActorError::MailboxClosed)
    }

    /// Send and await the handler's response.
    pub async fn ask<M>(&self, msg: M) -> Result<M::Response, ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let (response_tx, response_rx) = oneshot::channel();
        let envelope = Envelope::<M, A>::new(msg, Some(response_tx));
        self.sender
            .send(Box::new(envelope))
            .await
            .map_err(|_| ActorError::MailboxClosed)?;
        response_rx.await.map_err(ActorError::ResponseDropped)
    }
}
