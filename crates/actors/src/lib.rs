use std::{any::Any, panic::AssertUnwindSafe};

use futures::FutureExt;
use tokio::sync::mpsc;

pub mod actor_ref;
pub mod handler;

pub use actor_ref::{ActorError, ActorRef};
pub use handler::{Handler, Message};

use handler::MessageHandler;

#[derive(Debug, Clone)]
pub enum SupervisionStrategy {
    Restart,
    Resume,
    Stop,
}

pub trait Actor: Send + Sync + 'static {
    /// Called when a handler on the actor panics. The return value decides
    /// how the actor continues.
    /// NOTE: If this method panics, the actor can not recover.
    #[allow(unused_variables)]
    fn on_panic(&mut self, error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Restart
    }
}

/// Creates and runs an actor with a bounded mailbox of the given capacity.
/// Senders await mailbox space, so a backlogged actor exerts backpressure
/// instead of growing an unbounded queue. If a handler panics, the actor is
/// restarted, resumed or stopped according to `Actor::on_panic()`.
pub fn spawn<A, F>(actor_factory: F, capacity: usize) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn() -> A,
{
    let (tx, mut rx) = mpsc::channel::<Box<dyn MessageHandler<A>>>(capacity);
    let mut actor = actor_factory();
    let actor_ref = ActorRef::new(tx);

    tokio::spawn(async move {
        while let Some(mut message) = rx.recv().await {
            let result = AssertUnwindSafe(message.handle(&mut actor))
                .catch_unwind()
                .await;
            if let Err(why) = result {
                log::error!("actor panicked: {:?}", why);
                match actor.on_panic(why) {
                    SupervisionStrategy::Restart => {
                        actor = actor_factory();
                    }
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => {
                        break;
                    }
                };
            }
        }
    });

    actor_ref
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Counter {
        count: i64,
    }

    impl Actor for Counter {}

    #[derive(Clone)]
    struct Add(i64);

    impl Message for Add {
        type Response = i64;
    }

    #[async_trait]
    impl Handler<Add> for Counter {
        async fn handle(&mut self, message: Add) -> i64 {
            self.count += message.0;
            self.count
        }
    }

    #[derive(Clone)]
    struct Explode;

    impl Message for Explode {
        type Response = ();
    }

    #[async_trait]
    impl Handler<Explode> for Counter {
        async fn handle(&mut self, _message: Explode) {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn messages_are_handled_in_order() {
        let counter = spawn(Counter::default, 8);
        counter.tell(Add(1)).await.unwrap();
        counter.tell(Add(2)).await.unwrap();
        assert_eq!(counter.ask(Add(3)).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn panicking_handler_restarts_the_actor() {
        let counter = spawn(Counter::default, 8);
        counter.tell(Add(5)).await.unwrap();
        counter.tell(Explode).await.unwrap();
        // restarted from the factory, so state is fresh
        assert_eq!(counter.ask(Add(1)).await.unwrap(), 1);
    }
}
