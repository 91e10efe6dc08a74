//! Actors partitioned by key.
//!
//! A [`Registry`] runs at most one actor per key and spawns it on the first
//! message for that key. All messages for a key go through that actor's
//! mailbox and are handled one after another, while actors for different keys
//! run independently of each other.
//!
//! An actor is removed from the registry once a completed request asked for
//! it to be retired and no other request for its key is in flight. Removing
//! it drops the last [`ActorRef`], so the actor stops after its (empty)
//! mailbox; a later message for the key spawns a fresh actor.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    actor::{Actor, ActorError},
    actor_ref::{ActorRef, Pending},
    handler::{Handler, Message},
    run,
};

pub trait RegistryKey: Eq + Hash + Clone + Send + Sync + 'static {}

impl<K> RegistryKey for K where K: Eq + Hash + Clone + Send + Sync + 'static {}

struct Entry<A: Actor> {
    actor: ActorRef<A>,
    generation: u64,
    in_flight: usize,
    retire: bool,
}

struct State<K, A: Actor> {
    actors: HashMap<K, Entry<A>>,
    next_generation: u64,
}

type Factory<K, A> = Arc<dyn Fn(&K) -> A + Send + Sync>;

pub struct Registry<K: RegistryKey, A: Actor> {
    state: Arc<Mutex<State<K, A>>>,
    factory: Factory<K, A>,
}

impl<K: RegistryKey, A: Actor> Clone for Registry<K, A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<K: RegistryKey, A: Actor> Registry<K, A> {
    /// `factory` builds the actor for a key, both on first use and whenever
    /// the actor's supervision strategy restarts it.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&K) -> A + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(State {
                actors: HashMap::new(),
                next_generation: 0,
            })),
            factory: Arc::new(factory),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<K, A>> {
        // the guarded map stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn(&self, key: &K) -> ActorRef<A> {
        let factory = self.factory.clone();
        let key = key.clone();
        run(move || factory(&key))
    }

    /// Enqueues `message` with the actor for `key` before returning, so
    /// requests for the same key are handled in the order of the calls.
    pub fn ask<M>(
        &self,
        key: &K,
        message: M,
    ) -> Result<Request<K, A, M::Response>, ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let mut state = self.lock();
        let needs_actor = state
            .actors
            .get(key)
            .map_or(true, |entry| entry.actor.is_closed());
        if needs_actor {
            let generation = state.next_generation;
            state.next_generation += 1;
            let actor = self.spawn(key);
            state.actors.insert(
                key.clone(),
                Entry {
                    actor,
                    generation,
                    in_flight: 0,
                    retire: false,
                },
            );
        }
        let entry = state.actors.get_mut(key).ok_or(ActorError::Stopped)?;

        let pending = entry.actor.ask(message)?;
        entry.in_flight += 1;
        entry.retire = false;

        Ok(Request {
            pending,
            lease: Lease {
                registry: self.clone(),
                key: key.clone(),
                generation: entry.generation,
                retire: false,
            },
        })
    }

    fn release(&self, key: &K, generation: u64, retire: bool) {
        let mut state = self.lock();
        let Some(entry) = state.actors.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            return;
        }
        entry.in_flight = entry.in_flight.saturating_sub(1);
        entry.retire |= retire;
        if entry.in_flight == 0 && entry.retire {
            state.actors.remove(key);
        }
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.lock().actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().actors.contains_key(key)
    }
}

/// Keeps a request counted as in flight until it is dropped.
struct Lease<K: RegistryKey, A: Actor> {
    registry: Registry<K, A>,
    key: K,
    generation: u64,
    retire: bool,
}

impl<K: RegistryKey, A: Actor> Drop for Lease<K, A> {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.generation, self.retire);
    }
}

/// A message enqueued through [`Registry::ask`].
pub struct Request<K: RegistryKey, A: Actor, R> {
    pending: Pending<R>,
    lease: Lease<K, A>,
}

impl<K: RegistryKey, A: Actor, R> Request<K, A, R> {
    /// Waits for the answer. `retire` decides from the answer whether the
    /// key's actor is no longer needed.
    pub async fn complete<F>(self, retire: F) -> Result<R, ActorError>
    where
        F: FnOnce(&Result<R, ActorError>) -> bool,
    {
        let Request { pending, mut lease } = self;
        let result = pending.response().await;
        lease.retire = retire(&result);
        result
    }
}
