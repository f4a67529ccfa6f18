//! Bounded TLS session resumption store.
//!
//! Shared by every dial through one client config. Lookups and inserts from
//! concurrent handshakes serialize on a single mutex; when the store is full
//! the least-recently-used server entry is evicted.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use rustls::NamedGroup;
use rustls::client::{ClientSessionStore, Tls12ClientSessionValue, Tls13ClientSessionValue};
use rustls::pki_types::ServerName;

/// TLS 1.3 tickets kept per server (same bound rustls uses).
const MAX_TLS13_TICKETS_PER_SERVER: usize = 8;

#[derive(Default)]
struct ServerEntry {
    kx_hint: Option<NamedGroup>,
    tls12: Option<Tls12ClientSessionValue>,
    tls13: VecDeque<Tls13ClientSessionValue>,
}

/// LRU implementation of [`ClientSessionStore`] keyed by server name.
pub struct LruSessionStore {
    /// `None` when caching is disabled.
    cache: Option<Mutex<LruCache<ServerName<'static>, ServerEntry>>>,
}

impl LruSessionStore {
    /// A store holding at most `capacity` servers. `0` disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Number of servers currently cached.
    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` has an entry. Does not count as a use.
    pub fn contains(&self, name: &ServerName<'_>) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|c| c.lock().peek(&name.to_owned()).is_some())
    }

    /// Run `f` on the entry for `name`, creating it (and evicting the LRU
    /// entry at capacity) if absent.
    fn upsert<F>(&self, name: ServerName<'static>, f: F)
    where
        F: FnOnce(&mut ServerEntry),
    {
        if let Some(cache) = &self.cache {
            f(cache.lock().get_or_insert_mut(name, ServerEntry::default));
        }
    }

    /// Run `f` on the entry for `name`, marking it used; `None` if absent.
    fn lookup<T, F>(&self, name: &ServerName<'_>, f: F) -> Option<T>
    where
        F: FnOnce(&mut ServerEntry) -> Option<T>,
    {
        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock();
        cache.get_mut(&name.to_owned()).and_then(f)
    }
}

impl fmt::Debug for LruSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let capacity = self.cache.as_ref().map_or(0, |c| c.lock().cap().get());
        f.debug_struct("LruSessionStore")
            .field("capacity", &capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl ClientSessionStore for LruSessionStore {
    fn set_kx_hint(&self, server_name: ServerName<'static>, group: NamedGroup) {
        self.upsert(server_name, |e| e.kx_hint = Some(group));
    }

    fn kx_hint(&self, server_name: &ServerName<'_>) -> Option<NamedGroup> {
        self.lookup(server_name, |e| e.kx_hint)
    }

    fn set_tls12_session(&self, server_name: ServerName<'static>, value: Tls12ClientSessionValue) {
        self.upsert(server_name, |e| e.tls12 = Some(value));
    }

    fn tls12_session(&self, server_name: &ServerName<'_>) -> Option<Tls12ClientSessionValue> {
        self.lookup(server_name, |e| e.tls12.clone())
    }

    fn remove_tls12_session(&self, server_name: &ServerName<'static>) {
        if let Some(cache) = &self.cache
            && let Some(entry) = cache.lock().peek_mut(server_name)
        {
            entry.tls12 = None;
        }
    }

    fn insert_tls13_ticket(
        &self,
        server_name: ServerName<'static>,
        value: Tls13ClientSessionValue,
    ) {
        self.upsert(server_name, |e| {
            if e.tls13.len() == MAX_TLS13_TICKETS_PER_SERVER {
                e.tls13.pop_front();
            }
            e.tls13.push_back(value);
        });
    }

    fn take_tls13_ticket(
        &self,
        server_name: &ServerName<'static>,
    ) -> Option<Tls13ClientSessionValue> {
        self.lookup(server_name, |e| e.tls13.pop_back())
    }
}
