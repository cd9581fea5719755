use super::{Factory, Memoized, Memoizer};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

#[cfg(feature = "ahash")]
use ahash::AHashMap as HashMap;
#[cfg(not(feature = "ahash"))]
use std::collections::HashMap;

// Configuration constants
const DEFAULT_CAPACITY: usize = 1000;
const CAPACITY_OVERHEAD_FACTOR: f64 = 1.3;
// Registries smaller than this grow quietly
const GROWTH_LOG_THRESHOLD: usize = 1024;

/// Memoizer keyed by a projection of the input
///
/// Inputs that project to equal keys share one stored value. Only the first
/// input seen for a key reaches the factory; later inputs with the same key
/// are dropped even when their other fields differ.
///
/// The registry never evicts. Every distinct key seen stays for the lifetime
/// of the memoized function.
///
/// # Example
///
/// ```
/// use keythrottle::{Factory, KeyMemoizer, Memoized, Memoizer};
///
/// // Key requests by user id, ignoring the payload
/// let by_user = KeyMemoizer::builder(|req: &(u64, &str)| req.0).build();
/// let factory: Factory<(u64, &str), String> = Box::new(|(_, payload)| payload.to_string());
/// let memoized = by_user.memoize(factory);
///
/// assert_eq!(memoized.resolve((7, "first")), "first");
/// assert_eq!(memoized.resolve((7, "second")), "first");
/// assert_eq!(memoized.resolve((8, "other")), "other");
/// ```
pub struct KeyMemoizer<K, P> {
    projection: P,
    capacity: usize,
    _key: PhantomData<fn() -> K>,
}

/// Builder for configuring a [`KeyMemoizer`]
pub struct KeyMemoizerBuilder<K, P> {
    projection: P,
    capacity: usize,
    _key: PhantomData<fn() -> K>,
}

/// Memoizer keyed by the whole input
///
/// Keeps a clone of each distinct input as its key.
///
/// # Example
///
/// ```
/// use keythrottle::HashMemoizer;
///
/// let memoizer = HashMemoizer::builder().capacity(100_000).build();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HashMemoizer {
    capacity: usize,
}

/// Builder for configuring a [`HashMemoizer`]
#[derive(Debug, Clone, Copy)]
pub struct HashMemoizerBuilder {
    capacity: usize,
}

/// Memoized function built by [`KeyMemoizer`] and [`HashMemoizer`]
pub struct KeyMemo<A, K, V, P> {
    factory: Factory<A, V>,
    projection: P,
    entries: Mutex<HashMap<K, V>>,
}

fn with_overhead(capacity: usize) -> usize {
    // Pre-allocate with overhead to avoid rehashing
    (capacity as f64 * CAPACITY_OVERHEAD_FACTOR) as usize
}

impl<K, P> KeyMemoizer<K, P> {
    /// Key inputs with `projection`, using the default capacity
    pub fn new(projection: P) -> Self {
        Self::builder(projection).build()
    }

    /// Create a new builder for configuring a KeyMemoizer
    pub fn builder(projection: P) -> KeyMemoizerBuilder<K, P> {
        KeyMemoizerBuilder {
            projection,
            capacity: DEFAULT_CAPACITY,
            _key: PhantomData,
        }
    }
}

impl<K, P: Clone> Clone for KeyMemoizer<K, P> {
    fn clone(&self) -> Self {
        KeyMemoizer {
            projection: self.projection.clone(),
            capacity: self.capacity,
            _key: PhantomData,
        }
    }
}

impl<K, P> fmt::Debug for KeyMemoizer<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMemoizer")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, P> KeyMemoizerBuilder<K, P> {
    /// Set the expected number of distinct keys
    ///
    /// The registry will allocate 30% more space to reduce hash collisions.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the KeyMemoizer with the configured settings
    pub fn build(self) -> KeyMemoizer<K, P> {
        KeyMemoizer {
            projection: self.projection,
            capacity: self.capacity,
            _key: PhantomData,
        }
    }
}

impl<A, K, V, P> Memoizer<A, V> for KeyMemoizer<K, P>
where
    K: Hash + Eq,
    V: Clone,
    P: Fn(&A) -> K + Clone,
{
    type Memoized = KeyMemo<A, K, V, P>;

    fn memoize(&self, factory: Factory<A, V>) -> KeyMemo<A, K, V, P> {
        KeyMemo::new(factory, self.projection.clone(), self.capacity)
    }
}

impl HashMemoizer {
    /// Create a HashMemoizer with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder for configuring a HashMemoizer
    pub fn builder() -> HashMemoizerBuilder {
        HashMemoizerBuilder::default()
    }
}

impl Default for HashMemoizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for HashMemoizerBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl HashMemoizerBuilder {
    /// Set the expected number of distinct inputs
    ///
    /// The registry will allocate 30% more space to reduce hash collisions.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the HashMemoizer with the configured settings
    pub fn build(self) -> HashMemoizer {
        HashMemoizer {
            capacity: self.capacity,
        }
    }
}

impl<A, V> Memoizer<A, V> for HashMemoizer
where
    A: Hash + Eq + Clone,
    V: Clone,
{
    type Memoized = KeyMemo<A, A, V, fn(&A) -> A>;

    fn memoize(&self, factory: Factory<A, V>) -> Self::Memoized {
        KeyMemo::new(factory, A::clone as fn(&A) -> A, self.capacity)
    }
}

impl<A, K, V, P> KeyMemo<A, K, V, P> {
    fn new(factory: Factory<A, V>, projection: P, capacity: usize) -> Self {
        KeyMemo {
            factory,
            projection,
            entries: Mutex::new(HashMap::with_capacity(with_overhead(capacity))),
        }
    }

    /// Number of distinct keys stored
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no key has been stored yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<A, K, V, P> Memoized<A, V> for KeyMemo<A, K, V, P>
where
    K: Hash + Eq,
    V: Clone,
    P: Fn(&A) -> K,
{
    fn resolve(&self, args: A) -> V {
        let key = (self.projection)(&args);

        // The factory runs under the lock so each key is built exactly once.
        // It must not call back into this memoized function.
        let mut entries = self.entries.lock();
        match entries.entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let value = entry.insert((self.factory)(args)).clone();
                let len = entries.len();
                if len >= GROWTH_LOG_THRESHOLD && len.is_power_of_two() {
                    tracing::debug!(entries = len, "per-input registry grew");
                }
                value
            }
        }
    }
}
