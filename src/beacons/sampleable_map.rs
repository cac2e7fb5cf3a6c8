use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};

/// A map whose keys can be sampled at random, weighted by their values.
#[derive(Debug, Clone)]
pub struct SampleableMap<K: Eq + std::hash::Hash + Clone, V> {
    map: HashMap<K, V>,
}

impl<K, V> std::ops::Deref for SampleableMap<K, V>
where
    K: Eq + std::hash::Hash + Clone,
{
    type Target = HashMap<K, V>;

    fn deref(&self) -> &'_ Self::Target {
        &self.map
    }
}

impl<K: Clone + Eq + std::hash::Hash, V> SampleableMap<K, V> {
    pub fn new() -> Self {
        Self { map: HashMap::default() }
    }

    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        self.map.insert(k, v)
    }

    pub fn remove(&mut self, k: &K) -> Option<V> {
        self.map.remove(k)
    }

    /// Samples up to `k` distinct keys without replacement, drawing each key with a probability
    /// proportional to `weight` of its value. Keys weighing nothing are never sampled.
    pub fn sample<F>(&self, k: usize, weight: F) -> Vec<K>
    where
        F: Fn(&V) -> u64,
    {
        let mut rng = rand::thread_rng();
        let mut candidates: Vec<(&K, u64)> =
            self.map.iter().map(|(key, v)| (key, weight(v))).collect();
        let mut s = vec![];
        while s.len() < k {
            let i = match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
                Ok(distr) => distr.sample(&mut rng),
                // no candidate left with a positive weight
                Err(_) => break,
            };
            let (key, _) = candidates.swap_remove(i);
            s.push(key.clone());
        }
        s
    }
}

impl<K: Clone + Eq + std::hash::Hash, V> Default for SampleableMap<K, V> {
    fn default() -> Self {
        SampleableMap::new()
    }
}
