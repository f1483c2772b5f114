use std::{
    fmt::Debug,
    fs, io,
    hash::Hash,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{decompile, stub::ClassStub, Result};

/// Supplies the bytes of the class file found at a location.
pub trait ByteSource<L> {
    fn fetch(&self, location: &L) -> io::Result<Vec<u8>>;
}

impl<L, F> ByteSource<L> for F
where
    F: Fn(&L) -> io::Result<Vec<u8>>,
{
    fn fetch(&self, location: &L) -> io::Result<Vec<u8>> {
        self(location)
    }
}

/// Reads class files from a directory laid out by package, e.g. `<root>/java/lang/Object.class`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Accepts both qualified (`java.lang.Object`) and internal (`java/lang/Object`) names.
    pub fn path_of(&self, class_name: &str) -> PathBuf {
        let mut path = self.root.join(class_name.replace('.', "/"));
        path.set_extension("class");
        path
    }
}

impl ByteSource<String> for DirectorySource {
    fn fetch(&self, class_name: &String) -> io::Result<Vec<u8>> {
        fs::read(self.path_of(class_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident stubs. Zero disables retention entirely.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 4096 }
    }
}

/// Memoizes decompiled stubs by location.
///
/// Entries may disappear at any time, either through [`StubCache::evict`] or because room was
/// needed for a newer entry; a missing entry is recomputed on the next request. Concurrent misses
/// on the same location each decompile and the last insert wins. Failures are never stored.
pub struct StubCache<L, S> {
    source: S,
    config: CacheConfig,
    entries: DashMap<L, Arc<ClassStub>>,
}

impl<L, S> StubCache<L, S>
where
    L: Eq + Hash + Clone + Debug,
    S: ByteSource<L>,
{
    pub fn new(source: S) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            entries: DashMap::new(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn get_or_compute(&self, location: &L) -> Result<Arc<ClassStub>> {
        if let Some(stub) = self.entries.get(location) {
            log::debug!("Stub cache hit for {:?}", location);
            return Ok(Arc::clone(stub.value()));
        }

        log::debug!("Stub cache miss for {:?}", location);
        let bytes = self.source.fetch(location)?;
        let stub = Arc::new(decompile(&bytes)?);

        if self.config.capacity > 0 {
            self.make_room(location);
            self.entries.insert(location.clone(), Arc::clone(&stub));
        }

        Ok(stub)
    }

    /// Drops the entry for `location`, returning whether one was resident.
    pub fn evict(&self, location: &L) -> bool {
        let evicted = self.entries.remove(location).is_some();
        if evicted {
            log::debug!("Evicted {:?} from stub cache", location);
        }
        evicted
    }

    pub fn clear(&self) {
        log::debug!("Clearing {} stub cache entries", self.entries.len());
        self.entries.clear();
    }

    pub fn contains(&self, location: &L) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, incoming: &L) {
        while self.entries.len() >= self.config.capacity && !self.entries.contains_key(incoming) {
            // The iterator holds a shard lock; release it before removing.
            let victim = match self.entries.iter().next() {
                Some(entry) => entry.key().clone(),
                None => return,
            };
            self.evict(&victim);
        }
    }
}
