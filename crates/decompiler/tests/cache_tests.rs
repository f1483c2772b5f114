use std::{
    collections::HashMap,
    env, fs, io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use jstub_decompiler::{ByteSource, CacheConfig, DecompileError, DirectorySource, StubCache};
use jstub_test_support::{acc, Attr, ClassBuilder, Member};

/// Serves class files from memory and counts every fetch.
#[derive(Default)]
struct CountingSource {
    classes: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn with(mut self, builder: ClassBuilder, location: &str) -> Self {
        self.classes.insert(location.to_owned(), builder.build());
        self
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ByteSource<String> for &CountingSource {
    fn fetch(&self, location: &String) -> io::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.classes
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.clone()))
    }
}

fn widget() -> ClassBuilder {
    ClassBuilder::new("my/Widget")
        .field(Member::new(acc::PRIVATE, "size", "I"))
        .method(Member::new(acc::PUBLIC, "<init>", "()V"))
}

const WIDGET: &str = "file:/classes/my/Widget.class";
const GADGET: &str = "file:/classes/my/Gadget.class";
const GIZMO: &str = "file:/classes/my/Gizmo.class";
const BROKEN: &str = "file:/classes/my/Broken.class";

fn source() -> CountingSource {
    let broken = ClassBuilder::new("my/Broken")
        .attr(Attr::Signature("Ljava/lang/Object;".to_owned()))
        .attr(Attr::Signature("Ljava/lang/Number;".to_owned()));

    CountingSource::default()
        .with(widget(), WIDGET)
        .with(ClassBuilder::new("my/Gadget"), GADGET)
        .with(ClassBuilder::new("my/Gizmo"), GIZMO)
        .with(broken, BROKEN)
}

#[test]
fn test_hit_does_not_fetch_again() {
    let source = source();
    let cache = StubCache::new(&source);
    let location = WIDGET.to_owned();

    let first = cache.get_or_compute(&location).unwrap();
    let second = cache.get_or_compute(&location).unwrap();

    assert_eq!(1, source.fetches());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!("my.Widget", second.class_name());
}

#[test]
fn test_evicted_entry_is_recomputed() {
    let source = source();
    let cache = StubCache::new(&source);
    let location = WIDGET.to_owned();

    let first = cache.get_or_compute(&location).unwrap();
    assert!(cache.evict(&location));
    assert!(!cache.contains(&location));

    let third = cache.get_or_compute(&location).unwrap();
    assert_eq!(2, source.fetches());
    assert_eq!(first, third);
    assert!(cache.contains(&location));
}

#[test]
fn test_evict_missing_entry() {
    let source = source();
    let cache = StubCache::new(&source);
    assert!(!cache.evict(&WIDGET.to_owned()));
}

#[test]
fn test_clear() {
    let source = source();
    let cache = StubCache::new(&source);

    cache.get_or_compute(&WIDGET.to_owned()).unwrap();
    cache.get_or_compute(&GADGET.to_owned()).unwrap();
    assert_eq!(2, cache.len());

    cache.clear();
    assert!(cache.is_empty());

    cache.get_or_compute(&WIDGET.to_owned()).unwrap();
    assert_eq!(3, source.fetches());
}

#[test]
fn test_io_failure_is_propagated_and_not_cached() {
    let source = source();
    let cache = StubCache::new(&source);
    let location = "file:/classes/my/Missing.class".to_owned();

    for _ in 0..2 {
        match cache.get_or_compute(&location) {
            Err(DecompileError::Io(e)) => assert_eq!(io::ErrorKind::NotFound, e.kind()),
            other => panic!("expected an IO failure, got {:?}", other),
        }
    }

    assert_eq!(2, source.fetches());
    assert!(cache.is_empty());
}

#[test]
fn test_decode_failure_is_not_cached() {
    let source = source();
    let cache = StubCache::new(&source);
    let location = BROKEN.to_owned();

    assert!(matches!(
        cache.get_or_compute(&location),
        Err(DecompileError::MalformedStructure { .. })
    ));
    assert!(!cache.contains(&location));
}

#[test]
fn test_failure_does_not_disturb_other_entries() {
    let source = source();
    let cache = StubCache::new(&source);
    let widget = cache.get_or_compute(&WIDGET.to_owned()).unwrap();

    assert!(cache.get_or_compute(&BROKEN.to_owned()).is_err());
    assert!(Arc::ptr_eq(
        &widget,
        &cache.get_or_compute(&WIDGET.to_owned()).unwrap()
    ));
}

#[test]
fn test_capacity_bounds_resident_entries() {
    let source = source();
    let cache = StubCache::with_config(&source, CacheConfig { capacity: 2 });

    for location in [WIDGET, GADGET, GIZMO] {
        cache.get_or_compute(&location.to_owned()).unwrap();
    }

    assert_eq!(2, cache.len());
    assert!(cache.contains(&GIZMO.to_owned()));

    // Whatever was dropped comes back on request.
    for location in [WIDGET, GADGET, GIZMO] {
        assert!(cache.get_or_compute(&location.to_owned()).is_ok());
    }
    assert_eq!(2, cache.len());
    assert!(source.fetches() >= 4);
}

#[test]
fn test_zero_capacity_never_retains() {
    let source = source();
    let cache = StubCache::with_config(&source, CacheConfig { capacity: 0 });
    let location = WIDGET.to_owned();

    let first = cache.get_or_compute(&location).unwrap();
    let second = cache.get_or_compute(&location).unwrap();

    assert_eq!(first, second);
    assert_eq!(2, source.fetches());
    assert!(cache.is_empty());
}

#[test]
fn test_default_config() {
    let source = source();
    let cache: StubCache<String, _> = StubCache::new(&source);
    assert_eq!(4096, cache.config().capacity);
}

#[test]
fn test_closure_source() {
    let bytes = widget().build();
    let fetches = AtomicUsize::new(0);
    let cache: StubCache<u32, _> = StubCache::new(|location: &u32| {
        fetches.fetch_add(1, Ordering::SeqCst);
        match location {
            7 => Ok(bytes.clone()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "no such class")),
        }
    });

    assert_eq!("my.Widget", cache.get_or_compute(&7).unwrap().class_name());
    assert!(cache.get_or_compute(&7).is_ok());
    assert!(cache.get_or_compute(&8).is_err());
    assert_eq!(2, fetches.load(Ordering::SeqCst));
}

#[test]
fn test_concurrent_requests_yield_equal_stubs() {
    let source = source();
    let cache = StubCache::new(&source);

    let stubs = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| scope.spawn(|| cache.get_or_compute(&WIDGET.to_owned()).unwrap()))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(stubs.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(1, cache.len());
    assert!(source.fetches() >= 1);
}

#[test]
fn test_directory_source() {
    let root = env::temp_dir().join(format!("jstub-directory-source-{}", std::process::id()));
    fs::create_dir_all(root.join("my")).unwrap();
    fs::write(root.join("my/Widget.class"), widget().build()).unwrap();

    let source = DirectorySource::new(&root);
    assert_eq!(root.as_path(), source.root());
    assert_eq!(root.join("my/Widget.class"), source.path_of("my.Widget"));
    assert_eq!(root.join("my/Widget.class"), source.path_of("my/Widget"));

    let cache = StubCache::new(source);
    let stub = cache.get_or_compute(&"my.Widget".to_owned()).unwrap();
    assert_eq!("my.Widget", stub.class_name());
    assert_eq!("size", stub.fields().unwrap()[0].name());

    assert!(matches!(
        cache.get_or_compute(&"my.Missing".to_owned()),
        Err(DecompileError::Io(_))
    ));

    fs::remove_dir_all(root).unwrap();
}
