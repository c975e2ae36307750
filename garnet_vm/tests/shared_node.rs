//! The shared dispatch node under concurrent first population.

use garnet_core::{ShapeId, SourceLocation, Symbol, Value, intern};
use garnet_vm::{
    ClassHierarchy, DispatchConfig, DispatchContext, MethodLookup, MethodRef, NativeMethod,
    RecordingSink, SharedDispatchNode,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Barrier, mpsc};
use std::thread;

const THREADS: usize = 8;
const CALLS: usize = 200;
const SHAPES: usize = 6;

#[test]
fn racing_threads_converge_on_one_entry_per_shape() {
    let classes = ClassHierarchy::new();
    let mut receivers = Vec::new();
    for i in 0..SHAPES {
        let class = classes.define_class(&format!("Worker{}", i), None).unwrap();
        let method = if i % 3 == 2 {
            NativeMethod::new("method_missing", move |_, _, args| {
                Ok(Value::array(vec![Value::Int(-(i as i64)), args[0].clone()]))
            })
        } else {
            NativeMethod::new("run", move |_, _, args| Ok(Value::Int(i as i64 + args.len() as i64)))
        };
        classes.define_method(class, method.into_ref()).unwrap();
        receivers.push(classes.instantiate(class).unwrap());
    }

    let config = DispatchConfig::default();
    let sink = RecordingSink::new();
    let node = SharedDispatchNode::new(intern("run"), SourceLocation::new("pool.rb", 9));

    thread::scope(|s| {
        for t in 0..THREADS {
            let (classes, config, sink, node, receivers) = (&classes, &config, &sink, &node, &receivers);
            s.spawn(move || {
                let ctx = DispatchContext::new(classes, config).with_sink(sink);
                for call in 0..CALLS {
                    let i = (call + t) % SHAPES;
                    let out = node.dispatch(&ctx, &receivers[i], None, &[]).unwrap();
                    let expected = if i % 3 == 2 {
                        Value::array(vec![Value::Int(-(i as i64)), Value::symbol("run")])
                    } else {
                        Value::Int(i as i64)
                    };
                    assert_eq!(out, expected);
                }
            });
        }
    });

    assert_eq!(node.cache_len(), SHAPES);
    assert!(node.saw_fallback());
    // Losers of an insert race resolve but never report.
    assert_eq!(sink.len(), SHAPES);
    let stats = node.stats();
    assert_eq!(stats.hits + stats.misses, (THREADS * CALLS) as u64);
    assert!(stats.misses >= SHAPES as u64);
}

#[test]
fn shared_exhausted_fallback_is_not_cached() {
    let classes = ClassHierarchy::new();
    let rock = classes.define_class("Rock", None).unwrap();
    let config = DispatchConfig::default();
    let ctx = DispatchContext::new(&classes, &config).without_sink();
    let node = SharedDispatchNode::new(intern("run"), SourceLocation::unknown());

    let err = node
        .dispatch(&ctx, &classes.instantiate(rock).unwrap(), None, &[])
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(node.cache_len(), 0);
    assert!(node.entry(rock).is_none());
}

/// Resolves every name to a method returning the epoch it was resolved at.
/// The first resolution for `gated` parks until the test releases it.
struct GatedLookup {
    epoch: AtomicU64,
    gated: ShapeId,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<Option<mpsc::Receiver<()>>>,
}

impl MethodLookup for GatedLookup {
    fn lookup(&self, receiver: &Value, name: &Symbol) -> Option<MethodRef> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if receiver.shape() == self.gated {
            if let Some(entered) = self.entered.lock().take() {
                entered.send(()).unwrap();
                let release = self.release.lock().take().unwrap();
                release.recv().unwrap();
            }
        }
        Some(NativeMethod::new(name.as_str(), move |_, _, _| Ok(Value::Int(epoch as i64))).into_ref())
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

#[test]
fn resolution_overtaken_by_invalidation_is_not_cached() {
    let dog = ShapeId::FIRST_USER;
    let cat = dog.next();
    let rex = Value::object(dog, intern("Dog"));
    let tom = Value::object(cat, intern("Cat"));

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let lookup = GatedLookup {
        epoch: AtomicU64::new(0),
        gated: dog,
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
    };
    let config = DispatchConfig::default();
    let node = SharedDispatchNode::new(intern("speak"), SourceLocation::new("zoo.rb", 3));

    thread::scope(|s| {
        let slow = s.spawn(|| {
            let ctx = DispatchContext::new(&lookup, &config).without_sink();
            node.dispatch(&ctx, &rex, None, &[]).unwrap()
        });

        entered_rx.recv().unwrap();
        lookup.epoch.store(1, Ordering::SeqCst);
        let ctx = DispatchContext::new(&lookup, &config).without_sink();
        assert_eq!(node.dispatch(&ctx, &tom, None, &[]).unwrap(), Value::Int(1));
        release_tx.send(()).unwrap();

        // The in-flight call still runs what it resolved.
        assert_eq!(slow.join().unwrap(), Value::Int(0));
    });

    assert!(node.entry(dog).is_none());
    let ctx = DispatchContext::new(&lookup, &config).without_sink();
    assert_eq!(node.dispatch(&ctx, &rex, None, &[]).unwrap(), Value::Int(1));
    assert_eq!(node.cache_len(), 2);
}

#[test]
fn concurrent_first_fallback_calls_all_receive_the_name() {
    const ROUNDS: usize = 200;

    let classes = ClassHierarchy::new();
    let ghost = classes.define_class("Ghost", None).unwrap();
    classes
        .define_method(
            ghost,
            NativeMethod::new("method_missing", |_, _, args| Ok(Value::array(args.to_vec()))).into_ref(),
        )
        .unwrap();
    let casper = classes.instantiate(ghost).unwrap();
    let config = DispatchConfig::default();
    let expected = Value::array(vec![Value::symbol("boo"), Value::Int(7)]);

    for _ in 0..ROUNDS {
        let node = SharedDispatchNode::new(intern("boo"), SourceLocation::unknown());
        let start = Barrier::new(THREADS);
        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let ctx = DispatchContext::new(&classes, &config).without_sink();
                    start.wait();
                    let out = node.dispatch(&ctx, &casper, None, &[Value::Int(7)]).unwrap();
                    assert_eq!(out, expected);
                });
            }
        });
        assert!(node.saw_fallback());
        assert_eq!(node.cache_len(), 1);
    }
}
