//! Method dispatch for the Garnet execution engine.
//!
//! - **Lookup** (`lookup.rs`): the resolution contract and callable targets
//! - **Hierarchy** (`hierarchy.rs`): a single-inheritance reference resolver
//! - **Dispatch** (`dispatch/`): per-call-site polymorphic inline caches
//!
//! # Example
//!
//! ```
//! use garnet_core::{SourceLocation, Value, intern};
//! use garnet_vm::{ClassHierarchy, DispatchConfig, DispatchContext, DispatchNode, NativeMethod};
//!
//! let classes = ClassHierarchy::new();
//! let dog = classes.define_class("Dog", None)?;
//! classes.define_method(dog, NativeMethod::new("speak", |_, _, _| Ok(Value::str("woof"))).into_ref())?;
//!
//! let config = DispatchConfig::default();
//! let ctx = DispatchContext::new(&classes, &config);
//! let mut site = DispatchNode::new(intern("speak"), SourceLocation::new("zoo.rb", 1));
//!
//! let rex = classes.instantiate(dog)?;
//! assert_eq!(site.dispatch(&ctx, &rex, None, &[])?, Value::str("woof"));
//! # Ok::<(), garnet_vm::RuntimeError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod hierarchy;
pub mod lookup;

pub use config::DispatchConfig;
pub use dispatch::{
    CacheEntry, CacheGrowth, CacheState, DiagnosticSink, DispatchContext, DispatchNode, DispatchStats,
    RecordingSink, SharedDispatchNode, TracingSink,
};
pub use error::{RuntimeError, VmResult};
pub use hierarchy::ClassHierarchy;
pub use lookup::{Callable, MethodLookup, MethodRef, NativeMethod};
