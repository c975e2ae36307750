//! Reference class hierarchy.
//!
//! A minimal single-inheritance object model implementing [`MethodLookup`].
//! Every class owns one shape; resolution walks the class, then its
//! superclasses, up to the root `Object` class.
//!
//! # Invalidation
//!
//! Method tables may change after dispatch has started caching. Any
//! definition made after the first lookup advances the epoch, which makes
//! every dispatch node drop its entries on the next call.
//!
//! # Thread Safety
//!
//! Tables sit behind a `parking_lot::RwLock`; lookups take the read lock only.
//! Counters are atomics.

use crate::error::{RuntimeError, VmResult};
use crate::lookup::{MethodLookup, MethodRef};
use garnet_core::{ShapeId, Symbol, Value, intern};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

// =============================================================================
// Class Definition
// =============================================================================

struct ClassDef {
    name: Symbol,
    superclass: Option<ShapeId>,
    methods: FxHashMap<Symbol, MethodRef>,
}

impl ClassDef {
    fn new(name: &str, superclass: Option<ShapeId>) -> Self {
        Self {
            name: intern(name),
            superclass,
            methods: FxHashMap::default(),
        }
    }
}

struct Tables {
    classes: FxHashMap<ShapeId, ClassDef>,
    next_shape: ShapeId,
}

/// Builtin shapes and the class names receivers of those shapes report.
const BUILTIN_CLASSES: [(ShapeId, &str); 8] = [
    (ShapeId::NIL, "NilClass"),
    (ShapeId::TRUE, "TrueClass"),
    (ShapeId::FALSE, "FalseClass"),
    (ShapeId::INTEGER, "Integer"),
    (ShapeId::FLOAT, "Float"),
    (ShapeId::SYMBOL, "Symbol"),
    (ShapeId::STRING, "String"),
    (ShapeId::ARRAY, "Array"),
];

// =============================================================================
// Class Hierarchy
// =============================================================================

/// Classes, their method tables and the lookup epoch.
pub struct ClassHierarchy {
    tables: RwLock<Tables>,
    epoch: AtomicU64,
    lookups: AtomicU64,
    in_use: AtomicBool,
}

impl ClassHierarchy {
    /// Create a hierarchy holding `Object` and the builtin value classes.
    pub fn new() -> Self {
        let mut classes = FxHashMap::default();
        classes.insert(ShapeId::OBJECT, ClassDef::new("Object", None));
        for (shape, name) in BUILTIN_CLASSES {
            classes.insert(shape, ClassDef::new(name, Some(ShapeId::OBJECT)));
        }

        Self {
            tables: RwLock::new(Tables {
                classes,
                next_shape: ShapeId::FIRST_USER,
            }),
            epoch: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
            in_use: AtomicBool::new(false),
        }
    }

    /// Define a class under `superclass` (or `Object`) and return its shape.
    pub fn define_class(&self, name: &str, superclass: Option<ShapeId>) -> VmResult<ShapeId> {
        let mut tables = self.tables.write();
        let parent = superclass.unwrap_or(ShapeId::OBJECT);
        if !tables.classes.contains_key(&parent) {
            return Err(RuntimeError::UnknownShape(parent));
        }

        let shape = tables.next_shape;
        tables.next_shape = shape.next();
        tables.classes.insert(shape, ClassDef::new(name, Some(parent)));
        Ok(shape)
    }

    /// Add or replace a method on `class`, keyed by the method's own name.
    pub fn define_method(&self, class: ShapeId, method: MethodRef) -> VmResult<()> {
        {
            let mut tables = self.tables.write();
            let def = tables
                .classes
                .get_mut(&class)
                .ok_or(RuntimeError::UnknownShape(class))?;
            def.methods.insert(method.name().clone(), method);
        }

        if self.in_use.load(Ordering::Acquire) {
            let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(%class, epoch, "method table changed after use");
        }
        Ok(())
    }

    /// Allocate an instance of `class`.
    pub fn instantiate(&self, class: ShapeId) -> VmResult<Value> {
        let tables = self.tables.read();
        let def = tables
            .classes
            .get(&class)
            .ok_or(RuntimeError::UnknownShape(class))?;
        Ok(Value::object(class, def.name.clone()))
    }

    /// Name `class` was defined with.
    pub fn class_name(&self, class: ShapeId) -> Option<Symbol> {
        self.tables.read().classes.get(&class).map(|def| def.name.clone())
    }

    /// `class` followed by its superclasses, nearest first.
    pub fn ancestors(&self, class: ShapeId) -> Vec<ShapeId> {
        let tables = self.tables.read();
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(shape) = current {
            let Some(def) = tables.classes.get(&shape) else {
                break;
            };
            chain.push(shape);
            current = def.superclass;
        }
        chain
    }

    /// Number of resolution requests served.
    #[inline]
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Defined classes, builtins included.
    pub fn class_count(&self) -> usize {
        self.tables.read().classes.len()
    }
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodLookup for ClassHierarchy {
    fn lookup(&self, receiver: &Value, name: &Symbol) -> Option<MethodRef> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.in_use.store(true, Ordering::Release);

        let tables = self.tables.read();
        let mut current = Some(receiver.shape());
        // Superclasses are always defined before subclasses, so the chain is
        // acyclic and ends at Object.
        while let Some(shape) = current {
            let def = tables.classes.get(&shape)?;
            if let Some(method) = def.methods.get(name) {
                return Some(method.clone());
            }
            current = def.superclass;
        }
        None
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::NativeMethod;

    fn returning(name: &str, tag: &'static str) -> MethodRef {
        NativeMethod::new(name, move |_, _, _| Ok(Value::str(tag))).into_ref()
    }

    fn call(method: &MethodRef, receiver: &Value) -> Value {
        method.call(receiver, None, &[]).unwrap()
    }

    #[test]
    fn test_lookup_walks_superclasses() {
        let classes = ClassHierarchy::new();
        let animal = classes.define_class("Animal", None).unwrap();
        let dog = classes.define_class("Dog", Some(animal)).unwrap();
        classes.define_method(animal, returning("breathe", "animal")).unwrap();

        let rex = classes.instantiate(dog).unwrap();
        let found = classes.lookup(&rex, &intern("breathe")).unwrap();
        assert_eq!(call(&found, &rex), Value::str("animal"));
        assert!(classes.lookup(&rex, &intern("fly")).is_none());
        assert_eq!(classes.ancestors(dog), vec![dog, animal, ShapeId::OBJECT]);
    }

    #[test]
    fn test_nearest_definition_wins() {
        let classes = ClassHierarchy::new();
        let animal = classes.define_class("Animal", None).unwrap();
        let cat = classes.define_class("Cat", Some(animal)).unwrap();
        classes.define_method(animal, returning("speak", "...")).unwrap();
        classes.define_method(cat, returning("speak", "meow")).unwrap();

        let tom = classes.instantiate(cat).unwrap();
        let found = classes.lookup(&tom, &intern("speak")).unwrap();
        assert_eq!(call(&found, &tom), Value::str("meow"));
    }

    #[test]
    fn test_builtin_values_resolve_through_object() {
        let classes = ClassHierarchy::new();
        classes.define_method(ShapeId::OBJECT, returning("inspect", "obj")).unwrap();
        assert!(classes.lookup(&Value::Int(3), &intern("inspect")).is_some());
        assert_eq!(classes.class_name(ShapeId::INTEGER), Some(intern("Integer")));
    }

    #[test]
    fn test_unknown_shapes_rejected() {
        let classes = ClassHierarchy::new();
        let ghost = ShapeId::new(999);
        assert_eq!(classes.define_class("X", Some(ghost)), Err(RuntimeError::UnknownShape(ghost)));
        assert!(classes.define_method(ghost, returning("m", "")).is_err());
        assert!(classes.instantiate(ghost).is_err());
    }

    #[test]
    fn test_epoch_advances_only_after_use() {
        let classes = ClassHierarchy::new();
        let dog = classes.define_class("Dog", None).unwrap();
        classes.define_method(dog, returning("speak", "woof")).unwrap();
        assert_eq!(classes.epoch(), 0);

        let rex = classes.instantiate(dog).unwrap();
        classes.lookup(&rex, &intern("speak"));
        assert_eq!(classes.lookups(), 1);

        classes.define_method(dog, returning("speak", "WOOF")).unwrap();
        assert_eq!(classes.epoch(), 1);
    }

    #[test]
    fn test_shapes_allocated_from_first_user() {
        let classes = ClassHierarchy::new();
        let a = classes.define_class("A", None).unwrap();
        let b = classes.define_class("B", None).unwrap();
        assert_eq!(a, ShapeId::FIRST_USER);
        assert_eq!(b, ShapeId::FIRST_USER.next());
        assert_eq!(classes.class_count(), 11);
    }
}
