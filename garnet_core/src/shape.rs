//! Receiver shapes.
//!
//! A shape identifies a receiver's effective type and lookup chain. Two
//! receivers with the same shape resolve every method name identically, which
//! is what makes the shape a valid inline-cache key.

use std::fmt;

/// Identity of a receiver's effective type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u32);

impl ShapeId {
    pub const NIL: ShapeId = ShapeId(1);
    pub const TRUE: ShapeId = ShapeId(2);
    pub const FALSE: ShapeId = ShapeId(3);
    pub const INTEGER: ShapeId = ShapeId(4);
    pub const FLOAT: ShapeId = ShapeId(5);
    pub const SYMBOL: ShapeId = ShapeId(6);
    pub const STRING: ShapeId = ShapeId(7);
    pub const ARRAY: ShapeId = ShapeId(8);
    /// Root of every user-defined class hierarchy.
    pub const OBJECT: ShapeId = ShapeId(9);

    /// First id handed out to user-defined classes.
    pub const FIRST_USER: ShapeId = ShapeId(16);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        ShapeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this shape belongs to a builtin immediate or core class.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER.0
    }

    /// The shape following this one in allocation order.
    #[inline]
    pub const fn next(self) -> Self {
        ShapeId(self.0 + 1)
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeId({})", self.0)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}
