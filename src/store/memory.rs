use std::cell::Cell;
use std::fmt;

use super::{Arena, TypeRef, Value, Kind};
use super::types::{TypeOracle, member_type, member_count};

/// A typed storage location (stack slot, global, receiver) holding one
/// top-level value.
///
/// The identity of a memory object is its arena allocation. The held value
/// is only ever replaced as a whole, nested values are updated by building
/// a new spine around them (see [`MemoryObject::set_indexed_element`]).
pub struct MemoryObject<'a> {
    ty: TypeRef,
    value: Cell<Value<'a>>
}

impl<'a> MemoryObject<'a> {
    pub fn create(ty: TypeRef, value: Value<'a>, arena: &'a Arena) -> &'a MemoryObject<'a> {
        let object = arena.alloc(MemoryObject { ty, value: Cell::new(value) });
        log::trace!(target: "memory", "created {:p} of type {} holding {:?}", object, ty, value.kind());
        object
    }

    pub fn ty(&self) -> TypeRef { self.ty }

    pub fn value(&self) -> Value<'a> {
        self.value.get()
    }

    pub fn set_value(&self, value: Value<'a>) {
        self.value.set(value)
    }

    /// Given that this memory object holds an aggregate like {{1, 2}, 3} and
    /// an access path like [0, 1], returns the indexed element (2 here).
    ///
    /// Anything at or inside uninitialized memory reads as uninitialized
    /// memory. Panics if the path does not fit the type of the object.
    pub fn get_indexed_element<O>(&self, path: &[usize], types: &O) -> Value<'a>
            where O: TypeOracle + ?Sized {
        let result = indexed_element(self.value(), path, self.ty, types);
        log::trace!(target: "memory", "read {:p}{:?} -> {:?}", self, path, result.kind());
        result
    }

    /// Given that this memory object holds an aggregate like {{1, 2}, 3}, an
    /// access path like [0, 1] and a scalar like 4, replaces the held value
    /// with {{1, 4}, 3}.
    ///
    /// Only the aggregates along the path are rebuilt, every other element is
    /// shared with the previous value, which itself is left untouched.
    /// Panics if the path does not fit the type of the object.
    pub fn set_indexed_element<O>(&self, path: &[usize], scalar: Value<'a>,
                                  types: &O, arena: &'a Arena)
            where O: TypeOracle + ?Sized {
        let updated = with_indexed_element(self.value(), path, scalar, self.ty, types, arena);
        log::trace!(target: "memory", "wrote {:?} to {:p}{:?}", scalar.kind(), self, path);
        self.value.set(updated)
    }
}

// identity, not contents
impl<'a> PartialEq for MemoryObject<'a> {
    fn eq(&self, rhs: &Self) -> bool {
        std::ptr::eq(self, rhs)
    }
}

// The held value may well contain an address of this very object,
// so only the identity is printed.
impl<'a> fmt::Debug for MemoryObject<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "MemoryObject({:p}: {})", self, self.ty)
    }
}

fn indexed_element<'a, O>(aggregate: Value<'a>, path: &[usize], ty: TypeRef, types: &O) -> Value<'a>
        where O: TypeOracle + ?Sized {
    let (&index, rest) = match path.split_first() {
        Some(p) => p,
        None => return aggregate
    };

    // everything inside uninit memory is uninit memory
    if aggregate.kind() == Kind::UninitMemory {
        return Value::uninit_memory()
    }

    let (element, element_type) = match aggregate.kind() {
        Kind::Array => {
            let (element_type, elements) = aggregate.array_value();
            assert!(index < elements.len(), "array index {} out of range {}", index, elements.len());
            (elements[index], element_type)
        },
        Kind::Aggregate => {
            let elements = aggregate.aggregate_value();
            assert!(index < elements.len(), "aggregate index {} out of range {}", index, elements.len());
            (elements[index], member_type(types, ty, index))
        },
        kind => panic!("the access path is invalid for a {:?} value", kind)
    };
    indexed_element(element, rest, element_type, types)
}

fn with_indexed_element<'a, O>(aggregate: Value<'a>, path: &[usize], scalar: Value<'a>,
                               ty: TypeRef, types: &O, arena: &'a Arena) -> Value<'a>
        where O: TypeOracle + ?Sized {
    let (&index, rest) = match path.split_first() {
        Some(p) => p,
        None => return scalar
    };

    // Memory initialized piecewise: scalarize it into an aggregate of
    // uninit members so that the untouched members stay uninit.
    let aggregate = if aggregate.kind() == Kind::UninitMemory {
        let count = member_count(types, ty);
        log::trace!(target: "memory", "scalarizing uninit {} into {} members", ty, count);
        Value::aggregate(&vec![Value::uninit_memory(); count], arena)
    } else {
        aggregate
    };

    match aggregate.kind() {
        Kind::Array => {
            let (element_type, old) = aggregate.array_value();
            assert!(index < old.len(), "array index {} out of range {}", index, old.len());
            let mut elements = old.to_vec();
            elements[index] = with_indexed_element(old[index], rest, scalar, element_type, types, arena);
            Value::array(&elements, element_type, arena)
        },
        Kind::Aggregate => {
            let old = aggregate.aggregate_value();
            assert!(index < old.len(), "aggregate index {} out of range {}", index, old.len());
            let element_type = member_type(types, ty, index);
            let mut elements = old.to_vec();
            elements[index] = with_indexed_element(old[index], rest, scalar, element_type, types, arena);
            Value::aggregate(&elements, arena)
        },
        kind => panic!("the access path is invalid for a {:?} value", kind)
    }
}
