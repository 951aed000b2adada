pub mod arena;
pub mod num;
pub mod types;
pub mod value;
pub mod memory;
pub mod print;

#[cfg(test)]
pub mod test;

pub use arena::Arena;
pub use num::{ApInt, ApFloat, FloatFormat};
pub use types::{TypeOracle, Composite, TypeTable, TypeEntry};
pub use value::{Value, Kind};
pub use memory::MemoryObject;

use std::fmt;

// Opaque references into the rest of the compiler.
// The store never looks inside these, it only carries them around
// and hands them back to whichever collaborator produced them.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeRef(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FunctionRef(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnumCaseRef(pub u32);

impl fmt::Display for TypeRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "%t{}", self.0)
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "@f{}", self.0)
    }
}

impl fmt::Display for EnumCaseRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "#case{}", self.0)
    }
}
