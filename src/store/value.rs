use super::{Arena, MemoryObject, TypeRef, FunctionRef, EnumCaseRef};
use super::num::{ApInt, ApFloat, FloatFormat};
use crate::diag::{NodeRef, UnknownReason, UnknownInfo, SourceLoc};

use std::collections::HashMap;

/// The public classification of a [`Value`]. Several of these have more
/// than one internal representation, which callers never get to see.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    UninitMemory,
    Unknown,
    Metatype,
    Function,
    Aggregate,
    Enum,
    EnumWithPayload,
    Integer,
    Float,
    String,
    Address,
    Array
}

/// A folded compile-time constant, or a marker for why folding failed.
///
/// This is a small `Copy` handle. Anything variable-length it refers to lives
/// in the [`Arena`] it was built with, and the handle can not outlive it.
/// Values are never mutated in place: aggregates in particular share their
/// elements with every value built from them.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Value<'a>(Repr<'a>);

#[derive(Clone, Copy, PartialEq, Debug)]
enum Repr<'a> {
    UninitMemory,
    Unknown(&'a UnknownInfo<'a>),
    Metatype(TypeRef),
    Function(FunctionRef),
    Aggregate(&'a [Value<'a>]),
    Enum(EnumCaseRef),
    EnumWithPayload(&'a EnumPayload<'a>),
    // integers which fit in a single word
    IntegerInline { word: u64, bit_width: u32 },
    Integer { words: &'a [u64], bit_width: u32 },
    // raw bit patterns of IEEE single and double
    Float32(u32),
    Float64(u64),
    // every other float format
    Float(&'a BoxedFloat<'a>),
    String(&'a [u8]),
    DirectAddress(&'a MemoryObject<'a>),
    DerivedAddress(&'a DerivedAddress<'a>),
    Array(&'a ArrayStorage<'a>),
    // an array whose contents are whatever the memory object currently holds
    ArrayAddress(&'a MemoryObject<'a>)
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct EnumPayload<'a> {
    case: EnumCaseRef,
    payload: Value<'a>
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct BoxedFloat<'a> {
    format: FloatFormat,
    words: &'a [u64]
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct DerivedAddress<'a> {
    object: &'a MemoryObject<'a>,
    path: &'a [usize]
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct ArrayStorage<'a> {
    element_type: TypeRef,
    elements: &'a [Value<'a>]
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self.0 {
            Repr::UninitMemory => Kind::UninitMemory,
            Repr::Unknown(_) => Kind::Unknown,
            Repr::Metatype(_) => Kind::Metatype,
            Repr::Function(_) => Kind::Function,
            Repr::Aggregate(_) => Kind::Aggregate,
            Repr::Enum(_) => Kind::Enum,
            Repr::EnumWithPayload(_) => Kind::EnumWithPayload,
            Repr::IntegerInline { .. } | Repr::Integer { .. } => Kind::Integer,
            Repr::Float32(_) | Repr::Float64(_) | Repr::Float(_) => Kind::Float,
            Repr::String(_) => Kind::String,
            Repr::DirectAddress(_) | Repr::DerivedAddress(_) => Kind::Address,
            Repr::Array(_) | Repr::ArrayAddress(_) => Kind::Array
        }
    }

    // Everything except failures and uninitialized memory
    pub fn is_constant(&self) -> bool {
        !matches!(self.kind(), Kind::Unknown | Kind::UninitMemory)
    }

    // -------------------------- Trivial --------------------------

    pub fn uninit_memory() -> Self {
        Value(Repr::UninitMemory)
    }

    pub fn metatype(ty: TypeRef) -> Self {
        Value(Repr::Metatype(ty))
    }

    pub fn function(f: FunctionRef) -> Self {
        Value(Repr::Function(f))
    }

    pub fn metatype_value(&self) -> TypeRef {
        match self.0 {
            Repr::Metatype(ty) => ty,
            _ => panic!("Expected metatype, found {:?}", self.kind())
        }
    }

    pub fn function_value(&self) -> FunctionRef {
        match self.0 {
            Repr::Function(f) => f,
            _ => panic!("Expected function, found {:?}", self.kind())
        }
    }

    // -------------------------- Integers --------------------------

    /// An integer of at most 64 bits, always stored inline.
    /// Bits above `bit_width` are dropped.
    pub fn int(word: u64, bit_width: u32) -> Self {
        assert!(bit_width > 0 && bit_width <= 64, "inline integers must be 1 to 64 bits wide");
        let word = if bit_width == 64 { word } else { word & ((1u64 << bit_width) - 1) };
        Value(Repr::IntegerInline { word, bit_width })
    }

    pub fn integer(value: &ApInt, arena: &'a Arena) -> Self {
        // the common case fits in a single word
        if value.num_words() == 1 {
            return Value(Repr::IntegerInline { word: value.words()[0], bit_width: value.bit_width() })
        }
        Value(Repr::Integer { words: arena.alloc_slice(value.words()), bit_width: value.bit_width() })
    }

    pub fn integer_value(&self) -> ApInt {
        match self.0 {
            Repr::IntegerInline { word, bit_width } => ApInt::from_u64(word, bit_width),
            Repr::Integer { words, bit_width } => ApInt::from_raw(bit_width, words),
            _ => panic!("Expected integer, found {:?}", self.kind())
        }
    }

    pub fn integer_bit_width(&self) -> u32 {
        match self.0 {
            Repr::IntegerInline { bit_width, .. } | Repr::Integer { bit_width, .. } => bit_width,
            _ => panic!("Expected integer, found {:?}", self.kind())
        }
    }

    // -------------------------- Floats --------------------------

    pub fn f32(value: f32) -> Self {
        Value(Repr::Float32(value.to_bits()))
    }

    pub fn f64(value: f64) -> Self {
        Value(Repr::Float64(value.to_bits()))
    }

    pub fn float(value: &ApFloat, arena: &'a Arena) -> Self {
        // singles and doubles are by far the most common, keep them inline
        match value.format() {
            FloatFormat::IeeeSingle => Value(Repr::Float32(value.bits().words()[0] as u32)),
            FloatFormat::IeeeDouble => Value(Repr::Float64(value.bits().words()[0])),
            format => {
                let boxed = BoxedFloat { format, words: arena.alloc_slice(value.bits().words()) };
                Value(Repr::Float(arena.alloc(boxed)))
            }
        }
    }

    pub fn float_value(&self) -> ApFloat {
        match self.0 {
            Repr::Float32(bits) => ApFloat::from_f32(f32::from_bits(bits)),
            Repr::Float64(bits) => ApFloat::from_f64(f64::from_bits(bits)),
            Repr::Float(boxed) => {
                let bits = ApInt::from_raw(boxed.format.bit_size(), boxed.words);
                match ApFloat::new(boxed.format, bits) {
                    Ok(f) => f,
                    Err(e) => panic!("corrupt boxed float: {}", e)
                }
            },
            _ => panic!("Expected float, found {:?}", self.kind())
        }
    }

    pub fn float_format(&self) -> FloatFormat {
        match self.0 {
            Repr::Float32(_) => FloatFormat::IeeeSingle,
            Repr::Float64(_) => FloatFormat::IeeeDouble,
            Repr::Float(boxed) => boxed.format,
            _ => panic!("Expected float, found {:?}", self.kind())
        }
    }

    // -------------------------- Strings --------------------------

    pub fn string(bytes: &[u8], arena: &'a Arena) -> Self {
        Value(Repr::String(arena.alloc_slice(bytes)))
    }

    pub fn string_value(&self) -> &'a [u8] {
        match self.0 {
            Repr::String(s) => s,
            _ => panic!("Expected string, found {:?}", self.kind())
        }
    }

    // -------------------------- Aggregates --------------------------

    /// Copies the element handles into the arena. The elements themselves
    /// are shared, not cloned.
    pub fn aggregate(elements: &[Value<'a>], arena: &'a Arena) -> Self {
        Value(Repr::Aggregate(arena.alloc_slice(elements)))
    }

    pub fn aggregate_value(&self) -> &'a [Value<'a>] {
        match self.0 {
            Repr::Aggregate(elements) => elements,
            _ => panic!("Expected aggregate, found {:?}", self.kind())
        }
    }

    /// Digs through single element aggregates and returns whatever is
    /// inside. Integers and floats are usually wrapped like this.
    pub fn look_through_single_element_aggregates(&self) -> Value<'a> {
        let mut result = *self;
        while let Repr::Aggregate([inner]) = result.0 {
            result = *inner;
        }
        result
    }

    // -------------------------- Enums --------------------------

    pub fn enum_case(case: EnumCaseRef) -> Self {
        Value(Repr::Enum(case))
    }

    pub fn enum_with_payload(case: EnumCaseRef, payload: Value<'a>, arena: &'a Arena) -> Self {
        assert!(payload.is_constant(), "enum payload must be a constant");
        Value(Repr::EnumWithPayload(arena.alloc(EnumPayload { case, payload })))
    }

    pub fn enum_case_value(&self) -> EnumCaseRef {
        match self.0 {
            Repr::Enum(case) => case,
            Repr::EnumWithPayload(p) => p.case,
            _ => panic!("Expected enum, found {:?}", self.kind())
        }
    }

    pub fn enum_payload_value(&self) -> Value<'a> {
        match self.0 {
            Repr::EnumWithPayload(p) => p.payload,
            _ => panic!("Expected enum with payload, found {:?}", self.kind())
        }
    }

    // -------------------------- Addresses --------------------------

    pub fn direct_address(object: &'a MemoryObject<'a>) -> Self {
        Value(Repr::DirectAddress(object))
    }

    /// The address of the element of `object` selected by `path`.
    /// An empty path needs no allocation at all.
    pub fn address(object: &'a MemoryObject<'a>, path: &[usize], arena: &'a Arena) -> Self {
        if path.is_empty() {
            return Self::direct_address(object)
        }
        let derived = DerivedAddress { object, path: arena.alloc_slice(path) };
        Value(Repr::DerivedAddress(arena.alloc(derived)))
    }

    /// The memory object and the access path into it.
    pub fn address_value(&self) -> (&'a MemoryObject<'a>, &'a [usize]) {
        match self.0 {
            Repr::DirectAddress(object) => (object, &[]),
            Repr::DerivedAddress(d) => (d.object, d.path),
            _ => panic!("Expected address, found {:?}", self.kind())
        }
    }

    pub fn address_memory_object(&self) -> &'a MemoryObject<'a> {
        self.address_value().0
    }

    // -------------------------- Arrays --------------------------

    pub fn array(elements: &[Value<'a>], element_type: TypeRef, arena: &'a Arena) -> Self {
        let storage = ArrayStorage { element_type, elements: arena.alloc_slice(elements) };
        Value(Repr::Array(arena.alloc(storage)))
    }

    // The array is read from `object` every time it is looked at,
    // so it follows later writes to the object.
    pub fn array_address(object: &'a MemoryObject<'a>) -> Self {
        Value(Repr::ArrayAddress(object))
    }

    /// The declared element type and the elements.
    pub fn array_value(&self) -> (TypeRef, &'a [Value<'a>]) {
        match self.0 {
            Repr::Array(storage) => (storage.element_type, storage.elements),
            Repr::ArrayAddress(object) => match object.value().0 {
                Repr::Array(storage) => (storage.element_type, storage.elements),
                _ => panic!("array address must point at an array, found {:?}", object.value().kind())
            },
            _ => panic!("Expected array, found {:?}", self.kind())
        }
    }

    // -------------------------- Unknown --------------------------

    pub fn unknown(node: NodeRef, reason: UnknownReason, call_stack: &[SourceLoc],
                   arena: &'a Arena) -> Self {
        let info = UnknownInfo::new(node, reason, arena.alloc_slice(call_stack));
        Value(Repr::Unknown(arena.alloc(info)))
    }

    pub fn unknown_info(&self) -> &'a UnknownInfo<'a> {
        match self.0 {
            Repr::Unknown(info) => info,
            _ => panic!("Expected unknown, found {:?}", self.kind())
        }
    }

    pub fn unknown_node(&self) -> NodeRef {
        self.unknown_info().node()
    }

    pub fn unknown_reason(&self) -> UnknownReason {
        self.unknown_info().reason()
    }

    pub fn unknown_call_stack(&self) -> &'a [SourceLoc] {
        self.unknown_info().call_stack()
    }

    // -------------------------- Cloning --------------------------

    /// Deep copies this value and everything it refers to into `arena`,
    /// so that it can outlive the arena it was built in.
    ///
    /// Every memory object reachable from the value is copied exactly once,
    /// so addresses which alias in the source alias in the copy too, and an
    /// object holding its own address is fine.
    pub fn clone_into<'b>(&self, arena: &'b Arena) -> Value<'b> {
        let before = arena.allocated_bytes();
        let mut objects = ObjectMap::new();
        let result = self.clone_rec(arena, &mut objects);
        log::trace!(target: "clone", "cloned {:?} value ({} bytes allocated, was {}, {} memory objects)",
                    self.kind(), arena.allocated_bytes(), before, objects.len());
        result
    }

    fn clone_rec<'b>(&self, arena: &'b Arena, objects: &mut ObjectMap<'b>) -> Value<'b> {
        match self.0 {
            Repr::UninitMemory => Value(Repr::UninitMemory),
            Repr::Metatype(ty) => Value(Repr::Metatype(ty)),
            Repr::Function(f) => Value(Repr::Function(f)),
            Repr::Enum(case) => Value(Repr::Enum(case)),
            Repr::IntegerInline { word, bit_width } => Value(Repr::IntegerInline { word, bit_width }),
            Repr::Float32(bits) => Value(Repr::Float32(bits)),
            Repr::Float64(bits) => Value(Repr::Float64(bits)),
            Repr::Unknown(info) =>
                Value::unknown(info.node(), info.reason(), info.call_stack(), arena),
            Repr::Integer { words, bit_width } =>
                Value(Repr::Integer { words: arena.alloc_slice(words), bit_width }),
            Repr::Float(boxed) => {
                let boxed = BoxedFloat { format: boxed.format, words: arena.alloc_slice(boxed.words) };
                Value(Repr::Float(arena.alloc(boxed)))
            },
            Repr::String(s) => Value::string(s, arena),
            Repr::Aggregate(elements) => {
                let elements: Vec<Value<'b>> = elements.iter().map(|e| e.clone_rec(arena, objects)).collect();
                Value::aggregate(&elements, arena)
            },
            Repr::EnumWithPayload(p) =>
                Value::enum_with_payload(p.case, p.payload.clone_rec(arena, objects), arena),
            Repr::DirectAddress(_) | Repr::DerivedAddress(_) => {
                let (object, path) = self.address_value();
                Value::address(clone_object(object, arena, objects), path, arena)
            },
            Repr::Array(storage) => {
                let elements: Vec<Value<'b>> = storage.elements.iter()
                    .map(|e| e.clone_rec(arena, objects)).collect();
                Value::array(&elements, storage.element_type, arena)
            },
            Repr::ArrayAddress(object) => Value::array_address(clone_object(object, arena, objects))
        }
    }
}

// source memory object -> its copy, for the duration of one clone_into
type ObjectMap<'b> = HashMap<*const u8, &'b MemoryObject<'b>>;

fn clone_object<'a, 'b>(object: &'a MemoryObject<'a>, arena: &'b Arena,
                        objects: &mut ObjectMap<'b>) -> &'b MemoryObject<'b> {
    let key = object as *const MemoryObject<'a> as *const u8;
    if let Some(&copy) = objects.get(&key) {
        return copy
    }
    // registered before its contents are copied, so cycles end up here
    let copy = MemoryObject::create(object.ty(), Value::uninit_memory(), arena);
    objects.insert(key, copy);
    copy.set_value(object.value().clone_rec(arena, objects));
    copy
}
