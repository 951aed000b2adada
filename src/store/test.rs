use super::*;
use super::print::Depth;
use crate::diag::{NodeRef, UnknownReason, SourceLoc};
use crate::ErrorKind;

use codespan::{Files, Span};
use num_bigint::BigInt;

fn int32<'a>(v: u64) -> Value<'a> {
    Value::int(v, 32)
}

#[test]
fn test_store_integer() {
    // inline integers never touch the arena
    let v = Value::int(42, 32);
    assert_eq!(v.kind(), Kind::Integer);
    assert_eq!(v.integer_bit_width(), 32);
    assert_eq!(v.integer_value(), ApInt::from_u64(42, 32));

    // bits above the width are dropped
    assert_eq!(Value::int(0x1ff, 8).integer_value(), ApInt::from_u64(0xff, 8));

    let arena = Arena::new();
    let wide = ApInt::new(128, vec![0xdead_beef, 0x1234]).unwrap();
    let v = Value::integer(&wide, &arena);
    assert_eq!(v.kind(), Kind::Integer);
    assert_eq!(v.integer_bit_width(), 128);
    assert_eq!(v.integer_value(), wide);

    // a single word ApInt reads back the same as Value::int
    let narrow = ApInt::from_i64(-3, 16);
    assert_eq!(Value::integer(&narrow, &arena), Value::int(0xfffd, 16));
}

#[test]
fn test_store_float() {
    let v = Value::f32(1.5);
    assert_eq!(v.kind(), Kind::Float);
    assert_eq!(v.float_format(), FloatFormat::IeeeSingle);
    assert_eq!(v.float_value().to_f32(), Some(1.5));

    let v = Value::f64(-0.25);
    assert_eq!(v.float_format(), FloatFormat::IeeeDouble);
    assert_eq!(v.float_value().to_f64(), Some(-0.25));

    let arena = Arena::new();
    // going through ApFloat picks the same inline storage
    assert_eq!(Value::float(&ApFloat::from_f64(2.0), &arena), Value::f64(2.0));

    // x87 and quad floats are boxed, but come back bit for bit
    let bits = ApInt::new(80, vec![0x8000_0000_0000_0000, 0x3fff]).unwrap();
    let ext = ApFloat::new(FloatFormat::X87DoubleExtended, bits).unwrap();
    let v = Value::float(&ext, &arena);
    assert_eq!(v.kind(), Kind::Float);
    assert_eq!(v.float_format(), FloatFormat::X87DoubleExtended);
    assert_eq!(v.float_value(), ext);
    assert_eq!(v.float_value().to_f64(), None);

    let bits = ApInt::new(128, vec![0, 0x3fff_0000_0000_0000]).unwrap();
    let quad = ApFloat::new(FloatFormat::IeeeQuad, bits).unwrap();
    assert_eq!(Value::float(&quad, &arena).float_value(), quad);
}

#[test]
fn test_store_string() {
    let arena = Arena::new();
    let empty = Value::string(b"", &arena);
    assert_eq!(empty.kind(), Kind::String);
    assert!(empty.string_value().is_empty());

    let long = "the quick brown fox jumps over the lazy dog ".repeat(100);
    let v = Value::string(long.as_bytes(), &arena);
    assert_eq!(v.string_value(), long.as_bytes());
    // the bytes were copied into the arena
    assert!(arena.owns(v.string_value().as_ptr()));
    assert!(!arena.owns(long.as_ptr()));
}

#[test]
fn test_store_trivial() {
    assert_eq!(Value::uninit_memory().kind(), Kind::UninitMemory);
    assert!(!Value::uninit_memory().is_constant());

    let v = Value::metatype(TypeRef(3));
    assert_eq!(v.kind(), Kind::Metatype);
    assert_eq!(v.metatype_value(), TypeRef(3));

    let v = Value::function(FunctionRef(9));
    assert_eq!(v.kind(), Kind::Function);
    assert_eq!(v.function_value(), FunctionRef(9));
    assert!(v.is_constant());
}

#[test]
fn test_store_enum() {
    let arena = Arena::new();
    let plain = Value::enum_case(EnumCaseRef(1));
    assert_eq!(plain.kind(), Kind::Enum);
    assert_eq!(plain.enum_case_value(), EnumCaseRef(1));

    let payload = Value::string(b"boxed", &arena);
    let v = Value::enum_with_payload(EnumCaseRef(2), payload, &arena);
    assert_eq!(v.kind(), Kind::EnumWithPayload);
    assert_eq!(v.enum_case_value(), EnumCaseRef(2));
    assert_eq!(v.enum_payload_value().string_value(), b"boxed");
}

#[test]
#[should_panic]
fn test_enum_payload_must_be_constant() {
    let arena = Arena::new();
    Value::enum_with_payload(EnumCaseRef(0), Value::uninit_memory(), &arena);
}

#[test]
fn test_look_through_single_element_aggregates() {
    let arena = Arena::new();
    let inner = Value::int(7, 64);
    let wrapped = Value::aggregate(&[Value::aggregate(&[inner], &arena)], &arena);
    let found = wrapped.look_through_single_element_aggregates();
    assert_eq!(found, inner);
    // idempotent
    assert_eq!(found.look_through_single_element_aggregates(), found);

    // anything with more than one element is left alone
    let pair = Value::aggregate(&[inner, inner], &arena);
    assert_eq!(pair.look_through_single_element_aggregates(), pair);
    let empty = Value::aggregate(&[], &arena);
    assert_eq!(empty.look_through_single_element_aggregates(), empty);
}

#[test]
fn test_memory_set_element() {
    // {1, 2} with [1] set to 99
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let pair = types.tuple(vec![i32t, i32t]);

    let obj = MemoryObject::create(pair, Value::aggregate(&[int32(1), int32(2)], &arena), &arena);
    obj.set_indexed_element(&[1], int32(99), &types, &arena);
    assert_eq!(obj.get_indexed_element(&[0], &types), int32(1));
    assert_eq!(obj.get_indexed_element(&[1], &types), int32(99));
    assert_eq!(obj.value().aggregate_value(), &[int32(1), int32(99)]);
}

#[test_log::test]
fn test_memory_structural_sharing() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let str_t = types.scalar("String");
    let inner = types.tuple(vec![str_t, str_t]);
    let outer = types.structure("Outer", vec![inner, str_t]);

    let a = Value::string(b"a", &arena);
    let b = Value::string(b"b", &arena);
    let c = Value::string(b"c", &arena);
    let old = Value::aggregate(&[Value::aggregate(&[a, b], &arena), c], &arena);
    let obj = MemoryObject::create(outer, old, &arena);

    obj.set_indexed_element(&[0, 1], Value::string(b"z", &arena), &types, &arena);
    let new = obj.value();

    // the old value was not touched
    assert_eq!(old.aggregate_value()[0].aggregate_value()[1].string_value(), b"b");
    // untouched siblings are the very same payloads
    let new_c = new.aggregate_value()[1].string_value();
    assert!(std::ptr::eq(new_c, c.string_value()));
    let new_a = new.aggregate_value()[0].aggregate_value()[0].string_value();
    assert!(std::ptr::eq(new_a, a.string_value()));
    assert_eq!(obj.get_indexed_element(&[0, 1], &types).string_value(), b"z");
    // while the spine along the path is new
    assert!(!std::ptr::eq(new.aggregate_value(), old.aggregate_value()));
}

#[test_log::test]
fn test_memory_uninit() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let inner = types.tuple(vec![i32t, i32t]);
    let outer = types.structure("Outer", vec![inner, i32t]);

    let obj = MemoryObject::create(outer, Value::uninit_memory(), &arena);
    // everything inside uninit memory reads as uninit memory
    assert_eq!(obj.get_indexed_element(&[0, 1], &types).kind(), Kind::UninitMemory);
    assert_eq!(obj.get_indexed_element(&[], &types).kind(), Kind::UninitMemory);

    // writing scalarizes just enough to hold the element
    obj.set_indexed_element(&[0, 1], int32(5), &types, &arena);
    let value = obj.value();
    assert_eq!(value.kind(), Kind::Aggregate);
    let members = value.aggregate_value();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1].kind(), Kind::UninitMemory);
    assert_eq!(members[0].aggregate_value(), &[Value::uninit_memory(), int32(5)]);
    assert_eq!(obj.get_indexed_element(&[0, 0], &types).kind(), Kind::UninitMemory);
    assert_eq!(obj.get_indexed_element(&[0, 1], &types), int32(5));
}

#[test]
fn test_memory_empty_path() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let obj = MemoryObject::create(i32t, int32(1), &arena);
    assert_eq!(obj.get_indexed_element(&[], &types), int32(1));
    obj.set_indexed_element(&[], int32(2), &types, &arena);
    assert_eq!(obj.value(), int32(2));
}

#[test]
fn test_memory_array() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let arr_t = types.array(i32t);

    let arr = Value::array(&[int32(1), int32(2), int32(3)], i32t, &arena);
    let obj = MemoryObject::create(arr_t, arr, &arena);
    obj.set_indexed_element(&[2], int32(30), &types, &arena);
    assert_eq!(obj.get_indexed_element(&[2], &types), int32(30));

    // still an array of the same element type
    let (element_type, elements) = obj.value().array_value();
    assert_eq!(element_type, i32t);
    assert_eq!(elements, &[int32(1), int32(2), int32(30)]);
    // and the old array is unchanged
    assert_eq!(arr.array_value().1, &[int32(1), int32(2), int32(3)]);
}

#[test]
#[should_panic(expected = "the access path is invalid")]
fn test_memory_path_into_scalar() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let obj = MemoryObject::create(i32t, int32(1), &arena);
    obj.get_indexed_element(&[0], &types);
}

#[test]
#[should_panic]
fn test_memory_index_out_of_range() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let pair = types.tuple(vec![i32t, i32t]);
    let obj = MemoryObject::create(pair, Value::aggregate(&[int32(1), int32(2)], &arena), &arena);
    obj.set_indexed_element(&[2], int32(3), &types, &arena);
}

#[test]
fn test_memory_identity() {
    let arena = Arena::new();
    let a = MemoryObject::create(TypeRef(0), int32(1), &arena);
    let b = MemoryObject::create(TypeRef(0), int32(1), &arena);
    assert_eq!(a, a);
    assert_ne!(a, b);
}

#[test]
fn test_store_address() {
    let arena = Arena::new();
    let obj = MemoryObject::create(TypeRef(0), Value::uninit_memory(), &arena);

    let direct = Value::direct_address(obj);
    assert_eq!(direct.kind(), Kind::Address);
    let (target, path) = direct.address_value();
    assert_eq!(target, obj);
    assert!(path.is_empty());

    let derived = Value::address(obj, &[1, 0, 2], &arena);
    assert_eq!(derived.kind(), Kind::Address);
    assert_eq!(derived.address_value().1, &[1, 0, 2]);
    assert_eq!(derived.address_memory_object(), obj);

    // an empty path is just a direct address
    assert_eq!(Value::address(obj, &[], &arena), direct);
}

#[test]
fn test_store_array_address() {
    let arena = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let arr_t = types.array(i32t);

    let obj = MemoryObject::create(arr_t, Value::array(&[int32(1), int32(2)], i32t, &arena), &arena);
    let view = Value::array_address(obj);
    assert_eq!(view.kind(), Kind::Array);
    assert_eq!(view.array_value().1, &[int32(1), int32(2)]);

    // reads whatever the object holds right now
    obj.set_indexed_element(&[0], int32(10), &types, &arena);
    let (element_type, elements) = view.array_value();
    assert_eq!(element_type, i32t);
    assert_eq!(elements, &[int32(10), int32(2)]);
}

#[test]
fn test_store_unknown() {
    let arena = Arena::new();
    let mut files = Files::new();
    let file = files.add("a.swift", "let x = 1\nlet y = x + 1\n");
    let stack = vec![SourceLoc::new(file, Span::new(0, 9)), SourceLoc::new(file, Span::new(10, 23))];

    let v = Value::unknown(NodeRef(4), UnknownReason::Overflow, &stack, &arena);
    assert_eq!(v.kind(), Kind::Unknown);
    assert!(!v.is_constant());
    assert_eq!(v.unknown_node(), NodeRef(4));
    assert_eq!(v.unknown_reason(), UnknownReason::Overflow);
    assert_eq!(v.unknown_call_stack(), &stack[..]);
    drop(stack);
    // the call stack was copied
    assert_eq!(v.unknown_call_stack().len(), 2);
    assert_eq!(v.unknown_info().call_stack()[1].span, Span::new(10, 23));
}

#[test]
#[should_panic(expected = "Expected integer")]
fn test_wrong_accessor() {
    let arena = Arena::new();
    Value::string(b"not a number", &arena).integer_value();
}

#[test_log::test]
fn test_clone_into() {
    let dst = Arena::new();
    let (clone, printed, stack) = {
        let src = Arena::new();
        let mut files = Files::new();
        let file = files.add("a.swift", "fold me\n");
        let stack = vec![SourceLoc::new(file, Span::new(0, 4))];

        let wide = ApInt::new(100, vec![1, 2]).unwrap();
        let ext = ApFloat::new(FloatFormat::IeeeQuad, ApInt::from_u64(7, 128)).unwrap();
        let arr = Value::array(&[Value::string(b"hello", &src), Value::string(b"", &src)], TypeRef(1), &src);
        let obj = MemoryObject::create(TypeRef(2), arr, &src);
        let agg = Value::aggregate(&[
            Value::integer(&wide, &src),
            Value::float(&ext, &src),
            Value::enum_with_payload(EnumCaseRef(3), Value::f32(0.5), &src),
            Value::address(obj, &[1], &src),
            Value::array_address(obj),
            Value::unknown(NodeRef(8), UnknownReason::Loop, &stack, &src),
            Value::uninit_memory()
        ], &src);

        let clone = agg.clone_into(&dst);
        // nothing in the clone refers back to the source arena
        let elements = clone.aggregate_value();
        assert!(dst.owns(elements.as_ptr()));
        assert!(!src.owns(elements.as_ptr()));
        let (_, hello) = elements[3].address_memory_object().value().array_value();
        assert!(dst.owns(hello[0].string_value().as_ptr()));
        assert!(!src.owns(hello[0].string_value().as_ptr()));
        assert!(dst.owns(elements[5].unknown_call_stack().as_ptr()));
        // the address points at a fresh object
        assert!(!std::ptr::eq(elements[3].address_memory_object() as *const _ as *const u8,
                              obj as *const _ as *const u8));
        // the array view reads through the same copied object
        assert_eq!(elements[4].array_value().1.len(), 2);
        let copied = elements[3].address_memory_object();
        let held = copied.value();
        copied.set_value(Value::array(&[], TypeRef(1), &dst));
        assert!(elements[4].array_value().1.is_empty());
        copied.set_value(held);

        (clone, agg.to_string(), stack)
    };
    // the source arena is gone, the clone still reads the same
    assert_eq!(clone.to_string(), printed);
    let elements = clone.aggregate_value();
    assert_eq!(elements[0].integer_value(), ApInt::new(100, vec![1, 2]).unwrap());
    assert_eq!(elements[1].float_format(), FloatFormat::IeeeQuad);
    assert_eq!(elements[2].enum_payload_value().float_value().to_f32(), Some(0.5));
    assert_eq!(elements[3].address_value().1, &[1]);
    assert_eq!(elements[4].array_value().1[0].string_value(), b"hello");
    assert_eq!(elements[5].unknown_reason(), UnknownReason::Loop);
    assert_eq!(elements[5].unknown_call_stack(), &stack[..]);
    assert_eq!(elements[6].kind(), Kind::UninitMemory);
}

#[test]
fn test_clone_self_address() {
    let dst = Arena::new();
    let clone = {
        let src = Arena::new();
        let obj = MemoryObject::create(TypeRef(0), Value::uninit_memory(), &src);
        obj.set_value(Value::direct_address(obj));
        Value::direct_address(obj).clone_into(&dst)
    };
    // the copy points at itself, just like the original did
    let copied = clone.address_memory_object();
    assert_eq!(copied.ty(), TypeRef(0));
    assert_eq!(copied.value().address_memory_object(), copied);
    assert!(dst.owns(copied as *const MemoryObject<'_>));
}

#[test]
fn test_clone_shared_object() {
    let dst = Arena::new();
    let src = Arena::new();
    let mut types = TypeTable::new();
    let i32t = types.scalar("Int32");
    let pair = types.tuple(vec![i32t, i32t]);

    let obj = MemoryObject::create(pair, Value::aggregate(&[int32(1), int32(2)], &src), &src);
    let other = MemoryObject::create(i32t, int32(3), &src);
    let agg = Value::aggregate(&[
        Value::direct_address(obj),
        Value::address(obj, &[1], &src),
        Value::direct_address(other)
    ], &src);

    let elements = agg.clone_into(&dst).aggregate_value();
    let first = elements[0].address_memory_object();
    // two addresses of one object still share it
    assert_eq!(first, elements[1].address_memory_object());
    assert_ne!(first, elements[2].address_memory_object());

    // so a write through one is seen through the other
    first.set_indexed_element(&[1], int32(20), &types, &dst);
    let (target, path) = elements[1].address_value();
    assert_eq!(target.get_indexed_element(path, &types), int32(20));
    // while the source stays as it was
    assert_eq!(obj.get_indexed_element(&[1], &types), int32(2));
}

#[test]
fn test_print() {
    let arena = Arena::new();
    assert_eq!(Value::aggregate(&[], &arena).to_string(), "agg: 0 elements []");
    assert_eq!(Value::array(&[], TypeRef(0), &arena).to_string(), "array<%t0>: 0 elements []");
    assert_eq!(Value::aggregate(&[int32(7)], &arena).to_string(), "agg: 1 elt: int: 7");
    assert_eq!(Value::aggregate(&[int32(1), int32(2)], &arena).to_string(),
               "agg: 2 elements [\n  int: 1\n  int: 2\n]");
    assert_eq!(Value::string(b"hi", &arena).to_string(), "string: \"hi\"");
    assert_eq!(Value::f64(1.5).to_string(), "float: 1.5");
    assert_eq!(Value::uninit_memory().to_string(), "uninit");

    // depth limits cut off the nested part
    let nested = Value::aggregate(&[Value::aggregate(&[int32(1)], &arena)], &arena);
    assert_eq!(nested.to_pretty(Depth::Fixed(1), 80), "agg: 1 elt: ...");
    assert_eq!(nested.to_pretty(Depth::Infinite, 80), "agg: 1 elt: agg: 1 elt: int: 1");
}

#[test]
fn test_apint() {
    // negative values wrap into two's complement
    let v = ApInt::from_bigint(&BigInt::from(-1), 70);
    assert_eq!(v.words(), &[u64::MAX, 0x3f]);
    assert_eq!(v.to_bigint(), BigInt::from(-1));

    let big = BigInt::from(u64::MAX) * 4 + 3;
    let v = ApInt::from_bigint(&big, 128);
    assert_eq!(v.to_biguint(), big.to_biguint().unwrap());
    assert_eq!(v.num_words(), 2);
    assert!(!v.is_zero());
    assert!(ApInt::from_u64(0, 200).is_zero());
    assert_eq!(ApInt::from_i64(-5, 8).to_string(), "-5");

    // unused high bits are cleared
    assert_eq!(ApInt::new(4, vec![0xff]).unwrap().words(), &[0xf]);
    assert_eq!(ApInt::new(0, vec![]).unwrap_err().kind(), Some(ErrorKind::BadFormat));
    assert_eq!(ApInt::new(65, vec![1]).unwrap_err().kind(), Some(ErrorKind::BadFormat));
    assert_eq!(ApFloat::new(FloatFormat::IeeeHalf, ApInt::from_u64(0, 32)).unwrap_err().kind(),
               Some(ErrorKind::BadFormat));
}

#[test]
fn test_arena() {
    let arena = Arena::with_capacity(1024);
    let ptr = arena.allocate(std::alloc::Layout::new::<u64>());
    assert!(arena.owns(ptr.as_ptr()));
    assert_eq!(ptr.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
    assert!(arena.allocated_bytes() > 0);

    let other = Arena::new();
    assert!(!other.owns(ptr.as_ptr()));
}
