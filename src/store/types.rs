use super::TypeRef;

// The shape of a composite type, as far as access paths are concerned.
// Struct members are listed in declaration order, tuple members by position.
#[derive(Clone, Copy, Debug)]
pub enum Composite<'t> {
    Struct(&'t [TypeRef]),
    Tuple(&'t [TypeRef]),
    Other
}

impl<'t> Composite<'t> {
    pub fn members(&self) -> Option<&'t [TypeRef]> {
        match self {
            Composite::Struct(m) | Composite::Tuple(m) => Some(m),
            Composite::Other => None
        }
    }
}

/// The type system, seen from the store.
///
/// Array element types are not asked for: arrays carry their declared
/// element type in the value itself.
pub trait TypeOracle {
    fn composite(&self, ty: TypeRef) -> Composite<'_>;
}

pub(crate) fn member_type<O: TypeOracle + ?Sized>(types: &O, ty: TypeRef, index: usize) -> TypeRef {
    let members = match types.composite(ty).members() {
        Some(m) => m,
        None => panic!("the access path is invalid for type {}", ty)
    };
    assert!(index < members.len(), "invalid index {} into {}", index, ty);
    members[index]
}

pub(crate) fn member_count<O: TypeOracle + ?Sized>(types: &O, ty: TypeRef) -> usize {
    match types.composite(ty).members() {
        Some(m) => m.len(),
        None => panic!("the access path is invalid for type {}", ty)
    }
}

#[derive(Clone, Debug)]
pub enum TypeEntry {
    Scalar(String),
    Struct(String, Vec<TypeRef>),
    Tuple(Vec<TypeRef>),
    Array(TypeRef)
}

// A plain vector-backed type table, for embedders which do not have
// a type system of their own to plug in.
#[derive(Default, Debug)]
pub struct TypeTable {
    entries: Vec<TypeEntry>
}

impl TypeTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, entry: TypeEntry) -> TypeRef {
        self.entries.push(entry);
        TypeRef((self.entries.len() - 1) as u32)
    }

    pub fn scalar(&mut self, name: &str) -> TypeRef {
        self.insert(TypeEntry::Scalar(name.to_string()))
    }

    pub fn structure(&mut self, name: &str, fields: Vec<TypeRef>) -> TypeRef {
        self.insert(TypeEntry::Struct(name.to_string(), fields))
    }

    pub fn tuple(&mut self, elements: Vec<TypeRef>) -> TypeRef {
        self.insert(TypeEntry::Tuple(elements))
    }

    pub fn array(&mut self, element: TypeRef) -> TypeRef {
        self.insert(TypeEntry::Array(element))
    }

    pub fn get(&self, ty: TypeRef) -> Option<&TypeEntry> {
        self.entries.get(ty.0 as usize)
    }
}

impl TypeOracle for TypeTable {
    fn composite(&self, ty: TypeRef) -> Composite<'_> {
        match self.get(ty) {
            Some(TypeEntry::Struct(_, fields)) => Composite::Struct(fields),
            Some(TypeEntry::Tuple(elements)) => Composite::Tuple(elements),
            _ => Composite::Other
        }
    }
}
