use super::{Value, Kind};

use pretty::{DocAllocator, DocBuilder, BoxAllocator, BoxDoc};
use std::fmt;
use std::ops::Deref;

#[derive(Clone, Copy, Debug)]
pub enum Depth {
    Fixed(usize),
    Infinite
}

impl Depth {
    pub fn is_zero(&self) -> bool {
        match self { Depth::Fixed(0) => true, _ => false }
    }
    pub fn dec(&self) -> Depth {
        match self {
            Depth::Fixed(i) => Depth::Fixed(i.saturating_sub(1)),
            _ => Depth::Infinite
        }
    }
}

// One line per scalar, composites open a nested block
// once they have more than a single element.
pub fn pretty_value<'v, 'a, D, A>(value: &Value<'v>, depth: Depth, a: &'a D) -> DocBuilder<'a, D, A>
            where A: 'a, D: ?Sized + DocAllocator<'a, A> {
    if depth.is_zero() { return a.text("...") }
    match value.kind() {
        Kind::UninitMemory => a.text("uninit"),
        Kind::Unknown => {
            let reason : &'static str = value.unknown_reason().into();
            a.text(format!("unknown({}): {}", reason, value.unknown_node()))
        },
        Kind::Metatype => a.text(format!("metatype: {}", value.metatype_value())),
        Kind::Function => a.text(format!("fn: {}", value.function_value())),
        Kind::Integer => a.text(format!("int: {}", value.integer_value())),
        Kind::Float => a.text(format!("float: {}", value.float_value())),
        Kind::String =>
            a.text(format!("string: {:?}", String::from_utf8_lossy(value.string_value()))),
        Kind::Aggregate => pretty_elements(a.text("agg:"), value.aggregate_value(), depth, a),
        Kind::Enum => a.text(format!("enum: {}", value.enum_case_value())),
        Kind::EnumWithPayload =>
            a.text(format!("enum: {}, payload: ", value.enum_case_value()))
             .append(pretty_value(&value.enum_payload_value(), depth.dec(), a)),
        Kind::Address => {
            let (object, path) = value.address_value();
            let path = path.iter().map(|i| a.text(format!("{}", i)));
            a.text(format!("address[{}] ", object.ty()))
             .append(a.intersperse(path, ", "))
        },
        Kind::Array => {
            let (element_type, elements) = value.array_value();
            pretty_elements(a.text(format!("array<{}>:", element_type)), elements, depth, a)
        }
    }
}

fn pretty_elements<'v, 'a, D, A>(head: DocBuilder<'a, D, A>, elements: &[Value<'v>],
                                 depth: Depth, a: &'a D) -> DocBuilder<'a, D, A>
            where A: 'a, D: ?Sized + DocAllocator<'a, A> {
    match elements.len() {
        0 => head.append(" 0 elements []"),
        1 => head.append(" 1 elt: ").append(pretty_value(&elements[0], depth.dec(), a)),
        n => {
            let body = elements.iter().fold(a.nil(), |doc, e| {
                doc.append(a.hardline()).append(pretty_value(e, depth.dec(), a))
            });
            head.append(format!(" {} elements [", n))
                .append(body.nest(2))
                .append(a.hardline())
                .append("]")
        }
    }
}

impl<'v> Value<'v> {
    pub fn pretty<'a, D, A>(&self, depth: Depth, a: &'a D) -> DocBuilder<'a, D, A>
            where A: 'a, D: ?Sized + DocAllocator<'a, A> {
        pretty_value(self, depth, a)
    }

    pub fn to_pretty(&self, depth: Depth, width: usize) -> String {
        let doc : BoxDoc<'_, ()> = self.pretty(depth, &BoxAllocator).into_doc();
        format!("{}", doc.deref().pretty(width))
    }

    pub fn dump(&self) {
        eprintln!("{}", self.to_pretty(Depth::Infinite, 80))
    }
}

impl<'v> fmt::Display for Value<'v> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_pretty(Depth::Infinite, 80))
    }
}
