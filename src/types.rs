use std::collections::HashMap;
use std::fmt::Write;
use std::rc::Rc;

use bitflags::bitflags;

use crate::token::Token;

/// Fixed-width numeric kinds. `Integer1` doubles as the boolean type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer1,
    Integer8,
    Integer16,
    Integer32,
    Integer64,
    UInteger8,
    UInteger16,
    UInteger32,
    UInteger64,
    Float32,
    Float64,
}

impl NumberKind {
    pub fn bit_width(self) -> u32 {
        match self {
            NumberKind::Integer1 => 1,
            NumberKind::Integer8 | NumberKind::UInteger8 => 8,
            NumberKind::Integer16 | NumberKind::UInteger16 => 16,
            NumberKind::Integer32 | NumberKind::UInteger32 | NumberKind::Float32 => 32,
            NumberKind::Integer64 | NumberKind::UInteger64 | NumberKind::Float64 => 64,
        }
    }

    pub fn is_integer(self) -> bool {
        !self.is_float()
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            NumberKind::Integer1
                | NumberKind::Integer8
                | NumberKind::Integer16
                | NumberKind::Integer32
                | NumberKind::Integer64
        )
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            NumberKind::UInteger8
                | NumberKind::UInteger16
                | NumberKind::UInteger32
                | NumberKind::UInteger64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, NumberKind::Float32 | NumberKind::Float64)
    }

    /// Human readable spelling used by diagnostics.
    pub fn literal(self) -> &'static str {
        match self {
            NumberKind::Integer1 => "Int1",
            NumberKind::Integer8 => "Int8",
            NumberKind::Integer16 => "Int16",
            NumberKind::Integer32 => "Int32",
            NumberKind::Integer64 => "Int64",
            NumberKind::UInteger8 => "UInt8",
            NumberKind::UInteger16 => "UInt16",
            NumberKind::UInteger32 => "UInt32",
            NumberKind::UInteger64 => "UInt64",
            NumberKind::Float32 => "Float32",
            NumberKind::Float64 => "Float64",
        }
    }
}

bitflags! {
    /// Independent struct declaration modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StructModifiers: u8 {
        const PACKED = 1;
        const GENERIC = 1 << 1;
        /// Opaque `extern struct` with no visible fields.
        const OPAQUE_EXTERN = 1 << 2;
    }
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub name: Token,
    pub parameters: Vec<Rc<Type>>,
    pub return_type: Rc<Type>,
    /// Number of lambda captures prepended to `parameters`.
    pub implicit_parameters_count: usize,
    pub has_varargs: bool,
    /// `None` means untyped varargs, checked against nothing.
    pub varargs_type: Option<Rc<Type>>,
    pub is_intrinsic: bool,
    pub is_generic: bool,
    pub generic_names: Vec<String>,
}

impl FunctionType {
    pub fn new(name: Token, parameters: Vec<Rc<Type>>, return_type: Rc<Type>) -> Self {
        Self {
            name,
            parameters,
            return_type,
            implicit_parameters_count: 0,
            has_varargs: false,
            varargs_type: None,
            is_intrinsic: false,
            is_generic: false,
            generic_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub name: String,
    pub fields_names: Vec<String>,
    pub fields_types: Vec<Rc<Type>>,
    pub generic_parameters: Vec<String>,
    /// Filled on instantiated generic structs with the concrete arguments.
    pub generic_parameters_types: Vec<Rc<Type>>,
    pub modifiers: StructModifiers,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: Token,
    pub values: HashMap<String, i64>,
    pub element_type: Rc<Type>,
}

/// The type language. Nominal equality on structs and enums, structural
/// equality everywhere else; see the `PartialEq` impl for the exact table.
#[derive(Debug, Clone)]
pub enum Type {
    Number(NumberKind),
    Pointer(Rc<Type>),
    StaticArray {
        element: Rc<Type>,
        size: usize,
    },
    /// `@vec [..]`, a vector over a static array.
    StaticVector(Rc<Type>),
    Function(FunctionType),
    Struct(Rc<StructType>),
    /// `name` is the canonical mangling of the field types; two tuples are
    /// the same type exactly when those manglings agree.
    Tuple {
        name: String,
        fields: Vec<Rc<Type>>,
    },
    Enum(Rc<EnumType>),
    EnumElement {
        enum_name: String,
        element: Rc<Type>,
    },
    GenericParameter(String),
    GenericStruct {
        template: Rc<StructType>,
        arguments: Vec<Rc<Type>>,
    },
    None,
    Void,
    Null,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Number(a), Type::Number(b)) => a == b,
            (Type::Pointer(a), Type::Pointer(b)) => a == b,
            (
                Type::StaticArray {
                    element: ae,
                    size: an,
                },
                Type::StaticArray {
                    element: be,
                    size: bn,
                },
            ) => an == bn && ae == be,
            (Type::StaticVector(a), Type::StaticVector(b)) => a == b,
            (Type::Function(a), Type::Function(b)) => {
                a.parameters == b.parameters
                    && a.return_type == b.return_type
                    && a.has_varargs == b.has_varargs
            }
            (Type::Struct(a), Type::Struct(b)) => a.name == b.name,
            (Type::Tuple { name: a, .. }, Type::Tuple { name: b, .. }) => a == b,
            (Type::Enum(a), Type::Enum(b)) => a.name.literal == b.name.literal,
            (Type::EnumElement { enum_name: a, .. }, Type::EnumElement { enum_name: b, .. }) => {
                a == b
            }
            (
                Type::GenericStruct {
                    template: at,
                    arguments: aa,
                },
                Type::GenericStruct {
                    template: bt,
                    arguments: ba,
                },
            ) => at.name == bt.name && aa == ba,
            (Type::GenericParameter(a), Type::GenericParameter(b)) => a == b,
            (Type::None, Type::None)
            | (Type::Void, Type::Void)
            | (Type::Null, Type::Null) => true,
            _ => false,
        }
    }
}

impl Type {
    pub fn is_number(&self) -> bool {
        matches!(self, Type::Number(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Number(kind) if kind.is_integer())
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Number(NumberKind::Integer1))
    }

    pub fn is_integer32(&self) -> bool {
        matches!(self, Type::Number(NumberKind::Integer32))
    }

    pub fn is_integer64(&self) -> bool {
        matches!(self, Type::Number(NumberKind::Integer64))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::StaticArray { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Type::StaticVector(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    pub fn is_function_pointer(&self) -> bool {
        matches!(self, Type::Pointer(base) if base.is_function())
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    pub fn is_generic_struct(&self) -> bool {
        matches!(self, Type::GenericStruct { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple { .. })
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Type::Enum(_))
    }

    pub fn is_enum_element(&self) -> bool {
        matches!(self, Type::EnumElement { .. })
    }

    pub fn is_generic_parameter(&self) -> bool {
        matches!(self, Type::GenericParameter(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    /// `None` itself, or a pointer/array whose base never resolved.
    pub fn is_none(&self) -> bool {
        match self {
            Type::None => true,
            Type::Pointer(base) => matches!(**base, Type::None),
            Type::StaticArray { element, .. } => matches!(**element, Type::None),
            _ => false,
        }
    }

    pub fn is_pointer_of(&self, base: &Type) -> bool {
        matches!(self, Type::Pointer(inner) if **inner == *base)
    }

    pub fn is_array_of(&self, base: &Type) -> bool {
        matches!(self, Type::StaticArray { element, .. } if **element == *base)
    }
}

pub fn i1_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Integer1))
}

pub fn i8_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Integer8))
}

pub fn i16_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Integer16))
}

pub fn i32_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Integer32))
}

pub fn i64_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Integer64))
}

pub fn u8_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::UInteger8))
}

pub fn u16_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::UInteger16))
}

pub fn u32_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::UInteger32))
}

pub fn u64_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::UInteger64))
}

pub fn f32_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Float32))
}

pub fn f64_type() -> Rc<Type> {
    Rc::new(Type::Number(NumberKind::Float64))
}

pub fn void_type() -> Rc<Type> {
    Rc::new(Type::Void)
}

pub fn null_type() -> Rc<Type> {
    Rc::new(Type::Null)
}

pub fn none_type() -> Rc<Type> {
    Rc::new(Type::None)
}

pub fn i8_ptr_type() -> Rc<Type> {
    Rc::new(Type::Pointer(i8_type()))
}

pub fn i32_ptr_type() -> Rc<Type> {
    Rc::new(Type::Pointer(i32_type()))
}

pub fn none_ptr_type() -> Rc<Type> {
    Rc::new(Type::Pointer(none_type()))
}

/// Whether `cast(to) value_of_from` is legal.
///
/// Void, none, enums, enum elements and bare function types never cast in
/// either direction. Numbers cast freely between each other, anything casts
/// to and from `*void`, and a static array decays to a pointer over the
/// same element type.
pub fn can_cast(from: &Type, to: &Type) -> bool {
    let uncastable = |t: &Type| {
        matches!(
            t,
            Type::Void | Type::None | Type::Enum(_) | Type::EnumElement { .. } | Type::Function(_)
        )
    };
    if uncastable(from) || uncastable(to) {
        return false;
    }

    if from.is_number() && to.is_number() {
        return true;
    }

    if from.is_pointer_of(&Type::Void) || to.is_pointer_of(&Type::Void) {
        return true;
    }

    if let (Type::StaticArray { element, .. }, Type::Pointer(base)) = (from, to) {
        return element == base;
    }

    false
}

/// Render a type the way diagnostics spell it.
pub fn type_literal(ty: &Type) -> String {
    match ty {
        Type::Number(kind) => kind.literal().to_owned(),
        Type::Pointer(base) => format!("*{}", type_literal(base)),
        Type::StaticArray { element, size } => format!("[{}]{}", size, type_literal(element)),
        Type::StaticVector(array) => format!("@vec{}", type_literal(array)),
        Type::Function(function) => {
            let mut rendered = String::from("(");
            for parameter in &function.parameters {
                let _ = write!(rendered, " {} ", type_literal(parameter));
            }
            let _ = write!(rendered, ") -> {}", type_literal(&function.return_type));
            rendered
        }
        Type::Struct(struct_type) => struct_type.name.clone(),
        Type::Tuple { fields, .. } => {
            let rendered: Vec<String> = fields.iter().map(|f| type_literal(f)).collect();
            format!("({})", rendered.join(", "))
        }
        Type::Enum(enum_type) => enum_type.name.literal.clone(),
        Type::EnumElement { enum_name, .. } => enum_name.clone(),
        Type::GenericStruct {
            template,
            arguments,
        } => {
            let rendered: Vec<String> = arguments.iter().map(|a| type_literal(a)).collect();
            format!("{}<{}>", template.name, rendered.join(","))
        }
        Type::GenericParameter(name) => name.clone(),
        Type::None => "none".to_owned(),
        Type::Void => "void".to_owned(),
        Type::Null => "null".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Span, TokenKind};

    fn struct_type(name: &str) -> Rc<Type> {
        Rc::new(Type::Struct(Rc::new(StructType {
            name: name.to_owned(),
            fields_names: vec!["x".to_owned()],
            fields_types: vec![i32_type()],
            generic_parameters: Vec::new(),
            generic_parameters_types: Vec::new(),
            modifiers: StructModifiers::empty(),
        })))
    }

    fn function_type(parameters: Vec<Rc<Type>>, return_type: Rc<Type>) -> Rc<Type> {
        let name = Token {
            kind: TokenKind::Identifier,
            span: Span::default(),
            literal: "f".to_owned(),
        };
        Rc::new(Type::Function(FunctionType::new(
            name,
            parameters,
            return_type,
        )))
    }

    #[test]
    fn number_equality_is_kind_equality() {
        assert_eq!(*i32_type(), *i32_type());
        assert_ne!(*i32_type(), *u32_type());
        assert_ne!(*i32_type(), *i64_type());
    }

    #[test]
    fn pointer_and_array_equality_is_structural() {
        assert_eq!(*i8_ptr_type(), *i8_ptr_type());
        assert_ne!(*i8_ptr_type(), *i32_ptr_type());

        let a = Type::StaticArray {
            element: i8_type(),
            size: 3,
        };
        let b = Type::StaticArray {
            element: i8_type(),
            size: 4,
        };
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn struct_equality_is_nominal() {
        assert_eq!(*struct_type("Vec2"), *struct_type("Vec2"));
        assert_ne!(*struct_type("Vec2"), *struct_type("Vec3"));
    }

    #[test]
    fn tuple_equality_is_by_mangled_name() {
        let a = Type::Tuple {
            name: "_tuple_i32i64".to_owned(),
            fields: vec![i32_type(), i64_type()],
        };
        let b = Type::Tuple {
            name: "_tuple_i32i64".to_owned(),
            fields: vec![i32_type(), i64_type()],
        };
        let c = Type::Tuple {
            name: "_tuple_i64i32".to_owned(),
            fields: vec![i64_type(), i32_type()],
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn function_equality_checks_signature() {
        let a = function_type(vec![i32_type()], i32_type());
        let b = function_type(vec![i32_type()], i32_type());
        let c = function_type(vec![i64_type()], i32_type());
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn casting_rules() {
        // Any two numbers cast, including to the same kind.
        assert!(can_cast(&i32_type(), &i64_type()));
        assert!(can_cast(&i32_type(), &i32_type()));
        assert!(can_cast(&f64_type(), &u8_type()));

        // Everything casts through *void.
        let void_ptr = Type::Pointer(void_type());
        assert!(can_cast(&i8_ptr_type(), &void_ptr));
        assert!(can_cast(&void_ptr, &struct_type("S")));

        // Array decays to pointer of the same element type only.
        let array = Type::StaticArray {
            element: i8_type(),
            size: 4,
        };
        assert!(can_cast(&array, &i8_ptr_type()));
        assert!(!can_cast(&array, &i32_ptr_type()));

        // Forbidden kinds on either side.
        assert!(!can_cast(&void_type(), &i32_type()));
        assert!(!can_cast(&i32_type(), &void_type()));
        let element = Type::EnumElement {
            enum_name: "Color".to_owned(),
            element: i32_type(),
        };
        assert!(!can_cast(&element, &i32_type()));
    }

    #[test]
    fn none_detection_descends_pointers_and_arrays() {
        assert!(none_type().is_none());
        assert!(none_ptr_type().is_none());
        let array = Type::StaticArray {
            element: none_type(),
            size: 2,
        };
        assert!(array.is_none());
        assert!(!i32_type().is_none());
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(type_literal(&i32_type()), "Int32");
        assert_eq!(type_literal(&i8_ptr_type()), "*Int8");
        let array = Type::StaticArray {
            element: i64_type(),
            size: 8,
        };
        assert_eq!(type_literal(&array), "[8]Int64");
        let function = function_type(vec![i32_type()], void_type());
        assert_eq!(type_literal(&function), "( Int32 ) -> void");
    }
}
