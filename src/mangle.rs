//! Deterministic symbol names for overloads, generic instantiations and
//! tuples. These strings are part of the contract with the backend and the
//! linker: two types mangle to the same string exactly when they are the
//! same type (generic parameters excepted).

use std::rc::Rc;

use crate::token::TokenKind;
use crate::types::{NumberKind, Type};

pub fn mangle_type(ty: &Type) -> String {
    match ty {
        Type::Number(kind) => mangle_number_kind(*kind).to_owned(),
        Type::Pointer(base) => format!("p{}", mangle_type(base)),
        Type::StaticArray { element, size } => format!("_a{}{}", size, mangle_type(element)),
        Type::StaticVector(array) => format!("_v{}", mangle_type(array)),
        Type::EnumElement { enum_name, .. } => enum_name.clone(),
        Type::Struct(struct_type) => struct_type.name.clone(),
        Type::Tuple { fields, .. } => mangle_tuple_fields(fields),
        _ => String::new(),
    }
}

pub fn mangle_types(types: &[Rc<Type>]) -> String {
    let mut result = String::new();
    for ty in types {
        result.push_str(&mangle_type(ty));
    }
    result
}

pub fn mangle_tuple_fields(fields: &[Rc<Type>]) -> String {
    format!("_tuple_{}", mangle_types(fields))
}

/// `_operator_<word><mangled parameters>`. Prefix and postfix overloads are
/// stored and looked up with an extra `_prefix`/`_postfix` in front of this.
pub fn mangle_operator_function(operator: TokenKind, parameters: &[Rc<Type>]) -> String {
    let word = operator
        .overloading_literal()
        .expect("operator must be overloadable");
    let mut name = format!("_operator_{word}");
    for parameter in parameters {
        name.push_str(&mangle_type(parameter));
    }
    name
}

fn mangle_number_kind(kind: NumberKind) -> &'static str {
    match kind {
        NumberKind::Integer1 => "i1",
        NumberKind::Integer8 => "i8",
        NumberKind::Integer16 => "i16",
        NumberKind::Integer32 => "i32",
        NumberKind::Integer64 => "i64",
        NumberKind::UInteger8 => "u8",
        NumberKind::UInteger16 => "u16",
        NumberKind::UInteger32 => "u32",
        NumberKind::UInteger64 => "u64",
        NumberKind::Float32 => "f32",
        NumberKind::Float64 => "f64",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{i32_type, i64_type, i8_type, u64_type, StructModifiers, StructType};

    #[test]
    fn number_codes_are_fixed() {
        assert_eq!(mangle_type(&i32_type()), "i32");
        assert_eq!(mangle_type(&u64_type()), "u64");
    }

    #[test]
    fn composite_manglings() {
        let pointer = Type::Pointer(i8_type());
        assert_eq!(mangle_type(&pointer), "pi8");

        let array = Type::StaticArray {
            element: i64_type(),
            size: 16,
        };
        assert_eq!(mangle_type(&array), "_a16i64");

        let tuple_fields = vec![i32_type(), Rc::new(pointer)];
        assert_eq!(mangle_tuple_fields(&tuple_fields), "_tuple_i32pi8");
    }

    #[test]
    fn struct_mangles_to_its_name() {
        let vec2 = Type::Struct(Rc::new(StructType {
            name: "Vec2".to_owned(),
            fields_names: Vec::new(),
            fields_types: Vec::new(),
            generic_parameters: Vec::new(),
            generic_parameters_types: Vec::new(),
            modifiers: StructModifiers::empty(),
        }));
        assert_eq!(mangle_type(&vec2), "Vec2");

        let operator = mangle_operator_function(
            TokenKind::Plus,
            &[Rc::new(vec2.clone()), Rc::new(vec2)],
        );
        assert_eq!(operator, "_operator_plusVec2Vec2");
    }

    #[test]
    fn equal_types_mangle_equal() {
        let a = Type::Pointer(Rc::new(Type::StaticArray {
            element: i32_type(),
            size: 4,
        }));
        let b = Type::Pointer(Rc::new(Type::StaticArray {
            element: i32_type(),
            size: 4,
        }));
        assert_eq!(a, b);
        assert_eq!(mangle_type(&a), mangle_type(&b));
    }
}
