use std::collections::HashMap;
use std::rc::Rc;

use amunc::ast::{CompilationUnit, Expression, Statement};
use amunc::checker::TypeChecker;
use amunc::diagnostics::DiagnosticLevel;
use amunc::types::{NumberKind, Type};
use amunc::{Context, Parser, Tokenizer};

/// Run the front-end over one in-memory source and return the typed tree,
/// the context holding all diagnostics, and the generic instantiations.
fn check_source(source: &str) -> (CompilationUnit, Context, HashMap<String, Rc<Type>>) {
    let mut context = Context::default();
    let file_id = context.source_manager.register_source_path("test.amun");
    let tokenizer = Tokenizer::new(file_id, source.to_owned());
    let mut parser = Parser::new(&mut context, tokenizer, "test.amun");
    let mut unit = parser.parse_compilation_unit();

    let mut instantiations = HashMap::new();
    if context.diagnostics.level_count(DiagnosticLevel::Error) == 0 {
        let mut checker = TypeChecker::new(&mut context);
        checker.check_compilation_unit(&mut unit);
        instantiations = checker.instantiations().clone();
    }
    (unit, context, instantiations)
}

fn error_messages(context: &Context) -> Vec<String> {
    context
        .diagnostics
        .diagnostics(DiagnosticLevel::Error)
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

fn warning_messages(context: &Context) -> Vec<String> {
    context
        .diagnostics
        .diagnostics(DiagnosticLevel::Warning)
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn generic_identity_instantiates_with_int32() {
    let source = "\
fun id<T>(x T) T = x;
fun main() int32 { return id<int32>(42); }
";
    let (unit, context, instantiations) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    assert_eq!(warning_messages(&context), Vec::<String>::new());

    // The instantiation is memoized under its mangled name with the
    // substituted signature.
    let instantiated = &instantiations["idi32"];
    let Type::Function(function) = &**instantiated else {
        panic!("expected a function instantiation");
    };
    assert_eq!(function.parameters.len(), 1);
    assert_eq!(*function.parameters[0], Type::Number(NumberKind::Integer32));
    assert_eq!(*function.return_type, Type::Number(NumberKind::Integer32));

    // The call expression's resolved type is int32.
    let Statement::Function(main_function) = &unit.tree_nodes[1] else {
        panic!("expected main declaration");
    };
    let Statement::Block(body) = &main_function.body else {
        panic!("expected block body");
    };
    let Statement::Return(return_statement) = &body.statements[0] else {
        panic!("expected return statement");
    };
    let call = return_statement.value.as_ref().unwrap();
    assert_eq!(*call.ty(), Type::Number(NumberKind::Integer32));
}

#[test]
fn incomplete_enum_switch_lists_missing_members() {
    let source = "\
enum Color { Red, Green, Blue }
fun name(c Color) *i8 {
  @complete switch(c) {
    Color::Red -> return \"r\";
    Color::Green -> return \"g\";
  }
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Incomplete switch, missing 1 cases"));
    assert!(errors[0].contains("Color::Blue"));
    assert_eq!(warning_messages(&context), Vec::<String>::new());
}

#[test]
fn complete_enum_switch_passes() {
    let source = "\
enum Color { Red, Green, Blue }
fun rank(c Color) int64 {
  var r = 0;
  @complete switch(c) {
    Color::Red -> r = 1;
    Color::Green -> r = 2;
    Color::Blue -> r = 3;
  }
  return r;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn null_assignment_rewrites_base_type() {
    let source = "var p : *int32 = null;\n";
    let (unit, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let Statement::FieldDeclaration(field) = &unit.tree_nodes[0] else {
        panic!("expected field declaration");
    };
    let Some(Expression::Null(null_expression)) = &field.value else {
        panic!("expected null initializer");
    };
    let Type::Pointer(base) = &*null_expression.null_base_type else {
        panic!("null base type must be a pointer");
    };
    assert_eq!(**base, Type::Number(NumberKind::Integer32));
}

#[test]
fn lambda_capture_synthesizes_implicit_parameter() {
    let source = "\
fun make() int32 {
  var k : int32 = 1;
  var f = { (x int32) int32 -> return x + k; };
  return f(2i32);
}
";
    let (unit, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let Statement::Function(function) = &unit.tree_nodes[0] else {
        panic!("expected function");
    };
    let Statement::Block(body) = &function.body else {
        panic!("expected block body");
    };
    let Statement::FieldDeclaration(field) = &body.statements[1] else {
        panic!("expected field declaration");
    };
    let Some(Expression::Lambda(lambda)) = &field.value else {
        panic!("expected lambda initializer");
    };

    assert_eq!(lambda.implicit_parameters_names, vec!["k".to_owned()]);

    let Type::Pointer(base) = &*lambda.ty else {
        panic!("lambda type is a function pointer");
    };
    let Type::Function(lambda_function) = &**base else {
        panic!("lambda type points at a function");
    };
    assert_eq!(lambda_function.implicit_parameters_count, 1);
    assert_eq!(lambda_function.parameters.len(), 2);
    assert_eq!(
        *lambda_function.parameters[0],
        Type::Number(NumberKind::Integer32)
    );
    assert_eq!(
        *lambda_function.parameters[1],
        Type::Number(NumberKind::Integer32)
    );
}

#[test]
fn capturing_lambda_as_direct_argument_is_rejected() {
    let source = "\
fun apply(callback *(int32) int32) int32 { return callback(1i32); }
fun main() int32 {
  var k : int32 = 1;
  return apply({ (x int32) int32 -> return x + k; });
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("can't capture variables"));
    assert!(errors[0].contains("-> k"));
}

#[test]
fn returning_capturing_lambda_is_rejected() {
    let source = "\
fun make() *(int32) int32 {
  var k : int32 = 1;
  return { (x int32) int32 -> return x + k; };
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("implicit capture"));
}

#[test]
fn non_capturing_lambda_argument_is_accepted() {
    let source = "\
fun apply(callback *(int32) int32) int32 { return callback(1i32); }
fun main() int32 {
  return apply({ (x int32) int32 -> return x; });
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn shift_amount_must_fit_operand_width() {
    let source = "fun main() int32 { var y : int32 = 1 << 32; return y; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("bit width (32)"));

    let source = "fun main() int32 { var y : int32 = 1 << 31; return y; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn negative_shift_amount_is_rejected() {
    let source = "fun main() int64 { var y = 1 << -2; return y; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("negative"));
}

#[test]
fn operator_overload_dispatch() {
    let source = "\
struct Vec2 { x float32; y float32; }
operator + (a Vec2, b Vec2) Vec2 { return a; }
fun main() int32 {
  var a = Vec2(1.0f32, 2.0f32);
  var b = Vec2(3.0f32, 4.0f32);
  var c : Vec2 = a + b;
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn missing_operator_overload_is_reported() {
    let source = "\
struct Vec2 { x float32; y float32; }
operator + (a Vec2, b Vec2) Vec2 { return a; }
fun main() int32 {
  var a = Vec2(1.0f32, 2.0f32);
  var c = a + 1i32;
  return 0;
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Can't find operator overloading operator plus(Vec2, Int32)"));
}

#[test]
fn break_outside_loop_is_rejected() {
    let source = "fun main() int32 { break; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("break keyword can only be used inside"));
}

#[test]
fn break_depth_is_validated_against_loop_nesting() {
    let source = "\
fun main() int32 {
  while (true) { while (true) { break 2; } }
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "\
fun main() int32 {
  while (true) { break 2; }
  return 0;
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("break times can't be bigger"));
}

#[test]
fn redundant_break_one_is_warned() {
    let source = "fun main() int32 { while (true) { break 1; } return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    let warnings = warning_messages(&context);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("break 1"));
}

#[test]
fn return_coverage_requires_else() {
    let source = "\
fun sign(x int32) int32 {
  if (x > 0i32) { return 1; } else { return 2; }
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "\
fun sign(x int32) int32 {
  if (x > 0i32) { return 1; }
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("'return' statement required"));
}

#[test]
fn integer_literal_range_is_inclusive() {
    let source = "fun main() int32 { var x : int8 = 127i8; return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { var x : int8 = 128i8; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("can't be represented"));
}

#[test]
fn constant_index_is_bounds_checked() {
    let source = "fun main() int32 { var a = [1, 2, 3]; var x = a[2]; return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { var a = [1, 2, 3]; var x = a[3]; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("bigger than or equal array size"));
}

#[test]
fn empty_range_is_no_diagnostic() {
    let source = "fun main() int32 { for (10 .. 1) { } return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    assert_eq!(warning_messages(&context), Vec::<String>::new());
}

#[test]
fn integer_switch_without_complete_is_open() {
    let source = "\
fun main() int32 {
  var x = 1;
  switch (x) { 1 -> return 2; }
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "\
fun main() int32 {
  var x = 1;
  @complete switch (x) { 1 -> return 2; }
  return 0;
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("can't be complete"));
}

#[test]
fn switch_expression_requires_exhaustiveness() {
    let source = "\
fun main() int64 {
  var x = 2;
  var y = switch (x) { 1 -> 10; 2 -> 20; else -> 0; };
  return y;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    // A full enum cover needs no else branch.
    let source = "\
enum Color { Red, Green }
fun main() int64 {
  var c = Color::Red;
  var v = switch (c) { Color::Red -> 1; Color::Green -> 2; };
  return v;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    // A partial cover without else is incomplete.
    let source = "\
enum Color { Red, Green }
fun main() int64 {
  var c = Color::Red;
  var v = switch (c) { Color::Red -> 1; };
  return v;
}
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Switch is incomplete"));
}

#[test]
fn cast_to_same_type_warns() {
    let source = "fun main() int32 { var x = cast(int32) 1i32; return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    let warnings = warning_messages(&context);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unnecessary cast"));
}

#[test]
fn invalid_cast_is_rejected() {
    let source = "\
enum Color { Red, Green }
fun main() int32 { var c = Color::Red; var x = cast(int32) c; return 0; }
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Can't cast from"));
}

#[test]
fn tuples_are_structural_and_indexed_by_position() {
    let source = "\
fun main() int32 {
  var t = (1, 2.5);
  var a : int64 = t.0;
  var b : float64 = t.1;
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { var t = (1, 2.5); var x = t.5; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("No tuple field with index 5"));
}

#[test]
fn self_referential_struct_fields_resolve_through_registry() {
    let source = "\
struct Node { value int64; next *Node; }
fun main() int32 {
  var n = Node(1, null);
  var v : int64 = n.value;
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn generic_struct_instantiation_is_cached_by_mangled_name() {
    let source = "\
struct Box<T> { value T; }
fun main() int32 {
  var b : Box<int32> = Box<int32>(1i32);
  var v : int32 = b.value;
  return 0;
}
";
    let (_, context, instantiations) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    assert!(instantiations.contains_key("Boxi32"));
}

#[test]
fn generic_function_arguments_are_inferred() {
    let source = "\
fun first<T>(items [2]T) T { return items[0]; }
fun main() int64 {
  var values = [10, 20];
  return first(values);
}
";
    let (_, context, instantiations) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
    assert!(instantiations.contains_key("firsti64"));
}

#[test]
fn generic_inference_failure_is_reported() {
    let source = "\
fun pair<A, B>(a A) A { return a; }
fun main() int64 { return pair(1); }
";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Not enough information to infer"));
}

#[test]
fn assignment_destinations_are_validated() {
    let source = "fun main() int32 { var x = 1; x = 2; return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { 1 = 2; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("number value is invalid left hand side"));
}

#[test]
fn string_literal_elements_are_readonly() {
    let source = "fun main() int32 { var s = \"abc\"; s[0i64] = 'x'; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("readonly"));
}

#[test]
fn undeclared_identifier_is_reported() {
    let source = "fun main() int32 { return missing; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Can't resolve variable with name missing"));
}

#[test]
fn main_return_type_is_validated() {
    let source = "fun main() float64 { return 1.0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("main has invalid return type"));
}

#[test]
fn duplicate_definitions_in_same_scope_are_rejected() {
    let source = "fun main() int32 { var x = 1; var x = 2; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("defined twice in the same scope"));
}

#[test]
fn enum_count_attribute_folds_to_number() {
    let source = "\
enum Color { Red, Green, Blue }
fun main() int64 { return Color.count; }
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn const_declarations_substitute_at_parse_time() {
    let source = "\
const SIZE = 3;
fun main() int64 { return SIZE + 1; }
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn defer_requires_call_expression() {
    let source = "fun g() { } fun main() int32 { defer g(); return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { defer 1 + 2; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("defer keyword expect call expression"));
}

#[test]
fn for_each_binds_element_and_index() {
    let source = "\
fun main() int64 {
  var total = 0;
  var values = [1, 2, 3];
  for (v, i : values) { total = total + v + i; }
  return total;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn underscore_suppresses_for_each_bindings() {
    let source = "\
fun main() int64 {
  var values = [1, 2, 3];
  for (_ : values) { }
  return 0;
}
";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn vector_directive_rejects_signed_elements() {
    let source = "fun main() int32 { var v = @vec [1u32, 2u32]; return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());

    let source = "fun main() int32 { var v = @vec [1i32, 2i32]; return 0; }\n";
    let (_, context, _) = check_source(source);
    let errors = error_messages(&context);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unsigned number or float"));
}

#[test]
fn location_directives_fold_to_literals() {
    let source = "fun main() int64 { return #line; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}

#[test]
fn max_value_directive_produces_kind_limit() {
    let source = "fun main() int32 { var m : uint8 = @max_value(uint8); return 0; }\n";
    let (_, context, _) = check_source(source);
    assert_eq!(error_messages(&context), Vec::<String>::new());
}
