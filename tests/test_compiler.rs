use std::fs;

use amunc::{Backend, Compiler, CompilerError, CompilerOptions, SymbolCollector};

fn options_with_libraries(prefix: &str) -> CompilerOptions {
    CompilerOptions {
        libraries_prefix: prefix.to_owned(),
        ..CompilerOptions::default()
    }
}

#[test]
fn import_resolves_against_libraries_prefix() {
    let workspace = tempfile::tempdir().unwrap();
    let library_dir = workspace.path().join("lib");
    fs::create_dir(&library_dir).unwrap();
    fs::write(
        library_dir.join("math.amun"),
        "fun double(x int64) int64 = x + x;\n",
    )
    .unwrap();

    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "import \"math\"\nfun main() int64 { return double(21); }\n",
    )
    .unwrap();

    let options = options_with_libraries(&format!("{}/", library_dir.display()));
    let mut compiler = Compiler::new(options);
    compiler
        .check_source_code(main_path.to_str().unwrap())
        .unwrap();
}

#[test]
fn repeated_imports_are_skipped_silently() {
    let workspace = tempfile::tempdir().unwrap();
    let library_dir = workspace.path().join("lib");
    fs::create_dir(&library_dir).unwrap();
    fs::write(
        library_dir.join("math.amun"),
        "fun double(x int64) int64 = x + x;\n",
    )
    .unwrap();

    // Importing the same library twice must not redefine `double`.
    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "import { \"math\" \"math\" }\nimport \"math\"\nfun main() int64 { return double(4); }\n",
    )
    .unwrap();

    let options = options_with_libraries(&format!("{}/", library_dir.display()));
    let mut compiler = Compiler::new(options);
    compiler
        .check_source_code(main_path.to_str().unwrap())
        .unwrap();
}

#[test]
fn load_resolves_against_source_parent() {
    let workspace = tempfile::tempdir().unwrap();
    fs::write(
        workspace.path().join("helper.amun"),
        "fun helper_value() int64 = 7;\n",
    )
    .unwrap();

    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "load \"helper\"\nfun main() int64 { return helper_value(); }\n",
    )
    .unwrap();

    let mut compiler = Compiler::new(CompilerOptions::default());
    compiler
        .check_source_code(main_path.to_str().unwrap())
        .unwrap();
}

#[test]
fn missing_import_is_a_front_end_failure() {
    let workspace = tempfile::tempdir().unwrap();
    let main_path = workspace.path().join("main.amun");
    fs::write(&main_path, "import \"no_such_library\"\n").unwrap();

    let mut compiler = Compiler::new(CompilerOptions::default());
    let error = compiler
        .check_source_code(main_path.to_str().unwrap())
        .unwrap_err();
    assert!(matches!(error, CompilerError::FrontEndFailure { errors: 1 }));
}

#[test]
fn missing_source_path_is_reported() {
    let mut compiler = Compiler::new(CompilerOptions::default());
    let error = compiler
        .check_source_code("/definitely/not/here.amun")
        .unwrap_err();
    assert!(matches!(error, CompilerError::MissingSource(_)));
}

#[test]
fn warnings_as_errors_fail_the_build() {
    let workspace = tempfile::tempdir().unwrap();
    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "fun main() int32 { while (true) { break 1; } return 0; }\n",
    )
    .unwrap();

    let options = CompilerOptions {
        convert_warns_to_errors: true,
        should_report_warns: true,
        ..CompilerOptions::default()
    };
    let mut compiler = Compiler::new(options);
    let error = compiler
        .check_source_code(main_path.to_str().unwrap())
        .unwrap_err();
    assert!(matches!(
        error,
        CompilerError::WarningsAsErrors { warnings: 1 }
    ));
}

#[test]
fn backend_receives_symbols_and_instantiations() {
    let workspace = tempfile::tempdir().unwrap();
    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "\
struct Vec2 { x float32; y float32; }
operator + (a Vec2, b Vec2) Vec2 { return a; }
fun id<T>(x T) T = x;
fun main() int32 { return id<int32>(0i32); }
",
    )
    .unwrap();

    let mut compiler = Compiler::new(CompilerOptions::default());
    let mut backend = SymbolCollector::new();
    compiler
        .compile_source_code(main_path.to_str().unwrap(), &mut backend)
        .unwrap();

    assert!(backend.symbols.contains(&"main".to_owned()));
    assert!(backend.symbols.contains(&"Vec2".to_owned()));
    assert!(backend.symbols.contains(&"_operator_plusVec2Vec2".to_owned()));
    assert!(backend.symbols.contains(&"idi32".to_owned()));
    // The generic template itself is not a symbol.
    assert!(!backend.symbols.contains(&"id".to_owned()));
}

#[test]
fn custom_backend_can_skip_statements() {
    struct CountingBackend(usize);

    impl Backend for CountingBackend {
        fn visit_statement(&mut self, _statement: &amunc::ast::Statement) {
            self.0 += 1;
        }
    }

    let workspace = tempfile::tempdir().unwrap();
    let main_path = workspace.path().join("main.amun");
    fs::write(
        &main_path,
        "fun one() int64 = 1;\nfun main() int64 { return one(); }\n",
    )
    .unwrap();

    let mut compiler = Compiler::new(CompilerOptions::default());
    let mut backend = CountingBackend(0);
    compiler
        .compile_source_code(main_path.to_str().unwrap(), &mut backend)
        .unwrap();
    assert_eq!(backend.0, 2);
}
