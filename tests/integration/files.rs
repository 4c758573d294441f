//! File-based entry points

use sapling::frontend::CompileConfig;
use sapling::vm::Value;
use sapling::{build_file, run_file};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_run_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.sl");
    fs::write(&path, "int x = 20;\nprintln(x + 1);\nreturn x * 2;\n").unwrap();

    let outcome = run_file(&path).unwrap();
    assert_eq!(outcome.output, "21\n");
    assert_eq!(outcome.value, Value::Int(40));
}

#[test]
fn test_run_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.sl");
    let err = run_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read file"));
}

#[test]
fn test_build_file_writes_ir() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("main.sl");
    let output = dir.path().join("main.ir");
    fs::write(&source, "method one = { return 1; };\nint x = one();\n").unwrap();

    let config = CompileConfig::default().with_module_name("demo");
    build_file(&source, &output, &config).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("; module demo\n@x = global i64\n"));
    assert!(text.contains("define i64 @one() {"));
    assert!(text.contains("  %0 = call i64 @one()"));
}

#[test]
fn test_config_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sapling.json");
    fs::write(&path, r#"{ "module_name": "app", "strict_redeclaration": true }"#).unwrap();

    let config = CompileConfig::from_json_file(&path).unwrap();
    assert_eq!(config.module_name, "app");
    assert_eq!(config.entry_name, "main");
    assert!(config.strict_redeclaration);
    assert!(config.register_builtins);
}
