//! Full pipeline: source to IR to execution

use sapling::frontend::Compiler;
use sapling::middle::ir::Instruction;
use sapling::vm::{Value, Vm};
use sapling::{compile_source, run};

const PROGRAM: &str = r#"
###_ Counter demo _###
int start = 40;

class Counter = {
    int step = 2;
    method next = { return start + step; };
};

method describe = {
    #_ nested methods see root globals _#
    method label = { return "count"; };
    println(label(), start > 10 ? "big" : "small");
};

describe();
int total = start + 2 * 1;
print(total);
return total == 42;
"#;

#[test]
fn test_program_runs() {
    let outcome = run(PROGRAM).unwrap();
    assert_eq!(outcome.output, "count big\n42");
    assert_eq!(outcome.value, Value::Bool(true));
}

#[test]
fn test_program_functions() {
    let module = compile_source(PROGRAM).unwrap();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["main", "Counter.next", "describe", "describe.label", "println", "print"]
    );

    let globals: Vec<&str> = module.globals.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(globals, vec!["start", "Counter.step", "total"]);
}

#[test]
fn test_module_text_lists_every_function() {
    let text = compile_source(PROGRAM).unwrap().to_string();
    assert!(text.starts_with("; module sapling\n"));
    assert!(text.contains("define i64 @Counter.next() {"));
    assert!(text.contains("define str @describe.label() {"));
    assert!(text.contains("define void @describe() {"));
    assert!(text.contains("declare void @println(...)"));
    assert!(text.contains("define i1 @main() {"));
}

#[test]
fn test_every_block_is_terminated() {
    let module = compile_source(PROGRAM).unwrap();
    for function in module.functions.iter().filter(|f| !f.external) {
        for block in &function.blocks {
            assert!(
                block.is_terminated(),
                "block `{}` of `{}` has no terminator",
                block.label,
                function.name
            );
            let terminators = block
                .instructions
                .iter()
                .filter(|inst| inst.is_terminator())
                .count();
            assert_eq!(terminators, 1);
        }
    }
}

#[test]
fn test_phi_follows_branches() {
    let module = compile_source("int a = 3; int b = 4; int m = a > b ? a : b; return m;").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    let phis = main
        .all_instructions()
        .filter(|inst| matches!(inst, Instruction::Phi { .. }))
        .count();
    assert_eq!(phis, 1);

    assert_eq!(Vm::new(&module).run("main").unwrap(), Value::Int(4));
}

#[test]
fn test_program_display_is_stable() {
    let program = Compiler::new()
        .parse("int x = 1 + 2 * 3; method f = { return x; };")
        .unwrap();
    assert_eq!(
        program.to_string(),
        "(int x (+ 1 (* 2 3)))\n(method f -> int\n  (return x)\n)\n"
    );
}
