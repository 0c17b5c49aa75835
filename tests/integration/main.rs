//! Integration tests for Thicket
//!
//! These tests run the whole pipeline, enumeration through emission, on real
//! source trees in temporary directories.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use thicket_core::{Config, Ruleset, SourceFile, SynthError, Synthesizer};
use thicket_emit::Format;
use thicket_indexer::DirectiveScanner;

const CONFIG: &str = r#"
generator-suffix = ".gen.sh"
generator-command = "sh"
"#;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

/// A small library with a public header, a test, a benchmark and a generator.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "thicket.toml", CONFIG);
    write(
        root,
        "src/math/add.h",
        "/* @thicket\n * public = true\n * @end */\nint add(int a, int b);\n",
    );
    write(
        root,
        "src/math/add.c",
        "#include \"add.h\"\nint add(int a, int b) { return a + b; }\n",
    );
    write(
        root,
        "src/math/add_test.c",
        "// @thicket\n// deps = [\"add.c\"]\n// @end\n#include <assert.h>\n#include \"add.h\"\nint main(void) { assert(add(1, 2) == 3); return 0; }\n",
    );
    write(root, "src/sort_bench.cpp", "#include <vector>\nint main() { return 0; }\n");
    write(
        root,
        "src/table.h.gen.sh",
        "# @thicket\n# generator-deps = [\"table.tmpl\"]\n# @end\ncat src/table.tmpl\n",
    );
    write(root, "src/table.tmpl", "#define TABLE_SIZE 4\n");
    dir
}

fn synthesize(root: &Path) -> Result<Ruleset, SynthError> {
    let config = Config::load(root, None).unwrap();
    let scanner = DirectiveScanner::new(root, &config);
    let synth = Synthesizer::new(config, Arc::new(scanner)).unwrap();
    let files = thicket_indexer::enumerate(root, synth.config()).unwrap();
    synth.run(&files)
}

fn thicket(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_thicket"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute thicket")
}

/// Run a rule's recipe in `root` the way make would: each line through the
/// shell, stopping at the first failure.
#[cfg(unix)]
fn run_recipe(root: &Path, ruleset: &Ruleset, target: &str) -> bool {
    let rule = ruleset.get(target).unwrap();
    rule.commands.iter().all(|command| {
        let command = command.replace("$@", target);
        Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(root)
            .status()
            .unwrap()
            .success()
    })
}

#[test]
fn test_full_pipeline() {
    let dir = project();
    let ruleset = synthesize(dir.path()).unwrap();

    let export = ruleset.get("include/math/add.h").unwrap();
    assert_eq!(export.inputs, vec!["src/math/add.h"]);
    assert!(ruleset.get("prepare").unwrap().inputs.is_empty());

    let program = ruleset.get("tmp/test-math-add").unwrap();
    assert_eq!(
        program.inputs,
        vec!["tmp/test/src/math/add.c.o", "tmp/test/src/math/add_test.c.o"]
    );
    assert_eq!(program.libraries.as_deref(), Some("$(LIBS)"));
    assert_eq!(
        ruleset.get("run-test-math-add").unwrap().inputs,
        vec!["tmp/test-math-add"]
    );
    assert_eq!(ruleset.get("check").unwrap().inputs, vec!["run-test-math-add"]);

    let bench = ruleset.get("tmp/bench-sort++").unwrap();
    assert!(bench.commands.iter().any(|c| c.starts_with("$(CXX) -o $@")));
    assert!(!ruleset.contains("run-bench-sort++"));

    let generated = ruleset.get("src/table.h").unwrap();
    assert_eq!(generated.inputs, vec!["src/table.h.gen.sh", "src/table.tmpl"]);
    assert!(!ruleset.get("all").unwrap().inputs.contains(&"src/table.h".to_string()));

    assert_eq!(ruleset.macros["INCLUDEFLAGS"], "-Isrc");
}

#[test]
fn test_output_is_stable_across_runs() {
    let dir = project();
    let first = thicket_emit::render(&synthesize(dir.path()).unwrap(), Format::Make).unwrap();
    let second = thicket_emit::render(&synthesize(dir.path()).unwrap(), Format::Make).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cli_generate() {
    let dir = project();
    let output = thicket(dir.path(), &["generate"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let makefile = std::fs::read_to_string(dir.path().join("Makefile")).unwrap();
    assert!(makefile.contains(".DEFAULT_GOAL := all"));
    assert!(makefile.contains("include/math/add.h: src/math/add.h\n\t@mkdir -p $(@D)\n"));
    assert!(makefile.contains("run-test-math-add: tmp/test-math-add\n"));
    assert!(makefile.contains("\t$(VALGRIND) $(VALGRINDFLAGS) tmp/test-math-add\n"));
}

#[test]
fn test_cli_generate_json() {
    let dir = project();
    let output = thicket(dir.path(), &["generate", "-o", "rules.json", "--format", "json"]);
    assert!(output.status.success());

    let text = std::fs::read_to_string(dir.path().join("rules.json")).unwrap();
    assert!(text.contains("\"tmp/test-math-add\""));
    assert!(!dir.path().join("Makefile").exists());
}

#[test]
fn test_cli_closure() {
    let dir = project();
    let output = thicket(dir.path(), &["closure", "src/math/add_test.c"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["src/math/add.c", "src/math/add_test.c"]);
}

#[test]
fn test_cli_graph() {
    let dir = project();
    let output = thicket(dir.path(), &["graph", "src/math/add_test.c"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("digraph {"));
    assert!(stdout.contains("src/math/add.h"));
    assert!(stdout.contains("explicit"));
}

#[test]
fn test_cli_targets() {
    let dir = project();
    let output = thicket(dir.path(), &["targets"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "all (phony)"));
    assert!(stdout.lines().any(|l| l == "tmp/test-math-add"));
}

#[test]
fn test_collision_writes_nothing() {
    let dir = project();
    write(dir.path(), "src/a/b_test.c", "int main(void) { return 0; }\n");
    write(dir.path(), "src/a-b_test.c", "int main(void) { return 0; }\n");

    assert!(matches!(
        synthesize(dir.path()),
        Err(SynthError::NamingCollision { .. })
    ));

    let output = thicket(dir.path(), &["generate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("tmp/test-a-b"));
    assert!(!dir.path().join("Makefile").exists());
}

#[test]
fn test_malformed_public_header_is_fatal() {
    let dir = project();
    write(
        dir.path(),
        "src/broken.h",
        "/* @thicket\n * public = yes please\n * @end */\n",
    );

    assert!(matches!(
        synthesize(dir.path()),
        Err(SynthError::Directive { .. })
    ));
    let output = thicket(dir.path(), &["generate"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("Makefile").exists());
}

#[test]
fn test_malformed_test_directive_only_warns() {
    let dir = project();
    write(
        dir.path(),
        "src/lonely_test.c",
        "// @thicket\n// deps = [unterminated\n// @end\nint main(void) { return 0; }\n",
    );

    let ruleset = synthesize(dir.path()).unwrap();
    assert_eq!(
        ruleset.get("tmp/test-lonely").unwrap().inputs,
        vec!["tmp/test/src/lonely_test.c.o"]
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_writes_nothing() {
    use std::os::unix::fs::PermissionsExt;

    let dir = project();
    let secret = dir.path().join("src/math/add.c");
    std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&secret).is_ok() {
        // Permissions are not enforced (running as root)
        return;
    }

    assert!(matches!(synthesize(dir.path()), Err(SynthError::Scan { .. })));
    let output = thicket(dir.path(), &["generate"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("Makefile").exists());
}

#[cfg(unix)]
#[test]
fn test_generator_recipe() {
    let dir = project();
    let ruleset = synthesize(dir.path()).unwrap();

    assert!(run_recipe(dir.path(), &ruleset, "src/table.h"));
    let generated = std::fs::read_to_string(dir.path().join("src/table.h")).unwrap();
    assert_eq!(generated, "#define TABLE_SIZE 4\n");
    assert!(!dir.path().join("src/table.h.tmp").exists());
}

#[cfg(unix)]
#[test]
fn test_failed_generator_leaves_no_output() {
    let dir = project();
    write(dir.path(), "src/bad.h.gen.sh", "echo partial\nexit 1\n");
    let ruleset = synthesize(dir.path()).unwrap();

    assert!(!run_recipe(dir.path(), &ruleset, "src/bad.h"));
    assert!(!dir.path().join("src/bad.h").exists());
}
