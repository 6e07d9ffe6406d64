use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const GUIDE: &str = "# Setup

```bash
cd my-app && npm install
```

**package.json**
```json
{ \"name\": \"my-app\" }
```

### src/utils/math.js
```js
export const sub = (a, b) => a - b;
```
";

fn cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_md2project")));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_guide(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn cli_dry_run_lists_files_and_creates_nothing() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "guide.md", GUIDE);

    cmd(temp.path())
        .args(["guide.md", "--dry-run", "--output", "out", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package.json"))
        .stdout(predicate::str::contains("src/utils/math.js"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn cli_creates_project_tree() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "guide.md", GUIDE);

    cmd(temp.path())
        .args(["guide.md", "-o", "out", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files: 2"));

    let out = temp.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("package.json")).unwrap(),
        "{ \"name\": \"my-app\" }"
    );
    assert_eq!(
        fs::read_to_string(out.join("src/utils/math.js")).unwrap(),
        "export const sub = (a, b) => a - b;"
    );
}

#[test]
fn cli_later_document_wins() {
    let temp = TempDir::new().unwrap();
    write_guide(
        temp.path(),
        "one.md",
        "### src/utils/math.js\n```js\nreturn a+b;\n```\n",
    );
    write_guide(
        temp.path(),
        "two.md",
        "### src/utils/math.js\n```js\nreturn a-b;\n```\n",
    );

    cmd(temp.path())
        .args(["one.md", "two.md", "-o", "out", "-q"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("out/src/utils/math.js")).unwrap(),
        "return a-b;"
    );
}

#[test]
fn cli_reads_stdin() {
    let temp = TempDir::new().unwrap();

    cmd(temp.path())
        .args(["-", "-o", "out", "-q"])
        .write_stdin("`.gitignore`\n```\nnode_modules\n```\n")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("out/.gitignore")).unwrap(),
        "node_modules"
    );
}

#[test]
fn cli_no_files_found_exits_with_4() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "prose.md", "# Notes\n\nNothing to build here.\n");

    cmd(temp.path())
        .args(["prose.md", "-o", "out"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No files found"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn cli_missing_input_exits_with_3() {
    let temp = TempDir::new().unwrap();

    cmd(temp.path())
        .args(["missing.md", "-o", "out"])
        .assert()
        .code(3);
}

#[test]
fn cli_no_overwrite_keeps_existing_files() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "guide.md", GUIDE);
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("package.json"), "original").unwrap();

    cmd(temp.path())
        .args(["guide.md", "-o", "out", "--no-overwrite", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped: 1"));

    assert_eq!(fs::read_to_string(out.join("package.json")).unwrap(), "original");
    assert!(out.join("src/utils/math.js").exists());
}

#[test]
fn cli_extensions_override() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "guide.md", GUIDE);

    cmd(temp.path())
        .args(["guide.md", "-o", "out", "--extensions", "js", "-q"])
        .assert()
        .success();

    assert!(temp.path().join("out/src/utils/math.js").exists());
    assert!(!temp.path().join("out/package.json").exists());
}

#[test]
fn cli_json_dry_run_is_parseable() {
    let temp = TempDir::new().unwrap();
    write_guide(temp.path(), "guide.md", GUIDE);

    let output = cmd(temp.path())
        .args(["guide.md", "--dry-run", "-q", "--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let plan_start = stdout.find("{\n").unwrap();
    let plan: serde_json::Value = serde_json::from_str(&stdout[plan_start..]).unwrap();
    assert_eq!(plan["files"].as_array().unwrap().len(), 2);
}

#[test]
fn cli_generate_config() {
    let temp = TempDir::new().unwrap();

    cmd(temp.path())
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("md2project.toml"));

    let content = fs::read_to_string(temp.path().join("md2project.toml")).unwrap();
    assert!(content.contains("[output]"));
}
