use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tsearch_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tsearch");
    path
}

fn setup_test_env(with_manifest: bool) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let site = root.join("site");
    let txt = site.join("txt");
    fs::create_dir_all(&txt).unwrap();
    fs::write(
        txt.join("_chat 1.txt"),
        "Cliente: Seu boleto vence no prazo de 5 dias, pague via pix.\nAtendente: Obrigado!",
    )
    .unwrap();
    fs::write(
        txt.join("_chat 2.txt"),
        "Cliente: Necesito ayuda con mi registro, olvidé mi contraseña.",
    )
    .unwrap();
    if with_manifest {
        fs::write(
            site.join("manifest.json"),
            r#"["_chat 1.txt", "_chat 2.txt"]"#,
        )
        .unwrap();
    }

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[source]
root = "{}"
manifest = "manifest.json"
base_dir = "txt/"

[search]
max_snippets_per_file = 3

[generate]
batch_size = 10
max_index = 100
"#,
        site.display()
    );
    let config_path = config_dir.join("tsearch.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_tsearch(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = tsearch_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run tsearch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_search_highlights_match() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, stderr, success) = run_tsearch(&config_path, &["search", "pix"]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("_chat 1.txt • PT"));
    assert!(stdout.contains("<mark>pix</mark>"));
    assert!(!stdout.contains("_chat 2.txt"));
    assert!(stdout.contains("1 occurrence(s) in 1 file(s)"));
    assert!(stderr.contains("Loaded 2 files."));
}

#[test]
fn test_search_without_query_lists_all() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, _, success) = run_tsearch(&config_path, &["search"]);
    assert!(success);
    assert!(stdout.contains("_chat 1.txt"));
    assert!(stdout.contains("_chat 2.txt"));
    assert!(stdout.contains("2 file(s) listed"));
}

#[test]
fn test_search_language_filter() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, _, success) = run_tsearch(&config_path, &["search", "--lang", "es"]);
    assert!(success);
    assert!(stdout.contains("_chat 2.txt • ES"));
    assert!(!stdout.contains("_chat 1.txt"));
}

#[test]
fn test_search_category_filter_and_json() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, _, success) = run_tsearch(
        &config_path,
        &["search", "cliente", "--category", "cadastro/acesso", "--json"],
    );
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = parsed["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["file"], "_chat 2.txt");
    assert_eq!(results[0]["lang"], "es");
    assert_eq!(parsed["total"], 1);
}

#[test]
fn test_search_no_match() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, _, success) = run_tsearch(&config_path, &["search", "kubernetes"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_missing_manifest_reports_and_fails() {
    let (_tmp, config_path) = setup_test_env(false);

    let (_, stderr, success) = run_tsearch(&config_path, &["search", "pix"]);
    assert!(!success);
    assert!(stderr.contains("No manifest found"), "stderr={}", stderr);
}

#[test]
fn test_generate_writes_manifest() {
    let (tmp, config_path) = setup_test_env(false);
    let out = tmp.path().join("out.json");

    let (stdout, stderr, success) = run_tsearch(
        &config_path,
        &["generate", "--output", out.to_str().unwrap()],
    );
    assert!(success, "generate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("Manifest generated with 2 files"));

    let names: Vec<String> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(names, vec!["_chat 1.txt", "_chat 2.txt"]);
}

#[test]
fn test_generate_to_stdout_then_search() {
    let (tmp, config_path) = setup_test_env(false);

    let (stdout, _, success) = run_tsearch(&config_path, &["generate", "--output", "-"]);
    assert!(success);
    fs::write(tmp.path().join("site").join("manifest.json"), &stdout).unwrap();

    let (stdout, _, success) = run_tsearch(&config_path, &["search", "ayuda"]);
    assert!(success);
    assert!(stdout.contains("_chat 2.txt"));
}

#[test]
fn test_generate_nothing_found() {
    let (tmp, config_path) = setup_test_env(false);
    fs::remove_dir_all(tmp.path().join("site").join("txt")).unwrap();

    let (_, stderr, success) = run_tsearch(&config_path, &["generate", "--output", "-"]);
    assert!(!success);
    assert!(stderr.contains("no files matching"), "stderr={}", stderr);
}

#[test]
fn test_categories_lists_tables() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, _, success) = run_tsearch(&config_path, &["categories"]);
    assert!(success);
    assert!(stdout.contains("pagamento/preço"));
    assert!(stdout.contains("mídia/arquivo"));
}

#[test]
fn test_classify_local_file() {
    let (tmp, config_path) = setup_test_env(true);
    let path = tmp.path().join("site").join("txt").join("_chat 2.txt");

    let (stdout, _, success) = run_tsearch(&config_path, &["classify", path.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("\tes\t"));
    assert!(stdout.contains("suporte/ajuda"));
}

#[test]
fn test_shell_debounces_piped_input() {
    use std::io::Write;
    use std::process::Stdio;

    let (_tmp, config_path) = setup_test_env(true);
    let mut child = Command::new(tsearch_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("shell")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b":lang es\nayu\nayuda\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    // Initial listing, then one render for the final state.
    assert!(stdout.contains("2 file(s) listed"));
    assert_eq!(stdout.matches("occurrence(s)").count(), 1);
    assert!(stdout.contains("[[ayuda]]"));
}
