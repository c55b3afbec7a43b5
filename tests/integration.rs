use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn wg_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("wg");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let content_dir = root.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("kenosis.md"),
        "---\ntitle: Kenosis\ndescription: Self-emptying in Christian theology\ncategory: theology\nrelated:\n  - holy-fool\n---\nSelf-emptying, embodied by the [[Holy Fool]] tradition.\n",
    )
    .unwrap();
    fs::write(
        content_dir.join("holy-fool.md"),
        "---\ntitle: Holy Fools\ncategory: asceticism\nseeAlso:\n  - kenosis\n---\nSee [Kenosis](/wiki/kenosis), /wiki/sukr, and [[Lost Page]].\n\nFeigned madness as an ascetic practice stretches from Byzantium to Russia.\n",
    )
    .unwrap();
    fs::write(
        content_dir.join("sukr.md"),
        "---\ntitle: Sukr\ncategory: asceticism\n---\nSpiritual intoxication in Sufi thought, compare /wiki/holy-fool.\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[content]
root = "{}/content"
wiki_prefix = "/wiki/"
include_globs = ["**/*.md"]

[cache]
context_budget_chars = 64
"#,
        root.display()
    );

    let config_path = root.join("wikigraph.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wg(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wg_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wg binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_build_summary() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wg(&config_path, &["build"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Pages:          3"));
    // lost-page is a dangling target.
    assert!(stdout.contains("Dangling edges: 1"));
}

#[test]
fn test_build_missing_root_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("wikigraph.toml");
    fs::write(&config_path, "[content]\nroot = \"/nonexistent/wiki\"\n").unwrap();

    let (_, stderr, success) = run_wg(&config_path, &["build"]);
    assert!(!success);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_backlinks_view() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(&config_path, &["backlinks", "kenosis"]);
    assert!(success);
    assert!(stdout.contains("holy-fool"));
    assert!(!stdout.contains("lost-page"));
}

#[test]
fn test_backlinks_unknown_slug_empty() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(&config_path, &["backlinks", "no-such-page"]);
    assert!(success, "unknown slug must not be an error");
    assert!(stdout.contains("No pages found."));
}

#[test]
fn test_related_view() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(&config_path, &["related", "kenosis"]);
    assert!(success);
    assert!(stdout.contains("holy-fool"));
}

#[test]
fn test_category_view_excludes_self() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(&config_path, &["category", "holy-fool"]);
    assert!(success);
    assert!(stdout.contains("sukr"));
    // Only the header mentions the source page's row is absent; check the
    // slug column does not repeat the page itself.
    assert!(!stdout.contains("Holy Fools"));
}

#[test]
fn test_route_simple_query() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(&config_path, &["route", "What is kenosis?"]);
    assert!(success);
    assert!(stdout.contains("Complexity: simple"));
    assert!(stdout.contains("haiku"));
}

#[test]
fn test_route_complex_query() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(
        &config_path,
        &[
            "route",
            "Compare the theological implications of sukr and yurodstvo in depth",
        ],
    );
    assert!(success);
    assert!(stdout.contains("Complexity: complex"));
    assert!(stdout.contains("sonnet"));
}

#[test]
fn test_prompt_json_payload() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(
        &config_path,
        &["prompt", "What is sukr?", "--page", "sukr", "--json"],
    );
    assert!(success);

    let segments: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let segments = segments.as_array().unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0]["cacheable"], true);
    assert_eq!(segments[1]["cacheable"], true);
    assert!(segments[1]["text"]
        .as_str()
        .unwrap()
        .contains("Spiritual intoxication"));
    assert_eq!(segments[2]["cacheable"], false);
    assert_eq!(segments[2]["text"], "What is sukr?");
}

#[test]
fn test_prompt_context_truncated_to_budget() {
    let (_tmp, config_path) = setup_test_env();

    // The config caps context at 64 chars; the page body is longer.
    let (stdout, _, success) = run_wg(
        &config_path,
        &["prompt", "q", "--page", "holy-fool", "--json"],
    );
    assert!(success);

    let segments: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let context = segments[1]["text"].as_str().unwrap();
    assert!(context.ends_with('…'));
    assert!(context.chars().count() <= 65);
}

#[test]
fn test_costs_report_from_log() {
    let (_tmp, config_path) = setup_test_env();
    let log_path = _tmp.path().join("costs.jsonl");

    fs::write(
        &log_path,
        concat!(
            r#"{"timestamp":"2026-08-01T10:00:00Z","service":"claude","model":"m","input_tokens":1000,"output_tokens":200,"cache_hit":false,"cost":0.5,"success":true}"#,
            "\n",
            r#"{"timestamp":"2026-08-02T10:00:00Z","service":"tavily","model":"-","input_tokens":0,"output_tokens":0,"cache_hit":true,"cost":0.008,"success":true}"#,
            "\n",
            r#"{"timestamp":"2026-07-01T10:00:00Z","service":"claude","model":"m","input_tokens":1,"output_tokens":1,"cache_hit":false,"cost":9.0,"success":true}"#,
            "\n",
        ),
    )
    .unwrap();

    let (stdout, stderr, success) = run_wg(
        &config_path,
        &[
            "costs",
            "report",
            "--log",
            log_path.to_str().unwrap(),
            "--since",
            "2026-08-01",
            "--until",
            "2026-08-31",
        ],
    );
    assert!(success, "report failed: {}", stderr);
    assert!(stdout.contains("Calls:          2"));
    assert!(stdout.contains("0.5080"));
    assert!(stdout.contains("claude"));
    assert!(stdout.contains("tavily"));
}

#[test]
fn test_costs_estimate() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wg(
        &config_path,
        &[
            "costs",
            "estimate",
            "--profile",
            "fast",
            "--input-tokens",
            "1000000",
            "--output-tokens",
            "1000000",
        ],
    );
    assert!(success);
    // 0.80 + 4.00 per MTok at one MTok each.
    assert!(stdout.contains("4.800000"));
}
