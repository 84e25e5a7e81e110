//! CLI contract tests. No test here reaches the network.

use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn ideaforge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ideaforge").expect("Failed to locate ideaforge binary");
    cmd.current_dir(dir)
        .env_remove("API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("IDEAFORGE_CONFIG_PATH")
        .env_remove("IDEAFORGE_API_KEY_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn kinds_lists_every_slug() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = ideaforge(tmp.path())
        .arg("kinds")
        .output()
        .expect("binary should run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for slug in [
        "proposal",
        "business-plan",
        "market-research",
        "roadmap",
        "milestones",
        "financial-projection",
        "technical-prd",
    ] {
        assert!(stdout.contains(slug), "missing {slug} in {stdout}");
    }
}

#[test]
fn generate_without_key_fails_with_configuration_message() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = ideaforge(tmp.path())
        .args(["generate", "Solar kiosks"])
        .output()
        .expect("binary should run");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key is missing or empty"), "{stderr}");
    assert_eq!(
        fs::read_dir(tmp.path()).expect("temp dir readable").count(),
        0,
        "nothing should be written"
    );
}

#[test]
fn refine_rejects_blank_request() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let input = tmp.path().join("roadmap.txt");
    fs::write(&input, "Phase 1").expect("should write input");

    let output = ideaforge(tmp.path())
        .args(["refine", "--kind", "roadmap", "--request", "  ", "--input"])
        .arg(&input)
        .output()
        .expect("binary should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("change request is empty"));
}

#[test]
fn unknown_kind_is_a_usage_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = ideaforge(tmp.path())
        .args(["refine", "--kind", "sales-deck", "--request", "x", "--input", "x.txt"])
        .output()
        .expect("binary should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown document kind"));
}

#[test]
fn env_file_key_is_picked_up() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    fs::write(
        tmp.path().join("ideaforge.toml"),
        "[model]\nbase_url = \"http://127.0.0.1:9/v1beta\"\n",
    )
    .expect("should write config");
    fs::write(tmp.path().join(".env"), "API_KEY=dummy\n").expect("should write env file");

    // The key is found, so the failure comes from the unreachable endpoint
    // rather than from the credential check.
    let output = ideaforge(tmp.path())
        .args(["generate", "--no-save", "Offline test"])
        .output()
        .expect("binary should run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("API key is missing"), "{stderr}");
    assert!(stderr.contains("Failed to generate Business Proposal"), "{stderr}");
}

/// Answer `count` Gemini requests on a local port with a fixed document.
fn serve_gemini(count: usize) -> String {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should expose local addr");
    std::thread::spawn(move || {
        for stream in listener.incoming().take(count) {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(&mut stream);
            let mut content_length = 0_usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
            let mut body = vec![0_u8; content_length];
            let _ = reader.read_exact(&mut body);

            let payload = r#"{"candidates":[{"content":{"parts":[{"text":"Generated text"}]}}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/v1beta")
}

#[test]
fn generate_names_files_from_the_trimmed_idea() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let out = tmp.path().join("docs");

    let output = ideaforge(tmp.path())
        .env("API_KEY", "test-key")
        .env("IDEAFORGE_BASE_URL", serve_gemini(7))
        .args(["generate", "   Leading spaces idea", "--out"])
        .arg(&out)
        .output()
        .expect("binary should run");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let saved = out.join("Business_Proposal_leadingspacesidea.txt");
    assert_eq!(
        fs::read_to_string(&saved).expect("proposal should be saved"),
        "Generated text"
    );
    assert_eq!(fs::read_dir(&out).expect("out dir readable").count(), 7);
}
