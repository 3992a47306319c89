use std::io::Write;
use std::process::{Command, Output};

fn pieces(args: &[&str], config: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pieces"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run pieces")
}

#[test]
fn info_hash_prints_hex_digest() {
    let dir = tempfile::tempdir().unwrap();
    let mut torrent = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
    torrent.write_all(b"d4:infod4:name4:testee").unwrap();

    let out = pieces(
        &["info-hash", torrent.path().to_str().unwrap()],
        &dir.path().join("pieces.toml"),
    );
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let hex = stdout.trim().strip_prefix("Info Hash: ").unwrap();
    assert_eq!(hex.len(), 40);
}

#[test]
fn info_hash_of_missing_file_reports_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.torrent");
    let out = pieces(
        &["info-hash", missing.to_str().unwrap()],
        &dir.path().join("pieces.toml"),
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("hashing"), "stderr was: {stderr}");
}

#[test]
fn unreadable_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("pieces.toml");
    std::fs::write(&config, "dict_order = \"shuffled\"\n").unwrap();

    let out = pieces(&["decode", "i1e"], &config);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("loading config"), "stderr was: {stderr}");
}

#[test]
fn decode_then_encode_through_the_binary() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("pieces.toml");

    let out = pieces(&["decode", "d1:bi1e1:a2:hie"], &config);
    assert!(out.status.success());
    let json = String::from_utf8(out.stdout).unwrap();
    assert_eq!(json.trim(), r#"{"b":1,"a":"hi"}"#);

    let out = pieces(&["encode", "--canonical", json.trim()], &config);
    assert!(out.status.success());
    assert_eq!(out.stdout, b"d1:a2:hi1:bi1ee");
}
