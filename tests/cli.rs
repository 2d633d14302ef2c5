use std::path::Path;
use std::process::{Command, Output};

const MB: u64 = 1024 * 1024;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_palletviz"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run palletviz")
}

fn write_report(dir: &Path, json: &str) -> String {
    let path = dir.join("report.json");
    std::fs::write(&path, json).expect("write report");
    path.to_str().unwrap().to_owned()
}

fn sample_report() -> String {
    format!(
        r#"{{
            "network": "polkadot",
            "pallets": [
                {{
                    "name": "System",
                    "size": {system},
                    "storage": [
                        {{ "name": "Account", "key_len": {mb}, "value_len": {account} }},
                        {{ "name": "Tiny", "key_len": 10, "value_len": 10 }}
                    ],
                    "items": [
                        {{ "name": "Events", "key_len": 51200, "value_len": 51200 }}
                    ]
                }},
                {{ "name": "Balances", "size": {balances} }},
                {{ "name": "Dust", "size": 1 }}
            ]
        }}"#,
        system = 3 * MB,
        mb = MB,
        account = MB,
        balances = MB,
    )
}

#[test]
fn dump_text_prints_breakdown() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(dir.path(), &sample_report());

    let out = run(&[&input, "--dump-text", "--no-serve"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "System (3.0 MiB)\n Account (2.0 MiB)\n Events (0.1 MiB)\n\nBalances (1.0 MiB)\n"
    );
}

#[test]
fn output_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(dir.path(), &sample_report());
    let svg = dir.path().join("chart.svg");

    let out = run(&[&input, "--output", svg.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let written = std::fs::read_to_string(&svg).unwrap();
    assert!(written.contains("<svg"));
    // no text on stdout unless asked for
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let out = run(&[missing.to_str().unwrap(), "--no-serve"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to load"));
}

#[test]
fn malformed_json_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(dir.path(), r#"{ "network": "kusama", "pallets": [ { "size": 3 } ] }"#);

    let out = run(&[&input, "--no-serve"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed report"));
}

#[test]
fn zero_total_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(
        dir.path(),
        r#"{ "network": "kusama", "pallets": [ { "name": "A", "size": 0 } ] }"#,
    );

    let out = run(&[&input, "--no-serve"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("total pallet size is zero"));
}

#[test]
fn compressed_without_counts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(dir.path(), &sample_report());

    let out = run(&[&input, "--compressed", "--no-serve"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no compressed size recorded for System"));
}

#[test]
fn unknown_output_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_report(dir.path(), &sample_report());
    let gif = dir.path().join("chart.gif");

    let out = run(&[&input, "--output", gif.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!gif.exists());
}
