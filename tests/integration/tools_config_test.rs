use pulsemon::core::tools_config::{load_from, parse, CustomProbe};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_scripts_document() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tools.json");
    fs::write(
        &path,
        r#"{
            "scripts": [
                {"label": "ffuf", "command": "ffuf -u {input}/FUZZ -w words.txt", "placeholder": "Base URL"},
                {"label": "broken"}
            ]
        }"#,
    )
    .unwrap();

    let probes = load_from(&path);
    assert_eq!(
        probes,
        vec![CustomProbe {
            label: "ffuf".to_string(),
            command: "ffuf -u {input}/FUZZ -w words.txt".to_string(),
            placeholder: Some("Base URL".to_string()),
        }]
    );

    let template = probes[0].template();
    assert_eq!(template.prompt, "Base URL");
    assert_eq!(template.program(), Some("ffuf"));
    assert_eq!(
        template.build("http://t").as_deref(),
        Some("ffuf -u http://t/FUZZ -w words.txt")
    );
}

#[test]
fn test_malformed_file_yields_no_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tools.json");
    fs::write(&path, "[{\"label\": \"x\", ").unwrap();

    assert!(load_from(&path).is_empty());
}

#[test]
fn test_directory_instead_of_file_yields_no_entries() {
    let temp_dir = TempDir::new().unwrap();
    assert!(load_from(temp_dir.path()).is_empty());
}

#[test]
fn test_flat_list_keeps_order() {
    let probes = parse(
        r#"[
            {"label": "b", "command": "b {input}"},
            {"label": "a", "command": "a {input}"}
        ]"#,
    );
    let labels: Vec<&str> = probes.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["b", "a"]);
}
