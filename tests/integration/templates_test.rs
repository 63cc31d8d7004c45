use pulsemon::core::templates::{builtin_templates, find_template, CommandTemplate};

#[test]
fn test_builtin_nmap_command() {
    let templates = builtin_templates();
    let nmap = find_template(&templates, "nmap").unwrap();
    assert_eq!(
        nmap.build("192.168.1.0/24").as_deref(),
        Some("nmap -sV -T4 --top-ports 100 192.168.1.0/24")
    );
}

#[test]
fn test_input_is_not_sanitized() {
    let template = CommandTemplate::new("echo", "Text", "echo {input}");
    assert_eq!(
        template.build("$(whoami) `id`").as_deref(),
        Some("echo $(whoami) `id`")
    );
}

#[test]
fn test_empty_input_builds_nothing() {
    let templates = builtin_templates();
    assert!(templates.iter().all(|t| t.build(" \t ").is_none()));
}
