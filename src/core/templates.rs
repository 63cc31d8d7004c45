//! Launch command templates with a single `{input}` placeholder.
//!
//! The built command is handed to the caller verbatim. No quoting or
//! sanitizing happens here; input comes from the operator.

pub const INPUT_PLACEHOLDER: &str = "{input}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub label: String,
    /// Prompt shown when asking for the input.
    pub prompt: String,
    template: String,
}

impl CommandTemplate {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute every `{input}` with the trimmed input.
    ///
    /// Returns `None` for blank input. A template without a placeholder is
    /// returned unchanged.
    pub fn build(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Some(self.template.replace(INPUT_PLACEHOLDER, input))
    }

    /// First word of the template, i.e. the binary it launches.
    pub fn program(&self) -> Option<&str> {
        self.template
            .split_whitespace()
            .next()
            .filter(|word| !word.contains(INPUT_PLACEHOLDER))
    }
}

/// The tool launchers shipped by default.
pub fn builtin_templates() -> Vec<CommandTemplate> {
    vec![
        CommandTemplate::new("nmap", "Target (host or CIDR)", "nmap -sV -T4 --top-ports 100 {input}"),
        CommandTemplate::new("sqlmap", "Target URL", "sqlmap -u \"{input}\" --batch"),
        CommandTemplate::new(
            "hydra",
            "host service (ex: 10.0.0.5 ssh)",
            "hydra -L users.txt -P pass.txt {input}",
        ),
        CommandTemplate::new("masscan", "Target (host or CIDR)", "masscan -p1-65535 --rate 1000 {input}"),
        CommandTemplate::new(
            "gobuster",
            "Target URL",
            "gobuster dir -u \"{input}\" -w /usr/share/wordlists/dirb/common.txt -q",
        ),
        CommandTemplate::new("nikto", "Target host or URL", "nikto -h \"{input}\""),
        CommandTemplate::new("john", "Path to hash file", "john \"{input}\""),
    ]
}

/// Case-insensitive lookup by label.
pub fn find_template<'a>(templates: &'a [CommandTemplate], label: &str) -> Option<&'a CommandTemplate> {
    templates.iter().find(|t| t.label.eq_ignore_ascii_case(label))
}
