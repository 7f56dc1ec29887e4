/// Format one optional context section with machine-inspectable delimiters.
pub fn format_section(name: &str, content: &str) -> String {
    format!("=== {name} ===\n{content}\n=== END_{name} ===\n")
}
