pub const COMPLAINT: &str = include_str!("../data/prompts/complaint.txt");
pub const COMPLAINT_FACTORS: &str = include_str!("../data/prompts/complaint_factors.txt");
pub const CAPITAL_QUESTION: &str = "Write a paragraph about the capital of France.";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Complaint-factor extraction prompt with the fixed complaint filled in.
pub fn complaint_prompt() -> String {
    render(COMPLAINT_FACTORS, &[("complaint", COMPLAINT.trim())])
        .trim_end()
        .to_string()
}
