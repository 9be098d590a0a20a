pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const IMAGE_RELAY: &str = include_str!("../data/prompts/image_relay.txt");
pub const MARKETING_SYSTEM: &str = include_str!("../data/prompts/marketing_system.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
