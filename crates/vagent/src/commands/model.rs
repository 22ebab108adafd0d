//! Model listing.

use vagent_provider::ModelKey;

/// Table of supported models.
pub fn format_models() -> String {
    let mut lines = vec![format!(
        "{:<20} {:<22} {:<10} {}",
        "KEY", "NAME", "FAMILY", "THINKING"
    )];
    for key in ModelKey::ALL {
        let info = key.info();
        lines.push(format!(
            "{:<20} {:<22} {:<10} {}",
            key.as_str(),
            info.name,
            format!("{:?}", key.family()).to_lowercase(),
            if info.capabilities.reasoning {
                "yes"
            } else {
                "no"
            }
        ));
    }
    lines.join("\n")
}

/// Print the supported models.
pub fn list_models() {
    println!("{}", format_models());
    println!();
    println!("All models are reached through OpenRouter (set OPENROUTER_API_KEY).");
}
