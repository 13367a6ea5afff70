//! List the AI provider catalog.

use crate::provider::AiProvider;

/// Prints every catalog entry with its capability flag and default values.
pub fn handle_providers() {
    println!(
        "{:<10} {:<17} {:<7} {:<15} {:<20} {}",
        "ID", "NAME", "SPEECH", "SPEECH MODEL", "TEXT MODEL", "BASE URL"
    );
    for provider in AiProvider::all() {
        println!(
            "{:<10} {:<17} {:<7} {:<15} {:<20} {}",
            provider.id(),
            provider.name(),
            if provider.supports_speech_to_text() {
                "yes"
            } else {
                "no"
            },
            provider.default_speech_model(),
            provider.default_text_model(),
            provider.default_base_url(),
        );
    }
    println!();
    for provider in AiProvider::all() {
        println!("{:<10} {}", provider.id(), provider.description());
    }
}
