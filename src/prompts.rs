//! System prompt templates, one per text command.
//!
//! Each can be replaced through the `prompts` section of the config. The
//! translate prompt interpolates `{primary}` and `{secondary}`.

use crate::commands::Command;
use crate::config::Settings;

pub const PROOFREAD_PROMPT: &str = "\
You are a meticulous proofreader. Correct spelling, grammar and punctuation in the text you are given. \
Keep the author's wording, tone, formatting and line breaks wherever they are already correct. \
Reply with the corrected text only, without explanations or quotes.";

pub const IMPROVE_PROMPT: &str = "\
You are a helpful writing assistant. Improve the following text by making it clearer, more concise, \
and better written while preserving its original meaning and language. \
Reply with the improved text only.";

pub const COMPLETE_PROMPT: &str = "\
You are a writing assistant. Continue the text you are given from exactly where it stops, \
matching its language, tone and style. Write at most one paragraph. \
Reply with the continuation only; do not repeat the given text.";

pub const TRANSLATE_PROMPT: &str = "\
You are a professional translator. If the text is written in {primary}, translate it to {secondary}; \
otherwise translate it to {primary}. Preserve formatting and line breaks. \
Only provide the translation, no explanations.";

pub const SUMMARIZE_PROMPT: &str = "\
You are a helpful assistant that summarizes text. Provide a concise summary of the following text \
in the same language. Reply with the summary only.";

/// System prompt for `command`, honouring configured overrides.
///
/// Returns `None` for commands that don't call the model.
pub fn system_prompt(command: Command, settings: &Settings) -> Option<String> {
    let overrides = &settings.prompts;
    let (custom, default) = match command {
        Command::Check => (&overrides.proofread, PROOFREAD_PROMPT),
        Command::Improve => (&overrides.improve, IMPROVE_PROMPT),
        Command::Continue => (&overrides.complete, COMPLETE_PROMPT),
        Command::Translate => (&overrides.translate, TRANSLATE_PROMPT),
        Command::Summarize => (&overrides.summarize, SUMMARIZE_PROMPT),
        Command::Accept | Command::Clear => return None,
    };

    let template = custom
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(default);
    Some(interpolate(template, settings))
}

fn interpolate(template: &str, settings: &Settings) -> String {
    template
        .replace("{primary}", &settings.primary_language)
        .replace("{secondary}", &settings.secondary_language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_command() {
        let settings = Settings::default();
        assert_eq!(
            system_prompt(Command::Check, &settings).unwrap(),
            PROOFREAD_PROMPT
        );
        assert_eq!(
            system_prompt(Command::Continue, &settings).unwrap(),
            COMPLETE_PROMPT
        );
        assert!(system_prompt(Command::Accept, &settings).is_none());
    }

    #[test]
    fn translate_interpolates_languages() {
        let mut settings = Settings::default();
        settings.secondary_language = "French".into();
        let prompt = system_prompt(Command::Translate, &settings).unwrap();
        assert!(prompt.contains("written in English, translate it to French"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn override_replaces_default() {
        let mut settings = Settings::default();
        settings.prompts.improve = Some("Make it punchy.".into());
        assert_eq!(
            system_prompt(Command::Improve, &settings).unwrap(),
            "Make it punchy."
        );
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut settings = Settings::default();
        settings.prompts.proofread = Some("   ".into());
        assert_eq!(
            system_prompt(Command::Check, &settings).unwrap(),
            PROOFREAD_PROMPT
        );
    }
}
