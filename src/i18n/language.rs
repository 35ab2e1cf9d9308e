//! Display language tags and their names.

use anyhow::Result;

use crate::ui::Style;

/// Language the backend answers in; no translation is needed for it.
pub const BACKEND_LANGUAGE: &str = "en";

/// Supported language tags with their English and native names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str, &str)] = &[
    ("ar", "Arabic", "العربية"),
    ("de", "German", "Deutsch"),
    ("el", "Greek", "Ελληνικά"),
    ("en", "English", "English"),
    ("es", "Spanish", "Español"),
    ("fr", "French", "Français"),
    ("hi", "Hindi", "हिन्दी"),
    ("id", "Indonesian", "Bahasa Indonesia"),
    ("it", "Italian", "Italiano"),
    ("ja", "Japanese", "日本語"),
    ("ko", "Korean", "한국어"),
    ("nl", "Dutch", "Nederlands"),
    ("pl", "Polish", "Polski"),
    ("pt", "Portuguese", "Português"),
    ("ru", "Russian", "Русский"),
    ("sv", "Swedish", "Svenska"),
    ("th", "Thai", "ไทย"),
    ("tr", "Turkish", "Türkçe"),
    ("vi", "Vietnamese", "Tiếng Việt"),
    ("zh-Hans", "Chinese (Simplified)", "简体中文"),
    ("zh-Hant", "Chinese (Traditional)", "繁體中文"),
];

/// Returns `true` when text in `lang` can go to the backend untranslated.
pub fn is_backend_language(lang: &str) -> bool {
    lang.eq_ignore_ascii_case(BACKEND_LANGUAGE)
}

/// English name for a tag, or the tag itself when unknown.
pub fn language_name(lang: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _, _)| *code == lang)
        .map_or(lang, |(_, name, _)| *name)
}

/// Prints all supported language tags to stdout.
pub fn print_languages() {
    println!("{}", Style::header("Supported display languages"));
    for (code, name, native) in SUPPORTED_LANGUAGES {
        println!(
            "  {:8} {} {}",
            Style::code(code),
            name,
            Style::secondary(native)
        );
    }
}

/// Validates that the given language tag is supported.
///
/// # Errors
///
/// Returns an error if the tag is not in the supported list.
pub fn validate_language(lang: &str) -> Result<()> {
    if SUPPORTED_LANGUAGES.iter().any(|(code, _, _)| *code == lang) {
        Ok(())
    } else {
        anyhow::bail!(
            "Invalid language code: '{lang}'\n\n\
             Valid language codes: en, es, fr, de, ja, zh-Hans, ...\n\
             Run 'docchat languages' to see all supported codes."
        )
    }
}
