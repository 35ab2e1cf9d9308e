//! Display languages and the phrases the chat session speaks itself.

mod language;
mod phrases;

pub use language::{
    BACKEND_LANGUAGE, SUPPORTED_LANGUAGES, is_backend_language, language_name, print_languages,
    validate_language,
};
pub use phrases::{Phrase, has_phrases, language_switched, phrase};
