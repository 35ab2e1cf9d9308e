//! Fixed chat phrases, keyed by language with an English fallback.

use super::language::language_name;

/// A phrase the session produces on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Welcome,
    GenericError,
    /// Contains a `{language}` placeholder.
    LanguageSwitched,
}

const FALLBACK: &str = "en";

// (language, welcome, generic error, language switched)
const PHRASES: &[(&str, &str, &str, &str)] = &[
    (
        "en",
        "Hello! I can help answer questions about your documents. What would you like to know?",
        "Sorry, I encountered an error. Please try again.",
        "I'll now respond in {language}.",
    ),
    (
        "es",
        "¡Hola! Puedo ayudarte a responder preguntas sobre tus documentos. ¿Qué te gustaría saber?",
        "Lo siento, se produjo un error. Por favor, inténtalo de nuevo.",
        "A partir de ahora responderé en {language}.",
    ),
    (
        "fr",
        "Bonjour ! Je peux répondre à vos questions sur vos documents. Que souhaitez-vous savoir ?",
        "Désolé, une erreur s'est produite. Veuillez réessayer.",
        "Je vais maintenant répondre en {language}.",
    ),
    (
        "de",
        "Hallo! Ich beantworte gerne Fragen zu Ihren Dokumenten. Was möchten Sie wissen?",
        "Entschuldigung, es ist ein Fehler aufgetreten. Bitte versuchen Sie es erneut.",
        "Ich antworte ab jetzt auf {language}.",
    ),
    (
        "it",
        "Ciao! Posso rispondere a domande sui tuoi documenti. Cosa vorresti sapere?",
        "Spiacente, si è verificato un errore. Riprova.",
        "D'ora in poi risponderò in {language}.",
    ),
    (
        "ja",
        "こんにちは！ドキュメントに関するご質問にお答えします。何をお知りになりたいですか？",
        "申し訳ありません。エラーが発生しました。もう一度お試しください。",
        "これから{language}でお答えします。",
    ),
    (
        "zh-Hans",
        "你好！我可以回答有关你的文档的问题。你想了解什么？",
        "抱歉，出现了错误。请重试。",
        "我现在将使用{language}回答。",
    ),
    (
        "zh-Hant",
        "你好！我可以回答有關你的文件的問題。你想了解什麼？",
        "抱歉，發生了錯誤。請再試一次。",
        "我現在將使用{language}回答。",
    ),
];

/// Returns `true` if `lang` has its own entry in the phrase table.
pub fn has_phrases(lang: &str) -> bool {
    PHRASES.iter().any(|(code, ..)| *code == lang)
}

/// Looks up a phrase, falling back to English for unknown languages.
pub fn phrase(lang: &str, phrase: Phrase) -> &'static str {
    let row = PHRASES
        .iter()
        .find(|(code, ..)| *code == lang)
        .or_else(|| PHRASES.iter().find(|(code, ..)| *code == FALLBACK));

    let Some((_, welcome, error, switched)) = row else {
        return "";
    };

    match phrase {
        Phrase::Welcome => *welcome,
        Phrase::GenericError => *error,
        Phrase::LanguageSwitched => *switched,
    }
}

/// The language switch notice with the language name filled in.
pub fn language_switched(lang: &str) -> String {
    let native = super::language::SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _, _)| *code == lang)
        .map(|(_, _, native)| *native);

    // Fall back to the English name when the notice itself falls back to English.
    let name = if has_phrases(lang) {
        native.unwrap_or_else(|| language_name(lang))
    } else {
        language_name(lang)
    };

    phrase(lang, Phrase::LanguageSwitched).replace("{language}", name)
}
