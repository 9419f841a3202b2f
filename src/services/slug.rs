//! Slug generation and validation for notes
//!
//! `slugify` transliterates Russian titles into Latin URL segments:
//!
//! ```ignore
//! use ya_sites::services::slug::slugify;
//!
//! assert_eq!(slugify("Заголовок"), "zagolovok");
//! assert_eq!(slugify("Щука & ёж"), "schuka-and-yozh");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::NOTE_SLUG_MAX_LENGTH;

/// Message for a slug with characters outside `[-a-zA-Z0-9_]`
pub const INVALID_SLUG: &str =
    "Введите корректный «slug», состоящий из латинских букв, цифр, знаков подчеркивания или дефиса.";

static AMPERSAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"&amp;|&").expect("valid regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));
static VALID_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// Latin spelling of a lowercase Cyrillic letter or typographic symbol.
///
/// Symbols that slugs cannot carry map to the empty string; dashes map to `-`.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "yi",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        '–' | '—' | '‒' | '−' => "-",
        '\'' | '"' | '‘' | '’' | '«' | '»' | '“' | '”' | '…' | '.' | '№' => "",
        _ => return None,
    };
    Some(latin)
}

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercases, spells out `&` as "and", collapses whitespace and hyphen runs
/// into one `-`, drops characters outside Russian, Latin, digits and `-`, and
/// transliterates what remains. The result is not truncated.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let spelled = AMPERSAND.replace_all(&lowered, " and ");
    let hyphenated = SEPARATORS.replace_all(&spelled, "-");

    let mut slug = String::with_capacity(hyphenated.len());
    for c in hyphenated.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            slug.push(c);
        } else if let Some(latin) = transliterate(c) {
            slug.push_str(latin);
        }
    }

    slug.trim().to_string()
}

/// Slug for a note submitted without one: `slugify(title)` cut to the
/// column width.
pub fn derive_slug(title: &str) -> String {
    slugify(title).chars().take(NOTE_SLUG_MAX_LENGTH).collect()
}

/// Whether `slug` only uses `[-a-zA-Z0-9_]` and is non-empty
pub fn is_valid_slug(slug: &str) -> bool {
    VALID_SLUG.is_match(slug)
}
