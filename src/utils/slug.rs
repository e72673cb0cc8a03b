//! File name slugs for report files.

use deunicode::deunicode;

/// Transliterate `s` to ASCII, lower-case it, and join its first `max_words`
/// alphanumeric words with dashes.
///
/// Returns an empty string when nothing alphanumeric is left.
pub fn slugify_words(s: &str, max_words: usize) -> String {
    let ascii = deunicode(s);
    let mut out = String::with_capacity(ascii.len());
    let mut words = 0;
    let mut in_word = false;

    for ch in ascii.chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_ascii_alphanumeric() {
            if !in_word {
                if words == max_words {
                    break;
                }
                if words > 0 {
                    out.push('-');
                }
                words += 1;
                in_word = true;
            }
            out.push(lc);
        } else {
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_title() {
        assert_eq!(
            slugify_words("Annual General Meeting: Results & Votes", 4),
            "annual-general-meeting-results"
        );
        assert_eq!(slugify_words("Short title", 4), "short-title");
    }

    #[test]
    fn test_cyrillic_title_is_transliterated() {
        let slug = slugify_words("Сообщение о существенном факте", 4);
        assert!(slug.is_ascii());
        assert_eq!(slug.split('-').count(), 4);
        assert!(slug.starts_with("soob"));
    }

    #[test]
    fn test_punctuation_only_is_empty() {
        assert_eq!(slugify_words("«—»", 4), "");
        assert_eq!(slugify_words("anything", 0), "");
    }
}
