//! Norwegian alphabetical order: `a..z`, then `æ`, `ø`, `å`.
//!
//! Letters compare case-insensitively and accented Latin letters sort with
//! their base letter. `aa` is the old spelling of `å` and sorts as one.
//! Accents, then the `aa` spelling, then case (lowercase first), break ties.

use std::cmp::Ordering;

const WHITESPACE: u32 = 0x10;
const PUNCTUATION: u32 = 0x100;
const DIGIT: u32 = 0x1000;
const LETTER: u32 = 0x2000;
const OTHER_LETTER: u32 = 0x3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Key {
    primary: u32,
    accent: u8,
    digraph: bool,
    upper: bool,
}

/// Position in the Norwegian alphabet (a = 1, å = 29) and an accent marker
fn letter(c: char) -> Option<(u32, u8)> {
    let folded = match c {
        'a'..='z' => return Some((c as u32 - 'a' as u32 + 1, 0)),
        'æ' => return Some((27, 0)),
        'ø' => return Some((28, 0)),
        'å' => return Some((29, 0)),
        'ä' => return Some((27, 1)),
        'ö' => return Some((28, 1)),
        'á' | 'à' | 'â' | 'ã' => ('a', 1),
        'ç' | 'č' => ('c', 1),
        'é' | 'è' | 'ê' | 'ë' => ('e', 1),
        'í' | 'ì' | 'î' | 'ï' => ('i', 1),
        'ñ' => ('n', 1),
        'ó' | 'ò' | 'ô' | 'õ' => ('o', 1),
        'š' => ('s', 1),
        'ú' | 'ù' | 'û' => ('u', 1),
        'ü' | 'ý' | 'ÿ' => ('y', 1),
        'ž' => ('z', 1),
        _ => return None,
    };
    let (base, accent) = folded;
    Some((base as u32 - 'a' as u32 + 1, accent))
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn key(c: char) -> Key {
    let lower = lowercase(c);
    let upper = lower != c;

    let (primary, accent) = if let Some((index, accent)) = letter(lower) {
        (LETTER + index, accent)
    } else if let Some(digit) = lower.to_digit(10) {
        (DIGIT + digit, 0)
    } else if lower.is_whitespace() {
        (WHITESPACE, 0)
    } else if lower.is_alphanumeric() {
        (OTHER_LETTER + lower as u32, 0)
    } else {
        (PUNCTUATION + (lower as u32).min(0xeff), 0)
    };

    Key {
        primary,
        accent,
        digraph: false,
        upper,
    }
}

fn keys(s: &str) -> Vec<Key> {
    let mut keys = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let mut key = key(c);
        if lowercase(c) == 'a' && chars.peek().is_some_and(|&next| lowercase(next) == 'a') {
            chars.next();
            key.primary = LETTER + 29;
            key.digraph = true;
        }
        keys.push(key);
    }
    keys
}

fn level(keys: &[Key], weight: fn(&Key) -> u32) -> Vec<u32> {
    keys.iter().map(weight).collect()
}

pub fn norwegian_cmp(a: &str, b: &str) -> Ordering {
    let a_keys = keys(a);
    let b_keys = keys(b);

    let by = |weight: fn(&Key) -> u32| level(&a_keys, weight).cmp(&level(&b_keys, weight));

    by(|k| k.primary)
        .then_with(|| by(|k| k.accent as u32))
        .then_with(|| by(|k| k.digraph as u32))
        .then_with(|| by(|k| k.upper as u32))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_norwegian_letters_sort_last() {
        let names = vec!["Åsane", "Ørsta", "Zoologisk museum", "Ærfuglveien", "Bergen"];

        let sorted: Vec<_> = names.into_iter().sorted_by(|a, b| norwegian_cmp(a, b)).collect();
        assert_eq!(
            sorted,
            vec!["Bergen", "Zoologisk museum", "Ærfuglveien", "Ørsta", "Åsane"]
        );
    }

    #[test]
    fn test_case_and_accents() {
        assert_eq!(norwegian_cmp("bryn", "Bergen"), Ordering::Greater);
        assert_eq!(norwegian_cmp("bergen", "Bergen"), Ordering::Less);
        assert_eq!(norwegian_cmp("Bergen", "Bergen"), Ordering::Equal);
        // é sorts with e, but after it
        assert_eq!(norwegian_cmp("Bélvedere", "Belvedere"), Ordering::Greater);
        assert_eq!(norwegian_cmp("Bélvedere", "Bf"), Ordering::Less);
        assert_eq!(norwegian_cmp("Ärlig", "Ørje"), Ordering::Less);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(norwegian_cmp("1. Avenue", "A"), Ordering::Less);
        assert_eq!(norwegian_cmp("Storo T", "Storo"), Ordering::Greater);
        assert_eq!(norwegian_cmp("Storo T", "Storokaia"), Ordering::Less);
    }

    #[test]
    fn test_double_a_sorts_as_aring() {
        let names = vec![
            "Aase",
            "Hasle",
            "Åsane",
            "1. Avenue",
            "Haakon VIIs gate",
            "Aalesund",
            "Bergen",
            "Ålesund",
        ];

        let sorted: Vec<_> = names.into_iter().sorted_by(|a, b| norwegian_cmp(a, b)).collect();
        assert_eq!(
            sorted,
            vec![
                "1. Avenue",
                "Bergen",
                "Hasle",
                "Haakon VIIs gate",
                "Ålesund",
                "Aalesund",
                "Åsane",
                "Aase",
            ]
        );
        assert_eq!(norwegian_cmp("Haakon", "Håkon"), Ordering::Greater);
    }
}
