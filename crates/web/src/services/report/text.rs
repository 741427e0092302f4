//! Text preparation for the PDF's built-in fonts.

/// Encode `text` for a WinAnsi (Latin-1 range) font.
///
/// Romanian letters outside Latin-1 lose their diacritics; anything else
/// outside the range becomes `?`. Control characters other than tab become
/// spaces.
#[must_use]
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> u8 {
    match c {
        'ă' => b'a',
        'Ă' => b'A',
        'ș' | 'ş' => b's',
        'Ș' | 'Ş' => b'S',
        'ț' | 'ţ' => b't',
        'Ț' | 'Ţ' => b'T',
        '\u{2018}' | '\u{2019}' => b'\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => b'"',
        '\u{2013}' | '\u{2014}' => b'-',
        '\t' => b' ',
        c if c.is_control() => b' ',
        c => u8::try_from(u32::from(c)).unwrap_or(b'?'),
    }
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// Existing line breaks are kept. Words longer than a line are split.
#[must_use]
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.extend(word.iter());
            len += word.len();
        }

        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_romanian_diacritics_fold() {
        assert_eq!(encode_latin1("Ștefan țese mătase"), b"Stefan tese matase");
        assert_eq!(encode_latin1("şi ţară"), b"si tara");
    }

    #[test]
    fn test_latin1_letters_are_kept() {
        assert_eq!(encode_latin1("Brené în"), vec![b'B', b'r', b'e', b'n', 0xE9, b' ', 0xEE, b'n']);
    }

    #[test]
    fn test_unencodable_becomes_question_mark() {
        assert_eq!(encode_latin1("✓ ok 🎤"), b"? ok ?");
        assert_eq!(encode_latin1("a\u{0}b"), b"a b");
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap("unu doi trei patru cinci", 10);
        assert_eq!(lines, vec!["unu doi", "trei patru", "cinci"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_keeps_paragraphs_and_splits_long_words() {
        let lines = wrap("a\n\nabcdefghijkl", 5);
        assert_eq!(lines, vec!["a", "", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }
}
