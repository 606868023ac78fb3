//! Chinese text utilities.

/// Check if a character is a Chinese character.
pub fn is_chinese_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |  // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |  // CJK Unified Ideographs Extension A
        '\u{F900}'..='\u{FAFF}' |  // CJK Compatibility Ideographs
        '\u{20000}'..='\u{2A6DF}'  // CJK Unified Ideographs Extension B
    )
}

/// Value of a numeral digit character; `十` doubles as the digit ten.
fn digit_value(c: char) -> u64 {
    match c {
        '零' => 0,
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        '十' => 10,
        _ => 0,
    }
}

/// Value of a positional unit character.
fn unit_value(c: char) -> Option<u64> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1_000),
        '万' => Some(10_000),
        '亿' => Some(100_000_000),
        _ => None,
    }
}

/// Units that commit the running group instead of multiplying one digit.
fn is_large_unit(c: char) -> bool {
    matches!(c, '万' | '亿')
}

/// Convert a run of Chinese numerals to an integer.
///
/// `十二` → 12, `二十三` → 23, `八百一十二万` → 8120000.
pub fn convert_numeral(numeral: &str) -> u64 {
    let chars: Vec<char> = numeral.chars().collect();
    let mut sum = 0u64;
    let mut temp = 0u64;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        if c == '零' {
            continue;
        }

        if is_large_unit(c) {
            sum += temp * unit_value(c).unwrap_or(1);
            temp = 0;
            continue;
        }

        if let Some(&next) = chars.get(i) {
            match unit_value(next) {
                Some(unit) if !is_large_unit(next) => {
                    temp += digit_value(c) * unit;
                    i += 1;
                    continue;
                }
                Some(_) => {}
                None => {
                    // A leading 十 followed by a digit: 十二
                    temp += 10;
                    continue;
                }
            }
        }

        temp += digit_value(c);
    }

    sum + temp
}

/// Split a title into its leading Chinese words and the remainder.
///
/// Mixed words such as `我love你` are not separated.
pub fn split_chs_eng_title(name: &str) -> (String, String) {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}'))
        .collect();
    let cleaned = cleaned.trim();

    let mut chs_words = Vec::new();
    for word in cleaned.split(' ') {
        match word.chars().next() {
            None => continue,
            Some(first) if is_chinese_char(first) => chs_words.push(word),
            Some(_) => break,
        }
    }

    let chs = chs_words.join(" ");
    let eng = if chs.is_empty() {
        cleaned.to_string()
    } else {
        cleaned.replacen(&chs, "", 1).trim().to_string()
    };

    (chs, eng)
}

/// Split `Title AKA Alias` into its two halves.
pub fn split_title_alias(name: &str) -> (String, String) {
    let parts: Vec<&str> = name.split(" AKA ").collect();
    if parts.len() == 2 {
        (parts[0].to_string(), parts[1].to_string())
    } else {
        (name.to_string(), String::new())
    }
}
