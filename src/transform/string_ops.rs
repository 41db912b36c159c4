use std::borrow::Cow;

/// Digraph letters whose titlecase form is neither their upper nor their
/// lower case (`ǆ` → `ǅ`).
fn titlecase_digraph(ch: char) -> Option<char> {
    match ch {
        '\u{01C4}'..='\u{01C6}' => Some('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => Some('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => Some('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => Some('\u{01F2}'),
        _ => None,
    }
}

fn is_cased(ch: char) -> bool {
    ch.is_uppercase() || ch.is_lowercase() || titlecase_digraph(ch).is_some()
}

/// Pushes the titlecase form of `ch`. Characters whose uppercase expands to
/// several letters keep only the first one upper (`ß` → `Ss`, `ﬁ` → `Fi`).
fn push_titlecase(output: &mut String, ch: char) {
    if let Some(title) = titlecase_digraph(ch) {
        output.push(title);
        return;
    }
    let mut upper = ch.to_uppercase();
    match upper.next() {
        Some(first) if is_cased(first) => {
            output.push(first);
            output.extend(upper.flat_map(char::to_lowercase));
        }
        Some(first) => {
            output.push(first);
            output.extend(upper);
        }
        None => {}
    }
}

/// Capitalizes the first cased character of every word and lowercases the
/// rest. Any uncased character (space, digit, apostrophe, hyphen) ends a
/// word, so `o'brien` becomes `O'Brien` and `3rd` becomes `3Rd`.
///
/// Word starts use titlecase rather than uppercase where the two differ for
/// Latin letters (`ßtraße` → `Sstraße`). Greek letters with iota subscript
/// are not special-cased and come out as uppercase plus lowercase iota.
pub fn title_case(input: &str) -> Cow<'_, str> {
    let mut output = String::with_capacity(input.len());
    let mut previous_cased = false;
    for ch in input.chars() {
        if is_cased(ch) {
            if previous_cased {
                output.extend(ch.to_lowercase());
            } else {
                push_titlecase(&mut output, ch);
            }
            previous_cased = true;
        } else {
            output.push(ch);
            previous_cased = false;
        }
    }
    if output == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(output)
    }
}

/// Trim followed by title case, the normalization applied to free-text
/// sales columns.
pub fn normalize_text(input: &str) -> Cow<'_, str> {
    title_case(input.trim())
}
