use std::borrow::Cow;

use proptest::prelude::*;
use sales_clean::transform::string_ops::{normalize_text, title_case};

#[test]
fn title_case_capitalizes_after_any_uncased_character() {
    assert_eq!(title_case("o'brien").as_ref(), "O'Brien");
    assert_eq!(title_case("new-york city").as_ref(), "New-York City");
    assert_eq!(title_case("NEW YORK").as_ref(), "New York");
    assert_eq!(title_case("3rd avenue").as_ref(), "3Rd Avenue");
    assert_eq!(title_case("crédit card").as_ref(), "Crédit Card");
}

#[test]
fn title_case_uses_titlecase_forms_at_word_starts() {
    assert_eq!(title_case("ßtraße").as_ref(), "Sstraße");
    assert_eq!(title_case("STRAßE ßig").as_ref(), "Straße Ssig");
    assert_eq!(title_case("ﬁsh market").as_ref(), "Fish Market");
    assert_eq!(title_case("ǆungla").as_ref(), "ǅungla");
    assert_eq!(title_case("ǄUNGLA").as_ref(), "ǅungla");
    assert_eq!(title_case("ŉ").as_ref(), "ʼN");
}

#[test]
fn title_case_borrows_when_already_titled() {
    let result = title_case("Credit Card");
    assert!(matches!(result, Cow::Borrowed(_)));
}

#[test]
fn normalize_text_trims_before_casing() {
    assert_eq!(normalize_text("  alice smith\t").as_ref(), "Alice Smith");
    assert_eq!(normalize_text("   ").as_ref(), "");
}

proptest! {
    #[test]
    fn title_case_is_idempotent_on_ascii(input in "[ -~]{0,40}") {
        let once = title_case(&input).into_owned();
        let twice = title_case(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_word_starts_upper_and_continues_lower(
        words in proptest::collection::vec("[a-zA-Z]{1,8}", 1..6)
    ) {
        let joined = words.join(" ");
        let titled = title_case(&joined).into_owned();
        for word in titled.split(' ') {
            let mut chars = word.chars();
            let first = chars.next().unwrap();
            prop_assert!(first.is_ascii_uppercase());
            prop_assert!(chars.all(|c| c.is_ascii_lowercase()));
        }
    }
}
