use fake::Fake;
use fake::faker::address::{en as address_en, fr_fr as address_fr};
use fake::faker::company::{en as company_en, fr_fr as company_fr};
use fake::faker::internet::{en as internet_en, fr_fr as internet_fr};
use fake::faker::lorem::{en as lorem_en, fr_fr as lorem_fr};
use fake::faker::name::{en as name_en, fr_fr as name_fr};
use fake::faker::phone_number::{en as phone_en, fr_fr as phone_fr};
use rand::Rng;

use crate::faker_rs::locales::LocaleKey;

/// Faker-backed value kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeKind {
    FirstName,
    LastName,
    FullName,
    Email,
    Company,
    PostCode,
    PhoneNumber,
}

pub struct FakeRsAdapter;

impl FakeRsAdapter {
    pub fn generate<R: Rng + ?Sized>(kind: FakeKind, locale: LocaleKey, rng: &mut R) -> String {
        match (kind, locale) {
            (FakeKind::FirstName, LocaleKey::FrFr) => name_fr::FirstName().fake_with_rng(rng),
            (FakeKind::FirstName, LocaleKey::EnUs) => name_en::FirstName().fake_with_rng(rng),
            (FakeKind::LastName, LocaleKey::FrFr) => name_fr::LastName().fake_with_rng(rng),
            (FakeKind::LastName, LocaleKey::EnUs) => name_en::LastName().fake_with_rng(rng),
            (FakeKind::FullName, LocaleKey::FrFr) => name_fr::Name().fake_with_rng(rng),
            (FakeKind::FullName, LocaleKey::EnUs) => name_en::Name().fake_with_rng(rng),
            (FakeKind::Email, LocaleKey::FrFr) => internet_fr::SafeEmail().fake_with_rng(rng),
            (FakeKind::Email, LocaleKey::EnUs) => internet_en::SafeEmail().fake_with_rng(rng),
            (FakeKind::Company, LocaleKey::FrFr) => company_fr::CompanyName().fake_with_rng(rng),
            (FakeKind::Company, LocaleKey::EnUs) => company_en::CompanyName().fake_with_rng(rng),
            (FakeKind::PostCode, LocaleKey::FrFr) => address_fr::PostCode().fake_with_rng(rng),
            (FakeKind::PostCode, LocaleKey::EnUs) => address_en::PostCode().fake_with_rng(rng),
            (FakeKind::PhoneNumber, LocaleKey::FrFr) => {
                phone_fr::PhoneNumber().fake_with_rng(rng)
            }
            (FakeKind::PhoneNumber, LocaleKey::EnUs) => {
                phone_en::PhoneNumber().fake_with_rng(rng)
            }
        }
    }

    /// Sentences of lorem text, cut at a word boundary so the result never
    /// exceeds `max_chars` characters.
    pub fn text<R: Rng + ?Sized>(max_chars: usize, locale: LocaleKey, rng: &mut R) -> String {
        let sentences: Vec<String> = match locale {
            LocaleKey::FrFr => lorem_fr::Sentences(1..6).fake_with_rng(rng),
            LocaleKey::EnUs => lorem_en::Sentences(1..6).fake_with_rng(rng),
        };
        truncate_words(&sentences.join(" "), max_chars)
    }
}

fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = if out.is_empty() {
            word.chars().count()
        } else {
            out.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        text.chars().take(max_chars).collect()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn text_respects_max_chars() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let text = FakeRsAdapter::text(40, LocaleKey::FrFr, &mut rng);
            assert!(text.chars().count() <= 40, "{text}");
        }
    }

    #[test]
    fn truncate_words_keeps_whole_words() {
        assert_eq!(truncate_words("alpha beta gamma", 11), "alpha beta");
        assert_eq!(truncate_words("alpha", 10), "alpha");
        assert_eq!(truncate_words("incomprehensible", 4), "inco");
    }

    #[test]
    fn names_are_not_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for kind in [
            FakeKind::FirstName,
            FakeKind::LastName,
            FakeKind::Email,
            FakeKind::PostCode,
        ] {
            let value = FakeRsAdapter::generate(kind, LocaleKey::FrFr, &mut rng);
            assert!(!value.is_empty(), "{kind:?}");
        }
    }
}
