//! Table and column naming conventions

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Turns a singular table noun into its plural.
pub trait Pluralizer: Send + Sync {
    fn pluralize(&self, word: &str) -> String;
}

/// Insert `_` before every uppercase letter except the first, and lowercase.
///
/// `UserProfile` becomes `user_profile`; `created_at` is unchanged.
pub fn snake_case(name: &str) -> String {
    let mut snaked = String::with_capacity(name.len() + 4);

    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snaked.push('_');
            }
            snaked.extend(c.to_lowercase());
        } else {
            snaked.push(c);
        }
    }

    snaked
}

/// Irregular and uncountable nouns.
static IRREGULARS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // people
        ("person", "people"),
        ("man", "men"),
        ("woman", "women"),
        ("child", "children"),
        ("human", "humans"),
        // body parts and animals
        ("tooth", "teeth"),
        ("foot", "feet"),
        ("goose", "geese"),
        ("mouse", "mice"),
        ("louse", "lice"),
        ("ox", "oxen"),
        ("deer", "deer"),
        ("sheep", "sheep"),
        ("fish", "fish"),
        ("moose", "moose"),
        ("swine", "swine"),
        ("buffalo", "buffalo"),
        ("bison", "bison"),
        ("salmon", "salmon"),
        ("trout", "trout"),
        ("species", "species"),
        ("series", "series"),
        // data
        ("datum", "data"),
        ("medium", "media"),
        ("forum", "forums"),
        ("virus", "viruses"),
        ("status", "statuses"),
        ("campus", "campuses"),
        ("corpus", "corpora"),
        ("genus", "genera"),
        // latin and greek
        ("alumnus", "alumni"),
        ("alumna", "alumnae"),
        ("analysis", "analyses"),
        ("axis", "axes"),
        ("basis", "bases"),
        ("crisis", "crises"),
        ("diagnosis", "diagnoses"),
        ("ellipsis", "ellipses"),
        ("hypothesis", "hypotheses"),
        ("oasis", "oases"),
        ("parenthesis", "parentheses"),
        ("synopsis", "synopses"),
        ("thesis", "theses"),
        ("phenomenon", "phenomena"),
        ("criterion", "criteria"),
        ("bacterium", "bacteria"),
        ("curriculum", "curricula"),
        ("memorandum", "memoranda"),
        ("millennium", "millennia"),
        ("stadium", "stadiums"),
        ("aquarium", "aquariums"),
        ("gymnasium", "gymnasiums"),
        ("auditorium", "auditoriums"),
        ("emporium", "emporiums"),
        // uncountable
        ("advice", "advice"),
        ("aircraft", "aircraft"),
        ("bread", "bread"),
        ("butter", "butter"),
        ("chess", "chess"),
        ("clothing", "clothing"),
        ("coal", "coal"),
        ("evidence", "evidence"),
        ("feedback", "feedback"),
        ("furniture", "furniture"),
        ("gold", "gold"),
        ("homework", "homework"),
        ("honey", "honey"),
        ("information", "information"),
        ("jewelry", "jewelry"),
        ("luggage", "luggage"),
        ("money", "money"),
        ("music", "music"),
        ("news", "news"),
        ("oil", "oil"),
        ("oxygen", "oxygen"),
        ("paper", "paper"),
        ("permission", "permission"),
        ("research", "research"),
        ("rice", "rice"),
        ("sand", "sand"),
        ("software", "software"),
        ("sugar", "sugar"),
        ("traffic", "traffic"),
        ("travel", "travel"),
        ("trouble", "trouble"),
        ("water", "water"),
        ("weather", "weather"),
        ("wood", "wood"),
        ("work", "work"),
        ("staff", "staff"),
        ("equipment", "equipment"),
        ("headquarters", "headquarters"),
    ])
});

/// Consonant + `o` words that take a plain `s`.
static O_EXCEPTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "audio", "auto", "cameo", "casino", "combo", "disco", "embryo", "euro", "folio", "halo",
        "kilo", "logo", "macro", "memo", "metro", "micro", "nano", "patio", "photo", "piano",
        "pro", "radio", "ratio", "retro", "romeo", "solo", "stereo", "studio", "tempo", "video",
        "zero",
    ])
});

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Whether the character before the last one is a consonant.
fn consonant_before_last(lower: &str) -> bool {
    lower
        .chars()
        .rev()
        .nth(1)
        .is_some_and(|c| !is_vowel(c))
}

/// Rule-based English pluralizer with a dictionary of irregular words.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPluralizer;

impl Pluralizer for BasicPluralizer {
    fn pluralize(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if let Some(plural) = IRREGULARS.get(lower.as_str()) {
            return (*plural).to_string();
        }

        if lower.ends_with('s') || lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh") {
            return format!("{word}es");
        }

        if lower.ends_with('y') && consonant_before_last(&lower) {
            return format!("{}ies", &word[..word.len() - 1]);
        }

        if lower.ends_with('f') {
            return format!("{}ves", &word[..word.len() - 1]);
        }

        if lower.ends_with("fe") {
            return format!("{}ves", &word[..word.len() - 2]);
        }

        if lower.ends_with('o') && consonant_before_last(&lower) {
            if O_EXCEPTIONS.contains(lower.as_str()) {
                return format!("{word}s");
            }
            return format!("{word}es");
        }

        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("CreatedAt"), "created_at");
        assert_eq!(snake_case("created_at"), "created_at");
        assert_eq!(snake_case("ID"), "i_d");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn test_irregulars() {
        let p = BasicPluralizer;
        assert_eq!(p.pluralize("person"), "people");
        assert_eq!(p.pluralize("sheep"), "sheep");
        assert_eq!(p.pluralize("datum"), "data");
        assert_eq!(p.pluralize("Status"), "statuses");
    }

    #[test]
    fn test_suffix_rules() {
        let p = BasicPluralizer;
        assert_eq!(p.pluralize("bus"), "buses");
        assert_eq!(p.pluralize("box"), "boxes");
        assert_eq!(p.pluralize("church"), "churches");
        assert_eq!(p.pluralize("dish"), "dishes");
        assert_eq!(p.pluralize("category"), "categories");
        assert_eq!(p.pluralize("key"), "keys");
        assert_eq!(p.pluralize("leaf"), "leaves");
        assert_eq!(p.pluralize("knife"), "knives");
        assert_eq!(p.pluralize("hero"), "heroes");
        assert_eq!(p.pluralize("photo"), "photos");
        assert_eq!(p.pluralize("zoo"), "zoos");
        assert_eq!(p.pluralize("user"), "users");
        assert_eq!(p.pluralize("key_value"), "key_values");
    }

    #[test]
    fn test_single_letter_words() {
        let p = BasicPluralizer;
        assert_eq!(p.pluralize("y"), "ys");
        assert_eq!(p.pluralize("o"), "os");
    }
}
