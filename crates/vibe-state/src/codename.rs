//! Pseudonymous `adjective-noun` display names.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Random draws attempted before falling back to a numeric suffix.
pub const MAX_DRAWS: usize = 32;

const ADJECTIVES: &[&str] = &[
    "able", "amber", "ancient", "arctic", "bold", "brave", "bright", "brisk", "calm", "cheeky",
    "clever", "cosmic", "crimson", "curious", "daring", "dashing", "dizzy", "eager", "electric",
    "fancy", "fearless", "fluffy", "frosty", "funky", "gentle", "giddy", "glossy", "golden",
    "groovy", "happy", "hasty", "hidden", "humble", "icy", "jolly", "jumpy", "keen", "lazy",
    "lucky", "lunar", "mellow", "mighty", "misty", "nimble", "noble", "peppy", "plucky", "proud",
    "quick", "quiet", "rapid", "rowdy", "rusty", "sassy", "shiny", "silent", "silver", "sleepy",
    "sneaky", "snappy", "solar", "spicy", "spry", "stormy", "sunny", "swift", "tidy", "turbo",
    "velvet", "vivid", "wacky", "witty", "zany", "zesty",
];

const NOUNS: &[&str] = &[
    "albatross", "alpaca", "badger", "beaver", "bison", "bobcat", "buffalo", "camel", "cheetah",
    "cobra", "condor", "coyote", "crane", "dingo", "dolphin", "eagle", "falcon", "ferret",
    "flamingo", "fox", "gazelle", "gecko", "gibbon", "hamster", "hedgehog", "heron", "hippo",
    "ibis", "iguana", "jackal", "jaguar", "koala", "kraken", "langur", "lemur", "leopard", "llama",
    "lynx", "macaw", "mamba", "mongoose", "moose", "narwhal", "ocelot", "otter", "owl", "panda",
    "panther", "parrot", "pelican", "penguin", "puffin", "python", "quokka", "raccoon", "raven",
    "rhino", "samosa", "seal", "shark", "sloth", "sparrow", "squid", "tapir", "tiger", "toucan",
    "turtle", "viper", "walrus", "weasel", "wombat", "yak", "zebra",
];

/// Draw one slug of `words` words: `words - 1` adjectives followed by a noun.
pub fn generate_slug<R: Rng + ?Sized>(rng: &mut R, words: usize) -> String {
    let words = words.max(1);
    let mut parts: Vec<&str> = Vec::with_capacity(words);
    for _ in 1..words {
        parts.push(ADJECTIVES.choose(rng).copied().unwrap_or("mystery"));
    }
    parts.push(NOUNS.choose(rng).copied().unwrap_or("meme"));
    parts.join("-")
}

/// Draw a slug not present in `taken`.
///
/// After `MAX_DRAWS` collisions the last draw gets the smallest free
/// numeric suffix, so the result is always unused.
pub fn generate_unique_slug<R: Rng + ?Sized>(
    rng: &mut R,
    words: usize,
    taken: &HashSet<&str>,
) -> String {
    let mut candidate = generate_slug(rng, words);
    for _ in 1..MAX_DRAWS {
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        candidate = generate_slug(rng, words);
    }
    if !taken.contains(candidate.as_str()) {
        return candidate;
    }
    let mut n = 2u64;
    loop {
        let suffixed = format!("{candidate}-{n}");
        if !taken.contains(suffixed.as_str()) {
            return suffixed;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_two_word_slug_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let slug = generate_slug(&mut rng, 2);
        let parts: Vec<&str> = slug.split('-').collect();
        assert_eq!(parts.len(), 2);
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
    }

    #[test]
    fn test_word_lists_are_hyphen_free() {
        assert!(ADJECTIVES.iter().chain(NOUNS).all(|w| !w.contains('-')));
    }

    #[test]
    fn test_unique_slug_falls_back_to_suffix_when_space_exhausted() {
        // One-word slugs only draw from NOUNS; take all of them.
        let taken: HashSet<&str> = NOUNS.iter().copied().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let slug = generate_unique_slug(&mut rng, 1, &taken);
        assert!(!taken.contains(slug.as_str()));
        assert!(slug.ends_with("-2"));
    }
}
