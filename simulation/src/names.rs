//! Name Generation for People
//!
//! Names are composed from a syllable table. One syllable per line:
//!
//! - `-syl` is a prefix, `+syl` a suffix, anything else a middle part.
//! - Rules may follow the syllable, separated by whitespace:
//!   `+v` / `+c` require the *next* syllable to start with a vowel / consonant,
//!   `-v` / `-c` allow *this* syllable only after one ending in a vowel / consonant.
//!
//! A 1-syllable name is a prefix, 2 syllables are prefix + suffix, and longer
//! names fill the gap with middle parts.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::error::NameError;

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'ä', 'ö', 'õ', 'ü', 'y'];
const CONSONANTS: &[char] = &[
    'b', 'c', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'm', 'n', 'p', 'q', 'r', 's', 't', 'v', 'w',
    'x', 'y',
];

/// Built-in table used when a world is not given its own name source.
const DEFAULT_SYLLABLES: &str = "\
-al
-ar
-bal
-bel
-bor
-cal
-dar
-del
-dor
-el
-fal
-gar
-gil +c
-hal
-ith +c
-kal
-lor
-mal
-mor +v
-nar
-or
-thal +v
-tor
-val
-zan
a
e
i
o
an
en
ri
ro
da
li
ma
the
ur -c
ae -c
dri
ven
lo
sa
ne
gor
+an
+ar
+as
+en
+er
+ia
+id
+il
+in
+ion
+is
+na
+on
+or
+ra
+ren
+ric
+rin
+us
+wen
+dor
+mir
+eth -c
+iel -c
+th -v
+wyn
+ak
";

static DEFAULT_TABLE: Lazy<SyllableNames> = Lazy::new(|| SyllableNames::parse(DEFAULT_SYLLABLES));

/// The built-in syllable table, parsed on first use.
pub fn default_names() -> &'static SyllableNames {
    &DEFAULT_TABLE
}

/// Produces display names. The engine treats names as opaque strings.
pub trait NameSource: Send + Sync {
    fn compose(&self, syllables: usize, rng: &mut dyn RngCore) -> Result<String, NameError>;
}

impl<N: NameSource + ?Sized> NameSource for &N {
    fn compose(&self, syllables: usize, rng: &mut dyn RngCore) -> Result<String, NameError> {
        (**self).compose(syllables, rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sound {
    Vowel,
    Consonant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Syllable {
    text: String,
    /// Required first sound of the following syllable.
    expects: Option<Sound>,
    /// Required last sound of the preceding syllable.
    follows: Option<Sound>,
}

impl Syllable {
    fn parse(body: &str) -> Option<Self> {
        let mut tokens = body.split_whitespace();
        let text = tokens.next()?.to_lowercase();
        let mut syllable = Syllable {
            text,
            expects: None,
            follows: None,
        };
        for rule in tokens {
            match rule {
                "+v" => syllable.expects = Some(Sound::Vowel),
                "+c" => syllable.expects = Some(Sound::Consonant),
                "-v" => syllable.follows = Some(Sound::Vowel),
                "-c" => syllable.follows = Some(Sound::Consonant),
                _ => {}
            }
        }
        Some(syllable)
    }

    fn starts_with(&self, sound: Sound) -> bool {
        let Some(first) = self.text.chars().next() else {
            return false;
        };
        match sound {
            Sound::Vowel => VOWELS.contains(&first),
            Sound::Consonant => CONSONANTS.contains(&first),
        }
    }

    fn ending(&self) -> Sound {
        match self.text.chars().last() {
            Some(c) if VOWELS.contains(&c) => Sound::Vowel,
            _ => Sound::Consonant,
        }
    }

    fn can_follow(&self, prev: &Syllable) -> bool {
        prev.expects.map_or(true, |sound| self.starts_with(sound))
            && self.follows.map_or(true, |sound| sound == prev.ending())
    }
}

/// Syllable table with pronounceability rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllableNames {
    prefixes: Vec<Syllable>,
    middles: Vec<Syllable>,
    suffixes: Vec<Syllable>,
}

impl SyllableNames {
    /// Parse a table. Blank lines and lines without a syllable are skipped.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (pool, body) = if let Some(rest) = line.strip_prefix('-') {
                (&mut table.prefixes, rest)
            } else if let Some(rest) = line.strip_prefix('+') {
                (&mut table.suffixes, rest)
            } else {
                (&mut table.middles, line)
            };
            if let Some(syllable) = Syllable::parse(body) {
                pool.push(syllable);
            }
        }
        table
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    pub fn middle_count(&self) -> usize {
        self.middles.len()
    }

    pub fn suffix_count(&self) -> usize {
        self.suffixes.len()
    }

    fn pick_after<'a>(
        pool: &'a [Syllable],
        prev: &Syllable,
        part: &'static str,
        rng: &mut dyn RngCore,
    ) -> Result<&'a Syllable, NameError> {
        let candidates: Vec<&Syllable> = pool.iter().filter(|s| s.can_follow(prev)).collect();
        candidates
            .choose(rng)
            .copied()
            .ok_or_else(|| NameError::Unsatisfiable {
                part,
                after: prev.text.clone(),
            })
    }
}

impl NameSource for SyllableNames {
    fn compose(&self, syllables: usize, rng: &mut dyn RngCore) -> Result<String, NameError> {
        if syllables < 1 {
            return Err(NameError::TooFewSyllables);
        }
        if self.prefixes.is_empty() {
            return Err(NameError::NoPrefixes);
        }
        if self.suffixes.is_empty() {
            return Err(NameError::NoSuffixes);
        }
        if syllables > 2 && self.middles.is_empty() {
            return Err(NameError::NoMiddleParts { syllables });
        }

        let mut prev = self.prefixes.choose(rng).ok_or(NameError::NoPrefixes)?;
        let mut name = prev.text.clone();
        if syllables == 1 {
            return Ok(capitalize(&name));
        }
        for _ in 0..syllables - 2 {
            prev = Self::pick_after(&self.middles, prev, "middle part", rng)?;
            name.push_str(&prev.text);
        }
        let suffix = Self::pick_after(&self.suffixes, prev, "suffix", rng)?;
        name.push_str(&suffix.text);
        Ok(capitalize(&name))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
