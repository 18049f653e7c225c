//! Reduction of surface words to a base form.
//!
//! [`NounLemmatizer`] follows the WordNet noun morphology rules (irregular
//! exceptions first, then suffix detachment) without consulting a dictionary,
//! so each rule carries a guard instead. [`StemmingLemmatizer`] wraps the
//! Snowball English stemmer for callers that prefer aggressive conflation.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

pub trait Lemmatizer: Send + Sync {
    /// Base form of `word`. Input is lowercase ASCII.
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str>;

    fn name(&self) -> &'static str;
}

lazy_static! {
    static ref IRREGULAR: HashMap<&'static str, &'static str> = {
        let pairs: &[(&str, &str)] = &[
            ("children","child"),("men","man"),("women","woman"),("feet","foot"),("teeth","tooth"),
            ("geese","goose"),("mice","mouse"),("lice","louse"),("oxen","ox"),
            ("leaves","leaf"),("lives","life"),("wives","wife"),("knives","knife"),("wolves","wolf"),
            ("halves","half"),("shelves","shelf"),("thieves","thief"),("loaves","loaf"),("calves","calf"),
            ("selves","self"),
            ("indices","index"),("matrices","matrix"),("vertices","vertex"),("appendices","appendix"),
            ("analyses","analysis"),("crises","crisis"),("theses","thesis"),("hypotheses","hypothesis"),
            ("diagnoses","diagnosis"),("axes","axis"),("phenomena","phenomenon"),("criteria","criterion"),
            ("cacti","cactus"),("fungi","fungus"),("alumni","alumnus"),("radii","radius"),
            ("nuclei","nucleus"),("stimuli","stimulus"),("syllabi","syllabus"),
            ("buses","bus"),("gases","gas"),("lenses","lens"),("viruses","virus"),("campuses","campus"),
            ("bonuses","bonus"),("statuses","status"),("quizzes","quiz"),
            ("movies","movie"),("cookies","cookie"),("zombies","zombie"),("calories","calorie"),
            ("rookies","rookie"),("brownies","brownie"),
        ];
        pairs.iter().copied().collect()
    };

    // Words that look inflected but are already their own noun lemma.
    static ref INVARIANT: HashSet<&'static str> = {
        let words: &[&str] = &[
            "series","species","news","means","physics","mathematics","economics","politics","ethics",
            "linguistics","electronics","lens","gas","bias","atlas","canvas","alias","chaos","ethos",
            "pathos","cosmos","christmas","always","perhaps","sometimes","afterwards","towards",
            "whereas","unless","specimen","abdomen","omen","semen","stamen","regimen","hymen","amen",
            "acumen","yes","alas","pampas","billiards","measles","mumps","aries","mars","paris","athens",
            "texas","kansas","arkansas","vegas","dallas","thomas","douglas","nicholas","lucas","wales",
            "angeles","brussels","philippines","netherlands",
        ];
        words.iter().copied().collect()
    };

    // Plurals in -oes that drop the whole "es".
    static ref OES_PLURALS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "heroes","potatoes","tomatoes","echoes","vetoes","torpedoes","volcanoes","mosquitoes",
            "dominoes","embargoes","tornadoes","buffaloes",
        ];
        words.iter().copied().collect()
    };

    // Nouns whose singular itself ends in -oe or -che, so only the "s" goes.
    static ref E_SINGULARS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "shoe","toe","canoe","foe","hoe","oboe","tiptoe","floe","sloe","horseshoe",
            "cache","niche","avalanche","headache","cliche","quiche","moustache","mustache","psyche",
            "creche","microfiche","panache",
        ];
        words.iter().copied().collect()
    };
}

/// Part-of-speech-agnostic lemmatizer that treats every word as a noun.
#[derive(Debug, Default, Clone, Copy)]
pub struct NounLemmatizer;

impl NounLemmatizer {
    pub fn new() -> Self { Self }
}

fn replace_suffix(word: &str, strip: usize, append: &str) -> String {
    let mut out = String::with_capacity(word.len() - strip + append.len());
    out.push_str(&word[..word.len() - strip]);
    out.push_str(append);
    out
}

impl Lemmatizer for NounLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if let Some(base) = IRREGULAR.get(word) {
            return Cow::Borrowed(*base);
        }
        if word.len() <= 3 || INVARIANT.contains(word) {
            return Cow::Borrowed(word);
        }
        // -ics nouns (informatics, physics) are their own lemma
        if word.ends_with("ics") {
            return Cow::Borrowed(word);
        }
        if word.ends_with("oes") {
            return if OES_PLURALS.contains(word) {
                Cow::Owned(replace_suffix(word, 2, ""))
            } else if E_SINGULARS.contains(&word[..word.len() - 1]) {
                Cow::Borrowed(&word[..word.len() - 1])
            } else {
                Cow::Borrowed(word)
            };
        }
        if word.ends_with("ches") && E_SINGULARS.contains(&word[..word.len() - 1]) {
            return Cow::Borrowed(&word[..word.len() - 1]);
        }
        if word.ends_with("sses") || word.ends_with("zzes") {
            return Cow::Owned(replace_suffix(word, 2, ""));
        }
        if word.ends_with("xes") || word.ends_with("ches") || word.ends_with("shes") {
            return Cow::Owned(replace_suffix(word, 2, ""));
        }
        if word.ends_with("men") && word.len() > 4 {
            return Cow::Owned(replace_suffix(word, 3, "man"));
        }
        if word.ends_with("ies") && word.len() > 4 {
            return Cow::Owned(replace_suffix(word, 3, "y"));
        }
        if word.ends_with('s') && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is")) {
            return Cow::Borrowed(&word[..word.len() - 1]);
        }
        Cow::Borrowed(word)
    }

    fn name(&self) -> &'static str { "noun" }
}

/// Snowball English stemmer exposed through the [`Lemmatizer`] seam.
pub struct StemmingLemmatizer {
    stemmer: Stemmer,
}

impl StemmingLemmatizer {
    pub fn new() -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English) }
    }
}

impl Default for StemmingLemmatizer {
    fn default() -> Self { Self::new() }
}

impl Lemmatizer for StemmingLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        self.stemmer.stem(word)
    }

    fn name(&self) -> &'static str { "snowball" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(w: &str) -> String { NounLemmatizer.lemmatize(w).into_owned() }

    #[test]
    fn regular_plurals() {
        assert_eq!(lemma("cats"), "cat");
        assert_eq!(lemma("houses"), "house");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("churches"), "church");
        assert_eq!(lemma("dishes"), "dish");
        assert_eq!(lemma("glasses"), "glass");
        assert_eq!(lemma("stories"), "story");
        assert_eq!(lemma("firemen"), "fireman");
    }

    #[test]
    fn irregular_and_invariant_forms() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("mice"), "mouse");
        assert_eq!(lemma("leaves"), "leaf");
        assert_eq!(lemma("series"), "series");
        assert_eq!(lemma("news"), "news");
        assert_eq!(lemma("specimen"), "specimen");
    }

    #[test]
    fn guarded_endings_are_kept() {
        assert_eq!(lemma("class"), "class");
        assert_eq!(lemma("campus"), "campus");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("gas"), "gas");
        assert_eq!(lemma("pies"), "pie");
        assert_eq!(lemma("cat"), "cat");
    }

    #[test]
    fn words_without_a_shorter_base_stay_whole() {
        assert_eq!(lemma("informatics"), "informatics");
        assert_eq!(lemma("mathematics"), "mathematics");
        assert_eq!(lemma("goes"), "goes");
        assert_eq!(lemma("texas"), "texas");
        assert_eq!(lemma("angeles"), "angeles");
        assert_eq!(lemma("yes"), "yes");
    }

    #[test]
    fn oes_and_ches_plurals() {
        assert_eq!(lemma("heroes"), "hero");
        assert_eq!(lemma("potatoes"), "potato");
        assert_eq!(lemma("shoes"), "shoe");
        assert_eq!(lemma("canoes"), "canoe");
        assert_eq!(lemma("caches"), "cache");
        assert_eq!(lemma("niches"), "niche");
        assert_eq!(lemma("beaches"), "beach");
    }

    #[test]
    fn non_plural_words_are_borrowed() {
        assert!(matches!(NounLemmatizer.lemmatize("search"), Cow::Borrowed("search")));
    }

    #[test]
    fn stemmer_conflates_verb_forms() {
        let s = StemmingLemmatizer::new();
        assert_eq!(s.lemmatize("running"), "run");
        assert_eq!(s.lemmatize("runs"), "run");
    }
}
