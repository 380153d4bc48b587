//! Static mapping from recognizer phone labels to lyrics and synthesizer phonemes.
//!
//! Labels follow the Julius Japanese monophone set: five vowels, consonant
//! families (optionally palatalized, `ky`, `sh`, ...), and a handful of
//! non-phonemic units for silence, pauses, the moraic nasal and the glottal stop.

/// Number of vowel slots in every consonant row.
pub const VOWEL_COUNT: usize = 5;

/// Suffix marking a lengthened vowel (`a:`).
pub const LENGTH_MARKER: char = ':';

/// Label of the glottal stop (sokuon).
pub const GLOTTAL_STOP: &str = "q";

/// Lyric written for a glottal stop note.
pub const GLOTTAL_STOP_LYRIC: &str = "っ";

/// Phoneme override written for a glottal stop note.
pub const SILENCE_PHONEME: &str = "Sil";

/// One consonant family: its native synthesizer phoneme and the lyric for
/// each of the five vowels, in `a i u e o` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsonantDef {
    pub phoneme: &'static str,
    pub kana: [&'static str; VOWEL_COUNT],
}

/// Classification of a single segment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass<'a> {
    /// Glottal stop; never merges with neighbors.
    GlottalStop,
    /// Non-phonemic unit; an empty lyric means the unit is dropped.
    Special(&'static str),
    /// One of the five vowels, possibly carrying the length marker.
    Vowel { index: usize, long: bool },
    /// Anything else; resolved against the consonant rows at flush time.
    Consonant(&'a str),
}

/// Immutable lookup tables for one phone set.
#[derive(Debug)]
pub struct PhoneticTable {
    vowels: &'static [(&'static str, usize)],
    consonants: &'static [(&'static str, ConsonantDef)],
    specials: &'static [(&'static str, &'static str)],
}

const fn row(phoneme: &'static str, kana: [&'static str; VOWEL_COUNT]) -> ConsonantDef {
    ConsonantDef { phoneme, kana }
}

static JAPANESE_VOWELS: [(&str, usize); VOWEL_COUNT] =
    [("a", 0), ("i", 1), ("u", 2), ("e", 3), ("o", 4)];

static JAPANESE_CONSONANTS: [(&str, ConsonantDef); 31] = [
    ("", row("", ["あ", "い", "う", "え", "お"])),
    ("k", row("k", ["か", "き", "く", "け", "こ"])),
    ("s", row("s", ["さ", "すぃ", "す", "せ", "そ"])),
    ("t", row("t", ["た", "てぃ", "とぅ", "て", "と"])),
    ("n", row("n", ["な", "に", "ぬ", "ね", "の"])),
    ("h", row("h", ["は", "ひ", "ふ", "へ", "ほ"])),
    ("f", row("p\\", ["ふぁ", "ふぃ", "ふ", "ふぇ", "ふぉ"])),
    ("m", row("m", ["ま", "み", "む", "め", "も"])),
    ("y", row("j", ["や", "い", "ゆ", "いぇ", "よ"])),
    ("r", row("4", ["ら", "り", "る", "れ", "ろ"])),
    ("w", row("w", ["わ", "うぃ", "う", "うぇ", "うぉ"])),
    ("g", row("g", ["が", "ぎ", "ぐ", "げ", "ご"])),
    ("z", row("z", ["ざ", "ずぃ", "ず", "ぜ", "ぞ"])),
    ("d", row("d", ["だ", "でぃ", "どぅ", "で", "ど"])),
    ("b", row("b", ["ば", "び", "ぶ", "べ", "ぼ"])),
    ("ky", row("k'", ["きゃ", "き", "きゅ", "きぇ", "きょ"])),
    ("sh", row("S", ["しゃ", "し", "しゅ", "しぇ", "しょ"])),
    ("ty", row("t'", ["てゃ", "てぃ", "てゅ", "て", "てょ"])),
    ("ch", row("tS", ["ちゃ", "ち", "ちゅ", "ちぇ", "ちょ"])),
    ("ny", row("n'", ["にゃ", "に", "にゅ", "にぇ", "にょ"])),
    ("hy", row("C", ["ひゃ", "ひ", "ひゅ", "ひぇ", "ひょ"])),
    ("my", row("m'", ["みゃ", "み", "みゅ", "みぇ", "みょ"])),
    ("ry", row("4'", ["りゃ", "り", "りゅ", "りぇ", "りょ"])),
    ("gy", row("g'", ["ぎゃ", "ぎ", "ぎゅ", "ぎぇ", "ぎょ"])),
    ("j", row("dZ", ["じゃ", "じ", "じゅ", "じぇ", "じょ"])),
    ("dy", row("d'", ["でゃ", "でぃ", "でゅ", "で", "でょ"])),
    ("by", row("b'", ["びゃ", "び", "びゅ", "びぇ", "びょ"])),
    ("p", row("p", ["ぱ", "ぴ", "ぷ", "ぺ", "ぽ"])),
    ("py", row("p'", ["ぴゃ", "ぴ", "ぴゅ", "ぴぇ", "ぴょ"])),
    ("ts", row("ts", ["つぁ", "つぃ", "つ", "つぇ", "つぉ"])),
    ("zy", row("z'", ["ずゃ", "ずぃ", "ず", "ずぇ", "ずぉ"])),
];

static JAPANESE_SPECIALS: [(&str, &str); 5] = [
    ("silB", ""),
    ("silE", ""),
    ("sp", ""),
    ("q", ""),
    ("N", "ん"),
];

static JAPANESE: PhoneticTable = PhoneticTable {
    vowels: &JAPANESE_VOWELS,
    consonants: &JAPANESE_CONSONANTS,
    specials: &JAPANESE_SPECIALS,
};

impl PhoneticTable {
    /// The Japanese phone set used by the Julius segmentation kit.
    pub fn japanese() -> &'static PhoneticTable {
        &JAPANESE
    }

    /// Index (`0..5`) of a bare vowel label.
    pub fn lookup_vowel(&self, label: &str) -> Option<usize> {
        self.vowels
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, index)| *index)
    }

    /// Label of the vowel at `index`.
    pub fn vowel_name(&self, index: usize) -> Option<&'static str> {
        self.vowels
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(name, _)| *name)
    }

    /// Consonant row for a label; `""` yields the pure-vowel row.
    pub fn lookup_consonant(&self, label: &str) -> Option<&ConsonantDef> {
        self.consonants
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, def)| def)
    }

    /// Replacement lyric of a non-phonemic unit.
    pub fn special(&self, label: &str) -> Option<&'static str> {
        self.specials
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, lyric)| *lyric)
    }

    /// Lyric of a pure vowel (empty-consonant row).
    pub fn vowel_lyric(&self, index: usize) -> Option<&'static str> {
        self.lookup_consonant("")
            .and_then(|def| def.kana.get(index).copied())
    }

    /// Classify a segment label. The length marker is stripped first.
    pub fn classify<'a>(&self, label: &'a str) -> UnitClass<'a> {
        let (base, long) = split_length(label);
        if base == GLOTTAL_STOP {
            return UnitClass::GlottalStop;
        }
        if let Some(lyric) = self.special(base) {
            return UnitClass::Special(lyric);
        }
        match self.lookup_vowel(base) {
            Some(index) => UnitClass::Vowel { index, long },
            None => UnitClass::Consonant(base),
        }
    }
}

/// Split the length marker off a label: `"a:"` → `("a", true)`.
pub fn split_length(label: &str) -> (&str, bool) {
    match label.strip_suffix(LENGTH_MARKER) {
        Some(base) => (base, true),
        None => (label, false),
    }
}
