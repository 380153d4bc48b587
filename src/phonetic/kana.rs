//! Kana to phonetic transcription for building aligner dictionaries.
//!
//! Forced alignment needs the transcript as a sequence of phone labels. Each
//! line of the user's text (hiragana) is rewritten with an ordered list of
//! literal replacements: longest spellings first, so that `きょ` wins over `き`.
//! Dictation results go the other way through [`phones_to_kana`].

use crate::phonetic::table::{GLOTTAL_STOP, GLOTTAL_STOP_LYRIC, PhoneticTable, split_length};

/// Ordered replacement rules. Order matters; do not sort.
static KANA_RULES: [(&str, &str); 271] = [
    ("う゛ぁ", " b a"),
    ("う゛ぃ", " b i"),
    ("う゛ぇ", " b e"),
    ("う゛ぉ", " b o"),
    ("う゛ゅ", " by u"),
    ("ぅ゛", " b u"),
    ("あぁ", " a a"),
    ("いぃ", " i i"),
    ("いぇ", " i e"),
    ("いゃ", " y a"),
    ("うぅ", " u:"),
    ("えぇ", " e e"),
    ("おぉ", " o:"),
    ("かぁ", " k a:"),
    ("きぃ", " k i:"),
    ("くぅ", " k u:"),
    ("くゃ", " ky a"),
    ("くゅ", " ky u"),
    ("くょ", " ky o"),
    ("けぇ", " k e:"),
    ("こぉ", " k o:"),
    ("がぁ", " g a:"),
    ("ぎぃ", " g i:"),
    ("ぐぅ", " g u:"),
    ("ぐゃ", " gy a"),
    ("ぐゅ", " gy u"),
    ("ぐょ", " gy o"),
    ("げぇ", " g e:"),
    ("ごぉ", " g o:"),
    ("さぁ", " s a:"),
    ("しぃ", " sh i:"),
    ("すぅ", " s u:"),
    ("すゃ", " sh a"),
    ("すゅ", " sh u"),
    ("すょ", " sh o"),
    ("せぇ", " s e:"),
    ("そぉ", " s o:"),
    ("ざぁ", " z a:"),
    ("じぃ", " j i:"),
    ("ずぅ", " z u:"),
    ("ずゃ", " zy a"),
    ("ずゅ", " zy u"),
    ("ずょ", " zy o"),
    ("ぜぇ", " z e:"),
    ("ぞぉ", " z o:"),
    ("たぁ", " t a:"),
    ("ちぃ", " ch i:"),
    ("つぁ", " ts a"),
    ("つぃ", " ts i"),
    ("つぅ", " ts u:"),
    ("つゃ", " ch a"),
    ("つゅ", " ch u"),
    ("つょ", " ch o"),
    ("つぇ", " ts e"),
    ("つぉ", " ts o"),
    ("てぇ", " t e:"),
    ("とぉ", " t o:"),
    ("だぁ", " d a:"),
    ("ぢぃ", " j i:"),
    ("づぅ", " d u:"),
    ("づゃ", " zy a"),
    ("づゅ", " zy u"),
    ("づょ", " zy o"),
    ("でぇ", " d e:"),
    ("どぉ", " d o:"),
    ("なぁ", " n a:"),
    ("にぃ", " n i:"),
    ("ぬぅ", " n u:"),
    ("ぬゃ", " ny a"),
    ("ぬゅ", " ny u"),
    ("ぬょ", " ny o"),
    ("ねぇ", " n e:"),
    ("のぉ", " n o:"),
    ("はぁ", " h a:"),
    ("ひぃ", " h i:"),
    ("ふぅ", " f u:"),
    ("ふゃ", " hy a"),
    ("ふゅ", " hy u"),
    ("ふょ", " hy o"),
    ("へぇ", " h e:"),
    ("ほぉ", " h o:"),
    ("ばぁ", " b a:"),
    ("びぃ", " b i:"),
    ("ぶぅ", " b u:"),
    ("ぶゅ", " by u"),
    ("べぇ", " b e:"),
    ("ぼぉ", " b o:"),
    ("ぱぁ", " p a:"),
    ("ぴぃ", " p i:"),
    ("ぷぅ", " p u:"),
    ("ぷゃ", " py a"),
    ("ぷゅ", " py u"),
    ("ぷょ", " py o"),
    ("ぺぇ", " p e:"),
    ("ぽぉ", " p o:"),
    ("まぁ", " m a:"),
    ("みぃ", " m i:"),
    ("むぅ", " m u:"),
    ("むゃ", " my a"),
    ("むゅ", " my u"),
    ("むょ", " my o"),
    ("めぇ", " m e:"),
    ("もぉ", " m o:"),
    ("やぁ", " y a:"),
    ("ゆぅ", " y u:"),
    ("ゆゃ", " y a:"),
    ("ゆゅ", " y u:"),
    ("ゆょ", " y o:"),
    ("よぉ", " y o:"),
    ("らぁ", " r a:"),
    ("りぃ", " r i:"),
    ("るぅ", " r u:"),
    ("るゃ", " ry a"),
    ("るゅ", " ry u"),
    ("るょ", " ry o"),
    ("れぇ", " r e:"),
    ("ろぉ", " r o:"),
    ("わぁ", " w a:"),
    ("をぉ", " o:"),
    ("う゛", " b u"),
    ("でぃ", " d i"),
    ("でゃ", " dy a"),
    ("でゅ", " dy u"),
    ("でょ", " dy o"),
    ("てぃ", " t i"),
    ("てゃ", " ty a"),
    ("てゅ", " ty u"),
    ("てょ", " ty o"),
    ("すぃ", " s i"),
    ("ずぁ", " z u a"),
    ("ずぃ", " z i"),
    ("ずぇ", " z e"),
    ("ずぉ", " z o"),
    ("きゃ", " ky a"),
    ("きゅ", " ky u"),
    ("きょ", " ky o"),
    ("しゃ", " sh a"),
    ("しゅ", " sh u"),
    ("しぇ", " sh e"),
    ("しょ", " sh o"),
    ("ちゃ", " ch a"),
    ("ちゅ", " ch u"),
    ("ちぇ", " ch e"),
    ("ちょ", " ch o"),
    ("とぅ", " t u"),
    ("とゃ", " ty a"),
    ("とゅ", " ty u"),
    ("とょ", " ty o"),
    ("どぁ", " d o a"),
    ("どぅ", " d u"),
    ("どゃ", " dy a"),
    ("どゅ", " dy u"),
    ("どょ", " dy o"),
    ("にゃ", " ny a"),
    ("にゅ", " ny u"),
    ("にょ", " ny o"),
    ("ひゃ", " hy a"),
    ("ひゅ", " hy u"),
    ("ひょ", " hy o"),
    ("みゃ", " my a"),
    ("みゅ", " my u"),
    ("みょ", " my o"),
    ("りゃ", " ry a"),
    ("りゅ", " ry u"),
    ("りょ", " ry o"),
    ("ぎゃ", " gy a"),
    ("ぎゅ", " gy u"),
    ("ぎょ", " gy o"),
    ("ぢぇ", " j e"),
    ("ぢゃ", " j a"),
    ("ぢゅ", " j u"),
    ("ぢょ", " j o"),
    ("じぇ", " j e"),
    ("じゃ", " j a"),
    ("じゅ", " j u"),
    ("じょ", " j o"),
    ("びゃ", " by a"),
    ("びゅ", " by u"),
    ("びょ", " by o"),
    ("ぴゃ", " py a"),
    ("ぴゅ", " py u"),
    ("ぴょ", " py o"),
    ("うぁ", " u a"),
    ("うぃ", " w i"),
    ("うぇ", " w e"),
    ("うぉ", " w o"),
    ("ふぁ", " f a"),
    ("ふぃ", " f i"),
    ("ふぇ", " f e"),
    ("ふぉ", " f o"),
    ("あ", " a"),
    ("い", " i"),
    ("う", " u"),
    ("え", " e"),
    ("お", " o"),
    ("か", " k a"),
    ("き", " k i"),
    ("く", " k u"),
    ("け", " k e"),
    ("こ", " k o"),
    ("さ", " s a"),
    ("し", " sh i"),
    ("す", " s u"),
    ("せ", " s e"),
    ("そ", " s o"),
    ("た", " t a"),
    ("ち", " ch i"),
    ("つ", " ts u"),
    ("て", " t e"),
    ("と", " t o"),
    ("な", " n a"),
    ("に", " n i"),
    ("ぬ", " n u"),
    ("ね", " n e"),
    ("の", " n o"),
    ("は", " h a"),
    ("ひ", " h i"),
    ("ふ", " f u"),
    ("へ", " h e"),
    ("ほ", " h o"),
    ("ま", " m a"),
    ("み", " m i"),
    ("む", " m u"),
    ("め", " m e"),
    ("も", " m o"),
    ("ら", " r a"),
    ("り", " r i"),
    ("る", " r u"),
    ("れ", " r e"),
    ("ろ", " r o"),
    ("が", " g a"),
    ("ぎ", " g i"),
    ("ぐ", " g u"),
    ("げ", " g e"),
    ("ご", " g o"),
    ("ざ", " z a"),
    ("じ", " j i"),
    ("ず", " z u"),
    ("ぜ", " z e"),
    ("ぞ", " z o"),
    ("だ", " d a"),
    ("ぢ", " j i"),
    ("づ", " z u"),
    ("で", " d e"),
    ("ど", " d o"),
    ("ば", " b a"),
    ("び", " b i"),
    ("ぶ", " b u"),
    ("べ", " b e"),
    ("ぼ", " b o"),
    ("ぱ", " p a"),
    ("ぴ", " p i"),
    ("ぷ", " p u"),
    ("ぺ", " p e"),
    ("ぽ", " p o"),
    ("や", " y a"),
    ("ゆ", " y u"),
    ("よ", " y o"),
    ("わ", " w a"),
    ("ゐ", " i"),
    ("ゑ", " e"),
    ("ん", " N"),
    ("っ", " q"),
    ("ー", ":"),
    ("ぁ", " a"),
    ("ぃ", " i"),
    ("ぅ", " u"),
    ("ぇ", " e"),
    ("ぉ", " o"),
    ("ゎ", " w a"),
    ("を", " o"),
];

/// Convert one line of hiragana into space-separated phone labels.
///
/// `ー` lengthens the preceding vowel (`かー` → `k a:`); repeated marks
/// collapse into one.
pub fn to_phonetic(line: &str) -> String {
    let mut converted = line.trim().to_string();
    for (from, to) in KANA_RULES.iter() {
        if converted.contains(from) {
            converted = converted.replace(from, to);
        }
    }
    collapse_length_marks(&converted).trim().to_string()
}

/// Collapse runs of two or more `:` (with optional whitespace between them)
/// into a single `:`. Leading whitespace of a run is swallowed too.
fn collapse_length_marks(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        let first = skip_whitespace(&chars, i);
        if chars.get(first) == Some(&':') {
            let mut end = first + 1;
            let mut marks = 1;
            loop {
                let next = skip_whitespace(&chars, end);
                if chars.get(next) != Some(&':') {
                    break;
                }
                end = next + 1;
                marks += 1;
            }
            if marks >= 2 {
                out.push(':');
                i = end;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn skip_whitespace(chars: &[char], mut index: usize) -> usize {
    while chars.get(index).is_some_and(|c| c.is_whitespace()) {
        index += 1;
    }
    index
}

/// Turn a whole transcript into the word list fed to the aligner.
///
/// Every non-empty line becomes one word; the list is wrapped with the
/// silence units the acoustic model expects at both ends.
pub fn transcript_to_words(text: &str) -> Vec<String> {
    let mut words = vec!["silB".to_string()];
    words.extend(
        text.lines()
            .map(to_phonetic)
            .filter(|phones| !phones.is_empty()),
    );
    words.push("silE".to_string());
    words
}

/// Render recognized phone labels back as a hiragana line.
///
/// A consonant followed by a vowel becomes one kana, a lengthened vowel gets
/// a trailing `ー`, and short pauses stay as a spaced `sp` token. Labels the
/// table does not know are kept verbatim.
pub fn phones_to_kana(phones: &[&str]) -> String {
    let table = PhoneticTable::japanese();
    let mut tokens: Vec<&str> = Vec::with_capacity(phones.len());
    let mut i = 0;
    while i < phones.len() {
        let (base, long) = split_length(phones[i]);
        if let Some(index) = table.lookup_vowel(base) {
            tokens.extend(table.vowel_lyric(index));
            if long {
                tokens.push(LONG_VOWEL_MARK);
            }
            i += 1;
            continue;
        }

        let next = phones.get(i + 1).map(|p| split_length(p));
        let syllable = next.and_then(|(vowel, long)| {
            let index = table.lookup_vowel(vowel)?;
            let kana = table.lookup_consonant(phones[i])?.kana.get(index)?;
            Some((*kana, long))
        });
        if let Some((kana, long)) = syllable {
            tokens.push(kana);
            if long {
                tokens.push(LONG_VOWEL_MARK);
            }
            i += 2;
            continue;
        }

        let token = match phones[i] {
            GLOTTAL_STOP => GLOTTAL_STOP_LYRIC,
            PAUSE => PAUSE,
            other => table.special(other).unwrap_or(other),
        };
        if !token.is_empty() {
            tokens.push(token);
        }
        i += 1;
    }
    join_kana(&tokens)
}

const LONG_VOWEL_MARK: &str = "ー";
const PAUSE: &str = "sp";

/// Concatenate kana, keeping ASCII words such as `sp` apart from their
/// neighbors.
fn join_kana(tokens: &[&str]) -> String {
    let mut joined = String::new();
    for token in tokens {
        if token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            joined.push(' ');
            joined.push_str(token);
            joined.push(' ');
        } else {
            joined.push_str(token);
        }
    }
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
