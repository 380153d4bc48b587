//! Voicebanks known to the document writer.

use crate::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Singer {
    pub name: &'static str,
    pub comp_id: &'static str,
    /// Bank select: 0 for Japanese voicebanks, 1 for English ones.
    pub bank_select: u8,
}

const fn singer(name: &'static str, comp_id: &'static str, bank_select: u8) -> Singer {
    Singer {
        name,
        comp_id,
        bank_select,
    }
}

static SINGERS: [Singer; 28] = [
    singer("CUL", "BCBG86S4FSYMTCBK", 0),
    singer("DEX", "BEPP62G3DDXLRECA", 1),
    singer("IA", "BLRGDDR4M3WM2LC6", 0),
    singer("Iroha(V2)", "BMKN7HT9EWTTSMCL", 0),
    singer("KAITO_V3_English", "BNGW7FG7E5TRSNC3", 1),
    singer("KAITO_V3_Soft", "BKGKCC96L2TPZKAC", 0),
    singer("KAITO_V3_Straight", "BDPEA722HT3KXDC4", 0),
    singer("KAITO_V3_Whisper", "BDHEB7W2KTWKYDC5", 0),
    singer("LEN_V4X_Cold", "BMGD88HZFLTHTMC7", 0),
    singer("LEN_V4X_Power_EVEC", "BKPLC6S7LH3RZKC8", 0),
    singer("LEN_V4X_Serious", "BKFFF663PHSL4KB6", 0),
    singer("LEN_V4_English", "BMFX98L8GLSSWMD3", 1),
    singer("Len_ACT2(V2)", "BMLBDHXXMWYF2MBE", 0),
    singer("Luka_ENG(V2)", "BHLNEE62NRYK3HD2", 1),
    singer("Luka_JPN(V2)", "BCMDC9MZLKZHZCB4", 0),
    singer("Miku(V2)", "BHHN4EF9BRWTNHAB", 0),
    singer("RIN_V4X_Power_EVEC", "BKKP765AEHXWSKDB", 0),
    singer("RIN_V4X_Sweet", "BLECA76YHKRGXLB7", 0),
    singer("RIN_V4X_Warm", "BDHEBZG2KCWKYDC5", 0),
    singer("RIN_V4_English", "BXENFF42PWRK4XE7", 1),
    singer("Rin_ACT2(V2)", "BEKF6B63DMXLRECA", 0),
    singer("VY1V3", "BDRE87E2FTTKTDBA", 0),
    singer("VY2V3", "BCXDC6CZLSZHZCB4", 0),
    singer("VY2V3_falsetto", "BDSEB7L2KTWKYDC5", 0),
    singer("Yukari", "BMGK9EC6G4RPWMB3", 0),
    singer("Yukari_Jun", "BDKCEZEYNCTG3DBF", 0),
    singer("Yukari_Lin", "BKLM76B8EHWSSKBB", 0),
    singer("Yukari_Onn", "BNRCB9XYKM2GYNCE", 0),
];

/// Usable (Japanese) singer by name.
// TODO: accept English voicebanks once lyrics can be written in English phonemes.
pub fn find_singer(name: &str) -> Option<&'static Singer> {
    SINGERS
        .iter()
        .find(|s| s.name == name && s.bank_select == 0)
}

/// Names accepted by [`find_singer`], sorted.
pub fn singer_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = SINGERS
        .iter()
        .filter(|s| s.bank_select == 0)
        .map(|s| s.name)
        .collect();
    names.sort_unstable();
    names
}

pub fn default_singer() -> &'static Singer {
    // The default name is one of the table rows.
    &SINGERS[SINGERS.len() - 1]
}

/// The named singer, or the default one with a warning.
pub fn resolve_singer(name: &str) -> &'static Singer {
    match find_singer(name) {
        Some(singer) => singer,
        None => {
            tracing::warn!(
                singer = name,
                fallback = defaults::DEFAULT_SINGER,
                "singer is not defined, using default"
            );
            default_singer()
        }
    }
}
