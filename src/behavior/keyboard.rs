//! Static US-QWERTY keyboard model
//!
//! Adjacency for typo injection and touch-typing finger assignment for
//! delay modifiers. Lookups are keyed by the unshifted key.

use phf::phf_map;

use crate::random::Randomness;

/// Typing hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// Typing finger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
}

/// Keys physically adjacent to each key
static ADJACENT_KEYS: phf::Map<char, &'static str> = phf_map! {
    '1' => "2q",
    '2' => "13qw",
    '3' => "24we",
    '4' => "35er",
    '5' => "46rt",
    '6' => "57ty",
    '7' => "68yu",
    '8' => "79ui",
    '9' => "80io",
    '0' => "9op",
    'q' => "12wa",
    'w' => "qeas23",
    'e' => "wrsd34",
    'r' => "etdf45",
    't' => "ryfg56",
    'y' => "tugh67",
    'u' => "yihj78",
    'i' => "uojk89",
    'o' => "ipkl90",
    'p' => "ol0",
    'a' => "qwsz",
    's' => "awedxz",
    'd' => "serfcx",
    'f' => "drtgvc",
    'g' => "ftyhbv",
    'h' => "gyujnb",
    'j' => "huikmn",
    'k' => "jiolm",
    'l' => "kop",
    'z' => "asx",
    'x' => "zsdc",
    'c' => "xdfv",
    'v' => "cfgb",
    'b' => "vghn",
    'n' => "bhjm",
    'm' => "njk",
};

/// Touch-typing finger for each key
static KEY_FINGERS: phf::Map<char, (Hand, Finger)> = phf_map! {
    '`' => (Hand::Left, Finger::Pinky),
    '1' => (Hand::Left, Finger::Pinky),
    'q' => (Hand::Left, Finger::Pinky),
    'a' => (Hand::Left, Finger::Pinky),
    'z' => (Hand::Left, Finger::Pinky),
    '2' => (Hand::Left, Finger::Ring),
    'w' => (Hand::Left, Finger::Ring),
    's' => (Hand::Left, Finger::Ring),
    'x' => (Hand::Left, Finger::Ring),
    '3' => (Hand::Left, Finger::Middle),
    'e' => (Hand::Left, Finger::Middle),
    'd' => (Hand::Left, Finger::Middle),
    'c' => (Hand::Left, Finger::Middle),
    '4' => (Hand::Left, Finger::Index),
    '5' => (Hand::Left, Finger::Index),
    'r' => (Hand::Left, Finger::Index),
    't' => (Hand::Left, Finger::Index),
    'f' => (Hand::Left, Finger::Index),
    'g' => (Hand::Left, Finger::Index),
    'v' => (Hand::Left, Finger::Index),
    'b' => (Hand::Left, Finger::Index),
    '6' => (Hand::Right, Finger::Index),
    '7' => (Hand::Right, Finger::Index),
    'y' => (Hand::Right, Finger::Index),
    'u' => (Hand::Right, Finger::Index),
    'h' => (Hand::Right, Finger::Index),
    'j' => (Hand::Right, Finger::Index),
    'n' => (Hand::Right, Finger::Index),
    'm' => (Hand::Right, Finger::Index),
    '8' => (Hand::Right, Finger::Middle),
    'i' => (Hand::Right, Finger::Middle),
    'k' => (Hand::Right, Finger::Middle),
    ',' => (Hand::Right, Finger::Middle),
    '9' => (Hand::Right, Finger::Ring),
    'o' => (Hand::Right, Finger::Ring),
    'l' => (Hand::Right, Finger::Ring),
    '.' => (Hand::Right, Finger::Ring),
    '0' => (Hand::Right, Finger::Pinky),
    '-' => (Hand::Right, Finger::Pinky),
    '=' => (Hand::Right, Finger::Pinky),
    'p' => (Hand::Right, Finger::Pinky),
    '[' => (Hand::Right, Finger::Pinky),
    ']' => (Hand::Right, Finger::Pinky),
    '\\' => (Hand::Right, Finger::Pinky),
    ';' => (Hand::Right, Finger::Pinky),
    '\'' => (Hand::Right, Finger::Pinky),
    '/' => (Hand::Right, Finger::Pinky),
};

/// Unshifted key producing each shifted symbol
static SHIFTED_SYMBOLS: phf::Map<char, char> = phf_map! {
    '~' => '`',
    '!' => '1',
    '@' => '2',
    '#' => '3',
    '$' => '4',
    '%' => '5',
    '^' => '6',
    '&' => '7',
    '*' => '8',
    '(' => '9',
    ')' => '0',
    '_' => '-',
    '+' => '=',
    '{' => '[',
    '}' => ']',
    '|' => '\\',
    ':' => ';',
    '"' => '\'',
    '<' => ',',
    '>' => '.',
    '?' => '/',
};

/// Physical key that produces `ch`
pub fn base_key(ch: char) -> char {
    if ch.is_ascii_uppercase() {
        return ch.to_ascii_lowercase();
    }
    SHIFTED_SYMBOLS.get(&ch).copied().unwrap_or(ch)
}

/// Whether typing `ch` needs the shift key
pub fn requires_shift(ch: char) -> bool {
    ch.is_ascii_uppercase() || SHIFTED_SYMBOLS.contains_key(&ch)
}

/// Hand and finger that type `ch`, if it is on the main block
pub fn finger_for(ch: char) -> Option<(Hand, Finger)> {
    KEY_FINGERS.get(&base_key(ch)).copied()
}

/// Random neighbor of `ch`, preserving letter case
pub fn neighbor(ch: char, rng: &mut Randomness) -> Option<char> {
    let neighbors = ADJACENT_KEYS.get(&ch.to_ascii_lowercase())?;
    let bytes = neighbors.as_bytes();
    let picked = bytes[rng.index(bytes.len())] as char;
    if ch.is_ascii_uppercase() {
        Some(picked.to_ascii_uppercase())
    } else {
        Some(picked)
    }
}
