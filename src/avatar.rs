use rand::seq::SliceRandom;

const FACES: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Pick a random face code for a player who has not chosen one.
pub fn random_face() -> String {
    let mut rng = rand::thread_rng();
    FACES.choose(&mut rng).copied().unwrap_or('A').to_string()
}

/// The face after `current`, wrapping around. Unknown codes restart at the
/// first face.
pub fn next_face(current: &str) -> String {
    let next = current
        .chars()
        .next()
        .and_then(|c| FACES.iter().position(|f| *f == c))
        .map_or(0, |idx| (idx + 1) % FACES.len());
    FACES[next].to_string()
}

pub fn is_face(code: &str) -> bool {
    let mut chars = code.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if FACES.contains(&c))
}
