use rand::distr::Alphanumeric;
use rand::Rng;

/// Generates a cryptographically random alphanumeric token.
///
/// Used for the `state` and `nonce` authorization parameters and for minted
/// session identifiers. The thread-local RNG is cryptographically secure.
#[must_use]
pub fn random_token(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
