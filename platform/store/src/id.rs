use rand::{Rng, distributions::Alphanumeric};

/// Generate a record id: random alphanumeric, length uniformly drawn
/// from 4..=7. Candidates already present in the document (as reported
/// by `taken`) are rejected and redrawn, so an id is never reused while
/// its record exists.
pub(crate) fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let len = rng.gen_range(4..=7);
        let candidate: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        if !taken(&candidate) {
            return candidate;
        }
    }
}
