use rand::{distributions::Alphanumeric, thread_rng, Rng};

const SHORT_ID_LEN: usize = 9;

/// Short lowercase id used for quizzes, questions, options and responses.
pub fn short_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
