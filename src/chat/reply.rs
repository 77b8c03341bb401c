use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Fixed replies. The last entry echoes the user's message.
const CANNED: [&str; 4] = [
    "Interessante! Conte mais.",
    "Não tenho certeza, mas parece legal!",
    "Hmm, e se tentássemos outra abordagem?",
    "Entendi parcialmente. Você pode explicar melhor?",
];

pub const TEMPLATE_COUNT: usize = CANNED.len() + 1;
pub const ECHO_INDEX: usize = CANNED.len();

/// Render template `index` for `content`.
pub fn reply_for(index: usize, content: &str) -> String {
    match CANNED.get(index) {
        Some(text) => (*text).to_string(),
        None => format!("Recebi sua mensagem: \"{content}\". O que faremos a seguir?"),
    }
}

/// Whether `reply` is one of the templates rendered for `content`.
pub fn is_canned_reply(content: &str, reply: &str) -> bool {
    (0..TEMPLATE_COUNT).any(|i| reply_for(i, content) == reply)
}

/// Picks a canned reply uniformly at random from a seedable generator.
pub struct ReplySelector {
    rng: Mutex<StdRng>,
}

impl ReplySelector {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn pick_index(&self) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..TEMPLATE_COUNT)
    }

    pub fn select(&self, content: &str) -> String {
        reply_for(self.pick_index(), content)
    }
}
