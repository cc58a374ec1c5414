use tracing::info;

use wyr_types::models::QuestionPayload;

use crate::queries::insert_question;
use crate::{Database, Result};

const STARTER_QUESTIONS: &[(&str, &str, &str, &str)] = &[
    (
        "Would you rather have the ability to fly or be invisible?",
        "Fly through the sky",
        "Become invisible",
        "Superpowers",
    ),
    (
        "Would you rather live in the past or the future?",
        "Live in the past",
        "Live in the future",
        "Time",
    ),
    (
        "Would you rather be able to talk to animals or speak all languages?",
        "Talk to animals",
        "Speak all languages",
        "Communication",
    ),
    (
        "Would you rather have unlimited money or unlimited time?",
        "Unlimited money",
        "Unlimited time",
        "Life",
    ),
    (
        "Would you rather explore space or the deep ocean?",
        "Explore space",
        "Explore the ocean",
        "Adventure",
    ),
    (
        "Would you rather never have to sleep or never have to eat?",
        "Never sleep",
        "Never eat",
        "Life",
    ),
    (
        "Would you rather be famous or be the best friend of someone famous?",
        "Be famous",
        "Friend of famous person",
        "Fame",
    ),
    (
        "Would you rather live without music or without movies?",
        "No music",
        "No movies",
        "Entertainment",
    ),
    (
        "Would you rather be really good at one thing or average at everything?",
        "Expert at one thing",
        "Average at everything",
        "Skills",
    ),
    (
        "Would you rather know when you'll die or how you'll die?",
        "Know when",
        "Know how",
        "Life",
    ),
];

impl Database {
    /// Insert the starter set when the question table is empty. Returns the
    /// number of questions inserted.
    pub fn seed_starter_questions(&self) -> Result<usize> {
        let inserted = self.transaction(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM questions", [], |r| r.get(0))?;
            if count > 0 {
                return Ok(0);
            }

            for (question, option_a, option_b, category) in STARTER_QUESTIONS {
                insert_question(
                    conn,
                    &QuestionPayload::new(question, option_a, option_b, Some(*category)),
                )?;
            }
            Ok(STARTER_QUESTIONS.len())
        })?;

        if inserted > 0 {
            info!("Added {} starter questions to database", inserted);
        }
        Ok(inserted)
    }
}
