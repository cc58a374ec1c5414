use tracing::{info, warn};

use wyr_db::StoreError;
use wyr_db::models::{DailyConfigRow, QuestionRow};
use wyr_types::events::PollEvent;
use wyr_types::models::{ChannelId, GuildId};

use crate::engine::Engine;

/// One question bound for one guild's daily channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPost {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub question: QuestionRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestDailyOutcome {
    Posted(DailyPost),
    NotEnabled,
    NoQuestions,
}

impl Engine {
    pub fn set_daily_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<DailyConfigRow, StoreError> {
        let config = self.db.set_daily_channel(guild_id, channel_id)?;
        info!("Daily questions enabled for guild {} in channel {}", guild_id, channel_id);
        Ok(config)
    }

    pub fn daily_config(&self, guild_id: GuildId) -> Result<Option<DailyConfigRow>, StoreError> {
        self.db.get_daily_config(guild_id)
    }

    /// Fails with `NotFound` when the guild never configured a channel.
    pub fn disable_daily(&self, guild_id: GuildId) -> Result<(), StoreError> {
        if !self.db.disable_daily(guild_id)? {
            return Err(StoreError::not_found("daily config", guild_id));
        }
        info!("Daily questions disabled for guild {}", guild_id);
        Ok(())
    }

    /// A random question for every guild with daily posting enabled. Empty
    /// when there are no questions at all.
    pub fn daily_posts(&self) -> Result<Vec<DailyPost>, StoreError> {
        let configs = self.db.enabled_daily_configs()?;
        let mut posts = Vec::with_capacity(configs.len());

        for config in configs {
            let Some(question) = self.db.random_question()? else {
                warn!("No questions available for the daily post");
                return Ok(Vec::new());
            };
            posts.push(DailyPost {
                guild_id: config.guild_id,
                channel_id: config.channel_id,
                question,
            });
        }

        Ok(posts)
    }

    /// Select and publish the daily questions. Returns how many were sent.
    pub fn publish_daily(&self) -> Result<usize, StoreError> {
        let posts = self.daily_posts()?;
        let count = posts.len();
        for post in posts {
            info!(
                "Posting daily question {} to guild {} channel {}",
                post.question.id, post.guild_id, post.channel_id
            );
            self.publish_post(post, false);
        }
        Ok(count)
    }

    /// Post one daily question right away to a guild's configured channel.
    pub fn test_daily_post(&self, guild_id: GuildId) -> Result<TestDailyOutcome, StoreError> {
        let config = match self.db.get_daily_config(guild_id)? {
            Some(config) if config.enabled => config,
            _ => return Ok(TestDailyOutcome::NotEnabled),
        };

        let Some(question) = self.db.random_question()? else {
            return Ok(TestDailyOutcome::NoQuestions);
        };

        let post = DailyPost {
            guild_id,
            channel_id: config.channel_id,
            question,
        };
        self.publish_post(post.clone(), true);
        Ok(TestDailyOutcome::Posted(post))
    }

    fn publish_post(&self, post: DailyPost, test: bool) {
        self.notify(PollEvent::DailyQuestion {
            guild_id: post.guild_id,
            channel_id: post.channel_id,
            question: post.question.into(),
            test,
        });
    }
}
