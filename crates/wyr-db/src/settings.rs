use rusqlite::{OptionalExtension, params};

use wyr_types::models::{ChannelId, GuildId};

use crate::models::DailyConfigRow;
use crate::{Database, Result};

impl Database {
    // -- Daily question settings --

    /// Point a guild's daily question at `channel_id` and enable it.
    pub fn set_daily_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<DailyConfigRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO daily_settings (guild_id, channel_id, enabled)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT(guild_id) DO UPDATE SET
                     channel_id = excluded.channel_id,
                     enabled = 1,
                     updated_at = datetime('now')",
                params![guild_id, channel_id],
            )?;
            Ok(DailyConfigRow {
                guild_id,
                channel_id,
                enabled: true,
            })
        })
    }

    pub fn get_daily_config(&self, guild_id: GuildId) -> Result<Option<DailyConfigRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT guild_id, channel_id, enabled FROM daily_settings WHERE guild_id = ?1",
                    [guild_id],
                    |row| {
                        Ok(DailyConfigRow {
                            guild_id: row.get(0)?,
                            channel_id: row.get(1)?,
                            enabled: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns false when the guild never configured a daily channel.
    pub fn disable_daily(&self, guild_id: GuildId) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE daily_settings SET enabled = 0, updated_at = datetime('now') WHERE guild_id = ?1",
                [guild_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn enabled_daily_configs(&self) -> Result<Vec<DailyConfigRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT guild_id, channel_id, enabled FROM daily_settings
                 WHERE enabled = 1 ORDER BY guild_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(DailyConfigRow {
                        guild_id: row.get(0)?,
                        channel_id: row.get(1)?,
                        enabled: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
