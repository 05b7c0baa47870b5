// Admin commands for wiring standings into a guild: where posts go and
// which tab is that guild's default.

use crate::core::settings::SettingsError;
use crate::discord::commands::standings::standings_embed;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Manage the standings channel for this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("set", "remove", "status")
)]
pub async fn standingschannel(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the channel standings get posted to
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Channel for standings posts"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
    #[description = "Default sheet tab for this server"] default_tab: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    // Reject tabs we don't know about instead of silently storing a typo.
    if let Some(tab) = &default_tab {
        if ctx.data().standings.find_tab(tab).is_none() {
            ctx.say(format!(
                "Unknown tab **{tab}**. Use `/tabs` to see what's available."
            ))
            .await?;
            return Ok(());
        }
    }

    ctx.data()
        .settings
        .set_channel(guild_id, channel.id.get(), default_tab.clone())
        .await?;

    let tab_note = default_tab
        .map(|tab| format!(" with default tab **{tab}**"))
        .unwrap_or_default();
    ctx.say(format!(
        "✅ Standings will be posted in <#{}>{tab_note}.",
        channel.id.get()
    ))
    .await?;

    Ok(())
}

/// Remove the standings channel configuration
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn remove(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    match ctx.data().settings.clear(guild_id).await {
        Ok(()) => {
            ctx.say("✅ Standings channel configuration removed.").await?;
        }
        Err(SettingsError::NotConfigured) => {
            ctx.say("There is no standings channel configured for this server.")
                .await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Show the current standings configuration
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    match ctx.data().settings.get(guild_id).await? {
        Some(settings) => {
            let tab = settings
                .default_tab
                .as_deref()
                .unwrap_or("(first configured tab)");
            ctx.say(format!(
                "Standings channel: <#{}>\nDefault tab: {}",
                settings.standings_channel_id, tab
            ))
            .await?;
        }
        None => {
            ctx.say("No standings channel configured. Use `/standingschannel set`.")
                .await?;
        }
    }

    Ok(())
}

/// Post the current standings to the configured channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn poststandings(
    ctx: Context<'_>,
    #[description = "Sheet tab to post (defaults to this server's tab)"] tab: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    ctx.defer_ephemeral().await?;

    let settings = match ctx.data().settings.require(guild_id).await {
        Ok(settings) => settings,
        Err(SettingsError::NotConfigured) => {
            ctx.say("⚠️ No standings channel configured. Use `/standingschannel set` first.")
                .await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let requested = tab.or(settings.default_tab);
    let (tab, table) = match ctx.data().standings.get_table(requested.as_deref()).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("Failed to fetch standings for posting: {err}");
            ctx.say(format!("⚠️ Could not fetch the sheet: {err}")).await?;
            return Ok(());
        }
    };

    if table.is_empty() {
        ctx.say(format!("No data found for **{}**, nothing posted.", tab.name))
            .await?;
        return Ok(());
    }

    let channel = serenity::ChannelId::new(settings.standings_channel_id);
    channel
        .send_message(
            &ctx.serenity_context().http,
            serenity::CreateMessage::new().embed(standings_embed(&tab, &table)),
        )
        .await?;

    ctx.say(format!(
        "✅ Posted **{}** in <#{}>.",
        tab.name, settings.standings_channel_id
    ))
    .await?;

    Ok(())
}
