// Discord commands for viewing standings.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation. The sheet is
// fetched and parsed by the core; here we only decide how a table looks
// inside an embed.

use crate::core::settings::SettingsService;
use crate::core::standings::{SheetTab, StandingsError, StandingsService};
use crate::core::table::SheetTable;
use crate::infra::settings::JsonGuildSettingsStore;
use crate::infra::sheets::GoogleSheetsClient;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// How many data rows fit comfortably in one embed description.
const MAX_EMBED_ROWS: usize = 15;

/// Cells wider than this get truncated so the monospace table stays narrow
/// enough for Discord's embed width.
const MAX_CELL_WIDTH: usize = 16;

/// Show the current standings from the live sheet.
#[poise::command(slash_command, aliases("table"))]
pub async fn standings(
    ctx: Context<'_>,
    #[description = "Sheet tab to show (defaults to the configured tab)"] tab: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    // A guild can pin its own default tab via /standingschannel set.
    let requested = match (&tab, ctx.guild_id()) {
        (Some(tab), _) => Some(tab.clone()),
        (None, Some(guild_id)) => ctx
            .data()
            .settings
            .get(guild_id.get())
            .await?
            .and_then(|settings| settings.default_tab),
        (None, None) => None,
    };

    match ctx.data().standings.get_table(requested.as_deref()).await {
        Ok((tab, table)) if table.is_empty() => {
            ctx.say(format!("No data found for **{}**.", tab.name))
                .await?;
        }
        Ok((tab, table)) => {
            ctx.send(poise::CreateReply::default().embed(standings_embed(&tab, &table)))
                .await?;
        }
        Err(StandingsError::UnknownTab(name)) => {
            let known: Vec<&str> = ctx
                .data()
                .standings
                .tabs()
                .iter()
                .map(|t| t.name.as_str())
                .collect();
            ctx.say(format!(
                "Unknown tab **{}**. Available tabs: {}",
                name,
                known.join(", ")
            ))
            .await?;
        }
        Err(err) => {
            tracing::error!("Failed to fetch standings: {err}");
            ctx.say("⚠️ Could not fetch the standings sheet right now. Try again in a bit.")
                .await?;
        }
    }

    Ok(())
}

/// List the worksheet tabs this bot knows about.
#[poise::command(slash_command)]
pub async fn tabs(ctx: Context<'_>) -> Result<(), Error> {
    let tabs = ctx.data().standings.tabs();
    if tabs.is_empty() {
        ctx.say("No sheet tabs are configured.").await?;
        return Ok(());
    }

    let listing = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if i == 0 {
                format!("• **{}** (default)", tab.name)
            } else {
                format!("• {}", tab.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    ctx.say(listing).await?;
    Ok(())
}

/// Build the standings embed shared by `/standings` and `/poststandings`.
pub(crate) fn standings_embed(tab: &SheetTab, table: &SheetTable) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📊 {}", tab.name))
        .description(format!("```\n{}```", format_table(table, MAX_EMBED_ROWS)))
        .color(0x5865F2) // Blurple
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Live from Google Sheets • Updated {}",
            Utc::now().format("%H:%M UTC")
        )))
        .timestamp(serenity::Timestamp::now())
}

/// Render a table as aligned monospace text. Cells are capped at
/// [`MAX_CELL_WIDTH`] characters and embedded newlines become spaces so one
/// row stays one line.
fn format_table(table: &SheetTable, max_rows: usize) -> String {
    let shown: Vec<Vec<String>> = table
        .rows()
        .iter()
        .take(max_rows)
        .map(|row| row.values().map(clip_cell).collect())
        .collect();
    let headers: Vec<String> = table.headers().iter().map(|h| clip_cell(h)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &shown {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &shown {
        push_line(&mut out, row, &widths);
    }

    let hidden = table.len().saturating_sub(max_rows);
    if hidden > 0 {
        out.push_str(&format!("… and {hidden} more rows\n"));
    }

    out
}

fn clip_cell(cell: &str) -> String {
    let flat = cell.replace('\n', " ");
    let mut chars = flat.chars();
    let clipped: String = chars.by_ref().take(MAX_CELL_WIDTH).collect();
    if chars.next().is_some() {
        let mut clipped: String = clipped.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    } else {
        clipped
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut first = true;
    for (cell, width) in cells.iter().zip(widths) {
        if !first {
            out.push_str("  ");
        }
        first = false;
        out.push_str(cell);
        for _ in cell.chars().count()..*width {
            out.push(' ');
        }
    }
    // Alignment padding on the last column just wastes embed width.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

// ============================================================================
// SHARED COMMAND TYPES
// ============================================================================
// The data structure shared across all commands, plus the usual poise
// aliases. Other command files import these through `crate::discord`.

pub struct Data {
    pub standings: Arc<StandingsService<GoogleSheetsClient>>,
    pub settings: Arc<SettingsService<JsonGuildSettingsStore>>,
    /// Where the Activity webview lives, for the /activity link.
    pub activity_url: String,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_an_aligned_table() {
        let table = SheetTable::parse("Team,W,L\nAlpha,3,1\nBravo Bears,12,2");
        let text = format_table(&table, 10);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Team         W   L");
        assert_eq!(lines[1], "-----------  --  -");
        assert_eq!(lines[2], "Alpha        3   1");
        assert_eq!(lines[3], "Bravo Bears  12  2");
    }

    #[test]
    fn wide_cells_are_clipped_with_ellipsis() {
        let table = SheetTable::parse("name\nAn Extremely Long Team Name");
        let text = format_table(&table, 10);

        assert!(text.contains("An Extremely Lo…"));
    }

    #[test]
    fn hidden_rows_are_summarized() {
        let table = SheetTable::parse("n\n1\n2\n3\n4");
        let text = format_table(&table, 2);

        assert!(text.contains("… and 2 more rows"));
    }

    #[test]
    fn embedded_newlines_stay_on_one_line() {
        let table = SheetTable::parse("a,b\n1,\"two\nlines\"");
        let text = format_table(&table, 10);

        assert!(text.contains("two lines"));
    }
}
