use crate::discord::{Context, Error};

/// Get a link to the standings Activity webview.
#[poise::command(slash_command)]
pub async fn activity(ctx: Context<'_>) -> Result<(), Error> {
    let url = &ctx.data().activity_url;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("[Open the standings Activity]({url})"))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
