use crate::protocol::{CreateGameRequest, CreateGameResponse, GameId, PlayerId};
use anyhow::Context;
use url::Url;

/// Ask the server for a new game with this player as creator. Runs once,
/// before any websocket exists.
pub async fn create_game(
    http: &reqwest::Client,
    create_url: &Url,
    player_id: &PlayerId,
    name: &str,
    avatar: &str,
) -> anyhow::Result<GameId> {
    let request = CreateGameRequest {
        player_id: player_id.clone(),
        player_name: name.to_string(),
        player_avatar: avatar.to_string(),
    };

    let response = http
        .post(create_url.clone())
        .json(&request)
        .send()
        .await
        .with_context(|| format!("failed reaching {}", create_url))?
        .error_for_status()
        .context("game creation was refused")?;

    let created: CreateGameResponse = response
        .json()
        .await
        .context("bad game creation response")?;
    log::info!("created game {}", created.game_id);
    Ok(created.game_id)
}
