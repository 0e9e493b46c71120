mod common;

use common::{CREATED_GAME_ID, next_event, open_session, spawn_fake_server};
use serde_json::json;
use std::path::PathBuf;
use tdt_client::{
    Session, SessionEvent,
    config::Config,
    create::create_game,
    identity::{IdentityStore, MemoryIdentityStore},
};

#[tokio::test]
async fn create_posts_the_creator() {
    let server = spawn_fake_server().await;
    let mut identity = MemoryIdentityStore::new();
    let player_id = identity.get_or_create().unwrap();

    let http = reqwest::Client::new();
    let game_id = create_game(&http, &server.create_url(), &player_id, "Ann", "A")
        .await
        .unwrap();

    assert_eq!(game_id.as_str(), CREATED_GAME_ID);
    assert_eq!(
        server.created_requests(),
        vec![json!({
            "playerId": player_id.as_str(),
            "playerName": "Ann",
            "playerAvatar": "A"
        })]
    );
}

#[tokio::test]
async fn created_game_is_entered_through_configured_endpoint() {
    let mut server = spawn_fake_server().await;
    let config = Config {
        host: server.host(),
        secure: false,
        identity_file: PathBuf::from("unused.json"),
    };
    let mut identity = MemoryIdentityStore::new();
    let player_id = identity.get_or_create().unwrap();

    let http = reqwest::Client::new();
    let game_id = create_game(&http, &config.create_url().unwrap(), &player_id, "Ann", "A")
        .await
        .unwrap();

    let mut session =
        Session::activate(&config.websocket_url().unwrap(), game_id, &mut identity).unwrap();
    let mut conn = server.accept().await;
    let access = open_session(&mut session, &mut conn).await;
    assert_eq!(
        access,
        json!({
            "action": "access",
            "content": {"gameId": CREATED_GAME_ID, "playerId": player_id.as_str()}
        })
    );

    conn.push(r#"{"state":"waitForPlayers","players":[{"name":"Ann","avatar":"A","isCreator":true}]}"#);
    assert_eq!(next_event(&mut session).await, Some(SessionEvent::PhaseChanged));
    assert_eq!(session.phase().creator().map(|p| p.name.as_str()), Some("Ann"));

    session.deactivate();
}

#[tokio::test]
async fn unreachable_creation_endpoint_is_an_error() {
    let url = url::Url::parse("http://127.0.0.1:1/api/create").unwrap();
    let mut identity = MemoryIdentityStore::new();
    let player_id = identity.get_or_create().unwrap();

    let http = reqwest::Client::new();
    assert!(create_game(&http, &url, &player_id, "Ann", "A").await.is_err());
}
