use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tdt_client::{
    Session,
    avatar::{is_face, random_face},
    client::hud::build_view_lines,
    config::Config,
    create::create_game,
    identity::{FileIdentityStore, IdentityStore},
    protocol::GameId,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "tdt-client", about = "Terminal client for the drawing telephone game")]
struct Args {
    /// Server `host[:port]`; overrides TDT_HOST.
    #[arg(long)]
    host: Option<String>,
    /// Connect with wss/https.
    #[arg(long)]
    secure: bool,
    /// Where the player identity is kept; overrides TDT_IDENTITY_FILE.
    #[arg(long)]
    identity_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Enter an existing game.
    Join { game_id: String },
    /// Create a new game and enter it as its creator.
    Create {
        #[arg(long)]
        name: String,
        /// Single letter A-Z; random when omitted.
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Join { name: String, avatar: Option<String> },
    Start,
    Draw(PathBuf),
    Reconnect,
    Quit,
    Text(String),
    Empty,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match cmd {
        "" => Input::Empty,
        "/join" => {
            let mut parts = rest.rsplitn(2, ' ');
            let last = parts.next().unwrap_or_default();
            match parts.next() {
                Some(name) if is_face(last) => Input::Join {
                    name: name.trim().to_string(),
                    avatar: Some(last.to_string()),
                },
                _ => Input::Join {
                    name: rest.to_string(),
                    avatar: None,
                },
            }
        }
        "/start" => Input::Start,
        "/draw" => Input::Draw(PathBuf::from(rest)),
        "/reconnect" => Input::Reconnect,
        "/quit" => Input::Quit,
        _ => Input::Text(line.to_string()),
    }
}

fn render(session: &Session) {
    println!("----");
    for line in build_view_lines(session.game_id().as_str(), session.phase(), session.link()) {
        println!("{}", line);
    }
}

async fn handle_input(session: &mut Session, input: Input) -> anyhow::Result<()> {
    match input {
        Input::Join { name, avatar } => {
            if name.is_empty() {
                bail!("a name is required");
            }
            let avatar = avatar.unwrap_or_else(random_face);
            session.submit_join(&name, &avatar)
        }
        Input::Start => {
            if !session.phase().can_start_game() {
                bail!("waiting for more players");
            }
            session.start_game()
        }
        Input::Draw(path) => {
            let image = tokio::fs::read(&path).await?;
            session.submit_drawing(image)
        }
        Input::Text(text) => session.submit_guess(&text),
        Input::Reconnect | Input::Quit | Input::Empty => Ok(()),
    }
}

async fn run_game(
    config: &Config,
    game_id: GameId,
    identity: &mut FileIdentityStore,
) -> anyhow::Result<()> {
    let endpoint = config.websocket_url()?;
    let mut session = Session::activate(&endpoint, game_id.clone(), identity)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    render(&session);

    loop {
        tokio::select! {
            update = session.next_update(), if !session.link().is_down() => {
                if update.is_some() {
                    render(&session);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break; };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Reconnect => {
                        if !session.link().is_down() {
                            println!("still connected");
                            continue;
                        }
                        let fresh = Session::activate(&endpoint, game_id.clone(), identity)?;
                        std::mem::replace(&mut session, fresh).deactivate();
                        render(&session);
                    }
                    input => {
                        if let Err(err) = handle_input(&mut session, input).await {
                            println!("! {:#}", err);
                        }
                    }
                }
            }
        }
    }

    session.deactivate();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if args.secure {
        config.secure = true;
    }
    if let Some(path) = args.identity_file {
        config.identity_file = path;
    }

    let mut identity = FileIdentityStore::new(&config.identity_file);

    let game_id = match args.command {
        Command::Join { game_id } => GameId::new(game_id),
        Command::Create { name, avatar } => {
            let avatar = avatar.unwrap_or_else(random_face);
            if !is_face(&avatar) {
                bail!("avatar must be a single letter A-Z, got {:?}", avatar);
            }
            let player_id = identity.get_or_create()?;
            let http = reqwest::Client::new();
            create_game(&http, &config.create_url()?, &player_id, &name, &avatar).await?
        }
    };

    println!("Game code: {}", game_id);
    run_game(&config, game_id, &mut identity).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input("/start"), Input::Start);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(
            parse_input("/draw cat.png"),
            Input::Draw(PathBuf::from("cat.png"))
        );
        assert_eq!(parse_input("a cat on a roof"), Input::Text("a cat on a roof".to_string()));
    }

    #[test]
    fn join_takes_an_optional_trailing_face() {
        assert_eq!(
            parse_input("/join Ann Lee Q"),
            Input::Join {
                name: "Ann Lee".to_string(),
                avatar: Some("Q".to_string()),
            }
        );
        assert_eq!(
            parse_input("/join Ann Lee"),
            Input::Join {
                name: "Ann Lee".to_string(),
                avatar: None,
            }
        );
        assert_eq!(
            parse_input("/join Q"),
            Input::Join {
                name: "Q".to_string(),
                avatar: None,
            }
        );
    }
}
