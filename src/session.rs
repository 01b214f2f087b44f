// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::EpisodeClient;
use crate::error::{CommandError, ViewError};
use crate::http::HttpClient;
use crate::playback::{ChannelListener, PlaybackEvent, PlaybackStore, TracingListener};
use crate::player::{MediaElement, MediaEvent, Player, SimulatedMedia};
use crate::time::{format_duration, parse_position};
use crate::views::{EpisodePage, HomePage, render_player};

pub const HELP: &str = "\
Commands:
  home              show the episode listing
  open <id>         show an episode's details
  latest <n>        play the n-th latest release
  play <n>          play the n-th episode of the listing
  episode           play the episode currently opened
  toggle            play / pause
  next, n           next episode
  prev, p           previous episode
  loop              toggle looping
  shuffle           toggle shuffling
  seek <position>   jump to a position (seconds, mm:ss or hh:mm:ss)
  status            show the player
  help              show this help
  quit              leave";

/// A line of user input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Home,
    Open(String),
    /// 1-based position in the latest releases
    Latest(usize),
    /// 1-based position in the full listing
    Play(usize),
    PlayEpisode,
    Toggle,
    Next,
    Previous,
    Loop,
    Shuffle,
    /// Target position in seconds
    Seek(u64),
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or("").to_ascii_lowercase();
        let argument = words.next();

        let command = match name.as_str() {
            "home" | "ls" => SessionCommand::Home,
            "open" => SessionCommand::Open(
                argument
                    .ok_or(CommandError::MissingArgument {
                        command: "open",
                        expected: "an episode id",
                    })?
                    .to_string(),
            ),
            "latest" => SessionCommand::Latest(parse_position_arg("latest", argument)?),
            "play" => SessionCommand::Play(parse_position_arg("play", argument)?),
            "episode" => SessionCommand::PlayEpisode,
            "toggle" | "t" | "pause" => SessionCommand::Toggle,
            "next" | "n" => SessionCommand::Next,
            "prev" | "previous" | "p" => SessionCommand::Previous,
            "loop" => SessionCommand::Loop,
            "shuffle" => SessionCommand::Shuffle,
            "seek" => {
                let raw = argument.ok_or(CommandError::MissingArgument {
                    command: "seek",
                    expected: "a position",
                })?;
                let seconds = parse_position(raw).ok_or_else(|| CommandError::InvalidArgument {
                    command: "seek",
                    value: raw.to_string(),
                })?;
                SessionCommand::Seek(seconds)
            }
            "status" | "" => SessionCommand::Status,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

/// Parse a 1-based list position
fn parse_position_arg(command: &'static str, argument: Option<&str>) -> Result<usize, CommandError> {
    let raw = argument.ok_or(CommandError::MissingArgument {
        command,
        expected: "a list number",
    })?;

    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::InvalidArgument {
            command,
            value: raw.to_string(),
        })
}

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this text and keep going
    Continue(String),
    Quit,
}

/// One listening session: the playback store, the player bound to it, and
/// the pages the user has visited.
///
/// The store notifies the session through a channel; every pending change
/// re-applies the store to the player before control returns to the caller.
pub struct Session<C, M> {
    client: EpisodeClient<C>,
    store: PlaybackStore,
    player: Player<M>,
    changes: UnboundedReceiver<PlaybackEvent>,
    home: Option<HomePage>,
    detail: Option<EpisodePage>,
}

impl<C: HttpClient, M: MediaElement> Session<C, M> {
    pub fn new(client: EpisodeClient<C>, mut store: PlaybackStore, player: Player<M>) -> Self {
        let (listener, changes) = ChannelListener::channel();
        store.subscribe(Arc::new(listener));
        store.subscribe(Arc::new(TracingListener));

        let mut session = Self {
            client,
            store,
            player,
            changes,
            home: None,
            detail: None,
        };
        session.player.sync(&mut session.store);
        session
    }

    pub fn store(&self) -> &PlaybackStore {
        &self.store
    }

    pub fn player(&self) -> &Player<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<M> {
        &mut self.player
    }

    /// Run one command, turning every failure into a printable message
    pub async fn execute(&mut self, command: SessionCommand) -> Outcome {
        let text = match command {
            SessionCommand::Home => {
                let page = HomePage::load(&self.client).await;
                let text = page.render();
                self.home = Some(page);
                text
            }
            SessionCommand::Open(id) => {
                let page = EpisodePage::load(&self.client, &id).await;
                let text = page.render();
                self.detail = Some(page);
                text
            }
            SessionCommand::Latest(n) => match list_index("latest", n) {
                Ok(index) => {
                    self.ensure_home().await;
                    let result = self
                        .home
                        .as_ref()
                        .map(|home| home.play_latest(index, &mut self.store));
                    self.selection_text(result)
                }
                Err(e) => error_text(&e),
            },
            SessionCommand::Play(n) => match list_index("play", n) {
                Ok(index) => {
                    self.ensure_home().await;
                    let result = self
                        .home
                        .as_ref()
                        .map(|home| home.play_from_all(index, &mut self.store));
                    self.selection_text(result)
                }
                Err(e) => error_text(&e),
            },
            SessionCommand::PlayEpisode => {
                let result = self.detail.as_ref().map(|page| page.play(&mut self.store));
                match result {
                    Some(result) => self.selection_text(Some(result)),
                    None => error_text(&"Open an episode first"),
                }
            }
            SessionCommand::Toggle => {
                self.store.toggle_play();
                self.now_playing()
            }
            SessionCommand::Next => {
                if self.store.play_next() {
                    self.now_playing()
                } else {
                    error_text(&"Nothing to play next")
                }
            }
            SessionCommand::Previous => {
                if self.store.play_previous() {
                    self.now_playing()
                } else {
                    error_text(&"Nothing to play before this")
                }
            }
            SessionCommand::Loop => {
                self.store.toggle_loop();
                self.now_playing()
            }
            SessionCommand::Shuffle => {
                self.store.toggle_shuffle();
                self.now_playing()
            }
            SessionCommand::Seek(seconds) => match self.player.seek(seconds as f64) {
                Ok(position) => format!("Moved to {}\n", format_duration(position)),
                Err(e) => error_text(&e),
            },
            SessionCommand::Status => self.now_playing(),
            SessionCommand::Help => format!("{HELP}\n"),
            SessionCommand::Quit => return Outcome::Quit,
        };

        Outcome::Continue(text)
    }

    /// Feed events from the media element through the player
    ///
    /// Returns whether the store changed as a result.
    pub fn handle_media_events(&mut self, events: Vec<MediaEvent>) -> bool {
        let mut changed = false;
        for event in events {
            self.player.handle_event(event, &mut self.store);
            changed |= self.pump();
        }
        changed
    }

    /// Render the player widget, syncing any pending changes first
    pub fn now_playing(&mut self) -> String {
        self.pump();
        render_player(&self.player, self.store.state())
    }

    /// Drain pending store changes and re-apply the store to the player
    fn pump(&mut self) -> bool {
        let mut changed = false;
        while self.drain_changes() {
            changed = true;
            self.player.sync(&mut self.store);
        }
        changed
    }

    fn drain_changes(&mut self) -> bool {
        let mut any = false;
        while self.changes.try_recv().is_ok() {
            any = true;
        }
        any
    }

    async fn ensure_home(&mut self) {
        if self.home.is_none() {
            self.home = Some(HomePage::load(&self.client).await);
        }
    }

    fn selection_text(&mut self, result: Option<Result<(), ViewError>>) -> String {
        match result {
            Some(Ok(())) => self.now_playing(),
            Some(Err(e)) => error_text(&e),
            None => error_text(&"Nothing to choose from"),
        }
    }
}

impl<C: HttpClient> Session<C, SimulatedMedia> {
    /// Advance the headless element's clock and process what it emitted
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let events = self.player.media_mut().advance(elapsed);
        self.handle_media_events(events)
    }
}

/// Convert a 1-based list number to an index
fn list_index(command: &'static str, n: usize) -> Result<usize, CommandError> {
    n.checked_sub(1).ok_or_else(|| CommandError::InvalidArgument {
        command,
        value: n.to_string(),
    })
}

fn error_text(message: &dyn std::fmt::Display) -> String {
    format!("{}\n", message.to_string().red())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use bytes::Bytes;
    use url::Url;

    use crate::config::ApiConfig;
    use crate::http::HttpResponse;
    use crate::player::PlayerStatus;

    #[derive(Clone)]
    struct MockHttpClient;

    const ALL: &str = r#"[
        {"id": "a1", "title": "First", "members": "Ana",
         "file": {"url": "https://cdn.example.com/a1.mp3", "duration": 3}},
        {"id": "a2", "title": "Second", "members": "Bia",
         "file": {"url": "https://cdn.example.com/a2.mp3", "duration": 2}}
    ]"#;

    const ONE: &str = r#"{"id": "a2", "title": "Second", "members": "Bia",
        "file": {"url": "https://cdn.example.com/a2.mp3", "duration": 2}}"#;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &Url) -> Result<HttpResponse, reqwest::Error> {
            let (status, body) = match url.path() {
                "/" | "/getThree" => (200, ALL),
                "/episodes/a2" => (200, ONE),
                _ => (404, "{}"),
            };
            Ok(HttpResponse {
                status,
                body: Bytes::from_static(body.as_bytes()),
            })
        }
    }

    fn session() -> Session<MockHttpClient, SimulatedMedia> {
        Session::new(
            EpisodeClient::new(MockHttpClient, ApiConfig::default()),
            PlaybackStore::with_seed(3),
            Player::new(SimulatedMedia::new()),
        )
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(SessionCommand::parse("home"), Ok(SessionCommand::Home));
        assert_eq!(SessionCommand::parse("  PLAY 2 "), Ok(SessionCommand::Play(2)));
        assert_eq!(
            SessionCommand::parse("open some-id"),
            Ok(SessionCommand::Open("some-id".to_string()))
        );
        assert_eq!(SessionCommand::parse("n"), Ok(SessionCommand::Next));
        assert_eq!(SessionCommand::parse("p"), Ok(SessionCommand::Previous));
        assert_eq!(SessionCommand::parse("seek 1:30"), Ok(SessionCommand::Seek(90)));
        assert_eq!(SessionCommand::parse(""), Ok(SessionCommand::Status));
        assert_eq!(SessionCommand::parse("q"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(
            SessionCommand::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert!(matches!(
            SessionCommand::parse("play"),
            Err(CommandError::MissingArgument { command: "play", .. })
        ));
        assert!(matches!(
            SessionCommand::parse("play 0"),
            Err(CommandError::InvalidArgument { command: "play", .. })
        ));
        assert!(matches!(
            SessionCommand::parse("seek soon"),
            Err(CommandError::InvalidArgument { command: "seek", .. })
        ));
    }

    #[tokio::test]
    async fn play_from_listing_starts_player() {
        let mut session = session();

        let output = text(session.execute(SessionCommand::Play(1)).await);

        assert!(output.contains("First"));
        assert_eq!(session.store().state().cursor(), Some(0));
        assert!(session.player().media().is_playing());
        assert_eq!(
            session.player().media().source().unwrap().url.as_str(),
            "https://cdn.example.com/a1.mp3"
        );
    }

    #[tokio::test]
    async fn out_of_range_selection_is_reported_not_fatal() {
        let mut session = session();

        let output = text(session.execute(SessionCommand::Play(9)).await);

        assert!(output.contains("out of range"));
        assert!(session.store().current_episode().is_none());
    }

    #[tokio::test]
    async fn zero_position_is_rejected_without_selecting() {
        let mut session = session();

        let output = text(session.execute(SessionCommand::Latest(0)).await);

        assert!(output.contains("'0' is not a valid argument for 'latest'"));
        assert!(!output.contains(&usize::MAX.to_string()));
        assert!(session.store().current_episode().is_none());
    }

    #[tokio::test]
    async fn toggle_pauses_the_element() {
        let mut session = session();
        session.execute(SessionCommand::Play(1)).await;

        session.execute(SessionCommand::Toggle).await;

        assert!(!session.store().state().is_playing());
        assert!(!session.player().media().is_playing());
    }

    #[tokio::test]
    async fn ticks_play_through_the_queue() {
        let mut session = session();
        session.execute(SessionCommand::Play(1)).await;

        for _ in 0..12 {
            session.tick(Duration::from_secs(1));
        }

        assert_eq!(session.store().state().cursor(), None);
        assert!(!session.store().state().is_playing());
        assert_eq!(session.player().status(), &PlayerStatus::Idle);
    }

    #[tokio::test]
    async fn tick_reports_track_change() {
        let mut session = session();
        session.execute(SessionCommand::Play(2)).await;

        // metadata, then two seconds of a two second track
        assert!(!session.tick(Duration::from_secs(1)));
        assert!(!session.tick(Duration::from_secs(1)));
        assert!(session.tick(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn seek_is_clamped() {
        let mut session = session();
        session.execute(SessionCommand::Play(1)).await;
        session.tick(Duration::ZERO);

        let output = text(session.execute(SessionCommand::Seek(600)).await);

        assert!(output.contains("00:00:03"));
        assert_eq!(session.player().progress(), 3);
    }

    #[tokio::test]
    async fn opened_episode_can_be_played() {
        let mut session = session();

        let details = text(session.execute(SessionCommand::Open("a2".to_string())).await);
        assert!(details.contains("Second"));

        session.execute(SessionCommand::PlayEpisode).await;
        assert_eq!(session.store().state().queue().len(), 1);
        assert_eq!(session.store().current_episode().unwrap().id, "a2");
    }

    #[tokio::test]
    async fn playing_episode_without_opening_one_is_reported() {
        let mut session = session();
        let output = text(session.execute(SessionCommand::PlayEpisode).await);
        assert!(output.contains("Open an episode first"));
    }

    #[tokio::test]
    async fn next_at_end_is_reported() {
        let mut session = session();
        session.execute(SessionCommand::Play(2)).await;

        let output = text(session.execute(SessionCommand::Next).await);

        assert!(output.contains("Nothing to play next"));
        assert_eq!(session.store().state().cursor(), Some(1));
    }

    #[tokio::test]
    async fn quit_ends_the_session() {
        let mut session = session();
        assert_eq!(session.execute(SessionCommand::Quit).await, Outcome::Quit);
    }
}
