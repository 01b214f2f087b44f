// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use console::Emoji;

use crate::playback::PlaybackState;
use crate::player::{MediaElement, Player, PlayerStatus};
use crate::time::format_duration;

use super::truncate_title;

static PLAYING: Emoji<'_, '_> = Emoji("🎙️  ", "");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");

const BAR_WIDTH: usize = 30;

/// Render the player widget: current episode, progress bar and controls
pub fn render_player<M: MediaElement>(player: &Player<M>, state: &PlaybackState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PLAYING}{}", "Now playing".bold().magenta());

    let Some(episode) = state.current_episode() else {
        let _ = writeln!(out, "  {}", "Select a podcast to listen to".dimmed());
        return out;
    };

    let _ = writeln!(
        out,
        "  {} {}",
        truncate_title(&episode.title, 60).bold(),
        format!("({})", episode.members).dimmed()
    );

    if let PlayerStatus::Failed(reason) = player.status() {
        let _ = writeln!(out, "  {FAILURE}{} {}", "Playback failed:".red().bold(), reason);
    }

    let duration = player.duration();
    let _ = writeln!(
        out,
        "  {} [{}] {}",
        format_duration(player.progress()),
        progress_bar(player.progress(), duration),
        format_duration(duration)
    );

    let len = state.queue().len();
    let controls = [
        control("shuffle", len > 1, state.is_shuffling()),
        control("prev", state.has_previous(), false),
        control(if state.is_playing() { "pause" } else { "play" }, true, false),
        control("next", state.has_next(), false),
        control("loop", true, state.is_looping()),
    ];
    let controls: Vec<String> = controls.iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "  {}", controls.join(" "));

    out
}

fn progress_bar(progress: u64, duration: u64) -> String {
    let filled = if duration == 0 {
        0
    } else {
        ((progress.min(duration) as u128 * BAR_WIDTH as u128) / duration as u128) as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Disabled controls are dimmed, active toggles highlighted
fn control(label: &str, enabled: bool, active: bool) -> ColoredString {
    let text = format!("[{label}]");
    if !enabled {
        text.dimmed()
    } else if active {
        text.green().bold()
    } else {
        text.normal()
    }
}
