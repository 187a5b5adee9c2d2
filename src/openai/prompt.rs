//! Prompt assembly for cover generation.

use std::{fmt, str::FromStr};

use crate::types::ThumbnailTrack;

/// Longest prompt handed to the image model, in characters.
pub const MAX_PROMPT_CHARS: usize = 3900;

const BASE_PROMPT: &str = "Create a nice thumbnail for a playlist, based on the image description given below. \
Ensure there are no visible borders or frames around the image; it should seamlessly fill the entire space. \
If there is anything that may cause a system censor just ignore it.";

const NO_WORDS: &str = " Do not write words in the image.";

/// What the cover description is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMethod {
    /// Fuse the album artwork of the selected tracks
    TrackThumbnails,
    /// Fuse the titles and artists of the selected tracks
    TitlesArtists,
}

impl FromStr for CreationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track_thumbnails" => Ok(CreationMethod::TrackThumbnails),
            "titles_artists" => Ok(CreationMethod::TitlesArtists),
            other => Err(format!("Creation method '{}' not permitted", other)),
        }
    }
}

impl fmt::Display for CreationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreationMethod::TrackThumbnails => write!(f, "track_thumbnails"),
            CreationMethod::TitlesArtists => write!(f, "titles_artists"),
        }
    }
}

fn vibe(prompt: &mut String, mood: &str, playlist_title: Option<&str>) {
    if !mood.is_empty() {
        prompt.push_str(&format!(" The mood or style of the image is '{}'.", mood));
    }
    if let Some(title) = playlist_title.filter(|title| !title.is_empty()) {
        prompt.push_str(&format!(
            " Use the following title as a base for the vibe of the image: {}.",
            title
        ));
    }
}

/// Instruction sent along with the track artwork to the vision model.
pub fn describe_images_prompt(mood: &str, playlist_title: Option<&str>) -> String {
    let mut prompt = String::from(
        "Based on the images you have, give a description of a unique image that would be a mix or fusion of all these images.",
    );
    vibe(&mut prompt, mood, playlist_title);
    prompt
}

/// Instruction listing `title, artist` of every track for the chat model.
pub fn describe_tracks_prompt(
    tracks: &[ThumbnailTrack],
    mood: &str,
    playlist_title: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "Based on the tracks titles and artists you have below, give a description of a unique image that would be a mix or fusion of all these images.",
    );
    vibe(&mut prompt, mood, playlist_title);

    prompt.push_str("\n\nTracks:\n");
    for track in tracks {
        prompt.push_str(&format!("{}, {}\n", track.title, track.artist));
    }
    prompt
}

/// Final image prompt: base instruction followed by the description,
/// truncated to [`MAX_PROMPT_CHARS`].
pub fn thumbnail_prompt(method: CreationMethod, description: &str) -> String {
    let mut prompt = String::from(BASE_PROMPT);
    if method == CreationMethod::TitlesArtists {
        prompt.push_str(NO_WORDS);
    }
    prompt.push_str("\n\n");
    prompt.push_str(description);
    truncate_chars(&prompt, MAX_PROMPT_CHARS)
}

/// First `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_method_parse() {
        assert_eq!(
            "track_thumbnails".parse::<CreationMethod>(),
            Ok(CreationMethod::TrackThumbnails)
        );
        assert_eq!(
            "titles_artists".parse::<CreationMethod>(),
            Ok(CreationMethod::TitlesArtists)
        );
        assert!("lyrics".parse::<CreationMethod>().is_err());
    }

    #[test]
    fn test_describe_images_prompt_without_vibe() {
        let prompt = describe_images_prompt("", None);
        assert!(prompt.ends_with("fusion of all these images."));
        assert!(!prompt.contains("mood"));
    }

    #[test]
    fn test_describe_images_prompt_with_vibe() {
        let prompt = describe_images_prompt("dreamy", Some("Night Drive"));
        assert!(prompt.contains("The mood or style of the image is 'dreamy'."));
        assert!(prompt.contains("vibe of the image: Night Drive."));
    }

    #[test]
    fn test_describe_tracks_prompt_lists_tracks() {
        let tracks = vec![
            ThumbnailTrack {
                title: "Blurred Lines".to_string(),
                artist: "Robin Thicke".to_string(),
                ..Default::default()
            },
            ThumbnailTrack {
                title: "Habits".to_string(),
                artist: "Tove Lo".to_string(),
                ..Default::default()
            },
        ];
        let prompt = describe_tracks_prompt(&tracks, "", Some(""));
        assert!(prompt.ends_with("Tracks:\nBlurred Lines, Robin Thicke\nHabits, Tove Lo\n"));
        assert!(!prompt.contains("vibe"));
    }

    #[test]
    fn test_thumbnail_prompt_forbids_words_for_titles() {
        let titles = thumbnail_prompt(CreationMethod::TitlesArtists, "a neon city");
        let images = thumbnail_prompt(CreationMethod::TrackThumbnails, "a neon city");
        assert!(titles.contains(NO_WORDS.trim()));
        assert!(!images.contains(NO_WORDS.trim()));
        assert!(images.ends_with("\n\na neon city"));
    }

    #[test]
    fn test_thumbnail_prompt_is_truncated() {
        let description = "é".repeat(5000);
        let prompt = thumbnail_prompt(CreationMethod::TrackThumbnails, &description);
        assert_eq!(prompt.chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
