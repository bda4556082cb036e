//! Running-app enumeration and filtering
//!
//! `devicectl device info processes` dumps every process on the device. The
//! interesting rows are user apps, recognizable by their bundle container
//! path under `/private/var/containers/Bundle/Application/`. Everything
//! else - and a long tail of system and well-known non-game apps - is
//! filtered out so the listing is mostly games.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::devicectl::runner::ToolRunner;
use crate::error::Result;

/// Leading PID column on each process row.
static PID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s+").expect("pid prefix pattern is valid"));

/// App bundle container path embedded in a process row.
static BUNDLE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(/private/var/containers/Bundle/Application/[A-F0-9\-]+/.+?\.app)")
        .expect("bundle path pattern is valid")
});

/// Bundles hidden from the running-app listing.
///
/// System apps plus the well-known non-game apps users keep open. Matched
/// by exact basename; the list's historical quirks (case duplicates, two
/// entries without the `.app` suffix) are intentional.
pub const EXCLUDED_BUNDLES: &[&str] = &[
    "Photos.app", "Weather.app", "VoiceMemos.app", "News.app", "Tips.app",
    "Reminders.app", "Music.app", "Maps.app", "Stocks.app", "AppStore.app",
    "Measure.app", "Magnifier.app", "Books.app", "Shortcuts.app", "Podcasts.app",
    "Calculator.app", "Health.app", "FindMy.app", "Freeform.app", "Camera.app",
    "AppleTV.app", "YouTube.app", "TestFlight.app", "MobileCal.app", "MobileMail.app",
    "MobileSafari.app", "SequoiaTranslator.app", "MobileNotes.app", "MobileTimer.app",
    "Home.app", "Journal.app", "Files.app", "Fitness.app", "Passbook.app",
    "MobileSMS.app", "Bridge.app", "Messenger.app", "ChatGPT.app", "WhatsApp.app",
    "Drive.app", "Spotify.app", "Discord.app", "Bumble.app", "Meetup.app",
    "ProtonNative.app", "YouTubeCreator.app", "Tinder.app", "Hinge.app", "TikTok.app",
    "Google.app", "maps.app", "Docs.app", "Gmail.app", "Twitch.app", "Instagram.app",
    "Snapchat.app", "Authenticator.app", "Preview.app", "Games.app", "Final Cut Camera.app",
    "MobilePhone.app", "Max-iOS.app", "Facebook.app", "Argo.app", "Compass.app", "Dominguez.app",
    "Evernote.app", "FaceBook.app", "LinkedIn.app", "Notion.app", "Outlook-iOS.app", "PrimeVideo.app",
    "Slack.app", "TeamSpaceApp.app", "Telegram.app", "YouTubeKids.app", "Zoom.app", "Signal.app", "Sheets.app",
    "Netflix.app", "DisneyPlus.app", "OneNote.app", "Tachyon.app", "Word.app", "RunestoneEditor.app", "Contacts.app",
    "FaceTime.app", "Image Playground.app", "MobileStore.app", "Amazon.app", "Apple Store.app", "Control Center.app", "Passwords.app",
    "RedditApp.app", "BlackmagicCam.app", "Cash.app", "Chase.app", "Helix.app", "com.roborock.smart.app", "MintMobile.app", "GooglePhotos",
    "Geekbench 6",
];

/// Marketing names appended to executable names that ship under opaque
/// internal names.
pub const DISPLAY_SUFFIXES: &[(&str, &str)] = &[
    ("ShadowTrackerExtra", "(PUBG MOBILE)"),
    ("scimitar", "(Assassin's Creed Mirage)"),
    ("SolarlandClient", "(Farlight 84)"),
    ("hkrpg", "(Honkai: Star Rail)"),
    ("bh3oversea", "(Honkai Impact 3)"),
    ("X6Game", "(Infinity Nikki)"),
    ("ExtremeGame", "(PUBG: New State)"),
];

/// A user app found running on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApp {
    /// Full bundle container path, ending in `.app`
    pub bundle_path: String,
    /// Bundle basename without the `.app` suffix, e.g. "SolarlandClient"
    pub app_name: String,
    /// Name shown to the user, with a marketing suffix when one is known
    pub display_name: String,
}

/// Append the marketing suffix for an executable name, when one is known.
pub fn add_suffix(app_name: &str) -> String {
    for (name, suffix) in DISPLAY_SUFFIXES {
        if *name == app_name {
            return format!("{app_name}{suffix}");
        }
    }
    app_name.to_string()
}

/// Undo [`add_suffix`]; returns the input unchanged when nothing matches.
pub fn strip_suffix(display_name: &str) -> String {
    for (name, suffix) in DISPLAY_SUFFIXES {
        if display_name == format!("{name}{suffix}") {
            return (*name).to_string();
        }
    }
    for (_, suffix) in DISPLAY_SUFFIXES {
        if let Some(stripped) = display_name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    display_name.to_string()
}

/// Basename of a bundle path, e.g. "SolarlandClient.app".
fn bundle_basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Bundle basename with the `.app` suffix removed (case-insensitive).
pub fn app_name_from_path(path: &str) -> String {
    let base = bundle_basename(path);
    if base.to_ascii_lowercase().ends_with(".app") {
        base[..base.len() - 4].to_string()
    } else {
        base.to_string()
    }
}

/// Parse the output of `devicectl device info processes`.
///
/// Per line: strip the PID column, pull out the first bundle container
/// path, drop denylisted bundles, deduplicate by path and then by display
/// name, and sort case-insensitively by name.
pub fn parse_running_apps(raw: &str) -> Vec<RunningApp> {
    let mut seen_paths = Vec::new();
    for line in raw.lines() {
        let cleaned = PID_PREFIX.replace(line.trim(), "");
        if cleaned.is_empty() {
            continue;
        }
        let Some(caps) = BUNDLE_PATH.captures(&cleaned) else {
            continue;
        };
        let path = caps[1].to_string();
        let basename = bundle_basename(&path);
        if EXCLUDED_BUNDLES.contains(&basename) {
            continue;
        }
        if seen_paths.iter().any(|(p, _)| *p == path) {
            continue;
        }
        debug!("Found app bundle {}", path);
        let name = basename.to_string();
        seen_paths.push((path, name));
    }

    seen_paths.sort_by(|(_, a), (_, b)| a.to_lowercase().cmp(&b.to_lowercase()));

    let mut apps: Vec<RunningApp> = Vec::with_capacity(seen_paths.len());
    for (path, _) in seen_paths {
        let app_name = app_name_from_path(&path);
        let display_name = add_suffix(&app_name);
        if apps.iter().any(|a| a.display_name == display_name) {
            continue;
        }
        apps.push(RunningApp {
            bundle_path: path,
            app_name,
            display_name,
        });
    }
    apps
}

/// Run the process listing for a device and parse out the user apps.
pub fn list_running_apps(runner: &dyn ToolRunner, udid: &str) -> Result<Vec<RunningApp>> {
    let output = runner.run(
        "xcrun",
        &["devicectl", "device", "info", "processes", "--device", udid],
    )?;
    Ok(parse_running_apps(&output.text))
}

/// Whether a bundle shows up in the device's process list.
pub fn is_app_running(runner: &dyn ToolRunner, udid: &str, bundle: &str) -> Result<bool> {
    let output = runner.run(
        "xcrun",
        &["devicectl", "device", "process", "list", "--device", udid],
    )?;
    Ok(output.text.contains(bundle))
}
