//! Which of {coordinates, online link} a meeting format requires.

use std::sync::LazyLock;

use regex::Regex;

use crate::candidate::{FieldErrors, FieldPath, Location, MeetingKind};

static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").unwrap());

/// State of one of the two alternatives a meeting kind may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Missing,
    Malformed,
    Valid,
}

fn url_presence(online_url: Option<&str>) -> Presence {
    match online_url.map(str::trim) {
        None | Some("") => Presence::Missing,
        Some(url) if HTTP_URL_RE.is_match(url) => Presence::Valid,
        Some(_) => Presence::Malformed,
    }
}

fn coordinate_presence(location: Option<&Location>) -> Presence {
    let Some(location) = location else {
        return Presence::Missing;
    };
    match (location.lat, location.lng) {
        (None, None) => Presence::Missing,
        (Some(lat), Some(lng)) if valid_latitude(lat) && valid_longitude(lng) => Presence::Valid,
        _ => Presence::Malformed,
    }
}

fn valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

fn valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// Whether `url` is a well-formed http or https URL.
pub fn is_http_url(url: &str) -> bool {
    url_presence(Some(url)) == Presence::Valid
}

/// Check that the fields required by `meeting_kind` are present and well formed.
///
/// - `OnSite` needs in-range coordinates (error on `location`).
/// - `Online` needs an http/https link (error on `onlineUrl`).
/// - `Hybrid` needs at least one of the two. When neither is usable the single
///   error goes on `meetingKind`, since the combination is what is lacking.
///   A supplied but malformed link or coordinate pair is still reported on
///   its own field.
///
/// A privacy radius, when present on any location, must be a finite
/// non-negative number of kilometres.
pub fn validate_modality(
    meeting_kind: MeetingKind,
    online_url: Option<&str>,
    location: Option<&Location>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let url = url_presence(online_url);
    let coords = coordinate_presence(location);

    match meeting_kind {
        MeetingKind::OnSite => match coords {
            Presence::Valid => {}
            Presence::Missing => {
                errors.insert(FieldPath::Location, "on-site events need coordinates")
            }
            Presence::Malformed => errors.insert(
                FieldPath::Location,
                "coordinates must be a latitude in [-90, 90] and a longitude in [-180, 180]",
            ),
        },
        MeetingKind::Online => match url {
            Presence::Valid => {}
            Presence::Missing => {
                errors.insert(FieldPath::OnlineUrl, "online events need a meeting link")
            }
            Presence::Malformed => {
                errors.insert(FieldPath::OnlineUrl, "link must be an http or https URL")
            }
        },
        MeetingKind::Hybrid => {
            if url != Presence::Valid && coords != Presence::Valid {
                errors.insert(
                    FieldPath::MeetingKind,
                    "hybrid events need coordinates, an online link, or both",
                );
            }
            if url == Presence::Malformed {
                errors.insert(FieldPath::OnlineUrl, "link must be an http or https URL");
            }
            if coords == Presence::Malformed {
                errors.insert(
                    FieldPath::Location,
                    "coordinates must be a latitude in [-90, 90] and a longitude in [-180, 180]",
                );
            }
        }
    }

    if let Some(radius) = location.and_then(|l| l.privacy_radius_km) {
        if !radius.is_finite() || radius < 0.0 {
            errors.insert(
                FieldPath::LocationPrivacyRadiusKm,
                "privacy radius must be a non-negative number of kilometres",
            );
        }
    }

    errors
}

// ── Tests ───────────────────────────────────────────────────────────────────
