//! Proactive content negotiation (RFC 7231 §5.3).
//!
//! Every `choose_*` function walks the resource's offers in declared order
//! and keeps the first offer with the highest quality. Header order never
//! breaks ties.

use std::fmt;

/// A media type such as `application/json; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub main: String,
    pub sub: String,
    pub params: Vec<(String, String)>,
}

impl MediaType {
    /// Parses `type/subtype *( ";" param )`. Type names are lowercased;
    /// parameter values keep their case with surrounding quotes removed.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let (main, sub) = essence.split_once('/')?;
        let (main, sub) = (main.trim(), sub.trim());
        if main.is_empty() || sub.is_empty() || (main == "*" && sub != "*") {
            return None;
        }

        let mut params = Vec::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (k, v) = param.split_once('=')?;
            params.push((
                k.trim().to_ascii_lowercase(),
                v.trim().trim_matches('"').to_string(),
            ));
        }

        Some(Self {
            main: main.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
            params,
        })
    }

    pub fn essence(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True when `self` names the same type as `other`, ignoring parameters.
    pub fn type_matches(&self, other: &MediaType) -> bool {
        self.main == other.main && self.sub == other.sub
    }

    /// Does this (possibly wildcard) range cover `offered`?
    ///
    /// Range parameters must all be present on the offered type.
    pub fn covers(&self, offered: &MediaType) -> bool {
        let type_ok = (self.main == "*" || self.main == offered.main)
            && (self.sub == "*" || self.sub == offered.sub);
        type_ok
            && self
                .params
                .iter()
                .all(|(k, v)| offered.param(k).is_some_and(|ov| ov.eq_ignore_ascii_case(v)))
    }

    fn specificity(&self) -> u8 {
        match (self.main.as_str(), self.sub.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ if self.params.is_empty() => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)?;
        for (k, v) in &self.params {
            write!(f, ";{k}={v}")?;
        }
        Ok(())
    }
}

/// One element of an `Accept*` header with its quality value.
#[derive(Debug, Clone, PartialEq)]
struct Weighted<T> {
    value: T,
    q: f32,
}

/// Splits an `Accept*` header into values and qualities.
///
/// Items with an unparsable or out-of-range `q` are dropped.
fn weighted_items(header: &str) -> Vec<Weighted<String>> {
    header
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            let mut q = 1.0_f32;
            let mut kept = Vec::new();
            for (i, part) in item.split(';').enumerate() {
                let part = part.trim();
                if i > 0 {
                    if let Some(raw) = part
                        .strip_prefix("q=")
                        .or_else(|| part.strip_prefix("Q="))
                    {
                        q = raw.trim().parse().ok().filter(|q| (0.0..=1.0).contains(q))?;
                        continue;
                    }
                }
                kept.push(part);
            }
            Some(Weighted {
                value: kept.join(";"),
                q,
            })
        })
        .collect()
}

/// Walks offers in order, keeping the first one with the highest non-zero
/// quality.
fn pick_best<'a, T>(offers: &'a [T], quality: impl Fn(&T) -> f32) -> Option<&'a T> {
    let mut best: Option<(&T, f32)> = None;
    for offer in offers {
        let q = quality(offer);
        if q <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, bq)| q > bq) {
            best = Some((offer, q));
        }
    }
    best.map(|(offer, _)| offer)
}

/// Chooses a media type from `provided` for the given `Accept` value.
///
/// The most specific range covering an offer decides its quality.
pub fn choose_media_type(provided: &[String], accept: &str) -> Option<MediaType> {
    let ranges: Vec<Weighted<MediaType>> = weighted_items(accept)
        .into_iter()
        .filter_map(|w| {
            MediaType::parse(&w.value).map(|value| Weighted { value, q: w.q })
        })
        .collect();

    let offers: Vec<MediaType> = provided.iter().filter_map(|p| MediaType::parse(p)).collect();

    pick_best(&offers, |offer| {
        ranges
            .iter()
            .filter(|r| r.value.covers(offer))
            .max_by_key(|r| r.value.specificity())
            .map(|r| r.q)
            .unwrap_or(0.0)
    })
    .cloned()
}

/// Chooses a language tag. A range matches a tag equal to it or a tag that
/// starts with it followed by `-`; `*` matches anything.
pub fn choose_language(provided: &[String], accept_language: &str) -> Option<String> {
    let ranges = weighted_items(accept_language);

    pick_best(provided, |offer| {
        let offer = offer.to_ascii_lowercase();
        ranges
            .iter()
            .filter_map(|r| {
                let range = r.value.to_ascii_lowercase();
                if range == "*" {
                    Some((0, r.q))
                } else if offer == range || offer.starts_with(&format!("{range}-")) {
                    Some((range.len(), r.q))
                } else {
                    None
                }
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, q)| q)
            .unwrap_or(0.0)
    })
    .cloned()
}

/// Chooses a charset. An offer not named and not covered by `*` is refused.
pub fn choose_charset(provided: &[String], accept_charset: &str) -> Option<String> {
    let ranges = weighted_items(accept_charset);
    pick_best(provided, |offer| token_quality(&ranges, offer).unwrap_or(0.0)).cloned()
}

/// Chooses a content coding. `identity` stays acceptable unless the header
/// refuses it explicitly, or refuses `*` without naming `identity`.
pub fn choose_encoding(provided: &[String], accept_encoding: &str) -> Option<String> {
    let ranges = weighted_items(accept_encoding);
    pick_best(provided, |offer| {
        let q = token_quality(&ranges, offer);
        if offer.eq_ignore_ascii_case("identity") {
            q.unwrap_or(1.0)
        } else {
            q.unwrap_or(0.0)
        }
    })
    .cloned()
}

/// Quality for a case-insensitive token: an exact mention wins over `*`.
fn token_quality(ranges: &[Weighted<String>], offer: &str) -> Option<f32> {
    ranges
        .iter()
        .find(|r| r.value.eq_ignore_ascii_case(offer))
        .or_else(|| ranges.iter().find(|r| r.value == "*"))
        .map(|r| r.q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn weighted_items_drop_bad_quality() {
        let items = weighted_items("a;q=0.5, b;q=abc, c;q=2, d");
        let values: Vec<&str> = items.iter().map(|w| w.value.as_str()).collect();
        assert_eq!(values, vec!["a", "d"]);
    }

    #[test]
    fn specific_range_overrides_wildcard() {
        let provided = offers(&["text/html", "application/json"]);
        let chosen = choose_media_type(&provided, "*/*;q=0.9, text/html;q=0").unwrap();
        assert_eq!(chosen.essence(), "application/json");
    }

    #[test]
    fn parameters_must_be_offered() {
        let provided = offers(&["text/plain"]);
        assert!(choose_media_type(&provided, "text/plain;format=flowed").is_none());
        let provided = offers(&["text/plain;format=flowed"]);
        assert!(choose_media_type(&provided, "text/plain;format=flowed").is_some());
    }
}
