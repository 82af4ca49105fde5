use crate::prelude::*;

/// Joins `path` onto `base` and appends the url-encoded `query` pairs.
pub fn url_with_query(
  base: &str,
  path: &str,
  query: &[(&str, &str)],
) -> String {
  let mut url = format!("{}{}", base.trim_end_matches('/'), path);

  for (i, (key, value)) in query.iter().enumerate() {
    url.push(if i == 0 { '?' } else { '&' });
    url.push_str(&urlencoding::encode(key));
    url.push('=');
    url.push_str(&urlencoding::encode(value));
  }

  url
}

/// URL encoded into an event's QR code.
pub fn checkin_url(base: &str, event_id: &str, secret: &str) -> String {
  let path = format!("/events/{}/checkin", urlencoding::encode(event_id));
  url_with_query(base, &path, &[("code", secret)])
}

/// Whole seconds left until `expires_at`, never negative.
pub fn ttl_seconds(expires_at: DateTime, now: DateTime) -> i64 {
  ((expires_at - now).num_milliseconds() / 1000).max(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn checkin_url_trims_trailing_slash() {
    assert_eq!(
      checkin_url("https://club.example/", "abc", "evt_abc_1_ff"),
      "https://club.example/events/abc/checkin?code=evt_abc_1_ff"
    );
  }

  #[test]
  fn query_values_are_encoded() {
    assert_eq!(
      url_with_query("http://x", "/checkin/success", &[
        ("xp", "100"),
        ("event", "Rust & Tea")
      ]),
      "http://x/checkin/success?xp=100&event=Rust%20%26%20Tea"
    );
  }

  #[test]
  fn ttl_floors_partial_seconds() {
    let now = now();
    assert_eq!(ttl_seconds(now + TimeDelta::milliseconds(29_999), now), 29);
    assert_eq!(ttl_seconds(now - TimeDelta::seconds(3), now), 0);
  }
}
