//! Normalization of heterogeneously shaped remote responses.
//!
//! The remote service is inconsistent about where it puts the job id,
//! status, progress and output URLs. Each of those is described here as an
//! ordered list of extraction rules; the first rule that matches wins and
//! later rules are never consulted. Missing fields are not errors: a `DONE`
//! response without any image location normalizes to an empty URL list.

use serde::Serialize;
use serde_json::Value;

use crate::job::JobStatus;

/// Placeholder progress used when neither progress field is present.
pub const PROGRESS_PLACEHOLDER: &str = "...";

/// A location inside a JSON body, expressed as a chain of object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static [&'static str]);

impl FieldPath {
    /// Follow the key chain, returning `None` as soon as a key is absent
    /// or an intermediate node is not an object.
    pub fn lookup<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(body, |node, key| node.get(*key))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Where a newly created job's id may appear, in priority order.
pub const JOB_ID_PATHS: &[FieldPath] = &[
    FieldPath(&["messageId"]),
    FieldPath(&["id"]),
    FieldPath(&["data", "messageId"]),
];

/// Where the job status may appear, in priority order.
pub const STATUS_PATHS: &[FieldPath] = &[FieldPath(&["status"]), FieldPath(&["data", "status"])];

/// Where the progress token may appear, in priority order.
pub const PROGRESS_PATHS: &[FieldPath] =
    &[FieldPath(&["progress"]), FieldPath(&["data", "progress"])];

/// Where the follow-up action buttons may appear, in priority order.
pub const BUTTON_PATHS: &[FieldPath] = &[FieldPath(&["buttons"]), FieldPath(&["data", "buttons"])];

/// One strategy for locating output image URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRule {
    /// The path holds a sequence of URLs.
    List(FieldPath),
    /// The path holds a single URL, wrapped into a one-element sequence.
    Single(FieldPath),
}

/// Image URL strategies, in strict priority order. No merging happens
/// between rules.
pub const IMAGE_RULES: &[ImageRule] = &[
    ImageRule::List(FieldPath(&["data", "images"])),
    ImageRule::List(FieldPath(&["images"])),
    ImageRule::Single(FieldPath(&["data", "url"])),
    ImageRule::Single(FieldPath(&["url"])),
];

impl ImageRule {
    /// Apply this rule. `Some` means the rule matched, even if the matched
    /// sequence is empty; `None` means the next rule should be tried.
    pub fn extract(&self, body: &Value) -> Option<Vec<String>> {
        match self {
            Self::List(path) => path.lookup(body)?.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::to_string)
                    .collect()
            }),
            Self::Single(path) => path
                .lookup(body)?
                .as_str()
                .map(|url| vec![url.to_string()]),
        }
    }
}

/// The `(status, progress, image_urls)` view of a fetch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedStatus {
    pub status: JobStatus,
    pub progress: String,
    /// Populated only when `status` is `DONE`.
    pub image_urls: Vec<String>,
}

/// Normalize a raw fetch response.
pub fn normalize(body: &Value) -> NormalizedStatus {
    let status = JobStatus::from_raw(&extract_status(body));
    let progress = extract_progress(body);
    let image_urls = if status == JobStatus::Done {
        extract_image_urls(body)
    } else {
        Vec::new()
    };

    NormalizedStatus {
        status,
        progress,
        image_urls,
    }
}

/// Extract a job id from a submit or button response.
///
/// Empty strings and `null` are skipped in favour of the next path; a
/// numeric id is rendered as its decimal text.
pub fn extract_job_id(body: &Value) -> Option<String> {
    JOB_ID_PATHS
        .iter()
        .find_map(|path| match path.lookup(body)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Raw status text (not yet case-normalized); empty when absent.
pub fn extract_status(body: &Value) -> String {
    STATUS_PATHS
        .iter()
        .find_map(|path| {
            path.lookup(body)?
                .as_str()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// Progress token; [`PROGRESS_PLACEHOLDER`] when absent or `null`.
pub fn extract_progress(body: &Value) -> String {
    PROGRESS_PATHS
        .iter()
        .find_map(|path| match path.lookup(body)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| PROGRESS_PLACEHOLDER.to_string())
}

/// Output image URLs, from the first matching [`IMAGE_RULES`] entry.
pub fn extract_image_urls(body: &Value) -> Vec<String> {
    IMAGE_RULES
        .iter()
        .find_map(|rule| rule.extract(body))
        .unwrap_or_default()
}

/// Follow-up action buttons advertised by the response (empty when absent).
pub fn extract_buttons(body: &Value) -> Vec<Value> {
    BUTTON_PATHS
        .iter()
        .find_map(|path| path.lookup(body)?.as_array().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // -- job id --

    #[test]
    fn job_id_prefers_top_level_message_id() {
        let body = json!({ "messageId": "m1", "id": "i1", "data": { "messageId": "d1" } });
        assert_eq!(extract_job_id(&body).as_deref(), Some("m1"));
    }

    #[test]
    fn job_id_falls_back_to_id_then_nested() {
        assert_eq!(
            extract_job_id(&json!({ "id": "i1", "data": { "messageId": "d1" } })).as_deref(),
            Some("i1")
        );
        assert_eq!(
            extract_job_id(&json!({ "data": { "messageId": "d1" } })).as_deref(),
            Some("d1")
        );
    }

    #[test]
    fn job_id_skips_empty_and_null_values() {
        let body = json!({ "messageId": "", "id": null, "data": { "messageId": "d1" } });
        assert_eq!(extract_job_id(&body).as_deref(), Some("d1"));
    }

    #[test]
    fn job_id_accepts_numbers() {
        assert_eq!(extract_job_id(&json!({ "id": 42 })).as_deref(), Some("42"));
    }

    #[test]
    fn job_id_absent_is_none() {
        assert_eq!(extract_job_id(&json!({ "success": true })), None);
        assert_eq!(extract_job_id(&json!({ "data": "not an object" })), None);
    }

    // -- status / progress --

    #[test]
    fn status_is_upper_cased_and_falls_back_to_nested() {
        let n = normalize(&json!({ "data": { "status": "in_progress", "progress": 40 } }));
        assert_eq!(n.status, JobStatus::InProgress);
        assert_eq!(n.progress, "40");
    }

    #[test]
    fn missing_status_is_empty_other() {
        let n = normalize(&json!({}));
        assert_eq!(n.status, JobStatus::Other(String::new()));
        assert_eq!(n.progress, PROGRESS_PLACEHOLDER);
        assert!(n.image_urls.is_empty());
    }

    #[test]
    fn progress_zero_is_kept() {
        assert_eq!(extract_progress(&json!({ "progress": 0 })), "0");
    }

    #[test]
    fn progress_null_falls_through() {
        let body = json!({ "progress": null, "data": { "progress": "75%" } });
        assert_eq!(extract_progress(&body), "75%");
    }

    // -- images --

    #[test]
    fn nested_images_win_over_everything() {
        let body = json!({
            "status": "DONE",
            "images": ["http://x/top.png"],
            "url": "http://x/url.png",
            "data": { "images": ["http://x/a.png", "http://x/b.jpg"], "url": "http://x/d.png" }
        });
        assert_eq!(
            normalize(&body).image_urls,
            vec!["http://x/a.png", "http://x/b.jpg"]
        );
    }

    #[test]
    fn top_level_images_win_over_urls() {
        let body = json!({
            "status": "done",
            "images": ["http://x/top.png"],
            "data": { "url": "http://x/d.png" }
        });
        assert_eq!(normalize(&body).image_urls, vec!["http://x/top.png"]);
    }

    #[test]
    fn nested_url_wins_over_top_level_url() {
        let body = json!({ "status": "DONE", "url": "http://x/u.png", "data": { "url": "http://x/d.png" } });
        assert_eq!(normalize(&body).image_urls, vec!["http://x/d.png"]);
    }

    #[test]
    fn top_level_url_is_last_resort() {
        let body = json!({ "status": "DONE", "url": "http://x/u.png" });
        assert_eq!(normalize(&body).image_urls, vec!["http://x/u.png"]);
    }

    #[test]
    fn empty_list_still_counts_as_match() {
        let body = json!({ "status": "DONE", "data": { "images": [] }, "url": "http://x/u.png" });
        assert!(normalize(&body).image_urls.is_empty());
    }

    #[test]
    fn non_sequence_images_are_skipped() {
        let body = json!({ "status": "DONE", "images": "oops", "url": "http://x/u.png" });
        assert_eq!(normalize(&body).image_urls, vec!["http://x/u.png"]);
    }

    #[test]
    fn done_without_images_is_empty_not_error() {
        let n = normalize(&json!({ "status": "DONE", "progress": "100%" }));
        assert_eq!(n.status, JobStatus::Done);
        assert!(n.image_urls.is_empty());
    }

    #[test]
    fn images_ignored_until_done() {
        let n = normalize(&json!({ "status": "IN_PROGRESS", "images": ["http://x/a.png"] }));
        assert!(n.image_urls.is_empty());
    }

    #[test]
    fn each_rule_in_isolation() {
        let cases = [
            (IMAGE_RULES[0], json!({ "data": { "images": ["a"] } })),
            (IMAGE_RULES[1], json!({ "images": ["a"] })),
            (IMAGE_RULES[2], json!({ "data": { "url": "a" } })),
            (IMAGE_RULES[3], json!({ "url": "a" })),
        ];
        for (rule, body) in cases {
            assert_eq!(rule.extract(&body), Some(vec!["a".to_string()]), "{rule:?}");
        }
    }

    // -- buttons --

    #[test]
    fn buttons_default_to_empty() {
        assert!(extract_buttons(&json!({ "status": "DONE" })).is_empty());
        assert_eq!(
            extract_buttons(&json!({ "buttons": ["U1", "V1"] })),
            vec![json!("U1"), json!("V1")]
        );
    }

    #[test]
    fn field_path_display() {
        assert_eq!(JOB_ID_PATHS[2].to_string(), "data.messageId");
    }
}
