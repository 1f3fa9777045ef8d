use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::provider::{EventTiming, RawInvitee};

/// Booking-form position of the school answer
pub const SCHOOL_ANSWER: usize = 0;
/// Booking-form position of the phone answer
pub const PHONE_ANSWER: usize = 1;

/// Index of the event identifier among the `/`-separated parts of an
/// invitee URI (`https:`, ``, host, `scheduled_events`, id, ...)
const EVENT_ID_SEGMENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedInvitee {
    pub name: String,
    pub email: String,
    pub uri: String,
    pub school: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedInvitee {
    #[serde(flatten)]
    pub invitee: ProjectedInvitee,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl EnrichedInvitee {
    pub fn new(invitee: ProjectedInvitee, timing: EventTiming) -> Self {
        Self { invitee, start_time: timing.start_time, end_time: timing.end_time }
    }
}

/// Narrow a provider invitee to the fields a schedule shows
pub fn project(raw: &RawInvitee) -> Result<ProjectedInvitee, ScheduleError> {
    let (Some(school), Some(phone)) = (raw.answer_at(SCHOOL_ANSWER), raw.answer_at(PHONE_ANSWER))
    else {
        return Err(ScheduleError::MalformedInviteeRecord {
            uri: raw.uri.clone(),
            answers: raw.questions_and_answers.len(),
        });
    };

    Ok(ProjectedInvitee {
        name: raw.name.clone(),
        email: raw.email.clone(),
        uri: raw.uri.clone(),
        school: school.to_string(),
        phone: phone.to_string(),
    })
}

/// Identifier of the event an invitee belongs to, taken from its URI
pub fn event_id_from_uri(uri: &str) -> Result<&str, ScheduleError> {
    uri.split('/')
        .nth(EVENT_ID_SEGMENT)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ScheduleError::InviteeUriMalformed(uri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::QuestionAnswer;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn raw(answers: &[&str]) -> RawInvitee {
        RawInvitee {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            uri: "https://api.calendly.com/scheduled_events/E1/invitees/I1".into(),
            questions_and_answers: answers
                .iter()
                .enumerate()
                .map(|(i, answer)| QuestionAnswer {
                    question: format!("Question {}", i),
                    answer: answer.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_project_well_formed() {
        let projected = project(&raw(&["Cane Ridge High", "615-555-0100"])).unwrap();
        assert_eq!(
            projected,
            ProjectedInvitee {
                name: "Grace Hopper".into(),
                email: "grace@example.com".into(),
                uri: "https://api.calendly.com/scheduled_events/E1/invitees/I1".into(),
                school: "Cane Ridge High".into(),
                phone: "615-555-0100".into(),
            }
        );
    }

    #[test]
    fn test_project_is_deterministic() {
        let input = raw(&["A", "B", "C"]);
        assert_eq!(project(&input), project(&input));
    }

    #[test]
    fn test_project_passes_empty_answers_through() {
        let projected = project(&raw(&["", ""])).unwrap();
        assert_eq!(projected.school, "");
        assert_eq!(projected.phone, "");
    }

    #[test_case(&[] ; "no answers")]
    #[test_case(&["Cane Ridge High"] ; "one answer")]
    fn test_project_rejects_short_answer_list(answers: &[&str]) {
        assert_eq!(
            project(&raw(answers)),
            Err(ScheduleError::MalformedInviteeRecord {
                uri: "https://api.calendly.com/scheduled_events/E1/invitees/I1".into(),
                answers: answers.len(),
            })
        );
    }

    #[test_case("https://api.calendly.com/scheduled_events/E1/invitees/I1", "E1" ; "provider uri")]
    #[test_case("https://host/a/X/Y/Z/W/I1", "X" ; "deep uri")]
    #[test_case("a/b/c/d/e", "e" ; "exactly five segments")]
    fn test_event_id_from_uri(uri: &str, expected: &str) {
        assert_eq!(event_id_from_uri(uri), Ok(expected));
    }

    #[test_case("https://api.calendly.com/invitees" ; "four segments")]
    #[test_case("https://api.calendly.com/scheduled_events//invitees" ; "empty segment")]
    #[test_case("" ; "empty")]
    fn test_event_id_from_malformed_uri(uri: &str) {
        assert_eq!(
            event_id_from_uri(uri),
            Err(ScheduleError::InviteeUriMalformed(uri.to_string()))
        );
    }

    #[test]
    fn test_enriched_serializes_flat() {
        let enriched = EnrichedInvitee::new(
            project(&raw(&["School", "Phone"])).unwrap(),
            EventTiming {
                start_time: "2024-03-01T15:00:00Z".parse().unwrap(),
                end_time: "2024-03-01T15:30:00Z".parse().unwrap(),
            },
        );
        let value = serde_json::to_value(&enriched).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["email", "end_time", "name", "phone", "school", "start_time", "uri"]
        );
        assert_eq!(value["start_time"], "2024-03-01T15:00:00Z");
    }
}
