use crate::{ApiError, WebexClient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Person object from the Webex API.
/// Webex documentation: https://developer.webex.com/docs/api/v1/people
///
/// Only the fields this crate reads are typed; everything else is kept in `extra`
/// so that an update sends the record back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().map(String::as_str)
    }

    fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email))
    }
}

/// Looks up the person owning `email`, or `None` if the organization has no such user.
pub fn find_person_by_email(client: &WebexClient, email: &str) -> Result<Option<Person>, ApiError> {
    let people: Vec<Person> = client.get_paged("people", &[("email", email.to_owned())])?;
    Ok(people.into_iter().find(|person| person.has_email(email)))
}

/// Turns off sign-in for `person` and returns the record as stored by Webex.
/// Webex documentation: https://developer.webex.com/docs/api/v1/people/update-a-person
pub fn disable_person(client: &WebexClient, person: &Person) -> Result<Person, ApiError> {
    let mut update = person.clone();
    update.login_enabled = Some(false);
    client.put_json(&format!("people/{}", person.id), &update)
}
