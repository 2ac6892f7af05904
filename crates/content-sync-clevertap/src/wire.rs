//! Request and response bodies of the CleverTap localisation API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use content_sync::{GroupId, RemoteObject, RemoteObjectSummary, TemplateField, UpdatePayload};

/// A page of templates or content blocks.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub templates: Option<Vec<RemoteObjectSummary>>,
    #[serde(default)]
    pub content_blocks: Option<Vec<RemoteObjectSummary>>,
    #[serde(default)]
    pub total: u64,
}

impl ListResponse {
    pub fn into_objects(self) -> Vec<RemoteObjectSummary> {
        self.templates.or(self.content_blocks).unwrap_or_default()
    }
}

/// Content blocks are fetched through the listing endpoint, which answers
/// either with the block itself or with a one-element listing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentBlockResponse {
    Listed {
        #[serde(rename = "contentBlocks")]
        content_blocks: Vec<RemoteObject>,
    },
    Single(RemoteObject),
}

impl ContentBlockResponse {
    /// The block whose id is `group_id`. A response carrying only other
    /// blocks yields `None`.
    pub fn into_object(self, group_id: &GroupId) -> Option<RemoteObject> {
        match self {
            Self::Single(object) => match object.group_id() {
                Some(id) if &id != group_id => None,
                _ => Some(object),
            },
            Self::Listed { content_blocks } => content_blocks
                .into_iter()
                .find(|block| block.group_id().as_ref() == Some(group_id)),
        }
    }
}

/// Structured error body.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Who a published variant is attributed to.
#[derive(Debug, Clone, Copy)]
pub struct Attribution<'a> {
    pub partner: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailUpsertBody<'a> {
    pub base_template_id: Value,
    pub locale: &'a str,
    pub template_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a Value>,
    pub template_data: EmailTemplateDataBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<&'a Value>,
    pub partner: &'a str,
    pub created_by: &'a str,
    pub updated_by: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplateDataBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<&'a Value>,
    pub body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amp_body: Option<&'a str>,
    pub sender_detail: SenderDetailBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDetailBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_email: Option<&'a Value>,
    pub subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preheader: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_emails: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc_emails: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_meta: Option<&'a str>,
}

impl<'a> EmailUpsertBody<'a> {
    pub fn new(group_id: &GroupId, payload: &'a UpdatePayload, by: Attribution<'a>) -> Self {
        let field = move |f: TemplateField| payload.fields.get(&f).map(String::as_str);
        let attribute = move |key: &str| payload.attributes.get(key);

        Self {
            base_template_id: base_template_id(group_id),
            locale: &payload.locale,
            template_name: &payload.template_name,
            description: attribute("description"),
            path: attribute("path"),
            template_data: EmailTemplateDataBody {
                sub_type: attribute("subType"),
                body: field(TemplateField::Body).unwrap_or_default(),
                amp_body: field(TemplateField::AmpBody),
                sender_detail: SenderDetailBody {
                    from_name: attribute("fromName"),
                    from_email: attribute("fromEmail"),
                    reply_to_name: attribute("replyToName"),
                    reply_to_email: attribute("replyToEmail"),
                    subject: field(TemplateField::Subject).unwrap_or_default(),
                    plain_text: field(TemplateField::PlainText),
                    preheader: field(TemplateField::Preheader),
                    cc_emails: attribute("ccEmails"),
                    bcc_emails: attribute("bccEmails"),
                    annotation_meta: field(TemplateField::AnnotationMeta),
                },
            },
            labels: attribute("labels"),
            partner: by.partner,
            created_by: by.partner,
            updated_by: by.partner,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockUpsertBody<'a> {
    pub base_template_id: Value,
    pub locale: &'a str,
    pub name: &'a str,
    pub content: &'a str,
    pub partner: &'a str,
    pub created_by: &'a str,
    pub updated_by: &'a str,
}

impl<'a> ContentBlockUpsertBody<'a> {
    pub fn new(group_id: &GroupId, payload: &'a UpdatePayload, by: Attribution<'a>) -> Self {
        Self {
            base_template_id: base_template_id(group_id),
            locale: &payload.locale,
            name: &payload.template_name,
            content: payload
                .fields
                .get(&TemplateField::Content)
                .map(String::as_str)
                .unwrap_or_default(),
            partner: by.partner,
            created_by: by.partner,
            updated_by: by.partner,
        }
    }
}

/// Group ids are numeric on this remote; anything else is passed as a string.
fn base_template_id(group_id: &GroupId) -> Value {
    group_id
        .as_str()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(group_id.as_str()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    const BY: Attribution<'static> = Attribution {
        partner: "lokalise@clevertap.com",
    };

    fn payload(fields: &[(TemplateField, &str)]) -> UpdatePayload {
        UpdatePayload {
            locale: "fr".into(),
            template_name: "welcome_fr".into(),
            fields: fields
                .iter()
                .map(|(f, t)| (*f, t.to_string()))
                .collect(),
            attributes: BTreeMap::from([
                ("fromName".to_owned(), json!("Team")),
                ("ccEmails".to_owned(), json!(["cc@example.com"])),
                ("templateName".to_owned(), json!("welcome")),
            ]),
        }
    }

    #[test]
    fn email_body_places_fields_and_attributes() {
        let payload = payload(&[
            (TemplateField::Subject, "Bonjour"),
            (TemplateField::Body, "<p>Salut</p>"),
        ]);
        let body = EmailUpsertBody::new(&GroupId::new("101"), &payload, BY);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "baseTemplateId": 101,
                "locale": "fr",
                "templateName": "welcome_fr",
                "templateData": {
                    "body": "<p>Salut</p>",
                    "senderDetail": {
                        "fromName": "Team",
                        "subject": "Bonjour",
                        "ccEmails": ["cc@example.com"]
                    }
                },
                "partner": "lokalise@clevertap.com",
                "createdBy": "lokalise@clevertap.com",
                "updatedBy": "lokalise@clevertap.com"
            })
        );
    }

    #[test]
    fn missing_body_and_subject_are_sent_empty() {
        let payload = payload(&[(TemplateField::Preheader, "Lisez-moi")]);
        let value =
            serde_json::to_value(EmailUpsertBody::new(&GroupId::new("7"), &payload, BY)).unwrap();
        assert_eq!(value["templateData"]["body"], json!(""));
        assert_eq!(value["templateData"]["senderDetail"]["subject"], json!(""));
        assert_eq!(
            value["templateData"]["senderDetail"]["preheader"],
            json!("Lisez-moi")
        );
    }

    #[test]
    fn non_numeric_group_id_is_sent_as_string() {
        assert_eq!(base_template_id(&GroupId::new("abc")), json!("abc"));
        assert_eq!(base_template_id(&GroupId::new("42")), json!(42));
    }

    #[test]
    fn content_block_body_carries_content() {
        let payload = payload(&[(TemplateField::Content, "Pied de page")]);
        let value = serde_json::to_value(ContentBlockUpsertBody::new(
            &GroupId::new("55"),
            &payload,
            BY,
        ))
        .unwrap();
        assert_eq!(value["name"], json!("welcome_fr"));
        assert_eq!(value["content"], json!("Pied de page"));
        assert_eq!(value["baseTemplateId"], json!(55));
    }

    #[test]
    fn list_response_reads_either_collection() {
        let emails: ListResponse = serde_json::from_value(json!({
            "templates": [{ "templateId": 1, "templateName": "a" }],
            "total": 1
        }))
        .unwrap();
        assert_eq!(emails.total, 1);
        assert_eq!(emails.into_objects().len(), 1);

        let blocks: ListResponse = serde_json::from_value(json!({
            "contentBlocks": [{ "id": 2 }, { "id": 3 }],
            "total": 2
        }))
        .unwrap();
        assert_eq!(blocks.into_objects().len(), 2);
    }

    #[test]
    fn content_block_response_accepts_both_shapes() {
        let group = GroupId::new("3");
        let listed: ContentBlockResponse = serde_json::from_value(json!({
            "contentBlocks": [{ "id": 2 }, { "id": 3, "name": "footer" }]
        }))
        .unwrap();
        assert_eq!(
            listed.into_object(&group).unwrap().name.as_deref(),
            Some("footer")
        );

        let single: ContentBlockResponse =
            serde_json::from_value(json!({ "id": 3, "name": "footer" })).unwrap();
        assert_eq!(single.into_object(&group).unwrap().id, Some(3));
    }

    #[test]
    fn content_block_response_never_substitutes_another_block() {
        let group = GroupId::new("3");
        let listed: ContentBlockResponse = serde_json::from_value(json!({
            "contentBlocks": [{ "id": 2, "content": "OTHER TEXT" }]
        }))
        .unwrap();
        assert_eq!(listed.into_object(&group), None);

        let empty: ContentBlockResponse =
            serde_json::from_value(json!({ "contentBlocks": [] })).unwrap();
        assert_eq!(empty.into_object(&group), None);

        let single: ContentBlockResponse =
            serde_json::from_value(json!({ "id": 2, "name": "other" })).unwrap();
        assert_eq!(single.into_object(&group), None);
    }
}
