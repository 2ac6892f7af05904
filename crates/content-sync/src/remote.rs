//! Shapes exchanged with a [`ContentProvider`](crate::ContentProvider).
//!
//! These mirror what the remote API returns closely enough to be deserialized
//! directly by a provider, but carry no transport details.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::TemplateField;
use crate::identity::GroupId;

/// One page of a remote listing.
#[derive(Debug, Clone, Default)]
pub struct RemotePage {
    pub total: u64,
    pub objects: Vec<RemoteObjectSummary>,
}

/// A listed remote object. Email templates carry `templateId`/`templateName`,
/// content blocks carry `id`/`name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObjectSummary {
    pub template_id: Option<u64>,
    pub template_name: Option<String>,
    pub id: Option<u64>,
    pub name: Option<String>,
    pub sub_type: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<Value>,
    pub updated_by: Option<String>,
    pub updated_at: Option<Value>,
    pub labels: Option<Value>,
}

impl RemoteObjectSummary {
    pub fn group_id(&self) -> Option<GroupId> {
        self.template_id
            .or(self.id)
            .map(|id| GroupId::new(id.to_string()))
    }

    /// Display attributes worth caching on identifiers at listing time.
    pub fn cached_attributes(&self) -> BTreeMap<String, Value> {
        let mut attributes = BTreeMap::new();
        insert_str(
            &mut attributes,
            "templateName",
            self.template_name.as_deref().or(self.name.as_deref()),
        );
        insert_value(&mut attributes, "createdAt", self.created_at.as_ref());
        insert_str(&mut attributes, "createdBy", self.created_by.as_deref());
        insert_value(&mut attributes, "updatedAt", self.updated_at.as_ref());
        insert_str(&mut attributes, "updatedBy", self.updated_by.as_deref());
        attributes
    }
}

/// A fully fetched remote object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    pub template_id: Option<u64>,
    pub template_name: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
    pub template_data: Option<TemplateData>,
    pub labels: Option<Value>,
    pub created_at: Option<Value>,
    pub created_by: Option<String>,
    pub updated_at: Option<Value>,
    pub updated_by: Option<String>,
    pub locale: Option<String>,
    pub id: Option<u64>,
    pub name: Option<String>,
    pub content: Option<Value>,
    #[serde(rename = "type")]
    pub block_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    pub sub_type: Option<String>,
    pub body: Option<String>,
    pub amp_body: Option<String>,
    pub sender_detail: Option<SenderDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDetail {
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub reply_to_name: Option<String>,
    pub reply_to_email: Option<String>,
    pub subject: Option<String>,
    pub plain_text: Option<String>,
    pub preheader: Option<String>,
    pub cc_emails: Option<Vec<String>>,
    pub bcc_emails: Option<Vec<String>>,
    pub annotation_meta: Option<Value>,
}

impl RemoteObject {
    pub fn group_id(&self) -> Option<GroupId> {
        self.template_id
            .or(self.id)
            .map(|id| GroupId::new(id.to_string()))
    }

    /// Display name of the object, if it has one.
    pub fn display_name(&self) -> Option<&str> {
        self.template_name.as_deref().or(self.name.as_deref())
    }

    fn sender_detail(&self) -> Option<&SenderDetail> {
        self.template_data
            .as_ref()
            .and_then(|data| data.sender_detail.as_ref())
    }

    /// Text of a translatable field. Structured values are rendered as JSON.
    pub fn field(&self, field: TemplateField) -> Option<String> {
        let data = self.template_data.as_ref();
        let sender = self.sender_detail();

        match field {
            TemplateField::Subject => sender.and_then(|s| s.subject.clone()),
            TemplateField::Preheader => sender.and_then(|s| s.preheader.clone()),
            TemplateField::Body => data.and_then(|d| d.body.clone()),
            TemplateField::AmpBody => data.and_then(|d| d.amp_body.clone()),
            TemplateField::PlainText => sender.and_then(|s| s.plain_text.clone()),
            TemplateField::AnnotationMeta => {
                sender.and_then(|s| s.annotation_meta.as_ref().and_then(value_text))
            }
            TemplateField::Content => self.content.as_ref().and_then(value_text),
        }
    }

    /// Non-translatable attributes carried on identifiers built from this
    /// object, and copied back verbatim when publishing.
    pub fn display_attributes(&self) -> BTreeMap<String, Value> {
        let mut attributes = BTreeMap::new();
        let data = self.template_data.as_ref();
        let sender = self.sender_detail();

        insert_str(&mut attributes, "templateName", self.display_name());
        insert_str(&mut attributes, "description", self.description.as_deref());
        insert_str(&mut attributes, "path", self.path.as_deref());
        insert_str(
            &mut attributes,
            "subType",
            data.and_then(|d| d.sub_type.as_deref()),
        );
        insert_str(
            &mut attributes,
            "fromName",
            sender.and_then(|s| s.from_name.as_deref()),
        );
        insert_str(
            &mut attributes,
            "fromEmail",
            sender.and_then(|s| s.from_email.as_deref()),
        );
        insert_str(
            &mut attributes,
            "replyToName",
            sender.and_then(|s| s.reply_to_name.as_deref()),
        );
        insert_str(
            &mut attributes,
            "replyToEmail",
            sender.and_then(|s| s.reply_to_email.as_deref()),
        );
        if let Some(cc) = sender.and_then(|s| s.cc_emails.as_ref()) {
            attributes.insert("ccEmails".into(), Value::from(cc.clone()));
        }
        if let Some(bcc) = sender.and_then(|s| s.bcc_emails.as_ref()) {
            attributes.insert("bccEmails".into(), Value::from(bcc.clone()));
        }
        insert_value(&mut attributes, "labels", self.labels.as_ref());
        insert_value(&mut attributes, "createdAt", self.created_at.as_ref());
        insert_str(&mut attributes, "createdBy", self.created_by.as_deref());
        insert_value(&mut attributes, "updatedAt", self.updated_at.as_ref());
        insert_str(&mut attributes, "updatedBy", self.updated_by.as_deref());
        attributes
    }
}

/// Per-locale update sent for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    pub locale: String,
    /// Name of the locale variant, `baseName_locale`.
    pub template_name: String,
    /// Translated fields. Fields with no translation for this locale are
    /// absent rather than empty.
    pub fields: BTreeMap<TemplateField, String>,
    /// Non-translatable attributes copied from the group's identifiers.
    pub attributes: BTreeMap<String, Value>,
}

/// Acknowledgement of an update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub code: String,
    pub name: String,
}

/// Result of checking credentials against the remote.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Authorization {
    pub status: String,
    pub message: Option<String>,
    pub error: Option<String>,
    pub code: Option<String>,
}

impl Authorization {
    pub fn is_rejected(&self) -> bool {
        self.status == "fail"
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn insert_str(attributes: &mut BTreeMap<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        attributes.insert(key.to_owned(), Value::from(value));
    }
}

fn insert_value(attributes: &mut BTreeMap<String, Value>, key: &str, value: Option<&Value>) {
    if let Some(value) = value.filter(|v| !v.is_null()) {
        attributes.insert(key.to_owned(), value.clone());
    }
}
