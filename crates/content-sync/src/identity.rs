use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ObjectKind;
use crate::remote::RemoteObjectSummary;

/// Separator between the group id and the content type inside a unique id.
/// Never valid inside either part.
pub const ID_SEPARATOR: &str = "||";

/// Identifier of a remote parent object, shared by all of its sub-items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Addressable unit a caller reads and writes: `groupId || contentType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(String);

impl UniqueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(group_id, content_type)`.
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.0.split_once(ID_SEPARATOR)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn build_unique_id(group_id: &GroupId, content_type: &str) -> UniqueId {
    UniqueId(format!("{}{ID_SEPARATOR}{content_type}", group_id.as_str()))
}

/// Metadata attached to every identifier.
///
/// `contentType` and `templateType` are always present. Anything else
/// (template name, sender fields, timestamps) is an open attribute bag that
/// is filled opportunistically and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub content_type: String,
    pub template_type: ObjectKind,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ItemMetadata {
    pub fn new(content_type: impl Into<String>, template_type: ObjectKind) -> Self {
        Self {
            content_type: content_type.into(),
            template_type,
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemIdentifier {
    pub unique_id: UniqueId,
    pub group_id: GroupId,
    pub metadata: ItemMetadata,
}

impl ItemIdentifier {
    /// Build the identifier of one sub-item, deriving its unique id.
    pub fn new(group_id: GroupId, content_type: &str, kind: ObjectKind) -> Self {
        Self {
            unique_id: build_unique_id(&group_id, content_type),
            group_id,
            metadata: ItemMetadata::new(content_type, kind),
        }
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata.attributes = attributes;
        self
    }

    pub fn kind(&self) -> ObjectKind {
        self.metadata.template_type
    }

    pub fn content_type(&self) -> &str {
        &self.metadata.content_type
    }
}

impl AsRef<ItemIdentifier> for ItemIdentifier {
    fn as_ref(&self) -> &ItemIdentifier {
        self
    }
}

/// An identifier together with its per-locale text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(flatten)]
    pub identifier: ItemIdentifier,
    pub translations: BTreeMap<String, String>,
}

impl AsRef<ItemIdentifier> for ContentItem {
    fn as_ref(&self) -> &ItemIdentifier {
        &self.identifier
    }
}

/// Decompose a listed remote object into one identifier per catalog content
/// type of `kind`, in catalog order.
pub fn decompose(summary: &RemoteObjectSummary, kind: ObjectKind) -> Vec<ItemIdentifier> {
    let Some(group_id) = summary.group_id() else {
        tracing::warn!(%kind, "skipping listed object without an id");
        return Vec::new();
    };

    let attributes = summary.cached_attributes();

    kind.order()
        .map(|content_type| {
            ItemIdentifier::new(group_id.clone(), content_type, kind)
                .with_attributes(attributes.clone())
        })
        .collect()
}

/// Partition items by object kind. Partitions appear in first-seen order and
/// keep input order inside.
pub fn group_by_kind<'a, T, I>(items: I) -> Vec<(ObjectKind, Vec<&'a T>)>
where
    T: AsRef<ItemIdentifier> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut groups: Vec<(ObjectKind, Vec<&T>)> = Vec::new();

    for item in items {
        let kind = item.as_ref().kind();
        if let Some(group) = groups.iter_mut().find(|(k, _)| *k == kind) {
            group.1.push(item);
        } else {
            groups.push((kind, vec![item]));
        }
    }

    groups
}

/// Partition items by group id, deduplicating group ids. Partitions appear in
/// first-seen order and keep input order inside.
pub fn group_by_group_id<'a, T, I>(items: I) -> Vec<(GroupId, Vec<&'a T>)>
where
    T: AsRef<ItemIdentifier> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut groups: Vec<(GroupId, Vec<&T>)> = Vec::new();

    for item in items {
        let group_id = &item.as_ref().group_id;
        if let Some(group) = groups.iter_mut().find(|(g, _)| g == group_id) {
            group.1.push(item);
        } else {
            groups.push((group_id.clone(), vec![item]));
        }
    }

    groups
}

/// Distinct content types among the items of `group_id`. Order is not
/// meaningful; the mapper sorts by catalog order.
pub fn distinct_content_types_for_group<'a, T, I>(items: I, group_id: &GroupId) -> Vec<String>
where
    T: AsRef<ItemIdentifier> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut content_types: Vec<String> = Vec::new();
    for item in items {
        let item = item.as_ref();
        if &item.group_id == group_id && !content_types.iter().any(|c| c == item.content_type()) {
            content_types.push(item.content_type().to_owned());
        }
    }
    content_types
}

/// Find a group whose items disagree on their object kind.
pub fn find_mixed_group<'a, T, I>(items: I) -> Option<GroupId>
where
    T: AsRef<ItemIdentifier> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    group_by_group_id(items).into_iter().find_map(|(group_id, members)| {
        let kind = members.first()?.as_ref().kind();
        members
            .iter()
            .any(|member| member.as_ref().kind() != kind)
            .then_some(group_id)
    })
}
