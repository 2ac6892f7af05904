//! Pure transforms between remote objects and the item model.
//!
//! Every transform is driven by the catalog: ordering, titles and the
//! content-type to remote-field aliases all come from [`ObjectKind`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ObjectKind;
use crate::identity::{ContentItem, GroupId, ItemIdentifier};
use crate::remote::{RemoteObject, UpdatePayload};

/// Locale-independent columns of a display row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFields {
    pub template_id: String,
    /// Last update, `DD-MM-YYYY`, empty when unknown.
    pub updated: String,
    pub creator: String,
    pub template_type: ObjectKind,
}

/// Denormalized projection of one sub-item for human-facing listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDisplayRow {
    #[serde(flatten)]
    pub identifier: ItemIdentifier,
    pub fields: DisplayFields,
    pub group_title: String,
    pub title: String,
}

/// Fetched objects keyed by group, optionally by locale.
#[derive(Debug, Default)]
pub struct FetchedObjects {
    groups: HashMap<GroupId, FetchedVariants>,
}

#[derive(Debug, Default)]
struct FetchedVariants {
    any_locale: Option<RemoteObject>,
    by_locale: HashMap<String, RemoteObject>,
}

impl FetchedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object fetched for `group_id`. `locale` is the locale it was
    /// requested for, or `None` when it stands for every locale.
    pub fn insert(&mut self, group_id: GroupId, locale: Option<String>, object: RemoteObject) {
        let variants = self.groups.entry(group_id).or_default();
        match locale {
            Some(locale) => {
                variants.by_locale.insert(locale, object);
            }
            None => variants.any_locale = Some(object),
        }
    }

    /// The object fetched for `(group_id, locale)`, falling back to the
    /// locale-agnostic object of the group.
    pub fn lookup(&self, group_id: &GroupId, locale: &str) -> Option<&RemoteObject> {
        let variants = self.groups.get(group_id)?;
        variants
            .by_locale
            .get(locale)
            .or(variants.any_locale.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Format a remote timestamp as `DD-MM-YYYY` (UTC). Accepts RFC 3339 strings
/// and epoch milliseconds, as a number or a numeric string.
pub fn format_date(value: Option<&Value>) -> String {
    let parsed = match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };

    parsed
        .map(|date| date.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

/// One display row per requested content type, in catalog order.
pub fn to_display_rows(
    object: &RemoteObject,
    group_id: &GroupId,
    kind: ObjectKind,
    content_types: &[String],
) -> Vec<CacheDisplayRow> {
    let mut ordered: Vec<&str> = content_types.iter().map(String::as_str).collect();
    ordered.sort_by_key(|content_type| kind.position(content_type));

    let fields = DisplayFields {
        template_id: object.group_id().unwrap_or_else(|| group_id.clone()).to_string(),
        updated: format_date(object.updated_at.as_ref()),
        creator: object.created_by.clone().unwrap_or_default(),
        template_type: kind,
    };
    let group_title = object.display_name().unwrap_or_default().to_owned();
    let attributes = object.display_attributes();

    ordered
        .into_iter()
        .map(|content_type| CacheDisplayRow {
            identifier: ItemIdentifier::new(group_id.clone(), content_type, kind)
                .with_attributes(attributes.clone()),
            fields: fields.clone(),
            group_title: group_title.clone(),
            title: kind.title(content_type).unwrap_or(content_type).to_owned(),
        })
        .collect()
}

/// Attach per-locale text to every item. Every requested locale gets an
/// entry; text the remote did not have is `""`. Output is sorted by group id,
/// then catalog order.
pub fn to_translations(
    items: &[&ItemIdentifier],
    locales: &[String],
    fetched: &FetchedObjects,
) -> Vec<ContentItem> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| {
        a.group_id.cmp(&b.group_id).then_with(|| {
            a.kind()
                .position(a.content_type())
                .cmp(&b.kind().position(b.content_type()))
        })
    });

    ordered
        .into_iter()
        .map(|item| {
            let field = item.kind().field(item.content_type());
            let translations = locales
                .iter()
                .map(|locale| {
                    let text = field
                        .and_then(|field| {
                            fetched
                                .lookup(&item.group_id, locale)
                                .and_then(|object| object.field(field))
                        })
                        .unwrap_or_default();
                    (locale.clone(), text)
                })
                .collect();

            ContentItem {
                identifier: item.clone(),
                translations,
            }
        })
        .collect()
}

/// Locales present in any translation map of the group, sorted.
pub fn available_locales(items: &[&ContentItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.translations.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One update payload per locale for a group.
///
/// # Panics
///
/// Panics if an item of the group is not of `kind`. Callers check this when
/// the items enter the engine.
pub fn to_update_payloads(
    group_id: &GroupId,
    kind: ObjectKind,
    items: &[&ContentItem],
    locales: &[String],
) -> Vec<UpdatePayload> {
    assert!(
        items.iter().all(|item| item.identifier.kind() == kind),
        "group {group_id} mixes object kinds"
    );

    let Some(first) = items.first() else {
        return Vec::new();
    };
    let metadata = &first.identifier.metadata;
    let base_name = metadata
        .attribute_str("templateName")
        .map(str::to_owned)
        .unwrap_or_else(|| group_id.to_string());

    locales
        .iter()
        .map(|locale| {
            let mut fields = BTreeMap::new();
            for item in items {
                let Some(field) = kind.field(item.identifier.content_type()) else {
                    continue;
                };
                if let Some(text) = item.translations.get(locale) {
                    fields.entry(field).or_insert_with(|| text.clone());
                }
            }

            UpdatePayload {
                locale: locale.clone(),
                template_name: format!("{base_name}_{locale}"),
                fields,
                attributes: metadata.attributes.clone(),
            }
        })
        .collect()
}
