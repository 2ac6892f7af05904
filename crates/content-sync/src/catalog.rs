use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a remote object.
///
/// The kind selects which catalog entry, field aliases and remote endpoints
/// apply. It is resolved once, when an identifier or listing row enters the
/// engine, and carried as a typed value from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Email,
    ContentBlock,
}

/// A field of a remote object that carries translatable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateField {
    Subject,
    Preheader,
    Body,
    AmpBody,
    PlainText,
    AnnotationMeta,
    Content,
}

impl TemplateField {
    /// Name of the field in the remote object.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Preheader => "preheader",
            Self::Body => "body",
            Self::AmpBody => "ampBody",
            Self::PlainText => "plainText",
            Self::AnnotationMeta => "annotationMeta",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One translatable sub-item kind of an object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTypeSpec {
    /// The `contentType` carried in item metadata and unique ids.
    pub name: &'static str,
    /// Human-facing title used in display rows.
    pub title: &'static str,
    /// Remote field the sub-item reads from and writes to.
    pub field: TemplateField,
}

/// Static catalog entry for one object kind.
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: ObjectKind,
    pub name: &'static str,
    /// Sub-item kinds in their canonical emission order.
    pub content_types: &'static [ContentTypeSpec],
}

static EMAIL: CatalogEntry = CatalogEntry {
    kind: ObjectKind::Email,
    name: "Email",
    content_types: &[
        ContentTypeSpec {
            name: "subject",
            title: "Subject",
            field: TemplateField::Subject,
        },
        ContentTypeSpec {
            name: "preheader",
            title: "Preheader text",
            field: TemplateField::Preheader,
        },
        ContentTypeSpec {
            name: "html",
            title: "Html",
            field: TemplateField::Body,
        },
        ContentTypeSpec {
            name: "ampHtml",
            title: "Amp Html",
            field: TemplateField::AmpBody,
        },
        ContentTypeSpec {
            name: "plainText",
            title: "Plain Text",
            field: TemplateField::PlainText,
        },
        ContentTypeSpec {
            name: "annotationMeta",
            title: "Annotation Data",
            field: TemplateField::AnnotationMeta,
        },
    ],
};

static CONTENT_BLOCK: CatalogEntry = CatalogEntry {
    kind: ObjectKind::ContentBlock,
    name: "ContentBlock",
    content_types: &[ContentTypeSpec {
        name: "content",
        title: "Content",
        field: TemplateField::Content,
    }],
};

/// Locale-independent columns shown next to every display row, with their
/// titles.
pub const DISPLAY_SCHEMA: [(&str, &str); 4] = [
    ("templateId", "Template id"),
    ("updated", "Updated at"),
    ("creator", "Created by"),
    ("templateType", "Template type"),
];

impl ObjectKind {
    /// All known kinds in listing order.
    pub const ALL: [ObjectKind; 2] = [Self::Email, Self::ContentBlock];

    pub fn entry(self) -> &'static CatalogEntry {
        match self {
            Self::Email => &EMAIL,
            Self::ContentBlock => &CONTENT_BLOCK,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.entry().name
    }

    /// Resolve a kind by its catalog name. `None` means the kind is unknown.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Content types of this kind in catalog order.
    pub fn order(self) -> impl Iterator<Item = &'static str> {
        self.entry().content_types.iter().map(|c| c.name)
    }

    pub fn content_type(self, name: &str) -> Option<&'static ContentTypeSpec> {
        self.entry()
            .content_types
            .iter()
            .find(|c| c.name == name)
    }

    /// Position of `content_type` in catalog order. Unknown content types sort
    /// after every known one.
    pub fn position(self, content_type: &str) -> usize {
        self.entry()
            .content_types
            .iter()
            .position(|c| c.name == content_type)
            .unwrap_or(usize::MAX)
    }

    pub fn title(self, content_type: &str) -> Option<&'static str> {
        self.content_type(content_type).map(|c| c.title)
    }

    pub fn field(self, content_type: &str) -> Option<TemplateField> {
        self.content_type(content_type).map(|c| c.field)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_order_matches_catalog() {
        let order: Vec<_> = ObjectKind::Email.order().collect();
        assert_eq!(
            order,
            vec![
                "subject",
                "preheader",
                "html",
                "ampHtml",
                "plainText",
                "annotationMeta"
            ]
        );
    }

    #[test]
    fn content_block_has_single_content_type() {
        let order: Vec<_> = ObjectKind::ContentBlock.order().collect();
        assert_eq!(order, vec!["content"]);
        assert_eq!(ObjectKind::ContentBlock.title("content"), Some("Content"));
    }

    #[test]
    fn aliases_resolve_to_remote_fields() {
        assert_eq!(ObjectKind::Email.field("html"), Some(TemplateField::Body));
        assert_eq!(
            ObjectKind::Email.field("ampHtml"),
            Some(TemplateField::AmpBody)
        );
        assert_eq!(
            ObjectKind::Email.field("subject"),
            Some(TemplateField::Subject)
        );
        assert_eq!(ObjectKind::Email.field("content"), None);
    }

    #[test]
    fn unknown_content_type_sorts_last() {
        assert_eq!(ObjectKind::Email.position("subject"), 0);
        assert_eq!(ObjectKind::Email.position("annotationMeta"), 5);
        assert_eq!(ObjectKind::Email.position("nope"), usize::MAX);
    }

    #[test]
    fn parse_round_trips_names() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::parse("Sms"), None);
    }

    #[test]
    fn entries_point_back_to_their_kind() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.entry().kind, kind);
        }
    }

    #[test]
    fn kind_serializes_as_catalog_name() {
        let json = serde_json::to_string(&ObjectKind::ContentBlock).unwrap();
        assert_eq!(json, "\"ContentBlock\"");
        let parsed: ObjectKind = serde_json::from_str("\"Email\"").unwrap();
        assert_eq!(parsed, ObjectKind::Email);
        assert!(serde_json::from_str::<ObjectKind>("\"Sms\"").is_err());
    }
}
