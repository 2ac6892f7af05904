use std::collections::HashMap;
use std::sync::Mutex;

use crate::catalog::ObjectKind;
use crate::identity::GroupId;
use crate::provider::{ContentProvider, ProviderError};
use crate::remote::{
    Authorization, Locale, RemoteObject, RemoteObjectSummary, RemotePage, UpdatePayload,
    UpdateStatus,
};

/// A call received by [`InMemoryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authorize,
    ListPage {
        kind: ObjectKind,
        page_number: u32,
        page_size: u32,
    },
    Fetch {
        group_id: GroupId,
        kind: ObjectKind,
        locale: Option<String>,
    },
    Update {
        group_id: GroupId,
        kind: ObjectKind,
        locale: String,
    },
    ListLocales,
}

#[derive(Debug, Clone)]
enum Failure {
    Authorize(ProviderError),
    Page {
        kind: ObjectKind,
        page_number: u32,
        error: ProviderError,
    },
    Fetch {
        group_id: GroupId,
        locale: Option<String>,
        error: ProviderError,
    },
    Update {
        group_id: GroupId,
        locale: String,
        error: ProviderError,
    },
}

/// In-memory provider for testing. Stores full objects per kind, derives
/// listing pages from them, and records every call it receives.
pub struct InMemoryProvider {
    label: String,
    objects: HashMap<ObjectKind, Vec<RemoteObject>>,
    variants: HashMap<(GroupId, String), RemoteObject>,
    locales: Vec<Locale>,
    authorization: Authorization,
    failures: Vec<Failure>,
    calls: Mutex<Vec<Call>>,
    updates: Mutex<Vec<(GroupId, ObjectKind, UpdatePayload)>>,
}

impl InMemoryProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            objects: HashMap::new(),
            variants: HashMap::new(),
            locales: Vec::new(),
            authorization: Authorization {
                status: "success".into(),
                ..Default::default()
            },
            failures: Vec::new(),
            calls: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Add an object to the listing of `kind`.
    pub fn add(&mut self, kind: ObjectKind, object: RemoteObject) {
        self.objects.entry(kind).or_default().push(object);
    }

    /// Serve `object` for fetches of `group_id` in `locale`.
    pub fn add_variant(&mut self, group_id: &str, locale: &str, object: RemoteObject) {
        self.variants
            .insert((GroupId::new(group_id), locale.to_owned()), object);
    }

    pub fn add_locale(&mut self, code: &str, name: &str) {
        self.locales.push(Locale {
            code: code.into(),
            name: name.into(),
        });
    }

    /// Answer the credential check with an explicit failure.
    pub fn reject_authorization(&mut self, message: &str) {
        self.authorization = Authorization {
            status: "fail".into(),
            message: Some(message.into()),
            ..Default::default()
        };
    }

    pub fn fail_authorize(&mut self, error: ProviderError) {
        self.failures.push(Failure::Authorize(error));
    }

    pub fn fail_page(&mut self, kind: ObjectKind, page_number: u32, error: ProviderError) {
        self.failures.push(Failure::Page {
            kind,
            page_number,
            error,
        });
    }

    /// Fail fetches of `group_id`. `None` fails every locale.
    pub fn fail_fetch(&mut self, group_id: &str, locale: Option<&str>, error: ProviderError) {
        self.failures.push(Failure::Fetch {
            group_id: GroupId::new(group_id),
            locale: locale.map(str::to_owned),
            error,
        });
    }

    pub fn fail_update(&mut self, group_id: &str, locale: &str, error: ProviderError) {
        self.failures.push(Failure::Update {
            group_id: GroupId::new(group_id),
            locale: locale.to_owned(),
            error,
        });
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every update applied so far, in arrival order.
    pub fn updates(&self) -> Vec<(GroupId, ObjectKind, UpdatePayload)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn find_object(&self, group_id: &GroupId, kind: ObjectKind) -> Option<&RemoteObject> {
        self.objects
            .get(&kind)?
            .iter()
            .find(|object| object.group_id().as_ref() == Some(group_id))
    }
}

/// Listing summary of a full object.
pub fn summarize(object: &RemoteObject) -> RemoteObjectSummary {
    RemoteObjectSummary {
        template_id: object.template_id,
        template_name: object.template_name.clone(),
        id: object.id,
        name: object.name.clone(),
        sub_type: object
            .template_data
            .as_ref()
            .and_then(|data| data.sub_type.clone()),
        created_by: object.created_by.clone(),
        created_at: object.created_at.clone(),
        updated_by: object.updated_by.clone(),
        updated_at: object.updated_at.clone(),
        labels: object.labels.clone(),
    }
}

/// A 404 with a structured message, as the remote answers for unknown ids.
pub fn not_found(request: &str) -> ProviderError {
    ProviderError::Status {
        status: 404,
        request: request.into(),
        message: Some("Template not found".into()),
    }
}

pub fn unauthorized(request: &str) -> ProviderError {
    ProviderError::Unauthorized {
        request: request.into(),
    }
}

#[async_trait::async_trait]
impl ContentProvider for InMemoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn authorize(&self) -> Result<Authorization, ProviderError> {
        self.record(Call::Authorize);
        for failure in &self.failures {
            if let Failure::Authorize(error) = failure {
                return Err(error.clone());
            }
        }
        Ok(self.authorization.clone())
    }

    async fn list_page(
        &self,
        kind: ObjectKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<RemotePage, ProviderError> {
        self.record(Call::ListPage {
            kind,
            page_number,
            page_size,
        });

        for failure in &self.failures {
            if let Failure::Page {
                kind: k,
                page_number: p,
                error,
            } = failure
                && *k == kind
                && *p == page_number
            {
                return Err(error.clone());
            }
        }

        let all = self.objects.get(&kind).map(Vec::as_slice).unwrap_or_default();
        let start = (page_number.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        let objects = all
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(summarize)
            .collect();

        Ok(RemotePage {
            total: all.len() as u64,
            objects,
        })
    }

    async fn fetch_by_group_id(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        locale: Option<&str>,
    ) -> Result<RemoteObject, ProviderError> {
        self.record(Call::Fetch {
            group_id: group_id.clone(),
            kind,
            locale: locale.map(str::to_owned),
        });

        for failure in &self.failures {
            if let Failure::Fetch {
                group_id: g,
                locale: l,
                error,
            } = failure
                && g == group_id
                && (l.is_none() || l.as_deref() == locale)
            {
                return Err(error.clone());
            }
        }

        if let Some(locale) = locale
            && let Some(variant) = self.variants.get(&(group_id.clone(), locale.to_owned()))
        {
            return Ok(variant.clone());
        }

        self.find_object(group_id, kind)
            .cloned()
            .ok_or_else(|| not_found("getTemplate"))
    }

    async fn update_group_locale(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        payload: &UpdatePayload,
    ) -> Result<UpdateStatus, ProviderError> {
        self.record(Call::Update {
            group_id: group_id.clone(),
            kind,
            locale: payload.locale.clone(),
        });

        for failure in &self.failures {
            if let Failure::Update {
                group_id: g,
                locale,
                error,
            } = failure
                && g == group_id
                && *locale == payload.locale
            {
                return Err(error.clone());
            }
        }

        if let Ok(mut updates) = self.updates.lock() {
            updates.push((group_id.clone(), kind, payload.clone()));
        }
        Ok(UpdateStatus {
            status: "success".into(),
            msg: None,
        })
    }

    async fn list_locales(&self) -> Result<Vec<Locale>, ProviderError> {
        self.record(Call::ListLocales);
        Ok(self.locales.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: u64) -> RemoteObject {
        RemoteObject {
            template_id: Some(id),
            template_name: Some(format!("template-{id}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_page_slices_objects() {
        let mut provider = InMemoryProvider::new("test");
        for id in 1..=5 {
            provider.add(ObjectKind::Email, email(id));
        }

        let page = provider.list_page(ObjectKind::Email, 2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        let ids: Vec<_> = page.objects.iter().map(|o| o.template_id).collect();
        assert_eq!(ids, vec![Some(3), Some(4)]);

        let empty = provider
            .list_page(ObjectKind::ContentBlock, 1, 25)
            .await
            .unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.objects.is_empty());
    }

    #[tokio::test]
    async fn fetch_prefers_locale_variant() {
        let mut provider = InMemoryProvider::new("test");
        provider.add(ObjectKind::Email, email(1));
        let mut variant = email(1);
        variant.template_name = Some("template-1_fr".into());
        provider.add_variant("1", "fr", variant);

        let group = GroupId::new("1");
        let fr = provider
            .fetch_by_group_id(&group, ObjectKind::Email, Some("fr"))
            .await
            .unwrap();
        assert_eq!(fr.template_name.as_deref(), Some("template-1_fr"));

        let base = provider
            .fetch_by_group_id(&group, ObjectKind::Email, None)
            .await
            .unwrap();
        assert_eq!(base.template_name.as_deref(), Some("template-1"));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let provider = InMemoryProvider::new("test");
        let err = provider
            .fetch_by_group_id(&GroupId::new("9"), ObjectKind::Email, None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn calls_are_recorded() {
        let provider = InMemoryProvider::new("test");
        provider.authorize().await.unwrap();
        provider.list_locales().await.unwrap();
        assert_eq!(provider.calls(), vec![Call::Authorize, Call::ListLocales]);
    }
}
