/// Navigation resolution: go-link in, redirect instruction out

use crate::backend::StorageArea;
use crate::error::{GoLinkError, HostError};
use crate::recognizer::{classify, extract_short_name};
use crate::store::MappingStore;
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::rc::Rc;
use url::Url;

/// Frame id the host uses for a tab's top-level document
pub const TOP_LEVEL_FRAME: i32 = 0;

/// Bytes left alone by JS `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Status a tab reports while it starts loading a new address
const LOADING: &str = "loading";

/// A navigation reported by the host, `{tabId, frameId, url}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub tab_id: i32,
    pub frame_id: i32,
    pub url: String,
}

/// `changeInfo` of a tab update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabChange {
    pub status: Option<String>,
}

/// The tab snapshot delivered with a tab update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabSnapshot {
    pub url: Option<String>,
}

impl NavigationEvent {
    /// Fallback trigger for hosts whose navigation events miss typed
    /// go-links: a tab that starts loading counts as a top-level navigation.
    pub fn from_tab_update(tab_id: i32, change: &TabChange, tab: &TabSnapshot) -> Option<Self> {
        if change.status.as_deref() != Some(LOADING) {
            return None;
        }

        tab.url.as_ref().map(|url| NavigationEvent {
            tab_id,
            frame_id: TOP_LEVEL_FRAME,
            url: url.clone(),
        })
    }
}

/// Which tab a redirect applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabTarget {
    Existing(i32),
    Active,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    pub target: TabTarget,
    pub url: String,
}

/// Where the omnibox wants the result opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    CurrentTab,
    NewTab,
}

impl Disposition {
    /// `currentTab` reuses the active tab; every other disposition opens one
    pub fn parse(value: &str) -> Self {
        match value {
            "currentTab" => Disposition::CurrentTab,
            _ => Disposition::NewTab,
        }
    }

    fn target(self) -> TabTarget {
        match self {
            Disposition::CurrentTab => TabTarget::Active,
            Disposition::NewTab => TabTarget::New,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Subframe,
    NotGoLink,
    EmptyShortName,
}

/// Terminal state of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ignored(IgnoreReason),
    RedirectToTarget(RedirectRequest),
    RedirectToCreate(RedirectRequest),
    /// Lookup failed; the tab is left alone
    Failed(GoLinkError),
}

impl Resolution {
    pub fn redirect(&self) -> Option<&RedirectRequest> {
        match self {
            Resolution::RedirectToTarget(request) | Resolution::RedirectToCreate(request) => {
                Some(request)
            }
            Resolution::Ignored(_) | Resolution::Failed(_) => None,
        }
    }
}

/// Host tab control
#[async_trait(?Send)]
pub trait Navigator {
    async fn redirect(&self, request: &RedirectRequest) -> Result<(), HostError>;

    /// Absolute URL of a page bundled with the extension
    fn extension_url(&self, path: &str) -> String;
}

#[async_trait(?Send)]
impl<T: Navigator + ?Sized> Navigator for Rc<T> {
    async fn redirect(&self, request: &RedirectRequest) -> Result<(), HostError> {
        (**self).redirect(request).await
    }

    fn extension_url(&self, path: &str) -> String {
        (**self).extension_url(path)
    }
}

/// Decides, per navigation, whether and where to redirect.
///
/// Holds no per-event state: concurrent navigations only share the store.
pub struct NavigationResolver<S, N> {
    store: Rc<MappingStore<S>>,
    navigator: N,
    create_page: String,
}

impl<S: StorageArea, N: Navigator> NavigationResolver<S, N> {
    pub fn new(store: Rc<MappingStore<S>>, navigator: N, create_page: impl Into<String>) -> Self {
        NavigationResolver {
            store,
            navigator,
            create_page: create_page.into(),
        }
    }

    pub async fn resolve(&self, event: &NavigationEvent) -> Resolution {
        if event.frame_id != TOP_LEVEL_FRAME {
            return Resolution::Ignored(IgnoreReason::Subframe);
        }

        let Some(form) = classify(&event.url) else {
            return Resolution::Ignored(IgnoreReason::NotGoLink);
        };

        let short_name = extract_short_name(&event.url);
        if short_name.is_empty() {
            return Resolution::Ignored(IgnoreReason::EmptyShortName);
        }

        log::debug!("Resolving go/{short_name} ({form:?}) for tab {}", event.tab_id);
        self.lookup(&short_name, TabTarget::Existing(event.tab_id))
            .await
    }

    /// Resolve and carry out the redirect, if any
    pub async fn handle(&self, event: &NavigationEvent) -> Resolution {
        let resolution = self.resolve(event).await;
        self.perform(&resolution).await;
        resolution
    }

    /// Omnibox text is a bare short name; no recognizer involved
    pub async fn resolve_omnibox(&self, text: &str, disposition: Disposition) -> Resolution {
        let short_name = text.trim();
        if short_name.is_empty() {
            return Resolution::Ignored(IgnoreReason::EmptyShortName);
        }

        self.lookup(short_name, disposition.target()).await
    }

    pub async fn handle_omnibox(&self, text: &str, disposition: Disposition) -> Resolution {
        let resolution = self.resolve_omnibox(text, disposition).await;
        self.perform(&resolution).await;
        resolution
    }

    async fn lookup(&self, short_name: &str, target: TabTarget) -> Resolution {
        match self.store.get(short_name).await {
            Ok(Some(mapping)) => {
                log::info!("Redirecting go/{short_name} to {}", mapping.url);
                Resolution::RedirectToTarget(RedirectRequest {
                    target,
                    url: mapping.url,
                })
            }
            Ok(None) => match self.create_page_url(short_name) {
                Ok(url) => {
                    log::info!("No mapping found for go/{short_name}, redirecting to create page");
                    Resolution::RedirectToCreate(RedirectRequest { target, url })
                }
                Err(e) => {
                    log::error!("Cannot build create page URL for go/{short_name}: {e}");
                    Resolution::Failed(e)
                }
            },
            Err(e) => {
                log::error!("Error handling go/{short_name}: {e}");
                Resolution::Failed(e)
            }
        }
    }

    fn create_page_url(&self, short_name: &str) -> Result<String, GoLinkError> {
        let page = self.navigator.extension_url(&self.create_page);
        let mut url = Url::parse(&page)
            .map_err(|e| GoLinkError::InvalidUrl(format!("{page:?}: {e}")))?;
        let short_name = utf8_percent_encode(short_name, URI_COMPONENT);
        url.set_query(Some(&format!("shortName={short_name}")));
        Ok(url.into())
    }

    async fn perform(&self, resolution: &Resolution) {
        let Some(request) = resolution.redirect() else {
            return;
        };

        if let Err(e) = self.navigator.redirect(request).await {
            log::error!("Redirect to {} failed: {e}", request.url);
        }
    }
}
