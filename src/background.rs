/// Background context: one store shared by the dispatcher and the resolver

use crate::backend::StorageArea;
use crate::config::Config;
use crate::dispatcher::{MessageDispatcher, Response};
use crate::resolver::{
    Disposition, NavigationEvent, NavigationResolver, Navigator, Resolution, TabChange, TabSnapshot,
};
use crate::store::MappingStore;
use crate::suggest::{Suggestion, suggest};
use serde_json::Value;
use std::rc::Rc;

pub struct Background<S, N> {
    config: Config,
    store: Rc<MappingStore<S>>,
    dispatcher: MessageDispatcher<S>,
    resolver: NavigationResolver<S, N>,
}

impl<S: StorageArea, N: Navigator> Background<S, N> {
    pub fn new(config: Config, storage: S, navigator: N) -> Self {
        let store = MappingStore::new(storage, config.storage_key.clone());
        Self::with_store(config, store, navigator)
    }

    pub fn with_store(config: Config, store: MappingStore<S>, navigator: N) -> Self {
        let store = Rc::new(store);
        Background {
            dispatcher: MessageDispatcher::new(store.clone()),
            resolver: NavigationResolver::new(store.clone(), navigator, config.create_page.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &MappingStore<S> {
        &self.store
    }

    pub async fn handle_message(&self, message: Value) -> Response {
        self.dispatcher.dispatch(message).await
    }

    pub async fn handle_navigation(&self, event: &NavigationEvent) -> Resolution {
        self.resolver.handle(event).await
    }

    /// Returns `None` when the update is not a page load
    pub async fn handle_tab_update(
        &self,
        tab_id: i32,
        change: &TabChange,
        tab: &TabSnapshot,
    ) -> Option<Resolution> {
        let event = NavigationEvent::from_tab_update(tab_id, change, tab)?;
        Some(self.resolver.handle(&event).await)
    }

    pub async fn handle_omnibox_input(&self, text: &str, disposition: &str) -> Resolution {
        self.resolver
            .handle_omnibox(text, Disposition::parse(disposition))
            .await
    }

    /// Suggestions for omnibox text; a failed read yields none
    pub async fn suggestions(&self, text: &str) -> Vec<Suggestion> {
        match self.store.get_all().await {
            Ok(mappings) => suggest(&mappings, text, self.config.suggestion_limit),
            Err(e) => {
                log::error!("Error getting omnibox suggestions: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{RedirectRequest, TabTarget};
    use crate::test_support::{CountingStorage, RecordingNavigator};
    use futures::executor::block_on;
    use serde_json::json;

    fn create_test_background(config: Config) -> (Background<Rc<CountingStorage>, Rc<RecordingNavigator>>, Rc<CountingStorage>, Rc<RecordingNavigator>) {
        let storage = Rc::new(CountingStorage::new());
        let navigator = Rc::new(RecordingNavigator::new());
        let background = Background::new(config, storage.clone(), navigator.clone());
        (background, storage, navigator)
    }

    #[test]
    fn test_message_then_navigation() {
        let (background, _, navigator) = create_test_background(Config::default());

        block_on(async {
            let saved = background
                .handle_message(json!({
                    "action": "saveMapping",
                    "shortName": "gmail",
                    "url": "https://mail.google.com",
                }))
                .await;
            assert!(!saved.is_error());

            background
                .handle_navigation(&NavigationEvent {
                    tab_id: 3,
                    frame_id: 0,
                    url: "http://go/gmail".to_string(),
                })
                .await;
        });

        assert_eq!(
            *navigator.redirects.borrow(),
            vec![RedirectRequest {
                target: TabTarget::Existing(3),
                url: "https://mail.google.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_configured_key_and_create_page() {
        let config = Config {
            storage_key: "links".to_string(),
            create_page: "pages/new.html".to_string(),
            ..Config::default()
        };
        let (background, storage, navigator) = create_test_background(config);
        assert_eq!(background.config().storage_key, "links");

        block_on(async {
            background
                .store()
                .save("docs", "https://docs.example.com", "")
                .await
                .unwrap();
            assert!(storage.get("links").await.unwrap().is_some());
            assert!(storage.get("golinks").await.unwrap().is_none());

            background.handle_omnibox_input("wiki", "currentTab").await;
        });

        let redirects = navigator.redirects.borrow();
        assert_eq!(
            redirects[0].url,
            "chrome-extension://golinks-test/pages/new.html?shortName=wiki"
        );
    }

    #[test]
    fn test_tab_update_only_on_loading() {
        let (background, _, navigator) = create_test_background(Config::default());
        let tab = TabSnapshot {
            url: Some("go/docs".to_string()),
        };

        block_on(async {
            let complete = TabChange {
                status: Some("complete".to_string()),
            };
            assert!(background.handle_tab_update(5, &complete, &tab).await.is_none());

            let loading = TabChange {
                status: Some("loading".to_string()),
            };
            let resolution = background.handle_tab_update(5, &loading, &tab).await;
            assert!(matches!(resolution, Some(Resolution::RedirectToCreate(_))));
        });

        assert_eq!(navigator.redirects.borrow().len(), 1);
    }

    #[test]
    fn test_suggestions_respect_limit() {
        let config = Config {
            suggestion_limit: 2,
            ..Config::default()
        };
        let (background, storage, _) = create_test_background(config);

        block_on(async {
            for name in ["doc-a", "doc-b", "doc-c"] {
                background
                    .store()
                    .save(name, "https://docs.example.com", "")
                    .await
                    .unwrap();
            }

            assert_eq!(background.suggestions("DOC").await.len(), 2);

            storage.fail_with("backend unavailable");
            assert!(background.suggestions("doc").await.is_empty());
        });
    }
}
