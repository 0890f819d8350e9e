//! Background service answering view requests from the entry store
//!
//! Views never touch storage directly for reads; they send a [`Request`] and
//! wait for the [`Response`]. There is no timeout: a request whose service
//! has stopped fails with a channel error, one that never gets answered
//! waits forever.

use crate::services::storage::{EntryStore, KeyValueStore};
use crate::types::{Entry, ReadlogError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Requests queued before senders wait
const REQUEST_QUEUE: usize = 32;

/// Wire form: `{"action":"getBlogEntries"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "getBlogEntries")]
    GetBlogEntries,
}

/// Wire form: `{"blogEntries":[...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "blogEntries", default)]
    pub blog_entries: Vec<Entry>,
}

/// Owner of the entry store
pub struct BackgroundService<K> {
    store: EntryStore<K>,
}

impl<K: KeyValueStore + 'static> BackgroundService<K> {
    pub fn new(store: EntryStore<K>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntryStore<K> {
        &self.store
    }

    /// First-run hook: make sure the collection key exists.
    pub async fn on_installed(&self) -> Result<()> {
        if self.store.initialize().await? {
            debug!("entry store seeded on install");
        }
        Ok(())
    }

    pub async fn handle(&self, request: Request) -> Result<Response> {
        debug!(?request, "handling request");
        match request {
            Request::GetBlogEntries => Ok(Response {
                blog_entries: self.store.load().await?,
            }),
        }
    }

    /// Run the service on its own task and return a handle for requests.
    /// The task ends when every handle has been dropped.
    pub fn spawn(self) -> BackgroundHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(REQUEST_QUEUE);
        tokio::spawn(async move {
            while let Some(Envelope { request, reply }) = rx.recv().await {
                let response = self.handle(request).await;
                // the requester may have given up; nothing to do then
                let _ = reply.send(response);
            }
            debug!("background service stopped");
        });
        BackgroundHandle { tx }
    }
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Result<Response>>,
}

/// Cloneable sender side of a spawned [`BackgroundService`]
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<Envelope>,
}

impl BackgroundHandle {
    pub async fn request(&self, request: Request) -> Result<Response> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| ReadlogError::Channel("background service is not running".into()))?;
        rx.await
            .map_err(|_| ReadlogError::Channel("background service dropped the request".into()))?
    }

    pub async fn entries(&self) -> Result<Vec<Entry>> {
        Ok(self.request(Request::GetBlogEntries).await?.blog_entries)
    }
}
