//! Ad-generation core for the AdverseCo mobile shell.
//!
//! # Overview
//! Builds requests for the remote ad service, normalizes its responses into a
//! `ProductData` record, and keeps the single current record in a durable,
//! observable store. The core never opens a socket: hosts either execute the
//! `HttpRequest` values themselves (host-does-IO) or hand `AdService` an
//! `HttpTransport`.
//!
//! # Design
//! - `AdClient` is stateless and split into `build_*` / `parse_*` per mode.
//! - Normalization lives on the types: a `ProductData` is valid no matter
//!   whether it came from the network or from disk.
//! - `ProductRecordStore` is the only shared mutable state and is safe to
//!   read from any thread while another thread writes.
//! - Types use owned `String` / `Vec` fields to keep FFI mapping simple.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod preview;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;

pub use client::AdClient;
pub use config::AdConfig;
pub use error::{AdError, StorageError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use preview::{AdPreview, LocalImage, PreviewImage, SocialPlatform};
pub use service::AdService;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{ProductRecordStore, SubscriptionId};
pub use types::{ManualFields, ProductData, PLACEHOLDER_IMAGE_URL};
