//! # Freshet
//!
//! A command-line tracker for new uploads from YouTube channels, built
//! on the public per-channel upload feeds.
//!
//! ## Architecture
//!
//! Freshet follows a modular pipeline architecture:
//!
//! ```text
//! Resolver → Fetcher (proxied) → Normalizer → Aggregator → Store
//! ```
//!
//! - [`resolver`]: Turns handles, URLs, or raw ids into stable channel identities
//! - [`fetcher`]: HTTP client, relay proxies, and mirror rotation
//! - [`normalizer`]: Converts upload feeds into unified domain models
//! - [`ingest`]: Concurrent per-channel refresh with failure isolation
//! - [`store`]: JSON persistence for channels, the video cache, and the seen-set
//!
//! ## Quick Start
//!
//! ```bash
//! # Track a channel by handle, URL, or id
//! freshet add @somechannel
//!
//! # Fetch fresh uploads for every tracked channel
//! freshet refresh
//!
//! # List unread videos, newest first
//! freshet videos
//!
//! # Mark one as seen and open it
//! freshet seen dQw4w9WgXcQ
//! freshet open dQw4w9WgXcQ
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all
/// components: store, fetchers, resolver, aggregator.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/freshet/config.toml`: relay proxies, lookup
/// mirrors, endpoint URLs, timeouts, and refresh concurrency.
pub mod config;

/// Core domain models.
///
/// - [`Channel`](domain::Channel): A tracked channel identity
/// - [`Video`](domain::Video): A cached upload with its channel snapshot
/// - [`VideoFilter`](domain::VideoFilter): Date-floor and channel-scope filtering
pub mod domain;

/// HTTP fetching, relay proxies, and mirror rotation.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for plain text GETs
/// - [`ProxyClient`](fetcher::ProxyClient): Fixed-order relay proxy cascade
/// - [`RotationCursor`](fetcher::RotationCursor): Sticky last-known-good mirror cursor
pub mod fetcher;

/// Concurrent feed refresh across all tracked channels.
pub mod ingest;

/// Feed parsing and normalization.
///
/// Converts the platform's Atom upload feeds into unified
/// [`Video`](domain::Video) structs.
pub mod normalizer;

/// Channel resolution from raw user input.
pub mod resolver;

/// JSON persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`JsonStore`](store::JsonStore): Single-file JSON implementation
pub mod store;
