//! Discovery engine for the job board.
//!
//! This crate contains the session controller that ties the query model,
//! the remote sources and pagination together, plus the interaction store
//! that keeps save/dismiss state in sync with the listing store.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{Collaborators, EngineConfig, SessionController, SessionMode};
//!
//! let session = SessionController::new("u1", collaborators, EngineConfig::default())?;
//! session.start().await;
//! session.submit_search("senior rust engineer remote").await;
//! session.load_more().await;
//!
//! for listing in session.visible_listings() {
//!     println!("{} at {}", listing.title, listing.company);
//! }
//! session.interactions().save(&first_id).await?;
//! session.switch_mode(SessionMode::Personalized).await;
//! ```

pub mod config;
pub mod error;
pub mod interactions;
pub mod pagination;
pub mod recent;
pub mod session;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use interactions::{InteractionRecord, InteractionStore};
pub use pagination::{LoadMore, PageState, Paginator, StrategyKind};
pub use recent::{RecentSearchEntry, RecentSearches};
pub use session::{Collaborators, DataSource, SessionController, SessionMode, SessionView};
