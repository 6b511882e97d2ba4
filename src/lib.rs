#![doc = "satis-publish: publish a static Satis repository to a remote web server over HTTP."]

//! A Satis repository is a JSON index plus distribution archives. This crate
//! uploads one to a web server that accepts PUT, within the limits of what the
//! server allows.
//!
//! - [`policy::AccessPolicy`]: which files the server accepts, and where.
//! - [`publisher::RepositoryPublisher`]: GET/PUT against the repository url.
//! - [`transport::Transport`]: the HTTP seam, mockable in tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod load_config;
pub mod policy;
pub mod publisher;
pub mod status;
pub mod transport;

pub use cli::{run, Cli, Commands};
pub use error::{PolicyError, PublishError};
pub use policy::AccessPolicy;
pub use publisher::RepositoryPublisher;
pub use status::RemoteStatus;
pub use transport::Credentials;
