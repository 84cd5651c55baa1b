//! Account registration for MySitterSquad.
//!
//! A new user is identified solely by their mobile number. Registration
//! checks the record store for an existing row with that number, inserts a
//! new row when there is none, and makes the created user the current
//! session user.
//!
//! - [`RegistrationService`] orchestrates the workflow
//! - [`UserStore`] abstracts the record store ([`AirtableUserStore`] in
//!   production, [`MemoryUserStore`] for tests and local runs)
//! - [`SessionStore`] holds the authenticated user, passed in explicitly
//! - [`SignupForm`] is the form controller in front of the service

pub mod error;
pub mod form;
pub mod mobile;
pub mod service;
pub mod session;
pub mod store;
pub mod user;

pub use error::{InputError, StoreError};
pub use form::{FormError, FormResponse, Notice, NoticeKind, Route, SignupForm};
pub use mobile::{CountryCode, Mobile};
pub use service::{RegistrationOutcome, RegistrationService, SignInOutcome};
pub use session::{MemorySession, SessionStore};
pub use store::{AirtableUserStore, MemoryUserStore, UserStore};
pub use user::{NewUser, User, UserId};
