//! Form state with JSON submission and per-field validation errors.
//!
//! A [`Form`] keeps the live field values, a snapshot of the values it was
//! built with, and an [`ErrorBag`] filled from rejected submissions.
//! [`Form::post`], [`Form::put`] and [`Form::delete`] all funnel into
//! [`Form::submit`], which:
//!
//! 1. clears the previous errors,
//! 2. sends the fields as a JSON body through a [`FormTransport`],
//! 3. decodes the response as JSON, falling back to text,
//! 4. resets the fields on success when `reset_on_success` is set, or
//!    installs the decoded body as the new error bag on failure.
//!
//! # Example
//!
//! ```ignore
//! use formpost::{Form, FormOptions};
//!
//! async fn sign_up() -> anyhow::Result<()> {
//!     let mut form = Form::new(
//!         "http://localhost:8080/signup",
//!         [("name", ""), ("email", "")],
//!         FormOptions::default().with_reset_on_success(true),
//!     )?;
//!     form.set_field("name", "Ada");
//!
//!     match form.post().await {
//!         Ok(body) => println!("saved: {body}"),
//!         Err(error) if error.is_rejected() => {
//!             println!("name: {:?}", form.errors().first("name"));
//!         }
//!         Err(error) => return Err(error.into()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod error_bag;
pub mod form;
pub mod outcome;

pub use error::{FormError, SubmitError};
pub use error_bag::{ErrorBag, ErrorMessages};
pub use form::Form;
pub use outcome::{SubmitOutcome, errors_from_body};

pub use formpost_api::{
    FormClient, FormRequest, FormTransport, Method, RawResponse, StatusCode, TargetUrlError, TransportError,
};
pub use formpost_types::{FieldSet, FormOptions, GENERAL_ERROR_KEY, ResponseBody};
