pub mod activity_service;
pub mod activity_source;
pub mod auth_service;
pub mod email_service;
pub mod record_service;
pub mod user_service;
pub mod verification_service;

pub use activity_service::{ActivityDetail, ActivityService};
pub use activity_source::{ActivitySource, HttpActivitySource, SourceError};
pub use auth_service::{AuthService, LoginOutcome, LoginRequest};
pub use email_service::{create_email_service, EmailError, EmailService, MockEmailService};
pub use record_service::RecordService;
pub use user_service::{CreateUserRequest, UserService};
pub use verification_service::VerificationService;
