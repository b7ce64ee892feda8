pub mod factory;
pub mod gate;
pub mod headers;
pub mod observer;
pub mod token;
pub mod validator;

pub use factory::{GateError, build_keystone_auth};
pub use gate::KeystoneAuth;
pub use headers::IdentityStatus;
pub use observer::{AuthEvent, AuthObserver, TracingObserver};
pub use token::{DomainScope, ProjectScope, Role, Scope, Token, User};
pub use validator::{ValidateError, Validator, ValidatorBuildError};
