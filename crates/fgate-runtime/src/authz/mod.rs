//! Permission requirements and the interceptor enforcing them.

pub mod decision;
pub mod interceptor;
pub mod requirement;
pub mod specification;

pub use decision::DecisionService;
pub use interceptor::{AuthorizationInterceptor, AuthorizationInterceptorFactory};
pub use requirement::{Combinator, PermissionRequirement, PermissionTable};
pub use specification::{AccessDecision, AccessSpecification};
