//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │    /users  /users/{id}  /process-image  /health                 │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │  handlers   │  │     auth     │  │        routes          │  │
//! │  │ (requests)  │  │ (token guard)│  │   (router config)      │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{auth_middleware, AuthError, TokenAuth, TOKEN_HEADER};
pub use handlers::{
    create_user_handler, delete_user_handler, health_handler, process_image_handler,
    read_user_handler, search_users_handler, update_user_handler, AppState, CreateUserRequest,
    ErrorResponse, HealthResponse, ProcessImageError, ProcessImageResponse, SearchQueryParams,
    UpdateUserRequest, UserError, UserResponse, UsersResponse,
};
pub use routes::{create_router, RouterConfig};
